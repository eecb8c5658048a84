use std::fmt;

use log::trace;
use ordered_multimap::ListOrderedMultimap;

use super::file::IniFile;
use super::property::IniProperty;
use super::section::IniSection;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("{path}: {msg}")]
pub struct WriteError {
    pub(crate) path: String,
    pub(crate) msg: String,
}

impl WriteError {
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A flattened `section.key` identifier, or a bare `key` for top-level properties.
///
/// Section names may contain dots themselves, so everything up to the *last*
/// dot is the section name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IniPath<'a> {
    section: Option<&'a str>,
    key: &'a str,
}

impl<'a> IniPath<'a> {
    pub fn new(section: Option<&'a str>, key: &'a str) -> Self {
        Self { section, key }
    }

    pub fn parse(path: &'a str) -> Self {
        match path.rsplit_once('.') {
            Some((section, key)) => Self::new(Some(section), key),
            None => Self::new(None, path),
        }
    }

    pub fn section(&self) -> Option<&'a str> {
        self.section
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    // Every way to split `path`: at the last dot first, then at each earlier
    // dot, and finally the whole path as a top-level key. Lets keys that
    // contain dots still be found.
    fn readings(path: &'a str) -> impl Iterator<Item = IniPath<'a>> {
        path.rmatch_indices('.')
            .map(move |(i, _)| Self::new(Some(&path[..i]), &path[i + 1..]))
            .chain(std::iter::once(Self::new(None, path)))
    }
}

impl fmt::Display for IniPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.section {
            Some(section) => write!(f, "{}.{}", section, self.key),
            None => f.write_str(self.key),
        }
    }
}

impl IniFile {
    /// Flattens the document into `path -> value` pairs, in document order.
    ///
    /// Duplicate sections or keys yield one entry each.
    pub fn read_data(&self) -> ListOrderedMultimap<String, String> {
        let mut data = ListOrderedMultimap::new();

        for property in &self.top_level_properties {
            data.append(property.key.clone(), property.value.clone());
        }
        for section in &self.sections {
            for property in &section.properties {
                let path = IniPath::new(Some(&section.name), &property.key);
                data.append(path.to_string(), property.value.clone());
            }
        }

        data
    }

    /// The value of the last property at `path`.
    pub fn get_value(&self, path: &str) -> Option<&str> {
        IniPath::readings(path)
            .find_map(|reading| self.lookup_last(reading))
            .map(IniProperty::value)
    }

    /// Applies a batch of updates; `None` deletes.
    ///
    /// Existing properties get their value replaced in place; missing ones are
    /// appended to the last instance of their section, or to a new section at
    /// the end of the document. Sections are never removed. If any update
    /// cannot be written, nothing is changed.
    pub fn write_data<I, P, V>(&mut self, updates: I) -> Result<(), WriteError>
    where
        I: IntoIterator<Item = (P, Option<V>)>,
        P: AsRef<str>,
        V: AsRef<str>,
    {
        let mut staged = self.clone();

        for (path, value) in updates {
            let path = path.as_ref();
            staged
                .apply(path, value.as_ref().map(|v| v.as_ref()))
                .map_err(|msg| WriteError {
                    path: path.to_owned(),
                    msg: msg.to_owned(),
                })?;
        }

        *self = staged;
        Ok(())
    }

    /// Single-update form of [`IniFile::write_data`].
    pub fn set_value<V: AsRef<str>>(
        &mut self,
        path: &str,
        value: Option<V>,
    ) -> Result<(), WriteError> {
        self.write_data([(path, value)])
    }

    /// Deletes every property at `path`; returns `false` if there was none.
    pub fn remove_value(&mut self, path: &str) -> bool {
        self.remove(path) > 0
    }

    fn apply(&mut self, path: &str, value: Option<&str>) -> Result<(), &'static str> {
        let Some(value) = value else {
            self.remove(path);
            return Ok(());
        };

        for reading in IniPath::readings(path) {
            if let Some(property) = self.lookup_last_mut(reading) {
                trace!("Updating {reading} to {value:?}");
                return property.set_value(value);
            }
        }

        self.insert(IniPath::parse(path), value)
    }

    fn insert(&mut self, path: IniPath, value: &str) -> Result<(), &'static str> {
        trace!("Adding {path} = {value:?}");

        let property = IniProperty::new(path.key, value)?;

        match path.section {
            None => self.push_top_level_property(property),
            Some(name) => match self.last_section_named_mut(name) {
                Some(section) => section.push_property(property),
                None => {
                    let mut section = IniSection::new(name)?;
                    section.push_property(property);
                    self.push_section(section);
                }
            },
        }

        Ok(())
    }

    fn remove(&mut self, path: &str) -> usize {
        for reading in IniPath::readings(path) {
            let removed = match reading.section {
                None => {
                    let before = self.top_level_properties.len();
                    self.top_level_properties.retain(|p| p.key != reading.key);
                    before - self.top_level_properties.len()
                }
                Some(name) => self
                    .sections
                    .iter_mut()
                    .filter(|s| s.name == name)
                    .map(|s| s.remove_properties(reading.key))
                    .sum(),
            };

            if removed > 0 {
                trace!("Removed {removed} value(s) at {reading}");
                return removed;
            }
        }

        0
    }

    fn lookup_last(&self, path: IniPath) -> Option<&IniProperty> {
        match path.section {
            None => self
                .top_level_properties
                .iter()
                .rev()
                .find(|p| p.key == path.key),
            Some(name) => self
                .sections
                .iter()
                .rev()
                .filter(|s| s.name == name)
                .find_map(|s| s.property(path.key)),
        }
    }

    fn lookup_last_mut(&mut self, path: IniPath) -> Option<&mut IniProperty> {
        match path.section {
            None => self
                .top_level_properties
                .iter_mut()
                .rev()
                .find(|p| p.key == path.key),
            Some(name) => self
                .sections
                .iter_mut()
                .rev()
                .filter(|s| s.name == name)
                .find_map(|s| s.property_mut(path.key)),
        }
    }
}
