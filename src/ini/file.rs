use std::str::FromStr;

use super::lexer::LineTerminator;
use super::parser::{ParseError, Parser};
use super::property::IniProperty;
use super::section::IniSection;

/// An INI document that remembers every byte of its source formatting.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IniFile {
    pub(crate) top_level_properties: Vec<IniProperty>,
    pub(crate) sections: Vec<IniSection>,
    pub(crate) default_line_terminator: LineTerminator,
    /// Trivia after the last line and the final lexeme, verbatim.
    pub(crate) end_of_file_contents: String,
}

impl IniFile {
    pub fn new() -> Self {
        IniFile {
            top_level_properties: Vec::new(),
            sections: Vec::new(),
            default_line_terminator: LineTerminator::CrLf,
            end_of_file_contents: String::new(),
        }
    }

    /// Load from a string
    pub fn load_from_str(data: &str) -> Result<Self, ParseError> {
        let mut parser = Parser::new(data);
        let file = parser.parse()?;

        Ok(file)
    }

    /// Properties before the first section header.
    pub fn top_level_properties(&self) -> &[IniProperty] {
        &self.top_level_properties
    }

    pub fn top_level_properties_mut(&mut self) -> &mut Vec<IniProperty> {
        &mut self.top_level_properties
    }

    pub fn sections(&self) -> &[IniSection] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut Vec<IniSection> {
        &mut self.sections
    }

    /// All instances of section `name`, in document order.
    pub fn sections_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl DoubleEndedIterator<Item = &'a IniSection> {
        self.sections.iter().filter(move |s| s.name == name)
    }

    pub(crate) fn last_section_named_mut(&mut self, name: &str) -> Option<&mut IniSection> {
        self.sections.iter_mut().rev().find(|s| s.name == name)
    }

    /// Appends a top-level property after the existing ones.
    pub fn push_top_level_property(&mut self, property: IniProperty) {
        if let Some(last) = self.top_level_properties.last_mut() {
            last.terminate_last_line();
        }
        self.top_level_properties.push(property);
    }

    /// Appends a section at the end of the document, before the end-of-file contents.
    pub fn push_section(&mut self, section: IniSection) {
        match self.sections.last_mut() {
            Some(last) => last.terminate_last_line(),
            None => {
                if let Some(last) = self.top_level_properties.last_mut() {
                    last.terminate_last_line();
                }
            }
        }
        self.sections.push(section);
    }

    pub fn default_line_terminator(&self) -> LineTerminator {
        self.default_line_terminator
    }

    /// Sets the terminator used for new lines.
    ///
    /// Only `Cr`, `Lf` and `CrLf` are accepted; anything else is ignored.
    pub fn set_default_line_terminator(&mut self, terminator: LineTerminator) {
        if terminator.is_explicit() {
            self.default_line_terminator = terminator;
        } else {
            log::warn!("Ignoring {terminator:?} as default line terminator");
        }
    }

    pub fn end_of_file_contents(&self) -> &str {
        &self.end_of_file_contents
    }

    /// `true` when there is nothing to write at all.
    pub fn is_empty(&self) -> bool {
        self.top_level_properties.is_empty()
            && self.sections.is_empty()
            && self.end_of_file_contents.is_empty()
    }
}

impl Default for IniFile {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for IniFile {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::load_from_str(s)
    }
}
