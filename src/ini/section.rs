use super::lexer::{LineTerminator, Trivia, BLANKS};
use super::property::IniProperty;

/// A `[name]` header and the properties up to the next header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IniSection {
    pub(crate) name: String,
    pub(crate) properties: Vec<IniProperty>,
    pub(crate) leading_trivia: Vec<Trivia>,
    pub(crate) trailing_trivia: Vec<Trivia>,
    pub(crate) line_terminator: LineTerminator,
    pub(crate) indent: String,
    pub(crate) trailing: String,
}

impl IniSection {
    /// Creates an empty section, ended by the document's default terminator.
    pub fn new<S: Into<String>>(name: S) -> Result<Self, &'static str> {
        let name = name.into();
        check_name(&name)?;

        Ok(Self {
            name,
            properties: Vec::new(),
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
            line_terminator: LineTerminator::DocumentDefault,
            indent: String::new(),
            trailing: String::new(),
        })
    }

    /// Splits a section header lexeme into name and surrounding blanks.
    pub(crate) fn parse(lexeme: &str) -> Option<Self> {
        let header = lexeme.trim_start_matches(BLANKS);
        let indent = &lexeme[..lexeme.len() - header.len()];

        let inner = header.strip_prefix('[')?;
        let (name, trailing) = inner.rsplit_once(']')?;
        if !trailing.trim_matches(BLANKS).is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_owned(),
            properties: Vec::new(),
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
            line_terminator: LineTerminator::None,
            indent: indent.to_owned(),
            trailing: trailing.to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &[IniProperty] {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Vec<IniProperty> {
        &mut self.properties
    }

    /// The last property named `key`.
    pub fn property(&self, key: &str) -> Option<&IniProperty> {
        self.properties.iter().rev().find(|p| p.key == key)
    }

    pub fn property_mut(&mut self, key: &str) -> Option<&mut IniProperty> {
        self.properties.iter_mut().rev().find(|p| p.key == key)
    }

    pub fn push_property(&mut self, property: IniProperty) {
        self.terminate_body();
        self.properties.push(property);
    }

    /// Removes every property named `key` and returns how many there were.
    ///
    /// The section itself stays, even when left empty.
    pub fn remove_properties(&mut self, key: &str) -> usize {
        let before = self.properties.len();
        self.properties.retain(|p| p.key != key);
        before - self.properties.len()
    }

    pub fn leading_trivia(&self) -> &[Trivia] {
        &self.leading_trivia
    }

    pub fn leading_trivia_mut(&mut self) -> &mut Vec<Trivia> {
        &mut self.leading_trivia
    }

    pub fn trailing_trivia(&self) -> &[Trivia] {
        &self.trailing_trivia
    }

    pub fn trailing_trivia_mut(&mut self) -> &mut Vec<Trivia> {
        &mut self.trailing_trivia
    }

    pub fn line_terminator(&self) -> LineTerminator {
        self.line_terminator
    }

    // header or last property, i.e. the line a new property follows
    fn terminate_body(&mut self) {
        match self.properties.last_mut() {
            Some(property) => property.terminate_last_line(),
            None if self.line_terminator == LineTerminator::None => {
                self.line_terminator = LineTerminator::DocumentDefault;
            }
            None => {}
        }
    }

    /// Makes sure nothing appended after this section joins its last line.
    pub(crate) fn terminate_last_line(&mut self) {
        match self.trailing_trivia.last_mut() {
            Some(trivia) if trivia.line_terminator == LineTerminator::None => {
                trivia.line_terminator = LineTerminator::DocumentDefault;
            }
            Some(_) => {}
            None => self.terminate_body(),
        }
    }
}

/// Rejects names that would not read back as the same header.
pub(crate) fn check_name(name: &str) -> Result<(), &'static str> {
    if name.contains(['\r', '\n']) {
        return Err("section name cannot contain line breaks");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse {
        use super::*;

        #[test]
        fn simple() {
            let section = IniSection::parse("[Section A]").unwrap();

            assert_eq!(section.name(), "Section A");
            assert!(section.properties().is_empty());
            assert_eq!(section.indent, "");
            assert_eq!(section.trailing, "");
        }

        #[test]
        fn name_is_literal() {
            let section = IniSection::parse("  [ a.b.c ] \t").unwrap();

            assert_eq!(section.name(), " a.b.c ");
            assert_eq!(section.indent, "  ");
            assert_eq!(section.trailing, " \t");
        }

        #[test]
        fn name_ends_at_last_bracket() {
            let section = IniSection::parse("[a]b]").unwrap();

            assert_eq!(section.name(), "a]b");
        }

        #[test]
        fn fails_without_closing_bracket() {
            assert_eq!(IniSection::parse("[bad"), None);
        }

        #[test]
        fn fails_with_text_after_header() {
            assert_eq!(IniSection::parse("[s] x"), None);
        }
    }

    mod properties {
        use super::*;

        fn section() -> IniSection {
            let mut section = IniSection::new("s").unwrap();
            for (k, v) in [("a", "1"), ("b", "2"), ("a", "3")] {
                section.push_property(IniProperty::new(k, v).unwrap());
            }
            section
        }

        #[test]
        fn property_finds_the_last_one() {
            let section = section();

            assert_eq!(section.property("a").map(|p| p.value()), Some("3"));
            assert_eq!(section.property("c"), None);
        }

        #[test]
        fn remove_properties_removes_all_and_keeps_section() {
            let mut section = section();

            assert_eq!(section.remove_properties("a"), 2);
            assert_eq!(section.remove_properties("b"), 1);
            assert_eq!(section.remove_properties("b"), 0);
            assert!(section.properties().is_empty());
            assert_eq!(section.name(), "s");
        }

        #[test]
        fn push_property_terminates_unterminated_header() {
            let mut section = IniSection::parse("[s]").unwrap();

            section.push_property(IniProperty::new("k", "v").unwrap());

            assert_eq!(section.line_terminator(), LineTerminator::DocumentDefault);
        }

        #[test]
        fn push_property_terminates_unterminated_property() {
            let mut section = IniSection::parse("[s]").unwrap();
            section.line_terminator = LineTerminator::Lf;
            section.properties.push(IniProperty::parse("a=1").unwrap());

            section.push_property(IniProperty::new("k", "v").unwrap());

            assert_eq!(section.line_terminator(), LineTerminator::Lf);
            assert_eq!(
                section.properties()[0].line_terminator(),
                LineTerminator::DocumentDefault
            );
        }
    }

    mod new {
        use super::*;

        #[test]
        fn allows_dots_and_brackets() {
            assert!(IniSection::new("a.b").is_ok());
            assert!(IniSection::new("a]b").is_ok());
        }

        #[test]
        fn rejects_line_breaks() {
            assert!(IniSection::new("a\nb").is_err());
        }
    }
}
