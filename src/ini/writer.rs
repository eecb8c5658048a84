use std::fmt;
use std::io;

use super::file::IniFile;
use super::lexer::{LineTerminator, Trivia, TRIPLE_QUOTE};
use super::property::IniProperty;
use super::section::IniSection;

struct Writer<'w, W> {
    out: &'w mut W,
    default: LineTerminator,
}

impl<'w, W: fmt::Write> Writer<'w, W> {
    fn file(&mut self, file: &IniFile) -> fmt::Result {
        for property in &file.top_level_properties {
            self.property(property)?;
        }
        for section in &file.sections {
            self.section(section)?;
        }
        self.out.write_str(&file.end_of_file_contents)
    }

    fn section(&mut self, section: &IniSection) -> fmt::Result {
        self.trivia(&section.leading_trivia)?;
        write!(
            self.out,
            "{}[{}]{}",
            section.indent, section.name, section.trailing
        )?;
        self.terminator(section.line_terminator)?;
        for property in &section.properties {
            self.property(property)?;
        }
        self.trivia(&section.trailing_trivia)
    }

    fn property(&mut self, property: &IniProperty) -> fmt::Result {
        self.trivia(&property.leading_trivia)?;
        write!(self.out, "{}=", property.key)?;
        match &property.quoted {
            Some(layout) => write!(
                self.out,
                "{}{q}{}{q}{}",
                layout.before,
                property.value,
                layout.after,
                q = TRIPLE_QUOTE
            )?,
            None => self.out.write_str(&property.value)?,
        }
        self.terminator(property.line_terminator)?;
        self.trivia(&property.trailing_trivia)
    }

    fn trivia(&mut self, trivia: &[Trivia]) -> fmt::Result {
        for line in trivia {
            self.out.write_str(&line.text)?;
            self.terminator(line.line_terminator)?;
        }
        Ok(())
    }

    fn terminator(&mut self, terminator: LineTerminator) -> fmt::Result {
        self.out.write_str(terminator.resolve(self.default).as_str())
    }
}

/// Writes `file` back as text; an unmodified document comes out byte for byte.
pub fn serialize_into<W: fmt::Write>(file: &IniFile, out: &mut W) -> fmt::Result {
    Writer {
        out,
        default: file.default_line_terminator,
    }
    .file(file)
}

impl fmt::Display for IniFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        serialize_into(self, f)
    }
}

impl IniFile {
    /// Write to a writer
    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.to_string().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(input: &str) {
        let file = IniFile::load_from_str(input).unwrap();
        assert_eq!(file.to_string(), input);
    }

    mod round_trip {
        use super::*;

        #[test]
        fn empty() {
            round_trip("");
        }

        #[test]
        fn simple() {
            round_trip("a=1\r\n[s]\r\nb=2\r\n");
        }

        #[test]
        fn without_final_terminator() {
            round_trip("[s]\nb=2");
            round_trip("[s]");
            round_trip("a=1");
        }

        #[test]
        fn mixed_terminators() {
            round_trip("a=1\n[s]\rb=2\r\n\r\n;x\nc=3\r");
        }

        #[test]
        fn blanks_everywhere() {
            round_trip("  a \t=  1 \t\r\n\t[ s ]  \r\n   \r\n b= \r\nc =\r\n");
        }

        #[test]
        fn comments_and_blank_lines() {
            round_trip(
                "; header\r\n\r\n[Section A]\r\n; about one\r\nKeyOne=value 1\r\n\r\n\r\n; trailing\r\n",
            );
        }

        #[test]
        fn duplicate_sections_and_keys() {
            round_trip("[a]\nk=1\nk=2\n[b]\n[a]\nk=3\n");
        }

        #[test]
        fn only_trivia() {
            round_trip("\r\n; nothing here\r\n   ");
        }

        #[test]
        fn eof_marker() {
            round_trip("[s]\r\nk=v\r\n\u{1a}");
            round_trip("[s]\r\nk=v\r\n; bye\r\n\u{1a}garbage [ no = closing");
        }

        #[test]
        fn multi_line_values() {
            round_trip("[s]\r\nk = \"\"\"one\r\n  two\n[three]\r\"\"\" \r\nnext=\"\"\"\"\"\"\r\n");
        }

        #[test]
        fn unusual_section_names() {
            round_trip("[a.b.c]\n[]\n[x]y]\n");
        }
    }

    mod serialize {
        use super::*;

        #[test]
        fn resolves_document_default_at_write_time() {
            let mut file = IniFile::load_from_str("[s]\nk=v\n").unwrap();
            file.sections_mut()[0]
                .push_property(IniProperty::new("n", "1").unwrap());

            assert_eq!(file.to_string(), "[s]\nk=v\nn=1\n");

            file.set_default_line_terminator(LineTerminator::Cr);
            assert_eq!(file.to_string(), "[s]\nk=v\nn=1\r");
        }

        #[test]
        fn writes_trailing_trivia() {
            let mut file = IniFile::new();
            let mut section = IniSection::new("s").unwrap();
            section.trailing_trivia_mut().push(Trivia::comment("; end of s"));
            let mut property = IniProperty::new("k", "v").unwrap();
            property.leading_trivia_mut().push(Trivia::blank());
            section.push_property(property);
            file.push_section(section);

            assert_eq!(file.to_string(), "[s]\r\n\r\nk=v\r\n; end of s\r\n");
        }

        #[test]
        fn quotes_multi_line_values() {
            let mut file = IniFile::new();
            file.push_top_level_property(IniProperty::new("k", "a\r\nb").unwrap());

            assert_eq!(file.to_string(), "k=\"\"\"a\r\nb\"\"\"\r\n");

            let reparsed = IniFile::load_from_str(&file.to_string()).unwrap();
            assert_eq!(reparsed.top_level_properties()[0].value(), "a\r\nb");
        }

        #[test]
        fn padded_values_are_written_plain() {
            let mut file = IniFile::new();
            let mut section = IniSection::new("s").unwrap();
            section.push_property(IniProperty::new("k", " padded ").unwrap());
            file.push_section(section);

            assert_eq!(file.to_string(), "[s]\r\nk= padded \r\n");
        }

        #[test]
        fn write_to_matches_display() {
            let file = IniFile::load_from_str("a=1\n[s]\nb=2").unwrap();
            let mut buf = Vec::new();

            file.write_to(&mut buf).unwrap();

            assert_eq!(String::from_utf8(buf).unwrap(), file.to_string());
        }
    }
}
