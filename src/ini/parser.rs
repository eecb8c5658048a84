use super::file::IniFile;
use super::lexer::{Lexer, LineTerminator, Malformed, Token, TokenKind, BLANKS};
use super::property::IniProperty;
use super::section::IniSection;

type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("{line}:{col} {msg}")]
pub struct ParseError {
    pub(crate) line: usize,
    pub(crate) col: usize,
    pub(crate) msg: String,
}

impl ParseError {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn col(&self) -> usize {
        self.col
    }
}

/// Builds an [`IniFile`] from the tokens of a [`Lexer`].
///
/// Parsing is all-or-nothing: the first malformed line aborts it.
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(buf: &'a str) -> Self {
        Self {
            lexer: Lexer::new(buf),
        }
    }

    pub fn parse(&mut self) -> ParseResult<IniFile> {
        let mut file = IniFile::new();

        loop {
            let token = self.lexer.next_token();

            match token.kind {
                TokenKind::Section => {
                    let mut section = IniSection::parse(token.lexeme)
                        .ok_or_else(|| error(&token, Malformed::UnclosedSection))?;
                    section.leading_trivia = token.leading_trivia;
                    section.line_terminator = token.line_terminator;
                    file.sections.push(section);
                }
                TokenKind::Property => {
                    let mut property = IniProperty::parse(token.lexeme)
                        .ok_or_else(|| error(&token, Malformed::MissingSeparator))?;
                    property.leading_trivia = token.leading_trivia;
                    property.line_terminator = token.line_terminator;

                    // properties belong to the most recently opened section
                    match file.sections.last_mut() {
                        Some(section) => section.properties.push(property),
                        None => file.top_level_properties.push(property),
                    }
                }
                TokenKind::Invalid(malformed) => return Err(error(&token, malformed)),
                TokenKind::EndOfFile => {
                    let mut contents = String::new();
                    for trivia in &token.leading_trivia {
                        contents.push_str(&trivia.text);
                        contents.push_str(trivia.line_terminator.as_str());
                    }
                    contents.push_str(token.lexeme);
                    file.end_of_file_contents = contents;
                    break;
                }
            }
        }

        file.default_line_terminator = self
            .lexer
            .last_terminator()
            .unwrap_or(LineTerminator::CrLf);

        Ok(file)
    }
}

#[cold]
fn error(token: &Token, malformed: Malformed) -> ParseError {
    let indent = token.lexeme.len() - token.lexeme.trim_start_matches(BLANKS).len();
    ParseError {
        line: token.line,
        col: indent + 1,
        msg: malformed.to_string(),
    }
}
