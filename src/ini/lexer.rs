use std::fmt;

pub(crate) const TRIPLE_QUOTE: &str = "\"\"\"";
pub(crate) const BLANKS: [char; 2] = [' ', '\t'];
const EOF_MARKER: char = '\u{1a}';

/// The exact sequence that ended a source line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LineTerminator {
    /// End of input, nothing followed the line.
    None,
    Cr,
    Lf,
    CrLf,
    /// Resolved to the document's default terminator when serializing.
    #[default]
    DocumentDefault,
}

impl LineTerminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::None | LineTerminator::DocumentDefault => "",
            LineTerminator::Cr => "\r",
            LineTerminator::Lf => "\n",
            LineTerminator::CrLf => "\r\n",
        }
    }

    /// Replaces `DocumentDefault` with `default`.
    pub fn resolve(self, default: LineTerminator) -> LineTerminator {
        match self {
            LineTerminator::DocumentDefault => default,
            t => t,
        }
    }

    pub(crate) fn is_explicit(&self) -> bool {
        matches!(
            self,
            LineTerminator::Cr | LineTerminator::Lf | LineTerminator::CrLf
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TriviaKind {
    Comment,
    Whitespace,
}

/// A line that carries formatting only: a comment or a blank line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
    pub line_terminator: LineTerminator,
}

impl Trivia {
    pub fn comment<S: Into<String>>(text: S) -> Self {
        Self {
            kind: TriviaKind::Comment,
            text: text.into(),
            line_terminator: LineTerminator::DocumentDefault,
        }
    }

    pub fn blank() -> Self {
        Self {
            kind: TriviaKind::Whitespace,
            text: String::new(),
            line_terminator: LineTerminator::DocumentDefault,
        }
    }
}

/// Why a line could not be classified.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Malformed {
    UnclosedSection,
    TextAfterSection,
    MissingSeparator,
    UnterminatedValue,
    TextAfterValue,
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Malformed::UnclosedSection => "expected ']' as end of section header",
            Malformed::TextAfterSection => "unexpected text after section header",
            Malformed::MissingSeparator => "expected comment, section header or '=' in line",
            Malformed::UnterminatedValue => "expected '\"\"\"' as end of multi-line value, but found EOF",
            Malformed::TextAfterValue => "unexpected text after multi-line value",
        };
        f.write_str(msg)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenKind {
    Section,
    Property,
    Invalid(Malformed),
    EndOfFile,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw text of the line(s), without the final terminator.
    pub lexeme: &'a str,
    pub line_terminator: LineTerminator,
    pub leading_trivia: Vec<Trivia>,
    /// 1-based line the token starts on.
    pub line: usize,
}

// a physical line: byte range of its text plus the terminator after it
struct Line {
    start: usize,
    end: usize,
    terminator: LineTerminator,
}

/// Splits INI text into line-classified tokens, one per call to
/// [`Lexer::next_token`], until `EndOfFile`.
#[derive(Debug)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    last_terminator: Option<LineTerminator>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 0,
            last_terminator: None,
            finished: false,
        }
    }

    /// The last `\r`, `\n` or `\r\n` read so far.
    pub fn last_terminator(&self) -> Option<LineTerminator> {
        self.last_terminator
    }

    pub fn next_token(&mut self) -> Token<'a> {
        let src = self.src;
        let mut leading_trivia = Vec::new();

        loop {
            let rest = &src[self.pos..];
            if rest.starts_with(EOF_MARKER) {
                self.pos = self.src.len();
                return Token {
                    kind: TokenKind::EndOfFile,
                    lexeme: rest,
                    line_terminator: LineTerminator::None,
                    leading_trivia,
                    line: self.line + 1,
                };
            }

            let Some(line) = self.read_line() else {
                return Token {
                    kind: TokenKind::EndOfFile,
                    lexeme: "",
                    line_terminator: LineTerminator::None,
                    leading_trivia,
                    line: self.line + 1,
                };
            };
            let text = &src[line.start..line.end];

            if let Some(kind) = classify_trivia(text) {
                leading_trivia.push(Trivia {
                    kind,
                    text: text.to_owned(),
                    line_terminator: line.terminator,
                });
                continue;
            }

            let line_no = self.line;
            let (kind, end, terminator) = self.classify(text, &line);

            return Token {
                kind,
                lexeme: &src[line.start..end],
                line_terminator: terminator,
                leading_trivia,
                line: line_no,
            };
        }
    }

    fn classify(&mut self, text: &str, line: &Line) -> (TokenKind, usize, LineTerminator) {
        let trimmed = text.trim_start_matches(BLANKS);

        if trimmed.starts_with('[') {
            let kind = match trimmed.rfind(']') {
                Some(i) if trimmed[i + 1..].trim_matches(BLANKS).is_empty() => TokenKind::Section,
                Some(_) => TokenKind::Invalid(Malformed::TextAfterSection),
                None => TokenKind::Invalid(Malformed::UnclosedSection),
            };
            return (kind, line.end, line.terminator);
        }

        let Some(eq) = text.find('=') else {
            return (
                TokenKind::Invalid(Malformed::MissingSeparator),
                line.end,
                line.terminator,
            );
        };

        let value = text[eq + 1..].trim_start_matches(BLANKS);
        if !value.starts_with(TRIPLE_QUOTE) {
            return (TokenKind::Property, line.end, line.terminator);
        }

        // multi-line value: the opening quotes are at `open` (absolute offset)
        let open = line.end - value.len();
        self.read_quoted_value(open + TRIPLE_QUOTE.len(), line)
    }

    fn read_quoted_value(&mut self, from: usize, first: &Line) -> (TokenKind, usize, LineTerminator) {
        let src = self.src;
        let mut search_from = from;
        let mut current = Line {
            start: first.start,
            end: first.end,
            terminator: first.terminator,
        };

        loop {
            let segment = &src[search_from..current.end];
            if let Some(i) = segment.find(TRIPLE_QUOTE) {
                let after = &segment[i + TRIPLE_QUOTE.len()..];
                let kind = if after.trim_matches(BLANKS).is_empty() {
                    TokenKind::Property
                } else {
                    TokenKind::Invalid(Malformed::TextAfterValue)
                };
                return (kind, current.end, current.terminator);
            }

            match self.read_line() {
                Some(next) => {
                    search_from = next.start;
                    current = next;
                }
                None => {
                    return (
                        TokenKind::Invalid(Malformed::UnterminatedValue),
                        self.src.len(),
                        LineTerminator::None,
                    )
                }
            }
        }
    }

    fn read_line(&mut self) -> Option<Line> {
        if self.pos >= self.src.len() {
            return None;
        }

        let start = self.pos;
        let bytes = self.src.as_bytes();
        self.line += 1;

        match self.src[start..].find(['\r', '\n']) {
            Some(i) => {
                let end = start + i;
                let terminator = if bytes[end] == b'\r' {
                    if bytes.get(end + 1) == Some(&b'\n') {
                        LineTerminator::CrLf
                    } else {
                        LineTerminator::Cr
                    }
                } else {
                    LineTerminator::Lf
                };
                self.pos = end + terminator.as_str().len();
                self.last_terminator = Some(terminator);
                Some(Line {
                    start,
                    end,
                    terminator,
                })
            }
            None => {
                self.pos = self.src.len();
                Some(Line {
                    start,
                    end: self.src.len(),
                    terminator: LineTerminator::None,
                })
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::EndOfFile {
            self.finished = true;
        }
        Some(token)
    }
}

fn classify_trivia(text: &str) -> Option<TriviaKind> {
    if text.starts_with(';') {
        Some(TriviaKind::Comment)
    } else if text.trim_start_matches(BLANKS).is_empty() {
        Some(TriviaKind::Whitespace)
    } else {
        None
    }
}
