mod file;
pub mod lexer;
mod parser;
mod path;
mod property;
mod section;
mod store;
mod writer;

pub use self::file::IniFile;
pub use self::lexer::{Lexer, LineTerminator, Malformed, Token, TokenKind, Trivia, TriviaKind};
pub use self::parser::{ParseError, Parser};
pub use self::path::{IniPath, WriteError};
pub use self::property::IniProperty;
pub use self::section::IniSection;
pub use self::store::{IniFileStore, IoError};
pub use self::writer::serialize_into;
