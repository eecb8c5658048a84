use super::lexer::{LineTerminator, Trivia, BLANKS, TRIPLE_QUOTE};

const LINE_BREAKS: [char; 2] = ['\r', '\n'];

/// A `key=value` line together with the formatting around it.
///
/// Key and value are the raw text on either side of the first `=`. Only a
/// value written in `"""` is stored without its quotes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IniProperty {
    pub(crate) key: String,
    pub(crate) value: String,
    pub(crate) leading_trivia: Vec<Trivia>,
    pub(crate) trailing_trivia: Vec<Trivia>,
    pub(crate) line_terminator: LineTerminator,
    pub(crate) quoted: Option<QuotedLayout>,
}

/// Blanks outside the `"""` of a quoted value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct QuotedLayout {
    pub(crate) before: String,
    pub(crate) after: String,
}

impl IniProperty {
    /// Creates a property without trivia, ended by the document's default terminator.
    pub fn new<K, V>(key: K, value: V) -> Result<Self, &'static str>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        let value = value.into();
        check_key(&key)?;
        let quoted = quote_value(&value, false)?.then(QuotedLayout::default);

        Ok(Self {
            key,
            value,
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
            line_terminator: LineTerminator::DocumentDefault,
            quoted,
        })
    }

    /// Splits a property lexeme at its first `=`.
    pub(crate) fn parse(lexeme: &str) -> Option<Self> {
        let (key, raw_value) = lexeme.split_once('=')?;

        let rest = raw_value.trim_start_matches(BLANKS);
        let (value, quoted) = match rest.strip_prefix(TRIPLE_QUOTE) {
            Some(body) => {
                let (value, after) = body.split_once(TRIPLE_QUOTE)?;
                let before = &raw_value[..raw_value.len() - rest.len()];
                let layout = QuotedLayout {
                    before: before.to_owned(),
                    after: after.to_owned(),
                };
                (value, Some(layout))
            }
            None => (raw_value, None),
        };

        Some(Self {
            key: key.to_owned(),
            value: value.to_owned(),
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
            line_terminator: LineTerminator::None,
            quoted,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted.is_some()
    }

    /// Replaces the value, leaving trivia and terminator as they are.
    pub fn set_value<V: Into<String>>(&mut self, value: V) -> Result<(), &'static str> {
        let value = value.into();
        if quote_value(&value, self.is_quoted())? {
            self.quoted.get_or_insert_with(QuotedLayout::default);
        } else {
            self.quoted = None;
        }
        self.value = value;
        Ok(())
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

    pub fn set_line_terminator(&mut self, terminator: LineTerminator) {
        self.line_terminator = terminator;
    }

    /// Makes sure nothing appended after this property joins its last line.
    pub(crate) fn terminate_last_line(&mut self) {
        let last = match self.trailing_trivia.last_mut() {
            Some(trivia) => &mut trivia.line_terminator,
            None => &mut self.line_terminator,
        };
        if *last == LineTerminator::None {
            *last = LineTerminator::DocumentDefault;
        }
    }
}

/// Rejects keys that would not read back as a property with the same key.
pub(crate) fn check_key(key: &str) -> Result<(), &'static str> {
    if key.contains(LINE_BREAKS) {
        return Err("key cannot contain line breaks");
    }
    if key.contains('=') {
        return Err("key cannot contain '='");
    }
    if key.starts_with([';', '\u{1a}']) {
        return Err("key cannot start with ';' or an EOF marker");
    }
    if key.trim_start_matches(BLANKS).starts_with('[') {
        return Err("key cannot start with '['");
    }
    Ok(())
}

/// Decides whether `value` has to be written in triple quotes.
///
/// A value that was quoted before stays quoted as long as it fits.
pub(crate) fn quote_value(value: &str, was_quoted: bool) -> Result<bool, &'static str> {
    let needs_quotes = value.contains(LINE_BREAKS)
        || value.trim_start_matches(BLANKS).starts_with(TRIPLE_QUOTE);

    // the closing quotes must be the first `"""` after the opening ones
    let fits_quotes = !value.contains(TRIPLE_QUOTE) && !value.ends_with('"');

    match (needs_quotes, fits_quotes) {
        (true, true) => Ok(true),
        (true, false) => Err("value cannot be enclosed in triple quotes"),
        (false, fits) => Ok(was_quoted && fits),
    }
}
