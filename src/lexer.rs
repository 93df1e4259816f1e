use parse_display::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq)]
#[display("Unclosed quote.")]
pub struct UnclosedQuoteError;

pub fn tokenize(src: &str) -> Vec<String> {
    src.split_whitespace().map(str::to_owned).collect()
}

/// A cursor over the whitespace-split words of one command.
///
/// Words are plain until read through [TokenCursor::next_value], which
/// re-joins a quoted multi-word value (e.g. `'New York'`) back into one
/// token.
pub struct TokenCursor {
    words: Vec<String>,
    index: usize,
}

impl TokenCursor {
    pub fn new(words: Vec<String>) -> Self {
        Self { words, index: 0 }
    }

    pub fn next(&mut self) -> Option<String> {
        let word = self.words.get(self.index)?.clone();
        self.index += 1;
        Some(word)
    }

    pub fn remaining(&self) -> usize {
        self.words.len() - self.index
    }

    /// Reads one value token. A word opening with `'` or `"` absorbs the
    /// following words, with a single space re-inserted between them, until
    /// a word ends with the same quote character; the pair of quotes is then
    /// stripped. A lone quote closes itself and yields the empty string.
    pub fn next_value(&mut self) -> Option<Result<String, UnclosedQuoteError>> {
        let first = self.next()?;
        let quote = match first.as_bytes().first() {
            Some(b'\'') => '\'',
            Some(b'"') => '"',
            _ => return Some(Ok(first)),
        };

        let mut value = first;
        while !value.ends_with(quote) {
            let Some(word) = self.next() else {
                return Some(Err(UnclosedQuoteError));
            };

            value.push(' ');
            value.push_str(&word);
        }

        // A lone quote character has nothing left once stripped.
        let inner = match value.len() {
            0..=1 => "",
            len => &value[1..len - 1],
        };
        Some(Ok(inner.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(src: &str) -> TokenCursor {
        TokenCursor::new(tokenize(src))
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(tokenize("add  in\tusers"), ["add", "in", "users"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn plain_value() {
        let mut tokens = cursor("Ada 30");
        assert_eq!(tokens.next_value(), Some(Ok("Ada".to_owned())));
        assert_eq!(tokens.next_value(), Some(Ok("30".to_owned())));
        assert_eq!(tokens.next_value(), None);
    }

    #[test]
    fn quoted_single_word() {
        let mut tokens = cursor("'Ada' rest");
        assert_eq!(tokens.next_value(), Some(Ok("Ada".to_owned())));
        assert_eq!(tokens.next(), Some("rest".to_owned()));
    }

    #[test]
    fn quoted_words_rejoin() {
        let mut tokens = cursor("'New York' 10");
        assert_eq!(tokens.next_value(), Some(Ok("New York".to_owned())));
        assert_eq!(tokens.next(), Some("10".to_owned()));

        let mut tokens = cursor("\"a b c\"");
        assert_eq!(tokens.next_value(), Some(Ok("a b c".to_owned())));
    }

    #[test]
    fn quote_kinds_do_not_close_each_other() {
        let mut tokens = cursor("\"mixed quotes' here\"");
        assert_eq!(tokens.next_value(), Some(Ok("mixed quotes' here".to_owned())));
    }

    #[test]
    fn unclosed_quote() {
        let mut tokens = cursor("'New York");
        assert_eq!(tokens.next_value(), Some(Err(UnclosedQuoteError)));
    }

    #[test]
    fn lone_quote_is_empty() {
        let mut tokens = cursor("' x");
        assert_eq!(tokens.next_value(), Some(Ok(String::new())));
        assert_eq!(tokens.next(), Some("x".to_owned()));

        let mut tokens = cursor("''");
        assert_eq!(tokens.next_value(), Some(Ok(String::new())));
    }
}
