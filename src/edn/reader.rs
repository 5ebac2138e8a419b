use std::sync::Arc;

use crate::Sym;
use crate::edn::input::Input;
use crate::edn::{Delimiter, Edn, EdnMap, EdnSeq};
use crate::errors::{Message, Span, Spanned};

/// Pull-based reader of the top-level values of an input.
///
/// Each call to [`EdnReader::next_value`] reads exactly one value and returns `None` once the end
/// of the input is reached. A syntax error is returned once, after which the reader is exhausted.
pub struct EdnReader {
    input: Arc<Input>,
    pos: usize,
}

impl EdnReader {
    pub fn new(input: Input) -> Self {
        EdnReader {
            input: Arc::new(input),
            pos: 0,
        }
    }

    /// Reads the next top-level value, `None` marking the end of the stream.
    pub fn next_value(&mut self) -> Option<Result<Edn, Message>> {
        let res = self.skip_discarded().and_then(|_| match self.peek() {
            None => Ok(None),
            Some(_) => self.read().map(Some),
        });
        match res {
            Ok(value) => value.map(Ok),
            Err(msg) => {
                // do not attempt to recover, the rest of the input cannot be trusted
                self.pos = self.input.text.len();
                Some(Err(msg))
            }
        }
    }

    fn text(&self) -> &str {
        &self.input.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.text().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Span from `start` (inclusive) to `end` (exclusive), both byte offsets.
    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.input.clone(), start, end - 1)
    }

    /// Span of the single character at byte offset `start`.
    fn char_span(&self, start: usize) -> Span {
        let len = self.input.text[start..].chars().next().map_or(1, |c| c.len_utf8());
        self.span(start, start + len)
    }

    fn skip_blank(&mut self) {
        while let Some(c) = self.peek() {
            if c == ';' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else if c.is_whitespace() || c == ',' {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Skips blanks, comments and `#_`-discarded forms.
    fn skip_discarded(&mut self) -> Result<(), Message> {
        loop {
            self.skip_blank();
            if !self.text().starts_with("#_") {
                return Ok(());
            }
            let start = self.pos;
            self.pos += 2;
            self.skip_discarded()?;
            if self.peek().is_none_or(is_closing) {
                return Err(self.char_span(start).invalid("expected a form to discard"));
            }
            self.read()?;
        }
    }

    fn read(&mut self) -> Result<Edn, Message> {
        let start = self.pos;
        match self.peek() {
            Some('(') => self.read_seq(Delimiter::Paren),
            Some('[') => self.read_seq(Delimiter::Bracket),
            Some('{') => self.read_map(),
            Some('"') => self.read_string(),
            Some(c) if is_closing(c) => Err(self.char_span(start).invalid("unexpected closing delimiter")),
            Some(_) => self.read_token(),
            None => Err(Message::error("unexpected end of input")),
        }
    }

    /// Consumes the elements up to the closing delimiter `close` of a collection opened at `start`.
    fn read_items(&mut self, start: usize, close: char) -> Result<Vec<Edn>, Message> {
        let mut items = Vec::new();
        loop {
            self.skip_discarded()?;
            match self.peek() {
                None => return Err(self.char_span(start).invalid("unclosed delimiter")),
                Some(c) if c == close => {
                    self.bump();
                    return Ok(items);
                }
                Some(c) if is_closing(c) => {
                    return Err(self
                        .char_span(self.pos)
                        .invalid("mismatched closing delimiter")
                        .snippet(self.char_span(start).info("unclosed delimiter")));
                }
                Some(_) => items.push(self.read()?),
            }
        }
    }

    fn read_seq(&mut self, delimiter: Delimiter) -> Result<Edn, Message> {
        let start = self.pos;
        self.bump();
        let close = match delimiter {
            Delimiter::Paren => ')',
            Delimiter::Bracket => ']',
        };
        let items = self.read_items(start, close)?;
        Ok(Edn::Seq(EdnSeq::new(delimiter, items, self.span(start, self.pos))))
    }

    fn read_map(&mut self) -> Result<Edn, Message> {
        let start = self.pos;
        self.bump();
        let items = self.read_items(start, '}')?;
        let span = self.span(start, self.pos);
        if items.len() % 2 != 0 {
            return Err(span.invalid("map literal must contain an even number of forms"));
        }
        let mut entries: Vec<(Edn, Edn)> = Vec::with_capacity(items.len() / 2);
        let mut items = items.into_iter();
        while let (Some(key), Some(value)) = (items.next(), items.next()) {
            if let Some((previous, _)) = entries.iter().find(|(k, _)| *k == key) {
                return Err(key
                    .invalid("duplicate key in map")
                    .snippet(previous.info("first occurrence")));
            }
            entries.push((key, value));
        }
        Ok(Edn::Map(EdnMap::new(entries, span)))
    }

    fn read_string(&mut self) -> Result<Edn, Message> {
        let start = self.pos;
        self.bump();
        let mut content = String::new();
        loop {
            let escape_start = self.pos;
            match self.bump() {
                None => return Err(self.char_span(start).invalid("unterminated string")),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('n') => content.push('\n'),
                    Some('t') => content.push('\t'),
                    Some('r') => content.push('\r'),
                    Some('"') => content.push('"'),
                    Some('\\') => content.push('\\'),
                    Some(_) => {
                        return Err(self.span(escape_start, self.pos).invalid("unsupported escape sequence"));
                    }
                    None => return Err(self.char_span(start).invalid("unterminated string")),
                },
                Some(c) => content.push(c),
            }
        }
        Ok(Edn::Str(Sym::with_source(content, self.span(start, self.pos))))
    }

    fn read_token(&mut self) -> Result<Edn, Message> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_delimiting(c) {
                break;
            }
            self.bump();
        }
        let span = self.span(start, self.pos);
        let token = &self.input.text[start..self.pos];
        if token.starts_with(':') {
            if token.len() == 1 {
                return Err(span.invalid("empty keyword"));
            }
            Ok(Edn::Keyword(Sym::with_source(token, span)))
        } else {
            Ok(Edn::Atom(Sym::with_source(token, span)))
        }
    }
}

impl Iterator for EdnReader {
    type Item = Result<Edn, Message>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_value()
    }
}

fn is_closing(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

/// Characters that end a bare token.
fn is_delimiting(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ';' | '"' | '(' | ')' | '[' | ']' | '{' | '}')
}

/// Reads all values of a string, failing on the first syntax error.
pub fn read_all(text: &str) -> Result<Vec<Edn>, Message> {
    EdnReader::new(Input::from_string(text)).collect()
}

/// Reads a single value from a string.
pub fn read_one(text: &str) -> Result<Edn, Message> {
    let mut values = read_all(text)?;
    match values.len() {
        1 => Ok(values.remove(0)),
        n => Err(Message::error(format!("expected exactly one value but got {n}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_collections() {
        let e = read_one(r#"{:name "block-world" :start [(on a table)], :goal ()}"#).unwrap();
        let map = e.as_map().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(":name").and_then(Edn::as_string).unwrap(), "block-world");
        let start = map.get(":start").and_then(Edn::as_seq).unwrap();
        assert_eq!(start.len(), 1);
        assert_eq!(start[0].to_string(), "(on a table)");
        assert!(map.get(":goal").and_then(Edn::as_seq).unwrap().is_empty());
        assert!(map.get(":actions").is_none());
    }

    #[test]
    fn pulls_one_value_at_a_time() {
        let mut reader = EdnReader::new(Input::from_string("a ; comment\n (b c) #_ (ignored d) [e]"));
        assert!(reader.next_value().unwrap().unwrap().is_atom("a"));
        assert_eq!(reader.next_value().unwrap().unwrap().to_string(), "(b c)");
        assert_eq!(reader.next_value().unwrap().unwrap().to_string(), "[e]");
        assert!(reader.next_value().is_none());
        assert!(reader.next_value().is_none());
    }

    #[test]
    fn spans_point_into_input() {
        let e = read_one("(on  ?x table)").unwrap();
        let items = e.as_seq().unwrap();
        assert_eq!(items[1].loc().str(), "?x");
        assert_eq!(e.loc().str(), "(on  ?x table)");
    }

    #[test]
    fn string_escapes() {
        let e = read_one(r#""a \"quoted\" word\n""#).unwrap();
        assert_eq!(e.as_string().unwrap(), "a \"quoted\" word\n");
    }

    #[test]
    fn syntax_errors() {
        assert!(read_all("(a b").is_err());
        assert!(read_all("(a b]").is_err());
        assert!(read_all("a)").is_err());
        assert!(read_all("{:a}").is_err());
        assert!(read_all("\"abc").is_err());
        assert!(read_all("[#_]").is_err());
    }

    #[test]
    fn map_keys_are_unique() {
        let err = read_one("{:actions [a] :goal [] :actions [b]}").unwrap_err();
        assert!(err.title().contains("duplicate key in map"));
        assert!(read_one("{:a 1 :b 1}").is_ok());
        // keys are compared without their location
        assert!(read_one("{(p x) 1  (p  x) 2}").is_err());
        assert!(read_one("{\"a\" 1 a 2}").is_ok());
    }

    #[test]
    fn stops_after_syntax_error() {
        let mut reader = EdnReader::new(Input::from_string("(a) (b c] (d)"));
        assert!(reader.next_value().unwrap().is_ok());
        assert!(reader.next_value().unwrap().is_err());
        assert!(reader.next_value().is_none());
    }

    #[test]
    fn keywords_and_equality() {
        let a = read_one("[:k x \"x\"]").unwrap();
        let b = read_one("  [:k   x \"x\"]").unwrap();
        assert_eq!(a, b);
        let items = a.as_seq().unwrap();
        assert_eq!(items[0].as_keyword().unwrap(), ":k");
        assert_ne!(items[1], items[2]);
    }
}
