//! Tokenizer for code fragments and expressions

use crate::error::{Error, Result};

/// Operators and punctuation, longest first
static PUNCTUATION: [&str; 30] = [
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=", "(", ")", "{", "}", "[", "]",
    ",", ";", ":", ".", "?", "!", "=", "<", ">", "+", "-", "*", "/", "%",
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    Ident(String),
    Number(f64),
    Str(String),
    Punct(&'static str),
    /// Output of the template node at this index
    Emit(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub tok: Tok,
    /// Offset of the token in the script source
    pub at: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    base: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn push(&mut self, tok: Tok, start: usize) {
        self.tokens.push(Token {
            tok,
            at: self.base + start,
        });
    }

    fn skip_comment(&mut self) -> Result<bool> {
        let rest = &self.src[self.pos..];
        if rest.starts_with("//") {
            self.pos = match rest.find('\n') {
                Some(end) => self.pos + end + 1,
                None => self.src.len(),
            };
            return Ok(true);
        }
        if rest.starts_with("/*") {
            match rest[2..].find("*/") {
                Some(end) => self.pos += end + 4,
                None => return Err(Error::syntax("unterminated comment", self.src)),
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn ident(&mut self) {
        let start = self.pos;
        let len = self.src[start..]
            .find(|c: char| !is_ident_part(c))
            .unwrap_or(self.src.len() - start);
        self.pos += len;
        self.push(Tok::Ident(self.src[start..self.pos].to_string()), start);
    }

    fn number(&mut self) -> Result<()> {
        let start = self.pos;
        let bytes = self.src.as_bytes();
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
            end += 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
        let value = self.src[start..end]
            .parse::<f64>()
            .map_err(|_| Error::syntax("invalid number", &self.src[..end]))?;
        self.pos = end;
        self.push(Tok::Number(value), start);
        Ok(())
    }

    fn unicode_escape(&self, chars: &mut std::str::CharIndices<'_>) -> Result<char> {
        let rest = chars.as_str();
        let (digits, consumed) = if let Some(braced) = rest.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => return Err(Error::syntax("invalid unicode escape", self.src)),
            }
        } else {
            (rest.get(..4).unwrap_or(rest), 4)
        };
        let c = u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| Error::syntax("invalid unicode escape", self.src))?;
        for _ in 0..consumed {
            chars.next();
        }
        Ok(c)
    }

    fn string(&mut self, quote: char) -> Result<()> {
        let start = self.pos;
        let mut value = String::new();
        let mut chars = self.src[start + 1..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, '0')) => value.push('\0'),
                    Some((_, 'u')) => value.push(self.unicode_escape(&mut chars)?),
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                c if c == quote => {
                    self.pos = start + 1 + i + 1;
                    self.push(Tok::Str(value), start);
                    return Ok(());
                }
                c => value.push(c),
            }
        }
        Err(Error::syntax("unterminated string", self.src))
    }

    fn punctuation(&mut self) -> Result<()> {
        let rest = &self.src[self.pos..];
        match PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
            Some(punct) => {
                let start = self.pos;
                self.pos += punct.len();
                self.push(Tok::Punct(*punct), start);
                Ok(())
            }
            None => Err(Error::syntax(
                format!("unexpected character {:?}", rest.chars().next().unwrap_or(' ')),
                &self.src[..self.pos],
            )),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else if self.skip_comment()? {
                continue;
            } else if is_ident_start(c) {
                self.ident();
            } else if c.is_ascii_digit() {
                self.number()?;
            } else if c == '"' || c == '\'' || c == '`' {
                self.string(c)?;
            } else {
                self.punctuation()?;
            }
        }
        Ok(self.tokens)
    }
}

/// Splits `src` into tokens, offsets start at `base`
pub(crate) fn tokenize(src: &str, base: usize) -> Result<Vec<Token>> {
    Lexer {
        src,
        pos: 0,
        base,
        tokens: Vec::new(),
    }
    .run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(src: &str) -> Vec<Tok> {
        tokenize(src, 0).unwrap().into_iter().map(|t| t.tok).collect()
    }

    #[test]
    fn condition() {
        assert_eq!(
            toks(" if (z.n === 5) { "),
            vec![
                Tok::Ident("if".into()),
                Tok::Punct("("),
                Tok::Ident("z".into()),
                Tok::Punct("."),
                Tok::Ident("n".into()),
                Tok::Punct("==="),
                Tok::Number(5.0),
                Tok::Punct(")"),
                Tok::Punct("{"),
            ]
        );
    }

    #[test]
    fn strings_and_escapes() {
        assert_eq!(
            toks(r#""a \"b\" ]]" 'it\'s' `x\ny` "A\u{1F600}""#),
            vec![
                Tok::Str("a \"b\" ]]".into()),
                Tok::Str("it's".into()),
                Tok::Str("x\ny".into()),
                Tok::Str("A\u{1F600}".into()),
            ]
        );
    }

    #[test]
    fn numbers_and_members() {
        assert_eq!(
            toks("1.5 + a.b2"),
            vec![
                Tok::Number(1.5),
                Tok::Punct("+"),
                Tok::Ident("a".into()),
                Tok::Punct("."),
                Tok::Ident("b2".into()),
            ]
        );
    }

    #[test]
    fn comments_skipped() {
        assert_eq!(
            toks("a // line\n /* block */ b"),
            vec![Tok::Ident("a".into()), Tok::Ident("b".into())]
        );
    }

    #[test]
    fn offsets() {
        let tokens = tokenize("a  b", 10).unwrap();
        assert_eq!(tokens[1].at, 13);
    }

    #[test]
    fn errors() {
        assert!(matches!(tokenize("\"open", 0), Err(Error::Syntax { .. })));
        assert!(matches!(tokenize("a # b", 0), Err(Error::Syntax { .. })));
        assert!(matches!(tokenize("/* open", 0), Err(Error::Syntax { .. })));
    }
}
