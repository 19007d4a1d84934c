//! Lexical analysis for BibTeX
//!
//! A single forward pass over the source text. Structural tokens come from
//! [`Lexer::next_token`]; brace-delimited value bodies are read on demand via
//! [`Lexer::braced_body`], because `{` is a value delimiter only where the
//! grammar expects a value. Brace depth is tracked inside value bodies, so
//! nested braces are content rather than delimiters, and a quoted value may
//! contain balanced braces while a bare `"` at depth zero terminates it.

use crate::error::{Error, Position, Result};
use memchr::{memchr, memchr2, memchr3, memchr_iter};

/// One lexical unit of BibTeX source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// `@`
    At,
    /// Identifier: type names, keys, field names, macro names
    Ident(&'a str),
    /// A bare unsigned integer
    Number(&'a str),
    /// `=`
    Equals,
    /// `,`
    Comma,
    /// `#`
    Hash,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// The body of a `"..."` value, quotes excluded
    Quoted(&'a str),
    /// End of input
    Eof,
}

impl Token<'_> {
    /// Short description for error messages
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::At => "'@'".to_string(),
            Self::Ident(s) => format!("'{s}'"),
            Self::Number(s) => format!("'{s}'"),
            Self::Equals => "'='".to_string(),
            Self::Comma => "','".to_string(),
            Self::Hash => "'#'".to_string(),
            Self::LBrace => "'{'".to_string(),
            Self::RBrace => "'}'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::Quoted(_) => "quoted string".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '+' | '/')
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    /// Byte offset of the next unread character
    pos: usize,
    line: usize,
    column: usize,
    /// Position of the start of the most recently returned token
    token_pos: Position,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            token_pos: Position::start(),
        }
    }

    /// Position of the most recently returned token
    pub(crate) const fn token_position(&self) -> Position {
        self.token_pos
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Advance to an absolute byte offset, updating line/column
    fn advance_to(&mut self, new_pos: usize) {
        let consumed = &self.input[self.pos..new_pos];
        let newlines = memchr_iter(b'\n', consumed.as_bytes()).count();
        if newlines > 0 {
            self.line += newlines;
            let after_last = consumed.rfind('\n').map_or(0, |i| i + 1);
            self.column = consumed[after_last..].chars().count() + 1;
        } else {
            self.column += consumed.chars().count();
        }
        self.pos = new_pos;
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.advance_to(self.pos + (rest.len() - trimmed.len()));
    }

    /// Skip free text up to the next `@` or end of input, returning the
    /// trimmed skipped text when it is non-empty. Text between constructs is
    /// an implicit comment in BibTeX.
    pub(crate) fn take_until_at(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let end = memchr(b'@', rest.as_bytes()).unwrap_or(rest.len());
        let skipped = rest[..end].trim();
        self.advance_to(self.pos + end);
        (!skipped.is_empty()).then_some(skipped)
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Read the next structural token
    pub(crate) fn next_token(&mut self) -> Result<Token<'a>> {
        self.skip_whitespace();
        self.token_pos = Position {
            line: self.line,
            column: self.column,
        };
        let Some(c) = self.rest().chars().next() else {
            return Ok(Token::Eof);
        };
        let single = |lexer: &mut Self, token| {
            lexer.advance_to(lexer.pos + c.len_utf8());
            Ok(token)
        };
        match c {
            '@' => single(self, Token::At),
            '=' => single(self, Token::Equals),
            ',' => single(self, Token::Comma),
            '#' => single(self, Token::Hash),
            '{' => single(self, Token::LBrace),
            '}' => single(self, Token::RBrace),
            '(' => single(self, Token::LParen),
            ')' => single(self, Token::RParen),
            '"' => self.quoted_body(),
            c if is_ident_char(c) => Ok(self.ident_or_number()),
            other => Err(Error::syntax(
                self.token_pos,
                format!("unexpected character '{other}'"),
            )),
        }
    }

    fn ident_or_number(&mut self) -> Token<'a> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !is_ident_char(c))
            .unwrap_or(rest.len());
        let text = &rest[..end];
        self.advance_to(self.pos + end);
        if text.bytes().all(|b| b.is_ascii_digit()) {
            Token::Number(text)
        } else {
            Token::Ident(text)
        }
    }

    /// Read a `"..."` value starting at the opening quote. Balanced braces
    /// inside are content; a bare quote at brace depth zero terminates.
    fn quoted_body(&mut self) -> Result<Token<'a>> {
        let open = self.token_pos;
        let rest = self.rest();
        let bytes = rest.as_bytes();
        debug_assert_eq!(bytes.first(), Some(&b'"'));

        let mut depth = 0usize;
        let mut i = 1;
        while i < bytes.len() {
            let Some(step) = memchr3(b'"', b'{', b'}', &bytes[i..]) else {
                break;
            };
            i += step;
            // A backslash escapes the delimiter that follows it.
            if bytes[..i].iter().rev().take_while(|&&b| b == b'\\').count() % 2 == 1 {
                i += 1;
                continue;
            }
            match bytes[i] {
                b'"' if depth == 0 => {
                    let body = &rest[1..i];
                    self.advance_to(self.pos + i + 1);
                    return Ok(Token::Quoted(body));
                }
                b'{' => depth += 1,
                b'}' => depth = depth.saturating_sub(1),
                _ => {}
            }
            i += 1;
        }
        Err(Error::syntax(open, "unterminated quoted string"))
    }

    /// Read a braced value body. The caller has already consumed the opening
    /// `{` token; the matching depth-zero `}` is consumed here.
    pub(crate) fn braced_body(&mut self, open: Position) -> Result<&'a str> {
        let rest = self.rest();
        let bytes = rest.as_bytes();

        let mut depth = 0usize;
        let mut i = 0;
        while i < bytes.len() {
            let Some(step) = memchr2(b'{', b'}', &bytes[i..]) else {
                break;
            };
            i += step;
            if bytes[..i].iter().rev().take_while(|&&b| b == b'\\').count() % 2 == 1 {
                i += 1;
                continue;
            }
            match bytes[i] {
                b'{' => depth += 1,
                b'}' if depth == 0 => {
                    let body = &rest[..i];
                    self.advance_to(self.pos + i + 1);
                    return Ok(body);
                }
                _ => depth -= 1,
            }
            i += 1;
        }
        Err(Error::syntax(open, "unterminated brace"))
    }

    /// Read up to the first `)`, for `@comment( ... )` bodies
    pub(crate) fn paren_body(&mut self, open: Position) -> Result<&'a str> {
        let rest = self.rest();
        match memchr(b')', rest.as_bytes()) {
            Some(end) => {
                let body = &rest[..end];
                self.advance_to(self.pos + end + 1);
                Ok(body)
            }
            None => Err(Error::syntax(open, "unterminated parenthesis")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            let done = token == Token::Eof;
            out.push(token);
            if done {
                return out;
            }
        }
    }

    #[test]
    fn structural_tokens() {
        assert_eq!(
            tokens("@article{key, year = 1905,}"),
            vec![
                Token::At,
                Token::Ident("article"),
                Token::LBrace,
                Token::Ident("key"),
                Token::Comma,
                Token::Ident("year"),
                Token::Equals,
                Token::Number("1905"),
                Token::Comma,
                Token::RBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn identifier_charset() {
        assert_eq!(
            tokens("hello-world_123:test.com+x/y"),
            vec![Token::Ident("hello-world_123:test.com+x/y"), Token::Eof]
        );
    }

    #[test]
    fn quoted_value_with_nested_braces() {
        assert_eq!(
            tokens(r#""hello {"}world{"}" ,"#),
            vec![Token::Quoted(r#"hello {"}world{"}"#), Token::Comma, Token::Eof]
        );
    }

    #[test]
    fn braced_body_nests() {
        let mut lexer = Lexer::new("{hello {nested {braces}} world} xxx");
        assert_eq!(lexer.next_token().unwrap(), Token::LBrace);
        let body = lexer.braced_body(lexer.token_position()).unwrap();
        assert_eq!(body, "hello {nested {braces}} world");
        assert_eq!(lexer.next_token().unwrap(), Token::Ident("xxx"));
    }

    #[test]
    fn unterminated_quote_reports_position() {
        let mut lexer = Lexer::new("title = \"Foo\n");
        assert_eq!(lexer.next_token().unwrap(), Token::Ident("title"));
        assert_eq!(lexer.next_token().unwrap(), Token::Equals);
        match lexer.next_token() {
            Err(Error::Syntax { line, column, .. }) => {
                assert_eq!((line, column), (1, 9));
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_brace_reports_position() {
        let mut lexer = Lexer::new("{no close");
        assert_eq!(lexer.next_token().unwrap(), Token::LBrace);
        assert!(matches!(
            lexer.braced_body(lexer.token_position()),
            Err(Error::Syntax { line: 1, column: 1, .. })
        ));
    }

    #[test]
    fn line_and_column_tracking() {
        let mut lexer = Lexer::new("@book\n  {key");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        assert_eq!(lexer.token_position(), Position { line: 2, column: 3 });
        lexer.next_token().unwrap();
        assert_eq!(lexer.token_position(), Position { line: 2, column: 4 });
    }

    #[test]
    fn take_until_at_collects_free_text() {
        let mut lexer = Lexer::new("stray text\n@misc");
        assert_eq!(lexer.take_until_at(), Some("stray text"));
        assert_eq!(lexer.next_token().unwrap(), Token::At);
        // Everything up to the next '@' or the end of input counts.
        assert_eq!(lexer.take_until_at(), Some("misc"));
        assert!(lexer.at_eof());
        assert_eq!(lexer.take_until_at(), None);
    }
}
