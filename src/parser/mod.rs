//! BibTeX grammar parser
//!
//! An explicit single-pass state machine with one-token lookahead. At top
//! level the lookahead is `@` or end of input; free text in between is an
//! implicit comment. After `@` an identifier commits the production
//! (`comment`, `preamble`, `string`, or an entry) with no backtracking.

pub(crate) mod entry;
pub(crate) mod lexer;
pub(crate) mod value;

use crate::database::{Database, ParseOptions};
use crate::error::{Error, Result, Warning};
use crate::model::Entry;
use ahash::{AHashMap, AHashSet};
use lexer::{Lexer, Token};
use std::borrow::Cow;

pub(crate) struct Parser<'a, 'o> {
    lexer: Lexer<'a>,
    peeked: Option<Token<'a>>,
    options: &'o ParseOptions,
    /// Macro table: case-folded name to expanded value, built incrementally
    /// from `@string` definitions and consulted at the point of parsing
    macros: AHashMap<String, String>,
    entries: Vec<Entry<'a>>,
    seen_keys: AHashSet<&'a str>,
    preambles: Vec<Cow<'a, str>>,
    comments: Vec<Cow<'a, str>>,
    warnings: Vec<Warning>,
}

/// The delimiter pair enclosing a construct body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delim {
    Brace,
    Paren,
}

impl Delim {
    const fn close(self) -> Token<'static> {
        match self {
            Self::Brace => Token::RBrace,
            Self::Paren => Token::RParen,
        }
    }

    const fn close_text(self) -> &'static str {
        match self {
            Self::Brace => "'}'",
            Self::Paren => "')'",
        }
    }
}

impl<'a, 'o> Parser<'a, 'o> {
    pub(crate) fn new(input: &'a str, options: &'o ParseOptions) -> Self {
        Self {
            lexer: Lexer::new(input),
            peeked: None,
            options,
            macros: AHashMap::new(),
            entries: Vec::new(),
            seen_keys: AHashSet::new(),
            preambles: Vec::new(),
            comments: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Database<'a>> {
        loop {
            debug_assert!(self.peeked.is_none(), "lookahead drained between items");
            if let Some(text) = self.lexer.take_until_at() {
                self.comments.push(Cow::Borrowed(text));
            }
            if self.lexer.at_eof() {
                break;
            }
            let at = self.lexer.next_token()?;
            debug_assert_eq!(at, Token::At);
            self.item()?;
        }

        let mut entries = self.entries;
        entries.shrink_to_fit();
        Ok(Database {
            entries,
            strings: self.macros,
            preambles: self.preambles,
            comments: self.comments,
            warnings: self.warnings,
        })
    }

    /// Dispatch on the identifier following `@`
    fn item(&mut self) -> Result<()> {
        let name = self.expect_ident("construct name after '@'")?;
        if name.eq_ignore_ascii_case("comment") {
            self.comment_block()
        } else if name.eq_ignore_ascii_case("preamble") {
            self.preamble_block()
        } else if name.eq_ignore_ascii_case("string") {
            self.string_def()
        } else {
            self.entry(name)
        }
    }

    /// `@comment{ ... }`: balanced-brace content, recorded but not keyed
    fn comment_block(&mut self) -> Result<()> {
        let body = match self.next()? {
            Token::LBrace => self.lexer.braced_body(self.lexer.token_position())?,
            Token::LParen => self.lexer.paren_body(self.lexer.token_position())?,
            other => {
                return Err(self.parse_error(format!(
                    "expected '{{' after '@comment', found {}",
                    other.describe()
                )))
            }
        };
        self.comments.push(Cow::Borrowed(body.trim()));
        Ok(())
    }

    /// `@preamble{ value }`: captured verbatim, separate from entries
    fn preamble_block(&mut self) -> Result<()> {
        let delim = self.expect_open("after '@preamble'")?;
        let value = self.value()?;
        self.expect_close(delim)?;
        self.preambles.push(value);
        Ok(())
    }

    /// `@string{ name = value }`: resolved immediately and stored in the
    /// macro table; redefinition overwrites silently
    fn string_def(&mut self) -> Result<()> {
        let delim = self.expect_open("after '@string'")?;
        let name = self.expect_ident("macro name")?;
        self.expect_token(Token::Equals, "'=' after macro name")?;
        let value = self.value()?;
        self.expect_close(delim)?;
        self.macros.insert(name.to_lowercase(), value.into_owned());
        Ok(())
    }

    fn peek(&mut self) -> Result<Token<'a>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(self.peeked.unwrap())
    }

    fn next(&mut self) -> Result<Token<'a>> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<&'a str> {
        match self.next()? {
            Token::Ident(s) => Ok(s),
            other => Err(self.parse_error(format!("expected {what}, found {}", other.describe()))),
        }
    }

    fn expect_token(&mut self, expected: Token<'static>, what: &str) -> Result<()> {
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(self.parse_error(format!("expected {what}, found {}", token.describe())))
        }
    }

    fn expect_open(&mut self, context: &str) -> Result<Delim> {
        match self.next()? {
            Token::LBrace => Ok(Delim::Brace),
            Token::LParen => Ok(Delim::Paren),
            other => Err(self.parse_error(format!(
                "expected '{{' {context}, found {}",
                other.describe()
            ))),
        }
    }

    fn expect_close(&mut self, delim: Delim) -> Result<()> {
        let token = self.next()?;
        if token == delim.close() {
            Ok(())
        } else {
            Err(self.parse_error(format!(
                "expected {}, found {}",
                delim.close_text(),
                token.describe()
            )))
        }
    }

    fn parse_error(&self, message: String) -> Error {
        Error::parse(self.lexer.token_position(), message)
    }

    /// Record a warning, or escalate it in strict mode
    fn warn(&mut self, warning: Warning) -> Result<()> {
        if self.options.strict {
            Err(Error::Strict(warning))
        } else {
            self.warnings.push(warning);
            Ok(())
        }
    }
}
