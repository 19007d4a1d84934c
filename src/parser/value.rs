//! Field value production
//!
//! A value is one or more parts joined with `#`. Each part is a quoted
//! string, a braced string, a bare number, or a macro reference. Macro
//! references resolve against the table built from earlier `@string`
//! definitions; whitespace runs containing a newline collapse to one space.

use super::lexer::Token;
use super::Parser;
use crate::error::{Result, Warning};
use memchr::memchr2;
use std::borrow::Cow;

impl<'a> Parser<'a, '_> {
    /// Parse a value: `part ( '#' part )*`, concatenated left to right.
    /// A single part borrows from the input; concatenation allocates.
    pub(crate) fn value(&mut self) -> Result<Cow<'a, str>> {
        let mut parts: Vec<Cow<'a, str>> = Vec::new();
        loop {
            parts.push(self.value_part()?);
            if self.peek()? == Token::Hash {
                self.next()?;
            } else {
                break;
            }
        }
        Ok(match parts.len() {
            1 => parts.pop().unwrap_or_default(),
            _ => Cow::Owned(parts.concat()),
        })
    }

    fn value_part(&mut self) -> Result<Cow<'a, str>> {
        match self.next()? {
            Token::Quoted(s) => Ok(self.normalized(s)),
            Token::LBrace => {
                let body = self.lexer.braced_body(self.lexer.token_position())?;
                Ok(self.normalized(body))
            }
            Token::Number(n) => Ok(Cow::Borrowed(n)),
            Token::Ident(name) => match self.macros.get(&name.to_lowercase()) {
                Some(expansion) => Ok(Cow::Owned(expansion.clone())),
                None => {
                    self.warn(Warning::UndefinedMacro(name.to_string()))?;
                    Ok(Cow::Borrowed(""))
                }
            },
            other => Err(self.parse_error(format!(
                "expected a value, found {}",
                other.describe()
            ))),
        }
    }

    fn normalized(&self, s: &'a str) -> Cow<'a, str> {
        if self.options.normalize_whitespace {
            normalize_newlines(s)
        } else {
            Cow::Borrowed(s)
        }
    }
}

/// Collapse any whitespace run containing a line break into a single space,
/// so values written across several source lines read as one line. Runs of
/// plain spaces are left alone.
pub(crate) fn normalize_newlines(s: &str) -> Cow<'_, str> {
    if memchr2(b'\n', b'\r', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            let mut broke_line = matches!(c, '\n' | '\r');
            let mut run = String::new();
            run.push(c);
            while let Some(&n) = chars.peek() {
                if !n.is_whitespace() {
                    break;
                }
                broke_line |= matches!(n, '\n' | '\r');
                run.push(n);
                chars.next();
            }
            if broke_line {
                out.push(' ');
            } else {
                out.push_str(&run);
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::normalize_newlines;
    use std::borrow::Cow;

    #[test]
    fn untouched_when_single_line() {
        assert!(matches!(
            normalize_newlines("General relativity"),
            Cow::Borrowed(_)
        ));
        // Interior double spaces without a newline survive
        assert_eq!(normalize_newlines("a  b"), "a  b");
    }

    #[test]
    fn newline_runs_collapse_to_one_space() {
        assert_eq!(normalize_newlines("a\n   b"), "a b");
        assert_eq!(normalize_newlines("a \r\n b\nc"), "a b c");
        assert_eq!(normalize_newlines("leading\n"), "leading ");
    }
}
