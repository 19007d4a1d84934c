//! Entry production: `@type{key, field = value, ...}`
//!
//! Field values are decoded as they are stored; the raw text is kept
//! alongside only when decoding changed it, since name splitting works on
//! the text as written. Duplicate fields and repeated citation keys keep
//! the first occurrence and raise a warning.

use super::lexer::Token;
use super::{Delim, Parser};
use crate::error::{Result, Warning};
use crate::latex;
use crate::model::{Entry, EntryType, Field};
use std::borrow::Cow;

impl<'a> Parser<'a, '_> {
    pub(crate) fn entry(&mut self, type_name: &'a str) -> Result<()> {
        let ty = EntryType::parse(type_name);
        if matches!(ty, EntryType::Custom(_)) {
            self.warn(Warning::UnknownEntryType(type_name.to_string()))?;
        }
        let delim = self.expect_open("after the entry type")?;
        let key = self.citation_key()?;

        let mut fields: Vec<Field<'a>> = Vec::new();
        loop {
            match self.peek()? {
                // Stray and trailing commas are tolerated
                Token::Comma => {
                    self.next()?;
                }
                token if token == delim.close() || token == Token::Eof => break,
                _ => {
                    self.field(&mut fields, key, delim)?;
                }
            }
        }
        self.expect_close(delim)?;

        if self.seen_keys.insert(key) {
            self.entries.push(Entry {
                ty,
                key: Cow::Borrowed(key),
                fields,
            });
        } else {
            self.warn(Warning::DuplicateKey(key.to_string()))?;
        }
        Ok(())
    }

    /// The citation key directly after the opening delimiter. Purely
    /// numeric keys lex as numbers and are accepted too.
    fn citation_key(&mut self) -> Result<&'a str> {
        match self.next()? {
            Token::Ident(key) | Token::Number(key) => Ok(key),
            other => Err(self.parse_error(format!(
                "expected a citation key, found {}",
                other.describe()
            ))),
        }
    }

    fn field(&mut self, fields: &mut Vec<Field<'a>>, key: &'a str, delim: Delim) -> Result<()> {
        let name = self.expect_ident("a field name")?;
        self.expect_token(Token::Equals, "'=' after the field name")?;
        let raw = self.value()?;
        self.store_field(fields, key, name, raw)?;

        // After a value only a separator or the closing delimiter may follow
        match self.peek()? {
            Token::Comma | Token::Eof => Ok(()),
            token if token == delim.close() => Ok(()),
            other => Err(self.parse_error(format!(
                "expected ',' or {} after the field value, found {}",
                delim.close_text(),
                other.describe()
            ))),
        }
    }

    fn store_field(
        &mut self,
        fields: &mut Vec<Field<'a>>,
        key: &str,
        name: &'a str,
        raw: Cow<'a, str>,
    ) -> Result<()> {
        let (value, raw) = if self.options.raw {
            (raw, None)
        } else {
            decode_value(raw)
        };

        let folded = name.to_lowercase();
        if let Some(existing) = fields
            .iter_mut()
            .find(|f| f.name.to_lowercase() == folded)
        {
            self.warn(Warning::DuplicateField {
                key: key.to_string(),
                field: name.to_string(),
            })?;
            if self.options.overwrite_duplicate_fields {
                existing.value = value;
                existing.raw = raw;
            }
        } else {
            fields.push(Field {
                name: Cow::Borrowed(name),
                value,
                raw,
            });
        }
        Ok(())
    }
}

/// Decode LaTeX in a field value. When decoding changes nothing the input
/// is stored as is; otherwise the original text is retained for the name
/// splitter.
fn decode_value(raw: Cow<'_, str>) -> (Cow<'_, str>, Option<Cow<'_, str>>) {
    match raw {
        Cow::Borrowed(s) => match latex::decode(s) {
            Cow::Borrowed(_) => (Cow::Borrowed(s), None),
            Cow::Owned(decoded) => (Cow::Owned(decoded), Some(Cow::Borrowed(s))),
        },
        Cow::Owned(s) => {
            let decoded = match latex::decode(&s) {
                Cow::Borrowed(_) => None,
                Cow::Owned(decoded) => Some(decoded),
            };
            match decoded {
                None => (Cow::Owned(s), None),
                Some(decoded) => (Cow::Owned(decoded), Some(Cow::Owned(s))),
            }
        }
    }
}
