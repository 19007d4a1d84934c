//! Parsed bibliography database

use crate::error::{Result, Warning};
use crate::model::{Entry, EntryType};
use crate::parser::Parser;
use ahash::AHashMap;
use serde::Serialize;
use std::borrow::Cow;

/// A complete parsed bibliography.
///
/// Borrows from the input text wherever the source needed no rewriting;
/// call [`into_owned`](Database::into_owned) to detach from the input.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Database<'a> {
    pub(crate) entries: Vec<Entry<'a>>,
    pub(crate) strings: AHashMap<String, String>,
    pub(crate) preambles: Vec<Cow<'a, str>>,
    pub(crate) comments: Vec<Cow<'a, str>>,
    pub(crate) warnings: Vec<Warning>,
}

/// Summary counts over a database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub total_entries: usize,
    pub entries_by_type: AHashMap<String, usize>,
    pub string_count: usize,
    pub preamble_count: usize,
    pub warning_count: usize,
}

impl<'a> Database<'a> {
    /// Parse a complete BibTeX document with default options
    pub fn parse(input: &'a str) -> Result<Self> {
        ParseOptions::default().parse(input)
    }

    /// Start configuring a parse
    ///
    /// ```
    /// let db = bibliograph::Database::parser()
    ///     .strict(true)
    ///     .parse("@misc{k, note = {fine}}")?;
    /// assert_eq!(db.entries().len(), 1);
    /// # Ok::<(), bibliograph::Error>(())
    /// ```
    pub fn parser() -> ParseOptions {
        ParseOptions::default()
    }

    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    /// Macro definitions collected from `@string` items, keyed by the
    /// case-folded macro name
    pub fn strings(&self) -> &AHashMap<String, String> {
        &self.strings
    }

    pub fn preambles(&self) -> &[Cow<'a, str>] {
        &self.preambles
    }

    pub fn comments(&self) -> &[Cow<'a, str>] {
        &self.comments
    }

    /// Non-fatal problems noticed while parsing
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Look up an entry by citation key. Keys compare exactly; BibTeX
    /// treats them as case-sensitive.
    pub fn find_by_key(&self, key: &str) -> Option<&Entry<'a>> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn find_by_type<'s>(
        &'s self,
        ty: &'s EntryType<'s>,
    ) -> impl Iterator<Item = &'s Entry<'a>> + 's {
        self.entries.iter().filter(move |e| &e.ty == ty)
    }

    /// Entries whose `field` contains `needle`, case-insensitively
    pub fn find_by_field<'s>(
        &'s self,
        field: &'s str,
        needle: &str,
    ) -> impl Iterator<Item = &'s Entry<'a>> + 's {
        let needle = needle.to_lowercase();
        self.entries
            .iter()
            .filter(move |e| e.get(field).is_some_and(|v| v.to_lowercase().contains(&needle)))
    }

    pub fn stats(&self) -> DatabaseStats {
        let mut entries_by_type = AHashMap::new();
        for entry in &self.entries {
            *entries_by_type.entry(entry.ty.to_string()).or_insert(0) += 1;
        }
        DatabaseStats {
            total_entries: self.entries.len(),
            entries_by_type,
            string_count: self.strings.len(),
            preamble_count: self.preambles.len(),
            warning_count: self.warnings.len(),
        }
    }

    /// Copy every borrowed slice so the database outlives its input
    pub fn into_owned(self) -> Database<'static> {
        Database {
            entries: self.entries.into_iter().map(Entry::into_owned).collect(),
            strings: self.strings,
            preambles: self
                .preambles
                .into_iter()
                .map(|p| Cow::Owned(p.into_owned()))
                .collect(),
            comments: self
                .comments
                .into_iter()
                .map(|c| Cow::Owned(c.into_owned()))
                .collect(),
            warnings: self.warnings,
        }
    }
}

/// Parser configuration, built fluently and finished with
/// [`parse`](ParseOptions::parse)
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub(crate) strict: bool,
    pub(crate) raw: bool,
    pub(crate) overwrite_duplicate_fields: bool,
    pub(crate) normalize_whitespace: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            raw: false,
            overwrite_duplicate_fields: false,
            normalize_whitespace: true,
        }
    }
}

impl ParseOptions {
    /// Turn every warning into a hard error
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Store field values exactly as written, skipping LaTeX decoding
    #[must_use]
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Let a repeated field within one entry replace the earlier value
    /// instead of being ignored
    #[must_use]
    pub fn overwrite_duplicate_fields(mut self, overwrite: bool) -> Self {
        self.overwrite_duplicate_fields = overwrite;
        self
    }

    /// Collapse whitespace runs spanning line breaks inside values
    /// (enabled by default)
    #[must_use]
    pub fn normalize_whitespace(mut self, normalize: bool) -> Self {
        self.normalize_whitespace = normalize;
        self
    }

    pub fn parse<'a>(&self, input: &'a str) -> Result<Database<'a>> {
        Parser::new(input, self).parse()
    }
}
