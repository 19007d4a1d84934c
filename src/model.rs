//! Data models for BibTeX entries

use crate::names::{split_name_list, Person};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// A BibTeX entry (article, book, etc.)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry<'a> {
    /// Entry type (article, book, inproceedings, etc.)
    pub ty: EntryType<'a>,
    /// Citation key, compared case-sensitively
    pub key: Cow<'a, str>,
    /// Fields in source order (author, title, year, etc.)
    pub fields: Vec<Field<'a>>,
}

impl<'a> Entry<'a> {
    /// Create a new entry with no fields
    #[must_use]
    pub const fn new(ty: EntryType<'a>, key: Cow<'a, str>) -> Self {
        Self {
            ty,
            key,
            fields: Vec::new(),
        }
    }

    /// Get the entry type
    #[must_use]
    pub const fn entry_type(&self) -> &EntryType<'a> {
        &self.ty
    }

    /// Get the citation key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get a field value by name (case-insensitive)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.fields
            .iter()
            .find(|f| f.name.to_lowercase() == name)
            .map(|f| f.value.as_ref())
    }

    /// Get all fields in source order
    #[must_use]
    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }

    /// Split a field into person names (case-insensitive field lookup)
    ///
    /// Splitting uses the raw field text, so brace protection and LaTeX
    /// special characters still drive the von/last case heuristics. Returns
    /// an empty list when the field is absent.
    #[must_use]
    pub fn persons(&self, name: &str) -> Vec<Person> {
        let name = name.to_lowercase();
        self.fields
            .iter()
            .find(|f| f.name.to_lowercase() == name)
            .map(|f| split_name_list(f.raw_value()))
            .unwrap_or_default()
    }

    /// Person names from the `author` field
    #[must_use]
    pub fn authors(&self) -> Vec<Person> {
        self.persons("author")
    }

    /// Person names from the `editor` field
    #[must_use]
    pub fn editors(&self) -> Vec<Person> {
        self.persons("editor")
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> Entry<'static> {
        Entry {
            ty: self.ty.into_owned(),
            key: Cow::Owned(self.key.into_owned()),
            fields: self.fields.into_iter().map(Field::into_owned).collect(),
        }
    }
}

/// BibTeX entry type
///
/// The vocabulary is open: unknown types are preserved in `Custom` instead of
/// being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryType<'a> {
    /// Article from a journal
    Article,
    /// Book with publisher
    Book,
    /// Part of a book
    InBook,
    /// Article in conference proceedings
    InProceedings,
    /// Conference proceedings
    Proceedings,
    /// Master's thesis
    MastersThesis,
    /// `PhD` thesis
    PhdThesis,
    /// Technical report
    TechReport,
    /// Unpublished work
    Unpublished,
    /// Miscellaneous
    Misc,
    /// Any other entry type, case preserved
    Custom(Cow<'a, str>),
}

impl<'a> EntryType<'a> {
    /// Parse from string (case-insensitive)
    #[must_use]
    pub fn parse(s: &'a str) -> Self {
        match s.to_lowercase().as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "inbook" => Self::InBook,
            "inproceedings" | "conference" => Self::InProceedings,
            "proceedings" => Self::Proceedings,
            "mastersthesis" => Self::MastersThesis,
            "phdthesis" => Self::PhdThesis,
            "techreport" => Self::TechReport,
            "unpublished" => Self::Unpublished,
            "misc" => Self::Misc,
            _ => Self::Custom(Cow::Borrowed(s)),
        }
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> EntryType<'static> {
        match self {
            Self::Custom(s) => EntryType::Custom(Cow::Owned(s.into_owned())),
            Self::Article => EntryType::Article,
            Self::Book => EntryType::Book,
            Self::InBook => EntryType::InBook,
            Self::InProceedings => EntryType::InProceedings,
            Self::Proceedings => EntryType::Proceedings,
            Self::MastersThesis => EntryType::MastersThesis,
            Self::PhdThesis => EntryType::PhdThesis,
            Self::TechReport => EntryType::TechReport,
            Self::Unpublished => EntryType::Unpublished,
            Self::Misc => EntryType::Misc,
        }
    }
}

/// Serializes as the lowercase display form, so `Article` and
/// `Custom("article")` are indistinguishable on the wire
impl Serialize for EntryType<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for EntryType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Article => write!(f, "article"),
            Self::Book => write!(f, "book"),
            Self::InBook => write!(f, "inbook"),
            Self::InProceedings => write!(f, "inproceedings"),
            Self::Proceedings => write!(f, "proceedings"),
            Self::MastersThesis => write!(f, "mastersthesis"),
            Self::PhdThesis => write!(f, "phdthesis"),
            Self::TechReport => write!(f, "techreport"),
            Self::Unpublished => write!(f, "unpublished"),
            Self::Misc => write!(f, "misc"),
            Self::Custom(s) => write!(f, "{s}"),
        }
    }
}

/// A field in a BibTeX entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field<'a> {
    /// Field name, compared case-insensitively
    pub name: Cow<'a, str>,
    /// Decoded field value (macro-expanded, LaTeX escapes resolved)
    pub value: Cow<'a, str>,
    /// Undecoded value, kept only when decoding changed the text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Cow<'a, str>>,
}

impl<'a> Field<'a> {
    /// Create a new field whose raw and decoded values coincide
    #[must_use]
    pub const fn new(name: Cow<'a, str>, value: Cow<'a, str>) -> Self {
        Self {
            name,
            value,
            raw: None,
        }
    }

    /// The value before LaTeX decoding, as it appeared in the source
    /// (after macro expansion and whitespace normalization)
    #[must_use]
    pub fn raw_value(&self) -> &str {
        self.raw.as_deref().unwrap_or(&self.value)
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> Field<'static> {
        Field {
            name: Cow::Owned(self.name.into_owned()),
            value: Cow::Owned(self.value.into_owned()),
            raw: self.raw.map(|r| Cow::Owned(r.into_owned())),
        }
    }
}
