//! # bibliograph
//!
//! A zero-copy BibTeX parser with LaTeX-to-Unicode decoding and
//! BibTeX-style name splitting.
//!
//! The parser reads a complete `.bib` document into a [`Database`]:
//! entries with their fields, `@string` macro definitions (expanded at
//! the point of use), `@preamble` blocks, and comments. Field values are
//! decoded from LaTeX notation to Unicode as they are stored, and author
//! or editor fields split into structured [`Person`] names on demand.
//!
//! ```
//! let db = bibliograph::parse(r#"
//!     @string{adp = "Annalen der Physik"}
//!
//!     @article{einstein1905,
//!         author  = {Einstein, Albert},
//!         title   = {Zur Elektrodynamik bewegter K{\"o}rper},
//!         journal = adp,
//!         year    = 1905,
//!     }
//! "#)?;
//!
//! let entry = db.find_by_key("einstein1905").unwrap();
//! assert_eq!(
//!     entry.get("title"),
//!     Some("Zur Elektrodynamik bewegter Körper"),
//! );
//! assert_eq!(entry.get("journal"), Some("Annalen der Physik"));
//!
//! let authors = entry.authors();
//! assert_eq!(authors[0].last_names(), ["Einstein"]);
//! assert_eq!(authors[0].first_names(), ["Albert"]);
//! # Ok::<(), bibliograph::Error>(())
//! ```
//!
//! Parsing is configurable through [`Database::parser`]: strict mode
//! turns warnings into errors, raw mode skips LaTeX decoding, and
//! duplicate-field handling can be switched from keep-first to
//! overwrite.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod error;
pub mod latex;
pub mod model;
pub mod names;

mod database;
mod parser;

pub use database::{Database, DatabaseStats, ParseOptions};
pub use error::{Error, Position, Result, Warning};
pub use latex::decode as decode_latex;
pub use model::{Entry, EntryType, Field};
pub use names::{split_name_list, Person};

/// Commonly used items in one import
pub mod prelude {
    pub use crate::database::{Database, ParseOptions};
    pub use crate::error::{Error, Result, Warning};
    pub use crate::model::{Entry, EntryType, Field};
    pub use crate::names::Person;
}

/// Parse a BibTeX document with default options.
///
/// Shorthand for [`Database::parse`].
pub fn parse(input: &str) -> Result<Database<'_>> {
    Database::parse(input)
}

/// Read and parse a `.bib` file.
///
/// The returned database owns its text, so it outlives the read buffer.
pub fn parse_file<P: AsRef<std::path::Path>>(path: P) -> Result<Database<'static>> {
    let input = std::fs::read_to_string(path)?;
    Ok(Database::parse(&input)?.into_owned())
}
