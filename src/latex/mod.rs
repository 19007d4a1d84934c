//! LaTeX-to-Unicode decoding
//!
//! Converts LaTeX-escaped text (accent commands, special-character commands,
//! tick/dash ligatures) to plain Unicode. The mapping is table-driven: the
//! embedded `latex.map` resource holds one `command<TAB>replacement` record
//! per line and is parsed once, on first use, into an immutable process-wide
//! table. An accent command is any command whose replacement is a single
//! combining mark; it consumes exactly one argument, braced or bare.
//!
//! Decoding never fails. Unrecognized commands pass through as literal text,
//! and braces are stripped without altering the visible content.

use ahash::AHashMap;
use lazy_static::lazy_static;
use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

/// The LaTeX escape-sequence to Unicode mapping table
pub struct LatexTable {
    map: AHashMap<&'static str, &'static str>,
}

impl LatexTable {
    /// Parse a line-oriented `command<TAB>replacement` table
    ///
    /// Blank lines and lines starting with `#` are ignored. Replacement text
    /// is taken verbatim, including trailing whitespace.
    #[must_use]
    pub fn from_resource(data: &'static str) -> Self {
        let mut map = AHashMap::new();
        for line in data.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((command, replacement)) = line.split_once('\t') {
                map.insert(command, replacement);
            }
        }
        Self { map }
    }

    /// Look up the replacement for a full command text
    #[must_use]
    pub fn get(&self, command: &str) -> Option<&'static str> {
        self.map.get(command).copied()
    }

    /// Iterate over all (command, replacement) records
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.map.iter().map(|(k, v)| (*k, *v))
    }
}

lazy_static! {
    /// Process-wide mapping table, read-only after initialization and
    /// therefore safe for concurrent `decode` calls without locking.
    pub static ref TABLE: LatexTable = LatexTable::from_resource(include_str!("latex.map"));
}

/// Is this replacement a single combining mark, i.e. an accent command?
fn is_combining_mark(replacement: &str) -> bool {
    let mut chars = replacement.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('\u{0300}'..='\u{036F}'), None)
    )
}

/// Decode LaTeX escapes in `input` to plain Unicode text
///
/// Returns `Cow::Borrowed` when the input contains no escapes, braces, or
/// ligatures, so `decode` is the identity on plain text.
///
/// ```
/// use bibliograph::decode_latex;
///
/// assert_eq!(decode_latex(r#"Kurt G{\"o}del"#), "Kurt Gödel");
/// assert_eq!(decode_latex("plain text"), "plain text");
/// ```
#[must_use]
pub fn decode(input: &str) -> Cow<'_, str> {
    match first_special(input) {
        None => Cow::Borrowed(input),
        Some(at) => {
            let mut out = String::with_capacity(input.len());
            out.push_str(&input[..at]);
            decode_into(&input[at..], &mut out);
            Cow::Owned(out)
        }
    }
}

/// Byte offset of the first character that may begin an escape or ligature
fn first_special(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\\' | b'{' | b'}' | b'~' | b'`' => return Some(i),
            b'-' if bytes.get(i + 1) == Some(&b'-') => return Some(i),
            b'\'' if bytes.get(i + 1) == Some(&b'\'') => return Some(i),
            _ => {}
        }
    }
    None
}

fn decode_into(mut s: &str, out: &mut String) {
    while let Some(c) = s.chars().next() {
        match c {
            '\\' => s = decode_command(s, out),
            // Braces protect content from case mangling; the visible text is
            // unchanged, so they are dropped.
            '{' | '}' => s = &s[1..],
            '-' | '`' | '\'' | '~' => {
                if let Some((replacement, len)) = ligature(s) {
                    out.push_str(replacement);
                    s = &s[len..];
                } else {
                    out.push(c);
                    s = &s[c.len_utf8()..];
                }
            }
            _ => {
                // Copy the plain run up to the next special character.
                let run = first_special(s).unwrap_or(s.len()).max(c.len_utf8());
                out.push_str(&s[..run]);
                s = &s[run..];
            }
        }
    }
}

/// Longest-match lookup for the tick/dash ligatures (`---`, `--`, ` `` `, ...)
fn ligature(s: &str) -> Option<(&'static str, usize)> {
    for len in [3usize, 2, 1] {
        if s.len() >= len && s.is_char_boundary(len) {
            if let Some(replacement) = TABLE.get(&s[..len]) {
                return Some((replacement, len));
            }
        }
    }
    None
}

/// Decode one backslash command at the start of `s`, returning the rest
fn decode_command<'a>(s: &'a str, out: &mut String) -> &'a str {
    let rest = &s[1..];
    let Some(first) = rest.chars().next() else {
        out.push('\\');
        return rest;
    };

    // Multi-letter command names are matched greedily, so "\leq" wins over
    // "\l" followed by "eq".
    let name_len = if first.is_ascii_alphabetic() {
        rest.find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len())
    } else {
        first.len_utf8()
    };
    let command = &s[..1 + name_len];
    let after = &rest[name_len..];

    match TABLE.get(command) {
        Some(mark) if is_combining_mark(mark) => decode_accent(after, mark, out),
        Some(replacement) => {
            out.push_str(replacement);
            after
        }
        // Unknown commands pass through as literal text; a following braced
        // group still gets its braces stripped, leaving the content.
        None => {
            out.push_str(command);
            after
        }
    }
}

/// Decode the single argument of an accent command and compose it
fn decode_accent<'a>(s: &'a str, mark: &str, out: &mut String) -> &'a str {
    let s = s.trim_start_matches([' ', '\t']);
    let Some(c) = s.chars().next() else {
        out.push_str(mark);
        return s;
    };
    match c {
        '{' => {
            let (inner, rest) = braced_group(s);
            let mut base = String::new();
            decode_into(inner, &mut base);
            push_accented(&base, mark, out);
            rest
        }
        '\\' => {
            let mut base = String::new();
            let rest = decode_command(s, &mut base);
            push_accented(&base, mark, out);
            rest
        }
        _ => {
            push_accented(&s[..c.len_utf8()], mark, out);
            &s[c.len_utf8()..]
        }
    }
}

/// Apply a combining mark to the first character of `base`, preferring the
/// precomposed form when NFC defines one
fn push_accented(base: &str, mark: &str, out: &mut String) {
    let mut chars = base.chars();
    match chars.next() {
        None => out.push_str(mark),
        Some(c) => {
            // Dotless i and j exist only to take accents.
            let c = match c {
                'ı' => 'i',
                'ȷ' => 'j',
                other => other,
            };
            let composed: String = std::iter::once(c).chain(mark.chars()).nfc().collect();
            out.push_str(&composed);
            out.push_str(chars.as_str());
        }
    }
}

/// Split a `{...}` group (including unterminated ones) into body and rest
fn braced_group(s: &str) -> (&str, &str) {
    debug_assert!(s.starts_with('{'));
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return (&s[1..i], &s[i + 1..]);
                }
            }
            _ => {}
        }
    }
    (&s[1..], "")
}
