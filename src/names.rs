//! BibTeX personal-name splitting
//!
//! An `author` or `editor` field holds a list of names joined by the word
//! `and`. Each name decomposes into first, middle, von (pre-last), last, and
//! lineage (Jr) parts following the BibTeX rules: the number of top-level
//! commas selects the form ("First von Last", "von Last, First", or
//! "von Last, Jr, First"), and lowercase-leading tokens mark the von part.
//! Splitting works on the raw field text, so brace-protected content and
//! LaTeX special characters participate in case detection the way BibTeX
//! intends: `{De}` counts as capitalized, `{\relax de}` as lowercase.

use serde::Serialize;
use std::fmt;

/// A person name split into its BibTeX parts
///
/// ```
/// use bibliograph::Person;
///
/// let person = Person::new("Jean de La Fontaine");
/// assert_eq!(person.first_names(), ["Jean"]);
/// assert_eq!(person.prelast_names(), ["de"]);
/// assert_eq!(person.last_names(), ["La", "Fontaine"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Person {
    first: Vec<String>,
    middle: Vec<String>,
    prelast: Vec<String>,
    last: Vec<String>,
    lineage: Vec<String>,
}

impl Person {
    /// Split a single name string into its parts
    ///
    /// Parsing is permissive: a name with more than two top-level commas
    /// folds the extra parts into the first-name part, and an empty string
    /// yields an empty `Person`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut person = Self::default();
        let name = name.trim();
        if name.is_empty() {
            return person;
        }

        let comma_parts = split_at_separator(name, ',');
        match comma_parts.len() {
            1 => person.parse_first_von_last(&split_tokens(name)),
            2 => {
                person.parse_von_last(&split_tokens(comma_parts[0]));
                person.parse_first_middle(&split_tokens(comma_parts[1]));
            }
            _ => {
                person.parse_von_last(&split_tokens(comma_parts[0]));
                person.extend(Part::Lineage, &split_tokens(comma_parts[1]));
                let rest: Vec<&str> = comma_parts[2..]
                    .iter()
                    .flat_map(|part| split_tokens(part))
                    .collect();
                person.parse_first_middle(&rest);
            }
        }
        person
    }

    /// First names
    #[must_use]
    pub fn first_names(&self) -> &[String] {
        &self.first
    }

    /// Middle names
    #[must_use]
    pub fn middle_names(&self) -> &[String] {
        &self.middle
    }

    /// Pre-last (von) name parts, such as "de" or "van"
    #[must_use]
    pub fn prelast_names(&self) -> &[String] {
        &self.prelast
    }

    /// Last names; never empty for a non-empty name
    #[must_use]
    pub fn last_names(&self) -> &[String] {
        &self.last
    }

    /// Lineage (Jr) name parts, present only in comma-delimited forms
    #[must_use]
    pub fn lineage_names(&self) -> &[String] {
        &self.lineage
    }

    /// First and middle names together, the way BibTeX groups them
    #[must_use]
    pub fn bibtex_first_names(&self) -> Vec<&str> {
        self.first
            .iter()
            .chain(&self.middle)
            .map(String::as_str)
            .collect()
    }

    /// "First von Last": a leading run of capitalized tokens is the first
    /// and middle names, a run of lowercase-leading tokens is the von part,
    /// and the remainder is the last name. The final token is always a last
    /// name, so a single bare token is a last name on its own.
    fn parse_first_von_last(&mut self, tokens: &[&str]) {
        let von_start = tokens
            .iter()
            .position(|t| is_von_token(t))
            .unwrap_or(tokens.len());
        let (mut first_middle, mut von_last) = tokens.split_at(von_start);
        if von_last.is_empty() && !first_middle.is_empty() {
            let (head, tail) = first_middle.split_at(first_middle.len() - 1);
            first_middle = head;
            von_last = tail;
        }
        self.parse_first_middle(first_middle);
        self.parse_von_last(von_last);
    }

    fn parse_first_middle(&mut self, tokens: &[&str]) {
        if let Some((first, middle)) = tokens.split_first() {
            self.first.push((*first).to_string());
            self.extend(Part::Middle, middle);
        }
    }

    fn parse_von_last(&mut self, tokens: &[&str]) {
        let Some((definitely_last, von_last)) = tokens.split_last() else {
            return;
        };
        if !von_last.is_empty() {
            // Everything up to and including the last von token is the von
            // part; the rest joins the last name.
            let boundary = von_last
                .iter()
                .rposition(|t| is_von_token(t))
                .map_or(0, |i| i + 1);
            self.extend(Part::Prelast, &von_last[..boundary]);
            self.extend(Part::Last, &von_last[boundary..]);
        }
        self.last.push((*definitely_last).to_string());
    }

    fn extend(&mut self, part: Part, tokens: &[&str]) {
        let target = match part {
            Part::Middle => &mut self.middle,
            Part::Prelast => &mut self.prelast,
            Part::Last => &mut self.last,
            Part::Lineage => &mut self.lineage,
        };
        target.extend(tokens.iter().map(|t| (*t).to_string()));
    }
}

enum Part {
    Middle,
    Prelast,
    Last,
    Lineage,
}

impl fmt::Display for Person {
    /// Renders in the unambiguous "von Last, Jr, First" form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let von_last = self
            .prelast
            .iter()
            .chain(&self.last)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        let jr = self.lineage.join(" ");
        let first = self
            .first
            .iter()
            .chain(&self.middle)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        let mut wrote = false;
        for part in [von_last, jr, first] {
            if part.is_empty() {
                continue;
            }
            if wrote {
                write!(f, ", ")?;
            }
            write!(f, "{part}")?;
            wrote = true;
        }
        Ok(())
    }
}

/// Split a name-list field value on the word `and`
///
/// The separator must be a standalone word at brace depth zero, matched
/// case-insensitively. An empty segment left by a bare trailing `and` is
/// discarded.
///
/// ```
/// use bibliograph::split_name_list;
///
/// let people = split_name_list("Smith, John and {Barnes and Noble}");
/// assert_eq!(people.len(), 2);
/// assert_eq!(people[1].last_names(), ["{Barnes and Noble}"]);
/// ```
#[must_use]
pub fn split_name_list(value: &str) -> Vec<Person> {
    split_and_words(value).into_iter().map(Person::new).collect()
}

/// Split on standalone "and" words at brace depth zero
fn split_and_words(s: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut segment_start = 0;
    let mut word_start: Option<usize> = None;

    for (i, c) in s.char_indices() {
        match c {
            '{' => {
                depth += 1;
                word_start.get_or_insert(i);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                word_start.get_or_insert(i);
            }
            c if c.is_whitespace() => {
                if depth == 0 {
                    if let Some(start) = word_start.take() {
                        if s[start..i].eq_ignore_ascii_case("and") {
                            segments.push(&s[segment_start..start]);
                            segment_start = i + c.len_utf8();
                        }
                    }
                }
            }
            _ => {
                word_start.get_or_insert(i);
            }
        }
    }
    // A trailing bare "and" leaves an empty segment, which is dropped.
    if let Some(start) = word_start {
        if depth == 0 && s[start..].eq_ignore_ascii_case("and") {
            segments.push(&s[segment_start..start]);
            segment_start = s.len();
        }
    }
    segments.push(&s[segment_start..]);

    segments
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Split into tokens on whitespace and ties (`~`) at brace depth zero
fn split_tokens(s: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (i, c) in s.char_indices() {
        match c {
            '{' => {
                depth += 1;
                start.get_or_insert(i);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                start.get_or_insert(i);
            }
            c if depth == 0 && (c.is_whitespace() || c == '~') => {
                if let Some(token_start) = start.take() {
                    tokens.push(&s[token_start..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(token_start) = start {
        tokens.push(&s[token_start..]);
    }
    tokens
}

/// Split on a separator character at brace depth zero, trimming each part
fn split_at_separator(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

/// Does this token begin a von part?
///
/// The effective leading case skips brace-protected content: a token that is
/// entirely braced counts as capitalized, unless the braced group is a LaTeX
/// special character, in which case the first letter of its argument decides.
fn is_von_token(token: &str) -> bool {
    match token.chars().next() {
        Some(c) if c.is_uppercase() => return false,
        Some(c) if c.is_lowercase() => return true,
        _ => {}
    }
    let mut depth = 0usize;
    let mut chars = token.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '{' => {
                depth += 1;
                if depth == 1 && matches!(chars.peek(), Some((_, '\\'))) {
                    return special_char_is_lower(&token[i + 1..]);
                }
            }
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && c.is_alphabetic() => return c.is_lowercase(),
            _ => {}
        }
    }
    false
}

/// Case of a LaTeX special character `\command arg`: the first letter after
/// the control-sequence name decides
fn special_char_is_lower(special: &str) -> bool {
    let mut in_control_sequence = true;
    for c in special.chars().skip(1) {
        if in_control_sequence {
            if !c.is_alphabetic() {
                in_control_sequence = false;
            }
        } else if c.is_alphabetic() {
            return c.is_lowercase();
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(p: &Person) -> (Vec<&str>, Vec<&str>, Vec<&str>, Vec<&str>, Vec<&str>) {
        (
            p.first.iter().map(String::as_str).collect(),
            p.middle.iter().map(String::as_str).collect(),
            p.prelast.iter().map(String::as_str).collect(),
            p.last.iter().map(String::as_str).collect(),
            p.lineage.iter().map(String::as_str).collect(),
        )
    }

    #[test]
    fn first_von_last() {
        let p = Person::new("Jean de La Fontaine");
        assert_eq!(
            parts(&p),
            (vec!["Jean"], vec![], vec!["de"], vec!["La", "Fontaine"], vec![])
        );
    }

    #[test]
    fn comma_form() {
        let p = Person::new("Smith, John");
        assert_eq!(parts(&p), (vec!["John"], vec![], vec![], vec!["Smith"], vec![]));
    }

    #[test]
    fn lineage_form() {
        let p = Person::new("de la Cruz, Jr, Maria");
        assert_eq!(
            parts(&p),
            (vec!["Maria"], vec![], vec!["de", "la"], vec!["Cruz"], vec!["Jr"])
        );
    }

    #[test]
    fn middle_names() {
        let p = Person::new("Donald E. Knuth");
        assert_eq!(
            parts(&p),
            (vec!["Donald"], vec!["E."], vec![], vec!["Knuth"], vec![])
        );
        assert_eq!(p.bibtex_first_names(), ["Donald", "E."]);
    }

    #[test]
    fn single_token_is_last_name() {
        let p = Person::new("abc");
        assert_eq!(parts(&p), (vec![], vec![], vec![], vec!["abc"], vec![]));
    }

    #[test]
    fn tie_separates_tokens() {
        let p = Person::new("Viktorov, Michail~Markovitch");
        assert_eq!(
            parts(&p),
            (
                vec!["Michail"],
                vec!["Markovitch"],
                vec![],
                vec!["Viktorov"],
                vec![]
            )
        );
    }

    #[test]
    fn too_many_commas_fold_into_first() {
        let p = Person::new("Dixit, Jr, Avinash, K.");
        assert_eq!(
            parts(&p),
            (vec!["Avinash"], vec!["K."], vec![], vec!["Dixit"], vec!["Jr"])
        );
    }

    #[test]
    fn braced_token_counts_as_capitalized() {
        // {van} has no brace-level-0 letters, so it is not a von particle.
        let p = Person::new("John {van} Smith");
        assert!(p.prelast_names().is_empty());
        assert_eq!(p.middle_names(), ["{van}"]);
        assert_eq!(p.last_names(), ["Smith"]);

        let p = Person::new("John van Smith");
        assert_eq!(p.prelast_names(), ["van"]);
    }

    #[test]
    fn special_char_decides_case() {
        assert!(is_von_token(r"{\relax de}Foo"));
        assert!(!is_von_token(r"{\relax De}Foo"));
        assert!(!is_von_token("{de}Foo"));
        assert!(is_von_token("de"));
        assert!(!is_von_token("De"));
    }

    #[test]
    fn splits_on_and() {
        let people = split_name_list("Author One and Author Two and Author Three");
        assert_eq!(people.len(), 3);
        assert_eq!(people[0].last_names(), ["One"]);
        assert_eq!(people[1].last_names(), ["Two"]);
        assert_eq!(people[2].last_names(), ["Three"]);
    }

    #[test]
    fn and_is_case_insensitive_and_whole_word() {
        let people = split_name_list("Anderson, A. AND Brand, B.");
        assert_eq!(people.len(), 2);
        let people = split_name_list("Anderson Brand");
        assert_eq!(people.len(), 1);
    }

    #[test]
    fn braced_and_is_literal() {
        let people = split_name_list("{Barnes and Noble}");
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].last_names(), ["{Barnes and Noble}"]);
    }

    #[test]
    fn trailing_and_is_discarded() {
        let people = split_name_list("Smith, John and");
        assert_eq!(people.len(), 1);
    }

    #[test]
    fn display_round_trips() {
        for name in ["Dixit, Avinash K.", "de la Cruz, Jr, Maria", "Knuth"] {
            let p = Person::new(name);
            assert_eq!(Person::new(&p.to_string()), p, "name {name}");
        }
    }
}
