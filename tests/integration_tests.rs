use bibliograph::{Database, EntryType, Error, Warning};
use pretty_assertions::assert_eq;

const SIMPLE: &str = include_str!("fixtures/simple.bib");
const COMPLEX: &str = include_str!("fixtures/complex.bib");

#[test]
fn parses_simple_bibliography() {
    let db = Database::parse(SIMPLE).unwrap();
    assert_eq!(db.entries().len(), 3);
    assert!(db.warnings().is_empty());

    let einstein = db.find_by_key("einstein1905").unwrap();
    assert_eq!(einstein.entry_type(), &EntryType::Article);
    assert_eq!(
        einstein.get("title"),
        Some("Zur Elektrodynamik bewegter Körper")
    );
    assert_eq!(einstein.get("pages"), Some("891–921"));
    assert_eq!(einstein.get("year"), Some("1905"));

    let authors = einstein.authors();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].last_names(), ["Einstein"]);
    assert_eq!(authors[0].first_names(), ["Albert"]);
}

#[test]
fn unknown_commands_survive_decoding() {
    let db = Database::parse(SIMPLE).unwrap();
    let knuth = db.find_by_key("knuth1984").unwrap();
    assert_eq!(knuth.get("title"), Some(r"The \TeXbook"));
}

#[test]
fn macros_expand_and_concatenate() {
    let db = Database::parse(COMPLEX).unwrap();
    assert!(db.warnings().is_empty());

    let mueller = db.find_by_key("mueller2019").unwrap();
    assert_eq!(mueller.get("publisher"), Some("Wiley Press"));

    let beethoven = db.find_by_key("vanBeethoven1810").unwrap();
    assert_eq!(
        beethoven.get("journal"),
        Some("Journal of Computational Physics")
    );
    assert_eq!(db.strings().get("pub").map(String::as_str), Some("Wiley"));
}

#[test]
fn preambles_and_comments_are_kept_apart() {
    let db = Database::parse(COMPLEX).unwrap();
    assert_eq!(db.preambles().len(), 1);
    assert_eq!(db.preambles()[0], r"\newcommand{\noop}[1]{}");
    // One @comment block plus the free text before the first @
    assert!(db.comments().iter().any(|c| c.starts_with("% Bibliography")));
    assert!(db
        .comments()
        .iter()
        .any(|c| c.contains("deliberately messy")));
}

#[test]
fn accented_names_decode_in_fields_but_split_raw() {
    let db = Database::parse(COMPLEX).unwrap();
    let mueller = db.find_by_key("mueller2019").unwrap();
    assert_eq!(
        mueller.get("author"),
        Some("Müller, Hans and García, María")
    );

    let authors = mueller.authors();
    assert_eq!(authors.len(), 2);
    assert_eq!(authors[0].last_names(), [r#"M{\"u}ller"#]);
    assert_eq!(authors[0].first_names(), ["Hans"]);
    assert_eq!(authors[1].first_names(), [r"Mar\'{\i}a"]);
}

#[test]
fn von_parts_split_from_multiline_values() {
    let db = Database::parse(COMPLEX).unwrap();
    let beethoven = db.find_by_key("vanBeethoven1810").unwrap();
    let authors = beethoven.authors();
    assert_eq!(authors.len(), 2);

    assert_eq!(authors[0].first_names(), ["Ludwig"]);
    assert_eq!(authors[0].prelast_names(), ["van"]);
    assert_eq!(authors[0].last_names(), ["Beethoven"]);

    assert_eq!(authors[1].first_names(), ["Charles"]);
    assert_eq!(
        authors[1].middle_names(),
        ["Louis", "Xavier", "Joseph"]
    );
    assert_eq!(authors[1].prelast_names(), ["de", "la"]);
    assert_eq!(authors[1].last_names(), [r"Vall{\'e}e", "Poussin"]);

    let fontaine = db.find_by_key("fontaine1668").unwrap();
    let authors = fontaine.authors();
    assert_eq!(authors[0].first_names(), ["Jean"]);
    assert_eq!(authors[0].prelast_names(), ["de"]);
    assert_eq!(authors[0].last_names(), ["La", "Fontaine"]);
}

#[test]
fn entry_types_parse_case_insensitively() {
    let db = Database::parse("@ARTICLE{a, title={X}}\n@Book{b, title={Y}}").unwrap();
    assert_eq!(db.entries()[0].entry_type(), &EntryType::Article);
    assert_eq!(db.entries()[1].entry_type(), &EntryType::Book);
}

#[test]
fn unknown_entry_types_become_custom_with_warning() {
    let db = Database::parse("@software{s, title={Tool}}").unwrap();
    assert_eq!(
        db.entries()[0].entry_type(),
        &EntryType::Custom("software".into())
    );
    assert_eq!(db.warnings(), [Warning::UnknownEntryType("software".into())]);

    let result = Database::parser()
        .strict(true)
        .parse("@software{s, title={Tool}}");
    assert!(matches!(
        result,
        Err(Error::Strict(Warning::UnknownEntryType(_)))
    ));
}

#[test]
fn parenthesized_bodies_parse_like_braced_ones() {
    let db = Database::parse("@article(key, title = {Parens}, year = 2001)").unwrap();
    let entry = db.find_by_key("key").unwrap();
    assert_eq!(entry.get("title"), Some("Parens"));
    assert_eq!(entry.get("year"), Some("2001"));
}

#[test]
fn duplicate_fields_keep_the_first_value() {
    let input = "@misc{k, note = {first}, note = {second}}";
    let db = Database::parse(input).unwrap();
    assert_eq!(db.find_by_key("k").unwrap().get("note"), Some("first"));
    assert_eq!(
        db.warnings(),
        [Warning::DuplicateField {
            key: "k".into(),
            field: "note".into()
        }]
    );

    let db = Database::parser()
        .overwrite_duplicate_fields(true)
        .parse(input)
        .unwrap();
    assert_eq!(db.find_by_key("k").unwrap().get("note"), Some("second"));
}

#[test]
fn duplicate_keys_keep_the_first_entry() {
    let db = Database::parse("@misc{k, note={a}}\n@misc{k, note={b}}").unwrap();
    assert_eq!(db.entries().len(), 1);
    assert_eq!(db.find_by_key("k").unwrap().get("note"), Some("a"));
    assert_eq!(db.warnings(), [Warning::DuplicateKey("k".into())]);
}

#[test]
fn identifier_case_folding_handles_non_ascii() {
    let db = Database::parse("@string{Über = \"Zeitschrift\"}\n@misc{k, Größe = Über}").unwrap();
    assert!(db.warnings().is_empty());
    let entry = db.find_by_key("k").unwrap();
    assert_eq!(entry.get("größe"), Some("Zeitschrift"));
    assert_eq!(entry.get("GRÖßE"), Some("Zeitschrift"));
}

#[test]
fn whitespace_normalization_can_be_disabled() {
    let input = "@misc{k, note = {line one\n    line two}}";

    let db = Database::parse(input).unwrap();
    assert_eq!(
        db.find_by_key("k").unwrap().get("note"),
        Some("line one line two")
    );

    let db = Database::parser()
        .normalize_whitespace(false)
        .parse(input)
        .unwrap();
    assert_eq!(
        db.find_by_key("k").unwrap().get("note"),
        Some("line one\n    line two")
    );
}

#[test]
fn undefined_macros_expand_empty_with_warning() {
    let db = Database::parse("@misc{k, journal = missing}").unwrap();
    assert_eq!(db.find_by_key("k").unwrap().get("journal"), Some(""));
    assert_eq!(db.warnings(), [Warning::UndefinedMacro("missing".into())]);
}

#[test]
fn strict_mode_turns_warnings_into_errors() {
    let result = Database::parser()
        .strict(true)
        .parse("@misc{k, journal = missing}");
    assert!(matches!(
        result,
        Err(Error::Strict(Warning::UndefinedMacro(_)))
    ));

    let result = Database::parser()
        .strict(true)
        .parse("@misc{k, note={a}}\n@misc{k, note={b}}");
    assert!(matches!(result, Err(Error::Strict(Warning::DuplicateKey(_)))));
}

#[test]
fn unterminated_entry_is_a_positioned_error() {
    let err = Database::parse("@book{k,\n  title = {Foo}").unwrap_err();
    match err {
        Error::Parse { line, .. } => assert_eq!(line, 2),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn unterminated_braced_value_reports_the_opening_brace() {
    let err = Database::parse("@book{k, title = {never closed").unwrap_err();
    match err {
        Error::Syntax { line, column, .. } => {
            assert_eq!(line, 1);
            assert_eq!(column, 18);
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn raw_mode_skips_decoding() {
    let db = Database::parser()
        .raw(true)
        .parse(r#"@misc{k, title = {K{\"o}rper}}"#)
        .unwrap();
    assert_eq!(db.find_by_key("k").unwrap().get("title"), Some(r#"K{\"o}rper"#));
}

#[test]
fn databases_serialize_to_json() {
    let db = Database::parse("@article{a, author={Curie, Marie}, year=1903}").unwrap();
    let json = serde_json::to_value(&db).unwrap();
    assert_eq!(json["entries"][0]["key"], "a");
    assert_eq!(json["entries"][0]["ty"], "article");
    assert_eq!(json["entries"][0]["fields"][0]["value"], "Curie, Marie");
}
