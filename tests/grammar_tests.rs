// tests/grammar_tests.rs
//
// End-to-end scenarios for the best-effort conventional-commit parser.

use std::time::{Duration, Instant};

use gitcc::commit::grammar;
use gitcc::parser::code_points;
use gitcc::{breaking_change_text, parse_as_much_as_possible, CommitMessage};

#[test]
fn test_scenario_scope_and_bang() {
    let msg = parse_as_much_as_possible("feat(parser)!: add combinator engine");
    assert_eq!(msg.commit_type, "feat");
    assert_eq!(msg.scope, "parser");
    assert!(msg.breaking_change);
    assert_eq!(msg.description, "add combinator engine");
    assert_eq!(msg.body, "");
    assert!(msg.footers.is_empty());
}

#[test]
fn test_scenario_no_colon_is_not_lossy() {
    let raw = "just some text";
    let msg = parse_as_much_as_possible(raw);
    assert_eq!(msg.commit_type, "");
    let recovered: Vec<&str> = [&msg.commit_type, &msg.scope, &msg.description, &msg.body]
        .into_iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    assert_eq!(recovered.concat(), raw);
}

#[test]
fn test_multiline_garbage_keeps_every_line() {
    let msg = parse_as_much_as_possible("first line\nsecond line\n\nthird");
    assert_eq!(msg.description, "first line");
    assert_eq!(msg.body, "second line\n\nthird");
}

#[test]
fn test_body_and_footers() {
    let raw = "fix(cli): handle empty input\n\
               \n\
               The parser used to panic on an empty buffer.\n\
               It now returns an empty message.\n\
               \n\
               Refs #42\n\
               Reviewed-by: Someone\n";
    let msg = parse_as_much_as_possible(raw);
    assert_eq!(msg.commit_type, "fix");
    assert_eq!(msg.scope, "cli");
    assert!(!msg.breaking_change);
    assert_eq!(
        msg.body,
        "The parser used to panic on an empty buffer.\nIt now returns an empty message."
    );
    assert_eq!(msg.footers, ["Refs #42", "Reviewed-by: Someone"]);
}

#[test]
fn test_breaking_change_footer_without_bang() {
    let msg = parse_as_much_as_possible(
        "refactor!: rename config keys\n\nBREAKING-CHANGE: `types` is now `commit_types`",
    );
    assert!(msg.breaking_change);
    assert_eq!(msg.breaking_change_notes(), "`types` is now `commit_types`\n");
}

#[test]
fn test_body_with_paragraph_that_is_not_a_footer() {
    let msg = parse_as_much_as_possible("docs: readme\n\nCloses: #1\n\nmore prose after");
    assert_eq!(msg.body, "Closes: #1\n\nmore prose after");
    assert!(msg.footers.is_empty());
}

#[test]
fn test_crlf_line_endings() {
    let msg = parse_as_much_as_possible("fix: x\r\n\r\nbody line\r\n\r\nRefs #9\r\n");
    assert_eq!(msg.description, "x");
    assert_eq!(msg.body, "body line");
    assert_eq!(msg.footers, ["Refs #9"]);
}

#[test]
fn test_multibyte_description() {
    let msg = parse_as_much_as_possible("feat(i18n): 日本語のサポート 🎉\n\n本文");
    assert_eq!(msg.scope, "i18n");
    assert_eq!(msg.description, "日本語のサポート 🎉");
    assert_eq!(msg.body, "本文");
}

#[test]
fn test_unclosed_scope_falls_back_to_description() {
    let msg = parse_as_much_as_possible("feat(api: oops");
    assert_eq!(msg.commit_type, "");
    assert_eq!(msg.description, "feat(api: oops");
}

#[test]
fn test_long_message_parses_in_linear_time() {
    let paragraph = "a pasted log line with some words in it\n".repeat(20);
    let body = vec![paragraph.trim_end(); 75].join("\n\n");
    let footers: Vec<String> = (0..500).map(|n| format!("Refs: #{n}")).collect();
    let raw = format!("fix(log): keep output\n\n{body}\n\n{}\n", footers.join("\n"));
    assert!(raw.chars().count() > 60_000);

    let started = Instant::now();
    let msg = parse_as_much_as_possible(&raw);
    let elapsed = started.elapsed();

    assert_eq!(msg.description, "keep output");
    assert_eq!(msg.body, body);
    assert_eq!(msg.footers.len(), 500);
    assert_eq!(msg.footers[499], "Refs: #499");
    assert!(
        elapsed < Duration::from_secs(10),
        "parsing {} code points took {elapsed:?}",
        raw.chars().count()
    );
}

#[test]
fn test_empty_input() {
    assert_eq!(parse_as_much_as_possible(""), CommitMessage::default());
    assert_eq!(parse_as_much_as_possible("  \n\n "), CommitMessage::default());
}

#[test]
fn test_breaking_change_subparser_on_single_footer() {
    let input = code_points("BREAKING CHANGE: removed X");
    let outcome = grammar::BREAKING_CHANGE.parse(&input).unwrap();
    assert_eq!(outcome.kind, Some(grammar::BREAKING_CHANGE_MARKER));
    assert_eq!(outcome.remaining.iter().collect::<String>(), " removed X");

    assert_eq!(breaking_change_text("BREAKING CHANGE: removed X").as_deref(), Some("removed X"));
    assert!(breaking_change_text("fix: y").is_none());
}

#[test]
fn test_serialization_shape() {
    let msg = CommitMessage {
        commit_type: "fix".into(),
        scope: String::new(),
        breaking_change: false,
        description: "short".into(),
        body: String::new(),
        footers: vec![],
    };
    assert_eq!(msg.to_string(), "fix: short");

    let with_body = CommitMessage {
        body: "why".into(),
        footers: vec!["Refs #1".into()],
        ..msg
    };
    assert_eq!(with_body.to_string(), "fix: short\n\nwhy\n\nRefs #1");
}

#[test]
fn test_json_uses_type_key() {
    let msg = parse_as_much_as_possible("ci: cache deps");
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["type"], "ci");
    assert_eq!(json["description"], "cache deps");
}
