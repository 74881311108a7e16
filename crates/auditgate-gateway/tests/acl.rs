#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use auditgate_gateway::policy::{AccessPolicy, AccessRule};

fn policy(consumer: &str, patterns: &[&str]) -> AccessPolicy {
    AccessPolicy::from_table([(
        consumer.to_string(),
        patterns.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
    )])
    .unwrap()
}

#[test]
fn wildcard_and_length_rules() {
    let p = policy("x", &["a/*", "a/b/c"]);
    assert!(p.is_allowed("x", "a/b"));
    assert!(!p.is_allowed("x", "a"));
    assert!(p.is_allowed("x", "a/z"));
}

#[test]
fn shorter_rule_matches_as_prefix() {
    let p = policy("x", &["a/b"]);
    assert!(p.is_allowed("x", "a/b/c"));
    assert!(p.is_allowed("x", "a/b"));
    assert!(!p.is_allowed("x", "a/c/b"));
}

#[test]
fn unknown_consumer_is_denied() {
    let p = policy("x", &["*"]);
    assert!(p.is_allowed("x", "anything"));
    assert!(!p.is_allowed("y", "anything"));
    assert!(!p.is_allowed("", "anything"));
}

#[test]
fn mismatch_moves_to_next_rule() {
    let p = policy("x", &["/main.Biz/Check", "/main.Admin/*"]);
    assert!(p.is_allowed("x", "/main.Admin/Logging"));
    assert!(p.is_allowed("x", "/main.Biz/Check"));
    assert!(!p.is_allowed("x", "/main.Biz/Add"));
}

#[test]
fn service_paths() {
    let p = AccessPolicy::from_json(
        r#"{
            "logger": ["/main.Admin/Logging"],
            "stat": ["/main.Admin/Statistics"],
            "biz_user": ["/main.Biz/Check", "/main.Biz/Add"],
            "biz_admin": ["/main.Biz/*"]
        }"#,
    )
    .unwrap();

    assert!(p.is_allowed("logger", "/main.Admin/Logging"));
    assert!(!p.is_allowed("logger", "/main.Admin/Statistics"));
    assert!(p.is_allowed("biz_user", "/main.Biz/Check"));
    assert!(!p.is_allowed("biz_user", "/main.Biz/Test"));
    assert!(p.is_allowed("biz_admin", "/main.Biz/Test"));
    assert!(!p.is_allowed("biz_admin", "/main.Admin/Logging"));
}

#[test]
fn consumer_with_no_rules_is_denied() {
    let p = AccessPolicy::from_json(r#"{"nobody": []}"#).unwrap();
    assert!(!p.is_allowed("nobody", "/main.Biz/Check"));
}

#[test]
fn malformed_input_is_rejected() {
    assert!(AccessPolicy::from_json("not json").is_err());
    assert!(AccessPolicy::from_json(r#"["/main.Biz/Check"]"#).is_err());
    assert!(AccessPolicy::from_json(r#"{"x": [1, 2]}"#).is_err());
    assert!(AccessPolicy::from_json(r#"{"x": [""]}"#).is_err());
}

#[test]
fn rule_segments() {
    let r = AccessRule::parse("/main.Biz/*").unwrap();
    assert_eq!(r.segments(), ["", "main.Biz", "*"]);
    assert!(r.matches(&["", "main.Biz", "Add"]));
    assert!(!r.matches(&["", "main.Biz"]));
}
