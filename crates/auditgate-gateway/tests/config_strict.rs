#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use auditgate_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
bus:
  queue_capacty: 4 # typo should fail
acl:
  logger: ["/main.Admin/Logging"]
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
acl:
  biz_user: ["/main.Biz/Check", "/main.Biz/Add"]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.bus.queue_capacity, 1);
    assert_eq!(cfg.gateway.listen, "127.0.0.1:8082");

    let policy = cfg.compile_acl().unwrap();
    assert!(policy.is_allowed("biz_user", "/main.Biz/Add"));
    assert!(!policy.is_allowed("biz_user", "/main.Biz/Test"));
}

#[test]
fn acl_json_form() {
    let ok = r#"
version: 1
acl_json: '{"logger": ["/main.Admin/Logging"], "biz_admin": ["/main.Biz/*"]}'
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    let policy = cfg.compile_acl().unwrap();
    assert!(policy.is_allowed("biz_admin", "/main.Biz/Test"));
    assert!(policy.is_allowed("logger", "/main.Admin/Logging"));
    assert!(!policy.is_allowed("logger", "/main.Admin/Statistics"));
}

#[test]
fn malformed_acl_json_is_fatal() {
    let bad = r#"
version: 1
acl_json: '{"logger": "/main.Admin/Logging"}'
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn malformed_acl_table_is_fatal() {
    let bad = r#"
version: 1
acl:
  logger: 42
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn acl_forms_are_exclusive_and_required() {
    let both = r#"
version: 1
acl:
  a: ["/x/y"]
acl_json: '{"a": ["/x/y"]}'
"#;
    assert!(config::load_from_str(both).is_err());

    let none = "version: 1\n";
    assert!(config::load_from_str(none).is_err());
}

#[test]
fn zero_queue_capacity_rejected() {
    let bad = r#"
version: 1
bus:
  queue_capacity: 0
acl:
  a: ["/x/y"]
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn unsupported_version() {
    let bad = r#"
version: 2
acl:
  a: ["/x/y"]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}
