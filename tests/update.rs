use app_group::update::{compare_versions, is_newer, parse_release, UpdateChecker, UpdateInfo};
use std::cmp::Ordering;

#[test]
fn compares_versions_numerically() {
    assert_eq!(compare_versions("v1.10.0", "1.9.9"), Ordering::Greater);
    assert_eq!(compare_versions("1.2", "1.2.0"), Ordering::Equal);
    assert_eq!(compare_versions("1.2.0-beta", "1.2.0"), Ordering::Equal);
    assert_eq!(compare_versions("0.9", "1.0"), Ordering::Less);
    assert!(is_newer("v0.2.0", "0.1.0"));
    assert!(!is_newer("v0.1.0", "0.1.0"));
}

#[test]
fn parses_release_payload() {
    let body = r#"{"tag_name":"v1.3.0","html_url":"https://example.com/r/1.3.0","name":"x"}"#;
    let (tag, url) = parse_release(body).unwrap();
    assert_eq!(tag, "v1.3.0");
    assert_eq!(url.as_deref(), Some("https://example.com/r/1.3.0"));
    assert!(parse_release("[]").is_err());
}

#[test]
fn info_marks_newer_release() {
    let info = UpdateInfo::from_release("1.0.0", "v1.1.0", None);
    assert!(info.update_available);
    assert_eq!(info.latest_version.as_deref(), Some("v1.1.0"));
    assert!(info.error.is_none());
}

#[test]
fn unreachable_endpoint_reports_error_as_data() {
    let checker = UpdateChecker::with_endpoint("http://127.0.0.1:9/releases/latest", "1.0.0").unwrap();
    let info = checker.check_latest();
    assert_eq!(info.current_version, "1.0.0");
    assert!(info.error.is_some());
    assert!(!info.update_available);
    assert!(info.latest_version.is_none());
}
