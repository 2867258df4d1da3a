#[path = "common/mod.rs"]
mod common;

use common::CampusTest;
use jiff::SignedDuration;

// ============================================================================
// General
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let campus = CampusTest::new();
    let output = campus.run_success(&["--help"]);
    for command in ["student", "instructor", "courses", "auth", "config"] {
        assert!(output.contains(command), "missing {command} in help");
    }
}

#[test]
fn test_courses_json() {
    let campus = CampusTest::new();
    let output = campus.run_success(&["courses", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    let courses = value["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 4);
    assert_eq!(courses[0], "React Fundamentals");
}

#[test]
fn test_completions_bash() {
    let campus = CampusTest::new();
    let output = campus.run_success(&["completions", "bash"]);
    assert!(output.contains("campus"));
}

// ============================================================================
// Config command tests
// ============================================================================

#[test]
fn test_config_show_empty() {
    let campus = CampusTest::new();
    let output = campus.run_success(&["config", "show"]);
    assert!(output.contains("Configuration"));
    assert!(output.contains("not configured"));
}

#[test]
fn test_config_set_and_show_masks_keys() {
    let campus = CampusTest::new();

    campus.run_success(&["config", "set", "store.url", "https://db.example.com"]);
    let output = campus.run_success(&["config", "set", "store.api_key", "anon-key-123456"]);
    assert!(output.contains("an...56"));
    assert!(!output.contains("anon-key-123456"));

    let output = campus.run_success(&["config", "show"]);
    assert!(output.contains("https://db.example.com"));
    assert!(output.contains("an...56"));

    let file = campus.read_config();
    assert!(file.contains("anon-key-123456"));
}

#[test]
fn test_config_show_json() {
    let campus = CampusTest::new();
    campus.run_success(&["config", "set", "store.timeout_secs", "12"]);

    let output = campus.run_success(&["config", "show", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["store"]["timeout_secs"], 12);
    assert_eq!(value["store"]["api_key_configured"], false);
}

#[test]
fn test_config_set_invalid_key() {
    let campus = CampusTest::new();
    let stderr = campus.run_failure(&["config", "set", "store.password", "value"]);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_config_set_underscore_key_suggests_dot() {
    let campus = CampusTest::new();
    let stderr = campus.run_failure(&["config", "set", "store_url", "https://x.io"]);
    assert!(stderr.contains("'store.url'"));
}

#[test]
fn test_config_set_invalid_url() {
    let campus = CampusTest::new();
    let stderr = campus.run_failure(&["config", "set", "store.url", "not a url"]);
    assert!(stderr.contains("invalid URL"));
}

// ============================================================================
// Auth gating
// ============================================================================

#[test]
fn test_collection_commands_require_sign_in() {
    let campus = CampusTest::new();

    let stderr = campus.run_failure(&["student", "ls"]);
    assert!(stderr.contains("not signed in"));

    let stderr = campus.run_failure(&["instructor", "rm", "abc", "--yes"]);
    assert!(stderr.contains("not signed in"));
}

#[test]
fn test_expired_session_is_rejected() {
    let campus = CampusTest::new();
    campus.write_session("ops@uni.edu", SignedDuration::from_hours(-1));

    let stderr = campus.run_failure(&["student", "ls"]);
    assert!(stderr.contains("session expired"));
}

#[test]
fn test_signed_in_without_store_config() {
    let campus = CampusTest::new();
    campus.write_session("ops@uni.edu", SignedDuration::from_hours(1));

    let stderr = campus.run_failure(&["student", "ls"]);
    assert!(stderr.contains("store.url not configured"));
}

#[test]
fn test_whoami_and_logout() {
    let campus = CampusTest::new();
    campus.write_session("ops@uni.edu", SignedDuration::from_hours(1));

    let output = campus.run_success(&["auth", "whoami"]);
    assert!(output.contains("Test Operator"));
    assert!(output.contains("ops@uni.edu"));

    campus.run_success(&["auth", "logout"]);
    assert!(!campus.session_exists());

    let stderr = campus.run_failure(&["auth", "whoami"]);
    assert!(stderr.contains("not signed in"));
}

#[test]
fn test_login_requires_auth_api_key() {
    let campus = CampusTest::new();
    let stderr = campus.run_failure(&[
        "auth",
        "login",
        "--email",
        "ops@uni.edu",
        "--password",
        "secret",
    ]);
    assert!(stderr.contains("auth.api_key not configured"));
}

#[test]
fn test_profile_requires_a_change() {
    let campus = CampusTest::new();
    let stderr = campus.run_failure(&["auth", "profile"]);
    assert!(stderr.contains("--name"));
}

#[test]
fn test_profile_requires_auth_api_key() {
    let campus = CampusTest::new();
    campus.write_session("ops@uni.edu", SignedDuration::from_hours(1));

    let stderr = campus.run_failure(&["auth", "profile", "--name", "Front Desk"]);
    assert!(stderr.contains("auth.api_key not configured"));
}

// ============================================================================
// Argument validation
// ============================================================================

#[test]
fn test_unknown_course_is_rejected() {
    let campus = CampusTest::new();
    let stderr = campus.run_failure(&["student", "ls", "--course", "Cooking"]);
    assert!(stderr.contains("Invalid course"));
}

#[test]
fn test_instructor_has_no_course_option() {
    let campus = CampusTest::new();
    campus.run_failure(&["instructor", "add", "--course", "UI/UX Design"]);
}
