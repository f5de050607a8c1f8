#![cfg(unix)]

use std::time::{Duration, Instant};

use scribe_core::{
    CommandOracle, CommentOracle, CommentStyle, DeclarationKind, GenerationContext, OracleError,
    OracleRequest,
};

#[test]
fn reads_text_from_stdout() {
    let script = r#"input=$(cat)
case "$input" in
  *'"language":"python"'*'"prompt":"Write a google'*) printf '{"text": "Adds numbers."}' ;;
  *) exit 9 ;;
esac"#;
    let response = shell(script).generate(&request()).expect("response");
    assert_eq!(response.text, "Adds numbers.");
}

#[test]
fn non_zero_exit_is_unavailable() {
    let err = shell("cat >/dev/null; echo boom >&2; exit 3")
        .generate(&request())
        .expect_err("exit 3");
    match err {
        OracleError::Unavailable { message } => {
            assert!(message.contains("status 3"));
            assert!(message.contains("boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn slow_oracle_times_out() {
    let err = shell("sleep 5")
        .with_timeout(Duration::from_millis(200))
        .generate(&request())
        .expect_err("deadline");
    assert!(matches!(err, OracleError::Timeout { .. }));
}

#[test]
fn deadline_holds_when_request_is_never_read() {
    let mut request = request();
    request.snippet = "x".repeat(256 * 1024);

    let started = Instant::now();
    let err = shell("sleep 5")
        .with_timeout(Duration::from_millis(200))
        .generate(&request)
        .expect_err("deadline");
    assert!(matches!(err, OracleError::Timeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn chatty_oracle_with_large_request_answers() {
    let mut request = request();
    request.snippet = "x".repeat(256 * 1024);

    let script = r#"yes noise | head -c 262144 >&2
cat >/dev/null
printf '{"text": "Handled."}'"#;
    let response = shell(script).generate(&request).expect("response");
    assert_eq!(response.text, "Handled.");
}

#[test]
fn plain_text_reply_is_malformed() {
    let err = shell("cat >/dev/null; echo 'Adds numbers.'")
        .generate(&request())
        .expect_err("not json");
    assert!(matches!(err, OracleError::Malformed { .. }));
}

#[test]
fn environment_is_scrubbed() {
    std::env::set_var("SCRIBE_TEST_LEAK", "visible");
    let script = r#"cat >/dev/null
if [ -n "$SCRIBE_TEST_LEAK" ]; then exit 4; fi
printf '{"text": "clean"}'"#;
    let response = shell(script).generate(&request()).expect("response");
    assert_eq!(response.text, "clean");
}

fn shell(script: &str) -> CommandOracle {
    CommandOracle::new("sh", ["-c", script])
}

fn request() -> OracleRequest {
    OracleRequest {
        language: "python".into(),
        snippet: "def add(a, b):\n    return a + b".into(),
        context: GenerationContext {
            kind: DeclarationKind::Function,
            name: "add".into(),
            existing_doc: String::new(),
            sibling_names: vec![],
            imports: vec![],
            complexity: "simple".into(),
        },
        style: CommentStyle::Google,
    }
}
