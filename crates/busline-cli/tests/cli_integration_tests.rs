//! Integration tests running the `busline` binary.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

const MAPPING: &str = r#"
[[objects]]
id = "Greeting"
fields = [{ name = "text", type = "string" }]
"#;

const WIRE: &str = r#"{"MessageParts": [
    {"ToSubject": "greetings", "ReplyTo": "greetings.reply",
     "Value": {"EncodedType": "Greeting", "ObjectID": "1", "Value": {"text": "hello"}}},
    {"ToSubject": "audit", "Value": {"EncodedType": "int", "Value": 3}}
]}"#;

fn busline(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_busline"))
        .args(args)
        .output()
        .expect("binary should run")
}

fn fixture(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_check_valid_mapping() {
    let dir = TempDir::new().unwrap();
    let mapping = fixture(&dir, "mapping.toml", MAPPING);

    let output = busline(&["check", "--mapping", &mapping]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Objects: 1"));
    assert!(stdout.contains("Mapping is valid!"));
}

#[test]
fn test_check_unresolved_mapping_fails() {
    let dir = TempDir::new().unwrap();
    let mapping = fixture(
        &dir,
        "mapping.toml",
        "[[aliases]]\nid = \"Names\"\nextends = \"list<Name>\"\n",
    );

    let output = busline(&["check", "--mapping", &mapping]);

    assert!(!output.status.success());
}

#[test]
fn test_decode_prints_each_message() {
    let dir = TempDir::new().unwrap();
    let mapping = fixture(&dir, "mapping.toml", MAPPING);
    let wire = fixture(&dir, "envelope.json", WIRE);

    let output = busline(&["decode", "--mapping", &mapping, &wire]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[0] greetings reply-to=greetings.reply"));
    assert!(stdout.contains("hello"));
    assert!(stdout.contains("[1] audit"));
}

#[test]
fn test_decode_empty_envelope_fails() {
    let dir = TempDir::new().unwrap();
    let mapping = fixture(&dir, "mapping.toml", MAPPING);
    let wire = fixture(&dir, "envelope.json", r#"{"MessageParts": []}"#);

    let output = busline(&["decode", "--mapping", &mapping, &wire]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to decode envelope"));
}
