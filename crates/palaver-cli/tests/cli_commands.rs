//! Integration tests for the palaver CLI commands.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Write a template document into a temp directory and return its path.
fn write_template(dir: &TempDir, name: &str, document: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, document).unwrap();
    path
}

fn tavern_template() -> &'static str {
    r#"{
        "start_at": "greeting",
        "states": {
            "greeting": {
                "text": "Well met, stranger.",
                "choices": [
                    { "text": "Farewell.", "next": "farewell" },
                    { "text": "About that key...", "next": "key_talk",
                      "only_if": { "predicate": "has_key",
                                   "when_unavailable": { "display": "grayed_out",
                                                         "message": "You have no key." } } }
                ]
            },
            "key_talk": {
                "text": "Ah, you found it!",
                "choices": [ { "text": "Goodbye.", "next": "farewell" } ]
            },
            "farewell": { "text": "Safe travels.", "type": "END_DIALOGUE" }
        }
    }"#
}

fn palaver() -> Command {
    Command::cargo_bin("palaver").unwrap()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_valid_template() {
    let dir = TempDir::new().unwrap();
    let path = write_template(&dir, "tavern.json", tavern_template());

    palaver()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 states"))
        .stdout(predicate::str::contains("1 guarded"));
}

#[test]
fn check_rejects_soft_lock() {
    let dir = TempDir::new().unwrap();
    let path = write_template(
        &dir,
        "loop.json",
        r#"{ "start_at": "a",
             "states": { "a": { "text": "x",
                                "choices": [ { "text": "loop", "next": "a" } ] } } }"#,
    );

    palaver()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no path to any terminal state"));
}

#[test]
fn check_rejects_choiceless_state() {
    let dir = TempDir::new().unwrap();
    let path = write_template(
        &dir,
        "stuck.json",
        r#"{ "start_at": "a", "states": { "a": { "text": "x", "choices": [] } } }"#,
    );

    palaver()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not terminal and has no choices"));
}

#[test]
fn check_reports_warnings_but_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = write_template(
        &dir,
        "guarded.json",
        r#"{ "start_at": "a",
             "states": {
                 "a": { "text": "gate",
                        "choices": [ { "text": "unlock", "next": "end",
                                       "only_if": { "predicate": "has_key" } } ] },
                 "end": { "type": "END_DIALOGUE" }
             } }"#,
    );

    palaver()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("guarded choices"))
        .stdout(predicate::str::contains("1 warning"));
}

#[test]
fn check_rejects_malformed_document() {
    let dir = TempDir::new().unwrap();
    let path = write_template(&dir, "broken.json", "{ not json");

    palaver().arg("check").arg(&path).assert().failure();
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[test]
fn show_lists_states_and_edges() {
    let dir = TempDir::new().unwrap();
    let path = write_template(&dir, "tavern.json", tavern_template());

    palaver()
        .arg("show")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("greeting"))
        .stdout(predicate::str::contains("-> farewell"))
        .stdout(predicate::str::contains("(if has_key)"))
        .stdout(predicate::str::contains("[end]"));
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_runs_to_the_terminal_state() {
    let dir = TempDir::new().unwrap();
    let path = write_template(&dir, "tavern.json", tavern_template());

    palaver()
        .arg("play")
        .arg(&path)
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Well met, stranger."))
        .stdout(predicate::str::contains("Safe travels."));
}

#[test]
fn play_honors_flags() {
    let dir = TempDir::new().unwrap();
    let path = write_template(&dir, "tavern.json", tavern_template());

    palaver()
        .arg("play")
        .arg(&path)
        .args(["--flag", "has_key"])
        .write_stdin("2\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ah, you found it!"));
}

#[test]
fn play_reports_locked_choice() {
    let dir = TempDir::new().unwrap();
    let path = write_template(&dir, "tavern.json", tavern_template());

    // Without the key the second entry is grayed out; picking it is refused
    // and the session keeps going until we leave politely.
    palaver()
        .arg("play")
        .arg(&path)
        .write_stdin("2\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("You have no key."))
        .stdout(predicate::str::contains("That choice is not available."))
        .stdout(predicate::str::contains("Safe travels."));
}

#[test]
fn play_set_command_unlocks_choice() {
    let dir = TempDir::new().unwrap();
    let path = write_template(&dir, "tavern.json", tavern_template());

    palaver()
        .arg("play")
        .arg(&path)
        .write_stdin("set has_key=true\n2\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ah, you found it!"));
}

#[test]
fn play_rejects_template_with_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_template(
        &dir,
        "loop.json",
        r#"{ "start_at": "a",
             "states": { "a": { "text": "x",
                                "choices": [ { "text": "loop", "next": "a" } ] } } }"#,
    );

    palaver()
        .arg("play")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("template rejected"));
}
