// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_kb(root: &Path) {
    fs::write(
        root.join("restaurant_kb.json"),
        r#"[
            {"Name / Question": "Veggie Burger", "Details / Answer": "A grilled veggie patty",
             "Price_KES": "350", "Estimated_Prep_Time_mins": "10", "Tags_Dietary_Info": "Vegetarian"},
            {"Name / Question": "Pizza Margherita", "Details / Answer": "Wood-fired pizza",
             "Price_KES": "700", "Estimated_Prep_Time_mins": "15"}
        ]"#,
    )
    .expect("write kb");
}

fn write_dummy_embeddings_config(root: &Path) {
    fs::write(
        root.join(".faqdeskrc.toml"),
        r#"
[embeddings]
provider = "dummy"
"#,
    )
    .expect("write config");
}

fn faqdesk() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("faqdesk"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn ask_keyword_route_prints_fixed_answer() {
    let dir = TempDir::new().expect("tempdir");
    write_kb(dir.path());
    write_dummy_embeddings_config(dir.path());

    faqdesk()
        .current_dir(dir.path())
        .args(["ask", "what time do you close"])
        .assert()
        .success()
        .stdout(predicate::str::contains("We are open daily from 9 AM to 11 PM."));
}

#[test]
fn ask_menu_renders_knowledge_base_items() {
    let dir = TempDir::new().expect("tempdir");
    write_kb(dir.path());
    write_dummy_embeddings_config(dir.path());

    faqdesk()
        .current_dir(dir.path())
        .args(["ask", "show me the menu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Veggie Burger"))
        .stdout(predicate::str::contains("Pizza Margherita"))
        .stdout(predicate::str::contains("350"));
}

#[test]
fn ask_records_the_interaction() {
    let dir = TempDir::new().expect("tempdir");
    write_kb(dir.path());
    write_dummy_embeddings_config(dir.path());

    faqdesk()
        .current_dir(dir.path())
        .args(["ask", "do you deliver"])
        .assert()
        .success();

    let log = fs::read_to_string(dir.path().join(".faqdesk/interactions.csv")).expect("log file");
    let mut lines = log.lines();
    assert_eq!(
        lines.next().unwrap(),
        "timestamp,user_message,bot_response,confidence"
    );
    let row = lines.next().expect("one record");
    assert!(row.contains("do you deliver"));
    assert!(row.ends_with("1.0"));
}

#[test]
fn ask_gibberish_gets_generic_fallback() {
    let dir = TempDir::new().expect("tempdir");
    write_kb(dir.path());
    write_dummy_embeddings_config(dir.path());

    // The dummy provider embeds everything to zero vectors, so nothing
    // clears the suggestion floor.
    faqdesk()
        .current_dir(dir.path())
        .args(["ask", "asdkjhasd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Try asking about menu items"))
        .stdout(predicate::str::contains("Did you mean").not());
}

#[test]
fn ask_json_reports_confidence() {
    let dir = TempDir::new().expect("tempdir");
    write_kb(dir.path());
    write_dummy_embeddings_config(dir.path());

    let assert = faqdesk()
        .current_dir(dir.path())
        .args(["--format", "json", "ask", "hello"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let payload: Value = serde_json::from_str(&stdout).expect("json payload");
    assert_eq!(payload["confidence"], 1.0);
    assert!(payload["response"]
        .as_str()
        .expect("response string")
        .contains("Welcome"));
}

#[test]
fn suggest_is_case_insensitive() {
    let dir = TempDir::new().expect("tempdir");
    write_kb(dir.path());
    write_dummy_embeddings_config(dir.path());

    let upper = faqdesk()
        .current_dir(dir.path())
        .args(["suggest", "PIZ"])
        .assert()
        .success();
    let lower = faqdesk()
        .current_dir(dir.path())
        .args(["suggest", "piz"])
        .assert()
        .success();

    let upper_out = upper.get_output().stdout.clone();
    let lower_out = lower.get_output().stdout.clone();
    assert_eq!(upper_out, lower_out);
    assert!(String::from_utf8(lower_out)
        .expect("utf8")
        .contains("Pizza Margherita"));
}

#[test]
fn suggest_does_not_log() {
    let dir = TempDir::new().expect("tempdir");
    write_kb(dir.path());
    write_dummy_embeddings_config(dir.path());

    faqdesk()
        .current_dir(dir.path())
        .args(["suggest", "piz"])
        .assert()
        .success();

    assert!(!dir.path().join(".faqdesk/interactions.csv").exists());
}

#[test]
fn prepare_creates_and_reuses_the_cache() {
    let dir = TempDir::new().expect("tempdir");
    write_kb(dir.path());
    write_dummy_embeddings_config(dir.path());

    faqdesk()
        .current_dir(dir.path())
        .args(["prepare"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Prepared"));

    let cache_path = dir.path().join(".faqdesk/embeddings.sqlite");
    assert!(cache_path.exists());

    faqdesk()
        .current_dir(dir.path())
        .args(["prepare", "--force"])
        .assert()
        .success();
    assert!(cache_path.exists());
}

#[test]
fn missing_knowledge_base_fails_with_configuration_error() {
    let dir = TempDir::new().expect("tempdir");
    write_dummy_embeddings_config(dir.path());

    faqdesk()
        .current_dir(dir.path())
        .args(["ask", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no knowledge base found"));
}

#[test]
fn csv_source_serves_when_json_is_absent() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("restaurant_kb.csv"),
        "Name / Question,Details / Answer,Price_KES\nChicken Wings,Spicy grilled wings,450\n",
    )
    .expect("write csv kb");
    write_dummy_embeddings_config(dir.path());

    faqdesk()
        .current_dir(dir.path())
        .args(["ask", "menu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Chicken Wings"));
}
