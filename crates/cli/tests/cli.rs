use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CORPUS: &str = r#"[
  {
    "id": "pink-bollworm",
    "title": "Pink bollworm management in cotton",
    "summary": "Install pheromone traps at 5 per acre and destroy rosette flowers.",
    "tags": ["cotton", "pest"],
    "languages": ["en", "mr"],
    "region": "Maharashtra",
    "source": "ICAR-CICR",
    "last_updated": "2024-06-15",
    "url": "https://cicr.org.in"
  },
  {
    "id": "wheat-rust",
    "title": "Yellow rust in wheat",
    "summary": "Spray propiconazole at first appearance of stripes.",
    "tags": ["wheat", "disease"],
    "languages": ["en", "hi"],
    "region": "Punjab",
    "source": "PAU Ludhiana",
    "last_updated": "2024-01-20"
  },
  {
    "id": "broken",
    "title": "Missing languages",
    "languages": [],
    "source": "nowhere",
    "last_updated": "2024-01-01"
  }
]"#;

#[allow(deprecated)]
fn kisan() -> Command {
    let mut cmd = Command::cargo_bin("kisan").expect("binary");
    cmd.env_remove("KISAN_CORPUS")
        .env_remove("KISAN_PROFILE")
        .env_remove("KISAN_HINTS")
        .env_remove("RUST_LOG");
    cmd
}

fn write_corpus(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("corpus.json");
    fs::write(&path, CORPUS).unwrap();
    path
}

#[test]
fn detect_prints_language_codes() {
    kisan()
        .args(["detect", "What is the MSP for wheat?"])
        .assert()
        .success()
        .stdout("en\n");

    kisan()
        .args(["detect", "गेहूं की फसल में क्या करें?"])
        .assert()
        .success()
        .stdout("hi\n");

    kisan()
        .args(["detect", "सोयाबीन"])
        .assert()
        .success()
        .stdout("mr\n");
}

#[test]
fn retrieve_prints_ranked_json() {
    let temp = tempdir().unwrap();
    let corpus = write_corpus(temp.path());

    let output = kisan()
        .arg("-q")
        .arg("retrieve")
        .arg("--corpus")
        .arg(&corpus)
        .args(["--tag", "cotton", "--region", "maharashtra", "--as-of", "2024-07-01"])
        .arg("How to control bollworm in cotton?")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let matches: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let matches = matches.as_array().expect("array");
    assert_eq!(matches[0]["id"], "pink-bollworm");
    assert_eq!(matches[0]["updated"], "2024-06-15T00:00:00Z");
    assert_eq!(matches[0]["signals"]["region"], 1.0);
    assert!(matches.iter().all(|m| m["id"] != "broken"));
}

#[test]
fn retrieve_reads_corpus_from_env_and_honours_limit() {
    let temp = tempdir().unwrap();
    let corpus = write_corpus(temp.path());

    let output = kisan()
        .env("KISAN_CORPUS", &corpus)
        .args(["retrieve", "--lang", "en", "--limit", "1", "crop advisory"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let matches: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(matches.as_array().unwrap().len(), 1);
}

#[test]
fn skipped_records_are_reported_on_stderr() {
    let temp = tempdir().unwrap();
    let corpus = write_corpus(temp.path());

    kisan()
        .arg("retrieve")
        .arg("--corpus")
        .arg(&corpus)
        .arg("bollworm")
        .assert()
        .success()
        .stderr(predicate::str::contains("broken"));
}

#[test]
fn context_prints_numbered_blocks() {
    let temp = tempdir().unwrap();
    let corpus = write_corpus(temp.path());

    kisan()
        .arg("-q")
        .arg("context")
        .arg("--corpus")
        .arg(&corpus)
        .args(["--tag", "wheat", "--as-of", "2024-07-01"])
        .arg("yellow rust spray")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "[1] Yellow rust in wheat\nSummary: Spray propiconazole at first appearance of stripes.\nSource: PAU Ludhiana\nLast updated: 2024-01-20",
        ));
}

#[test]
fn context_without_matches_prints_sentinel() {
    let temp = tempdir().unwrap();
    let corpus = write_corpus(temp.path());

    kisan()
        .arg("-q")
        .arg("context")
        .arg("--corpus")
        .arg(&corpus)
        .args(["--lang", "ta"])
        .arg("tractor subsidy")
        .assert()
        .success()
        .stdout("No references retrieved.\n");

    // Without --lang the detected language must not pull in unrelated entries
    kisan()
        .arg("-q")
        .arg("context")
        .arg("--corpus")
        .arg(&corpus)
        .arg("tractor subsidy")
        .assert()
        .success()
        .stdout("No references retrieved.\n");
}

#[test]
fn profile_overlay_is_applied() {
    let temp = tempdir().unwrap();
    let profile = temp.path().join("kharif.toml");
    fs::write(&profile, "[selection]\ndefault_limit = 2\n").unwrap();

    let output = kisan()
        .arg("profile")
        .arg("--profile")
        .arg(&profile)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "kharif");
    assert_eq!(json["selection"]["default_limit"], 2);
    assert_eq!(json["weights"]["lexical"], 0.5);
}

#[test]
fn invalid_profile_fails_with_path() {
    let temp = tempdir().unwrap();
    let profile = temp.path().join("bad.json");
    fs::write(&profile, r#"{"weights": {"lexicl": 1.0}}"#).unwrap();

    kisan()
        .arg("profile")
        .arg("--profile")
        .arg(&profile)
        .assert()
        .failure()
        .stderr(predicate::str::contains("weights.lexicl"));
}

#[test]
fn missing_corpus_fails() {
    kisan()
        .args(["retrieve", "--corpus", "/nonexistent/corpus.json", "anything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read corpus file"));
}
