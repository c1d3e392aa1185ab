use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_passman"))
}

struct Env {
    home: TempDir,
}

impl Env {
    fn new() -> Self {
        Env { home: TempDir::new().expect("temp home") }
    }

    fn store_path(&self) -> PathBuf {
        self.home.path().join("store.json")
    }

    fn run(&self, args: &[&str]) -> Output {
        let config_home = self.home.path().join("config");
        Command::new(bin())
            .args(["--file", self.store_path().to_str().unwrap()])
            .args(args)
            .current_dir(self.home.path())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", &config_home)
            .env_remove("RUST_LOG")
            .output()
            .expect("run passman")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "expected success, stderr: {}",
        stderr(output)
    );
}

fn assert_failure_with(output: &Output, needle: &str) {
    assert!(!output.status.success(), "expected failure, stdout: {}", stdout(output));
    let err = stderr(output);
    assert_eq!(err.lines().count(), 1, "expected a single error line, got: {:?}", err);
    assert!(err.contains(needle), "stderr {:?} should mention {:?}", err, needle);
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read store")).expect("store is JSON")
}

#[test]
fn init_add_get_round_trip() {
    let env = Env::new();
    assert_success(&env.run(&["init"]));

    let added = env.run(&["add", "Example.com", "alice", "secret"]);
    assert_success(&added);
    assert_eq!(stdout(&added), "Added: example.com (alice)\n");

    let got = env.run(&["get", "  EXAMPLE.COM "]);
    assert_success(&got);
    let text = stdout(&got);
    assert!(text.contains("username: alice\n"), "got {}", text);
    assert!(text.contains("password: secret\n"), "got {}", text);

    let doc = read_json(&env.store_path());
    assert_eq!(doc["metadata"]["count"], 1);
    assert_eq!(doc["entries"]["example.com"]["username"], "alice");
}

#[test]
fn missing_store_fails_with_hint() {
    let env = Env::new();
    assert_failure_with(&env.run(&["list"]), "Run 'init' first");
}

#[test]
fn duplicate_add_fails_and_keeps_file() {
    let env = Env::new();
    assert_success(&env.run(&["init"]));
    assert_success(&env.run(&["add", "site.com", "u", "p"]));
    let before = fs::read_to_string(env.store_path()).unwrap();

    assert_failure_with(&env.run(&["add", "SITE.com", "u2", "p2"]), "already exists");
    assert_eq!(fs::read_to_string(env.store_path()).unwrap(), before);
}

#[test]
fn update_and_delete_flow() {
    let env = Env::new();
    assert_success(&env.run(&["init"]));
    assert_success(&env.run(&["add", "site.com", "alice", "secret"]));

    assert_failure_with(&env.run(&["update", "site.com"]), "nothing to update");
    assert_failure_with(&env.run(&["update", "other.com", "--password", "x"]), "no entry found for 'other.com'");

    assert_success(&env.run(&["update", "site.com", "--username", "bob"]));
    let doc = read_json(&env.store_path());
    assert_eq!(doc["entries"]["site.com"]["username"], "bob");
    assert_eq!(doc["entries"]["site.com"]["password"], "secret");
    assert_eq!(doc["metadata"]["count"], 1);

    assert_success(&env.run(&["delete", "site.com"]));
    let got = env.run(&["get", "site.com"]);
    assert_success(&got);
    assert_eq!(stdout(&got), "No entry found for site.com\n");
    assert_failure_with(&env.run(&["delete", "site.com"]), "no entry found");
}

#[test]
fn schema_violation_is_reported() {
    let env = Env::new();
    fs::write(
        env.store_path(),
        r#"{"metadata": {"version": 1, "created_at": "a", "updated_at": "b"}, "entries": {}}"#,
    )
    .unwrap();
    assert_failure_with(&env.run(&["stats"]), "metadata missing 'count'");

    fs::write(env.store_path(), "not json at all").unwrap();
    assert_failure_with(&env.run(&["stats"]), "corrupted");
}

#[test]
fn search_list_and_export() {
    let env = Env::new();
    assert_success(&env.run(&["init"]));
    assert_success(&env.run(&["add", "gitlab.com", "bob", "pw"]));
    assert_success(&env.run(&["add", "github.com", "al", "pw"]));

    assert_eq!(stdout(&env.run(&["search", "git"])), "github.com\ngitlab.com\n");
    assert_eq!(stdout(&env.run(&["search", "al"])), "github.com\n");

    let listing = stdout(&env.run(&["list"]));
    let sites: Vec<&str> = listing
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(sites, vec!["github.com", "gitlab.com"]);

    let csv_path = env.home.path().join("out.csv");
    let exported = env.run(&["export", "--out", csv_path.to_str().unwrap()]);
    assert_success(&exported);
    assert!(stdout(&exported).starts_with("Exported 2 entries to "));
    let csv = fs::read_to_string(&csv_path).unwrap();
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows[0], "site,username,password,last_updated");
    assert!(rows[1].starts_with("gitlab.com,bob,pw,"));
    assert!(rows[2].starts_with("github.com,al,pw,"));
}
