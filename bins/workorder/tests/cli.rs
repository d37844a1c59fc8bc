use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Nothing listens on port 1, so API calls fail fast
const UNREACHABLE_API: &str = "http://127.0.0.1:1";

fn workorder(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("workorder").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env("PUBLIC_API_BASE_URL", UNREACHABLE_API)
        .env("WORKORDER_TIMEOUT_SECS", "5")
        .env_remove("PUBLIC_SUPABASE_URL")
        .env_remove("PUBLIC_SUPABASE_ANON_KEY")
        .env_remove("WORKORDER_EMAIL")
        .env_remove("WORKORDER_PASSWORD")
        .env_remove("WORKORDER_DEBUG")
        .env_remove("DEBUG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    workorder(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("orders"))
        .stdout(predicate::str::contains("geocode"))
        .stdout(predicate::str::contains("whoami"));
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    workorder(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("workorder "));
}

#[test]
fn empty_update_is_rejected_before_any_request() {
    let dir = TempDir::new().unwrap();
    workorder(&dir)
        .args(["orders", "update", "wo-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("nothing to update"));
}

#[test]
fn unknown_status_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    workorder(&dir)
        .args(["orders", "list", "--status", "sleeping"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown status"));
}

#[test]
fn geocode_requires_an_address() {
    let dir = TempDir::new().unwrap();
    workorder(&dir).arg("geocode").assert().code(2);
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    workorder(&dir)
        .args(["--config", "does-not-exist.toml", "health"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn unparsable_timeout_env_fails() {
    let dir = TempDir::new().unwrap();
    workorder(&dir)
        .env("WORKORDER_TIMEOUT_SECS", "abc")
        .arg("health")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"))
        .stderr(predicate::str::contains("WORKORDER_TIMEOUT_SECS must be a whole number"));
}

#[test]
fn invalid_base_url_in_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("workorder.toml"), "[api]\nbase_url = \"ftp://example.com\"\n").unwrap();
    workorder(&dir)
        .env_remove("PUBLIC_API_BASE_URL")
        .arg("health")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with http:// or https://"));
}

#[test]
fn health_reports_unreachable_api() {
    let dir = TempDir::new().unwrap();
    workorder(&dir)
        .args(["--format", "json", "health"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("[E5000]"));
}
