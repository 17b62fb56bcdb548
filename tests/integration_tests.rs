//! Integration tests for the qcdesk binary
//!
//! These run the CLI end to end without a QC server: everything here either
//! stays local or fails before the first request.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a qcdesk Command isolated in `dir`
fn qcdesk(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("qcdesk");
    cmd.current_dir(dir.path())
        .env_remove("QCDESK_API_URL")
        .env_remove("QCDESK_TIMEOUT_SECS")
        .env_remove("RUST_LOG")
        .arg("--session-dir")
        .arg(dir.path().join("state"))
        .arg("--config")
        .arg(dir.path().join("qcdesk.toml"));
    cmd
}

fn write_session(dir: &TempDir, role: &str) {
    let state = dir.path().join("state");
    fs::create_dir_all(&state).unwrap();
    let session = serde_json::json!({
        "token": "tok-1",
        "user": { "id": "u1", "name": "Sari", "email": "sari@plant.test", "role": role }
    });
    fs::write(state.join("session.json"), session.to_string()).unwrap();
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_qcdesk_help() {
        let dir = TempDir::new().unwrap();
        qcdesk(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("ipqc"))
            .stdout(predicate::str::contains("oqc"));
    }

    #[test]
    fn test_qcdesk_version() {
        let dir = TempDir::new().unwrap();
        qcdesk(&dir).arg("--version").assert().success();
    }

    #[test]
    fn test_ipqc_all_pass_conflicts_with_after() {
        let dir = TempDir::new().unwrap();
        write_session(&dir, "IPQC");
        qcdesk(&dir)
            .args(["ipqc", "submit", "--product", "OR-12", "--all-pass", "--after", "3"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be used with"));
    }

    #[test]
    fn test_unknown_shift_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_session(&dir, "IPQC");
        qcdesk(&dir)
            .args(["ipqc", "entries", "--shift", "S4"])
            .assert()
            .failure();
    }
}

// =============================================================================
// Config Tests
// =============================================================================

mod config {
    use super::*;

    #[test]
    fn test_config_init_creates_file() {
        let dir = TempDir::new().unwrap();
        qcdesk(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created qcdesk.toml"));

        let content = fs::read_to_string(dir.path().join("qcdesk.toml")).unwrap();
        assert!(content.contains("[api]"));
        assert!(content.contains("base_url"));
    }

    #[test]
    fn test_config_init_twice_keeps_existing() {
        let dir = TempDir::new().unwrap();
        qcdesk(&dir).args(["config", "init"]).assert().success();
        qcdesk(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_config_show_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        qcdesk(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No qcdesk.toml found"))
            .stdout(predicate::str::contains("[defaults]"));
    }

    #[test]
    fn test_config_show_reports_api_url_flag() {
        let dir = TempDir::new().unwrap();
        qcdesk(&dir)
            .args(["--api-url", "http://qc.plant.test/api", "config"])
            .assert()
            .success()
            .stdout(predicate::str::contains("http://qc.plant.test/api"));
    }

    #[test]
    fn test_config_validate_flags_bad_values() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("qcdesk.toml"),
            "[api]\nbase_url = \"qc.local\"\ntimeout_secs = 0\n",
        )
        .unwrap();
        qcdesk(&dir)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration warnings"))
            .stdout(predicate::str::contains("timeout_secs is 0"));
    }

    #[test]
    fn test_config_validate_default_is_valid() {
        let dir = TempDir::new().unwrap();
        qcdesk(&dir).args(["config", "init"]).assert().success();
        qcdesk(&dir)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration is valid"));
    }
}

// =============================================================================
// Session Tests
// =============================================================================

mod session {
    use super::*;

    #[test]
    fn test_whoami_without_session_fails() {
        let dir = TempDir::new().unwrap();
        qcdesk(&dir)
            .arg("whoami")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not logged in"));
    }

    #[test]
    fn test_whoami_reads_stored_session() {
        let dir = TempDir::new().unwrap();
        write_session(&dir, "OQC");
        qcdesk(&dir)
            .arg("whoami")
            .assert()
            .success()
            .stdout(predicate::str::contains("sari@plant.test"))
            .stdout(predicate::str::contains("OQC"));
    }

    #[test]
    fn test_login_rejects_invalid_email() {
        let dir = TempDir::new().unwrap();
        qcdesk(&dir)
            .args(["login", "--email", "not-an-email", "--password", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("valid email"));
    }

    #[test]
    fn test_logout_removes_session() {
        let dir = TempDir::new().unwrap();
        write_session(&dir, "IPQC");
        qcdesk(&dir).arg("logout").assert().success();
        assert!(!dir.path().join("state/session.json").exists());
        qcdesk(&dir).arg("whoami").assert().failure();
    }

    #[test]
    fn test_corrupt_session_counts_as_logged_out() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state");
        fs::create_dir_all(&state).unwrap();
        fs::write(state.join("session.json"), "{not json").unwrap();
        qcdesk(&dir)
            .arg("whoami")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not logged in"));
    }
}

// =============================================================================
// Role Guard Tests
// =============================================================================

mod guards {
    use super::*;

    #[test]
    fn test_ipqc_entries_requires_login() {
        let dir = TempDir::new().unwrap();
        qcdesk(&dir)
            .args(["ipqc", "entries"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not logged in"));
    }

    #[test]
    fn test_oqc_user_cannot_open_ipqc() {
        let dir = TempDir::new().unwrap();
        write_session(&dir, "OQC");
        qcdesk(&dir)
            .args(["ipqc", "entries"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("may not use this command"));
    }

    #[test]
    fn test_products_are_admin_only() {
        let dir = TempDir::new().unwrap();
        write_session(&dir, "MASTER");
        qcdesk(&dir)
            .args(["products", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("may not use this command"));
    }
}
