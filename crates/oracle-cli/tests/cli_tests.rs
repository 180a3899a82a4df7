//! End-to-end tests for the `redteamoracle` binary.
//!
//! Every test runs against a throwaway home, config and state directory with
//! the offline oracle pinned to a fixed doom probability, so no network and
//! no real lockout file is ever touched.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    /// Offline oracle that always denies (`doom = 1.0`) or always approves (`0.0`)
    fn new(doom: f64) -> Self {
        let home = TempDir::new().unwrap();
        fs::write(
            home.path().join("config.toml"),
            format!(
                "[oracle]\nprovider = \"offline\"\n\n[offline]\ndoom_probability = {}\nseed = 7\n",
                doom
            ),
        )
        .unwrap();
        Self { home }
    }

    fn state_dir(&self) -> PathBuf {
        self.home.path().join("state")
    }

    fn state_file(&self) -> PathBuf {
        self.state_dir().join("lockouts.json")
    }

    fn cmd(&self) -> Command {
        self.cmd_as("u1")
    }

    fn cmd_as(&self, identity: &str) -> Command {
        Command::from_std(self.std_cmd(identity))
    }

    /// Unwrapped command, for spawning several processes at once
    fn std_cmd(&self, identity: &str) -> std::process::Command {
        let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_redteamoracle"));
        cmd.env_clear()
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join("xdg"))
            .env("NO_COLOR", "1")
            .arg("--config")
            .arg(self.home.path().join("config.toml"))
            .arg("--state-dir")
            .arg(self.state_dir())
            .arg("--identity")
            .arg(identity);
        cmd
    }

    fn run_recon(&self) -> assert_cmd::assert::Assert {
        self.cmd()
            .args(["run", "recon", "--target", "example.com"])
            .assert()
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn concurrent_denials_leave_one_record_and_one_history_entry() {
    let sandbox = Sandbox::new(1.0);

    let children: Vec<_> = (0..6)
        .map(|_| {
            sandbox
                .std_cmd("u1")
                .args(["run", "recon", "--target", "x", "-p", "offline"])
                .stdout(std::process::Stdio::null())
                .stderr(std::process::Stdio::null())
                .spawn()
                .unwrap()
        })
        .collect();
    for mut child in children {
        assert_eq!(child.wait().unwrap().code(), Some(3));
    }

    let state = read_json(&sandbox.state_file());
    let lockouts = state["lockouts"].as_object().unwrap();
    assert_eq!(lockouts.len(), 1);
    assert!(lockouts.contains_key("u1"));
    assert_eq!(state["history"]["u1"], 1);

    let leftovers: Vec<_> = fs::read_dir(sandbox.state_dir())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[test]
fn version_and_help() {
    Command::cargo_bin("redteamoracle")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("redteamoracle"));

    Command::cargo_bin("redteamoracle")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("unlock").not());
}

#[test]
fn modules_lists_every_builtin() {
    let sandbox = Sandbox::new(1.0);
    let assert = sandbox.cmd().arg("modules").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for name in ["recon", "scan", "exploit", "osint"] {
        assert!(stdout.contains(name), "missing {name} in:\n{stdout}");
    }
    assert!(!sandbox.state_file().exists());
}

#[test]
fn denial_locks_out_and_blocks_the_next_run() {
    let sandbox = Sandbox::new(1.0);

    sandbox
        .run_recon()
        .code(3)
        .stdout(predicate::str::contains("THE ORACLE HAS SPOKEN"))
        .stdout(predicate::str::contains("Lockout expires:"));

    let state = read_json(&sandbox.state_file());
    assert_eq!(state["version"], 1);
    assert!(state["lockouts"]["u1"]["expires_at"].is_string());
    let before = fs::read(sandbox.state_file()).unwrap();

    sandbox
        .run_recon()
        .code(3)
        .stdout(predicate::str::contains("ACCESS DENIED"))
        .stdout(predicate::str::contains("Consulting").not());

    // The blocked attempt neither extended nor rewrote the lockout
    assert_eq!(fs::read(sandbox.state_file()).unwrap(), before);

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Locked"))
        .stdout(predicate::str::contains("Remaining: 23h"));
}

#[test]
fn approval_runs_the_module_without_a_lockout() {
    let sandbox = Sandbox::new(0.0);

    sandbox
        .cmd()
        .args(["run", "scan", "--target", "10.0.0.1", "--ports", "22,80,443"])
        .assert()
        .success()
        .stdout(predicate::str::contains("THE ORACLE SMILES UPON YOU"))
        .stdout(predicate::str::contains("10.0.0.1"));

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Eligible"));
}

#[test]
fn oracle_command_reports_the_verdict() {
    Sandbox::new(0.0)
        .cmd()
        .arg("oracle")
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline Oracle"));

    Sandbox::new(1.0).cmd().arg("oracle").assert().code(3);
}

#[test]
fn unknown_module_is_rejected_without_consulting() {
    let sandbox = Sandbox::new(1.0);
    sandbox
        .cmd()
        .args(["run", "teleport", "--target", "example.com"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("teleport"));
    assert!(!sandbox.state_file().exists());
}

#[test]
fn bad_port_spec_costs_no_lockout() {
    let sandbox = Sandbox::new(1.0);
    sandbox
        .cmd()
        .args(["run", "scan", "--target", "10.0.0.1", "--ports", "lots"])
        .assert()
        .code(2);
    assert!(!sandbox.state_file().exists());
}

#[test]
fn unknown_provider_is_a_config_error() {
    let sandbox = Sandbox::new(1.0);
    sandbox
        .cmd()
        .args(["--provider", "crystal-ball", "oracle"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("crystal-ball"));
    assert!(!sandbox.state_file().exists());
}

#[test]
fn cloud_provider_without_key_is_a_config_error() {
    let sandbox = Sandbox::new(1.0);
    sandbox
        .cmd()
        .args(["--provider", "cloud-a", "oracle"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
    assert!(!sandbox.state_file().exists());
}

#[test]
fn status_is_read_only() {
    let sandbox = Sandbox::new(1.0);

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Eligible"));
    assert!(!sandbox.state_dir().exists());

    sandbox.run_recon().code(3);
    let before = fs::read(sandbox.state_file()).unwrap();
    for _ in 0..3 {
        sandbox.cmd().arg("status").assert().success();
    }
    assert_eq!(fs::read(sandbox.state_file()).unwrap(), before);
}

#[test]
fn unlock_requires_confirmation() {
    let sandbox = Sandbox::new(1.0);
    sandbox.run_recon().code(3);

    sandbox.cmd().arg("unlock").assert().failure();
    sandbox
        .cmd()
        .arg("status")
        .assert()
        .stdout(predicate::str::contains("Status: Locked"));

    sandbox
        .cmd()
        .args(["unlock", "--confirm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lockout cleared for u1"));
    sandbox
        .cmd()
        .arg("status")
        .assert()
        .stdout(predicate::str::contains("Status: Eligible"));
}

#[test]
fn lockout_is_scoped_to_the_identity() {
    let sandbox = Sandbox::new(1.0);
    sandbox.run_recon().code(3);

    sandbox
        .cmd_as("u2")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Identity: u2"))
        .stdout(predicate::str::contains("Status: Eligible"));
}

#[test]
fn expired_lockout_no_longer_blocks() {
    let sandbox = Sandbox::new(0.0);
    fs::create_dir_all(sandbox.state_dir()).unwrap();
    fs::write(
        sandbox.state_file(),
        r#"{
  "version": 1,
  "lockouts": {
    "u1": {
      "identity": "u1",
      "reason": "It's not your day.",
      "issued_at": "2020-01-01T00:00:00Z",
      "expires_at": "2020-01-02T00:00:00Z"
    }
  },
  "history": { "u1": 1 }
}"#,
    )
    .unwrap();

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Eligible"));

    sandbox
        .run_recon()
        .success()
        .stdout(predicate::str::contains("THE ORACLE SMILES UPON YOU"));
}

#[test]
fn corrupt_state_fails_closed_until_reset() {
    let sandbox = Sandbox::new(0.0);
    fs::create_dir_all(sandbox.state_dir()).unwrap();
    fs::write(sandbox.state_file(), "{ definitely not json").unwrap();

    sandbox
        .run_recon()
        .code(3)
        .stdout(predicate::str::contains("ACCESS DENIED"))
        .stdout(predicate::str::contains("unlock --confirm --all"));

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Locked"));

    sandbox
        .cmd()
        .args(["unlock", "--confirm", "--all"])
        .assert()
        .success();

    sandbox
        .run_recon()
        .success()
        .stdout(predicate::str::contains("THE ORACLE SMILES UPON YOU"));
}

#[test]
fn unreachable_backend_degrades_to_a_denial() {
    let sandbox = Sandbox::new(0.0);

    // Nothing listens on the discard port; the fallback denies even though
    // the offline dice would have approved
    sandbox
        .cmd()
        .args([
            "--provider",
            "local-model",
            "--base-url",
            "http://127.0.0.1:9",
            "--timeout",
            "1",
        ])
        .args(["run", "recon", "--target", "example.com"])
        .assert()
        .code(4)
        .stdout(predicate::str::contains("Oracle degraded:"));

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .stdout(predicate::str::contains("Status: Locked"));
}
