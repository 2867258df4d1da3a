#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use jiff::{SignedDuration, Timestamp};
use serde_json::json;
use tempfile::TempDir;

/// Environment variables that would leak the developer's setup into a test
const SCRUBBED_ENV: &[&str] = &[
    "CAMPUS_STORE_URL",
    "CAMPUS_STORE_KEY",
    "CAMPUS_AUTH_API_KEY",
    "CAMPUS_LOG",
];

/// Helper struct to run campus commands in an isolated temp directory
pub struct CampusTest {
    pub temp_dir: TempDir,
    binary_path: PathBuf,
}

impl CampusTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        CampusTest {
            temp_dir,
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_campus")),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(&self.binary_path);
        for var in SCRUBBED_ENV {
            cmd.env_remove(var);
        }
        cmd.env("NO_COLOR", "1")
            .args(args)
            .current_dir(self.temp_dir.path())
            .output()
            .expect("Failed to execute campus command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn campus_dir(&self) -> PathBuf {
        self.temp_dir.path().join(".campus")
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.campus_dir().join("config.yaml"))
            .expect("Failed to read config file")
    }

    /// Write a session file as `auth login` would
    pub fn write_session(&self, email: &str, expires_in: SignedDuration) {
        fs::create_dir_all(self.campus_dir()).expect("Failed to create .campus directory");
        let session = json!({
            "uid": "test-uid",
            "email": email,
            "display_name": "Test Operator",
            "id_token": "id-token",
            "refresh_token": "refresh-token",
            "expires_at": (Timestamp::now() + expires_in).to_string(),
        });
        fs::write(
            self.campus_dir().join("session.json"),
            serde_json::to_string_pretty(&session).unwrap(),
        )
        .expect("Failed to write session file");
    }

    pub fn session_exists(&self) -> bool {
        self.campus_dir().join("session.json").exists()
    }
}
