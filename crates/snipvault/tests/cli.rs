// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs the built binary against a throwaway vault.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("vault.db");
        let config = format!(
            "[storage]\ndatabase_path = {:?}\n\n[logging]\nlevel = \"warn\"\n",
            db.to_string_lossy()
        );
        std::fs::write(dir.path().join("snipvault.toml"), config).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_snipvault"))
            .arg("--config")
            .arg(self.dir.path().join("snipvault.toml"))
            .args(args)
            .env_remove("RUST_LOG")
            .current_dir(self.dir.path())
            .output()
            .expect("run snipvault")
    }

    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "snipvault {args:?} failed (stderr={})",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

fn last_word(line: &str) -> String {
    line.split_whitespace().last().unwrap().to_string()
}

#[test]
fn new_show_rename_delete() {
    let sb = Sandbox::new();
    let created = sb.ok(&["new", "Hello World", "--code", "echo hi #ops"]);
    let id = last_word(&created);

    let shown = sb.ok(&["show", "@hello-world"]);
    assert!(shown.starts_with("Hello World (snippet, sh)"), "{shown}");
    assert!(shown.contains(&id));

    sb.ok(&["rename", &id, "hello.py"]);
    assert!(sb.ok(&["show", &id]).starts_with("hello.py (snippet, py)"));

    assert!(sb.ok(&["tags"]).starts_with("#ops"));
    sb.ok(&["delete", &id]);
    assert!(!sb.run(&["show", &id]).status.success());
    assert_eq!(sb.ok(&["list"]), "");
}

#[test]
fn export_import_and_backup() {
    let sb = Sandbox::new();
    sb.ok(&["new", "plan", "--project", "--code", "# Roadmap"]);
    let export_path = sb.path().join("export.json");
    sb.ok(&["export", "--output", export_path.to_str().unwrap()]);
    let json = std::fs::read_to_string(&export_path).unwrap();
    assert!(json.contains("\"exportDate\""));
    assert!(json.contains("\"type\": \"project\""));

    let backup_path = sb.path().join("backup.db");
    sb.ok(&["backup", backup_path.to_str().unwrap()]);
    assert!(backup_path.exists());

    let other = Sandbox::new();
    assert_eq!(
        other.ok(&["import", export_path.to_str().unwrap()]),
        "imported 1, skipped 0, failed 0\n"
    );
    assert!(other.ok(&["list", "--projects"]).contains("plan"));
}

#[test]
fn invalid_config_exits_non_zero() {
    let sb = Sandbox::new();
    std::fs::write(
        sb.path().join("snipvault.toml"),
        "[autosave]\nquiet_period_msx = 10\n",
    )
    .unwrap();
    let output = sb.run(&["list"]);
    assert!(!output.status.success());
}

#[test]
fn doctor_runs_without_opening_the_vault() {
    let sb = Sandbox::new();
    let out = sb.ok(&["doctor", "--plain"]);
    assert!(out.contains("[WARN] Database"));
    assert!(!sb.path().join("vault.db").exists());
}
