// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `snipvault doctor` command implementation.
//!
//! Runs diagnostic checks against the configured vault to find configuration
//! and database problems before they show up as failed saves.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use snipvault_config::model::SnipvaultConfig;
use snipvault_core::SnipvaultError;
use snipvault_storage::Database;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `snipvault doctor` command.
///
/// With `--deep`, also runs `PRAGMA integrity_check`. With `--plain`, disables
/// colored output.
pub async fn run_doctor(
    config: &SnipvaultConfig,
    deep: bool,
    plain: bool,
) -> Result<(), SnipvaultError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = collect_checks(config, deep).await;

    println!();
    println!("  snipvault doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", render_line(result, use_color));
    }
    println!();

    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
        if !deep {
            println!("  Run with --deep for detailed diagnostics.");
        }
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

async fn collect_checks(config: &SnipvaultConfig, deep: bool) -> Vec<CheckResult> {
    let db_path = &config.storage.database_path;
    let mut results = vec![check_autosave(config), check_database(db_path).await];
    if deep {
        results.push(check_db_integrity(db_path).await);
        results.push(check_db_size(db_path));
    }
    results
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal().to_string()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow().to_string()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red().to_string()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// The config already validated; this reports what autosave will do.
fn check_autosave(config: &SnipvaultConfig) -> CheckResult {
    let start = Instant::now();
    let autosave = &config.autosave;
    if autosave.enabled {
        CheckResult::new(
            "Autosave",
            CheckStatus::Pass,
            format!("on, {}ms quiet period", autosave.quiet_period_ms),
            start,
        )
    } else {
        CheckResult::new("Autosave", CheckStatus::Warn, "disabled", start)
    }
}

/// Open the database and confirm both record tables exist.
async fn check_database(db_path: &str) -> CheckResult {
    let start = Instant::now();
    if !Path::new(db_path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first run)"),
            start,
        );
    }

    let db = match Database::open(db_path).await {
        Ok(db) => db,
        Err(e) => {
            let message = format!("open failed: {e}");
            return CheckResult::new("Database", CheckStatus::Fail, message, start);
        }
    };
    let counts = db
        .connection()
        .call(|conn| -> Result<(i64, i64), rusqlite::Error> {
            let snippets = conn.query_row("SELECT COUNT(*) FROM snippets", [], |row| row.get(0))?;
            let projects = conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
            Ok((snippets, projects))
        })
        .await;

    match counts {
        Ok((snippets, projects)) => CheckResult::new(
            "Database",
            CheckStatus::Pass,
            format!("{snippets} snippets, {projects} projects"),
            start,
        ),
        Err(e) => {
            let message = format!("query failed: {e}");
            CheckResult::new("Database", CheckStatus::Fail, message, start)
        }
    }
}

/// Deep check: SQLite integrity check.
async fn check_db_integrity(db_path: &str) -> CheckResult {
    let start = Instant::now();
    if !Path::new(db_path).exists() {
        return CheckResult::new(
            "DB integrity",
            CheckStatus::Warn,
            "database not found (skipped)",
            start,
        );
    }

    let db = match Database::open(db_path).await {
        Ok(db) => db,
        Err(e) => {
            let message = format!("open failed: {e}");
            return CheckResult::new("DB integrity", CheckStatus::Fail, message, start);
        }
    };
    match db.integrity_check().await {
        Ok(lines) if lines.len() == 1 && lines[0] == "ok" => {
            CheckResult::new("DB integrity", CheckStatus::Pass, "ok", start)
        }
        Ok(lines) => CheckResult::new(
            "DB integrity",
            CheckStatus::Fail,
            format!("{} issue(s) found", lines.len()),
            start,
        ),
        Err(e) => {
            let message = format!("check failed: {e}");
            CheckResult::new("DB integrity", CheckStatus::Fail, message, start)
        }
    }
}

/// Deep check: size of the database file on disk.
fn check_db_size(db_path: &str) -> CheckResult {
    let start = Instant::now();
    match std::fs::metadata(db_path) {
        Ok(meta) => {
            let size_mb = meta.len() as f64 / (1024.0 * 1024.0);
            CheckResult::new("DB size", CheckStatus::Pass, format!("{size_mb:.1} MB"), start)
        }
        Err(e) => {
            let message = format!("cannot access: {e}");
            CheckResult::new("DB size", CheckStatus::Warn, message, start)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(path: &Path) -> SnipvaultConfig {
        let mut config = SnipvaultConfig::default();
        config.storage.database_path = path.to_string_lossy().into_owned();
        config
    }

    #[tokio::test]
    async fn missing_database_warns() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_database(dir.path().join("absent.db").to_str().unwrap()).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("not found"));
        assert!(!dir.path().join("absent.db").exists());
    }

    #[tokio::test]
    async fn existing_vault_reports_counts_and_integrity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");
        Database::open(path.to_str().unwrap())
            .await
            .unwrap()
            .close()
            .await
            .unwrap();

        let results = collect_checks(&config_for(&path), true).await;
        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Autosave", "Database", "DB integrity", "DB size"]);
        assert!(results.iter().all(|r| r.status == CheckStatus::Pass));
        assert_eq!(results[1].message, "0 snippets, 0 projects");
    }

    #[test]
    fn disabled_autosave_is_a_warning() {
        let mut config = SnipvaultConfig::default();
        config.autosave.enabled = false;
        assert_eq!(check_autosave(&config).status, CheckStatus::Warn);
    }

    #[test]
    fn plain_lines_carry_a_status_tag() {
        let result = CheckResult {
            name: "Database".to_string(),
            status: CheckStatus::Fail,
            message: "open failed".to_string(),
            duration: Duration::from_millis(3),
        };
        let line = render_line(&result, false);
        assert!(line.contains("[FAIL]"));
        assert!(line.ends_with("open failed (3ms)"));
    }
}
