//! Shared environment configuration for all pokercoach binaries.
//!
//! Consolidates `POKERCOACH_BASE_PATH`, `POKERCOACH_PORT`, `GEMINI_API_KEY`,
//! `POKERCOACH_AI_TIMEOUT_MS`, and `POKERCOACH_PROGRESS_FILE` reads shared by
//! the server and content-validation binaries.

use std::path::PathBuf;
use std::time::Duration;

/// Read `POKERCOACH_BASE_PATH` (default `"."`), chdir, print path. Exits on failure.
///
/// Content catalogs and the progress snapshot are resolved relative to this
/// directory (`data/scenarios.json`, `data/lessons.json`, ...).
pub fn init_base_path() -> PathBuf {
    let base_path = std::env::var("POKERCOACH_BASE_PATH").unwrap_or_else(|_| ".".to_string());
    println!("POKERCOACH_BASE_PATH={}", base_path);
    let path = PathBuf::from(&base_path);
    if std::env::set_current_dir(&base_path).is_err() {
        eprintln!("Failed to change directory to {}", base_path);
        std::process::exit(1);
    }
    if let Ok(cwd) = std::env::current_dir() {
        println!("Working directory: {}", cwd.display());
    }
    path
}

/// Read `POKERCOACH_PORT` (default 8080).
pub fn server_port() -> u16 {
    std::env::var("POKERCOACH_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080)
}

/// Read `GEMINI_API_KEY`. `None` means the server runs with canned feedback.
pub fn gemini_api_key() -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
}

/// Read `POKERCOACH_AI_TIMEOUT_MS` (default 12000).
///
/// Upper bound on a single feedback-provider call. Expiry counts as a
/// feedback failure, never as a scoring failure.
pub fn feedback_timeout() -> Duration {
    let ms = std::env::var("POKERCOACH_AI_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(12_000u64);
    Duration::from_millis(ms)
}

/// Read `POKERCOACH_PROGRESS_FILE` (default `data/progress.json`).
pub fn progress_file() -> PathBuf {
    std::env::var("POKERCOACH_PROGRESS_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/progress.json"))
}
