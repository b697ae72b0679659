//! Frontend log command

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use weddingwall_core::{AppError, CommandError};

/// Frontend log file for today.
fn get_frontend_log_path(log_dir: &Path) -> PathBuf {
    std::fs::create_dir_all(log_dir).ok();

    let date = Local::now().format("%Y-%m-%d");
    log_dir.join(format!("frontend.{}.log", date))
}

/// Append a presentation-layer log line.
pub fn log_frontend(
    log_dir: &Path,
    level: &str,
    message: &str,
    context: Option<serde_json::Value>,
) -> Result<(), CommandError> {
    let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f");
    let context_str = context.map(|c| format!(" {}", c)).unwrap_or_default();
    let log_line = format!(
        "{} [{}] {}{}\n",
        timestamp,
        level.to_uppercase(),
        message,
        context_str
    );

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(get_frontend_log_path(log_dir))
        .map_err(|e| CommandError::from(AppError::Io(e)))?;
    file.write_all(log_line.as_bytes())
        .map_err(|e| CommandError::from(AppError::Io(e)))?;
    Ok(())
}
