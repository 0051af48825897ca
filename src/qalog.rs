//! Best-effort append-only log of question/answer exchanges.
//!
//! Each write opens, appends, and closes the file; no lock is held across
//! calls. The app's single call site discards the error branch, so a failed
//! write never reaches the user-visible flow.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::Local;

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "qa_log.txt";

/// Append one exchange to the log under `dir`, creating the directory on
/// first write.
pub fn append(dir: &Path, question: &str, answer: &str) -> Result<()> {
    fs::create_dir_all(dir)?;

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(dir.join(LOG_FILE))?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(file)?;
    writeln!(file, "{}", "=".repeat(50))?;
    writeln!(file, "Timestamp: {}", timestamp)?;
    writeln!(file, "Question: {}", question)?;
    writeln!(file, "Answer: {}", answer)?;
    Ok(())
}
