//! Command results, as status lines or JSON.

use serde::Serialize;
use std::path::Path;
use wpmd_core::publish::PublishOutcome;

/// What a successful command reports back.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report {
    Post(PublishOutcome),
    File(FileOutput),
    Doctor(DoctorOutput),
}

#[derive(Debug, Serialize)]
pub struct FileOutput {
    pub file: String,
}

impl FileOutput {
    pub fn new(path: &Path) -> Self {
        Self { file: path.display().to_string() }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorOutput {
    pub path: String,
    pub profile: String,
    pub database: String,
    pub database_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<i64>,
    pub log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Report {
    /// `key: value` lines printed under the `OK` status line.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Report::Post(outcome) => {
                let mut lines = vec![
                    format!("ID: {}", outcome.id),
                    format!("file: {}", outcome.file.display()),
                ];
                if let Some(ref date) = outcome.date {
                    lines.push(format!("post_date: {date}"));
                }
                if !outcome.categories.is_empty() {
                    let ids: Vec<String> =
                        outcome.categories.iter().map(ToString::to_string).collect();
                    lines.push(format!("categories: {}", ids.join(", ")));
                }
                lines
            }
            Report::File(out) => vec![format!("file: {}", out.file)],
            Report::Doctor(d) => {
                let mut lines = vec![
                    format!("path: {}", d.path),
                    format!("profile: {}", d.profile),
                    format!("database: {}", d.database),
                ];
                match d.posts {
                    Some(n) => lines.push(format!("posts: {n}")),
                    None => lines.push("posts: (database not created yet)".to_string()),
                }
                lines.push(format!("logging.level: {}", d.log_level));
                if let Some(ref level) = d.log_file_level {
                    lines.push(format!("logging.file_level: {level}"));
                }
                if let Some(ref file) = d.log_file {
                    lines.push(format!("logging.file: {file}"));
                }
                lines
            }
        }
    }
}

pub fn print_json(report: &Report) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to encode JSON output: {e}"),
    }
}
