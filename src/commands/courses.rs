use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::error::Result;
use crate::types::COURSES;

/// List the course catalog students can enroll in
pub fn cmd_courses(as_json: bool) -> Result<()> {
    let text = COURSES
        .iter()
        .map(|c| format!("{} {c}", "-".dimmed()))
        .collect::<Vec<_>>()
        .join("\n");

    CommandOutput::new(json!({ "courses": COURSES }))
        .with_text(text)
        .print(as_json)
}
