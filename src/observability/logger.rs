//! Markdown interaction log for agent questions and answers.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Logger for agent questions, run progress and answers.
///
/// This logger creates markdown-formatted log files, one section per event,
/// and echoes a one-line summary to the console.
#[derive(Debug)]
pub struct Logger {
    log_file: PathBuf,
    log_level: String,
}

impl Logger {
    /// Initialize logger.
    ///
    /// # Arguments
    /// * `log_file` - Path to log file. If None, creates a timestamped file in temp directory.
    /// * `log_level` - Logging level (defaults to "INFO").
    pub fn new(log_file: Option<&Path>, log_level: Option<&str>) -> Result<Self> {
        let log_file = match log_file {
            Some(p) => p.to_path_buf(),
            None => {
                let mut dir = std::env::temp_dir();
                dir.push("ragents-logs");
                std::fs::create_dir_all(&dir).with_context(|| {
                    format!("Failed to create log directory: {}", dir.display())
                })?;
                let filename = format!(
                    "ask_{}_{}.md",
                    Utc::now().timestamp_millis(),
                    std::process::id()
                );
                dir.join(filename)
            }
        };

        let log_level = log_level.unwrap_or("INFO").to_uppercase();

        // Ensure log directory exists
        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let logger = Self {
            log_file,
            log_level,
        };

        if !logger.log_file.exists() {
            logger.initialize_log_file()?;
        }

        Ok(logger)
    }

    /// Initialize the log file with header.
    fn initialize_log_file(&self) -> Result<()> {
        let mut file = File::create(&self.log_file)
            .with_context(|| format!("Failed to create log file: {}", self.log_file.display()))?;

        let now: DateTime<Utc> = Utc::now();

        writeln!(file, "# Agent Question Log\n")?;
        writeln!(file, "Log started: {}\n", now.to_rfc3339())?;
        writeln!(file, "---\n")?;

        Ok(())
    }

    /// Append content to log file.
    fn append_to_log(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {}", self.log_file.display()))?;

        write!(file, "{}", content).with_context(|| "Failed to write to log file")?;

        Ok(())
    }

    fn is_debug(&self) -> bool {
        self.log_level == "DEBUG"
    }

    /// Log a question sent to an agent.
    ///
    /// # Arguments
    /// * `agent` - Agent name.
    /// * `question` - User question.
    /// * `extra_instructions` - Optional per-call instructions.
    /// * `stream` - Whether the streaming path is used.
    pub fn log_question(
        &self,
        agent: &str,
        question: &str,
        extra_instructions: Option<&str>,
        stream: bool,
    ) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let mut content = format!(
            "## Question - {}\n\n**Agent:** {}\n**Mode:** {}\n\n**Question:**\n```\n{}\n```\n\n",
            now.to_rfc3339(),
            agent,
            if stream { "stream" } else { "poll" },
            question
        );
        if let Some(extra) = extra_instructions {
            content.push_str(&format!("**Extra instructions:**\n```\n{}\n```\n\n", extra));
        }

        self.append_to_log(&content)?;
        println!("INFO: Asking agent '{}'", agent);
        Ok(())
    }

    /// Log the answer returned for a question.
    ///
    /// Citation text is only written in DEBUG mode; otherwise just the count.
    pub fn log_answer(&self, agent: &str, answer: &str, citations: &[String]) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let citations_block = if citations.is_empty() {
            String::new()
        } else if self.is_debug() {
            let list: Vec<String> = citations.iter().map(|c| format!("- {}", c)).collect();
            format!("**Citations:**\n{}\n\n", list.join("\n"))
        } else {
            format!("**Citations:** {}\n\n", citations.len())
        };

        let content = format!(
            "### Answer - {}\n\n**Agent:** {}\n\n**Answer:**\n```\n{}\n```\n\n{}",
            now.to_rfc3339(),
            agent,
            answer,
            citations_block
        );

        self.append_to_log(&content)?;
        println!(
            "INFO: Answer from '{}' logged ({} citations)",
            agent,
            citations.len()
        );
        Ok(())
    }

    /// Log error with context.
    ///
    /// # Arguments
    /// * `error` - Error message.
    /// * `context` - Additional context information.
    pub fn log_error(
        &self,
        error: &str,
        context: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let mut content = format!(
            "### Error - {}\n\n**Error:** {}\n\n",
            now.to_rfc3339(),
            error
        );

        if let Some(ctx) = context {
            content.push_str(&format!(
                "**Context:** {}\n\n",
                serde_json::to_string_pretty(ctx).unwrap_or_default()
            ));
        }

        self.append_to_log(&content)?;
        eprintln!("ERROR: {}", error);
        Ok(())
    }

    /// Log custom content.
    ///
    /// # Arguments
    /// * `title` - Log entry title.
    /// * `content` - Log content.
    /// * `level` - Log level.
    pub fn log_custom(&self, title: &str, content: &str, level: Option<&str>) -> Result<()> {
        let level = level.unwrap_or("INFO");
        let now: DateTime<Utc> = Utc::now();
        let log_content = format!("### {} - {}\n\n{}\n\n", title, now.to_rfc3339(), content);

        self.append_to_log(&log_content)?;

        match level {
            "ERROR" => eprintln!("ERROR: {}: {}", title, content),
            "WARN" => println!("WARN: {}: {}", title, content),
            _ => println!("INFO: {}: {}", title, content),
        }

        Ok(())
    }

    /// Get the log file path.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Get the log level.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}
