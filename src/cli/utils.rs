//! Shared output helpers for CLI commands

use colored::*;

use crate::orchestration::Answer;

/// Print an answer with its citation list.
pub fn print_answer(answer: &Answer) {
    println!("\n{}", "=== Answer ===".bold());
    println!("{}", answer.text);
    if !answer.citations.is_empty() {
        println!("\n{}", "=== Citations ===".bold());
        for citation in &answer.citations {
            println!("- {}", citation);
        }
    }
}

/// Display a user-friendly error message with suggestions
pub fn display_error_with_suggestions<E: std::fmt::Display>(error: &E, context: &str) {
    eprintln!("{} {}", "Error:".red().bold(), context);
    eprintln!("   {}", error.to_string().red());

    let error_str = error.to_string().to_lowercase();
    if error_str.contains("invalid agent") {
        eprintln!("{}", "Suggestions:".blue());
        eprintln!("   • Run 'ragents agents' to see registered agents");
    } else if error_str.contains("not set") {
        eprintln!("{}", "Suggestions:".blue());
        eprintln!("   • Export the API key or pass --env-file with a .env file");
    } else if error_str.contains("registry file") || error_str.contains("missing required key") {
        eprintln!("{}", "Suggestions:".blue());
        eprintln!("   • Check agent_ids.env / vector_store_ids.env next to your config");
        eprintln!("   • Use --agents-file to point at another registry file");
    } else if error_str.contains("connection") || error_str.contains("network") {
        eprintln!("{}", "Suggestions:".blue());
        eprintln!("   • Check your internet connection");
        eprintln!("   • Verify OPENAI_BASE_URL is reachable");
    }
}
