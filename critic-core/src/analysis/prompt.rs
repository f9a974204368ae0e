//! Review prompt template
//!
//! The template uses `{{VARIABLE}}` placeholders, rendered per file.

/// System message sent ahead of every review
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant for code reviews.";

const REVIEW_PROMPT: &str = include_str!("prompts/review.md");

/// Render the review instructions for one language
pub fn render_review_prompt(language: &str) -> String {
    REVIEW_PROMPT.replace("{{LANGUAGE}}", language)
}

/// Build the user message: instructions, a blank line, then the file
pub fn build_user_message(language: &str, content: &str) -> String {
    format!("{}\n\n{}", render_review_prompt(language), content)
}
