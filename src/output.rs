//! Output and color utilities for consistent terminal formatting
//!
//! Responses carry simple HTML markup for graphical front-ends; these
//! helpers flatten it for terminals and colorize respecting NO_COLOR.

use colored::Colorize;
use regex::Regex;

/// Check if colors should be used (respects NO_COLOR env var)
pub fn use_colors() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Flatten simple response markup for a terminal: line breaks become
/// newlines, remaining tags are stripped.
pub fn render_markup(text: &str) -> String {
    let with_breaks = text.replace("<br>", "\n").replace("<br/>", "\n");
    let tags = Regex::new(r"</?[a-zA-Z][^>]*>").expect("static tag pattern");
    let stripped = tags.replace_all(&with_breaks, "");
    stripped.replace("**", "").trim().to_string()
}

/// Colorize the bot response (normal text, bold)
pub fn colorize_response(text: &str, use_color: bool) -> String {
    if use_color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Colorize an autocomplete suggestion (cyan)
pub fn colorize_suggestion(text: &str, use_color: bool) -> String {
    if use_color {
        text.cyan().to_string()
    } else {
        text.to_string()
    }
}

/// Colorize the chat prompt marker (green)
pub fn colorize_prompt(text: &str, use_color: bool) -> String {
    if use_color {
        text.green().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_markup_flattens_breaks_and_tags() {
        let block = "<div style='x'><b>Veggie Burger</b><br>A patty<br><i>💰 350</i></div>";
        assert_eq!(render_markup(block), "Veggie Burger\nA patty\n💰 350");
    }

    #[test]
    fn render_markup_drops_bold_markers() {
        assert_eq!(
            render_markup("Welcome to **Java Restaurant**."),
            "Welcome to Java Restaurant."
        );
    }

    #[test]
    fn render_markup_leaves_plain_text_alone() {
        assert_eq!(render_markup("We accept cash."), "We accept cash.");
    }
}
