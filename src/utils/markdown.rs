/// Utility functions for handling Telegram MarkdownV2 formatting
///
/// MarkdownV2 requires escaping of special characters to prevent formatting issues.
/// This module provides centralized functions for proper text escaping.
/// Escapes markdown special characters for MarkdownV2 parsing mode
///
/// This function escapes all characters that have special meaning in Telegram's
/// MarkdownV2 format to ensure they are displayed as literal text.
///
/// # Arguments
/// * `text` - The text to escape
///
/// # Returns
/// A string with all markdown special characters escaped with backslashes
///
/// # Example
/// ```
/// use lottery_bot::utils::markdown::escape_markdown;
///
/// let text = "Hello *world* (test)";
/// let escaped = escape_markdown(text);
/// assert_eq!(escaped, "Hello \\*world\\* \\(test\\)");
/// ```
pub fn escape_markdown(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('_', "\\_")
        .replace('*', "\\*")
        .replace('[', "\\[")
        .replace(']', "\\]")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace('~', "\\~")
        .replace('`', "\\`")
        .replace('>', "\\>")
        .replace('#', "\\#")
        .replace('+', "\\+")
        .replace('-', "\\-")
        .replace('=', "\\=")
        .replace('|', "\\|")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('.', "\\.")
        .replace('!', "\\!")
}

/// Escapes text placed inside an inline code span or a pre block, where only
/// backslashes and backticks are special.
pub fn escape_code(text: &str) -> String {
    text.replace('\\', "\\\\").replace('`', "\\`")
}

/// Bold, escaped text
pub fn bold(text: &str) -> String {
    format!("*{}*", escape_markdown(text))
}

/// Inline code span with escaped content
pub fn code(text: &str) -> String {
    format!("`{}`", escape_code(text))
}
