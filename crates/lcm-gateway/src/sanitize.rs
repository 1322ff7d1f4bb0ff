//! Response sanitizer
//!
//! Model responses that should be raw code often arrive wrapped in a
//! fenced block, prefixed with prose, or both. `sanitize` recovers the
//! code text. The prose detector is a heuristic, not a parser: a line
//! counts as code-like when it carries an assignment, ends in a colon,
//! opens with a statement keyword, or is a `#` comment. Known failure
//! mode: prose that follows a leading comment line is kept, since
//! nothing is ever dropped after the first code-like line.

/// Keywords that open a Python statement
const STATEMENT_KEYWORDS: &[&str] = &[
    "import", "from", "def", "class", "if", "elif", "else", "for", "while", "try", "except",
    "finally", "with", "return", "yield", "raise", "pass", "break", "continue", "print", "assert",
    "del", "global", "nonlocal", "lambda", "async",
];

/// Strip formatting artifacts from a model response, keeping only code
///
/// Idempotent; empty and whitespace-only input is returned unchanged.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return raw.to_string();
    }
    let unfenced = strip_fences(raw);
    strip_preamble(&unfenced)
}

/// Remove fenced-block delimiters, keeping the enclosed text
fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let lines: Vec<&str> = trimmed.lines().collect();

    if let Some(open) = lines.iter().position(|l| is_fence(l)) {
        if let Some(close) = lines[open + 1..].iter().position(|l| is_fence(l)) {
            return lines[open + 1..open + 1 + close].join("\n");
        }
        if open == lines.len() - 1 {
            // Lone fence on the last line: a stray trailing delimiter
            return lines[..open].join("\n");
        }
        // Unclosed fence: drop the delimiter line, keep the rest
        return lines[open + 1..].join("\n");
    }

    // No fence line; strip stray delimiter tokens at the edges
    trimmed
        .trim_start_matches('`')
        .trim_end_matches('`')
        .trim()
        .to_string()
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Drop leading prose lines, keeping everything from the first
/// code-like line onward
fn strip_preamble(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    match lines.iter().position(|l| is_code_like(l)) {
        Some(start) => lines[start..].join("\n"),
        // Nothing code-like at all: do not guess, return as-is
        None => text.to_string(),
    }
}

fn is_code_like(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed.starts_with('#') || trimmed.starts_with('@') {
        return true;
    }
    if trimmed.ends_with(':') || trimmed.contains('=') {
        return true;
    }
    let first = trimmed.split_whitespace().next().unwrap_or("");
    STATEMENT_KEYWORDS.contains(&first)
}
