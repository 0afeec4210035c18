//! Decoration stripping for extracted text.
//!
//! Pure and a fixed point after one pass: anything not recognized as
//! decoration passes through unchanged.

use crate::token::{is_entity_header_line, is_question_line};
use regex::Regex;
use std::sync::LazyLock;

static ROLE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:expert\s*:\s*)+").expect("role prefix"));

/// Strip conversational and formatting noise from a raw text block:
/// role prefixes, emphasis markers, per-line leading colon/dash
/// decoration and trailing colons, bare entity-header lines, and
/// follow-up question lines.
pub fn normalize(raw: &str) -> String {
    let mut lines = Vec::new();
    for line in raw.lines() {
        let cleaned = clean_line(line);
        if is_entity_header_line(&cleaned) || is_question_line(&cleaned) {
            continue;
        }
        lines.push(cleaned);
    }

    // Drop leading/trailing blank lines introduced by removed decoration.
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

fn clean_line(line: &str) -> String {
    let no_emphasis = line.replace('*', "");
    let no_role = ROLE_PREFIX.replace(no_emphasis.trim(), "");
    no_role
        .trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
        .trim_end_matches(|c: char| c == ':' || c.is_whitespace())
        .to_string()
}
