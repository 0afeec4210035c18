//! Line tokenizer for raw backend responses.
//!
//! Leaf patterns (header labels, question forms, dividers) live here as
//! regexes. Everything structural (which header wins, where a section
//! ends) is decided by the classifier over the token stream.

use regex::Regex;
use std::sync::LazyLock;

/// One line of a raw response, typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// "Attack Point #N" header, optionally with trailing text after a colon.
    AttackHeader {
        number: Option<u32>,
        rest: String,
    },
    /// "Tension-Resolution #N:" header; `headline` is the text after the label.
    PointHeader {
        number: Option<u32>,
        headline: String,
    },
    /// "Conclusion" or "Summary" header.
    ConclusionHeader,
    /// "References" header.
    ReferencesHeader,
    /// One of the known follow-up question forms.
    Question(String),
    /// A horizontal rule between sections.
    Divider,
    Blank,
    Content(String),
}

static ATTACK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^attack\s+point\s*(?:#\s*(\d+))?\s*(:)?\s*(.*)$").expect("attack header")
});

static POINT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^tension[-\s]resolution(?:\s+point)?\s*(?:#\s*(\d+))?\s*(:)?\s*(.*)$")
        .expect("point header")
});

static CONCLUSION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:conclusion|summary)\s*:?\s*$").expect("conclusion header"));

static REFERENCES_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^references\s*:?\s*$").expect("references header"));

/// The five question forms that terminate content accumulation.
static QUESTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:would you like|do you want|are you satisfied|what modifications|how long should)\b")
        .expect("question line")
});

static DIVIDER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-_]{3,}$").expect("divider line"));

/// Strip markdown emphasis so label matching sees the plain text.
fn plain(line: &str) -> String {
    line.replace('*', "").trim().to_string()
}

/// True for a line that is solely one of the known follow-up questions.
pub fn is_question_line(line: &str) -> bool {
    QUESTION_LINE.is_match(&plain(line))
}

/// True for a line that is solely an entity header ("Attack Point #N",
/// "Tension-Resolution #N"), with no trailing content.
pub fn is_entity_header_line(line: &str) -> bool {
    let plain = plain(line);
    let attack = ATTACK_HEADER
        .captures(&plain)
        .is_some_and(|c| c.get(3).map_or("", |m| m.as_str()).is_empty());
    let point = POINT_HEADER
        .captures(&plain)
        .is_some_and(|c| c.get(3).map_or("", |m| m.as_str()).is_empty());
    attack || point
}

fn classify_line(line: &str) -> Token {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Token::Blank;
    }
    let plain = plain(trimmed);

    if QUESTION_LINE.is_match(&plain) {
        return Token::Question(plain);
    }
    if DIVIDER_LINE.is_match(&plain) {
        return Token::Divider;
    }
    if CONCLUSION_HEADER.is_match(&plain) {
        return Token::ConclusionHeader;
    }
    if REFERENCES_HEADER.is_match(&plain) {
        return Token::ReferencesHeader;
    }

    // A header line must be the bare label, or carry its trailing text
    // after a colon. "Attack point analysis shows..." stays content.
    if let Some(caps) = ATTACK_HEADER.captures(&plain) {
        let number = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let colon = caps.get(2).is_some();
        let rest = caps.get(3).map_or("", |m| m.as_str()).trim().to_string();
        if rest.is_empty() || colon {
            return Token::AttackHeader { number, rest };
        }
    }
    if let Some(caps) = POINT_HEADER.captures(&plain) {
        let number = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let colon = caps.get(2).is_some();
        let headline = caps.get(3).map_or("", |m| m.as_str()).trim().to_string();
        if headline.is_empty() || colon {
            return Token::PointHeader { number, headline };
        }
    }

    Token::Content(line.trim_end().to_string())
}

/// Tokenize a raw response line by line.
pub fn tokenize(raw: &str) -> Vec<Token> {
    raw.lines().map(classify_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_attack_header() {
        let tokens = tokenize("Attack Point #1");
        assert_eq!(
            tokens,
            vec![Token::AttackHeader {
                number: Some(1),
                rest: String::new(),
            }]
        );
    }

    #[test]
    fn bold_attack_header_without_number() {
        let tokens = tokenize("**Attack Point:**");
        assert_eq!(
            tokens,
            vec![Token::AttackHeader {
                number: None,
                rest: String::new(),
            }]
        );
    }

    #[test]
    fn point_header_captures_number_and_headline() {
        let tokens = tokenize("**Tension-Resolution #2:** The Macrophage Dilemma");
        assert_eq!(
            tokens,
            vec![Token::PointHeader {
                number: Some(2),
                headline: "The Macrophage Dilemma".to_string(),
            }]
        );
    }

    #[test]
    fn tension_label_line_is_content_not_header() {
        let tokens = tokenize("Tension: X happens.");
        assert_eq!(tokens, vec![Token::Content("Tension: X happens.".to_string())]);
    }

    #[test]
    fn conclusion_and_references_headers() {
        assert_eq!(tokenize("**Conclusion**"), vec![Token::ConclusionHeader]);
        assert_eq!(tokenize("Summary:"), vec![Token::ConclusionHeader]);
        assert_eq!(tokenize("References"), vec![Token::ReferencesHeader]);
    }

    #[test]
    fn question_forms_are_recognized() {
        for line in [
            "Would you like to modify this Attack Point, create a new one, or move on to creating tension-resolution points?",
            "Do you want to use the currently selected Core Story Concept or provide a new one?",
            "Are you satisfied with this Attack Point or would you like another?",
            "What modifications would you like to make to the Attack Point?",
            "How long should the TED talk be (in minutes)?",
        ] {
            assert_eq!(tokenize(line).len(), 1);
            assert!(
                matches!(&tokenize(line)[0], Token::Question(_)),
                "not a question: {line}"
            );
        }
    }

    #[test]
    fn question_beats_header_even_when_it_mentions_one() {
        // The follow-up question names "Attack Point" mid-sentence.
        let tokens =
            tokenize("Would you like to modify this Attack Point, create a new one, or move on?");
        assert!(matches!(&tokens[0], Token::Question(_)));
    }

    #[test]
    fn divider_and_blank() {
        assert_eq!(tokenize("---"), vec![Token::Divider]);
        assert_eq!(tokenize("   "), vec![Token::Blank]);
    }

    #[test]
    fn sentence_starting_with_label_is_content() {
        let tokens = tokenize("Attack point analysis shows a gap in care.");
        assert!(matches!(&tokens[0], Token::Content(_)));
    }

    #[test]
    fn entity_header_line_detection() {
        assert!(is_entity_header_line("Attack Point #3"));
        assert!(is_entity_header_line("**Tension-Resolution #1**"));
        assert!(!is_entity_header_line("Attack Point #1 was striking in hindsight."));
        assert!(!is_entity_header_line("plain prose"));
    }
}
