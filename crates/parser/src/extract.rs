//! Structured record extraction from classified segments.
//!
//! Extraction never fails: a missing sub-label degrades to an empty
//! field, and a conclusion that swallowed the references list is
//! repaired by splitting it back out.

use crate::classify::{classify, ClassifyContext, ClassifyOptions, Segment, SegmentKind};
use crate::normalize::normalize;
use crate::table::parse_table;
use regex::Regex;
use std::sync::LazyLock;
use storyflow_core::{OutlineTable, TensionResolutionPoint};
use tracing::warn;

/// Everything one raw backend response yielded, ready to apply to a
/// session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResponse {
    pub attack_point: Option<String>,
    pub points: Vec<TensionResolutionPoint>,
    pub conclusion: Option<String>,
    pub references: Option<String>,
    pub table: Option<OutlineTable>,
    pub script: Option<String>,
    pub follow_up: Option<String>,
    pub plain_text: Option<String>,
}

impl ParsedResponse {
    /// True when nothing beyond conversation came back.
    pub fn is_conversational(&self) -> bool {
        self.attack_point.is_none()
            && self.points.is_empty()
            && self.conclusion.is_none()
            && self.references.is_none()
            && self.table.is_none()
            && self.script.is_none()
    }
}

static TENSION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tension\s*:").expect("tension label"));
static RESOLUTION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)resolution\s*:").expect("resolution label"));
static REFERENCES_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*\**\s*references\s*\**\s*:?\s*$").expect("references marker"));

/// Classify and extract in one pass.
pub fn parse_response(raw: &str, ctx: &ClassifyContext, opts: &ClassifyOptions) -> ParsedResponse {
    extract(&classify(raw, ctx, opts))
}

/// Extract structured records from classified segments.
pub fn extract(segments: &[Segment]) -> ParsedResponse {
    let mut out = ParsedResponse::default();

    for segment in segments {
        match segment.kind {
            SegmentKind::AttackPoint => {
                let text = extract_attack_point(&segment.text);
                if text.is_empty() {
                    continue;
                }
                if out.attack_point.is_some() {
                    warn!("response carried more than one attack point, keeping the first");
                    continue;
                }
                out.attack_point = Some(text);
            }
            SegmentKind::TensionResolution => {
                out.points.push(extract_point(segment));
            }
            SegmentKind::Conclusion => {
                let (conclusion, spilled_references) = extract_conclusion(&segment.text);
                out.conclusion = Some(conclusion);
                if let Some(references) = spilled_references {
                    out.references.get_or_insert(references);
                }
            }
            SegmentKind::References => {
                out.references = Some(segment.text.trim().to_string());
            }
            SegmentKind::Table => {
                out.table = Some(parse_table(&segment.text));
            }
            SegmentKind::Script => {
                out.script = Some(segment.text.trim().to_string());
            }
            SegmentKind::FollowUpQuestion => {
                out.follow_up = Some(segment.text.trim().to_string());
            }
            SegmentKind::PlainText => {
                out.plain_text = Some(segment.text.trim().to_string());
            }
        }
    }

    out
}

/// Attack-point body: decoration stripped; a fully quote-wrapped
/// remainder is unwrapped (the header is then treated as implicit).
fn extract_attack_point(text: &str) -> String {
    let cleaned = normalize(text);
    strip_wrapping_quotes(&cleaned).to_string()
}

fn strip_wrapping_quotes(text: &str) -> &str {
    let pairs = [('"', '"'), ('\u{201c}', '\u{201d}'), ('\'', '\'')];
    for (open, close) in pairs {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            // Only unwrap a single matching pair: an interior quote of
            // the same kind means the leading quote closed early.
            if !inner.contains(open) && !inner.contains(close) {
                return inner.trim();
            }
        }
    }
    text
}

/// Split a tension-resolution body on its labels. An absent label
/// leaves its field empty.
fn extract_point(segment: &Segment) -> TensionResolutionPoint {
    let headline = segment
        .headline
        .as_deref()
        .map(headline_of)
        .unwrap_or_default();

    let body = segment.text.as_str();
    let tension_at = TENSION_LABEL.find(body);
    let resolution_at = RESOLUTION_LABEL.find(body);

    let tension = match (tension_at, resolution_at) {
        (Some(t), Some(r)) if r.start() > t.end() => body[t.end()..r.start()].trim().to_string(),
        (Some(t), _) => body[t.end()..].trim().to_string(),
        (None, _) => String::new(),
    };
    let resolution = match resolution_at {
        Some(r) => body[r.end()..].trim().to_string(),
        None => String::new(),
    };

    if tension.is_empty() && resolution.is_empty() {
        warn!("tension-resolution segment without labels, degrading to empty fields");
    }

    TensionResolutionPoint {
        headline,
        tension,
        resolution,
    }
}

/// The headline is the decorated header text up to the first colon.
fn headline_of(raw: &str) -> String {
    let cleaned = normalize(raw);
    match cleaned.split_once(':') {
        Some((head, _)) => head.trim().to_string(),
        None => cleaned,
    }
}

/// A conclusion whose body contains a references marker is split: the
/// marker and everything after it become the references blob.
fn extract_conclusion(text: &str) -> (String, Option<String>) {
    match REFERENCES_MARKER.find(text) {
        Some(m) => {
            let conclusion = text[..m.start()].trim().to_string();
            let references = text[m.end()..].trim().to_string();
            let references = (!references.is_empty()).then_some(references);
            (conclusion, references)
        }
        None => (text.trim().to_string(), None),
    }
}
