//! Segment classification over the token stream.
//!
//! A response is split into typed sections by header tokens; a question
//! token terminates accumulation for the whole response; a response
//! carrying a literal pipe table short-circuits to a single Table
//! segment so no narrative content is double-extracted from it.

use crate::table::find_table_block;
use crate::token::{tokenize, Token};
use storyflow_core::Phase;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    AttackPoint,
    TensionResolution,
    Conclusion,
    References,
    Table,
    Script,
    FollowUpQuestion,
    PlainText,
}

/// A classified span of one raw response, prior to structured extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub number: Option<u32>,
    pub headline: Option<String>,
    pub text: String,
}

impl Segment {
    fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            number: None,
            headline: None,
            text: text.into(),
        }
    }
}

/// Prior-turn facts the classification heuristics need.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyContext {
    /// How many attack points the session already holds.
    pub attack_point_count: usize,
    /// Where in the conversation flow the session currently is.
    pub phase: Phase,
}

#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// Minimum length for headerless text to be adopted as an implicit
    /// first attack point. A tunable heuristic, not a load-bearing
    /// constant.
    pub implicit_attack_min_chars: usize,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            implicit_attack_min_chars: 50,
        }
    }
}

/// Phrases that disqualify headerless text from implicit attack-point
/// adoption: they indicate the response is section language that lost
/// its header, not an opening narrative.
const SECTION_LANGUAGE: &[&str] = &["tension:", "resolution:", "tension-resolution", "references"];

fn looks_like_section_language(text: &str) -> bool {
    let lower = text.to_lowercase();
    SECTION_LANGUAGE.iter().any(|phrase| lower.contains(phrase))
}

#[derive(Debug)]
enum OpenSection {
    Attack { number: Option<u32> },
    Point { number: Option<u32>, headline: String },
    Conclusion,
    References,
    Preamble,
}

struct Accumulator {
    section: OpenSection,
    lines: Vec<String>,
}

impl Accumulator {
    fn close(self, segments: &mut Vec<Segment>) {
        let text = self.lines.join("\n").trim().to_string();
        if text.is_empty() {
            return;
        }
        let segment = match self.section {
            OpenSection::Attack { number } => Segment {
                kind: SegmentKind::AttackPoint,
                number,
                headline: None,
                text,
            },
            OpenSection::Point { number, headline } => Segment {
                kind: SegmentKind::TensionResolution,
                number,
                headline: (!headline.is_empty()).then_some(headline),
                text,
            },
            OpenSection::Conclusion => Segment::new(SegmentKind::Conclusion, text),
            OpenSection::References => Segment::new(SegmentKind::References, text),
            // Preamble text is resolved by the caller once it knows
            // whether any header was ever seen.
            OpenSection::Preamble => Segment::new(SegmentKind::PlainText, text),
        };
        segments.push(segment);
    }
}

/// Classify one raw response into typed segments.
pub fn classify(raw: &str, ctx: &ClassifyContext, opts: &ClassifyOptions) -> Vec<Segment> {
    // Table short-circuit: a table-bearing response yields exactly one
    // Table segment and nothing else.
    if let Some(block) = find_table_block(raw) {
        debug!("response carries a literal table, short-circuiting");
        return vec![Segment::new(SegmentKind::Table, block)];
    }

    let mut segments = Vec::new();
    let mut open: Option<Accumulator> = None;
    let mut saw_header = false;

    for token in tokenize(raw) {
        match token {
            Token::AttackHeader { number, rest } => {
                if let Some(acc) = open.take() {
                    acc.close(&mut segments);
                }
                saw_header = true;
                let mut acc = Accumulator {
                    section: OpenSection::Attack { number },
                    lines: Vec::new(),
                };
                if !rest.is_empty() {
                    acc.lines.push(rest);
                }
                open = Some(acc);
            }
            Token::PointHeader { number, headline } => {
                if let Some(acc) = open.take() {
                    acc.close(&mut segments);
                }
                saw_header = true;
                open = Some(Accumulator {
                    section: OpenSection::Point { number, headline },
                    lines: Vec::new(),
                });
            }
            Token::ConclusionHeader => {
                if let Some(acc) = open.take() {
                    acc.close(&mut segments);
                }
                saw_header = true;
                open = Some(Accumulator {
                    section: OpenSection::Conclusion,
                    lines: Vec::new(),
                });
            }
            Token::ReferencesHeader => {
                if let Some(acc) = open.take() {
                    acc.close(&mut segments);
                }
                saw_header = true;
                open = Some(Accumulator {
                    section: OpenSection::References,
                    lines: Vec::new(),
                });
            }
            Token::Question(text) => {
                if let Some(acc) = open.take() {
                    acc.close(&mut segments);
                }
                segments.push(Segment::new(SegmentKind::FollowUpQuestion, text));
                // Anything after a follow-up question is not content.
                break;
            }
            Token::Divider => {
                if let Some(acc) = open.take() {
                    acc.close(&mut segments);
                }
            }
            Token::Blank => {
                if let Some(acc) = open.as_mut() {
                    acc.lines.push(String::new());
                }
            }
            Token::Content(line) => {
                open.get_or_insert_with(|| Accumulator {
                    section: OpenSection::Preamble,
                    lines: Vec::new(),
                })
                .lines
                .push(line);
            }
        }
    }
    if let Some(acc) = open.take() {
        acc.close(&mut segments);
    }

    if !saw_header {
        resolve_headerless(&mut segments, ctx, opts);
    }

    segments
}

/// Decide what headerless preamble text is: a script (when one was just
/// requested), an implicit first attack point, or plain conversation.
fn resolve_headerless(segments: &mut Vec<Segment>, ctx: &ClassifyContext, opts: &ClassifyOptions) {
    for segment in segments.iter_mut() {
        if segment.kind != SegmentKind::PlainText {
            continue;
        }
        if matches!(ctx.phase, Phase::ScriptLength | Phase::Script) {
            segment.kind = SegmentKind::Script;
            continue;
        }
        if first_line_is_script_heading(&segment.text) {
            segment.kind = SegmentKind::Script;
            continue;
        }
        if ctx.attack_point_count == 0
            && segment.text.len() > opts.implicit_attack_min_chars
            && !looks_like_section_language(&segment.text)
        {
            debug!("adopting headerless text as implicit first attack point");
            segment.kind = SegmentKind::AttackPoint;
        }
    }
}

fn first_line_is_script_heading(text: &str) -> bool {
    text.lines()
        .next()
        .is_some_and(|l| l.trim_start().starts_with('#') && l.to_lowercase().contains("script"))
}
