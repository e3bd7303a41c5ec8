use std::fmt;

use serde::Serialize;

use crate::error::AlignmentError;
use crate::types::{ParagraphAlignment, ParagraphAlignmentWithWords};

/// Read access to the span part of an alignment result.
pub trait AsParagraphAlignment {
    fn as_alignment(&self) -> &ParagraphAlignment;
}

impl AsParagraphAlignment for ParagraphAlignment {
    fn as_alignment(&self) -> &ParagraphAlignment {
        self
    }
}

impl AsParagraphAlignment for ParagraphAlignmentWithWords {
    fn as_alignment(&self) -> &ParagraphAlignment {
        &self.alignment
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    BlankParagraph,
    NoCandidates,
    NoSegmentMatch,
}

impl UnmatchedReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlankParagraph => "blank paragraph",
            Self::NoCandidates => "no candidate segments",
            Self::NoSegmentMatch => "no segment match",
        }
    }
}

/// Why a paragraph that reached alignment produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// Refined end precedes the refined start under the reject policy.
    InvertedSpan { start: f64, end: f64 },
    /// The batch was cancelled before the paragraph started.
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedSpan { start, end } => {
                write!(f, "inverted span: end {end:.3}s precedes start {start:.3}s")
            }
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParagraphOutcome<T> {
    Matched {
        paragraph_index: usize,
        alignment: T,
    },
    Unmatched {
        paragraph_index: usize,
        reason: UnmatchedReason,
    },
    Failed {
        paragraph_index: usize,
        reason: FailureReason,
    },
}

impl<T> ParagraphOutcome<T> {
    pub fn paragraph_index(&self) -> usize {
        match self {
            Self::Matched {
                paragraph_index, ..
            }
            | Self::Unmatched {
                paragraph_index, ..
            }
            | Self::Failed {
                paragraph_index, ..
            } => *paragraph_index,
        }
    }

    pub fn alignment(&self) -> Option<&T> {
        match self {
            Self::Matched { alignment, .. } => Some(alignment),
            _ => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub(crate) fn cancelled(paragraph_index: usize) -> Self {
        Self::Failed {
            paragraph_index,
            reason: FailureReason::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub total: u32,
    pub matched: u32,
    pub unmatched: u32,
    pub failed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchScoreSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<ScoreSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<ScoreSummary>,
    /// Paragraphs whose refined end preceded their start, whether clamped
    /// or rejected.
    pub inverted_span_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport<T> {
    pub counts: BatchCounts,
    pub scores: MatchScoreSummary,
    /// One entry per input paragraph, in input order.
    pub outcomes: Vec<ParagraphOutcome<T>>,
}

impl<T: AsParagraphAlignment> BatchReport<T> {
    pub fn from_outcomes(outcomes: Vec<ParagraphOutcome<T>>) -> Self {
        let mut counts = BatchCounts {
            total: to_u32(outcomes.len()),
            ..BatchCounts::default()
        };
        for outcome in &outcomes {
            match outcome {
                ParagraphOutcome::Matched { .. } => counts.matched += 1,
                ParagraphOutcome::Unmatched { .. } => counts.unmatched += 1,
                ParagraphOutcome::Failed { .. } => counts.failed += 1,
            }
        }
        let scores = summarize_scores(&outcomes);
        Self {
            counts,
            scores,
            outcomes,
        }
    }

    pub fn alignments(&self) -> impl Iterator<Item = &T> {
        self.outcomes.iter().filter_map(ParagraphOutcome::alignment)
    }

    /// All-or-nothing view: every alignment in input order, or an error for
    /// the first paragraph that did not match.
    pub fn into_strict(self) -> Result<Vec<T>, AlignmentError> {
        self.outcomes
            .into_iter()
            .map(|outcome| match outcome {
                ParagraphOutcome::Matched { alignment, .. } => Ok(alignment),
                ParagraphOutcome::Unmatched {
                    paragraph_index,
                    reason,
                } => Err(AlignmentError::Unaligned {
                    paragraph_index,
                    reason: reason.as_str().to_string(),
                }),
                ParagraphOutcome::Failed {
                    reason: FailureReason::Cancelled,
                    ..
                } => Err(AlignmentError::Cancelled),
                ParagraphOutcome::Failed {
                    paragraph_index,
                    reason,
                } => Err(AlignmentError::Unaligned {
                    paragraph_index,
                    reason: reason.to_string(),
                }),
            })
            .collect()
    }
}

fn summarize_scores<T: AsParagraphAlignment>(
    outcomes: &[ParagraphOutcome<T>],
) -> MatchScoreSummary {
    let mut start_scores = Vec::new();
    let mut end_scores = Vec::new();
    let mut inverted_span_count = 0u32;
    for outcome in outcomes {
        let alignment = match outcome {
            ParagraphOutcome::Matched { alignment, .. } => alignment.as_alignment(),
            ParagraphOutcome::Failed {
                reason: FailureReason::InvertedSpan { .. },
                ..
            } => {
                inverted_span_count += 1;
                continue;
            }
            _ => continue,
        };
        if let Some(m) = &alignment.best_start_match {
            start_scores.push(m.score);
        }
        if let Some(m) = &alignment.best_end_match {
            end_scores.push(m.score);
        }
        if alignment.span_clamped {
            inverted_span_count += 1;
        }
    }
    MatchScoreSummary {
        start: summary_or_none(&start_scores),
        end: summary_or_none(&end_scores),
        inverted_span_count,
    }
}

fn summary_or_none(values: &[f64]) -> Option<ScoreSummary> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(ScoreSummary { mean, min, max })
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
