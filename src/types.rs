use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AlignmentError;

/// Identifier of a transcript chunk. Treated as opaque by the aligners:
/// neighbor lookups go through segment positions, never through the id value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkId {
    Index(u64),
    Key(String),
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(idx) => write!(f, "{idx}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

impl From<u64> for ChunkId {
    fn from(value: u64) -> Self {
        Self::Index(value)
    }
}

impl From<&str> for ChunkId {
    fn from(value: &str) -> Self {
        Self::Key(value.to_string())
    }
}

impl From<String> for ChunkId {
    fn from(value: String) -> Self {
        Self::Key(value)
    }
}

/// A piece of text with a time span in seconds.
pub trait TimedChunk {
    fn id(&self) -> &ChunkId;
    fn text(&self) -> &str;
    fn start(&self) -> f64;
    fn end(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentChunk {
    pub id: ChunkId,
    pub text: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordChunk {
    pub id: ChunkId,
    pub segment_id: ChunkId,
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl TimedChunk for SegmentChunk {
    fn id(&self) -> &ChunkId {
        &self.id
    }
    fn text(&self) -> &str {
        &self.text
    }
    fn start(&self) -> f64 {
        self.start
    }
    fn end(&self) -> f64 {
        self.end
    }
}

impl TimedChunk for WordChunk {
    fn id(&self) -> &ChunkId {
        &self.id
    }
    fn text(&self) -> &str {
        &self.text
    }
    fn start(&self) -> f64 {
        self.start
    }
    fn end(&self) -> f64 {
        self.end
    }
}

/// Winner of a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchChunk {
    pub id: ChunkId,
    pub text: String,
    pub start: f64,
    pub end: f64,
    /// Similarity in [0, 1].
    pub score: f64,
    /// Position of the winner in the list it was selected from: the segment
    /// position for segment matches, the window's first word within the
    /// searched neighborhood for word-window matches. Internal bookkeeping,
    /// not part of the serialized form.
    #[serde(skip)]
    pub candidate_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphAlignment {
    pub paragraph: String,
    pub start: f64,
    pub end: f64,
    pub best_start_match: Option<MatchChunk>,
    pub best_end_match: Option<MatchChunk>,
    /// The refined end preceded the start and was clamped to it.
    #[serde(default)]
    pub span_clamped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphAlignmentWithWords {
    #[serde(flatten)]
    pub alignment: ParagraphAlignment,
    pub paragraph_index: usize,
    pub paragraph_words: Vec<WordChunk>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub index: usize,
    pub text: String,
}

impl Paragraph {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Numbers paragraphs by their position in `texts`.
    pub fn from_texts<I, S>(texts: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Self::new(index, text))
            .collect()
    }
}

/// Decoded audio handed to a [`crate::Transcriber`].
#[derive(Debug, Clone)]
pub struct AudioInput {
    pub sample_rate_hz: u32,
    pub samples: Vec<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TranscriptParts {
    segments: Vec<SegmentChunk>,
    #[serde(default)]
    words: Vec<WordChunk>,
}

/// Read-only snapshot of one transcription: ordered segments plus the
/// words they own, indexed by segment position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "TranscriptParts")]
pub struct Transcript {
    segments: Vec<SegmentChunk>,
    words: Vec<WordChunk>,
    #[serde(skip)]
    words_by_segment: Vec<Vec<usize>>,
}

impl Transcript {
    pub fn new(
        segments: Vec<SegmentChunk>,
        words: Vec<WordChunk>,
    ) -> Result<Self, AlignmentError> {
        let mut positions: HashMap<&ChunkId, usize> = HashMap::with_capacity(segments.len());
        for (pos, segment) in segments.iter().enumerate() {
            if positions.insert(&segment.id, pos).is_some() {
                return Err(AlignmentError::invalid_input(format!(
                    "duplicate segment id '{}'",
                    segment.id
                )));
            }
        }

        let mut words_by_segment = vec![Vec::new(); segments.len()];
        let mut kept = Vec::with_capacity(words.len());
        let mut orphaned = 0usize;
        for word in words {
            match positions.get(&word.segment_id) {
                Some(&pos) => {
                    words_by_segment[pos].push(kept.len());
                    kept.push(word);
                }
                None => orphaned += 1,
            }
        }
        if orphaned > 0 {
            tracing::warn!(
                orphaned,
                "transcript: dropped words referencing unknown segments"
            );
        }

        Ok(Self {
            segments,
            words: kept,
            words_by_segment,
        })
    }

    pub fn from_segments(segments: Vec<SegmentChunk>) -> Result<Self, AlignmentError> {
        Self::new(segments, Vec::new())
    }

    pub fn segments(&self) -> &[SegmentChunk] {
        &self.segments
    }

    pub fn words(&self) -> &[WordChunk] {
        &self.words
    }

    pub fn has_words(&self) -> bool {
        !self.words.is_empty()
    }

    /// Words owned by the segments at positions `first..=last`, in segment
    /// order. Positions past the end of the transcript are ignored.
    pub fn words_in_segment_range(&self, first: usize, last: usize) -> Vec<WordChunk> {
        if self.segments.is_empty() || first >= self.segments.len() {
            return Vec::new();
        }
        let last = last.min(self.segments.len() - 1);
        self.words_by_segment[first..=last]
            .iter()
            .flatten()
            .map(|&idx| self.words[idx].clone())
            .collect()
    }

    /// Words whose whole span lies inside `[start, end]`.
    pub fn words_within(&self, start: f64, end: f64) -> Vec<WordChunk> {
        self.words
            .iter()
            .filter(|w| w.start >= start && w.end <= end)
            .cloned()
            .collect()
    }
}

impl TryFrom<TranscriptParts> for Transcript {
    type Error = AlignmentError;

    fn try_from(parts: TranscriptParts) -> Result<Self, Self::Error> {
        Self::new(parts.segments, parts.words)
    }
}
