use crate::error::AlignmentError;
use crate::types::{AudioInput, SegmentChunk, Transcript};

/// Similarity between two texts, in [0, 1]. Must be deterministic.
pub trait ScoreFunction: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Speech recognition backend producing time-coded segments (and optionally
/// words) for a whole recording.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, audio: &AudioInput) -> Result<Transcript, AlignmentError>;
}

/// Subtitle reader producing segment-level chunks only.
pub trait SubtitleParser: Send + Sync {
    fn parse(&self, content: &[u8]) -> Result<Vec<SegmentChunk>, AlignmentError>;
}
