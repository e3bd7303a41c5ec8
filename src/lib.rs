pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use alignment::report::{BatchReport, FailureReason, ParagraphOutcome, UnmatchedReason};
pub use config::{AlignerConfig, InvertedSpanPolicy};
pub use error::AlignmentError;
pub use pipeline::batch::{BatchOptions, CancelToken};
pub use pipeline::builder::ParagraphAlignerBuilder;
pub use pipeline::runtime::ParagraphAligner;
pub use pipeline::traits::{ScoreFunction, SubtitleParser, Transcriber};
pub use types::{
    AudioInput, ChunkId, MatchChunk, Paragraph, ParagraphAlignment, ParagraphAlignmentWithWords,
    SegmentChunk, Transcript, WordChunk,
};
