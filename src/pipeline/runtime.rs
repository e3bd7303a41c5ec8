use crate::alignment::report::{BatchReport, FailureReason, ParagraphOutcome, UnmatchedReason};
use crate::alignment::segment::{SegmentAligner, SegmentAlignment};
use crate::alignment::word::WordAligner;
use crate::config::{AlignerConfig, InvertedSpanPolicy};
use crate::error::AlignmentError;
use crate::pipeline::batch::{run_ordered, BatchOptions};
use crate::pipeline::traits::{SubtitleParser, Transcriber};
use crate::types::{
    AudioInput, MatchChunk, Paragraph, ParagraphAlignment, ParagraphAlignmentWithWords,
    SegmentChunk, Transcript,
};

pub struct ParagraphAligner {
    config: AlignerConfig,
    segment_aligner: SegmentAligner,
    word_aligner: WordAligner,
}

pub(crate) struct ParagraphAlignerParts {
    pub config: AlignerConfig,
    pub segment_aligner: SegmentAligner,
    pub word_aligner: WordAligner,
}

impl ParagraphAligner {
    pub(crate) fn from_parts(parts: ParagraphAlignerParts) -> Self {
        Self {
            config: parts.config,
            segment_aligner: parts.segment_aligner,
            word_aligner: parts.word_aligner,
        }
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Coarse segment pass followed by word-level refinement of both ends and
    /// collection of the words inside the final span.
    pub fn align_paragraph(
        &self,
        paragraph: &Paragraph,
        transcript: &Transcript,
    ) -> ParagraphOutcome<ParagraphAlignmentWithWords> {
        let coarse = match self.coarse_pass(
            paragraph,
            transcript.segments(),
            self.config.segment_search_words,
        ) {
            Ok(coarse) => coarse,
            Err(reason) => {
                return ParagraphOutcome::Unmatched {
                    paragraph_index: paragraph.index,
                    reason,
                }
            }
        };

        let (start, best_start_match) = match &coarse.start_match {
            Some(coarse_start) => self.refine_start(paragraph, transcript, coarse_start),
            None => (coarse.start, None),
        };
        let (end, best_end_match) = match &coarse.end_match {
            Some(coarse_end) => self.refine_end(paragraph, transcript, coarse_end),
            None => (coarse.end, None),
        };

        let (end, span_clamped) = match self.resolve_span(paragraph, start, end) {
            Ok(resolved) => resolved,
            Err(reason) => {
                return ParagraphOutcome::Failed {
                    paragraph_index: paragraph.index,
                    reason,
                }
            }
        };

        let paragraph_words = transcript.words_within(start, end);
        tracing::debug!(
            paragraph_index = paragraph.index,
            start,
            end,
            word_count = paragraph_words.len(),
            "orchestrator: paragraph aligned"
        );

        ParagraphOutcome::Matched {
            paragraph_index: paragraph.index,
            alignment: ParagraphAlignmentWithWords {
                alignment: ParagraphAlignment {
                    paragraph: paragraph.text.clone(),
                    start,
                    end,
                    best_start_match,
                    best_end_match,
                    span_clamped,
                },
                paragraph_index: paragraph.index,
                paragraph_words,
            },
        }
    }

    /// Segment-only alignment for chunks read from a subtitle file.
    pub fn align_subtitle_paragraph(
        &self,
        paragraph: &Paragraph,
        segments: &[SegmentChunk],
    ) -> ParagraphOutcome<ParagraphAlignment> {
        let coarse =
            match self.coarse_pass(paragraph, segments, self.config.subtitle_search_words) {
                Ok(coarse) => coarse,
                Err(reason) => {
                    return ParagraphOutcome::Unmatched {
                        paragraph_index: paragraph.index,
                        reason,
                    }
                }
            };

        let (end, span_clamped) = match self.resolve_span(paragraph, coarse.start, coarse.end) {
            Ok(resolved) => resolved,
            Err(reason) => {
                return ParagraphOutcome::Failed {
                    paragraph_index: paragraph.index,
                    reason,
                }
            }
        };

        ParagraphOutcome::Matched {
            paragraph_index: paragraph.index,
            alignment: ParagraphAlignment {
                paragraph: paragraph.text.clone(),
                start: coarse.start,
                end,
                best_start_match: coarse.start_match,
                best_end_match: coarse.end_match,
                span_clamped,
            },
        }
    }

    pub fn align_batch(
        &self,
        paragraphs: &[Paragraph],
        transcript: &Transcript,
        options: &BatchOptions,
    ) -> BatchReport<ParagraphAlignmentWithWords> {
        self.align_batch_with_progress(paragraphs, transcript, options, |_| {})
    }

    pub fn align_batch_with_progress(
        &self,
        paragraphs: &[Paragraph],
        transcript: &Transcript,
        options: &BatchOptions,
        on_progress: impl FnMut(&ParagraphOutcome<ParagraphAlignmentWithWords>),
    ) -> BatchReport<ParagraphAlignmentWithWords> {
        let outcomes = run_ordered(
            paragraphs,
            options,
            |paragraph| self.align_paragraph(paragraph, transcript),
            on_progress,
        );
        let report = BatchReport::from_outcomes(outcomes);
        log_batch_summary("transcript", &report);
        report
    }

    pub fn align_subtitle_batch(
        &self,
        paragraphs: &[Paragraph],
        segments: &[SegmentChunk],
        options: &BatchOptions,
    ) -> BatchReport<ParagraphAlignment> {
        self.align_subtitle_batch_with_progress(paragraphs, segments, options, |_| {})
    }

    pub fn align_subtitle_batch_with_progress(
        &self,
        paragraphs: &[Paragraph],
        segments: &[SegmentChunk],
        options: &BatchOptions,
        on_progress: impl FnMut(&ParagraphOutcome<ParagraphAlignment>),
    ) -> BatchReport<ParagraphAlignment> {
        let outcomes = run_ordered(
            paragraphs,
            options,
            |paragraph| self.align_subtitle_paragraph(paragraph, segments),
            on_progress,
        );
        let report = BatchReport::from_outcomes(outcomes);
        log_batch_summary("subtitles", &report);
        report
    }

    /// Transcribes once, then aligns every paragraph against the result.
    pub fn transcribe_and_align(
        &self,
        transcriber: &dyn Transcriber,
        audio: &AudioInput,
        paragraphs: &[Paragraph],
        options: &BatchOptions,
    ) -> Result<BatchReport<ParagraphAlignmentWithWords>, AlignmentError> {
        if paragraphs.is_empty() {
            return Ok(BatchReport::from_outcomes(Vec::new()));
        }
        let transcript = transcriber
            .transcribe(audio)
            .map_err(|e| AlignmentError::upstream("transcriber", e))?;
        if options.cancel.is_cancelled() {
            return Err(AlignmentError::Cancelled);
        }
        Ok(self.align_batch(paragraphs, &transcript, options))
    }

    /// Parses subtitles once, then aligns every paragraph against them.
    pub fn parse_and_align_subtitles(
        &self,
        parser: &dyn SubtitleParser,
        content: &[u8],
        paragraphs: &[Paragraph],
        options: &BatchOptions,
    ) -> Result<BatchReport<ParagraphAlignment>, AlignmentError> {
        if paragraphs.is_empty() {
            return Ok(BatchReport::from_outcomes(Vec::new()));
        }
        let segments = parser
            .parse(content)
            .map_err(|e| AlignmentError::upstream("subtitle parser", e))?;
        if options.cancel.is_cancelled() {
            return Err(AlignmentError::Cancelled);
        }
        Ok(self.align_subtitle_batch(paragraphs, &segments, options))
    }

    fn coarse_pass(
        &self,
        paragraph: &Paragraph,
        segments: &[SegmentChunk],
        search_words: usize,
    ) -> Result<SegmentAlignment, UnmatchedReason> {
        if paragraph.text.trim().is_empty() {
            return Err(UnmatchedReason::BlankParagraph);
        }
        if segments.is_empty() {
            return Err(UnmatchedReason::NoCandidates);
        }
        match self
            .segment_aligner
            .align(&paragraph.text, segments, search_words)
        {
            Some(coarse) if coarse.is_matched() => Ok(coarse),
            _ => Err(UnmatchedReason::NoSegmentMatch),
        }
    }

    /// Searches the words of the matched start segment and its predecessors.
    fn refine_start(
        &self,
        paragraph: &Paragraph,
        transcript: &Transcript,
        coarse: &MatchChunk,
    ) -> (f64, Option<MatchChunk>) {
        let last = coarse.candidate_index;
        let first = last.saturating_sub(self.config.lookback_segments);
        let words = transcript.words_in_segment_range(first, last);
        let refined =
            self.word_aligner
                .refine_start(&paragraph.text, &words, self.config.word_search_words);
        match self.gate(refined, "start") {
            Some(refined) => (refined.start, Some(refined)),
            None => (coarse.start, Some(coarse.clone())),
        }
    }

    /// Searches the words of the matched end segment and its successors.
    fn refine_end(
        &self,
        paragraph: &Paragraph,
        transcript: &Transcript,
        coarse: &MatchChunk,
    ) -> (f64, Option<MatchChunk>) {
        let first = coarse.candidate_index;
        let last = first.saturating_add(self.config.lookahead_segments);
        let words = transcript.words_in_segment_range(first, last);
        let refined =
            self.word_aligner
                .refine_end(&paragraph.text, &words, self.config.word_search_words);
        match self.gate(refined, "end") {
            Some(refined) => (refined.end, Some(refined)),
            None => (coarse.end, Some(coarse.clone())),
        }
    }

    fn gate(&self, refined: Option<MatchChunk>, side: &'static str) -> Option<MatchChunk> {
        let refined = refined?;
        let accepted = refined.score > self.config.confidence_threshold;
        tracing::debug!(
            side,
            window_id = %refined.id,
            score = refined.score,
            threshold = self.config.confidence_threshold,
            accepted,
            "orchestrator: word refinement"
        );
        accepted.then_some(refined)
    }

    /// Final end and whether it was clamped, or the failure under the reject
    /// policy.
    fn resolve_span(
        &self,
        paragraph: &Paragraph,
        start: f64,
        end: f64,
    ) -> Result<(f64, bool), FailureReason> {
        if end >= start {
            return Ok((end, false));
        }
        match self.config.inverted_span_policy {
            InvertedSpanPolicy::Clamp => {
                tracing::warn!(
                    paragraph_index = paragraph.index,
                    start,
                    end,
                    "orchestrator: end precedes start, clamping span"
                );
                Ok((start, true))
            }
            InvertedSpanPolicy::Reject => Err(FailureReason::InvertedSpan { start, end }),
        }
    }
}

fn log_batch_summary<T>(source: &'static str, report: &BatchReport<T>) {
    tracing::info!(
        source,
        total = report.counts.total,
        matched = report.counts.matched,
        unmatched = report.counts.unmatched,
        failed = report.counts.failed,
        "batch: alignment finished"
    );
}
