use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use crate::alignment::report::ParagraphOutcome;
use crate::types::Paragraph;

/// Shared flag checked by batch workers before each paragraph.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub max_workers: usize,
    pub cancel: CancelToken,
}

impl BatchOptions {
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_workers: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            cancel: CancelToken::new(),
        }
    }
}

/// Runs `align` over every paragraph on at most `max_workers` scoped threads
/// and returns the outcomes in input order. Paragraphs never started because
/// of cancellation are reported as cancelled.
///
/// `on_progress` runs on the calling thread, once per finished paragraph.
pub(crate) fn run_ordered<T, F, P>(
    paragraphs: &[Paragraph],
    options: &BatchOptions,
    align: F,
    mut on_progress: P,
) -> Vec<ParagraphOutcome<T>>
where
    T: Send,
    F: Fn(&Paragraph) -> ParagraphOutcome<T> + Sync,
    P: FnMut(&ParagraphOutcome<T>),
{
    let total = paragraphs.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = options.max_workers.clamp(1, total);
    let next = AtomicUsize::new(0);
    let mut slots: Vec<Option<ParagraphOutcome<T>>> = (0..total).map(|_| None).collect();

    thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let align = &align;
            let cancel = &options.cancel;
            scope.spawn(move || loop {
                if cancel.is_cancelled() {
                    break;
                }
                let idx = next.fetch_add(1, Ordering::Relaxed);
                if idx >= total {
                    break;
                }
                let outcome = align(&paragraphs[idx]);
                if tx.send((idx, outcome)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        for (idx, outcome) in rx {
            on_progress(&outcome);
            slots[idx] = Some(outcome);
        }
    });

    let finished = slots.iter().filter(|slot| slot.is_some()).count();
    if finished < total {
        tracing::info!(
            finished,
            skipped = total - finished,
            "batch: cancelled before all paragraphs were aligned"
        );
    }

    slots
        .into_iter()
        .zip(paragraphs)
        .map(|(slot, paragraph)| {
            slot.unwrap_or_else(|| ParagraphOutcome::cancelled(paragraph.index))
        })
        .collect()
}
