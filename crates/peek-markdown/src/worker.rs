// Background render worker: Markdown is rendered off the event loop and the
// result is picked up by a later loop turn.

use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use peek_core::{MarkdownEngine, RenderError};

/// A finished render, tagged with the sequence number `submit` returned.
#[derive(Debug)]
pub struct RenderOutcome {
    pub seq: u64,
    pub html: Result<String, RenderError>,
}

struct RenderRequest {
    seq: u64,
    text: String,
}

pub struct RenderWorker {
    requests: Option<mpsc::Sender<RenderRequest>>,
    results: mpsc::Receiver<RenderOutcome>,
    /// Submissions that could not reach the worker thread.
    failed: VecDeque<RenderOutcome>,
    next_seq: u64,
    in_flight: usize,
    handle: Option<JoinHandle<()>>,
}

impl RenderWorker {
    /// Start the worker thread with `engine`.
    pub fn spawn<E>(engine: E) -> io::Result<Self>
    where
        E: MarkdownEngine + Send + 'static,
    {
        let (req_tx, req_rx) = mpsc::channel::<RenderRequest>();
        let (res_tx, res_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("peek-render".into())
            .spawn(move || {
                while let Ok(req) = req_rx.recv() {
                    let html = panic::catch_unwind(AssertUnwindSafe(|| engine.render(&req.text)))
                        .unwrap_or_else(|_| {
                            Err(RenderError::Engine("markdown engine panicked".into()))
                        });
                    if res_tx.send(RenderOutcome { seq: req.seq, html }).is_err() {
                        break;
                    }
                }
                log::debug!("render worker exiting");
            })?;

        Ok(Self {
            requests: Some(req_tx),
            results: res_rx,
            failed: VecDeque::new(),
            next_seq: 0,
            in_flight: 0,
            handle: Some(handle),
        })
    }

    /// Queue `text` for rendering and return its sequence number. Sequence
    /// numbers increase with every call.
    pub fn submit(&mut self, text: String) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.in_flight += 1;

        let sent = match &self.requests {
            Some(tx) => tx.send(RenderRequest { seq, text }).is_ok(),
            None => false,
        };
        if !sent {
            log::warn!("render worker unavailable; dropping render #{}", seq);
            self.failed.push_back(RenderOutcome {
                seq,
                html: Err(RenderError::WorkerGone),
            });
        }
        seq
    }

    /// Sequence number of the most recent submission (0 before any).
    pub fn latest_seq(&self) -> u64 {
        self.next_seq
    }

    /// Number of submissions whose outcome has not been collected yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn try_recv(&mut self) -> Option<RenderOutcome> {
        let outcome = match self.failed.pop_front() {
            Some(outcome) => Some(outcome),
            None => self.results.try_recv().ok(),
        };
        self.collect(outcome)
    }

    /// Wait up to `timeout` for the next outcome.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<RenderOutcome> {
        if let Some(outcome) = self.failed.pop_front() {
            return self.collect(Some(outcome));
        }
        let outcome = self.results.recv_timeout(timeout).ok();
        self.collect(outcome)
    }

    fn collect(&mut self, outcome: Option<RenderOutcome>) -> Option<RenderOutcome> {
        if outcome.is_some() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        outcome
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        // Closing the request channel lets the thread fall out of its loop.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarkdownRenderer;

    const WAIT: Duration = Duration::from_secs(5);

    struct Exploding;

    impl MarkdownEngine for Exploding {
        fn render(&self, text: &str) -> Result<String, RenderError> {
            if text == "boom" {
                panic!("boom");
            }
            Ok(text.to_uppercase())
        }
    }

    #[test]
    fn outcomes_arrive_in_submission_order() {
        let mut worker = RenderWorker::spawn(MarkdownRenderer::new()).unwrap();
        let a = worker.submit("# one".into());
        let b = worker.submit("# two".into());
        assert!(b > a);
        assert_eq!(worker.latest_seq(), b);

        let first = worker.recv_timeout(WAIT).unwrap();
        assert_eq!(first.seq, a);
        assert!(first.html.unwrap().contains("one"));
        let second = worker.recv_timeout(WAIT).unwrap();
        assert_eq!(second.seq, b);
        assert_eq!(worker.in_flight(), 0);
    }

    #[test]
    fn engine_panic_becomes_error_and_worker_survives() {
        let mut worker = RenderWorker::spawn(Exploding).unwrap();
        worker.submit("boom".into());
        let failed = worker.recv_timeout(WAIT).unwrap();
        assert!(matches!(failed.html, Err(RenderError::Engine(_))));

        worker.submit("ok".into());
        assert_eq!(worker.recv_timeout(WAIT).unwrap().html.unwrap(), "OK");
    }

    #[test]
    fn try_recv_is_empty_when_idle() {
        let mut worker = RenderWorker::spawn(MarkdownRenderer::new()).unwrap();
        assert!(worker.try_recv().is_none());
        assert_eq!(worker.in_flight(), 0);
    }
}
