use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc::{self, RecvTimeoutError},
    },
    thread::JoinHandle,
    time::Duration,
};

use anyhow::Context as _;

use crate::foundation::error::{TraitforgeError, TraitforgeResult};

/// Text-to-text SVG minifier run on the optimizer thread.
pub trait Minifier: Send + 'static {
    /// Minified form of `svg`.
    fn minify(&mut self, svg: &str) -> TraitforgeResult<String>;
}

/// Re-serializes through `usvg`, which drops comments, unused defs and redundant attributes.
#[derive(Clone, Copy, Debug, Default)]
pub struct UsvgMinifier;

impl Minifier for UsvgMinifier {
    fn minify(&mut self, svg: &str) -> TraitforgeResult<String> {
        let tree = usvg::Tree::from_str(svg, &usvg::Options::default())
            .map_err(|e| TraitforgeError::validation(format!("optimizer input is not SVG: {e}")))?;
        Ok(tree.to_string(&usvg::WriteOptions::default()))
    }
}

/// Optimizer settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OptimizeSettings {
    /// Run artifacts through the optimizer before embedding.
    pub enabled: bool,
    /// How long a caller waits for its response.
    pub timeout_ms: u64,
}

impl Default for OptimizeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: 5_000,
        }
    }
}

struct Request {
    id: u64,
    text: String,
    reply: mpsc::Sender<Response>,
}

#[derive(Debug)]
struct Response {
    id: u64,
    result: Result<String, String>,
}

/// How an [`OptimizerHandle::optimize`] call settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptimizeStatus {
    /// The worker returned minified text.
    Optimized,
    /// The worker reported an error.
    Failed(String),
    /// The response carried another request's id.
    Mismatched,
    /// No response within the timeout.
    TimedOut,
    /// The worker is gone.
    Unavailable,
}

/// Text produced by one optimize call. Falls back to the input unless `status` is `Optimized`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Optimized {
    /// Correlation id of the request.
    pub id: u64,
    /// Minified text, or the original on fallback.
    pub text: String,
    /// How the call settled.
    pub status: OptimizeStatus,
}

/// Single-consumer optimization channel shared by every caller.
///
/// Each request carries a fresh correlation id and its own reply channel; callers wait at most
/// the configured timeout and fall back to their input on any failure.
pub struct OptimizerHandle {
    tx: Option<mpsc::Sender<Request>>,
    worker: Option<JoinHandle<()>>,
    next_id: AtomicU64,
    timeout: Duration,
}

impl std::fmt::Debug for OptimizerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizerHandle")
            .field("timeout", &self.timeout)
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl OptimizerHandle {
    /// Start the worker with the `usvg` minifier.
    pub fn spawn_default(timeout: Duration) -> TraitforgeResult<Self> {
        Self::spawn(UsvgMinifier, timeout)
    }

    /// Start the worker thread running `minifier`.
    pub fn spawn(minifier: impl Minifier, timeout: Duration) -> TraitforgeResult<Self> {
        let (tx, rx) = mpsc::channel::<Request>();
        let mut minifier = minifier;
        let worker = std::thread::Builder::new()
            .name("traitforge-optimizer".to_owned())
            .spawn(move || {
                for req in rx {
                    let result =
                        match panic::catch_unwind(AssertUnwindSafe(|| minifier.minify(&req.text))) {
                            Ok(Ok(text)) => Ok(text),
                            Ok(Err(e)) => Err(e.to_string()),
                            Err(_) => Err("minifier panicked".to_owned()),
                        };
                    // The caller may have timed out and dropped its receiver.
                    let _ = req.reply.send(Response { id: req.id, result });
                }
            })
            .context("spawn optimizer thread")?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            next_id: AtomicU64::new(1),
            timeout,
        })
    }

    /// Per-call wait limit.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Optimize `text`, falling back to it on error, mismatch, timeout or a dead worker.
    pub fn optimize(&self, text: &str) -> Optimized {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = mpsc::channel();
        let sent = self.tx.as_ref().is_some_and(|tx| {
            tx.send(Request {
                id,
                text: text.to_owned(),
                reply,
            })
            .is_ok()
        });
        let settled = if sent {
            settle(id, rx.recv_timeout(self.timeout))
        } else {
            Err(OptimizeStatus::Unavailable)
        };

        match settled {
            Ok(text) => Optimized {
                id,
                text,
                status: OptimizeStatus::Optimized,
            },
            Err(status) => {
                tracing::warn!(id, ?status, "optimizer fallback to unoptimized text");
                Optimized {
                    id,
                    text: text.to_owned(),
                    status,
                }
            }
        }
    }
}

fn settle(
    expected: u64,
    received: Result<Response, RecvTimeoutError>,
) -> Result<String, OptimizeStatus> {
    match received {
        Ok(Response { id, .. }) if id != expected => Err(OptimizeStatus::Mismatched),
        Ok(Response { result: Ok(text), .. }) => Ok(text),
        Ok(Response { result: Err(e), .. }) => Err(OptimizeStatus::Failed(e)),
        Err(RecvTimeoutError::Timeout) => Err(OptimizeStatus::TimedOut),
        Err(RecvTimeoutError::Disconnected) => Err(OptimizeStatus::Unavailable),
    }
}

impl Drop for OptimizerHandle {
    fn drop(&mut self) {
        // Closing the channel ends the worker once its current request returns. A worker still
        // busy with a request its caller gave up on is detached rather than waited for.
        self.tx.take();
        if let Some(worker) = self.worker.take()
            && worker.is_finished()
        {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/optimize.rs"]
mod tests;
