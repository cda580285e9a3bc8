use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use rand::{SeedableRng, rngs::StdRng};
use rayon::prelude::*;

use crate::{
    compose::{
        artifact::{Composite, LayerArtifact},
        order::CanonicalOrder,
    },
    foundation::{
        core::Canvas,
        error::{TraitforgeError, TraitforgeResult},
        math::derive_seed,
    },
    outline::oracle::OracleKind,
    source::OutlineSource,
    traits::registry::{LayerContext, TraitRegistry},
};

/// Execution settings for [`Orchestrator::compose`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ComposeOpts {
    /// Generate layers on a rayon pool.
    pub parallel: bool,
    /// Pool size; `None` lets rayon decide.
    pub threads: Option<usize>,
}

/// Shared flag that abandons an invocation. Layers already running finish; the rest are skipped.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, untripped token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the token was tripped.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Invocation phases, recorded in order in [`ComposeReport::trace`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComposeState {
    /// Nothing started.
    Idle,
    /// Requested names being filtered.
    Requesting,
    /// Layers being generated.
    Generating,
    /// Survivors being ordered.
    Composing,
    /// Finished.
    Done,
}

/// Settled state of one layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerStatus {
    /// Artifact produced and validated.
    Succeeded,
    /// Generation failed, panicked or produced a malformed artifact.
    Failed(String),
    /// Not started because the invocation was cancelled.
    Skipped,
}

/// Per-layer entry of a [`ComposeReport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerReport {
    /// Layer name.
    pub name: String,
    /// How the layer settled.
    pub status: LayerStatus,
}

/// Final result of an invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComposeOutcome {
    /// At least one layer survived.
    Composed(Composite),
    /// No layer survived; distinct from a single-layer failure.
    NothingProduced,
    /// The invocation was cancelled before composing.
    Cancelled,
}

/// Everything [`Orchestrator::compose`] learned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposeReport {
    /// Final outcome.
    pub outcome: ComposeOutcome,
    /// Requested names missing from the canonical order.
    pub unknown: Vec<String>,
    /// Settled layers in canonical order.
    pub layers: Vec<LayerReport>,
    /// Phases visited.
    pub trace: Vec<ComposeState>,
}

impl ComposeReport {
    /// Composite, when one was produced.
    pub fn composite(&self) -> Option<&Composite> {
        match &self.outcome {
            ComposeOutcome::Composed(c) => Some(c),
            _ => None,
        }
    }

    /// The sole surviving layer.
    pub fn single(&self) -> Option<&LayerArtifact> {
        self.composite().and_then(Composite::single)
    }

    /// Names of failed layers.
    pub fn failed(&self) -> Vec<&str> {
        self.layers
            .iter()
            .filter(|l| matches!(l.status, LayerStatus::Failed(_)))
            .map(|l| l.name.as_str())
            .collect()
    }
}

/// Runs registered trait generators and stacks their artifacts in canonical order.
pub struct Orchestrator {
    order: CanonicalOrder,
    registry: TraitRegistry,
    source: Arc<dyn OutlineSource>,
    canvas: Canvas,
    seed: u64,
    oracle: OracleKind,
    opts: ComposeOpts,
    cancel: CancelToken,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("order", &self.order)
            .field("registry", &self.registry)
            .field("canvas", &self.canvas)
            .field("seed", &self.seed)
            .field("oracle", &self.oracle)
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Orchestrator with default canvas, seed 0, winding oracle and sequential execution.
    pub fn new(
        order: CanonicalOrder,
        registry: TraitRegistry,
        source: Arc<dyn OutlineSource>,
    ) -> Self {
        Self {
            order,
            registry,
            source,
            canvas: Canvas::default(),
            seed: 0,
            oracle: OracleKind::default(),
            opts: ComposeOpts::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Set the invocation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the canvas.
    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    /// Set the oracle technique.
    pub fn with_oracle(mut self, oracle: OracleKind) -> Self {
        self.oracle = oracle;
        self
    }

    /// Set execution options.
    pub fn with_opts(mut self, opts: ComposeOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Use `token` for cancellation.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this orchestrator's invocations.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Canonical order in use.
    pub fn order(&self) -> &CanonicalOrder {
        &self.order
    }

    #[tracing::instrument(skip(self, requested))]
    /// Generate the requested layers and stack the survivors in canonical order.
    ///
    /// Unknown names are dropped with a warning; a failing layer never aborts its siblings.
    /// Errors are returned only for unusable execution settings.
    pub fn compose<I, S>(&self, requested: I) -> TraitforgeResult<ComposeReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trace = vec![ComposeState::Idle, ComposeState::Requesting];
        let requested: Vec<S> = requested.into_iter().collect();
        let (known, unknown) = self.order.filter(requested.iter().map(AsRef::as_ref));
        for name in &unknown {
            tracing::warn!(layer = %name, "unknown layer name dropped");
        }

        trace.push(ComposeState::Generating);
        let settled: Vec<(String, Result<LayerArtifact, LayerStatus>)> = if self.opts.parallel {
            let pool = build_thread_pool(self.opts.threads)?;
            pool.install(|| {
                known
                    .par_iter()
                    .map(|name| (name.clone(), self.run_layer(name)))
                    .collect()
            })
        } else {
            known
                .iter()
                .map(|name| (name.clone(), self.run_layer(name)))
                .collect()
        };

        let mut layers = Vec::with_capacity(settled.len());
        let mut survivors = Vec::new();
        for (name, result) in settled {
            match result {
                Ok(artifact) => {
                    layers.push(LayerReport {
                        name,
                        status: LayerStatus::Succeeded,
                    });
                    survivors.push(artifact);
                }
                Err(status) => layers.push(LayerReport { name, status }),
            }
        }

        if self.cancel.is_cancelled() {
            trace.push(ComposeState::Done);
            return Ok(ComposeReport {
                outcome: ComposeOutcome::Cancelled,
                unknown,
                layers,
                trace,
            });
        }

        trace.push(ComposeState::Composing);
        // Completion order is irrelevant; rank decides stacking.
        survivors.sort_by_key(|a| self.order.rank(a.name()).unwrap_or(usize::MAX));
        let outcome = if survivors.is_empty() {
            tracing::warn!("no layers produced");
            ComposeOutcome::NothingProduced
        } else {
            ComposeOutcome::Composed(Composite::new(self.canvas.size, survivors))
        };
        trace.push(ComposeState::Done);

        Ok(ComposeReport {
            outcome,
            unknown,
            layers,
            trace,
        })
    }

    fn run_layer(&self, name: &str) -> Result<LayerArtifact, LayerStatus> {
        if self.cancel.is_cancelled() {
            return Err(LayerStatus::Skipped);
        }
        let result = self.generate_layer(name).and_then(|artifact| {
            self.check_artifact(name, &artifact)?;
            Ok(artifact)
        });
        result.map_err(|e| {
            tracing::warn!(layer = %name, error = %e, "layer failed; omitted from composite");
            LayerStatus::Failed(e.to_string())
        })
    }

    fn generate_layer(&self, name: &str) -> TraitforgeResult<LayerArtifact> {
        let generator = self.registry.get(name).ok_or_else(|| {
            TraitforgeError::validation(format!("no generator registered for layer '{name}'"))
        })?;
        let mut ctx = LayerContext {
            name,
            canvas: self.canvas,
            source: self.source.as_ref(),
            oracle: self.oracle,
            rng: StdRng::seed_from_u64(derive_seed(self.seed, name)),
        };
        match panic::catch_unwind(AssertUnwindSafe(|| generator.generate(&mut ctx))) {
            Ok(result) => result,
            Err(payload) => Err(TraitforgeError::geometry(format!(
                "layer '{name}' panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }

    fn check_artifact(&self, name: &str, artifact: &LayerArtifact) -> TraitforgeResult<()> {
        if artifact.name() != name {
            return Err(TraitforgeError::validation(format!(
                "layer '{name}' returned an artifact named '{}'",
                artifact.name()
            )));
        }
        if artifact.size() != self.canvas.size {
            return Err(TraitforgeError::validation(format!(
                "layer '{name}' artifact is {} wide, canvas is {}",
                artifact.size(),
                self.canvas.size
            )));
        }
        artifact.validate()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

fn build_thread_pool(threads: Option<usize>) -> TraitforgeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TraitforgeError::validation(
            "compose 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TraitforgeError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/orchestrator.rs"]
mod tests;
