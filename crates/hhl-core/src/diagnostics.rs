//! Diagnostic events emitted while solving.
//!
//! The solver reports intermediate values (vectors around truncation,
//! rescale factors, circuit statistics) as typed [`Diagnostic`] events to an
//! injected [`DiagnosticSink`]. They are informational only; nothing in the
//! pipeline reads them back.

use std::sync::Mutex;

use hhl_ir::CircuitProperties;
use num_complex::Complex64;
use tracing::debug;

/// An intermediate value of a solver run.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Preprocessing finished.
    ProblemConfigured {
        /// Dimension after expansion.
        dimension: usize,
        /// Dimension as supplied.
        original_dimension: usize,
        /// Whether the Hermitian embedding was applied.
        hermitian_embedded: bool,
        /// Whether identity padding was applied.
        resized: bool,
    },
    /// Read-out strategy chosen from the backend capabilities.
    StrategySelected {
        /// `true` for amplitudes, `false` for counts.
        statevector: bool,
        /// Circuits submitted in the single batch.
        circuits: usize,
    },
    /// Main circuit built.
    CircuitConstructed(CircuitProperties),
    /// Decoded vector before truncation.
    VectorPreResize(Vec<Complex64>),
    /// Decoded vector after truncation.
    VectorPostResize(Vec<Complex64>),
    /// Rescale factors.
    Rescaled {
        /// Magnitude factor.
        scale: f64,
        /// Phase correction.
        phase: f64,
    },
}

/// Consumer of [`Diagnostic`] events.
pub trait DiagnosticSink: Send + Sync {
    /// Receive one event.
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::ProblemConfigured {
                dimension,
                original_dimension,
                hermitian_embedded,
                resized,
            } => debug!(
                dimension,
                original_dimension, hermitian_embedded, resized, "problem configured"
            ),
            Diagnostic::StrategySelected {
                statevector,
                circuits,
            } => debug!(statevector, circuits, "read-out strategy selected"),
            Diagnostic::CircuitConstructed(props) => debug!(
                size = props.size,
                depth = props.depth,
                width = props.width,
                "circuit constructed"
            ),
            Diagnostic::VectorPreResize(v) => debug!(vector = ?v, "vector pre-resizing"),
            Diagnostic::VectorPostResize(v) => debug!(vector = ?v, "vector post-resizing"),
            Diagnostic::Rescaled { scale, phase } => debug!(scale, phase, "rescaled solution"),
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic);
        }
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _diagnostic: Diagnostic) {}
}
