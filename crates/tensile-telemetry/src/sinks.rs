//! Pluggable event sinks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::events::{EventKind, SimulationEvent};

/// Trait for event consumers.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &SimulationEvent);

    /// Called when the simulation ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events into a shared `Vec` for testing and inspection.
///
/// Clones share the same buffer, so keep one clone outside the bus to read
/// what was delivered.
#[derive(Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<SimulationEvent>>>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the collected events.
    pub fn events(&self) -> MutexGuard<'_, Vec<SimulationEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events().is_empty()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        self.events().push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Logs events through `tracing`.
///
/// Per-iteration events go to `trace`, everything else to `info`.
pub struct TracingSink {
    /// Skip solver iteration events entirely.
    skip_iterations: bool,
}

impl TracingSink {
    pub fn new() -> Self {
        Self {
            skip_iterations: false,
        }
    }

    /// A sink that ignores per-iteration events.
    pub fn summary_only() -> Self {
        Self {
            skip_iterations: true,
        }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        match &event.kind {
            EventKind::SolverIteration { iteration, residual } => {
                if !self.skip_iterations {
                    tracing::trace!(
                        timestep = event.timestep,
                        iteration,
                        residual,
                        "solver_iteration"
                    );
                }
            }
            kind => tracing::info!(timestep = event.timestep, event = ?kind, "simulation_event"),
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
