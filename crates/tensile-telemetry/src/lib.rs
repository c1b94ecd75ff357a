//! # tensile-telemetry
//!
//! Event bus for simulation telemetry. The integrator loop emits structured
//! events (timestep timing, solver iterations, convergence, energy) that
//! pluggable sinks consume.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::{EventBus, EventEmitter};
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
