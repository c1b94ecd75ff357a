//! Event bus: queued event dispatch to pluggable sinks.
//!
//! Events go through a `std::sync::mpsc` channel and are delivered to every
//! registered sink on [`EventBus::flush`].

use std::sync::mpsc;

use crate::events::SimulationEvent;
use crate::sinks::EventSink;

/// Broadcast event bus for simulation telemetry.
pub struct EventBus {
    sender: mpsc::Sender<SimulationEvent>,
    receiver: mpsc::Receiver<SimulationEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    /// Disabled bus is a no-op.
    enabled: bool,
}

impl EventBus {
    /// Creates a new event bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    /// Registers a sink to receive events.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Enables or disables the bus. Disabled bus drops events silently.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues an event. No-op when the bus is disabled.
    pub fn emit(&self, event: SimulationEvent) {
        if !self.enabled {
            return;
        }
        // The receiver lives as long as the bus, so this cannot fail.
        let _ = self.sender.send(event);
    }

    /// A detached handle that queues events from elsewhere (e.g. a solver
    /// iteration observer) while the bus itself is borrowed.
    ///
    /// The handle captures the bus's enabled state at creation.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            sender: self.sender.clone(),
            enabled: self.enabled,
        }
    }

    /// Delivers all queued events to the registered sinks.
    ///
    /// Call at the end of each timestep or at shutdown.
    pub fn flush(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            if !self.enabled {
                continue;
            }
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
        }
    }

    /// Flushes pending events and lets every sink finalize.
    pub fn finalize(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable queueing handle obtained from [`EventBus::emitter`].
#[derive(Clone)]
pub struct EventEmitter {
    sender: mpsc::Sender<SimulationEvent>,
    enabled: bool,
}

impl EventEmitter {
    /// Queues an event for the next [`EventBus::flush`]. No-op when the bus
    /// was disabled or has been dropped.
    pub fn emit(&self, event: SimulationEvent) {
        if !self.enabled {
            return;
        }
        // A dropped bus has no sinks left to deliver to.
        let _ = self.sender.send(event);
    }
}
