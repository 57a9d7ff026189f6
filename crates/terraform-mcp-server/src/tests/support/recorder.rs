//! Recording and telemetry doubles.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::telemetry::{DeliveryError, EventDestination, TelemetryEvent};
use crate::transport::{Direction, Recorder};

/// Keeps every recorded chunk in memory.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    chunks: Mutex<Vec<(Direction, Vec<u8>)>>,
}

impl MemoryRecorder {
    /// Concatenation of every chunk recorded in `direction`.
    pub fn bytes(&self, direction: Direction) -> Vec<u8> {
        self.chunks
            .lock()
            .expect("recorder mutex poisoned")
            .iter()
            .filter(|(recorded, _)| *recorded == direction)
            .flat_map(|(_, bytes)| bytes.iter().copied())
            .collect()
    }
}

impl Recorder for MemoryRecorder {
    fn record(&self, direction: Direction, bytes: &[u8]) -> io::Result<()> {
        self.chunks
            .lock()
            .expect("recorder mutex poisoned")
            .push((direction, bytes.to_vec()));
        Ok(())
    }
}

/// Destination that keeps delivered events and counts flushes.
#[derive(Debug, Default, Clone)]
pub struct CollectingDestination {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
    flushes: Arc<AtomicUsize>,
}

impl CollectingDestination {
    /// Events delivered so far.
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().expect("destination mutex poisoned").clone()
    }

    /// Names of the delivered events, in order.
    pub fn names(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|event| event.name().to_owned())
            .collect()
    }

    /// Number of flushes performed by the sink worker.
    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl EventDestination for CollectingDestination {
    fn deliver(&mut self, event: &TelemetryEvent) -> Result<(), DeliveryError> {
        self.events
            .lock()
            .expect("destination mutex poisoned")
            .push(event.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DeliveryError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
