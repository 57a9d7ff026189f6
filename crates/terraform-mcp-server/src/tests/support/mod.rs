//! Test doubles shared by the unit and behavioural suites.

mod interrupts;
mod recorder;
mod reporter;
mod streams;
mod tools;
mod world;

pub use interrupts::ManualInterruptListener;
pub use recorder::{CollectingDestination, MemoryRecorder};
pub use reporter::{LifecycleEvent, RecordingLifecycleReporter};
pub use streams::{ChannelReader, FailingWriter, SharedBuffer, channel_input};
pub use tools::fixture_registry;
pub use world::{LifecycleWorld, StepResult, world};
