pub mod demo;
pub mod sequencer;

pub use demo::{select_demo_notification, SequencerMode};
pub use sequencer::{NotificationSequencer, SequencerConfig, SequencerEvent};
