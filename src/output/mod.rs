//! Event records and their emission

pub mod emitter;
pub mod events;

pub use emitter::EventEmitter;
pub use events::*;
