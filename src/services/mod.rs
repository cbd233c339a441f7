pub mod scheduler;
pub mod sequencer;
pub mod sync_service;

pub use scheduler::SyncScheduler;
pub use sequencer::{FetchSequencer, Ticket};
pub use sync_service::{SyncService, SyncStats};
