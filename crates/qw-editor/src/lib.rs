pub mod input;
pub mod shortcuts;
pub mod sync;
pub mod tools;

pub use sync::{ActiveView, CircuitMutation, SyncController, SyncError, SyncResult, Transition};
