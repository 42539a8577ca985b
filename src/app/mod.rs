//! App layer - central state management and command processing
//!
//! The App actor receives editor events and network responses,
//! updates state, and emits network commands and view snapshots.

pub mod state;
pub mod actor;
pub mod commands;

pub use state::AppState;
pub use actor::AppActor;
