//! Message types for inter-layer communication in the actor-based architecture.
//!
//! This module defines all messages that flow between the editor front end,
//! the App layer, and the Network layer.

pub mod editor;
pub mod network;
pub mod view;

pub use editor::{EditorEvent, RowField};
pub use network::{NetworkCommand, NetworkResponse};
pub use view::ViewState;
