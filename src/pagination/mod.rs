//! Page-state machine and windowed page ranges
//!
//! Pure logic with no I/O: the orchestrator in `app` owns the state and the
//! presentation adapters only read it.

pub mod range;
pub mod state;

pub use range::*;
pub use state::*;
