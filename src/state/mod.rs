//! State module for tracking a mirror run
//!
//! # Components
//!
//! - `RunState`: Lifecycle of a run (idle, running, completed, stopped, failed)
//! - `PageRecord`/`Depth`: Where each saved page lives and which relative prefix it needs
//! - `CancelFlag`: Shared cooperative cancellation signal

mod cancel;
mod page_record;
mod run_state;

// Re-export main types
pub use cancel::CancelFlag;
pub use page_record::{Depth, PageRecord, PAGES_DIR, ROOT_DOCUMENT};
pub use run_state::RunState;
