//! Job dispatcher (C9, spec §4.9): the HTTP surface over submission intake
//! and generation status lookup.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, ErrorCode};
pub use router::build_router;
pub use state::AppState;
