//! State module for tracking crawl progress
//!
//! This module provides the per-URL state kept during a crawl run.
//!
//! # Components
//!
//! - `VisitState`: Tracks the state of an individual URL (unvisited, in-flight, checked)
//! - `VisitedSet`: The shared claim store that guarantees each URL is fetched at most once

mod visit_state;
mod visited;

// Re-export main types
pub use visit_state::VisitState;
pub use visited::VisitedSet;
