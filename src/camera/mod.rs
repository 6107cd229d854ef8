//! Camera framing: the per-frame zoom schedule and the viewport tracker that follows it.

pub mod mode;
pub mod schedule;
pub mod tracker;
