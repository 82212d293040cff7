//! Hashtag trend tracking.
//!
//! Posts are bucketed into calendar windows, aggregated per hashtag and
//! window, scored by growth against the hashtag's previous window, and the
//! top-K hashtags per window are selected.

pub mod aggregate;
pub mod pipeline;
pub mod score;
pub mod topk;
pub mod types;
pub mod window;
