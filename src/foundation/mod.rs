//! Shared value types: errors, parameter specs, bounding boxes.

pub mod bbox;
pub mod error;
pub mod param;
