//! Execution contract and shared kernel helpers.
//!
//! Effects build [`TransformPrimitive`]s; the compiled pipeline feeds a
//! [`Frame`] through them in order. The helpers here cover the two
//! recurring chores: keeping boxes consistent under geometric changes
//! ([`geometry`]) and per-pixel/per-channel filtering ([`pixel`]).

pub mod geometry;
pub mod pixel;
pub mod primitive;

pub use primitive::{ApplyCtx, BoxedTransform, Frame, TransformPrimitive};
