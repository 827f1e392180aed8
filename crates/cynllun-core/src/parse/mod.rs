//! Best-effort normalization of generated text.
//!
//! Generated text is inherently unreliable in shape, so everything in this
//! module is defensive by construction: parsers return empty or `None`
//! rather than erroring, and degradation to verbatim display is a
//! first-class outcome, not an error path.

pub mod activities;
pub mod rubric;

pub use activities::{ActivityCard, parse_activities};
pub use rubric::{Criterion, Rubric, format_prose, parse_rubric};
