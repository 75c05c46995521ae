//! Semantic string types.

mod lossy_json;
mod string_set;
mod trimmed_string;

pub use lossy_json::{lossy_equal, preserve, LossyJson, LossyJsonOptions};
pub use string_set::{from_comma_string, join_set, split_set, to_comma_string};
pub use trimmed_string::{preserve_trimmed, TrimmedString};
