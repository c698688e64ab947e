//! Validation utilities shared by every service wrapper.
//!
//! Concrete per-service argument schemas are not part of this crate; what
//! lives here is the small set of generic checks ([`common`]) that a
//! [`crate::service::ServiceClient`] uses to validate arguments before a
//! request ever reaches the pipeline.

pub mod common;

pub use common::{
    validate_enum_value, validate_non_empty_collection, validate_non_empty_string,
    validate_numeric_range, validate_regex_pattern, validate_string_length, validate_unique_items,
    validate_url,
};
