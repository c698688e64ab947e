//! Generic validation helpers shared by every service wrapper.

use crate::error::{Error, Result};
use std::collections::HashSet;

/// Validates a string field that must not be empty after trimming.
pub fn validate_non_empty_string(value: &str, field_name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!(
            "field '{field_name}' cannot be empty"
        )));
    }
    Ok(())
}

/// Validates string length bounds (inclusive).
pub fn validate_string_length(value: &str, field_name: &str, min: usize, max: usize) -> Result<()> {
    if value.len() < min {
        return Err(Error::validation(format!(
            "field '{field_name}' must be at least {min} characters"
        )));
    }
    if value.len() > max {
        return Err(Error::validation(format!(
            "field '{field_name}' must not exceed {max} characters"
        )));
    }
    Ok(())
}

/// Validates a numeric value falls within `[min, max]`.
pub fn validate_numeric_range<T>(value: T, field_name: &str, min: T, max: T) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(Error::validation(format!(
            "field '{field_name}' must be between {min} and {max}"
        )));
    }
    Ok(())
}

/// Validates URL format.
pub fn validate_url(url: &str, field_name: &str) -> Result<()> {
    url::Url::parse(url)
        .map_err(|_| Error::validation(format!("field '{field_name}' must be a valid URL")))?;
    Ok(())
}

/// Validates that a field is one of a closed set of allowed values.
pub fn validate_enum_value<T: AsRef<str>>(
    value: T,
    field_name: &str,
    allowed_values: &[&str],
) -> Result<()> {
    let value_str = value.as_ref();
    if !allowed_values.contains(&value_str) {
        return Err(Error::validation(format!(
            "field '{field_name}' must be one of: {}",
            allowed_values.join(", ")
        )));
    }
    Ok(())
}

/// Validates that a collection is not empty.
pub fn validate_non_empty_collection<T>(collection: &[T], field_name: &str) -> Result<()> {
    if collection.is_empty() {
        return Err(Error::validation(format!(
            "field '{field_name}' cannot be empty"
        )));
    }
    Ok(())
}

/// Validates that all items in a collection are unique.
pub fn validate_unique_items<T: std::hash::Hash + Eq + std::fmt::Display>(
    items: &[T],
    field_name: &str,
) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        if !seen.insert(item) {
            return Err(Error::validation(format!(
                "duplicate item '{item}' found in field '{field_name}' at index {index}"
            )));
        }
    }
    Ok(())
}

/// Validates that a field value matches a regex pattern.
pub fn validate_regex_pattern(value: &str, field_name: &str, pattern: &str) -> Result<()> {
    let regex = regex::Regex::new(pattern)
        .map_err(|e| Error::validation(format!("invalid regex pattern for field '{field_name}': {e}")))?;

    if !regex.is_match(value) {
        return Err(Error::validation(format!(
            "field '{field_name}' does not match required pattern"
        )));
    }
    Ok(())
}
