//! Validation of untrusted query-parameter input.
//!
//! Query parameters are the only structured input channel besides the binary
//! upload body; every value is checked as a UUID-shaped string, a
//! length-bounded string, or a bounded integer before use.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ApiError, ApiResult};

/// Hyphenated lowercase UUID v4 with the RFC 4122 variant.
static UUID_V4: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("uuid pattern is valid")
});

pub fn expect_uuid(name: &str, value: Option<&str>) -> ApiResult<String> {
    match value {
        Some(id) if UUID_V4.is_match(id) => Ok(id.to_string()),
        Some(id) => Err(ApiError::Validation(format!(
            "invalid uuid {name}, got {id}"
        ))),
        None => Err(ApiError::Validation(format!("invalid uuid {name}, got none"))),
    }
}

pub fn expect_string(name: &str, value: Option<&str>, max_length: usize) -> ApiResult<String> {
    let Some(value) = value else {
        return Err(ApiError::Validation(format!(
            "expected {name} to be a string but got none"
        )));
    };
    if value.chars().count() > max_length {
        return Err(ApiError::Validation(format!(
            "string {name} was longer than {max_length}"
        )));
    }
    Ok(value.to_string())
}

pub fn expect_integer(
    name: &str,
    value: Option<&str>,
    min_inclusive: u32,
    max_inclusive: u32,
) -> ApiResult<u32> {
    let Some(value) = value else {
        return Err(ApiError::Validation(format!(
            "expected {name} to be a number but got none"
        )));
    };
    let number: u32 = value.parse().map_err(|_| {
        ApiError::Validation(format!("expected {name} to be a number but got {value}"))
    })?;
    if number < min_inclusive || number > max_inclusive {
        return Err(ApiError::Validation(format!(
            "number {name} was outside range [{min_inclusive},{max_inclusive}]: {value}"
        )));
    }
    Ok(number)
}

pub fn uuid_param(params: &HashMap<String, String>, name: &str) -> ApiResult<String> {
    expect_uuid(name, params.get(name).map(String::as_str))
}

pub fn string_param(
    params: &HashMap<String, String>,
    name: &str,
    max_length: usize,
) -> ApiResult<String> {
    expect_string(name, params.get(name).map(String::as_str), max_length)
}

pub fn integer_param(
    params: &HashMap<String, String>,
    name: &str,
    min_inclusive: u32,
    max_inclusive: u32,
) -> ApiResult<u32> {
    expect_integer(
        name,
        params.get(name).map(String::as_str),
        min_inclusive,
        max_inclusive,
    )
}
