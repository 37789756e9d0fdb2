//! Numeric token grammar shared by the decoder.
//!
//! An observation inside a delimited stream looks like
//! `@<n>_<n>_<n>_<n>_<suffix>` where each `<n>` is `-?digits(.digits)?` and the
//! suffix is any run of digits, `.` and inner delimiters. The closing `@` is
//! left unconsumed so the next slice can start from it.

use chrono::Local;
use regex::Regex;
use std::sync::LazyLock;

use crate::format::{DEFAULT_DELIMITER, DEFAULT_INNER_DELIMITER};

/// ASCII only, so every captured token is valid `f64` syntax
const NUMBER: &str = r"(-?[0-9]+(?:\.[0-9]+)?)";

const FALLBACK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static DEFAULT_OBSERVATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&observation_pattern(DEFAULT_DELIMITER, DEFAULT_INNER_DELIMITER))
        .expect("Invalid observation pattern")
});

/// Builds the four-field observation pattern for the given delimiters.
pub fn observation_pattern(delimiter: char, inner_delimiter: char) -> String {
    let delim = regex::escape(&delimiter.to_string());
    let inner = regex::escape(&inner_delimiter.to_string());

    format!(
        "{delim}{NUMBER}{inner}{NUMBER}{inner}{NUMBER}{inner}{NUMBER}{inner}[0-9.{inner}]*"
    )
}

pub fn default_observation_regex() -> &'static Regex {
    &DEFAULT_OBSERVATION_REGEX
}

/// Parses a token already matched by [`NUMBER`]. Returns 0.0 for anything
/// else rather than failing.
pub fn parse_measurement(token: &str) -> f64 {
    token.parse::<f64>().unwrap_or_else(|_| {
        tracing::warn!("Unparsable numeric token '{}', using 0", token);
        0.0
    })
}

/// Wall-clock timestamp used when a match has no record to borrow one from.
pub fn fallback_timestamp() -> String {
    Local::now().format(FALLBACK_TIMESTAMP_FORMAT).to_string()
}
