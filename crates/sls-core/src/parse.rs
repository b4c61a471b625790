//! Parsers for the string-typed deployment inputs.

use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};

/// Parse a memory quota such as `128Mb` into a byte count.
///
/// Units are case-insensitive binary multiples: `b`, `k`/`kb`, `m`/`mb`,
/// `g`/`gb`. A bare number is taken as bytes. Zero is rejected.
pub fn parse_memory(raw: &str) -> ConfigResult<u64> {
    let invalid = || ConfigError::InvalidMemory(raw.to_string());

    let trimmed = raw.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let value: u64 = digits.parse().map_err(|_| invalid())?;
    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => 1 << 10,
        "m" | "mb" => 1 << 20,
        "g" | "gb" => 1 << 30,
        _ => return Err(invalid()),
    };

    match value.checked_mul(multiplier) {
        Some(0) | None => Err(invalid()),
        Some(bytes) => Ok(bytes),
    }
}

/// Parse `KEY=VALUE` lines into an environment map.
///
/// Each line is split on its first `=`; the key and the remainder are
/// trimmed, so `B=x=y` yields `x=y`. Blank lines are skipped, a line with no
/// `=` maps to an empty value, and later duplicates overwrite earlier ones.
pub fn parse_environment<S: AsRef<str>>(lines: &[S]) -> ConfigResult<BTreeMap<String, String>> {
    let mut env = BTreeMap::new();
    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = line.split_once('=').unwrap_or((line, ""));
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::InvalidEnvironment(line.to_string()));
        }
        env.insert(key.to_string(), value.trim().to_string());
    }
    Ok(env)
}

/// Split a list input on newlines and commas, dropping blank items.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Split a multi-line input on newlines only, dropping blank lines.
///
/// Used for inputs whose items may themselves contain commas.
pub fn parse_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
