//! Typed access to tool-call arguments
//!
//! Arguments arrive as an arbitrary JSON value. Missing optional keys are
//! fine; keys present with the wrong type are rejected.

use serde_json::Value;

use crate::error::{Error, Result};

/// Read-only view over a tool call's `arguments` object
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    value: &'a Value,
}

impl<'a> Args<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        match self.value.get(key) {
            Some(Value::Null) | None => None,
            Some(v) => Some(v),
        }
    }

    pub fn str(&self, key: &str) -> Result<Option<&'a str>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(Error::invalid(format!("'{}' must be a string", key))),
        }
    }

    pub fn required_str(&self, key: &str) -> Result<&'a str> {
        match self.str(key)? {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(Error::invalid(format!("'{}' is required", key))),
        }
    }

    /// Optional string placed as a bare positional argument.
    ///
    /// Values starting with `-` would be parsed as options by the CLI.
    pub fn positional(&self, key: &str) -> Result<Option<&'a str>> {
        match self.str(key)? {
            Some(s) if s.starts_with('-') => Err(Error::invalid(format!(
                "'{}' must not start with '-'",
                key
            ))),
            other => Ok(other),
        }
    }

    pub fn required_positional(&self, key: &str) -> Result<&'a str> {
        let value = self.required_str(key)?;
        self.positional(key)?;
        Ok(value)
    }

    /// Non-negative integer; numeric strings such as `"42"` are accepted.
    pub fn u64(&self, key: &str) -> Result<Option<u64>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| Error::invalid(format!("'{}' must be a non-negative integer", key))),
            Some(Value::String(s)) => s
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| Error::invalid(format!("'{}' must be a non-negative integer", key))),
            Some(_) => Err(Error::invalid(format!("'{}' must be a non-negative integer", key))),
        }
    }

    pub fn required_u64(&self, key: &str) -> Result<u64> {
        self.u64(key)?
            .ok_or_else(|| Error::invalid(format!("'{}' is required", key)))
    }

    /// Absent means `false`.
    pub fn flag(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(Error::invalid(format!("'{}' must be a boolean", key))),
        }
    }

    /// A list of strings; a single string is treated as a one-element list.
    pub fn strings(&self, key: &str) -> Result<Vec<&'a str>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(vec![s.as_str()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().ok_or_else(|| {
                        Error::invalid(format!("'{}' must be a list of strings", key))
                    })
                })
                .collect(),
            Some(_) => Err(Error::invalid(format!("'{}' must be a list of strings", key))),
        }
    }

    /// Optional string restricted to a fixed set of values.
    pub fn choice(&self, key: &str, allowed: &[&str]) -> Result<Option<&'a str>> {
        match self.str(key)? {
            None => Ok(None),
            Some(s) if allowed.contains(&s) => Ok(Some(s)),
            Some(s) => Err(Error::invalid(format!(
                "'{}' must be one of {}, got '{}'",
                key,
                allowed.join(", "),
                s
            ))),
        }
    }
}
