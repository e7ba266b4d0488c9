/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! A small dynamically-typed value used for the heterogeneous feature map
//! carried by every [`Task`](crate::task::Task).
//!
//! Input rows mix integers, floats, category strings and absent cells; the
//! classifier and the quantum formulas need to coerce any of these to a
//! number without the caller having to know which shape a given column is
//! in.

use std::fmt;

/// One cell from an input CSV row, loosely typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Missing,
}

impl Value {
    /// Parses a raw CSV cell. Empty strings become [`Value::Missing`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Missing;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }
        Value::Str(trimmed.to_string())
    }

    /// Coerces to a float for use in a numeric feature vector.
    ///
    /// Non-numeric values (categoricals, missing cells) coerce to `0.0`;
    /// callers that need a categorical-to-int mapping must apply it before
    /// calling this (see [`crate::task::Task::feature_vector`]).
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Str(_) | Value::Missing => 0.0,
        }
    }

    /// Returns the string contents if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Missing => write!(f, ""),
        }
    }
}
