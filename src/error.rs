/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Driver-level (fail-fast) errors.
//!
//! Conditions affecting a single task — a classifier exception, a stale CFS
//! heap entry, a non-positive weight — are absorbed in place and logged
//! (see [`crate::classifier`] and [`crate::queue`]); they never surface as
//! a [`DriverError`]. This type is reserved for conditions that make the
//! whole run meaningless: a malformed or empty input table, or an I/O
//! failure reading/writing it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("input table is missing required column '{0}'")]
    MissingColumn(String),

    #[error("input table has no rows")]
    EmptyInput,

    #[error("failed to read or write a simulation file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}
