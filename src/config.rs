/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Simulation configuration: every tunable constant the dispatcher and tick
//! engine formulas depend on, gathered in one place so a CLI or a test can
//! override them without threading individual arguments through every
//! function.

/// Which of the two scheduler variants to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Baseline,
    Ai,
}

impl Variant {
    /// File-name stem used for the exported `<variant>_logs.csv` and
    /// `<variant>_task_metrics.csv`, matching the naming convention of the
    /// original trace-comparison tooling.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Baseline => "linux_baseline",
            Variant::Ai => "ai_scheduler",
        }
    }

    /// Short name accepted on the CLI (`--variant baseline|ai`).
    pub fn cli_value(self) -> &'static str {
        match self {
            Variant::Baseline => "baseline",
            Variant::Ai => "ai",
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baseline" | "linux_baseline" | "linux" => Ok(Variant::Baseline),
            "ai" | "ai_scheduler" => Ok(Variant::Ai),
            other => Err(format!("unknown scheduler variant '{other}' (expected baseline or ai)")),
        }
    }
}

/// Tunable constants shared by both scheduler variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub num_cores: usize,
    pub rr_quantum: u64,
    pub sched_latency_ticks: u64,
    pub min_granularity: u64,
    pub max_ticks: u64,

    /// AI-variant RR quantum curve: `subqueue_score` at and below which the
    /// quantum is `rr_base_quantum`.
    pub rr_base_score: f64,
    /// `subqueue_score` at and above which the quantum is `rr_max_quantum`.
    pub rr_max_score: f64,
    pub rr_base_quantum: u64,
    pub rr_max_quantum: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            num_cores: 4,
            rr_quantum: 100,
            sched_latency_ticks: 48,
            min_granularity: 1,
            max_ticks: 70_000,
            rr_base_score: 2.5,
            rr_max_score: 3.15,
            rr_base_quantum: 100,
            rr_max_quantum: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn variant_parses_known_aliases_case_insensitively() {
        assert_eq!(Variant::from_str("Baseline").unwrap(), Variant::Baseline);
        assert_eq!(Variant::from_str("AI").unwrap(), Variant::Ai);
        assert!(Variant::from_str("bogus").is_err());
    }

    #[test]
    fn default_config_matches_documented_defaults() {
        let c = SimConfig::default();
        assert_eq!(c.num_cores, 4);
        assert_eq!(c.rr_quantum, 100);
        assert_eq!(c.sched_latency_ticks, 48);
        assert_eq!(c.max_ticks, 70_000);
    }
}
