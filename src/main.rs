/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use anyhow::{Context, Result};
use clap::Parser;

use sched_sim::classifier::ClassifierFacade;
use sched_sim::config::{SimConfig, Variant};
use sched_sim::driver;

/// Discrete-event multi-core scheduler simulator: runs recorded process
/// traces through either a Linux-like baseline or an ML-classifier-guided
/// policy and exports an event log plus per-task metrics.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the input CSV trace. Falls back to the INPUT_CSV env var.
    #[arg(long)]
    input: Option<String>,

    /// Which scheduler variant to run.
    #[arg(long, value_enum, default_value = "baseline")]
    variant: Variant,

    /// Number of simulated CPU cores.
    #[arg(long, default_value_t = SimConfig::default().num_cores)]
    cores: usize,

    /// Fixed RR quantum used by the baseline variant (ticks).
    #[arg(long, default_value_t = SimConfig::default().rr_quantum)]
    rr_quantum: u64,

    /// CFS scheduling-latency window (ticks).
    #[arg(long, default_value_t = SimConfig::default().sched_latency_ticks)]
    sched_latency_ticks: u64,

    /// Safety cap on the number of simulated ticks.
    #[arg(long, default_value_t = SimConfig::default().max_ticks)]
    max_ticks: u64,

    /// Directory to write `<variant>_logs.csv` and
    /// `<variant>_task_metrics.csv` into.
    #[arg(long, default_value = ".")]
    out_dir: String,
}

impl clap::ValueEnum for Variant {
    fn value_variants<'a>() -> &'a [Self] {
        &[Variant::Baseline, Variant::Ai]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.cli_value()))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let input = args
        .input
        .or_else(|| std::env::var("INPUT_CSV").ok())
        .context("no input provided: pass --input or set INPUT_CSV")?;

    let config = SimConfig {
        num_cores: args.cores,
        rr_quantum: args.rr_quantum,
        sched_latency_ticks: args.sched_latency_ticks,
        max_ticks: args.max_ticks,
        ..SimConfig::default()
    };

    let tasks = driver::load_tasks(&input).with_context(|| format!("loading input trace '{input}'"))?;

    let classifier = ClassifierFacade::absent();
    let (scheduler, metrics) = driver::run_simulation(tasks, args.variant, config, classifier);

    driver::export_csvs(&scheduler, &args.out_dir, args.variant.as_str())
        .with_context(|| format!("writing simulation output to '{}'", args.out_dir))?;

    println!(
        "{}/{} tasks finished — avg turnaround {:.1}, p95 response {:.1}, Jain fairness {:.3}",
        metrics.tasks_completed, metrics.tasks_total, metrics.avg_turnaround, metrics.p95_response, metrics.jain_fairness
    );

    Ok(())
}
