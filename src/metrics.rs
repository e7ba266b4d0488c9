/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Event log and derived metrics: the append-only record of every
//! admit/enqueue/dispatch/run/preempt/complete transition, plus the
//! per-task and aggregate statistics computed from it.

use std::collections::HashMap;

use serde::Serialize;

use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Admit,
    Enqueue,
    Dispatch,
    Run,
    Preempt,
    Complete,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Admit => "ADMIT",
            EventKind::Enqueue => "ENQUEUE",
            EventKind::Dispatch => "DISPATCH",
            EventKind::Run => "RUN",
            EventKind::Preempt => "PREEMPT",
            EventKind::Complete => "COMPLETE",
        }
    }
}

/// One row of the exported `<variant>_logs.csv`.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub time: u64,
    pub event: String,
    pub core: Option<usize>,
    pub pid: u64,
    pub name: String,
    pub scheduler: String,
    pub subqueue: String,
    pub remaining: u64,
    pub quantum: u64,
    pub vruntime: f64,
    pub subqueue_score: f64,
    pub extra: String,
}

/// Ordered, append-only event stream for a single simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record(&mut self, time: u64, kind: EventKind, core: Option<usize>, task: &Task, extra: &str) {
        self.records.push(EventRecord {
            time,
            event: kind.as_str().to_string(),
            core,
            pid: task.pid,
            name: task.name.clone(),
            scheduler: task.assigned_scheduler.map(|s| s.as_str().to_string()).unwrap_or_default(),
            subqueue: task.subqueue.clone(),
            remaining: task.remaining,
            quantum: task.quantum,
            vruntime: task.vruntime,
            subqueue_score: task.subqueue_score,
            extra: extra.to_string(),
        });
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn context_switches(&self) -> u64 {
        self.records.iter().filter(|r| r.event == EventKind::Dispatch.as_str()).count() as u64
    }

    pub fn run_count_on_core(&self, core: usize) -> u64 {
        self.records
            .iter()
            .filter(|r| r.event == EventKind::Run.as_str() && r.core == Some(core))
            .count() as u64
    }

    pub fn total_run_events(&self) -> u64 {
        self.records.iter().filter(|r| r.event == EventKind::Run.as_str()).count() as u64
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut w = csv::Writer::from_writer(writer);
        for rec in &self.records {
            w.serialize(rec)?;
        }
        w.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// One row of the exported `<variant>_task_metrics.csv`.
#[derive(Debug, Clone, Serialize)]
pub struct TaskMetric {
    pub pid: u64,
    pub name: String,
    pub arrival: u64,
    pub first_start: u64,
    pub completion: u64,
    pub execution_time: u64,
    pub waiting: u64,
    pub turnaround: u64,
    pub response: u64,
    pub stretch: f64,
    pub scheduler: String,
    pub subqueue: String,
}

/// Derives the completed task's metrics, or `None` if it never ran to
/// completion (callers should only ask for metrics on the completed set).
pub fn task_metric(task: &Task) -> Option<TaskMetric> {
    let completion = task.completion_time?;
    let first_start = task.first_start.unwrap_or(completion);
    let waiting = first_start.saturating_sub(task.arrival_time);
    let turnaround = completion.saturating_sub(task.arrival_time);
    let response = waiting;
    let stretch = if task.total_run > 0 {
        turnaround as f64 / task.total_run as f64
    } else {
        0.0
    };
    Some(TaskMetric {
        pid: task.pid,
        name: task.name.clone(),
        arrival: task.arrival_time,
        first_start,
        completion,
        execution_time: task.total_run,
        waiting,
        turnaround,
        response,
        stretch,
        scheduler: task.assigned_scheduler.map(|s| s.as_str().to_string()).unwrap_or_default(),
        subqueue: task.subqueue.clone(),
    })
}

pub fn write_task_metrics_csv<W: std::io::Write>(
    metrics: &[TaskMetric],
    writer: W,
) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(writer);
    for m in metrics {
        w.serialize(m)?;
    }
    w.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Run-wide aggregate statistics, derived from the completed task set and
/// the event log.
#[derive(Debug, Clone, Default)]
pub struct AggregateMetrics {
    pub avg_turnaround: f64,
    pub median_turnaround: f64,
    pub avg_response: f64,
    pub p95_response: f64,
    pub jain_fairness: f64,
    pub core_utilization: Vec<f64>,
    pub context_switches: u64,
    pub tasks_total: usize,
    pub tasks_completed: usize,
    pub cpu_utilization_pct: f64,
    pub throughput: f64,
}

/// Linear-interpolation quantile over a slice, matching the convention used
/// by the statistics tooling this run's output feeds into (pandas' default
/// `linear` interpolation).
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Computes run-wide metrics. `tasks_total` should be the number of tasks
/// ever admitted (including any still incomplete at `max_ticks`);
/// `current_time` is the final simulated tick.
pub fn aggregate_metrics(
    tasks: &HashMap<u64, Task>,
    log: &EventLog,
    num_cores: usize,
    current_time: u64,
) -> AggregateMetrics {
    let completed: Vec<&Task> = tasks.values().filter(|t| t.is_completed()).collect();

    let mut turnarounds: Vec<f64> = Vec::with_capacity(completed.len());
    let mut responses: Vec<f64> = Vec::with_capacity(completed.len());
    let mut execs: Vec<f64> = Vec::with_capacity(completed.len());

    for t in &completed {
        if let Some(m) = task_metric(t) {
            turnarounds.push(m.turnaround as f64);
            responses.push(m.response as f64);
        }
        execs.push(t.total_run as f64);
    }

    let avg_turnaround = mean(&turnarounds);
    let avg_response = mean(&responses);

    let mut sorted_turnaround = turnarounds.clone();
    sorted_turnaround.sort_by(|a, b| a.total_cmp(b));
    let median_turnaround = quantile(&sorted_turnaround, 0.5);

    let mut sorted_response = responses.clone();
    sorted_response.sort_by(|a, b| a.total_cmp(b));
    let p95_response = quantile(&sorted_response, 0.95);

    let sum: f64 = execs.iter().sum();
    let sum_sq: f64 = execs.iter().map(|x| x * x).sum();
    let n = execs.len() as f64;
    let jain_fairness = if n > 0.0 {
        (sum * sum) / (n * sum_sq + 1e-9)
    } else {
        0.0
    };

    let elapsed = current_time.max(1) as f64;
    let core_utilization: Vec<f64> = (0..num_cores)
        .map(|c| log.run_count_on_core(c) as f64 / elapsed.max(1.0))
        .collect();

    let cpu_utilization_pct = if num_cores > 0 {
        100.0 * log.total_run_events() as f64 / (elapsed * num_cores as f64)
    } else {
        0.0
    };
    let throughput = completed.len() as f64 / elapsed.max(1.0);

    AggregateMetrics {
        avg_turnaround,
        median_turnaround,
        avg_response,
        p95_response,
        jain_fairness,
        core_utilization,
        context_switches: log.context_switches(),
        tasks_total: tasks.len(),
        tasks_completed: completed.len(),
        cpu_utilization_pct,
        throughput,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::SchedClass;

    fn completed_task(pid: u64, arrival: u64, first_start: u64, completion: u64, total_run: u64) -> Task {
        let mut t = Task::new_for_test(pid, arrival, total_run);
        t.first_start = Some(first_start);
        t.completion_time = Some(completion);
        t.total_run = total_run;
        t.remaining = 0;
        t.assigned_scheduler = Some(SchedClass::Fifo);
        t.subqueue = "fifo_1".into();
        t
    }

    #[test]
    fn task_metric_computes_waiting_turnaround_and_stretch() {
        let t = completed_task(1, 0, 5, 15, 10);
        let m = task_metric(&t).unwrap();
        assert_eq!(m.waiting, 5);
        assert_eq!(m.turnaround, 15);
        assert_eq!(m.response, 5);
        assert_eq!(m.stretch, 1.5);
    }

    #[test]
    fn task_metric_is_none_for_incomplete_task() {
        let t = Task::new_for_test(1, 0, 10);
        assert!(task_metric(&t).is_none());
    }

    #[test]
    fn jain_fairness_is_one_when_all_equal() {
        let mut tasks = HashMap::new();
        for pid in 1..=3u64 {
            tasks.insert(pid, completed_task(pid, 0, 0, 10, 10));
        }
        let log = EventLog::new();
        let agg = aggregate_metrics(&tasks, &log, 1, 10);
        assert!((agg.jain_fairness - 1.0).abs() < 1e-6);
    }

    #[test]
    fn quantile_linear_interpolates_between_neighbors() {
        let v = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), 1.0);
        assert_eq!(quantile(&v, 1.0), 4.0);
        assert!((quantile(&v, 0.5) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn context_switches_counts_only_dispatch_events() {
        let mut log = EventLog::new();
        let t = Task::new_for_test(1, 0, 10);
        log.record(0, EventKind::Admit, None, &t, "");
        log.record(0, EventKind::Dispatch, Some(0), &t, "");
        log.record(1, EventKind::Run, Some(0), &t, "");
        assert_eq!(log.context_switches(), 1);
    }
}
