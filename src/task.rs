/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Task record: the immutable descriptor plus mutable runtime state carried
//! by a single simulated process from admission to completion.

use std::collections::HashMap;

use crate::value::Value;

pub const NICE0_WEIGHT: f64 = 1024.0;

/// The Linux scheduling policy recorded on the input row (`Scheduling_Policy`
/// column). Distinct from [`SchedClass`], which is the *internal* class the
/// simulator actually dispatches the task under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinuxPolicy {
    #[default]
    Other,
    Fifo,
    RoundRobin,
    Batch,
    Idle,
}

impl LinuxPolicy {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "SCHED_FIFO" => LinuxPolicy::Fifo,
            "SCHED_RR" => LinuxPolicy::RoundRobin,
            "SCHED_BATCH" => LinuxPolicy::Batch,
            "SCHED_IDLE" => LinuxPolicy::Idle,
            _ => LinuxPolicy::Other,
        }
    }

    /// Categorical-to-int encoding used when this field appears inside a
    /// classifier feature vector.
    pub fn as_encoded(self) -> f64 {
        match self {
            LinuxPolicy::Other => 0.0,
            LinuxPolicy::Fifo => 1.0,
            LinuxPolicy::RoundRobin => 2.0,
            LinuxPolicy::Batch => 4.0,
            LinuxPolicy::Idle => 3.0,
        }
    }
}

/// Process state recorded on the input row (`State` column), encoded for
/// feature vectors the same way `Scheduling_Policy` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcState {
    #[default]
    Running,
    Sleeping,
    Stopped,
    Zombie,
}

impl ProcState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SLEEPING" | "S" => ProcState::Sleeping,
            "STOPPED" | "T" => ProcState::Stopped,
            "ZOMBIE" | "Z" => ProcState::Zombie,
            _ => ProcState::Running,
        }
    }

    pub fn as_encoded(self) -> f64 {
        match self {
            ProcState::Running => 0.0,
            ProcState::Sleeping => 1.0,
            ProcState::Stopped => 2.0,
            ProcState::Zombie => 3.0,
        }
    }
}

/// Resource-usage category produced by the classifier (or the AI-variant
/// default when classification fails).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceType {
    CpuBound,
    #[default]
    Mixed,
    IoBound,
}

impl ResourceType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "CPU-bound" => ResourceType::CpuBound,
            "IO-bound" => ResourceType::IoBound,
            _ => ResourceType::Mixed,
        }
    }

    /// Fixed numeric weight used by [`crate::policy::subqueue_score`].
    pub fn weight(self) -> f64 {
        match self {
            ResourceType::CpuBound => 3.0,
            ResourceType::Mixed => 2.0,
            ResourceType::IoBound => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interactivity {
    RealTime,
    Interactive,
    #[default]
    Other,
    Background,
    Batch,
}

impl Interactivity {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Real-time" => Interactivity::RealTime,
            "Interactive" => Interactivity::Interactive,
            "Background" => Interactivity::Background,
            "Batch" => Interactivity::Batch,
            _ => Interactivity::Other,
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            Interactivity::RealTime => 4.0,
            Interactivity::Interactive => 3.0,
            Interactivity::Other => 2.0,
            Interactivity::Background => 1.5,
            Interactivity::Batch => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionClass {
    Short,
    #[default]
    Medium,
    Long,
}

impl ExecutionClass {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Short" => ExecutionClass::Short,
            "Long" => ExecutionClass::Long,
            _ => ExecutionClass::Medium,
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            ExecutionClass::Short => 3.0,
            ExecutionClass::Medium => 2.0,
            ExecutionClass::Long => 1.0,
        }
    }

    /// Scale factor applied to the CFS base slice for the AI variant.
    pub fn quantum_factor(self) -> f64 {
        match self {
            ExecutionClass::Short => 1.0,
            ExecutionClass::Medium => 1.5,
            ExecutionClass::Long => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityClass {
    High,
    #[default]
    Medium,
    Low,
}

impl PriorityClass {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "High" => PriorityClass::High,
            "Low" => PriorityClass::Low,
            _ => PriorityClass::Medium,
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            PriorityClass::High => 3.0,
            PriorityClass::Medium => 2.0,
            PriorityClass::Low => 1.0,
        }
    }
}

/// The internal scheduling class a task has been assigned to — the subject
/// of the dispatcher's per-class pick and quantum formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedClass {
    Fifo,
    Rr,
    Cfs,
    Idle,
}

impl SchedClass {
    /// Name of the single subqueue each class uses, matching the event log
    /// and metrics CSVs of the original trace collector's sibling tooling.
    pub fn subqueue(self) -> &'static str {
        match self {
            SchedClass::Fifo => "fifo_1",
            SchedClass::Rr => "rr_1",
            SchedClass::Cfs => "cfs_1",
            SchedClass::Idle => "idle",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchedClass::Fifo => "FIFO",
            SchedClass::Rr => "RR",
            SchedClass::Cfs => "CFS",
            SchedClass::Idle => "IDLE",
        }
    }
}

/// A single simulated process: immutable descriptors plus the mutable state
/// the tick engine updates on every admit/dispatch/run/preempt/complete.
#[derive(Debug, Clone)]
pub struct Task {
    pub pid: u64,
    pub name: String,

    /// Raw feature map as read from the input row, keyed by column name.
    /// Consumed by the classifier's feature-vector extraction and kept
    /// around verbatim so recognized-but-unused telemetry columns (IO
    /// counters, context-switch counts, memory footprint, ...) survive the
    /// round trip even though the scheduler itself never reads them.
    pub features: HashMap<String, Value>,

    pub linux_policy: LinuxPolicy,
    pub state: ProcState,

    pub arrival_time: u64,
    pub total_time: u64,

    pub remaining: u64,
    pub total_run: u64,
    pub first_start: Option<u64>,
    pub completion_time: Option<u64>,

    pub resource_type: ResourceType,
    pub interactivity: Interactivity,
    pub execution_class: ExecutionClass,
    pub priority_class: PriorityClass,
    pub subqueue_score: f64,

    pub assigned_scheduler: Option<SchedClass>,
    pub subqueue: String,
    pub quantum: u64,

    pub vruntime: f64,
    pub weight: f64,
}

impl Task {
    /// Builds a task from a parsed input row. `pid` falls back to the row's
    /// own `PID` column if present and parseable, else to `fallback_pid`
    /// (the row's 1-based position in the input), guaranteeing uniqueness
    /// even against a malformed trace.
    pub fn from_row(row: &HashMap<String, String>, fallback_pid: u64) -> Self {
        let pid = row
            .get("PID")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(fallback_pid);
        let name = row
            .get("Name")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("task-{pid}"));
        let arrival_time = row
            .get("Arrival_Sec")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .map(|v| v.max(0.0) as u64)
            .unwrap_or(0);

        let total_time = row
            .get("Total_Time_Ticks")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| *v > 0.0)
            .or_else(|| {
                row.get("se.sum_exec_runtime")
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .filter(|v| *v > 0.0)
            })
            .map(|v| v.round() as u64)
            .unwrap_or(1)
            .max(1);

        let linux_policy = row
            .get("Scheduling_Policy")
            .map(|s| LinuxPolicy::parse(s))
            .unwrap_or_default();
        let state = row
            .get("State")
            .map(|s| ProcState::parse(s))
            .unwrap_or_default();

        let vruntime = row
            .get("se.vruntime")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(0.0);
        let weight = row
            .get("se.load.weight")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| *v > 0.0)
            .unwrap_or(NICE0_WEIGHT);

        let features = row
            .iter()
            .map(|(k, v)| (k.clone(), Value::parse(v)))
            .collect();

        Task {
            pid,
            name,
            features,
            linux_policy,
            state,
            arrival_time,
            total_time,
            remaining: total_time,
            total_run: 0,
            first_start: None,
            completion_time: None,
            resource_type: ResourceType::default(),
            interactivity: Interactivity::default(),
            execution_class: ExecutionClass::default(),
            priority_class: PriorityClass::default(),
            subqueue_score: 0.0,
            assigned_scheduler: None,
            subqueue: String::new(),
            quantum: 0,
            vruntime,
            weight,
        }
    }

    /// Extracts a numeric feature vector in the order given by `names`,
    /// applying the two known categorical encodings and coercing everything
    /// else through [`Value::as_f64`]. Missing columns contribute `0.0`.
    pub fn feature_vector(&self, names: &[String]) -> Vec<f64> {
        names
            .iter()
            .map(|name| match name.as_str() {
                "Scheduling_Policy" => self.linux_policy.as_encoded(),
                "State" => self.state.as_encoded(),
                _ => self
                    .features
                    .get(name)
                    .map(Value::as_f64)
                    .unwrap_or(0.0),
            })
            .collect()
    }

    pub fn is_completed(&self) -> bool {
        self.completion_time.is_some()
    }

    #[cfg(test)]
    pub fn new_for_test(pid: u64, arrival_time: u64, total_time: u64) -> Self {
        Task {
            pid,
            name: format!("task-{pid}"),
            features: HashMap::new(),
            linux_policy: LinuxPolicy::Other,
            state: ProcState::Running,
            arrival_time,
            total_time,
            remaining: total_time,
            total_run: 0,
            first_start: None,
            completion_time: None,
            resource_type: ResourceType::default(),
            interactivity: Interactivity::default(),
            execution_class: ExecutionClass::default(),
            priority_class: PriorityClass::default(),
            subqueue_score: 0.0,
            assigned_scheduler: None,
            subqueue: String::new(),
            quantum: 0,
            vruntime: 0.0,
            weight: NICE0_WEIGHT,
        }
    }
}
