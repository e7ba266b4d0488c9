/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Policy mapper: turns a task's classification labels into a single
//! `subqueue_score` and picks the internal [`SchedClass`] a task runs
//! under.

use crate::task::{Interactivity, LinuxPolicy, PriorityClass, SchedClass, Task};

const W_RESOURCE: f64 = 0.20;
const W_INTERACTIVITY: f64 = 0.35;
const W_EXECUTION: f64 = 0.20;
const W_PRIORITY: f64 = 0.30;

/// Threshold above which the AI variant promotes a task straight to RR
/// regardless of its individual labels.
const PROMOTE_SCORE: f64 = 2.6;

/// Weighted combination of the four numeric label weights.
pub fn subqueue_score(task: &Task) -> f64 {
    W_RESOURCE * task.resource_type.weight()
        + W_INTERACTIVITY * task.interactivity.weight()
        + W_EXECUTION * task.execution_class.weight()
        + W_PRIORITY * task.priority_class.weight()
}

/// Assignment used by the Baseline variant: only the task's own Linux
/// policy matters, never the (unclassified) labels.
pub fn assign_baseline(task: &Task) -> SchedClass {
    match task.linux_policy {
        LinuxPolicy::Fifo => SchedClass::Fifo,
        LinuxPolicy::RoundRobin => SchedClass::Rr,
        LinuxPolicy::Idle => SchedClass::Idle,
        LinuxPolicy::Other | LinuxPolicy::Batch => SchedClass::Cfs,
    }
}

/// Assignment used by the AI variant. Explicit Linux policy still takes
/// priority over the classifier's opinion; only `SCHED_OTHER`/`SCHED_BATCH`
/// tasks are routed by their labels and `subqueue_score`.
pub fn assign_ai(task: &Task) -> SchedClass {
    match task.linux_policy {
        LinuxPolicy::Fifo => return SchedClass::Fifo,
        LinuxPolicy::RoundRobin => return SchedClass::Rr,
        LinuxPolicy::Idle => return SchedClass::Idle,
        LinuxPolicy::Other | LinuxPolicy::Batch => {}
    }

    if task.interactivity == Interactivity::RealTime {
        return SchedClass::Fifo;
    }

    let promote_to_rr = (task.interactivity == Interactivity::Interactive
        && task.execution_class == crate::task::ExecutionClass::Short
        && task.priority_class == PriorityClass::High)
        || task.subqueue_score > PROMOTE_SCORE;

    if promote_to_rr {
        SchedClass::Rr
    } else {
        SchedClass::Cfs
    }
}
