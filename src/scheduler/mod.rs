/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The dispatcher and tick engine: per-core pick/dispatch, quantum sizing,
//! and the run/preempt/complete state machine that drives one simulated
//! tick across every core.

use std::collections::HashMap;

use tracing::debug;

use crate::classifier::ClassifierFacade;
use crate::config::{SimConfig, Variant};
use crate::core_table::CoreTable;
use crate::metrics::{EventKind, EventLog};
use crate::policy;
use crate::queue::ReadyQueueSet;
use crate::task::{SchedClass, Task, NICE0_WEIGHT};

const CORE_PRIORITY_ORDER: [SchedClass; 4] =
    [SchedClass::Fifo, SchedClass::Rr, SchedClass::Cfs, SchedClass::Idle];

/// Owns every piece of scheduler state for one run: ready queues, core
/// table, task map, event log and the virtual clock. Variant-specific
/// behaviour (classification, policy assignment, quantum formulas,
/// vruntime bookkeeping) branches on `self.variant` inside otherwise shared
/// code, mirroring how the Baseline and AI schedulers share every method
/// name but differ in a handful of formulas.
pub struct Scheduler {
    pub variant: Variant,
    pub config: SimConfig,
    classifier: ClassifierFacade,
    queues: ReadyQueueSet,
    cores: CoreTable,
    tasks: HashMap<u64, Task>,
    completed: Vec<u64>,
    pub log: EventLog,
    pub time: u64,
}

impl Scheduler {
    pub fn new(variant: Variant, config: SimConfig, classifier: ClassifierFacade) -> Self {
        Scheduler {
            variant,
            cores: CoreTable::new(config.num_cores),
            config,
            classifier,
            queues: ReadyQueueSet::new(),
            tasks: HashMap::new(),
            completed: Vec::new(),
            log: EventLog::new(),
            time: 0,
        }
    }

    pub fn tasks(&self) -> &HashMap<u64, Task> {
        &self.tasks
    }

    pub fn num_cores(&self) -> usize {
        self.cores.len()
    }

    pub fn all_queues_empty(&self) -> bool {
        self.queues.all_empty()
    }

    pub fn all_cores_idle(&self) -> bool {
        self.cores.all_idle()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// AI-variant piecewise-linear RR quantum curve, used both at admission
    /// (so the initial quantum reflects the score before the task first
    /// runs) and recomputed identically at dispatch.
    fn rr_quantum_ai(&self, score: f64) -> u64 {
        let c = &self.config;
        if score <= c.rr_base_score {
            c.rr_base_quantum
        } else if score >= c.rr_max_score {
            c.rr_max_quantum
        } else {
            let frac = (score - c.rr_base_score) / (c.rr_max_score - c.rr_base_score);
            let q = c.rr_base_quantum as f64 + frac * (c.rr_max_quantum - c.rr_base_quantum) as f64;
            q.round() as u64
        }
    }

    fn log_event(&mut self, kind: EventKind, core: Option<usize>, pid: u64, extra: &str) {
        let time = self.time;
        if let Some(task) = self.tasks.get(&pid) {
            self.log.record(time, kind, core, task, extra);
        }
    }

    /// Admits a newly-arrived task: classifies it (AI variant only), scores
    /// and assigns it to a scheduling class, sets its initial quantum if
    /// it lands in RR, and enqueues it.
    pub fn admit(&mut self, mut task: Task) {
        if self.variant == Variant::Ai {
            let (resource, interactivity, priority, execution) = self.classifier.classify(&task);
            task.resource_type = resource;
            task.interactivity = interactivity;
            task.priority_class = priority;
            task.execution_class = execution;
        }
        task.subqueue_score = policy::subqueue_score(&task);

        let class = match self.variant {
            Variant::Baseline => policy::assign_baseline(&task),
            Variant::Ai => policy::assign_ai(&task),
        };
        task.assigned_scheduler = Some(class);
        task.subqueue = class.subqueue().to_string();

        if class == SchedClass::Rr {
            task.quantum = match self.variant {
                Variant::Baseline => self.config.rr_quantum.max(self.config.min_granularity),
                Variant::Ai => self.rr_quantum_ai(task.subqueue_score),
            };
        }

        let pid = task.pid;
        let vruntime = task.vruntime;
        debug!(pid, scheduler = class.as_str(), score = task.subqueue_score, "admit");
        self.tasks.insert(pid, task);
        self.log_event(EventKind::Admit, None, pid, "");

        match class {
            SchedClass::Fifo => self.queues.enqueue_fifo(pid),
            SchedClass::Rr => self.queues.enqueue_rr(pid),
            SchedClass::Cfs => self.queues.enqueue_cfs(pid, vruntime),
            SchedClass::Idle => self.queues.enqueue_idle(pid),
        }
        self.log_event(EventKind::Enqueue, None, pid, "");
    }

    fn first_nonempty_class(&self) -> Option<SchedClass> {
        CORE_PRIORITY_ORDER.into_iter().find(|class| {
            !match class {
                SchedClass::Fifo => self.queues.fifo_is_empty(),
                SchedClass::Rr => self.queues.rr_is_empty(),
                SchedClass::Cfs => self.queues.cfs_is_empty(),
                SchedClass::Idle => self.queues.idle_is_empty(),
            }
        })
    }

    fn compute_quantum(&self, class: SchedClass, pid: u64) -> u64 {
        let task = &self.tasks[&pid];
        match class {
            SchedClass::Fifo | SchedClass::Idle => task.remaining.max(1),
            SchedClass::Rr => match self.variant {
                Variant::Baseline => self.config.rr_quantum.max(self.config.min_granularity),
                Variant::Ai => self.rr_quantum_ai(task.subqueue_score),
            },
            SchedClass::Cfs => {
                let runnable_weight = self.queues.cfs_runnable_weight(&self.tasks) + task.weight;
                let denom = if runnable_weight > 0.0 { runnable_weight } else { task.weight.max(1.0) };
                let base_slice =
                    ((self.config.sched_latency_ticks as f64) * task.weight / denom).floor() as u64;
                match self.variant {
                    Variant::Baseline => base_slice.max(self.config.min_granularity),
                    Variant::Ai => {
                        let exec_scale = task.execution_class.quantum_factor();
                        let score_scale = 1.0 + 0.2 * (task.subqueue_score - 2.0);
                        let quanta = (base_slice as f64 * exec_scale * score_scale).floor();
                        (quanta.max(0.0) as u64).max(self.config.min_granularity)
                    }
                }
            }
        }
    }

    /// Picks a ready task for an idle core (if any) and dispatches it.
    fn dispatch_core(&mut self, core_id: usize) {
        let Some(class) = self.first_nonempty_class() else {
            return;
        };
        let pid = match class {
            SchedClass::Fifo => self.queues.dequeue_fifo(),
            SchedClass::Rr => self.queues.dequeue_rr(),
            SchedClass::Cfs => self.queues.dequeue_cfs_min(&self.tasks),
            SchedClass::Idle => self.queues.dequeue_idle(),
        };
        let Some(pid) = pid else {
            return;
        };

        let quantum = self.compute_quantum(class, pid);
        let time = self.time;
        if let Some(task) = self.tasks.get_mut(&pid) {
            task.quantum = quantum;
            if task.first_start.is_none() {
                task.first_start = Some(time);
            }
        }
        {
            let core = self.cores.get_mut(core_id);
            core.running = Some(pid);
            core.time_left = quantum;
        }
        self.log_event(EventKind::Dispatch, Some(core_id), pid, "");
    }

    /// Runs one tick of work on `core_id`'s current task, if any, handling
    /// vruntime bookkeeping, completion and quantum-expiry preemption.
    fn run_tick_on_core(&mut self, core_id: usize) {
        let Some(pid) = self.cores.get(core_id).running else {
            return;
        };
        let time = self.time;
        let class = self.tasks.get(&pid).and_then(|t| t.assigned_scheduler);

        if let Some(task) = self.tasks.get_mut(&pid) {
            task.remaining = task.remaining.saturating_sub(1);
            task.total_run += 1;
            if class == Some(SchedClass::Cfs) {
                let weight = if task.weight > 0.0 { task.weight } else { 1.0 };
                let base_inc = NICE0_WEIGHT / weight;
                task.vruntime += match self.variant {
                    Variant::Baseline => base_inc,
                    Variant::Ai => base_inc * (2.0 / task.subqueue_score.max(0.5)),
                };
            }
        }

        let time_left_after = {
            let core = self.cores.get_mut(core_id);
            core.time_left = core.time_left.saturating_sub(1);
            core.time_left
        };

        self.log_event(EventKind::Run, Some(core_id), pid, "");

        let remaining_now = self.tasks.get(&pid).map(|t| t.remaining).unwrap_or(0);
        if remaining_now == 0 {
            if let Some(task) = self.tasks.get_mut(&pid) {
                task.completion_time = Some(time);
            }
            self.log_event(EventKind::Complete, Some(core_id), pid, "");
            self.completed.push(pid);
            self.cores.get_mut(core_id).clear();
            return;
        }

        if time_left_after == 0 {
            self.log_event(EventKind::Preempt, Some(core_id), pid, "quantum expired");
            self.cores.get_mut(core_id).clear();
            match class {
                Some(SchedClass::Rr) => self.queues.enqueue_rr(pid),
                Some(SchedClass::Cfs) => {
                    let vr = self.tasks[&pid].vruntime;
                    self.queues.enqueue_cfs(pid, vr);
                }
                Some(SchedClass::Fifo) => self.queues.requeue_fifo_front(pid),
                Some(SchedClass::Idle) | None => self.queues.enqueue_idle(pid),
            }
        }
    }

    /// Advances the simulation by one tick: for each core in ascending id
    /// order, dispatch onto it if idle, then run one unit of work.
    pub fn run_tick(&mut self, time: u64) {
        self.time = time;
        for core_id in 0..self.cores.len() {
            if self.cores.get(core_id).is_idle() {
                self.dispatch_core(core_id);
            }
            self.run_tick_on_core(core_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ExecutionClass, Interactivity, LinuxPolicy, PriorityClass, Task};

    fn scheduler(variant: Variant, num_cores: usize) -> Scheduler {
        let mut config = SimConfig::default();
        config.num_cores = num_cores;
        Scheduler::new(variant, config, ClassifierFacade::absent())
    }

    fn task(pid: u64, arrival: u64, total: u64, policy: LinuxPolicy) -> Task {
        let mut t = Task::new_for_test(pid, arrival, total);
        t.linux_policy = policy;
        t
    }

    fn run_until_drained(s: &mut Scheduler, max_ticks: u64) {
        let mut t = 0u64;
        while t < max_ticks
            && (s.completed_count() < s.tasks().len() || !s.all_queues_empty() || !s.all_cores_idle())
        {
            s.run_tick(t);
            t += 1;
        }
    }

    #[test]
    fn scenario_single_fifo_task() {
        let mut s = scheduler(Variant::Baseline, 4);
        s.admit(task(1, 0, 10, LinuxPolicy::Fifo));
        run_until_drained(&mut s, 100);
        let t = &s.tasks()[&1];
        assert_eq!(t.completion_time, Some(9));
        assert_eq!(t.first_start, Some(0));
        assert_eq!(s.completed_count(), 1);
    }

    #[test]
    fn scenario_two_rr_tasks_one_core() {
        let mut config = SimConfig::default();
        config.num_cores = 1;
        config.rr_quantum = 100;
        let mut s = Scheduler::new(Variant::Baseline, config, ClassifierFacade::absent());
        s.admit(task(1, 0, 250, LinuxPolicy::RoundRobin));
        s.admit(task(2, 0, 250, LinuxPolicy::RoundRobin));
        run_until_drained(&mut s, 1000);
        assert!(s.tasks()[&1].is_completed());
        assert!(s.tasks()[&2].is_completed());
        // Three 100-tick turns each for both tasks (100+100+50 = 250), so six
        // dispatches total before both drain.
        assert_eq!(s.log.context_switches(), 6);
    }

    #[test]
    fn scenario_cfs_two_task_share() {
        let mut config = SimConfig::default();
        config.num_cores = 1;
        let mut s = Scheduler::new(Variant::Baseline, config, ClassifierFacade::absent());
        s.admit(task(1, 0, 100, LinuxPolicy::Other));
        s.admit(task(2, 0, 100, LinuxPolicy::Other));
        run_until_drained(&mut s, 1000);
        let t1 = &s.tasks()[&1];
        let t2 = &s.tasks()[&2];
        assert_eq!(t1.total_run, t2.total_run);
        assert_eq!(t1.total_run, 100);
    }

    #[test]
    fn scenario_ai_policy_promotion() {
        let mut s = scheduler(Variant::Ai, 4);
        let mut t = task(1, 0, 10, LinuxPolicy::Other);
        t.interactivity = Interactivity::Interactive;
        t.execution_class = ExecutionClass::Short;
        t.priority_class = PriorityClass::High;
        s.admit(t);
        assert_eq!(s.tasks()[&1].assigned_scheduler, Some(SchedClass::Rr));
    }

    #[test]
    fn scenario_realtime_override() {
        let mut s = scheduler(Variant::Ai, 4);
        let mut t = task(1, 0, 10, LinuxPolicy::Other);
        t.interactivity = Interactivity::RealTime;
        s.admit(t);
        assert_eq!(s.tasks()[&1].assigned_scheduler, Some(SchedClass::Fifo));
    }

    #[test]
    fn scenario_drain_and_stop_with_safety_cap() {
        let mut s = scheduler(Variant::Baseline, 4);
        for pid in 1..=100u64 {
            let arrival = pid % 51;
            s.admit(task(pid, arrival, 5, LinuxPolicy::Other));
        }
        run_until_drained(&mut s, 10_000);
        assert_eq!(s.completed_count(), 100);
    }

    #[test]
    fn work_conservation_no_core_idles_while_ready_queue_nonempty() {
        let mut s = scheduler(Variant::Baseline, 2);
        s.admit(task(1, 0, 5, LinuxPolicy::Fifo));
        s.admit(task(2, 0, 5, LinuxPolicy::Fifo));
        s.admit(task(3, 0, 5, LinuxPolicy::Fifo));
        s.run_tick(0);
        assert!(!s.all_cores_idle());
        assert_eq!(s.tasks().values().filter(|t| t.first_start == Some(0)).count(), 2);
    }
}
