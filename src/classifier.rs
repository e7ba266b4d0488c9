/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Classifier façade: the narrow boundary between the tick engine and the
//! external ML model artifacts.
//!
//! The simulator never depends on a concrete ML framework. A
//! [`CategoryModel`] wraps whatever a caller provides — a hand-rolled
//! decision table, a loaded ONNX/XGBoost model, or (for the Baseline variant
//! and for tests) nothing at all — behind a predictor closure, a decoder
//! closure and the ordered feature-name list the predictor expects.

use tracing::warn;

use crate::task::{ExecutionClass, Interactivity, PriorityClass, ResourceType, Task};

/// One category's model: predicts a class index from a feature vector, then
/// decodes that index to a label string. Both steps are allowed to fail —
/// classification failure must never abort admission (see
/// [`ClassifierFacade::classify`]).
pub struct CategoryModel {
    pub feature_names: Vec<String>,
    predictor: Box<dyn Fn(&[f64]) -> Option<usize> + Send + Sync>,
    decoder: Box<dyn Fn(usize) -> Option<String> + Send + Sync>,
}

impl CategoryModel {
    pub fn new(
        feature_names: Vec<String>,
        predictor: impl Fn(&[f64]) -> Option<usize> + Send + Sync + 'static,
        decoder: impl Fn(usize) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        CategoryModel {
            feature_names,
            predictor: Box::new(predictor),
            decoder: Box::new(decoder),
        }
    }

    /// A model with no feature requirements that never predicts anything,
    /// so the category always falls through to its safe default.
    pub fn absent() -> Self {
        CategoryModel::new(Vec::new(), |_| None, |_| None)
    }

    fn classify(&self, task: &Task) -> Option<String> {
        let features = task.feature_vector(&self.feature_names);
        let idx = (self.predictor)(&features)?;
        (self.decoder)(idx)
    }
}

/// Four independent per-category models, one per classification axis.
pub struct ClassifierFacade {
    pub resource: CategoryModel,
    pub interactivity: CategoryModel,
    pub priority: CategoryModel,
    pub execution: CategoryModel,
}

impl ClassifierFacade {
    /// A facade whose every category is [`CategoryModel::absent`] — every
    /// task falls back to the documented defaults. Used by the Baseline
    /// variant, which never invokes the classifier, and by tests that don't
    /// care about classification.
    pub fn absent() -> Self {
        ClassifierFacade {
            resource: CategoryModel::absent(),
            interactivity: CategoryModel::absent(),
            priority: CategoryModel::absent(),
            execution: CategoryModel::absent(),
        }
    }

    /// Classifies a task into its four labels. Any category whose model
    /// fails to predict or decode falls back to its documented default and
    /// logs a warning; classification as a whole can never fail.
    pub fn classify(
        &self,
        task: &Task,
    ) -> (ResourceType, Interactivity, PriorityClass, ExecutionClass) {
        let resource = self
            .resource
            .classify(task)
            .map(|l| ResourceType::parse(&l))
            .unwrap_or_else(|| {
                warn!(pid = task.pid, "resource classifier failed, defaulting to Mixed");
                ResourceType::default()
            });

        let interactivity = self
            .interactivity
            .classify(task)
            .map(|l| Interactivity::parse(&l))
            .unwrap_or_else(|| {
                warn!(pid = task.pid, "interactivity classifier failed, defaulting to Other");
                Interactivity::default()
            });

        let priority = self
            .priority
            .classify(task)
            .map(|l| PriorityClass::parse(&l))
            .unwrap_or_else(|| {
                warn!(pid = task.pid, "priority classifier failed, defaulting to Medium");
                PriorityClass::default()
            });

        let execution = self
            .execution
            .classify(task)
            .map(|l| ExecutionClass::parse(&l))
            .unwrap_or_else(|| {
                warn!(pid = task.pid, "execution classifier failed, defaulting to Medium");
                ExecutionClass::default()
            });

        (resource, interactivity, priority, execution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn absent_facade_defaults_every_category() {
        let facade = ClassifierFacade::absent();
        let task = Task::from_row(&HashMap::new(), 1);
        let (r, i, p, e) = facade.classify(&task);
        assert_eq!(r, ResourceType::Mixed);
        assert_eq!(i, Interactivity::Other);
        assert_eq!(p, PriorityClass::Medium);
        assert_eq!(e, ExecutionClass::Medium);
    }

    #[test]
    fn model_predicts_and_decodes_when_features_present() {
        let model = CategoryModel::new(
            vec!["cpu_pct".to_string()],
            |f| if f[0] > 50.0 { Some(1) } else { Some(0) },
            |idx| Some(if idx == 1 { "CPU-bound" } else { "IO-bound" }.to_string()),
        );
        let mut row = HashMap::new();
        row.insert("cpu_pct".to_string(), "90".to_string());
        let task = Task::from_row(&row, 1);
        assert_eq!(model.classify(&task).as_deref(), Some("CPU-bound"));
    }

    #[test]
    fn failed_predictor_falls_through_to_none() {
        let model = CategoryModel::new(vec![], |_| None, |_| Some("unused".into()));
        let task = Task::from_row(&HashMap::new(), 1);
        assert_eq!(model.classify(&task), None);
    }
}
