//! Workflow automation fed by delegate events.
//!
//! A [`WorkflowQueue`] is registered with the delegate for every domain. It
//! forwards events to a [`Worker`] running a [`TriggerProcessor`],
//! so request handlers never wait on rule evaluation.

mod queue;
pub mod trigger;
pub mod worker;

pub use queue::WorkflowQueue;
pub use trigger::{load_rules, parse_rules, AutomationRule, RuleError, TriggerProcessor, TriggerStats};
pub use worker::{Consumer, SubmitError, TaskSender, Worker, WorkerConfig};

use std::sync::Arc;

use ichor_core::{Delegate, EventHandler};
use tracing::info;

/// Running workflow subsystem.
pub struct Workflow {
    worker: Worker<TriggerProcessor>,
    stats: TriggerStats,
}

impl Workflow {
    /// Starts the trigger worker and registers its queue for every action
    /// on each of `domains`. Must be called inside a tokio runtime.
    pub fn start(
        rules: Vec<AutomationRule>,
        config: WorkerConfig,
        delegate: &Delegate,
        domains: &[&str],
    ) -> Self {
        let rule_count = rules.len();
        let processor = TriggerProcessor::new(rules);
        let stats = processor.stats();
        let worker = Worker::start(processor, config);

        let queue: Arc<dyn EventHandler> = Arc::new(WorkflowQueue::new(worker.sender()));
        for domain in domains {
            delegate.register_all(domain, &queue);
        }

        info!(
            rules = rule_count,
            domains = domains.len(),
            capacity = config.capacity,
            "workflow started"
        );
        Self { worker, stats }
    }

    #[must_use]
    pub fn stats(&self) -> &TriggerStats {
        &self.stats
    }

    /// Processes what is already queued, then stops.
    pub async fn stop(mut self) {
        self.worker.stop().await;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ichor_core::{Action, EventData};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn event(domain: &str) -> EventData {
        EventData {
            domain: domain.to_string(),
            action: Action::Created,
            entity_id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            entity: json!({"id": 1}),
            before: None,
            occurred_at: Utc::now(),
        }
    }

    fn rules() -> Vec<AutomationRule> {
        vec![AutomationRule {
            name: "tag-created".to_string(),
            entity: "tag".to_string(),
            action: Action::Created,
            enabled: true,
        }]
    }

    #[tokio::test]
    async fn delegate_events_reach_the_processor() {
        let delegate = Delegate::new();
        let workflow = Workflow::start(rules(), WorkerConfig::default(), &delegate, &["tag", "currency"]);
        assert_eq!(delegate.handler_count("tag", Action::Deleted), 1);

        delegate.call(&event("tag")).await.unwrap();
        delegate.call(&event("currency")).await.unwrap();

        let stats = workflow.stats().clone();
        workflow.stop().await;
        assert_eq!(stats.count("tag-created"), 1);
        assert_eq!(stats.total(), 1);
    }

    #[tokio::test]
    async fn full_queue_fails_the_handler_only() {
        let delegate = Delegate::new();
        let config = WorkerConfig {
            capacity: 1,
            ..WorkerConfig::default()
        };
        let workflow = Workflow::start(rules(), config, &delegate, &["tag"]);

        // Nothing is dequeued until the test yields to the worker task.
        delegate.call(&event("tag")).await.unwrap();
        let err = delegate.call(&event("tag")).await.unwrap_err();
        assert_eq!(err.failures[0].0, "workflow_queue");
        assert!(err.failures[0].1.contains("full"));

        workflow.stop().await;
    }
}
