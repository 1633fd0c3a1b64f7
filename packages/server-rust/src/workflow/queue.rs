use async_trait::async_trait;
use ichor_core::{EventData, EventHandler};

use super::worker::TaskSender;

/// Delegate handler that hands events to the workflow worker.
///
/// Never waits: a full queue fails the handler, which the business layer
/// logs, and the event is dropped.
pub struct WorkflowQueue {
    sender: TaskSender<EventData>,
}

impl WorkflowQueue {
    #[must_use]
    pub fn new(sender: TaskSender<EventData>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl EventHandler for WorkflowQueue {
    fn name(&self) -> &str {
        "workflow_queue"
    }

    async fn handle(&self, event: &EventData) -> anyhow::Result<()> {
        if let Err(e) = self.sender.try_submit(event.clone()) {
            metrics::counter!("ichor_workflow_events_dropped_total").increment(1);
            return Err(e.into());
        }
        Ok(())
    }
}
