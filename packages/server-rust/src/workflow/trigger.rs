//! Automation rules and the processor that matches delegate events to them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use ichor_core::{Action, EventData};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::worker::Consumer;

/// Entity name matching every domain.
pub const ANY_ENTITY: &str = "*";

/// Errors raised while loading automation rules.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("reading rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing rules: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate rule name: {0}")]
    DuplicateName(String),
}

/// Fires when an event for `entity` with `action` is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationRule {
    pub name: String,
    /// Domain name (`"currency"`), or `"*"` for every domain.
    pub entity: String,
    pub action: Action,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl AutomationRule {
    #[must_use]
    pub fn matches(&self, event: &EventData) -> bool {
        self.enabled
            && self.action == event.action
            && (self.entity == ANY_ENTITY || self.entity == event.domain)
    }
}

/// Parses a JSON array of rules.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or two rules share a name.
pub fn parse_rules(json: &str) -> Result<Vec<AutomationRule>, RuleError> {
    let rules: Vec<AutomationRule> = serde_json::from_str(json)?;
    let mut names = HashSet::new();
    for rule in &rules {
        if !names.insert(rule.name.as_str()) {
            return Err(RuleError::DuplicateName(rule.name.clone()));
        }
    }
    Ok(rules)
}

/// Reads and parses a rules file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_rules(path: &Path) -> Result<Vec<AutomationRule>, RuleError> {
    let json = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rules(&json)
}

/// Per-rule match counts, shared between the processor and its owner.
#[derive(Debug, Clone, Default)]
pub struct TriggerStats {
    counts: Arc<DashMap<String, u64>>,
}

impl TriggerStats {
    #[must_use]
    pub fn count(&self, rule: &str) -> u64 {
        self.counts.get(rule).map_or(0, |c| *c)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| *c.value()).sum()
    }

    fn record(&self, rule: &str) {
        *self.counts.entry(rule.to_string()).or_insert(0) += 1;
    }
}

/// Matches each event against every rule and records the hits.
pub struct TriggerProcessor {
    rules: Vec<AutomationRule>,
    stats: TriggerStats,
    processed: u64,
}

impl TriggerProcessor {
    #[must_use]
    pub fn new(rules: Vec<AutomationRule>) -> Self {
        Self {
            rules,
            stats: TriggerStats::default(),
            processed: 0,
        }
    }

    #[must_use]
    pub fn stats(&self) -> TriggerStats {
        self.stats.clone()
    }
}

#[async_trait]
impl Consumer for TriggerProcessor {
    type Task = EventData;

    async fn consume(&mut self, event: EventData) {
        self.processed += 1;
        for rule in self.rules.iter().filter(|r| r.matches(&event)) {
            info!(
                rule = %rule.name,
                domain = %event.domain,
                action = %event.action,
                entity_id = %event.entity_id,
                user_id = %event.user_id,
                "workflow rule triggered"
            );
            metrics::counter!("ichor_workflow_triggers_total", "rule" => rule.name.clone())
                .increment(1);
            self.stats.record(&rule.name);
        }
    }

    async fn tick(&mut self) {
        debug!(
            processed = self.processed,
            triggered = self.stats.total(),
            "workflow trigger summary"
        );
    }

    async fn finish(&mut self) {
        info!(
            processed = self.processed,
            triggered = self.stats.total(),
            "workflow trigger processor stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn event(domain: &str, action: Action) -> EventData {
        EventData {
            domain: domain.to_string(),
            action,
            entity_id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            entity: json!({}),
            before: None,
            occurred_at: Utc::now(),
        }
    }

    fn rule(name: &str, entity: &str, action: Action) -> AutomationRule {
        AutomationRule {
            name: name.to_string(),
            entity: entity.to_string(),
            action,
            enabled: true,
        }
    }

    #[test]
    fn rules_parse_with_enabled_default() {
        let rules = parse_rules(
            r#"[
                {"name": "new-currency", "entity": "currency", "action": "created"},
                {"name": "off", "entity": "tag", "action": "deleted", "enabled": false}
            ]"#,
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules[0].enabled);
        assert!(!rules[1].enabled);
        assert_eq!(rules[0].action, Action::Created);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = parse_rules(
            r#"[
                {"name": "a", "entity": "tag", "action": "created"},
                {"name": "a", "entity": "tag", "action": "deleted"}
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, RuleError::DuplicateName(name) if name == "a"));
        assert!(matches!(parse_rules("{"), Err(RuleError::Parse(_))));
    }

    #[test]
    fn rules_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name": "r", "entity": "*", "action": "updated"}}]"#).unwrap();
        let rules = load_rules(file.path()).unwrap();
        assert_eq!(rules, vec![rule("r", ANY_ENTITY, Action::Updated)]);

        let missing = load_rules(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(missing, RuleError::Io { .. }));
    }

    #[test]
    fn matching_honors_entity_action_and_enabled() {
        let created = rule("r", "currency", Action::Created);
        assert!(created.matches(&event("currency", Action::Created)));
        assert!(!created.matches(&event("currency", Action::Deleted)));
        assert!(!created.matches(&event("tag", Action::Created)));

        assert!(rule("any", ANY_ENTITY, Action::Created).matches(&event("tag", Action::Created)));

        let disabled = AutomationRule {
            enabled: false,
            ..created
        };
        assert!(!disabled.matches(&event("currency", Action::Created)));
    }

    #[tokio::test]
    async fn processor_counts_matches_per_rule() {
        let mut processor = TriggerProcessor::new(vec![
            rule("currency-created", "currency", Action::Created),
            rule("anything-created", ANY_ENTITY, Action::Created),
        ]);
        let stats = processor.stats();

        processor.consume(event("currency", Action::Created)).await;
        processor.consume(event("tag", Action::Created)).await;
        processor.consume(event("tag", Action::Updated)).await;

        assert_eq!(stats.count("currency-created"), 1);
        assert_eq!(stats.count("anything-created"), 2);
        assert_eq!(stats.count("unknown"), 0);
        assert_eq!(stats.total(), 3);
    }
}
