// ABOUTME: Shared execution context handed to workers during a run
// ABOUTME: Carries run identity and a mutex-guarded cross-task artifact map

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Runtime context shared by every task execution in a run.
///
/// Cloning is cheap: the artifact map is behind an `Arc<RwLock>` because
/// multiple in-flight tasks may complete and write near-simultaneously,
/// even though the scheduler processes completions one at a time.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub goal: String,
    pub run_id: String,
    pub start_time: DateTime<Utc>,
    artifacts: Arc<RwLock<HashMap<String, String>>>,
}

impl ExecutionContext {
    pub fn new(goal: String) -> Self {
        Self {
            goal,
            run_id: uuid::Uuid::new_v4().to_string(),
            start_time: Utc::now(),
            artifacts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record a named artifact produced by a task. Later writes to the same
    /// name replace earlier ones.
    pub async fn record_artifact(&self, name: String, content: String) {
        let mut artifacts = self.artifacts.write().await;
        artifacts.insert(name, content);
    }

    pub async fn artifact(&self, name: &str) -> Option<String> {
        let artifacts = self.artifacts.read().await;
        artifacts.get(name).cloned()
    }

    pub async fn all_artifacts(&self) -> HashMap<String, String> {
        let artifacts = self.artifacts.read().await;
        artifacts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_context_creation() {
        let context = ExecutionContext::new("ship it".to_string());
        assert_eq!(context.goal, "ship it");
        assert!(!context.run_id.is_empty());
        assert!(context.all_artifacts().await.is_empty());
    }

    #[tokio::test]
    async fn test_artifacts_are_shared_across_clones() {
        let context = ExecutionContext::new("goal".to_string());
        let clone = context.clone();

        clone
            .record_artifact("t1_result.txt".to_string(), "output".to_string())
            .await;

        assert_eq!(
            context.artifact("t1_result.txt").await,
            Some("output".to_string())
        );
    }

    #[tokio::test]
    async fn test_artifact_overwrite() {
        let context = ExecutionContext::new("goal".to_string());
        context
            .record_artifact("a".to_string(), "first".to_string())
            .await;
        context
            .record_artifact("a".to_string(), "second".to_string())
            .await;

        assert_eq!(context.artifact("a").await, Some("second".to_string()));
    }
}
