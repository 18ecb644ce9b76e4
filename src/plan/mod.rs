// ABOUTME: Plan ingestion module for the HTN execution engine
// ABOUTME: Handles loading, parsing, and structural validation of task plans

pub mod error;
pub mod task;
pub mod validation;

pub use error::{PlanError, Result};
pub use task::{Plan, PromptOverride, Role, Task, TeamSpec};
pub use validation::{PlanValidator, ValidationReport};

use std::path::Path;

impl Plan {
    /// Load a plan from a file, choosing the format by extension.
    /// `.json` parses as JSON; everything else is treated as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Parse a plan from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let plan: Plan = serde_yaml::from_str(content)?;
        plan.validate_structure()?;
        Ok(plan)
    }

    /// Parse a plan from a JSON string (the format the upstream planner
    /// emits).
    pub fn from_json(content: &str) -> Result<Self> {
        let plan: Plan = serde_json::from_str(content)?;
        plan.validate_structure()?;
        Ok(plan)
    }

    fn validate_structure(&self) -> Result<()> {
        if self.high_level_goal.trim().is_empty() {
            return Err(PlanError::MissingField("high_level_goal".to_string()));
        }

        if self.tasks.is_empty() {
            return Err(PlanError::EmptyPlan);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_from_yaml() {
        let yaml = r#"
high_level_goal: Ship the release
roles:
  - name: builder
tasks:
  - id: build
    description: Build the artifacts
    agent: builder
  - id: publish
    description: Publish the artifacts
    agent: builder
    deps: [build]
"#;

        let plan = Plan::from_yaml(yaml).unwrap();
        assert_eq!(plan.high_level_goal, "Ship the release");
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.tasks[1].deps, vec!["build"]);
    }

    #[test]
    fn test_plan_from_json_with_subtasks() {
        let json = r#"{
            "high_level_goal": "Nested",
            "tasks": [
                {
                    "id": "phase",
                    "description": "Container phase",
                    "agent": "",
                    "subtasks": [
                        {"id": "step1", "description": "First step", "agent": "a"},
                        {"id": "step2", "description": "Second step", "agent": "a", "deps": ["step1"]}
                    ]
                }
            ]
        }"#;

        let plan = Plan::from_json(json).unwrap();
        assert_eq!(plan.node_count(), 3);
        assert!(plan.tasks[0].is_container());
    }

    #[test]
    fn test_empty_plan_rejected() {
        let yaml = "high_level_goal: Nothing to do\ntasks: []\n";
        let result = Plan::from_yaml(yaml);
        assert!(matches!(result, Err(PlanError::EmptyPlan)));
    }

    #[test]
    fn test_missing_goal_rejected() {
        let yaml = r#"
high_level_goal: "  "
tasks:
  - id: t1
    description: something
    agent: a
"#;
        let result = Plan::from_yaml(yaml);
        assert!(matches!(result, Err(PlanError::MissingField(_))));
    }
}
