//! Recipe schema definitions.
//!
//! Struct definitions that map to the YAML recipe file format. Actions are a
//! list, not a map: the document order is the insertion order used to break
//! topological ties, so runs are reproducible from the same file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CairnError, Result};

/// Root structure for a `cairn.yml` recipe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipe {
    /// Recipe name (for display purposes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Global environment variables for command bodies and probes.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Action definitions, in execution-preference order.
    pub actions: Vec<ActionConfig>,
}

impl Recipe {
    /// Validate recipe-level constraints before resolution.
    pub fn validate(&self) -> Result<()> {
        for action in &self.actions {
            if action.id.trim().is_empty() {
                return Err(CairnError::RecipeValidationError {
                    message: "action with empty id".to_string(),
                });
            }
            if action.command.trim().is_empty() {
                return Err(CairnError::RecipeValidationError {
                    message: format!("action '{}' has no command", action.id),
                });
            }
            if let Some(retry) = &action.retry {
                if retry.max_attempts == 0 {
                    return Err(CairnError::RecipeValidationError {
                        message: format!(
                            "action '{}': retry.max_attempts must be at least 1",
                            action.id
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// One action definition within a recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Unique action id.
    pub id: String,

    /// Shell command to execute.
    pub command: String,

    /// Check if the action's effect is already in place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<GuardConfig>,

    /// Actions that must complete before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,

    /// Refresh triggers to notify when this action actually runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notifies: Vec<String>,

    /// Retry policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryConfig>,

    /// Max seconds per attempt; 0 means unbounded.
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub timeout_secs: u64,

    /// Run only when notified, never on its own.
    #[serde(default, skip_serializing_if = "is_false")]
    pub refresh_only: bool,

    /// Action-specific environment variables.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

/// Retry policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    /// Fixed delay between attempts, in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 0,
        }
    }
}

/// Guard configuration: how to probe whether an action is already done.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuardConfig {
    /// A file or directory exists.
    FileExists {
        /// Path to check (relative to the run working directory).
        path: String,
    },

    /// A probe command exits 0.
    CommandSucceeds {
        /// Command to run.
        command: String,
    },

    /// A directory is already present on PATH.
    PathContains {
        /// Directory entry to look for.
        entry: String,
    },

    /// All probes must be satisfied.
    All {
        /// Probes that must all be satisfied.
        guards: Vec<GuardConfig>,
    },

    /// Any probe being satisfied is sufficient.
    Any {
        /// Probes where at least one must be satisfied.
        guards: Vec<GuardConfig>,
    },
}

fn is_false(v: &bool) -> bool {
    !v
}

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Recipe {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn parses_minimal_recipe() {
        let recipe = parse(
            r#"
            actions:
              - id: download
                command: curl -o php.zip https://example/php.zip
        "#,
        );

        assert!(recipe.name.is_none());
        assert_eq!(recipe.actions.len(), 1);
        assert_eq!(recipe.actions[0].id, "download");
        assert!(recipe.validate().is_ok());
    }

    #[test]
    fn parses_full_action() {
        let recipe = parse(
            r#"
            name: php-dev-host
            env:
              CACHE_DIR: /var/cache/provision
            actions:
              - id: set_path
                command: update-path /opt/php
                guard: { type: path_contains, entry: /opt/php }
                requires: [unzip]
                notifies: [refresh_env]
                retry: { max_attempts: 3, backoff_ms: 500 }
                timeout_secs: 120
                env:
                  TARGET: /opt/php
              - id: refresh_env
                command: rehash-environment
                refresh_only: true
        "#,
        );

        let action = &recipe.actions[0];
        assert_eq!(action.requires, vec!["unzip"]);
        assert_eq!(action.notifies, vec!["refresh_env"]);
        assert_eq!(action.retry.as_ref().unwrap().max_attempts, 3);
        assert_eq!(action.retry.as_ref().unwrap().backoff_ms, 500);
        assert_eq!(action.timeout_secs, 120);
        assert_eq!(action.env.get("TARGET").unwrap(), "/opt/php");
        assert!(recipe.actions[1].refresh_only);
        assert_eq!(recipe.env.get("CACHE_DIR").unwrap(), "/var/cache/provision");
    }

    #[test]
    fn parses_guard_variants() {
        let recipe = parse(
            r#"
            actions:
              - id: unzip
                command: unzip php.zip
                guard:
                  type: all
                  guards:
                    - { type: file_exists, path: /opt/php }
                    - type: any
                      guards:
                        - { type: command_succeeds, command: php --version }
                        - { type: file_exists, path: /opt/php/php }
        "#,
        );

        let guard = recipe.actions[0].guard.as_ref().unwrap();
        assert!(matches!(guard, GuardConfig::All { .. }));
    }

    #[test]
    fn document_order_is_preserved() {
        let recipe = parse(
            r#"
            actions:
              - { id: zebra, command: echo z }
              - { id: apple, command: echo a }
              - { id: mango, command: echo m }
        "#,
        );

        let ids: Vec<_> = recipe.actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn validate_rejects_empty_command() {
        let recipe = parse(
            r#"
            actions:
              - id: broken
                command: "   "
        "#,
        );

        let result = recipe.validate();
        assert!(matches!(
            result,
            Err(CairnError::RecipeValidationError { message }) if message.contains("broken")
        ));
    }

    #[test]
    fn validate_rejects_empty_id() {
        let recipe = parse(
            r#"
            actions:
              - id: ""
                command: echo hi
        "#,
        );

        assert!(recipe.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_max_attempts() {
        let recipe = parse(
            r#"
            actions:
              - id: download
                command: echo hi
                retry: { max_attempts: 0 }
        "#,
        );

        let result = recipe.validate();
        assert!(matches!(
            result,
            Err(CairnError::RecipeValidationError { message }) if message.contains("max_attempts")
        ));
    }

    #[test]
    fn retry_defaults_apply() {
        let config: RetryConfig = serde_yaml::from_str("backoff_ms: 250").unwrap();
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.backoff_ms, 250);
    }
}
