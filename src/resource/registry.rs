//! Resource Registry - Load resource type definitions from JSON
//!
//! Each resource kind is discovered the same way; what differs is the metric
//! that identifies it, the dimension that carries its name and the marker
//! that flags its error variant. Those values live in embedded JSON files.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[include_str!("../resources/sqs.json")];

/// Resource type definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceTypeDef {
    pub display_name: String,
    /// Metrics namespace the identifying metric lives in
    pub namespace: String,
    /// Metric every live resource of this kind publishes
    pub metric_name: String,
    /// Dimension whose value is the resource name
    pub dimension_name: String,
    /// Name suffix marking the error (dead-letter) variant
    #[serde(default)]
    pub error_suffix: Option<String>,
}

impl ResourceTypeDef {
    pub fn new(namespace: &str, metric_name: &str, dimension_name: &str) -> Self {
        Self {
            display_name: dimension_name.to_string(),
            namespace: namespace.to_string(),
            metric_name: metric_name.to_string(),
            dimension_name: dimension_name.to_string(),
            error_suffix: None,
        }
    }

    pub fn with_error_suffix(mut self, suffix: &str) -> Self {
        self.error_suffix = Some(suffix.to_string());
        self
    }

    /// Whether `name` follows the error-variant naming convention
    pub fn is_error_variant(&self, name: &str) -> bool {
        match self.error_suffix.as_deref() {
            Some(suffix) if !suffix.is_empty() => name.ends_with(suffix),
            _ => false,
        }
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceTypeDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource type definition by key
pub fn get_resource_type(key: &str) -> Option<&'static ResourceTypeDef> {
    get_registry().resources.get(key)
}

/// Get all resource type keys, sorted
pub fn get_all_resource_type_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads_successfully() {
        let registry = get_registry();
        assert!(
            !registry.resources.is_empty(),
            "Registry should have resource types"
        );
    }

    #[test]
    fn test_sqs_queues_resource_type_exists() {
        let def = get_resource_type("sqs-queues").expect("SQS queues should be registered");
        assert_eq!(def.namespace, "AWS/SQS");
        assert_eq!(def.metric_name, "ApproximateAgeOfOldestMessage");
        assert_eq!(def.dimension_name, "QueueName");
        assert_eq!(def.error_suffix.as_deref(), Some("_error"));
    }

    #[test]
    fn test_get_all_resource_type_keys() {
        let keys = get_all_resource_type_keys();
        assert!(keys.contains(&"sqs-queues"));
    }

    #[test]
    fn test_error_variant_suffix() {
        let def = get_resource_type("sqs-queues").unwrap();
        assert!(def.is_error_variant("Queue-4_error"));
        assert!(!def.is_error_variant("Queue-4"));
        assert!(!def.is_error_variant("Queue_error-4"));
        assert!(!def.is_error_variant(""));
    }

    #[test]
    fn test_no_suffix_never_matches() {
        let def = ResourceTypeDef::new("AWS/SQS", "ApproximateAgeOfOldestMessage", "QueueName");
        assert!(!def.is_error_variant("Queue-4_error"));

        let def = def.with_error_suffix("");
        assert!(!def.is_error_variant("Queue-4_error"));
    }
}
