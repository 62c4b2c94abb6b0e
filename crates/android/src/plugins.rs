//! Plugin application order
//!
//! Prerequisites form a graph with an edge from each prerequisite to the
//! plugin that needs it. The table comes from configuration, so it is
//! checked for cycles before use.

use buildspec_core::config::PluginsConfig;
use buildspec_core::error::{Error, ErrorCode, Result};
use buildspec_core::validation::{ValidationError, ValidationResult};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};

/// Prerequisite table for plugin ids
#[derive(Debug, Clone)]
pub struct PluginRules {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
    aliases: BTreeMap<String, String>,
}

impl PluginRules {
    /// Build from configuration, rejecting cyclic tables
    pub fn from_config(config: &PluginsConfig) -> Result<Self> {
        let mut rules = Self {
            graph: DiGraph::new(),
            nodes: HashMap::new(),
            aliases: config.aliases.clone(),
        };

        for (plugin, prerequisites) in &config.prerequisites {
            let plugin = rules.canonical(plugin).to_string();
            let dependent = rules.node(&plugin);
            for prerequisite in prerequisites {
                let prerequisite = rules.canonical(prerequisite).to_string();
                let before = rules.node(&prerequisite);
                rules.graph.update_edge(before, dependent, ());
            }
        }

        if let Err(cycle) = toposort(&rules.graph, None) {
            let plugin = &rules.graph[cycle.node_id()];
            return Err(Error::new(
                ErrorCode::ConfigValidationError,
                format!("Plugin prerequisites form a cycle through `{}`", plugin),
            )
            .with_suggestion("Remove one of the [plugins.prerequisites] entries on the cycle"));
        }

        Ok(rules)
    }

    fn node(&mut self, id: &str) -> NodeIndex {
        if let Some(index) = self.nodes.get(id) {
            return *index;
        }
        let index = self.graph.add_node(id.to_string());
        self.nodes.insert(id.to_string(), index);
        index
    }

    /// Qualified id for an alias such as `kotlin-android`
    pub fn canonical<'a>(&'a self, id: &'a str) -> &'a str {
        self.aliases.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Plugins that must be applied before `id`
    pub fn prerequisites(&self, id: &str) -> Vec<&str> {
        let Some(index) = self.nodes.get(self.canonical(id)) else {
            return Vec::new();
        };
        let mut found: Vec<&str> = self
            .graph
            .neighbors_directed(*index, Direction::Incoming)
            .map(|n| self.graph[n].as_str())
            .collect();
        found.sort_unstable();
        found
    }

    /// Check an applied plugin list
    ///
    /// Duplicates are warnings. A prerequisite applied later, or not at
    /// all, is an error.
    pub fn check(&self, plugins: &[String]) -> ValidationResult {
        let mut result = ValidationResult::new();
        let mut first_position: HashMap<&str, usize> = HashMap::new();

        for (position, plugin) in plugins.iter().enumerate() {
            let id = self.canonical(plugin);
            if first_position.contains_key(id) {
                result.add_warning(
                    ValidationError::new(
                        "plugins",
                        "DUPLICATE_PLUGIN",
                        format!("Plugin `{}` is applied more than once", plugin),
                    )
                    .actual(plugin.clone()),
                );
            } else {
                first_position.insert(id, position);
            }
        }

        for (position, plugin) in plugins.iter().enumerate() {
            let id = self.canonical(plugin);
            if first_position.get(id) != Some(&position) {
                continue;
            }
            for prerequisite in self.prerequisites(id) {
                match first_position.get(prerequisite) {
                    Some(&before) if before < position => {}
                    Some(_) => result.add_error(
                        ValidationError::new(
                            "plugins",
                            "PLUGIN_ORDER",
                            format!("`{}` must be applied after `{}`", plugin, prerequisite),
                        )
                        .expected(format!("{} before {}", prerequisite, plugin))
                        .actual(format!("{} before {}", plugin, prerequisite)),
                    ),
                    None => result.add_error(
                        ValidationError::new(
                            "plugins",
                            "MISSING_PREREQUISITE",
                            format!("`{}` requires `{}`, which is not applied", plugin, prerequisite),
                        )
                        .expected(prerequisite.to_string()),
                    ),
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn rules() -> PluginRules {
        PluginRules::from_config(&PluginsConfig::default()).unwrap()
    }

    #[test]
    fn test_observed_order_is_accepted() {
        let result = rules().check(&ids(&[
            "com.android.application",
            "kotlin-android",
            "dev.flutter.flutter-gradle-plugin",
            "com.google.gms.google-services",
        ]));
        assert!(result.is_clean(), "{:?}", result);
    }

    #[test]
    fn test_flutter_before_android_rejected() {
        let result = rules().check(&ids(&[
            "dev.flutter.flutter-gradle-plugin",
            "com.android.application",
            "org.jetbrains.kotlin.android",
        ]));
        assert!(result.has_code("PLUGIN_ORDER"));
        assert_eq!(result.errors().len(), 2);
    }

    #[test]
    fn test_missing_prerequisite() {
        let result = rules().check(&ids(&["com.google.gms.google-services"]));
        assert!(result.has_code("MISSING_PREREQUISITE"));
    }

    #[test]
    fn test_alias_duplicate() {
        let result = rules().check(&ids(&[
            "com.android.application",
            "kotlin-android",
            "org.jetbrains.kotlin.android",
        ]));
        assert!(result.is_valid());
        assert!(result.has_code("DUPLICATE_PLUGIN"));
    }

    #[test]
    fn test_prerequisites_lookup_through_alias() {
        assert_eq!(rules().prerequisites("kotlin-android"), vec!["com.android.application"]);
        assert!(rules().prerequisites("com.android.application").is_empty());
    }

    #[test]
    fn test_cycle_rejected() {
        let mut config = PluginsConfig::default();
        config
            .prerequisites
            .insert("com.android.application".into(), vec!["dev.flutter.flutter-gradle-plugin".into()]);
        let err = PluginRules::from_config(&config).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.message.contains("cycle"));
    }
}
