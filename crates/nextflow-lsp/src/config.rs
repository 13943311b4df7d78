//! Workspace configuration and the settings payloads that change it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Group the client nests compiler settings under.
pub const SETTINGS_SECTION: &str = "groovy";
/// Key of the classpath-entry list inside [`SETTINGS_SECTION`].
pub const CLASSPATH_KEY: &str = "classpath";

/// Everything a compilation session is built from.
///
/// Two configurations are the same only if every classpath entry matches in
/// order; a session built from one is never reused for the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceConfig {
    pub root: Option<PathBuf>,
    pub classpath: Vec<String>,
}

impl WorkspaceConfig {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root, classpath: Vec::new() }
    }

    pub fn with_classpath(mut self, classpath: Vec<String>) -> Self {
        self.classpath = classpath;
        self
    }
}

/// Extracts the classpath list from a `workspace/didChangeConfiguration`
/// payload.
///
/// Returns `None` when the payload is not an object at all, in which case the
/// update is ignored. An object without the nested list yields an empty list.
pub fn classpath_from_settings(settings: &Value) -> Option<Vec<String>> {
    let settings = settings.as_object()?;
    let entries = settings
        .get(SETTINGS_SECTION)
        .and_then(Value::as_object)
        .and_then(|section| section.get(CLASSPATH_KEY))
        .and_then(Value::as_array);

    let Some(entries) = entries else {
        return Some(Vec::new());
    };

    Some(
        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
    )
}

/// Options accepted in the `initializationOptions` of the initialize request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializationOptions {
    /// Base directory for disposable compiler output.
    #[serde(default)]
    pub output_directory: Option<PathBuf>,
    /// Classpath to start with, before any configuration change arrives.
    #[serde(default)]
    pub classpath: Option<Vec<String>>,
}

impl InitializationOptions {
    pub fn from_value(value: Option<Value>) -> Self {
        value.and_then(|value| serde_json::from_value(value).ok()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"groovy": {"classpath": ["a.jar", "lib/"]}}), Some(vec!["a.jar", "lib/"]); "nested list")]
    #[test_case(json!({"groovy": {}}), Some(vec![]); "missing list")]
    #[test_case(json!({"other": {"classpath": ["a.jar"]}}), Some(vec![]); "other section")]
    #[test_case(json!({"groovy": {"classpath": "a.jar"}}), Some(vec![]); "not an array")]
    #[test_case(json!(["a.jar"]), None; "not an object")]
    #[test_case(json!(null), None; "null")]
    fn test_classpath_from_settings(settings: Value, expected: Option<Vec<&str>>) {
        let expected = expected.map(|v| v.into_iter().map(String::from).collect::<Vec<_>>());
        assert_eq!(classpath_from_settings(&settings), expected);
    }

    #[test]
    fn test_config_equality_is_by_content() {
        let a = WorkspaceConfig::new(None).with_classpath(vec!["x.jar".into(), "y.jar".into()]);
        let b = WorkspaceConfig::new(None).with_classpath(vec!["y.jar".into(), "x.jar".into()]);
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_initialization_options() {
        let options = InitializationOptions::from_value(Some(json!({
            "outputDirectory": "/tmp/nf-out",
            "classpath": ["lib.jar"]
        })));
        assert_eq!(options.output_directory, Some(PathBuf::from("/tmp/nf-out")));
        assert_eq!(options.classpath, Some(vec!["lib.jar".to_string()]));

        let fallback = InitializationOptions::from_value(Some(json!("garbage")));
        assert_eq!(fallback, InitializationOptions::default());
    }
}
