/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Assembles the parameters sent along with a render request.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub fn load_param_file(path: &Path) -> Result<Map<String, Value>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameter file {}", path.display()))?;

    match serde_json::from_str::<Value>(&contents)
        .with_context(|| format!("Parameter file {} is not valid JSON", path.display()))?
    {
        Value::Object(params) => Ok(params),
        _ => bail!("Parameter file {} must contain a JSON object", path.display()),
    }
}

/// Keys that still need an interactive answer: every default the file does not supply.
pub fn questions<'a>(
    defaults: &'a Map<String, Value>,
    file: &Map<String, Value>,
) -> Vec<(&'a String, &'a Value)> {
    defaults
        .iter()
        .filter(|(key, _)| !file.contains_key(*key))
        .collect()
}

/// Defaults first, file values override them, answers fill whatever the file left open.
pub fn merge_params(
    defaults: &Map<String, Value>,
    file: &Map<String, Value>,
    answers: Map<String, Value>,
) -> Map<String, Value> {
    let mut params = defaults.clone();

    for (key, value) in file {
        params.insert(key.clone(), value.clone());
    }

    for (key, value) in answers {
        if !file.contains_key(&key) {
            params.insert(key, value);
        }
    }

    params
}

/// Keeps the default's JSON type when the typed answer parses as one.
pub fn answer_value(answer: &str, default: &Value) -> Value {
    match default {
        Value::String(_) | Value::Null => Value::String(answer.to_string()),
        _ => serde_json::from_str(answer).unwrap_or_else(|_| Value::String(answer.to_string())),
    }
}

pub fn display_default(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_param_file_wins_over_answers() {
        let defaults = map(json!({"job_name": "default", "partition": "debug"}));
        let file = map(json!({"job_name": "from-file"}));
        let answers = map(json!({"job_name": "typed", "partition": "compute"}));

        let params = merge_params(&defaults, &file, answers);

        assert_eq!(params["job_name"], "from-file");
        assert_eq!(params["partition"], "compute");
    }

    #[test]
    fn test_file_only_keys_are_kept() {
        let defaults = map(json!({"job_name": "default"}));
        let file = map(json!({"nodes": 4}));

        let params = merge_params(&defaults, &file, Map::new());

        assert_eq!(params["job_name"], "default");
        assert_eq!(params["nodes"], 4);
    }

    #[test]
    fn test_questions_skip_file_keys() {
        let defaults = map(json!({"job_name": "default", "partition": "debug"}));
        let file = map(json!({"job_name": "from-file"}));

        let asked = questions(&defaults, &file)
            .into_iter()
            .map(|(key, _)| key.as_str())
            .collect::<Vec<_>>();

        assert_eq!(asked, vec!["partition"]);
    }

    #[test]
    fn test_answer_value_keeps_type() {
        assert_eq!(answer_value("8", &json!(4)), json!(8));
        assert_eq!(answer_value("8", &json!("4")), json!("8"));
        assert_eq!(answer_value("many", &json!(4)), json!("many"));
    }

    #[test]
    fn test_load_param_file() {
        let path = std::env::temp_dir()
            .join(format!("jobbergate-params-{}.json", std::process::id()));
        fs::write(&path, r#"{"job_name": "rats"}"#).unwrap();

        let params = load_param_file(&path).unwrap();
        assert_eq!(params["job_name"], "rats");

        fs::write(&path, "[1, 2]").unwrap();
        assert!(load_param_file(&path).is_err());

        fs::remove_file(path).unwrap();
    }
}
