/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Job script rendering: template substitution and `#SBATCH` handling.

use minijinja::{Environment, UndefinedBehavior};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::input::strip_template_suffix;

const SBATCH_PREFIX: &str = "#SBATCH";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to render {name}: {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },
    #[error("Template has no entrypoint file")]
    MissingEntrypoint,
    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(String),
    #[error("More than one template renders to {0}")]
    DuplicateOutput(String),
}

/// Moves the keys of nested objects one level up, keeping scalar values as they are.
///
/// `{"application_config": {"job_name": "rats"}, "partition": "debug"}` becomes
/// `{"job_name": "rats", "partition": "debug"}`.
pub fn flatten_param_dict(params: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();

    for (key, value) in params {
        match value {
            Value::Object(inner) => {
                for (inner_key, inner_value) in inner {
                    flat.insert(inner_key.clone(), inner_value.clone());
                }
            }
            _ => {
                flat.insert(key.clone(), value.clone());
            }
        }
    }

    flat
}

fn build_context(params: &Map<String, Value>) -> Map<String, Value> {
    let flat = flatten_param_dict(params);
    let mut context = flat.clone();
    context.insert("data".to_string(), Value::Object(flat));
    context
}

/// Renders one template file. Undefined variables are errors.
pub fn render_template(
    name: &str,
    source: &str,
    params: &Map<String, Value>,
) -> Result<String, RenderError> {
    let mut environment = Environment::new();
    environment.set_undefined_behavior(UndefinedBehavior::Strict);
    environment.set_keep_trailing_newline(true);

    environment
        .render_str(source, build_context(params))
        .map_err(|source| RenderError::Template {
            name: name.to_string(),
            source,
        })
}

/// Inserts `#SBATCH <param>` lines after the first existing `#SBATCH` line, after the
/// shebang when there is none, or at the top of the script otherwise.
pub fn inject_sbatch_params(script: &str, params: &[String]) -> String {
    if params.is_empty() {
        tracing::warn!("Sbatch param list is empty");
        return script.to_string();
    }

    let injected: String = params
        .iter()
        .map(|param| format!("{} {}\n", SBATCH_PREFIX, param.trim()))
        .collect();

    let anchor = script
        .find(SBATCH_PREFIX)
        .or_else(|| script.starts_with("#!").then_some(0));

    let position = match anchor {
        Some(start) => match script[start..].find('\n') {
            Some(offset) => start + offset + 1,
            None => script.len(),
        },
        None => 0,
    };

    let (head, tail) = script.split_at(position);

    if head.is_empty() || head.ends_with('\n') {
        format!("{}{}{}", head, injected, tail)
    } else {
        format!("{}\n{}{}", head, injected, tail)
    }
}

/// Collects long options from `#SBATCH` lines, `--job-name=rats` becomes `job_name: "rats"`.
pub fn parse_sbatch_params(script: &str) -> Map<String, Value> {
    let mut params = Map::new();

    for line in script.lines() {
        let Some(rest) = line.trim_start().strip_prefix(SBATCH_PREFIX) else {
            continue;
        };

        let mut tokens = rest.split_whitespace();

        while let Some(token) = tokens.next() {
            let Some(option) = token.strip_prefix("--") else {
                continue;
            };

            let (key, value) = match option.split_once('=') {
                Some((key, value)) => (key, Value::String(value.to_string())),
                None => match tokens.clone().next() {
                    Some(next) if !next.starts_with('-') => {
                        tokens.next();
                        (option, Value::String(next.to_string()))
                    }
                    _ => (option, Value::Bool(true)),
                },
            };

            params.insert(key.replace('-', "_"), value);
        }
    }

    params
}

/// Name of the rendered file produced from a template file.
pub fn output_name(mapping: &HashMap<String, String>, template_name: &str) -> String {
    mapping
        .get(template_name)
        .cloned()
        .unwrap_or_else(|| strip_template_suffix(template_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_flatten_param_dict() {
        let flat = flatten_param_dict(&params(json!({
            "application_config": {"job_name": "rats", "partitions": ["debug"]},
            "jobbergate_config": {"partition": "debug"},
            "output_directory": "."
        })));

        assert_eq!(
            Value::Object(flat),
            json!({
                "job_name": "rats",
                "partitions": ["debug"],
                "partition": "debug",
                "output_directory": "."
            })
        );
    }

    #[test]
    fn test_render_template_top_level_and_data() {
        let rendered = render_template(
            "entrypoint.sh.j2",
            "#!/bin/bash\n#SBATCH --job-name={{ job_name }}\necho {{ data.partition }}\n",
            &params(json!({"jobbergate_config": {"job_name": "rats", "partition": "debug"}})),
        )
        .unwrap();

        assert_eq!(
            rendered,
            "#!/bin/bash\n#SBATCH --job-name=rats\necho debug\n"
        );
    }

    #[test]
    fn test_render_template_undefined_variable() {
        let result = render_template("entrypoint.sh.j2", "echo {{ missing }}", &Map::new());

        assert!(matches!(
            result,
            Err(RenderError::Template { name, .. }) if name == "entrypoint.sh.j2"
        ));
    }

    #[test]
    fn test_inject_after_first_sbatch_line() {
        let script = "#!/bin/bash\n#SBATCH --job-name=rats\n#SBATCH --partition=debug\necho hi\n";
        let result = inject_sbatch_params(script, &["--comment=test".to_string()]);

        assert_eq!(
            result,
            concat!(
                "#!/bin/bash\n#SBATCH --job-name=rats\n#SBATCH --comment=test\n",
                "#SBATCH --partition=debug\necho hi\n",
            )
        );
    }

    #[test]
    fn test_inject_after_shebang() {
        let script = "#!/bin/bash\necho hi\n";
        let result = inject_sbatch_params(
            script,
            &["--nodes=2".to_string(), "--time=10".to_string()],
        );

        assert_eq!(
            result,
            "#!/bin/bash\n#SBATCH --nodes=2\n#SBATCH --time=10\necho hi\n"
        );

        assert_eq!(
            inject_sbatch_params("echo hi\n", &["--nodes=2".to_string()]),
            "#SBATCH --nodes=2\necho hi\n"
        );
    }

    #[test]
    fn test_inject_empty_params() {
        let script = "#!/bin/bash\necho hi\n";
        assert_eq!(inject_sbatch_params(script, &[]), script);
    }

    #[test]
    fn test_parse_sbatch_params() {
        let parsed = parse_sbatch_params(
            concat!(
                "#!/bin/bash\n#SBATCH --job-name=rats\n#SBATCH --partition debug\n",
                "#SBATCH --exclusive\n#SBATCH -N 2\necho --not-this\n",
            ),
        );

        assert_eq!(
            Value::Object(parsed),
            json!({"job_name": "rats", "partition": "debug", "exclusive": true})
        );
    }

    #[test]
    fn test_output_name() {
        let mapping = HashMap::from([("entrypoint.sh.j2".to_string(), "run.sh".to_string())]);

        assert_eq!(output_name(&mapping, "entrypoint.sh.j2"), "run.sh");
        assert_eq!(output_name(&mapping, "support.py.jinja2"), "support.py");
    }
}
