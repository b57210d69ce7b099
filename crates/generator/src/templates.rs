//! Template loading and YAML filters

use oas2tosca_common::{ConvertError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("yaml_scalar", yaml_scalar_filter);
    tera.register_filter("yaml_block", yaml_block_filter);
    tera.register_filter("description", description_filter);

    tera.add_raw_template("profile.yaml", include_str!("../templates/profile.yaml.tera"))
        .map_err(|e| {
            ConvertError::Generation(format!("Failed to load profile.yaml template: {}", e))
        })?;

    tera.add_raw_template("TOSCA.meta", include_str!("../templates/TOSCA.meta.tera"))
        .map_err(|e| {
            ConvertError::Generation(format!("Failed to load TOSCA.meta template: {}", e))
        })?;

    Ok(tera)
}

/// Filter to write a value as an inline YAML scalar.
///
/// Strings are left bare when they read back unchanged, otherwise they are
/// double quoted. Anything else is written in flow style.
fn yaml_scalar_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let rendered = match value {
        Value::String(s) if is_bare(s) => s.clone(),
        other => serde_json::to_string(other)
            .map_err(|e| tera::Error::msg(format!("yaml_scalar: {}", e)))?,
    };
    Ok(Value::String(rendered))
}

/// Filter to write a mapping or sequence as a YAML block, every line
/// indented by `indent` spaces
fn yaml_block_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let indent = indent_arg("yaml_block", args)?;
    let yaml = serde_yaml::to_string(value)
        .map_err(|e| tera::Error::msg(format!("yaml_block: {}", e)))?;
    Ok(Value::String(indent_lines(yaml.trim_end(), indent)))
}

/// Filter to write a description (`{style, lines}`) as the value of a
/// `description:` key. Block styles put their lines at `indent` spaces.
fn description_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let indent = indent_arg("description", args)?;
    let style = value
        .get("style")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("description filter expects a description"))?;
    let lines: Vec<&str> = value
        .get("lines")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .collect();

    let indicator = match style {
        "plain" => return Ok(Value::String(lines.join(" "))),
        "folded" => ">-",
        "literal" => "|-",
        other => return Err(tera::Error::msg(format!("unknown text style '{}'", other))),
    };
    Ok(Value::String(format!(
        "{}\n{}",
        indicator,
        indent_lines(&lines.join("\n"), indent)
    )))
}

fn indent_arg(filter: &str, args: &HashMap<String, Value>) -> tera::Result<usize> {
    match args.get("indent") {
        Some(indent) => indent
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| tera::Error::msg(format!("{}: indent must be a number", filter))),
        None => Ok(0),
    }
}

/// Indent every non-empty line
fn indent_lines(text: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// True for identifiers, type names and paths that need no quoting
fn is_bare(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if !(first.is_ascii_alphanumeric() || first == '.' || first == '_') {
        return false;
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/' | ':'))
    {
        return false;
    }
    // A colon followed by nothing or a space would start a mapping
    if s.ends_with(':') {
        return false;
    }
    let lowered = s.to_ascii_lowercase();
    if matches!(
        lowered.as_str(),
        "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "y" | "n"
    ) {
        return false;
    }
    // Numbers in any YAML 1.2 form (0x1F, .inf, ...) would change type
    matches!(
        serde_yaml::from_str::<serde_yaml::Value>(s),
        Ok(serde_yaml::Value::String(back)) if back == s
    )
}
