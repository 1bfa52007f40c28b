//! Tree rendering of selected config sections

use serde_yaml::Value;

use super::error::{ConfigError, Result};
use super::tree::ConfigTree;

/// Sections shown by default, in display order
pub const DEFAULT_FIELDS: &[&str] = &[
    "trainer",
    "model",
    "datamodule",
    "callbacks",
    "logger",
    "test_after_training",
    "seed",
    "name",
];

/// File name the CLI writes the rendered tree to
pub const CONFIG_TREE_LOG: &str = "config_tree.log";

fn section_body(value: Option<&Value>) -> Result<String> {
    match value {
        None => Ok("None".to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(v) => serde_yaml::to_string(v)
            .map(|yaml| yaml.trim_end().to_string())
            .map_err(|e| ConfigError::Parse {
                origin: "<render>".to_string(),
                message: e.to_string(),
            }),
    }
}

/// Render `fields` of `tree` as a text tree rooted at `CONFIG`
///
/// Each field becomes a branch whose body is that section's YAML. Fields
/// missing from the config render as `None`. With `resolve`, interpolations
/// inside the rendered fields are substituted first.
pub fn render_config_tree(tree: &ConfigTree, fields: &[&str], resolve: bool) -> Result<String> {
    let mut out = String::from("CONFIG\n");
    for (i, field) in fields.iter().enumerate() {
        let last = i + 1 == fields.len();
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };

        out.push_str(branch);
        out.push_str(field);
        out.push('\n');

        let body = if resolve {
            section_body(tree.resolve_path(field)?.as_ref())?
        } else {
            section_body(tree.get(field))?
        };
        for (line_no, line) in body.lines().enumerate() {
            out.push_str(indent);
            out.push_str(if line_no == 0 { "└── " } else { "    " });
            out.push_str(line);
            out.push('\n');
        }
    }
    Ok(out)
}
