//! YAML rendering for embedding in larger documents.

use serde::Serialize;

use crate::error_handling::YamlError;

/// Renders `value` as YAML with every non-empty line indented by
/// `global_indent` spaces.
///
/// Blank lines stay empty, so the output can be pasted under a parent key
/// without trailing whitespace.
///
/// # Errors
///
/// Returns `YamlError::Serialize` if `value` cannot be represented as YAML.
pub fn to_indented_yaml<T: Serialize + ?Sized>(
    value: &T,
    global_indent: usize,
) -> Result<String, YamlError> {
    let yaml = serde_yaml::to_string(value)?;
    Ok(indent_lines(&yaml, global_indent))
}

fn indent_lines(text: &str, indent: usize) -> String {
    let spaces = " ".repeat(indent);
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                line.to_string()
            } else {
                format!("{}{}", spaces, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
