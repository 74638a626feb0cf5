//! Stdin rendering for parsed bindings.

use crate::core::types::{Binding, Value};

/// Render bindings as the stdin blob a solution reads: one line per binding,
/// in order, joined by `\n` and terminated by a trailing `\n`.
pub fn serialize_bindings(bindings: &[Binding]) -> String {
    let lines: Vec<String> = bindings
        .iter()
        .map(|binding| binding.value.to_string())
        .collect();
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Render bindings back into declaration-line syntax
/// (`nums = [2 7 11 15], target = 9`).
pub fn render_declaration(bindings: &[Binding]) -> String {
    bindings
        .iter()
        .map(|binding| match &binding.value {
            Value::Scalar(scalar) => format!("{} = {}", binding.key, scalar),
            Value::Sequence(_) => format!("{} = [{}]", binding.key, binding.value),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
