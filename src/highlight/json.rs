//! Colorized, key-sorted JSON rendering

use serde_json::Value;

use super::palette::{paint, Category};

const INDENT: &str = "  ";

/// Render a JSON payload, or `None` if it does not parse
pub fn highlight_json(data: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(data).ok()?;
    let mut out = String::with_capacity(data.len() * 2);
    render_value(&value, 0, &mut out);
    Some(out)
}

fn render_value(value: &Value, depth: usize, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push_str(&paint("{", Category::Punct));
            out.push('\n');
            for (i, key) in keys.iter().enumerate() {
                push_indent(depth + 1, out);
                out.push_str(&paint(&quote(key), Category::Key));
                out.push_str(&paint(": ", Category::Punct));
                render_value(&map[key.as_str()], depth + 1, out);
                if i + 1 < keys.len() {
                    out.push_str(&paint(",", Category::Punct));
                }
                out.push('\n');
            }
            push_indent(depth, out);
            out.push_str(&paint("}", Category::Punct));
        }
        Value::Array(items) => {
            out.push_str(&paint("[", Category::Punct));
            out.push('\n');
            for (i, item) in items.iter().enumerate() {
                push_indent(depth + 1, out);
                render_value(item, depth + 1, out);
                if i + 1 < items.len() {
                    out.push_str(&paint(",", Category::Punct));
                }
                out.push('\n');
            }
            push_indent(depth, out);
            out.push_str(&paint("]", Category::Punct));
        }
        Value::String(s) => out.push_str(&paint(&quote(s), Category::String)),
        Value::Number(n) => out.push_str(&paint(&format_number(n), Category::Number)),
        Value::Bool(b) => out.push_str(&paint(if *b { "true" } else { "false" }, Category::Bool)),
        Value::Null => out.push_str(&paint("null", Category::Null)),
    }
}

/// Shortest round-trippable plain decimal, never exponent notation
fn format_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => format!("{}", f),
        _ => n.to_string(),
    }
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn quote(s: &str) -> String {
    // Serializing a &str cannot fail
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}
