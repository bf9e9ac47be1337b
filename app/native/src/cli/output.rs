//! CLI output formatting utilities.

use std::fmt::Write;

use colored::Colorize;
use serde_json::Value;

const INDENT: &str = "  ";

/// Prints JSON pretty-printed with syntax highlighting.
///
/// Keys are cyan, strings green, numbers yellow, booleans and null magenta.
pub fn print_highlighted_json(value: &Value) {
    println!("{}", highlight_json(value));
}

/// Renders `value` the way [`print_highlighted_json`] prints it.
#[must_use]
pub fn highlight_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str(&"null".magenta().to_string()),
        Value::Bool(flag) => out.push_str(&flag.to_string().magenta().to_string()),
        Value::Number(number) => out.push_str(&number.to_string().yellow().to_string()),
        Value::String(_) => out.push_str(&value.to_string().green().to_string()),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Object(fields) if fields.is_empty() => out.push_str("{}"),
        Value::Array(items) => {
            out.push_str(&"[".bold().to_string());
            for (index, item) in items.iter().enumerate() {
                separator(out, index, depth + 1);
                write_value(out, item, depth + 1);
            }
            closing(out, "]", depth);
        }
        Value::Object(fields) => {
            out.push_str(&"{".bold().to_string());
            for (index, (key, item)) in fields.iter().enumerate() {
                separator(out, index, depth + 1);
                let _ = write!(out, "{}: ", Value::String(key.clone()).to_string().cyan());
                write_value(out, item, depth + 1);
            }
            closing(out, "}", depth);
        }
    }
}

fn separator(out: &mut String, index: usize, depth: usize) {
    if index > 0 {
        out.push(',');
    }
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
}

fn closing(out: &mut String, bracket: &str, depth: usize) {
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
    out.push_str(&bracket.bold().to_string());
}

/// Truncates a string to a maximum number of characters, adding ellipsis if needed.
///
/// Counts characters rather than bytes.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }

    let kept: String = s.chars().take(max_chars - 1).collect();
    format!("{kept}…")
}
