//! Formatted output helpers for CLI commands.
//!
//! Renders attribute values inline in an HCL-like notation and masks
//! attributes marked sensitive.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use vaultcraft_compose::descriptor::{AttrValue, Descriptor};

/// Placeholder printed instead of a sensitive value.
pub const REDACTED: &str = "(sensitive value)";

/// Renders one attribute value on a single line.
#[must_use]
pub fn format_value(value: &AttrValue) -> String {
    match value {
        AttrValue::Null => "null".into(),
        AttrValue::Bool(b) => b.to_string(),
        AttrValue::Int(i) => i.to_string(),
        AttrValue::String(s) => format!("{s:?}"),
        AttrValue::List(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        AttrValue::Map(map) => {
            if map.is_empty() {
                return "{}".into();
            }
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k} = {}", format_value(v)))
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
        AttrValue::Ref(r) => r.to_string(),
        AttrValue::Lookup(l) => format!("(policy definition {:?})", l.display_name),
    }
}

/// Renders a descriptor as an indented block, masking sensitive attributes.
#[must_use]
pub fn format_descriptor(descriptor: &Descriptor) -> String {
    let mut out = format!("  + {}\n", descriptor.logical_key);
    let width = descriptor
        .attributes
        .keys()
        .map(String::len)
        .max()
        .unwrap_or(0);
    for (name, value) in &descriptor.attributes {
        let rendered = if descriptor.sensitive.contains(name) {
            REDACTED.to_string()
        } else {
            format_value(value)
        };
        let _ = writeln!(out, "      {name:<width$} = {rendered}");
    }
    if !descriptor.depends_on.is_empty() {
        let deps: Vec<&str> = descriptor.depends_on.iter().map(|k| k.as_str()).collect();
        let _ = writeln!(out, "      depends_on: {}", deps.join(", "));
    }
    out
}

/// Renders module outputs as `name = value` lines.
#[must_use]
pub fn format_outputs(outputs: &BTreeMap<String, AttrValue>) -> String {
    let mut out = String::new();
    for (name, value) in outputs {
        let _ = writeln!(out, "  {name} = {}", format_value(value));
    }
    out
}

/// A horizontal rule as wide as `title`.
#[must_use]
pub fn underline(title: &str) -> String {
    "\u{2550}".repeat(title.chars().count())
}
