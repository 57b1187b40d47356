//! API-reference sidebar derived from an OpenAPI document.
//!
//! Produces the navigation description the documentation site loads next to
//! the generated operation pages: an intro doc, then one category per tag
//! holding one doc entry per operation. Each entry carries an
//! `api-method <verb>` class the site theme uses to colour the HTTP verb.
//!
//! ```text
//! [
//!   { "type": "doc", "id": "api/ari-crm" },
//!   { "type": "category", "label": "Contact", "items": [
//!       { "type": "doc", "id": "api/get-contact", "label": "…",
//!         "className": "api-method get" } ] }
//! ]
//! ```

use anyhow::{Context, Result};
use heck::ToKebabCase;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Category for operations without tags.
pub const DEFAULT_CATEGORY: &str = "default";

const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SidebarItem {
    Doc {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(rename = "className", skip_serializing_if = "Option::is_none")]
        class_name: Option<String>,
    },
    Category {
        label: String,
        items: Vec<SidebarItem>,
    },
}

/// Build the sidebar for `doc`. `prefix` is prepended to every doc id.
pub fn build_sidebar(doc: &Value, prefix: &str) -> Vec<SidebarItem> {
    let mut sidebar = Vec::new();

    if let Some(title) = doc.pointer("/info/title").and_then(Value::as_str) {
        sidebar.push(SidebarItem::Doc {
            id: format!("{}{}", prefix, title.to_kebab_case()),
            label: None,
            class_name: None,
        });
    }

    // Categories keep the order in which their tag is first seen.
    let mut categories: Vec<(String, Vec<SidebarItem>)> = Vec::new();

    let Some(paths) = doc.get("paths").and_then(Value::as_object) else {
        return sidebar;
    };

    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        for (method, op) in item {
            let method = method.to_ascii_lowercase();
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            let tag = op
                .pointer("/tags/0")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_CATEGORY);
            let entry = operation_entry(path, &method, op, prefix);

            match categories.iter_mut().find(|(label, _)| label == tag) {
                Some((_, items)) => items.push(entry),
                None => categories.push((tag.to_string(), vec![entry])),
            }
        }
    }

    sidebar.extend(
        categories
            .into_iter()
            .map(|(label, items)| SidebarItem::Category { label, items }),
    );
    sidebar
}

fn operation_entry(path: &str, method: &str, op: &Value, prefix: &str) -> SidebarItem {
    let operation_id = op.get("operationId").and_then(Value::as_str);

    let slug = match operation_id {
        Some(id) => id.to_kebab_case(),
        None => format!("{} {}", method, path).to_kebab_case(),
    };

    let label = op
        .get("summary")
        .and_then(Value::as_str)
        .or(operation_id)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {}", method.to_ascii_uppercase(), path));

    let mut class_name = format!("api-method {}", method);
    if op.get("deprecated").and_then(Value::as_bool).unwrap_or(false) {
        class_name.push_str(" menu__list-item--deprecated");
    }

    SidebarItem::Doc {
        id: format!("{}{}", prefix, slug),
        label: Some(label),
        class_name: Some(class_name),
    }
}

/// Read the document at `spec`, build its sidebar, and write it as pretty
/// JSON to `output` (stdout when `None`).
pub fn run_sidebar(spec: &Path, output: Option<&Path>, prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        warn!("empty doc prefix, ids will not be namespaced");
    }

    let content = std::fs::read_to_string(spec)
        .with_context(|| format!("Failed to read specification: {}", spec.display()))?;
    let doc: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse specification: {}", spec.display()))?;

    let sidebar = build_sidebar(&doc, prefix);
    let json = serde_json::to_string_pretty(&sidebar)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write sidebar: {}", path.display()))?;
            let categories = sidebar
                .iter()
                .filter(|item| matches!(item, SidebarItem::Category { .. }))
                .count();
            info!(
                "Wrote sidebar with {} categories to {}",
                categories,
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
