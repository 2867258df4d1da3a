//! Rendering of list pages and records for the terminal and for `--json`

use owo_colors::OwoColorize;
use serde_json::{Map, Value, json};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::collection::{CollectionConfig, CollectionKind};
use crate::controller::{Page, RowView};
use crate::types::{Fields, ListItem};

/// Table columns per collection: (header, field)
fn columns(kind: CollectionKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        CollectionKind::Students => &[
            ("Email", "email"),
            ("Phone", "phone"),
            ("Course", "course"),
        ],
        CollectionKind::Instructors => &[
            ("Email", "email"),
            ("Phone", "phone"),
            ("Expertise", "expertise"),
        ],
    }
}

pub fn plural(noun: &str) -> String {
    format!("{noun}s")
}

/// Mask a sensitive value by showing only the first 2 and last 2 characters
pub fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

pub fn fields_json(fields: &Fields) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Value::Object(map)
}

pub fn item_json(item: &ListItem, mutable: bool) -> Value {
    json!({
        "id": item.id,
        "created_at": item.created_at.to_string(),
        "demo": !mutable,
        "fields": fields_json(&item.fields),
    })
}

pub fn page_json(page: &Page<RowView<'_>>) -> Value {
    json!({
        "page": page.number,
        "page_count": page.page_count,
        "total": page.total,
        "items": page
            .items
            .iter()
            .map(|row| item_json(row.item, row.mutable))
            .collect::<Vec<_>>(),
    })
}

/// Render one page as a table followed by a page footer
pub fn format_page(config: &CollectionConfig, page: &Page<RowView<'_>>) -> String {
    if page.total == 0 {
        return format!("No {} found.", plural(config.noun)).dimmed().to_string();
    }

    let cols = columns(config.kind);
    let mut builder = Builder::default();

    let mut header = vec!["ID".to_string(), "Name".to_string()];
    header.extend(cols.iter().map(|(h, _)| h.to_string()));
    builder.push_record(header);

    for row in &page.items {
        let id = if row.mutable {
            row.item.id.clone()
        } else {
            format!("{} (demo)", row.item.id)
        };
        let mut record = vec![id, row.item.display_name()];
        record.extend(cols.iter().map(|(_, f)| row.item.field(f).to_string()));
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::rounded());

    format!("{table}\n{}", format_page_footer(config, page))
}

pub fn format_page_footer(config: &CollectionConfig, page: &Page<RowView<'_>>) -> String {
    let mut footer = format!(
        "Page {} of {} ({} {})",
        page.number,
        page.page_count.max(1),
        page.total,
        if page.total == 1 {
            config.noun.to_string()
        } else {
            plural(config.noun)
        }
    );
    if page.has_next() {
        footer.push_str(&format!(" - next: --page {}", page.number + 1));
    }
    footer.dimmed().to_string()
}

/// Multi-line `label: value` rendering of a single record
pub fn format_item_detail(config: &CollectionConfig, item: &ListItem) -> String {
    let mut out = format!("{} {}\n", item.display_name().bold(), item.id.cyan());
    for rule in config.schema.rules() {
        out.push_str(&format!("  {}: {}\n", rule.label.dimmed(), item.field(rule.name)));
    }
    out
}
