//! Student and instructor commands: `ls`, `add`, `edit`, `rm`.
//!
//! Each `cmd_*` entry point checks the session, opens the collection's table
//! and hands off to a `run_*` function that works against any store and
//! notifier.

use owo_colors::OwoColorize;
use serde_json::json;

use super::interactive::confirm;
use super::{CommandOutput, require_sign_in};
use crate::collection::{CollectionConfig, CollectionKind};
use crate::config::Config;
use crate::controller::{RegistrationForm, RemoteListController};
use crate::display::{fields_json, format_item_detail, format_page, page_json};
use crate::error::{CampusError, Result};
use crate::notify::{ConsoleNotifier, Notifier};
use crate::store::{RemoteStore, RestTable};
use crate::types::{CategoryFilter, Fields};

/// Options for listing a collection
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search: Option<String>,
    /// Category value or "all"
    pub category: Option<String>,
    pub page: usize,
}

async fn open_table(collection: &CollectionConfig) -> Result<RestTable> {
    require_sign_in().await?;
    let config = Config::load()?;
    RestTable::from_config(&config, collection.table)
}

// ----------------------------------------------------------------------------
// ls
// ----------------------------------------------------------------------------

pub async fn run_list<S: RemoteStore, N: Notifier>(
    ctrl: &mut RemoteListController<S, N>,
    options: ListOptions,
) -> Result<CommandOutput> {
    ctrl.fetch_all().await;

    if let Some(term) = options.search {
        ctrl.set_search_term(term);
    }
    if let Some(category) = options.category {
        if ctrl.config().category_field.is_none() {
            return Err(CampusError::Other(format!(
                "{} cannot be filtered by course",
                crate::display::plural(ctrl.config().noun)
            )));
        }
        ctrl.set_category_filter(CategoryFilter::from(category.as_str()));
    }
    ctrl.set_page(options.page.max(1));

    let rows = ctrl.rows();
    Ok(CommandOutput::new(page_json(&rows)).with_text(format_page(ctrl.config(), &rows)))
}

pub async fn cmd_list(kind: CollectionKind, options: ListOptions, as_json: bool) -> Result<()> {
    let collection = CollectionConfig::for_kind(kind);
    let store = open_table(&collection).await?;
    let mut ctrl = RemoteListController::new(collection, store, ConsoleNotifier);
    run_list(&mut ctrl, options).await?.print(as_json)
}

// ----------------------------------------------------------------------------
// add
// ----------------------------------------------------------------------------

pub async fn run_add<S: RemoteStore, N: Notifier>(
    form: &mut RegistrationForm<S, N>,
    fields: Fields,
) -> Result<CommandOutput> {
    let stored = form.submit_new(fields).await?;
    let noun = form.config().noun;
    Ok(CommandOutput::new(json!({
        "status": "created",
        "collection": form.config().table,
        "fields": fields_json(&stored),
    }))
    .with_text(format!("Added {noun}")))
}

pub async fn cmd_add(kind: CollectionKind, fields: Fields, as_json: bool) -> Result<()> {
    let collection = CollectionConfig::for_kind(kind);
    let store = open_table(&collection).await?;
    let mut form = RegistrationForm::new(collection, store, ConsoleNotifier);
    run_add(&mut form, fields).await?.print(as_json)
}

// ----------------------------------------------------------------------------
// edit
// ----------------------------------------------------------------------------

pub async fn run_edit<S: RemoteStore, N: Notifier>(
    ctrl: &mut RemoteListController<S, N>,
    id: &str,
    changes: Fields,
) -> Result<CommandOutput> {
    for name in changes.keys() {
        if !ctrl.config().schema.has_field(name) {
            return Err(CampusError::UnknownField(name.clone(), ctrl.config().noun));
        }
    }

    ctrl.fetch_all().await;
    let item = ctrl
        .find(id)
        .cloned()
        .ok_or_else(|| CampusError::RecordNotFound(ctrl.config().noun, id.to_string()))?;

    ctrl.begin_edit(&item)?;
    for (name, value) in changes {
        ctrl.set_draft_field(&name, value);
    }
    ctrl.commit_edit().await?;

    let updated = ctrl.find(id).cloned().unwrap_or(item);
    Ok(CommandOutput::new(json!({
        "id": updated.id,
        "status": "updated",
        "fields": fields_json(&updated.fields),
    }))
    .with_text(format_item_detail(ctrl.config(), &updated)))
}

pub async fn cmd_edit(kind: CollectionKind, id: &str, changes: Fields, as_json: bool) -> Result<()> {
    let collection = CollectionConfig::for_kind(kind);
    let store = open_table(&collection).await?;
    let mut ctrl = RemoteListController::new(collection, store, ConsoleNotifier);
    run_edit(&mut ctrl, id, changes).await?.print(as_json)
}

// ----------------------------------------------------------------------------
// rm
// ----------------------------------------------------------------------------

/// Delete `id`. `confirmed` is asked only after the target is known and
/// mutable; returning `false` cancels.
pub async fn run_remove<S, N, C>(
    ctrl: &mut RemoteListController<S, N>,
    id: &str,
    confirmed: C,
) -> Result<CommandOutput>
where
    S: RemoteStore,
    N: Notifier,
    C: FnOnce(&str) -> Result<bool>,
{
    ctrl.fetch_all().await;
    let item = ctrl
        .find(id)
        .cloned()
        .ok_or_else(|| CampusError::RecordNotFound(ctrl.config().noun, id.to_string()))?;

    ctrl.begin_delete(&item)?;

    let prompt = format!("Delete {} {}", ctrl.config().noun, item.display_name());
    if !confirmed(&prompt)? {
        ctrl.cancel_delete();
        return Ok(CommandOutput::new(json!({ "id": id, "status": "cancelled" }))
            .with_text("Aborted".dimmed().to_string()));
    }

    ctrl.confirm_delete().await?;
    Ok(CommandOutput::new(json!({ "id": id, "status": "deleted" }))
        .with_text(format!("Deleted {} {}", ctrl.config().noun, id.cyan())))
}

pub async fn cmd_remove(kind: CollectionKind, id: &str, yes: bool, as_json: bool) -> Result<()> {
    let collection = CollectionConfig::for_kind(kind);
    let store = open_table(&collection).await?;
    let mut ctrl = RemoteListController::new(collection, store, ConsoleNotifier);
    let output = run_remove(&mut ctrl, id, |prompt| if yes { Ok(true) } else { confirm(prompt) })
        .await?;
    output.print(as_json)
}
