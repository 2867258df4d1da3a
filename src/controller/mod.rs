//! Remote list controller
//!
//! Presents a searchable, filterable, paged view of one remote collection and
//! funnels every mutation through validate → persist → refetch. The snapshot
//! is only ever replaced by a full fetch; drafts never touch it.
//!
//! State machine: `Loading → Ready → Loading (refetch) → Ready`, with an
//! optional edit draft and an optional delete confirmation layered over
//! `Ready`.

mod error;
mod filter;
mod pagination;
mod registration;
mod state;


use crate::collection::CollectionConfig;
use crate::error::Result;
use crate::notify::{Notification, Notifier};
use crate::store::{RemoteStore, Row, items_from_rows};
use crate::types::{CategoryFilter, ListItem};

pub use error::ListError;
pub use filter::{FilterState, filtered_view};
pub use pagination::{Page, clamp_page, page_count, page_range, paginate};
pub use registration::RegistrationForm;
pub use state::{EditDraft, FetchTicket, Phase, RowView};

pub struct RemoteListController<S, N> {
    config: CollectionConfig,
    store: S,
    notifier: N,
    phase: Phase,
    snapshot: Vec<ListItem>,
    filter: FilterState,
    current_page: usize,
    edit: Option<EditDraft>,
    delete_target: Option<ListItem>,
    /// Bumped by `detach`; tickets from older epochs are ignored
    epoch: u64,
}

impl<S: RemoteStore, N: Notifier> RemoteListController<S, N> {
    pub fn new(config: CollectionConfig, store: S, notifier: N) -> Self {
        Self {
            config,
            store,
            notifier,
            phase: Phase::Loading,
            snapshot: Vec::new(),
            filter: FilterState::default(),
            current_page: 1,
            edit: None,
            delete_target: None,
            epoch: 0,
        }
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn snapshot(&self) -> &[ListItem] {
        &self.snapshot
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn edit_draft(&self) -> Option<&EditDraft> {
        self.edit.as_ref()
    }

    pub fn delete_target(&self) -> Option<&ListItem> {
        self.delete_target.as_ref()
    }

    pub fn is_sentinel(&self, item: &ListItem) -> bool {
        self.config.is_sentinel(item)
    }

    /// Look an item up in the current snapshot
    pub fn find(&self, id: &str) -> Option<&ListItem> {
        self.snapshot.iter().find(|item| item.id == id)
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    /// Replace the snapshot with a fresh copy of the remote collection.
    ///
    /// Failures are not reported to the user: the snapshot falls back to the
    /// collection's configured fallback state.
    pub async fn fetch_all(&mut self) {
        let ticket = self.begin_fetch();
        let result = self.store.list().await;
        self.complete_fetch(ticket, result);
    }

    /// Enter `Loading` and hand out a ticket for the fetch about to start
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.phase = Phase::Loading;
        FetchTicket { epoch: self.epoch }
    }

    /// Apply the result of a fetch started with `begin_fetch`
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<Row>>) {
        if ticket.epoch != self.epoch {
            tracing::debug!(table = self.config.table, "dropping fetch result after detach");
            return;
        }

        self.snapshot = match result {
            Ok(rows) => {
                let items = items_from_rows(&rows);
                tracing::debug!(table = self.config.table, count = items.len(), "fetched");
                if items.is_empty() {
                    self.config.empty_snapshot()
                } else {
                    items
                }
            }
            Err(e) => {
                tracing::warn!(table = self.config.table, "fetch failed, using fallback: {e}");
                self.config.fallback_snapshot()
            }
        };
        self.phase = Phase::Ready;
        self.current_page = clamp_page(self.current_page, self.page_count());
    }

    /// Stop applying results of fetches that are still in flight
    pub fn detach(&mut self) {
        self.epoch += 1;
    }

    // ------------------------------------------------------------------
    // Filtering and paging
    // ------------------------------------------------------------------

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.filter.search_term = term.into();
        self.current_page = 1;
    }

    pub fn set_category_filter(&mut self, category: impl Into<CategoryFilter>) {
        self.filter.category = category.into();
        self.current_page = 1;
    }

    pub fn filtered_view(&self) -> impl Iterator<Item = &ListItem> + Clone + '_ {
        filtered_view(&self.snapshot, &self.filter, &self.config)
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered_view().count()
    }

    pub fn page_count(&self) -> usize {
        page_count(self.filtered_len(), self.config.page_size)
    }

    /// Page `n` of the filtered view. Pages past the end are empty.
    pub fn page(&self, n: usize) -> Page<&ListItem> {
        paginate(
            self.filtered_view(),
            self.filtered_len(),
            n,
            self.config.page_size,
        )
    }

    /// Move to page `n`, clamped to the available pages
    pub fn set_page(&mut self, n: usize) {
        self.current_page = clamp_page(n, self.page_count());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page + 1);
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.current_page.saturating_sub(1));
    }

    /// Rows of the current page, flagged for presentation
    pub fn rows(&self) -> Page<RowView<'_>> {
        let page = self.page(self.current_page);
        Page {
            number: page.number,
            page_count: page.page_count,
            total: page.total,
            items: page
                .items
                .into_iter()
                .map(|item| RowView {
                    item,
                    mutable: !self.is_sentinel(item),
                })
                .collect(),
        }
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    fn reject_placeholder(&self, item: &ListItem, description: String) -> ListError {
        self.notifier
            .notify(Notification::info("Demo Mode", description));
        ListError::PlaceholderGuard(item.id.clone())
    }

    /// Open an edit draft for `item`. Placeholder rows are refused.
    pub fn begin_edit(&mut self, item: &ListItem) -> std::result::Result<(), ListError> {
        if self.is_sentinel(item) {
            let description = format!("Editing is disabled for demo {}.", self.config.noun);
            return Err(self.reject_placeholder(item, description));
        }
        self.edit = Some(EditDraft::for_item(item));
        Ok(())
    }

    /// Change one field of the open draft; ignored when no draft is open
    pub fn set_draft_field(&mut self, name: &str, value: impl Into<String>) {
        if let Some(draft) = self.edit.as_mut() {
            draft.set(name, value);
        }
    }

    /// Discard the draft
    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Validate and persist the open draft, then refetch.
    ///
    /// Validation and store failures leave the draft open. With no draft open
    /// this does nothing.
    pub async fn commit_edit(&mut self) -> std::result::Result<(), ListError> {
        let Some(draft) = self.edit.as_ref() else {
            tracing::debug!(table = self.config.table, "commit_edit without a draft");
            return Ok(());
        };

        let normalized = match self.config.schema.validate(&draft.fields) {
            Ok(normalized) => normalized,
            Err(message) => {
                self.notifier
                    .notify(Notification::destructive("Validation Error", message.clone()));
                return Err(ListError::Validation(message));
            }
        };
        let target_id = draft.target_id.clone();

        if let Err(e) = self.store.update(&target_id, &normalized).await {
            tracing::warn!(table = self.config.table, id = %target_id, "update failed: {e}");
            self.notifier.notify(Notification::destructive(
                "Error",
                format!("Failed to update {}.", self.config.noun),
            ));
            return Err(ListError::Remote(e.to_string()));
        }

        self.notifier.notify(Notification::info(
            "Success",
            format!("{} updated successfully.", self.config.title_noun()),
        ));
        self.edit = None;
        self.fetch_all().await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Deleting
    // ------------------------------------------------------------------

    /// Ask for confirmation before deleting `item`. Placeholder rows are refused.
    pub fn begin_delete(&mut self, item: &ListItem) -> std::result::Result<(), ListError> {
        if self.is_sentinel(item) {
            let description = format!("Cannot delete demo {}.", self.config.noun);
            return Err(self.reject_placeholder(item, description));
        }
        self.delete_target = Some(item.clone());
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.delete_target = None;
    }

    /// Delete the confirmed target.
    ///
    /// The confirmation closes either way; only a successful delete refetches.
    pub async fn confirm_delete(&mut self) -> std::result::Result<(), ListError> {
        let Some(target_id) = self.delete_target.as_ref().map(|t| t.id.clone()) else {
            return Ok(());
        };

        let result = self.store.delete(&target_id).await;
        self.delete_target = None;

        match result {
            Ok(()) => {
                self.notifier.notify(Notification::info(
                    "Success",
                    format!("{} deleted successfully.", self.config.title_noun()),
                ));
                self.fetch_all().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(table = self.config.table, id = %target_id, "delete failed: {e}");
                self.notifier.notify(Notification::destructive(
                    "Error",
                    format!("Failed to delete {}.", self.config.noun),
                ));
                Err(ListError::Remote(e.to_string()))
            }
        }
    }
}
