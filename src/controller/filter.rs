//! Search and category filtering over a snapshot

use crate::collection::CollectionConfig;
use crate::types::{CategoryFilter, ListItem};

/// Current search term and category restriction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_term: String,
    pub category: CategoryFilter,
}

impl FilterState {
    /// Category predicate. Collections without a category field accept everything.
    pub fn category_matches(&self, item: &ListItem, config: &CollectionConfig) -> bool {
        match config.category_field {
            Some(field) => self.category.matches(item.field(field)),
            None => true,
        }
    }

    /// Case-insensitive substring match against the searchable fields.
    /// An empty term matches everything.
    pub fn search_matches(&self, item: &ListItem, config: &CollectionConfig) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let needle = self.search_term.to_lowercase();
        config
            .search_fields
            .iter()
            .any(|field| item.field(field).to_lowercase().contains(&needle))
    }

    pub fn matches(&self, item: &ListItem, config: &CollectionConfig) -> bool {
        self.category_matches(item, config) && self.search_matches(item, config)
    }
}

/// Items of `snapshot` accepted by `filter`, in snapshot order.
///
/// The iterator is lazy and can be cloned to walk the view again.
pub fn filtered_view<'a>(
    snapshot: &'a [ListItem],
    filter: &'a FilterState,
    config: &'a CollectionConfig,
) -> impl Iterator<Item = &'a ListItem> + Clone + 'a {
    snapshot
        .iter()
        .filter(move |item| filter.matches(item, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fields;
    use jiff::Timestamp;

    fn student(id: &str, first: &str, email: &str, phone: &str, course: &str) -> ListItem {
        ListItem::new(
            id,
            fields([
                ("first_name", first),
                ("last_name", "Smith"),
                ("email", email),
                ("phone", phone),
                ("course", course),
            ]),
            Timestamp::UNIX_EPOCH,
        )
    }

    fn snapshot() -> Vec<ListItem> {
        vec![
            student("1", "Alice", "alice@uni.edu", "555-0101", "React Fundamentals"),
            student("2", "Bob", "bob@uni.edu", "555-0102", "UI/UX Design"),
            student("3", "Carol", "CAROL@uni.edu", "555-0103", "React Fundamentals"),
        ]
    }

    fn ids<'a>(items: impl Iterator<Item = &'a ListItem>) -> Vec<&'a str> {
        items.map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything_in_order() {
        let config = CollectionConfig::students();
        let filter = FilterState::default();
        let snap = snapshot();
        assert_eq!(ids(filtered_view(&snap, &filter, &config)), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let config = CollectionConfig::students();
        let filter = FilterState {
            search_term: "carol@".to_string(),
            ..Default::default()
        };
        let snap = snapshot();
        assert_eq!(ids(filtered_view(&snap, &filter, &config)), vec!["3"]);
    }

    #[test]
    fn test_search_matches_phone() {
        let config = CollectionConfig::students();
        let filter = FilterState {
            search_term: "0102".to_string(),
            ..Default::default()
        };
        let snap = snapshot();
        assert_eq!(ids(filtered_view(&snap, &filter, &config)), vec!["2"]);
    }

    #[test]
    fn test_category_and_search_combine() {
        let config = CollectionConfig::students();
        let filter = FilterState {
            search_term: "smith".to_string(),
            category: CategoryFilter::Only("React Fundamentals".to_string()),
        };
        let snap = snapshot();
        assert_eq!(ids(filtered_view(&snap, &filter, &config)), vec!["1", "3"]);
    }

    #[test]
    fn test_non_searchable_field_is_ignored() {
        let config = CollectionConfig::students();
        // course is a category, not a search field
        let filter = FilterState {
            search_term: "design".to_string(),
            ..Default::default()
        };
        let snap = snapshot();
        assert_eq!(filtered_view(&snap, &filter, &config).count(), 0);
    }

    #[test]
    fn test_view_is_restartable() {
        let config = CollectionConfig::students();
        let filter = FilterState::default();
        let snap = snapshot();
        let view = filtered_view(&snap, &filter, &config);
        assert_eq!(view.clone().count(), 3);
        assert_eq!(view.count(), 3);
    }

    #[test]
    fn test_category_ignored_without_category_field() {
        let config = CollectionConfig::instructors();
        let filter = FilterState {
            category: CategoryFilter::Only("anything".to_string()),
            ..Default::default()
        };
        let snap = snapshot();
        assert_eq!(filtered_view(&snap, &filter, &config).count(), 3);
    }
}
