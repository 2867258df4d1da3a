//! Per-collection configuration for the list controller.
//!
//! The student and instructor screens run the same controller; everything
//! that differs between them lives here.

use jiff::Timestamp;

use crate::types::{COURSES, Fields, ListItem, fields};
use crate::validation::{FieldRule, Schema};

/// Id of the locally fabricated demo instructor
pub const DEMO_INSTRUCTOR_ID: &str = "demo-1";

/// What the snapshot becomes when a fetch fails (or, with
/// `DemoRow`, when it returns nothing)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackState {
    /// Show an empty list
    Empty,
    /// Show a single placeholder row that rejects mutation
    DemoRow(ListItem),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Students,
    Instructors,
}

#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub kind: CollectionKind,
    /// Remote table name
    pub table: &'static str,
    /// Lowercase singular noun used in messages ("student")
    pub noun: &'static str,
    pub page_size: usize,
    /// Fields searched case-insensitively by the search term
    pub search_fields: &'static [&'static str],
    /// Field compared against the category filter
    pub category_field: Option<&'static str>,
    pub schema: Schema,
    pub fallback: FallbackState,
    /// Suffix of the success message after registration
    pub registered_suffix: &'static str,
}

impl CollectionConfig {
    pub fn students() -> Self {
        Self {
            kind: CollectionKind::Students,
            table: "students",
            noun: "student",
            page_size: 10,
            search_fields: &["first_name", "last_name", "email", "phone"],
            category_field: Some("course"),
            schema: Schema::new(vec![
                FieldRule::text("first_name", "First name", 100, "First name is required"),
                FieldRule::text("last_name", "Last name", 100, "Last name is required"),
                FieldRule::email("email", "Email", 255),
                FieldRule::text("phone", "Phone number", 50, "Phone number is required"),
                FieldRule::one_of("course", "Course", COURSES, "Please select a course"),
            ]),
            fallback: FallbackState::Empty,
            registered_suffix: "has been registered.",
        }
    }

    pub fn instructors() -> Self {
        Self {
            kind: CollectionKind::Instructors,
            table: "instructors",
            noun: "instructor",
            page_size: 9,
            search_fields: &["first_name", "last_name", "email", "expertise", "bio"],
            category_field: None,
            schema: Schema::new(vec![
                FieldRule::text("first_name", "First name", 100, "First name is required"),
                FieldRule::text("last_name", "Last name", 100, "Last name is required"),
                FieldRule::email("email", "Email", 255),
                FieldRule::text("phone", "Phone number", 50, "Phone number is required"),
                FieldRule::text("expertise", "Expertise", 255, "Expertise is required"),
                FieldRule::text("bio", "Bio", 1000, "Bio is required"),
            ]),
            fallback: FallbackState::DemoRow(demo_instructor()),
            registered_suffix: "has been added as an instructor.",
        }
    }

    pub fn for_kind(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::Students => Self::students(),
            CollectionKind::Instructors => Self::instructors(),
        }
    }

    /// Noun with a leading capital ("Student")
    pub fn title_noun(&self) -> String {
        let mut chars = self.noun.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Snapshot to show after a failed fetch
    pub fn fallback_snapshot(&self) -> Vec<ListItem> {
        match &self.fallback {
            FallbackState::Empty => Vec::new(),
            FallbackState::DemoRow(item) => vec![item.clone()],
        }
    }

    /// Snapshot to show for a successful fetch that returned no rows
    pub fn empty_snapshot(&self) -> Vec<ListItem> {
        self.fallback_snapshot()
    }

    /// Whether the item is a local placeholder that must not be mutated
    pub fn is_sentinel(&self, item: &ListItem) -> bool {
        match &self.fallback {
            FallbackState::DemoRow(demo) => item.id == demo.id,
            FallbackState::Empty => false,
        }
    }
}

fn demo_instructor() -> ListItem {
    ListItem::new(
        DEMO_INSTRUCTOR_ID,
        fields([
            ("first_name", "John"),
            ("last_name", "Doe"),
            ("email", "john.doe@example.com"),
            ("phone", "+1 555 123 4567"),
            ("expertise", "Full Stack Development"),
            (
                "bio",
                "Demo instructor profile used when live data is unavailable. \
                 Specializes in web development and cloud systems.",
            ),
            ("photo_url", ""),
            ("subjects", "JavaScript, React, Node.js"),
        ]),
        Timestamp::now(),
    )
}

/// Form state for registration, reset after every successful submit
pub fn default_form(config: &CollectionConfig) -> Fields {
    config.schema.empty_form()
}
