pub mod auth;
pub mod cli;
pub mod collection;
pub mod commands;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod notify;
pub mod store;
pub mod types;
pub mod validation;

pub use auth::{AuthStore, IdentityProvider, IdentityToolkit, Session, SubscriptionId};
pub use collection::{CollectionConfig, CollectionKind, DEMO_INSTRUCTOR_ID, FallbackState};
pub use config::Config;
pub use controller::{
    EditDraft, ListError, Page, Phase, RegistrationForm, RemoteListController, RowView,
};
pub use error::{CampusError, Result};
pub use notify::{CollectingNotifier, ConsoleNotifier, Notification, Notifier, Severity};
pub use store::{MemoryStore, RemoteStore, RestTable, StoreApiError, StoreCall, StoreOp};
pub use types::{CAMPUS_DIR, COURSES, CategoryFilter, Fields, ListItem};
pub use validation::{FieldRule, Rule, Schema};
