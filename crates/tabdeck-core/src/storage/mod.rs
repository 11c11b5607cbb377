mod database;
mod local_store;
mod retry;
mod store;

pub use database::Database;
pub use local_store::LocalStore;
pub use store::{normalize_preferences, renumber_links, FaviconPreferences, Storage};
