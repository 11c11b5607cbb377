mod book;
mod clipboard;
mod filter;
mod models;
mod normalize;

pub use book::LinkBook;
pub use clipboard::parse_clipboard_links;
pub use filter::{filter_links, query_hash};
pub use models::{
    Background, IconSource, LinkPatch, NewLink, QuickLink, Settings, SettingsPatch,
};
pub use normalize::{display_host, normalize_url};
