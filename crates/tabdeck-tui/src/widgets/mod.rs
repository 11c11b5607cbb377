mod header;
mod help;
mod link_grid;
mod page_dots;
mod status_bar;

pub use header::{format_clock, HeaderWidget};
pub use help::HelpWidget;
pub use link_grid::{truncate_to_width, LinkGridWidget, TILE_HEIGHT};
pub use page_dots::PageDotsWidget;
pub use status_bar::StatusBarWidget;
