use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tabdeck_core::favicon::{FaviconResolver, RefreshProgress};
use tabdeck_core::links::{filter_links, query_hash, QuickLink, Settings};
use tabdeck_core::storage::Storage;
use tabdeck_core::AppConfig;

use crate::event::IconLoadResult;
use crate::grid::GridSurface;
use crate::scroll::{LayoutInputs, PagedScrollController, ScrollSurface, WheelEvent};
use crate::theme::Theme;

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Typing into the quick filter
    Filter,
    /// Help overlay
    Help,
}

/// What a tile shows in place of its favicon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconState {
    Loading,
    Loaded,
    /// Vector fallback glyph
    Fallback,
}

impl IconState {
    pub fn glyph(self) -> &'static str {
        match self {
            IconState::Loaded => "●",
            IconState::Loading => "◌",
            IconState::Fallback => "○",
        }
    }
}

#[derive(Debug, Clone)]
struct IconView {
    src: Option<String>,
    state: IconState,
}

/// Application state
pub struct App {
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    pub resolver: Arc<FaviconResolver>,
    pub store: Arc<dyn Storage>,
    pub links: Vec<QuickLink>,
    pub settings: Settings,
    pub mode: Mode,
    /// Quick filter query
    pub query: String,
    /// Selected index among the visible links
    pub selected: usize,
    pub scroller: PagedScrollController<GridSurface>,
    /// Bulk favicon refresh in progress
    pub refresh: Option<RefreshProgress>,
    pub should_quit: bool,
    pub status_message: Option<String>,
    icons: HashMap<String, IconView>,
}

impl App {
    pub fn new(
        config: Arc<AppConfig>,
        resolver: Arc<FaviconResolver>,
        store: Arc<dyn Storage>,
        links: Vec<QuickLink>,
        settings: Settings,
    ) -> Self {
        let scroller = PagedScrollController::new(GridSurface::new(&config.ui), config.scroll.clone());
        Self {
            theme: Theme::default().with_background(&settings.background),
            config,
            resolver,
            store,
            links,
            settings,
            mode: Mode::Normal,
            query: String::new(),
            selected: 0,
            scroller,
            refresh: None,
            should_quit: false,
            status_message: None,
            icons: HashMap::new(),
        }
    }

    /// Links matching the quick filter, in grid order
    pub fn visible_links(&self) -> Vec<&QuickLink> {
        filter_links(&self.links, &self.query)
    }

    pub fn selected_link(&self) -> Option<&QuickLink> {
        self.visible_links().get(self.selected).copied()
    }

    /// Launch the selected link in the default browser, returning its id
    pub fn open_selected(&self) -> anyhow::Result<Option<String>> {
        let Some(link) = self.selected_link() else {
            return Ok(None);
        };
        open::that(&link.url)?;
        tracing::info!("Opened {} ({})", link.url, link.id);
        Ok(Some(link.id.clone()))
    }

    pub fn layout_inputs(&self) -> LayoutInputs {
        LayoutInputs {
            query_hash: query_hash(&self.query),
            rows: self.settings.grid_rows,
            columns: self.settings.grid_columns,
            icon_size: self.settings.icon_size,
            visible_count: self.visible_links().len(),
        }
    }

    /// Bring the grid geometry in line with the terminal and the filter
    ///
    /// Call before drawing with the width available to the grid.
    pub fn sync_layout(&mut self, available_cells: u16) {
        let count = self.visible_links().len();
        let inputs = self.layout_inputs();
        let (rows, columns) = (self.settings.grid_rows, self.settings.grid_columns);

        let surface = self.scroller.surface_mut();
        let viewport_before = surface.viewport_cells();
        surface.set_viewport(available_cells, columns);
        surface.set_links(count, rows);
        let viewport_changed = surface.viewport_cells() != viewport_before;

        if self.scroller.on_layout_inputs_changed(inputs) {
            self.selected = 0;
        } else if viewport_changed {
            self.scroller.on_resize();
        }
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    pub fn replace_links(&mut self, links: Vec<QuickLink>) {
        self.links = links;
        self.resolver.on_links_changed(&self.links);
    }

    pub fn on_wheel(&mut self, event: WheelEvent, now: Instant) {
        self.scroller.on_wheel(event, now);
    }

    /// Advance scroll animation by one frame
    pub fn tick(&mut self, now: Instant) {
        self.scroller.tick(now);
    }

    pub fn needs_frame(&self) -> bool {
        self.scroller.needs_frame()
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.scroller.set_overlay_open(mode == Mode::Help);
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
        self.set_mode(Mode::Normal);
    }

    pub fn move_right(&mut self) {
        let rows = self.scroller.surface().rows();
        if self.selected + rows < self.visible_links().len() {
            self.selected += rows;
            self.reveal_selected();
        }
    }

    pub fn move_left(&mut self) {
        let rows = self.scroller.surface().rows();
        if self.selected >= rows {
            self.selected -= rows;
            self.reveal_selected();
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.visible_links().len() {
            self.selected += 1;
            self.reveal_selected();
        }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.reveal_selected();
        }
    }

    pub fn next_page(&mut self) {
        self.scroller.next_page();
        self.select_first_on_active_page();
    }

    pub fn prev_page(&mut self) {
        self.scroller.prev_page();
        self.select_first_on_active_page();
    }

    pub fn first_page(&mut self) {
        self.scroller.scroll_to_page(0);
        self.select_first_on_active_page();
    }

    pub fn last_page(&mut self) {
        self.scroller.scroll_to_page(usize::MAX);
        self.select_first_on_active_page();
    }

    fn select_first_on_active_page(&mut self) {
        let state = self.scroller.snap_state();
        let offset = self.scroller.snap_points().offset_of(state.active_page_index);
        let surface = self.scroller.surface();
        let step = surface.column_step();
        if step <= 0.0 {
            return;
        }
        let column = (offset / step).ceil() as usize;
        let index = column * surface.rows();
        let count = self.visible_links().len();
        if index < count {
            self.selected = index;
        }
    }

    /// Scroll to the page showing the selected tile if it is off screen
    fn reveal_selected(&mut self) {
        let surface = self.scroller.surface();
        let (column, _) = surface.cell_of(self.selected);
        let x = surface.column_offset_px(column);
        let step = surface.column_step();
        let viewport = surface.viewport_width();

        let snaps = self.scroller.snap_points();
        let active = self.scroller.snap_state().active_page_index;
        let page_offset = snaps.offset_of(active);
        let visible = x >= page_offset - 0.5 && x + step <= page_offset + viewport + 0.5;
        if !visible {
            let page = snaps.directional_index(x, -1.0);
            self.scroller.scroll_to_page(page);
        }
    }

    pub fn icon_state(&self, link_id: &str) -> IconState {
        self.icons
            .get(link_id)
            .map(|view| view.state)
            .unwrap_or(IconState::Loading)
    }

    /// Icons on screen that need loading, as `(link_id, src)` pairs
    ///
    /// Each source is requested once. Tiles without a source switch to the
    /// fallback glyph.
    pub fn pending_icon_loads(&mut self) -> Vec<(String, String)> {
        let surface = self.scroller.surface();
        let rows = surface.rows();
        let columns = surface.visible_columns();
        let range = columns.start * rows..columns.end * rows;

        let mut requests = Vec::new();
        let mut updates = Vec::new();
        for link in self.visible_links().into_iter().skip(range.start).take(range.len()) {
            let source = self.resolver.favicon_source_for(link);
            let current = self.icons.get(&link.id);
            if current.is_some_and(|view| view.src == source.display_src) {
                continue;
            }
            match source.display_src {
                Some(src) => {
                    requests.push((link.id.clone(), src.clone()));
                    updates.push((link.id.clone(), Some(src), IconState::Loading));
                }
                None => updates.push((link.id.clone(), None, IconState::Fallback)),
            }
        }

        for (id, src, state) in updates {
            self.icons.insert(id, IconView { src, state });
        }
        requests
    }

    /// Record a finished icon load; stale results are ignored
    pub fn apply_icon_result(&mut self, result: IconLoadResult) {
        if let Some(view) = self.icons.get_mut(&result.link_id) {
            if view.src.as_deref() == Some(result.src.as_str()) {
                view.state = if result.outcome.success {
                    IconState::Loaded
                } else {
                    IconState::Fallback
                };
            }
        }
    }

    /// Forget loaded icons so they are requested again
    pub fn reset_icons(&mut self) {
        self.icons.clear();
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_some() || self.resolver.is_refreshing()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tabdeck_core::favicon::{ImageProbe, LoadOutcome, ProbeResult};
    use tabdeck_core::links::{IconSource, SettingsPatch};
    use tabdeck_core::storage::FaviconPreferences;

    struct NoProbe;

    #[async_trait]
    impl ImageProbe for NoProbe {
        async fn probe(&self, _url: &str) -> ProbeResult {
            ProbeResult::failed()
        }
    }

    struct NullStore;

    #[async_trait]
    impl Storage for NullStore {
        async fn load_links(&self) -> tabdeck_core::Result<Vec<QuickLink>> {
            Ok(Vec::new())
        }
        async fn save_links(&self, links: Vec<QuickLink>) -> tabdeck_core::Result<Vec<QuickLink>> {
            Ok(links)
        }
        async fn load_favicon_preferences(&self) -> tabdeck_core::Result<FaviconPreferences> {
            Ok(FaviconPreferences::new())
        }
        async fn save_favicon_preferences(
            &self,
            preferences: FaviconPreferences,
        ) -> tabdeck_core::Result<FaviconPreferences> {
            Ok(preferences)
        }
        async fn load_settings(&self) -> tabdeck_core::Result<Settings> {
            Ok(Settings::default())
        }
        async fn save_settings(&self, patch: SettingsPatch) -> tabdeck_core::Result<Settings> {
            Ok(Settings::default().merge(&patch))
        }
    }

    fn link(i: usize) -> QuickLink {
        QuickLink {
            id: format!("id{}", i),
            name: format!("Site {}", i),
            url: format!("https://site{}.com/", i),
            icon: IconSource::Auto,
            tags: Vec::new(),
            order: i as u32,
            access_log: Vec::new(),
        }
    }

    /// 40 links, 3 rows, 6 columns of 20 cells per page
    fn app() -> App {
        let config = Arc::new(AppConfig::default());
        let resolver = Arc::new(FaviconResolver::new(
            Arc::new(NoProbe),
            Arc::new(NullStore),
            &config.favicon,
        ));
        let mut app = App::new(
            config,
            resolver,
            Arc::new(NullStore),
            (0..40).map(link).collect(),
            Settings::default(),
        );
        app.sync_layout(200);
        app
    }

    fn settle(app: &mut App) {
        let mut now = Instant::now();
        for _ in 0..2000 {
            if !app.needs_frame() {
                return;
            }
            now += std::time::Duration::from_millis(16);
            app.tick(now);
        }
        panic!("scroller never settled");
    }

    #[test]
    fn test_pages_from_terminal_width() {
        let app = app();
        let state = app.scroller.snap_state();
        // 14 columns, 6 per page
        assert_eq!(state.page_count, 3);
        assert_eq!(state.active_page_index, 0);
    }

    #[test]
    fn test_filter_change_resets_layout() {
        let mut app = app();
        app.next_page();
        settle(&mut app);
        assert_eq!(app.scroller.snap_state().active_page_index, 1);

        for c in "site7".chars() {
            app.push_query_char(c);
        }
        app.sync_layout(200);
        // only the host site7.com matches
        assert_eq!(app.visible_links().len(), 1);
        assert_eq!(app.scroller.snap_state().page_count, 1);
        assert_eq!(app.scroller.snap_state().active_page_index, 0);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_moving_off_page_scrolls() {
        let mut app = app();
        for _ in 0..6 {
            app.move_right();
        }
        assert_eq!(app.selected, 18);
        assert!(app.needs_frame());
        settle(&mut app);
        assert_eq!(app.scroller.snap_state().active_page_index, 1);
    }

    #[test]
    fn test_page_keys_select_first_tile_on_page() {
        let mut app = app();
        app.next_page();
        assert_eq!(app.selected, 18);
        app.last_page();
        // last page starts at column 8
        assert_eq!(app.selected, 24);
        app.first_page();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_help_overlay_blocks_wheel() {
        let mut app = app();
        app.set_mode(Mode::Help);
        app.on_wheel(WheelEvent::pages(0.0, 1.0), Instant::now());
        assert!(!app.needs_frame());
        app.set_mode(Mode::Normal);
        app.on_wheel(WheelEvent::pages(0.0, 1.0), Instant::now());
        assert!(app.needs_frame());
    }

    #[test]
    fn test_icons_requested_once_per_source() {
        let mut app = app();
        let requests = app.pending_icon_loads();
        // 6 visible columns of 3
        assert_eq!(requests.len(), 18);
        assert_eq!(requests[0].1, "https://site0.com/favicon.ico");
        assert!(app.pending_icon_loads().is_empty());
        assert_eq!(app.icon_state("id0"), IconState::Loading);

        app.apply_icon_result(IconLoadResult {
            link_id: "id0".into(),
            src: "https://site0.com/favicon.ico".into(),
            outcome: LoadOutcome::loaded(32, 32),
        });
        assert_eq!(app.icon_state("id0"), IconState::Loaded);

        // stale result for another source is ignored
        app.apply_icon_result(IconLoadResult {
            link_id: "id1".into(),
            src: "https://elsewhere.com/x.png".into(),
            outcome: LoadOutcome::loaded(32, 32),
        });
        assert_eq!(app.icon_state("id1"), IconState::Loading);
    }

    #[test]
    fn test_disabled_icons_use_fallback_glyph() {
        let mut app = app();
        app.links[0].icon = IconSource::Disabled;
        let requests = app.pending_icon_loads();
        assert!(requests.iter().all(|(id, _)| id != "id0"));
        assert_eq!(app.icon_state("id0"), IconState::Fallback);
    }
}
