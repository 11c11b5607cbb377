use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Margin},
    style::Style,
    widgets::Block,
    Terminal,
};
use tokio::sync::mpsc;

use tabdeck_core::{
    favicon::{FaviconResolver, HttpImageProbe, ImageProbe, LoadOutcome, RefreshProgress},
    links::LinkBook,
    storage::Storage,
    AppConfig,
};
use tabdeck_tui::{
    app::{App, Mode},
    event::{AppEvent, EventHandler, IconLoadResult, RefreshUpdate},
    input::{handle_key_event, Action},
    widgets::{
        HeaderWidget, HelpWidget, LinkGridWidget, PageDotsWidget, StatusBarWidget, TILE_HEIGHT,
    },
};

pub async fn run(config: Arc<AppConfig>, store: Arc<dyn Storage>) -> Result<()> {
    let probe: Arc<dyn ImageProbe> = Arc::new(HttpImageProbe::new(&config.favicon)?);
    let resolver = Arc::new(FaviconResolver::new(
        Arc::clone(&probe),
        Arc::clone(&store),
        &config.favicon,
    ));
    if let Err(e) = resolver.load().await {
        tracing::warn!("Failed to load favicon preferences: {}", e);
    }

    let links = store.load_links().await?;
    let settings = store.load_settings().await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("tabdeck"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.clone(), Arc::clone(&resolver), store, links, settings);
    resolver.on_links_changed(&app.links);

    let result = run_loop(&mut terminal, &mut app, probe).await;

    resolver.cancel_background();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    probe: Arc<dyn ImageProbe>,
) -> Result<()> {
    let event_handler = EventHandler::with_animation_fps(
        app.config.ui.tick_rate_ms,
        app.config.scroll.animation_fps,
    );

    // Finished icon probes
    let (icon_tx, mut icon_rx) = mpsc::unbounded_channel::<IconLoadResult>();
    // Bulk refresh progress and completion
    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<RefreshUpdate>();

    loop {
        while let Ok(result) = icon_rx.try_recv() {
            app.apply_icon_result(result);
        }

        while let Ok(update) = refresh_rx.try_recv() {
            handle_refresh_update(app, update);
        }

        if app.needs_frame() {
            app.tick(Instant::now());
        }

        terminal.draw(|frame| {
            let size = frame.area();
            frame.render_widget(Block::default().style(Style::default().bg(app.theme.bg0)), size);

            let grid_height = app.settings.grid_rows * TILE_HEIGHT;
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),           // Clock and filter
                    Constraint::Min(grid_height),    // Link grid
                    Constraint::Length(1),           // Page dots
                    Constraint::Length(1),           // Status bar
                ])
                .split(size);

            let grid_area = layout[1].inner(Margin {
                horizontal: 1,
                vertical: 0,
            });
            // Geometry changes from resizes and filtering land here
            app.sync_layout(grid_area.width);

            HeaderWidget::render(frame, layout[0], app);
            LinkGridWidget::render(frame, grid_area, app);
            PageDotsWidget::render(frame, layout[2], app);
            StatusBarWidget::render(frame, layout[3], app);

            if app.mode == Mode::Help {
                HelpWidget::render(frame, app);
            }
        })?;

        for (link_id, src) in app.pending_icon_loads() {
            spawn_icon_load(
                link_id,
                src,
                Arc::clone(&probe),
                Arc::clone(&app.resolver),
                icon_tx.clone(),
            );
        }

        // Poll at the animation frame rate while the grid is moving
        let event = if app.needs_frame() {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, app);
                    handle_action(app, action, &refresh_tx).await;
                }
                AppEvent::Wheel(wheel) => {
                    app.on_wheel(wheel, Instant::now());
                }
                AppEvent::Resize(_, _) => {
                    // Picked up by sync_layout on the next draw
                }
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn handle_action(app: &mut App, action: Action, refresh_tx: &mpsc::UnboundedSender<RefreshUpdate>) {
    if action != Action::None {
        app.clear_status();
    }

    match action {
        Action::Quit => {
            app.should_quit = true;
        }
        Action::MoveLeft => app.move_left(),
        Action::MoveRight => app.move_right(),
        Action::MoveUp => app.move_up(),
        Action::MoveDown => app.move_down(),
        Action::NextPage => app.next_page(),
        Action::PrevPage => app.prev_page(),
        Action::FirstPage => app.first_page(),
        Action::LastPage => app.last_page(),
        Action::OpenSelected => open_selected(app).await,
        Action::StartFilter => app.set_mode(Mode::Filter),
        Action::ClearFilter => app.clear_query(),
        Action::ExitMode => app.set_mode(Mode::Normal),
        Action::InputChar(c) => app.push_query_char(c),
        Action::Backspace => app.pop_query_char(),
        Action::ToggleHelp => {
            let mode = if app.mode == Mode::Help {
                Mode::Normal
            } else {
                Mode::Help
            };
            app.set_mode(mode);
        }
        Action::RefreshFavicons => start_refresh(app, refresh_tx.clone()),
        Action::None => {}
    }
}

async fn open_selected(app: &mut App) {
    let id = match app.open_selected() {
        Ok(Some(id)) => id,
        Ok(None) => return,
        Err(e) => {
            app.set_status(format!("Failed to open link: {}", e));
            return;
        }
    };

    let mut book = LinkBook::new(app.links.clone());
    if book.record_access(&id).is_err() {
        return;
    }
    match app.store.save_links(book.into_links()).await {
        Ok(saved) => app.replace_links(saved),
        Err(e) => tracing::warn!("Failed to record link launch: {}", e),
    }
}

fn start_refresh(app: &mut App, tx: mpsc::UnboundedSender<RefreshUpdate>) {
    if app.is_refreshing() {
        app.set_status("A favicon refresh is already running");
        return;
    }

    let total = app.links.iter().filter(|l| l.icon.wants_resolution()).count();
    app.refresh = Some(RefreshProgress { done: 0, total });

    let resolver = Arc::clone(&app.resolver);
    let links = app.links.clone();
    tokio::spawn(async move {
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<RefreshProgress>();
        let forward = {
            let tx = tx.clone();
            tokio::spawn(async move {
                while let Some(progress) = progress_rx.recv().await {
                    let _ = tx.send(RefreshUpdate::Progress(progress));
                }
            })
        };

        let result = resolver.refresh_all_favicons(&links, Some(&progress_tx)).await;
        drop(progress_tx);
        let _ = forward.await;
        let _ = tx.send(RefreshUpdate::Finished(result.map_err(|e| e.to_string())));
    });
}

fn handle_refresh_update(app: &mut App, update: RefreshUpdate) {
    match update {
        RefreshUpdate::Progress(progress) => {
            app.refresh = Some(progress);
        }
        RefreshUpdate::Finished(Ok(summary)) => {
            app.refresh = None;
            // Reload every tile against the new preferences
            app.reset_icons();
            app.set_status(format!(
                "Favicons refreshed: {} of {} resolved",
                summary.resolved, summary.total
            ));
        }
        RefreshUpdate::Finished(Err(error)) => {
            app.refresh = None;
            app.set_status(format!("Favicon refresh failed: {}", error));
        }
    }
}

/// Load `src` off-screen and report the outcome to the resolver and the UI
fn spawn_icon_load(
    link_id: String,
    src: String,
    probe: Arc<dyn ImageProbe>,
    resolver: Arc<FaviconResolver>,
    tx: mpsc::UnboundedSender<IconLoadResult>,
) {
    tokio::spawn(async move {
        let outcome = LoadOutcome::from(probe.probe(&src).await);
        if let Err(e) = resolver.report_favicon_load_result(&link_id, &src, outcome).await {
            tracing::warn!("Failed to store favicon for {}: {}", link_id, e);
        }
        let _ = tx.send(IconLoadResult {
            link_id,
            src,
            outcome,
        });
    });
}
