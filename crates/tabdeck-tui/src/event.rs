use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use tabdeck_core::favicon::{LoadOutcome, RefreshProgress, RefreshSummary};

use crate::scroll::WheelEvent;

/// Event handler for terminal events
pub struct EventHandler {
    tick_rate: Duration,
    frame_rate: Duration,
}

/// A favicon source finished loading for a tile
#[derive(Debug, Clone)]
pub struct IconLoadResult {
    pub link_id: String,
    pub src: String,
    pub outcome: LoadOutcome,
}

/// Progress of a bulk favicon refresh started from the UI
#[derive(Debug, Clone)]
pub enum RefreshUpdate {
    Progress(RefreshProgress),
    Finished(std::result::Result<RefreshSummary, String>),
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self::with_animation_fps(tick_rate_ms, 60)
    }

    /// Handler that polls at `animation_fps` while an animation is running
    pub fn with_animation_fps(tick_rate_ms: u64, animation_fps: u32) -> Self {
        let frame_ms = if animation_fps == 0 {
            16
        } else {
            (1000 / animation_fps as u64).max(1)
        };
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
            frame_rate: Duration::from_millis(frame_ms),
        }
    }

    /// Poll for the next event, waiting up to the tick rate
    pub fn next(&self) -> Result<Option<AppEvent>> {
        self.poll(self.tick_rate)
    }

    /// Poll for the next event, waiting at most one animation frame
    pub fn next_animation(&self) -> Result<Option<AppEvent>> {
        self.poll(self.frame_rate)
    }

    fn poll(&self, timeout: Duration) -> Result<Option<AppEvent>> {
        if event::poll(timeout)? {
            Ok(translate(event::read()?))
        } else {
            Ok(Some(AppEvent::Tick))
        }
    }
}

fn translate(event: Event) -> Option<AppEvent> {
    match event {
        // Only handle key press events, ignore release events
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Mouse(mouse) => wheel_from_mouse(&mouse).map(AppEvent::Wheel),
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        _ => None,
    }
}

/// Terminal wheel notches carry no distance; each one counts as a page
pub fn wheel_from_mouse(mouse: &MouseEvent) -> Option<WheelEvent> {
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(WheelEvent::pages(0.0, 1.0)),
        MouseEventKind::ScrollUp => Some(WheelEvent::pages(0.0, -1.0)),
        MouseEventKind::ScrollRight => Some(WheelEvent::pages(1.0, 0.0)),
        MouseEventKind::ScrollLeft => Some(WheelEvent::pages(-1.0, 0.0)),
        _ => None,
    }
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    /// Mouse wheel or trackpad scroll
    Wheel(WheelEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Tick event for periodic updates
    Tick,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_wheel_directions() {
        assert_eq!(
            wheel_from_mouse(&mouse(MouseEventKind::ScrollDown)),
            Some(WheelEvent::pages(0.0, 1.0))
        );
        assert_eq!(
            wheel_from_mouse(&mouse(MouseEventKind::ScrollLeft)),
            Some(WheelEvent::pages(-1.0, 0.0))
        );
        assert_eq!(wheel_from_mouse(&mouse(MouseEventKind::Moved)), None);
    }

    #[test]
    fn test_frame_rate() {
        let handler = EventHandler::with_animation_fps(100, 50);
        assert_eq!(handler.frame_rate, Duration::from_millis(20));
        assert_eq!(EventHandler::with_animation_fps(100, 0).frame_rate, Duration::from_millis(16));
    }
}
