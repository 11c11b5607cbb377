//! Paged horizontal scrolling for the link grid
//!
//! Columns of link tiles overflow the viewport horizontally. This module makes
//! that row behave like a carousel: wheel input moves it continuously with
//! magnetic pull toward page boundaries, and it comes to rest on a page once
//! input stops.
//!
//! # Layers
//!
//! - `config` - derived values over `tabdeck_core::ScrollConfig`
//! - `snap` - page boundary computation and nearest/directional lookup
//! - `animation` - exponential ease toward a target offset
//! - `wheel` - wheel normalization and magnetic snapping
//! - `controller` - `PagedScrollController`, composing the above
//!
//! # Usage
//!
//! ```ignore
//! let mut scroller = PagedScrollController::new(surface, config.scroll.clone());
//!
//! scroller.on_wheel(WheelEvent::lines(0.0, 3.0), Instant::now());
//!
//! // once per frame
//! while scroller.needs_frame() {
//!     scroller.tick(Instant::now());
//! }
//! ```

pub mod config;
pub mod snap;

pub mod animation;
pub mod wheel;

pub mod controller;

pub use animation::{Motion, MotionKind, ScrollAnimator};
pub use config::{ScrollConfig, ScrollConfigExt};
pub use controller::{
    FrameOutcome, LayoutInputs, PagedScrollController, ScrollSurface, SnapState, WheelOutcome,
};
pub use snap::{SnapPoints, MAX_SNAP_POINTS};
pub use wheel::{DeltaMode, WheelEvent, WheelInputInterpreter};
