//! # Scrapbook Composer Core
//!
//! The composition engine behind Scrapbook Composer: raster images become
//! layers on a fixed 600x400 canvas that can be moved, scaled and
//! depth-ordered, and the arrangement is described as text for prompt
//! generation.
//!
//! ## Architecture
//!
//! ```text
//! pointer input
//!      │
//!      ▼
//! ┌────────────┐   ┌────────────────────┐   ┌──────────────┐
//! │ Hit Tester │──▶│ Gesture Controller │──▶│ Layer        │
//! └────────────┘   │ Idle / Dragging /  │   │ Registry     │
//!                  │ Scaling            │   │ (Scene)      │
//!                  └────────────────────┘   └──────┬───────┘
//!                                                  │
//!                   ┌───────────────┐              │
//!                   │ Depth Manager │─────────────▶│
//!                   └───────────────┘              ▼
//!                                         renderer / describe
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod composer;
pub mod depth;
pub mod describe;
pub mod error;
pub mod event;
pub mod gesture;
pub mod hit;
pub mod layer;
pub mod scene;
pub mod transform;

pub use composer::{Composer, PointerOutcome};
pub use depth::Direction;
pub use describe::{describe, DescriptionStyle, DESCRIPTION_HEADER};
pub use error::{ComposeError, ComposeResult};
pub use event::{Cursor, PointerEvent};
pub use gesture::{GestureState, Transition};
pub use hit::{hit_test, hover_cursor, Handle, Hit};
pub use layer::{Layer, LayerId, LayerSummary};
pub use scene::Scene;
pub use transform::{
    clamp_scale, fit_scale, Bounds, NaturalSize, Point, Transform, CANVAS_HEIGHT, CANVAS_WIDTH,
    HANDLE_OFFSET, HANDLE_SIZE, MAX_SCALE, MIN_SCALE,
};

/// Scrapbook core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
