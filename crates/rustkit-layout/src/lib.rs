//! # RustKit Layout
//!
//! Box geometry core for the RustKit engine.
//!
//! ## Design Goals
//!
//! 1. **Box geometry**: border, padding, client and content rects in every
//!    writing mode
//! 2. **Overflow**: layout (scrollable) and visual overflow with propagation
//!    across writing-mode boundaries
//! 3. **Scrolling**: scroll origin, offsets, scrollbar existence and
//!    overflow-control rects
//! 4. **Backgrounds**: tile size, phase, spacing and destination rects for
//!    each background layer
//!
//! Boxes live in a [`LayoutTree`] arena. Geometry is fixed point
//! ([`LayoutUnit`], 1/64 px) and converts to integer pixels only at the
//! scrolling and painting edges.

use rustkit_common::RustKitError;
use thiserror::Error;

pub mod background;
pub mod box_frame;
pub mod box_model;
pub mod config;
pub mod context;
pub mod geometry;
pub mod overflow;
pub mod scroll;
pub mod tree;
pub mod units;
pub mod writing_mode;

pub use background::{BackgroundGeometry, BackgroundPaintContext, ImageSizingInfo, ObscuringEdges};
pub use box_frame::{BoxFrame, FrameChange};
pub use box_model::{BoxGeometry, NodeKind};
pub use config::{LayoutConfig, PagingConfig, ScrollbarTheme};
pub use context::LayoutContext;
pub use geometry::{
    IntPoint, IntRect, IntSize, IntVector, LogicalBoxStrut, LogicalOffset, LogicalRect,
    LogicalSize, PhysicalBoxStrut, PhysicalOffset, PhysicalRect, PhysicalSize,
};
pub use overflow::{OverflowClipAxes, OverflowModel};
pub use scroll::{
    OverflowControlHit, ResizerHitTestType, ScrollOffset, Scrollable, ScrollableArea, Scrollbar,
    ScrollbarOrientation,
};
pub use tree::{BoxFlags, BoxId, LayoutBox, LayoutTree};
pub use units::LayoutUnit;
pub use writing_mode::{WritingDirection, WritingModeConverter};

/// Errors that can occur in layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Unknown box {0}")]
    UnknownBox(BoxId),

    #[error("Box {0} is not a scroll container")]
    NotAScrollContainer(BoxId),

    #[error("Box {0} already has a parent")]
    AlreadyAttached(BoxId),

    #[error("Appending {child} to {parent} would create a cycle")]
    CycleDetected { parent: BoxId, child: BoxId },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl From<LayoutError> for RustKitError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::InvalidConfig(message) => RustKitError::config(message),
            LayoutError::ConfigParse(source) => {
                RustKitError::config_with_source("failed to parse layout config", source)
            }
            other => RustKitError::layout(other.to_string()),
        }
    }
}

/// Result type alias for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;
