//! A box's border-box rectangle and resolved edges.

use rustkit_css::{ComputedStyle, WritingMode};

use crate::geometry::{PhysicalBoxStrut, PhysicalOffset, PhysicalRect, PhysicalSize};
use crate::units::{minimum_value_for_length, LayoutUnit};
use crate::writing_mode::WritingDirection;

/// What a frame mutation invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameChange {
    /// Same value, nothing to do.
    None,
    /// Only the position in the container moved.
    Location,
    /// The size changed. `subtree` is set when descendants' physical
    /// locations depend on it.
    Size { subtree: bool },
}

impl FrameChange {
    pub fn is_changed(self) -> bool {
        self != FrameChange::None
    }
}

/// Border-box rectangle and edges of one box.
///
/// `location` is the top-left corner in the containing box's flipped-blocks
/// space: for a `vertical-rl` container it is measured from the container's
/// right edge. Use [`BoxFrame::physical_location`] for true physical
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxFrame {
    location: PhysicalOffset,
    size: PhysicalSize,
    writing_direction: WritingDirection,
    pub border: PhysicalBoxStrut,
    pub padding: PhysicalBoxStrut,
    pub margin: PhysicalBoxStrut,
}

impl BoxFrame {
    pub fn new(writing_direction: WritingDirection) -> Self {
        Self {
            writing_direction,
            ..Default::default()
        }
    }

    /// Frame with edges resolved from `style`, percentages against
    /// `containing_inline_size`.
    pub fn from_style(style: &ComputedStyle, containing_inline_size: LayoutUnit) -> Self {
        let mut frame = Self::new(WritingDirection::new(style.writing_mode, style.direction));
        frame.resolve_edges(style, containing_inline_size);
        frame
    }

    /// Re-resolve border, padding and margin.
    pub fn resolve_edges(&mut self, style: &ComputedStyle, containing_inline_size: LayoutUnit) {
        let reference = containing_inline_size.to_f32();
        let resolve = |length| minimum_value_for_length(length, containing_inline_size);
        self.border = PhysicalBoxStrut::new(
            LayoutUnit::from_f32(style.border_top.used_width(reference)),
            LayoutUnit::from_f32(style.border_right.used_width(reference)),
            LayoutUnit::from_f32(style.border_bottom.used_width(reference)),
            LayoutUnit::from_f32(style.border_left.used_width(reference)),
        );
        self.padding = PhysicalBoxStrut::new(
            resolve(style.padding_top),
            resolve(style.padding_right),
            resolve(style.padding_bottom),
            resolve(style.padding_left),
        );
        self.margin = PhysicalBoxStrut::new(
            resolve(style.margin_top),
            resolve(style.margin_right),
            resolve(style.margin_bottom),
            resolve(style.margin_left),
        );
        self.writing_direction = WritingDirection::new(style.writing_mode, style.direction);
    }

    pub fn writing_direction(&self) -> WritingDirection {
        self.writing_direction
    }

    pub fn location(&self) -> PhysicalOffset {
        self.location
    }

    pub fn size(&self) -> PhysicalSize {
        self.size
    }

    pub fn width(&self) -> LayoutUnit {
        self.size.width
    }

    pub fn height(&self) -> LayoutUnit {
        self.size.height
    }

    /// Frame rect in the container's flipped-blocks space.
    pub fn frame_rect(&self) -> PhysicalRect {
        PhysicalRect::new(self.location, self.size)
    }

    pub fn set_location(&mut self, location: PhysicalOffset) -> FrameChange {
        if location == self.location {
            return FrameChange::None;
        }
        self.location = location;
        FrameChange::Location
    }

    /// Negative sizes clamp to zero.
    pub fn set_size(&mut self, size: PhysicalSize) -> FrameChange {
        let size = size.clamp_negative_to_zero();
        if size == self.size {
            return FrameChange::None;
        }
        let width_changed = size.width != self.size.width;
        self.size = size;
        FrameChange::Size {
            subtree: width_changed && self.writing_direction.is_flipped_blocks(),
        }
    }

    /// Location relative to `container`'s border box, in physical space.
    pub fn physical_location(&self, container: Option<&BoxFrame>) -> PhysicalOffset {
        match container {
            Some(container) if container.writing_direction.is_flipped_blocks() => {
                PhysicalOffset::new(
                    container.flip_for_writing_mode(self.location.left, self.size.width),
                    self.location.top,
                )
            }
            _ => self.location,
        }
    }

    /// Mirror an x range of `width` at `x` when this box has flipped blocks.
    pub fn flip_for_writing_mode(&self, x: LayoutUnit, width: LayoutUnit) -> LayoutUnit {
        if !self.writing_direction.is_flipped_blocks() {
            return x;
        }
        self.size.width - width - x
    }

    pub fn physical_border_box_rect(&self) -> PhysicalRect {
        PhysicalRect::new(PhysicalOffset::default(), self.size)
    }

    pub fn logical_left(&self) -> LayoutUnit {
        if self.writing_direction.is_horizontal() {
            self.location.left
        } else {
            self.location.top
        }
    }

    pub fn logical_top(&self) -> LayoutUnit {
        if self.writing_direction.is_horizontal() {
            self.location.top
        } else {
            self.location.left
        }
    }

    pub fn logical_width(&self) -> LayoutUnit {
        if self.writing_direction.is_horizontal() {
            self.size.width
        } else {
            self.size.height
        }
    }

    pub fn logical_height(&self) -> LayoutUnit {
        if self.writing_direction.is_horizontal() {
            self.size.height
        } else {
            self.size.width
        }
    }

    pub fn border_width(&self) -> LayoutUnit {
        self.border.horizontal_sum()
    }

    pub fn border_height(&self) -> LayoutUnit {
        self.border.vertical_sum()
    }

    pub fn border_and_padding_width(&self) -> LayoutUnit {
        self.border.horizontal_sum() + self.padding.horizontal_sum()
    }

    pub fn border_and_padding_height(&self) -> LayoutUnit {
        self.border.vertical_sum() + self.padding.vertical_sum()
    }

    /// Margin at the block end of `writing_direction`, usually the container's.
    pub fn margin_block_end(&self, writing_direction: WritingDirection) -> LayoutUnit {
        match writing_direction.writing_mode {
            WritingMode::HorizontalTb => self.margin.bottom,
            WritingMode::VerticalRl => self.margin.left,
            WritingMode::VerticalLr => self.margin.right,
        }
    }
}
