//! Conversions between logical (inline/block) and physical coordinates.

use rustkit_css::{Direction, WritingMode};

use crate::geometry::{
    LogicalBoxStrut, LogicalOffset, LogicalRect, LogicalSize, PhysicalBoxStrut, PhysicalOffset,
    PhysicalRect, PhysicalSize,
};

/// A writing mode and inline direction pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct WritingDirection {
    pub writing_mode: WritingMode,
    pub direction: Direction,
}

impl WritingDirection {
    pub const fn new(writing_mode: WritingMode, direction: Direction) -> Self {
        Self {
            writing_mode,
            direction,
        }
    }

    pub fn is_horizontal(self) -> bool {
        self.writing_mode.is_horizontal()
    }

    pub fn is_flipped_blocks(self) -> bool {
        self.writing_mode.is_flipped_blocks()
    }

    pub fn is_ltr(self) -> bool {
        self.direction.is_ltr()
    }

    /// Inline or block progression runs toward physical left.
    pub fn is_flipped_x(self) -> bool {
        match self.writing_mode {
            WritingMode::HorizontalTb => !self.is_ltr(),
            WritingMode::VerticalRl => true,
            WritingMode::VerticalLr => false,
        }
    }

    /// Inline progression runs toward physical top.
    pub fn is_flipped_y(self) -> bool {
        !self.is_horizontal() && !self.is_ltr()
    }
}

/// Converts offsets, sizes and rects of an inner box positioned inside an
/// outer box of `outer_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritingModeConverter {
    writing_direction: WritingDirection,
    outer_size: PhysicalSize,
}

impl WritingModeConverter {
    pub fn new(writing_direction: WritingDirection, outer_size: PhysicalSize) -> Self {
        Self {
            writing_direction,
            outer_size,
        }
    }

    /// A converter for sizes and struts, which do not depend on the outer size.
    pub fn without_outer_size(writing_direction: WritingDirection) -> Self {
        Self::new(writing_direction, PhysicalSize::default())
    }

    pub fn writing_direction(&self) -> WritingDirection {
        self.writing_direction
    }

    pub fn outer_size(&self) -> PhysicalSize {
        self.outer_size
    }

    pub fn to_physical_offset(
        &self,
        offset: LogicalOffset,
        inner_size: PhysicalSize,
    ) -> PhysicalOffset {
        let outer = self.outer_size;
        let (i, b) = (offset.inline_offset, offset.block_offset);
        let ltr = self.writing_direction.is_ltr();
        match self.writing_direction.writing_mode {
            WritingMode::HorizontalTb if ltr => PhysicalOffset::new(i, b),
            WritingMode::HorizontalTb => {
                PhysicalOffset::new(outer.width - inner_size.width - i, b)
            }
            WritingMode::VerticalRl if ltr => {
                PhysicalOffset::new(outer.width - inner_size.width - b, i)
            }
            WritingMode::VerticalRl => PhysicalOffset::new(
                outer.width - inner_size.width - b,
                outer.height - inner_size.height - i,
            ),
            WritingMode::VerticalLr if ltr => PhysicalOffset::new(b, i),
            WritingMode::VerticalLr => {
                PhysicalOffset::new(b, outer.height - inner_size.height - i)
            }
        }
    }

    pub fn to_logical_offset(
        &self,
        offset: PhysicalOffset,
        inner_size: PhysicalSize,
    ) -> LogicalOffset {
        let outer = self.outer_size;
        let (x, y) = (offset.left, offset.top);
        let ltr = self.writing_direction.is_ltr();
        match self.writing_direction.writing_mode {
            WritingMode::HorizontalTb if ltr => LogicalOffset::new(x, y),
            WritingMode::HorizontalTb => {
                LogicalOffset::new(outer.width - inner_size.width - x, y)
            }
            WritingMode::VerticalRl if ltr => {
                LogicalOffset::new(y, outer.width - inner_size.width - x)
            }
            WritingMode::VerticalRl => LogicalOffset::new(
                outer.height - inner_size.height - y,
                outer.width - inner_size.width - x,
            ),
            WritingMode::VerticalLr if ltr => LogicalOffset::new(y, x),
            WritingMode::VerticalLr => {
                LogicalOffset::new(outer.height - inner_size.height - y, x)
            }
        }
    }

    pub fn to_physical_size(&self, size: LogicalSize) -> PhysicalSize {
        if self.writing_direction.is_horizontal() {
            PhysicalSize::new(size.inline_size, size.block_size)
        } else {
            PhysicalSize::new(size.block_size, size.inline_size)
        }
    }

    pub fn to_logical_size(&self, size: PhysicalSize) -> LogicalSize {
        if self.writing_direction.is_horizontal() {
            LogicalSize::new(size.width, size.height)
        } else {
            LogicalSize::new(size.height, size.width)
        }
    }

    pub fn to_physical_rect(&self, rect: LogicalRect) -> PhysicalRect {
        let size = self.to_physical_size(rect.size);
        PhysicalRect::new(self.to_physical_offset(rect.offset, size), size)
    }

    pub fn to_logical_rect(&self, rect: PhysicalRect) -> LogicalRect {
        LogicalRect::new(
            self.to_logical_offset(rect.offset, rect.size),
            self.to_logical_size(rect.size),
        )
    }

    pub fn to_physical_strut(&self, strut: LogicalBoxStrut) -> PhysicalBoxStrut {
        let LogicalBoxStrut {
            inline_start,
            inline_end,
            block_start,
            block_end,
        } = strut;
        let ltr = self.writing_direction.is_ltr();
        let (inline_before, inline_after) = if ltr {
            (inline_start, inline_end)
        } else {
            (inline_end, inline_start)
        };
        // PhysicalBoxStrut::new takes top, right, bottom, left.
        match self.writing_direction.writing_mode {
            WritingMode::HorizontalTb => {
                PhysicalBoxStrut::new(block_start, inline_after, block_end, inline_before)
            }
            WritingMode::VerticalRl => {
                PhysicalBoxStrut::new(inline_before, block_start, inline_after, block_end)
            }
            WritingMode::VerticalLr => {
                PhysicalBoxStrut::new(inline_before, block_end, inline_after, block_start)
            }
        }
    }

    pub fn to_logical_strut(&self, strut: PhysicalBoxStrut) -> LogicalBoxStrut {
        let (block_start, block_end, inline_before, inline_after) =
            match self.writing_direction.writing_mode {
                WritingMode::HorizontalTb => (strut.top, strut.bottom, strut.left, strut.right),
                WritingMode::VerticalRl => (strut.right, strut.left, strut.top, strut.bottom),
                WritingMode::VerticalLr => (strut.left, strut.right, strut.top, strut.bottom),
            };
        let (inline_start, inline_end) = if self.writing_direction.is_ltr() {
            (inline_before, inline_after)
        } else {
            (inline_after, inline_before)
        };
        LogicalBoxStrut {
            inline_start,
            inline_end,
            block_start,
            block_end,
        }
    }
}
