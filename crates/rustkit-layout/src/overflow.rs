//! Layout and visual overflow of a single box.
//!
//! This module implements:
//! - Lazily allocated scrollable (layout) overflow
//! - Self and contents visual (ink) overflow, kept apart so clipping can drop
//!   the contents part
//! - Per-axis overflow clipping
//! - Propagation of a child's overflow into its container's coordinate space
//!
//! All rects are in the box's own physical space, with the border box at the
//! origin. An unset rect reads back as its base rect, never as empty.

use rustkit_css::WritingMode;
use tracing::trace;

use crate::box_frame::BoxFrame;
use crate::geometry::{PhysicalBoxStrut, PhysicalRect};
use crate::writing_mode::WritingDirection;

/// Axes along which a box clips its overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverflowClipAxes {
    pub x: bool,
    pub y: bool,
}

impl OverflowClipAxes {
    pub const NONE: OverflowClipAxes = OverflowClipAxes { x: false, y: false };
    pub const BOTH: OverflowClipAxes = OverflowClipAxes { x: true, y: true };

    pub fn is_both(self) -> bool {
        self.x && self.y
    }

    pub fn is_none(self) -> bool {
        !self.x && !self.y
    }
}

/// Reset the clipped axes of `result` to `no_overflow_rect`.
pub fn apply_overflow_clip(
    axes: OverflowClipAxes,
    no_overflow_rect: &PhysicalRect,
    result: &mut PhysicalRect,
) {
    if axes.x {
        result.offset.left = no_overflow_rect.offset.left;
        result.size.width = no_overflow_rect.size.width;
    }
    if axes.y {
        result.offset.top = no_overflow_rect.offset.top;
        result.size.height = no_overflow_rect.size.height;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct VisualOverflow {
    self_rect: PhysicalRect,
    contents_rect: PhysicalRect,
}

/// Overflow rects of one box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverflowModel {
    scrollable: Option<PhysicalRect>,
    visual: Option<VisualOverflow>,
}

impl OverflowModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Layout (scrollable) overflow ----

    /// Unite `rect` into the layout overflow. `base` is what an unset rect
    /// means: the border box, or the padding box for a scroll container.
    ///
    /// Returns whether storage changed.
    pub fn add_layout_overflow(&mut self, rect: &PhysicalRect, base: &PhysicalRect) -> bool {
        if rect.is_empty() || base.contains(rect) {
            return false;
        }
        let stored = self.scrollable.get_or_insert(*base);
        let before = *stored;
        stored.unite(rect);
        *stored != before
    }

    /// Replace the layout overflow; a rect equal to `base` clears it.
    pub fn set_layout_overflow(&mut self, rect: PhysicalRect, base: &PhysicalRect) {
        self.scrollable = (rect != *base).then_some(rect);
    }

    pub fn layout_overflow_rect(&self, base: &PhysicalRect) -> PhysicalRect {
        self.scrollable.unwrap_or(*base)
    }

    pub fn has_scrollable_overflow(&self) -> bool {
        self.scrollable.is_some()
    }

    pub fn clear_layout_overflow(&mut self) {
        self.scrollable = None;
    }

    // ---- Visual overflow ----

    fn ensure_visual(&mut self, border_box: &PhysicalRect) -> &mut VisualOverflow {
        self.visual.get_or_insert(VisualOverflow {
            self_rect: *border_box,
            contents_rect: PhysicalRect::default(),
        })
    }

    /// Ink overflow the box paints itself (shadows, outlines).
    pub fn add_self_visual_overflow(&mut self, rect: &PhysicalRect, border_box: &PhysicalRect) {
        if rect.is_empty() || border_box.contains(rect) {
            return;
        }
        self.ensure_visual(border_box).self_rect.unite(rect);
    }

    /// Ink overflow of descendants. Boxes with non-visible overflow record
    /// contained rects too.
    pub fn add_contents_visual_overflow(
        &mut self,
        rect: &PhysicalRect,
        border_box: &PhysicalRect,
        has_non_visible_overflow: bool,
    ) {
        if rect.is_empty() {
            return;
        }
        if !has_non_visible_overflow && border_box.contains(rect) {
            return;
        }
        self.ensure_visual(border_box).contents_rect.unite(rect);
    }

    pub fn self_visual_overflow_rect(&self, border_box: &PhysicalRect) -> PhysicalRect {
        self.visual.map_or(*border_box, |v| v.self_rect)
    }

    /// Empty when unset.
    pub fn contents_visual_overflow_rect(&self) -> PhysicalRect {
        self.visual.map_or(PhysicalRect::default(), |v| v.contents_rect)
    }

    pub fn has_visual_overflow(&self) -> bool {
        self.visual.is_some()
    }

    pub fn has_self_visual_overflow(&self, border_box: &PhysicalRect) -> bool {
        self.visual
            .is_some_and(|v| !border_box.contains(&v.self_rect))
    }

    /// Combined ink overflow.
    ///
    /// `clip_margin_outsets` is set when overflow-clip-margin applies and
    /// holds the border box outsets of the margin clip.
    pub fn visual_overflow_rect(
        &self,
        border_box: &PhysicalRect,
        clip_axes: OverflowClipAxes,
        clip_margin_outsets: Option<PhysicalBoxStrut>,
    ) -> PhysicalRect {
        let Some(visual) = self.visual else {
            return *border_box;
        };

        if let Some(outsets) = clip_margin_outsets {
            if !visual.contents_rect.is_empty() {
                let mut result = *border_box;
                result.expand(&outsets);
                result.intersect(&visual.contents_rect);
                result.unite(&visual.self_rect);
                return result;
            }
        }

        if clip_axes.is_both() {
            return visual.self_rect;
        }

        let mut result = visual.contents_rect;
        result.unite(&visual.self_rect);
        apply_overflow_clip(clip_axes, &visual.self_rect, &mut result);
        result
    }

    pub fn clear_visual_overflow(&mut self) {
        self.visual = None;
    }

    /// Drop descendant ink overflow, keeping the box's own.
    pub fn clear_contents_visual_overflow(&mut self) {
        if let Some(visual) = self.visual.as_mut() {
            visual.contents_rect = PhysicalRect::default();
        }
    }
}

/// Map a rect in `child`'s physical space into its container's
/// flipped-blocks space, where `child.location()` lives.
///
/// The rect first moves into the child's own flipped-blocks space, then is
/// mirrored once more when exactly one of child and container has flipped
/// blocks, and finally moves by the child's location.
pub fn rect_for_overflow_propagation(
    rect: &PhysicalRect,
    child: &BoxFrame,
    container_writing_direction: WritingDirection,
) -> PhysicalRect {
    let mut result = *rect;
    let child_flipped = child.writing_direction().is_flipped_blocks();
    if child_flipped {
        result.offset.left = child.width() - result.right();
    }
    if child_flipped != container_writing_direction.is_flipped_blocks() {
        result.offset.left = child.width() - result.right();
    }
    result.move_by(child.location());
    result
}

/// Convert a rect from `container`'s flipped-blocks space to its physical space.
pub fn flipped_to_physical(rect: &PhysicalRect, container: &BoxFrame) -> PhysicalRect {
    let mut result = *rect;
    result.offset.left = container.flip_for_writing_mode(rect.x(), rect.width());
    result
}

/// The child's visual overflow as its container sees it, in the
/// container's flipped-blocks space.
pub fn visual_overflow_rect_for_propagation(
    visual_overflow: &PhysicalRect,
    child: &BoxFrame,
    container_writing_direction: WritingDirection,
) -> PhysicalRect {
    rect_for_overflow_propagation(visual_overflow, child, container_writing_direction)
}

/// The child's layout overflow as its container sees it, in the container's
/// flipped-blocks space.
///
/// Includes the child's block-end margin in the container's writing mode.
/// Layout overflow is dropped on the axes the child clips.
pub fn layout_overflow_rect_for_propagation(
    layout_overflow: &PhysicalRect,
    child: &BoxFrame,
    clip_axes: OverflowClipAxes,
    container_writing_direction: WritingDirection,
) -> PhysicalRect {
    let border_box = child.physical_border_box_rect();
    let mut rect = border_box;
    let margin = child.margin_block_end(container_writing_direction);
    match container_writing_direction.writing_mode {
        WritingMode::HorizontalTb => rect.size.height += margin,
        WritingMode::VerticalRl => {
            rect.offset.left -= margin;
            rect.size.width += margin;
        }
        WritingMode::VerticalLr => rect.size.width += margin,
    }

    if !clip_axes.is_both() {
        let mut overflow = *layout_overflow;
        apply_overflow_clip(clip_axes, &border_box, &mut overflow);
        rect.unite(&overflow);
    }

    let result = rect_for_overflow_propagation(&rect, child, container_writing_direction);
    trace!(?result, "layout overflow for propagation");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{PhysicalOffset, PhysicalSize};
    use crate::units::LayoutUnit;
    use rustkit_css::{Direction, WritingMode};

    fn border_box() -> PhysicalRect {
        PhysicalRect::from_ints(0, 0, 100, 100)
    }

    fn frame(mode: WritingMode, location: (i32, i32), size: (i32, i32)) -> BoxFrame {
        let mut frame = BoxFrame::new(WritingDirection::new(mode, Direction::Ltr));
        frame.set_location(PhysicalOffset::from_ints(location.0, location.1));
        frame.set_size(PhysicalSize::from_ints(size.0, size.1));
        frame
    }

    #[test]
    fn test_unset_layout_overflow_is_border_box() {
        let model = OverflowModel::new();
        assert_eq!(model.layout_overflow_rect(&border_box()), border_box());
        assert!(!model.has_scrollable_overflow());
    }

    #[test]
    fn test_contained_overflow_does_not_allocate() {
        let mut model = OverflowModel::new();
        assert!(!model.add_layout_overflow(&PhysicalRect::from_ints(10, 10, 50, 50), &border_box()));
        assert!(!model.add_layout_overflow(&PhysicalRect::from_ints(0, 0, 0, 500), &border_box()));
        assert!(!model.has_scrollable_overflow());
    }

    #[test]
    fn test_layout_overflow_is_monotonic() {
        let mut model = OverflowModel::new();
        let first = PhysicalRect::from_ints(50, 50, 100, 20);
        let second = PhysicalRect::from_ints(-10, 20, 5, 5);
        model.add_layout_overflow(&first, &border_box());
        let previous = model.layout_overflow_rect(&border_box());
        model.add_layout_overflow(&second, &border_box());
        let result = model.layout_overflow_rect(&border_box());
        for rect in [first, second, previous, border_box()] {
            assert!(result.contains(&rect), "{rect:?} not in {result:?}");
        }
        assert_eq!(result, PhysicalRect::from_ints(-10, 0, 160, 100));
    }

    #[test]
    fn test_set_layout_overflow_equal_to_base_clears() {
        let mut model = OverflowModel::new();
        model.set_layout_overflow(PhysicalRect::from_ints(0, 0, 300, 100), &border_box());
        assert!(model.has_scrollable_overflow());
        model.set_layout_overflow(border_box(), &border_box());
        assert!(!model.has_scrollable_overflow());
    }

    #[test]
    fn test_visual_overflow_clip_axes() {
        let mut model = OverflowModel::new();
        model.add_self_visual_overflow(&PhysicalRect::from_ints(-5, -5, 110, 110), &border_box());
        model.add_contents_visual_overflow(
            &PhysicalRect::from_ints(0, 0, 400, 300),
            &border_box(),
            true,
        );

        assert_eq!(
            model.visual_overflow_rect(&border_box(), OverflowClipAxes::NONE, None),
            PhysicalRect::from_ints(-5, -5, 405, 305)
        );
        assert_eq!(
            model.visual_overflow_rect(&border_box(), OverflowClipAxes::BOTH, None),
            PhysicalRect::from_ints(-5, -5, 110, 110)
        );
        let x_only = OverflowClipAxes { x: true, y: false };
        assert_eq!(
            model.visual_overflow_rect(&border_box(), x_only, None),
            PhysicalRect::from_ints(-5, -5, 110, 305)
        );
    }

    #[test]
    fn test_visual_overflow_clip_margin() {
        let mut model = OverflowModel::new();
        model.add_contents_visual_overflow(
            &PhysicalRect::from_ints(0, 0, 400, 300),
            &border_box(),
            true,
        );
        let outsets = PhysicalBoxStrut::from_ints(10, 10, 10, 10);
        assert_eq!(
            model.visual_overflow_rect(&border_box(), OverflowClipAxes::BOTH, Some(outsets)),
            PhysicalRect::from_ints(0, 0, 110, 110)
        );
    }

    #[test]
    fn test_contained_contents_overflow_kept_only_when_clipping() {
        let inner = PhysicalRect::from_ints(10, 10, 10, 10);
        let mut visible = OverflowModel::new();
        visible.add_contents_visual_overflow(&inner, &border_box(), false);
        assert!(!visible.has_visual_overflow());

        let mut clipping = OverflowModel::new();
        clipping.add_contents_visual_overflow(&inner, &border_box(), true);
        assert_eq!(clipping.contents_visual_overflow_rect(), inner);
        assert!(!clipping.has_self_visual_overflow(&border_box()));
    }

    #[test]
    fn test_propagation_matches_physical_location_in_every_pairing() {
        let modes = [
            WritingMode::HorizontalTb,
            WritingMode::VerticalRl,
            WritingMode::VerticalLr,
        ];
        let overflow = PhysicalRect::from_ints(-7, 3, 150, 40);
        for container_mode in modes {
            for child_mode in modes {
                let container = frame(container_mode, (0, 0), (600, 200));
                let child = frame(child_mode, (100, 20), (200, 50));
                let flipped = visual_overflow_rect_for_propagation(
                    &overflow,
                    &child,
                    container.writing_direction(),
                );
                let physical = flipped_to_physical(&flipped, &container);
                assert_eq!(
                    physical,
                    overflow.translated(child.physical_location(Some(&container))),
                    "container {container_mode:?}, child {child_mode:?}"
                );
            }
        }
    }

    #[test]
    fn test_orthogonal_flip_only_on_flipped_mismatch() {
        let overflow = PhysicalRect::from_ints(0, 0, 30, 10);
        let child = frame(WritingMode::HorizontalTb, (0, 0), (100, 10));

        let vertical_lr = WritingDirection::new(WritingMode::VerticalLr, Direction::Ltr);
        assert_eq!(
            visual_overflow_rect_for_propagation(&overflow, &child, vertical_lr).x(),
            LayoutUnit::ZERO
        );

        let vertical_rl = WritingDirection::new(WritingMode::VerticalRl, Direction::Ltr);
        assert_eq!(
            visual_overflow_rect_for_propagation(&overflow, &child, vertical_rl).x(),
            LayoutUnit::from_int(70)
        );
    }

    #[test]
    fn test_layout_overflow_propagation_includes_block_end_margin() {
        let mut child = frame(WritingMode::HorizontalTb, (10, 10), (50, 50));
        child.margin.bottom = LayoutUnit::from_int(8);
        let horizontal = WritingDirection::default();
        let rect = layout_overflow_rect_for_propagation(
            &child.physical_border_box_rect(),
            &child,
            OverflowClipAxes::NONE,
            horizontal,
        );
        assert_eq!(rect, PhysicalRect::from_ints(10, 10, 50, 58));
    }

    #[test]
    fn test_layout_overflow_propagation_drops_clipped_axis() {
        let child = frame(WritingMode::HorizontalTb, (0, 0), (50, 50));
        let overflow = PhysicalRect::from_ints(0, 0, 500, 500);
        let rect = layout_overflow_rect_for_propagation(
            &overflow,
            &child,
            OverflowClipAxes { x: false, y: true },
            WritingDirection::default(),
        );
        assert_eq!(rect, PhysicalRect::from_ints(0, 0, 500, 50));
    }
}
