//! Box geometry shared by every box kind.
//!
//! [`BoxGeometry`] is the capability every box exposes: border, padding,
//! client and content rects, scrollbar space, and overflow clipping. The
//! default methods hold all shared logic; implementors only supply storage.
//! Per-kind differences go through [`NodeKind`] rather than overrides.

use rustkit_css::{ComputedStyle, Overflow, Resize, VisualBox};

use crate::box_frame::BoxFrame;
use crate::config::LayoutConfig;
use crate::geometry::{
    IntPoint, IntSize, IntVector, PhysicalBoxStrut, PhysicalOffset, PhysicalRect, PhysicalSize,
};
use crate::overflow::{OverflowClipAxes, OverflowModel};
use crate::scroll::{OverlayScrollbarClipBehavior, ScrollableArea, ScrollbarOrientation};
use crate::units::{snap_size_to_pixel, LayoutUnit};

/// The closed set of box kinds with geometry of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    #[default]
    Block,
    Flex,
    Grid,
    /// Ignores the overflow properties.
    Table,
    /// Replaced content (images, video). Clips but never scrolls.
    Replaced,
}

impl NodeKind {
    pub fn respects_css_overflow(self) -> bool {
        self != NodeKind::Table
    }

    pub fn is_replaced(self) -> bool {
        self == NodeKind::Replaced
    }

    pub fn can_be_scroll_container(self) -> bool {
        !matches!(self, NodeKind::Table | NodeKind::Replaced)
    }
}

/// Whether a left-side vertical scrollbar may be wider than the content box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollbarClamp {
    DontClamp,
    ClampToContentBox,
}

/// Whether `scrollbar-gutter` space counts as scrollbar space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollbarGutterInclusion {
    Exclude,
    Include,
}

/// Make the unclipped axes of `clip_rect` infinite.
pub fn apply_visible_overflow_to_clip_rect(axes: OverflowClipAxes, clip_rect: &mut PhysicalRect) {
    let infinite = PhysicalRect::infinite();
    if !axes.x {
        clip_rect.offset.left = infinite.offset.left;
        clip_rect.size.width = infinite.size.width;
    }
    if !axes.y {
        clip_rect.offset.top = infinite.offset.top;
        clip_rect.size.height = infinite.size.height;
    }
}

/// Geometry queries answered by every box.
pub trait BoxGeometry {
    fn frame(&self) -> &BoxFrame;
    fn style(&self) -> &ComputedStyle;
    fn kind(&self) -> NodeKind;
    fn overflow(&self) -> &OverflowModel;
    fn scrollable_area(&self) -> Option<&ScrollableArea>;
    fn config(&self) -> &LayoutConfig;

    fn size(&self) -> PhysicalSize {
        self.frame().size()
    }

    fn border(&self) -> PhysicalBoxStrut {
        self.frame().border
    }

    fn padding(&self) -> PhysicalBoxStrut {
        self.frame().padding
    }

    fn is_horizontal_writing_mode(&self) -> bool {
        self.frame().writing_direction().is_horizontal()
    }

    fn has_non_visible_overflow(&self) -> bool {
        self.kind().respects_css_overflow() && self.style().has_non_visible_overflow()
    }

    fn is_scroll_container(&self) -> bool {
        self.kind().can_be_scroll_container() && self.style().is_scroll_container()
    }

    /// In horizontal rtl the vertical scrollbar sits at the physical left.
    fn should_place_vertical_scrollbar_on_left(&self) -> bool {
        let wd = self.frame().writing_direction();
        wd.is_horizontal() && !wd.is_ltr()
    }

    fn uses_overlay_scrollbars(&self) -> bool {
        self.style().custom_scrollbar.is_none()
            && self.config().scrollbar_theme.uses_overlay_scrollbars
    }

    fn has_auto_horizontal_scrollbar(&self) -> bool {
        self.has_non_visible_overflow()
            && matches!(self.style().overflow_x, Overflow::Auto | Overflow::Overlay)
    }

    fn has_auto_vertical_scrollbar(&self) -> bool {
        self.has_non_visible_overflow()
            && matches!(self.style().overflow_y, Overflow::Auto | Overflow::Overlay)
    }

    /// Whether `scrollbar-gutter` reserves space for `orientation`.
    fn has_scrollbar_gutters(&self, orientation: ScrollbarOrientation) -> bool {
        let style = self.style();
        if !style.scrollbar_gutter.is_stable() {
            return false;
        }
        let reserves = |overflow: Overflow| {
            matches!(overflow, Overflow::Auto | Overflow::Scroll | Overflow::Hidden)
        };
        match orientation {
            ScrollbarOrientation::Vertical => {
                style.is_horizontal_writing_mode()
                    && reserves(style.overflow_y)
                    && !self.uses_overlay_scrollbars()
            }
            ScrollbarOrientation::Horizontal => {
                !style.is_horizontal_writing_mode()
                    && reserves(style.overflow_x)
                    && !self.uses_overlay_scrollbars()
            }
        }
    }

    /// Thickness a scrollbar on `orientation` has or would have.
    fn hypothetical_scrollbar_thickness(
        &self,
        orientation: ScrollbarOrientation,
        include_overlay_thickness: bool,
    ) -> i32 {
        if let Some(scrollbar) = self
            .scrollable_area()
            .and_then(|area| area.scrollbar(orientation))
        {
            return scrollbar.thickness();
        }
        if let Some(custom) = self.style().custom_scrollbar {
            let px = match orientation {
                ScrollbarOrientation::Horizontal => custom.height,
                ScrollbarOrientation::Vertical => custom.width,
            };
            return px.round() as i32;
        }
        let theme = &self.config().scrollbar_theme;
        if theme.uses_overlay_scrollbars && !include_overlay_thickness {
            return 0;
        }
        theme.thickness_for(self.style().scrollbar_width)
    }

    fn vertical_scrollbar_width(&self, behavior: OverlayScrollbarClipBehavior) -> i32 {
        let Some(scrollbar) = self.scrollable_area().and_then(|a| a.vertical_scrollbar()) else {
            return 0;
        };
        let ignore = behavior == OverlayScrollbarClipBehavior::IgnoreOverlayScrollbarSize;
        if ignore && self.style().overflow_y == Overflow::Overlay {
            return 0;
        }
        if (ignore || !scrollbar.hit_testable()) && scrollbar.is_overlay() {
            return 0;
        }
        scrollbar.thickness()
    }

    fn horizontal_scrollbar_height(&self, behavior: OverlayScrollbarClipBehavior) -> i32 {
        let Some(scrollbar) = self.scrollable_area().and_then(|a| a.horizontal_scrollbar()) else {
            return 0;
        };
        let ignore = behavior == OverlayScrollbarClipBehavior::IgnoreOverlayScrollbarSize;
        if ignore && self.style().overflow_x == Overflow::Overlay {
            return 0;
        }
        if (ignore || !scrollbar.hit_testable()) && scrollbar.is_overlay() {
            return 0;
        }
        scrollbar.thickness()
    }

    /// Space taken by scrollbars (and optionally gutters) on each side.
    fn compute_scrollbars_internal(
        &self,
        clamp: ScrollbarClamp,
        behavior: OverlayScrollbarClipBehavior,
        gutter: ScrollbarGutterInclusion,
    ) -> PhysicalBoxStrut {
        let mut scrollbars = PhysicalBoxStrut::default();
        let area = self.scrollable_area();
        let both_edges = self.style().scrollbar_gutter.is_both_edges();
        let include_gutter = gutter == ScrollbarGutterInclusion::Include;

        if include_gutter && self.has_scrollbar_gutters(ScrollbarOrientation::Vertical) {
            let gutter_size = LayoutUnit::from_int(
                self.hypothetical_scrollbar_thickness(ScrollbarOrientation::Vertical, true),
            );
            if self.should_place_vertical_scrollbar_on_left() {
                scrollbars.left = gutter_size;
                if both_edges {
                    scrollbars.right = gutter_size;
                }
            } else {
                scrollbars.right = gutter_size;
                if both_edges {
                    scrollbars.left = gutter_size;
                }
            }
        } else if area.is_some() {
            let width = LayoutUnit::from_int(self.vertical_scrollbar_width(behavior));
            if self.should_place_vertical_scrollbar_on_left() {
                scrollbars.left = width;
            } else {
                scrollbars.right = width;
            }
        }

        if include_gutter && self.has_scrollbar_gutters(ScrollbarOrientation::Horizontal) {
            let gutter_size = LayoutUnit::from_int(
                self.hypothetical_scrollbar_thickness(ScrollbarOrientation::Horizontal, true),
            );
            scrollbars.bottom = gutter_size;
            if both_edges {
                scrollbars.top = gutter_size;
            }
        } else if area.is_some() {
            scrollbars.bottom = LayoutUnit::from_int(self.horizontal_scrollbar_height(behavior));
        }

        // A left scrollbar never pushes the content box past the right edge.
        if scrollbars.left > LayoutUnit::ZERO && clamp == ScrollbarClamp::ClampToContentBox {
            let max_width = self.size().width - self.frame().border_and_padding_width();
            scrollbars.left = scrollbars.left.min(max_width.clamp_negative_to_zero());
        }

        scrollbars
    }

    fn compute_scrollbars(&self) -> PhysicalBoxStrut {
        self.compute_scrollbars_internal(
            ScrollbarClamp::DontClamp,
            OverlayScrollbarClipBehavior::IgnoreOverlayScrollbarSize,
            ScrollbarGutterInclusion::Include,
        )
    }

    fn clamped_scrollbars(&self) -> PhysicalBoxStrut {
        self.compute_scrollbars_internal(
            ScrollbarClamp::ClampToContentBox,
            OverlayScrollbarClipBehavior::IgnoreOverlayScrollbarSize,
            ScrollbarGutterInclusion::Include,
        )
    }

    fn client_left(&self) -> LayoutUnit {
        self.border().left + self.clamped_scrollbars().left
    }

    fn client_top(&self) -> LayoutUnit {
        self.border().top + self.clamped_scrollbars().top
    }

    fn client_width(&self) -> LayoutUnit {
        (self.size().width - self.border().horizontal_sum()
            - self.clamped_scrollbars().horizontal_sum())
        .clamp_negative_to_zero()
    }

    fn client_height(&self) -> LayoutUnit {
        (self.size().height - self.border().vertical_sum()
            - self.clamped_scrollbars().vertical_sum())
        .clamp_negative_to_zero()
    }

    fn physical_border_box_rect(&self) -> PhysicalRect {
        self.frame().physical_border_box_rect()
    }

    fn physical_padding_box_rect(&self) -> PhysicalRect {
        PhysicalRect::new(
            PhysicalOffset::new(self.client_left(), self.client_top()),
            PhysicalSize::new(self.client_width(), self.client_height()),
        )
    }

    /// The rect overflow is measured against: the padding box less scrollbars.
    fn no_overflow_rect(&self) -> PhysicalRect {
        self.physical_padding_box_rect()
    }

    fn content_left(&self) -> LayoutUnit {
        self.client_left() + self.padding().left
    }

    fn content_top(&self) -> LayoutUnit {
        self.client_top() + self.padding().top
    }

    fn content_width(&self) -> LayoutUnit {
        (self.client_width() - self.padding().horizontal_sum()).clamp_negative_to_zero()
    }

    fn content_height(&self) -> LayoutUnit {
        (self.client_height() - self.padding().vertical_sum()).clamp_negative_to_zero()
    }

    fn physical_content_box_rect(&self) -> PhysicalRect {
        PhysicalRect::new(
            PhysicalOffset::new(self.content_left(), self.content_top()),
            PhysicalSize::new(self.content_width(), self.content_height()),
        )
    }

    /// How far content shifts to make room for left or top scrollbars.
    fn origin_adjustment_for_scrollbars(&self) -> IntVector {
        let scrollbars = self.clamped_scrollbars();
        IntVector::new(scrollbars.left.to_int(), scrollbars.top.to_int())
    }

    fn scroll_origin(&self) -> IntPoint {
        self.scrollable_area()
            .map_or(IntPoint::default(), |area| area.scroll_origin())
    }

    fn scrolled_content_offset(&self) -> PhysicalOffset {
        self.scrollable_area().map_or(PhysicalOffset::default(), |area| {
            let offset = area.scroll_offset();
            PhysicalOffset::new(
                LayoutUnit::from_f32_floor(offset.x),
                LayoutUnit::from_f32_floor(offset.y),
            )
        })
    }

    fn pixel_snapped_scrolled_content_offset(&self) -> IntVector {
        self.scrollable_area()
            .map_or(IntVector::default(), |area| area.scroll_offset_int())
    }

    fn pixel_snapped_border_box_size(&self) -> IntSize {
        let size = self.size();
        IntSize::new(
            snap_size_to_pixel(size.width, LayoutUnit::ZERO),
            snap_size_to_pixel(size.height, LayoutUnit::ZERO),
        )
    }

    fn overflow_clip_axes(&self) -> OverflowClipAxes {
        if !self.has_non_visible_overflow() {
            return OverflowClipAxes::NONE;
        }
        if self.is_scroll_container() {
            return OverflowClipAxes::BOTH;
        }
        OverflowClipAxes {
            x: self.style().overflow_x != Overflow::Visible,
            y: self.style().overflow_y != Overflow::Visible,
        }
    }

    fn should_clip_overflow_along_either_axis(&self) -> bool {
        !self.overflow_clip_axes().is_none()
    }

    fn should_apply_overflow_clip_margin(&self) -> bool {
        if self.is_scroll_container() {
            return false;
        }
        let style = self.style();
        if !style.overflow_clip_margin.is_some_and(|m| m.has_effect()) {
            return false;
        }
        if self.kind().is_replaced() {
            style.overflow_x != Overflow::Visible && style.overflow_y != Overflow::Visible
        } else {
            style.overflow_x == Overflow::Clip && style.overflow_y == Overflow::Clip
        }
    }

    /// Outsets from the border box to the overflow clip edge.
    fn border_outsets_for_clipping(&self) -> PhysicalBoxStrut {
        let padding_box = -self.border();
        let Some(margin) = self
            .style()
            .overflow_clip_margin
            .filter(|_| self.should_apply_overflow_clip_margin())
        else {
            return padding_box;
        };
        let reference = match margin.reference_box {
            VisualBox::BorderBox => PhysicalBoxStrut::default(),
            VisualBox::PaddingBox => padding_box,
            VisualBox::ContentBox => padding_box - self.padding(),
        };
        reference.inflate(LayoutUnit::from_f32(margin.margin))
    }

    /// Shrink `rect` by the scrollbars.
    fn exclude_scrollbars(
        &self,
        rect: &mut PhysicalRect,
        behavior: OverlayScrollbarClipBehavior,
        gutter: ScrollbarGutterInclusion,
    ) {
        let scrollbars =
            self.compute_scrollbars_internal(ScrollbarClamp::DontClamp, behavior, gutter);
        rect.offset.top += scrollbars.top;
        rect.offset.left += scrollbars.left;
        rect.size.width -= scrollbars.horizontal_sum();
        rect.size.height -= scrollbars.vertical_sum();
        rect.size = rect.size.clamp_negative_to_zero();
    }

    /// Clip rect for overflow, with the border box placed at `location`.
    fn overflow_clip_rect(
        &self,
        location: PhysicalOffset,
        behavior: OverlayScrollbarClipBehavior,
    ) -> PhysicalRect {
        let mut clip_rect = self.physical_border_box_rect();
        clip_rect.contract(&self.border());
        clip_rect.move_by(location);

        if self.has_non_visible_overflow() {
            let axes = self.overflow_clip_axes();
            if !axes.is_both() {
                apply_visible_overflow_to_clip_rect(axes, &mut clip_rect);
            } else if self.should_apply_overflow_clip_margin() {
                if let Some(margin) = self.style().overflow_clip_margin {
                    match margin.reference_box {
                        VisualBox::BorderBox => clip_rect.expand(&self.border()),
                        VisualBox::PaddingBox => {}
                        VisualBox::ContentBox => clip_rect.contract(&self.padding()),
                    }
                    clip_rect.inflate(LayoutUnit::from_f32(margin.margin));
                }
            }
        }

        if self.is_scroll_container() {
            // Gutters don't occlude content.
            self.exclude_scrollbars(&mut clip_rect, behavior, ScrollbarGutterInclusion::Exclude);
        }
        clip_rect
    }

    /// What an unset layout overflow rect reads back as.
    fn layout_overflow_base(&self) -> PhysicalRect {
        if self.is_scroll_container() {
            self.no_overflow_rect()
        } else {
            self.physical_border_box_rect()
        }
    }

    fn scrollable_overflow_rect(&self) -> PhysicalRect {
        self.overflow()
            .layout_overflow_rect(&self.layout_overflow_base())
    }

    fn self_visual_overflow_rect(&self) -> PhysicalRect {
        self.overflow()
            .self_visual_overflow_rect(&self.physical_border_box_rect())
    }

    fn contents_visual_overflow_rect(&self) -> PhysicalRect {
        self.overflow().contents_visual_overflow_rect()
    }

    fn visual_overflow_rect(&self) -> PhysicalRect {
        let outsets = self
            .should_apply_overflow_clip_margin()
            .then(|| self.border_outsets_for_clipping());
        self.overflow().visual_overflow_rect(
            &self.physical_border_box_rect(),
            self.overflow_clip_axes(),
            outsets,
        )
    }

    fn scroll_width(&self) -> LayoutUnit {
        if self.is_scroll_container() {
            if let Some(area) = self.scrollable_area() {
                return area.scroll_width();
            }
        }
        let overflow = self.scrollable_overflow_rect();
        let border_left = self.border().left;
        if !self.frame().writing_direction().is_flipped_x() {
            return self.client_width().max(overflow.right() - border_left);
        }
        self.client_width() - LayoutUnit::ZERO.min(overflow.x() - border_left)
    }

    fn scroll_height(&self) -> LayoutUnit {
        if self.is_scroll_container() {
            if let Some(area) = self.scrollable_area() {
                return area.scroll_height();
            }
        }
        let overflow = self.scrollable_overflow_rect();
        self.client_height()
            .max(overflow.bottom() - self.border().top)
    }

    fn can_resize(&self) -> bool {
        self.is_scroll_container() && self.style().resize != Resize::None
    }

    /// Content can overflow above the border box.
    fn has_top_overflow(&self) -> bool {
        let wd = self.frame().writing_direction();
        !wd.is_ltr() && !wd.is_horizontal()
    }

    /// Content can overflow left of the border box.
    fn has_left_overflow(&self) -> bool {
        let wd = self.frame().writing_direction();
        if wd.is_horizontal() {
            !wd.is_ltr()
        } else {
            wd.is_flipped_blocks()
        }
    }
}
