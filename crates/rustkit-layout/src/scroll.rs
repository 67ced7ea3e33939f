//! Scroll containers: offsets, scroll origin and scrollbars.
//!
//! This module implements:
//! - Scroll offset and scroll origin bookkeeping
//! - Minimum/maximum scroll offsets from the scrollable overflow rect
//! - Scrollbar existence, including `auto` fixed-point handling
//! - Scrollbar, scroll corner and resizer rects
//! - Clamping after overflow changes, optionally delayed via [`LayoutContext`]
//!
//! `scroll_position = scroll_origin + scroll_offset`. The origin is non-zero
//! on axes where content overflows toward negative physical coordinates
//! (rtl, `vertical-rl`), so offsets there are negative.

use std::ops::Add;

use rustkit_css::{Overflow, ScrollbarWidth};
use tracing::{debug, trace};

use crate::box_model::BoxGeometry;
use crate::context::LayoutContext;
use crate::geometry::{
    IntPoint, IntRect, IntSize, IntVector, PhysicalBoxStrut, PhysicalOffset, PhysicalRect, PhysicalSize,
};
use crate::tree::BoxId;
use crate::units::{snap_size_to_pixel, LayoutUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollbarOrientation {
    Horizontal,
    Vertical,
}

/// How overlay scrollbars count toward scrollbar space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayScrollbarClipBehavior {
    /// Overlay scrollbars take no space.
    IgnoreOverlayScrollbarSize,
    /// Hit-testable overlay scrollbars take their thickness.
    ExcludeOverlayScrollbarSizeForHitTesting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollbarInclusion {
    Include,
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeScrollbarExistenceOption {
    /// Decide `auto` scrollbars from the current overflow.
    Dependent,
    /// Only decide what style alone determines.
    OverflowIndependent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollbarMode {
    Auto,
    AlwaysOff,
    AlwaysOn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizerHitTestType {
    Pointer,
    /// Enlarged up and to the left by the configured ratio.
    Touch,
}

/// What a point over the overflow controls hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowControlHit {
    Resizer,
    VerticalScrollbar,
    HorizontalScrollbar,
    ScrollCorner,
}

/// A fractional scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub x: f32,
    pub y: f32,
}

impl ScrollOffset {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_floored_vector(self) -> IntVector {
        IntVector::new(self.x.floor() as i32, self.y.floor() as i32)
    }

    pub fn set_to_min(&mut self, other: ScrollOffset) {
        self.x = self.x.min(other.x);
        self.y = self.y.min(other.y);
    }

    pub fn set_to_max(&mut self, other: ScrollOffset) {
        self.x = self.x.max(other.x);
        self.y = self.y.max(other.y);
    }
}

impl Add for ScrollOffset {
    type Output = ScrollOffset;
    fn add(self, rhs: ScrollOffset) -> ScrollOffset {
        ScrollOffset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl From<IntVector> for ScrollOffset {
    fn from(v: IntVector) -> Self {
        ScrollOffset::new(v.x as f32, v.y as f32)
    }
}

/// A scrollbar of a scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scrollbar {
    orientation: ScrollbarOrientation,
    thickness: i32,
    is_overlay: bool,
    hit_testable: bool,
    is_custom: bool,
    enabled: bool,
    visible_size: i32,
    total_size: i32,
    frame_rect: IntRect,
}

impl Scrollbar {
    pub fn new(
        orientation: ScrollbarOrientation,
        thickness: i32,
        is_overlay: bool,
        hit_testable: bool,
        is_custom: bool,
    ) -> Self {
        Self {
            orientation,
            thickness,
            is_overlay,
            hit_testable,
            is_custom,
            enabled: true,
            visible_size: 0,
            total_size: 0,
            frame_rect: IntRect::default(),
        }
    }

    pub fn orientation(&self) -> ScrollbarOrientation {
        self.orientation
    }

    pub fn thickness(&self) -> i32 {
        self.thickness
    }

    pub fn is_overlay(&self) -> bool {
        self.is_overlay
    }

    /// Participates in hit testing.
    pub fn hit_testable(&self) -> bool {
        self.hit_testable
    }

    pub fn is_custom(&self) -> bool {
        self.is_custom
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Visible and total length along the scrollbar's axis.
    pub fn proportion(&self) -> (i32, i32) {
        (self.visible_size, self.total_size)
    }

    pub fn set_proportion(&mut self, visible_size: i32, total_size: i32) {
        self.visible_size = visible_size;
        self.total_size = total_size;
    }

    /// Rect in the owning box's border box space.
    pub fn frame_rect(&self) -> IntRect {
        self.frame_rect
    }

    pub fn set_frame_rect(&mut self, rect: IntRect) {
        self.frame_rect = rect;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollableAreaFlags {
    pub scroll_origin_changed: bool,
    pub needs_scroll_offset_clamp: bool,
    pub had_resizer_before_relayout: bool,
}

/// Scroll state of one scroll container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollableArea {
    scroll_offset: ScrollOffset,
    scroll_origin: IntPoint,
    /// Scrollable overflow grown to at least the client size.
    overflow_rect: PhysicalRect,
    horizontal_scrollbar: Option<Scrollbar>,
    vertical_scrollbar: Option<Scrollbar>,
    flags: ScrollableAreaFlags,
    hypothetical_horizontal_scrollbar_thickness: i32,
    hypothetical_vertical_scrollbar_thickness: i32,
}

impl ScrollableArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_offset(&self) -> ScrollOffset {
        self.scroll_offset
    }

    pub fn scroll_offset_int(&self) -> IntVector {
        self.scroll_offset.to_floored_vector()
    }

    pub fn scroll_origin(&self) -> IntPoint {
        self.scroll_origin
    }

    pub fn scroll_position(&self) -> ScrollOffset {
        ScrollOffset::from(self.scroll_origin.offset_from_origin()) + self.scroll_offset
    }

    pub fn overflow_rect(&self) -> PhysicalRect {
        self.overflow_rect
    }

    pub fn scroll_width(&self) -> LayoutUnit {
        self.overflow_rect.width()
    }

    pub fn scroll_height(&self) -> LayoutUnit {
        self.overflow_rect.height()
    }

    pub fn minimum_scroll_offset_int(&self) -> IntVector {
        -self.scroll_origin.offset_from_origin()
    }

    pub fn flags(&self) -> ScrollableAreaFlags {
        self.flags
    }

    pub fn scroll_origin_changed(&self) -> bool {
        self.flags.scroll_origin_changed
    }

    pub fn needs_scroll_offset_clamp(&self) -> bool {
        self.flags.needs_scroll_offset_clamp
    }

    pub fn scrollbar(&self, orientation: ScrollbarOrientation) -> Option<&Scrollbar> {
        match orientation {
            ScrollbarOrientation::Horizontal => self.horizontal_scrollbar.as_ref(),
            ScrollbarOrientation::Vertical => self.vertical_scrollbar.as_ref(),
        }
    }

    fn scrollbar_mut(&mut self, orientation: ScrollbarOrientation) -> Option<&mut Scrollbar> {
        match orientation {
            ScrollbarOrientation::Horizontal => self.horizontal_scrollbar.as_mut(),
            ScrollbarOrientation::Vertical => self.vertical_scrollbar.as_mut(),
        }
    }

    /// Replace a scrollbar without touching the scroll origin.
    pub fn set_scrollbar(&mut self, orientation: ScrollbarOrientation, scrollbar: Option<Scrollbar>) {
        match orientation {
            ScrollbarOrientation::Horizontal => self.horizontal_scrollbar = scrollbar,
            ScrollbarOrientation::Vertical => self.vertical_scrollbar = scrollbar,
        }
    }

    pub fn horizontal_scrollbar(&self) -> Option<&Scrollbar> {
        self.horizontal_scrollbar.as_ref()
    }

    pub fn vertical_scrollbar(&self) -> Option<&Scrollbar> {
        self.vertical_scrollbar.as_ref()
    }

    pub fn has_horizontal_scrollbar(&self) -> bool {
        self.horizontal_scrollbar.is_some()
    }

    pub fn has_vertical_scrollbar(&self) -> bool {
        self.vertical_scrollbar.is_some()
    }

    pub fn has_scrollbar(&self) -> bool {
        self.has_horizontal_scrollbar() || self.has_vertical_scrollbar()
    }

    pub fn has_overlay_scrollbars(&self) -> bool {
        self.horizontal_scrollbar.is_some_and(|s| s.is_overlay())
            || self.vertical_scrollbar.is_some_and(|s| s.is_overlay())
    }

    /// Thickness cached by the last layout, zero unless a gutter needs it.
    pub fn cached_hypothetical_scrollbar_thickness(&self, orientation: ScrollbarOrientation) -> i32 {
        match orientation {
            ScrollbarOrientation::Horizontal => self.hypothetical_horizontal_scrollbar_thickness,
            ScrollbarOrientation::Vertical => self.hypothetical_vertical_scrollbar_thickness,
        }
    }
}

/// Scroll behavior of a box that owns a [`ScrollableArea`].
///
/// Methods are no-ops (or return zero geometry) for boxes without one.
pub trait Scrollable: BoxGeometry {
    fn id(&self) -> BoxId;
    fn scrollable_area_mut(&mut self) -> Option<&mut ScrollableArea>;

    // ---- Content rects ----

    /// The client rect at the current scroll position.
    fn layout_content_rect(&self, inclusion: ScrollbarInclusion) -> PhysicalRect {
        let scrollbars = match inclusion {
            ScrollbarInclusion::Include => PhysicalBoxStrut::default(),
            ScrollbarInclusion::Exclude => self.compute_scrollbars(),
        };
        let size = PhysicalSize::new(
            self.size().width - self.frame().border_width() - scrollbars.horizontal_sum(),
            self.size().height - self.frame().border_height() - scrollbars.vertical_sum(),
        )
        .clamp_negative_to_zero();
        let position = self
            .scrollable_area()
            .map_or(ScrollOffset::default(), |area| area.scroll_position());
        let offset = PhysicalOffset::new(
            LayoutUnit::from_f32_round(position.x),
            LayoutUnit::from_f32_round(position.y),
        );
        PhysicalRect::new(offset, size)
    }

    fn visible_content_rect(&self, inclusion: ScrollbarInclusion) -> IntRect {
        let rect = self.layout_content_rect(inclusion);
        let point = rect.offset.to_floored_point();
        let size = rect.size.to_rounded_size();
        IntRect::new(point.x, point.y, size.width, size.height)
    }

    fn contents_size(&self) -> IntSize {
        let Some(area) = self.scrollable_area() else {
            return IntSize::default();
        };
        let size = area.overflow_rect().size;
        IntSize::new(
            snap_size_to_pixel(size.width, self.client_left()),
            snap_size_to_pixel(size.height, self.client_top()),
        )
    }

    fn has_horizontal_overflow(&self) -> bool {
        let client_width = self.layout_content_rect(ScrollbarInclusion::Include).width()
            - LayoutUnit::from_int(
                self.vertical_scrollbar_width(OverlayScrollbarClipBehavior::IgnoreOverlayScrollbarSize),
            );
        let scroll_width = self.scrollable_area().map_or(LayoutUnit::ZERO, |a| a.scroll_width());
        scroll_width.round() > client_width.round()
    }

    fn has_vertical_overflow(&self) -> bool {
        let client_height = self.layout_content_rect(ScrollbarInclusion::Include).height()
            - LayoutUnit::from_int(
                self.horizontal_scrollbar_height(OverlayScrollbarClipBehavior::IgnoreOverlayScrollbarSize),
            );
        let scroll_height = self.scrollable_area().map_or(LayoutUnit::ZERO, |a| a.scroll_height());
        scroll_height.round() > client_height.round()
    }

    // ---- Scroll dimensions and origin ----

    fn update_scroll_origin(&mut self) {
        let Some(area) = self.scrollable_area() else {
            return;
        };
        let overflow_rect = area.overflow_rect();
        // Nothing to do before the first layout.
        if overflow_rect.is_empty() {
            return;
        }
        let border = self.border();
        let scrollable_overflow =
            overflow_rect.translated(-PhysicalOffset::new(border.left, border.top));
        let new_origin =
            (-scrollable_overflow.offset).to_floored_point() + self.origin_adjustment_for_scrollbars();
        let id = self.id();
        if let Some(area) = self.scrollable_area_mut() {
            if new_origin != area.scroll_origin {
                debug!(?id, old = ?area.scroll_origin, new = ?new_origin, "Scroll origin changed");
                area.flags.scroll_origin_changed = true;
            }
            area.scroll_origin = new_origin;
        }
    }

    fn update_scroll_dimensions(&mut self) {
        if self.scrollable_area().is_none() {
            return;
        }
        let mut new_rect = self.scrollable_overflow_rect();
        // Contents are never smaller than the visible size.
        let client_size = self.layout_content_rect(ScrollbarInclusion::Exclude).size;
        new_rect.unite(&PhysicalRect::new(new_rect.offset, client_size));

        let id = self.id();
        if let Some(area) = self.scrollable_area_mut() {
            if area.overflow_rect.size != new_rect.size {
                trace!(?id, size = ?new_rect.size, "Scroll contents resized");
            }
            area.overflow_rect = new_rect;
        }
        self.update_scroll_origin();
    }

    // ---- Offsets ----

    fn maximum_scroll_offset_int(&self) -> IntVector {
        let Some(area) = self.scrollable_area() else {
            return IntVector::default();
        };
        let origin = -area.scroll_origin().offset_from_origin();
        if !self.is_scroll_container() {
            return origin;
        }
        let mut content_size = self.contents_size();
        let visible_size = self
            .overflow_clip_rect(
                PhysicalOffset::default(),
                OverlayScrollbarClipBehavior::IgnoreOverlayScrollbarSize,
            )
            .size
            .to_rounded_size();
        content_size.set_to_max(visible_size);
        origin
            + IntVector::new(
                content_size.width - visible_size.width,
                content_size.height - visible_size.height,
            )
    }

    fn minimum_scroll_offset_int(&self) -> IntVector {
        self.scrollable_area()
            .map_or(IntVector::default(), |area| area.minimum_scroll_offset_int())
    }

    fn maximum_scroll_offset(&self) -> ScrollOffset {
        self.maximum_scroll_offset_int().into()
    }

    fn minimum_scroll_offset(&self) -> ScrollOffset {
        self.minimum_scroll_offset_int().into()
    }

    fn clamp_scroll_offset(&self, offset: ScrollOffset) -> ScrollOffset {
        let mut result = offset;
        result.set_to_min(self.maximum_scroll_offset());
        result.set_to_max(self.minimum_scroll_offset());
        result
    }

    /// Scroll to `offset`, clamped. Returns whether the offset changed.
    fn set_scroll_offset(&mut self, offset: ScrollOffset) -> bool {
        let clamped = self.clamp_scroll_offset(offset);
        let id = self.id();
        let Some(area) = self.scrollable_area_mut() else {
            return false;
        };
        if clamped == area.scroll_offset {
            return false;
        }
        trace!(?id, x = clamped.x, y = clamped.y, "Scroll offset changed");
        area.scroll_offset = clamped;
        true
    }

    fn scroll_by(&mut self, delta: ScrollOffset) -> bool {
        let current = self
            .scrollable_area()
            .map_or(ScrollOffset::default(), |a| a.scroll_offset());
        self.set_scroll_offset(current + delta)
    }

    fn clamp_scroll_offset_after_overflow_change(&mut self) {
        if self.scrollable_area().is_none() {
            return;
        }
        self.update_scroll_dimensions();
        let (offset, origin_changed) = match self.scrollable_area() {
            Some(area) => (area.scroll_offset(), area.scroll_origin_changed()),
            None => return,
        };
        if origin_changed {
            let clamped = self.clamp_scroll_offset(offset);
            if let Some(area) = self.scrollable_area_mut() {
                area.scroll_offset = clamped;
            }
        } else {
            self.set_scroll_offset(offset);
        }
        let id = self.id();
        if let Some(area) = self.scrollable_area_mut() {
            trace!(?id, offset = ?area.scroll_offset, "Clamped scroll offset after overflow change");
            area.flags.needs_scroll_offset_clamp = false;
            area.flags.scroll_origin_changed = false;
        }
    }

    /// Clamp now, or queue on `ctx` while clamping is delayed.
    fn delayable_clamp_scroll_offset_after_overflow_change(&mut self, ctx: &mut LayoutContext) {
        if ctx.clamping_delayed() {
            let id = self.id();
            if let Some(area) = self.scrollable_area_mut() {
                if !area.flags.needs_scroll_offset_clamp {
                    area.flags.needs_scroll_offset_clamp = true;
                    ctx.set_needs_clamp(id);
                }
            }
            return;
        }
        self.clamp_scroll_offset_after_overflow_change();
    }

    // ---- Scrollbar existence ----

    /// Which scrollbars the box needs, as `(horizontal, vertical)`.
    fn compute_scrollbar_existence(&self, option: ComputeScrollbarExistenceOption) -> (bool, bool) {
        let Some(area) = self.scrollable_area() else {
            return (false, false);
        };
        let style = self.style();
        if !self.has_non_visible_overflow() || style.scrollbar_width == ScrollbarWidth::None {
            return (false, false);
        }

        let mode_for = |overflow: Overflow| match overflow {
            Overflow::Scroll => ScrollbarMode::AlwaysOn,
            Overflow::Auto | Overflow::Overlay => ScrollbarMode::Auto,
            Overflow::Hidden | Overflow::Visible | Overflow::Clip => ScrollbarMode::AlwaysOff,
        };
        let mut h_mode = mode_for(style.overflow_x);
        let mut v_mode = mode_for(style.overflow_y);

        // Overlay scrollbars only appear when there is something to scroll.
        let will_be_overlay =
            self.config().scrollbar_theme.uses_overlay_scrollbars && style.custom_scrollbar.is_none();
        if will_be_overlay {
            if h_mode == ScrollbarMode::AlwaysOn {
                h_mode = ScrollbarMode::Auto;
            }
            if v_mode == ScrollbarMode::AlwaysOn {
                v_mode = ScrollbarMode::Auto;
            }
        }

        let mut needs_horizontal = area.has_horizontal_scrollbar();
        let mut needs_vertical = area.has_vertical_scrollbar();
        match h_mode {
            ScrollbarMode::AlwaysOn => needs_horizontal = true,
            ScrollbarMode::AlwaysOff => needs_horizontal = false,
            ScrollbarMode::Auto => {}
        }
        match v_mode {
            ScrollbarMode::AlwaysOn => needs_vertical = true,
            ScrollbarMode::AlwaysOff => needs_vertical = false,
            ScrollbarMode::Auto => {}
        }

        if option == ComputeScrollbarExistenceOption::OverflowIndependent {
            return (needs_horizontal, needs_vertical);
        }

        let visible = self.visible_content_rect(ScrollbarInclusion::Include);
        if h_mode == ScrollbarMode::Auto {
            needs_horizontal = self.has_horizontal_overflow() && visible.height != 0;
        }
        if v_mode == ScrollbarMode::Auto {
            needs_vertical = self.has_vertical_overflow() && visible.width != 0;
        }
        (needs_horizontal, needs_vertical)
    }

    /// True when content fits once both auto scrollbars are gone.
    fn try_removing_auto_scrollbars(&self, needs_horizontal: bool, needs_vertical: bool) -> bool {
        if !needs_horizontal && !needs_vertical {
            return false;
        }
        if !self.has_auto_vertical_scrollbar() || !self.has_auto_horizontal_scrollbar() {
            return false;
        }
        let Some(area) = self.scrollable_area() else {
            return false;
        };
        let client_size = self.layout_content_rect(ScrollbarInclusion::Include).size;
        area.scroll_width() <= client_size.width && area.scroll_height() <= client_size.height
    }

    fn create_scrollbar(&self, orientation: ScrollbarOrientation) -> Scrollbar {
        let theme = &self.config().scrollbar_theme;
        match self.style().custom_scrollbar {
            Some(custom) => {
                let px = match orientation {
                    ScrollbarOrientation::Horizontal => custom.height,
                    ScrollbarOrientation::Vertical => custom.width,
                };
                Scrollbar::new(orientation, px.round() as i32, false, true, true)
            }
            None => {
                let is_overlay = theme.uses_overlay_scrollbars;
                Scrollbar::new(
                    orientation,
                    theme.thickness_for(self.style().scrollbar_width),
                    is_overlay,
                    !is_overlay || theme.overlay_hit_testable,
                    false,
                )
            }
        }
    }

    /// Add or remove a scrollbar. Ignored while scrollbars are frozen.
    fn set_has_scrollbar(
        &mut self,
        ctx: &LayoutContext,
        orientation: ScrollbarOrientation,
        has_scrollbar: bool,
    ) {
        if ctx.scrollbars_frozen() {
            return;
        }
        let Some(area) = self.scrollable_area() else {
            return;
        };
        if area.scrollbar(orientation).is_some() == has_scrollbar {
            return;
        }
        let scrollbar = has_scrollbar.then(|| self.create_scrollbar(orientation));
        let id = self.id();
        if let Some(area) = self.scrollable_area_mut() {
            area.set_scrollbar(orientation, scrollbar);
        }
        debug!(?id, ?orientation, has_scrollbar, "Scrollbar existence changed");
        self.update_scroll_origin();
    }

    fn set_has_horizontal_scrollbar(&mut self, ctx: &LayoutContext, has_scrollbar: bool) {
        self.set_has_scrollbar(ctx, ScrollbarOrientation::Horizontal, has_scrollbar);
    }

    fn set_has_vertical_scrollbar(&mut self, ctx: &LayoutContext, has_scrollbar: bool) {
        self.set_has_scrollbar(ctx, ScrollbarOrientation::Vertical, has_scrollbar);
    }

    fn update_scrollbar_enabled_state(&mut self, frozen: bool) {
        let horizontal = self.has_horizontal_overflow();
        let vertical = self.has_vertical_overflow();
        let Some(area) = self.scrollable_area_mut() else {
            return;
        };
        for (orientation, enabled) in [
            (ScrollbarOrientation::Horizontal, horizontal),
            (ScrollbarOrientation::Vertical, vertical),
        ] {
            if let Some(scrollbar) = area.scrollbar_mut(orientation) {
                // Custom scrollbars keep their state while frozen.
                if !scrollbar.is_custom() || !frozen {
                    scrollbar.set_enabled(enabled);
                }
            }
        }
    }

    fn update_scrollbar_proportions(&mut self) {
        let visible = self.visible_content_rect(ScrollbarInclusion::Exclude);
        let contents = self.contents_size();
        let Some(area) = self.scrollable_area_mut() else {
            return;
        };
        if let Some(scrollbar) = area.horizontal_scrollbar.as_mut() {
            scrollbar.set_proportion(visible.width, contents.width);
        }
        if let Some(scrollbar) = area.vertical_scrollbar.as_mut() {
            scrollbar.set_proportion(visible.height, contents.height);
        }
    }

    /// Post-layout update. Returns whether scrollbars were added or removed
    /// in a way that changes layout.
    fn update_after_layout(&mut self, ctx: &mut LayoutContext) -> bool {
        if self.scrollable_area().is_none() {
            return false;
        }
        let frozen = ctx.scrollbars_frozen();

        self.update_scroll_dimensions();

        let has_resizer = self.can_resize();
        let (had_horizontal, had_vertical, resizer_will_change) = match self.scrollable_area_mut() {
            Some(area) => {
                let changed = area.flags.had_resizer_before_relayout != has_resizer;
                area.flags.had_resizer_before_relayout = has_resizer;
                (area.has_horizontal_scrollbar(), area.has_vertical_scrollbar(), changed)
            }
            None => return false,
        };

        let (mut needs_horizontal, mut needs_vertical) =
            self.compute_scrollbar_existence(ComputeScrollbarExistenceOption::Dependent);
        if !frozen && self.try_removing_auto_scrollbars(needs_horizontal, needs_vertical) {
            needs_horizontal = false;
            needs_vertical = false;
        }

        let horizontal_should_change = needs_horizontal != had_horizontal;
        let vertical_should_change = needs_vertical != had_vertical;
        let mut relayout = false;
        if (horizontal_should_change || vertical_should_change) && !frozen {
            self.set_has_horizontal_scrollbar(ctx, needs_horizontal);
            self.set_has_vertical_scrollbar(ctx, needs_vertical);

            // overflow: overlay scrollbars don't affect layout.
            let style = self.style();
            if (horizontal_should_change && style.overflow_x != Overflow::Overlay)
                || (vertical_should_change && style.overflow_y != Overflow::Overlay)
            {
                relayout = true;
                self.update_scroll_dimensions();
            }
        } else if resizer_will_change {
            trace!(id = ?self.id(), has_resizer, "Resizer changed");
        }

        self.update_scrollbar_enabled_state(frozen);
        self.update_scrollbar_proportions();

        let hypothetical = |orientation| {
            if self.has_scrollbar_gutters(orientation) {
                self.hypothetical_scrollbar_thickness(orientation, true)
            } else {
                0
            }
        };
        let horizontal = hypothetical(ScrollbarOrientation::Horizontal);
        let vertical = hypothetical(ScrollbarOrientation::Vertical);
        if let Some(area) = self.scrollable_area_mut() {
            area.hypothetical_horizontal_scrollbar_thickness = horizontal;
            area.hypothetical_vertical_scrollbar_thickness = vertical;
        }

        self.delayable_clamp_scroll_offset_after_overflow_change(ctx);
        self.position_overflow_controls();
        relayout
    }

    // ---- Input ----

    fn user_input_scrollable(&self, orientation: ScrollbarOrientation) -> bool {
        let overflow = match orientation {
            ScrollbarOrientation::Horizontal => self.style().overflow_x,
            ScrollbarOrientation::Vertical => self.style().overflow_y,
        };
        overflow.is_user_scrollable()
    }

    /// Distance scrolled by one page.
    fn page_step(&self, orientation: ScrollbarOrientation) -> i32 {
        let rect = self.layout_content_rect(ScrollbarInclusion::Exclude);
        let length = match orientation {
            ScrollbarOrientation::Horizontal => snap_size_to_pixel(rect.width(), rect.x()),
            ScrollbarOrientation::Vertical => snap_size_to_pixel(rect.height(), rect.y()),
        };
        let paging = &self.config().paging;
        let min_page_step = (length as f32 * paging.min_fraction_to_step) as i32;
        let page_step = min_page_step.max(length - paging.max_overlap_between_pages);
        page_step.max(1)
    }

    // ---- Overflow controls ----

    /// The square at the bottom corner shared by scrollbars and resizer.
    fn corner_rect(&self) -> IntRect {
        let area = self.scrollable_area();
        let horizontal = area.and_then(|a| a.horizontal_scrollbar());
        let vertical = area.and_then(|a| a.vertical_scrollbar());
        let (horizontal_thickness, vertical_thickness) = match (vertical, horizontal) {
            (None, None) => {
                let thickness = self
                    .config()
                    .scrollbar_theme
                    .thickness_for(ScrollbarWidth::Auto);
                (thickness, thickness)
            }
            (Some(v), None) => (v.thickness(), v.thickness()),
            (None, Some(h)) => (h.thickness(), h.thickness()),
            (Some(v), Some(h)) => (v.thickness(), h.thickness()),
        };
        let size = self.pixel_snapped_border_box_size();
        let border = self.border();
        let x = if self.should_place_vertical_scrollbar_on_left() {
            border.left.to_int()
        } else {
            size.width - horizontal_thickness - border.right.to_int()
        };
        IntRect::new(
            x,
            size.height - vertical_thickness - border.bottom.to_int(),
            horizontal_thickness,
            vertical_thickness,
        )
    }

    /// Present when both scrollbars, or a resizer and one scrollbar, exist.
    fn scroll_corner_rect(&self) -> IntRect {
        let Some(area) = self.scrollable_area() else {
            return IntRect::default();
        };
        let has_horizontal = area.has_horizontal_scrollbar();
        let has_vertical = area.has_vertical_scrollbar();
        if (has_horizontal && has_vertical) || (self.can_resize() && (has_horizontal || has_vertical)) {
            return self.corner_rect();
        }
        IntRect::default()
    }

    fn is_scroll_corner_visible(&self) -> bool {
        !self.scroll_corner_rect().is_empty()
    }

    fn vertical_scrollbar_start(&self) -> i32 {
        if self.should_place_vertical_scrollbar_on_left() {
            return self.border().left.to_int();
        }
        let thickness = self
            .scrollable_area()
            .and_then(|a| a.vertical_scrollbar())
            .map_or(0, |s| s.thickness());
        self.pixel_snapped_border_box_size().width - self.border().right.to_int() - thickness
    }

    fn horizontal_scrollbar_start(&self) -> i32 {
        let mut x = self.border().left.to_int();
        if self.should_place_vertical_scrollbar_on_left() {
            x += match self.scrollable_area().and_then(|a| a.vertical_scrollbar()) {
                Some(scrollbar) => scrollbar.thickness(),
                None => self.resizer_corner_rect(ResizerHitTestType::Pointer).width,
            };
        }
        x
    }

    fn rect_for_horizontal_scrollbar(&self) -> IntRect {
        let Some(scrollbar) = self.scrollable_area().and_then(|a| a.horizontal_scrollbar()) else {
            return IntRect::default();
        };
        let thickness = scrollbar.thickness();
        let size = self.pixel_snapped_border_box_size();
        let border = self.border();
        IntRect::new(
            self.horizontal_scrollbar_start(),
            size.height - border.bottom.to_int() - thickness,
            size.width - (border.left + border.right).to_int() - self.scroll_corner_rect().width,
            thickness,
        )
    }

    fn rect_for_vertical_scrollbar(&self) -> IntRect {
        let Some(scrollbar) = self.scrollable_area().and_then(|a| a.vertical_scrollbar()) else {
            return IntRect::default();
        };
        let size = self.pixel_snapped_border_box_size();
        let border = self.border();
        IntRect::new(
            self.vertical_scrollbar_start(),
            border.top.to_int(),
            scrollbar.thickness(),
            size.height - (border.top + border.bottom).to_int() - self.scroll_corner_rect().height,
        )
    }

    fn resizer_corner_rect(&self, hit_test_type: ResizerHitTestType) -> IntRect {
        if !self.can_resize() {
            return IntRect::default();
        }
        let mut corner = self.corner_rect();
        if hit_test_type == ResizerHitTestType::Touch {
            let ratio = self.config().resizer_touch_expand_ratio;
            corner.offset(-corner.width * (ratio - 1), -corner.height * (ratio - 1));
            corner.width *= ratio;
            corner.height *= ratio;
        }
        corner
    }

    fn scroll_corner_and_resizer_rect(&self) -> IntRect {
        let corner = self.scroll_corner_rect();
        if corner.is_empty() {
            return self.resizer_corner_rect(ResizerHitTestType::Pointer);
        }
        corner
    }

    fn is_local_point_in_resize_control(&self, point: IntPoint, hit_test_type: ResizerHitTestType) -> bool {
        self.can_resize() && self.resizer_corner_rect(hit_test_type).contains_point(point)
    }

    fn has_overflow_controls(&self) -> bool {
        self.scrollable_area().is_some_and(|a| a.has_scrollbar()) || self.can_resize()
    }

    fn has_overlay_overflow_controls(&self) -> bool {
        let Some(area) = self.scrollable_area() else {
            return false;
        };
        if area.has_overlay_scrollbars() {
            return true;
        }
        if !area.has_scrollbar() && self.can_resize() {
            return true;
        }
        self.style().overflow_x == Overflow::Overlay || self.style().overflow_y == Overflow::Overlay
    }

    /// Platform overlay scrollbars need no corner; `overflow: overlay` ones do.
    fn needs_scroll_corner(&self) -> bool {
        self.scrollable_area()
            .is_some_and(|a| a.has_scrollbar() && !a.has_overlay_scrollbars())
    }

    fn position_overflow_controls(&mut self) {
        if !self.has_overflow_controls() {
            return;
        }
        let vertical = self.rect_for_vertical_scrollbar();
        let horizontal = self.rect_for_horizontal_scrollbar();
        if let Some(area) = self.scrollable_area_mut() {
            if let Some(scrollbar) = area.vertical_scrollbar.as_mut() {
                scrollbar.set_frame_rect(vertical);
            }
            if let Some(scrollbar) = area.horizontal_scrollbar.as_mut() {
                scrollbar.set_frame_rect(horizontal);
            }
        }
    }

    /// Hit test `point`, in border box space, against the overflow controls.
    fn hit_test_overflow_controls(&self, point: IntPoint) -> Option<OverflowControlHit> {
        if !self.has_overflow_controls() {
            return None;
        }
        let resizer = self.resizer_corner_rect(ResizerHitTestType::Pointer);
        if self.can_resize() && resizer.contains_point(point) {
            return Some(OverflowControlHit::Resizer);
        }
        let area = self.scrollable_area()?;
        let visible = self.visible_content_rect(ScrollbarInclusion::Include);
        let border_top = self.border().top.to_int();

        let resize_height = resizer.height.max(0);
        if let Some(vertical) = area.vertical_scrollbar().filter(|s| s.hit_testable()) {
            let rect = IntRect::new(
                self.vertical_scrollbar_start(),
                border_top,
                vertical.thickness(),
                visible.height
                    - area
                        .horizontal_scrollbar()
                        .map_or(resize_height, |h| h.thickness()),
            );
            if rect.contains_point(point) {
                return Some(OverflowControlHit::VerticalScrollbar);
            }
        }

        let resize_width = resizer.width.max(0);
        if let Some(horizontal) = area.horizontal_scrollbar().filter(|s| s.hit_testable()) {
            let thickness = horizontal.thickness();
            let rect = IntRect::new(
                self.horizontal_scrollbar_start(),
                border_top + visible.height - thickness,
                visible.width
                    - area
                        .vertical_scrollbar()
                        .map_or(resize_width, |v| v.thickness()),
                thickness,
            );
            if rect.contains_point(point) {
                return Some(OverflowControlHit::HorizontalScrollbar);
            }
        }

        if self.needs_scroll_corner() && self.scroll_corner_rect().contains_point(point) {
            return Some(OverflowControlHit::ScrollCorner);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PhysicalSize;
    use crate::tree::LayoutTree;
    use crate::box_model::NodeKind;
    use crate::config::LayoutConfig;
    use rustkit_css::ComputedStyle;

    fn scroller(tree: &mut LayoutTree, css: &str, size: (i32, i32), content: (i32, i32)) -> BoxId {
        let style = ComputedStyle::from_declarations(css).unwrap();
        let container = tree.create_box(NodeKind::Block, style);
        tree.set_size(container, PhysicalSize::from_ints(size.0, size.1)).unwrap();
        let child = tree.create_box(NodeKind::Block, ComputedStyle::new());
        tree.append_child(container, child).unwrap();
        tree.set_size(child, PhysicalSize::from_ints(content.0, content.1)).unwrap();
        container
    }

    fn lay_out(tree: &mut LayoutTree, id: BoxId) {
        let mut ctx = LayoutContext::new();
        tree.compute_overflow(id).unwrap();
        tree.update_after_layout(id, &mut ctx).unwrap();
    }

    #[test]
    fn test_auto_scrollbars_follow_overflow() {
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow: auto", (200, 100), (150, 300));
        lay_out(&mut tree, id);
        let area = tree.scrollable_area(id).unwrap();
        assert!(area.has_vertical_scrollbar());
        assert!(!area.has_horizontal_scrollbar());

        let b = tree.get(id).unwrap();
        assert_eq!(b.maximum_scroll_offset_int(), IntVector::new(0, 200));
        assert_eq!(b.minimum_scroll_offset_int(), IntVector::new(0, 0));
    }

    #[test]
    fn test_auto_scrollbars_removed_when_content_fits() {
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow: auto", (200, 100), (200, 100));
        lay_out(&mut tree, id);
        assert!(!tree.scrollable_area(id).unwrap().has_scrollbar());
    }

    #[test]
    fn test_scroll_forces_scrollbars() {
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow: scroll", (200, 100), (10, 10));
        lay_out(&mut tree, id);
        let area = tree.scrollable_area(id).unwrap();
        assert!(area.has_horizontal_scrollbar() && area.has_vertical_scrollbar());
        assert!(!area.vertical_scrollbar().unwrap().enabled());
    }

    #[test]
    fn test_overlay_theme_demotes_scroll_to_auto() {
        let mut tree = LayoutTree::new(LayoutConfig::default().with_overlay_scrollbars());
        let id = scroller(&mut tree, "overflow: scroll", (200, 100), (10, 10));
        lay_out(&mut tree, id);
        assert!(!tree.scrollable_area(id).unwrap().has_scrollbar());
    }

    #[test]
    fn test_scrollbar_width_none_has_no_scrollbars() {
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow: scroll; scrollbar-width: none", (200, 100), (500, 500));
        lay_out(&mut tree, id);
        assert!(!tree.scrollable_area(id).unwrap().has_scrollbar());
        assert_eq!(
            tree.get(id).unwrap().maximum_scroll_offset_int(),
            IntVector::new(300, 400)
        );
    }

    #[test]
    fn test_auto_scrollbars_reach_fixed_point() {
        // The vertical scrollbar narrows the client to 185px, so the 195px
        // content then overflows horizontally too.
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow: auto", (200, 100), (195, 150));
        tree.compute_overflow(id).unwrap();
        let mut ctx = LayoutContext::new();
        assert!(tree.update_after_layout(id, &mut ctx).unwrap());

        let area = tree.scrollable_area(id).unwrap();
        assert!(area.has_horizontal_scrollbar() && area.has_vertical_scrollbar());
        let b = tree.get(id).unwrap();
        assert_eq!(b.client_width(), LayoutUnit::from_int(185));
        assert_eq!(b.client_height(), LayoutUnit::from_int(85));
        assert_eq!(b.maximum_scroll_offset_int(), IntVector::new(10, 65));

        // Settled: another update changes nothing.
        assert!(!tree.update_after_layout(id, &mut ctx).unwrap());
    }

    #[test]
    fn test_clipped_axis_never_gets_a_scrollbar() {
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow: scroll", (200, 100), (500, 50));
        let mut style = tree.get(id).unwrap().style().clone();
        style.overflow_x = Overflow::Clip;
        tree.set_style(id, style).unwrap();
        lay_out(&mut tree, id);

        let area = tree.scrollable_area(id).unwrap();
        assert!(!area.has_horizontal_scrollbar());
        assert!(area.has_vertical_scrollbar());
    }

    #[test]
    fn test_existence_is_idempotent() {
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow: auto", (200, 100), (400, 50));
        lay_out(&mut tree, id);
        let b = tree.get(id).unwrap();
        let first = b.compute_scrollbar_existence(ComputeScrollbarExistenceOption::Dependent);
        let second = b.compute_scrollbar_existence(ComputeScrollbarExistenceOption::Dependent);
        assert_eq!(first, second);
        assert_eq!(first, (true, false));
    }

    #[test]
    fn test_overflow_independent_existence_keeps_auto_state() {
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow-x: scroll; overflow-y: auto", (200, 100), (10, 10));
        let b = tree.get(id).unwrap();
        assert_eq!(
            b.compute_scrollbar_existence(ComputeScrollbarExistenceOption::OverflowIndependent),
            (true, false)
        );
    }

    #[test]
    fn test_set_scroll_offset_clamps() {
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow: hidden", (100, 100), (300, 400));
        lay_out(&mut tree, id);
        let b = tree.get_mut(id).unwrap();
        assert!(b.set_scroll_offset(ScrollOffset::new(500.0, -20.0)));
        assert_eq!(
            b.scrollable_area().unwrap().scroll_offset(),
            ScrollOffset::new(200.0, 0.0)
        );
        assert!(!b.set_scroll_offset(ScrollOffset::new(900.0, 0.0)));
        assert!(b.scroll_by(ScrollOffset::new(-50.5, 10.0)));
        assert_eq!(b.scrollable_area().unwrap().scroll_offset_int(), IntVector::new(149, 10));
    }

    #[test]
    fn test_frozen_scrollbars_are_kept() {
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow: auto", (200, 100), (150, 300));
        tree.compute_overflow(id).unwrap();
        let mut ctx = LayoutContext::new();
        ctx.with_frozen_scrollbars(|ctx| tree.update_after_layout(id, ctx))
            .unwrap();
        assert!(!tree.scrollable_area(id).unwrap().has_scrollbar());

        tree.update_after_layout(id, &mut ctx).unwrap();
        assert!(tree.scrollable_area(id).unwrap().has_vertical_scrollbar());
    }

    #[test]
    fn test_page_step() {
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow: hidden", (400, 100), (1000, 1000));
        lay_out(&mut tree, id);
        let b = tree.get(id).unwrap();
        // max(400 * 0.875, 400 - 40)
        assert_eq!(b.page_step(ScrollbarOrientation::Horizontal), 360);
        // max(87, 60)
        assert_eq!(b.page_step(ScrollbarOrientation::Vertical), 87);
        assert!(!b.user_input_scrollable(ScrollbarOrientation::Vertical));
    }

    #[test]
    fn test_overflow_control_rects() {
        let mut tree = LayoutTree::default();
        let id = scroller(
            &mut tree,
            "overflow: scroll; resize: both; border-width: 5px; border-style: solid",
            (210, 110),
            (500, 500),
        );
        lay_out(&mut tree, id);
        let b = tree.get(id).unwrap();
        assert_eq!(b.corner_rect(), IntRect::new(190, 90, 15, 15));
        assert_eq!(b.scroll_corner_rect(), b.corner_rect());
        assert_eq!(b.rect_for_vertical_scrollbar(), IntRect::new(190, 5, 15, 85));
        assert_eq!(b.rect_for_horizontal_scrollbar(), IntRect::new(5, 90, 185, 15));
        assert_eq!(
            b.scrollable_area().unwrap().vertical_scrollbar().unwrap().frame_rect(),
            b.rect_for_vertical_scrollbar()
        );
        assert_eq!(
            b.resizer_corner_rect(ResizerHitTestType::Touch),
            IntRect::new(175, 75, 30, 30)
        );
        assert!(b.is_local_point_in_resize_control(IntPoint::new(195, 95), ResizerHitTestType::Pointer));
        assert!(!b.is_local_point_in_resize_control(IntPoint::new(180, 80), ResizerHitTestType::Pointer));
        assert!(b.is_local_point_in_resize_control(IntPoint::new(180, 80), ResizerHitTestType::Touch));
        assert!(b.has_overflow_controls());
        assert!(!b.has_overlay_overflow_controls());
        assert!(b.needs_scroll_corner());

        assert_eq!(
            b.hit_test_overflow_controls(IntPoint::new(195, 95)),
            Some(OverflowControlHit::Resizer)
        );
        assert_eq!(
            b.hit_test_overflow_controls(IntPoint::new(195, 20)),
            Some(OverflowControlHit::VerticalScrollbar)
        );
        assert_eq!(
            b.hit_test_overflow_controls(IntPoint::new(20, 95)),
            Some(OverflowControlHit::HorizontalScrollbar)
        );
        assert_eq!(b.hit_test_overflow_controls(IntPoint::new(20, 20)), None);
    }

    #[test]
    fn test_rtl_horizontal_scrollbar_starts_after_vertical() {
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow: scroll; direction: rtl", (200, 100), (10, 10));
        lay_out(&mut tree, id);
        let b = tree.get(id).unwrap();
        assert_eq!(b.vertical_scrollbar_start(), 0);
        assert_eq!(b.horizontal_scrollbar_start(), 15);
        assert_eq!(b.corner_rect().x, 0);
    }

    #[test]
    fn test_delayed_clamp_is_flushed_once() {
        let mut tree = LayoutTree::default();
        let id = scroller(&mut tree, "overflow: hidden", (100, 100), (300, 300));
        lay_out(&mut tree, id);
        tree.scroll_to(id, ScrollOffset::new(200.0, 200.0)).unwrap();

        let child = tree.get(id).unwrap().children()[0];
        tree.set_size(child, PhysicalSize::from_ints(150, 150)).unwrap();
        tree.compute_overflow(id).unwrap();

        let mut ctx = LayoutContext::new();
        ctx.with_delayed_scroll_clamp(&mut tree, |tree, ctx| {
            tree.update_after_layout(id, ctx)?;
            tree.update_after_layout(id, ctx)?;
            assert_eq!(ctx.pending_clamps(), &[id]);
            let area = tree.scrollable_area(id)?;
            assert!(area.needs_scroll_offset_clamp());
            assert_eq!(area.scroll_offset(), ScrollOffset::new(200.0, 200.0));
            Ok::<_, crate::LayoutError>(())
        })
        .unwrap();

        let area = tree.scrollable_area(id).unwrap();
        assert!(!area.needs_scroll_offset_clamp());
        assert_eq!(area.scroll_offset(), ScrollOffset::new(50.0, 50.0));
    }
}
