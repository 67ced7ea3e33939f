//! The box arena.
//!
//! Boxes live in a `Vec` owned by [`LayoutTree`] and refer to each other by
//! [`BoxId`]. Parents own their child id lists; the parent link is a plain
//! index.

use std::fmt;

use rustkit_css::ComputedStyle;
use tracing::{debug, trace, warn};

use crate::background::{BackgroundGeometry, BackgroundPaintContext, ImageSizingInfo, ObscuringEdges};
use crate::box_frame::{BoxFrame, FrameChange};
use crate::box_model::{BoxGeometry, NodeKind};
use crate::config::LayoutConfig;
use crate::context::LayoutContext;
use crate::geometry::{LogicalRect, PhysicalOffset, PhysicalRect, PhysicalSize};
use crate::overflow::{
    flipped_to_physical, layout_overflow_rect_for_propagation, visual_overflow_rect_for_propagation,
    OverflowModel,
};
use crate::scroll::{ScrollOffset, Scrollable, ScrollableArea};
use crate::units::LayoutUnit;
use crate::writing_mode::WritingModeConverter;
use crate::{LayoutError, Result};

/// Adding one scrollbar can make the other axis overflow; a second pass
/// settles it.
const MAX_SCROLLBAR_PASSES: usize = 2;

/// Stable index of a box in its [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(u32);

impl BoxId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Dirty bits callers must honor after frame mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxFlags {
    pub needs_overflow_recalc: bool,
    pub needs_paint_invalidation: bool,
}

/// One box: style, frame, overflow and optional scroll state.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    id: BoxId,
    kind: NodeKind,
    style: ComputedStyle,
    frame: BoxFrame,
    overflow: OverflowModel,
    scrollable_area: Option<ScrollableArea>,
    config: LayoutConfig,
    parent: Option<BoxId>,
    children: Vec<BoxId>,
    pub flags: BoxFlags,
}

impl LayoutBox {
    fn new(id: BoxId, kind: NodeKind, style: ComputedStyle, config: LayoutConfig) -> Self {
        let frame = BoxFrame::from_style(&style, LayoutUnit::ZERO);
        let mut layout_box = Self {
            id,
            kind,
            style,
            frame,
            overflow: OverflowModel::new(),
            scrollable_area: None,
            config,
            parent: None,
            children: Vec::new(),
            flags: BoxFlags::default(),
        };
        layout_box.sync_scrollable_area();
        layout_box
    }

    /// Create or drop the scrollable area to match the style.
    fn sync_scrollable_area(&mut self) {
        match (self.is_scroll_container(), self.scrollable_area.is_some()) {
            (true, false) => self.scrollable_area = Some(ScrollableArea::new()),
            (false, true) => {
                debug!(id = %self.id, "Box is no longer a scroll container");
                self.scrollable_area = None;
            }
            _ => {}
        }
    }

    pub fn parent(&self) -> Option<BoxId> {
        self.parent
    }

    pub fn children(&self) -> &[BoxId] {
        &self.children
    }

    pub fn overflow_mut(&mut self) -> &mut OverflowModel {
        &mut self.overflow
    }

    /// Record ink overflow the box paints itself, like a shadow.
    pub fn add_self_visual_overflow(&mut self, rect: &PhysicalRect) {
        let border_box = self.physical_border_box_rect();
        self.overflow.add_self_visual_overflow(rect, &border_box);
    }
}

impl BoxGeometry for LayoutBox {
    fn frame(&self) -> &BoxFrame {
        &self.frame
    }

    fn style(&self) -> &ComputedStyle {
        &self.style
    }

    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn overflow(&self) -> &OverflowModel {
        &self.overflow
    }

    fn scrollable_area(&self) -> Option<&ScrollableArea> {
        self.scrollable_area.as_ref()
    }

    fn config(&self) -> &LayoutConfig {
        &self.config
    }
}

impl Scrollable for LayoutBox {
    fn id(&self) -> BoxId {
        self.id
    }

    fn scrollable_area_mut(&mut self) -> Option<&mut ScrollableArea> {
        self.scrollable_area.as_mut()
    }
}

/// Arena of layout boxes.
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    boxes: Vec<LayoutBox>,
    config: LayoutConfig,
}

impl LayoutTree {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            boxes: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Add a detached box.
    pub fn create_box(&mut self, kind: NodeKind, style: ComputedStyle) -> BoxId {
        let id = BoxId(self.boxes.len() as u32);
        self.boxes.push(LayoutBox::new(id, kind, style, self.config));
        trace!(%id, ?kind, "Created box");
        id
    }

    pub fn get(&self, id: BoxId) -> Result<&LayoutBox> {
        self.boxes.get(id.index()).ok_or(LayoutError::UnknownBox(id))
    }

    pub fn get_mut(&mut self, id: BoxId) -> Result<&mut LayoutBox> {
        self.boxes
            .get_mut(id.index())
            .ok_or(LayoutError::UnknownBox(id))
    }

    pub fn parent(&self, id: BoxId) -> Result<Option<BoxId>> {
        Ok(self.get(id)?.parent)
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    fn is_inclusive_ancestor(&self, ancestor: BoxId, id: BoxId) -> Result<bool> {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return Ok(true);
            }
            current = self.get(node)?.parent;
        }
        Ok(false)
    }

    /// Attach `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: BoxId, child: BoxId) -> Result<()> {
        self.get(parent)?;
        if self.get(child)?.parent.is_some() {
            return Err(LayoutError::AlreadyAttached(child));
        }
        if self.is_inclusive_ancestor(child, parent)? {
            return Err(LayoutError::CycleDetected { parent, child });
        }

        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        self.resolve_edges(child)?;
        self.mark_needs_overflow_recalc(parent)?;
        debug!(%parent, %child, "Appended child");
        Ok(())
    }

    /// Replace a box's style and re-resolve its edges.
    pub fn set_style(&mut self, id: BoxId, style: ComputedStyle) -> Result<()> {
        let layout_box = self.get_mut(id)?;
        layout_box.style = style;
        layout_box.sync_scrollable_area();
        self.resolve_edges(id)?;
        let children = self.get(id)?.children.clone();
        for child in children {
            self.resolve_edges(child)?;
        }
        self.mark_needs_overflow_recalc(id)
    }

    /// Inline size percentages of `id`'s edges resolve against.
    fn containing_inline_size(&self, id: BoxId) -> Result<LayoutUnit> {
        let Some(parent) = self.get(id)?.parent else {
            return Ok(LayoutUnit::ZERO);
        };
        let container = self.get(parent)?;
        Ok(if container.is_horizontal_writing_mode() {
            container.content_width()
        } else {
            container.content_height()
        })
    }

    fn resolve_edges(&mut self, id: BoxId) -> Result<()> {
        let inline_size = self.containing_inline_size(id)?;
        let layout_box = self.get_mut(id)?;
        let style = layout_box.style.clone();
        layout_box.frame.resolve_edges(&style, inline_size);
        Ok(())
    }

    fn mark_needs_overflow_recalc(&mut self, id: BoxId) -> Result<()> {
        let mut current = Some(id);
        while let Some(node) = current {
            let layout_box = self.get_mut(node)?;
            layout_box.flags.needs_overflow_recalc = true;
            current = layout_box.parent;
        }
        Ok(())
    }

    fn apply_frame_change(&mut self, id: BoxId, change: FrameChange) -> Result<()> {
        match change {
            FrameChange::None => return Ok(()),
            FrameChange::Location => {
                self.get_mut(id)?.flags.needs_paint_invalidation = true;
                if let Some(parent) = self.get(id)?.parent {
                    self.mark_needs_overflow_recalc(parent)?;
                }
            }
            FrameChange::Size { subtree } => {
                self.get_mut(id)?.flags.needs_paint_invalidation = true;
                self.mark_needs_overflow_recalc(id)?;
                let children = self.get(id)?.children.clone();
                for child in children {
                    // Percentage edges follow the new content size.
                    self.resolve_edges(child)?;
                    if subtree {
                        self.get_mut(child)?.flags.needs_paint_invalidation = true;
                    }
                }
            }
        }
        trace!(%id, ?change, "Frame changed");
        Ok(())
    }

    /// Set the location in the container's flipped-blocks space.
    pub fn set_location(&mut self, id: BoxId, location: PhysicalOffset) -> Result<FrameChange> {
        let change = self.get_mut(id)?.frame.set_location(location);
        self.apply_frame_change(id, change)?;
        Ok(change)
    }

    /// Set the location from physical coordinates relative to the
    /// container's border box.
    pub fn set_physical_location(
        &mut self,
        id: BoxId,
        physical: PhysicalOffset,
    ) -> Result<FrameChange> {
        let layout_box = self.get(id)?;
        let width = layout_box.frame.width();
        let location = match layout_box.parent {
            Some(parent) => {
                let container = self.get(parent)?;
                PhysicalOffset::new(
                    container.frame.flip_for_writing_mode(physical.left, width),
                    physical.top,
                )
            }
            None => physical,
        };
        self.set_location(id, location)
    }

    pub fn set_size(&mut self, id: BoxId, size: PhysicalSize) -> Result<FrameChange> {
        let change = self.get_mut(id)?.frame.set_size(size);
        self.apply_frame_change(id, change)?;
        Ok(change)
    }

    /// Location relative to the container's border box, in physical space.
    pub fn physical_location(&self, id: BoxId) -> Result<PhysicalOffset> {
        let layout_box = self.get(id)?;
        let container = match layout_box.parent {
            Some(parent) => Some(&self.get(parent)?.frame),
            None => None,
        };
        Ok(layout_box.frame.physical_location(container))
    }

    /// The border box in the container's logical coordinates.
    pub fn logical_rect_in_container(&self, id: BoxId) -> Result<LogicalRect> {
        let layout_box = self.get(id)?;
        let rect = PhysicalRect::new(self.physical_location(id)?, layout_box.frame.size());
        let converter = match layout_box.parent {
            Some(parent) => {
                let container = self.get(parent)?;
                WritingModeConverter::new(container.frame.writing_direction(), container.size())
            }
            None => WritingModeConverter::new(layout_box.frame.writing_direction(), rect.size),
        };
        Ok(converter.to_logical_rect(rect))
    }

    /// Recompute overflow for the subtree at `root`, children first.
    pub fn compute_overflow(&mut self, root: BoxId) -> Result<()> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend_from_slice(&self.get(id)?.children);
        }
        for id in order.into_iter().rev() {
            self.compute_own_overflow(id)?;
        }
        Ok(())
    }

    /// Rebuild `id`'s layout and contents overflow from its children.
    fn compute_own_overflow(&mut self, id: BoxId) -> Result<()> {
        let container = self.get(id)?;
        let container_direction = container.frame.writing_direction();
        let mut layout_rects = Vec::with_capacity(container.children.len());
        let mut visual_rects = Vec::with_capacity(container.children.len());
        for &child_id in &container.children {
            let child = self.get(child_id)?;
            let layout = layout_overflow_rect_for_propagation(
                &child.scrollable_overflow_rect(),
                &child.frame,
                child.overflow_clip_axes(),
                container_direction,
            );
            layout_rects.push(flipped_to_physical(&layout, &container.frame));
            let visual = visual_overflow_rect_for_propagation(
                &child.visual_overflow_rect(),
                &child.frame,
                container_direction,
            );
            visual_rects.push(flipped_to_physical(&visual, &container.frame));
        }

        let is_scroll_container = container.is_scroll_container();
        let padding = container.padding();
        let base = container.layout_overflow_base();
        let border_box = container.physical_border_box_rect();
        let has_non_visible_overflow = container.has_non_visible_overflow();

        let layout_box = self.get_mut(id)?;
        layout_box.overflow.clear_layout_overflow();
        layout_box.overflow.clear_contents_visual_overflow();

        if is_scroll_container {
            // Padding surrounds the children on every side.
            let mut child_bounds = PhysicalRect::default();
            for rect in &layout_rects {
                child_bounds.unite(rect);
            }
            if !child_bounds.is_empty() {
                child_bounds.expand(&padding);
                layout_box.overflow.add_layout_overflow(&child_bounds, &base);
            }
        } else {
            for rect in &layout_rects {
                layout_box.overflow.add_layout_overflow(rect, &base);
            }
        }
        for rect in &visual_rects {
            layout_box
                .overflow
                .add_contents_visual_overflow(rect, &border_box, has_non_visible_overflow);
        }
        layout_box.flags.needs_overflow_recalc = false;
        trace!(%id, overflow = ?layout_box.scrollable_overflow_rect(), "Computed overflow");
        Ok(())
    }

    /// Update `id`'s scroll state after its layout. Recomputes the box's
    /// overflow when scrollbars changed the client size, and re-evaluates
    /// scrollbar existence since one scrollbar can make the other axis
    /// overflow. Returns whether any pass changed the scrollbars.
    pub fn update_after_layout(&mut self, id: BoxId, ctx: &mut LayoutContext) -> Result<bool> {
        let mut changed = false;
        for pass in 0..MAX_SCROLLBAR_PASSES {
            if !self.get_mut(id)?.update_after_layout(ctx) {
                break;
            }
            changed = true;
            debug!(%id, pass, "Scrollbars changed, recomputing overflow");
            self.compute_own_overflow(id)?;
        }
        if changed {
            let layout_box = self.get_mut(id)?;
            layout_box.delayable_clamp_scroll_offset_after_overflow_change(ctx);
            layout_box.position_overflow_controls();
        }
        Ok(changed)
    }

    /// [`Self::update_after_layout`] for every scroll container under
    /// `root`, children first.
    pub fn update_scrollable_areas(&mut self, root: BoxId, ctx: &mut LayoutContext) -> Result<()> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend_from_slice(&self.get(id)?.children);
        }
        for id in order.into_iter().rev() {
            if self.get(id)?.scrollable_area.is_some() {
                self.update_after_layout(id, ctx)?;
            }
        }
        Ok(())
    }

    pub fn scrollable_area(&self, id: BoxId) -> Result<&ScrollableArea> {
        self.get(id)?
            .scrollable_area
            .as_ref()
            .ok_or(LayoutError::NotAScrollContainer(id))
    }

    /// Scroll `id` to `offset`, clamped. Returns the resulting offset.
    pub fn scroll_to(&mut self, id: BoxId, offset: ScrollOffset) -> Result<ScrollOffset> {
        self.scrollable_area(id)?;
        let layout_box = self.get_mut(id)?;
        layout_box.set_scroll_offset(offset);
        Ok(layout_box
            .scrollable_area()
            .map_or(ScrollOffset::default(), |area| area.scroll_offset()))
    }

    pub fn scroll_by(&mut self, id: BoxId, delta: ScrollOffset) -> Result<ScrollOffset> {
        let current = self.scrollable_area(id)?.scroll_offset();
        self.scroll_to(id, current + delta)
    }

    /// Run the clamps queued by a delayed clamp scope.
    pub(crate) fn clamp_pending_scroll_offsets(&mut self, ids: &[BoxId]) {
        for &id in ids {
            match self.get_mut(id) {
                Ok(layout_box) => {
                    let needs_clamp = layout_box
                        .scrollable_area()
                        .is_some_and(|area| area.needs_scroll_offset_clamp());
                    if needs_clamp {
                        layout_box.clamp_scroll_offset_after_overflow_change();
                    }
                }
                Err(_) => warn!(%id, "Dropping scroll clamp for unknown box"),
            }
        }
    }

    /// Background geometry of `id`'s background layer `layer`, painted with
    /// the border box at `paint_offset`. `viewport` is in the same space.
    pub fn background_geometry(
        &self,
        id: BoxId,
        layer: usize,
        image: &ImageSizingInfo,
        paint_offset: PhysicalOffset,
        viewport: PhysicalRect,
    ) -> Result<Option<BackgroundGeometry>> {
        let layout_box = self.get(id)?;
        let style = layout_box.style();
        let Some(fill_layer) = style.background_layers.get(layer) else {
            return Ok(None);
        };

        let scrolled_contents_rect = layout_box.scrollable_area().map(|area| {
            area.overflow_rect()
                .translated(-layout_box.scrolled_content_offset())
        });
        let context = BackgroundPaintContext {
            border: layout_box.border(),
            padding: layout_box.padding(),
            obscuring_edges: ObscuringEdges::from_sides(
                &style.border_top,
                &style.border_right,
                &style.border_bottom,
                &style.border_left,
            ),
            disallow_border_derived_adjustment: false,
            viewport_rect: viewport,
            offset_in_background: PhysicalOffset::default(),
            scrolled_contents_rect,
        };
        let paint_rect = PhysicalRect::new(paint_offset, layout_box.size());
        Ok(Some(BackgroundGeometry::calculate(
            fill_layer, &context, image, paint_rect,
        )))
    }
}
