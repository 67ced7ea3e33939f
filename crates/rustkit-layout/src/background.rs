//! Background image geometry.
//!
//! This module handles:
//! - Positioning area and destination rect per `background-origin`/`-clip`
//! - Tile size from `background-size` and the image's natural sizing
//! - Phase and spacing per `background-repeat` and `background-position`
//! - Fixed and local attachment
//!
//! Geometry is kept in two variants. The unsnapped one tracks fractional
//! positions for phase math; the snapped one is pixel aligned and drives
//! sizes that must exactly fill the painted area (`cover`, `contain`,
//! `round`, `space`).

use rustkit_css::{
    BorderSide, BorderStyle, CompositeOperator, FillAttachment, FillBox, FillClip, FillLayer,
    FillRepeat, FillSize, Length, PositionEdge,
};
use tracing::{debug, trace};

use crate::geometry::{AspectRatioFit, PhysicalBoxStrut, PhysicalOffset, PhysicalRect, PhysicalSize};
use crate::units::{int_mod, minimum_value_for_length, LayoutUnit};

/// Natural sizing of a background image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageSizingInfo {
    pub natural_width: Option<f32>,
    pub natural_height: Option<f32>,
    /// Width to height ratio as a `(width, height)` pair.
    pub aspect_ratio: Option<(f32, f32)>,
}

impl ImageSizingInfo {
    /// A raster image with both natural dimensions.
    pub fn from_natural_size(width: f32, height: f32) -> Self {
        Self {
            natural_width: Some(width),
            natural_height: Some(height),
            aspect_ratio: (width > 0.0 && height > 0.0).then_some((width, height)),
        }
    }

    /// Generated content with no natural size, like a gradient.
    pub fn generated() -> Self {
        Self::default()
    }

    pub fn has_intrinsic_size(&self) -> bool {
        self.natural_width.is_some() || self.natural_height.is_some()
    }

    fn aspect_ratio_size(&self) -> PhysicalSize {
        self.aspect_ratio.map_or(PhysicalSize::default(), |(w, h)| {
            PhysicalSize::new(LayoutUnit::from_f32_floor(w), LayoutUnit::from_f32_floor(h))
        })
    }

    /// The CSS default sizing algorithm against `default_size`.
    pub fn concrete_object_size(&self, default_size: PhysicalSize) -> PhysicalSize {
        let ratio = self.aspect_ratio_size();
        let has_ratio = !ratio.is_empty();
        match (self.natural_width, self.natural_height) {
            (Some(w), Some(h)) => {
                PhysicalSize::new(LayoutUnit::from_f32_floor(w), LayoutUnit::from_f32_floor(h))
            }
            (Some(w), None) => {
                let width = LayoutUnit::from_f32_floor(w);
                let height = if has_ratio {
                    width.mul_div(ratio.height, ratio.width)
                } else {
                    default_size.height
                };
                PhysicalSize::new(width, height)
            }
            (None, Some(h)) => {
                let height = LayoutUnit::from_f32_floor(h);
                let width = if has_ratio {
                    height.mul_div(ratio.width, ratio.height)
                } else {
                    default_size.width
                };
                PhysicalSize::new(width, height)
            }
            (None, None) if has_ratio => {
                default_size.fit_to_aspect_ratio(ratio, AspectRatioFit::Shrink)
            }
            (None, None) => default_size,
        }
    }
}

/// Which border edges fully hide the background beneath them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObscuringEdges {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl ObscuringEdges {
    /// Opaque, present, continuous border sides obscure the background.
    pub fn from_sides(top: &BorderSide, right: &BorderSide, bottom: &BorderSide, left: &BorderSide) -> Self {
        let obscures = |side: &BorderSide| {
            side.used_width(0.0) > 0.0
                && side.color.is_opaque()
                && !matches!(
                    side.style,
                    BorderStyle::Dotted | BorderStyle::Dashed | BorderStyle::Double
                )
        };
        Self {
            top: obscures(top),
            right: obscures(right),
            bottom: obscures(bottom),
            left: obscures(left),
        }
    }
}

/// Box-level inputs for background geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BackgroundPaintContext {
    pub border: PhysicalBoxStrut,
    pub padding: PhysicalBoxStrut,
    pub obscuring_edges: ObscuringEdges,
    /// Set for border images and other cases where the border can't drive
    /// dest rect snapping.
    pub disallow_border_derived_adjustment: bool,
    /// Viewport in the box's local space, for `fixed` attachment.
    pub viewport_rect: PhysicalRect,
    /// Offset of the box within a shared background (table cells).
    pub offset_in_background: PhysicalOffset,
    /// Scrollable contents rect relative to the border box, for `local`
    /// attachment on a scroll container.
    pub scrolled_contents_rect: Option<PhysicalRect>,
}

/// Snapped and unsnapped versions of the same outsets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct SnappedAndUnsnappedOutsets {
    snapped: PhysicalBoxStrut,
    unsnapped: PhysicalBoxStrut,
}

impl BackgroundPaintContext {
    /// Outsets from `dest_rect` to the pixel-snapped inner border edge of
    /// `positioning_area`.
    fn inner_border_outsets(
        &self,
        dest_rect: &PhysicalRect,
        positioning_area: &PhysicalRect,
    ) -> PhysicalBoxStrut {
        let mut inner = PhysicalRect::from(positioning_area.pixel_snapped());
        inner.contract(&self.border);
        PhysicalBoxStrut::new(
            inner.y() - dest_rect.y(),
            dest_rect.right() - inner.right(),
            dest_rect.bottom() - inner.bottom(),
            inner.x() - dest_rect.x(),
        )
    }

    fn obscured_border_outsets(
        &self,
        dest_rect: &PhysicalRect,
        positioning_area: &PhysicalRect,
    ) -> SnappedAndUnsnappedOutsets {
        let inner = self.inner_border_outsets(dest_rect, positioning_area);
        let edges = self.obscuring_edges;
        let mut adjust = SnappedAndUnsnappedOutsets::default();
        if edges.top {
            adjust.snapped.top = inner.top;
            adjust.unsnapped.top = self.border.top;
        }
        if edges.right {
            adjust.snapped.right = inner.right;
            adjust.unsnapped.right = self.border.right;
        }
        if edges.bottom {
            adjust.snapped.bottom = inner.bottom;
            adjust.unsnapped.bottom = self.border.bottom;
        }
        if edges.left {
            adjust.snapped.left = inner.left;
            adjust.unsnapped.left = self.border.left;
        }
        adjust
    }

    fn should_use_fixed_attachment(&self, layer: &FillLayer) -> bool {
        layer.attachment == FillAttachment::Fixed
    }

    fn normal_positioning_area(&self, layer: &FillLayer, paint_rect: &PhysicalRect) -> PhysicalRect {
        match self.scrolled_contents_rect {
            Some(contents) if layer.attachment == FillAttachment::Local => {
                // The contents rect starts at the padding box; positioning
                // areas are measured from the border box.
                let mut area = contents.translated(paint_rect.offset);
                area.expand(&self.border);
                area
            }
            _ => *paint_rect,
        }
    }

    fn offset_in_background(&self, layer: &FillLayer) -> PhysicalOffset {
        if self.should_use_fixed_attachment(layer) {
            return PhysicalOffset::default();
        }
        self.offset_in_background
    }
}

/// Where and how to tile one background layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BackgroundGeometry {
    /// Pixel-snapped destination rect to paint into.
    pub snapped_dest_rect: PhysicalRect,
    /// Destination rect before snapping.
    pub unsnapped_dest_rect: PhysicalRect,
    pub tile_size: PhysicalSize,
    /// Offset into the first tile, before wrapping by [`Self::compute_phase`].
    pub phase: PhysicalOffset,
    /// Gap between tiles for `space`.
    pub space_size: PhysicalSize,
}

fn space_between_tiles(area_size: LayoutUnit, tile_size: LayoutUnit) -> LayoutUnit {
    let number_of_tiles = (area_size / tile_size).to_int();
    if number_of_tiles > 1 {
        return (area_size - tile_size * number_of_tiles) / (number_of_tiles - 1);
    }
    LayoutUnit::from_int(-1)
}

fn rounded_tile_size(area_size: LayoutUnit, tile_size: LayoutUnit) -> LayoutUnit {
    let tiles = (area_size / tile_size).round().max(1);
    area_size / tiles
}

fn tile_phase(position: LayoutUnit, tile_extent: LayoutUnit) -> LayoutUnit {
    if tile_extent == LayoutUnit::ZERO {
        return LayoutUnit::ZERO;
    }
    tile_extent - int_mod(position, tile_extent)
}

fn width_for_ratio(height: LayoutUnit, ratio: PhysicalSize) -> LayoutUnit {
    let width = height.mul_div(ratio.width, ratio.height);
    if ratio.width >= LayoutUnit::from_int(1) && width < LayoutUnit::from_int(1) {
        return LayoutUnit::from_int(1);
    }
    width
}

fn height_for_ratio(width: LayoutUnit, ratio: PhysicalSize) -> LayoutUnit {
    let height = width.mul_div(ratio.height, ratio.width);
    if ratio.height >= LayoutUnit::from_int(1) && height < LayoutUnit::from_int(1) {
        return LayoutUnit::from_int(1);
    }
    height
}

fn resolve_position(
    position_edge: PositionEdge,
    position: Length,
    available: LayoutUnit,
    offset: LayoutUnit,
) -> LayoutUnit {
    let edge_relative = minimum_value_for_length(position, available);
    let absolute = match position_edge {
        PositionEdge::Start => edge_relative,
        PositionEdge::End => available - edge_relative,
    };
    absolute - offset
}

fn resolve_x_position(layer: &FillLayer, available_width: LayoutUnit, offset: LayoutUnit) -> LayoutUnit {
    resolve_position(layer.position_x.edge, layer.position_x.offset, available_width, offset)
}

fn resolve_y_position(layer: &FillLayer, available_height: LayoutUnit, offset: LayoutUnit) -> LayoutUnit {
    resolve_position(layer.position_y.edge, layer.position_y.offset, available_height, offset)
}

impl BackgroundGeometry {
    /// Compute geometry for `layer` painted into `paint_rect`, the border
    /// box at its paint offset.
    pub fn calculate(
        layer: &FillLayer,
        context: &BackgroundPaintContext,
        image: &ImageSizingInfo,
        paint_rect: PhysicalRect,
    ) -> Self {
        let mut geometry = Self::default();
        let fixed = context.should_use_fixed_attachment(layer);

        let mut unsnapped_positioning_area;
        let snapped_positioning_area;
        let mut unsnapped_box_offset = PhysicalOffset::default();
        let mut snapped_box_offset = PhysicalOffset::default();

        if fixed {
            unsnapped_positioning_area = context.viewport_rect;
            snapped_positioning_area = unsnapped_positioning_area;
            geometry.unsnapped_dest_rect = unsnapped_positioning_area;
            geometry.snapped_dest_rect = unsnapped_positioning_area;
        } else {
            unsnapped_positioning_area = context.normal_positioning_area(layer, &paint_rect);
            geometry.unsnapped_dest_rect = paint_rect;
            let adjusted = geometry.adjust_positioning_area(layer, context, &mut unsnapped_positioning_area);
            snapped_positioning_area = adjusted.0;
            unsnapped_box_offset = adjusted.1;
            snapped_box_offset = adjusted.2;
        }

        geometry.calculate_fill_tile_size(
            layer,
            image,
            unsnapped_positioning_area.size,
            snapped_positioning_area.size,
        );

        geometry.calculate_repeat_and_position(
            layer,
            context.offset_in_background(layer),
            unsnapped_positioning_area.size,
            snapped_positioning_area.size,
            unsnapped_box_offset,
            snapped_box_offset,
        );

        if fixed {
            let adjustment =
                (paint_rect.offset - geometry.unsnapped_dest_rect.offset).clamp_negative_to_zero();
            geometry.phase += adjustment;
        }

        geometry.unsnapped_dest_rect.intersect(&paint_rect);
        geometry.snapped_dest_rect.intersect(&paint_rect);
        geometry.snapped_dest_rect = PhysicalRect::from(geometry.snapped_dest_rect.pixel_snapped());
        trace!(?geometry, "Background geometry");
        geometry
    }

    /// Phase wrapped to at most one tile plus spacing per axis.
    pub fn compute_phase(&self) -> PhysicalOffset {
        let step = self.tile_size + self.space_size;
        PhysicalOffset::new(
            int_mod(-self.phase.left, step.width),
            int_mod(-self.phase.top, step.height),
        )
    }

    fn dest_rect_adjustments(
        &self,
        layer: &FillLayer,
        context: &BackgroundPaintContext,
        positioning_area: &PhysicalRect,
        disallow_border_derived_adjustment: bool,
    ) -> SnappedAndUnsnappedOutsets {
        let mut adjust = SnappedAndUnsnappedOutsets::default();
        match layer.clip {
            FillClip::ContentBox if !context.padding.is_zero() => {
                adjust.unsnapped = context.padding + context.border;
                adjust.snapped = adjust.unsnapped;
            }
            FillClip::ContentBox | FillClip::PaddingBox => {
                adjust.unsnapped = context.border;
                adjust.snapped = if disallow_border_derived_adjustment {
                    adjust.unsnapped
                } else {
                    context.inner_border_outsets(&self.unsnapped_dest_rect, positioning_area)
                };
            }
            FillClip::BorderBox => {
                if !disallow_border_derived_adjustment {
                    adjust = context.obscured_border_outsets(&self.unsnapped_dest_rect, positioning_area);
                }
            }
            FillClip::Text => {}
        }
        adjust
    }

    fn positioning_area_adjustments(
        &self,
        layer: &FillLayer,
        context: &BackgroundPaintContext,
        positioning_area: &PhysicalRect,
        disallow_border_derived_adjustment: bool,
    ) -> SnappedAndUnsnappedOutsets {
        let mut outset = SnappedAndUnsnappedOutsets::default();
        match layer.origin {
            FillBox::ContentBox if !context.padding.is_zero() => {
                outset.unsnapped = context.padding + context.border;
                outset.snapped = outset.unsnapped;
            }
            FillBox::ContentBox | FillBox::PaddingBox => {
                outset.unsnapped = context.border;
                outset.snapped = if disallow_border_derived_adjustment {
                    outset.unsnapped
                } else {
                    context.inner_border_outsets(positioning_area, positioning_area)
                };
            }
            FillBox::BorderBox => {}
        }
        outset
    }

    /// Shrink the dest rect and positioning area to the boxes `layer`
    /// names. Returns the snapped area and the unsnapped and snapped
    /// offsets of the area from the dest rect.
    fn adjust_positioning_area(
        &mut self,
        layer: &FillLayer,
        context: &BackgroundPaintContext,
        unsnapped_positioning_area: &mut PhysicalRect,
    ) -> (PhysicalRect, PhysicalOffset, PhysicalOffset) {
        let disallow = layer.composite != CompositeOperator::SourceOver
            || context.disallow_border_derived_adjustment;

        let dest_adjust =
            self.dest_rect_adjustments(layer, context, unsnapped_positioning_area, disallow);
        let box_outset =
            self.positioning_area_adjustments(layer, context, unsnapped_positioning_area, disallow);

        let unsnapped_box_offset = box_outset.unsnapped.offset() - dest_adjust.unsnapped.offset();
        let snapped_box_offset = box_outset.snapped.offset() - dest_adjust.snapped.offset();

        let mut snapped_dest = self.unsnapped_dest_rect;
        snapped_dest.contract(&dest_adjust.snapped);
        self.snapped_dest_rect = PhysicalRect::from(snapped_dest.pixel_snapped());
        self.snapped_dest_rect.size = self.snapped_dest_rect.size.clamp_negative_to_zero();
        self.unsnapped_dest_rect.contract(&dest_adjust.unsnapped);
        self.unsnapped_dest_rect.size = self.unsnapped_dest_rect.size.clamp_negative_to_zero();

        let mut snapped_area = *unsnapped_positioning_area;
        snapped_area.contract(&box_outset.snapped);
        let mut snapped_area = PhysicalRect::from(snapped_area.pixel_snapped());
        snapped_area.size = snapped_area.size.clamp_negative_to_zero();
        unsnapped_positioning_area.contract(&box_outset.unsnapped);
        unsnapped_positioning_area.size = unsnapped_positioning_area.size.clamp_negative_to_zero();

        (snapped_area, unsnapped_box_offset, snapped_box_offset)
    }

    fn calculate_fill_tile_size(
        &mut self,
        layer: &FillLayer,
        image: &ImageSizingInfo,
        unsnapped_area_size: PhysicalSize,
        snapped_area_size: PhysicalSize,
    ) {
        let ratio = image.aspect_ratio_size();
        // Generated images tile against the snapped area.
        let area_size = if image.has_intrinsic_size() {
            unsnapped_area_size
        } else {
            snapped_area_size
        };

        match layer.size {
            FillSize::Size(width, height) => {
                self.tile_size = area_size;
                if !width.is_auto() {
                    self.tile_size.width = minimum_value_for_length(width, area_size.width);
                }
                if !height.is_auto() {
                    self.tile_size.height = minimum_value_for_length(height, area_size.height);
                }

                match (width.is_auto(), height.is_auto()) {
                    (true, false) => {
                        self.tile_size.width = if !ratio.is_empty() {
                            width_for_ratio(self.tile_size.height, ratio)
                        } else if let Some(w) = image.natural_width {
                            LayoutUnit::from_f32_floor(w)
                        } else {
                            area_size.width
                        };
                    }
                    (false, true) => {
                        self.tile_size.height = if !ratio.is_empty() {
                            height_for_ratio(self.tile_size.width, ratio)
                        } else if let Some(h) = image.natural_height {
                            LayoutUnit::from_f32_floor(h)
                        } else {
                            area_size.height
                        };
                    }
                    (true, true) => self.tile_size = image.concrete_object_size(area_size),
                    (false, false) => {}
                }
                self.tile_size = self.tile_size.clamp_negative_to_zero();
            }
            FillSize::Cover | FillSize::Contain => {
                if ratio.is_empty() {
                    self.tile_size = snapped_area_size;
                    return;
                }
                let cover = layer.size == FillSize::Cover;
                let fit = if cover {
                    AspectRatioFit::Grow
                } else {
                    AspectRatioFit::Shrink
                };
                self.tile_size = snapped_area_size.fit_to_aspect_ratio(ratio, fit);
                let one = LayoutUnit::from_int(1);
                // Snap the dependent axis so the image edge doesn't bleed.
                if self.tile_size.width != snapped_area_size.width {
                    self.tile_size.width = if cover {
                        self.tile_size.width.max(one)
                    } else {
                        LayoutUnit::from_int(self.tile_size.width.round().max(1))
                    };
                }
                if self.tile_size.height != snapped_area_size.height {
                    self.tile_size.height = if cover {
                        self.tile_size.height.max(one)
                    } else {
                        LayoutUnit::from_int(self.tile_size.height.round().max(1))
                    };
                }
            }
        }
    }

    fn set_repeat_x(&mut self, x_offset: LayoutUnit) {
        self.phase.left = tile_phase(x_offset, self.tile_size.width);
        self.space_size.width = LayoutUnit::ZERO;
    }

    fn set_repeat_y(&mut self, y_offset: LayoutUnit) {
        self.phase.top = tile_phase(y_offset, self.tile_size.height);
        self.space_size.height = LayoutUnit::ZERO;
    }

    fn set_space_x(&mut self, space: LayoutUnit, extra_offset: LayoutUnit) {
        self.space_size.width = space;
        // Start a full tile at the edge of the paint area.
        self.phase.left = tile_phase(extra_offset, self.tile_size.width + space);
    }

    fn set_space_y(&mut self, space: LayoutUnit, extra_offset: LayoutUnit) {
        self.space_size.height = space;
        self.phase.top = tile_phase(extra_offset, self.tile_size.height + space);
    }

    fn set_no_repeat_x(&mut self, x_offset: LayoutUnit, snapped_x_offset: LayoutUnit) {
        if x_offset > LayoutUnit::ZERO {
            // Move the dest rect; the image stays put over it.
            self.unsnapped_dest_rect.offset.left += x_offset;
            self.snapped_dest_rect.offset.left =
                LayoutUnit::from_int(self.unsnapped_dest_rect.x().round());
            self.unsnapped_dest_rect.size.width = self.tile_size.width;
            self.snapped_dest_rect.size.width = self.tile_size.width;
            self.phase.left = LayoutUnit::ZERO;
        } else {
            // Paint only the visible part of the shifted tile.
            self.phase.left = -x_offset;
            self.unsnapped_dest_rect.size.width = self.tile_size.width + x_offset;
            self.snapped_dest_rect.size.width = self.tile_size.width + snapped_x_offset;
        }
        self.space_size.width = LayoutUnit::ZERO;
    }

    fn set_no_repeat_y(&mut self, y_offset: LayoutUnit, snapped_y_offset: LayoutUnit) {
        if y_offset > LayoutUnit::ZERO {
            self.unsnapped_dest_rect.offset.top += y_offset;
            self.snapped_dest_rect.offset.top =
                LayoutUnit::from_int(self.unsnapped_dest_rect.y().round());
            self.unsnapped_dest_rect.size.height = self.tile_size.height;
            self.snapped_dest_rect.size.height = self.tile_size.height;
            self.phase.top = LayoutUnit::ZERO;
        } else {
            self.phase.top = -y_offset;
            self.unsnapped_dest_rect.size.height = self.tile_size.height + y_offset;
            self.snapped_dest_rect.size.height = self.tile_size.height + snapped_y_offset;
        }
        self.space_size.height = LayoutUnit::ZERO;
    }

    fn calculate_repeat_and_position(
        &mut self,
        layer: &FillLayer,
        offset_in_background: PhysicalOffset,
        unsnapped_area_size: PhysicalSize,
        snapped_area_size: PhysicalSize,
        unsnapped_box_offset: PhysicalOffset,
        snapped_box_offset: PhysicalOffset,
    ) {
        let mut repeat_x = layer.repeat_x;
        let mut repeat_y = layer.repeat_y;

        // A zero tile cannot be rounded or spaced.
        if self.tile_size.width <= LayoutUnit::ZERO
            && matches!(repeat_x, FillRepeat::Round | FillRepeat::Space)
        {
            debug!(?repeat_x, "zero-width background tile, using no-repeat");
            repeat_x = FillRepeat::NoRepeat;
        }
        if self.tile_size.height <= LayoutUnit::ZERO
            && matches!(repeat_y, FillRepeat::Round | FillRepeat::Space)
        {
            debug!(?repeat_y, "zero-height background tile, using no-repeat");
            repeat_y = FillRepeat::NoRepeat;
        }

        let unsnapped_available_width = unsnapped_area_size.width - self.tile_size.width;
        let unsnapped_available_height = unsnapped_area_size.height - self.tile_size.height;
        let snapped_available_width = snapped_area_size.width - self.tile_size.width;
        let snapped_available_height = snapped_area_size.height - self.tile_size.height;

        if repeat_x == FillRepeat::Round
            && snapped_area_size.width > LayoutUnit::ZERO
            && self.tile_size.width > LayoutUnit::ZERO
        {
            let rounded_width = rounded_tile_size(snapped_area_size.width, self.tile_size.width);
            if layer.has_auto_height() && repeat_y != FillRepeat::Round {
                self.tile_size.height = height_for_ratio(rounded_width, self.tile_size);
            }
            self.tile_size.width = rounded_width;
            let x_offset =
                resolve_x_position(layer, snapped_available_width, offset_in_background.left);
            self.phase.left = tile_phase(x_offset + unsnapped_box_offset.left, self.tile_size.width);
            self.space_size = PhysicalSize::default();
        }

        if repeat_y == FillRepeat::Round
            && snapped_area_size.height > LayoutUnit::ZERO
            && self.tile_size.height > LayoutUnit::ZERO
        {
            let rounded_height = rounded_tile_size(snapped_area_size.height, self.tile_size.height);
            if layer.has_auto_width() && repeat_x != FillRepeat::Round {
                self.tile_size.width = width_for_ratio(rounded_height, self.tile_size);
            }
            self.tile_size.height = rounded_height;
            let y_offset =
                resolve_y_position(layer, snapped_available_height, offset_in_background.top);
            self.phase.top = tile_phase(y_offset + unsnapped_box_offset.top, self.tile_size.height);
            self.space_size = PhysicalSize::default();
        }

        if repeat_x == FillRepeat::Repeat {
            let x_offset =
                resolve_x_position(layer, unsnapped_available_width, offset_in_background.left);
            self.set_repeat_x(unsnapped_box_offset.left + x_offset);
        } else if repeat_x == FillRepeat::Space && self.tile_size.width > LayoutUnit::ZERO {
            let space = space_between_tiles(snapped_area_size.width, self.tile_size.width);
            if space >= LayoutUnit::ZERO {
                self.set_space_x(space, snapped_box_offset.left);
            } else {
                debug!(tile = %self.tile_size.width, "background-repeat: space fits one tile, using no-repeat");
                repeat_x = FillRepeat::NoRepeat;
            }
        }
        if repeat_x == FillRepeat::NoRepeat {
            let x_offset =
                resolve_x_position(layer, unsnapped_available_width, offset_in_background.left);
            let snapped_x_offset =
                resolve_x_position(layer, snapped_available_width, offset_in_background.left);
            self.set_no_repeat_x(
                unsnapped_box_offset.left + x_offset,
                snapped_box_offset.left + snapped_x_offset,
            );
        }

        if repeat_y == FillRepeat::Repeat {
            let y_offset =
                resolve_y_position(layer, unsnapped_available_height, offset_in_background.top);
            self.set_repeat_y(unsnapped_box_offset.top + y_offset);
        } else if repeat_y == FillRepeat::Space && self.tile_size.height > LayoutUnit::ZERO {
            let space = space_between_tiles(snapped_area_size.height, self.tile_size.height);
            if space >= LayoutUnit::ZERO {
                self.set_space_y(space, snapped_box_offset.top);
            } else {
                debug!(tile = %self.tile_size.height, "background-repeat: space fits one tile, using no-repeat");
                repeat_y = FillRepeat::NoRepeat;
            }
        }
        if repeat_y == FillRepeat::NoRepeat {
            let y_offset =
                resolve_y_position(layer, unsnapped_available_height, offset_in_background.top);
            let snapped_y_offset =
                resolve_y_position(layer, snapped_available_height, offset_in_background.top);
            self.set_no_repeat_y(
                unsnapped_box_offset.top + y_offset,
                snapped_box_offset.top + snapped_y_offset,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustkit_css::{Color, FillPosition};

    fn layer(css_size: FillSize, repeat: FillRepeat) -> FillLayer {
        FillLayer {
            size: css_size,
            repeat_x: repeat,
            repeat_y: repeat,
            origin: FillBox::BorderBox,
            ..Default::default()
        }
    }

    fn px(value: f32) -> Length {
        Length::Px(value)
    }

    fn lu(value: i32) -> LayoutUnit {
        LayoutUnit::from_int(value)
    }

    #[test]
    fn test_space_distributes_gaps() {
        let layer = layer(FillSize::Size(px(100.0), px(100.0)), FillRepeat::Space);
        let geometry = BackgroundGeometry::calculate(
            &layer,
            &BackgroundPaintContext::default(),
            &ImageSizingInfo::from_natural_size(100.0, 100.0),
            PhysicalRect::from_ints(0, 0, 350, 100),
        );
        assert_eq!(geometry.tile_size, PhysicalSize::from_ints(100, 100));
        assert_eq!(geometry.space_size.width, lu(25));
        assert_eq!(geometry.phase.left, lu(125));
        assert_eq!(geometry.compute_phase().left, LayoutUnit::ZERO);
        assert_eq!(geometry.snapped_dest_rect, PhysicalRect::from_ints(0, 0, 350, 100));
    }

    #[test]
    fn test_space_with_one_tile_falls_back_to_no_repeat() {
        let layer = layer(FillSize::Size(px(100.0), px(100.0)), FillRepeat::Space);
        let geometry = BackgroundGeometry::calculate(
            &layer,
            &BackgroundPaintContext::default(),
            &ImageSizingInfo::from_natural_size(100.0, 100.0),
            PhysicalRect::from_ints(0, 0, 150, 100),
        );
        assert_eq!(geometry.space_size, PhysicalSize::default());
        // No-repeat shrinks the dest rect to a single tile.
        assert_eq!(geometry.unsnapped_dest_rect.width(), lu(100));
    }

    #[test]
    fn test_space_exact_fit_has_zero_gap() {
        let layer = layer(FillSize::Size(px(50.0), px(50.0)), FillRepeat::Space);
        let geometry = BackgroundGeometry::calculate(
            &layer,
            &BackgroundPaintContext::default(),
            &ImageSizingInfo::from_natural_size(50.0, 50.0),
            PhysicalRect::from_ints(0, 0, 200, 100),
        );
        assert_eq!(geometry.space_size, PhysicalSize::default());
        assert_eq!(geometry.unsnapped_dest_rect.width(), lu(200));
    }

    #[test]
    fn test_zero_size_tile_falls_back_to_no_repeat() {
        for repeat in [FillRepeat::Space, FillRepeat::Round] {
            let layer = layer(FillSize::Size(px(0.0), px(100.0)), repeat);
            let geometry = BackgroundGeometry::calculate(
                &layer,
                &BackgroundPaintContext::default(),
                &ImageSizingInfo::from_natural_size(100.0, 100.0),
                PhysicalRect::from_ints(0, 0, 350, 100),
            );
            assert_eq!(geometry.tile_size.width, LayoutUnit::ZERO, "{repeat:?}");
            assert_eq!(geometry.space_size, PhysicalSize::default(), "{repeat:?}");
            assert_eq!(geometry.unsnapped_dest_rect.width(), LayoutUnit::ZERO, "{repeat:?}");
        }
    }

    #[test]
    fn test_cover_covers_positioning_area() {
        let layer = layer(FillSize::Cover, FillRepeat::NoRepeat);
        let geometry = BackgroundGeometry::calculate(
            &layer,
            &BackgroundPaintContext::default(),
            &ImageSizingInfo::from_natural_size(40.0, 20.0),
            PhysicalRect::from_ints(0, 0, 300, 200),
        );
        assert_eq!(geometry.tile_size, PhysicalSize::from_ints(400, 200));
    }

    #[test]
    fn test_contain_fits_and_rounds_dependent_axis() {
        let layer = layer(FillSize::Contain, FillRepeat::NoRepeat);
        let geometry = BackgroundGeometry::calculate(
            &layer,
            &BackgroundPaintContext::default(),
            &ImageSizingInfo::from_natural_size(30.0, 20.0),
            PhysicalRect::from_ints(0, 0, 100, 100),
        );
        // 100 * 20 / 30 = 66.67, rounded.
        assert_eq!(geometry.tile_size, PhysicalSize::from_ints(100, 67));
    }

    #[test]
    fn test_auto_size_uses_ratio_and_natural_size() {
        let image = ImageSizingInfo::from_natural_size(40.0, 20.0);
        let area = PhysicalRect::from_ints(0, 0, 300, 200);
        let ctx = BackgroundPaintContext::default();

        let auto = BackgroundGeometry::calculate(&layer(FillSize::default(), FillRepeat::Repeat), &ctx, &image, area);
        assert_eq!(auto.tile_size, PhysicalSize::from_ints(40, 20));

        let width_only = BackgroundGeometry::calculate(
            &layer(FillSize::Size(px(100.0), Length::Auto), FillRepeat::Repeat),
            &ctx,
            &image,
            area,
        );
        assert_eq!(width_only.tile_size, PhysicalSize::from_ints(100, 50));

        let percent = BackgroundGeometry::calculate(
            &layer(FillSize::Size(Length::Percent(50.0), Length::Percent(25.0)), FillRepeat::Repeat),
            &ctx,
            &image,
            area,
        );
        assert_eq!(percent.tile_size, PhysicalSize::from_ints(150, 50));
    }

    #[test]
    fn test_generated_image_fills_area() {
        let geometry = BackgroundGeometry::calculate(
            &layer(FillSize::default(), FillRepeat::Repeat),
            &BackgroundPaintContext::default(),
            &ImageSizingInfo::generated(),
            PhysicalRect::from_ints(0, 0, 120, 80),
        );
        assert_eq!(geometry.tile_size, PhysicalSize::from_ints(120, 80));
    }

    #[test]
    fn test_repeat_phase_tracks_position() {
        let mut layer = layer(FillSize::Size(px(40.0), px(40.0)), FillRepeat::Repeat);
        layer.position_x = FillPosition::start(px(10.0));
        layer.position_y = FillPosition::end(px(0.0));
        let geometry = BackgroundGeometry::calculate(
            &layer,
            &BackgroundPaintContext::default(),
            &ImageSizingInfo::from_natural_size(40.0, 40.0),
            PhysicalRect::from_ints(0, 0, 100, 100),
        );
        // x: 40 - (10 mod 40); y: bottom edge at 100 - 40 = 60, 40 - 20.
        assert_eq!(geometry.phase, PhysicalOffset::from_ints(30, 20));
        // The wrapped phase keeps the sign of the negated phase.
        assert_eq!(geometry.compute_phase(), PhysicalOffset::from_ints(-30, -20));
    }

    #[test]
    fn test_no_repeat_positive_offset_moves_dest_rect() {
        let mut layer = layer(FillSize::Size(px(20.0), px(20.0)), FillRepeat::NoRepeat);
        layer.position_x = FillPosition::start(px(30.0));
        layer.position_y = FillPosition::start(px(-5.0));
        let geometry = BackgroundGeometry::calculate(
            &layer,
            &BackgroundPaintContext::default(),
            &ImageSizingInfo::from_natural_size(20.0, 20.0),
            PhysicalRect::from_ints(0, 0, 100, 100),
        );
        assert_eq!(geometry.unsnapped_dest_rect, PhysicalRect::from_ints(30, 0, 20, 15));
        assert_eq!(geometry.phase, PhysicalOffset::from_ints(0, 5));
    }

    #[test]
    fn test_round_rescales_tiles() {
        let layer = layer(FillSize::Size(px(30.0), Length::Auto), FillRepeat::Round);
        let geometry = BackgroundGeometry::calculate(
            &layer,
            &BackgroundPaintContext::default(),
            &ImageSizingInfo::from_natural_size(30.0, 30.0),
            PhysicalRect::from_ints(0, 0, 100, 100),
        );
        // 100 / 30 rounds to 3 tiles of 33.33px on both axes.
        assert_eq!(geometry.tile_size.width, lu(100) / 3);
        assert_eq!(geometry.tile_size.height, lu(100) / 3);
    }

    #[test]
    fn test_padding_box_origin_uses_inner_border() {
        let mut layer = layer(FillSize::Size(px(10.0), px(10.0)), FillRepeat::Repeat);
        layer.origin = FillBox::PaddingBox;
        layer.clip = FillClip::PaddingBox;
        let ctx = BackgroundPaintContext {
            border: PhysicalBoxStrut::from_ints(5, 5, 5, 5),
            ..Default::default()
        };
        let geometry = BackgroundGeometry::calculate(
            &layer,
            &ctx,
            &ImageSizingInfo::from_natural_size(10.0, 10.0),
            PhysicalRect::from_ints(0, 0, 100, 100),
        );
        assert_eq!(geometry.snapped_dest_rect, PhysicalRect::from_ints(5, 5, 90, 90));
        assert_eq!(geometry.unsnapped_dest_rect, PhysicalRect::from_ints(5, 5, 90, 90));
    }

    #[test]
    fn test_obscuring_border_shrinks_border_box_dest() {
        let solid = BorderSide {
            width: px(4.0),
            style: BorderStyle::Solid,
            color: Color::from_rgb(0, 0, 0),
        };
        let dashed = BorderSide {
            style: BorderStyle::Dashed,
            ..solid
        };
        let ctx = BackgroundPaintContext {
            border: PhysicalBoxStrut::from_ints(4, 4, 4, 4),
            obscuring_edges: ObscuringEdges::from_sides(&solid, &dashed, &solid, &dashed),
            ..Default::default()
        };
        let geometry = BackgroundGeometry::calculate(
            &layer(FillSize::default(), FillRepeat::Repeat),
            &ctx,
            &ImageSizingInfo::generated(),
            PhysicalRect::from_ints(0, 0, 100, 100),
        );
        assert_eq!(geometry.unsnapped_dest_rect, PhysicalRect::from_ints(0, 4, 100, 92));
    }

    #[test]
    fn test_fixed_attachment_positions_against_viewport() {
        let mut layer = layer(FillSize::Size(px(50.0), px(50.0)), FillRepeat::Repeat);
        layer.attachment = FillAttachment::Fixed;
        let ctx = BackgroundPaintContext {
            viewport_rect: PhysicalRect::from_ints(-20, -30, 800, 600),
            ..Default::default()
        };
        let geometry = BackgroundGeometry::calculate(
            &layer,
            &ctx,
            &ImageSizingInfo::from_natural_size(50.0, 50.0),
            PhysicalRect::from_ints(0, 0, 100, 100),
        );
        assert_eq!(geometry.unsnapped_dest_rect, PhysicalRect::from_ints(0, 0, 100, 100));
        // Repeat phase 50, plus the dest rect's distance into the viewport.
        assert_eq!(geometry.phase, PhysicalOffset::from_ints(70, 80));
    }

    #[test]
    fn test_concrete_object_size() {
        let default = PhysicalSize::from_ints(200, 100);
        let width_only = ImageSizingInfo {
            natural_width: Some(50.0),
            natural_height: None,
            aspect_ratio: Some((2.0, 1.0)),
        };
        assert_eq!(width_only.concrete_object_size(default), PhysicalSize::from_ints(50, 25));
        let ratio_only = ImageSizingInfo {
            aspect_ratio: Some((1.0, 1.0)),
            ..Default::default()
        };
        assert_eq!(ratio_only.concrete_object_size(default), PhysicalSize::from_ints(100, 100));
        assert_eq!(ImageSizingInfo::generated().concrete_object_size(default), default);
    }
}
