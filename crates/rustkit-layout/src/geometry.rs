//! Physical, logical and integer geometry types.
//!
//! Physical types are in the top-left-origin space of a box's border box.
//! Logical types are in inline/block space of some writing mode, see
//! [`crate::writing_mode::WritingModeConverter`] for conversions.

use std::ops::{Add, AddAssign, Neg, Sub};

use crate::units::{snap_size_to_pixel, LayoutUnit};

// ==================== Physical ====================

/// A point or displacement in physical space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PhysicalOffset {
    pub left: LayoutUnit,
    pub top: LayoutUnit,
}

impl PhysicalOffset {
    pub const fn new(left: LayoutUnit, top: LayoutUnit) -> Self {
        Self { left, top }
    }

    pub fn from_ints(left: i32, top: i32) -> Self {
        Self::new(LayoutUnit::from_int(left), LayoutUnit::from_int(top))
    }

    pub fn clamp_negative_to_zero(self) -> Self {
        Self::new(
            self.left.clamp_negative_to_zero(),
            self.top.clamp_negative_to_zero(),
        )
    }

    pub fn to_floored_point(self) -> IntPoint {
        IntPoint::new(self.left.floor(), self.top.floor())
    }

    pub fn to_rounded_point(self) -> IntPoint {
        IntPoint::new(self.left.round(), self.top.round())
    }
}

impl Add for PhysicalOffset {
    type Output = PhysicalOffset;
    fn add(self, rhs: PhysicalOffset) -> PhysicalOffset {
        PhysicalOffset::new(self.left + rhs.left, self.top + rhs.top)
    }
}

impl AddAssign for PhysicalOffset {
    fn add_assign(&mut self, rhs: PhysicalOffset) {
        *self = *self + rhs;
    }
}

impl Sub for PhysicalOffset {
    type Output = PhysicalOffset;
    fn sub(self, rhs: PhysicalOffset) -> PhysicalOffset {
        PhysicalOffset::new(self.left - rhs.left, self.top - rhs.top)
    }
}

impl Neg for PhysicalOffset {
    type Output = PhysicalOffset;
    fn neg(self) -> PhysicalOffset {
        PhysicalOffset::new(-self.left, -self.top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PhysicalSize {
    pub width: LayoutUnit,
    pub height: LayoutUnit,
}

/// How [`PhysicalSize::fit_to_aspect_ratio`] resolves the free axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatioFit {
    /// Smallest size containing `self` (cover).
    Grow,
    /// Largest size inside `self` (contain).
    Shrink,
}

impl PhysicalSize {
    pub const fn new(width: LayoutUnit, height: LayoutUnit) -> Self {
        Self { width, height }
    }

    pub fn from_ints(width: i32, height: i32) -> Self {
        Self::new(LayoutUnit::from_int(width), LayoutUnit::from_int(height))
    }

    pub fn is_empty(&self) -> bool {
        self.width <= LayoutUnit::ZERO || self.height <= LayoutUnit::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.width == LayoutUnit::ZERO && self.height == LayoutUnit::ZERO
    }

    pub fn clamp_negative_to_zero(self) -> Self {
        Self::new(
            self.width.clamp_negative_to_zero(),
            self.height.clamp_negative_to_zero(),
        )
    }

    pub fn to_rounded_size(self) -> IntSize {
        IntSize::new(self.width.round(), self.height.round())
    }

    /// Scale `aspect_ratio` so that one axis matches `self`.
    pub fn fit_to_aspect_ratio(&self, aspect_ratio: PhysicalSize, fit: AspectRatioFit) -> Self {
        let width_scale = self.width.to_f32() / aspect_ratio.width.to_f32();
        let height_scale = self.height.to_f32() / aspect_ratio.height.to_f32();
        if (width_scale > height_scale) != (fit == AspectRatioFit::Grow) {
            return PhysicalSize::new(
                self.height.mul_div(aspect_ratio.width, aspect_ratio.height),
                self.height,
            );
        }
        PhysicalSize::new(
            self.width,
            self.width.mul_div(aspect_ratio.height, aspect_ratio.width),
        )
    }
}

impl Add for PhysicalSize {
    type Output = PhysicalSize;
    fn add(self, rhs: PhysicalSize) -> PhysicalSize {
        PhysicalSize::new(self.width + rhs.width, self.height + rhs.height)
    }
}

impl Sub for PhysicalSize {
    type Output = PhysicalSize;
    fn sub(self, rhs: PhysicalSize) -> PhysicalSize {
        PhysicalSize::new(self.width - rhs.width, self.height - rhs.height)
    }
}

/// Edge widths in physical space (border, padding, margin, scrollbars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PhysicalBoxStrut {
    pub top: LayoutUnit,
    pub right: LayoutUnit,
    pub bottom: LayoutUnit,
    pub left: LayoutUnit,
}

impl PhysicalBoxStrut {
    pub const fn new(
        top: LayoutUnit,
        right: LayoutUnit,
        bottom: LayoutUnit,
        left: LayoutUnit,
    ) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn from_ints(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self::new(
            LayoutUnit::from_int(top),
            LayoutUnit::from_int(right),
            LayoutUnit::from_int(bottom),
            LayoutUnit::from_int(left),
        )
    }

    pub fn horizontal_sum(&self) -> LayoutUnit {
        self.left + self.right
    }

    pub fn vertical_sum(&self) -> LayoutUnit {
        self.top + self.bottom
    }

    /// Offset of the inner box's top-left corner.
    pub fn offset(&self) -> PhysicalOffset {
        PhysicalOffset::new(self.left, self.top)
    }

    pub fn is_zero(&self) -> bool {
        *self == PhysicalBoxStrut::default()
    }

    /// Grow every side by `d`.
    pub fn inflate(self, d: LayoutUnit) -> Self {
        Self::new(self.top + d, self.right + d, self.bottom + d, self.left + d)
    }
}

impl Add for PhysicalBoxStrut {
    type Output = PhysicalBoxStrut;
    fn add(self, rhs: PhysicalBoxStrut) -> PhysicalBoxStrut {
        PhysicalBoxStrut::new(
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
            self.left + rhs.left,
        )
    }
}

impl Sub for PhysicalBoxStrut {
    type Output = PhysicalBoxStrut;
    fn sub(self, rhs: PhysicalBoxStrut) -> PhysicalBoxStrut {
        PhysicalBoxStrut::new(
            self.top - rhs.top,
            self.right - rhs.right,
            self.bottom - rhs.bottom,
            self.left - rhs.left,
        )
    }
}

impl Neg for PhysicalBoxStrut {
    type Output = PhysicalBoxStrut;
    fn neg(self) -> PhysicalBoxStrut {
        PhysicalBoxStrut::new(-self.top, -self.right, -self.bottom, -self.left)
    }
}

/// A rectangle in physical space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PhysicalRect {
    pub offset: PhysicalOffset,
    pub size: PhysicalSize,
}

impl PhysicalRect {
    pub const fn new(offset: PhysicalOffset, size: PhysicalSize) -> Self {
        Self { offset, size }
    }

    pub fn from_ints(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(
            PhysicalOffset::from_ints(x, y),
            PhysicalSize::from_ints(width, height),
        )
    }

    /// Large enough to never clip, with room to move and unite without saturating.
    pub fn infinite() -> Self {
        Self::new(
            PhysicalOffset::new(
                LayoutUnit::from_raw(i32::MIN / 2),
                LayoutUnit::from_raw(i32::MIN / 2),
            ),
            PhysicalSize::new(LayoutUnit::MAX, LayoutUnit::MAX),
        )
    }

    pub fn x(&self) -> LayoutUnit {
        self.offset.left
    }

    pub fn y(&self) -> LayoutUnit {
        self.offset.top
    }

    pub fn width(&self) -> LayoutUnit {
        self.size.width
    }

    pub fn height(&self) -> LayoutUnit {
        self.size.height
    }

    pub fn right(&self) -> LayoutUnit {
        self.offset.left + self.size.width
    }

    pub fn bottom(&self) -> LayoutUnit {
        self.offset.top + self.size.height
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    pub fn contains(&self, other: &PhysicalRect) -> bool {
        self.x() <= other.x()
            && self.y() <= other.y()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn contains_point(&self, point: PhysicalOffset) -> bool {
        point.left >= self.x()
            && point.left < self.right()
            && point.top >= self.y()
            && point.top < self.bottom()
    }

    /// Union that ignores empty operands.
    pub fn unite(&mut self, other: &PhysicalRect) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        self.unite_even_if_empty(other);
    }

    pub fn unite_even_if_empty(&mut self, other: &PhysicalRect) {
        let left = self.x().min(other.x());
        let top = self.y().min(other.y());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        *self = PhysicalRect::new(
            PhysicalOffset::new(left, top),
            PhysicalSize::new(right - left, bottom - top),
        );
    }

    /// Intersection; a disjoint result keeps the corner and becomes empty.
    pub fn intersect(&mut self, other: &PhysicalRect) {
        let left = self.x().max(other.x());
        let top = self.y().max(other.y());
        let mut right = self.right().min(other.right());
        let mut bottom = self.bottom().min(other.bottom());
        if left >= right || top >= bottom {
            right = left;
            bottom = top;
        }
        *self = PhysicalRect::new(
            PhysicalOffset::new(left, top),
            PhysicalSize::new(right - left, bottom - top),
        );
    }

    pub fn move_by(&mut self, offset: PhysicalOffset) {
        self.offset += offset;
    }

    pub fn translated(mut self, offset: PhysicalOffset) -> Self {
        self.move_by(offset);
        self
    }

    /// Grow outward by `strut`.
    pub fn expand(&mut self, strut: &PhysicalBoxStrut) {
        self.expand_edges(strut.top, strut.right, strut.bottom, strut.left);
    }

    pub fn expand_edges(
        &mut self,
        top: LayoutUnit,
        right: LayoutUnit,
        bottom: LayoutUnit,
        left: LayoutUnit,
    ) {
        self.offset.left -= left;
        self.offset.top -= top;
        self.size.width += left + right;
        self.size.height += top + bottom;
    }

    /// Shrink inward by `strut`.
    pub fn contract(&mut self, strut: &PhysicalBoxStrut) {
        self.expand(&-*strut);
    }

    pub fn inflate(&mut self, d: LayoutUnit) {
        self.expand_edges(d, d, d, d);
    }

    /// Snap edges to pixels so adjacent boxes never overlap or gap.
    pub fn pixel_snapped(&self) -> IntRect {
        IntRect::new(
            self.x().round(),
            self.y().round(),
            snap_size_to_pixel(self.width(), self.x()),
            snap_size_to_pixel(self.height(), self.y()),
        )
    }

    pub fn to_enclosing_int_rect(&self) -> IntRect {
        let left = self.x().floor();
        let top = self.y().floor();
        IntRect::new(
            left,
            top,
            self.right().ceil() - left,
            self.bottom().ceil() - top,
        )
    }
}

impl From<IntRect> for PhysicalRect {
    fn from(rect: IntRect) -> Self {
        PhysicalRect::from_ints(rect.x, rect.y, rect.width, rect.height)
    }
}

// ==================== Logical ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct LogicalOffset {
    pub inline_offset: LayoutUnit,
    pub block_offset: LayoutUnit,
}

impl LogicalOffset {
    pub const fn new(inline_offset: LayoutUnit, block_offset: LayoutUnit) -> Self {
        Self {
            inline_offset,
            block_offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct LogicalSize {
    pub inline_size: LayoutUnit,
    pub block_size: LayoutUnit,
}

impl LogicalSize {
    pub const fn new(inline_size: LayoutUnit, block_size: LayoutUnit) -> Self {
        Self {
            inline_size,
            block_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct LogicalRect {
    pub offset: LogicalOffset,
    pub size: LogicalSize,
}

impl LogicalRect {
    pub const fn new(offset: LogicalOffset, size: LogicalSize) -> Self {
        Self { offset, size }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct LogicalBoxStrut {
    pub inline_start: LayoutUnit,
    pub inline_end: LayoutUnit,
    pub block_start: LayoutUnit,
    pub block_end: LayoutUnit,
}

// ==================== Integer ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct IntPoint {
    pub x: i32,
    pub y: i32,
}

impl IntPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset_from_origin(self) -> IntVector {
        IntVector::new(self.x, self.y)
    }
}

impl Add<IntVector> for IntPoint {
    type Output = IntPoint;
    fn add(self, rhs: IntVector) -> IntPoint {
        IntPoint::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct IntVector {
    pub x: i32,
    pub y: i32,
}

impl IntVector {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for IntVector {
    type Output = IntVector;
    fn add(self, rhs: IntVector) -> IntVector {
        IntVector::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Neg for IntVector {
    type Output = IntVector;
    fn neg(self) -> IntVector {
        IntVector::new(self.x.saturating_neg(), self.y.saturating_neg())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct IntSize {
    pub width: i32,
    pub height: i32,
}

impl IntSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn set_to_max(&mut self, other: IntSize) {
        self.width = self.width.max(other.width);
        self.height = self.height.max(other.height);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct IntRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl IntRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> IntSize {
        IntSize::new(self.width, self.height)
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains_point(&self, point: IntPoint) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn offset(&mut self, dx: i32, dy: i32) {
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }

    /// Union that ignores empty operands.
    pub fn union(&self, other: &IntRect) -> IntRect {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        IntRect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}
