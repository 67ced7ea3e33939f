//! # RustKit CSS
//!
//! Computed style inputs for the RustKit geometry core.
//!
//! ## Design Goals
//!
//! 1. **Computed values only**: No cascade, the layout driver hands over resolved values
//! 2. **Geometry properties**: Writing mode, overflow, scrollbars, box edges and background layers
//! 3. **Fixture parsing**: Keyword parsers so tests can build styles from CSS text

use rustkit_common::RustKitError;
use smallvec::{smallvec, SmallVec};
use thiserror::Error;
use tracing::trace;

pub mod fill;

pub use fill::{
    parse_fill_attachment, parse_fill_clip, parse_fill_origin, parse_fill_repeat, parse_fill_size,
    parse_position_x, parse_position_y, CompositeOperator, FillAttachment, FillBox, FillClip,
    FillLayer, FillPosition, FillRepeat, FillSize, PositionEdge,
};

/// Errors that can occur in CSS operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CssError {
    #[error("Invalid value for {property}: {value}")]
    InvalidValue { property: String, value: String },

    #[error("Unsupported property: {0}")]
    UnsupportedProperty(String),
}

impl From<CssError> for RustKitError {
    fn from(err: CssError) -> Self {
        RustKitError::style_with_source("invalid style declaration", err)
    }
}

impl CssError {
    fn invalid(property: &str, value: &str) -> Self {
        CssError::InvalidValue {
            property: property.to_string(),
            value: value.to_string(),
        }
    }
}

/// A CSS color value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };
    pub const BLACK: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
        a: 1.0,
    };

    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Whether the color fully hides what is behind it.
    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// A CSS length value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Length {
    /// Pixels.
    Px(f32),
    /// Percentage of a reference length.
    Percent(f32),
    /// Auto.
    Auto,
    /// Zero.
    #[default]
    Zero,
}

impl Length {
    pub fn is_auto(self) -> bool {
        matches!(self, Length::Auto)
    }

    pub fn is_percent(self) -> bool {
        matches!(self, Length::Percent(_))
    }

    /// Resolve against a reference length, treating `auto` as zero.
    pub fn to_px(self, reference: f32) -> f32 {
        match self {
            Length::Px(px) => px,
            Length::Percent(pct) => pct / 100.0 * reference,
            Length::Auto | Length::Zero => 0.0,
        }
    }
}

// ==================== Writing Modes ====================

/// Writing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum WritingMode {
    #[default]
    HorizontalTb,
    VerticalRl,
    VerticalLr,
}

impl WritingMode {
    pub fn is_horizontal(self) -> bool {
        self == WritingMode::HorizontalTb
    }

    /// Blocks stack right to left.
    pub fn is_flipped_blocks(self) -> bool {
        self == WritingMode::VerticalRl
    }
}

/// Inline base direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn is_ltr(self) -> bool {
        self == Direction::Ltr
    }
}

// ==================== Overflow ====================

/// Overflow behavior per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Auto,
    Clip,
    /// Legacy alias of `auto` whose scrollbars take no layout space.
    Overlay,
}

impl Overflow {
    /// Values that make the box a scroll container.
    pub fn is_scroll_container_value(self) -> bool {
        matches!(
            self,
            Overflow::Hidden | Overflow::Scroll | Overflow::Auto | Overflow::Overlay
        )
    }

    /// Values the user can scroll with input devices.
    pub fn is_user_scrollable(self) -> bool {
        matches!(self, Overflow::Scroll | Overflow::Auto | Overflow::Overlay)
    }

    /// Check if content is clipped.
    pub fn clips_content(self) -> bool {
        !matches!(self, Overflow::Visible)
    }

    /// Computed values of an overflow-x/overflow-y pair.
    ///
    /// If one axis scrolls, `visible` computes to `auto` and `clip` to `hidden`
    /// on the other.
    pub fn compute_pair(x: Overflow, y: Overflow) -> (Overflow, Overflow) {
        let fixup = |value: Overflow, other: Overflow| {
            if !other.is_scroll_container_value() {
                return value;
            }
            match value {
                Overflow::Visible => Overflow::Auto,
                Overflow::Clip => Overflow::Hidden,
                v => v,
            }
        };
        (fixup(x, y), fixup(y, x))
    }
}

/// Scrollbar width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollbarWidth {
    #[default]
    Auto,
    Thin,
    None,
}

/// Scrollbar gutter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollbarGutter {
    #[default]
    Auto,
    Stable,
    /// `stable both-edges`.
    BothEdges,
}

impl ScrollbarGutter {
    pub fn is_stable(self) -> bool {
        !matches!(self, ScrollbarGutter::Auto)
    }

    pub fn is_both_edges(self) -> bool {
        self == ScrollbarGutter::BothEdges
    }
}

/// Thickness of a styled (`::-webkit-scrollbar`) scrollbar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CustomScrollbarStyle {
    /// Vertical scrollbar width in px.
    pub width: f32,
    /// Horizontal scrollbar height in px.
    pub height: f32,
}

/// Resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resize {
    #[default]
    None,
    Both,
    Horizontal,
    Vertical,
    Block,
    Inline,
}

/// Reference box for `overflow-clip-margin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualBox {
    BorderBox,
    #[default]
    PaddingBox,
    ContentBox,
}

/// `overflow-clip-margin` value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverflowClipMargin {
    pub reference_box: VisualBox,
    /// Non-negative margin in px.
    pub margin: f32,
}

impl OverflowClipMargin {
    /// The initial value (`padding-box 0`) clips exactly like no margin at all.
    pub fn has_effect(&self) -> bool {
        self.margin != 0.0 || self.reference_box != VisualBox::PaddingBox
    }
}

// ==================== Borders ====================

/// Border line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    None,
    Hidden,
    Solid,
    Dotted,
    Dashed,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

impl BorderStyle {
    /// Styles that paint a visible border.
    pub fn is_visible(self) -> bool {
        !matches!(self, BorderStyle::None | BorderStyle::Hidden)
    }
}

/// One side of a border.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BorderSide {
    pub width: Length,
    pub style: BorderStyle,
    pub color: Color,
}

impl BorderSide {
    /// Computed border width, zero when the style paints nothing.
    pub fn used_width(&self, reference: f32) -> f32 {
        if self.style.is_visible() {
            self.width.to_px(reference)
        } else {
            0.0
        }
    }
}

/// Computed style for a box, restricted to the properties geometry reads.
#[derive(Debug, Clone)]
pub struct ComputedStyle {
    pub writing_mode: WritingMode,
    pub direction: Direction,

    // Margin
    pub margin_top: Length,
    pub margin_right: Length,
    pub margin_bottom: Length,
    pub margin_left: Length,

    // Padding
    pub padding_top: Length,
    pub padding_right: Length,
    pub padding_bottom: Length,
    pub padding_left: Length,

    // Border
    pub border_top: BorderSide,
    pub border_right: BorderSide,
    pub border_bottom: BorderSide,
    pub border_left: BorderSide,

    // Overflow
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,
    pub overflow_clip_margin: Option<OverflowClipMargin>,

    // Scrolling
    pub scrollbar_width: ScrollbarWidth,
    pub scrollbar_gutter: ScrollbarGutter,
    pub custom_scrollbar: Option<CustomScrollbarStyle>,
    pub resize: Resize,

    // Background
    pub background_layers: SmallVec<[FillLayer; 1]>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            writing_mode: WritingMode::default(),
            direction: Direction::default(),
            margin_top: Length::Zero,
            margin_right: Length::Zero,
            margin_bottom: Length::Zero,
            margin_left: Length::Zero,
            padding_top: Length::Zero,
            padding_right: Length::Zero,
            padding_bottom: Length::Zero,
            padding_left: Length::Zero,
            border_top: BorderSide::default(),
            border_right: BorderSide::default(),
            border_bottom: BorderSide::default(),
            border_left: BorderSide::default(),
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
            overflow_clip_margin: None,
            scrollbar_width: ScrollbarWidth::Auto,
            scrollbar_gutter: ScrollbarGutter::Auto,
            custom_scrollbar: None,
            resize: Resize::None,
            background_layers: smallvec![FillLayer::default()],
        }
    }
}

impl ComputedStyle {
    /// Create default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a style from `property: value` declarations.
    pub fn from_declarations(css: &str) -> Result<Self, CssError> {
        let mut style = Self::new();
        for declaration in css.split(';') {
            let declaration = declaration.trim();
            if declaration.is_empty() {
                continue;
            }
            let (name, value) = declaration
                .split_once(':')
                .ok_or_else(|| CssError::invalid(declaration, ""))?;
            style.set_property(name.trim(), value.trim())?;
        }
        Ok(style)
    }

    pub fn is_horizontal_writing_mode(&self) -> bool {
        self.writing_mode.is_horizontal()
    }

    pub fn is_flipped_blocks_writing_mode(&self) -> bool {
        self.writing_mode.is_flipped_blocks()
    }

    pub fn is_left_to_right_direction(&self) -> bool {
        self.direction.is_ltr()
    }

    /// Either axis clips or scrolls.
    pub fn has_non_visible_overflow(&self) -> bool {
        self.overflow_x.clips_content() || self.overflow_y.clips_content()
    }

    /// Either axis makes the box a scroll container.
    pub fn is_scroll_container(&self) -> bool {
        self.overflow_x.is_scroll_container_value() || self.overflow_y.is_scroll_container_value()
    }

    /// Set all four border widths, giving them a solid style.
    pub fn set_border_widths(&mut self, top: f32, right: f32, bottom: f32, left: f32) {
        for (side, width) in [
            (&mut self.border_top, top),
            (&mut self.border_right, right),
            (&mut self.border_bottom, bottom),
            (&mut self.border_left, left),
        ] {
            side.width = Length::Px(width);
            if !side.style.is_visible() {
                side.style = BorderStyle::Solid;
            }
        }
    }

    /// Set all four paddings in px.
    pub fn set_padding(&mut self, top: f32, right: f32, bottom: f32, left: f32) {
        self.padding_top = Length::Px(top);
        self.padding_right = Length::Px(right);
        self.padding_bottom = Length::Px(bottom);
        self.padding_left = Length::Px(left);
    }

    /// The first background layer, created on demand.
    pub fn first_background_layer_mut(&mut self) -> &mut FillLayer {
        if self.background_layers.is_empty() {
            self.background_layers.push(FillLayer::default());
        }
        &mut self.background_layers[0]
    }

    /// Apply a single declaration.
    ///
    /// Background properties apply to the first layer. Overflow values are
    /// stored as computed pairs.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<(), CssError> {
        trace!(name, value, "set_property");
        let invalid = || CssError::invalid(name, value);
        match name {
            "writing-mode" => self.writing_mode = parse_writing_mode(value).ok_or_else(invalid)?,
            "direction" => self.direction = parse_direction(value).ok_or_else(invalid)?,
            "overflow" => {
                let mut parts = value.split_whitespace();
                let x = parts.next().and_then(parse_overflow).ok_or_else(invalid)?;
                let y = match parts.next() {
                    Some(part) => parse_overflow(part).ok_or_else(invalid)?,
                    None => x,
                };
                (self.overflow_x, self.overflow_y) = Overflow::compute_pair(x, y);
            }
            "overflow-x" => {
                let x = parse_overflow(value).ok_or_else(invalid)?;
                (self.overflow_x, self.overflow_y) = Overflow::compute_pair(x, self.overflow_y);
            }
            "overflow-y" => {
                let y = parse_overflow(value).ok_or_else(invalid)?;
                (self.overflow_x, self.overflow_y) = Overflow::compute_pair(self.overflow_x, y);
            }
            "overflow-clip-margin" => {
                self.overflow_clip_margin =
                    Some(parse_overflow_clip_margin(value).ok_or_else(invalid)?)
            }
            "scrollbar-width" => {
                self.scrollbar_width = parse_scrollbar_width(value).ok_or_else(invalid)?
            }
            "scrollbar-gutter" => {
                self.scrollbar_gutter = parse_scrollbar_gutter(value).ok_or_else(invalid)?
            }
            "resize" => self.resize = parse_resize(value).ok_or_else(invalid)?,
            "padding" => {
                let [t, r, b, l] = parse_edges(value).ok_or_else(invalid)?;
                self.padding_top = t;
                self.padding_right = r;
                self.padding_bottom = b;
                self.padding_left = l;
            }
            "padding-top" => self.padding_top = parse_length(value).ok_or_else(invalid)?,
            "padding-right" => self.padding_right = parse_length(value).ok_or_else(invalid)?,
            "padding-bottom" => self.padding_bottom = parse_length(value).ok_or_else(invalid)?,
            "padding-left" => self.padding_left = parse_length(value).ok_or_else(invalid)?,
            "margin" => {
                let [t, r, b, l] = parse_edges(value).ok_or_else(invalid)?;
                self.margin_top = t;
                self.margin_right = r;
                self.margin_bottom = b;
                self.margin_left = l;
            }
            "margin-top" => self.margin_top = parse_length(value).ok_or_else(invalid)?,
            "margin-right" => self.margin_right = parse_length(value).ok_or_else(invalid)?,
            "margin-bottom" => self.margin_bottom = parse_length(value).ok_or_else(invalid)?,
            "margin-left" => self.margin_left = parse_length(value).ok_or_else(invalid)?,
            "border-width" => {
                let [t, r, b, l] = parse_edges(value).ok_or_else(invalid)?;
                self.border_top.width = t;
                self.border_right.width = r;
                self.border_bottom.width = b;
                self.border_left.width = l;
            }
            "border-style" => {
                let style = parse_border_style(value).ok_or_else(invalid)?;
                self.border_top.style = style;
                self.border_right.style = style;
                self.border_bottom.style = style;
                self.border_left.style = style;
            }
            "border-color" => {
                let color = parse_color(value).ok_or_else(invalid)?;
                self.border_top.color = color;
                self.border_right.color = color;
                self.border_bottom.color = color;
                self.border_left.color = color;
            }
            "background-clip" => {
                self.first_background_layer_mut().clip = parse_fill_clip(value).ok_or_else(invalid)?
            }
            "background-origin" => {
                self.first_background_layer_mut().origin =
                    parse_fill_origin(value).ok_or_else(invalid)?
            }
            "background-repeat" => {
                let (x, y) = parse_fill_repeat(value).ok_or_else(invalid)?;
                let layer = self.first_background_layer_mut();
                layer.repeat_x = x;
                layer.repeat_y = y;
            }
            "background-size" => {
                self.first_background_layer_mut().size = parse_fill_size(value).ok_or_else(invalid)?
            }
            "background-attachment" => {
                self.first_background_layer_mut().attachment =
                    parse_fill_attachment(value).ok_or_else(invalid)?
            }
            "background-position-x" => {
                self.first_background_layer_mut().position_x =
                    parse_position_x(value).ok_or_else(invalid)?
            }
            "background-position-y" => {
                self.first_background_layer_mut().position_y =
                    parse_position_y(value).ok_or_else(invalid)?
            }
            _ => return Err(CssError::UnsupportedProperty(name.to_string())),
        }
        Ok(())
    }
}

/// Parse a color value.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();

    match value.to_lowercase().as_str() {
        "transparent" => return Some(Color::TRANSPARENT),
        "black" => return Some(Color::BLACK),
        "white" => return Some(Color::WHITE),
        "red" => return Some(Color::from_rgb(255, 0, 0)),
        "green" => return Some(Color::from_rgb(0, 128, 0)),
        "blue" => return Some(Color::from_rgb(0, 0, 255)),
        "gray" | "grey" => return Some(Color::from_rgb(128, 128, 128)),
        _ => {}
    }

    let hex = value.strip_prefix('#')?;
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    match hex.len() {
        3 => Some(Color::from_rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        6 => Some(Color::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        8 => Some(Color::new(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)? as f32 / 255.0,
        )),
        _ => None,
    }
}

/// Parse a length value.
pub fn parse_length(value: &str) -> Option<Length> {
    let value = value.trim();

    if value == "auto" {
        return Some(Length::Auto);
    }
    if value == "0" {
        return Some(Length::Zero);
    }
    if let Some(num) = value.strip_suffix("px") {
        return num.parse::<f32>().ok().map(Length::Px);
    }
    if let Some(num) = value.strip_suffix('%') {
        return num.parse::<f32>().ok().map(Length::Percent);
    }

    // Plain numbers are px
    value.parse::<f32>().ok().map(Length::Px)
}

/// Parse a 1 to 4 value edge shorthand into top, right, bottom, left.
pub fn parse_edges(value: &str) -> Option<[Length; 4]> {
    let parts: Vec<Length> = value
        .split_whitespace()
        .map(parse_length)
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [a] => Some([*a, *a, *a, *a]),
        [v, h] => Some([*v, *h, *v, *h]),
        [t, h, b] => Some([*t, *h, *b, *h]),
        [t, r, b, l] => Some([*t, *r, *b, *l]),
        _ => None,
    }
}

pub fn parse_writing_mode(value: &str) -> Option<WritingMode> {
    match value.trim() {
        "horizontal-tb" => Some(WritingMode::HorizontalTb),
        "vertical-rl" => Some(WritingMode::VerticalRl),
        "vertical-lr" => Some(WritingMode::VerticalLr),
        _ => None,
    }
}

pub fn parse_direction(value: &str) -> Option<Direction> {
    match value.trim() {
        "ltr" => Some(Direction::Ltr),
        "rtl" => Some(Direction::Rtl),
        _ => None,
    }
}

pub fn parse_overflow(value: &str) -> Option<Overflow> {
    match value.trim() {
        "visible" => Some(Overflow::Visible),
        "hidden" => Some(Overflow::Hidden),
        "scroll" => Some(Overflow::Scroll),
        "auto" => Some(Overflow::Auto),
        "clip" => Some(Overflow::Clip),
        "overlay" => Some(Overflow::Overlay),
        _ => None,
    }
}

/// Parse `[<visual-box>] [<length>]` in either order.
pub fn parse_overflow_clip_margin(value: &str) -> Option<OverflowClipMargin> {
    let mut result = OverflowClipMargin::default();
    let mut seen_box = false;
    let mut seen_margin = false;
    for part in value.split_whitespace() {
        let reference_box = match part {
            "border-box" => Some(VisualBox::BorderBox),
            "padding-box" => Some(VisualBox::PaddingBox),
            "content-box" => Some(VisualBox::ContentBox),
            _ => None,
        };
        match reference_box {
            Some(reference_box) if !seen_box => {
                result.reference_box = reference_box;
                seen_box = true;
            }
            None if !seen_margin => {
                let margin = match parse_length(part)? {
                    Length::Px(px) if px >= 0.0 => px,
                    Length::Zero => 0.0,
                    _ => return None,
                };
                result.margin = margin;
                seen_margin = true;
            }
            _ => return None,
        }
    }
    (seen_box || seen_margin).then_some(result)
}

pub fn parse_scrollbar_width(value: &str) -> Option<ScrollbarWidth> {
    match value.trim() {
        "auto" => Some(ScrollbarWidth::Auto),
        "thin" => Some(ScrollbarWidth::Thin),
        "none" => Some(ScrollbarWidth::None),
        _ => None,
    }
}

pub fn parse_scrollbar_gutter(value: &str) -> Option<ScrollbarGutter> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        ["auto"] => Some(ScrollbarGutter::Auto),
        ["stable"] => Some(ScrollbarGutter::Stable),
        ["stable", "both-edges"] | ["both-edges", "stable"] => Some(ScrollbarGutter::BothEdges),
        _ => None,
    }
}

pub fn parse_resize(value: &str) -> Option<Resize> {
    match value.trim() {
        "none" => Some(Resize::None),
        "both" => Some(Resize::Both),
        "horizontal" => Some(Resize::Horizontal),
        "vertical" => Some(Resize::Vertical),
        "block" => Some(Resize::Block),
        "inline" => Some(Resize::Inline),
        _ => None,
    }
}

pub fn parse_border_style(value: &str) -> Option<BorderStyle> {
    match value.trim() {
        "none" => Some(BorderStyle::None),
        "hidden" => Some(BorderStyle::Hidden),
        "solid" => Some(BorderStyle::Solid),
        "dotted" => Some(BorderStyle::Dotted),
        "dashed" => Some(BorderStyle::Dashed),
        "double" => Some(BorderStyle::Double),
        "groove" => Some(BorderStyle::Groove),
        "ridge" => Some(BorderStyle::Ridge),
        "inset" => Some(BorderStyle::Inset),
        "outset" => Some(BorderStyle::Outset),
        _ => None,
    }
}
