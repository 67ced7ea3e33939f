//! Background fill layers.

use crate::{parse_length, Length};

/// Box a background is clipped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillClip {
    #[default]
    BorderBox,
    PaddingBox,
    ContentBox,
    /// Clipped to glyph shapes; geometry paints the whole border box.
    Text,
}

/// Box a background is positioned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillBox {
    BorderBox,
    #[default]
    PaddingBox,
    ContentBox,
}

/// Repeat mode for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRepeat {
    #[default]
    Repeat,
    NoRepeat,
    Round,
    Space,
}

/// `background-size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillSize {
    /// Width and height, either of which may be `auto`.
    Size(Length, Length),
    Cover,
    Contain,
}

impl Default for FillSize {
    fn default() -> Self {
        FillSize::Size(Length::Auto, Length::Auto)
    }
}

/// Edge a background position is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionEdge {
    /// Left or top.
    #[default]
    Start,
    /// Right or bottom.
    End,
}

/// One axis of `background-position`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FillPosition {
    pub edge: PositionEdge,
    pub offset: Length,
}

impl FillPosition {
    pub fn start(offset: Length) -> Self {
        Self {
            edge: PositionEdge::Start,
            offset,
        }
    }

    pub fn end(offset: Length) -> Self {
        Self {
            edge: PositionEdge::End,
            offset,
        }
    }
}

/// `background-attachment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillAttachment {
    #[default]
    Scroll,
    Fixed,
    Local,
}

/// Porter-Duff compositing of a layer onto the layers below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOperator {
    Clear,
    Copy,
    #[default]
    SourceOver,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Xor,
    PlusLighter,
}

/// A single background layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillLayer {
    pub clip: FillClip,
    pub origin: FillBox,
    pub repeat_x: FillRepeat,
    pub repeat_y: FillRepeat,
    pub size: FillSize,
    pub position_x: FillPosition,
    pub position_y: FillPosition,
    pub attachment: FillAttachment,
    pub composite: CompositeOperator,
}

impl Default for FillLayer {
    fn default() -> Self {
        Self {
            clip: FillClip::BorderBox,
            origin: FillBox::PaddingBox,
            repeat_x: FillRepeat::Repeat,
            repeat_y: FillRepeat::Repeat,
            size: FillSize::default(),
            position_x: FillPosition::start(Length::Percent(0.0)),
            position_y: FillPosition::start(Length::Percent(0.0)),
            attachment: FillAttachment::Scroll,
            composite: CompositeOperator::SourceOver,
        }
    }
}

impl FillLayer {
    /// Whether the size fills one axis from the image's aspect ratio.
    pub fn has_auto_height(&self) -> bool {
        matches!(self.size, FillSize::Size(_, Length::Auto))
    }

    pub fn has_auto_width(&self) -> bool {
        matches!(self.size, FillSize::Size(Length::Auto, _))
    }
}

pub fn parse_fill_clip(value: &str) -> Option<FillClip> {
    match value.trim() {
        "border-box" => Some(FillClip::BorderBox),
        "padding-box" => Some(FillClip::PaddingBox),
        "content-box" => Some(FillClip::ContentBox),
        "text" => Some(FillClip::Text),
        _ => None,
    }
}

pub fn parse_fill_origin(value: &str) -> Option<FillBox> {
    match value.trim() {
        "border-box" => Some(FillBox::BorderBox),
        "padding-box" => Some(FillBox::PaddingBox),
        "content-box" => Some(FillBox::ContentBox),
        _ => None,
    }
}

fn parse_repeat_keyword(value: &str) -> Option<FillRepeat> {
    match value {
        "repeat" => Some(FillRepeat::Repeat),
        "no-repeat" => Some(FillRepeat::NoRepeat),
        "round" => Some(FillRepeat::Round),
        "space" => Some(FillRepeat::Space),
        _ => None,
    }
}

/// Parse `background-repeat` into its x and y modes.
pub fn parse_fill_repeat(value: &str) -> Option<(FillRepeat, FillRepeat)> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        ["repeat-x"] => Some((FillRepeat::Repeat, FillRepeat::NoRepeat)),
        ["repeat-y"] => Some((FillRepeat::NoRepeat, FillRepeat::Repeat)),
        [both] => parse_repeat_keyword(both).map(|r| (r, r)),
        [x, y] => Some((parse_repeat_keyword(x)?, parse_repeat_keyword(y)?)),
        _ => None,
    }
}

/// Parse `background-size`; a single length leaves the height `auto`.
pub fn parse_fill_size(value: &str) -> Option<FillSize> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        ["cover"] => Some(FillSize::Cover),
        ["contain"] => Some(FillSize::Contain),
        [w] => Some(FillSize::Size(parse_length(w)?, Length::Auto)),
        [w, h] => Some(FillSize::Size(parse_length(w)?, parse_length(h)?)),
        _ => None,
    }
}

pub fn parse_fill_attachment(value: &str) -> Option<FillAttachment> {
    match value.trim() {
        "scroll" => Some(FillAttachment::Scroll),
        "fixed" => Some(FillAttachment::Fixed),
        "local" => Some(FillAttachment::Local),
        _ => None,
    }
}

fn parse_position(value: &str, start: &str, end: &str) -> Option<FillPosition> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        ["center"] => Some(FillPosition::start(Length::Percent(50.0))),
        [edge] if *edge == start => Some(FillPosition::start(Length::Percent(0.0))),
        [edge] if *edge == end => Some(FillPosition::start(Length::Percent(100.0))),
        [edge, offset] if *edge == start => Some(FillPosition::start(parse_length(offset)?)),
        [edge, offset] if *edge == end => Some(FillPosition::end(parse_length(offset)?)),
        [offset] => Some(FillPosition::start(parse_length(offset)?)),
        _ => None,
    }
}

/// Parse `background-position-x` (`10px`, `right 5px`, `center`).
pub fn parse_position_x(value: &str) -> Option<FillPosition> {
    parse_position(value, "left", "right")
}

/// Parse `background-position-y` (`10px`, `bottom 5px`, `center`).
pub fn parse_position_y(value: &str) -> Option<FillPosition> {
    parse_position(value, "top", "bottom")
}
