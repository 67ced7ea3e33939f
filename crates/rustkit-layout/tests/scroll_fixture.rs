//! Scroll container geometry in every writing mode.
//!
//! The container is 540x400 with padding 10/20/30/40, border 20/30/40/50 and
//! custom scrollbars 15px wide and 16px tall.

use rustkit_css::{ComputedStyle, CustomScrollbarStyle};
use rustkit_layout::{
    BoxGeometry, BoxId, IntPoint, IntVector, LayoutContext, LayoutTree, NodeKind, PhysicalOffset,
    PhysicalRect, PhysicalSize, ScrollOffset, Scrollable,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn container_style(writing_mode: &str, direction: &str) -> ComputedStyle {
    let mut style = ComputedStyle::from_declarations(&format!(
        "overflow: scroll; padding: 10px 20px 30px 40px; \
         border-width: 20px 30px 40px 50px; border-style: solid; \
         writing-mode: {writing_mode}; direction: {direction}"
    ))
    .unwrap();
    style.custom_scrollbar = Some(CustomScrollbarStyle {
        width: 15.0,
        height: 16.0,
    });
    style
}

/// Lay out the container with one child of `child_size` at the physical
/// location `child_at`.
fn lay_out(
    writing_mode: &str,
    direction: &str,
    child_size: (i32, i32),
    child_at: (i32, i32),
) -> (LayoutTree, BoxId, BoxId) {
    init_tracing();
    let mut tree = LayoutTree::default();
    let container = tree.create_box(NodeKind::Block, container_style(writing_mode, direction));
    tree.set_size(container, PhysicalSize::from_ints(540, 400)).unwrap();
    let child = tree.create_box(NodeKind::Block, ComputedStyle::new());
    tree.append_child(container, child).unwrap();
    tree.set_size(child, PhysicalSize::from_ints(child_size.0, child_size.1))
        .unwrap();
    tree.set_physical_location(child, PhysicalOffset::from_ints(child_at.0, child_at.1))
        .unwrap();

    let mut ctx = LayoutContext::new();
    tree.compute_overflow(container).unwrap();
    tree.update_after_layout(container, &mut ctx).unwrap();
    (tree, container, child)
}

#[test]
fn test_non_scrollable_ltr() {
    let (tree, container, _) = lay_out("horizontal-tb", "ltr", (385, 284), (90, 30));
    let b = tree.get(container).unwrap();
    assert_eq!(b.physical_padding_box_rect(), PhysicalRect::from_ints(50, 20, 445, 324));
    assert_eq!(b.no_overflow_rect(), b.physical_padding_box_rect());
    assert_eq!(b.physical_content_box_rect(), PhysicalRect::from_ints(90, 30, 385, 284));
    assert_eq!(b.scrollable_overflow_rect(), b.no_overflow_rect());
    assert_eq!(b.origin_adjustment_for_scrollbars(), IntVector::new(0, 0));
    assert_eq!(b.scroll_origin(), IntPoint::new(0, 0));
    assert_eq!(b.maximum_scroll_offset_int(), IntVector::new(0, 0));
}

#[test]
fn test_non_scrollable_rtl_shifts_content_past_scrollbar() {
    let (tree, container, _) = lay_out("horizontal-tb", "rtl", (385, 284), (105, 30));
    let b = tree.get(container).unwrap();
    assert_eq!(b.origin_adjustment_for_scrollbars(), IntVector::new(15, 0));
    assert_eq!(b.physical_padding_box_rect(), PhysicalRect::from_ints(65, 20, 445, 324));
    assert_eq!(b.physical_content_box_rect(), PhysicalRect::from_ints(105, 30, 385, 284));
    assert_eq!(b.scroll_origin(), IntPoint::new(0, 0));
    assert_eq!(b.maximum_scroll_offset_int(), IntVector::new(0, 0));
    assert_eq!(b.minimum_scroll_offset_int(), IntVector::new(0, 0));
}

struct Expected {
    writing_mode: &'static str,
    direction: &'static str,
    child_at: (i32, i32),
    overflow: (i32, i32),
    max: (i32, i32),
    min: (i32, i32),
    origin: (i32, i32),
}

const SCROLLABLE: [Expected; 6] = [
    Expected {
        writing_mode: "horizontal-tb",
        direction: "ltr",
        child_at: (90, 30),
        overflow: (50, 20),
        max: (1615, 716),
        min: (0, 0),
        origin: (0, 0),
    },
    Expected {
        writing_mode: "vertical-lr",
        direction: "ltr",
        child_at: (90, 30),
        overflow: (50, 20),
        max: (1615, 716),
        min: (0, 0),
        origin: (0, 0),
    },
    Expected {
        writing_mode: "vertical-rl",
        direction: "ltr",
        child_at: (-1525, 30),
        overflow: (-1565, 20),
        max: (0, 716),
        min: (-1615, 0),
        origin: (1615, 0),
    },
    Expected {
        writing_mode: "horizontal-tb",
        direction: "rtl",
        child_at: (-1510, 30),
        overflow: (-1550, 20),
        max: (0, 716),
        min: (-1615, 0),
        origin: (1615, 0),
    },
    Expected {
        writing_mode: "vertical-lr",
        direction: "rtl",
        child_at: (90, -686),
        overflow: (50, -696),
        max: (1615, 0),
        min: (0, -716),
        origin: (0, 716),
    },
    Expected {
        writing_mode: "vertical-rl",
        direction: "rtl",
        child_at: (-1525, -686),
        overflow: (-1565, -696),
        max: (0, 0),
        min: (-1615, -716),
        origin: (1615, 716),
    },
];

#[test]
fn test_scrollable_overflow_in_every_writing_mode() {
    for expected in &SCROLLABLE {
        let (tree, container, _) = lay_out(
            expected.writing_mode,
            expected.direction,
            (2000, 1000),
            expected.child_at,
        );
        let b = tree.get(container).unwrap();
        let mode = format!("{} {}", expected.writing_mode, expected.direction);

        // Padding surrounds the child on all four sides.
        assert_eq!(
            b.scrollable_overflow_rect(),
            PhysicalRect::from_ints(expected.overflow.0, expected.overflow.1, 2060, 1040),
            "{mode}"
        );
        assert_eq!(
            b.maximum_scroll_offset_int(),
            IntVector::new(expected.max.0, expected.max.1),
            "{mode}"
        );
        assert_eq!(
            b.minimum_scroll_offset_int(),
            IntVector::new(expected.min.0, expected.min.1),
            "{mode}"
        );
        assert_eq!(
            b.scroll_origin(),
            IntPoint::new(expected.origin.0, expected.origin.1),
            "{mode}"
        );
        assert_eq!(b.scroll_width().to_int(), 2060, "{mode}");
        assert_eq!(b.scroll_height().to_int(), 1040, "{mode}");
    }
}

#[test]
fn test_initial_offset_is_zero_and_bounded() {
    for expected in &SCROLLABLE {
        let (mut tree, container, _) = lay_out(
            expected.writing_mode,
            expected.direction,
            (2000, 1000),
            expected.child_at,
        );
        let area = tree.scrollable_area(container).unwrap();
        assert_eq!(area.scroll_offset(), ScrollOffset::default());

        // Scrolling far past either end lands on the bounds.
        let at_max = tree
            .scroll_to(container, ScrollOffset::new(1.0e6, 1.0e6))
            .unwrap();
        assert_eq!(
            at_max,
            ScrollOffset::new(expected.max.0 as f32, expected.max.1 as f32)
        );
        let at_min = tree
            .scroll_to(container, ScrollOffset::new(-1.0e6, -1.0e6))
            .unwrap();
        assert_eq!(
            at_min,
            ScrollOffset::new(expected.min.0 as f32, expected.min.1 as f32)
        );
    }
}

#[test]
fn test_vertical_rl_child_location_mirrors() {
    let (tree, container, child) = lay_out("vertical-rl", "ltr", (2000, 1000), (-1525, 30));
    let child_box = tree.get(child).unwrap();
    assert_eq!(child_box.frame().location(), PhysicalOffset::from_ints(65, 30));

    let physical = tree.physical_location(child).unwrap();
    let container_width = tree.get(container).unwrap().size().width;
    assert_eq!(
        physical.left + child_box.size().width + child_box.frame().location().left,
        container_width
    );
}

#[test]
fn test_scrollbars_are_custom_and_positioned() {
    let (tree, container, _) = lay_out("horizontal-tb", "rtl", (2000, 1000), (-1510, 30));
    let b = tree.get(container).unwrap();
    let area = tree.scrollable_area(container).unwrap();
    let vertical = area.vertical_scrollbar().unwrap();
    let horizontal = area.horizontal_scrollbar().unwrap();
    assert!(vertical.is_custom() && horizontal.is_custom());
    assert_eq!(vertical.thickness(), 15);
    assert_eq!(horizontal.thickness(), 16);
    assert!(vertical.enabled() && horizontal.enabled());
    assert_eq!(vertical.proportion(), (324, 1040));
    assert_eq!(horizontal.proportion(), (445, 2060));

    // The vertical scrollbar sits against the left border.
    assert_eq!(vertical.frame_rect().x, 50);
    assert_eq!(b.horizontal_scrollbar_start(), 65);
}
