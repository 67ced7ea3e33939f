//! End-to-end geometry scenarios through the box arena.

use rustkit_css::{ComputedStyle, Direction, WritingMode};
use rustkit_layout::{
    BoxGeometry, ImageSizingInfo, LayoutConfig, LayoutContext, LayoutTree, LayoutUnit,
    LogicalRect, NodeKind, OverflowModel, PhysicalOffset, PhysicalRect, PhysicalSize,
    ScrollOffset, Scrollable, WritingDirection, WritingModeConverter,
};

fn style(css: &str) -> ComputedStyle {
    ComputedStyle::from_declarations(css).unwrap()
}

#[test]
fn test_unset_overflow_reads_back_as_border_box() {
    let mut tree = LayoutTree::default();
    let id = tree.create_box(NodeKind::Block, ComputedStyle::new());
    tree.set_size(id, PhysicalSize::from_ints(100, 100)).unwrap();
    tree.compute_overflow(id).unwrap();
    let b = tree.get(id).unwrap();
    assert_eq!(b.scrollable_overflow_rect(), PhysicalRect::from_ints(0, 0, 100, 100));
    assert_eq!(b.visual_overflow_rect(), PhysicalRect::from_ints(0, 0, 100, 100));
}

#[test]
fn test_vertical_rl_children_stack_from_the_right() {
    let mut tree = LayoutTree::default();
    let container = tree.create_box(NodeKind::Block, style("writing-mode: vertical-rl"));
    tree.set_size(container, PhysicalSize::from_ints(600, 200)).unwrap();

    let mut block_offset = 0;
    let mut children = Vec::new();
    for width in [100, 200] {
        let child = tree.create_box(NodeKind::Block, ComputedStyle::new());
        tree.append_child(container, child).unwrap();
        tree.set_size(child, PhysicalSize::from_ints(width, 200)).unwrap();
        tree.set_location(child, PhysicalOffset::from_ints(block_offset, 0))
            .unwrap();
        block_offset += width;
        children.push(child);
    }

    assert_eq!(
        tree.physical_location(children[0]).unwrap(),
        PhysicalOffset::from_ints(500, 0)
    );
    assert_eq!(
        tree.physical_location(children[1]).unwrap(),
        PhysicalOffset::from_ints(300, 0)
    );
    for child in children {
        let b = tree.get(child).unwrap();
        let physical = tree.physical_location(child).unwrap();
        assert_eq!(
            physical.left + b.size().width + b.frame().location().left,
            LayoutUnit::from_int(600)
        );
    }
}

#[test]
fn test_overflow_crosses_writing_mode_boundary() {
    // A horizontal child inside a vertical-rl container overflowing its
    // block-start edge.
    let mut tree = LayoutTree::default();
    let container = tree.create_box(NodeKind::Block, style("writing-mode: vertical-rl"));
    tree.set_size(container, PhysicalSize::from_ints(300, 100)).unwrap();
    let child = tree.create_box(NodeKind::Block, ComputedStyle::new());
    tree.append_child(container, child).unwrap();
    tree.set_size(child, PhysicalSize::from_ints(50, 100)).unwrap();
    let grandchild = tree.create_box(NodeKind::Block, ComputedStyle::new());
    tree.append_child(child, grandchild).unwrap();
    tree.set_size(grandchild, PhysicalSize::from_ints(120, 20)).unwrap();

    tree.compute_overflow(container).unwrap();
    // The child sits at physical x 250 and its content reaches 120px right,
    // past the container's right edge.
    assert_eq!(
        tree.get(child).unwrap().scrollable_overflow_rect(),
        PhysicalRect::from_ints(0, 0, 120, 100)
    );
    assert_eq!(
        tree.get(container).unwrap().scrollable_overflow_rect(),
        PhysicalRect::from_ints(0, 0, 370, 100)
    );
}

#[test]
fn test_add_layout_overflow_is_monotonic() {
    let base = PhysicalRect::from_ints(0, 0, 100, 100);
    let mut model = OverflowModel::new();
    let mut expected = base;
    for rect in [
        PhysicalRect::from_ints(-10, 5, 20, 20),
        PhysicalRect::from_ints(50, 50, 10, 10),
        PhysicalRect::from_ints(90, 90, 40, 5),
    ] {
        model.add_layout_overflow(&rect, &base);
        expected.unite(&rect);
        let current = model.layout_overflow_rect(&base);
        assert!(current.contains(&expected));
        assert!(current.contains(&base));
    }
}

#[test]
fn test_logical_round_trip_in_every_writing_mode() {
    let outer = PhysicalSize::from_ints(300, 200);
    let rects = [
        PhysicalRect::from_ints(0, 0, 10, 10),
        PhysicalRect::from_ints(25, 40, 100, 60),
        PhysicalRect::from_ints(-30, 150, 400, 90),
    ];
    for writing_mode in [WritingMode::HorizontalTb, WritingMode::VerticalRl, WritingMode::VerticalLr] {
        for direction in [Direction::Ltr, Direction::Rtl] {
            let converter =
                WritingModeConverter::new(WritingDirection::new(writing_mode, direction), outer);
            for rect in rects {
                let logical: LogicalRect = converter.to_logical_rect(rect);
                assert_eq!(converter.to_physical_rect(logical), rect);
            }
        }
    }
}

#[test]
fn test_scroll_offsets_stay_in_bounds() {
    let mut tree = LayoutTree::default();
    let container = tree.create_box(NodeKind::Block, style("overflow: auto"));
    tree.set_size(container, PhysicalSize::from_ints(200, 150)).unwrap();
    let child = tree.create_box(NodeKind::Block, ComputedStyle::new());
    tree.append_child(container, child).unwrap();
    tree.set_size(child, PhysicalSize::from_ints(600, 900)).unwrap();

    let mut ctx = LayoutContext::new();
    tree.compute_overflow(container).unwrap();
    tree.update_after_layout(container, &mut ctx).unwrap();

    let (min, max) = {
        let b = tree.get(container).unwrap();
        (b.minimum_scroll_offset(), b.maximum_scroll_offset())
    };
    assert!(max.x >= 0.0 && max.y >= 0.0);
    for delta in [(40.0, 70.0), (500.0, -20.0), (-800.0, 2000.0), (33.5, -5000.0)] {
        let offset = tree
            .scroll_by(container, ScrollOffset::new(delta.0, delta.1))
            .unwrap();
        assert!(min.x <= offset.x && offset.x <= max.x);
        assert!(min.y <= offset.y && offset.y <= max.y);
    }
}

#[test]
fn test_scrollbar_change_recomputes_overflow_base() {
    let mut tree = LayoutTree::default();
    let container = tree.create_box(NodeKind::Block, style("overflow: auto"));
    tree.set_size(container, PhysicalSize::from_ints(200, 100)).unwrap();
    let child = tree.create_box(NodeKind::Block, ComputedStyle::new());
    tree.append_child(container, child).unwrap();
    tree.set_size(child, PhysicalSize::from_ints(150, 300)).unwrap();

    let mut ctx = LayoutContext::new();
    tree.compute_overflow(container).unwrap();
    tree.update_after_layout(container, &mut ctx).unwrap();

    // The padding box lost 15px to the vertical scrollbar.
    let b = tree.get(container).unwrap();
    assert_eq!(b.scrollable_overflow_rect(), PhysicalRect::from_ints(0, 0, 185, 300));
    assert_eq!(b.client_width(), LayoutUnit::from_int(185));
}

#[test]
fn test_nested_scroll_containers_update_children_first() {
    let mut tree = LayoutTree::default();
    let outer = tree.create_box(NodeKind::Block, style("overflow: auto"));
    tree.set_size(outer, PhysicalSize::from_ints(300, 200)).unwrap();
    let inner = tree.create_box(NodeKind::Block, style("overflow: scroll"));
    tree.append_child(outer, inner).unwrap();
    tree.set_size(inner, PhysicalSize::from_ints(100, 400)).unwrap();
    let content = tree.create_box(NodeKind::Block, ComputedStyle::new());
    tree.append_child(inner, content).unwrap();
    tree.set_size(content, PhysicalSize::from_ints(50, 50)).unwrap();

    let mut ctx = LayoutContext::new();
    tree.compute_overflow(outer).unwrap();
    tree.update_scrollable_areas(outer, &mut ctx).unwrap();

    let inner_area = tree.scrollable_area(inner).unwrap();
    assert!(inner_area.has_horizontal_scrollbar() && inner_area.has_vertical_scrollbar());
    let outer_area = tree.scrollable_area(outer).unwrap();
    assert!(outer_area.has_vertical_scrollbar());
    assert!(!outer_area.has_horizontal_scrollbar());
    assert_eq!(
        tree.get(outer).unwrap().maximum_scroll_offset_int().y,
        200
    );
}

#[test]
fn test_space_background_through_tree() {
    let mut tree = LayoutTree::default();
    let id = tree.create_box(
        NodeKind::Block,
        style("background-size: 100px 100px; background-repeat: space"),
    );
    tree.set_size(id, PhysicalSize::from_ints(350, 100)).unwrap();
    let image = ImageSizingInfo::from_natural_size(100.0, 100.0);
    let viewport = PhysicalRect::from_ints(0, 0, 800, 600);

    let geometry = tree
        .background_geometry(id, 0, &image, PhysicalOffset::default(), viewport)
        .unwrap()
        .unwrap();
    // Three tiles and two 25px gaps.
    assert_eq!(geometry.space_size.width, LayoutUnit::from_int(25));
    assert_eq!(geometry.snapped_dest_rect, PhysicalRect::from_ints(0, 0, 350, 100));

    // One tile fits: no-repeat.
    tree.set_size(id, PhysicalSize::from_ints(150, 100)).unwrap();
    let geometry = tree
        .background_geometry(id, 0, &image, PhysicalOffset::default(), viewport)
        .unwrap()
        .unwrap();
    assert_eq!(geometry.space_size, PhysicalSize::default());
    assert_eq!(geometry.unsnapped_dest_rect.width(), LayoutUnit::from_int(100));
}

#[test]
fn test_cover_tile_covers_box() {
    let mut tree = LayoutTree::default();
    let id = tree.create_box(NodeKind::Block, style("background-size: cover"));
    tree.set_size(id, PhysicalSize::from_ints(333, 127)).unwrap();
    let geometry = tree
        .background_geometry(
            id,
            0,
            &ImageSizingInfo::from_natural_size(40.0, 30.0),
            PhysicalOffset::default(),
            PhysicalRect::default(),
        )
        .unwrap()
        .unwrap();
    let tile = geometry.tile_size;
    assert!(tile.width >= LayoutUnit::from_int(333));
    assert!(tile.height >= LayoutUnit::from_int(127));
    assert!(tile.width == LayoutUnit::from_int(333) || tile.height == LayoutUnit::from_int(127));
}

#[test]
fn test_overlay_config_from_json() {
    let config = LayoutConfig::from_json(
        r#"{ "scrollbar_theme": { "thickness": 10, "thin_thickness": 7, "uses_overlay_scrollbars": true } }"#,
    )
    .unwrap();
    let mut tree = LayoutTree::new(config);
    let id = tree.create_box(NodeKind::Block, style("overflow: auto"));
    tree.set_size(id, PhysicalSize::from_ints(100, 100)).unwrap();
    let child = tree.create_box(NodeKind::Block, ComputedStyle::new());
    tree.append_child(id, child).unwrap();
    tree.set_size(child, PhysicalSize::from_ints(100, 500)).unwrap();

    let mut ctx = LayoutContext::new();
    tree.compute_overflow(id).unwrap();
    tree.update_after_layout(id, &mut ctx).unwrap();

    let b = tree.get(id).unwrap();
    assert!(b.scrollable_area().unwrap().has_overlay_scrollbars());
    // Overlay scrollbars take no layout space.
    assert_eq!(b.client_width(), LayoutUnit::from_int(100));
    assert_eq!(b.maximum_scroll_offset_int().y, 400);
}
