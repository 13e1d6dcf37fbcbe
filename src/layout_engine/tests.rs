use pretty_assertions::assert_eq;

use crate::common::geometry::{Point, Size};
use crate::layout_engine::{Orientation, SizePolicy, Splitter, SplitterHandle};
use crate::model::tree::NodeId;
use crate::view::{CursorShape, HeadlessContext, MouseEvent, Panel, Response, Spacer, ViewTree};

fn tree() -> ViewTree { ViewTree::new(HeadlessContext::new()) }

fn splitter(tree: &mut ViewTree, orientation: Orientation, size: Size) -> NodeId {
    let splitter = tree.insert(Splitter::new(orientation));
    assert!(tree.resize(splitter, size));
    splitter
}

fn pane(tree: &mut ViewTree, size: Size) -> NodeId {
    let pane = tree.insert(Spacer::new());
    tree.resize(pane, size);
    pane
}

/// `(offset, extent)` of every child along the splitter's axis.
fn spans(tree: &ViewTree, splitter: NodeId, orientation: Orientation) -> Vec<(i32, i32)> {
    tree.children(splitter)
        .map(|c| (orientation.offset(tree.position(c)), orientation.extent(tree.size(c))))
        .collect()
}

fn extents(tree: &ViewTree, splitter: NodeId, orientation: Orientation) -> Vec<i32> {
    spans(tree, splitter, orientation).into_iter().map(|(_, e)| e).collect()
}

fn assert_alternates(tree: &ViewTree, splitter: NodeId) {
    let handles = Splitter::handles(tree, splitter);
    for (i, child) in tree.children(splitter).enumerate() {
        assert_eq!(handles.contains(&child), i % 2 == 1, "child {i} in the wrong slot");
    }
    assert_eq!(tree.child_count(splitter) % 2, 1, "splitter must start and end with a pane");
}

fn assert_contiguous(tree: &ViewTree, splitter: NodeId, orientation: Orientation) {
    let mut offset = 0;
    for (start, extent) in spans(tree, splitter, orientation) {
        assert_eq!(start, offset);
        offset += extent;
    }
}

fn set_cursor(tree: &mut ViewTree, position: Point) {
    tree.render_context_as_mut::<HeadlessContext>().unwrap().set_cursor_position(position);
}

/// Two panes split `first`/`second` in a horizontal splitter with 6 px handles.
fn two_panes(tree: &mut ViewTree, first: i32, second: i32) -> (NodeId, NodeId, NodeId) {
    let s = splitter(tree, Orientation::Horizontal, Size::new(first + 6 + second, 100));
    let a = pane(tree, Size::new(10, 10));
    let b = pane(tree, Size::new(second, 10));
    assert!(Splitter::add_pane(tree, s, a, SizePolicy::Default));
    assert!(Splitter::add_pane(tree, s, b, SizePolicy::Current));
    assert_eq!(extents(tree, s, Orientation::Horizontal), vec![first, 6, second]);
    (s, a, b)
}

mod adding_panes {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn first_pane_fills_the_splitter() {
        let mut tree = tree();
        let s = splitter(&mut tree, Orientation::Horizontal, Size::new(300, 120));
        let a = pane(&mut tree, Size::new(10, 10));
        assert!(Splitter::add_pane(&mut tree, s, a, SizePolicy::Default));
        assert_eq!(tree.size(a), Size::new(300, 120));
        assert_eq!(tree.position(a), Point::new(0, 0));
        assert!(Splitter::handles(&tree, s).is_empty());
    }

    #[test]
    fn default_policy_appends_an_average_share_without_shrinking() {
        let mut tree = tree();
        let s = splitter(&mut tree, Orientation::Horizontal, Size::new(406, 50));
        let [a, b] = [(); 2].map(|_| pane(&mut tree, Size::new(10, 10)));
        Splitter::add_pane(&mut tree, s, a, SizePolicy::Default);
        Splitter::add_pane(&mut tree, s, b, SizePolicy::Default);
        assert_eq!(spans(&tree, s, Orientation::Horizontal), vec![(0, 406), (406, 6), (412, 200)]);
        assert_alternates(&tree, s);
    }

    #[test]
    fn current_policy_shrinks_existing_panes() {
        let mut tree = tree();
        let (s, a, b) = two_panes(&mut tree, 100, 300);
        assert_eq!(tree.position(b), Point::new(106, 0));
        assert_eq!(tree.size(a).height, 100);
        assert_contiguous(&tree, s, Orientation::Horizontal);
    }

    #[test]
    fn preferred_policy_without_room_appends_at_full_size() {
        let mut tree = tree();
        let s = splitter(&mut tree, Orientation::Horizontal, Size::new(100, 50));
        let a = pane(&mut tree, Size::new(10, 10));
        let b = tree.insert(Spacer::new().with_preferred_size(Size::new(200, 20)));
        Splitter::add_pane(&mut tree, s, a, SizePolicy::Default);
        Splitter::add_pane(&mut tree, s, b, SizePolicy::Preferred);
        assert_eq!(extents(&tree, s, Orientation::Horizontal), vec![100, 6, 200]);
        assert_contiguous(&tree, s, Orientation::Horizontal);
    }

    #[test]
    fn expand_to_fill_takes_what_preferred_sizes_leave() {
        let mut tree = tree();
        let s = splitter(&mut tree, Orientation::Horizontal, Size::new(500, 50));
        let a = pane(&mut tree, Size::new(10, 10));
        let b = pane(&mut tree, Size::new(10, 10));
        Splitter::add_pane(&mut tree, s, a, SizePolicy::Default);
        Splitter::add_pane(&mut tree, s, b, SizePolicy::ExpandToFill);
        assert_eq!(extents(&tree, s, Orientation::Horizontal), vec![200, 6, 294]);
    }

    #[test]
    fn insert_at_front_and_middle() {
        let mut tree = tree();
        let (s, a, b) = two_panes(&mut tree, 100, 300);
        let front = pane(&mut tree, Size::new(50, 10));
        let middle = pane(&mut tree, Size::new(50, 10));
        assert!(Splitter::insert_pane(&mut tree, s, 0, front, SizePolicy::Current));
        assert!(Splitter::insert_pane(&mut tree, s, 2, middle, SizePolicy::Current));
        assert_eq!(Splitter::panes(&tree, s), vec![front, a, middle, b]);
        assert_alternates(&tree, s);
        assert_contiguous(&tree, s, Orientation::Horizontal);
        let total: i32 = extents(&tree, s, Orientation::Horizontal).iter().sum();
        assert_eq!(total, 406);
    }

    #[test]
    fn adding_a_pane_twice_is_rejected() {
        let mut tree = tree();
        let (s, a, _) = two_panes(&mut tree, 100, 300);
        assert!(!Splitter::add_pane(&mut tree, s, a, SizePolicy::Default));
        assert_eq!(tree.child_count(s), 3);
    }

    #[test]
    fn vertical_splitter_stacks_bottom_to_top() {
        let mut tree = tree();
        let s = splitter(&mut tree, Orientation::Vertical, Size::new(80, 206));
        let a = pane(&mut tree, Size::new(10, 10));
        let b = pane(&mut tree, Size::new(10, 100));
        Splitter::add_pane(&mut tree, s, a, SizePolicy::Default);
        Splitter::add_pane(&mut tree, s, b, SizePolicy::Current);
        assert_eq!(tree.position(a), Point::new(0, 0));
        assert_eq!(tree.size(a), Size::new(80, 100));
        assert_eq!(tree.position(b), Point::new(0, 106));
        let handle = Splitter::handles(&tree, s)[0];
        assert_eq!(tree.view::<SplitterHandle>(handle).unwrap().orientation(), Orientation::Horizontal);
        assert_eq!(tree.size(handle), Size::new(80, 6));
    }
}

mod removing_panes {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn remove_pane_destroys_one_handle_and_refills() {
        let mut tree = tree();
        let (s, a, b) = two_panes(&mut tree, 100, 300);
        let handle = Splitter::handles(&tree, s)[0];
        assert!(Splitter::remove_pane(&mut tree, s, a));
        assert!(tree.contains(a));
        assert_eq!(tree.parent(a), None);
        assert!(!tree.contains(handle));
        assert_eq!(Splitter::panes(&tree, s), vec![b]);
        assert_eq!(tree.size(b), Size::new(406, 100));
        assert_eq!(tree.position(b), Point::new(0, 0));
    }

    #[test]
    fn removing_a_stranger_fails() {
        let mut tree = tree();
        let (s, _, _) = two_panes(&mut tree, 100, 300);
        let other = pane(&mut tree, Size::new(5, 5));
        assert!(!Splitter::remove_pane(&mut tree, s, other));
        let handle = Splitter::handles(&tree, s)[0];
        assert!(!Splitter::remove_pane(&mut tree, s, handle));
    }
}

mod normalization {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn generic_push_inserts_a_handle() {
        let mut tree = tree();
        let (s, a, b) = two_panes(&mut tree, 100, 300);
        let c = pane(&mut tree, Size::new(100, 10));
        assert!(tree.push_back(s, c));
        assert_eq!(Splitter::panes(&tree, s), vec![a, b, c]);
        assert_alternates(&tree, s);
        assert_contiguous(&tree, s, Orientation::Horizontal);
        let total: i32 = extents(&tree, s, Orientation::Horizontal).iter().sum();
        assert_eq!(total, 406);
    }

    #[test]
    fn generic_remove_drops_the_extra_handle() {
        let mut tree = tree();
        let (s, a, b) = two_panes(&mut tree, 100, 300);
        let c = pane(&mut tree, Size::new(100, 10));
        Splitter::add_pane(&mut tree, s, c, SizePolicy::Current);
        assert!(tree.remove(s, b));
        assert_eq!(Splitter::panes(&tree, s), vec![a, c]);
        assert_eq!(Splitter::handles(&tree, s).len(), 1);
        assert_alternates(&tree, s);

        assert!(tree.remove(s, a));
        assert_eq!(Splitter::panes(&tree, s), vec![c]);
        assert!(Splitter::handles(&tree, s).is_empty());
        assert_eq!(tree.size(c).width, 406);
    }

    #[test]
    fn moving_a_pane_to_another_splitter_repairs_both() {
        let mut tree = tree();
        let (left, a, b) = two_panes(&mut tree, 100, 300);
        let (right, c, _) = two_panes(&mut tree, 50, 50);
        assert!(Splitter::add_pane(&mut tree, right, a, SizePolicy::Current));
        assert_eq!(Splitter::panes(&tree, left), vec![b]);
        assert!(Splitter::handles(&tree, left).is_empty());
        assert_eq!(Splitter::panes(&tree, right)[0], c);
        assert_alternates(&tree, right);
    }
}

mod filling {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn resize_keeps_ratios() {
        let mut tree = tree();
        let (s, a, b) = two_panes(&mut tree, 100, 300);
        assert!(tree.resize(s, Size::new(806, 100)));
        assert_eq!(tree.size(a), Size::new(200, 100));
        assert_eq!(tree.size(b), Size::new(600, 100));
        assert_eq!(spans(&tree, s, Orientation::Horizontal), vec![(0, 200), (200, 6), (206, 600)]);
    }

    #[test]
    fn expandable_panes_keep_their_ratio() {
        let mut tree = tree();
        let s = splitter(&mut tree, Orientation::Horizontal, Size::new(406, 100));
        let a = tree.insert(Spacer::new().with_expand(true, true));
        let b = tree.insert(Spacer::new().with_expand(true, true));
        tree.resize(b, Size::new(300, 100));
        assert!(Splitter::add_pane(&mut tree, s, a, SizePolicy::Default));
        assert!(Splitter::add_pane(&mut tree, s, b, SizePolicy::Current));
        assert_eq!(extents(&tree, s, Orientation::Horizontal), vec![100, 6, 300]);

        assert!(tree.resize(s, Size::new(806, 100)));
        assert_eq!(spans(&tree, s, Orientation::Horizontal), vec![(0, 200), (200, 6), (206, 600)]);
        assert_contiguous(&tree, s, Orientation::Horizontal);
    }

    #[test]
    fn cross_extent_follows_the_container() {
        let mut tree = tree();
        let (s, a, b) = two_panes(&mut tree, 100, 300);
        tree.resize(s, Size::new(406, 37));
        assert_eq!(tree.size(a).height, 37);
        assert_eq!(tree.size(b).height, 37);
        for handle in Splitter::handles(&tree, s) {
            assert_eq!(tree.size(handle), Size::new(6, 37));
        }
    }

    #[test]
    fn no_room_leaves_children_untouched() {
        let mut tree = tree();
        let (s, a, b) = two_panes(&mut tree, 100, 300);
        assert!(tree.resize(s, Size::new(6, 100)));
        assert_eq!(tree.size(a).width, 100);
        assert_eq!(tree.size(b).width, 300);
    }

    #[test]
    fn mixed_panes_grow_only_the_expandable_ones() {
        let mut tree = tree();
        let s = splitter(&mut tree, Orientation::Horizontal, Size::new(306, 60));
        let fixed = pane(&mut tree, Size::new(10, 10));
        let grow = tree.insert(Spacer::new().with_expand(true, false));
        Splitter::add_pane(&mut tree, s, fixed, SizePolicy::Default);
        Splitter::add_pane(&mut tree, s, grow, SizePolicy::Default);
        Splitter::fill(&mut tree, s);
        let before = tree.size(fixed).width;

        tree.resize(s, Size::new(606, 60));
        assert_eq!(tree.size(fixed).width, before);
        assert_eq!(tree.size(fixed).width + tree.size(grow).width, 600);
    }

    #[test]
    fn fill_corrects_an_overflowing_default_add() {
        let mut tree = tree();
        let s = splitter(&mut tree, Orientation::Horizontal, Size::new(406, 50));
        let [a, b] = [(); 2].map(|_| pane(&mut tree, Size::new(10, 10)));
        Splitter::add_pane(&mut tree, s, a, SizePolicy::Default);
        Splitter::add_pane(&mut tree, s, b, SizePolicy::Default);
        assert!(Splitter::fill(&mut tree, s));
        let total: i32 = extents(&tree, s, Orientation::Horizontal).iter().sum();
        assert_eq!(total, 406);
        assert_contiguous(&tree, s, Orientation::Horizontal);
    }

    #[test]
    fn nested_splitter_refills_with_its_parent() {
        let mut tree = tree();
        let (outer, _, right) = two_panes(&mut tree, 100, 300);
        let inner = tree.insert(Splitter::new(Orientation::Vertical));
        let top = pane(&mut tree, Size::new(10, 10));
        let bottom = pane(&mut tree, Size::new(10, 10));
        Splitter::add_pane(&mut tree, inner, bottom, SizePolicy::Default);
        Splitter::add_pane(&mut tree, inner, top, SizePolicy::Default);
        Splitter::fill(&mut tree, inner);

        assert!(Splitter::remove_pane(&mut tree, outer, right));
        assert!(Splitter::add_pane(&mut tree, outer, inner, SizePolicy::Current));
        tree.resize(outer, Size::new(806, 206));
        let inner_size = tree.size(inner);
        assert_eq!(inner_size.height, 206);
        assert_eq!(tree.size(top).width, inner_size.width);
        assert_eq!(tree.size(top).height + tree.size(bottom).height, 200);
    }
}

mod geometry_guard {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn panes_cannot_resize_themselves() {
        let mut tree = tree();
        let (_, a, _) = two_panes(&mut tree, 100, 300);
        assert!(!tree.resize(a, Size::new(10, 10)));
        assert!(!tree.move_to(a, Point::new(3, 3)));
        assert_eq!(tree.size(a), Size::new(100, 100));
        assert!(tree.set_visible(a, false));
    }

    #[test]
    fn preferred_size_sums_along_the_axis() {
        let mut tree = tree();
        let s = splitter(&mut tree, Orientation::Horizontal, Size::new(400, 100));
        let a = tree.insert(Spacer::new().with_preferred_size(Size::new(100, 50)));
        let b = tree.insert(Spacer::new().with_preferred_size(Size::new(80, 70)));
        Splitter::add_pane(&mut tree, s, a, SizePolicy::Default);
        Splitter::add_pane(&mut tree, s, b, SizePolicy::Default);
        assert_eq!(tree.preferred_size(s), Size::new(186, 70));
        assert!(!tree.is_expand_x(s));

        let c = tree.insert(Spacer::new().with_expand(true, false));
        Splitter::add_pane(&mut tree, s, c, SizePolicy::Default);
        assert!(tree.is_expand_x(s));
        assert!(!tree.is_expand_y(s));
    }
}

mod dragging {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    fn press_handle(tree: &mut ViewTree, s: NodeId, at: Point) {
        set_cursor(tree, at);
        assert_eq!(tree.dispatch_mouse_press(s, &MouseEvent::new(at)), Response::Finish);
    }

    fn move_cursor(tree: &mut ViewTree, s: NodeId, to: Point) {
        set_cursor(tree, to);
        tree.dispatch_mouse_move(s, &MouseEvent::new(to));
    }

    #[test]
    fn drag_moves_the_handle_and_resizes_both_panes() {
        let mut tree = tree();
        let (s, a, b) = two_panes(&mut tree, 100, 300);
        let handle = Splitter::handles(&tree, s)[0];
        press_handle(&mut tree, s, Point::new(103, 50));
        assert!(tree.is_pressed(handle));

        move_cursor(&mut tree, s, Point::new(153, 50));
        assert_eq!(spans(&tree, s, Orientation::Horizontal), vec![(0, 150), (150, 6), (156, 250)]);

        move_cursor(&mut tree, s, Point::new(83, 50));
        assert_eq!(spans(&tree, s, Orientation::Horizontal), vec![(0, 80), (80, 6), (86, 320)]);

        tree.dispatch_mouse_release(s, &MouseEvent::new(Point::new(83, 50)));
        assert!(!tree.is_pressed(handle));
        assert!(!tree.view::<SplitterHandle>(handle).unwrap().is_dragging());
        assert_eq!(tree.size(a).width + tree.size(b).width, 400);
    }

    #[test]
    fn drag_that_would_collapse_a_pane_is_dropped() {
        let mut tree = tree();
        let (s, a, b) = two_panes(&mut tree, 40, 40);
        press_handle(&mut tree, s, Point::new(43, 10));

        move_cursor(&mut tree, s, Point::new(-7, 10));
        assert_eq!(spans(&tree, s, Orientation::Horizontal), vec![(0, 40), (40, 6), (46, 40)]);

        move_cursor(&mut tree, s, Point::new(83, 10));
        assert_eq!(tree.size(a).width, 40);
        assert_eq!(tree.size(b).width, 40);

        move_cursor(&mut tree, s, Point::new(53, 10));
        assert_eq!(spans(&tree, s, Orientation::Horizontal), vec![(0, 50), (50, 6), (56, 30)]);
    }

    #[test]
    fn drag_conserves_the_pair() {
        let mut tree = tree();
        let (s, a, b) = two_panes(&mut tree, 100, 300);
        press_handle(&mut tree, s, Point::new(102, 20));
        for x in [110, 400, 300, -50, 2, 3, 399, 250, 101] {
            move_cursor(&mut tree, s, Point::new(x, 20));
            let (wa, wb) = (tree.size(a).width, tree.size(b).width);
            assert!(wa > 0 && wb > 0, "collapsed at x={x}");
            assert_eq!(wa + wb, 400);
            assert_contiguous(&tree, s, Orientation::Horizontal);
        }
    }

    #[test]
    fn drag_keeps_working_outside_the_handle() {
        let mut tree = tree();
        let window = tree.insert(Panel::window());
        let (s, a, _) = two_panes(&mut tree, 100, 300);
        tree.push_back(window, s);
        tree.move_to(s, Point::new(20, 0));

        press_handle(&mut tree, window, Point::new(123, 10));
        move_cursor(&mut tree, window, Point::new(173, 90));
        assert_eq!(tree.size(a).width, 150);
    }

    #[test]
    fn vertical_drag_uses_the_y_axis() {
        let mut tree = tree();
        let s = splitter(&mut tree, Orientation::Vertical, Size::new(80, 206));
        let a = pane(&mut tree, Size::new(10, 10));
        let b = pane(&mut tree, Size::new(10, 100));
        Splitter::add_pane(&mut tree, s, a, SizePolicy::Default);
        Splitter::add_pane(&mut tree, s, b, SizePolicy::Current);

        press_handle(&mut tree, s, Point::new(40, 102));
        move_cursor(&mut tree, s, Point::new(0, 132));
        assert_eq!(tree.size(a), Size::new(80, 130));
        assert_eq!(tree.size(b), Size::new(80, 70));
        assert_eq!(tree.position(b), Point::new(0, 136));
    }

    #[test]
    fn hovering_a_handle_sets_the_resize_cursor() {
        let mut tree = tree();
        let (s, a, _) = two_panes(&mut tree, 100, 300);
        let cursor = |tree: &ViewTree| tree.render_context_as::<HeadlessContext>().unwrap().cursor();

        tree.dispatch_mouse_hover(s, &MouseEvent::new(Point::new(103, 5)));
        assert_eq!(cursor(&tree), CursorShape::SplitH);
        assert!(tree.is_hovered(Splitter::handles(&tree, s)[0]));

        tree.dispatch_mouse_hover(s, &MouseEvent::new(Point::new(50, 5)));
        assert_eq!(cursor(&tree), CursorShape::Arrow);
        assert!(tree.is_hovered(a));
    }

    #[test]
    fn removing_a_hovered_handle_restores_the_cursor() {
        let mut tree = tree();
        let (s, a, b) = two_panes(&mut tree, 100, 300);
        tree.dispatch_mouse_hover(s, &MouseEvent::new(Point::new(103, 5)));
        let context = |tree: &ViewTree| {
            let cx = tree.render_context_as::<HeadlessContext>().unwrap();
            (cx.cursor(), cx.cursor_depth())
        };
        assert_eq!(context(&tree), (CursorShape::SplitH, 1));

        assert!(Splitter::remove_pane(&mut tree, s, a));
        assert_eq!(context(&tree), (CursorShape::Arrow, 0));
        assert!(Splitter::handles(&tree, s).is_empty());
        assert_eq!(Splitter::panes(&tree, s), vec![b]);
    }
}
