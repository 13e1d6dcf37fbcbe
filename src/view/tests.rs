//! End-to-end behavior of the view layer through its public surface.

use pretty_assertions::assert_eq;
use test_log::test;

use crate::common::geometry::Size;
use crate::layout_engine::{Orientation, SizePolicy, Splitter};
use crate::model::tree::NodeId;
use crate::view::{
    Change, HeadlessContext, Panel, Spacer, UpdateRequest, View, ViewTree, default_perform_update,
};

fn tree() -> ViewTree { ViewTree::new(HeadlessContext::new()) }

fn syncs(tree: &ViewTree) -> usize {
    tree.render_context_as::<HeadlessContext>().unwrap().sync_count()
}

/// Refuses any resize of its children that the child asked for itself.
#[derive(Debug, Default)]
struct Locked;

impl View for Locked {
    fn update_test(&self, _tree: &ViewTree, this: NodeId, request: &UpdateRequest) -> bool {
        !(matches!(request.change, Change::Size(_)) && request.source != this)
    }
}

#[derive(Debug, Default)]
struct CountsUpdates {
    performed: usize,
}

impl View for CountsUpdates {
    fn perform_update(&mut self, tree: &mut ViewTree, this: NodeId, request: &UpdateRequest) {
        self.performed += 1;
        default_perform_update(tree, this, request);
    }
}

#[test]
fn insertion_order_and_lookup() {
    let mut tree = tree();
    let c = tree.insert(Panel::new());
    let a = tree.insert(Spacer::new());
    let b = tree.insert(Spacer::new());
    let x = tree.insert(Spacer::new());
    assert!(tree.push_back(c, a));
    assert!(tree.push_back(c, b));
    assert!(tree.insert_at(c, 1, x));

    assert_eq!(tree.children(c).collect::<Vec<_>>(), vec![a, x, b]);
    assert_eq!(tree.child_count(c), 3);
    assert_eq!(tree.child_at(c, 1), Some(x));
    assert_eq!(tree.index_of(b), Some(2));
    assert_eq!(tree.validate(c), Ok(()));
}

#[test]
fn reparenting_moves_one_child() {
    let mut tree = tree();
    let c1 = tree.insert(Panel::new());
    let c2 = tree.insert(Panel::new());
    let w = tree.insert(Spacer::new());
    assert!(tree.push_back(c1, w));
    assert!(tree.push_back(c2, w));

    assert_eq!(tree.child_count(c1), 0);
    assert_eq!(tree.child_count(c2), 1);
    assert_eq!(tree.parent(w), Some(c2));
    assert_eq!(tree.validate(c1), Ok(()));
    assert_eq!(tree.validate(c2), Ok(()));
}

#[test]
fn vetoing_container_keeps_child_size() {
    let mut tree = tree();
    let locked = tree.insert(Locked);
    let k = tree.insert(Spacer::new());
    assert!(tree.push_back(locked, k));
    let before = tree.size(k);

    assert!(!tree.resize(k, Size::new(50, 50)));
    assert_eq!(tree.size(k), before);

    assert!(tree.resize_sub_view(locked, k, Size::new(50, 50)));
    assert_eq!(tree.size(k), Size::new(50, 50));
}

#[test]
fn redraw_marks_the_chain_and_syncs_once() {
    let mut tree = tree();
    let root = tree.insert(Panel::window());
    let mid = tree.insert(Panel::new());
    let leaf = tree.insert(Spacer::new());
    tree.push_back(root, mid);
    tree.push_back(mid, leaf);
    tree.draw(root);
    tree.render_context_as_mut::<HeadlessContext>().unwrap().clear_synchronized();
    assert!(!tree.is_dirty(root) && !tree.is_dirty(mid) && !tree.is_dirty(leaf));

    tree.request_redraw(leaf);
    assert!(tree.is_dirty(leaf) && tree.is_dirty(mid) && tree.is_dirty(root));
    assert_eq!(syncs(&tree), 1);

    tree.request_redraw(leaf);
    assert_eq!(syncs(&tree), 1);

    tree.draw(root);
    assert!(!tree.is_dirty(leaf) && !tree.is_dirty(mid) && !tree.is_dirty(root));
}

#[test]
fn repeated_resize_runs_no_hook() {
    let mut tree = tree();
    let node = tree.insert(CountsUpdates::default());
    assert!(tree.resize(node, Size::new(30, 30)));
    let performed = tree.view::<CountsUpdates>(node).unwrap().performed;
    assert_eq!(performed, 1);

    tree.resize(node, Size::new(30, 30));
    assert_eq!(tree.view::<CountsUpdates>(node).unwrap().performed, performed);
}

#[test]
fn splitter_in_a_window() {
    let mut tree = tree();
    let window = tree.insert(Panel::window());
    tree.resize(window, Size::new(406, 120));
    let s = tree.insert(Splitter::new(Orientation::Horizontal));
    tree.push_back(window, s);
    assert!(tree.resize_sub_view(window, s, Size::new(406, 120)));

    let a = tree.insert(Spacer::new().with_expand(true, true));
    let b = tree.insert(Spacer::new().with_preferred_size(Size::new(300, 120)));
    assert!(Splitter::add_pane(&mut tree, s, a, SizePolicy::Default));
    assert!(Splitter::add_pane(&mut tree, s, b, SizePolicy::Preferred));
    assert_eq!(tree.size(a), Size::new(100, 120));
    assert_eq!(tree.size(b), Size::new(300, 120));
    assert_eq!(Splitter::panes(&tree, s), vec![a, b]);
    assert_eq!(tree.validate(window), Ok(()));

    let drawn = tree.draw_tree(window);
    assert!(drawn.contains("Splitter"), "{drawn}");
    assert!(drawn.contains("SplitterHandle"), "{drawn}");
}
