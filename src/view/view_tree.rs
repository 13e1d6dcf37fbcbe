use crossbeam_channel::{Receiver, Sender};
use slotmap::SecondaryMap;
use tracing::{debug, trace, warn};

use crate::common::config::Config;
use crate::common::geometry::{Point, Rect, Size};
use crate::model::tree::{NodeId, NodeMap, TreeError};
use crate::view::{AsAny, RenderContext, RoundType, View, ViewFlags, ViewState};

struct ViewSlot {
    /// `None` while the view is lent out to one of its own hooks.
    view: Option<Box<dyn View>>,
    state: ViewState,
}

#[derive(Clone, Copy, Debug)]
enum Placement {
    Front,
    Back,
    At(usize),
}

/// Owns the structure, the views and the per-node state of a forest of views.
pub struct ViewTree {
    map: NodeMap,
    slots: SecondaryMap<NodeId, ViewSlot>,
    render: Box<dyn RenderContext>,
    config: Config,
    pub(super) redraw_tx: Sender<NodeId>,
    pub(super) redraw_rx: Receiver<NodeId>,
}

#[track_caller]
fn precondition_failed(err: TreeError) {
    warn!("{err}");
    debug_assert!(false, "{err}");
}

impl ViewTree {
    pub fn new(render: impl RenderContext) -> ViewTree { Self::with_config(render, Config::default()) }

    pub fn with_config(render: impl RenderContext, config: Config) -> ViewTree {
        let (redraw_tx, redraw_rx) = crossbeam_channel::unbounded();
        ViewTree {
            map: NodeMap::new(),
            slots: SecondaryMap::new(),
            render: Box::new(render),
            config,
            redraw_tx,
            redraw_rx,
        }
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn nodes(&self) -> &NodeMap { &self.map }

    pub fn len(&self) -> usize { self.slots.len() }

    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    pub fn render_context(&self) -> &dyn RenderContext { &*self.render }

    pub fn render_context_mut(&mut self) -> &mut dyn RenderContext { &mut *self.render }

    pub fn render_context_as<T: RenderContext>(&self) -> Option<&T> {
        <dyn RenderContext as AsAny>::as_any(&*self.render).downcast_ref()
    }

    pub fn render_context_as_mut<T: RenderContext>(&mut self) -> Option<&mut T> {
        <dyn RenderContext as AsAny>::as_any_mut(&mut *self.render).downcast_mut()
    }

    pub fn insert(&mut self, view: impl View) -> NodeId { self.insert_boxed(Box::new(view)) }

    /// Adds a detached view. It starts out at its preferred size.
    pub fn insert_boxed(&mut self, view: Box<dyn View>) -> NodeId {
        let id = self.map.mk_node();
        let mut state = ViewState::default();
        state.set(ViewFlags::WINDOW, view.is_window());
        self.slots.insert(id, ViewSlot { view: Some(view), state });
        let size = self.preferred_size(id);
        if let Some(state) = self.state_mut(id) {
            state.size = size;
        }
        trace!(?id, "inserted view");
        id
    }

    /// The view at `id`, if it has type `T` and is not currently running a
    /// hook.
    pub fn view<T: View>(&self, id: NodeId) -> Option<&T> {
        let view = self.slots.get(id)?.view.as_deref()?;
        <dyn View as AsAny>::as_any(view).downcast_ref()
    }

    /// The view at `id` as a trait object, unless it is lent out.
    pub fn view_dyn(&self, id: NodeId) -> Option<&dyn View> {
        self.slots.get(id).and_then(|s| s.view.as_deref())
    }

    pub fn view_mut<T: View>(&mut self, id: NodeId) -> Option<&mut T> {
        let view = self.slots.get_mut(id)?.view.as_deref_mut()?;
        <dyn View as AsAny>::as_any_mut(view).downcast_mut()
    }

    /// Lends the view at `id` out of the tree for the duration of `f`.
    ///
    /// Returns `None` without calling `f` if the node is gone or its view
    /// is already lent out further up the stack.
    pub fn with_view<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn View, &mut ViewTree) -> R,
    ) -> Option<R> {
        let mut view = self.take_view(id)?;
        let result = f(&mut *view, self);
        self.restore_view(id, view);
        Some(result)
    }

    pub fn with_view_as<T: View, R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut T, &mut ViewTree) -> R,
    ) -> Option<R> {
        let mut view = self.take_view(id)?;
        let result = <dyn View as AsAny>::as_any_mut(&mut *view)
            .downcast_mut::<T>()
            .map(|view| f(view, self));
        self.restore_view(id, view);
        result
    }

    fn take_view(&mut self, id: NodeId) -> Option<Box<dyn View>> {
        let view = self.slots.get_mut(id)?.view.take();
        if view.is_none() {
            trace!(?id, "view is busy");
        }
        view
    }

    fn restore_view(&mut self, id: NodeId, view: Box<dyn View>) {
        match self.slots.get_mut(id) {
            Some(slot) => slot.view = Some(view),
            None => trace!(?id, "view was destroyed by its own hook"),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool { self.slots.contains_key(id) }

    /// Exists and is not waiting on a release to be freed.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.state(id).is_some_and(|s| !s.flags.contains(ViewFlags::DESTROYING))
    }

    pub fn state(&self, id: NodeId) -> Option<&ViewState> { self.slots.get(id).map(|s| &s.state) }

    pub(crate) fn state_mut(&mut self, id: NodeId) -> Option<&mut ViewState> {
        self.slots.get_mut(id).map(|s| &mut s.state)
    }

    pub fn name(&self, id: NodeId) -> &'static str {
        self.view_dyn(id).map_or("?", |v| v.name())
    }

    pub fn flags(&self, id: NodeId) -> ViewFlags {
        self.state(id).map_or(ViewFlags::empty(), ViewState::flags)
    }

    pub(crate) fn set_flag(&mut self, id: NodeId, flag: ViewFlags, on: bool) -> bool {
        self.state_mut(id).is_some_and(|s| s.set(flag, on))
    }

    pub fn size(&self, id: NodeId) -> Size { self.state(id).map(ViewState::size).unwrap_or_default() }

    pub fn position(&self, id: NodeId) -> Point {
        self.state(id).map(ViewState::position).unwrap_or_default()
    }

    pub fn rect(&self, id: NodeId) -> Rect { self.state(id).map(ViewState::rect).unwrap_or_default() }

    /// Position of `id` relative to the root of its tree.
    pub fn global_position(&self, id: NodeId) -> Point {
        std::iter::once(id)
            .chain(id.ancestors(&self.map))
            .filter(|&n| n.parent(&self.map).is_some())
            .fold(Point::default(), |acc, n| acc + self.position(n))
    }

    pub fn round_type(&self, id: NodeId) -> RoundType {
        self.state(id).map(ViewState::round_type).unwrap_or_default()
    }

    pub fn round_radius(&self, id: NodeId) -> f32 {
        self.state(id).map_or(0.0, ViewState::round_radius)
    }

    pub fn ref_count(&self, id: NodeId) -> u32 { self.state(id).map_or(0, ViewState::ref_count) }

    pub fn is_visible(&self, id: NodeId) -> bool { self.flags(id).contains(ViewFlags::VISIBLE) }

    /// Whether a redraw is pending for this node.
    pub fn is_dirty(&self, id: NodeId) -> bool { self.flags(id).contains(ViewFlags::REFRESH) }

    pub fn is_hovered(&self, id: NodeId) -> bool { self.flags(id).contains(ViewFlags::HOVER) }

    pub fn is_pressed(&self, id: NodeId) -> bool { self.flags(id).contains(ViewFlags::PRESSED) }

    pub fn is_focused(&self, id: NodeId) -> bool { self.flags(id).contains(ViewFlags::FOCUSED) }

    pub fn is_window(&self, id: NodeId) -> bool { self.flags(id).contains(ViewFlags::WINDOW) }

    pub fn set_pressed(&mut self, id: NodeId, pressed: bool) {
        if self.set_flag(id, ViewFlags::PRESSED, pressed) {
            self.request_redraw(id);
        }
    }

    pub fn preferred_size(&self, id: NodeId) -> Size {
        match self.view_dyn(id) {
            Some(view) => view.preferred_size(self, id),
            None => self.config.view.default_preferred_size(),
        }
    }

    pub fn is_expand_x(&self, id: NodeId) -> bool {
        self.view_dyn(id).is_some_and(|view| view.is_expand_x(self, id))
    }

    pub fn is_expand_y(&self, id: NodeId) -> bool {
        self.view_dyn(id).is_some_and(|view| view.is_expand_y(self, id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> { id.parent(&self.map) }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ { id.children(&self.map) }

    pub fn children_rev(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children_rev(&self.map)
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ { id.ancestors(&self.map) }

    pub fn child_count(&self, id: NodeId) -> usize { self.map.child_count(id) }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.map.child_at(parent, index)
    }

    pub fn index_of(&self, child: NodeId) -> Option<usize> { self.map.index_of(child) }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> { id.first_child(&self.map) }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> { id.last_child(&self.map) }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> { id.next_sibling(&self.map) }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> { id.prev_sibling(&self.map) }

    pub fn root_of(&self, id: NodeId) -> NodeId { id.ancestors(&self.map).last().unwrap_or(id) }

    /// The window whose tree contains `id`, if any.
    pub fn window_of(&self, id: NodeId) -> Option<NodeId> {
        let root = self.root_of(id);
        self.is_window(root).then_some(root)
    }

    pub fn push_front(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.attach(parent, child, Placement::Front)
    }

    pub fn push_back(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.attach(parent, child, Placement::Back)
    }

    /// Inserts `child` at `index`. Indices past the end append.
    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> bool {
        self.attach(parent, child, Placement::At(index))
    }

    /// Attaching a view that already has a parent moves it. Attaching to
    /// its current parent is a no-op that reports success.
    fn attach(&mut self, parent: NodeId, child: NodeId, placement: Placement) -> bool {
        if !self.is_alive(child) {
            trace!(?child, "ignoring attach of a dead view");
            return false;
        }
        if !self.is_alive(parent) {
            precondition_failed(TreeError::Stale(parent));
            return false;
        }
        if child == parent || child.is_ancestor_of(parent, &self.map) {
            precondition_failed(TreeError::Cycle { parent, child });
            return false;
        }
        match child.parent(&self.map) {
            Some(current) if current == parent => {
                debug!(?parent, ?child, "already a sub view");
                return true;
            }
            Some(current) => {
                if !self.remove(current, child) {
                    return false;
                }
            }
            None => {}
        }

        let result = match placement {
            Placement::Front => self.map.try_push_front(parent, child),
            Placement::Back => self.map.try_push_back(parent, child),
            Placement::At(index) => self.map.try_insert_at(parent, index, child),
        };
        if let Err(err) = result {
            precondition_failed(err);
            return false;
        }

        self.with_view(child, |view, tree| view.perform_after_added(tree, child));
        self.with_view(parent, |view, tree| view.sub_view_added(tree, parent, child));
        self.request_redraw(parent);
        true
    }

    /// Detaches `child` from `parent`. The child is kept alive; the caller
    /// owns it from here on.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.contains(parent) || !self.contains(child) {
            return false;
        }
        if child.parent(&self.map) != Some(parent) {
            precondition_failed(TreeError::NotAChild { parent, child });
            return false;
        }

        self.with_view(child, |view, tree| view.perform_before_removed(tree, child));
        if child.parent(&self.map) != Some(parent) {
            debug!(?child, "sub view detached itself while being removed");
            return true;
        }
        if let Err(err) = self.map.try_remove(parent, child) {
            precondition_failed(err);
            return false;
        }
        self.with_view(parent, |view, tree| view.sub_view_removed(tree, parent, child));
        self.request_redraw(parent);
        true
    }

    /// Removes and destroys every child of `parent`.
    pub fn clear_sub_views(&mut self, parent: NodeId) {
        while let Some(child) = parent.first_child(&self.map) {
            if !self.remove(parent, child) {
                break;
            }
            self.destroy(child);
        }
    }

    pub fn move_to_first(&mut self, child: NodeId) -> bool { self.reorder(child, NodeMap::move_to_first) }

    pub fn move_to_last(&mut self, child: NodeId) -> bool { self.reorder(child, NodeMap::move_to_last) }

    /// One step toward the last child.
    pub fn move_forward(&mut self, child: NodeId) -> bool { self.reorder(child, NodeMap::move_forward) }

    /// One step toward the first child.
    pub fn move_backward(&mut self, child: NodeId) -> bool {
        self.reorder(child, NodeMap::move_backward)
    }

    fn reorder(&mut self, child: NodeId, op: fn(&mut NodeMap, NodeId) -> bool) -> bool {
        let moved = op(&mut self.map, child);
        if moved && let Some(parent) = child.parent(&self.map) {
            self.request_redraw(parent);
        }
        moved
    }

    /// Exchanges two siblings.
    pub fn swap(&mut self, a: NodeId, b: NodeId) -> bool {
        match self.map.try_swap(a, b) {
            Ok(swapped) => {
                if swapped && let Some(parent) = a.parent(&self.map) {
                    self.request_redraw(parent);
                }
                swapped
            }
            Err(err) => {
                precondition_failed(err);
                false
            }
        }
    }

    pub fn swap_index(&mut self, parent: NodeId, i: usize, j: usize) -> bool {
        match (self.child_at(parent, i), self.child_at(parent, j)) {
            (Some(a), Some(b)) => self.swap(a, b),
            _ => {
                debug!(?parent, i, j, "swap index out of range");
                false
            }
        }
    }

    /// Detaches and frees `id` together with its subtree. A retained node is
    /// only detached now and freed by the last [`ViewTree::release`].
    pub fn destroy(&mut self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        if let Some(parent) = id.parent(&self.map) {
            self.remove(parent, id);
        }
        if self.ref_count(id) > 0 {
            self.set_flag(id, ViewFlags::DESTROYING, true);
            debug!(?id, "destroy deferred until released");
            return true;
        }
        self.free(id);
        true
    }

    fn free(&mut self, id: NodeId) {
        self.clear_sub_views(id);
        self.slots.remove(id);
        self.map.free(id);
        trace!(?id, "freed view");
    }

    pub fn retain(&mut self, id: NodeId) -> bool {
        match self.state_mut(id) {
            Some(state) => {
                state.ref_count += 1;
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self, id: NodeId) {
        let Some(state) = self.state_mut(id) else {
            return;
        };
        state.ref_count = state.ref_count.saturating_sub(1);
        if state.ref_count == 0 && state.flags.contains(ViewFlags::DESTROYING) {
            self.free(id);
        }
    }

    /// Checks the structural invariants of every node in the subtree.
    pub fn validate(&self, root: NodeId) -> Result<(), String> {
        root.traverse_preorder(&self.map).try_for_each(|node| self.map.validate(node))
    }

    pub fn draw_tree(&self, root: NodeId) -> String {
        let tree = self.ascii_tree(root);
        let mut out = String::new();
        if ascii_tree::write_tree(&mut out, &tree).is_err() {
            warn!("failed to render view tree");
        }
        out
    }

    fn ascii_tree(&self, node: NodeId) -> ascii_tree::Tree {
        let mut desc = format!(
            "{} {:?} {}@{}",
            self.name(node),
            node,
            self.size(node),
            self.position(node)
        );
        if !self.is_visible(node) {
            desc.push_str(" hidden");
        }
        if self.is_dirty(node) {
            desc.push_str(" dirty");
        }
        let children: Vec<_> = self.children(node).map(|c| self.ascii_tree(c)).collect();
        if children.is_empty() {
            ascii_tree::Tree::Leaf(vec![desc])
        } else {
            ascii_tree::Tree::Node(desc, children)
        }
    }
}
