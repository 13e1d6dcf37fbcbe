use crossbeam_channel::Sender;
use tracing::trace;

use crate::model::tree::NodeId;
use crate::view::{Response, ViewFlags, ViewTree};

/// Cloneable handle that lets other threads ask for a redraw. Requests are
/// queued and only take effect when the UI thread calls
/// [`ViewTree::process_redraw_requests`].
#[derive(Clone, Debug)]
pub struct RedrawProxy {
    tx: Sender<NodeId>,
}

impl RedrawProxy {
    /// Returns false once the tree has been dropped.
    pub fn request_redraw(&self, id: NodeId) -> bool { self.tx.send(id).is_ok() }
}

impl ViewTree {
    /// Marks `id` and its ancestors dirty. Reaching the root of a window
    /// synchronizes it once; meeting an ancestor that is already dirty stops
    /// the walk, since that request is already on its way.
    pub fn request_redraw(&mut self, id: NodeId) {
        if !self.is_alive(id) || self.is_dirty(id) {
            return;
        }
        self.set_flag(id, ViewFlags::REFRESH, true);
        let mut top = id;
        while let Some(parent) = self.parent(top) {
            if self.is_dirty(parent) {
                trace!(?id, ?parent, "redraw already pending");
                return;
            }
            self.set_flag(parent, ViewFlags::REFRESH, true);
            top = parent;
        }
        if self.is_window(top) {
            self.render_context_mut().synchronize(top);
        }
    }

    pub fn redraw_proxy(&self) -> RedrawProxy { RedrawProxy { tx: self.redraw_tx.clone() } }

    /// Applies queued cross-thread requests. Returns how many referred to
    /// live views.
    pub fn process_redraw_requests(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(id) = self.redraw_rx.try_recv() {
            if self.is_alive(id) {
                self.request_redraw(id);
                applied += 1;
            } else {
                trace!(?id, "dropping redraw request for a dead view");
            }
        }
        applied
    }

    /// Runs a draw pass over the tree rooted at `root`.
    pub fn draw(&mut self, root: NodeId) {
        if !self.is_alive(root) {
            return;
        }
        self.set_flag(root, ViewFlags::REFRESH, false);
        if !self.draw_node(root) {
            self.collapse_refresh(root, false);
        }
    }

    /// Hands the parent's dirty flag down to each child, then draws the
    /// visible ones in sibling order.
    pub fn draw_sub_views_once(&mut self, parent: NodeId) {
        let children: Vec<NodeId> = self.children(parent).collect();
        for child in children {
            if self.parent(child) != Some(parent) {
                continue;
            }
            let dirty = self.is_dirty(parent);
            if !self.is_visible(child) {
                self.collapse_refresh(child, dirty);
                continue;
            }
            self.set_flag(child, ViewFlags::REFRESH, dirty);
            if !self.draw_node(child) {
                self.collapse_refresh(child, dirty);
            }
        }
    }

    /// Returns whether the sub views were visited.
    fn draw_node(&mut self, node: NodeId) -> bool {
        let proceed = self.with_view(node, |view, tree| view.pre_draw(tree, node)).unwrap_or(false);
        if !proceed {
            return false;
        }
        let response =
            self.with_view(node, |view, tree| view.draw(tree, node)).unwrap_or(Response::Ignore);
        if response == Response::Ignore {
            self.draw_sub_views_once(node);
        } else {
            let dirty = self.is_dirty(node);
            let children: Vec<NodeId> = self.children(node).collect();
            for child in children {
                self.collapse_refresh(child, dirty);
            }
        }
        self.with_view(node, |view, tree| view.post_draw(tree, node));
        true
    }

    /// Sets the dirty flag of a whole subtree that the pass did not visit.
    fn collapse_refresh(&mut self, node: NodeId, dirty: bool) {
        let subtree: Vec<NodeId> = node.traverse_preorder(self.nodes()).collect();
        for id in subtree {
            self.set_flag(id, ViewFlags::REFRESH, dirty);
        }
    }
}
