//! Input routing. The tree only ever delivers an event to the node it was
//! dispatched to; containers decide which child sees it next, either with
//! the plain `route_*` helpers or through a [`SubViewTracker`].

use tracing::trace;

use crate::common::geometry::Point;
use crate::model::tree::NodeId;
use crate::view::{KeyEvent, MouseEvent, Response, View, ViewFlags, ViewTree};

type MouseHook = fn(&mut dyn View, &mut ViewTree, NodeId, &MouseEvent) -> Response;

impl ViewTree {
    pub fn dispatch_mouse_press(&mut self, id: NodeId, event: &MouseEvent) -> Response {
        self.dispatch_mouse(id, event, |view, tree, this, event| {
            view.perform_mouse_press(tree, this, event)
        })
    }

    pub fn dispatch_mouse_release(&mut self, id: NodeId, event: &MouseEvent) -> Response {
        self.dispatch_mouse(id, event, |view, tree, this, event| {
            view.perform_mouse_release(tree, this, event)
        })
    }

    pub fn dispatch_mouse_move(&mut self, id: NodeId, event: &MouseEvent) -> Response {
        self.dispatch_mouse(id, event, |view, tree, this, event| {
            view.perform_mouse_move(tree, this, event)
        })
    }

    pub fn dispatch_mouse_hover(&mut self, id: NodeId, event: &MouseEvent) -> Response {
        self.dispatch_mouse(id, event, |view, tree, this, event| {
            view.perform_mouse_hover(tree, this, event)
        })
    }

    pub fn dispatch_key_press(&mut self, id: NodeId, event: &KeyEvent) -> Response {
        if !self.is_alive(id) || !self.is_visible(id) {
            return Response::Ignore;
        }
        self.with_view(id, |view, tree| view.perform_key_press(tree, id, event))
            .unwrap_or(Response::Ignore)
    }

    fn dispatch_mouse(&mut self, id: NodeId, event: &MouseEvent, hook: MouseHook) -> Response {
        if !self.is_alive(id) || !self.is_visible(id) {
            return Response::Ignore;
        }
        self.with_view(id, |view, tree| hook(view, tree, id, event)).unwrap_or(Response::Ignore)
    }

    /// Topmost visible child of `container` under `point`, which is in the
    /// container's coordinates.
    pub fn sub_view_at(&self, container: NodeId, point: Point) -> Option<NodeId> {
        self.children_rev(container)
            .find(|&child| self.is_visible(child) && self.rect(child).contains(point))
    }

    pub fn route_mouse_press(&mut self, container: NodeId, event: &MouseEvent) -> Response {
        self.route_mouse(container, event, Self::dispatch_mouse_press)
    }

    pub fn route_mouse_release(&mut self, container: NodeId, event: &MouseEvent) -> Response {
        self.route_mouse(container, event, Self::dispatch_mouse_release)
    }

    pub fn route_mouse_move(&mut self, container: NodeId, event: &MouseEvent) -> Response {
        self.route_mouse(container, event, Self::dispatch_mouse_move)
    }

    pub fn route_mouse_hover(&mut self, container: NodeId, event: &MouseEvent) -> Response {
        self.route_mouse(container, event, Self::dispatch_mouse_hover)
    }

    /// Offers the event to each child under the pointer, topmost first, until
    /// one finishes it.
    fn route_mouse(
        &mut self,
        container: NodeId,
        event: &MouseEvent,
        dispatch: fn(&mut ViewTree, NodeId, &MouseEvent) -> Response,
    ) -> Response {
        let hits: Vec<NodeId> = self
            .children_rev(container)
            .filter(|&child| self.is_visible(child) && self.rect(child).contains(event.position))
            .collect();
        for child in hits {
            let local = event.to_local(self.position(child));
            if dispatch(self, child, &local) == Response::Finish {
                return Response::Finish;
            }
        }
        Response::Ignore
    }

    /// Sends a key press to the focused child, if there is one.
    pub fn route_key_press(&mut self, container: NodeId, event: &KeyEvent) -> Response {
        let focused = self.children(container).find(|&child| self.is_focused(child));
        match focused {
            Some(child) => self.dispatch_key_press(child, event),
            None => Response::Ignore,
        }
    }

    /// Flips the hover flag and runs the matching hook. Losing hover also
    /// takes it away from every hovered descendant.
    pub fn set_hover(&mut self, id: NodeId, hovered: bool) {
        if !hovered {
            let hovered_children: Vec<NodeId> =
                self.children(id).filter(|&child| self.is_hovered(child)).collect();
            for child in hovered_children {
                self.set_hover(child, false);
            }
        }
        if !self.set_flag(id, ViewFlags::HOVER, hovered) {
            return;
        }
        if hovered {
            self.with_view(id, |view, tree| view.perform_hover_in(tree, id));
        } else {
            self.with_view(id, |view, tree| view.perform_hover_out(tree, id));
        }
    }

    pub fn set_focus(&mut self, id: NodeId, focused: bool) {
        if !self.set_flag(id, ViewFlags::FOCUSED, focused) {
            return;
        }
        if focused {
            self.with_view(id, |view, tree| view.perform_focus_on(tree, id));
        } else {
            self.with_view(id, |view, tree| view.perform_focus_off(tree, id));
        }
    }
}

/// Remembers which child of a container is hovered, focused and pressed, and
/// routes events accordingly. The pressed child keeps receiving moves and
/// the release even when the pointer leaves it.
#[derive(Clone, Debug, Default)]
pub struct SubViewTracker {
    hovered: Option<NodeId>,
    focused: Option<NodeId>,
    pressed: Option<NodeId>,
}

impl SubViewTracker {
    pub fn new() -> Self { Self::default() }

    pub fn hovered(&self) -> Option<NodeId> { self.hovered }

    pub fn focused(&self) -> Option<NodeId> { self.focused }

    pub fn pressed(&self) -> Option<NodeId> { self.pressed }

    pub fn set_hovered(&mut self, tree: &mut ViewTree, target: Option<NodeId>) {
        let target = target.filter(|&t| tree.is_alive(t));
        if self.hovered == target {
            return;
        }
        if let Some(old) = self.hovered.take()
            && tree.is_alive(old)
        {
            tree.set_hover(old, false);
        }
        if let Some(new) = target {
            tree.set_hover(new, true);
        }
        self.hovered = target;
    }

    pub fn set_focused(&mut self, tree: &mut ViewTree, target: Option<NodeId>) {
        let target = target.filter(|&t| tree.is_alive(t));
        if self.focused == target {
            return;
        }
        if let Some(old) = self.focused.take()
            && tree.is_alive(old)
        {
            tree.set_focus(old, false);
        }
        if let Some(new) = target {
            tree.set_focus(new, true);
        }
        self.focused = target;
    }

    /// Drops every reference to `node`. A live node loses hover and focus
    /// first, so its hover-out and focus-off hooks still run.
    pub fn forget(&mut self, tree: &mut ViewTree, node: NodeId) {
        if self.hovered == Some(node) {
            self.set_hovered(tree, None);
        }
        if self.focused == Some(node) {
            self.set_focused(tree, None);
        }
        if self.pressed == Some(node) {
            self.pressed = None;
            if tree.is_alive(node) {
                tree.set_pressed(node, false);
            }
        }
    }

    fn live(tree: &ViewTree, container: NodeId, id: Option<NodeId>) -> Option<NodeId> {
        id.filter(|&id| tree.is_alive(id) && tree.parent(id) == Some(container))
    }

    pub fn route_hover(&mut self, tree: &mut ViewTree, this: NodeId, event: &MouseEvent) -> Response {
        let target = tree.sub_view_at(this, event.position);
        self.set_hovered(tree, target);
        match target {
            Some(child) => tree.dispatch_mouse_hover(child, &event.to_local(tree.position(child))),
            None => Response::Ignore,
        }
    }

    pub fn route_press(&mut self, tree: &mut ViewTree, this: NodeId, event: &MouseEvent) -> Response {
        let Some(child) = tree.sub_view_at(this, event.position) else {
            self.set_focused(tree, None);
            return Response::Ignore;
        };
        let response = tree.dispatch_mouse_press(child, &event.to_local(tree.position(child)));
        if response == Response::Finish {
            trace!(?child, "captured press");
            self.pressed = Some(child);
            self.set_focused(tree, Some(child));
        }
        response
    }

    pub fn route_move(&mut self, tree: &mut ViewTree, this: NodeId, event: &MouseEvent) -> Response {
        let target = Self::live(tree, this, self.pressed).or_else(|| tree.sub_view_at(this, event.position));
        match target {
            Some(child) => tree.dispatch_mouse_move(child, &event.to_local(tree.position(child))),
            None => Response::Ignore,
        }
    }

    pub fn route_release(
        &mut self,
        tree: &mut ViewTree,
        this: NodeId,
        event: &MouseEvent,
    ) -> Response {
        let target = Self::live(tree, this, self.pressed.take())
            .or_else(|| tree.sub_view_at(this, event.position));
        match target {
            Some(child) => tree.dispatch_mouse_release(child, &event.to_local(tree.position(child))),
            None => Response::Ignore,
        }
    }

    pub fn route_key(&mut self, tree: &mut ViewTree, this: NodeId, event: &KeyEvent) -> Response {
        match Self::live(tree, this, self.focused) {
            Some(child) => tree.dispatch_key_press(child, event),
            None => Response::Ignore,
        }
    }
}
