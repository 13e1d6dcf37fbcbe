//! Retained-mode views.
//!
//! A [`ViewTree`] owns every view. Views are trait objects that customize
//! behavior through hooks; each hook receives the tree and the id of the
//! node it is running for, so a view can freely inspect and mutate the rest
//! of the tree. While a hook runs its view is lent out of the tree. A
//! re-entrant call that reaches the same node falls back to the default
//! behavior instead.

use std::any::Any;

mod context;
mod dispatch;
mod event;
mod panel;
mod redraw;
mod spacer;
mod state;
mod update;
mod view_tree;

#[cfg(test)]
mod tests;

pub use context::{CursorShape, HeadlessContext, RenderContext};
pub use dispatch::SubViewTracker;
pub use event::{KeyEvent, Modifiers, MouseButton, MouseEvent};
pub use panel::Panel;
pub use redraw::RedrawProxy;
pub use spacer::Spacer;
pub use state::{RoundType, ViewFlags, ViewState};
pub use update::{Change, UpdateRequest, default_perform_update, default_update_test};
pub use view_tree::ViewTree;

use crate::common::geometry::Size;
use crate::model::tree::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response {
    /// The event or draw was fully handled here.
    Finish,
    /// Not handled; the caller continues with its default.
    Ignore,
}

pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

#[allow(unused_variables)]
pub trait View: AsAny {
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Whether this view is the root of an on-screen window.
    fn is_window(&self) -> bool { false }

    fn preferred_size(&self, tree: &ViewTree, this: NodeId) -> Size {
        tree.config().view.default_preferred_size()
    }

    fn is_expand_x(&self, tree: &ViewTree, this: NodeId) -> bool { false }

    fn is_expand_y(&self, tree: &ViewTree, this: NodeId) -> bool { false }

    /// Asked before a change is applied. Returning false vetoes it.
    fn update_test(&self, tree: &ViewTree, this: NodeId, request: &UpdateRequest) -> bool {
        default_update_test(tree, this, request)
    }

    fn perform_update(&mut self, tree: &mut ViewTree, this: NodeId, request: &UpdateRequest) {
        default_perform_update(tree, this, request)
    }

    /// Observes a change that was applied at or below this node. Returning
    /// false stops the report from travelling further up.
    fn report_update(&mut self, tree: &mut ViewTree, this: NodeId, request: &UpdateRequest) -> bool {
        true
    }

    fn perform_after_added(&mut self, tree: &mut ViewTree, this: NodeId) {}

    fn perform_before_removed(&mut self, tree: &mut ViewTree, this: NodeId) {}

    fn sub_view_added(&mut self, tree: &mut ViewTree, this: NodeId, child: NodeId) {}

    fn sub_view_removed(&mut self, tree: &mut ViewTree, this: NodeId, child: NodeId) {}

    /// Returning false skips this node and everything below it for the pass.
    fn pre_draw(&mut self, tree: &mut ViewTree, this: NodeId) -> bool { true }

    /// [`Response::Ignore`] asks the tree to draw the sub views.
    fn draw(&mut self, tree: &mut ViewTree, this: NodeId) -> Response { Response::Ignore }

    fn post_draw(&mut self, tree: &mut ViewTree, this: NodeId) {}

    fn perform_mouse_press(&mut self, tree: &mut ViewTree, this: NodeId, event: &MouseEvent) -> Response {
        tree.route_mouse_press(this, event)
    }

    fn perform_mouse_release(
        &mut self,
        tree: &mut ViewTree,
        this: NodeId,
        event: &MouseEvent,
    ) -> Response {
        tree.route_mouse_release(this, event)
    }

    fn perform_mouse_move(&mut self, tree: &mut ViewTree, this: NodeId, event: &MouseEvent) -> Response {
        tree.route_mouse_move(this, event)
    }

    fn perform_mouse_hover(&mut self, tree: &mut ViewTree, this: NodeId, event: &MouseEvent) -> Response {
        tree.route_mouse_hover(this, event)
    }

    fn perform_key_press(&mut self, tree: &mut ViewTree, this: NodeId, event: &KeyEvent) -> Response {
        tree.route_key_press(this, event)
    }

    fn perform_hover_in(&mut self, tree: &mut ViewTree, this: NodeId) {}

    fn perform_hover_out(&mut self, tree: &mut ViewTree, this: NodeId) {}

    fn perform_focus_on(&mut self, tree: &mut ViewTree, this: NodeId) {}

    fn perform_focus_off(&mut self, tree: &mut ViewTree, this: NodeId) {}
}
