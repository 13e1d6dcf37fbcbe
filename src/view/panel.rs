use crate::common::geometry::Size;
use crate::model::tree::NodeId;
use crate::view::{KeyEvent, MouseEvent, Response, SubViewTracker, UpdateRequest, View, ViewTree};

/// Free-form container. Children place and size themselves; the panel only
/// routes input to them. A window panel is the root of an on-screen window.
#[derive(Debug, Default)]
pub struct Panel {
    tracker: SubViewTracker,
    window: bool,
    preferred: Option<Size>,
}

impl Panel {
    pub fn new() -> Self { Self::default() }

    pub fn window() -> Self { Panel { window: true, ..Self::default() } }

    pub fn with_preferred_size(mut self, size: Size) -> Self {
        self.preferred = Some(size);
        self
    }

    pub fn tracker(&self) -> &SubViewTracker { &self.tracker }
}

impl View for Panel {
    fn is_window(&self) -> bool { self.window }

    fn preferred_size(&self, tree: &ViewTree, _this: NodeId) -> Size {
        self.preferred.unwrap_or_else(|| tree.config().view.default_preferred_size())
    }

    fn update_test(&self, _tree: &ViewTree, _this: NodeId, _request: &UpdateRequest) -> bool { true }

    fn sub_view_removed(&mut self, tree: &mut ViewTree, _this: NodeId, child: NodeId) {
        self.tracker.forget(tree, child);
    }

    fn perform_mouse_press(&mut self, tree: &mut ViewTree, this: NodeId, event: &MouseEvent) -> Response {
        self.tracker.route_press(tree, this, event)
    }

    fn perform_mouse_release(
        &mut self,
        tree: &mut ViewTree,
        this: NodeId,
        event: &MouseEvent,
    ) -> Response {
        self.tracker.route_release(tree, this, event)
    }

    fn perform_mouse_move(&mut self, tree: &mut ViewTree, this: NodeId, event: &MouseEvent) -> Response {
        self.tracker.route_move(tree, this, event)
    }

    fn perform_mouse_hover(&mut self, tree: &mut ViewTree, this: NodeId, event: &MouseEvent) -> Response {
        self.tracker.route_hover(tree, this, event)
    }

    fn perform_key_press(&mut self, tree: &mut ViewTree, this: NodeId, event: &KeyEvent) -> Response {
        self.tracker.route_key(tree, this, event)
    }

    fn perform_hover_out(&mut self, tree: &mut ViewTree, _this: NodeId) {
        self.tracker.set_hovered(tree, None);
    }

    fn perform_focus_off(&mut self, tree: &mut ViewTree, _this: NodeId) {
        self.tracker.set_focused(tree, None);
    }
}
