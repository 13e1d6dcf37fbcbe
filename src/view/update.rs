//! The test / perform / report protocol every geometry or appearance change
//! goes through.
//!
//! A change first asks the target whether it accepts it. Once accepted it
//! is performed on the target and then reported to each ancestor in turn,
//! which performs it too (usually a no-op, since it is not the target) and
//! decides whether to keep forwarding.

use tracing::{debug, trace};

use crate::common::geometry::{Point, Size};
use crate::model::tree::NodeId;
use crate::view::{RoundType, ViewFlags, ViewState, ViewTree};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Change {
    Size(Size),
    Position(Point),
    Visibility(bool),
    RoundType(RoundType),
    RoundRadius(f32),
}

impl Change {
    fn is_applied(&self, state: &ViewState) -> bool {
        match *self {
            Change::Size(size) => state.size == size,
            Change::Position(position) => state.position == position,
            Change::Visibility(visible) => state.is_visible() == visible,
            Change::RoundType(round_type) => state.round_type == round_type,
            Change::RoundRadius(radius) => state.round_radius == radius,
        }
    }

    fn apply(&self, state: &mut ViewState) {
        match *self {
            Change::Size(size) => state.size = size,
            Change::Position(position) => state.position = position,
            Change::Visibility(visible) => {
                state.set(ViewFlags::VISIBLE, visible);
            }
            Change::RoundType(round_type) => state.round_type = round_type,
            Change::RoundRadius(radius) => state.round_radius = radius,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateRequest {
    /// Who asked for the change.
    pub source: NodeId,
    /// Whose state changes.
    pub target: NodeId,
    pub change: Change,
}

impl UpdateRequest {
    pub fn new(source: NodeId, target: NodeId, change: Change) -> Self {
        UpdateRequest { source, target, change }
    }

    /// A view changing itself, as opposed to a container driving a child.
    pub fn is_self_change(&self) -> bool { self.source == self.target }

    /// Whether performing this request on `node` is followed by a report to
    /// `node`'s parent.
    pub fn reports_from(&self, node: NodeId) -> bool { self.source == node || self.target != node }
}

/// Accepts everything except a direct child trying to change itself; such a
/// change has to go through the container that lays the child out.
pub fn default_update_test(tree: &ViewTree, this: NodeId, request: &UpdateRequest) -> bool {
    !(request.source != this
        && request.is_self_change()
        && tree.parent(request.source) == Some(this))
}

/// Applies the change when this node is the target.
pub fn default_perform_update(tree: &mut ViewTree, this: NodeId, request: &UpdateRequest) {
    if request.target == this {
        tree.apply_change(this, request.change);
    }
}

impl ViewTree {
    pub fn resize(&mut self, id: NodeId, size: Size) -> bool { self.request_update(id, Change::Size(size)) }

    pub fn move_to(&mut self, id: NodeId, position: Point) -> bool {
        self.request_update(id, Change::Position(position))
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        self.request_update(id, Change::Visibility(visible))
    }

    pub fn set_round_type(&mut self, id: NodeId, round_type: RoundType) -> bool {
        self.request_update(id, Change::RoundType(round_type))
    }

    pub fn set_round_radius(&mut self, id: NodeId, radius: f32) -> bool {
        self.request_update(id, Change::RoundRadius(radius))
    }

    /// A view changing itself. The parent gets a veto before the view's own
    /// test runs. Returns whether the change was applied.
    pub fn request_update(&mut self, id: NodeId, change: Change) -> bool {
        let Some(state) = self.state(id) else {
            return false;
        };
        if change.is_applied(state) {
            return false;
        }
        let request = UpdateRequest::new(id, id, change);
        if let Some(parent) = self.parent(id)
            && !self.test_update(parent, &request)
        {
            debug!(?id, ?parent, ?change, "parent refused update");
            return false;
        }
        if !self.test_update(id, &request) {
            debug!(?id, ?change, "view refused update");
            return false;
        }
        self.perform_and_report(id, &request);
        true
    }

    pub fn resize_sub_view(&mut self, container: NodeId, child: NodeId, size: Size) -> bool {
        self.update_sub_view(container, child, Change::Size(size))
    }

    pub fn move_sub_view_to(&mut self, container: NodeId, child: NodeId, position: Point) -> bool {
        self.update_sub_view(container, child, Change::Position(position))
    }

    pub fn set_sub_view_visible(&mut self, container: NodeId, child: NodeId, visible: bool) -> bool {
        self.update_sub_view(container, child, Change::Visibility(visible))
    }

    /// A container driving one of its children. Only the child is asked.
    pub fn update_sub_view(&mut self, container: NodeId, child: NodeId, change: Change) -> bool {
        if self.parent(child) != Some(container) {
            debug!(?container, ?child, "not a sub view");
            return false;
        }
        let Some(state) = self.state(child) else {
            return false;
        };
        if change.is_applied(state) {
            return false;
        }
        let request = UpdateRequest::new(container, child, change);
        if !self.test_update(child, &request) {
            debug!(?child, ?change, "sub view refused update");
            return false;
        }
        self.perform_and_report(child, &request);
        true
    }

    pub fn test_update(&self, node: NodeId, request: &UpdateRequest) -> bool {
        match self.view_dyn(node) {
            Some(view) => view.update_test(self, node, request),
            None => default_update_test(self, node, request),
        }
    }

    /// Performs `request` on `node`, then walks up the parent chain for as
    /// long as each step asks for a report.
    fn perform_and_report(&mut self, node: NodeId, request: &UpdateRequest) {
        let mut current = Some(node);
        while let Some(node) = current {
            let report = self
                .with_view(node, |view, tree| {
                    view.perform_update(tree, node, request);
                    request.reports_from(node) && view.report_update(tree, node, request)
                })
                .unwrap_or_else(|| {
                    default_perform_update(self, node, request);
                    request.reports_from(node)
                });
            current = if report { self.parent(node) } else { None };
        }
    }

    /// Writes a change into the node's state. Only ever reached from a
    /// perform step.
    pub(crate) fn apply_change(&mut self, id: NodeId, change: Change) {
        let Some(state) = self.state_mut(id) else {
            return;
        };
        change.apply(state);
        trace!(?id, ?change, "applied");
        if let Change::Visibility(false) = change
            && let Some(parent) = self.parent(id)
        {
            self.request_redraw(parent);
        }
        self.request_redraw(id);
    }
}
