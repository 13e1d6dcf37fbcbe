use tracing::debug;

use crate::common::geometry::{Point, Size};
use crate::layout_engine::Orientation;
use crate::model::tree::NodeId;
use crate::view::{CursorShape, MouseEvent, Response, View, ViewTree};

/// Geometry captured when a drag starts. Every move is computed from this
/// snapshot, so a rejected step leaves nothing half-applied.
#[derive(Clone, Copy, Debug)]
struct DragOrigin {
    cursor: Point,
    handle: Point,
    prev: NodeId,
    prev_size: Size,
    next: NodeId,
    next_position: Point,
    next_size: Size,
}

/// The bar between two panes of a [`crate::layout_engine::Splitter`]. Its
/// orientation is perpendicular to the splitter's.
#[derive(Debug)]
pub struct SplitterHandle {
    orientation: Orientation,
    thickness: i32,
    drag: Option<DragOrigin>,
}

impl SplitterHandle {
    pub fn new(orientation: Orientation, thickness: i32) -> Self {
        SplitterHandle { orientation, thickness, drag: None }
    }

    pub fn orientation(&self) -> Orientation { self.orientation }

    pub fn thickness(&self) -> i32 { self.thickness }

    pub fn is_dragging(&self) -> bool { self.drag.is_some() }

    fn cursor_shape(&self) -> CursorShape {
        match self.orientation {
            Orientation::Vertical => CursorShape::SplitH,
            Orientation::Horizontal => CursorShape::SplitV,
        }
    }

    /// Moves the handle so that it sits `delta` away from where the drag
    /// started. A step that would shrink either pane to nothing is dropped.
    fn drag_to(&self, tree: &mut ViewTree, this: NodeId, origin: &DragOrigin, cursor: Point) -> bool {
        let Some(splitter) = tree.parent(this) else {
            return false;
        };
        let axis = self.orientation.perpendicular();
        let delta = axis.offset(cursor) - axis.offset(origin.cursor);
        let prev_extent = axis.extent(origin.prev_size) + delta;
        let next_extent = axis.extent(origin.next_size) - delta;
        if prev_extent <= 0 || next_extent <= 0 {
            debug!(delta, prev_extent, next_extent, "drag would collapse a pane");
            return false;
        }

        let shift = axis.point(delta, 0);
        tree.resize_sub_view(
            splitter,
            origin.prev,
            axis.size(prev_extent, axis.cross_extent(origin.prev_size)),
        );
        tree.move_sub_view_to(splitter, this, origin.handle + shift);
        tree.move_sub_view_to(splitter, origin.next, origin.next_position + shift);
        tree.resize_sub_view(
            splitter,
            origin.next,
            axis.size(next_extent, axis.cross_extent(origin.next_size)),
        );
        true
    }
}

impl View for SplitterHandle {
    fn preferred_size(&self, _tree: &ViewTree, _this: NodeId) -> Size {
        Size::new(self.thickness, self.thickness)
    }

    fn perform_hover_in(&mut self, tree: &mut ViewTree, this: NodeId) {
        tree.render_context_mut().push_cursor(self.cursor_shape());
        tree.request_redraw(this);
    }

    fn perform_hover_out(&mut self, tree: &mut ViewTree, this: NodeId) {
        tree.render_context_mut().pop_cursor();
        tree.request_redraw(this);
    }

    fn perform_mouse_press(&mut self, tree: &mut ViewTree, this: NodeId, _event: &MouseEvent) -> Response {
        let (Some(prev), Some(next)) = (tree.prev_sibling(this), tree.next_sibling(this)) else {
            return Response::Ignore;
        };
        self.drag = Some(DragOrigin {
            cursor: tree.render_context().cursor_position(),
            handle: tree.position(this),
            prev,
            prev_size: tree.size(prev),
            next,
            next_position: tree.position(next),
            next_size: tree.size(next),
        });
        tree.set_pressed(this, true);
        Response::Finish
    }

    fn perform_mouse_move(&mut self, tree: &mut ViewTree, this: NodeId, _event: &MouseEvent) -> Response {
        let Some(origin) = self.drag else {
            return Response::Ignore;
        };
        let cursor = tree.render_context().cursor_position();
        self.drag_to(tree, this, &origin, cursor);
        Response::Finish
    }

    fn perform_mouse_release(
        &mut self,
        tree: &mut ViewTree,
        this: NodeId,
        _event: &MouseEvent,
    ) -> Response {
        if self.drag.take().is_none() {
            return Response::Ignore;
        }
        tree.set_pressed(this, false);
        Response::Finish
    }
}
