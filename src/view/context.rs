//! The seam between the view tree and whatever actually puts pixels on
//! screen. Views only ever talk to a [`RenderContext`]; the headless
//! implementation records what was asked of it.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::common::geometry::Point;
use crate::model::tree::NodeId;
use crate::view::AsAny;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorShape {
    #[default]
    Arrow,
    /// Resize left/right, shown over handles that split panes horizontally.
    SplitH,
    /// Resize up/down.
    SplitV,
    Hand,
    IBeam,
}

pub trait RenderContext: AsAny {
    /// Cursor position in window coordinates.
    fn cursor_position(&self) -> Point;

    fn set_cursor(&mut self, cursor: CursorShape);

    fn push_cursor(&mut self, cursor: CursorShape);

    fn pop_cursor(&mut self);

    /// Asks the platform to present `window` on the next frame.
    fn synchronize(&mut self, window: NodeId);
}

#[derive(Debug, Default)]
pub struct HeadlessContext {
    cursor_position: Point,
    cursor: CursorShape,
    cursor_stack: Vec<CursorShape>,
    synchronized: Vec<NodeId>,
}

impl HeadlessContext {
    pub fn new() -> Self { Self::default() }

    pub fn set_cursor_position(&mut self, position: Point) { self.cursor_position = position; }

    pub fn cursor(&self) -> CursorShape { self.cursor }

    pub fn cursor_depth(&self) -> usize { self.cursor_stack.len() }

    /// Every window synchronization requested so far, oldest first.
    pub fn synchronized(&self) -> &[NodeId] { &self.synchronized }

    pub fn sync_count(&self) -> usize { self.synchronized.len() }

    pub fn clear_synchronized(&mut self) { self.synchronized.clear(); }
}

impl RenderContext for HeadlessContext {
    fn cursor_position(&self) -> Point { self.cursor_position }

    fn set_cursor(&mut self, cursor: CursorShape) { self.cursor = cursor; }

    fn push_cursor(&mut self, cursor: CursorShape) {
        self.cursor_stack.push(self.cursor);
        self.cursor = cursor;
    }

    fn pop_cursor(&mut self) {
        if let Some(previous) = self.cursor_stack.pop() {
            self.cursor = previous;
        }
    }

    fn synchronize(&mut self, window: NodeId) {
        trace!(?window, "synchronize");
        self.synchronized.push(window);
    }
}
