use slotmap::SparseSecondaryMap;
use tracing::{debug, trace};

use crate::common::geometry::{Point, Size};
use crate::layout_engine::{Orientation, SizePolicy, SplitterHandle};
use crate::model::tree::NodeId;
use crate::view::{
    Change, KeyEvent, MouseEvent, Response, SubViewTracker, UpdateRequest, View, ViewTree,
    default_perform_update,
};

/// Lays its panes out along one axis with a draggable handle between each
/// pair. The child list always alternates `pane, handle, pane, ...`.
#[derive(Debug)]
pub struct Splitter {
    orientation: Orientation,
    handle_size: Option<i32>,
    handles: SparseSecondaryMap<NodeId, ()>,
    tracker: SubViewTracker,
}

enum Repair {
    Drop(NodeId),
    Split(usize),
}

impl Splitter {
    pub fn new(orientation: Orientation) -> Self {
        Splitter {
            orientation,
            handle_size: None,
            handles: SparseSecondaryMap::new(),
            tracker: SubViewTracker::new(),
        }
    }

    /// Overrides the configured handle thickness.
    pub fn with_handle_size(mut self, thickness: i32) -> Self {
        self.handle_size = Some(thickness);
        self
    }

    pub fn orientation(&self) -> Orientation { self.orientation }

    pub fn tracker(&self) -> &SubViewTracker { &self.tracker }

    pub fn is_handle(&self, id: NodeId) -> bool { self.handles.contains_key(id) }

    /// Appends `pane`, separated from the last one by a new handle.
    pub fn add_pane(tree: &mut ViewTree, splitter: NodeId, pane: NodeId, policy: SizePolicy) -> bool {
        tree.with_view_as(splitter, |s: &mut Splitter, tree| s.insert(tree, splitter, None, pane, policy))
            .unwrap_or(false)
    }

    /// Inserts `pane` so that it becomes the pane at `index`.
    pub fn insert_pane(
        tree: &mut ViewTree,
        splitter: NodeId,
        index: usize,
        pane: NodeId,
        policy: SizePolicy,
    ) -> bool {
        tree.with_view_as(splitter, |s: &mut Splitter, tree| {
            s.insert(tree, splitter, Some(index), pane, policy)
        })
        .unwrap_or(false)
    }

    /// Detaches `pane` and destroys one of the handles next to it. The pane
    /// itself stays alive.
    pub fn remove_pane(tree: &mut ViewTree, splitter: NodeId, pane: NodeId) -> bool {
        tree.with_view_as(splitter, |s: &mut Splitter, tree| s.remove(tree, splitter, pane))
            .unwrap_or(false)
    }

    /// Redistributes the room of `splitter` over its panes.
    pub fn fill(tree: &mut ViewTree, splitter: NodeId) -> bool {
        tree.with_view_as(splitter, |s: &mut Splitter, tree| s.fill_sub_frames(tree, splitter))
            .unwrap_or(false)
    }

    pub fn panes(tree: &ViewTree, splitter: NodeId) -> Vec<NodeId> {
        match tree.view::<Splitter>(splitter) {
            Some(s) => s.panes_of(tree, splitter),
            None => Vec::new(),
        }
    }

    pub fn handles(tree: &ViewTree, splitter: NodeId) -> Vec<NodeId> {
        match tree.view::<Splitter>(splitter) {
            Some(s) => tree.children(splitter).filter(|&c| s.is_handle(c)).collect(),
            None => Vec::new(),
        }
    }

    fn panes_of(&self, tree: &ViewTree, this: NodeId) -> Vec<NodeId> {
        tree.children(this).filter(|&c| !self.is_handle(c)).collect()
    }

    fn handle_thickness(&self, tree: &ViewTree) -> i32 {
        self.handle_size.unwrap_or(tree.config().splitter.handle_size)
    }

    fn new_handle(&mut self, tree: &mut ViewTree) -> NodeId {
        let thickness = self.handle_thickness(tree);
        let handle = tree.insert(SplitterHandle::new(self.orientation.perpendicular(), thickness));
        self.handles.insert(handle, ());
        handle
    }

    /// Room each pane would get if one more pane and handle were added.
    pub fn average_room(&self, tree: &ViewTree, this: NodeId) -> i32 {
        let panes = self.panes_of(tree, this).len() as i32;
        let room = self.orientation.extent(tree.size(this));
        (room - self.handle_thickness(tree) * panes) / (panes + 1)
    }

    fn insert(
        &mut self,
        tree: &mut ViewTree,
        this: NodeId,
        index: Option<usize>,
        pane: NodeId,
        policy: SizePolicy,
    ) -> bool {
        if !tree.is_alive(pane) {
            return false;
        }
        if tree.parent(pane) == Some(this) {
            debug!(?pane, "already a pane of this splitter");
            return false;
        }

        let o = self.orientation;
        let panes = self.panes_of(tree, this);
        if panes.is_empty() {
            if !tree.push_back(this, pane) {
                return false;
            }
            let size = tree.size(this);
            tree.resize_sub_view(this, pane, size);
            tree.move_sub_view_to(this, pane, Point::default());
            return true;
        }

        let room = o.extent(tree.size(this));
        let handle_space = self.handle_thickness(tree) * panes.len() as i32;
        let target = match policy {
            SizePolicy::Default => self.average_room(tree, this),
            SizePolicy::Preferred => o.extent(tree.preferred_size(pane)),
            SizePolicy::Current => o.extent(tree.size(pane)),
            SizePolicy::ExpandToFill => {
                let used: i32 = panes.iter().map(|&p| o.extent(tree.preferred_size(p))).sum();
                (room - handle_space - used).max(o.extent(tree.preferred_size(pane)))
            }
        }
        .max(0);

        let mut extents: Vec<i32> = panes.iter().map(|&p| o.extent(tree.size(p))).collect();
        if policy != SizePolicy::Default {
            let squeezed = room - handle_space - target;
            if squeezed >= panes.len() as i32 {
                extents = proportional(&extents, squeezed);
            } else {
                debug!(squeezed, "no room to shrink existing panes");
            }
        }

        let pane_index = index.unwrap_or(panes.len()).min(panes.len());
        let handle = self.new_handle(tree);
        let attached = if pane_index == 0 {
            tree.insert_at(this, 0, pane) && tree.insert_at(this, 1, handle)
        } else {
            let at = 2 * pane_index - 1;
            tree.insert_at(this, at, handle) && tree.insert_at(this, at + 1, pane)
        };
        if !attached {
            self.handles.remove(handle);
            if tree.parent(pane) == Some(this) {
                tree.remove(this, pane);
            }
            tree.destroy(handle);
            return false;
        }

        extents.insert(pane_index, target);
        self.align_sub_frames(tree, this, &extents);
        true
    }

    fn remove(&mut self, tree: &mut ViewTree, this: NodeId, pane: NodeId) -> bool {
        if tree.parent(pane) != Some(this) || self.is_handle(pane) {
            debug!(?pane, "not a pane of this splitter");
            return false;
        }
        let handle = tree.next_sibling(pane).or_else(|| tree.prev_sibling(pane));
        if !tree.remove(this, pane) {
            return false;
        }
        self.tracker.forget(tree, pane);
        if let Some(handle) = handle {
            self.handles.remove(handle);
            self.tracker.forget(tree, handle);
            tree.remove(this, handle);
            tree.destroy(handle);
        }
        self.fill_sub_frames(tree, this);
        true
    }

    /// Restores the alternating layout after children were added or removed
    /// behind the splitter's back, then refills.
    fn normalize(&mut self, tree: &mut ViewTree, this: NodeId) {
        self.handles.retain(|handle, _| tree.parent(handle) == Some(this));
        loop {
            let children: Vec<NodeId> = tree.children(this).collect();
            let mut repair = None;
            // The front edge behaves like a handle: no handle may follow it.
            let mut after_handle = true;
            for (i, &child) in children.iter().enumerate() {
                let is_handle = self.is_handle(child);
                if is_handle && after_handle {
                    repair = Some(Repair::Drop(child));
                    break;
                }
                if !is_handle && !after_handle {
                    repair = Some(Repair::Split(i));
                    break;
                }
                after_handle = is_handle;
            }
            if repair.is_none()
                && let Some(&last) = children.last()
                && self.is_handle(last)
            {
                repair = Some(Repair::Drop(last));
            }
            match repair {
                Some(Repair::Drop(handle)) => {
                    trace!(?handle, "dropping stray handle");
                    self.handles.remove(handle);
                    self.tracker.forget(tree, handle);
                    tree.remove(this, handle);
                    tree.destroy(handle);
                }
                Some(Repair::Split(index)) => {
                    trace!(index, "adding missing handle");
                    let handle = self.new_handle(tree);
                    tree.insert_at(this, index, handle);
                }
                None => break,
            }
        }
        self.fill_sub_frames(tree, this);
    }

    /// Fits the panes into the current room along the axis. Returns false,
    /// leaving the children untouched, when there is no room to share.
    pub fn fill_sub_frames(&mut self, tree: &mut ViewTree, this: NodeId) -> bool {
        let o = self.orientation;
        let children: Vec<NodeId> = tree.children(this).collect();
        if children.is_empty() {
            return true;
        }
        let panes = self.panes_of(tree, this);
        let handle_space = self.handle_thickness(tree) * (children.len() - panes.len()) as i32;
        let available = o.extent(tree.size(this)) - handle_space;
        if available <= 0 {
            debug!(available, "no room to fill");
            return false;
        }
        let old: Vec<i32> = panes.iter().map(|&p| o.extent(tree.size(p))).collect();
        let expand: Vec<bool> = panes
            .iter()
            .map(|&p| match o {
                Orientation::Horizontal => tree.is_expand_x(p),
                Orientation::Vertical => tree.is_expand_y(p),
            })
            .collect();
        let Some(extents) = distribute(&old, &expand, available) else {
            debug!(available, "fixed panes cannot fit");
            return false;
        };
        self.align_sub_frames(tree, this, &extents);
        true
    }

    /// Places the children back to back, panes at `pane_extents` in order,
    /// each spanning the full cross extent.
    fn align_sub_frames(&self, tree: &mut ViewTree, this: NodeId, pane_extents: &[i32]) {
        let o = self.orientation;
        let cross = o.cross_extent(tree.size(this));
        let thickness = self.handle_thickness(tree);
        let children: Vec<NodeId> = tree.children(this).collect();
        let mut extents = pane_extents.iter().copied();
        let mut offset = 0;
        for child in children {
            let extent = if self.is_handle(child) {
                thickness
            } else {
                extents.next().unwrap_or_else(|| o.extent(tree.size(child)))
            };
            tree.resize_sub_view(this, child, o.size(extent, cross));
            tree.move_sub_view_to(this, child, o.point(offset, 0));
            offset += extent;
        }
    }
}

/// Splits `total` in proportion to `old`. The last entry takes the rounding
/// remainder so the result sums to `total` exactly.
pub(crate) fn proportional(old: &[i32], total: i32) -> Vec<i32> {
    let Some(last) = old.len().checked_sub(1) else {
        return Vec::new();
    };
    let sum: i64 = old.iter().map(|&v| i64::from(v.max(0))).sum();
    let mut out: Vec<i32> = if sum == 0 {
        vec![total / old.len() as i32; old.len()]
    } else {
        old.iter().map(|&v| (i64::from(total) * i64::from(v.max(0)) / sum) as i32).collect()
    };
    out[last] = total - out[..last].iter().sum::<i32>();
    out
}

/// New pane extents for `available` units of room.
///
/// With only one kind of pane everything scales. With a mix, expandable
/// panes absorb the change while there is room beyond the fixed panes;
/// once there is not, they keep their size and the fixed panes shrink.
pub(crate) fn distribute(old: &[i32], expand: &[bool], available: i32) -> Option<Vec<i32>> {
    let expandable = expand.iter().filter(|&&e| e).count();
    if expandable == 0 || expandable == old.len() {
        return Some(proportional(old, available));
    }

    let pick = |want: bool| -> Vec<i32> {
        old.iter().zip(expand).filter(|&(_, &e)| e == want).map(|(&v, _)| v).collect()
    };
    let fixed = pick(false);
    let growing = pick(true);
    let fixed_sum: i32 = fixed.iter().sum();
    let growing_sum: i32 = growing.iter().sum();

    let remainder = available - fixed_sum;
    let (fixed, growing) = if remainder > 0 {
        (fixed, proportional(&growing, remainder))
    } else {
        let room = available - growing_sum;
        if room <= 0 {
            return None;
        }
        (proportional(&fixed, room), growing)
    };

    let (mut fixed, mut growing) = (fixed.into_iter(), growing.into_iter());
    expand
        .iter()
        .map(|&e| if e { growing.next() } else { fixed.next() })
        .collect()
}

impl View for Splitter {
    fn preferred_size(&self, tree: &ViewTree, this: NodeId) -> Size {
        let o = self.orientation;
        let mut children = tree.children(this).peekable();
        if children.peek().is_none() {
            return tree.config().view.default_preferred_size();
        }
        let (extent, cross) = children.fold((0, 0), |(extent, cross), child| {
            let preferred = tree.preferred_size(child);
            (extent + o.extent(preferred), cross.max(o.cross_extent(preferred)))
        });
        o.size(extent, cross)
    }

    fn is_expand_x(&self, tree: &ViewTree, this: NodeId) -> bool {
        tree.children(this).any(|child| tree.is_expand_x(child))
    }

    fn is_expand_y(&self, tree: &ViewTree, this: NodeId) -> bool {
        tree.children(this).any(|child| tree.is_expand_y(child))
    }

    /// Panes do not get to move or resize themselves.
    fn update_test(&self, tree: &ViewTree, this: NodeId, request: &UpdateRequest) -> bool {
        let own_child = request.source != this
            && request.is_self_change()
            && tree.parent(request.source) == Some(this);
        !(own_child && matches!(request.change, Change::Size(_) | Change::Position(_)))
    }

    fn perform_update(&mut self, tree: &mut ViewTree, this: NodeId, request: &UpdateRequest) {
        default_perform_update(tree, this, request);
        if request.target == this && matches!(request.change, Change::Size(_)) {
            self.fill_sub_frames(tree, this);
        }
    }

    fn sub_view_added(&mut self, tree: &mut ViewTree, this: NodeId, _child: NodeId) {
        self.normalize(tree, this);
    }

    fn sub_view_removed(&mut self, tree: &mut ViewTree, this: NodeId, child: NodeId) {
        self.tracker.forget(tree, child);
        self.handles.remove(child);
        self.normalize(tree, this);
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
