use slotmap::SlotMap;
use thiserror::Error;

slotmap::new_key_type! {
    /// Represents a node somewhere in the forest.
    ///
    /// Keys are generational: once a node is freed, every copy of its id
    /// fails lookups even if the slot is reused.
    pub struct NodeId;
}

/// Structural precondition violations.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0:?} does not exist")]
    Stale(NodeId),
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("node {child:?} is already a child of {parent:?}")]
    AlreadyChild { parent: NodeId, child: NodeId },
    #[error("node {child:?} is still attached to {parent:?}")]
    Attached { parent: NodeId, child: NodeId },
    #[error("node {0:?} has no parent")]
    Detached(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

/// Links of one node. The sibling list is intrusive: every node carries its
/// own prev/next pointers and the parent only knows both ends.
#[derive(Default, PartialEq, Debug)]
struct Node {
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    child_count: usize,
}

/// Map that holds the structure of the forest.
///
/// Any number of roots can live in one map, which makes moving branches
/// between trees a relink instead of a copy.
#[derive(Default)]
pub struct NodeMap {
    map: SlotMap<NodeId, Node>,
}

impl NodeMap {
    pub fn new() -> NodeMap { NodeMap { map: SlotMap::default() } }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    pub fn contains(&self, id: NodeId) -> bool { self.map.contains_key(id) }

    /// Creates a detached node.
    pub fn mk_node(&mut self) -> NodeId { self.map.insert(Node::default()) }

    /// Frees a node. If it is still attached it is unlinked first and any
    /// remaining children become detached roots.
    pub fn free(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.unlink(id);
        let mut iter = self.map[id].first_child;
        while let Some(child) = iter {
            iter = self.map[child].next_sibling;
            let node = &mut self.map[child];
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
        self.map.remove(id);
        true
    }

    pub fn child_count(&self, parent: NodeId) -> usize {
        self.map.get(parent).map(|n| n.child_count).unwrap_or(0)
    }

    /// Returns the child at `index`, walking from whichever end is closer.
    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        let node = self.map.get(parent)?;
        if index >= node.child_count {
            return None;
        }
        if index <= node.child_count / 2 {
            parent.children(self).nth(index)
        } else {
            parent.children_rev(self).nth(node.child_count - 1 - index)
        }
    }

    pub fn index_of(&self, child: NodeId) -> Option<usize> {
        let parent = child.parent(self)?;
        parent.children(self).position(|c| c == child)
    }

    pub fn try_push_back(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_attachable(parent, child)?;
        let last = self.map[parent].last_child;
        self.link(parent, child, last, None);
        Ok(())
    }

    pub fn try_push_front(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_attachable(parent, child)?;
        let first = self.map[parent].first_child;
        self.link(parent, child, None, first);
        Ok(())
    }

    /// Inserts `child` so that it ends up at `index`. Indices past the end
    /// append.
    pub fn try_insert_at(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), TreeError> {
        self.check_attachable(parent, child)?;
        match self.child_at(parent, index) {
            Some(next) => {
                let prev = self.map[next].prev_sibling;
                self.link(parent, child, prev, Some(next));
            }
            None => {
                let last = self.map[parent].last_child;
                self.link(parent, child, last, None);
            }
        }
        Ok(())
    }

    pub fn try_insert_before(&mut self, sibling: NodeId, child: NodeId) -> Result<(), TreeError> {
        let parent = self.node(sibling)?.parent.ok_or(TreeError::Detached(sibling))?;
        self.check_attachable(parent, child)?;
        let prev = self.map[sibling].prev_sibling;
        self.link(parent, child, prev, Some(sibling));
        Ok(())
    }

    pub fn try_insert_after(&mut self, sibling: NodeId, child: NodeId) -> Result<(), TreeError> {
        let parent = self.node(sibling)?.parent.ok_or(TreeError::Detached(sibling))?;
        self.check_attachable(parent, child)?;
        let next = self.map[sibling].next_sibling;
        self.link(parent, child, Some(sibling), next);
        Ok(())
    }

    /// Unlinks `child` from `parent`. The node stays in the map, detached.
    pub fn try_remove(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(TreeError::NotAChild { parent, child });
        }
        self.unlink(child);
        Ok(())
    }

    pub fn move_to_first(&mut self, child: NodeId) -> bool {
        let Some(parent) = child.parent(self) else {
            return false;
        };
        if self.map[parent].first_child == Some(child) {
            return false;
        }
        self.unlink(child);
        let first = self.map[parent].first_child;
        self.link(parent, child, None, first);
        true
    }

    pub fn move_to_last(&mut self, child: NodeId) -> bool {
        let Some(parent) = child.parent(self) else {
            return false;
        };
        if self.map[parent].last_child == Some(child) {
            return false;
        }
        self.unlink(child);
        let last = self.map[parent].last_child;
        self.link(parent, child, last, None);
        true
    }

    /// Moves `child` one step toward the end of the list.
    pub fn move_forward(&mut self, child: NodeId) -> bool {
        let (Some(parent), Some(next)) = (child.parent(self), child.next_sibling(self)) else {
            return false;
        };
        self.unlink(child);
        let after = self.map[next].next_sibling;
        self.link(parent, child, Some(next), after);
        true
    }

    /// Moves `child` one step toward the front of the list.
    pub fn move_backward(&mut self, child: NodeId) -> bool {
        let (Some(parent), Some(prev)) = (child.parent(self), child.prev_sibling(self)) else {
            return false;
        };
        self.unlink(child);
        let before = self.map[prev].prev_sibling;
        self.link(parent, child, before, Some(prev));
        true
    }

    /// Exchanges the positions of two children of the same parent.
    pub fn try_swap(&mut self, a: NodeId, b: NodeId) -> Result<bool, TreeError> {
        let parent = self.node(a)?.parent.ok_or(TreeError::Detached(a))?;
        if self.node(b)?.parent != Some(parent) {
            return Err(TreeError::NotAChild { parent, child: b });
        }
        if a == b {
            return Ok(false);
        }
        let (first, second) = match (self.index_of(a), self.index_of(b)) {
            (Some(ia), Some(ib)) if ia < ib => (a, b),
            _ => (b, a),
        };
        let after_second = self.map[second].next_sibling;
        self.unlink(second);
        let before_first = self.map[first].prev_sibling;
        self.link(parent, second, before_first, Some(first));
        self.unlink(first);
        match after_second {
            Some(next) => {
                let prev = self.map[next].prev_sibling;
                self.link(parent, first, prev, Some(next));
            }
            None => {
                let last = self.map[parent].last_child;
                self.link(parent, first, last, None);
            }
        }
        Ok(true)
    }

    /// Checks the structural invariants of `node` and its direct children.
    pub fn validate(&self, node: NodeId) -> Result<(), String> {
        let n = self.node(node).map_err(|e| e.to_string())?;
        if n.first_child.is_none() != n.last_child.is_none()
            || n.first_child.is_none() != (n.child_count == 0)
        {
            return Err(format!(
                "{node:?}: inconsistent ends first={:?} last={:?} count={}",
                n.first_child, n.last_child, n.child_count
            ));
        }
        if n.parent.is_none() && (n.prev_sibling.is_some() || n.next_sibling.is_some()) {
            return Err(format!("{node:?}: root node has sibling links"));
        }
        let mut count = 0;
        let mut prev = None;
        let mut iter = n.first_child;
        while let Some(child) = iter {
            let c = self.node(child).map_err(|e| e.to_string())?;
            if c.parent != Some(node) {
                return Err(format!("{child:?}: parent is {:?}, expected {node:?}", c.parent));
            }
            if c.prev_sibling != prev {
                return Err(format!("{child:?}: prev is {:?}, expected {prev:?}", c.prev_sibling));
            }
            count += 1;
            if count > n.child_count {
                return Err(format!("{node:?}: more children than count {}", n.child_count));
            }
            prev = Some(child);
            iter = c.next_sibling;
        }
        if prev != n.last_child {
            return Err(format!("{node:?}: last child {:?}, walk ended at {prev:?}", n.last_child));
        }
        if count != n.child_count {
            return Err(format!("{node:?}: walked {count} children, count says {}", n.child_count));
        }
        Ok(())
    }

    fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.map.get(id).ok_or(TreeError::Stale(id))
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.node(parent)?;
        if let Some(current) = self.node(child)?.parent {
            return Err(if current == parent {
                TreeError::AlreadyChild { parent, child }
            } else {
                TreeError::Attached { parent: current, child }
            });
        }
        if parent.ancestors(self).any(|a| a == child) {
            return Err(TreeError::Cycle { parent, child });
        }
        Ok(())
    }

    /// Links a detached `child` under `parent` between the adjacent children
    /// `prev` and `next` (`None` meaning the respective end of the list).
    fn link(&mut self, parent: NodeId, child: NodeId, prev: Option<NodeId>, next: Option<NodeId>) {
        {
            let node = &mut self.map[child];
            debug_assert!(node.parent.is_none(), "linking an attached node {child:?}");
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        match prev {
            Some(prev) => self.map[prev].next_sibling = Some(child),
            None => self.map[parent].first_child = Some(child),
        }
        match next {
            Some(next) => self.map[next].prev_sibling = Some(child),
            None => self.map[parent].last_child = Some(child),
        }
        self.map[parent].child_count += 1;
    }

    fn unlink(&mut self, id: NodeId) {
        let Some((Some(parent), prev, next)) =
            self.map.get(id).map(|n| (n.parent, n.prev_sibling, n.next_sibling))
        else {
            return;
        };
        match prev {
            Some(prev) => self.map[prev].next_sibling = next,
            None => self.map[parent].first_child = next,
        }
        match next {
            Some(next) => self.map[next].prev_sibling = prev,
            None => self.map[parent].last_child = prev,
        }
        self.map[parent].child_count -= 1;
        let node = &mut self.map[id];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }
}

impl NodeId {
    pub fn parent(self, map: &NodeMap) -> Option<NodeId> { map.map.get(self).and_then(|n| n.parent) }

    pub fn children(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        ChildIterator {
            cur: map.map.get(self).and_then(|n| n.first_child),
            map,
        }
    }

    pub fn children_rev(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        ChildRevIterator {
            cur: map.map.get(self).and_then(|n| n.last_child),
            map,
        }
    }

    pub fn traverse_postorder(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        PostorderTraversal::new(map, self)
    }

    pub fn traverse_preorder(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        PreorderTraversal::new(map, self)
    }

    /// Returns an iterator over all ancestors of the current node, including itself.
    pub fn ancestors(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = map.contains(self).then_some(self);
        std::iter::from_fn(move || {
            let node = next;
            next = node.and_then(|n| n.parent(map));
            node
        })
    }

    pub fn is_ancestor_of(self, other: NodeId, map: &NodeMap) -> bool {
        other.ancestors(map).skip(1).any(|a| a == self)
    }

    pub fn next_sibling(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.next_sibling)
    }

    pub fn prev_sibling(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.prev_sibling)
    }

    pub fn first_child(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.first_child)
    }

    pub fn last_child(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.last_child)
    }

    pub fn is_empty(self, map: &NodeMap) -> bool {
        map.map.get(self).map(|n| n.first_child.is_none()).unwrap_or(true)
    }
}

struct ChildIterator<'a> {
    cur: Option<NodeId>,
    map: &'a NodeMap,
}

impl<'a> Iterator for ChildIterator<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = id.next_sibling(self.map);
        Some(id)
    }
}

struct ChildRevIterator<'a> {
    cur: Option<NodeId>,
    map: &'a NodeMap,
}

impl<'a> Iterator for ChildRevIterator<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = id.prev_sibling(self.map);
        Some(id)
    }
}

struct PostorderTraversal<'a> {
    cur: Option<NodeId>,
    top: NodeId,
    map: &'a NodeMap,
}

impl<'a> PostorderTraversal<'a> {
    fn new(map: &'a NodeMap, root: NodeId) -> Self {
        Self {
            top: root,
            cur: map.contains(root).then(|| Self::descend_left(root, map)),
            map,
        }
    }

    fn descend_left(mut node: NodeId, map: &'a NodeMap) -> NodeId {
        while let Some(child) = node.first_child(map) {
            node = child;
        }
        node
    }
}

impl<'a> Iterator for PostorderTraversal<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cur?;
        self.cur = None;
        if node != self.top {
            if let Some(next) = node.next_sibling(self.map) {
                self.cur = Some(Self::descend_left(next, self.map));
            } else {
                self.cur = node.parent(self.map);
            }
        }
        Some(node)
    }
}

struct PreorderTraversal<'a> {
    top: NodeId,
    cur: Option<NodeId>,
    map: &'a NodeMap,
}

impl<'a> PreorderTraversal<'a> {
    fn new(map: &'a NodeMap, root: NodeId) -> Self {
        Self {
            top: root,
            cur: map.contains(root).then_some(root),
            map,
        }
    }
}

impl<'a> Iterator for PreorderTraversal<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cur?;
        if let Some(child) = node.first_child(self.map) {
            self.cur = Some(child);
        } else {
            self.cur = None;
            for ancestor in node.ancestors(self.map) {
                if ancestor == self.top {
                    break;
                }
                if let Some(sibling) = ancestor.next_sibling(self.map) {
                    self.cur = Some(sibling);
                    break;
                }
            }
        }
        Some(node)
    }
}
