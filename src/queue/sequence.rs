//! Singly linked FIFO sequence backed by a slot arena.
//!
//! Nodes live in one `Vec` and link to each other through [`NodeId`]
//! handles, so callers can hold on to a node without borrowing the
//! sequence. A handle stays valid until its node is popped; the slot is
//! then recycled for the next push.

/// Stable handle to a node in a [`LinkedSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<T> {
    value: T,
    next: Option<NodeId>,
}

#[derive(Debug)]
pub struct LinkedSequence<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl<T> Default for LinkedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinkedSequence<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append after the current tail and return the new node's handle.
    pub fn push_back(&mut self, value: T) -> NodeId {
        let node = Node { value, next: None };
        let id = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        };

        match self.tail.and_then(|tail| self.node_mut(tail)) {
            Some(tail) => tail.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        id
    }

    /// Detach the head node, returning its handle and value.
    pub fn pop_front(&mut self) -> Option<(NodeId, T)> {
        let head = self.head?;
        let node = self.slots.get_mut(head.0)?.take()?;

        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        self.free.push(head.0);
        self.len -= 1;
        Some((head, node.value))
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id).map(|node| &mut node.value)
    }

    /// Rebuild every link so traversal follows `order` exactly.
    ///
    /// `order` must name each live node once; stale handles are skipped.
    pub fn relink(&mut self, order: &[NodeId]) {
        debug_assert_eq!(order.len(), self.len, "relink order must cover every node");

        for (pos, &id) in order.iter().enumerate() {
            let next = order.get(pos + 1).copied();
            if let Some(node) = self.node_mut(id) {
                node.next = next;
            }
        }
        self.head = order.first().copied();
        self.tail = order.last().copied();
        tracing::trace!(len = order.len(), "relinked sequence");
    }

    /// Head-to-tail traversal. Each call starts again from the head.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            seq: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }
}

pub struct Iter<'a, T> {
    seq: &'a LinkedSequence<T>,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        // Never yields more than `len` items.
        if self.remaining == 0 {
            return None;
        }
        let node = self.seq.node(self.cursor?)?;
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a, T> IntoIterator for &'a LinkedSequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
