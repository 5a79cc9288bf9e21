//! Bucket chains for [`HashTable`](crate::hash_table::HashTable).
//!
//! Entries live in a slab of [`Node`]s and never move once inserted. A
//! [`Bucket`] is a doubly linked chain threaded through that slab, so
//! unlinking a node, inserting before a node and moving a node to another
//! bucket are all O(1) and never touch the entry payload.

use alloc::vec::Vec;

/// Sentinel link marking the end of a chain or of the free list.
pub(crate) const NIL: usize = usize::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Bucket {
    pub(crate) head: usize,
    pub(crate) tail: usize,
    pub(crate) len: usize,
}

impl Bucket {
    pub(crate) const EMPTY: Bucket = Bucket {
        head: NIL,
        tail: NIL,
        len: 0,
    };

    /// Appends the detached node `index` to the end of this chain.
    pub(crate) fn push_back<E>(&mut self, nodes: &mut Nodes<E>, index: usize) {
        let tail = self.tail;
        {
            let node = nodes.node_mut(index);
            node.prev = tail;
            node.next = NIL;
        }
        if tail == NIL {
            self.head = index;
        } else {
            nodes.node_mut(tail).next = index;
        }
        self.tail = index;
        self.len += 1;
    }

    /// Links the detached node `index` directly in front of `at`, which must
    /// already belong to this chain.
    pub(crate) fn insert_before<E>(&mut self, nodes: &mut Nodes<E>, at: usize, index: usize) {
        let prev = nodes.node(at).prev;
        {
            let node = nodes.node_mut(index);
            node.prev = prev;
            node.next = at;
        }
        nodes.node_mut(at).prev = index;
        if prev == NIL {
            self.head = index;
        } else {
            nodes.node_mut(prev).next = index;
        }
        self.len += 1;
    }

    /// Detaches `index` from this chain. The node stays allocated in the slab.
    pub(crate) fn unlink<E>(&mut self, nodes: &mut Nodes<E>, index: usize) {
        let (prev, next) = {
            let node = nodes.node(index);
            (node.prev, node.next)
        };
        if prev == NIL {
            self.head = next;
        } else {
            nodes.node_mut(prev).next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            nodes.node_mut(next).prev = prev;
        }
        debug_assert!(self.len > 0);
        self.len -= 1;
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<E> {
    pub(crate) entry: E,
    pub(crate) hash: u64,
    pub(crate) prev: usize,
    pub(crate) next: usize,
}

#[derive(Clone, Debug)]
pub(crate) enum Slot<E> {
    Occupied(Node<E>),
    Vacant { next_free: usize },
}

/// Slab of chain nodes with an intrusive free list.
#[derive(Clone, Debug)]
pub(crate) struct Nodes<E> {
    slots: Vec<Slot<E>>,
    free: usize,
}

impl<E> Nodes<E> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: NIL,
        }
    }

    /// Stores `entry` in a detached node and returns its index.
    pub(crate) fn alloc(&mut self, entry: E, hash: u64) -> usize {
        let node = Node {
            entry,
            hash,
            prev: NIL,
            next: NIL,
        };

        if self.free == NIL {
            self.slots.push(Slot::Occupied(node));
            return self.slots.len() - 1;
        }

        let index = self.free;
        match core::mem::replace(&mut self.slots[index], Slot::Occupied(node)) {
            Slot::Vacant { next_free } => self.free = next_free,
            Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
        }
        index
    }

    /// Frees a detached node and hands back its entry.
    pub(crate) fn release(&mut self, index: usize) -> E {
        let slot = core::mem::replace(
            &mut self.slots[index],
            Slot::Vacant {
                next_free: self.free,
            },
        );
        match slot {
            Slot::Occupied(node) => {
                self.free = index;
                node.entry
            }
            Slot::Vacant { .. } => panic!("handle {index} refers to a vacant slot"),
        }
    }

    #[inline]
    pub(crate) fn node(&self, index: usize) -> &Node<E> {
        match &self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("handle {index} refers to a vacant slot"),
        }
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, index: usize) -> &mut Node<E> {
        match &mut self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("handle {index} refers to a vacant slot"),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free = NIL;
    }

    /// Makes room for `additional` new nodes beyond those already stored.
    pub(crate) fn try_reserve(
        &mut self,
        additional: usize,
        live: usize,
    ) -> Result<(), alloc::collections::TryReserveError> {
        // Vacant slots are reused first, so only the shortfall needs capacity.
        let vacant = self.slots.len() - live;
        self.slots.try_reserve(additional.saturating_sub(vacant))
    }

    /// Takes every slot out of the slab, leaving it empty.
    pub(crate) fn take_slots(&mut self) -> Vec<Slot<E>> {
        self.free = NIL;
        core::mem::take(&mut self.slots)
    }

    /// Raw base pointer and length, for iterators that hand out disjoint
    /// mutable references.
    pub(crate) fn slots_mut_ptr(&mut self) -> (*mut Slot<E>, usize) {
        (self.slots.as_mut_ptr(), self.slots.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(bucket: &Bucket, nodes: &Nodes<u32>) -> Vec<u32> {
        let mut out = Vec::new();
        let mut cursor = bucket.head;
        while cursor != NIL {
            let node = nodes.node(cursor);
            out.push(node.entry);
            cursor = node.next;
        }
        out
    }

    #[test]
    fn push_insert_and_unlink() {
        let mut nodes = Nodes::new();
        let mut bucket = Bucket::EMPTY;

        let a = nodes.alloc(1, 0);
        let b = nodes.alloc(2, 0);
        let c = nodes.alloc(3, 0);
        bucket.push_back(&mut nodes, a);
        bucket.push_back(&mut nodes, c);
        bucket.insert_before(&mut nodes, c, b);
        assert_eq!(chain(&bucket, &nodes), [1, 2, 3]);
        assert_eq!(bucket.len, 3);

        bucket.unlink(&mut nodes, a);
        assert_eq!(chain(&bucket, &nodes), [2, 3]);
        bucket.unlink(&mut nodes, c);
        assert_eq!(chain(&bucket, &nodes), [2]);
        assert_eq!(bucket.head, bucket.tail);

        let d = nodes.alloc(4, 0);
        bucket.insert_before(&mut nodes, b, d);
        assert_eq!(chain(&bucket, &nodes), [4, 2]);
    }

    #[test]
    fn released_slots_are_reused() {
        let mut nodes = Nodes::new();
        let a = nodes.alloc(10u32, 0);
        let b = nodes.alloc(20, 0);
        assert_eq!(nodes.release(a), 10);
        assert!(matches!(nodes.slots[a], Slot::Vacant { .. }));
        let c = nodes.alloc(30, 0);
        assert_eq!(c, a);
        assert_eq!(nodes.node(b).entry, 20);
        assert_eq!(nodes.node(c).entry, 30);
    }

    #[test]
    #[should_panic(expected = "vacant slot")]
    fn stale_index_panics() {
        let mut nodes = Nodes::new();
        let a = nodes.alloc(1u32, 0);
        nodes.release(a);
        nodes.node(a);
    }
}
