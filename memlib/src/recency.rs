/// A doubly-linked recency ordering over a fixed pool of nodes
///
/// Nodes are addressed by their index into the pool and the links are plain
/// index pairs, so the same structure serves per-set LRU tracking, the free
/// frame list, and the used frame list without any pointer plumbing
///
/// Head is the most recently touched node; tail is the least recently touched
/// and therefore the eviction candidate. All reordering operations are O(1)
#[derive(Debug, Clone)]
pub struct RecencyList {
    links: Vec<Link>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Link {
    prev: Option<usize>,
    next: Option<usize>,
    linked: bool,
}

impl RecencyList {
    /// Creates a list over a pool of `capacity` nodes with nothing linked
    pub fn unlinked(capacity: usize) -> Self {
        Self {
            links: vec![Link::default(); capacity],
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates a list with every node linked in ascending order, so node 0
    /// starts at the head and node `capacity - 1` is the initial victim
    pub fn linked(capacity: usize) -> Self {
        let mut list = Self::unlinked(capacity);
        for node in (0..capacity).rev() {
            list.insert_head(node);
        }
        list
    }

    pub fn capacity(&self) -> usize {
        self.links.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// The least recently touched linked node. Does not unlink it
    pub fn tail(&self) -> Option<usize> {
        self.tail
    }

    pub fn contains(&self, node: usize) -> bool {
        self.links[node].linked
    }

    /// Links `node` at the head of the list. The node must not already be
    /// linked
    pub fn insert_head(&mut self, node: usize) {
        debug_assert!(!self.links[node].linked);
        self.links[node] = Link {
            prev: None,
            next: self.head,
            linked: true,
        };
        if let Some(old_head) = self.head {
            self.links[old_head].prev = Some(node);
        }
        self.head = Some(node);
        if self.tail.is_none() {
            self.tail = Some(node);
        }
        self.len += 1;
    }

    /// Unlinks `node` from wherever it sits
    pub fn remove(&mut self, node: usize) {
        debug_assert!(self.links[node].linked);
        let Link { prev, next, .. } = self.links[node];
        match prev {
            Some(p) => self.links[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.links[n].prev = prev,
            None => self.tail = prev,
        }
        self.links[node] = Link::default();
        self.len -= 1;
    }

    /// Unlinks and returns the head node, if any
    pub fn pop_head(&mut self) -> Option<usize> {
        let node = self.head?;
        self.remove(node);
        Some(node)
    }

    /// Moves `node` to the head, marking it most recently used. No-op if the
    /// node is already the head
    pub fn touch(&mut self, node: usize) {
        if self.head == Some(node) {
            return;
        }
        self.remove(node);
        self.insert_head(node);
    }
}
