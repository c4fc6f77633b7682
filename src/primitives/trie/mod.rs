#![forbid(unsafe_code)]
//! Path-compressed binary trie keyed by bit sequences.
//!
//! Each node matches a run of bits (`key`) starting at bit `bias` of the query
//! and branches on the next unmatched bit: `0` goes left, `1` goes right. The
//! concatenation of keys from the root down to a node is that node's path.
//! Inserting a vector yields the unique node whose path equals the vector, so
//! duplicate kill-vectors collapse onto one node in time proportional to the
//! vector length rather than to the number of distinct vectors seen.
//!
//! Nodes live in an arena owned by [`BitTrieTree`]; parent and child links are
//! arena indexes and the whole tree is released in one pass on drop or
//! [`BitTrieTree::clear`].

use crate::primitives::bits::BitSequence;
use crate::types::VertexId;

/// Handle to a node of a [`BitTrieTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TrieNodeId(usize);

/// One node of the trie.
#[derive(Clone, Debug)]
pub struct BitTrie {
    bias: usize,
    key: BitSequence,
    parent: Option<TrieNodeId>,
    left: Option<TrieNodeId>,
    right: Option<TrieNodeId>,
    terminal: bool,
    data: Option<VertexId>,
}

impl BitTrie {
    fn new(bias: usize, key: BitSequence, parent: Option<TrieNodeId>) -> Self {
        Self {
            bias,
            key,
            parent,
            left: None,
            right: None,
            terminal: false,
            data: None,
        }
    }

    /// Index of the first query bit matched by this node.
    pub fn bias(&self) -> usize {
        self.bias
    }

    /// Bits matched by this node, starting at [`Self::bias`].
    pub fn key(&self) -> &BitSequence {
        &self.key
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<TrieNodeId> {
        self.parent
    }

    /// Child taken when the next bit is zero.
    pub fn left(&self) -> Option<TrieNodeId> {
        self.left
    }

    /// Child taken when the next bit is one.
    pub fn right(&self) -> Option<TrieNodeId> {
        self.right
    }

    /// Whether the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Whether some inserted vector ends exactly at this node.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Vertex attached to this node, if any.
    pub fn data(&self) -> Option<VertexId> {
        self.data
    }

    fn child(&self, bit: bool) -> Option<TrieNodeId> {
        if bit {
            self.right
        } else {
            self.left
        }
    }

    fn set_child(&mut self, bit: bool, child: TrieNodeId) {
        if bit {
            self.right = Some(child);
        } else {
            self.left = Some(child);
        }
    }
}

/// Arena-backed trie mapping bit sequences to canonical nodes.
#[derive(Debug, Default)]
pub struct BitTrieTree {
    nodes: Vec<BitTrie>,
    root: Option<TrieNodeId>,
}

impl BitTrieTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Root node, `None` while the tree is empty.
    pub fn root(&self) -> Option<TrieNodeId> {
        self.root
    }

    /// Number of nodes allocated, internal nodes included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Borrows a node by handle.
    ///
    /// Handles are only produced by this tree, so lookups cannot miss until
    /// the tree is cleared.
    pub fn node(&self, id: TrieNodeId) -> &BitTrie {
        &self.nodes[id.0]
    }

    /// Returns the node whose path equals `vector`, creating it when absent.
    ///
    /// At most one branching node and one new leaf are allocated per call.
    pub fn insert(&mut self, vector: &BitSequence) -> TrieNodeId {
        let Some(mut cur) = self.root else {
            let id = self.push(BitTrie::new(0, vector.clone(), None));
            self.nodes[id.0].terminal = true;
            self.root = Some(id);
            return id;
        };
        let mut pos = 0usize;
        loop {
            let key_len = self.nodes[cur.0].key.len();
            let matched = self.nodes[cur.0].key.common_prefix(vector, pos);
            if matched < key_len {
                let mid = self.split(cur, matched);
                let at = pos + matched;
                if at == vector.len() {
                    self.nodes[mid.0].terminal = true;
                    return mid;
                }
                return self.attach_leaf(mid, at, vector);
            }
            pos += key_len;
            if pos == vector.len() {
                self.nodes[cur.0].terminal = true;
                return cur;
            }
            match self.nodes[cur.0].child(vector.bit(pos)) {
                Some(next) => cur = next,
                None => return self.attach_leaf(cur, pos, vector),
            }
        }
    }

    /// Looks up the node whose path equals `vector` without modifying the tree.
    pub fn find(&self, vector: &BitSequence) -> Option<TrieNodeId> {
        let mut cur = self.root?;
        let mut pos = 0usize;
        loop {
            let node = &self.nodes[cur.0];
            if node.key.common_prefix(vector, pos) < node.key.len() {
                return None;
            }
            pos += node.key.len();
            if pos == vector.len() {
                return node.terminal.then_some(cur);
            }
            cur = node.child(vector.bit(pos))?;
        }
    }

    /// Attaches `vertex` to `node` unless a vertex is already attached.
    ///
    /// Returns the vertex now attached, which is the earlier one on repeats.
    pub fn attach(&mut self, node: TrieNodeId, vertex: VertexId) -> VertexId {
        *self.nodes[node.0].data.get_or_insert(vertex)
    }

    /// Reconstructs the full path of `node` from the root.
    pub fn path(&self, node: TrieNodeId) -> BitSequence {
        let mut chain = Vec::new();
        let mut cur = Some(node);
        while let Some(id) = cur {
            chain.push(id);
            cur = self.nodes[id.0].parent;
        }
        chain
            .iter()
            .rev()
            .fold(BitSequence::default(), |acc, id| acc.concat(&self.nodes[id.0].key))
    }

    /// Drops every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    fn push(&mut self, node: BitTrie) -> TrieNodeId {
        self.nodes.push(node);
        TrieNodeId(self.nodes.len() - 1)
    }

    /// Splits `cur` after `matched` key bits, inserting a branching node above it.
    fn split(&mut self, cur: TrieNodeId, matched: usize) -> TrieNodeId {
        let (bias, head, tail, parent) = {
            let node = &self.nodes[cur.0];
            (
                node.bias,
                node.key.prefix(matched),
                node.key.suffix(matched),
                node.parent,
            )
        };
        let mid = self.push(BitTrie::new(bias, head, parent));
        match parent {
            Some(p) => {
                let parent_node = &mut self.nodes[p.0];
                if parent_node.left == Some(cur) {
                    parent_node.left = Some(mid);
                } else {
                    parent_node.right = Some(mid);
                }
            }
            None => self.root = Some(mid),
        }
        let branch = tail.bit(0);
        let node = &mut self.nodes[cur.0];
        node.bias = bias + matched;
        node.key = tail;
        node.parent = Some(mid);
        self.nodes[mid.0].set_child(branch, cur);
        mid
    }

    fn attach_leaf(&mut self, parent: TrieNodeId, at: usize, vector: &BitSequence) -> TrieNodeId {
        let key = vector.suffix(at);
        let branch = key.bit(0);
        let mut leaf = BitTrie::new(at, key, Some(parent));
        leaf.terminal = true;
        let id = self.push(leaf);
        debug_assert!(self.nodes[parent.0].child(branch).is_none());
        self.nodes[parent.0].set_child(branch, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> BitSequence {
        s.parse().unwrap()
    }

    fn assert_well_formed(tree: &BitTrieTree) {
        for (idx, node) in tree.nodes.iter().enumerate() {
            for (bit, child) in [(false, node.left), (true, node.right)] {
                let Some(child) = child else { continue };
                let child_node = tree.node(child);
                assert_eq!(child_node.parent, Some(TrieNodeId(idx)));
                assert_eq!(child_node.bias, node.bias + node.key.len());
                assert_eq!(child_node.key.get(0).unwrap(), bit);
            }
            if !node.terminal {
                assert!(node.left.is_some() && node.right.is_some());
            }
        }
    }

    #[test]
    fn repeated_insert_returns_same_node() {
        let mut tree = BitTrieTree::new();
        let first = tree.insert(&seq("101"));
        let again = tree.insert(&seq("101"));
        assert_eq!(first, again);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.attach(first, VertexId(4)), VertexId(4));
        assert_eq!(tree.attach(again, VertexId(9)), VertexId(4));
        assert_eq!(tree.node(first).data(), Some(VertexId(4)));
    }

    #[test]
    fn divergent_vectors_split_once() {
        let mut tree = BitTrieTree::new();
        let a = tree.insert(&seq("110010"));
        let b = tree.insert(&seq("110111"));
        let c = tree.insert(&seq("011111"));
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.path(a), seq("110010"));
        assert_eq!(tree.path(b), seq("110111"));
        assert_eq!(tree.path(c), seq("011111"));
        assert!(tree.node(a).is_leaf());
        assert_eq!(tree.node(b).bias(), 3);
        assert_eq!(tree.find(&seq("110111")), Some(b));
        assert_well_formed(&tree);
    }

    #[test]
    fn find_misses_unknown_and_partial_paths() {
        let mut tree = BitTrieTree::new();
        assert_eq!(tree.find(&seq("10")), None);
        tree.insert(&seq("1010"));
        tree.insert(&seq("1001"));
        assert_eq!(tree.find(&seq("1011")), None);
        assert_eq!(tree.find(&seq("10")), None);
        assert_eq!(tree.find(&seq("10100")), None);
    }

    #[test]
    fn prefix_vectors_become_terminal_nodes() {
        let mut tree = BitTrieTree::new();
        let long = tree.insert(&seq("1011"));
        let short = tree.insert(&seq("10"));
        let longer = tree.insert(&seq("101101"));
        assert_eq!(tree.path(short), seq("10"));
        assert!(tree.node(short).is_terminal());
        assert!(!tree.node(short).is_leaf());
        assert_eq!(tree.find(&seq("10")), Some(short));
        assert_eq!(tree.find(&seq("1011")), Some(long));
        assert_eq!(tree.path(longer), seq("101101"));
        assert_well_formed(&tree);
    }

    #[test]
    fn empty_vector_and_root_divergence() {
        let mut tree = BitTrieTree::new();
        let one = tree.insert(&seq("1"));
        let zero = tree.insert(&seq("0"));
        let empty = tree.insert(&BitSequence::default());
        assert_eq!(tree.root(), Some(empty));
        assert!(tree.node(empty).key().is_empty());
        assert_eq!(tree.find(&seq("1")), Some(one));
        assert_eq!(tree.find(&seq("0")), Some(zero));
        assert_well_formed(&tree);
        tree.clear();
        assert_eq!(tree.root(), None);
        assert_eq!(tree.find(&seq("1")), None);
    }

    #[test]
    fn many_vectors_map_to_distinct_paths() {
        let mut tree = BitTrieTree::new();
        let mut ids = Vec::new();
        for value in 0u32..64 {
            let bits = BitSequence::from_bits((0..6).map(|i| (value >> i) & 1 == 1));
            ids.push((tree.insert(&bits), bits));
        }
        for (id, bits) in &ids {
            assert_eq!(tree.find(bits), Some(*id));
            assert_eq!(&tree.path(*id), bits);
        }
        assert_well_formed(&tree);
    }
}
