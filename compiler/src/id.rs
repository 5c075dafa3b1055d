// id.rs — Stable semantic identifiers for analysis side tables
//
// Analysis results are keyed by node identity, not by span: synthetic
// trees built without a parser may reuse spans freely. IDs are allocated
// in construction (source) order, so identical input trees always get
// identical IDs and analysis output is deterministic.

/// Stable identifier for an AST node (block, statement, or expression).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Stable identifier for a variable binding in the scope tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

/// Allocator for stable node IDs. Produces monotonically increasing IDs
/// in allocation order, ensuring deterministic assignment.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next_node: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }
}
