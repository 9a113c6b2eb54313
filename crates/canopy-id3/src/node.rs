use std::collections::BTreeMap;
use std::fmt;

/// Zero-based column index into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct AttributeIndex(usize);

impl AttributeIndex {
    /// Create a new attribute index from a zero-based column position.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for AttributeIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for AttributeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into a `Vec<Node>` arena, identifying a specific node in a decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in a decision tree arena.
///
/// Trees are stored as `Vec<Node>` where children are referenced by
/// [`NodeIndex`] rather than pointers. Each child index appears under
/// exactly one parent, so the arena always describes a tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An interior node splitting on one categorical attribute.
    Split {
        /// Attribute whose value selects the child.
        attribute: AttributeIndex,
        /// One child per attribute value observed in this node's training subset.
        children: BTreeMap<u32, NodeIndex>,
        /// Information gain (bits) of splitting this node's subset on `attribute`.
        gain: f64,
        /// Number of training records that reached this node.
        n_samples: usize,
    },
    /// A terminal node predicting one label.
    Leaf {
        /// Target column the label was read from.
        target: AttributeIndex,
        /// Majority label of the training subset; `None` only for an empty subset.
        label: Option<u32>,
        /// Number of training records that reached this node.
        n_samples: usize,
    },
}

impl Node {
    /// Return the number of training records that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Column this node reads: the split attribute, or the target for leaves.
    #[must_use]
    pub fn attribute(&self) -> AttributeIndex {
        match self {
            Node::Split { attribute, .. } => *attribute,
            Node::Leaf { target, .. } => *target,
        }
    }

    /// Return the child reached by `value`, if that value was seen in training.
    #[must_use]
    pub fn child(&self, value: u32) -> Option<NodeIndex> {
        match self {
            Node::Split { children, .. } => children.get(&value).copied(),
            Node::Leaf { .. } => None,
        }
    }

    /// Iterate `(value, child)` pairs in ascending value order. Empty for leaves.
    pub fn children(&self) -> impl Iterator<Item = (u32, NodeIndex)> + '_ {
        let map = match self {
            Node::Split { children, .. } => Some(children),
            Node::Leaf { .. } => None,
        };
        map.into_iter()
            .flat_map(|m| m.iter().map(|(&value, &child)| (value, child)))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf { target, label, .. } => {
                write!(f, "Node: {target}")?;
                if let Some(label) = label {
                    write!(f, ", Value: {label}")?;
                }
                write!(f, ", Leaf")
            }
            Node::Split {
                attribute,
                children,
                ..
            } => {
                write!(f, "Node: {attribute}, Children:")?;
                for (value, child) in children {
                    write!(f, " {value}->{child}")?;
                }
                Ok(())
            }
        }
    }
}
