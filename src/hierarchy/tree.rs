//! Arena-held forest of administrative paths.

use std::fmt::Write;

/// Index of a node inside a [`Forest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    label: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A set of trees, one per distinct root label.
///
/// Nodes live in a single arena and point at their parent by index. Paths are
/// inserted positionally: an existing child with the same label under the
/// same parent is reused, while equal labels at different positions remain
/// separate nodes.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, label: &str, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            label: label.to_string(),
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Root node with the given label, if present
    pub fn root(&self, label: &str) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|id| self.nodes[id.0].label == label)
    }

    fn child(&self, parent: NodeId, label: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|id| self.nodes[id.0].label == label)
    }

    /// Insert a path given broadest segment first. Returns the deepest node.
    pub fn insert_path<S: AsRef<str>>(&mut self, path: &[S]) -> Option<NodeId> {
        let (first, rest) = path.split_first()?;
        let first = first.as_ref();

        let mut current = match self.root(first) {
            Some(root) => root,
            None => self.push(first, None),
        };
        for segment in rest {
            let segment = segment.as_ref();
            current = match self.child(current, segment) {
                Some(child) => child,
                None => self.push(segment, Some(current)),
            };
        }
        Some(current)
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.nodes[id.0].label
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.nodes[id.0].parent.is_none()
    }

    /// Top-level ancestor of a node
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Labels from the root down to `id`
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut labels = vec![self.label(id)];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            labels.push(self.label(parent));
            current = parent;
        }
        labels.reverse();
        labels
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Every childless node, tree by tree in depth-first order
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        for &root in &self.roots {
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                let children = &self.nodes[id.0].children;
                if children.is_empty() {
                    leaves.push(id);
                } else {
                    stack.extend(children.iter().rev());
                }
            }
        }
        leaves
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Indented text rendering of every tree
    pub fn render(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            let _ = writeln!(out, "{}", self.label(root));
            self.render_children(root, "", &mut out);
        }
        out
    }

    fn render_children(&self, id: NodeId, prefix: &str, out: &mut String) {
        let children = &self.nodes[id.0].children;
        for (i, &child) in children.iter().enumerate() {
            let last = i + 1 == children.len();
            let (branch, indent) = if last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            let _ = writeln!(out, "{}{}{}", prefix, branch, self.label(child));
            self.render_children(child, &format!("{}{}", prefix, indent), out);
        }
    }
}
