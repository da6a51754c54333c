use glam::Mat4;
use smallvec::SmallVec;

use crate::errors::{MarionetteError, Result};

/// One node of an imported model hierarchy.
///
/// Nodes live in a [`NodeArena`] and address each other by index; there are
/// no owning back-references, so the tree cannot form ownership cycles.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    /// Transform relative to the parent node. Built once at import,
    /// immutable afterwards.
    pub local_transform: Mat4,
    /// Parent index, `None` for the root.
    pub parent: Option<usize>,
    /// Ordered child indices. Inline capacity covers typical skeletons
    /// without a heap allocation per node.
    pub children: SmallVec<[usize; 8]>,
}

/// Index arena for an imported node hierarchy.
///
/// Invariants, enforced at construction:
/// - index 0 is the single root,
/// - every non-root node's parent index is smaller than its own index, so a
///   single forward pass over the arena visits parents before children.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Appends a node and returns its index.
    ///
    /// The parent must already be in the arena; passing `None` for anything
    /// but the first node, or a forward reference, is an invariant violation.
    pub fn push(
        &mut self,
        name: impl Into<String>,
        local_transform: Mat4,
        parent: Option<usize>,
    ) -> Result<usize> {
        let index = self.nodes.len();
        match parent {
            None if index != 0 => {
                return Err(MarionetteError::HierarchyInvariant {
                    joint: index,
                    parent: index,
                });
            }
            Some(p) if p >= index => {
                return Err(MarionetteError::HierarchyInvariant {
                    joint: index,
                    parent: p,
                });
            }
            _ => {}
        }

        if let Some(p) = parent {
            self.nodes[p].children.push(index);
        }
        self.nodes.push(Node {
            name: name.into(),
            local_transform,
            parent,
            children: SmallVec::new(),
        });
        Ok(index)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finds the first node with the given name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    /// Composes world transforms in one forward pass, parent before child.
    ///
    /// `locals[i]` overrides node `i`'s stored local transform; pass the
    /// stored transforms for the rest pose.
    #[must_use]
    pub fn global_transforms(&self, locals: &[Mat4]) -> Vec<Mat4> {
        debug_assert_eq!(locals.len(), self.nodes.len());
        let mut globals = Vec::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            let global = match node.parent {
                Some(p) => globals[p] * locals[i],
                None => locals[i],
            };
            globals.push(global);
        }
        globals
    }

    /// The stored local transform of every node, in arena order.
    #[must_use]
    pub fn local_transforms(&self) -> Vec<Mat4> {
        self.nodes.iter().map(|n| n.local_transform).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn push_rejects_second_root() {
        let mut arena = NodeArena::new();
        arena.push("root", Mat4::IDENTITY, None).unwrap();
        assert!(arena.push("stray", Mat4::IDENTITY, None).is_err());
    }

    #[test]
    fn global_transforms_compose_parent_first() {
        let mut arena = NodeArena::new();
        let root = arena
            .push("root", Mat4::from_translation(Vec3::X), None)
            .unwrap();
        let child = arena
            .push("child", Mat4::from_translation(Vec3::Y), Some(root))
            .unwrap();

        let globals = arena.global_transforms(&arena.local_transforms());
        let pos = globals[child].transform_point3(Vec3::ZERO);
        assert!((pos - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    }
}
