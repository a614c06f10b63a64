use crate::field::{from_fr, to_fr};
use crate::keccak::nothing_up_my_sleeve;
use crate::poseidon::hash2;
use ark_bn254::Fr;
use coeo_types::{CoeoError, CoeoResult, FieldElement, MAX_TREE_DEPTH};
use serde::{Deserialize, Serialize};

/// Membership witness for one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    pub leaf_index: u64,
    pub siblings: Vec<FieldElement>,
    /// `true` where the running node is the right child at that level.
    pub path_indices: Vec<bool>,
}

impl MerklePath {
    pub fn compute_root(&self, leaf: &FieldElement) -> CoeoResult<FieldElement> {
        let mut current = to_fr(leaf)?;
        for (sibling, is_right) in self.siblings.iter().zip(&self.path_indices) {
            let sibling = to_fr(sibling)?;
            current = if *is_right {
                hash2(sibling, current)
            } else {
                hash2(current, sibling)
            };
        }
        Ok(from_fr(&current))
    }

    pub fn verify(&self, leaf: &FieldElement, root: &FieldElement) -> bool {
        self.siblings.len() == self.path_indices.len()
            && matches!(self.compute_root(leaf), Ok(computed) if computed == *root)
    }
}

/// Append-only Poseidon Merkle tree of fixed depth.
///
/// Empty leaves hold the nothing-up-my-sleeve value. Each insertion rehashes
/// one node per level; populated nodes are kept so paths are O(depth).
pub struct IncrementalMerkleTree {
    depth: usize,
    zeros: Vec<Fr>,
    layers: Vec<Vec<Fr>>,
    root: Fr,
}

impl IncrementalMerkleTree {
    pub fn new(depth: usize) -> CoeoResult<Self> {
        if depth == 0 || depth > MAX_TREE_DEPTH {
            return Err(CoeoError::Config(format!(
                "tree depth must be in 1..={}, got {}",
                MAX_TREE_DEPTH, depth
            )));
        }

        let mut zeros = Vec::with_capacity(depth + 1);
        let mut current = to_fr(&nothing_up_my_sleeve())?;
        zeros.push(current);
        for _ in 0..depth {
            current = hash2(current, current);
            zeros.push(current);
        }

        Ok(Self {
            depth,
            root: zeros[depth],
            zeros,
            layers: vec![Vec::new(); depth + 1],
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn capacity(&self) -> u64 {
        1u64 << self.depth
    }

    pub fn len(&self) -> u64 {
        self.layers[0].len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.layers[0].is_empty()
    }

    pub fn root(&self) -> FieldElement {
        from_fr(&self.root)
    }

    pub fn zero_value(&self, level: usize) -> Option<FieldElement> {
        self.zeros.get(level).map(from_fr)
    }

    /// Appends `leaf` and returns its index.
    pub fn insert(&mut self, leaf: &FieldElement) -> CoeoResult<u64> {
        let index = self.len();
        if index >= self.capacity() {
            return Err(CoeoError::TreeFull(self.capacity()));
        }
        let leaf = to_fr(leaf)?;

        self.layers[0].push(leaf);
        let mut idx = index as usize;
        let mut current = leaf;

        for level in 0..self.depth {
            let (left, right) = if idx % 2 == 0 {
                (current, self.zeros[level])
            } else {
                (self.layers[level][idx - 1], current)
            };
            current = hash2(left, right);
            idx /= 2;

            let parent = &mut self.layers[level + 1];
            if idx < parent.len() {
                parent[idx] = current;
            } else {
                parent.push(current);
            }
        }

        self.root = current;
        Ok(index)
    }

    pub fn leaf(&self, index: u64) -> Option<FieldElement> {
        self.layers[0].get(index as usize).map(from_fr)
    }

    pub fn leaves(&self) -> impl Iterator<Item = FieldElement> + '_ {
        self.layers[0].iter().map(from_fr)
    }

    pub fn path(&self, index: u64) -> CoeoResult<MerklePath> {
        if index >= self.len() {
            return Err(CoeoError::NotFound(format!("leaf {}", index)));
        }

        let mut siblings = Vec::with_capacity(self.depth);
        let mut path_indices = Vec::with_capacity(self.depth);
        let mut idx = index as usize;

        for level in 0..self.depth {
            let sibling_idx = idx ^ 1;
            let sibling = self.layers[level]
                .get(sibling_idx)
                .copied()
                .unwrap_or(self.zeros[level]);
            siblings.push(from_fr(&sibling));
            path_indices.push(idx % 2 == 1);
            idx /= 2;
        }

        Ok(MerklePath {
            leaf_index: index,
            siblings,
            path_indices,
        })
    }
}
