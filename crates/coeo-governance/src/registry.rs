use coeo_crypto::{nothing_up_my_sleeve, IncrementalMerkleTree, MerklePath};
use coeo_types::{CoeoError, CoeoResult, IdentityCommitment, MerkleRoot};
use std::collections::HashSet;
use tracing::{debug, info};

/// Append-only identity tree plus every root it has ever had.
///
/// The empty-tree root is not a seen root: a proof needs at least one
/// enrolled identity behind it.
pub struct IdentityRegistry {
    tree: IncrementalMerkleTree,
    seen_roots: HashSet<MerkleRoot>,
    commitments: HashSet<IdentityCommitment>,
}

impl IdentityRegistry {
    pub fn new(depth: usize) -> CoeoResult<Self> {
        Ok(Self {
            tree: IncrementalMerkleTree::new(depth)?,
            seen_roots: HashSet::new(),
            commitments: HashSet::new(),
        })
    }

    /// Validates without mutating; `insert` runs the same checks.
    pub fn check_insert(&self, commitment: &IdentityCommitment) -> CoeoResult<()> {
        if *commitment == nothing_up_my_sleeve() {
            return Err(CoeoError::InvalidCommitment(
                "identity commitment cannot be the nothing-up-my-sleeve value".into(),
            ));
        }
        commitment.ensure_in_field("identity commitment")?;
        if self.commitments.contains(commitment) {
            return Err(CoeoError::InvalidCommitment(format!(
                "identity commitment already registered: {}",
                commitment.to_hex()
            )));
        }
        if self.tree.len() >= self.tree.capacity() {
            return Err(CoeoError::TreeFull(self.tree.capacity()));
        }
        Ok(())
    }

    pub fn insert(&mut self, commitment: IdentityCommitment) -> CoeoResult<MerkleRoot> {
        self.check_insert(&commitment)?;

        let index = self.tree.insert(&commitment)?;
        let root = self.tree.root();
        self.seen_roots.insert(root);
        self.commitments.insert(commitment);

        info!(index, root = %root.to_hex(), "Identity commitment inserted");
        debug!(seen_roots = self.seen_roots.len(), "Root history updated");
        Ok(root)
    }

    pub fn contains_root(&self, root: &MerkleRoot) -> bool {
        self.seen_roots.contains(root)
    }

    pub fn contains(&self, commitment: &IdentityCommitment) -> bool {
        self.commitments.contains(commitment)
    }

    pub fn count(&self) -> u64 {
        self.tree.len()
    }

    pub fn root(&self) -> MerkleRoot {
        self.tree.root()
    }

    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    pub fn leaf(&self, index: u64) -> Option<IdentityCommitment> {
        self.tree.leaf(index)
    }

    pub fn leaves(&self) -> Vec<IdentityCommitment> {
        self.tree.leaves().collect()
    }

    pub fn path(&self, index: u64) -> CoeoResult<MerklePath> {
        self.tree.path(index)
    }

    pub fn seen_roots_count(&self) -> usize {
        self.seen_roots.len()
    }
}
