use coeo_types::{CoeoError, CoeoResult, ExternalNullifier};
use std::collections::HashMap;

struct Node {
    id: ExternalNullifier,
    active: bool,
    next: Option<usize>,
}

/// Insertion-ordered topics with an activation flag.
///
/// Nodes live in an arena and are never removed, so positions are stable
/// across any number of activation toggles.
#[derive(Default)]
pub struct ExternalNullifierChain {
    nodes: Vec<Node>,
    index: HashMap<ExternalNullifier, usize>,
    first: Option<usize>,
    last: Option<usize>,
}

impl ExternalNullifierChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, id: ExternalNullifier) -> CoeoResult<()> {
        if self.index.contains_key(&id) {
            return Err(CoeoError::AlreadyExists(format!(
                "external nullifier {}",
                id
            )));
        }

        let slot = self.nodes.len();
        self.nodes.push(Node {
            id,
            active: true,
            next: None,
        });
        self.index.insert(id, slot);

        match self.last {
            Some(prev) => self.nodes[prev].next = Some(slot),
            None => self.first = Some(slot),
        }
        self.last = Some(slot);
        Ok(())
    }

    pub fn deactivate(&mut self, id: &ExternalNullifier) -> CoeoResult<()> {
        self.set_active(id, false)
    }

    pub fn reactivate(&mut self, id: &ExternalNullifier) -> CoeoResult<()> {
        self.set_active(id, true)
    }

    fn set_active(&mut self, id: &ExternalNullifier, active: bool) -> CoeoResult<()> {
        let slot = self.slot(id)?;
        self.nodes[slot].active = active;
        Ok(())
    }

    pub fn next(&self, id: &ExternalNullifier) -> CoeoResult<ExternalNullifier> {
        let slot = self.slot(id)?;
        self.nodes[slot]
            .next
            .map(|n| self.nodes[n].id)
            .ok_or(CoeoError::NoSuccessor)
    }

    /// False for ids that were never appended.
    pub fn is_active(&self, id: &ExternalNullifier) -> bool {
        self.index
            .get(id)
            .map(|&slot| self.nodes[slot].active)
            .unwrap_or(false)
    }

    pub fn contains(&self, id: &ExternalNullifier) -> bool {
        self.index.contains_key(id)
    }

    pub fn first(&self) -> Option<ExternalNullifier> {
        self.first.map(|slot| self.nodes[slot].id)
    }

    pub fn last(&self) -> Option<ExternalNullifier> {
        self.last.map(|slot| self.nodes[slot].id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `(id, active)` pairs from `first` following `next` links.
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            chain: self,
            cursor: self.first,
        }
    }

    fn slot(&self, id: &ExternalNullifier) -> CoeoResult<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| CoeoError::NotFound(format!("external nullifier {}", id)))
    }
}

pub struct ChainIter<'a> {
    chain: &'a ExternalNullifierChain,
    cursor: Option<usize>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = (ExternalNullifier, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.chain.nodes[self.cursor?];
        self.cursor = node.next;
        Some((node.id, node.active))
    }
}
