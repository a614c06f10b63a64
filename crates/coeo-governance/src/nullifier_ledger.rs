use coeo_types::{CoeoError, CoeoResult, ExternalNullifier, NullifierHash};
use std::collections::HashSet;

/// Consumed `(external nullifier, nullifier hash)` pairs. Never evicts.
#[derive(Default)]
pub struct NullifierLedger {
    consumed: HashSet<(ExternalNullifier, NullifierHash)>,
}

impl NullifierLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, en: &ExternalNullifier, nh: &NullifierHash) -> CoeoResult<()> {
        if self.is_consumed(en, nh) {
            return Err(CoeoError::ReplayError);
        }
        Ok(())
    }

    /// Records the pair; callers run `check` and every other validation first.
    pub fn consume(&mut self, en: ExternalNullifier, nh: NullifierHash) {
        self.consumed.insert((en, nh));
    }

    pub fn check_and_consume(&mut self, en: ExternalNullifier, nh: NullifierHash) -> CoeoResult<()> {
        if !self.consumed.insert((en, nh)) {
            return Err(CoeoError::ReplayError);
        }
        Ok(())
    }

    pub fn is_consumed(&self, en: &ExternalNullifier, nh: &NullifierHash) -> bool {
        self.consumed.contains(&(*en, *nh))
    }

    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coeo_types::FieldElement;
    use proptest::prelude::*;

    #[test]
    fn test_replay_rejected() {
        let mut ledger = NullifierLedger::new();
        let en = FieldElement::from(1u64);
        let nh = FieldElement::from(0xaau64);

        ledger.check_and_consume(en, nh).unwrap();
        assert_eq!(ledger.check_and_consume(en, nh), Err(CoeoError::ReplayError));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_scope_isolation() {
        let mut ledger = NullifierLedger::new();
        let nh = FieldElement::from(0xaau64);

        ledger.check_and_consume(FieldElement::from(1u64), nh).unwrap();
        ledger.check_and_consume(FieldElement::from(2u64), nh).unwrap();
        assert!(ledger.is_consumed(&FieldElement::from(1u64), &nh));
        assert!(!ledger.is_consumed(&FieldElement::from(3u64), &nh));
    }

    #[test]
    fn test_check_does_not_consume() {
        let mut ledger = NullifierLedger::new();
        let en = FieldElement::from(1u64);
        let nh = FieldElement::from(2u64);

        ledger.check(&en, &nh).unwrap();
        ledger.check(&en, &nh).unwrap();
        assert!(ledger.is_empty());

        ledger.consume(en, nh);
        assert_eq!(ledger.check(&en, &nh), Err(CoeoError::ReplayError));
    }

    proptest! {
        #[test]
        fn prop_each_pair_consumed_once(pairs in proptest::collection::vec((0u64..8, 0u64..8), 1..64)) {
            let mut ledger = NullifierLedger::new();
            let mut seen = std::collections::HashSet::new();
            for (e, h) in pairs {
                let result = ledger.check_and_consume(e.into(), h.into());
                prop_assert_eq!(result.is_ok(), seen.insert((e, h)));
            }
            prop_assert_eq!(ledger.len(), seen.len());
        }
    }
}
