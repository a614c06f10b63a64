use crate::events::Receipt;
use crate::factory::{Organization, OrganizationAddresses};
use crate::target::TxContext;
use crate::voting::{ProposalDraft, SignalWitness};
use coeo_types::{
    Address, CoeoError, CoeoResult, ExternalNullifier, IdentityCommitment, MerkleRoot,
    ProposalStatus, VoteChoice,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// One externally submitted state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    AddIdentity {
        caller: Address,
        commitment: IdentityCommitment,
    },
    BroadcastSignal {
        caller: Address,
        signal: Vec<u8>,
        witness: SignalWitness,
        external_nullifier: ExternalNullifier,
    },
    BroadcastProposal {
        caller: Address,
        proposal_id: u64,
        draft: ProposalDraft,
        witness: SignalWitness,
    },
    BroadcastVote {
        caller: Address,
        proposal_id: u64,
        choice: VoteChoice,
        witness: SignalWitness,
    },
    Deposit {
        from: Address,
        amount: u128,
    },
    Prune,
}

impl Transaction {
    pub fn name(&self) -> &'static str {
        match self {
            Transaction::AddIdentity { .. } => "add_identity",
            Transaction::BroadcastSignal { .. } => "broadcast_signal",
            Transaction::BroadcastProposal { .. } => "broadcast_proposal",
            Transaction::BroadcastVote { .. } => "broadcast_vote",
            Transaction::Deposit { .. } => "deposit",
            Transaction::Prune => "prune",
        }
    }

    fn apply(self, org: &mut Organization, now: u64) -> CoeoResult<Receipt> {
        match self {
            Transaction::AddIdentity { caller, commitment } => {
                org.add_identity(&TxContext::new(caller, now), commitment)
            }
            Transaction::BroadcastSignal {
                caller,
                signal,
                witness,
                external_nullifier,
            } => org.broadcast_signal(
                &TxContext::new(caller, now),
                &signal,
                &witness,
                external_nullifier,
            ),
            Transaction::BroadcastProposal {
                caller,
                proposal_id,
                draft,
                witness,
            } => org.broadcast_proposal(&TxContext::new(caller, now), draft, &witness, proposal_id),
            Transaction::BroadcastVote {
                caller,
                proposal_id,
                choice,
                witness,
            } => org.broadcast_vote(&TxContext::new(caller, now), choice, &witness, proposal_id),
            Transaction::Deposit { from, amount } => org.deposit(from, amount),
            Transaction::Prune => Ok(org.prune(now)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStats {
    pub applied: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSnapshot {
    pub addresses: OrganizationAddresses,
    pub members: usize,
    pub identities: u64,
    pub root: MerkleRoot,
    pub next_proposal_id: u64,
    pub pending_proposals: usize,
    pub external_nullifiers: usize,
    pub permissioned: bool,
    pub wallet_balance: u128,
}

/// Serializes every transaction against one organization.
pub struct OrganizationService {
    organization: Arc<Mutex<Organization>>,
    applied: AtomicU64,
    rejected: AtomicU64,
}

pub fn unix_now() -> CoeoResult<u64> {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| CoeoError::Internal(format!("system clock before unix epoch: {}", e)))
}

impl OrganizationService {
    pub fn new(organization: Organization) -> Self {
        Self {
            organization: Arc::new(Mutex::new(organization)),
            applied: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Applies `tx` at the current wall-clock time.
    pub async fn submit(&self, tx: Transaction) -> CoeoResult<Receipt> {
        self.submit_at(tx, unix_now()?).await
    }

    pub async fn submit_at(&self, tx: Transaction, now: u64) -> CoeoResult<Receipt> {
        let name = tx.name();
        let mut org = self.organization.lock().await;
        let result = tx.apply(&mut org, now);

        match result {
            Ok(ref receipt) => {
                self.applied.fetch_add(1, Ordering::Relaxed);
                debug!(tx = name, events = receipt.events.len(), "Transaction applied");
            }
            Err(ref e) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(tx = name, error = %e, "Transaction rejected");
            }
        }
        result
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            applied: self.applied.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    pub async fn snapshot(&self, now: u64) -> OrganizationSnapshot {
        let org = self.organization.lock().await;
        let voting = org.voting();
        let semaphore = voting.semaphore();

        OrganizationSnapshot {
            addresses: org.addresses(),
            members: voting.members().count(),
            identities: semaphore.registry().count(),
            root: semaphore.registry().root(),
            next_proposal_id: voting.next_proposal_id(),
            pending_proposals: voting
                .proposals()
                .filter(|p| p.status(now) == ProposalStatus::Pending)
                .count(),
            external_nullifiers: semaphore.external_nullifiers().len(),
            permissioned: semaphore.is_permissioned(),
            wallet_balance: org.wallet_balance(),
        }
    }

    /// Runs `f` against the organization under the service lock.
    pub async fn with_organization<R>(&self, f: impl FnOnce(&Organization) -> R) -> R {
        let org = self.organization.lock().await;
        f(&org)
    }

    /// Periodically prunes stale proposals until `shutdown` is set.
    pub async fn run_pruner(&self, every: Duration, shutdown: Arc<AtomicBool>) -> CoeoResult<()> {
        let mut ticker = interval(every);
        info!("Proposal pruner running every {:?}", every);

        loop {
            if shutdown.load(Ordering::SeqCst) {
                info!("Proposal pruner shutting down");
                break;
            }

            ticker.tick().await;
            let receipt = self.submit(Transaction::Prune).await?;
            if !receipt.events.is_empty() {
                debug!(events = receipt.events.len(), "Pruner retired proposals");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrganizationConfig;
    use crate::factory::OrganizationFactory;
    use crate::test_support::{fake_proof, HashBindingVerifier};
    use crate::voting::{proposal_topic, GovernanceCall};
    use coeo_crypto::{signal_hash, Identity};
    use coeo_types::PublicInputs;

    const T0: u64 = 1_700_000_000;

    fn service(members: Vec<Address>) -> OrganizationService {
        let mut factory = OrganizationFactory::new(Address::from_low_u64(0xfac));
        let mut config = OrganizationConfig::with_members(members);
        config.tree_depth = 8;
        let (org, _) = factory
            .create(&config, Box::new(HashBindingVerifier))
            .unwrap();
        OrganizationService::new(org)
    }

    async fn witness(
        service: &OrganizationService,
        identity: &Identity,
        signal: &[u8],
        topic: ExternalNullifier,
    ) -> SignalWitness {
        let root = service
            .with_organization(|org| org.voting().semaphore().registry().root())
            .await;
        let nh = identity.nullifier_hash(&topic).unwrap();
        let proof = fake_proof(&PublicInputs::new(root, nh, signal_hash(signal), topic));
        SignalWitness::new(proof, root, nh)
    }

    #[tokio::test]
    async fn test_transactions_are_counted() {
        let founder = Address::from_low_u64(1);
        let service = service(vec![founder]);
        let identity = Identity::random();

        let tx = Transaction::AddIdentity {
            caller: founder,
            commitment: identity.commitment(),
        };
        service.submit_at(tx.clone(), T0).await.unwrap();
        assert!(matches!(
            service.submit_at(tx, T0).await,
            Err(CoeoError::AlreadyExists(_))
        ));

        let stats = service.stats();
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.rejected, 1);

        let snapshot = service.snapshot(T0).await;
        assert_eq!(snapshot.identities, 1);
        assert_eq!(snapshot.members, 1);
        assert_eq!(snapshot.external_nullifiers, 1);
        assert!(snapshot.permissioned);
    }

    #[tokio::test]
    async fn test_proposal_round_trip_through_service() {
        let founder = Address::from_low_u64(1);
        let newcomer = Address::from_low_u64(2);
        let service = service(vec![founder]);
        let identity = Identity::random();

        service
            .submit_at(
                Transaction::AddIdentity {
                    caller: founder,
                    commitment: identity.commitment(),
                },
                T0,
            )
            .await
            .unwrap();

        let draft = service
            .with_organization(|org| {
                org.governance_draft("Add new member", &GovernanceCall::AddMember(newcomer))
            })
            .await
            .unwrap();
        let w = witness(&service, &identity, &draft.metadata, proposal_topic(0)).await;
        let tx = Transaction::BroadcastProposal {
            caller: founder,
            proposal_id: 0,
            draft,
            witness: w,
        };

        let json = serde_json::to_string(&tx).unwrap();
        let decoded: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, tx);

        let receipt = service.submit_at(decoded, T0 + 1).await.unwrap();
        assert!(receipt.has_event("MemberAdded"));

        let snapshot = service.snapshot(T0 + 1).await;
        assert_eq!(snapshot.members, 2);
        assert_eq!(snapshot.next_proposal_id, 1);
        assert_eq!(snapshot.pending_proposals, 0);
    }

    #[tokio::test]
    async fn test_concurrent_deposits_serialize() {
        let service = Arc::new(service(vec![Address::from_low_u64(1)]));

        let mut handles = Vec::new();
        for i in 0..8u64 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .submit(Transaction::Deposit {
                        from: Address::from_low_u64(100 + i),
                        amount: 5,
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(service.snapshot(T0).await.wallet_balance, 40);
        assert_eq!(service.stats().applied, 8);
    }

    #[tokio::test]
    async fn test_pruner_stops_on_shutdown() {
        let service = service(vec![Address::from_low_u64(1)]);
        let shutdown = Arc::new(AtomicBool::new(true));
        service
            .run_pruner(Duration::from_millis(10), shutdown)
            .await
            .unwrap();
        assert_eq!(service.stats(), ServiceStats::default());
    }
}
