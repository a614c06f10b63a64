use crate::config::OrganizationConfig;
use crate::events::{Event, Receipt};
use crate::gateway::ProofGateway;
use crate::target::TxContext;
use crate::voting::{GovernanceCall, ProposalDraft, SemaphoreVoting, SignalWitness};
use crate::wallet::Wallet;
use coeo_crypto::{derive_address, ProofVerifier};
use coeo_types::{Address, CoeoResult, ExternalNullifier, IdentityCommitment, VoteChoice};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationAddresses {
    pub semaphore: Address,
    pub voting: Address,
    pub wallet: Address,
}

/// A deployed organization: voting engine, its semaphore registry and wallet.
pub struct Organization {
    addresses: OrganizationAddresses,
    voting: SemaphoreVoting,
}

impl Organization {
    pub fn addresses(&self) -> OrganizationAddresses {
        self.addresses
    }

    pub fn voting(&self) -> &SemaphoreVoting {
        &self.voting
    }

    pub fn voting_mut(&mut self) -> &mut SemaphoreVoting {
        &mut self.voting
    }

    pub fn wallet_balance(&self) -> u128 {
        self.voting
            .target_balance(&self.addresses.wallet)
            .unwrap_or_default()
    }

    pub fn deposit(&mut self, from: Address, amount: u128) -> CoeoResult<Receipt> {
        let wallet = self.addresses.wallet;
        self.voting.fund_target(&wallet, from, amount)
    }

    pub fn add_identity(
        &mut self,
        ctx: &TxContext,
        commitment: IdentityCommitment,
    ) -> CoeoResult<Receipt> {
        self.voting.add_identity(ctx, commitment)
    }

    pub fn broadcast_signal(
        &mut self,
        ctx: &TxContext,
        signal: &[u8],
        witness: &SignalWitness,
        external_nullifier: ExternalNullifier,
    ) -> CoeoResult<Receipt> {
        self.voting
            .broadcast_signal(ctx, signal, witness, external_nullifier)
    }

    pub fn broadcast_proposal(
        &mut self,
        ctx: &TxContext,
        draft: ProposalDraft,
        witness: &SignalWitness,
        proposal_id: u64,
    ) -> CoeoResult<Receipt> {
        self.voting
            .broadcast_proposal(ctx, draft, witness, proposal_id)
    }

    pub fn broadcast_vote(
        &mut self,
        ctx: &TxContext,
        choice: VoteChoice,
        witness: &SignalWitness,
        proposal_id: u64,
    ) -> CoeoResult<Receipt> {
        self.voting.broadcast_vote(ctx, choice, witness, proposal_id)
    }

    pub fn prune(&mut self, now: u64) -> Receipt {
        self.voting.prune(now)
    }

    /// Draft for a self-targeted proposal.
    pub fn governance_draft(
        &self,
        metadata: impl Into<Vec<u8>>,
        call: &GovernanceCall,
    ) -> CoeoResult<ProposalDraft> {
        Ok(ProposalDraft {
            metadata: metadata.into(),
            execution_data: call.encode()?,
            target: self.addresses.voting,
            value: 0,
        })
    }
}

/// Deploys organizations at addresses derived from the factory and a nonce.
pub struct OrganizationFactory {
    address: Address,
    nonce: u64,
}

impl OrganizationFactory {
    pub fn new(address: Address) -> Self {
        Self { address, nonce: 0 }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn create(
        &mut self,
        config: &OrganizationConfig,
        verifier: Box<dyn ProofVerifier>,
    ) -> CoeoResult<(Organization, Receipt)> {
        config.validate()?;

        let addresses = OrganizationAddresses {
            semaphore: derive_address(&self.address, self.nonce)?,
            voting: derive_address(&self.address, self.nonce + 1)?,
            wallet: derive_address(&self.address, self.nonce + 2)?,
        };

        let mut voting = SemaphoreVoting::new(
            addresses.voting,
            addresses.semaphore,
            config.clone(),
            ProofGateway::new(verifier),
        )?;
        voting.register_target(
            addresses.wallet,
            Box::new(Wallet::new(addresses.wallet, addresses.voting)),
        )?;
        self.nonce += 3;

        info!(
            semaphore = %addresses.semaphore,
            voting = %addresses.voting,
            wallet = %addresses.wallet,
            members = config.members.len(),
            "Organization created"
        );

        let receipt = Receipt::new(vec![Event::NewOrganization {
            semaphore: addresses.semaphore,
            voting: addresses.voting,
            wallet: addresses.wallet,
        }]);
        Ok((Organization { addresses, voting }, receipt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fake_proof, HashBindingVerifier};
    use crate::voting::proposal_topic;
    use crate::wallet::WalletCall;
    use coeo_crypto::{signal_hash, Identity};
    use coeo_types::{CoeoError, PublicInputs};

    const ETHER: u128 = 1_000_000_000_000_000_000;

    fn create(members: Vec<Address>) -> (Organization, Receipt) {
        let mut factory = OrganizationFactory::new(Address::from_low_u64(0xfac));
        let mut config = OrganizationConfig::with_members(members);
        config.tree_depth = 12;
        factory
            .create(&config, Box::new(HashBindingVerifier))
            .unwrap()
    }

    fn witness(
        org: &Organization,
        identity: &Identity,
        signal: &[u8],
        topic: ExternalNullifier,
    ) -> SignalWitness {
        let root = org.voting().semaphore().registry().root();
        let nh = identity.nullifier_hash(&topic).unwrap();
        let proof = fake_proof(&PublicInputs::new(root, nh, signal_hash(signal), topic));
        SignalWitness::new(proof, root, nh)
    }

    #[test]
    fn test_create_wires_contracts() {
        let founder = Address::from_low_u64(1);
        let (org, receipt) = create(vec![founder]);
        let addresses = org.addresses();

        assert_eq!(
            receipt.events,
            vec![Event::NewOrganization {
                semaphore: addresses.semaphore,
                voting: addresses.voting,
                wallet: addresses.wallet,
            }]
        );
        assert_ne!(addresses.semaphore, addresses.voting);
        assert_ne!(addresses.voting, addresses.wallet);

        let semaphore = org.voting().semaphore();
        assert_eq!(semaphore.owner(), addresses.voting);
        assert_eq!(semaphore.address(), addresses.semaphore);
        assert!(semaphore.is_permissioned());

        let chain = semaphore.external_nullifiers();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.first(), chain.last());

        assert!(org.voting().is_member(&founder));
        assert_eq!(org.wallet_balance(), 0);
    }

    #[test]
    fn test_each_organization_gets_fresh_addresses() {
        let mut factory = OrganizationFactory::new(Address::from_low_u64(0xfac));
        let config = OrganizationConfig::with_members(vec![Address::from_low_u64(1)]);
        let (a, _) = factory.create(&config, Box::new(HashBindingVerifier)).unwrap();
        let (b, _) = factory.create(&config, Box::new(HashBindingVerifier)).unwrap();
        assert_ne!(a.addresses().voting, b.addresses().voting);
        assert_eq!(factory.nonce(), 6);
    }

    #[test]
    fn test_invalid_config_deploys_nothing() {
        let mut factory = OrganizationFactory::new(Address::from_low_u64(0xfac));
        let result = factory.create(&OrganizationConfig::default(), Box::new(HashBindingVerifier));
        assert!(matches!(result, Err(CoeoError::Config(_))));
        assert_eq!(factory.nonce(), 0);
    }

    #[test]
    fn test_full_lifecycle() {
        let founder = Address::from_low_u64(1);
        let newcomer = Address::from_low_u64(2);
        let recipient = Address::from_low_u64(9);
        let (mut org, _) = create(vec![founder]);
        org.deposit(Address::from_low_u64(50), 10 * ETHER).unwrap();
        assert_eq!(org.wallet_balance(), 10 * ETHER);

        let original = Identity::random();
        org.add_identity(&TxContext::new(founder, 100), original.commitment())
            .unwrap();

        // One enrolled identity passes its own proposal.
        let draft = org
            .governance_draft(
                format!("Add new member: {}", newcomer),
                &GovernanceCall::AddMember(newcomer),
            )
            .unwrap();
        let w = witness(&org, &original, &draft.metadata, proposal_topic(0));
        let receipt = org
            .broadcast_proposal(&TxContext::new(founder, 200), draft, &w, 0)
            .unwrap();
        assert!(receipt.has_event("MemberAdded"));

        let second = Identity::random();
        let receipt = org
            .add_identity(&TxContext::new(newcomer, 300), second.commitment())
            .unwrap();
        assert!(receipt.has_event("IdentityAdded"));
        assert_eq!(org.voting().semaphore().registry().count(), 2);

        let w = witness(&org, &second, b"YEA", proposal_topic(0));
        assert!(matches!(
            org.broadcast_vote(&TxContext::new(newcomer, 400), VoteChoice::Yes, &w, 0),
            Err(CoeoError::NotFound(_))
        ));

        // Two enrolled: the proposer's own YES clears 25% quorum and majority.
        let draft = ProposalDraft {
            metadata: format!("Send 1 ETH to {}", recipient).into_bytes(),
            execution_data: WalletCall::Execute {
                to: recipient,
                value: ETHER,
                data: Vec::new(),
            }
            .encode()
            .unwrap(),
            target: org.addresses().wallet,
            value: 0,
        };
        let w = witness(&org, &second, &draft.metadata, proposal_topic(1));
        let receipt = org
            .broadcast_proposal(&TxContext::new(newcomer, 4_000), draft, &w, 1)
            .unwrap();
        assert!(receipt.has_event("VoteInitiated"));
        assert!(receipt.has_event("VoteExecuted"));
        assert_eq!(org.wallet_balance(), 9 * ETHER);

        let w = witness(&org, &second, b"YEA", proposal_topic(1));
        assert!(org
            .broadcast_vote(&TxContext::new(newcomer, 4_001), VoteChoice::Yes, &w, 1)
            .is_err());
    }
}
