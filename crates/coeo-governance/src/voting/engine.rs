use super::calls::{GovernanceCall, SignalKind, SignalWitness};
use super::proposal::{is_proposal_topic, Proposal, ProposalDraft};
use crate::config::OrganizationConfig;
use crate::events::{Event, Receipt};
use crate::gateway::ProofGateway;
use crate::semaphore::{Semaphore, SignalRequest, TopicMode};
use crate::target::{CallContext, ExecutionTarget, TxContext};
use coeo_types::{
    Address, CoeoError, CoeoResult, ExternalNullifier, IdentityCommitment, ProposalStatus,
    VoteChoice,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Anonymous proposal and voting engine.
///
/// Owns the semaphore registry it votes through and the execution targets
/// its proposals may call. Member addresses only gate identity enrolment;
/// every broadcast is authorized by a membership proof alone.
pub struct SemaphoreVoting {
    address: Address,
    config: OrganizationConfig,
    semaphore: Semaphore,
    members: BTreeSet<Address>,
    identities: HashMap<Address, IdentityCommitment>,
    proposals: BTreeMap<u64, Proposal>,
    next_proposal_id: u64,
    targets: HashMap<Address, Box<dyn ExecutionTarget>>,
    balance: u128,
}

impl SemaphoreVoting {
    pub fn new(
        address: Address,
        semaphore_address: Address,
        config: OrganizationConfig,
        gateway: ProofGateway,
    ) -> CoeoResult<Self> {
        config.validate()?;

        let semaphore = Semaphore::new(
            semaphore_address,
            address,
            config.tree_depth,
            config.first_external_nullifier,
            gateway,
        )?;
        let members = config.members.iter().copied().collect();

        Ok(Self {
            address,
            config,
            semaphore,
            members,
            identities: HashMap::new(),
            proposals: BTreeMap::new(),
            next_proposal_id: 0,
            targets: HashMap::new(),
            balance: 0,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &OrganizationConfig {
        &self.config
    }

    pub fn semaphore(&self) -> &Semaphore {
        &self.semaphore
    }

    pub fn next_proposal_id(&self) -> u64 {
        self.next_proposal_id
    }

    pub fn proposal(&self, proposal_id: u64) -> Option<&Proposal> {
        self.proposals.get(&proposal_id)
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn proposal_status(&self, proposal_id: u64, now: u64) -> Option<ProposalStatus> {
        self.proposals.get(&proposal_id).map(|p| p.status(now))
    }

    pub fn members(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }

    pub fn is_member(&self, address: &Address) -> bool {
        self.members.contains(address)
    }

    pub fn identity_of(&self, member: &Address) -> Option<IdentityCommitment> {
        self.identities.get(member).copied()
    }

    /// Registry leaves in insertion order, as clients need them for witnesses.
    pub fn identity_commitments(&self) -> Vec<IdentityCommitment> {
        self.semaphore.registry().leaves()
    }

    pub fn balance(&self) -> u128 {
        self.balance
    }

    pub fn target_balance(&self, target: &Address) -> Option<u128> {
        self.targets.get(target).map(|t| t.balance())
    }

    pub fn register_target(
        &mut self,
        address: Address,
        target: Box<dyn ExecutionTarget>,
    ) -> CoeoResult<()> {
        if address == self.address || self.targets.contains_key(&address) {
            return Err(CoeoError::AlreadyExists(format!("execution target {}", address)));
        }
        self.targets.insert(address, target);
        debug!(target = %address, "Execution target registered");
        Ok(())
    }

    /// Credits the engine itself; proposals spend this as their attached value.
    pub fn deposit(&mut self, from: Address, amount: u128) -> CoeoResult<Receipt> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| CoeoError::ExecutionFailed("engine balance overflow".into()))?;
        Ok(Receipt::new(vec![Event::Deposit { from, amount }]))
    }

    pub fn fund_target(
        &mut self,
        target: &Address,
        from: Address,
        amount: u128,
    ) -> CoeoResult<Receipt> {
        let account = self
            .targets
            .get_mut(target)
            .ok_or_else(|| CoeoError::NotFound(format!("execution target {}", target)))?;
        Ok(Receipt::new(account.receive(from, amount)?))
    }

    /// Enrols the caller's identity. One identity per member.
    pub fn add_identity(
        &mut self,
        ctx: &TxContext,
        commitment: IdentityCommitment,
    ) -> CoeoResult<Receipt> {
        if !self.members.contains(&ctx.caller) {
            return Err(CoeoError::PermissionDenied(format!(
                "{} is not a member",
                ctx.caller
            )));
        }
        if self.identities.contains_key(&ctx.caller) {
            return Err(CoeoError::AlreadyExists(format!(
                "identity for member {}",
                ctx.caller
            )));
        }

        let mut events = Vec::new();
        let root = self
            .semaphore
            .insert_identity(&self.address, commitment, &mut events)?;
        self.identities.insert(ctx.caller, commitment);
        events.push(Event::IdentityAdded {
            member: ctx.caller,
            commitment,
        });

        info!(member = %ctx.caller, root = %root, "Identity added");
        Ok(Receipt::new(events))
    }

    pub fn broadcast_signal(
        &mut self,
        ctx: &TxContext,
        signal: &[u8],
        witness: &SignalWitness,
        external_nullifier: ExternalNullifier,
    ) -> CoeoResult<Receipt> {
        let kind = SignalKind::Plain {
            external_nullifier,
            signal: signal.to_vec(),
        };
        self.broadcast(ctx, kind, witness)
    }

    pub fn broadcast_proposal(
        &mut self,
        ctx: &TxContext,
        draft: ProposalDraft,
        witness: &SignalWitness,
        proposal_id: u64,
    ) -> CoeoResult<Receipt> {
        self.broadcast(ctx, SignalKind::Proposal { proposal_id, draft }, witness)
    }

    pub fn broadcast_vote(
        &mut self,
        ctx: &TxContext,
        choice: VoteChoice,
        witness: &SignalWitness,
        proposal_id: u64,
    ) -> CoeoResult<Receipt> {
        self.broadcast(ctx, SignalKind::Vote { proposal_id, choice }, witness)
    }

    /// Shared path for every proof-carrying broadcast.
    ///
    /// All checks run before the first mutation. Once the nullifier is
    /// consumed the call succeeds; a failed proposal dispatch is reported in
    /// the receipt only.
    pub fn broadcast(
        &mut self,
        ctx: &TxContext,
        kind: SignalKind,
        witness: &SignalWitness,
    ) -> CoeoResult<Receipt> {
        let mode = self.admit(ctx, &kind)?;
        let request = SignalRequest {
            signal: kind.signal(),
            proof: &witness.proof,
            root: witness.root,
            nullifier_hash: witness.nullifier_hash,
            external_nullifier: kind.external_nullifier(),
        };

        if let Err(e) = self.semaphore.check_signal(&request, mode) {
            warn!(kind = kind.name(), error = %e, "Broadcast rejected");
            return Err(e);
        }

        let mut events = Vec::new();
        self.semaphore.commit_signal(&request, mode, &mut events)?;

        let settled = match kind {
            SignalKind::Plain { ref signal, .. } => {
                let signal_index = self.semaphore.record_signal(&request, &mut events);
                events.push(Event::SignalBroadcastByClient {
                    signal_index,
                    signal: signal.clone(),
                });
                info!(signal_index, "Signal broadcast");
                None
            }
            SignalKind::Proposal {
                proposal_id,
                ref draft,
            } => {
                let mut proposal =
                    Proposal::open(proposal_id, draft.clone(), ctx.now, self.config.epoch_secs);
                proposal.tally(VoteChoice::Yes);
                events.push(Event::VoteInitiated {
                    proposal_id,
                    target: proposal.target,
                    value: proposal.value,
                    deadline: proposal.deadline,
                });
                info!(
                    proposal_id,
                    target = %proposal.target,
                    deadline = proposal.deadline,
                    "Proposal opened"
                );
                self.proposals.insert(proposal_id, proposal);
                self.next_proposal_id += 1;
                self.settle(proposal_id, ctx.now, &mut events)
            }
            SignalKind::Vote {
                proposal_id,
                choice,
            } => {
                if let Some(proposal) = self.proposals.get_mut(&proposal_id) {
                    proposal.tally(choice);
                }
                events.push(Event::VoteBroadcast {
                    proposal_id,
                    choice,
                });
                self.settle(proposal_id, ctx.now, &mut events)
            }
        };

        Ok(Receipt {
            events,
            execution: settled,
        })
    }

    /// Kind-specific preconditions; returns how the topic must be treated.
    fn admit(&self, ctx: &TxContext, kind: &SignalKind) -> CoeoResult<TopicMode> {
        match kind {
            SignalKind::Plain {
                external_nullifier,
                ..
            } => {
                reject_proposal_topic(external_nullifier)?;
                Ok(TopicMode::Existing)
            }
            SignalKind::Proposal { proposal_id, .. } => {
                let id = *proposal_id;
                if id < self.next_proposal_id {
                    return Err(CoeoError::AlreadyExists(format!("proposal {}", id)));
                }
                if id > self.next_proposal_id {
                    return Err(CoeoError::NotFound(format!(
                        "proposal {} (next is {})",
                        id, self.next_proposal_id
                    )));
                }
                Ok(TopicMode::Appending)
            }
            SignalKind::Vote { proposal_id, .. } => {
                let proposal = self
                    .proposals
                    .get(proposal_id)
                    .filter(|p| !p.executed)
                    .ok_or_else(|| CoeoError::NotFound(format!("proposal {}", proposal_id)))?;
                if ctx.now > proposal.deadline {
                    return Err(CoeoError::Expired(*proposal_id));
                }
                Ok(TopicMode::Existing)
            }
        }
    }

    /// Executes the proposal if it just crossed both thresholds.
    fn settle(
        &mut self,
        proposal_id: u64,
        now: u64,
        events: &mut Vec<Event>,
    ) -> Option<CoeoResult<()>> {
        let enrolled = self.semaphore.registry().count();
        let proposal = self.proposals.get_mut(&proposal_id)?;
        debug!(
            proposal_id,
            yes = proposal.yes_weight,
            no = proposal.no_weight,
            enrolled,
            "Tally updated"
        );
        if proposal.executed
            || !proposal.thresholds_met(self.config.quorum, self.config.approval, enrolled)
        {
            return None;
        }

        proposal.executed = true;
        let topic = proposal.topic();
        let target = proposal.target;
        let value = proposal.value;
        let calldata = proposal.execution_data.clone();
        events.push(Event::VoteExecuted {
            proposal_id,
            yes_weight: proposal.yes_weight,
            no_weight: proposal.no_weight,
        });
        info!(proposal_id, target = %target, value, "Proposal passed");

        if let Err(e) = self
            .semaphore
            .deactivate_external_nullifier(&self.address, &topic, events)
        {
            warn!(proposal_id, error = %e, "Failed to retire proposal topic");
        }

        let result = self
            .dispatch(target, value, &calldata, now, events)
            .map_err(|e| match e {
                CoeoError::ExecutionFailed(_) => e,
                other => CoeoError::ExecutionFailed(other.to_string()),
            });
        if let Err(ref e) = result {
            warn!(proposal_id, error = %e, "Proposal dispatch failed");
            events.push(Event::ExecutionFailed {
                proposal_id,
                reason: e.to_string(),
            });
        }
        Some(result)
    }

    fn dispatch(
        &mut self,
        target: Address,
        value: u128,
        calldata: &[u8],
        now: u64,
        events: &mut Vec<Event>,
    ) -> CoeoResult<()> {
        if target == self.address {
            if value != 0 {
                return Err(CoeoError::ExecutionFailed(format!(
                    "governance call cannot carry value ({})",
                    value
                )));
            }
            let call = GovernanceCall::decode(calldata)?;
            return self.apply(call, events);
        }

        let account = self.targets.get_mut(&target).ok_or_else(|| {
            CoeoError::ExecutionFailed(format!("no execution target at {}", target))
        })?;
        if value > self.balance {
            return Err(CoeoError::ExecutionFailed(format!(
                "insufficient engine balance: have {}, need {}",
                self.balance, value
            )));
        }

        let ctx = CallContext {
            caller: self.address,
            value,
            now,
        };
        let mut emitted = account.execute(&ctx, calldata)?;
        self.balance -= value;
        events.append(&mut emitted);
        Ok(())
    }

    /// Governance entry point; only the engine may call it, through a passed
    /// self-targeted proposal.
    pub fn call(&mut self, ctx: &TxContext, call: GovernanceCall) -> CoeoResult<Receipt> {
        if ctx.caller != self.address {
            return Err(CoeoError::PermissionDenied(format!(
                "{} may not call governance operations",
                ctx.caller
            )));
        }
        let mut events = Vec::new();
        self.apply(call, &mut events)?;
        Ok(Receipt::new(events))
    }

    fn apply(&mut self, call: GovernanceCall, events: &mut Vec<Event>) -> CoeoResult<()> {
        let engine = self.address;
        match call {
            GovernanceCall::AddMember(member) => {
                if member.is_zero() {
                    return Err(CoeoError::ExecutionFailed(
                        "member address cannot be zero".into(),
                    ));
                }
                if !self.members.insert(member) {
                    return Err(CoeoError::AlreadyExists(format!("member {}", member)));
                }
                events.push(Event::MemberAdded { member });
                info!(member = %member, "Member added");
                Ok(())
            }
            GovernanceCall::AddExternalNullifier(external_nullifier) => {
                let external_nullifier = external_nullifier.ensure_in_field("external nullifier")?;
                if is_proposal_topic(&external_nullifier) {
                    return Err(CoeoError::AlreadyExists(format!(
                        "external nullifier {} is reserved for proposal ids",
                        external_nullifier
                    )));
                }
                self.semaphore
                    .add_external_nullifier(&engine, external_nullifier, events)
            }
            GovernanceCall::DeactivateExternalNullifier(external_nullifier) => self
                .semaphore
                .deactivate_external_nullifier(&engine, &external_nullifier, events),
            GovernanceCall::ReactivateExternalNullifier(external_nullifier) => self
                .semaphore
                .reactivate_external_nullifier(&engine, &external_nullifier, events),
            GovernanceCall::SetPermissioning(enabled) => {
                self.semaphore.set_permissioning(&engine, enabled, events)
            }
        }
    }

    /// Direct broadcast on the semaphore registry, subject to its permission gate.
    pub fn semaphore_broadcast(
        &mut self,
        ctx: &TxContext,
        signal: &[u8],
        witness: &SignalWitness,
        external_nullifier: ExternalNullifier,
    ) -> CoeoResult<Receipt> {
        reject_proposal_topic(&external_nullifier)?;
        let request = SignalRequest {
            signal,
            proof: &witness.proof,
            root: witness.root,
            nullifier_hash: witness.nullifier_hash,
            external_nullifier,
        };
        let mut events = Vec::new();
        self.semaphore
            .broadcast_signal(&ctx.caller, &request, &mut events)?;
        Ok(Receipt::new(events))
    }

    /// Drops proposals older than the retention period and retires their topics.
    pub fn prune(&mut self, now: u64) -> Receipt {
        let period = self.config.period_secs;
        let stale: Vec<u64> = self
            .proposals
            .values()
            .filter(|p| p.created_at.saturating_add(period) < now)
            .map(|p| p.id)
            .collect();

        let mut events = Vec::new();
        for proposal_id in stale {
            let Some(proposal) = self.proposals.remove(&proposal_id) else {
                continue;
            };
            if !proposal.executed {
                if let Err(e) = self.semaphore.deactivate_external_nullifier(
                    &self.address,
                    &proposal.topic(),
                    &mut events,
                ) {
                    warn!(proposal_id, error = %e, "Failed to retire pruned topic");
                }
            }
            events.push(Event::ProposalPruned { proposal_id });
        }

        if !events.is_empty() {
            info!(remaining = self.proposals.len(), "Pruned stale proposals");
        }
        Receipt::new(events)
    }
}

/// Proposal topics only accept proposals and votes.
fn reject_proposal_topic(external_nullifier: &ExternalNullifier) -> CoeoResult<()> {
    if is_proposal_topic(external_nullifier) {
        return Err(CoeoError::PermissionDenied(format!(
            "external nullifier {} is reserved for proposal voting",
            external_nullifier
        )));
    }
    Ok(())
}
