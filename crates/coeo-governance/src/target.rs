use crate::events::Event;
use coeo_types::{Address, CoeoResult};

/// Caller-supplied environment for a state-changing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxContext {
    pub caller: Address,
    pub now: u64,
}

impl TxContext {
    pub fn new(caller: Address, now: u64) -> Self {
        Self { caller, now }
    }
}

/// Environment seen by an execution target when a proposal dispatches to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub value: u128,
    pub now: u64,
}

/// An account a passed proposal can call into.
///
/// `execute` must validate before mutating: on `Err` the target is unchanged
/// and the attached value is not credited.
pub trait ExecutionTarget: Send + Sync {
    fn execute(&mut self, ctx: &CallContext, calldata: &[u8]) -> CoeoResult<Vec<Event>>;

    fn receive(&mut self, from: Address, amount: u128) -> CoeoResult<Vec<Event>>;

    fn balance(&self) -> u128;
}
