use crate::events::Event;
use crate::target::{CallContext, ExecutionTarget};
use coeo_types::{Address, CoeoError, CoeoResult};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletCall {
    Execute {
        to: Address,
        value: u128,
        data: Vec<u8>,
    },
}

impl WalletCall {
    pub fn encode(&self) -> CoeoResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| CoeoError::Serialization(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> CoeoResult<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| CoeoError::ExecutionFailed(format!("undecodable wallet call: {}", e)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub to: Address,
    pub value: u128,
    pub data: Vec<u8>,
    pub at: u64,
}

/// Organization treasury, spendable only by its owning voting engine.
pub struct Wallet {
    address: Address,
    owner: Address,
    balance: u128,
    transfers: Vec<TransferRecord>,
}

impl Wallet {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            balance: 0,
            transfers: Vec::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn transfers(&self) -> &[TransferRecord] {
        &self.transfers
    }

    /// Total sent to `to` across all transfers.
    pub fn paid_to(&self, to: &Address) -> u128 {
        self.transfers
            .iter()
            .filter(|t| t.to == *to)
            .map(|t| t.value)
            .sum()
    }
}

impl ExecutionTarget for Wallet {
    fn execute(&mut self, ctx: &CallContext, calldata: &[u8]) -> CoeoResult<Vec<Event>> {
        if ctx.caller != self.owner {
            return Err(CoeoError::PermissionDenied(format!(
                "wallet {} is not owned by {}",
                self.address, ctx.caller
            )));
        }
        let WalletCall::Execute { to, value, data } = WalletCall::decode(calldata)?;

        let available = self
            .balance
            .checked_add(ctx.value)
            .ok_or_else(|| CoeoError::ExecutionFailed("wallet balance overflow".into()))?;
        if available < value {
            return Err(CoeoError::ExecutionFailed(format!(
                "insufficient wallet balance: have {}, need {}",
                available, value
            )));
        }

        self.balance = available - value;
        self.transfers.push(TransferRecord {
            to,
            value,
            data,
            at: ctx.now,
        });
        info!(to = %to, value, "Wallet transfer executed");

        let mut events = Vec::new();
        if ctx.value > 0 {
            events.push(Event::Deposit {
                from: ctx.caller,
                amount: ctx.value,
            });
        }
        events.push(Event::Transfer { to, value });
        Ok(events)
    }

    fn receive(&mut self, from: Address, amount: u128) -> CoeoResult<Vec<Event>> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| CoeoError::ExecutionFailed("wallet balance overflow".into()))?;
        Ok(vec![Event::Deposit { from, amount }])
    }

    fn balance(&self) -> u128 {
        self.balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETHER: u128 = 1_000_000_000_000_000_000;

    fn wallet() -> (Wallet, Address) {
        let owner = Address::from_low_u64(10);
        (Wallet::new(Address::from_low_u64(11), owner), owner)
    }

    fn call(to: Address, value: u128) -> Vec<u8> {
        WalletCall::Execute {
            to,
            value,
            data: Vec::new(),
        }
        .encode()
        .unwrap()
    }

    #[test]
    fn test_owner_transfer() {
        let (mut wallet, owner) = wallet();
        let recipient = Address::from_low_u64(9);
        wallet.receive(Address::from_low_u64(1), 5 * ETHER).unwrap();

        let ctx = CallContext {
            caller: owner,
            value: 0,
            now: 100,
        };
        let events = wallet.execute(&ctx, &call(recipient, ETHER)).unwrap();

        assert_eq!(wallet.balance(), 4 * ETHER);
        assert_eq!(wallet.paid_to(&recipient), ETHER);
        assert_eq!(events, vec![Event::Transfer { to: recipient, value: ETHER }]);
    }

    #[test]
    fn test_non_owner_rejected() {
        let (mut wallet, _) = wallet();
        wallet.receive(Address::from_low_u64(1), ETHER).unwrap();
        let ctx = CallContext {
            caller: Address::from_low_u64(66),
            value: 0,
            now: 0,
        };
        assert!(matches!(
            wallet.execute(&ctx, &call(Address::from_low_u64(9), 1)),
            Err(CoeoError::PermissionDenied(_))
        ));
        assert_eq!(wallet.balance(), ETHER);
    }

    #[test]
    fn test_insufficient_balance_is_atomic() {
        let (mut wallet, owner) = wallet();
        let ctx = CallContext {
            caller: owner,
            value: ETHER,
            now: 0,
        };
        assert!(matches!(
            wallet.execute(&ctx, &call(Address::from_low_u64(9), 2 * ETHER)),
            Err(CoeoError::ExecutionFailed(_))
        ));
        assert_eq!(wallet.balance(), 0);
        assert!(wallet.transfers().is_empty());
    }

    #[test]
    fn test_attached_value_is_spendable() {
        let (mut wallet, owner) = wallet();
        let ctx = CallContext {
            caller: owner,
            value: 3,
            now: 0,
        };
        let events = wallet.execute(&ctx, &call(Address::from_low_u64(9), 2)).unwrap();
        assert_eq!(wallet.balance(), 1);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_garbage_calldata() {
        let (mut wallet, owner) = wallet();
        let ctx = CallContext {
            caller: owner,
            value: 0,
            now: 0,
        };
        assert!(matches!(
            wallet.execute(&ctx, &[0xff, 0xff, 0xff, 0xff, 0xff]),
            Err(CoeoError::ExecutionFailed(_))
        ));
    }
}
