//! The governance token ledger.
//!
//! Balances are soul-bound: they change only through controller-restricted
//! mint and burn, never through transfers. Voting power tracks delegation
//! (self-delegation by default) and every change appends a checkpoint at
//! the current block height, for both the affected delegates and the total
//! supply, so the governor can take snapshot reads at proposal creation
//! heights.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use agora_common::{Address, Amount, BlockClock, BlockHeight};

use crate::checkpoint::CheckpointHistory;
use crate::events::{
    BurnRecord, DelegateChangedRecord, MintRecord, OwnershipTransferredRecord, TokenEvent,
};
use crate::{TokenError, TokenResult};

/// Interior ledger state, guarded by a single lock so every operation is
/// all-effects-or-none.
#[derive(Debug, Default)]
struct TokenState {
    /// Current controller; `None` once ownership is renounced
    owner: Option<Address>,
    /// Balances by account
    balances: HashMap<Address, Amount>,
    /// Explicit delegate choices; accounts absent here self-delegate
    delegates: HashMap<Address, Address>,
    /// Voting-power checkpoint history per delegate target
    checkpoints: HashMap<Address, CheckpointHistory>,
    /// Total-supply checkpoint history
    supply_checkpoints: CheckpointHistory,
    /// Current total supply
    total_supply: Amount,
    /// Append-only event log
    events: Vec<TokenEvent>,
}

impl TokenState {
    /// The current delegate for `account` (self by default)
    fn delegate_of(&self, account: &Address) -> Address {
        self.delegates
            .get(account)
            .cloned()
            .unwrap_or_else(|| account.clone())
    }

    /// Move `amount` of voting power from one delegate to another,
    /// checkpointing both sides. The null address on either side means the
    /// power is created (mint) or destroyed (burn / delegate-to-null)
    /// rather than moved.
    fn move_delegate_votes(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
        height: BlockHeight,
    ) {
        if amount == 0 || from == to {
            return;
        }
        if !from.is_null() {
            let history = self.checkpoints.entry(from.clone()).or_default();
            let current = history.latest();
            debug_assert!(current >= amount);
            history.record(height, current.saturating_sub(amount));
        }
        if !to.is_null() {
            let history = self.checkpoints.entry(to.clone()).or_default();
            let current = history.latest();
            history.record(height, current + amount);
        }
    }
}

/// The soul-bound governance token ledger for one organization
#[derive(Debug)]
pub struct GovernanceToken {
    /// Token name, fixed at construction
    name: String,
    /// Token symbol, fixed at construction
    symbol: String,
    /// Block clock shared with the governance engine
    clock: BlockClock,
    /// Ledger state
    state: RwLock<TokenState>,
}

impl GovernanceToken {
    /// Create a new ledger with `controller` as the initial owner
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        controller: Address,
        clock: BlockClock,
    ) -> Self {
        let name = name.into();
        let symbol = symbol.into();
        debug!("Initializing governance token {} ({})", name, symbol);
        Self {
            name,
            symbol,
            clock,
            state: RwLock::new(TokenState {
                owner: Some(controller),
                ..TokenState::default()
            }),
        }
    }

    /// Token name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Mint `amount` tokens to `to`. Controller only.
    ///
    /// Credits the balance and total supply, and assigns the new voting
    /// power to `to`'s current delegate with a fresh checkpoint.
    pub async fn mint(
        &self,
        caller: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<MintRecord> {
        let mut state = self.state.write().await;

        if state.owner.as_ref() != Some(caller) {
            return Err(TokenError::Unauthorized(format!(
                "{} is not the token controller",
                caller
            )));
        }
        if to.is_null() {
            return Err(TokenError::InvalidRecipient(
                "cannot mint to the null address".to_string(),
            ));
        }
        if amount == 0 {
            return Err(TokenError::InvalidAmount("mint amount must be positive".to_string()));
        }

        let balance = state.balances.get(to).copied().unwrap_or(0);
        let new_balance = balance
            .checked_add(amount)
            .ok_or_else(|| TokenError::Overflow(format!("balance of {} would overflow", to)))?;
        let new_supply = state
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| TokenError::Overflow("total supply would overflow".to_string()))?;

        let height = self.clock.height();
        state.balances.insert(to.clone(), new_balance);
        state.total_supply = new_supply;
        state.supply_checkpoints.record(height, new_supply);

        let delegate = state.delegate_of(to);
        state.move_delegate_votes(&Address::null(), &delegate, amount, height);

        info!("Minted {} tokens to {} at height {}", amount, to, height);

        let record = MintRecord {
            to: to.clone(),
            amount,
            total_supply: new_supply,
            height,
        };
        state.events.push(TokenEvent::Mint(record.clone()));
        Ok(record)
    }

    /// Burn `amount` tokens from `from`. Controller only.
    pub async fn burn(
        &self,
        caller: &Address,
        from: &Address,
        amount: Amount,
    ) -> TokenResult<BurnRecord> {
        let mut state = self.state.write().await;

        if state.owner.as_ref() != Some(caller) {
            return Err(TokenError::Unauthorized(format!(
                "{} is not the token controller",
                caller
            )));
        }
        if amount == 0 {
            return Err(TokenError::InvalidAmount("burn amount must be positive".to_string()));
        }

        let balance = state.balances.get(from).copied().unwrap_or(0);
        if amount > balance {
            return Err(TokenError::InsufficientBalance(format!(
                "{} holds {} but {} would be burned",
                from, balance, amount
            )));
        }

        let height = self.clock.height();
        state.balances.insert(from.clone(), balance - amount);
        state.total_supply -= amount;
        let new_supply = state.total_supply;
        state.supply_checkpoints.record(height, new_supply);

        let delegate = state.delegate_of(from);
        state.move_delegate_votes(&delegate, &Address::null(), amount, height);

        info!("Burned {} tokens from {} at height {}", amount, from, height);

        let record = BurnRecord {
            from: from.clone(),
            amount,
            total_supply: new_supply,
            height,
        };
        state.events.push(TokenEvent::Burn(record.clone()));
        Ok(record)
    }

    /// Delegate the caller's voting power to `delegatee`.
    ///
    /// Moves the caller's full balance worth of power from the old delegate
    /// to the new one. Delegating to the null address removes the power
    /// without assigning it anywhere; delegating to self is a no-op on
    /// power but is still recorded. Never fails.
    pub async fn delegate(&self, caller: &Address, delegatee: &Address) -> DelegateChangedRecord {
        let mut state = self.state.write().await;

        let old_delegate = state.delegate_of(caller);
        let weight = state.balances.get(caller).copied().unwrap_or(0);
        let height = self.clock.height();

        state.delegates.insert(caller.clone(), delegatee.clone());
        state.move_delegate_votes(&old_delegate, delegatee, weight, height);

        debug!(
            "{} delegated {} voting power from {} to {}",
            caller, weight, old_delegate, delegatee
        );

        let record = DelegateChangedRecord {
            delegator: caller.clone(),
            old_delegate,
            new_delegate: delegatee.clone(),
            weight,
            height,
        };
        state.events.push(TokenEvent::DelegateChanged(record.clone()));
        record
    }

    /// Current voting power of `account` as a delegate target
    pub async fn get_votes(&self, account: &Address) -> Amount {
        let state = self.state.read().await;
        state
            .checkpoints
            .get(account)
            .map(|h| h.latest())
            .unwrap_or(0)
    }

    /// Voting power of `account` as of the latest checkpoint at or before
    /// `height` (0 if none exists)
    pub async fn get_past_votes(&self, account: &Address, height: BlockHeight) -> Amount {
        let state = self.state.read().await;
        state
            .checkpoints
            .get(account)
            .map(|h| h.value_at(height))
            .unwrap_or(0)
    }

    /// Total supply as of the latest checkpoint at or before `height`
    pub async fn past_total_supply(&self, height: BlockHeight) -> Amount {
        let state = self.state.read().await;
        state.supply_checkpoints.value_at(height)
    }

    /// Balance of `account`
    pub async fn balance_of(&self, account: &Address) -> Amount {
        let state = self.state.read().await;
        state.balances.get(account).copied().unwrap_or(0)
    }

    /// Current total supply
    pub async fn total_supply(&self) -> Amount {
        self.state.read().await.total_supply
    }

    /// The current delegate of `account` (self by default)
    pub async fn delegates(&self, account: &Address) -> Address {
        self.state.read().await.delegate_of(account)
    }

    /// The current controller, if ownership was not renounced
    pub async fn owner(&self) -> Option<Address> {
        self.state.read().await.owner.clone()
    }

    /// Transfers are disabled unconditionally: the token is soul-bound.
    pub async fn transfer(
        &self,
        _caller: &Address,
        _to: &Address,
        _amount: Amount,
    ) -> TokenResult<()> {
        Err(TokenError::TransferNotAllowed)
    }

    /// Delegated transfers are disabled unconditionally as well.
    pub async fn transfer_from(
        &self,
        _caller: &Address,
        _from: &Address,
        _to: &Address,
        _amount: Amount,
    ) -> TokenResult<()> {
        Err(TokenError::TransferNotAllowed)
    }

    /// Hand the controller role to `new_owner`. Controller only.
    pub async fn transfer_ownership(
        &self,
        caller: &Address,
        new_owner: &Address,
    ) -> TokenResult<OwnershipTransferredRecord> {
        let mut state = self.state.write().await;

        if state.owner.as_ref() != Some(caller) {
            return Err(TokenError::Unauthorized(format!(
                "{} is not the token controller",
                caller
            )));
        }
        if new_owner.is_null() {
            return Err(TokenError::InvalidRecipient(
                "cannot transfer ownership to the null address".to_string(),
            ));
        }

        let previous = state.owner.replace(new_owner.clone());
        info!("Token ownership transferred to {}", new_owner);

        let record = OwnershipTransferredRecord {
            previous_owner: previous,
            new_owner: Some(new_owner.clone()),
        };
        state.events.push(TokenEvent::OwnershipTransferred(record.clone()));
        Ok(record)
    }

    /// Renounce the controller role, permanently disabling mint and burn.
    /// Controller only.
    pub async fn renounce_ownership(
        &self,
        caller: &Address,
    ) -> TokenResult<OwnershipTransferredRecord> {
        let mut state = self.state.write().await;

        if state.owner.as_ref() != Some(caller) {
            return Err(TokenError::Unauthorized(format!(
                "{} is not the token controller",
                caller
            )));
        }

        let previous = state.owner.take();
        info!("Token ownership renounced; mint and burn are disabled");

        let record = OwnershipTransferredRecord {
            previous_owner: previous,
            new_owner: None,
        };
        state.events.push(TokenEvent::OwnershipTransferred(record.clone()));
        Ok(record)
    }

    /// Snapshot of the event log
    pub async fn events(&self) -> Vec<TokenEvent> {
        self.state.read().await.events.clone()
    }
}
