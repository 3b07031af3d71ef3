//! The task market manager.
//!
//! The market is the value-holding party: budgets attached to `create_task`
//! stay escrowed inside it until exactly one of release (to the assignee)
//! or refund (to the creator) happens. Outbound value is credited to an
//! internal payout ledger readable through `balance_of`, which keeps the
//! escrow conservation invariant checkable end to end.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use agora_common::{mul_div, Address, Amount};

use crate::events::{
    BidAcceptedRecord, BidSubmittedRecord, FeesWithdrawnRecord, MarketEvent,
    PaymentReleasedRecord, TaskCancelledRecord, TaskCompletedRecord, TaskCreatedRecord,
    WorkSubmittedRecord,
};
use crate::task::{Bid, Task, TaskState};
use crate::{MarketError, MarketResult};

/// Market parameters, fixed at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Platform fee in basis points (1/100th of a percent), at most 10000
    pub fee_basis_points: u64,
}

/// Interior market state, guarded by a single lock so every operation is
/// all-effects-or-none.
#[derive(Debug, Default)]
struct MarketState {
    /// Controller identity allowed to withdraw platform fees
    controller: Option<Address>,
    /// Tasks by id
    tasks: HashMap<u64, Task>,
    /// Bids per task, in submission order (bid ids are 1-based indexes)
    bids: HashMap<u64, Vec<Bid>>,
    /// Next task id (ids are sequential, 1-based)
    next_task_id: u64,
    /// Value currently escrowed for unsettled tasks
    escrowed_total: Amount,
    /// Platform fees accrued and not yet withdrawn
    accrued_fees: Amount,
    /// Payout ledger: value the market has disbursed, per account
    balances: HashMap<Address, Amount>,
    /// Append-only event log
    events: Vec<MarketEvent>,
}

/// The escrow-backed task marketplace for one organization
#[derive(Debug)]
pub struct TaskMarket {
    /// Market parameters
    config: MarketConfig,
    /// Market state
    state: RwLock<MarketState>,
}

impl TaskMarket {
    /// Create a new market with `controller` as the fee recipient
    pub fn new(controller: Address, config: MarketConfig) -> MarketResult<Self> {
        if config.fee_basis_points > 10_000 {
            return Err(MarketError::InvalidConfig(format!(
                "fee of {} basis points exceeds 10000",
                config.fee_basis_points
            )));
        }
        debug!("Initializing task market (fee {} bps)", config.fee_basis_points);
        Ok(Self {
            config,
            state: RwLock::new(MarketState {
                controller: Some(controller),
                next_task_id: 1,
                ..MarketState::default()
            }),
        })
    }

    /// The market's configuration
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Create a task, escrowing `deposit` as its budget
    pub async fn create_task(
        &self,
        caller: &Address,
        title: &str,
        description: &str,
        ipfs_hash: &str,
        deadline: DateTime<Utc>,
        deposit: Amount,
    ) -> MarketResult<TaskCreatedRecord> {
        let now = Utc::now();
        if title.is_empty() {
            return Err(MarketError::InvalidTask("title must not be empty".to_string()));
        }
        if deadline <= now {
            return Err(MarketError::InvalidDeadline(format!(
                "deadline {} is not in the future",
                deadline
            )));
        }
        if deposit == 0 {
            return Err(MarketError::InvalidBudget(
                "task budget must be positive".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        let escrowed = state.escrowed_total.checked_add(deposit).ok_or_else(|| {
            MarketError::Overflow("deposit would overflow the escrow pool".to_string())
        })?;

        let id = state.next_task_id;
        state.next_task_id += 1;
        state.escrowed_total = escrowed;
        state.tasks.insert(
            id,
            Task {
                id,
                creator: caller.clone(),
                title: title.to_string(),
                description: description.to_string(),
                ipfs_hash: ipfs_hash.to_string(),
                budget: deposit,
                deadline,
                assignee: None,
                state: TaskState::Open,
                created_at: now,
                completed_at: None,
                paid: false,
            },
        );
        state.bids.insert(id, Vec::new());

        info!("Task {} created by {} with budget {}", id, caller, deposit);

        let record = TaskCreatedRecord {
            task_id: id,
            creator: caller.clone(),
            title: title.to_string(),
            budget: deposit,
            deadline,
            created_at: now,
        };
        state.events.push(MarketEvent::TaskCreated(record.clone()));
        Ok(record)
    }

    /// Submit a bid on an open task. Anyone may bid, the creator included.
    pub async fn submit_bid(
        &self,
        caller: &Address,
        task_id: u64,
        amount: Amount,
        proposal: &str,
    ) -> MarketResult<BidSubmittedRecord> {
        let mut state = self.state.write().await;

        let task = state
            .tasks
            .get(&task_id)
            .ok_or_else(|| MarketError::TaskNotFound(format!("no task with id {}", task_id)))?;
        if task.state != TaskState::Open {
            return Err(MarketError::TaskNotAssigned(format!(
                "task {} is no longer accepting bids",
                task_id
            )));
        }
        if amount == 0 {
            return Err(MarketError::BidTooLow("bid amount must be positive".to_string()));
        }
        if amount > task.budget {
            return Err(MarketError::BidTooLow(format!(
                "bid of {} exceeds the task budget of {}",
                amount, task.budget
            )));
        }

        let bids = state.bids.entry(task_id).or_default();
        let bid_id = bids.len() as u64 + 1;
        bids.push(Bid {
            id: bid_id,
            task_id,
            bidder: caller.clone(),
            amount,
            proposal: proposal.to_string(),
            accepted: false,
        });

        debug!("Bid {} of {} submitted on task {} by {}", bid_id, amount, task_id, caller);

        let record = BidSubmittedRecord {
            task_id,
            bid_id,
            bidder: caller.clone(),
            amount,
        };
        state.events.push(MarketEvent::BidSubmitted(record.clone()));
        Ok(record)
    }

    /// Accept a bid, assigning the task to its bidder. Creator only.
    pub async fn accept_bid(
        &self,
        caller: &Address,
        task_id: u64,
        bid_id: u64,
    ) -> MarketResult<BidAcceptedRecord> {
        let mut state = self.state.write().await;

        let task = state
            .tasks
            .get(&task_id)
            .ok_or_else(|| MarketError::TaskNotFound(format!("no task with id {}", task_id)))?;
        if task.creator != *caller {
            return Err(MarketError::Unauthorized(format!(
                "only the creator of task {} may accept bids",
                task_id
            )));
        }
        if task.state != TaskState::Open {
            return Err(MarketError::TaskNotAssigned(format!(
                "task {} is no longer open",
                task_id
            )));
        }

        let bid = state
            .bids
            .get_mut(&task_id)
            .and_then(|bids| bids.iter_mut().find(|b| b.id == bid_id))
            .ok_or_else(|| {
                MarketError::TaskNotFound(format!("no bid {} for task {}", bid_id, task_id))
            })?;
        bid.accepted = true;
        let bidder = bid.bidder.clone();
        let amount = bid.amount;

        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| MarketError::TaskNotFound(format!("no task with id {}", task_id)))?;
        task.assignee = Some(bidder.clone());
        task.state = TaskState::Assigned;

        info!("Task {} assigned to {} at bid {} ({})", task_id, bidder, bid_id, amount);

        let record = BidAcceptedRecord {
            task_id,
            bid_id,
            assignee: bidder,
            amount,
        };
        state.events.push(MarketEvent::BidAccepted(record.clone()));
        Ok(record)
    }

    /// Attach a work-result reference to an assigned task. Assignee only;
    /// purely informational and does not advance the task state.
    pub async fn submit_work(
        &self,
        caller: &Address,
        task_id: u64,
        work_result: &str,
    ) -> MarketResult<WorkSubmittedRecord> {
        let mut state = self.state.write().await;

        let task = state
            .tasks
            .get(&task_id)
            .ok_or_else(|| MarketError::TaskNotFound(format!("no task with id {}", task_id)))?;
        let assignee = task.assignee.clone().ok_or_else(|| {
            MarketError::TaskNotAssigned(format!("task {} has no assignee", task_id))
        })?;
        if assignee != *caller {
            return Err(MarketError::Unauthorized(format!(
                "only the assignee of task {} may submit work",
                task_id
            )));
        }

        debug!("Work submitted on task {} by {}", task_id, caller);

        let record = WorkSubmittedRecord {
            task_id,
            assignee,
            work_result: work_result.to_string(),
            submitted_at: Utc::now(),
        };
        state.events.push(MarketEvent::WorkSubmitted(record.clone()));
        Ok(record)
    }

    /// Mark an assigned task completed. Creator only.
    pub async fn complete_task(
        &self,
        caller: &Address,
        task_id: u64,
    ) -> MarketResult<TaskCompletedRecord> {
        let mut state = self.state.write().await;

        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| MarketError::TaskNotFound(format!("no task with id {}", task_id)))?;
        if task.creator != *caller {
            return Err(MarketError::Unauthorized(format!(
                "only the creator of task {} may complete it",
                task_id
            )));
        }
        if task.state != TaskState::Assigned {
            return Err(MarketError::TaskNotAssigned(format!(
                "task {} is not assigned",
                task_id
            )));
        }
        let assignee = task.assignee.clone().ok_or_else(|| {
            MarketError::TaskNotAssigned(format!("task {} has no assignee", task_id))
        })?;

        let completed_at = Utc::now();
        task.state = TaskState::Completed;
        task.completed_at = Some(completed_at);

        info!("Task {} completed", task_id);

        let record = TaskCompletedRecord {
            task_id,
            assignee,
            completed_at,
        };
        state.events.push(MarketEvent::TaskCompleted(record.clone()));
        Ok(record)
    }

    /// Release the escrowed payment for a completed task. Creator only.
    ///
    /// Pays the accepted bid amount minus the platform fee to the assignee;
    /// the remainder of the budget plus the fee stays with the market as
    /// accrued fees. Disburses at most once per task.
    pub async fn release_payment(
        &self,
        caller: &Address,
        task_id: u64,
    ) -> MarketResult<PaymentReleasedRecord> {
        let mut state = self.state.write().await;

        let task = state
            .tasks
            .get(&task_id)
            .ok_or_else(|| MarketError::TaskNotFound(format!("no task with id {}", task_id)))?;
        if task.creator != *caller {
            return Err(MarketError::Unauthorized(format!(
                "only the creator of task {} may release payment",
                task_id
            )));
        }
        if task.paid {
            return Err(MarketError::AlreadySettled(format!(
                "payment for task {} was already released",
                task_id
            )));
        }
        if task.state != TaskState::Completed {
            return Err(MarketError::TaskNotAssigned(format!(
                "task {} is not completed",
                task_id
            )));
        }
        let assignee = task.assignee.clone().ok_or_else(|| {
            MarketError::TaskNotAssigned(format!("task {} has no assignee", task_id))
        })?;
        let budget = task.budget;

        let accepted = state
            .bids
            .get(&task_id)
            .and_then(|bids| bids.iter().find(|b| b.accepted))
            .ok_or_else(|| {
                MarketError::TaskNotFound(format!("no accepted bid for task {}", task_id))
            })?;
        let gross = accepted.amount;
        let fee = mul_div(gross, self.config.fee_basis_points as Amount, 10_000);
        let net = gross - fee;

        let accrued = state
            .accrued_fees
            .checked_add(budget - gross + fee)
            .ok_or_else(|| {
                MarketError::Overflow("accrued fees would overflow".to_string())
            })?;
        let credited = state
            .balances
            .get(&assignee)
            .copied()
            .unwrap_or(0)
            .checked_add(net)
            .ok_or_else(|| {
                MarketError::Overflow(format!("payout ledger for {} would overflow", assignee))
            })?;

        // Settlement flag and escrow bookkeeping are persisted before the
        // outbound credit, so a reentrant release observes the task as paid
        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| MarketError::TaskNotFound(format!("no task with id {}", task_id)))?;
        task.paid = true;
        state.escrowed_total -= budget;
        state.accrued_fees = accrued;
        state.balances.insert(assignee.clone(), credited);

        info!(
            "Released {} ({} minus fee {}) to {} for task {}",
            net, gross, fee, assignee, task_id
        );

        let record = PaymentReleasedRecord {
            task_id,
            assignee,
            gross,
            fee,
            net,
        };
        state.events.push(MarketEvent::PaymentReleased(record.clone()));
        Ok(record)
    }

    /// Cancel an open task, refunding the full budget to the creator.
    /// Creator only.
    pub async fn cancel_task(
        &self,
        caller: &Address,
        task_id: u64,
    ) -> MarketResult<TaskCancelledRecord> {
        let mut state = self.state.write().await;

        let task = state
            .tasks
            .get(&task_id)
            .ok_or_else(|| MarketError::TaskNotFound(format!("no task with id {}", task_id)))?;
        if task.creator != *caller {
            return Err(MarketError::Unauthorized(format!(
                "only the creator of task {} may cancel it",
                task_id
            )));
        }
        if task.state != TaskState::Open {
            return Err(MarketError::TaskNotAssigned(format!(
                "task {} is no longer open",
                task_id
            )));
        }

        let refund = task.budget;
        let credited = state
            .balances
            .get(caller)
            .copied()
            .unwrap_or(0)
            .checked_add(refund)
            .ok_or_else(|| {
                MarketError::Overflow(format!("payout ledger for {} would overflow", caller))
            })?;

        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| MarketError::TaskNotFound(format!("no task with id {}", task_id)))?;
        task.state = TaskState::Cancelled;
        state.escrowed_total -= refund;
        state.balances.insert(caller.clone(), credited);

        info!("Task {} cancelled; {} refunded to {}", task_id, refund, caller);

        let record = TaskCancelledRecord {
            task_id,
            creator: caller.clone(),
            refund,
        };
        state.events.push(MarketEvent::TaskCancelled(record.clone()));
        Ok(record)
    }

    /// Withdraw all accrued platform fees. Controller only; succeeds as a
    /// no-op when nothing has accrued.
    pub async fn withdraw_platform_fees(
        &self,
        caller: &Address,
    ) -> MarketResult<FeesWithdrawnRecord> {
        let mut state = self.state.write().await;

        if state.controller.as_ref() != Some(caller) {
            return Err(MarketError::Unauthorized(format!(
                "{} is not the market controller",
                caller
            )));
        }

        let amount = state.accrued_fees;
        let credited = state
            .balances
            .get(caller)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or_else(|| {
                MarketError::Overflow(format!("payout ledger for {} would overflow", caller))
            })?;
        state.accrued_fees = 0;
        state.balances.insert(caller.clone(), credited);

        info!("Withdrew {} in platform fees to {}", amount, caller);

        let record = FeesWithdrawnRecord {
            controller: caller.clone(),
            amount,
        };
        state.events.push(MarketEvent::FeesWithdrawn(record.clone()));
        Ok(record)
    }

    /// Snapshot of a stored task
    pub async fn task(&self, task_id: u64) -> Option<Task> {
        self.state.read().await.tasks.get(&task_id).cloned()
    }

    /// Snapshot of the bids on a task, in submission order
    pub async fn bids(&self, task_id: u64) -> Vec<Bid> {
        self.state
            .read()
            .await
            .bids
            .get(&task_id)
            .cloned()
            .unwrap_or_default()
    }

    /// The accepted bid for a task, if one was accepted
    pub async fn accepted_bid(&self, task_id: u64) -> Option<Bid> {
        self.state
            .read()
            .await
            .bids
            .get(&task_id)
            .and_then(|bids| bids.iter().find(|b| b.accepted).cloned())
    }

    /// Number of tasks ever created
    pub async fn task_count(&self) -> u64 {
        self.state.read().await.next_task_id - 1
    }

    /// Value currently escrowed for unsettled tasks
    pub async fn escrowed_total(&self) -> Amount {
        self.state.read().await.escrowed_total
    }

    /// Platform fees accrued and not yet withdrawn
    pub async fn accrued_fees(&self) -> Amount {
        self.state.read().await.accrued_fees
    }

    /// Value the market has disbursed to `account`
    pub async fn balance_of(&self, account: &Address) -> Amount {
        self.state
            .read()
            .await
            .balances
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    /// The market controller, if set
    pub async fn controller(&self) -> Option<Address> {
        self.state.read().await.controller.clone()
    }

    /// Snapshot of the event log
    pub async fn events(&self) -> Vec<MarketEvent> {
        self.state.read().await.events.clone()
    }
}
