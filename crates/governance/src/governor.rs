//! The proposal governance engine.
//!
//! The governor owns the proposal store and derives each proposal's
//! lifecycle state on demand from the stored fields and the current block
//! height. It reads voting power from the token ledger at the proposal's
//! snapshot height and never mutates the ledger.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use agora_common::{content_hash, mul_div, Address, Amount, BlockClock, BlockHeight};
use agora_token::GovernanceToken;

use crate::events::{
    GovernanceEvent, ProposalCanceledRecord, ProposalCreatedRecord, ProposalExecutedRecord,
    VoteCastRecord,
};
use crate::proposal::{proposal_hash, Proposal, ProposalState, VoteSupport};
use crate::{GovernanceError, GovernanceResult};

/// Governor parameters, fixed at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Blocks between proposal creation and the start of voting
    pub voting_delay: u64,
    /// Length of the voting window in blocks
    pub voting_period: u64,
    /// Minimum current voting power required to propose
    pub proposal_threshold: Amount,
    /// Quorum as a percentage of the snapshot total supply (0 to 100)
    pub quorum_numerator: u64,
}

/// Interior governor state
#[derive(Debug, Default)]
struct GovernorState {
    /// Proposals by id
    proposals: HashMap<u64, Proposal>,
    /// Identity hash to proposal id, built at propose time
    proposal_ids: HashMap<String, u64>,
    /// Next proposal id (ids are sequential, 1-based)
    next_id: u64,
    /// Append-only event log
    events: Vec<GovernanceEvent>,
}

/// The proposal governance engine for one organization
#[derive(Debug)]
pub struct Governor {
    /// Governor parameters
    config: GovernorConfig,
    /// The token ledger voting power is read from
    token: Arc<GovernanceToken>,
    /// Block clock shared with the ledger
    clock: BlockClock,
    /// Proposal store
    state: RwLock<GovernorState>,
}

impl Governor {
    /// Create a new governor over `token`
    pub fn new(
        config: GovernorConfig,
        token: Arc<GovernanceToken>,
        clock: BlockClock,
    ) -> GovernanceResult<Self> {
        if config.quorum_numerator > 100 {
            return Err(GovernanceError::InvalidConfig(format!(
                "quorum numerator {} exceeds 100",
                config.quorum_numerator
            )));
        }
        if config.voting_period == 0 {
            return Err(GovernanceError::InvalidConfig(
                "voting period must be at least one block".to_string(),
            ));
        }
        debug!(
            "Initializing governor (delay {}, period {}, threshold {}, quorum {}%)",
            config.voting_delay,
            config.voting_period,
            config.proposal_threshold,
            config.quorum_numerator
        );
        Ok(Self {
            config,
            token,
            clock,
            state: RwLock::new(GovernorState {
                next_id: 1,
                ..GovernorState::default()
            }),
        })
    }

    /// The governor's configuration
    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Create a proposal from an action set and description.
    ///
    /// The voting window is `[current + delay + 1, current + delay + 1 +
    /// period]`; voting power and quorum are snapshotted one block before
    /// the window opens.
    pub async fn propose(
        &self,
        caller: &Address,
        targets: Vec<Address>,
        values: Vec<Amount>,
        calldatas: Vec<Vec<u8>>,
        description: &str,
    ) -> GovernanceResult<ProposalCreatedRecord> {
        if targets.is_empty() {
            return Err(GovernanceError::InvalidProposal(
                "proposal must contain at least one action".to_string(),
            ));
        }
        if targets.len() != values.len() || targets.len() != calldatas.len() {
            return Err(GovernanceError::InvalidProposal(format!(
                "action arrays differ in length: {} targets, {} values, {} calldatas",
                targets.len(),
                values.len(),
                calldatas.len()
            )));
        }

        let power = self.token.get_votes(caller).await;
        if power < self.config.proposal_threshold {
            return Err(GovernanceError::InsufficientVotingPower(format!(
                "{} holds {} voting power, {} required to propose",
                caller, power, self.config.proposal_threshold
            )));
        }

        let description_hash = content_hash(description.as_bytes());
        let identity = proposal_hash(&targets, &values, &calldatas, &description_hash);

        let mut state = self.state.write().await;
        if state.proposal_ids.contains_key(&identity) {
            return Err(GovernanceError::InvalidProposal(
                "an identical proposal already exists".to_string(),
            ));
        }

        let id = state.next_id;
        state.next_id += 1;
        let start_block = self.clock.height() + self.config.voting_delay + 1;
        let end_block = start_block + self.config.voting_period;

        let proposal = Proposal {
            id,
            proposer: caller.clone(),
            targets: targets.clone(),
            values: values.clone(),
            calldatas: calldatas.clone(),
            description_hash: description_hash.clone(),
            start_block,
            end_block,
            for_votes: 0,
            against_votes: 0,
            abstain_votes: 0,
            executed: false,
            canceled: false,
            voters: HashSet::new(),
        };
        state.proposals.insert(id, proposal);
        state.proposal_ids.insert(identity, id);

        info!(
            "Proposal {} created by {} (voting blocks {} to {})",
            id, caller, start_block, end_block
        );

        let record = ProposalCreatedRecord {
            proposal_id: id,
            proposer: caller.clone(),
            targets,
            values,
            calldatas,
            description: description.to_string(),
            description_hash,
            start_block,
            end_block,
        };
        state.events.push(GovernanceEvent::ProposalCreated(record.clone()));
        Ok(record)
    }

    /// Cast a vote on a proposal
    pub async fn cast_vote(
        &self,
        caller: &Address,
        proposal_id: u64,
        support: VoteSupport,
    ) -> GovernanceResult<VoteCastRecord> {
        self.cast_vote_inner(caller, proposal_id, support, None).await
    }

    /// Cast a vote with a free-text reason
    pub async fn cast_vote_with_reason(
        &self,
        caller: &Address,
        proposal_id: u64,
        support: VoteSupport,
        reason: &str,
    ) -> GovernanceResult<VoteCastRecord> {
        self.cast_vote_inner(caller, proposal_id, support, Some(reason.to_string()))
            .await
    }

    async fn cast_vote_inner(
        &self,
        caller: &Address,
        proposal_id: u64,
        support: VoteSupport,
        reason: Option<String>,
    ) -> GovernanceResult<VoteCastRecord> {
        let mut state = self.state.write().await;
        let height = self.clock.height();

        let snapshot = {
            let proposal = state.proposals.get(&proposal_id).ok_or_else(|| {
                GovernanceError::InvalidProposal(format!("no proposal with id {}", proposal_id))
            })?;
            // Window and terminal-flag checks do not need the quorum; only
            // post-window resolution does, and that is never Active
            let current = proposal.state_at(height, 0);
            if current != ProposalState::Active {
                return Err(GovernanceError::VotingClosed(format!(
                    "proposal {} is not accepting votes at height {}",
                    proposal_id, height
                )));
            }
            if proposal.voters.contains(caller) {
                return Err(GovernanceError::AlreadyVoted(format!(
                    "{} already voted on proposal {}",
                    caller, proposal_id
                )));
            }
            proposal.snapshot_height()
        };

        // Snapshot read against the ledger's committed checkpoint history;
        // a zero weight is a valid vote that adds nothing
        let weight = self.token.get_past_votes(caller, snapshot).await;

        let proposal = state
            .proposals
            .get_mut(&proposal_id)
            .ok_or_else(|| {
                GovernanceError::InvalidProposal(format!("no proposal with id {}", proposal_id))
            })?;
        match support {
            VoteSupport::Against => {
                proposal.against_votes = proposal.against_votes.saturating_add(weight)
            }
            VoteSupport::For => proposal.for_votes = proposal.for_votes.saturating_add(weight),
            VoteSupport::Abstain => {
                proposal.abstain_votes = proposal.abstain_votes.saturating_add(weight)
            }
        }
        proposal.voters.insert(caller.clone());

        debug!(
            "{} voted {:?} on proposal {} with weight {}",
            caller, support, proposal_id, weight
        );

        let record = VoteCastRecord {
            proposal_id,
            voter: caller.clone(),
            support,
            weight,
            reason,
        };
        state.events.push(GovernanceEvent::VoteCast(record.clone()));
        Ok(record)
    }

    /// Execute a succeeded proposal, resolved from its raw action set and
    /// description hash.
    pub async fn execute(
        &self,
        caller: &Address,
        targets: &[Address],
        values: &[Amount],
        calldatas: &[Vec<u8>],
        description_hash: &str,
    ) -> GovernanceResult<ProposalExecutedRecord> {
        let identity = proposal_hash(targets, values, calldatas, description_hash);
        let mut state = self.state.write().await;

        let proposal_id = *state.proposal_ids.get(&identity).ok_or_else(|| {
            GovernanceError::InvalidProposal("no proposal matches the supplied action set".to_string())
        })?;

        let height = self.clock.height();
        let snapshot = state.proposals[&proposal_id].snapshot_height();
        let quorum = self.quorum(snapshot).await;

        let proposal = state
            .proposals
            .get_mut(&proposal_id)
            .ok_or_else(|| {
                GovernanceError::InvalidProposal(format!("no proposal with id {}", proposal_id))
            })?;
        let current = proposal.state_at(height, quorum);
        if current != ProposalState::Succeeded {
            return Err(GovernanceError::ProposalNotExecutable(format!(
                "proposal {} is {:?}, not Succeeded",
                proposal_id, current
            )));
        }

        proposal.executed = true;
        info!("Proposal {} executed by {}", proposal_id, caller);

        let record = ProposalExecutedRecord {
            proposal_id,
            executor: caller.clone(),
            height,
        };
        state.events.push(GovernanceEvent::ProposalExecuted(record.clone()));
        Ok(record)
    }

    /// Cancel a proposal, resolved from its raw action set and description
    /// hash. Allowed from any non-terminal lifecycle stage.
    pub async fn cancel(
        &self,
        caller: &Address,
        targets: &[Address],
        values: &[Amount],
        calldatas: &[Vec<u8>],
        description_hash: &str,
    ) -> GovernanceResult<ProposalCanceledRecord> {
        let identity = proposal_hash(targets, values, calldatas, description_hash);
        let mut state = self.state.write().await;

        let proposal_id = *state.proposal_ids.get(&identity).ok_or_else(|| {
            GovernanceError::InvalidProposal("no proposal matches the supplied action set".to_string())
        })?;

        let proposal = state
            .proposals
            .get_mut(&proposal_id)
            .ok_or_else(|| {
                GovernanceError::InvalidProposal(format!("no proposal with id {}", proposal_id))
            })?;
        if proposal.executed {
            return Err(GovernanceError::InvalidProposal(format!(
                "proposal {} was already executed",
                proposal_id
            )));
        }
        if proposal.canceled {
            return Err(GovernanceError::InvalidProposal(format!(
                "proposal {} was already canceled",
                proposal_id
            )));
        }

        proposal.canceled = true;
        let height = self.clock.height();
        info!("Proposal {} canceled by {}", proposal_id, caller);

        let record = ProposalCanceledRecord {
            proposal_id,
            canceler: caller.clone(),
            height,
        };
        state.events.push(GovernanceEvent::ProposalCanceled(record.clone()));
        Ok(record)
    }

    /// Quorum requirement at `height`: the snapshot total supply times the
    /// quorum numerator over 100, floor division.
    pub async fn quorum(&self, height: BlockHeight) -> Amount {
        let supply = self.token.past_total_supply(height).await;
        mul_div(supply, self.config.quorum_numerator as Amount, 100)
    }

    /// Derived lifecycle state of a proposal
    pub async fn state(&self, proposal_id: u64) -> GovernanceResult<ProposalState> {
        let snapshot = {
            let state = self.state.read().await;
            state
                .proposals
                .get(&proposal_id)
                .map(|p| p.snapshot_height())
                .ok_or_else(|| {
                    GovernanceError::InvalidProposal(format!("no proposal with id {}", proposal_id))
                })?
        };
        let quorum = self.quorum(snapshot).await;
        let state = self.state.read().await;
        let proposal = state.proposals.get(&proposal_id).ok_or_else(|| {
            GovernanceError::InvalidProposal(format!("no proposal with id {}", proposal_id))
        })?;
        Ok(proposal.state_at(self.clock.height(), quorum))
    }

    /// Snapshot of a stored proposal
    pub async fn proposal(&self, proposal_id: u64) -> Option<Proposal> {
        self.state.read().await.proposals.get(&proposal_id).cloned()
    }

    /// Number of proposals ever created
    pub async fn proposal_count(&self) -> u64 {
        self.state.read().await.next_id - 1
    }

    /// Whether `voter` already voted on a proposal
    pub async fn has_voted(&self, proposal_id: u64, voter: &Address) -> bool {
        self.state
            .read()
            .await
            .proposals
            .get(&proposal_id)
            .map(|p| p.voters.contains(voter))
            .unwrap_or(false)
    }

    /// The (for, against, abstain) tallies of a proposal
    pub async fn proposal_votes(&self, proposal_id: u64) -> Option<(Amount, Amount, Amount)> {
        self.state
            .read()
            .await
            .proposals
            .get(&proposal_id)
            .map(|p| (p.for_votes, p.against_votes, p.abstain_votes))
    }

    /// Snapshot of the event log
    pub async fn events(&self) -> Vec<GovernanceEvent> {
        self.state.read().await.events.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        clock: BlockClock,
        controller: Address,
        token: Arc<GovernanceToken>,
        governor: Governor,
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn setup(config: GovernorConfig) -> Fixture {
        init_tracing();
        let clock = BlockClock::new();
        let controller = Address::new("controller");
        let token = Arc::new(GovernanceToken::new(
            "Agora Vote",
            "AGV",
            controller.clone(),
            clock.clone(),
        ));
        let governor = Governor::new(config, Arc::clone(&token), clock.clone()).unwrap();
        Fixture {
            clock,
            controller,
            token,
            governor,
        }
    }

    fn default_config() -> GovernorConfig {
        GovernorConfig {
            voting_delay: 1,
            voting_period: 10,
            proposal_threshold: 100,
            quorum_numerator: 40,
        }
    }

    fn action_set() -> (Vec<Address>, Vec<Amount>, Vec<Vec<u8>>) {
        (vec![Address::new("treasury")], vec![0], vec![vec![0xca, 0xfe]])
    }

    #[tokio::test]
    async fn test_config_validation() {
        let clock = BlockClock::new();
        let token = Arc::new(GovernanceToken::new(
            "Agora Vote",
            "AGV",
            Address::new("controller"),
            clock.clone(),
        ));

        let mut config = default_config();
        config.quorum_numerator = 101;
        let err = Governor::new(config, Arc::clone(&token), clock.clone()).unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidConfig(_)));

        let mut config = default_config();
        config.voting_period = 0;
        let err = Governor::new(config, token, clock).unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_propose_validates_action_set() {
        let f = setup(default_config());
        let alice = Address::new("alice");
        f.token.mint(&f.controller, &alice, 1000).await.unwrap();

        let err = f
            .governor
            .propose(&alice, vec![], vec![], vec![], "empty")
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidProposal(_)));

        let err = f
            .governor
            .propose(
                &alice,
                vec![Address::new("treasury")],
                vec![0, 1],
                vec![vec![]],
                "ragged",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidProposal(_)));
        assert_eq!(f.governor.proposal_count().await, 0);
    }

    #[tokio::test]
    async fn test_propose_requires_threshold_power() {
        let f = setup(default_config());
        let alice = Address::new("alice");
        let bob = Address::new("bob");
        f.token.mint(&f.controller, &alice, 99).await.unwrap();

        let (targets, values, calldatas) = action_set();
        let err = f
            .governor
            .propose(&alice, targets.clone(), values.clone(), calldatas.clone(), "d")
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InsufficientVotingPower(_)));

        // Threshold looks at delegated power, not balance
        f.token.mint(&f.controller, &bob, 1).await.unwrap();
        f.token.delegate(&bob, &alice).await;
        f.governor
            .propose(&alice, targets, values, calldatas, "d")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_proposal_window_and_ids() {
        let f = setup(default_config());
        let alice = Address::new("alice");
        f.token.mint(&f.controller, &alice, 1000).await.unwrap();

        f.clock.set(100);
        let (targets, values, calldatas) = action_set();
        let record = f
            .governor
            .propose(&alice, targets, values, calldatas, "first")
            .await
            .unwrap();

        assert_eq!(record.proposal_id, 1);
        assert_eq!(record.start_block, 102);
        assert_eq!(record.end_block, 112);
        assert_eq!(f.governor.state(1).await.unwrap(), ProposalState::Pending);

        let stored = f.governor.proposal(1).await.unwrap();
        assert_eq!(stored.snapshot_height(), 101);
        assert!(stored.start_block < stored.end_block);
    }

    #[tokio::test]
    async fn test_duplicate_action_set_rejected() {
        let f = setup(default_config());
        let alice = Address::new("alice");
        f.token.mint(&f.controller, &alice, 1000).await.unwrap();

        let (targets, values, calldatas) = action_set();
        f.governor
            .propose(&alice, targets.clone(), values.clone(), calldatas.clone(), "same")
            .await
            .unwrap();
        let err = f
            .governor
            .propose(&alice, targets.clone(), values.clone(), calldatas.clone(), "same")
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidProposal(_)));

        // A different description is a different identity
        f.governor
            .propose(&alice, targets, values, calldatas, "different")
            .await
            .unwrap();
        assert_eq!(f.governor.proposal_count().await, 2);
    }

    #[tokio::test]
    async fn test_voting_window_enforcement() {
        let f = setup(default_config());
        let alice = Address::new("alice");
        f.token.mint(&f.controller, &alice, 1000).await.unwrap();

        let (targets, values, calldatas) = action_set();
        let record = f
            .governor
            .propose(&alice, targets, values, calldatas, "d")
            .await
            .unwrap();

        // Pending: voting not open yet
        let err = f
            .governor
            .cast_vote(&alice, record.proposal_id, VoteSupport::For)
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::VotingClosed(_)));

        // Past the window
        f.clock.set(record.end_block + 1);
        let err = f
            .governor
            .cast_vote(&alice, record.proposal_id, VoteSupport::For)
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::VotingClosed(_)));

        let err = f
            .governor
            .cast_vote(&alice, 999, VoteSupport::For)
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidProposal(_)));
    }

    #[tokio::test]
    async fn test_vote_weight_uses_snapshot() {
        let f = setup(default_config());
        let alice = Address::new("alice");
        f.token.mint(&f.controller, &alice, 1000).await.unwrap();

        let (targets, values, calldatas) = action_set();
        let record = f
            .governor
            .propose(&alice, targets, values, calldatas, "d")
            .await
            .unwrap();

        // Tokens minted after the snapshot carry no weight on this proposal
        f.clock.set(record.start_block);
        f.token.mint(&f.controller, &alice, 5000).await.unwrap();

        let vote = f
            .governor
            .cast_vote(&alice, record.proposal_id, VoteSupport::For)
            .await
            .unwrap();
        assert_eq!(vote.weight, 1000);
        assert_eq!(f.governor.proposal_votes(record.proposal_id).await, Some((1000, 0, 0)));
    }

    #[tokio::test]
    async fn test_vote_idempotence_and_zero_weight() {
        let f = setup(default_config());
        let alice = Address::new("alice");
        let nobody = Address::new("nobody");
        f.token.mint(&f.controller, &alice, 1000).await.unwrap();

        let (targets, values, calldatas) = action_set();
        let record = f
            .governor
            .propose(&alice, targets, values, calldatas, "d")
            .await
            .unwrap();
        f.clock.set(record.start_block);

        f.governor
            .cast_vote(&alice, record.proposal_id, VoteSupport::For)
            .await
            .unwrap();
        let err = f
            .governor
            .cast_vote(&alice, record.proposal_id, VoteSupport::Against)
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::AlreadyVoted(_)));
        // Tallies unchanged by the failed attempt
        assert_eq!(f.governor.proposal_votes(record.proposal_id).await, Some((1000, 0, 0)));

        // A zero-weight vote succeeds and adds nothing
        let vote = f
            .governor
            .cast_vote_with_reason(&nobody, record.proposal_id, VoteSupport::For, "moral support")
            .await
            .unwrap();
        assert_eq!(vote.weight, 0);
        assert_eq!(vote.reason.as_deref(), Some("moral support"));
        assert!(f.governor.has_voted(record.proposal_id, &nobody).await);
        assert_eq!(f.governor.proposal_votes(record.proposal_id).await, Some((1000, 0, 0)));
    }

    #[tokio::test]
    async fn test_defeated_without_quorum() {
        let mut config = default_config();
        config.quorum_numerator = 60;
        let f = setup(config);
        let alice = Address::new("alice");
        let bob = Address::new("bob");
        f.token.mint(&f.controller, &alice, 400).await.unwrap();
        f.token.mint(&f.controller, &bob, 600).await.unwrap();

        let (targets, values, calldatas) = action_set();
        let record = f
            .governor
            .propose(&alice, targets, values, calldatas, "d")
            .await
            .unwrap();
        f.clock.set(record.start_block);

        // Only 400 of 1000 votes cast; quorum is 600
        f.governor
            .cast_vote(&alice, record.proposal_id, VoteSupport::For)
            .await
            .unwrap();
        f.clock.set(record.end_block + 1);

        assert_eq!(
            f.governor.state(record.proposal_id).await.unwrap(),
            ProposalState::Defeated
        );
        let err = f
            .governor
            .execute(
                &alice,
                &record.targets,
                &record.values,
                &record.calldatas,
                &record.description_hash,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalNotExecutable(_)));
    }

    #[tokio::test]
    async fn test_abstain_counts_toward_quorum_only() {
        let mut config = default_config();
        config.quorum_numerator = 60;
        let f = setup(config);
        let alice = Address::new("alice");
        let bob = Address::new("bob");
        f.token.mint(&f.controller, &alice, 400).await.unwrap();
        f.token.mint(&f.controller, &bob, 600).await.unwrap();

        let (targets, values, calldatas) = action_set();
        let record = f
            .governor
            .propose(&alice, targets, values, calldatas, "d")
            .await
            .unwrap();
        f.clock.set(record.start_block);

        f.governor
            .cast_vote(&alice, record.proposal_id, VoteSupport::For)
            .await
            .unwrap();
        f.governor
            .cast_vote(&bob, record.proposal_id, VoteSupport::Abstain)
            .await
            .unwrap();
        f.clock.set(record.end_block + 1);

        // 1000 cast >= 600 quorum, and for (400) > against (0)
        assert_eq!(
            f.governor.state(record.proposal_id).await.unwrap(),
            ProposalState::Succeeded
        );
    }

    #[tokio::test]
    async fn test_execute_lifecycle_is_monotonic() {
        let f = setup(default_config());
        let alice = Address::new("alice");
        f.token.mint(&f.controller, &alice, 1000).await.unwrap();

        let (targets, values, calldatas) = action_set();
        let record = f
            .governor
            .propose(&alice, targets, values, calldatas, "d")
            .await
            .unwrap();
        f.clock.set(record.start_block);
        f.governor
            .cast_vote(&alice, record.proposal_id, VoteSupport::For)
            .await
            .unwrap();

        // Not executable while the vote is still open
        let err = f
            .governor
            .execute(
                &alice,
                &record.targets,
                &record.values,
                &record.calldatas,
                &record.description_hash,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalNotExecutable(_)));

        f.clock.set(record.end_block + 1);
        f.governor
            .execute(
                &alice,
                &record.targets,
                &record.values,
                &record.calldatas,
                &record.description_hash,
            )
            .await
            .unwrap();
        assert_eq!(
            f.governor.state(record.proposal_id).await.unwrap(),
            ProposalState::Executed
        );

        // Re-execution and cancellation both fail once executed
        let err = f
            .governor
            .execute(
                &alice,
                &record.targets,
                &record.values,
                &record.calldatas,
                &record.description_hash,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalNotExecutable(_)));
        let err = f
            .governor
            .cancel(
                &alice,
                &record.targets,
                &record.values,
                &record.calldatas,
                &record.description_hash,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidProposal(_)));
    }

    #[tokio::test]
    async fn test_cancel_from_any_non_terminal_stage() {
        let f = setup(default_config());
        let alice = Address::new("alice");
        f.token.mint(&f.controller, &alice, 1000).await.unwrap();

        let (targets, values, calldatas) = action_set();
        let record = f
            .governor
            .propose(&alice, targets, values, calldatas, "d")
            .await
            .unwrap();

        // Cancel while still pending
        f.governor
            .cancel(
                &alice,
                &record.targets,
                &record.values,
                &record.calldatas,
                &record.description_hash,
            )
            .await
            .unwrap();
        assert_eq!(
            f.governor.state(record.proposal_id).await.unwrap(),
            ProposalState::Canceled
        );

        // Canceled is terminal
        let err = f
            .governor
            .cancel(
                &alice,
                &record.targets,
                &record.values,
                &record.calldatas,
                &record.description_hash,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidProposal(_)));
        f.clock.set(record.end_block + 1);
        let err = f
            .governor
            .execute(
                &alice,
                &record.targets,
                &record.values,
                &record.calldatas,
                &record.description_hash,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalNotExecutable(_)));
    }

    #[tokio::test]
    async fn test_execute_with_unknown_action_set() {
        let f = setup(default_config());
        let alice = Address::new("alice");
        f.token.mint(&f.controller, &alice, 1000).await.unwrap();

        let err = f
            .governor
            .execute(&alice, &[Address::new("treasury")], &[0], &[vec![]], "nohash")
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidProposal(_)));
    }

    #[tokio::test]
    async fn test_quorum_floor_division() {
        let f = setup(default_config());
        let alice = Address::new("alice");
        // 40% of 1750 = 700; 40% of 33 = 13 (floor)
        f.token.mint(&f.controller, &alice, 1750).await.unwrap();
        assert_eq!(f.governor.quorum(f.clock.height()).await, 700);

        f.token.burn(&f.controller, &alice, 1717).await.unwrap();
        assert_eq!(f.governor.quorum(f.clock.height()).await, 13);
    }
}
