//! Rules engine trait and match results.
//!
//! `RulesEngine` is the action-level surface drivers use:
//! - which atomic moves are legal right now
//! - how a move changes the state
//! - whether the match is over
//!
//! The named operations on `GameEngine` are the same rules seen one
//! operation at a time; `apply_action` only dispatches to them.

use serde::{Deserialize, Serialize};

use super::combat::CombatReport;
use super::turn::PendingAction;
use crate::core::action::Action;
use crate::core::config::MatchConfig;
use crate::core::entity::InstanceId;
use crate::core::player::{Placement, PlayerId};
use crate::core::state::MatchState;
use crate::error::MoveResult;

/// Outcome of a match.
///
/// A win is never tracked on its own: it is the opponent of the loser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchResult {
    #[default]
    Ongoing,
    /// The given player lost.
    Loss(PlayerId),
    Tie,
}

impl MatchResult {
    #[must_use]
    pub fn is_over(self) -> bool {
        self != MatchResult::Ongoing
    }

    #[must_use]
    pub fn winner(self) -> Option<PlayerId> {
        match self {
            MatchResult::Loss(loser) => Some(loser.opponent()),
            MatchResult::Ongoing | MatchResult::Tie => None,
        }
    }

    #[must_use]
    pub fn loser(self) -> Option<PlayerId> {
        match self {
            MatchResult::Loss(loser) => Some(loser),
            MatchResult::Ongoing | MatchResult::Tie => None,
        }
    }
}

/// What a successful action did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Drew(InstanceId),
    Placed(Placement),
    /// A power-of-tea flipped this opposing card.
    Flipped(InstanceId),
    AttackDeclared(InstanceId),
    Combat(CombatReport),
    /// An action card started its effect.
    EffectStarted(PendingAction),
    /// The card moved from the opponent's hand to the mover's.
    Stole(InstanceId),
    /// The card moved from the discard pile to the mover's hand.
    Revived(InstanceId),
    DiscardPhaseStarted,
    Discarded(InstanceId),
    EffectsCleared,
    Cancelled,
    TurnEnded(MatchResult),
}

/// Action-level rules interface.
///
/// ## Implementation Notes
///
/// - `legal_actions` lists atomic moves only; it never offers `EndTurn`,
///   `ResetTemporaryEffects` or `CancelPendingAction`, so a driver picking
///   from it always makes progress.
/// - `apply_action` must be deterministic given the state (the match RNG
///   lives in the state).
/// - A rejected action leaves the state untouched.
pub trait RulesEngine {
    fn config(&self) -> &MatchConfig;

    /// Every atomic move the player to move could make now.
    fn legal_actions(&self, state: &MatchState) -> Vec<Action>;

    /// Apply one action for the player to move.
    fn apply_action(&self, state: &mut MatchState, action: &Action) -> MoveResult<ActionOutcome>;

    /// `Some(result)` once the match has ended.
    fn is_terminal(&self, state: &MatchState) -> Option<MatchResult> {
        state.result.is_over().then_some(state.result)
    }

    /// Whether `action` would succeed, without touching `state`.
    fn is_legal(&self, state: &MatchState, action: &Action) -> bool {
        let mut scratch = state.snapshot();
        self.apply_action(&mut scratch, action).is_ok()
    }
}
