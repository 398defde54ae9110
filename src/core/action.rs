//! Action representation.
//!
//! Each `Action` corresponds to exactly one mutating engine operation, so a
//! recorded sequence of actions replays a match step by step. Actions are
//! always performed by the player to move.
//!
//! ```
//! use dogs_cats_chickens::core::{Action, InstanceId, PlayerId};
//!
//! let place = Action::PlayCard { player: PlayerId::new(0), card: InstanceId(3), row: 0, col: 0 };
//! assert!(place.spends_move());
//! assert!(!Action::Draw.spends_move());
//! ```

use serde::{Deserialize, Serialize};

use super::entity::InstanceId;
use super::player::PlayerId;

/// One engine operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Draw the top card of the pile.
    Draw,
    /// Place a hand card on `player`'s field, or, while a power-of-tea is
    /// pending, target the opponent's field cell with the staged tea card.
    PlayCard {
        player: PlayerId,
        card: InstanceId,
        row: usize,
        col: usize,
    },
    /// Declare the creature at `(row, col)` as attacker.
    StartAttack { row: usize, col: usize },
    /// Attack the opposing creature at `(row, col)`.
    ResolveAttack { row: usize, col: usize },
    /// Select a hand card; action cards start their effect.
    PlayHandCard { card: InstanceId },
    /// Resolve a steal by picking an opponent hand card.
    InteractWithOpponentCard { card: InstanceId, target: InstanceId },
    /// Resolve a revive by picking a discard pile card.
    SelectDiscardPileCard { card: InstanceId, target: InstanceId },
    StartDiscardPhase,
    DiscardHandCard { card: InstanceId },
    /// Clear an active reveal effect.
    ResetTemporaryEffects,
    /// Back out of an unresolved targeted effect.
    CancelPendingAction,
    EndTurn,
}

impl Action {
    /// Whether a successful application normally costs a move.
    #[must_use]
    pub fn spends_move(&self) -> bool {
        matches!(
            self,
            Action::PlayCard { .. }
                | Action::ResolveAttack { .. }
                | Action::InteractWithOpponentCard { .. }
                | Action::SelectDiscardPileCard { .. }
        )
    }
}

/// A committed action in the match history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player: PlayerId,
    pub action: Action,
    /// Match-wide turn number (starts at 1).
    pub turn: u32,
    /// Position within the turn.
    pub sequence: u32,
}
