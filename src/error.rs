//! Error types for the rules engine.
//!
//! Every engine operation returns `Result<_, MoveError>`. A `MoveError` is an
//! ordinary, recoverable outcome: the operation was rejected and the match
//! state is exactly as it was before the call. The `Display` text is the
//! human-readable reason shown to players.

use thiserror::Error;

use crate::cards::{ActionEffect, CardKind, DefinitionId};
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::rules::turn::{PendingAction, TurnType};

/// Why a move was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("the match is over")]
    GameOver,

    #[error("{0} is not the opponent")]
    NotOpponent(PlayerId),

    #[error("card {0} is not in hand")]
    CardNotInHand(InstanceId),

    #[error("card {0} not found")]
    CardNotFound(InstanceId),

    #[error("the draw pile is empty")]
    DrawPileEmpty,

    #[error("cell ({row}, {col}) is outside the field")]
    CellOutOfRange { row: usize, col: usize },

    #[error("cell ({row}, {col}) is already occupied")]
    CellOccupied { row: usize, col: usize },

    #[error("cell ({row}, {col}) is empty")]
    EmptyCell { row: usize, col: usize },

    #[error("a {kind} card cannot go in column {col}")]
    WrongColumn { kind: CardKind, col: usize },

    #[error("row {row} holds a different creature ({existing})")]
    DefinitionMismatch { row: usize, existing: DefinitionId },

    #[error("row {row} needs an upgrade in column 2 first")]
    UpgradeNeedsSlotTwo { row: usize },

    #[error("row {row} has no creature to upgrade")]
    UpgradeNeedsCreature { row: usize },

    #[error("no moves left this turn")]
    NoMovesLeft,

    #[error("already drew this turn")]
    AlreadyDrew,

    #[error("cannot draw on your first turn")]
    FirstTurnDraw,

    #[error("cannot draw after making a move")]
    MoveAlreadySpent,

    #[error("you need a creature on the field to draw")]
    NoCreatures,

    #[error("cannot do that during a {0} turn")]
    WrongTurnType(TurnType),

    #[error("finish the pending {0} first")]
    Pending(PendingAction),

    #[error("no attack has been declared")]
    NotAttacking,

    #[error("attacks must be the first move of the turn")]
    AttackNotFirstMove,

    #[error("cell ({row}, {col}) does not hold a creature")]
    NotACreature { row: usize, col: usize },

    #[error("the opponent has no creature to attack")]
    NoAttackTargets,

    #[error("card {0} is not an action card")]
    NotAnActionCard(InstanceId),

    #[error("{0:?} has nothing to target")]
    NoEffectTarget(ActionEffect),

    #[error("card {0} is not the card being played")]
    NotStagedCard(InstanceId),

    #[error("expected a {expected} card, found a {found} card")]
    KindMismatch { expected: CardKind, found: CardKind },

    #[error("that card is already face-up")]
    AlreadyFaceUp,

    #[error("hand holds {size} cards, discard down to {limit} first")]
    HandLimit { size: usize, limit: usize },

    #[error("hand is within the limit")]
    HandWithinLimit,

    #[error("not in the discard phase")]
    NotDiscarding,

    #[error("nothing is pending")]
    NothingPending,
}

impl MoveError {
    /// Targets something that does not exist, rather than breaking a rule.
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        matches!(
            self,
            MoveError::CardNotInHand(_) | MoveError::CardNotFound(_) | MoveError::DrawPileEmpty
        )
    }
}

/// Problems building a match from static card data.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("malformed card data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown card definition: {0}")]
    UnknownDefinition(DefinitionId),

    #[error("card definition {0} registered twice")]
    DuplicateDefinition(DefinitionId),
}

pub type MoveResult<T> = std::result::Result<T, MoveError>;
