//! Per-turn transient state.
//!
//! `TurnState` is rebuilt from scratch at every turn boundary. It tracks the
//! mode of the turn, the move budget, and whichever targeted sub-interaction
//! (steal, revive, tea, attack, discard) is waiting for its selection.

use serde::{Deserialize, Serialize};

use crate::cards::CardKind;
use crate::core::entity::InstanceId;
use crate::zones::field::RowId;

/// Mode of the current turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TurnType {
    #[default]
    Reinforce,
    Attack,
}

impl std::fmt::Display for TurnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnType::Reinforce => f.write_str("reinforce"),
            TurnType::Attack => f.write_str("attack"),
        }
    }
}

/// Sub-state waiting for one more targeted selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PendingAction {
    #[default]
    None,
    /// A messy-dorm reveal is active; clears on the next reinforcement.
    RevealHand,
    /// Bird army: pick an opponent hand card.
    StealCard,
    /// Power of tea: pick an opposing field card.
    PowerOfTea,
    ActionRevive,
    CreatureRevive,
    UpgradeRevive,
    /// An attacker is declared; pick a defender.
    Attack,
    DiscardExtraCards,
}

impl PendingAction {
    /// Sub-states resolved by picking a card, charged one move on resolution.
    #[must_use]
    pub const fn is_targeted_effect(self) -> bool {
        matches!(
            self,
            PendingAction::StealCard
                | PendingAction::PowerOfTea
                | PendingAction::ActionRevive
                | PendingAction::CreatureRevive
                | PendingAction::UpgradeRevive
        )
    }

    /// Discard category a revive sub-state picks from.
    #[must_use]
    pub const fn revive_kind(self) -> Option<CardKind> {
        match self {
            PendingAction::ActionRevive => Some(CardKind::Action),
            PendingAction::CreatureRevive => Some(CardKind::Creature),
            PendingAction::UpgradeRevive => Some(CardKind::Upgrade),
            _ => None,
        }
    }
}

impl std::fmt::Display for PendingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PendingAction::None => "nothing",
            PendingAction::RevealHand => "hand reveal",
            PendingAction::StealCard => "steal",
            PendingAction::PowerOfTea => "power of tea",
            PendingAction::ActionRevive => "action revive",
            PendingAction::CreatureRevive => "creature revive",
            PendingAction::UpgradeRevive => "upgrade revive",
            PendingAction::Attack => "attack",
            PendingAction::DiscardExtraCards => "discard",
        };
        f.write_str(name)
    }
}

/// The declared attacker.
///
/// The row is held by `RowId` so the attacker can be re-located after the
/// field shifts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackerRef {
    pub instance_id: InstanceId,
    pub row_id: RowId,
    pub col: usize,
}

/// Transient state of the turn in progress.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub turn_type: TurnType,
    pub pending_action: PendingAction,
    pub moves_this_turn: u32,
    pub max_moves_this_turn: u32,
    pub has_drawn_this_turn: bool,
    pub active_attacker: Option<AttackerRef>,
    pub allow_extra_attack: bool,
    /// Hand card whose effect is pending (tea, steal, revive, reveal).
    pub staged_card: Option<InstanceId>,
}

impl TurnState {
    #[must_use]
    pub fn new(max_moves: u32) -> Self {
        Self {
            max_moves_this_turn: max_moves,
            ..Self::default()
        }
    }

    /// Move held back for an active reveal, charged when it clears.
    #[must_use]
    pub fn reserved_moves(&self) -> u32 {
        u32::from(self.pending_action == PendingAction::RevealHand)
    }

    /// Moves spent plus moves reserved.
    #[must_use]
    pub fn committed_moves(&self) -> u32 {
        self.moves_this_turn + self.reserved_moves()
    }

    #[must_use]
    pub fn moves_left(&self) -> u32 {
        self.max_moves_this_turn.saturating_sub(self.committed_moves())
    }

    /// Spend one move, never past the budget.
    pub fn charge_move(&mut self) {
        self.moves_this_turn = (self.moves_this_turn + 1).min(self.max_moves_this_turn);
    }

    /// Spend whatever is left.
    pub fn exhaust_moves(&mut self) {
        self.moves_this_turn = self.max_moves_this_turn;
    }

    /// Back to reinforce mode with nothing pending.
    pub fn clear_pending(&mut self) {
        self.pending_action = PendingAction::None;
        self.staged_card = None;
    }
}
