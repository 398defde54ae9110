//! Action cards.
//!
//! Selecting an action card with `play_hand_card` stages it: the card stays
//! in hand and the turn waits for the card's follow-up selection. Resolving
//! the follow-up discards the card and charges the move.
//!
//! | effect          | follow-up                                        |
//! |-----------------|--------------------------------------------------|
//! | power of tea    | `play_card` on a face-down opposing field card   |
//! | messy dorm      | none; clears on the next reinforcement or at end |
//! | bird army       | `interact_with_opponent_card`                    |
//! | spirits         | `select_discard_pile_card`                       |

use tracing::debug;

use super::game::GameEngine;
use super::turn::PendingAction;
use crate::cards::{ActionEffect, CardKind};
use crate::core::action::Action;
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::state::{MatchState, TemporaryEffect};
use crate::error::{MoveError, MoveResult};

impl GameEngine {
    fn check_play_hand_card(&self, state: &MatchState, card: InstanceId) -> MoveResult<ActionEffect> {
        Self::ensure_reinforcing(state)?;
        let mover = state.current_player;
        let hand_card = state.current().hand_card(card).ok_or(MoveError::CardNotInHand(card))?;
        if state.turn.staged_card == Some(card) {
            return Err(MoveError::Pending(state.turn.pending_action));
        }
        let effect = hand_card.action_effect().ok_or(MoveError::NotAnActionCard(card))?;

        // A clearing reveal discards an action card before a spirit looks.
        let reveal_feeds_discard = effect == ActionEffect::ActionSpirit
            && state.turn.pending_action == PendingAction::RevealHand
            && state.turn.staged_card.is_some();
        if !Self::effect_has_target(state, mover, effect) && !reveal_feeds_discard {
            return Err(MoveError::NoEffectTarget(effect));
        }
        Ok(effect)
    }

    /// Whether `play_hand_card(card)` would succeed.
    #[must_use]
    pub fn can_play_hand_card(&self, state: &MatchState, card: InstanceId) -> bool {
        self.check_play_hand_card(state, card).is_ok()
    }

    /// Start an action card's effect. Returns the new pending sub-state.
    pub fn play_hand_card(&self, state: &mut MatchState, card: InstanceId) -> MoveResult<PendingAction> {
        let effect = self.check_play_hand_card(state, card)?;
        Self::clear_reveal(state);
        let mover = state.current_player;

        let pending = match effect {
            ActionEffect::PowerOfTea => PendingAction::PowerOfTea,
            ActionEffect::BirdArmy => PendingAction::StealCard,
            ActionEffect::ActionSpirit => PendingAction::ActionRevive,
            ActionEffect::CreatureSpirit => PendingAction::CreatureRevive,
            ActionEffect::UpgradeSpirit => PendingAction::UpgradeRevive,
            ActionEffect::MessyDorm => {
                state.temporary_effects.push_back(TemporaryEffect::RevealHand {
                    source: mover,
                    target: mover.opponent(),
                    card,
                });
                PendingAction::RevealHand
            }
        };
        state.turn.pending_action = pending;
        state.turn.staged_card = Some(card);
        state.record(Action::PlayHandCard { card });
        debug!(player = %mover, %card, ?effect, "action card played");
        Ok(pending)
    }

    /// Staged card check shared by every follow-up.
    fn ensure_staged(state: &MatchState, card: InstanceId, expected: impl Fn(PendingAction) -> bool) -> MoveResult<()> {
        Self::ensure_ongoing(state)?;
        let pending = state.turn.pending_action;
        if !expected(pending) {
            return Err(match pending {
                PendingAction::None => MoveError::NothingPending,
                other => MoveError::Pending(other),
            });
        }
        if state.turn.staged_card != Some(card) {
            return Err(MoveError::NotStagedCard(card));
        }
        Ok(())
    }

    /// Discard the staged card and charge its move.
    fn finish_staged(state: &mut MatchState, card: InstanceId) {
        if let Some(spent) = state.current_mut().remove_from_hand(card) {
            state.discard(spent);
        }
        state.turn.clear_pending();
        state.turn.charge_move();
    }

    // === Power of tea ===

    pub(super) fn check_tea_target(
        &self,
        state: &MatchState,
        player: PlayerId,
        card: InstanceId,
        row: usize,
        col: usize,
    ) -> MoveResult<()> {
        Self::ensure_ongoing(state)?;
        if player != state.current_player.opponent() {
            return Err(MoveError::NotOpponent(player));
        }
        Self::ensure_staged(state, card, |p| p == PendingAction::PowerOfTea)?;

        let field = &state.player(player).field;
        let target = field.get(row, col).ok_or(if field.in_bounds(row, col) {
            MoveError::EmptyCell { row, col }
        } else {
            MoveError::CellOutOfRange { row, col }
        })?;
        if target.face_up {
            return Err(MoveError::AlreadyFaceUp);
        }
        Ok(())
    }

    /// Flip the opposing card at `(row, col)` with the staged tea card.
    pub(super) fn target_with_tea(
        &self,
        state: &mut MatchState,
        player: PlayerId,
        card: InstanceId,
        row: usize,
        col: usize,
    ) -> MoveResult<InstanceId> {
        self.check_tea_target(state, player, card, row, col)?;
        let flipped = state
            .player_mut(player)
            .field
            .get_mut(row, col)
            .map(|target| {
                target.face_up = true;
                target.instance_id
            })
            .ok_or(MoveError::EmptyCell { row, col })?;
        Self::finish_staged(state, card);
        state.record(Action::PlayCard { player, card, row, col });
        debug!(player = %state.current_player, card = %flipped, "card flipped face-up");
        Ok(flipped)
    }

    // === Bird army ===

    fn check_steal(&self, state: &MatchState, card: InstanceId, target: InstanceId) -> MoveResult<()> {
        Self::ensure_staged(state, card, |p| p == PendingAction::StealCard)?;
        if state.opponent().hand_position(target).is_none() {
            return Err(MoveError::CardNotInHand(target));
        }
        Ok(())
    }

    #[must_use]
    pub fn can_interact_with_opponent_card(&self, state: &MatchState, card: InstanceId, target: InstanceId) -> bool {
        self.check_steal(state, card, target).is_ok()
    }

    /// Resolve a bird army. `target` only picks the kind: the stolen card is
    /// drawn uniformly from the opponent's hand cards of that kind.
    pub fn interact_with_opponent_card(
        &self,
        state: &mut MatchState,
        card: InstanceId,
        target: InstanceId,
    ) -> MoveResult<InstanceId> {
        self.check_steal(state, card, target)?;
        let mover = state.current_player;
        let victim = mover.opponent();

        let kind = state
            .player(victim)
            .hand_card(target)
            .map(|c| c.kind())
            .ok_or(MoveError::CardNotInHand(target))?;
        let candidates: Vec<InstanceId> = state
            .player(victim)
            .hand
            .iter()
            .filter(|c| c.kind() == kind)
            .map(|c| c.instance_id)
            .collect();
        let stolen = state.rng.choose(&candidates).copied().unwrap_or(target);

        let (me, them) = state.players.pair_mut(mover);
        if let Some(taken) = them.remove_from_hand(stolen) {
            me.add_to_hand(taken);
        }
        Self::finish_staged(state, card);
        state.record(Action::InteractWithOpponentCard { card, target });
        debug!(player = %mover, card = %stolen, %kind, "stole card");
        Ok(stolen)
    }

    // === Spirits ===

    fn check_revive(&self, state: &MatchState, card: InstanceId, target: InstanceId) -> MoveResult<CardKind> {
        Self::ensure_staged(state, card, |p| p.revive_kind().is_some())?;
        let expected = state
            .turn
            .pending_action
            .revive_kind()
            .ok_or(MoveError::NothingPending)?;
        let position = state.discard_position(target).ok_or(MoveError::CardNotFound(target))?;
        let found = state
            .discard_pile
            .get(position)
            .map(|c| c.kind())
            .ok_or(MoveError::CardNotFound(target))?;
        if found != expected {
            return Err(MoveError::KindMismatch { expected, found });
        }
        Ok(found)
    }

    #[must_use]
    pub fn can_select_discard_pile_card(&self, state: &MatchState, card: InstanceId, target: InstanceId) -> bool {
        self.check_revive(state, card, target).is_ok()
    }

    /// Resolve a spirit: move `target` from the discard pile to hand.
    pub fn select_discard_pile_card(
        &self,
        state: &mut MatchState,
        card: InstanceId,
        target: InstanceId,
    ) -> MoveResult<InstanceId> {
        let kind = self.check_revive(state, card, target)?;
        let position = state.discard_position(target).ok_or(MoveError::CardNotFound(target))?;
        let revived = state.discard_pile.remove(position);
        state.current_mut().add_to_hand(revived);
        Self::finish_staged(state, card);
        state.record(Action::SelectDiscardPileCard { card, target });
        debug!(player = %state.current_player, card = %target, %kind, "revived card");
        Ok(target)
    }
}
