//! The rules engine.
//!
//! `GameEngine` holds only the match configuration. All match data lives in
//! the `MatchState` passed to every call, so one engine can drive any number
//! of matches.
//!
//! Every mutating operation is split in two: a `check_*` step that validates
//! against the current state and returns what to do, and an apply step that
//! cannot fail. A rejected call therefore never mutates the state, and each
//! `can_*` predicate is exactly its operation's check.
//!
//! This module covers setup, drawing, placement, the discard phase, turn
//! end, terminal detection and visibility. Attacks live in `combat`, action
//! cards in `actions`.
//!
//! ```
//! use dogs_cats_chickens::cards::{CardCatalog, CardDefinition, CreatureType, DeckComposition, MatchAbility};
//! use dogs_cats_chickens::core::MatchConfig;
//! use dogs_cats_chickens::rules::GameEngine;
//!
//! let mut catalog = CardCatalog::new();
//! catalog.register(CardDefinition::creature("rex", "Rex", CreatureType::Dog, MatchAbility::AlwaysWin)).unwrap();
//! let deck = DeckComposition::new().with("rex", 20);
//!
//! let engine = GameEngine::new(MatchConfig::default());
//! let mut state = engine.new_match(&catalog, &deck, true).unwrap();
//!
//! let card = state.current().hand[0].instance_id;
//! let player = state.current_player;
//! engine.play_card(&mut state, player, card, 0, 0).unwrap();
//! assert_eq!(engine.moves_left(&state), 0);
//! ```

use smallvec::SmallVec;
use tracing::{debug, info, warn};

use super::engine::{ActionOutcome, MatchResult, RulesEngine};
use super::turn::{PendingAction, TurnState, TurnType};
use crate::cards::{ActionEffect, Card, CardBody, CardCatalog, CardKind, DeckComposition};
use crate::core::action::Action;
use crate::core::config::MatchConfig;
use crate::core::entity::{InstanceAllocator, InstanceId};
use crate::core::player::{Placement, Player, PlayerId, PlayerMap};
use crate::core::rng::GameRng;
use crate::core::state::{MatchState, TemporaryEffect};
use crate::error::{CatalogError, MoveError, MoveResult};
use crate::zones::draw_pile::DrawPile;
use crate::zones::field::{
    is_creature_column, is_upgrade_column, opposite_creature_column, Field, FieldRow, FIELD_WIDTH,
};

/// Rules engine for one ruleset configuration.
#[derive(Clone, Debug, Default)]
pub struct GameEngine {
    config: MatchConfig,
}

impl GameEngine {
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    // === Setup ===

    /// Build the shared pile, shuffle it and deal both opening hands.
    pub fn new_match(
        &self,
        catalog: &CardCatalog,
        composition: &DeckComposition,
        second_player_automated: bool,
    ) -> Result<MatchState, CatalogError> {
        let mut ids = InstanceAllocator::new();
        let cards = composition.expand(catalog, &mut ids)?;

        let rng = GameRng::new(self.config.seed);
        let mut pile = DrawPile::new(cards);
        pile.shuffle(&mut rng.for_context("shuffle"));

        let rows = self.config.initial_field_rows;
        let players = PlayerMap::new(|id| Player::new(id, rows).automated(second_player_automated && id.index() == 1));
        let mut state = MatchState::new(players, pile, rng, self.config.moves_for_turn(0));

        for player in PlayerId::all() {
            let attempts = self.deal_opening_hand(&mut state, player);
            debug!(%player, attempts, hand = state.player(player).hand.len(), "dealt opening hand");
        }

        info!(
            seed = self.config.seed,
            pile = state.draw_pile.len(),
            "match started"
        );
        Ok(state)
    }

    /// Deal until the hand holds enough creatures, reshuffling in between.
    ///
    /// A short hand is accepted only when the pile runs dry or cannot supply
    /// enough creatures at all. Otherwise every retry has a fixed non-zero
    /// chance to succeed, so the loop ends.
    fn deal_opening_hand(&self, state: &mut MatchState, player: PlayerId) -> u32 {
        let size = self.config.opening_hand_size;
        let wanted = self.config.min_opening_creatures;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let mut hand: SmallVec<[Card; 8]> = SmallVec::new();
            while hand.len() < size {
                match state.draw_pile.draw() {
                    Some(card) => hand.push(card),
                    None => break,
                }
            }

            let creatures = hand.iter().filter(|c| c.is_creature()).count();
            let available = creatures + state.draw_pile.iter().filter(|c| c.is_creature()).count();
            if creatures >= wanted || state.draw_pile.is_empty() || available < wanted {
                if creatures < wanted {
                    warn!(%player, creatures, available, wanted, "deck cannot fill the opening hand with creatures");
                }
                for card in hand {
                    state.player_mut(player).add_to_hand(card);
                }
                return attempt;
            }

            for card in hand {
                state.draw_pile.return_to_bottom(card);
            }
            state.draw_pile.shuffle(&mut state.rng);
        }
    }

    // === Shared checks ===

    pub(super) fn ensure_ongoing(state: &MatchState) -> MoveResult<()> {
        if state.result.is_over() {
            return Err(MoveError::GameOver);
        }
        Ok(())
    }

    /// Reinforce mode, nothing but a reveal pending, a move left.
    pub(super) fn ensure_reinforcing(state: &MatchState) -> MoveResult<()> {
        Self::ensure_ongoing(state)?;
        if state.turn.turn_type != TurnType::Reinforce {
            return Err(MoveError::WrongTurnType(state.turn.turn_type));
        }
        match state.turn.pending_action {
            PendingAction::None | PendingAction::RevealHand => {}
            other => return Err(MoveError::Pending(other)),
        }
        if state.turn.moves_left() == 0 {
            return Err(MoveError::NoMovesLeft);
        }
        Ok(())
    }

    /// Clear the mover's reveal: discard its card and charge the move.
    pub(super) fn clear_reveal(state: &mut MatchState) -> Option<InstanceId> {
        if state.turn.pending_action != PendingAction::RevealHand {
            return None;
        }
        let mover = state.current_player;
        let staged = state.turn.staged_card;
        state
            .temporary_effects
            .retain(|e| !matches!(e, TemporaryEffect::RevealHand { source, .. } if *source == mover));
        state.turn.clear_pending();
        state.turn.charge_move();

        let card = staged.and_then(|id| state.current_mut().remove_from_hand(id))?;
        let id = card.instance_id;
        state.discard(card);
        debug!(player = %mover, card = %id, "hand reveal cleared");
        Some(id)
    }

    /// Hand size counted against the limit. A card whose reveal is still
    /// active does not count; it leaves the hand when the reveal clears.
    #[must_use]
    pub fn effective_hand_size(&self, state: &MatchState) -> usize {
        let hand = &state.current().hand;
        let staged_reveal = state.turn.pending_action == PendingAction::RevealHand
            && state
                .turn
                .staged_card
                .is_some_and(|id| hand.iter().any(|c| c.instance_id == id));
        hand.len() - usize::from(staged_reveal)
    }

    // === Draw ===

    fn check_draw(&self, state: &MatchState) -> MoveResult<()> {
        Self::ensure_ongoing(state)?;
        let turn = &state.turn;
        if turn.turn_type != TurnType::Reinforce {
            return Err(MoveError::WrongTurnType(turn.turn_type));
        }
        if turn.pending_action != PendingAction::None {
            return Err(MoveError::Pending(turn.pending_action));
        }
        if turn.has_drawn_this_turn {
            return Err(MoveError::AlreadyDrew);
        }
        if turn.committed_moves() > 0 {
            return Err(MoveError::MoveAlreadySpent);
        }
        let me = state.current();
        if me.turn_count == 0 {
            return Err(MoveError::FirstTurnDraw);
        }
        if !me.has_creature() {
            return Err(MoveError::NoCreatures);
        }
        if state.draw_pile.is_empty() {
            return Err(MoveError::DrawPileEmpty);
        }
        Ok(())
    }

    #[must_use]
    pub fn can_draw_card(&self, state: &MatchState) -> bool {
        self.check_draw(state).is_ok()
    }

    /// Draw the top card into the mover's hand. Costs no move.
    pub fn draw_card(&self, state: &mut MatchState) -> MoveResult<InstanceId> {
        self.check_draw(state)?;
        let card = state.draw_pile.draw().ok_or(MoveError::DrawPileEmpty)?;
        let id = card.instance_id;
        state.current_mut().add_to_hand(card);
        state.turn.has_drawn_this_turn = true;
        state.record(Action::Draw);
        debug!(player = %state.current_player, card = %id, pile = state.draw_pile.len(), "drew card");
        Ok(id)
    }

    // === Placement ===

    /// Whether `card` may go into `(row, col)` of `field`, ignoring turn
    /// state.
    pub(super) fn placement_rule(field: &Field, card: &Card, row: usize, col: usize) -> MoveResult<()> {
        if !field.in_bounds(row, col) {
            return Err(MoveError::CellOutOfRange { row, col });
        }
        if field.get(row, col).is_some() {
            return Err(MoveError::CellOccupied { row, col });
        }
        match card.body {
            CardBody::Creature(_) => {
                if !is_creature_column(col) {
                    return Err(MoveError::WrongColumn { kind: card.kind(), col });
                }
                if let Some(other) = field.get(row, opposite_creature_column(col)) {
                    if other.definition_id != card.definition_id {
                        return Err(MoveError::DefinitionMismatch {
                            row,
                            existing: other.definition_id.clone(),
                        });
                    }
                }
            }
            CardBody::Upgrade(_) => {
                if !is_upgrade_column(col) {
                    return Err(MoveError::WrongColumn { kind: card.kind(), col });
                }
                if !field.row(row).is_some_and(FieldRow::has_creature) {
                    return Err(MoveError::UpgradeNeedsCreature { row });
                }
                if col == 3 && field.get(row, 2).is_none() {
                    return Err(MoveError::UpgradeNeedsSlotTwo { row });
                }
            }
            CardBody::Action(_) => return Err(MoveError::WrongColumn { kind: card.kind(), col }),
        }
        Ok(())
    }

    fn check_placement(&self, state: &MatchState, card: InstanceId, row: usize, col: usize) -> MoveResult<()> {
        Self::ensure_reinforcing(state)?;
        let me = state.current();
        let hand_card = me.hand_card(card).ok_or(MoveError::CardNotInHand(card))?;
        Self::placement_rule(&me.field, hand_card, row, col)
    }

    fn place_card(&self, state: &mut MatchState, card: InstanceId, row: usize, col: usize) -> MoveResult<Placement> {
        self.check_placement(state, card, row, col)?;
        let mover = state.current_player;
        let placement = state
            .current_mut()
            .play_to_field(card, row, col)
            .ok_or(MoveError::CardNotInHand(card))?;
        Self::clear_reveal(state);
        state.turn.charge_move();
        state.record(Action::PlayCard { player: mover, card, row, col });

        debug!(player = %mover, %card, row = placement.row, col, "placed card");
        if let Some(event) = &placement.matched {
            info!(
                player = %mover,
                definition = %event.definition_id,
                ability = ?event.ability,
                "creatures matched"
            );
        }
        Ok(placement)
    }

    /// Whether `play_card` with these arguments would succeed.
    #[must_use]
    pub fn can_play_card(&self, state: &MatchState, player: PlayerId, card: InstanceId, row: usize, col: usize) -> bool {
        if player == state.current_player {
            self.check_placement(state, card, row, col).is_ok()
        } else {
            self.check_tea_target(state, player, card, row, col).is_ok()
        }
    }

    /// Play a card onto `player`'s field.
    ///
    /// On the mover's own field this places a hand creature or upgrade. On
    /// the opponent's field it aims a pending power-of-tea at `(row, col)`.
    pub fn play_card(
        &self,
        state: &mut MatchState,
        player: PlayerId,
        card: InstanceId,
        row: usize,
        col: usize,
    ) -> MoveResult<ActionOutcome> {
        Self::ensure_ongoing(state)?;
        if player == state.current_player {
            self.place_card(state, card, row, col).map(ActionOutcome::Placed)
        } else {
            self.target_with_tea(state, player, card, row, col).map(ActionOutcome::Flipped)
        }
    }

    // === Discard phase ===

    fn check_start_discard_phase(&self, state: &MatchState) -> MoveResult<()> {
        Self::ensure_ongoing(state)?;
        match state.turn.pending_action {
            PendingAction::None | PendingAction::RevealHand => {}
            other => return Err(MoveError::Pending(other)),
        }
        if self.effective_hand_size(state) <= self.config.hand_limit {
            return Err(MoveError::HandWithinLimit);
        }
        Ok(())
    }

    #[must_use]
    pub fn can_start_discard_phase(&self, state: &MatchState) -> bool {
        self.check_start_discard_phase(state).is_ok()
    }

    /// Enter the discard phase. Clears an active reveal first.
    pub fn start_discard_phase(&self, state: &mut MatchState) -> MoveResult<()> {
        self.check_start_discard_phase(state)?;
        Self::clear_reveal(state);
        state.turn.pending_action = PendingAction::DiscardExtraCards;
        state.record(Action::StartDiscardPhase);
        debug!(player = %state.current_player, hand = state.current().hand.len(), "discard phase started");
        Ok(())
    }

    fn check_discard(&self, state: &MatchState, card: InstanceId) -> MoveResult<()> {
        Self::ensure_ongoing(state)?;
        if state.turn.pending_action != PendingAction::DiscardExtraCards {
            return Err(MoveError::NotDiscarding);
        }
        if state.current().hand_position(card).is_none() {
            return Err(MoveError::CardNotInHand(card));
        }
        Ok(())
    }

    #[must_use]
    pub fn can_discard_hand_card(&self, state: &MatchState, card: InstanceId) -> bool {
        self.check_discard(state, card).is_ok()
    }

    /// Discard one hand card; the phase ends once the hand is within limit.
    pub fn discard_hand_card(&self, state: &mut MatchState, card: InstanceId) -> MoveResult<()> {
        self.check_discard(state, card)?;
        let removed = state
            .current_mut()
            .remove_from_hand(card)
            .ok_or(MoveError::CardNotInHand(card))?;
        state.discard(removed);
        if state.current().hand.len() <= self.config.hand_limit {
            state.turn.pending_action = PendingAction::None;
        }
        state.record(Action::DiscardHandCard { card });
        debug!(player = %state.current_player, %card, "discarded from hand");
        Ok(())
    }

    /// Whether the mover must discard before ending the turn.
    #[must_use]
    pub fn has_extra_hand_cards(&self, state: &MatchState) -> bool {
        self.effective_hand_size(state) > self.config.hand_limit
    }

    // === Temporary effects and cancellation ===

    /// Clear the mover's active reveal, if any. Returns whether one cleared.
    pub fn reset_temporary_effects(&self, state: &mut MatchState) -> MoveResult<bool> {
        Self::ensure_ongoing(state)?;
        let cleared = Self::clear_reveal(state).is_some();
        if cleared {
            state.record(Action::ResetTemporaryEffects);
        }
        Ok(cleared)
    }

    fn check_cancel(&self, state: &MatchState) -> MoveResult<()> {
        Self::ensure_ongoing(state)?;
        match state.turn.pending_action {
            p if p.is_targeted_effect() => Ok(()),
            PendingAction::None => Err(MoveError::NothingPending),
            other => Err(MoveError::Pending(other)),
        }
    }

    #[must_use]
    pub fn can_cancel_pending_action(&self, state: &MatchState) -> bool {
        self.check_cancel(state).is_ok()
    }

    /// Back out of an unresolved tea, steal or revive. The staged card stays
    /// in hand and no move is spent.
    pub fn cancel_pending_action(&self, state: &mut MatchState) -> MoveResult<()> {
        self.check_cancel(state)?;
        let pending = state.turn.pending_action;
        state.turn.clear_pending();
        state.record(Action::CancelPendingAction);
        debug!(player = %state.current_player, %pending, "pending action cancelled");
        Ok(())
    }

    // === Turn end and terminal detection ===

    fn check_end_turn(&self, state: &MatchState) -> MoveResult<()> {
        Self::ensure_ongoing(state)?;
        let size = self.effective_hand_size(state);
        if size > self.config.hand_limit {
            return Err(MoveError::HandLimit {
                size,
                limit: self.config.hand_limit,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn can_end_turn(&self, state: &MatchState) -> bool {
        self.check_end_turn(state).is_ok()
    }

    /// End the mover's turn and evaluate loss, then tie.
    pub fn end_turn(&self, state: &mut MatchState) -> MoveResult<MatchResult> {
        self.check_end_turn(state)?;
        let mover = state.current_player;

        Self::clear_reveal(state);
        if state.turn.pending_action != PendingAction::None {
            debug!(player = %mover, pending = %state.turn.pending_action, "abandoning pending action");
        }
        state.record(Action::EndTurn);
        state.current_mut().turn_count += 1;
        state.turn = TurnState::default();

        if !state.current().has_creature() {
            state.result = MatchResult::Loss(mover);
            info!(loser = %mover, turn = state.turn_number, "match over");
            return Ok(state.result);
        }

        let next = mover.opponent();
        state.current_player = next;
        state.turn_number += 1;
        state.turn = TurnState::new(self.config.moves_for_turn(state.current().turn_count));
        debug!(player = %next, turn = state.turn_number, moves = state.turn.max_moves_this_turn, "turn started");

        if self.is_tie(state) {
            state.result = MatchResult::Tie;
            info!(turn = state.turn_number, "match tied");
        }
        Ok(state.result)
    }

    /// Pile empty, one creature type left in play, and no usable hand card.
    fn is_tie(&self, state: &MatchState) -> bool {
        if !state.draw_pile.is_empty() {
            return false;
        }
        let mut types = state
            .players
            .values()
            .flat_map(|p| p.field.creatures().filter_map(|(_, _, c)| c.creature_type()));
        let single_type = match types.next() {
            Some(first) => types.all(|t| t == first),
            None => true,
        };
        single_type
            && PlayerId::all().all(|player| {
                state
                    .player(player)
                    .hand
                    .iter()
                    .all(|card| !self.is_usable_on_fresh_turn(state, player, card))
            })
    }

    /// Whether `owner` could play `card` at the start of their next turn.
    fn is_usable_on_fresh_turn(&self, state: &MatchState, owner: PlayerId, card: &Card) -> bool {
        let field = &state.player(owner).field;
        match card.body {
            CardBody::Creature(_) | CardBody::Upgrade(_) => (0..field.height())
                .any(|row| (0..FIELD_WIDTH).any(|col| Self::placement_rule(field, card, row, col).is_ok())),
            CardBody::Action(effect) => Self::effect_has_target(state, owner, effect),
        }
    }

    /// Whether an action effect played by `owner` would have a target.
    pub(super) fn effect_has_target(state: &MatchState, owner: PlayerId, effect: ActionEffect) -> bool {
        let opponent = state.player(owner.opponent());
        match effect {
            ActionEffect::PowerOfTea => opponent.field.cards().any(|(_, _, c)| !c.face_up),
            ActionEffect::MessyDorm => true,
            ActionEffect::BirdArmy => !opponent.hand.is_empty(),
            ActionEffect::ActionSpirit | ActionEffect::CreatureSpirit | ActionEffect::UpgradeSpirit => effect
                .spirit_kind()
                .is_some_and(|kind| state.discard_has_kind(kind)),
        }
    }

    // === Queries ===

    #[must_use]
    pub fn moves_left(&self, state: &MatchState) -> u32 {
        state.turn.moves_left()
    }

    #[must_use]
    pub fn max_moves(&self, state: &MatchState) -> u32 {
        state.turn.max_moves_this_turn
    }

    #[must_use]
    pub fn turn_type(&self, state: &MatchState) -> TurnType {
        state.turn.turn_type
    }

    #[must_use]
    pub fn pending_action(&self, state: &MatchState) -> PendingAction {
        state.turn.pending_action
    }

    #[must_use]
    pub fn result(&self, state: &MatchState) -> MatchResult {
        state.result
    }

    /// Whether the player to move may see `card`, owned by `owner`.
    #[must_use]
    pub fn is_card_visible(&self, state: &MatchState, card: &Card, owner: PlayerId) -> bool {
        let viewer = state.current_player;
        if owner == viewer || card.face_up {
            return true;
        }
        state.is_hand_revealed(viewer, owner)
            && state
                .players
                .try_get(owner)
                .is_some_and(|p| p.hand_position(card.instance_id).is_some())
    }
}

impl RulesEngine for GameEngine {
    fn config(&self) -> &MatchConfig {
        &self.config
    }

    fn legal_actions(&self, state: &MatchState) -> Vec<Action> {
        let mut actions = Vec::new();
        if state.result.is_over() {
            return actions;
        }
        let me = state.current();
        let opponent = state.opponent();
        let staged = state.turn.staged_card;

        match state.turn.pending_action {
            PendingAction::Attack => {
                for (row, col, _) in opponent.field.creatures() {
                    if self.is_valid_attack_target(state, row, col) {
                        actions.push(Action::ResolveAttack { row, col });
                    }
                }
            }
            PendingAction::PowerOfTea => {
                if let Some(card) = staged {
                    for (row, col, target) in opponent.field.cards() {
                        if !target.face_up {
                            actions.push(Action::PlayCard { player: opponent.id, card, row, col });
                        }
                    }
                }
            }
            PendingAction::StealCard => {
                if let Some(card) = staged {
                    actions.extend(opponent.hand.iter().map(|t| Action::InteractWithOpponentCard {
                        card,
                        target: t.instance_id,
                    }));
                }
            }
            pending @ (PendingAction::ActionRevive | PendingAction::CreatureRevive | PendingAction::UpgradeRevive) => {
                if let (Some(card), Some(kind)) = (staged, pending.revive_kind()) {
                    actions.extend(
                        state
                            .discard_pile
                            .iter()
                            .filter(|t| t.kind() == kind)
                            .map(|t| Action::SelectDiscardPileCard { card, target: t.instance_id }),
                    );
                }
            }
            PendingAction::DiscardExtraCards => {
                actions.extend(me.hand.iter().map(|c| Action::DiscardHandCard { card: c.instance_id }));
            }
            PendingAction::None | PendingAction::RevealHand => {
                if self.can_draw_card(state) {
                    actions.push(Action::Draw);
                }
                for card in me.hand.iter() {
                    let id = card.instance_id;
                    if card.kind() == CardKind::Action {
                        if self.can_play_hand_card(state, id) {
                            actions.push(Action::PlayHandCard { card: id });
                        }
                        continue;
                    }
                    for row in 0..me.field.height() {
                        for col in 0..FIELD_WIDTH {
                            if self.check_placement(state, id, row, col).is_ok() {
                                actions.push(Action::PlayCard { player: me.id, card: id, row, col });
                            }
                        }
                    }
                }
                for (row, col, _) in me.field.creatures() {
                    if self.can_attack_with(state, row, col) {
                        actions.push(Action::StartAttack { row, col });
                    }
                }
                if self.can_start_discard_phase(state) {
                    actions.push(Action::StartDiscardPhase);
                }
            }
        }
        actions
    }

    fn apply_action(&self, state: &mut MatchState, action: &Action) -> MoveResult<ActionOutcome> {
        match *action {
            Action::Draw => self.draw_card(state).map(ActionOutcome::Drew),
            Action::PlayCard { player, card, row, col } => self.play_card(state, player, card, row, col),
            Action::StartAttack { row, col } => self.start_attack(state, row, col).map(ActionOutcome::AttackDeclared),
            Action::ResolveAttack { row, col } => self.resolve_attack(state, row, col).map(ActionOutcome::Combat),
            Action::PlayHandCard { card } => self.play_hand_card(state, card).map(ActionOutcome::EffectStarted),
            Action::InteractWithOpponentCard { card, target } => self
                .interact_with_opponent_card(state, card, target)
                .map(ActionOutcome::Stole),
            Action::SelectDiscardPileCard { card, target } => self
                .select_discard_pile_card(state, card, target)
                .map(ActionOutcome::Revived),
            Action::StartDiscardPhase => self
                .start_discard_phase(state)
                .map(|()| ActionOutcome::DiscardPhaseStarted),
            Action::DiscardHandCard { card } => self
                .discard_hand_card(state, card)
                .map(|()| ActionOutcome::Discarded(card)),
            Action::ResetTemporaryEffects => self
                .reset_temporary_effects(state)
                .map(|_| ActionOutcome::EffectsCleared),
            Action::CancelPendingAction => self.cancel_pending_action(state).map(|()| ActionOutcome::Cancelled),
            Action::EndTurn => self.end_turn(state).map(ActionOutcome::TurnEnded),
        }
    }
}
