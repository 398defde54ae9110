//! Shared match state.
//!
//! `MatchState` is the explicit context threaded through every engine call:
//! both players, the draw and discard piles, active temporary effects, the
//! per-turn state, the result, the RNG and the action history. There is no
//! ambient state anywhere in the engine; two `MatchState`s are two
//! independent matches.
//!
//! Piles and hands are `im` persistent vectors, so `snapshot()` is O(1) and
//! callers (or the random policy) can explore a copy freely.
//!
//! ## Card conservation
//!
//! Every card instance is in exactly one of: the draw pile, a hand, a field
//! cell, the discard pile. `census()` lists every instance id across those
//! zones and is what the conservation tests check.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::action::{Action, ActionRecord};
use super::entity::InstanceId;
use super::player::{Player, PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::cards::{Card, CardKind};
use crate::rules::engine::MatchResult;
use crate::rules::turn::TurnState;
use crate::zones::draw_pile::DrawPile;

/// A time-boxed modifier tied to a source/target player pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TemporaryEffect {
    /// `target`'s hand is visible to `source` while `source` is to move.
    #[serde(rename_all = "camelCase")]
    RevealHand {
        source: PlayerId,
        target: PlayerId,
        /// The action card that created the effect.
        card: InstanceId,
    },
}

/// Full match state.
#[derive(Clone, Debug)]
pub struct MatchState {
    pub players: PlayerMap<Player>,
    pub draw_pile: DrawPile,
    /// Most recent discard last.
    pub discard_pile: Vector<Card>,
    pub temporary_effects: Vector<TemporaryEffect>,
    pub current_player: PlayerId,
    /// Match-wide turn counter (starts at 1).
    pub turn_number: u32,
    pub turn: TurnState,
    pub result: MatchResult,
    /// Deterministic RNG for shuffles and steals.
    pub rng: GameRng,
    pub history: Vector<ActionRecord>,
}

impl MatchState {
    /// Fresh state with empty hands; the engine deals afterwards.
    #[must_use]
    pub fn new(players: PlayerMap<Player>, draw_pile: DrawPile, rng: GameRng, first_turn_moves: u32) -> Self {
        Self {
            players,
            draw_pile,
            discard_pile: Vector::new(),
            temporary_effects: Vector::new(),
            current_player: PlayerId::new(0),
            turn_number: 1,
            turn: TurnState::new(first_turn_moves),
            result: MatchResult::Ongoing,
            rng,
            history: Vector::new(),
        }
    }

    /// Cheap copy of the whole match.
    #[must_use]
    pub fn snapshot(&self) -> MatchState {
        self.clone()
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id]
    }

    /// The player to move.
    #[must_use]
    pub fn current(&self) -> &Player {
        &self.players[self.current_player]
    }

    pub fn current_mut(&mut self) -> &mut Player {
        &mut self.players[self.current_player]
    }

    /// The player waiting.
    #[must_use]
    pub fn opponent(&self) -> &Player {
        &self.players[self.current_player.opponent()]
    }

    pub fn discard(&mut self, card: Card) {
        self.discard_pile.push_back(card);
    }

    #[must_use]
    pub fn discard_position(&self, instance: InstanceId) -> Option<usize> {
        self.discard_pile.iter().position(|c| c.instance_id == instance)
    }

    /// Whether the discard pile holds a card of `kind`.
    #[must_use]
    pub fn discard_has_kind(&self, kind: CardKind) -> bool {
        self.discard_pile.iter().any(|c| c.kind() == kind)
    }

    /// The active reveal created by `source`, if any.
    #[must_use]
    pub fn reveal_from(&self, source: PlayerId) -> Option<TemporaryEffect> {
        self.temporary_effects
            .iter()
            .find(|e| matches!(e, TemporaryEffect::RevealHand { source: s, .. } if *s == source))
            .copied()
    }

    /// Whether `target`'s hand is revealed to `source`.
    #[must_use]
    pub fn is_hand_revealed(&self, source: PlayerId, target: PlayerId) -> bool {
        self.temporary_effects.iter().any(
            |e| matches!(e, TemporaryEffect::RevealHand { source: s, target: t, .. } if *s == source && *t == target),
        )
    }

    /// Append to the history.
    pub fn record(&mut self, action: Action) {
        let sequence = self
            .history
            .iter()
            .rev()
            .take_while(|r| r.turn == self.turn_number)
            .count() as u32;
        self.history.push_back(ActionRecord {
            player: self.current_player,
            action,
            turn: self.turn_number,
            sequence,
        });
    }

    /// Every instance id in every zone.
    #[must_use]
    pub fn census(&self) -> Vec<InstanceId> {
        let mut ids: Vec<InstanceId> = self.draw_pile.iter().map(|c| c.instance_id).collect();
        for player in self.players.values() {
            ids.extend(player.hand.iter().map(|c| c.instance_id));
            ids.extend(player.field.cards().map(|(_, _, c)| c.instance_id));
        }
        ids.extend(self.discard_pile.iter().map(|c| c.instance_id));
        ids
    }

    /// Total cards across all zones.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.census().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, UpgradeEffect};

    fn state_with_cards(n: u32) -> MatchState {
        let def = CardDefinition::upgrade("shield", "Shield", UpgradeEffect::Defense);
        let pile = DrawPile::new((0..n).map(|i| Card::from_definition(&def, InstanceId(i))));
        let players = PlayerMap::new(|id| Player::new(id, 1));
        MatchState::new(players, pile, GameRng::new(1), 1)
    }

    #[test]
    fn test_new_state_defaults() {
        let state = state_with_cards(4);

        assert_eq!(state.current_player, PlayerId::new(0));
        assert_eq!(state.turn_number, 1);
        assert_eq!(state.result, MatchResult::Ongoing);
        assert_eq!(state.turn.max_moves_this_turn, 1);
        assert_eq!(state.card_count(), 4);
    }

    #[test]
    fn test_census_tracks_moves_between_zones() {
        let mut state = state_with_cards(3);
        let card = state.draw_pile.draw().unwrap();
        state.current_mut().add_to_hand(card);
        let card = state.draw_pile.draw().unwrap();
        state.discard(card);

        let mut ids = state.census();
        ids.sort();
        assert_eq!(ids, vec![InstanceId(0), InstanceId(1), InstanceId(2)]);
        assert!(state.discard_has_kind(CardKind::Upgrade));
        assert_eq!(state.discard_position(InstanceId(1)), Some(0));
    }

    #[test]
    fn test_reveal_queries() {
        let mut state = state_with_cards(0);
        let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
        state.temporary_effects.push_back(TemporaryEffect::RevealHand {
            source: p0,
            target: p1,
            card: InstanceId(5),
        });

        assert!(state.is_hand_revealed(p0, p1));
        assert!(!state.is_hand_revealed(p1, p0));
        assert!(state.reveal_from(p0).is_some());
        assert!(state.reveal_from(p1).is_none());
    }

    #[test]
    fn test_record_sequences_within_turn() {
        let mut state = state_with_cards(0);
        state.record(Action::Draw);
        state.record(Action::EndTurn);
        state.turn_number += 1;
        state.record(Action::Draw);

        let seqs: Vec<_> = state.history.iter().map(|r| (r.turn, r.sequence)).collect();
        assert_eq!(seqs, vec![(1, 0), (1, 1), (2, 0)]);
    }
}
