//! Players and per-player data storage.
//!
//! ## PlayerId
//!
//! Type-safe player index. A match always has exactly two players,
//! `PlayerId(0)` moving first.
//!
//! ## PlayerMap
//!
//! Per-player storage backed by a `Vec`, indexable by `PlayerId`.
//!
//! ## Player
//!
//! A player's hand, field and turn counter.

use im::Vector;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::entity::InstanceId;
use crate::cards::{Card, CreatureType, DefinitionId, MatchAbility};
use crate::zones::field::{is_creature_column, opposite_creature_column, Field};

/// Number of players in a match.
pub const PLAYER_COUNT: usize = 2;

/// Player index (0-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self((self.0 + 1) % PLAYER_COUNT as u8)
    }

    /// Both player ids in turn order.
    pub fn all() -> impl Iterator<Item = PlayerId> {
        (0..PLAYER_COUNT as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a map with one entry per player from a factory.
    pub fn new(factory: impl Fn(PlayerId) -> T) -> Self {
        Self {
            data: PlayerId::all().map(factory).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Like `get`, but `None` for an id outside the match.
    #[must_use]
    pub fn try_get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    /// Mutable access to both entries at once.
    pub fn pair_mut(&mut self, player: PlayerId) -> (&mut T, &mut T) {
        let (first, second) = self.data.split_at_mut(1);
        if player.index() == 0 {
            (&mut first[0], &mut second[0])
        } else {
            (&mut second[0], &mut first[0])
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (PlayerId(i as u8), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

/// Two same-definition creatures paired up in one row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub definition_id: DefinitionId,
    /// The card just placed.
    pub placed: InstanceId,
    /// The card it paired with.
    pub partner: InstanceId,
    pub creature_type: CreatureType,
    pub ability: MatchAbility,
}

/// Where a card landed after `play_to_field`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Physical row after edge growth.
    pub row: usize,
    pub col: usize,
    pub matched: Option<MatchEvent>,
}

/// One side of the match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Completed turns.
    pub turn_count: u32,
    pub is_automated: bool,
    /// Display order only.
    pub hand: Vector<Card>,
    pub field: Field,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, field_rows: usize) -> Self {
        Self {
            id,
            turn_count: 0,
            is_automated: false,
            hand: Vector::new(),
            field: Field::new(field_rows),
        }
    }

    #[must_use]
    pub fn automated(mut self, automated: bool) -> Self {
        self.is_automated = automated;
        self
    }

    pub fn add_to_hand(&mut self, card: Card) {
        self.hand.push_back(card);
    }

    #[must_use]
    pub fn hand_position(&self, instance: InstanceId) -> Option<usize> {
        self.hand.iter().position(|c| c.instance_id == instance)
    }

    #[must_use]
    pub fn hand_card(&self, instance: InstanceId) -> Option<&Card> {
        self.hand.iter().find(|c| c.instance_id == instance)
    }

    pub fn remove_from_hand(&mut self, instance: InstanceId) -> Option<Card> {
        let index = self.hand_position(instance)?;
        Some(self.hand.remove(index))
    }

    /// Move a hand card onto the field.
    ///
    /// Applies the match rule and edge growth. Returns `None` and leaves the
    /// player untouched if the card is not in hand or the cell is taken.
    pub fn play_to_field(&mut self, instance: InstanceId, row: usize, col: usize) -> Option<Placement> {
        let index = self.hand_position(instance)?;
        if !self.field.is_vacant(row, col) {
            return None;
        }

        let card = self.hand.remove(index);
        let (row, col) = self.field.place(row, col, card).ok()?;
        let matched = self.apply_match_rule(row, col);

        Some(Placement { row, col, matched })
    }

    fn apply_match_rule(&mut self, row: usize, col: usize) -> Option<MatchEvent> {
        if !is_creature_column(col) {
            return None;
        }
        let partner_col = opposite_creature_column(col);
        let placed = self.field.get(row, col)?;
        let partner = self.field.get(row, partner_col)?;
        let creature = placed.creature()?;
        if !partner.is_creature() || partner.definition_id != placed.definition_id {
            return None;
        }

        let event = MatchEvent {
            definition_id: placed.definition_id.clone(),
            placed: placed.instance_id,
            partner: partner.instance_id,
            creature_type: creature.creature_type,
            ability: creature.match_ability,
        };
        for c in [col, partner_col] {
            if let Some(card) = self.field.get_mut(row, c) {
                card.mark_matched();
            }
        }
        Some(event)
    }

    #[must_use]
    pub fn creature_count(&self) -> usize {
        self.field.creature_count()
    }

    #[must_use]
    pub fn has_creature(&self) -> bool {
        self.field.creatures().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, UpgradeEffect};

    fn creature(def: &str, id: u32) -> Card {
        let def = CardDefinition::creature(def, def, CreatureType::Dog, MatchAbility::AlwaysWin);
        Card::from_definition(&def, InstanceId(id))
    }

    #[test]
    fn test_player_id_opponent() {
        assert_eq!(PlayerId::new(0).opponent(), PlayerId::new(1));
        assert_eq!(PlayerId::new(1).opponent(), PlayerId::new(0));
        assert_eq!(format!("{}", PlayerId::new(1)), "Player 1");
    }

    #[test]
    fn test_player_map_pair_mut() {
        let mut map: PlayerMap<i32> = PlayerMap::new(|p| p.index() as i32);
        {
            let (me, them) = map.pair_mut(PlayerId::new(1));
            *me += 10;
            *them += 20;
        }
        assert_eq!(map[PlayerId::new(0)], 20);
        assert_eq!(map[PlayerId::new(1)], 11);
        assert!(map.try_get(PlayerId::new(2)).is_none());
    }

    #[test]
    fn test_hand_add_remove() {
        let mut player = Player::new(PlayerId::new(0), 1);
        player.add_to_hand(creature("dog", 1));
        player.add_to_hand(creature("dog", 2));

        assert_eq!(player.remove_from_hand(InstanceId(1)).map(|c| c.instance_id), Some(InstanceId(1)));
        assert!(player.remove_from_hand(InstanceId(1)).is_none());
        assert_eq!(player.hand.len(), 1);
    }

    #[test]
    fn test_play_to_field_expands() {
        let mut player = Player::new(PlayerId::new(0), 1);
        player.add_to_hand(creature("dog", 1));

        let placement = player.play_to_field(InstanceId(1), 0, 0).unwrap();

        assert_eq!((placement.row, placement.col), (1, 0));
        assert!(placement.matched.is_none());
        assert!(player.hand.is_empty());
        assert_eq!(player.field.height(), 3);
    }

    #[test]
    fn test_match_marks_both_cards() {
        let mut player = Player::new(PlayerId::new(0), 1);
        player.add_to_hand(creature("dog", 1));
        player.add_to_hand(creature("dog", 2));
        player.play_to_field(InstanceId(1), 0, 0).unwrap();

        let placement = player.play_to_field(InstanceId(2), 1, 1).unwrap();
        let event = placement.matched.unwrap();

        assert_eq!(event.placed, InstanceId(2));
        assert_eq!(event.partner, InstanceId(1));
        for col in [0, 1] {
            let card = player.field.get(1, col).unwrap();
            assert!(card.is_matched());
            assert!(card.face_up);
        }
    }

    #[test]
    fn test_different_definitions_do_not_match() {
        let mut player = Player::new(PlayerId::new(0), 1);
        player.add_to_hand(creature("dog", 1));
        player.add_to_hand(creature("wolf", 2));
        player.play_to_field(InstanceId(1), 0, 0).unwrap();

        let placement = player.play_to_field(InstanceId(2), 1, 1).unwrap();
        assert!(placement.matched.is_none());
        assert!(!player.field.get(1, 0).unwrap().is_matched());
    }

    #[test]
    fn test_play_to_field_no_op_cases() {
        let mut player = Player::new(PlayerId::new(0), 1);
        player.add_to_hand(creature("dog", 1));
        player.add_to_hand(creature("dog", 2));
        player.play_to_field(InstanceId(1), 0, 0).unwrap();
        let before = player.clone();

        assert!(player.play_to_field(InstanceId(2), 1, 0).is_none());
        assert!(player.play_to_field(InstanceId(99), 1, 1).is_none());
        assert_eq!(player, before);
    }

    #[test]
    fn test_upgrade_placement_never_matches() {
        let mut player = Player::new(PlayerId::new(0), 3);
        let def = CardDefinition::upgrade("shield", "Shield", UpgradeEffect::Defense);
        player.add_to_hand(Card::from_definition(&def, InstanceId(5)));

        let placement = player.play_to_field(InstanceId(5), 1, 2).unwrap();
        assert!(placement.matched.is_none());
        assert_eq!(player.field.height(), 3);
    }
}
