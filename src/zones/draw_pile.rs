//! The shared draw pile.
//!
//! An ordered stack of cards: `draw` takes from the top, `return_to_bottom`
//! puts a card under the whole pile. Shuffling is an explicit Fisher–Yates
//! pass over the injected `GameRng`, so a seed fully determines the order.
//!
//! The multiset of instance ids in the pile only changes through `draw` and
//! `return_to_bottom`; `shuffle` permutes it.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::core::rng::GameRng;

/// Ordered draw pile. The top card is the back of the vector.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawPile {
    cards: Vector<Card>,
}

impl DrawPile {
    /// Build a pile; the last card is on top.
    #[must_use]
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
        }
    }

    /// Unbiased in-place permutation.
    pub fn shuffle(&mut self, rng: &mut GameRng) {
        for i in (1..self.cards.len()).rev() {
            let j = rng.index(i + 1);
            self.cards.swap(i, j);
        }
    }

    /// Remove and return the top card, or `None` if the pile is empty.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop_back()
    }

    /// Put a card under the pile.
    pub fn return_to_bottom(&mut self, card: Card) {
        self.cards.push_front(card);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Top card without drawing it.
    #[must_use]
    pub fn peek(&self) -> Option<&Card> {
        self.cards.back()
    }

    /// Cards from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CreatureType, MatchAbility};
    use crate::core::entity::InstanceId;

    fn pile(n: u32) -> DrawPile {
        let def = CardDefinition::creature("dog", "Dog", CreatureType::Dog, MatchAbility::AlwaysWin);
        DrawPile::new((0..n).map(|i| Card::from_definition(&def, InstanceId(i))))
    }

    fn ids(pile: &DrawPile) -> Vec<u32> {
        pile.iter().map(|c| c.instance_id.raw()).collect()
    }

    #[test]
    fn test_draw_from_top() {
        let mut pile = pile(3);

        assert_eq!(pile.peek().map(|c| c.instance_id), Some(InstanceId(2)));
        assert_eq!(pile.draw().map(|c| c.instance_id), Some(InstanceId(2)));
        assert_eq!(pile.len(), 2);
    }

    #[test]
    fn test_draw_empty_reports_absence() {
        let mut pile = pile(1);

        assert!(pile.draw().is_some());
        assert!(pile.draw().is_none());
        assert!(pile.is_empty());
        assert_eq!(pile.len(), 0);
    }

    #[test]
    fn test_return_to_bottom() {
        let mut pile = pile(3);
        let top = pile.draw().unwrap();
        pile.return_to_bottom(top);

        assert_eq!(ids(&pile), vec![2, 0, 1]);
        assert_eq!(pile.draw().map(|c| c.instance_id), Some(InstanceId(1)));
    }

    #[test]
    fn test_shuffle_is_seeded_permutation() {
        let mut a = pile(20);
        let mut b = pile(20);
        a.shuffle(&mut GameRng::new(7));
        b.shuffle(&mut GameRng::new(7));

        assert_eq!(ids(&a), ids(&b));
        assert_ne!(ids(&a), (0..20).collect::<Vec<_>>());

        let mut sorted = ids(&a);
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }
}
