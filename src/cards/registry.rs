//! Card catalog and deck composition.
//!
//! The `CardCatalog` stores every card definition of a ruleset and provides
//! lookup by `DefinitionId`. A `DeckComposition` says how many copies of each
//! definition go into the shared draw pile; `expand` turns it into concrete
//! cards with fresh instance ids.
//!
//! ## Example
//!
//! ```
//! use dogs_cats_chickens::cards::{CardCatalog, CardDefinition, CreatureType, DeckComposition, MatchAbility};
//! use dogs_cats_chickens::core::InstanceAllocator;
//!
//! let mut catalog = CardCatalog::new();
//! catalog.register(CardDefinition::creature("dog", "Dog", CreatureType::Dog, MatchAbility::AlwaysWin)).unwrap();
//!
//! let deck = DeckComposition::new().with("dog", 3);
//! let cards = deck.expand(&catalog, &mut InstanceAllocator::new()).unwrap();
//! assert_eq!(cards.len(), 3);
//! ```

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::definition::{CardDefinition, CardKind, DefinitionId};
use super::instance::Card;
use crate::core::entity::InstanceAllocator;
use crate::error::CatalogError;

/// Registry of card definitions.
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: FxHashMap<DefinitionId, CardDefinition>,
}

impl CardCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from a JSON array of card records.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<CardDefinition> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for record in records {
            catalog.register(record)?;
        }
        Ok(catalog)
    }

    /// Register a card definition. Ids must be unique.
    pub fn register(&mut self, card: CardDefinition) -> Result<(), CatalogError> {
        if self.cards.contains_key(&card.id) {
            return Err(CatalogError::DuplicateDefinition(card.id));
        }
        self.cards.insert(card.id.clone(), card);
        Ok(())
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: &DefinitionId) -> Option<&CardDefinition> {
        self.cards.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &DefinitionId) -> bool {
        self.cards.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all definitions (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }

    /// Find definitions of one kind.
    pub fn find_by_kind(&self, kind: CardKind) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values().filter(move |c| c.kind() == kind)
    }
}

/// Copy counts per definition.
///
/// Entries are kept sorted by definition id so that expansion order, and
/// therefore the seeded shuffle, is reproducible.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckComposition {
    counts: BTreeMap<DefinitionId, u32>,
}

impl DeckComposition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `{ "definition_id": count, ... }` object.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add copies of a definition (builder pattern).
    #[must_use]
    pub fn with(mut self, id: impl Into<DefinitionId>, count: u32) -> Self {
        *self.counts.entry(id.into()).or_insert(0) += count;
        self
    }

    /// Total number of cards.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().map(|&c| c as usize).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DefinitionId, u32)> {
        self.counts.iter().map(|(id, &count)| (id, count))
    }

    /// Instantiate every copy, allocating instance ids from `ids`.
    pub fn expand(&self, catalog: &CardCatalog, ids: &mut InstanceAllocator) -> Result<Vec<Card>, CatalogError> {
        let mut cards = Vec::with_capacity(self.total());
        for (id, count) in self.iter() {
            let definition = catalog
                .get(id)
                .ok_or_else(|| CatalogError::UnknownDefinition(id.clone()))?;
            for _ in 0..count {
                cards.push(Card::from_definition(definition, ids.alloc()));
            }
        }
        Ok(cards)
    }
}
