//! Card system: definitions, instances, catalog and deck composition.
//!
//! ## Key Types
//!
//! - `DefinitionId`: Identifier shared by all copies of a printed card
//! - `CardDefinition`: Static catalog record with a kind-tagged payload
//! - `Card`: One physical copy (instance id, face-up, matched)
//! - `CardCatalog`: Definition lookup
//! - `DeckComposition`: Copy counts expanded into the draw pile

pub mod definition;
pub mod instance;
pub mod registry;

pub use definition::{
    ActionEffect, CardDefinition, CardKind, CreatureType, DefinitionId, DefinitionKind, MatchAbility,
    UpgradeEffect,
};
pub use instance::{Card, CardBody, Creature};
pub use registry::{CardCatalog, DeckComposition};
