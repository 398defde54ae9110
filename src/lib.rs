//! # dogs-cats-chickens
//!
//! Rules engine for a two-player card battle: creatures in a
//! dog > cat > chicken > dog triangle, upgrades that protect their row, and
//! action cards that reveal, steal, flip and revive, all on a grid that grows
//! as cards are played.
//!
//! ## Design Principles
//!
//! 1. **Explicit Context**: All match data lives in a `MatchState` passed to
//!    every engine call. No globals, no hidden singletons.
//!
//! 2. **Validate, Then Commit**: Every operation checks first and mutates
//!    only once it cannot fail. A rejected move is an ordinary `MoveError`
//!    and leaves the state untouched.
//!
//! 3. **Deterministic**: Shuffles, deal retries and steals draw from
//!    `GameRng` streams derived from the match seed. A seed replays a match
//!    exactly.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: Hands, piles and field rows are `im`
//!   vectors, so `MatchState::snapshot` is O(1). The random policy uses this
//!   to look ahead.
//!
//! - **Stable Rows**: Field rows shift as the grid grows and shrinks. Each
//!   row carries a `RowId` so a declared attacker can always be found again.
//!
//! ## Modules
//!
//! - `core`: Instance ids, players, match state, actions, RNG, configuration
//! - `cards`: Card definitions, instances and the catalog
//! - `zones`: Draw pile and field grid
//! - `rules`: The rules engine, combat and action cards
//! - `policy`: Automated players
//! - `error`: Move and catalog errors

pub mod core;
pub mod cards;
pub mod zones;
pub mod rules;
pub mod policy;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionRecord, GameRng, InstanceAllocator, InstanceId, MatchConfig, MatchEvent,
    MatchState, Placement, Player, PlayerId, PlayerMap, TemporaryEffect,
};

pub use crate::cards::{
    ActionEffect, Card, CardBody, CardCatalog, CardDefinition, CardKind, Creature, CreatureType,
    DeckComposition, DefinitionId, MatchAbility, UpgradeEffect,
};

pub use crate::zones::{DrawPile, Field, RowId};

pub use crate::rules::{
    ActionOutcome, CombatReport, DuelOutcome, GameEngine, MatchResult, PendingAction, RulesEngine, TurnState,
    TurnType,
};

pub use crate::policy::{run_match, MatchSummary, OpponentPolicy, UniformRandomPolicy};

pub use crate::error::{CatalogError, MoveError, MoveResult};
