//! The rules engine.
//!
//! `GameEngine` owns every rule of the game and is the only code that
//! mutates a `MatchState` during play. `RulesEngine` exposes the same rules
//! as a list of atomic `Action`s for automated drivers.

pub mod actions;
pub mod combat;
pub mod engine;
pub mod game;
pub mod turn;

pub use combat::{duel, protecting_upgrade, CombatReport, DuelOutcome};
pub use engine::{ActionOutcome, MatchResult, RulesEngine};
pub use game::GameEngine;
pub use turn::{AttackerRef, PendingAction, TurnState, TurnType};
