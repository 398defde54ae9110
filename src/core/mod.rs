//! Core match types: instance ids, players, state, actions, RNG, configuration.
//!
//! Everything a match needs to exist lives here. The rules that change it
//! live in `rules`.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod action;
pub mod state;

pub use entity::{InstanceAllocator, InstanceId};
pub use player::{MatchEvent, Placement, Player, PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::GameRng;
pub use config::MatchConfig;
pub use action::{Action, ActionRecord};
pub use state::{MatchState, TemporaryEffect};
