//! Automated players.
//!
//! An `OpponentPolicy` plays one whole turn for the player to move, up to
//! but not including `end_turn`. `run_match` alternates policies and turn
//! ends until the match is decided.

pub mod random;

pub use random::UniformRandomPolicy;

use tracing::info;

use crate::core::action::Action;
use crate::core::player::PlayerMap;
use crate::core::state::MatchState;
use crate::error::MoveResult;
use crate::rules::{ActionOutcome, MatchResult, RulesEngine};

/// Plays a turn for whichever player is to move.
pub trait OpponentPolicy<E: RulesEngine> {
    /// Make every move of the current turn, leaving the hand within the
    /// limit. Returns how many actions were applied.
    fn play_turn(&mut self, engine: &E, state: &mut MatchState) -> MoveResult<usize>;
}

/// How a driven match finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchSummary {
    pub result: MatchResult,
    /// Turns ended, across both players.
    pub turns: u32,
    /// Actions applied by the policies, excluding turn ends.
    pub actions: usize,
}

/// Alternate `policies` until the match ends or `max_turns` turns have
/// ended. A match cut off by the cap reports `MatchResult::Ongoing`.
pub fn run_match<E: RulesEngine>(
    engine: &E,
    state: &mut MatchState,
    policies: &mut PlayerMap<Box<dyn OpponentPolicy<E>>>,
    max_turns: u32,
) -> MoveResult<MatchSummary> {
    let mut turns = 0;
    let mut actions = 0;

    while engine.is_terminal(state).is_none() && turns < max_turns {
        let mover = state.current_player;
        actions += policies[mover].play_turn(engine, state)?;
        if let ActionOutcome::TurnEnded(result) = engine.apply_action(state, &Action::EndTurn)? {
            turns += 1;
            if result.is_over() {
                info!(?result, turns, actions, "driven match finished");
            }
        }
    }

    Ok(MatchSummary {
        result: state.result,
        turns,
        actions,
    })
}
