//! Uniform random policy.
//!
//! Picks uniformly among whole moves, where a move is one legal action or,
//! for actions that open a targeted follow-up (declaring an attack, staging
//! a tea, bird or spirit card), the action plus one of its follow-ups. The
//! follow-ups are found by applying the opener to a snapshot of the state.
//!
//! The policy doubles as a fuzzer: every action it applies came from
//! `legal_actions`, so any rejection is an engine inconsistency and is
//! returned as an error.

use smallvec::{smallvec, SmallVec};
use tracing::trace;

use super::OpponentPolicy;
use crate::core::action::Action;
use crate::core::rng::GameRng;
use crate::core::state::MatchState;
use crate::error::{MoveError, MoveResult};
use crate::rules::{PendingAction, RulesEngine};

/// Default bound on moves per turn. Matched cats can attack indefinitely.
pub const DEFAULT_STEP_CAP: usize = 64;

type Move = SmallVec<[Action; 2]>;

/// Plays uniformly random legal moves with its own seeded RNG.
#[derive(Clone, Debug)]
pub struct UniformRandomPolicy {
    rng: GameRng,
    step_cap: usize,
}

impl UniformRandomPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::from_rng(GameRng::new(seed))
    }

    /// Policy drawing from `rng`, typically a fork of the match RNG.
    #[must_use]
    pub fn from_rng(rng: GameRng) -> Self {
        Self {
            rng,
            step_cap: DEFAULT_STEP_CAP,
        }
    }

    #[must_use]
    pub fn with_step_cap(mut self, cap: usize) -> Self {
        self.step_cap = cap;
        self
    }

    /// Every legal whole move.
    pub fn legal_moves<E: RulesEngine>(engine: &E, state: &MatchState) -> Vec<Move> {
        let mut moves = Vec::new();
        for opener in engine.legal_actions(state) {
            if !opens_follow_up(&opener) {
                moves.push(smallvec![opener]);
                continue;
            }
            let mut scratch = state.snapshot();
            if engine.apply_action(&mut scratch, &opener).is_err() {
                continue;
            }
            let pending = scratch.turn.pending_action;
            if pending != PendingAction::Attack && !pending.is_targeted_effect() {
                moves.push(smallvec![opener]);
                continue;
            }
            for follow_up in engine.legal_actions(&scratch) {
                moves.push(smallvec![opener.clone(), follow_up]);
            }
        }
        moves
    }

    fn discard_down<E: RulesEngine>(&mut self, engine: &E, state: &mut MatchState) -> MoveResult<usize> {
        let mut applied = 0;
        if state.turn.pending_action.is_targeted_effect() {
            engine.apply_action(state, &Action::CancelPendingAction)?;
            applied += 1;
        }
        if state.turn.pending_action != PendingAction::DiscardExtraCards {
            match engine.apply_action(state, &Action::StartDiscardPhase) {
                Ok(_) => applied += 1,
                Err(MoveError::HandWithinLimit) => return Ok(applied),
                Err(err) => return Err(err),
            }
        }
        while state.turn.pending_action == PendingAction::DiscardExtraCards {
            let Some(card) = state.current().hand.front().map(|c| c.instance_id) else {
                break;
            };
            engine.apply_action(state, &Action::DiscardHandCard { card })?;
            applied += 1;
        }
        Ok(applied)
    }
}

fn opens_follow_up(action: &Action) -> bool {
    matches!(action, Action::StartAttack { .. } | Action::PlayHandCard { .. })
}

impl<E: RulesEngine> OpponentPolicy<E> for UniformRandomPolicy {
    fn play_turn(&mut self, engine: &E, state: &mut MatchState) -> MoveResult<usize> {
        let mut applied = 0;

        for _ in 0..self.step_cap {
            if engine.is_terminal(state).is_some() || state.turn.moves_left() == 0 {
                break;
            }
            let moves = Self::legal_moves(engine, state);
            let Some(chosen) = self.rng.choose(&moves) else {
                break;
            };
            for action in chosen {
                trace!(player = %state.current_player, ?action, "random policy move");
                engine.apply_action(state, action)?;
                applied += 1;
            }
        }

        Ok(applied + self.discard_down(engine, state)?)
    }
}
