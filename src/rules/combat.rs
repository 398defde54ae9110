//! Attacks and combat resolution.
//!
//! An attack is declared with `start_attack` (free, switches the turn to
//! attack mode) and resolved with `resolve_attack` against an opposing
//! creature. Resolution compares creature types, then lets the losing row's
//! upgrades step in:
//!
//! ```text
//! column 3 upgrade ─┬─ counterAttack / defense ─> loser survives, upgrade discarded
//!                   ├─ selfDestruct ────────────> winner's row discarded instead
//!                   ├─ revive ──────────────────> loser's creatures back to hand
//!                   └─ none / fakeUpgrade ──────> try column 2 the same way
//! no effect ─────────────────────────────────────> whole losing row discarded
//! ```
//!
//! Rows left empty are removed unless they are the first or last row.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use super::game::GameEngine;
use super::turn::{AttackerRef, PendingAction, TurnType};
use crate::cards::{Creature, CreatureType, UpgradeEffect};
use crate::core::action::Action;
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::state::MatchState;
use crate::error::{MoveError, MoveResult};
use crate::zones::field::{is_creature_column, Field, CREATURE_COLUMNS, UPGRADE_COLUMNS};

/// Who won a fight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DuelOutcome {
    AttackerWins,
    DefenderWins,
    /// Neither type beats the other.
    Standoff,
}

/// Compare two creatures.
///
/// A matched dog beats any dog it attacks; a matched defending dog gets no
/// such bonus.
#[must_use]
pub fn duel(attacker: &Creature, defender: &Creature) -> DuelOutcome {
    let (a, d) = (attacker.creature_type, defender.creature_type);
    let matched_dog = attacker.matched && a == CreatureType::Dog && d == CreatureType::Dog;
    if a.beats(d) || matched_dog {
        DuelOutcome::AttackerWins
    } else if d.beats(a) {
        DuelOutcome::DefenderWins
    } else {
        DuelOutcome::Standoff
    }
}

/// The upgrade that acts for a losing row, with its column.
///
/// Column 3 is consulted first; column 2 only when column 3 is empty or a
/// fake. Fakes never act.
#[must_use]
pub fn protecting_upgrade(field: &Field, row: usize) -> Option<(usize, UpgradeEffect)> {
    UPGRADE_COLUMNS.iter().rev().find_map(|&col| {
        field
            .get(row, col)
            .and_then(|card| card.upgrade_effect())
            .filter(|effect| *effect != UpgradeEffect::FakeUpgrade)
            .map(|effect| (col, effect))
    })
}

/// What one resolved attack did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    pub attacker: InstanceId,
    pub defender: InstanceId,
    pub outcome: DuelOutcome,
    /// The upgrade that acted for the losing row.
    pub protection: Option<UpgradeEffect>,
    /// Cards sent to the discard pile, in order.
    pub discarded: SmallVec<[InstanceId; 8]>,
    /// Creatures returned to their owner's hand.
    pub returned_to_hand: SmallVec<[InstanceId; 2]>,
    /// Rows removed from either field.
    pub rows_removed: usize,
    /// The turn stays in attack mode for another swing.
    pub extra_attack: bool,
}

struct AttackPlan {
    attacker_row: usize,
    attacker_col: usize,
    defender_row: usize,
    defender_col: usize,
    attacker: Creature,
    defender: Creature,
    attacker_id: InstanceId,
    defender_id: InstanceId,
}

impl GameEngine {
    fn check_start_attack(&self, state: &MatchState, row: usize, col: usize) -> MoveResult<AttackerRef> {
        Self::ensure_ongoing(state)?;
        let turn = &state.turn;
        match turn.pending_action {
            PendingAction::None | PendingAction::Attack => {}
            other => return Err(MoveError::Pending(other)),
        }
        if !turn.allow_extra_attack && turn.committed_moves() > 0 {
            return Err(MoveError::AttackNotFirstMove);
        }

        let field = &state.current().field;
        let card = field.get(row, col).ok_or(if field.in_bounds(row, col) {
            MoveError::EmptyCell { row, col }
        } else {
            MoveError::CellOutOfRange { row, col }
        })?;
        if card.creature().is_none() || !is_creature_column(col) {
            return Err(MoveError::NotACreature { row, col });
        }
        if turn.allow_extra_attack && !card.is_matched_of(CreatureType::Cat) {
            return Err(MoveError::AttackNotFirstMove);
        }
        if !state.opponent().has_creature() {
            return Err(MoveError::NoAttackTargets);
        }

        let row_id = field.row_id(row).ok_or(MoveError::CellOutOfRange { row, col })?;
        Ok(AttackerRef {
            instance_id: card.instance_id,
            row_id,
            col,
        })
    }

    /// Whether the creature at `(row, col)` of the mover's field may attack.
    #[must_use]
    pub fn can_attack_with(&self, state: &MatchState, row: usize, col: usize) -> bool {
        self.check_start_attack(state, row, col).is_ok()
    }

    /// Declare an attacker. Costs nothing; the attack is paid on resolution.
    pub fn start_attack(&self, state: &mut MatchState, row: usize, col: usize) -> MoveResult<InstanceId> {
        let attacker = self.check_start_attack(state, row, col)?;
        state.turn.turn_type = TurnType::Attack;
        state.turn.pending_action = PendingAction::Attack;
        state.turn.active_attacker = Some(attacker);
        state.record(Action::StartAttack { row, col });
        debug!(player = %state.current_player, attacker = %attacker.instance_id, row, col, "attack declared");
        Ok(attacker.instance_id)
    }

    fn check_resolve_attack(&self, state: &MatchState, row: usize, col: usize) -> MoveResult<AttackPlan> {
        Self::ensure_ongoing(state)?;
        if state.turn.pending_action != PendingAction::Attack {
            return Err(MoveError::NotAttacking);
        }
        let declared = state.turn.active_attacker.ok_or(MoveError::NotAttacking)?;

        let own = &state.current().field;
        let attacker_row = own.position_of(declared.row_id).ok_or(MoveError::NotAttacking)?;
        let attacker = own
            .get(attacker_row, declared.col)
            .filter(|c| c.instance_id == declared.instance_id)
            .and_then(|c| c.creature().copied())
            .ok_or(MoveError::NotAttacking)?;

        let theirs = &state.opponent().field;
        let target = theirs.get(row, col).ok_or(if theirs.in_bounds(row, col) {
            MoveError::EmptyCell { row, col }
        } else {
            MoveError::CellOutOfRange { row, col }
        })?;
        let defender = target
            .creature()
            .copied()
            .filter(|_| is_creature_column(col))
            .ok_or(MoveError::NotACreature { row, col })?;

        Ok(AttackPlan {
            attacker_row,
            attacker_col: declared.col,
            defender_row: row,
            defender_col: col,
            attacker,
            defender,
            attacker_id: declared.instance_id,
            defender_id: target.instance_id,
        })
    }

    /// Whether `resolve_attack(row, col)` would succeed.
    #[must_use]
    pub fn is_valid_attack_target(&self, state: &MatchState, row: usize, col: usize) -> bool {
        self.check_resolve_attack(state, row, col).is_ok()
    }

    /// Attack the opposing creature at `(row, col)` with the declared
    /// attacker.
    ///
    /// Spends every remaining move unless the attacker is a matched cat, in
    /// which case the turn stays in attack mode for another swing.
    pub fn resolve_attack(&self, state: &mut MatchState, row: usize, col: usize) -> MoveResult<CombatReport> {
        let plan = self.check_resolve_attack(state, row, col)?;
        let mover = state.current_player;
        let defender = mover.opponent();

        let outcome = duel(&plan.attacker, &plan.defender);
        let mut report = CombatReport {
            attacker: plan.attacker_id,
            defender: plan.defender_id,
            outcome,
            protection: None,
            discarded: SmallVec::new(),
            returned_to_hand: SmallVec::new(),
            rows_removed: 0,
            extra_attack: false,
        };

        let sides = match outcome {
            DuelOutcome::AttackerWins => Some(((mover, plan.attacker_row), (defender, plan.defender_row))),
            DuelOutcome::DefenderWins => Some(((defender, plan.defender_row), (mover, plan.attacker_row))),
            DuelOutcome::Standoff => None,
        };
        if let Some((winner, loser)) = sides {
            apply_defeat(state, winner, loser, &mut report);
        }
        for player in PlayerId::all() {
            report.rows_removed += state.player_mut(player).field.prune_empty_rows();
        }

        let matched_cat = plan.attacker.matched && plan.attacker.creature_type == CreatureType::Cat;
        let turn = &mut state.turn;
        turn.pending_action = PendingAction::None;
        turn.active_attacker = None;
        if matched_cat {
            turn.allow_extra_attack = true;
            report.extra_attack = true;
        } else {
            turn.exhaust_moves();
        }

        state.record(Action::ResolveAttack { row, col });
        info!(
            player = %mover,
            attacker = %report.attacker,
            defender = %report.defender,
            outcome = ?report.outcome,
            protection = ?report.protection,
            discarded = report.discarded.len(),
            attacker_col = plan.attacker_col,
            defender_col = plan.defender_col,
            "attack resolved"
        );
        Ok(report)
    }
}

/// Apply a lost fight: consult the loser's upgrades, then discard or return
/// cards accordingly.
fn apply_defeat(
    state: &mut MatchState,
    (winner, winner_row): (PlayerId, usize),
    (loser, loser_row): (PlayerId, usize),
    report: &mut CombatReport,
) {
    let protection = protecting_upgrade(&state.player(loser).field, loser_row);
    report.protection = protection.map(|(_, effect)| effect);

    match protection {
        Some((col, UpgradeEffect::CounterAttack | UpgradeEffect::Defense)) => {
            discard_cell(state, loser, loser_row, col, report);
        }
        Some((col, UpgradeEffect::SelfDestruct)) => {
            discard_cell(state, loser, loser_row, col, report);
            discard_row(state, winner, winner_row, report);
        }
        Some((col, UpgradeEffect::Revive)) => {
            discard_cell(state, loser, loser_row, col, report);
            for creature_col in CREATURE_COLUMNS {
                if let Some(card) = state.player_mut(loser).field.take(loser_row, creature_col) {
                    report.returned_to_hand.push(card.instance_id);
                    state.player_mut(loser).add_to_hand(card);
                }
            }
        }
        Some((_, UpgradeEffect::FakeUpgrade)) | None => {
            discard_row(state, loser, loser_row, report);
        }
    }
}

fn discard_cell(state: &mut MatchState, owner: PlayerId, row: usize, col: usize, report: &mut CombatReport) {
    let field = &mut state.player_mut(owner).field;
    let taken = field.take(row, col);
    field.settle_upgrades(row);
    if let Some(card) = taken {
        report.discarded.push(card.instance_id);
        state.discard(card);
    }
}

fn discard_row(state: &mut MatchState, owner: PlayerId, row: usize, report: &mut CombatReport) {
    for card in state.player_mut(owner).field.drain_row(row) {
        report.discarded.push(card.instance_id);
        state.discard(card);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardDefinition, MatchAbility};
    use crate::core::config::MatchConfig;
    use crate::core::player::{Player, PlayerMap};
    use crate::core::rng::GameRng;
    use crate::rules::turn::TurnState;
    use crate::zones::draw_pile::DrawPile;

    fn creature(creature_type: CreatureType, matched: bool) -> Creature {
        Creature {
            creature_type,
            match_ability: MatchAbility::Inert,
            matched,
        }
    }

    fn card(def: &CardDefinition, id: u32) -> Card {
        Card::from_definition(def, InstanceId(id))
    }

    fn dog() -> CardDefinition {
        CardDefinition::creature("rex", "Rex", CreatureType::Dog, MatchAbility::AlwaysWin)
    }

    fn cat() -> CardDefinition {
        CardDefinition::creature("tom", "Tom", CreatureType::Cat, MatchAbility::ExtraAttack)
    }

    fn upgrade(effect: UpgradeEffect) -> CardDefinition {
        CardDefinition::upgrade(format!("{effect:?}"), "Upgrade", effect)
    }

    /// Place `cards` directly at physical cells, bypassing the rules.
    fn setup(own: &[(usize, usize, Card)], theirs: &[(usize, usize, Card)]) -> MatchState {
        let players = PlayerMap::new(|id| Player::new(id, 1));
        let mut state = MatchState::new(players, DrawPile::default(), GameRng::new(3), 2);
        state.turn = TurnState::new(2);
        for (player, cards) in [(PlayerId::new(0), own), (PlayerId::new(1), theirs)] {
            for (row, col, c) in cards {
                state.player_mut(player).field.place(*row, *col, c.clone()).unwrap();
            }
        }
        state
    }

    #[test]
    fn test_duel_triangle() {
        use CreatureType::*;
        assert_eq!(duel(&creature(Dog, false), &creature(Cat, false)), DuelOutcome::AttackerWins);
        assert_eq!(duel(&creature(Cat, false), &creature(Chicken, false)), DuelOutcome::AttackerWins);
        assert_eq!(duel(&creature(Chicken, false), &creature(Dog, false)), DuelOutcome::AttackerWins);
        assert_eq!(duel(&creature(Cat, false), &creature(Dog, false)), DuelOutcome::DefenderWins);
        assert_eq!(duel(&creature(Cat, false), &creature(Cat, true)), DuelOutcome::Standoff);
    }

    #[test]
    fn test_matched_dog_beats_dog() {
        use CreatureType::*;
        assert_eq!(duel(&creature(Dog, true), &creature(Dog, false)), DuelOutcome::AttackerWins);
        assert_eq!(duel(&creature(Dog, true), &creature(Dog, true)), DuelOutcome::AttackerWins);
        assert_eq!(duel(&creature(Dog, false), &creature(Dog, true)), DuelOutcome::Standoff);
    }

    #[test]
    fn test_protecting_upgrade_order() {
        let state = setup(
            &[],
            &[
                (0, 0, card(&cat(), 1)),
                (1, 2, card(&upgrade(UpgradeEffect::Defense), 2)),
                (1, 3, card(&upgrade(UpgradeEffect::FakeUpgrade), 3)),
            ],
        );
        let field = &state.player(PlayerId::new(1)).field;
        assert_eq!(protecting_upgrade(field, 1), Some((2, UpgradeEffect::Defense)));
    }

    #[test]
    fn test_slot_three_acts_alone() {
        let state = setup(
            &[
                (0, 0, card(&cat(), 1)),
                (1, 2, card(&upgrade(UpgradeEffect::Defense), 2)),
                (1, 3, card(&upgrade(UpgradeEffect::SelfDestruct), 3)),
            ],
            &[
                (0, 0, card(&cat(), 4)),
                (1, 2, card(&upgrade(UpgradeEffect::FakeUpgrade), 5)),
            ],
        );

        let own = &state.player(PlayerId::new(0)).field;
        assert_eq!(protecting_upgrade(own, 1), Some((3, UpgradeEffect::SelfDestruct)));
        let theirs = &state.player(PlayerId::new(1)).field;
        assert_eq!(protecting_upgrade(theirs, 1), None);
    }

    #[test]
    fn test_attack_discards_losing_row() {
        let engine = GameEngine::new(MatchConfig::default());
        let mut state = setup(&[(0, 0, card(&dog(), 1))], &[(0, 0, card(&cat(), 2)), (2, 0, card(&cat(), 3))]);
        assert_eq!(state.player(PlayerId::new(1)).field.height(), 4);

        engine.start_attack(&mut state, 1, 0).unwrap();
        let report = engine.resolve_attack(&mut state, 1, 0).unwrap();

        assert_eq!(report.outcome, DuelOutcome::AttackerWins);
        assert_eq!(report.discarded.as_slice(), &[InstanceId(2)]);
        assert_eq!(report.rows_removed, 1);
        assert_eq!(state.player(PlayerId::new(1)).field.height(), 3);
        assert_eq!(engine.moves_left(&state), 0);
        assert_eq!(state.turn.turn_type, TurnType::Attack);
    }

    #[test]
    fn test_defense_spares_row() {
        let engine = GameEngine::new(MatchConfig::default());
        let mut state = setup(
            &[(0, 0, card(&dog(), 1))],
            &[(0, 0, card(&cat(), 2)), (1, 2, card(&upgrade(UpgradeEffect::Defense), 3))],
        );

        engine.start_attack(&mut state, 1, 0).unwrap();
        let report = engine.resolve_attack(&mut state, 1, 0).unwrap();

        assert_eq!(report.protection, Some(UpgradeEffect::Defense));
        assert_eq!(report.discarded.as_slice(), &[InstanceId(3)]);
        assert!(state.player(PlayerId::new(1)).field.get(1, 0).is_some());
    }

    #[test]
    fn test_consumed_slot_two_keeps_chain_grounded() {
        let engine = GameEngine::new(MatchConfig::default());
        let mut state = setup(
            &[(0, 0, card(&dog(), 1))],
            &[
                (0, 0, card(&cat(), 2)),
                (1, 2, card(&upgrade(UpgradeEffect::CounterAttack), 3)),
                (1, 3, card(&upgrade(UpgradeEffect::FakeUpgrade), 4)),
            ],
        );

        engine.start_attack(&mut state, 1, 0).unwrap();
        let report = engine.resolve_attack(&mut state, 1, 0).unwrap();

        assert_eq!(report.protection, Some(UpgradeEffect::CounterAttack));
        let field = &state.player(PlayerId::new(1)).field;
        assert_eq!(field.get(1, 2).map(|c| c.instance_id), Some(InstanceId(4)));
        assert!(field.get(1, 3).is_none());
    }

    #[test]
    fn test_self_destruct_takes_winner_row() {
        let engine = GameEngine::new(MatchConfig::default());
        let mut state = setup(
            &[(0, 0, card(&dog(), 1))],
            &[(0, 0, card(&cat(), 2)), (1, 2, card(&upgrade(UpgradeEffect::SelfDestruct), 3))],
        );

        engine.start_attack(&mut state, 1, 0).unwrap();
        let report = engine.resolve_attack(&mut state, 1, 0).unwrap();

        assert_eq!(report.discarded.as_slice(), &[InstanceId(3), InstanceId(1)]);
        assert!(!state.player(PlayerId::new(0)).has_creature());
        assert!(state.player(PlayerId::new(1)).has_creature());
        assert_eq!(state.player(PlayerId::new(0)).field.height(), 2);
    }

    #[test]
    fn test_defender_win_discards_attacker_row() {
        let engine = GameEngine::new(MatchConfig::default());
        let mut state = setup(&[(0, 0, card(&cat(), 1))], &[(0, 0, card(&dog(), 2))]);

        engine.start_attack(&mut state, 1, 0).unwrap();
        let report = engine.resolve_attack(&mut state, 1, 0).unwrap();

        assert_eq!(report.outcome, DuelOutcome::DefenderWins);
        assert!(!state.player(PlayerId::new(0)).has_creature());
        assert_eq!(state.discard_pile.len(), 1);
    }

    #[test]
    fn test_attack_must_be_first_move() {
        let engine = GameEngine::new(MatchConfig::default());
        let mut state = setup(&[(0, 0, card(&dog(), 1))], &[(0, 0, card(&cat(), 2))]);
        state.turn.moves_this_turn = 1;

        assert_eq!(engine.start_attack(&mut state, 1, 0), Err(MoveError::AttackNotFirstMove));
        assert!(!engine.can_attack_with(&state, 1, 0));
    }

    #[test]
    fn test_no_targets_rejects_declaration() {
        let engine = GameEngine::new(MatchConfig::default());
        let mut state = setup(&[(0, 0, card(&dog(), 1))], &[]);

        assert_eq!(engine.start_attack(&mut state, 1, 0), Err(MoveError::NoAttackTargets));
        assert_eq!(state.turn.turn_type, TurnType::Reinforce);
    }

    #[test]
    fn test_matched_cat_keeps_attacking() {
        let engine = GameEngine::new(MatchConfig::default());
        let mut first = card(&cat(), 1);
        let mut second = card(&cat(), 2);
        first.mark_matched();
        second.mark_matched();
        let chicken = CardDefinition::creature("hen", "Hen", CreatureType::Chicken, MatchAbility::Inert);
        let mut state = setup(
            &[(0, 0, first), (1, 1, second)],
            &[(0, 0, card(&chicken, 3)), (2, 0, card(&chicken, 4))],
        );

        engine.start_attack(&mut state, 1, 0).unwrap();
        let report = engine.resolve_attack(&mut state, 1, 0).unwrap();
        assert!(report.extra_attack);
        assert_eq!(engine.moves_left(&state), 2);
        assert!(state.turn.allow_extra_attack);

        engine.start_attack(&mut state, 1, 1).unwrap();
        engine.resolve_attack(&mut state, 1, 0).unwrap();
        assert!(!state.player(PlayerId::new(1)).has_creature());
    }

    #[test]
    fn test_resolve_without_declaration() {
        let engine = GameEngine::new(MatchConfig::default());
        let mut state = setup(&[(0, 0, card(&dog(), 1))], &[(0, 0, card(&cat(), 2))]);

        assert!(matches!(engine.resolve_attack(&mut state, 1, 0), Err(MoveError::NotAttacking)));
        engine.start_attack(&mut state, 1, 0).unwrap();
        assert!(!engine.is_valid_attack_target(&state, 0, 0));
        assert!(engine.is_valid_attack_target(&state, 1, 0));
    }
}
