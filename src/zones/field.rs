//! The battlefield grid.
//!
//! A field is a column of rows, each holding four cells:
//!
//! ```text
//!            col 0      col 1      col 2      col 3
//! row 0    [ empty  ] [ empty  ] [ empty  ] [ empty  ]   <- top buffer
//! row 1    [creature] [creature] [upgrade ] [upgrade ]
//! row 2    [ empty  ] [ empty  ] [ empty  ] [ empty  ]   <- bottom buffer
//! ```
//!
//! ## Addressing
//!
//! Cells are addressed by `(row, col)` where `row` is the *current physical*
//! index (`0..height()`). Physical indices shift:
//!
//! - placing into row 0 inserts a new empty row above it, so the card ends up
//!   at physical row 1 and every other row moves down by one;
//! - placing into the last row appends a new empty row below it;
//! - removing a row moves every row below it up by one.
//!
//! A one-row field gets a buffer on both sides on its first placement. The
//! result is that the first and last rows are always empty once anything has
//! been played, and occupied rows are always interior.
//!
//! Every row also carries a `RowId` assigned at creation and never reused.
//! `position_of` maps a `RowId` back to the row's current physical index,
//! which is how the engine keeps track of a row across shifts.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::Card;
use crate::core::entity::InstanceId;

/// Cells per row.
pub const FIELD_WIDTH: usize = 4;

/// Columns that hold creatures.
pub const CREATURE_COLUMNS: [usize; 2] = [0, 1];

/// Columns that hold upgrades; column 3 stacks on column 2.
pub const UPGRADE_COLUMNS: [usize; 2] = [2, 3];

/// The creature column paired with `col`.
#[must_use]
pub const fn opposite_creature_column(col: usize) -> usize {
    if col == 0 {
        1
    } else {
        0
    }
}

#[must_use]
pub const fn is_creature_column(col: usize) -> bool {
    col < 2
}

#[must_use]
pub const fn is_upgrade_column(col: usize) -> bool {
    col == 2 || col == 3
}

/// Stable identity of a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowId(pub u32);

/// One row of four cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRow {
    pub id: RowId,
    pub cells: [Option<Card>; FIELD_WIDTH],
}

impl FieldRow {
    fn empty(id: RowId) -> Self {
        Self {
            id,
            cells: [None, None, None, None],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn creatures(&self) -> impl Iterator<Item = &Card> {
        CREATURE_COLUMNS
            .iter()
            .filter_map(move |&col| self.cells[col].as_ref())
    }

    #[must_use]
    pub fn has_creature(&self) -> bool {
        self.creatures().next().is_some()
    }
}

/// Growable four-column grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    rows: Vector<FieldRow>,
    next_row_id: u32,
}

impl Default for Field {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Field {
    /// Create a field with `rows` empty rows (at least one).
    #[must_use]
    pub fn new(rows: usize) -> Self {
        let mut field = Self {
            rows: Vector::new(),
            next_row_id: 0,
        };
        for _ in 0..rows.max(1) {
            let row = field.fresh_row();
            field.rows.push_back(row);
        }
        field
    }

    fn fresh_row(&mut self) -> FieldRow {
        let id = RowId(self.next_row_id);
        self.next_row_id += 1;
        FieldRow::empty(id)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows.len() && col < FIELD_WIDTH
    }

    #[must_use]
    pub fn row(&self, row: usize) -> Option<&FieldRow> {
        self.rows.get(row)
    }

    pub fn rows(&self) -> impl Iterator<Item = &FieldRow> {
        self.rows.iter()
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&Card> {
        self.rows.get(row).and_then(|r| r.cells.get(col)).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Card> {
        self.rows
            .get_mut(row)
            .and_then(|r| r.cells.get_mut(col))
            .and_then(Option::as_mut)
    }

    #[must_use]
    pub fn is_vacant(&self, row: usize, col: usize) -> bool {
        self.in_bounds(row, col) && self.get(row, col).is_none()
    }

    #[must_use]
    pub fn row_id(&self, row: usize) -> Option<RowId> {
        self.rows.get(row).map(|r| r.id)
    }

    /// Current physical index of a row, if it still exists.
    #[must_use]
    pub fn position_of(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// Location of a card on this field.
    #[must_use]
    pub fn find(&self, instance: InstanceId) -> Option<(usize, usize)> {
        self.rows.iter().enumerate().find_map(|(r, row)| {
            row.cells
                .iter()
                .position(|cell| cell.as_ref().is_some_and(|c| c.instance_id == instance))
                .map(|c| (r, c))
        })
    }

    /// Put a card into an empty cell and grow the edges.
    ///
    /// Returns the card's physical `(row, col)` after growth, or gives the
    /// card back if the cell is occupied or out of range.
    pub fn place(&mut self, row: usize, col: usize, card: Card) -> Result<(usize, usize), Card> {
        if !self.is_vacant(row, col) {
            return Err(card);
        }
        if let Some(target) = self.rows.get_mut(row) {
            target.cells[col] = Some(card);
        }
        Ok((self.grow_around(row), col))
    }

    fn grow_around(&mut self, row: usize) -> usize {
        if row + 1 == self.rows.len() {
            let buffer = self.fresh_row();
            self.rows.push_back(buffer);
        }
        if row == 0 {
            let buffer = self.fresh_row();
            self.rows.push_front(buffer);
            return row + 1;
        }
        row
    }

    /// Take a card out of a cell.
    pub fn take(&mut self, row: usize, col: usize) -> Option<Card> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col)).and_then(Option::take)
    }

    /// Slide a column 3 upgrade into an empty column 2.
    pub fn settle_upgrades(&mut self, row: usize) {
        if let Some(r) = self.rows.get_mut(row) {
            if r.cells[2].is_none() {
                r.cells[2] = r.cells[3].take();
            }
        }
    }

    /// Take every card out of a row, left to right.
    pub fn drain_row(&mut self, row: usize) -> SmallVec<[Card; FIELD_WIDTH]> {
        match self.rows.get_mut(row) {
            Some(r) => r.cells.iter_mut().filter_map(Option::take).collect(),
            None => SmallVec::new(),
        }
    }

    /// Remove every empty interior row. Returns how many went.
    pub fn prune_empty_rows(&mut self) -> usize {
        let mut removed = 0;
        let mut row = 1;
        while row + 1 < self.rows.len() {
            if self.rows.get(row).is_some_and(FieldRow::is_empty) {
                self.rows.remove(row);
                removed += 1;
            } else {
                row += 1;
            }
        }
        removed
    }

    /// Every card with its location.
    pub fn cards(&self) -> impl Iterator<Item = (usize, usize, &Card)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.cells
                .iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.as_ref().map(|card| (r, c, card)))
        })
    }

    /// Every creature with its location.
    pub fn creatures(&self) -> impl Iterator<Item = (usize, usize, &Card)> {
        self.cards().filter(|(_, col, _)| is_creature_column(*col))
    }

    #[must_use]
    pub fn creature_count(&self) -> usize {
        self.creatures().count()
    }

    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CreatureType, MatchAbility};

    fn card(id: u32) -> Card {
        let def = CardDefinition::creature("dog", "Dog", CreatureType::Dog, MatchAbility::AlwaysWin);
        Card::from_definition(&def, InstanceId(id))
    }

    #[test]
    fn test_first_placement_buffers_both_edges() {
        let mut field = Field::new(1);
        let at = field.place(0, 0, card(1)).unwrap();

        assert_eq!(at, (1, 0));
        assert_eq!(field.height(), 3);
        assert!(field.row(0).unwrap().is_empty());
        assert!(field.row(2).unwrap().is_empty());
        assert_eq!(field.get(1, 0).map(|c| c.instance_id), Some(InstanceId(1)));
    }

    #[test]
    fn test_growth_at_top_shifts_rows() {
        let mut field = Field::new(1);
        field.place(0, 0, card(1)).unwrap();
        let original = field.row_id(1).unwrap();

        let at = field.place(0, 1, card(2)).unwrap();

        assert_eq!(at, (1, 1));
        assert_eq!(field.height(), 4);
        assert_eq!(field.position_of(original), Some(2));
        assert_eq!(field.find(InstanceId(1)), Some((2, 0)));
    }

    #[test]
    fn test_growth_at_bottom() {
        let mut field = Field::new(1);
        field.place(0, 0, card(1)).unwrap();

        let at = field.place(2, 0, card(2)).unwrap();

        assert_eq!(at, (2, 0));
        assert_eq!(field.height(), 4);
        assert!(field.row(3).unwrap().is_empty());
    }

    #[test]
    fn test_interior_placement_does_not_grow() {
        let mut field = Field::new(1);
        field.place(0, 0, card(1)).unwrap();

        field.place(1, 1, card(2)).unwrap();
        assert_eq!(field.height(), 3);
    }

    #[test]
    fn test_occupied_and_out_of_range() {
        let mut field = Field::new(1);
        field.place(0, 0, card(1)).unwrap();

        assert!(field.place(1, 0, card(2)).is_err());
        assert!(field.place(9, 0, card(3)).is_err());
        assert!(field.place(1, FIELD_WIDTH, card(4)).is_err());
        assert_eq!(field.height(), 3);
    }

    #[test]
    fn test_drain_and_prune() {
        let mut field = Field::new(1);
        field.place(0, 0, card(1)).unwrap();
        field.place(2, 0, card(2)).unwrap();
        assert_eq!(field.height(), 4);

        let drained = field.drain_row(1);
        assert_eq!(drained.len(), 1);
        assert_eq!(field.prune_empty_rows(), 1);
        assert_eq!(field.height(), 3);
        assert_eq!(field.find(InstanceId(2)), Some((1, 0)));
        assert_eq!(field.prune_empty_rows(), 0);
    }

    #[test]
    fn test_prune_keeps_edges() {
        let mut field = Field::new(1);
        field.place(0, 0, card(1)).unwrap();
        field.place(2, 0, card(2)).unwrap();
        field.place(3, 0, card(3)).unwrap();
        assert_eq!(field.height(), 5);

        field.drain_row(1);
        field.drain_row(3);
        assert_eq!(field.prune_empty_rows(), 2);
        assert_eq!(field.height(), 3);
        assert_eq!(field.find(InstanceId(2)), Some((1, 0)));

        field.drain_row(1);
        assert_eq!(field.prune_empty_rows(), 1);
        assert_eq!(field.height(), 2);
        assert_eq!(field.prune_empty_rows(), 0);
    }

    #[test]
    fn test_settle_upgrades() {
        let mut field = Field::new(3);
        field.place(1, 0, card(1)).unwrap();
        field.place(1, 2, card(2)).unwrap();
        field.place(1, 3, card(3)).unwrap();

        field.take(1, 2);
        field.settle_upgrades(1);

        assert_eq!(field.get(1, 2).map(|c| c.instance_id), Some(InstanceId(3)));
        assert!(field.get(1, 3).is_none());
    }

    #[test]
    fn test_creature_queries() {
        let mut field = Field::new(1);
        field.place(0, 0, card(1)).unwrap();
        field.place(1, 1, card(2)).unwrap();

        assert_eq!(field.creature_count(), 2);
        assert!(field.row(1).unwrap().has_creature());
        assert_eq!(field.take(1, 0).map(|c| c.instance_id), Some(InstanceId(1)));
        assert_eq!(field.creature_count(), 1);
    }
}
