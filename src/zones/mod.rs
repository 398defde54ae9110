//! Card locations outside the hands.
//!
//! ## Key Types
//!
//! - `DrawPile`: The shared, shuffled stack both players draw from
//! - `Field`: A player's growable four-column grid
//! - `RowId`: Stable identity of a field row across index shifts

pub mod draw_pile;
pub mod field;

pub use draw_pile::DrawPile;
pub use field::{Field, FieldRow, RowId, CREATURE_COLUMNS, FIELD_WIDTH, UPGRADE_COLUMNS};
