//! Column projection and table styling.
//!
//! A [`Grid`](crate::spreadsheet::Grid) is first narrowed to the selected columns
//! ([`selection`]) and then turned into a styled [`TableModel`] ([`model`]).
pub mod model;
pub mod selection;

pub use model::{Color, RowRole, RowStyle, StyleMode, TableModel, TableRow};
pub use selection::{project, ColumnSelection, SelectionError};
