//! Violation reads: the filter/sort builder and the engine that drives it.

pub mod engine;
pub mod filter;

pub use engine::QueryEngine;
pub use filter::{FilterClause, FilterSet, OrderBy, SortColumn, ViolationSelect};
