//! # shapesheet-core
//!
//! Core data structures for the shapesheet batch query/update engine.
//!
//! This crate provides the fundamental types used throughout shapesheet:
//! - [`Src`] and [`CellIndex`] - Cell addressing (section/row/cell or single index)
//! - [`AddressStream`] - The flat, homogeneous address list sent to a host in one call
//! - [`CellValue`] and [`CellValueType`] - Typed values marshaled to and from the host
//! - [`ColumnList`], [`SectionQuery`], [`CellQuery`] - The declarative query builder
//! - [`SheetTarget`] - The capability contract a host binding must provide
//!
//! ## Example
//!
//! ```rust
//! use shapesheet_core::{src, CellQuery, RowMode, SectionIndex};
//!
//! let mut query = CellQuery::new();
//! let object = query.add_section(SectionIndex::OBJECT, RowMode::Fixed).unwrap();
//! let pin_x = object.add_named(src::PIN_X, "PinX").unwrap();
//! let pin_y = object.add_named(src::PIN_Y, "PinY").unwrap();
//!
//! assert_eq!(pin_x.ordinal(), 0);
//! assert_eq!(pin_y.ordinal(), 1);
//! assert_eq!(query.column_count(), 2);
//! ```

pub mod address;
pub mod column;
pub mod error;
pub mod query;
pub mod section;
pub mod src;
pub mod target;
pub mod value;

// Re-exports for convenience
pub use address::{
    Address, AddressKind, AddressStream, CellIndex, ObjectId, SectionIndex, SheetAddress, Src,
    StreamEntry,
};
pub use column::{Column, ColumnList};
pub use error::{ConfigError, Error, Result};
pub use query::CellQuery;
pub use section::{RowMode, SectionQuery, SectionQueryList};
pub use target::SheetTarget;
pub use value::{CellResult, CellValue, CellValueType, SetFlags, UnitCode};
