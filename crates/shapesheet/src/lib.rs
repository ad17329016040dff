//! # shapesheet
//!
//! Batched reads and writes of ShapeSheet cells on a diagramming host.
//!
//! Every host call is an expensive cross-process round trip, so the engine
//! never touches cells one at a time. A [`CellQuery`] describes which cells to
//! read; executing it against a [`Surface`] (a shape, page or master) for a
//! list of object ids flattens everything into one address stream, fetches it
//! in a single call and reshapes the values into a [`ResultTable`]. Writes go
//! through an [`UpdateBatch`] the same way.
//!
//! ## Features
//!
//! - Section/row queries with fixed or per-object variable row counts
//! - Cell-index queries against a single implicit section
//! - Typed results (`i32`, `f64`, `String`), raw formulas or runtime-selected
//!   value types
//! - Batched formula and result writes
//! - Prebuilt custom property and hyperlink queries
//! - Connector direction analysis from line arrows
//! - An in-memory host for tests and offline use
//!
//! ## Example
//!
//! ```rust
//! use shapesheet::prelude::*;
//! use shapesheet::memory::MemoryDocument;
//!
//! let doc = MemoryDocument::new();
//! let surface = Surface::page(&doc);
//!
//! let mut batch = UpdateBatch::new();
//! batch.set_result(10, src::WIDTH, 2.0);
//! batch.set_result(20, src::WIDTH, 4.0);
//! batch.execute(&surface).unwrap();
//!
//! let mut query = CellQuery::new();
//! let width = query
//!     .add_section(SectionIndex::OBJECT, RowMode::Fixed)
//!     .unwrap()
//!     .add_named(src::WIDTH, "Width")
//!     .unwrap();
//!
//! let table = query.execute::<f64>(&surface, &[10, 20]).unwrap();
//! let widths: Vec<f64> = table.iter().map(|o| o.cells().unwrap()[&width]).collect();
//! assert_eq!(widths, vec![2.0, 4.0]);
//! ```

pub mod connections;
pub mod executor;
pub mod memory;
pub mod prelude;
pub mod queries;
pub mod surface;
pub mod table;
pub mod update;

pub use executor::{CellQueryExt, ExecuteOptions};
pub use surface::{Surface, TargetKind};
pub use table::{ObjectResult, ResultTable, Row, SectionResult};
pub use update::{CellWrite, UpdateBatch, UpdateSummary};

// Re-export core types
pub use shapesheet_core::{
    src, Address, AddressKind, AddressStream, CellIndex, CellQuery, CellResult, CellValue,
    CellValueType, Column, ColumnList, ConfigError, Error, ObjectId, Result, RowMode,
    SectionIndex, SectionQuery, SectionQueryList, SetFlags, SheetAddress, SheetTarget, Src,
    StreamEntry, UnitCode,
};
