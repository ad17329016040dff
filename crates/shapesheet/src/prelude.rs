//! Prelude module - common imports for shapesheet users
//!
//! ```rust
//! use shapesheet::prelude::*;
//! ```

pub use crate::{
    // Addressing
    src,
    CellIndex,
    // Queries
    CellQuery,
    CellQueryExt,
    // Values
    CellValue,
    CellValueType,
    CellWrite,
    Column,
    // Error types
    Error,
    ExecuteOptions,
    ObjectId,
    Result,
    ResultTable,
    RowMode,
    SectionIndex,
    SetFlags,
    SheetTarget,
    Src,
    // Surfaces
    Surface,
    UnitCode,
    // Updates
    UpdateBatch,
};

pub use crate::queries::{
    CellGroupReader, CustomPropertyCellsQuery, HyperlinkCellsQuery, ValueSource,
};
