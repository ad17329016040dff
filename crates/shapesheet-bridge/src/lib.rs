//! Client library for driving a diagramming host's ShapeSheet through a bridge
//! process.
//!
//! This crate spawns a Windows `.exe` (under WINE on Linux) that automates the
//! host through COM, communicating over JSON-over-stdio. Pages, shapes and
//! masters of an open document are exposed as [`RemoteSheet`]s, which
//! implement [`SheetTarget`](shapesheet_core::SheetTarget) so they can stand
//! behind any `shapesheet::Surface`.
//!
//! # Architecture
//!
//! ```text
//! Your Rust code
//!     └── ShapeSheetBridge (this crate)
//!           └── spawns: [wine] shapesheet-bridge-host.exe
//!                 └── COM: host application
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use shapesheet::prelude::*;
//! use shapesheet_bridge::{linux_to_wine_path, BridgeConfig, ShapeSheetBridge};
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let bridge = ShapeSheetBridge::start(BridgeConfig::default())?;
//!     let doc = bridge.open_document(&linux_to_wine_path("plan.vsdx".as_ref()))?;
//!     let page = doc.page(1);
//!
//!     let mut query = CellQuery::new();
//!     let width = query
//!         .add_section(SectionIndex::OBJECT, RowMode::Fixed)?
//!         .add(src::WIDTH)?;
//!     let table = query.execute::<f64>(&Surface::page(&page), &[1, 2, 3])?;
//!     for object in &table {
//!         println!("{}: {}", object.object_id, object.cells().unwrap()[&width]);
//!     }
//!
//!     doc.close()?;
//!     bridge.shutdown()?;
//!     Ok(())
//! }
//! ```

mod bridge;
mod document;

pub use bridge::{linux_to_wine_path, BridgeConfig, BridgeError, ShapeSheetBridge};
pub use document::{Document, RemoteSheet};
pub use shapesheet_protocol::TargetRef;
