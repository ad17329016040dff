//! The capability contract a host binding provides.

use crate::address::{AddressStream, ObjectId, SectionIndex};
use crate::error::Result;
use crate::value::{CellValue, CellValueType, SetFlags, UnitCode};

/// One live sheet-bearing object (a shape, a page or a master) in the host.
///
/// Each method is a single blocking round trip. Implementations return
/// exactly one value per stream entry on reads and the applied count on
/// writes; the engine validates both. Host failures are reported through
/// [`Error::host`](crate::Error::host).
///
/// `units` is either empty (host internal units) or holds one code per
/// stream entry.
pub trait SheetTarget {
    /// Batched typed read
    fn get_results(
        &self,
        stream: &AddressStream,
        value_type: CellValueType,
        units: &[UnitCode],
    ) -> Result<Vec<CellValue>>;

    /// Batched raw formula read
    fn get_formulas(&self, stream: &AddressStream) -> Result<Vec<String>>;

    /// Batched typed write, returns the number of applied entries
    fn set_results(
        &self,
        stream: &AddressStream,
        units: &[UnitCode],
        values: &[CellValue],
        flags: SetFlags,
    ) -> Result<usize>;

    /// Batched formula write, returns the number of applied entries
    fn set_formulas(
        &self,
        stream: &AddressStream,
        formulas: &[String],
        flags: SetFlags,
    ) -> Result<usize>;

    /// Current number of rows in `section` on `object_id`
    fn row_count(&self, object_id: ObjectId, section: SectionIndex) -> Result<usize>;
}
