//! Batched writes
//!
//! An [`UpdateBatch`] accumulates formula and result writes from any number
//! of call sites and applies them to a [`Surface`] in exactly one host call.
//! Writes are grouped per object in the order objects were first seen;
//! insertion order is kept within an object.
//!
//! A batch of formulas only is sent with `set_formulas`. Anything else goes
//! through `set_results`; when formulas are mixed in, the call carries
//! [`SetFlags::RESULTS_AS_FORMULAS`], formulas travel as text and text
//! results are quoted so the host reads them back as literals.

use crate::surface::Surface;
use ahash::AHashMap;
use shapesheet_core::{
    AddressStream, CellValue, ObjectId, Result, SetFlags, SheetAddress, StreamEntry, UnitCode,
};

/// A single pending write
#[derive(Debug, Clone, PartialEq)]
pub enum CellWrite {
    /// Formula text
    Formula(String),
    /// Typed result in the given unit
    Result { value: CellValue, unit: UnitCode },
}

impl CellWrite {
    pub fn formula(text: impl Into<String>) -> Self {
        CellWrite::Formula(text.into())
    }

    /// A result in [`UnitCode::NUMBER`] (host internal units)
    pub fn result(value: impl Into<CellValue>) -> Self {
        CellWrite::Result {
            value: value.into(),
            unit: UnitCode::NUMBER,
        }
    }

    fn is_formula(&self) -> bool {
        matches!(self, CellWrite::Formula(_))
    }

    /// Value and unit for a `set_results` call that carries formulas too
    fn as_mixed_result(&self) -> (CellValue, UnitCode) {
        match self {
            CellWrite::Formula(text) => (CellValue::Text(text.clone()), UnitCode::NUMBER),
            CellWrite::Result {
                value: CellValue::Text(text),
                unit,
            } => (CellValue::Text(quote_text(text)), *unit),
            CellWrite::Result { value, unit } => (value.clone(), *unit),
        }
    }
}

/// Formula literal for a text value
fn quote_text(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Counts for one [`UpdateBatch::execute`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Formula writes sent
    pub formulas: usize,
    /// Result writes sent
    pub results: usize,
    /// Entries the host reported as applied
    pub applied: usize,
}

impl UpdateSummary {
    pub fn requested(&self) -> usize {
        self.formulas + self.results
    }

    /// True when the host applied every requested entry
    pub fn is_complete(&self) -> bool {
        self.applied == self.requested()
    }
}

/// Writes grouped per object, in first-seen object order
#[derive(Debug, Clone)]
struct Pending<A> {
    order: Vec<ObjectId>,
    by_object: AHashMap<ObjectId, Vec<(A, CellWrite)>>,
    formulas: usize,
    results: usize,
}

impl<A> Default for Pending<A> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            by_object: AHashMap::new(),
            formulas: 0,
            results: 0,
        }
    }
}

impl<A: SheetAddress> Pending<A> {
    fn push(&mut self, object_id: ObjectId, address: A, write: CellWrite) {
        if write.is_formula() {
            self.formulas += 1;
        } else {
            self.results += 1;
        }
        let writes = self.by_object.entry(object_id).or_insert_with(|| {
            self.order.push(object_id);
            Vec::new()
        });
        writes.push((address, write));
    }

    fn len(&self) -> usize {
        self.formulas + self.results
    }

    fn iter(&self) -> impl Iterator<Item = (ObjectId, &A, &CellWrite)> + '_ {
        self.order.iter().flat_map(move |id| {
            self.by_object
                .get(id)
                .into_iter()
                .flatten()
                .map(move |(a, w)| (*id, a, w))
        })
    }

    fn stream(&self) -> AddressStream {
        AddressStream::new(self.iter().map(|(id, a, _)| StreamEntry::new(id, *a)))
    }

    fn clear(&mut self) {
        self.order.clear();
        self.by_object.clear();
        self.formulas = 0;
        self.results = 0;
    }
}

/// Accumulates writes and applies them in one batched call.
///
/// Generic over the addressing form so a batch never mixes section/row and
/// cell-index addresses.
#[derive(Debug, Clone)]
pub struct UpdateBatch<A> {
    flags: SetFlags,
    pending: Pending<A>,
}

impl<A: SheetAddress> Default for UpdateBatch<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: SheetAddress> UpdateBatch<A> {
    /// Create an empty batch with default flags
    pub fn new() -> Self {
        Self::with_flags(SetFlags::empty())
    }

    /// Create an empty batch passing `flags` on every set call
    pub fn with_flags(flags: SetFlags) -> Self {
        Self {
            flags,
            pending: Pending::default(),
        }
    }

    pub fn flags(&self) -> SetFlags {
        self.flags
    }

    /// Queue one write
    pub fn add(&mut self, object_id: ObjectId, address: A, write: CellWrite) {
        self.pending.push(object_id, address, write);
    }

    /// Queue a formula write
    pub fn set_formula(&mut self, object_id: ObjectId, address: A, formula: impl Into<String>) {
        self.add(object_id, address, CellWrite::Formula(formula.into()));
    }

    /// Queue a result write in host internal units
    pub fn set_result(&mut self, object_id: ObjectId, address: A, value: impl Into<CellValue>) {
        self.set_result_in(object_id, address, value, UnitCode::NUMBER);
    }

    /// Queue a result write in a specific unit
    pub fn set_result_in(
        &mut self,
        object_id: ObjectId,
        address: A,
        value: impl Into<CellValue>,
        unit: UnitCode,
    ) {
        let write = CellWrite::Result {
            value: value.into(),
            unit,
        };
        self.add(object_id, address, write);
    }

    /// Number of pending writes
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pending writes in the order they will be sent
    pub fn pending(&self) -> Vec<(ObjectId, A, CellWrite)> {
        self.pending
            .iter()
            .map(|(id, a, w)| (id, *a, w.clone()))
            .collect()
    }

    /// Drop all pending writes
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Apply all pending writes to `surface` with a single host call.
    ///
    /// The batch is cleared only if the call succeeds. On failure it is left
    /// intact and the host error is returned unchanged.
    pub fn execute(&mut self, surface: &Surface<'_>) -> Result<UpdateSummary> {
        let mut summary = UpdateSummary {
            formulas: self.pending.formulas,
            results: self.pending.results,
            applied: 0,
        };
        if self.is_empty() {
            return Ok(summary);
        }

        let stream = self.pending.stream();
        summary.applied = if summary.results == 0 {
            let formulas: Vec<String> = self
                .pending
                .iter()
                .filter_map(|(_, _, w)| match w {
                    CellWrite::Formula(text) => Some(text.clone()),
                    CellWrite::Result { .. } => None,
                })
                .collect();
            surface.set_formulas(&stream, &formulas, self.flags)?
        } else {
            let mixed = summary.formulas > 0;
            let (values, units): (Vec<CellValue>, Vec<UnitCode>) = self
                .pending
                .iter()
                .map(|(_, _, w)| match w {
                    CellWrite::Result { value, unit } if !mixed => (value.clone(), *unit),
                    _ => w.as_mixed_result(),
                })
                .unzip();
            let flags = if mixed {
                self.flags | SetFlags::RESULTS_AS_FORMULAS
            } else {
                self.flags
            };
            surface.set_results(&stream, &units, &values, flags)?
        };

        tracing::debug!(
            target_kind = %surface.kind(),
            formulas = summary.formulas,
            results = summary.results,
            applied = summary.applied,
            "applied update batch"
        );
        if !summary.is_complete() {
            tracing::warn!(
                requested = summary.requested(),
                applied = summary.applied,
                "host applied fewer entries than requested"
            );
        }

        self.clear();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use pretty_assertions::assert_eq;
    use shapesheet_core::{src, CellIndex, CellValueType, Error, SectionIndex, SheetTarget, Src};

    #[test]
    fn test_groups_writes_per_object() {
        let mut batch = UpdateBatch::<Src>::new();
        batch.set_formula(2, src::PIN_X, "1");
        batch.set_formula(1, src::PIN_X, "2");
        batch.set_formula(2, src::PIN_Y, "3");

        let stream = batch.pending.stream();
        assert_eq!(stream.to_shorts(), vec![2, 1, 1, 0, 2, 1, 1, 1, 1, 1, 1, 0]);

        let formulas: Vec<_> = batch
            .pending()
            .into_iter()
            .map(|(_, _, w)| w)
            .collect();
        assert_eq!(
            formulas,
            vec![
                CellWrite::formula("1"),
                CellWrite::formula("3"),
                CellWrite::formula("2")
            ]
        );
    }

    #[test]
    fn test_empty_batch_makes_no_calls() {
        let doc = MemoryDocument::new();
        let mut batch = UpdateBatch::<CellIndex>::new();
        let summary = batch.execute(&Surface::page(&doc)).unwrap();
        assert_eq!(summary, UpdateSummary::default());
        assert_eq!(doc.round_trips(), 0);
    }

    #[test]
    fn test_mixed_batch_is_one_call() {
        let doc = MemoryDocument::new();
        let mut batch = UpdateBatch::new();
        batch.add(1, src::WIDTH, CellWrite::formula("2 in"));
        batch.add(1, src::HEIGHT, CellWrite::result(4.0));
        batch.set_result(1, src::PIN_X, "say \"hi\"");
        assert_eq!(batch.len(), 3);

        let summary = batch.execute(&Surface::shape(&doc)).unwrap();
        assert!(summary.is_complete());
        assert_eq!(summary.formulas, 1);
        assert_eq!(summary.results, 2);
        assert!(batch.is_empty());
        assert_eq!(doc.round_trips(), 1);

        assert_eq!(doc.formula(1, src::WIDTH).as_deref(), Some("2 in"));
        assert_eq!(doc.value(1, src::WIDTH), Some(CellValue::Float(2.0)));
        assert_eq!(doc.value(1, src::HEIGHT), Some(CellValue::Float(4.0)));
        assert_eq!(
            doc.value(1, src::PIN_X),
            Some(CellValue::Text("say \"hi\"".into()))
        );
    }

    #[test]
    fn test_execute_keeps_batch_on_failure() {
        let doc = MemoryDocument::new();
        doc.fail_next_call("host went away");

        let mut batch = UpdateBatch::new();
        batch.set_result(1, src::PIN_X, 1.0);
        let err = batch.execute(&Surface::page(&doc)).unwrap_err();
        assert!(matches!(err, Error::Host(_)));
        assert_eq!(batch.len(), 1);

        // Retry succeeds with the same pending writes
        let summary = batch.execute(&Surface::page(&doc)).unwrap();
        assert_eq!(summary.applied, 1);
        assert!(batch.is_empty());
    }

    /// Accepts formula writes, refuses result writes
    struct BusyResults(MemoryDocument);

    impl SheetTarget for BusyResults {
        fn get_results(
            &self,
            stream: &AddressStream,
            value_type: CellValueType,
            units: &[UnitCode],
        ) -> Result<Vec<CellValue>> {
            self.0.get_results(stream, value_type, units)
        }

        fn get_formulas(&self, stream: &AddressStream) -> Result<Vec<String>> {
            self.0.get_formulas(stream)
        }

        fn set_results(
            &self,
            _stream: &AddressStream,
            _units: &[UnitCode],
            _values: &[CellValue],
            _flags: SetFlags,
        ) -> Result<usize> {
            Err(Error::host("busy"))
        }

        fn set_formulas(
            &self,
            stream: &AddressStream,
            formulas: &[String],
            flags: SetFlags,
        ) -> Result<usize> {
            self.0.set_formulas(stream, formulas, flags)
        }

        fn row_count(&self, object_id: ObjectId, section: SectionIndex) -> Result<usize> {
            self.0.row_count(object_id, section)
        }
    }

    #[test]
    fn test_failed_mixed_batch_leaves_host_untouched() {
        let host = BusyResults(MemoryDocument::new());
        let mut batch = UpdateBatch::new();
        batch.set_formula(1, src::WIDTH, "5");
        batch.set_result(1, src::HEIGHT, 2.0);

        let err = batch.execute(&Surface::shape(&host)).unwrap_err();
        assert!(matches!(err, Error::Host(_)));
        assert_eq!(batch.len(), 2);
        assert_eq!(host.0.formula(1, src::WIDTH), None);
        assert_eq!(host.0.value(1, src::HEIGHT), None);
    }

    #[test]
    fn test_formula_only_batch_uses_formula_call() {
        let host = BusyResults(MemoryDocument::new());
        let mut batch = UpdateBatch::new();
        batch.set_formula(1, src::WIDTH, "5");

        let summary = batch.execute(&Surface::shape(&host)).unwrap();
        assert_eq!(summary.applied, 1);
        assert_eq!(host.0.formula(1, src::WIDTH).as_deref(), Some("5"));
    }

    #[test]
    fn test_pending_keeps_insertion_order_per_object() {
        let mut batch = UpdateBatch::new();
        batch.set_result_in(3, CellIndex(1), 12.0, UnitCode::POINTS);
        batch.set_formula(4, CellIndex(1), "=2");
        batch.set_formula(3, CellIndex(2), "=1");
        assert_eq!(
            batch.pending(),
            vec![
                (
                    3,
                    CellIndex(1),
                    CellWrite::Result {
                        value: CellValue::Float(12.0),
                        unit: UnitCode::POINTS
                    }
                ),
                (3, CellIndex(2), CellWrite::Formula("=1".into())),
                (4, CellIndex(1), CellWrite::Formula("=2".into())),
            ]
        );
    }
}
