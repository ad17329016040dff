//! Polymorphic handle over a shape, page or master sheet.

use shapesheet_core::{
    AddressStream, CellResult, CellValue, CellValueType, Error, ObjectId, Result, SectionIndex,
    SetFlags, SheetTarget, UnitCode,
};
use std::fmt;

/// Which kind of host object a [`Surface`] wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Shape,
    Page,
    Master,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Shape => f.write_str("shape"),
            TargetKind::Page => f.write_str("page"),
            TargetKind::Master => f.write_str("master"),
        }
    }
}

/// A handle to exactly one host object that batched reads and writes run
/// against.
///
/// The variant is chosen at construction and never changes. Every call is
/// forwarded to the wrapped [`SheetTarget`], after the checks common to all
/// targets: empty streams never reach the host, and the number of values
/// returned must match the number of addresses sent.
#[derive(Clone, Copy)]
pub enum Surface<'a> {
    Shape(&'a dyn SheetTarget),
    Page(&'a dyn SheetTarget),
    Master(&'a dyn SheetTarget),
}

impl<'a> Surface<'a> {
    pub fn shape(target: &'a dyn SheetTarget) -> Self {
        Surface::Shape(target)
    }

    pub fn page(target: &'a dyn SheetTarget) -> Self {
        Surface::Page(target)
    }

    pub fn master(target: &'a dyn SheetTarget) -> Self {
        Surface::Master(target)
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            Surface::Shape(_) => TargetKind::Shape,
            Surface::Page(_) => TargetKind::Page,
            Surface::Master(_) => TargetKind::Master,
        }
    }

    fn target(&self) -> &'a dyn SheetTarget {
        match *self {
            Surface::Shape(t) | Surface::Page(t) | Surface::Master(t) => t,
        }
    }

    /// Read typed results, one per stream entry
    pub fn get_results<T: CellResult>(
        &self,
        stream: &AddressStream,
        units: &[UnitCode],
    ) -> Result<Vec<T>> {
        self.get_values(stream, T::VALUE_TYPE, units)?
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let tag = value.value_type();
                T::from_value(value).ok_or_else(|| {
                    Error::malformed(format!(
                        "entry {i}: host returned a {tag} value for a {} request",
                        T::VALUE_TYPE
                    ))
                })
            })
            .collect()
    }

    /// Read results of a runtime-selected type, one per stream entry
    pub fn get_values(
        &self,
        stream: &AddressStream,
        value_type: CellValueType,
        units: &[UnitCode],
    ) -> Result<Vec<CellValue>> {
        if stream.is_empty() {
            return Ok(Vec::new());
        }
        check_units(stream, units)?;

        tracing::trace!(
            target_kind = %self.kind(),
            entries = stream.len(),
            value_type = %value_type,
            "get_results"
        );
        let values = self.target().get_results(stream, value_type, units)?;
        check_len(stream, values.len())?;
        Ok(values)
    }

    /// Read raw formula text, one per stream entry
    pub fn get_formulas(&self, stream: &AddressStream) -> Result<Vec<String>> {
        if stream.is_empty() {
            return Ok(Vec::new());
        }

        tracing::trace!(target_kind = %self.kind(), entries = stream.len(), "get_formulas");
        let formulas = self.target().get_formulas(stream)?;
        check_len(stream, formulas.len())?;
        Ok(formulas)
    }

    /// Write typed results; returns the host's applied count
    pub fn set_results(
        &self,
        stream: &AddressStream,
        units: &[UnitCode],
        values: &[CellValue],
        flags: SetFlags,
    ) -> Result<usize> {
        if values.len() != stream.len() {
            return Err(Error::InternalInvariant(format!(
                "{} values for {} addresses",
                values.len(),
                stream.len()
            )));
        }
        if stream.is_empty() {
            return Ok(0);
        }
        check_units(stream, units)?;

        tracing::trace!(target_kind = %self.kind(), entries = stream.len(), "set_results");
        self.target().set_results(stream, units, values, flags)
    }

    /// Write formulas; returns the host's applied count
    pub fn set_formulas(
        &self,
        stream: &AddressStream,
        formulas: &[String],
        flags: SetFlags,
    ) -> Result<usize> {
        if formulas.len() != stream.len() {
            return Err(Error::InternalInvariant(format!(
                "{} formulas for {} addresses",
                formulas.len(),
                stream.len()
            )));
        }
        if stream.is_empty() {
            return Ok(0);
        }

        tracing::trace!(target_kind = %self.kind(), entries = stream.len(), "set_formulas");
        self.target().set_formulas(stream, formulas, flags)
    }

    /// Number of rows the host reports for a section on one object
    pub fn row_count(&self, object_id: ObjectId, section: SectionIndex) -> Result<usize> {
        self.target().row_count(object_id, section)
    }
}

impl fmt::Debug for Surface<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Surface").field(&self.kind()).finish()
    }
}

fn check_len(stream: &AddressStream, actual: usize) -> Result<()> {
    if actual != stream.len() {
        return Err(Error::malformed(format!(
            "requested {} cells, host returned {actual} values",
            stream.len()
        )));
    }
    Ok(())
}

fn check_units(stream: &AddressStream, units: &[UnitCode]) -> Result<()> {
    if !units.is_empty() && units.len() != stream.len() {
        return Err(Error::InternalInvariant(format!(
            "{} unit codes for {} addresses",
            units.len(),
            stream.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use pretty_assertions::assert_eq;
    use shapesheet_core::{src, StreamEntry};

    fn pin_stream() -> AddressStream {
        AddressStream::new(vec![
            StreamEntry::new(1, src::PIN_X),
            StreamEntry::new(1, src::PIN_Y),
        ])
    }

    #[test]
    fn test_kind_is_fixed_by_constructor() {
        let doc = MemoryDocument::new();
        assert_eq!(Surface::shape(&doc).kind(), TargetKind::Shape);
        assert_eq!(Surface::page(&doc).kind(), TargetKind::Page);
        assert_eq!(Surface::master(&doc).kind(), TargetKind::Master);
    }

    #[test]
    fn test_empty_stream_skips_host() {
        let doc = MemoryDocument::new();
        let surface = Surface::page(&doc);
        let empty = AddressStream::empty(shapesheet_core::AddressKind::Src);

        assert!(surface.get_results::<f64>(&empty, &[]).unwrap().is_empty());
        assert!(surface.get_formulas(&empty).unwrap().is_empty());
        assert_eq!(surface.set_formulas(&empty, &[], SetFlags::empty()).unwrap(), 0);
        assert_eq!(doc.round_trips(), 0);
    }

    #[test]
    fn test_typed_read_on_every_variant() {
        let doc = MemoryDocument::new();
        doc.set_result(1, src::PIN_X, 1.5);
        doc.set_result(1, src::PIN_Y, 2.5);

        for surface in [Surface::shape(&doc), Surface::page(&doc), Surface::master(&doc)] {
            let values = surface.get_results::<f64>(&pin_stream(), &[]).unwrap();
            assert_eq!(values, vec![1.5, 2.5]);
        }
        assert_eq!(doc.round_trips(), 3);
    }

    #[test]
    fn test_formulas_are_raw_text() {
        let doc = MemoryDocument::new();
        doc.set_formula(1, src::PIN_X, "Width*0.5");
        doc.set_formula(1, src::PIN_Y, "2 in");

        let formulas = Surface::shape(&doc).get_formulas(&pin_stream()).unwrap();
        assert_eq!(formulas, vec!["Width*0.5".to_string(), "2 in".to_string()]);
    }

    #[test]
    fn test_unit_count_mismatch() {
        let doc = MemoryDocument::new();
        let err = Surface::page(&doc)
            .get_results::<f64>(&pin_stream(), &[UnitCode::INCHES])
            .unwrap_err();
        assert!(matches!(err, Error::InternalInvariant(_)));
        assert_eq!(doc.round_trips(), 0);
    }
}
