//! Batched query execution
//!
//! Turns a [`CellQuery`] and a list of object ids into one flat address
//! stream, fetches it from a [`Surface`] in a single round trip, and reshapes
//! the flat values back into a [`ResultTable`].
//!
//! Variable-row sections need each object's row count before the stream can
//! be laid out, so they cost one small row-count probe per object and
//! section. All cell values still travel in one bulk call.
//!
//! # Example
//!
//! ```rust
//! use shapesheet::prelude::*;
//! use shapesheet::memory::MemoryDocument;
//!
//! let doc = MemoryDocument::new();
//! doc.set_result(10, src::PIN_X, 1.0);
//! doc.set_result(10, src::PIN_Y, 3.0);
//!
//! let mut query = CellQuery::new();
//! let object = query.add_section(SectionIndex::OBJECT, RowMode::Fixed).unwrap();
//! let pin_x = object.add_named(src::PIN_X, "PinX").unwrap();
//!
//! let table = query.execute::<f64>(&Surface::page(&doc), &[10]).unwrap();
//! assert_eq!(table[0].cells().unwrap()[&pin_x], 1.0);
//! ```

use crate::surface::Surface;
use crate::table::{ObjectResult, ResultTable, Row, SectionResult};
use shapesheet_core::{
    AddressStream, CellQuery, CellResult, CellValue, CellValueType, Error, ObjectId, Result,
    RowMode, StreamEntry, UnitCode,
};

/// Options for query execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Unit applied to every requested cell. `None` reads in host internal
    /// units. Ignored for formula reads.
    pub unit: Option<UnitCode>,
}

impl ExecuteOptions {
    /// Read every cell in the given unit
    pub fn with_unit(unit: UnitCode) -> Self {
        Self { unit: Some(unit) }
    }
}

/// Extension trait for [`CellQuery`] to run it against a surface
pub trait CellQueryExt {
    /// Read typed results for every object, in host internal units
    fn execute<T: CellResult>(
        &self,
        surface: &Surface<'_>,
        object_ids: &[ObjectId],
    ) -> Result<ResultTable<T>>;

    /// Read typed results with custom options
    fn execute_with_options<T: CellResult>(
        &self,
        surface: &Surface<'_>,
        object_ids: &[ObjectId],
        options: &ExecuteOptions,
    ) -> Result<ResultTable<T>>;

    /// Read raw formula text for every object
    fn execute_formulas(
        &self,
        surface: &Surface<'_>,
        object_ids: &[ObjectId],
    ) -> Result<ResultTable<String>>;

    /// Read results of a type chosen at runtime
    fn execute_values(
        &self,
        surface: &Surface<'_>,
        object_ids: &[ObjectId],
        value_type: CellValueType,
        options: &ExecuteOptions,
    ) -> Result<ResultTable<CellValue>>;
}

impl CellQueryExt for CellQuery {
    fn execute<T: CellResult>(
        &self,
        surface: &Surface<'_>,
        object_ids: &[ObjectId],
    ) -> Result<ResultTable<T>> {
        self.execute_with_options(surface, object_ids, &ExecuteOptions::default())
    }

    fn execute_with_options<T: CellResult>(
        &self,
        surface: &Surface<'_>,
        object_ids: &[ObjectId],
        options: &ExecuteOptions,
    ) -> Result<ResultTable<T>> {
        run(self, surface, object_ids, T::VALUE_TYPE, |stream| {
            surface.get_results::<T>(stream, &units_for(stream, options))
        })
    }

    fn execute_formulas(
        &self,
        surface: &Surface<'_>,
        object_ids: &[ObjectId],
    ) -> Result<ResultTable<String>> {
        run(self, surface, object_ids, CellValueType::Text, |stream| {
            surface.get_formulas(stream)
        })
    }

    fn execute_values(
        &self,
        surface: &Surface<'_>,
        object_ids: &[ObjectId],
        value_type: CellValueType,
        options: &ExecuteOptions,
    ) -> Result<ResultTable<CellValue>> {
        run(self, surface, object_ids, value_type, |stream| {
            surface.get_values(stream, value_type, &units_for(stream, options))
        })
    }
}

fn units_for(stream: &AddressStream, options: &ExecuteOptions) -> Vec<UnitCode> {
    match options.unit {
        Some(unit) => vec![unit; stream.len()],
        None => Vec::new(),
    }
}

fn run<T, F>(
    query: &CellQuery,
    surface: &Surface<'_>,
    object_ids: &[ObjectId],
    value_type: CellValueType,
    fetch: F,
) -> Result<ResultTable<T>>
where
    F: FnOnce(&AddressStream) -> Result<Vec<T>>,
{
    if object_ids.is_empty() {
        return Ok(ResultTable::default());
    }

    let plan = QueryPlan::build(query, surface, object_ids)?;
    tracing::debug!(
        target_kind = %surface.kind(),
        objects = object_ids.len(),
        cells = plan.stream.len(),
        value_type = %value_type,
        "executing cell query"
    );

    let values = fetch(&plan.stream)?;
    plan.reshape(values)
}

/// Layout of one section on one object in the flat stream
#[derive(Debug, Clone, Copy)]
struct SectionSlot {
    section: Option<shapesheet_core::SectionIndex>,
    columns: usize,
    rows: usize,
}

/// The flat stream plus the bookkeeping needed to undo the flattening
struct QueryPlan {
    stream: AddressStream,
    objects: Vec<(ObjectId, Vec<SectionSlot>)>,
}

impl QueryPlan {
    fn build(query: &CellQuery, surface: &Surface<'_>, object_ids: &[ObjectId]) -> Result<Self> {
        if let Some(columns) = query.cells() {
            let entries = object_ids.iter().flat_map(|&id| {
                columns
                    .iter()
                    .map(move |col| StreamEntry::new(id, col.address()))
            });
            let slot = SectionSlot {
                section: None,
                columns: columns.len(),
                rows: 1,
            };
            return Ok(Self {
                stream: AddressStream::new(entries),
                objects: object_ids.iter().map(|&id| (id, vec![slot])).collect(),
            });
        }

        let Some(sections) = query.sections() else {
            // Nothing added yet: every object gets an empty entry
            return Ok(Self {
                stream: AddressStream::empty(shapesheet_core::AddressKind::Src),
                objects: object_ids.iter().map(|&id| (id, Vec::new())).collect(),
            });
        };

        let mut entries = Vec::new();
        let mut objects = Vec::with_capacity(object_ids.len());

        for &id in object_ids {
            let mut slots = Vec::with_capacity(sections.len());

            for section in sections {
                let columns = section.columns();
                match section.row_mode() {
                    RowMode::Fixed => {
                        entries.extend(columns.iter().map(|c| StreamEntry::new(id, c.address())));
                        slots.push(SectionSlot {
                            section: Some(section.section()),
                            columns: columns.len(),
                            rows: 1,
                        });
                    }
                    RowMode::Variable => {
                        let rows = surface.row_count(id, section.section())?;
                        tracing::trace!(object = id, section = %section.section(), rows, "row count");
                        let max_row = i16::try_from(rows).map_err(|_| {
                            Error::malformed(format!(
                                "object {id} reports {rows} rows in section {}",
                                section.section()
                            ))
                        })?;
                        for row in 0..max_row {
                            entries.extend(
                                columns
                                    .iter()
                                    .map(|c| StreamEntry::new(id, c.address().with_row(row))),
                            );
                        }
                        slots.push(SectionSlot {
                            section: Some(section.section()),
                            columns: columns.len(),
                            rows,
                        });
                    }
                }
            }

            objects.push((id, slots));
        }

        Ok(Self {
            stream: AddressStream::new(entries),
            objects,
        })
    }

    /// Walk the same object/section/row/column order used to build the stream.
    /// The flat values must be consumed exactly.
    fn reshape<T>(self, values: Vec<T>) -> Result<ResultTable<T>> {
        if values.len() != self.stream.len() {
            return Err(Error::malformed(format!(
                "expected {} values, host returned {}",
                self.stream.len(),
                values.len()
            )));
        }

        let mut flat = values.into_iter();
        let mut objects = Vec::with_capacity(self.objects.len());

        for (object_id, slots) in self.objects {
            let mut sections = Vec::with_capacity(slots.len());
            for slot in slots {
                let mut rows = Vec::with_capacity(slot.rows);
                for _ in 0..slot.rows {
                    let row: Vec<T> = flat.by_ref().take(slot.columns).collect();
                    if row.len() != slot.columns {
                        return Err(Error::malformed(format!(
                            "result underrun on object {object_id}"
                        )));
                    }
                    rows.push(Row::new(row));
                }
                sections.push(SectionResult {
                    section: slot.section,
                    columns: slot.columns,
                    rows,
                });
            }
            objects.push(ObjectResult {
                object_id,
                sections,
            });
        }

        if flat.next().is_some() {
            return Err(Error::malformed("values left over after reshaping"));
        }

        Ok(ResultTable::new(objects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use pretty_assertions::assert_eq;
    use shapesheet_core::{src, Address, CellIndex, SectionIndex, Src};

    #[test]
    fn test_reshape_rejects_underrun_and_leftovers() {
        let doc = MemoryDocument::new();
        let mut query = CellQuery::new();
        query
            .add_section(SectionIndex::OBJECT, RowMode::Fixed)
            .unwrap()
            .add(src::PIN_X)
            .unwrap();

        let plan = QueryPlan::build(&query, &Surface::page(&doc), &[1, 2]).unwrap();
        assert!(matches!(
            plan.reshape(vec![1.0]),
            Err(Error::MalformedResult(_))
        ));

        let plan = QueryPlan::build(&query, &Surface::page(&doc), &[1, 2]).unwrap();
        assert!(matches!(
            plan.reshape(vec![1.0, 2.0, 3.0]),
            Err(Error::MalformedResult(_))
        ));
    }

    #[test]
    fn test_stream_layout_is_row_major() {
        let doc = MemoryDocument::new();
        doc.set_row_count(7, SectionIndex::PROPERTIES, 2);

        let mut query = CellQuery::new();
        let props = query
            .add_section(SectionIndex::PROPERTIES, RowMode::Variable)
            .unwrap();
        props.add(src::PROP_VALUE).unwrap();
        props.add(src::PROP_LABEL).unwrap();

        let plan = QueryPlan::build(&query, &Surface::shape(&doc), &[7]).unwrap();
        let addresses: Vec<_> = plan.stream.iter().map(|e| e.address).collect();
        assert_eq!(
            addresses,
            vec![
                Address::Src(Src::new(243, 0, 0)),
                Address::Src(Src::new(243, 0, 2)),
                Address::Src(Src::new(243, 1, 0)),
                Address::Src(Src::new(243, 1, 2)),
            ]
        );
    }

    #[test]
    fn test_cell_index_layout() {
        let doc = MemoryDocument::new();
        let mut query = CellQuery::new();
        query.add_cell(CellIndex(3)).unwrap();
        query.add_cell(CellIndex(9)).unwrap();

        let plan = QueryPlan::build(&query, &Surface::page(&doc), &[1, 2]).unwrap();
        assert_eq!(plan.stream.to_shorts(), vec![1, 3, 1, 9, 2, 3, 2, 9]);
        assert_eq!(doc.round_trips(), 0);
    }

    #[test]
    fn test_units_follow_stream_length() {
        let stream = AddressStream::new(vec![
            StreamEntry::new(1, src::WIDTH),
            StreamEntry::new(1, src::HEIGHT),
        ]);
        assert!(units_for(&stream, &ExecuteOptions::default()).is_empty());
        assert_eq!(
            units_for(&stream, &ExecuteOptions::with_unit(UnitCode::INCHES)),
            vec![UnitCode::INCHES; 2]
        );
    }
}
