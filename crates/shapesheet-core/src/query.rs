//! The root query object

use crate::address::{AddressKind, CellIndex, SectionIndex};
use crate::column::{Column, ColumnList};
use crate::error::{ConfigError, Result};
use crate::section::{RowMode, SectionQuery, SectionQueryList};

#[derive(Debug, Clone, Default)]
enum Layout {
    #[default]
    Empty,
    Cells(ColumnList<CellIndex>),
    Sections(SectionQueryList),
}

/// A declarative description of which cells to fetch or set.
///
/// A query is either cell-index addressed (a flat [`ColumnList<CellIndex>`])
/// or section/row addressed (a [`SectionQueryList`]). The first column or
/// section added fixes the style; adding the other style afterwards fails
/// with [`ConfigError::MixedAddressing`].
///
/// Queries are built once and reused across any number of executions.
#[derive(Debug, Clone, Default)]
pub struct CellQuery {
    layout: Layout,
}

impl CellQuery {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell-index column with a synthesized name
    pub fn add_cell(&mut self, cell: CellIndex) -> Result<Column<CellIndex>> {
        self.add_cell_named(cell, "")
    }

    /// Add a named cell-index column
    pub fn add_cell_named(&mut self, cell: CellIndex, name: &str) -> Result<Column<CellIndex>> {
        if let Layout::Empty = self.layout {
            self.layout = Layout::Cells(ColumnList::new());
        }
        match &mut self.layout {
            Layout::Cells(columns) => columns.add_named(cell, name),
            _ => Err(ConfigError::MixedAddressing {
                existing: AddressKind::Src,
                attempted: AddressKind::CellIndex,
            }
            .into()),
        }
    }

    /// Add a section query. Fails on a duplicate section or when the query
    /// already holds cell-index columns.
    pub fn add_section(
        &mut self,
        section: SectionIndex,
        rows: RowMode,
    ) -> Result<&mut SectionQuery> {
        if let Layout::Empty = self.layout {
            self.layout = Layout::Sections(SectionQueryList::new());
        }
        match &mut self.layout {
            Layout::Sections(sections) => sections.add(section, rows),
            _ => Err(ConfigError::MixedAddressing {
                existing: AddressKind::CellIndex,
                attempted: AddressKind::Src,
            }
            .into()),
        }
    }

    /// Look up a section query
    pub fn section(&self, section: SectionIndex) -> Result<&SectionQuery> {
        match &self.layout {
            Layout::Sections(sections) => sections.get(section),
            _ => Err(crate::Error::SectionNotFound(section)),
        }
    }

    /// Look up a section query for adding columns
    pub fn section_mut(&mut self, section: SectionIndex) -> Result<&mut SectionQuery> {
        match &mut self.layout {
            Layout::Sections(sections) => sections.get_mut(section),
            _ => Err(crate::Error::SectionNotFound(section)),
        }
    }

    /// Look up a cell-index column by name
    pub fn cell(&self, name: &str) -> Result<&Column<CellIndex>> {
        match &self.layout {
            Layout::Cells(columns) => columns.lookup(name),
            _ => Err(crate::Error::ColumnNotFound(name.to_string())),
        }
    }

    /// Cell-index columns, if this is a cell-index query
    pub fn cells(&self) -> Option<&ColumnList<CellIndex>> {
        match &self.layout {
            Layout::Cells(columns) => Some(columns),
            _ => None,
        }
    }

    /// Section queries, if this is a section/row query
    pub fn sections(&self) -> Option<&SectionQueryList> {
        match &self.layout {
            Layout::Sections(sections) => Some(sections),
            _ => None,
        }
    }

    /// The addressing style, once the first column or section is added
    pub fn style(&self) -> Option<AddressKind> {
        match &self.layout {
            Layout::Empty => None,
            Layout::Cells(_) => Some(AddressKind::CellIndex),
            Layout::Sections(_) => Some(AddressKind::Src),
        }
    }

    /// Number of columns, summed across sections
    pub fn column_count(&self) -> usize {
        match &self.layout {
            Layout::Empty => 0,
            Layout::Cells(columns) => columns.len(),
            Layout::Sections(sections) => sections.column_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.column_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::src;
    use proptest::prelude::*;

    #[test]
    fn test_cell_query() {
        let mut query = CellQuery::new();
        assert_eq!(query.style(), None);

        let a = query.add_cell_named(CellIndex(2), "Scale").unwrap();
        let b = query.add_cell(CellIndex(3)).unwrap();
        assert_eq!(a.ordinal(), 0);
        assert_eq!(b.name(), "Col1");
        assert_eq!(query.style(), Some(AddressKind::CellIndex));
        assert_eq!(query.column_count(), 2);
        assert_eq!(query.cell("Scale").unwrap().address(), CellIndex(2));
        assert!(query.sections().is_none());
    }

    #[test]
    fn test_section_query() {
        let mut query = CellQuery::new();
        let object = query
            .add_section(SectionIndex::OBJECT, RowMode::Fixed)
            .unwrap();
        object.add_named(src::PIN_X, "PinX").unwrap();
        object.add_named(src::PIN_Y, "PinY").unwrap();

        query
            .add_section(SectionIndex::PROPERTIES, RowMode::Variable)
            .unwrap()
            .add_named(src::PROP_VALUE, "Value")
            .unwrap();

        assert_eq!(query.style(), Some(AddressKind::Src));
        assert_eq!(query.column_count(), 3);
        assert_eq!(
            query.section(SectionIndex::PROPERTIES).unwrap().ordinal(),
            1
        );
        assert!(query.cells().is_none());
        assert!(query.cell("PinX").is_err());
    }

    #[test]
    fn test_mixing_styles_fails() {
        let mut query = CellQuery::new();
        query.add_cell(CellIndex(1)).unwrap();
        let err = query
            .add_section(SectionIndex::OBJECT, RowMode::Fixed)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigError::MixedAddressing {
                existing: AddressKind::CellIndex,
                attempted: AddressKind::Src,
            })
        ));

        let mut query = CellQuery::new();
        query
            .add_section(SectionIndex::OBJECT, RowMode::Fixed)
            .unwrap();
        assert!(query.add_cell(CellIndex(1)).unwrap_err().is_configuration());
    }

    #[test]
    fn test_section_lookup_on_cell_query() {
        let mut query = CellQuery::new();
        query.add_cell(CellIndex(0)).unwrap();
        assert!(query.section(SectionIndex::OBJECT).unwrap_err().is_not_found());
        assert!(query
            .section_mut(SectionIndex::OBJECT)
            .unwrap_err()
            .is_not_found());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Cell,
        Section(i16),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Cell), (0i16..4).prop_map(Op::Section)]
    }

    proptest! {
        /// Whatever style is used first, every later operation of the other
        /// style fails with a configuration error.
        #[test]
        fn prop_mixed_addressing_always_rejected(ops in proptest::collection::vec(op_strategy(), 1..30)) {
            let mut query = CellQuery::new();
            let first_is_cell = matches!(ops[0], Op::Cell);

            for (i, op) in ops.iter().enumerate() {
                match op {
                    Op::Cell => {
                        let result = query.add_cell(CellIndex(i as i16));
                        if first_is_cell {
                            prop_assert!(result.is_ok());
                        } else {
                            prop_assert!(result.unwrap_err().is_configuration());
                        }
                    }
                    Op::Section(s) => {
                        let section = SectionIndex(*s);
                        let existed = query.sections().map(|l| l.contains(section)).unwrap_or(false);
                        let result = query.add_section(section, RowMode::Fixed).map(|_| ());
                        if first_is_cell || existed {
                            prop_assert!(result.unwrap_err().is_configuration());
                        } else {
                            prop_assert!(result.is_ok());
                        }
                    }
                }
            }
        }
    }
}
