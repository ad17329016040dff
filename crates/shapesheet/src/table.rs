//! Nested results of a batched query

use shapesheet_core::{Column, ColumnList, Error, ObjectId, Result, SectionIndex, SheetAddress};
use std::ops::Index;

/// One row of values, indexed by column ordinal
#[derive(Debug, Clone, PartialEq)]
pub struct Row<T> {
    values: Vec<T>,
}

impl<T> Row<T> {
    pub(crate) fn new(values: Vec<T>) -> Self {
        Self { values }
    }

    /// Value for a column of the query that produced this row
    pub fn get<A: SheetAddress>(&self, column: &Column<A>) -> Option<&T> {
        self.values.get(column.ordinal())
    }

    /// Value for a column looked up by name in the query's column list
    pub fn get_by_name<A: SheetAddress>(
        &self,
        columns: &ColumnList<A>,
        name: &str,
    ) -> Result<&T> {
        let column = columns.lookup(name)?;
        self.values
            .get(column.ordinal())
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }
}

impl<T> Index<usize> for Row<T> {
    type Output = T;

    fn index(&self, ordinal: usize) -> &T {
        &self.values[ordinal]
    }
}

impl<T, A: SheetAddress> Index<&Column<A>> for Row<T> {
    type Output = T;

    fn index(&self, column: &Column<A>) -> &T {
        &self.values[column.ordinal()]
    }
}

/// The rows read from one section of one object
#[derive(Debug, Clone, PartialEq)]
pub struct SectionResult<T> {
    /// `None` for cell-index queries, which have one implicit section
    pub section: Option<SectionIndex>,
    /// Number of columns in the section query
    pub columns: usize,
    pub rows: Vec<Row<T>>,
}

impl<T> SectionResult<T> {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Everything read from one object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectResult<T> {
    pub object_id: ObjectId,
    /// Sections in query ordinal order
    pub sections: Vec<SectionResult<T>>,
}

impl<T> ObjectResult<T> {
    /// The single row of a cell-index query, or of a fixed first section
    pub fn cells(&self) -> Option<&Row<T>> {
        self.sections.first().and_then(|s| s.rows.first())
    }

    /// Section result by section index
    pub fn section(&self, section: SectionIndex) -> Option<&SectionResult<T>> {
        self.sections.iter().find(|s| s.section == Some(section))
    }

    /// Number of columns, summed across sections
    pub fn column_count(&self) -> usize {
        self.sections.iter().map(|s| s.columns).sum()
    }
}

/// Per-object results of a batched query, in object id order of the request
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable<T> {
    objects: Vec<ObjectResult<T>>,
}

impl<T> Default for ResultTable<T> {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
        }
    }
}

impl<T> ResultTable<T> {
    pub(crate) fn new(objects: Vec<ObjectResult<T>>) -> Self {
        Self { objects }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ObjectResult<T>> {
        self.objects.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObjectResult<T>> {
        self.objects.iter()
    }

    pub fn into_objects(self) -> Vec<ObjectResult<T>> {
        self.objects
    }
}

impl<T> Index<usize> for ResultTable<T> {
    type Output = ObjectResult<T>;

    fn index(&self, index: usize) -> &ObjectResult<T> {
        &self.objects[index]
    }
}

impl<'a, T> IntoIterator for &'a ResultTable<T> {
    type Item = &'a ObjectResult<T>;
    type IntoIter = std::slice::Iter<'a, ObjectResult<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

impl<T> IntoIterator for ResultTable<T> {
    type Item = ObjectResult<T>;
    type IntoIter = std::vec::IntoIter<ObjectResult<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapesheet_core::CellIndex;

    #[test]
    fn test_row_lookup_by_column_and_name() {
        let mut columns = ColumnList::new();
        let a = columns.add_named(CellIndex(1), "A").unwrap();
        let b = columns.add(CellIndex(2)).unwrap();
        let row = Row::new(vec![10, 20]);

        assert_eq!(row[&a], 10);
        assert_eq!(row.get(&b), Some(&20));
        assert_eq!(row.get_by_name(&columns, "Col1").unwrap(), &20);
        assert!(row.get_by_name(&columns, "Z").unwrap_err().is_not_found());
    }

    #[test]
    fn test_object_result_helpers() {
        let object = ObjectResult {
            object_id: 3,
            sections: vec![
                SectionResult {
                    section: Some(SectionIndex::OBJECT),
                    columns: 2,
                    rows: vec![Row::new(vec![1.0, 2.0])],
                },
                SectionResult {
                    section: Some(SectionIndex::USER),
                    columns: 1,
                    rows: vec![],
                },
            ],
        };
        assert_eq!(object.column_count(), 3);
        assert_eq!(object.cells().unwrap().values(), &[1.0, 2.0]);
        assert_eq!(object.section(SectionIndex::USER).unwrap().row_count(), 0);
        assert!(object.section(SectionIndex::PROPERTIES).is_none());

        let table = ResultTable::new(vec![object]);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].object_id, 3);
    }
}
