//! Section queries
//!
//! A [`SectionQuery`] groups section/row addressed columns that all live in
//! one sheet section. Fixed sections read exactly one row per object, using
//! each column's own row. Variable sections learn their row count per object
//! at execution time and read every row.

use crate::address::{SectionIndex, Src};
use crate::column::{Column, ColumnList};
use crate::error::{ConfigError, Error, Result};
use ahash::AHashMap;

/// How many rows a section query reads per object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowMode {
    /// Exactly one row, addressed by each column's own row
    Fixed,
    /// Every row the host reports for the section
    Variable,
}

/// A group of columns scoped to one section
#[derive(Debug, Clone)]
pub struct SectionQuery {
    ordinal: usize,
    section: SectionIndex,
    rows: RowMode,
    columns: ColumnList<Src>,
}

impl SectionQuery {
    fn new(ordinal: usize, section: SectionIndex, rows: RowMode) -> Self {
        Self {
            ordinal,
            section,
            rows,
            columns: ColumnList::new(),
        }
    }

    /// Add a column with a synthesized name
    pub fn add(&mut self, src: Src) -> Result<Column<Src>> {
        self.add_named(src, "")
    }

    /// Add a named column. The address must belong to this section.
    pub fn add_named(&mut self, src: Src, name: &str) -> Result<Column<Src>> {
        if src.section_index() != self.section {
            return Err(ConfigError::SectionMismatch {
                section: self.section,
                column: src.section_index(),
            }
            .into());
        }
        self.columns.add_named(src, name)
    }

    /// Position of this section in its query
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn section(&self) -> SectionIndex {
        self.section
    }

    pub fn row_mode(&self) -> RowMode {
        self.rows
    }

    pub fn columns(&self) -> &ColumnList<Src> {
        &self.columns
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&Column<Src>> {
        self.columns.lookup(name)
    }
}

/// The sections of one query, keyed by section index
#[derive(Debug, Clone, Default)]
pub struct SectionQueryList {
    items: Vec<SectionQuery>,
    by_section: AHashMap<SectionIndex, usize>,
}

impl SectionQueryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section. Fails if the section was already added.
    pub fn add(&mut self, section: SectionIndex, rows: RowMode) -> Result<&mut SectionQuery> {
        if self.by_section.contains_key(&section) {
            return Err(ConfigError::DuplicateSection(section).into());
        }

        let ordinal = self.items.len();
        self.items.push(SectionQuery::new(ordinal, section, rows));
        self.by_section.insert(section, ordinal);
        Ok(&mut self.items[ordinal])
    }

    /// Look up a section query
    pub fn get(&self, section: SectionIndex) -> Result<&SectionQuery> {
        self.by_section
            .get(&section)
            .map(|&ordinal| &self.items[ordinal])
            .ok_or(Error::SectionNotFound(section))
    }

    /// Look up a section query for adding columns
    pub fn get_mut(&mut self, section: SectionIndex) -> Result<&mut SectionQuery> {
        match self.by_section.get(&section) {
            Some(&ordinal) => Ok(&mut self.items[ordinal]),
            None => Err(Error::SectionNotFound(section)),
        }
    }

    pub fn contains(&self, section: SectionIndex) -> bool {
        self.by_section.contains_key(&section)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over sections in ordinal order
    pub fn iter(&self) -> std::slice::Iter<'_, SectionQuery> {
        self.items.iter()
    }

    /// Total number of columns across all sections
    pub fn column_count(&self) -> usize {
        self.items.iter().map(|s| s.columns.len()).sum()
    }
}

impl<'a> IntoIterator for &'a SectionQueryList {
    type Item = &'a SectionQuery;
    type IntoIter = std::slice::Iter<'a, SectionQuery>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
