//! Query columns
//!
//! A [`Column`] binds a logical name to one address. Columns live in a
//! [`ColumnList`], which assigns ordinals in insertion order and keeps names
//! unique. The list is generic over its addressing form, so section/row and
//! cell-index columns can never share one list.

use crate::address::SheetAddress;
use crate::error::{ConfigError, Error, Result};
use ahash::AHashMap;

/// A named, ordinal-stable binding from a logical attribute to an address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column<A> {
    ordinal: usize,
    address: A,
    name: String,
}

impl<A: SheetAddress> Column<A> {
    /// Position of this column in its owning list
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn address(&self) -> A {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered, name-indexed collection of columns sharing one addressing form
#[derive(Debug, Clone)]
pub struct ColumnList<A> {
    items: Vec<Column<A>>,
    by_name: AHashMap<String, usize>,
}

impl<A> Default for ColumnList<A> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            by_name: AHashMap::new(),
        }
    }
}

impl<A: SheetAddress> ColumnList<A> {
    /// Create an empty column list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty column list with room for `capacity` columns
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            by_name: AHashMap::with_capacity(capacity),
        }
    }

    /// Add a column with a synthesized name (`Col<ordinal>`)
    pub fn add(&mut self, address: A) -> Result<Column<A>> {
        self.add_named(address, "")
    }

    /// Add a named column.
    ///
    /// An empty name is replaced with `Col<N>`, N being the count before
    /// insertion. Fails if the resolved name is already taken; a failed
    /// insertion does not consume an ordinal.
    pub fn add_named(&mut self, address: A, name: &str) -> Result<Column<A>> {
        let ordinal = self.items.len();
        let name = if name.is_empty() {
            format!("Col{ordinal}")
        } else {
            name.to_string()
        };

        if self.by_name.contains_key(&name) {
            return Err(ConfigError::DuplicateColumn(name).into());
        }

        let column = Column {
            ordinal,
            address,
            name: name.clone(),
        };
        self.items.push(column.clone());
        self.by_name.insert(name, ordinal);
        Ok(column)
    }

    /// Look up a column by name
    pub fn lookup(&self, name: &str) -> Result<&Column<A>> {
        self.by_name
            .get(name)
            .map(|&ordinal| &self.items[ordinal])
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Check if a column name exists
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Get a column by ordinal
    pub fn get(&self, ordinal: usize) -> Option<&Column<A>> {
        self.items.get(ordinal)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over columns in ordinal order
    pub fn iter(&self) -> std::slice::Iter<'_, Column<A>> {
        self.items.iter()
    }

    /// Column names in ordinal order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|c| c.name())
    }
}

impl<'a, A> IntoIterator for &'a ColumnList<A> {
    type Item = &'a Column<A>;
    type IntoIter = std::slice::Iter<'a, Column<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
