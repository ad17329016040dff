//! Cell address and address stream types

use crate::error::{Error, Result};
use std::fmt;
use std::hash::Hash;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a shape (or page/master sheet) inside its container.
///
/// Hosts address objects in batched streams with 16-bit ids.
pub type ObjectId = i16;

/// A sheet section (e.g. the object section, custom properties, hyperlinks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SectionIndex(pub i16);

impl SectionIndex {
    /// Single-row cells such as PinX, Width, LineWeight
    pub const OBJECT: SectionIndex = SectionIndex(1);
    pub const CHARACTER: SectionIndex = SectionIndex(3);
    pub const PARAGRAPH: SectionIndex = SectionIndex(4);
    pub const TAB: SectionIndex = SectionIndex(5);
    pub const SCRATCH: SectionIndex = SectionIndex(6);
    pub const CONNECTION_POINTS: SectionIndex = SectionIndex(7);
    pub const TEXT_FIELD: SectionIndex = SectionIndex(8);
    pub const CONTROLS: SectionIndex = SectionIndex(9);
    /// First geometry section
    pub const GEOMETRY: SectionIndex = SectionIndex(10);
    pub const ACTIONS: SectionIndex = SectionIndex(240);
    pub const LAYER: SectionIndex = SectionIndex(241);
    pub const USER: SectionIndex = SectionIndex(242);
    /// Custom properties (shape data)
    pub const PROPERTIES: SectionIndex = SectionIndex(243);
    pub const HYPERLINK: SectionIndex = SectionIndex(244);
}

impl fmt::Display for SectionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A (section, row, cell) coordinate identifying one slot in a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Src {
    pub section: i16,
    pub row: i16,
    pub cell: i16,
}

impl Src {
    /// Create a new section/row/cell address
    pub const fn new(section: i16, row: i16, cell: i16) -> Self {
        Self { section, row, cell }
    }

    /// The section this address belongs to
    pub const fn section_index(&self) -> SectionIndex {
        SectionIndex(self.section)
    }

    /// Same section and cell, different row
    pub const fn with_row(&self, row: i16) -> Self {
        Self {
            section: self.section,
            row,
            cell: self.cell,
        }
    }
}

impl fmt::Display for Src {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.section, self.row, self.cell)
    }
}

/// Single-integer cell address for sheets with one implicit section/row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellIndex(pub i16);

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// The two addressing forms a column list can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AddressKind {
    /// Section/row/cell addressing
    Src,
    /// Single cell-index addressing
    CellIndex,
}

impl AddressKind {
    /// Number of 16-bit integers per stream entry, including the object id
    pub const fn arity(self) -> usize {
        match self {
            AddressKind::Src => 4,
            AddressKind::CellIndex => 2,
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressKind::Src => f.write_str("section/row/cell"),
            AddressKind::CellIndex => f.write_str("cell-index"),
        }
    }
}

/// Either addressing form, used where both must share one container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Address {
    Src(Src),
    CellIndex(CellIndex),
}

impl Address {
    pub fn kind(&self) -> AddressKind {
        match self {
            Address::Src(_) => AddressKind::Src,
            Address::CellIndex(_) => AddressKind::CellIndex,
        }
    }
}

impl From<Src> for Address {
    fn from(src: Src) -> Self {
        Address::Src(src)
    }
}

impl From<CellIndex> for Address {
    fn from(cell: CellIndex) -> Self {
        Address::CellIndex(cell)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Src(src) => write!(f, "{src}"),
            Address::CellIndex(cell) => write!(f, "{cell}"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Src {}
    impl Sealed for super::CellIndex {}
}

/// An addressing form usable as the element type of a [`ColumnList`](crate::ColumnList).
///
/// Sealed: only [`Src`] and [`CellIndex`] implement it, so a single column
/// list can never mix the two forms.
pub trait SheetAddress:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Into<Address> + sealed::Sealed
{
    const KIND: AddressKind;
}

impl SheetAddress for Src {
    const KIND: AddressKind = AddressKind::Src;
}

impl SheetAddress for CellIndex {
    const KIND: AddressKind = AddressKind::CellIndex;
}

/// One addressed slot on one object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StreamEntry<A = Address> {
    pub object_id: ObjectId,
    pub address: A,
}

impl<A> StreamEntry<A> {
    pub fn new(object_id: ObjectId, address: A) -> Self {
        Self { object_id, address }
    }
}

/// A flat, homogeneous sequence of addresses sent to a host in one call.
///
/// Every entry uses the same [`AddressKind`]; the constructor takes a single
/// [`SheetAddress`] type so heterogeneous streams cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressStream {
    kind: AddressKind,
    entries: Vec<StreamEntry>,
}

impl AddressStream {
    /// Build a stream from entries of one addressing form
    pub fn new<A, I>(entries: I) -> Self
    where
        A: SheetAddress,
        I: IntoIterator<Item = StreamEntry<A>>,
    {
        Self {
            kind: A::KIND,
            entries: entries
                .into_iter()
                .map(|e| StreamEntry::new(e.object_id, e.address.into()))
                .collect(),
        }
    }

    /// An empty stream of the given kind
    pub fn empty(kind: AddressKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Decode a stream from the host's flat integer layout.
    ///
    /// `[object, section, row, cell]*` for [`AddressKind::Src`],
    /// `[object, cell]*` for [`AddressKind::CellIndex`].
    pub fn from_shorts(kind: AddressKind, shorts: &[i16]) -> Result<Self> {
        let arity = kind.arity();
        if shorts.len() % arity != 0 {
            return Err(Error::malformed(format!(
                "address stream of {} integers is not a multiple of arity {}",
                shorts.len(),
                arity
            )));
        }

        let entries = shorts
            .chunks_exact(arity)
            .map(|chunk| match kind {
                AddressKind::Src => StreamEntry::new(
                    chunk[0],
                    Address::Src(Src::new(chunk[1], chunk[2], chunk[3])),
                ),
                AddressKind::CellIndex => {
                    StreamEntry::new(chunk[0], Address::CellIndex(CellIndex(chunk[1])))
                }
            })
            .collect();

        Ok(Self { kind, entries })
    }

    /// Encode the stream into the host's flat integer layout
    pub fn to_shorts(&self) -> Vec<i16> {
        let mut out = Vec::with_capacity(self.entries.len() * self.arity());
        for entry in &self.entries {
            out.push(entry.object_id);
            match entry.address {
                Address::Src(src) => out.extend_from_slice(&[src.section, src.row, src.cell]),
                Address::CellIndex(cell) => out.push(cell.0),
            }
        }
        out
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// Number of 16-bit integers per entry in the flat layout
    pub fn arity(&self) -> usize {
        self.kind.arity()
    }

    /// Number of addressed cells
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[StreamEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StreamEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a AddressStream {
    type Item = &'a StreamEntry;
    type IntoIter = std::slice::Iter<'a, StreamEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_src_with_row() {
        let src = Src::new(243, 0, 5);
        assert_eq!(src.with_row(7), Src::new(243, 7, 5));
        assert_eq!(src.section_index(), SectionIndex::PROPERTIES);
    }

    #[test]
    fn test_arity() {
        assert_eq!(AddressKind::Src.arity(), 4);
        assert_eq!(AddressKind::CellIndex.arity(), 2);
    }

    #[test]
    fn test_stream_to_shorts() {
        let stream = AddressStream::new(vec![
            StreamEntry::new(10, Src::new(1, 1, 0)),
            StreamEntry::new(20, Src::new(1, 1, 1)),
        ]);
        assert_eq!(stream.kind(), AddressKind::Src);
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.to_shorts(), vec![10, 1, 1, 0, 20, 1, 1, 1]);

        let stream = AddressStream::new(vec![
            StreamEntry::new(3, CellIndex(12)),
            StreamEntry::new(4, CellIndex(13)),
        ]);
        assert_eq!(stream.kind(), AddressKind::CellIndex);
        assert_eq!(stream.to_shorts(), vec![3, 12, 4, 13]);
    }

    #[test]
    fn test_stream_from_shorts() {
        let stream = AddressStream::from_shorts(AddressKind::Src, &[5, 243, 2, 0]).unwrap();
        assert_eq!(
            stream.entries(),
            &[StreamEntry::new(5, Address::Src(Src::new(243, 2, 0)))]
        );

        let stream = AddressStream::from_shorts(AddressKind::CellIndex, &[]).unwrap();
        assert!(stream.is_empty());
    }

    #[test]
    fn test_stream_from_shorts_rejects_partial_entry() {
        let err = AddressStream::from_shorts(AddressKind::Src, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::MalformedResult(_)));
    }

    #[test]
    fn test_address_display() {
        assert_eq!(Address::from(Src::new(1, 2, 6)).to_string(), "(1,2,6)");
        assert_eq!(Address::from(CellIndex(4)).to_string(), "[4]");
        assert_eq!(SectionIndex::HYPERLINK.to_string(), "#244");
    }
}
