//! In-memory sheet host
//!
//! [`MemoryDocument`] implements [`SheetTarget`] over a plain map of cells so
//! queries and update batches can run without a live host. Every trait call
//! counts as one round trip, which makes it useful for checking batching
//! behavior in tests.
//!
//! Formula evaluation is shallow: numeric literals, quoted
//! strings, `TRUE`/`FALSE` and a number followed by a length unit
//! (`in`, `pt`, `cm`, `mm`) are understood. Anything else is stored as text
//! and keeps the cell's previous result. Numeric cells are treated as lengths
//! in inches when a unit code asks for conversion.

use ahash::AHashMap;
use shapesheet_core::{
    Address, AddressStream, CellValue, CellValueType, Error, ObjectId, Result, SectionIndex,
    SetFlags, SheetTarget, UnitCode,
};
use std::cell::{Cell, RefCell};
use thiserror::Error;

/// Failures reported by [`MemoryDocument`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MemoryHostError {
    #[error("object {object_id} has no cell at {address}")]
    MissingCell { object_id: ObjectId, address: Address },

    #[error("cell {address} on object {object_id} holds non-numeric text '{text}'")]
    NotNumeric {
        object_id: ObjectId,
        address: Address,
        text: String,
    },

    #[error("{0}")]
    Injected(String),
}

#[derive(Debug, Clone, PartialEq)]
struct StoredCell {
    formula: String,
    value: CellValue,
}

#[derive(Debug, Default)]
struct Sheet {
    cells: AHashMap<(ObjectId, Address), StoredCell>,
    rows: AHashMap<(ObjectId, SectionIndex), usize>,
}

impl Sheet {
    fn cell(&self, object_id: ObjectId, address: Address) -> Result<&StoredCell> {
        self.cells
            .get(&(object_id, address))
            .ok_or_else(|| Error::host(MemoryHostError::MissingCell { object_id, address }))
    }

    fn store(&mut self, object_id: ObjectId, address: Address, cell: StoredCell) {
        if let Address::Src(src) = address {
            let rows = self.rows.entry((object_id, src.section_index())).or_default();
            let needed = usize::try_from(src.row).unwrap_or(0) + 1;
            *rows = (*rows).max(needed);
        }
        self.cells.insert((object_id, address), cell);
    }
}

/// A host document held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryDocument {
    sheet: RefCell<Sheet>,
    round_trips: Cell<usize>,
    fail_next: RefCell<Option<String>>,
}

impl MemoryDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result; the formula becomes the literal text of the value
    pub fn set_result(
        &self,
        object_id: ObjectId,
        address: impl Into<Address>,
        value: impl Into<CellValue>,
    ) {
        let value = value.into();
        let cell = StoredCell {
            formula: literal_formula(&value),
            value,
        };
        self.sheet
            .borrow_mut()
            .store(object_id, address.into(), cell);
    }

    /// Store a formula and evaluate it
    pub fn set_formula(&self, object_id: ObjectId, address: impl Into<Address>, formula: &str) {
        let address = address.into();
        let mut sheet = self.sheet.borrow_mut();
        let previous = sheet.cells.get(&(object_id, address)).map(|c| &c.value);
        let cell = StoredCell {
            formula: formula.to_string(),
            value: evaluate(formula, previous),
        };
        sheet.store(object_id, address, cell);
    }

    /// Force the row count of a section, independent of stored cells
    pub fn set_row_count(&self, object_id: ObjectId, section: SectionIndex, rows: usize) {
        self.sheet
            .borrow_mut()
            .rows
            .insert((object_id, section), rows);
    }

    /// Read back a stored value without counting a round trip
    pub fn value(&self, object_id: ObjectId, address: impl Into<Address>) -> Option<CellValue> {
        self.sheet
            .borrow()
            .cells
            .get(&(object_id, address.into()))
            .map(|c| c.value.clone())
    }

    /// Read back a stored formula without counting a round trip
    pub fn formula(&self, object_id: ObjectId, address: impl Into<Address>) -> Option<String> {
        self.sheet
            .borrow()
            .cells
            .get(&(object_id, address.into()))
            .map(|c| c.formula.clone())
    }

    /// Number of [`SheetTarget`] calls made so far
    pub fn round_trips(&self) -> usize {
        self.round_trips.get()
    }

    pub fn reset_round_trips(&self) {
        self.round_trips.set(0);
    }

    /// Make the next [`SheetTarget`] call fail with a host error
    pub fn fail_next_call(&self, message: &str) {
        *self.fail_next.borrow_mut() = Some(message.to_string());
    }

    fn begin_call(&self) -> Result<()> {
        self.round_trips.set(self.round_trips.get() + 1);
        match self.fail_next.borrow_mut().take() {
            Some(message) => Err(Error::host(MemoryHostError::Injected(message))),
            None => Ok(()),
        }
    }
}

impl SheetTarget for MemoryDocument {
    fn get_results(
        &self,
        stream: &AddressStream,
        value_type: CellValueType,
        units: &[UnitCode],
    ) -> Result<Vec<CellValue>> {
        self.begin_call()?;
        let sheet = self.sheet.borrow();
        stream
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let cell = sheet.cell(entry.object_id, entry.address)?;
                let unit = units.get(i).copied().unwrap_or_default();
                coerce(&cell.value, value_type, unit).ok_or_else(|| {
                    Error::host(MemoryHostError::NotNumeric {
                        object_id: entry.object_id,
                        address: entry.address,
                        text: cell.value.to_string(),
                    })
                })
            })
            .collect()
    }

    fn get_formulas(&self, stream: &AddressStream) -> Result<Vec<String>> {
        self.begin_call()?;
        let sheet = self.sheet.borrow();
        stream
            .iter()
            .map(|entry| Ok(sheet.cell(entry.object_id, entry.address)?.formula.clone()))
            .collect()
    }

    fn set_results(
        &self,
        stream: &AddressStream,
        units: &[UnitCode],
        values: &[CellValue],
        flags: SetFlags,
    ) -> Result<usize> {
        self.begin_call()?;
        let mut sheet = self.sheet.borrow_mut();
        for (i, (entry, value)) in stream.iter().zip(values).enumerate() {
            let cell = match value {
                CellValue::Text(text) if flags.contains(SetFlags::RESULTS_AS_FORMULAS) => {
                    let previous = sheet.cells.get(&(entry.object_id, entry.address));
                    StoredCell {
                        formula: text.clone(),
                        value: evaluate(text, previous.map(|c| &c.value)),
                    }
                }
                _ => {
                    let unit = units.get(i).copied().unwrap_or_default();
                    let value = to_internal(value, unit);
                    StoredCell {
                        formula: literal_formula(&value),
                        value,
                    }
                }
            };
            sheet.store(entry.object_id, entry.address, cell);
        }
        Ok(stream.len().min(values.len()))
    }

    fn set_formulas(
        &self,
        stream: &AddressStream,
        formulas: &[String],
        _flags: SetFlags,
    ) -> Result<usize> {
        self.begin_call()?;
        let mut sheet = self.sheet.borrow_mut();
        for (entry, formula) in stream.iter().zip(formulas) {
            let previous = sheet.cells.get(&(entry.object_id, entry.address));
            let cell = StoredCell {
                formula: formula.clone(),
                value: evaluate(formula, previous.map(|c| &c.value)),
            };
            sheet.store(entry.object_id, entry.address, cell);
        }
        Ok(stream.len().min(formulas.len()))
    }

    fn row_count(&self, object_id: ObjectId, section: SectionIndex) -> Result<usize> {
        self.begin_call()?;
        Ok(self
            .sheet
            .borrow()
            .rows
            .get(&(object_id, section))
            .copied()
            .unwrap_or(0))
    }
}

/// Inches per one of `unit`, for the length units the document converts
fn inches_per(unit: UnitCode) -> Option<f64> {
    match unit {
        UnitCode::INCHES => Some(1.0),
        UnitCode::POINTS => Some(1.0 / 72.0),
        UnitCode::CENTIMETERS => Some(1.0 / 2.54),
        UnitCode::MILLIMETERS => Some(1.0 / 25.4),
        _ => None,
    }
}

fn from_internal(inches: f64, unit: UnitCode) -> f64 {
    match inches_per(unit) {
        Some(factor) => inches / factor,
        None => inches,
    }
}

fn to_internal(value: &CellValue, unit: UnitCode) -> CellValue {
    match (value, inches_per(unit)) {
        (CellValue::Float(n), Some(factor)) => CellValue::Float(n * factor),
        (CellValue::Int(n), Some(factor)) => CellValue::Float(f64::from(*n) * factor),
        _ => value.clone(),
    }
}

fn coerce(value: &CellValue, value_type: CellValueType, unit: UnitCode) -> Option<CellValue> {
    let number = match value {
        CellValue::Int(n) => Some(f64::from(*n)),
        CellValue::Float(n) => Some(*n),
        CellValue::Text(s) => s.trim().parse::<f64>().ok(),
    };
    match value_type {
        CellValueType::Float => number.map(|n| CellValue::Float(from_internal(n, unit))),
        CellValueType::Int => number.map(|n| CellValue::Int(from_internal(n, unit).trunc() as i32)),
        CellValueType::Text => Some(CellValue::Text(match value {
            CellValue::Text(s) => s.clone(),
            _ => format_number(from_internal(number.unwrap_or(0.0), unit)),
        })),
    }
}

fn format_number(n: f64) -> String {
    format!("{n}")
}

fn literal_formula(value: &CellValue) -> String {
    match value {
        CellValue::Int(n) => n.to_string(),
        CellValue::Float(n) => format_number(*n),
        CellValue::Text(s) => format!("\"{}\"", s.replace('"', "\"\"")),
    }
}

fn evaluate(formula: &str, previous: Option<&CellValue>) -> CellValue {
    let text = formula.trim();
    let text = text.strip_prefix('=').unwrap_or(text).trim();

    if let Ok(n) = text.parse::<f64>() {
        return CellValue::Float(n);
    }
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return CellValue::Text(text[1..text.len() - 1].replace("\"\"", "\""));
    }
    if text.eq_ignore_ascii_case("TRUE") {
        return CellValue::Float(1.0);
    }
    if text.eq_ignore_ascii_case("FALSE") {
        return CellValue::Float(0.0);
    }
    if let Some((number, unit)) = text.split_once(char::is_whitespace) {
        let unit = match unit.trim() {
            "in" => Some(UnitCode::INCHES),
            "pt" => Some(UnitCode::POINTS),
            "cm" => Some(UnitCode::CENTIMETERS),
            "mm" => Some(UnitCode::MILLIMETERS),
            _ => None,
        };
        if let (Ok(n), Some(unit)) = (number.parse::<f64>(), unit) {
            return to_internal(&CellValue::Float(n), unit);
        }
    }

    previous.cloned().unwrap_or(CellValue::Float(0.0))
}
