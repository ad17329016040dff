//! Prebuilt queries for common variable-row sections
//!
//! Each query owns a [`CellQuery`] with one variable section and exposes its
//! columns as fields, so a result row can be decoded into a record without
//! name lookups.

use crate::executor::CellQueryExt;
use crate::surface::Surface;
use crate::table::Row;
use shapesheet_core::{src, CellQuery, Column, ObjectId, Result, RowMode, SectionIndex, Src};

/// Which side of a cell to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueSource {
    /// Raw formula text
    #[default]
    Formula,
    /// Evaluated result, rendered as text
    Result,
}

/// A query whose single section decodes row by row into a record
pub trait CellGroupReader {
    type Group;

    fn query(&self) -> &CellQuery;

    /// Decode one section row
    fn group_from_row(&self, row: &Row<String>) -> Self::Group;

    /// Read every row of the section for each object, in one batched fetch
    fn read(
        &self,
        surface: &Surface<'_>,
        object_ids: &[ObjectId],
        source: ValueSource,
    ) -> Result<Vec<Vec<Self::Group>>> {
        let table = match source {
            ValueSource::Formula => self.query().execute_formulas(surface, object_ids)?,
            ValueSource::Result => self.query().execute::<String>(surface, object_ids)?,
        };
        Ok(table
            .iter()
            .map(|object| {
                object
                    .sections
                    .first()
                    .map(|s| s.rows.iter().map(|r| self.group_from_row(r)).collect())
                    .unwrap_or_default()
            })
            .collect())
    }
}

/// Interpret cell text as an integer, the way the host coerces it
fn to_int(text: &str) -> i32 {
    let text = unquote(text);
    if let Some(b) = parse_bool(text) {
        return i32::from(b);
    }
    text.parse::<f64>().map(|n| n.trunc() as i32).unwrap_or(0)
}

fn to_bool(text: &str) -> bool {
    let text = unquote(text);
    parse_bool(text).unwrap_or_else(|| text.parse::<f64>().map(|n| n != 0.0).unwrap_or(false))
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("TRUE") {
        Some(true)
    } else if text.eq_ignore_ascii_case("FALSE") {
        Some(false)
    } else {
        None
    }
}

fn unquote(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix('=').unwrap_or(text);
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

/// Cells of one custom property row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomPropertyCells {
    pub value: String,
    pub prompt: String,
    pub label: String,
    pub format: String,
    pub sort_key: i32,
    pub prop_type: i32,
    pub invisible: i32,
    pub ask: bool,
    pub lang_id: i32,
    pub calendar: i32,
}

/// Query over the custom property section
#[derive(Debug, Clone)]
pub struct CustomPropertyCellsQuery {
    query: CellQuery,
    pub sort_key: Column<Src>,
    pub ask: Column<Src>,
    pub calendar: Column<Src>,
    pub format: Column<Src>,
    pub invisible: Column<Src>,
    pub label: Column<Src>,
    pub lang_id: Column<Src>,
    pub prompt: Column<Src>,
    pub prop_type: Column<Src>,
    pub value: Column<Src>,
}

impl CustomPropertyCellsQuery {
    pub fn new() -> Result<Self> {
        let mut query = CellQuery::new();
        let sec = query.add_section(SectionIndex::PROPERTIES, RowMode::Variable)?;
        let sort_key = sec.add_named(src::PROP_SORT_KEY, "SortKey")?;
        let ask = sec.add_named(src::PROP_ASK, "Ask")?;
        let calendar = sec.add_named(src::PROP_CALENDAR, "Calendar")?;
        let format = sec.add_named(src::PROP_FORMAT, "Format")?;
        let invisible = sec.add_named(src::PROP_INVISIBLE, "Invisible")?;
        let label = sec.add_named(src::PROP_LABEL, "Label")?;
        let lang_id = sec.add_named(src::PROP_LANG_ID, "LangID")?;
        let prompt = sec.add_named(src::PROP_PROMPT, "Prompt")?;
        let prop_type = sec.add_named(src::PROP_TYPE, "Type")?;
        let value = sec.add_named(src::PROP_VALUE, "Value")?;
        Ok(Self {
            query,
            sort_key,
            ask,
            calendar,
            format,
            invisible,
            label,
            lang_id,
            prompt,
            prop_type,
            value,
        })
    }
}

impl CellGroupReader for CustomPropertyCellsQuery {
    type Group = CustomPropertyCells;

    fn query(&self) -> &CellQuery {
        &self.query
    }

    fn group_from_row(&self, row: &Row<String>) -> CustomPropertyCells {
        CustomPropertyCells {
            value: row[&self.value].clone(),
            prompt: row[&self.prompt].clone(),
            label: row[&self.label].clone(),
            format: row[&self.format].clone(),
            sort_key: to_int(&row[&self.sort_key]),
            prop_type: to_int(&row[&self.prop_type]),
            invisible: to_int(&row[&self.invisible]),
            ask: to_bool(&row[&self.ask]),
            lang_id: to_int(&row[&self.lang_id]),
            calendar: to_int(&row[&self.calendar]),
        }
    }
}

/// Cells of one hyperlink row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HyperlinkCells {
    pub address: String,
    pub sub_address: String,
    pub description: String,
    pub extra_info: String,
    pub frame: String,
    pub sort_key: String,
    pub new_window: bool,
    pub default: bool,
    pub invisible: bool,
}

/// Query over the hyperlink section
#[derive(Debug, Clone)]
pub struct HyperlinkCellsQuery {
    query: CellQuery,
    pub address: Column<Src>,
    pub default: Column<Src>,
    pub description: Column<Src>,
    pub extra_info: Column<Src>,
    pub frame: Column<Src>,
    pub invisible: Column<Src>,
    pub new_window: Column<Src>,
    pub sort_key: Column<Src>,
    pub sub_address: Column<Src>,
}

impl HyperlinkCellsQuery {
    pub fn new() -> Result<Self> {
        let mut query = CellQuery::new();
        let sec = query.add_section(SectionIndex::HYPERLINK, RowMode::Variable)?;
        let address = sec.add_named(src::HYPERLINK_ADDRESS, "Address")?;
        let default = sec.add_named(src::HYPERLINK_DEFAULT, "Default")?;
        let description = sec.add_named(src::HYPERLINK_DESCRIPTION, "Description")?;
        let extra_info = sec.add_named(src::HYPERLINK_EXTRA_INFO, "ExtraInfo")?;
        let frame = sec.add_named(src::HYPERLINK_FRAME, "Frame")?;
        let invisible = sec.add_named(src::HYPERLINK_INVISIBLE, "Invisible")?;
        let new_window = sec.add_named(src::HYPERLINK_NEW_WINDOW, "NewWindow")?;
        let sort_key = sec.add_named(src::HYPERLINK_SORT_KEY, "SortKey")?;
        let sub_address = sec.add_named(src::HYPERLINK_SUB_ADDRESS, "SubAddress")?;
        Ok(Self {
            query,
            address,
            default,
            description,
            extra_info,
            frame,
            invisible,
            new_window,
            sort_key,
            sub_address,
        })
    }
}

impl CellGroupReader for HyperlinkCellsQuery {
    type Group = HyperlinkCells;

    fn query(&self) -> &CellQuery {
        &self.query
    }

    fn group_from_row(&self, row: &Row<String>) -> HyperlinkCells {
        HyperlinkCells {
            address: row[&self.address].clone(),
            sub_address: row[&self.sub_address].clone(),
            description: row[&self.description].clone(),
            extra_info: row[&self.extra_info].clone(),
            frame: row[&self.frame].clone(),
            sort_key: row[&self.sort_key].clone(),
            new_window: to_bool(&row[&self.new_window]),
            default: to_bool(&row[&self.default]),
            invisible: to_bool(&row[&self.invisible]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_coercions() {
        assert_eq!(to_int("3.9"), 3);
        assert_eq!(to_int("=TRUE"), 1);
        assert_eq!(to_int("\"x\""), 0);
        assert!(to_bool("TRUE"));
        assert!(to_bool("1"));
        assert!(!to_bool("0"));
        assert!(!to_bool(""));
    }

    #[test]
    fn test_custom_property_columns() {
        let q = CustomPropertyCellsQuery::new().unwrap();
        assert_eq!(q.query().column_count(), 10);
        assert_eq!(q.value.name(), "Value");
        assert_eq!(q.value.address(), src::PROP_VALUE);
    }

    #[test]
    fn test_read_custom_properties() {
        let doc = MemoryDocument::new();
        let q = CustomPropertyCellsQuery::new().unwrap();
        for row in 0..2 {
            for col in q.query().section(SectionIndex::PROPERTIES).unwrap().columns() {
                doc.set_formula(5, col.address().with_row(row), "0");
            }
        }
        doc.set_formula(5, src::PROP_VALUE, "\"Acme\"");
        doc.set_formula(5, src::PROP_LABEL.with_row(1), "\"Owner\"");
        doc.set_formula(5, src::PROP_ASK.with_row(1), "TRUE");
        doc.set_formula(5, src::PROP_TYPE.with_row(1), "2");

        let groups = q
            .read(&Surface::shape(&doc), &[5, 6], ValueSource::Formula)
            .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][0].value, "\"Acme\"");
        assert_eq!(groups[0][1].label, "\"Owner\"");
        assert!(groups[0][1].ask);
        assert_eq!(groups[0][1].prop_type, 2);
        assert!(groups[1].is_empty());
    }

    #[test]
    fn test_read_hyperlink_results() {
        let doc = MemoryDocument::new();
        let q = HyperlinkCellsQuery::new().unwrap();
        for col in q.query().section(SectionIndex::HYPERLINK).unwrap().columns() {
            doc.set_formula(1, col.address(), "\"\"");
        }
        doc.set_formula(1, src::HYPERLINK_ADDRESS, "\"https://example.com\"");
        doc.set_formula(1, src::HYPERLINK_NEW_WINDOW, "TRUE");

        let groups = q
            .read(&Surface::page(&doc), &[1], ValueSource::Result)
            .unwrap();
        assert_eq!(groups[0][0].address, "https://example.com");
        assert!(groups[0][0].new_window);
        assert!(!groups[0][0].invisible);
    }
}
