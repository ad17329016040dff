//! Document handle and remote sheets that forward batched calls to the bridge.

use shapesheet_core::{
    AddressStream, CellValue, CellValueType, Error, ObjectId, Result, SectionIndex, SetFlags,
    SheetTarget, UnitCode,
};
use shapesheet_protocol::{Command as BridgeCommand, ResponseData, TargetRef, WireValue};

use crate::bridge::{BridgeError, ShapeSheetBridge};

/// A handle to an open drawing in the host.
pub struct Document<'a> {
    bridge: &'a ShapeSheetBridge,
    handle: u64,
}

impl<'a> Document<'a> {
    pub(crate) fn new(bridge: &'a ShapeSheetBridge, handle: u64) -> Self {
        Self { bridge, handle }
    }

    /// Get the internal handle ID.
    pub fn handle(&self) -> u64 {
        self.handle
    }

    /// Sheet of a page, by 1-based page index. Object ids passed to calls on
    /// it are shape ids on that page.
    pub fn page(&self, page: u32) -> RemoteSheet<'a> {
        self.remote(TargetRef::Page {
            document: self.handle,
            page,
        })
    }

    /// Sheet of a single shape on a page.
    pub fn shape(&self, page: u32, shape: ObjectId) -> RemoteSheet<'a> {
        self.remote(TargetRef::Shape {
            document: self.handle,
            page,
            shape,
        })
    }

    /// Sheet of a master, by 1-based master index.
    pub fn master(&self, master: u32) -> RemoteSheet<'a> {
        self.remote(TargetRef::Master {
            document: self.handle,
            master,
        })
    }

    fn remote(&self, target: TargetRef) -> RemoteSheet<'a> {
        RemoteSheet {
            bridge: self.bridge,
            target,
        }
    }

    /// Close the document without saving.
    pub fn close(self) -> std::result::Result<(), BridgeError> {
        self.bridge.close_document(self.handle)
    }
}

/// One shape, page or master in the host, reached through the bridge.
#[derive(Clone, Copy)]
pub struct RemoteSheet<'a> {
    bridge: &'a ShapeSheetBridge,
    target: TargetRef,
}

impl RemoteSheet<'_> {
    pub fn target(&self) -> TargetRef {
        self.target
    }

    fn arity(stream: &AddressStream) -> u8 {
        // 2 or 4
        stream.arity() as u8
    }

    fn request(&self, command: BridgeCommand, what: &'static str) -> Result<ResponseData> {
        self.bridge
            .send_command(command)?
            .ok_or_else(|| BridgeError::UnexpectedResponse(what).into())
    }
}

impl std::fmt::Debug for RemoteSheet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSheet")
            .field("target", &self.target)
            .finish()
    }
}

impl SheetTarget for RemoteSheet<'_> {
    fn get_results(
        &self,
        stream: &AddressStream,
        value_type: CellValueType,
        units: &[UnitCode],
    ) -> Result<Vec<CellValue>> {
        let data = self.request(
            BridgeCommand::GetResults {
                target: self.target,
                arity: Self::arity(stream),
                stream: stream.to_shorts(),
                value_type: value_type.get_flag(),
                units: units.iter().map(|u| u.0).collect(),
            },
            "GetResults",
        )?;
        match data {
            ResponseData::Values { values } => values
                .into_iter()
                .enumerate()
                .map(|(i, v)| from_wire(value_type, v, i))
                .collect(),
            _ => Err(BridgeError::UnexpectedResponse("GetResults").into()),
        }
    }

    fn get_formulas(&self, stream: &AddressStream) -> Result<Vec<String>> {
        let data = self.request(
            BridgeCommand::GetFormulas {
                target: self.target,
                arity: Self::arity(stream),
                stream: stream.to_shorts(),
            },
            "GetFormulas",
        )?;
        match data {
            ResponseData::Formulas { formulas } => Ok(formulas),
            _ => Err(BridgeError::UnexpectedResponse("GetFormulas").into()),
        }
    }

    fn set_results(
        &self,
        stream: &AddressStream,
        units: &[UnitCode],
        values: &[CellValue],
        flags: SetFlags,
    ) -> Result<usize> {
        let data = self.request(
            BridgeCommand::SetResults {
                target: self.target,
                arity: Self::arity(stream),
                stream: stream.to_shorts(),
                units: units.iter().map(|u| u.0).collect(),
                values: values.iter().map(to_wire).collect(),
                flags: flags.bits(),
            },
            "SetResults",
        )?;
        applied(data, "SetResults")
    }

    fn set_formulas(
        &self,
        stream: &AddressStream,
        formulas: &[String],
        flags: SetFlags,
    ) -> Result<usize> {
        let data = self.request(
            BridgeCommand::SetFormulas {
                target: self.target,
                arity: Self::arity(stream),
                stream: stream.to_shorts(),
                formulas: formulas.to_vec(),
                flags: flags.bits(),
            },
            "SetFormulas",
        )?;
        applied(data, "SetFormulas")
    }

    fn row_count(&self, object_id: ObjectId, section: SectionIndex) -> Result<usize> {
        let data = self.request(
            BridgeCommand::RowCount {
                target: self.target,
                object: object_id,
                section: section.0,
            },
            "RowCount",
        )?;
        match data {
            ResponseData::RowCount { rows } => Ok(rows),
            _ => Err(BridgeError::UnexpectedResponse("RowCount").into()),
        }
    }
}

fn applied(data: ResponseData, what: &'static str) -> Result<usize> {
    match data {
        ResponseData::Applied { applied } => Ok(applied),
        _ => Err(BridgeError::UnexpectedResponse(what).into()),
    }
}

fn to_wire(value: &CellValue) -> WireValue {
    match value {
        CellValue::Int(n) => WireValue::Int(*n),
        CellValue::Float(n) => WireValue::Float(*n),
        CellValue::Text(s) => WireValue::Text(s.clone()),
    }
}

/// JSON does not keep the int/float distinction for whole numbers, so a
/// float read may arrive as an integer and an int read as a whole float.
fn from_wire(value_type: CellValueType, value: WireValue, index: usize) -> Result<CellValue> {
    let converted = match (value_type, value) {
        (CellValueType::Text, WireValue::Text(s)) => Some(CellValue::Text(s)),
        (CellValueType::Float, v) => v.as_f64().map(CellValue::Float),
        (CellValueType::Int, WireValue::Int(n)) => Some(CellValue::Int(n)),
        (CellValueType::Int, WireValue::Float(n))
            if n.fract() == 0.0 && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&n) =>
        {
            Some(CellValue::Int(n as i32))
        }
        _ => None,
    };
    converted.ok_or_else(|| {
        Error::malformed(format!(
            "entry {index}: bridge value does not match a {value_type} request"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::tests::scripted;
    use pretty_assertions::assert_eq;
    use shapesheet::prelude::*;

    const OPEN: &str = r#"{"id":1,"status":"ok","data":{"document":4}}"#;

    #[test]
    fn test_query_through_bridge() {
        let (bridge, sink) = scripted(&[
            OPEN,
            r#"{"id":2,"status":"ok","data":{"rows":2}}"#,
            r#"{"id":3,"status":"ok","data":{"values":["Acme","Bob"]}}"#,
        ]);
        let doc = bridge.open_document("Z:\\plan.vsdx").unwrap();
        let sheet = doc.page(1);

        let mut query = CellQuery::new();
        let value = query
            .add_section(SectionIndex::PROPERTIES, RowMode::Variable)
            .unwrap()
            .add(src::PROP_VALUE)
            .unwrap();

        let table = query.execute::<String>(&Surface::page(&sheet), &[12]).unwrap();
        let rows = &table[0].sections[0].rows;
        assert_eq!(rows[0][&value], "Acme");
        assert_eq!(rows[1][&value], "Bob");

        let requests = sink.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[1].command,
            BridgeCommand::RowCount {
                target: TargetRef::Page {
                    document: 4,
                    page: 1
                },
                object: 12,
                section: 243,
            }
        );
        assert_eq!(
            requests[2].command,
            BridgeCommand::GetResults {
                target: TargetRef::Page {
                    document: 4,
                    page: 1
                },
                arity: 4,
                stream: vec![12, 243, 0, 0, 12, 243, 1, 0],
                value_type: 3,
                units: vec![],
            }
        );
    }

    #[test]
    fn test_update_through_bridge() {
        let (bridge, sink) = scripted(&[OPEN, r#"{"id":2,"status":"ok","data":{"applied":1}}"#]);
        let doc = bridge.open_document("Z:\\plan.vsdx").unwrap();
        let sheet = doc.shape(1, 3);

        let mut batch = UpdateBatch::with_flags(SetFlags::BLAST_GUARDS);
        batch.set_result(3, CellIndex(7), 2);
        batch.execute(&Surface::shape(&sheet)).unwrap();

        match &sink.requests()[1].command {
            BridgeCommand::SetResults {
                arity,
                stream,
                values,
                flags,
                units,
                ..
            } => {
                assert_eq!(*arity, 2);
                assert_eq!(stream, &vec![3, 7]);
                assert_eq!(values, &vec![WireValue::Int(2)]);
                assert_eq!(units, &vec![32]);
                assert_eq!(*flags, 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bridge_error_is_host_error() {
        let (bridge, _) = scripted(&[
            OPEN,
            r#"{"id":2,"status":"error","message":"shape 9 not found"}"#,
        ]);
        let doc = bridge.open_document("Z:\\plan.vsdx").unwrap();
        let sheet = doc.master(2);
        let err = sheet.row_count(9, SectionIndex::USER).unwrap_err();
        assert!(matches!(err, Error::Host(_)));
        assert!(err.to_string().contains("shape 9 not found"));
    }

    #[test]
    fn test_from_wire_widening() {
        assert_eq!(
            from_wire(CellValueType::Float, WireValue::Int(2), 0).unwrap(),
            CellValue::Float(2.0)
        );
        assert_eq!(
            from_wire(CellValueType::Int, WireValue::Float(3.0), 0).unwrap(),
            CellValue::Int(3)
        );
        assert!(matches!(
            from_wire(CellValueType::Int, WireValue::Float(3.5), 1),
            Err(Error::MalformedResult(_))
        ));
        assert!(from_wire(CellValueType::Text, WireValue::Int(1), 2).is_err());
    }

    #[test]
    fn test_from_wire_rejects_out_of_range_int() {
        for n in [3e10, -3e10, f64::INFINITY] {
            assert!(matches!(
                from_wire(CellValueType::Int, WireValue::Float(n), 0),
                Err(Error::MalformedResult(_))
            ));
        }
        assert_eq!(
            from_wire(CellValueType::Int, WireValue::Float(-2147483648.0), 0).unwrap(),
            CellValue::Int(i32::MIN)
        );
    }
}
