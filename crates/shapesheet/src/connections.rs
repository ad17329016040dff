//! Directed edges from connector arrows
//!
//! Given the undirected connections on a page, [`directed_edges`] reads the
//! begin and end arrow of every connector in one batched query and turns each
//! connection into zero, one or two directed edges.

use crate::executor::CellQueryExt;
use crate::surface::Surface;
use shapesheet_core::{src, CellQuery, ObjectId, Result, RowMode, SectionIndex};

/// A connector joining two shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectorEdge {
    pub connector: ObjectId,
    pub from: ObjectId,
    pub to: ObjectId,
}

impl ConnectorEdge {
    pub fn new(connector: ObjectId, from: ObjectId, to: ObjectId) -> Self {
        Self {
            connector,
            from,
            to,
        }
    }

    fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            ..self
        }
    }
}

/// Where edge direction comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectionSource {
    /// Glue order decides: edges are returned as given
    UseConnectionOrder,
    /// Line arrows decide
    #[default]
    UseConnectorArrows,
}

/// What to do with a connector that has no arrows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoArrowsHandling {
    /// Emit an edge in each direction
    #[default]
    TreatEdgeAsBidirectional,
    /// Drop the connector
    ExcludeEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectorHandling {
    pub direction_source: DirectionSource,
    pub no_arrows: NoArrowsHandling,
}

/// Resolve connections into directed edges.
///
/// With [`DirectionSource::UseConnectorArrows`] a begin arrow yields
/// `to -> from` and an end arrow yields `from -> to`; both may apply.
/// Output keeps the order of `edges`.
pub fn directed_edges(
    surface: &Surface<'_>,
    edges: &[ConnectorEdge],
    handling: ConnectorHandling,
) -> Result<Vec<ConnectorEdge>> {
    if handling.direction_source == DirectionSource::UseConnectionOrder {
        return Ok(edges.to_vec());
    }

    let mut query = CellQuery::new();
    let object = query.add_section(SectionIndex::OBJECT, RowMode::Fixed)?;
    let begin_arrow = object.add_named(src::LINE_BEGIN_ARROW, "LineBeginArrow")?;
    let end_arrow = object.add_named(src::LINE_END_ARROW, "LineEndArrow")?;

    let connectors: Vec<ObjectId> = edges.iter().map(|e| e.connector).collect();
    let arrows = query.execute::<i32>(surface, &connectors)?;

    let mut directed = Vec::with_capacity(edges.len());
    for (edge, object) in edges.iter().zip(&arrows) {
        let Some(cells) = object.cells() else {
            continue;
        };
        let begin = cells[&begin_arrow];
        let end = cells[&end_arrow];

        if begin < 1 && end < 1 {
            if handling.no_arrows == NoArrowsHandling::TreatEdgeAsBidirectional {
                directed.push(edge.reversed());
                directed.push(*edge);
            }
            continue;
        }
        if begin > 0 {
            directed.push(edge.reversed());
        }
        if end > 0 {
            directed.push(*edge);
        }
    }

    tracing::debug!(
        connectors = edges.len(),
        edges = directed.len(),
        "resolved connector directions"
    );
    Ok(directed)
}
