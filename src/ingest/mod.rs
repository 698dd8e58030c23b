//! Table ingestion: turns CSV or XLSX bytes into a [`Graph`].
//!
//! CSV input is always read as an edge list (`source, weight, destination`
//! with a header row). Spreadsheets are read from their first worksheet and
//! sniffed: a blank top-left cell means an adjacency table, anything else an
//! edge list whose first row is a header.

mod delimited;
mod request;
mod table;
mod workbook;

use log::{debug, info, warn};
use rand::Rng;
use thiserror::Error;

use crate::graph::{Graph, GraphBuilder, Point};

pub use request::RequestTracker;
pub use table::TableLayout;
use table::Cell;

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Accepted by the file picker.
pub const ACCEPT: &str = ".csv, .xlsx";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
	Csv,
	Xlsx,
}

impl SourceFormat {
	pub fn from_mime(mime: &str) -> Option<Self> {
		match mime {
			CSV_MIME => Some(SourceFormat::Csv),
			XLSX_MIME => Some(SourceFormat::Xlsx),
			_ => None,
		}
	}
}

/// Errors that abort one ingestion. No graph is produced.
#[derive(Debug, Error)]
pub enum IngestError {
	#[error("Unsupported file type `{mime}`: expected a CSV or XLSX file")]
	UnsupportedFormat { mime: String },

	#[error("Could not read file: {0}")]
	Read(String),

	#[error("Malformed CSV: {0}")]
	Csv(#[from] csv::Error),

	#[error("Unreadable spreadsheet: {0}")]
	Workbook(#[from] calamine::XlsxError),
}

/// Problems with individual rows or cells. The rest of the table is still
/// ingested. Rows and columns are 1-based, as a spreadsheet shows them.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum IngestWarning {
	#[error("Row {row}: weight `{value}` is not a number, no links created")]
	MalformedWeight { row: usize, value: String },

	#[error("Row {row}, column {column}: `{value}` is not a number, cell skipped")]
	MalformedCell {
		row: usize,
		column: usize,
		value: String,
	},

	#[error("Row {row}: source or destination is missing, row skipped")]
	MissingEndpoint { row: usize },

	#[error("Row {row}, column {column}: label is blank, skipped")]
	MissingLabel { row: usize, column: usize },

	#[error("Row {row}: {count} parallel links requested, capped at {cap}")]
	WeightCapped { row: usize, count: usize, cap: usize },
}

/// How adjacency tables are expanded into nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdjacencyMode {
	/// One node per source and destination label.
	#[default]
	Bipartite,
	/// One cluster per source row; every positive cell becomes a
	/// `"{source}-{destination}"` satellite node near its source.
	Clustered,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IngestOptions {
	/// Width and height of the area new nodes are scattered over.
	pub bounds: Point,
	/// Adjacency cells are divided by this before counting links.
	pub adjacency_divisor: f64,
	pub adjacency_mode: AdjacencyMode,
}

impl Default for IngestOptions {
	fn default() -> Self {
		Self {
			bounds: Point::new(800.0, 600.0),
			adjacency_divisor: 10.0,
			adjacency_mode: AdjacencyMode::default(),
		}
	}
}

#[derive(Debug)]
pub struct Ingested {
	pub graph: Graph,
	pub layout: TableLayout,
	pub warnings: Vec<IngestWarning>,
}

/// Parse `bytes` according to `mime` and build a graph from them.
///
/// Empty files and sheets produce an empty graph, not an error.
pub fn ingest<R: Rng>(
	bytes: &[u8],
	mime: &str,
	options: &IngestOptions,
	rng: &mut R,
) -> Result<Ingested, IngestError> {
	let format = SourceFormat::from_mime(mime).ok_or_else(|| IngestError::UnsupportedFormat {
		mime: mime.to_owned(),
	})?;

	let (rows, layout) = match format {
		SourceFormat::Csv => (delimited::read_rows(bytes)?, TableLayout::EdgeList),
		SourceFormat::Xlsx => {
			let rows = workbook::read_first_sheet(bytes)?;
			let layout = TableLayout::detect(&rows);
			(rows, layout)
		}
	};
	debug!("{:?} input, {} rows, detected {:?}", format, rows.len(), layout);

	let bounds = options.bounds;
	let mut place = || Point::new(rng.r#gen::<f64>() * bounds.x, rng.r#gen::<f64>() * bounds.y);
	let (graph, warnings) = build(&rows, format, layout, options, &mut place);

	for warning in &warnings {
		warn!("{warning}");
	}
	info!(
		"Ingested {} nodes and {} links ({} warnings)",
		graph.nodes().len(),
		graph.links().len(),
		warnings.len()
	);
	Ok(Ingested {
		graph,
		layout,
		warnings,
	})
}

/// Turn parsed rows into a graph. Spreadsheet rows still carry their header
/// row, the CSV reader has already consumed it.
fn build(
	rows: &[Vec<Cell>],
	format: SourceFormat,
	layout: TableLayout,
	options: &IngestOptions,
	place: &mut dyn FnMut() -> Point,
) -> (Graph, Vec<IngestWarning>) {
	let mut builder = GraphBuilder::new();
	let mut warnings = Vec::new();
	match (format, layout) {
		// Data starts on sheet line 2 either way.
		(SourceFormat::Csv, _) => table::edge_list(rows, 2, place, &mut builder, &mut warnings),
		(SourceFormat::Xlsx, TableLayout::EdgeList) => {
			let data = rows.get(1..).unwrap_or_default();
			table::edge_list(data, 2, place, &mut builder, &mut warnings)
		}
		(SourceFormat::Xlsx, TableLayout::Adjacency) => {
			table::adjacency(rows, options, place, &mut builder, &mut warnings)
		}
	}
	(builder.build(), warnings)
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::graph::NodeId;

	fn ingest_csv(text: &str, seed: u64) -> Ingested {
		let mut rng = StdRng::seed_from_u64(seed);
		ingest(text.as_bytes(), CSV_MIME, &IngestOptions::default(), &mut rng)
			.expect("csv should ingest")
	}

	#[test]
	fn csv_edge_list_yields_parallel_links() {
		let ingested = ingest_csv("source_node,edge_weight,destination_node\nA,2,B\n", 1);
		assert_eq!(ingested.layout, TableLayout::EdgeList);
		assert_eq!(
			ingested.graph.node_ids(),
			["A", "B"].into_iter().map(NodeId::from).collect::<BTreeSet<_>>()
		);
		assert_eq!(ingested.graph.links().len(), 2);
		assert_eq!(
			ingested.graph.link_multiset().get(&("A".into(), "B".into())),
			Some(&2)
		);
	}

	#[test]
	fn csv_positions_fall_inside_bounds() {
		let ingested = ingest_csv("s,w,d\nA,1,B\nB,1,C\n", 7);
		let bounds = IngestOptions::default().bounds;
		for node in ingested.graph.nodes() {
			assert!((0.0..=bounds.x).contains(&node.x));
			assert!((0.0..=bounds.y).contains(&node.y));
		}
	}

	#[test]
	fn empty_csv_is_an_empty_graph() {
		let ingested = ingest_csv("", 1);
		assert!(ingested.graph.is_empty());
		assert!(ingested.warnings.is_empty());

		let header_only = ingest_csv("source_node,edge_weight,destination_node\n", 1);
		assert!(header_only.graph.is_empty());
	}

	#[test]
	fn unsupported_mime_is_reported() {
		let mut rng = StdRng::seed_from_u64(0);
		let err = ingest(b"A,1,B", "application/json", &IngestOptions::default(), &mut rng)
			.expect_err("json is not a table format");
		assert!(matches!(err, IngestError::UnsupportedFormat { ref mime } if mime == "application/json"));
		assert!(err.to_string().contains("application/json"));
	}

	#[test]
	fn garbage_xlsx_is_an_error_not_a_panic() {
		let mut rng = StdRng::seed_from_u64(0);
		let err = ingest(b"not a zip", XLSX_MIME, &IngestOptions::default(), &mut rng)
			.expect_err("bytes are not a workbook");
		assert!(matches!(err, IngestError::Workbook(_)));
	}

	#[test]
	fn repeated_ingestion_has_same_topology() {
		let text = "s,w,d\nA,2,B\nB,1,C\nC,3,A\nA,1,B\n";
		let first = ingest_csv(text, 1);
		let second = ingest_csv(text, 99);
		assert_eq!(first.graph.node_ids(), second.graph.node_ids());
		assert_eq!(first.graph.link_multiset(), second.graph.link_multiset());
	}

	#[test]
	fn malformed_weights_surface_as_warnings() {
		let ingested = ingest_csv("s,w,d\nA,heavy,B\nA,1,B\n", 3);
		assert_eq!(ingested.graph.links().len(), 1);
		assert_eq!(
			ingested.warnings,
			vec![IngestWarning::MalformedWeight {
				row: 2,
				value: "heavy".into()
			}]
		);
	}

	fn build_sheet(rows: &[Vec<Cell>]) -> (Graph, Vec<IngestWarning>) {
		let layout = TableLayout::detect(rows);
		build(
			rows,
			SourceFormat::Xlsx,
			layout,
			&IngestOptions::default(),
			&mut Point::default,
		)
	}

	fn header() -> Vec<Cell> {
		["source_node", "edge_weight", "destination_node"]
			.into_iter()
			.map(Cell::from_text)
			.collect()
	}

	#[test]
	fn sheet_edge_list_skips_header_row() {
		let rows = vec![
			header(),
			vec![Cell::from_text("A"), Cell::Number(2.0), Cell::from_text("B")],
		];
		let (graph, warnings) = build_sheet(&rows);
		assert!(warnings.is_empty());
		assert_eq!(
			graph.node_ids(),
			["A", "B"].into_iter().map(NodeId::from).collect::<BTreeSet<_>>()
		);
		assert_eq!(graph.link_multiset().get(&("A".into(), "B".into())), Some(&2));
	}

	#[test]
	fn sheet_edge_list_warnings_use_sheet_rows() {
		let rows = vec![
			header(),
			vec![Cell::from_text("A"), Cell::Number(1.0), Cell::from_text("B")],
			vec![Cell::from_text("A"), Cell::from_text("many"), Cell::from_text("C")],
		];
		let (graph, warnings) = build_sheet(&rows);
		assert_eq!(graph.links().len(), 1);
		assert_eq!(
			warnings,
			vec![IngestWarning::MalformedWeight {
				row: 3,
				value: "many".into()
			}]
		);
	}

	#[test]
	fn csv_rows_have_no_header_to_skip() {
		let rows = vec![vec![Cell::from_text("A"), Cell::from_text("1"), Cell::from_text("B")]];
		let (graph, _) = build(
			&rows,
			SourceFormat::Csv,
			TableLayout::EdgeList,
			&IngestOptions::default(),
			&mut Point::default,
		);
		assert_eq!(graph.links().len(), 1);
	}

	#[test]
	fn sheet_with_blank_corner_is_read_as_adjacency() {
		let rows = vec![
			vec![Cell::Empty, Cell::from_text("X"), Cell::from_text("Y")],
			vec![Cell::from_text("S"), Cell::Number(30.0), Cell::Empty],
		];
		assert_eq!(TableLayout::detect(&rows), TableLayout::Adjacency);
		let (graph, warnings) = build_sheet(&rows);
		assert!(warnings.is_empty());
		assert_eq!(
			graph.node_ids(),
			["S", "X", "Y"].into_iter().map(NodeId::from).collect::<BTreeSet<_>>()
		);
		assert_eq!(graph.link_multiset().get(&("S".into(), "X".into())), Some(&3));
	}

	#[test]
	fn recognizes_mime_types() {
		assert_eq!(SourceFormat::from_mime(CSV_MIME), Some(SourceFormat::Csv));
		assert_eq!(SourceFormat::from_mime(XLSX_MIME), Some(SourceFormat::Xlsx));
		assert_eq!(SourceFormat::from_mime("application/vnd.ms-excel"), None);
	}
}
