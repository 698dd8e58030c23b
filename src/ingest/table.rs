use log::debug;

use super::{AdjacencyMode, IngestOptions, IngestWarning};
use crate::graph::{GraphBuilder, Link, NodeId, Point};

/// Upper bound on parallel links produced by a single weight.
pub const MAX_PARALLEL_LINKS: usize = 1000;

const CLUSTER_OFFSET_X: f64 = 20.0;
const CLUSTER_OFFSET_Y: f64 = 10.0;
const CLUSTER_COLUMNS: usize = 10;

/// A normalized spreadsheet or CSV cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
	Empty,
	Text(String),
	Number(f64),
}

impl Cell {
	pub fn from_text(text: &str) -> Self {
		let text = text.trim();
		if text.is_empty() {
			Cell::Empty
		} else {
			Cell::Text(text.to_owned())
		}
	}

	pub fn is_blank(&self) -> bool {
		match self {
			Cell::Empty => true,
			Cell::Text(s) => s.trim().is_empty(),
			Cell::Number(_) => false,
		}
	}

	/// Node label for this cell, `None` when blank.
	pub fn label(&self) -> Option<NodeId> {
		match self {
			Cell::Empty => None,
			Cell::Text(s) => {
				let s = s.trim();
				(!s.is_empty()).then(|| NodeId::from(s))
			}
			Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
				Some(NodeId::from(format!("{}", *n as i64)))
			}
			Cell::Number(n) => Some(NodeId::from(n.to_string())),
		}
	}

	/// Numeric value: `Ok(None)` for blank cells, `Err(text)` when the cell
	/// holds something that is not a finite number.
	pub fn number(&self) -> Result<Option<f64>, String> {
		match self {
			Cell::Empty => Ok(None),
			Cell::Number(n) if n.is_finite() => Ok(Some(*n)),
			Cell::Number(n) => Err(n.to_string()),
			Cell::Text(s) => {
				let s = s.trim();
				if s.is_empty() {
					return Ok(None);
				}
				match s.parse::<f64>() {
					Ok(n) if n.is_finite() => Ok(Some(n)),
					_ => Err(s.to_owned()),
				}
			}
		}
	}

	pub fn display(&self) -> String {
		match self {
			Cell::Empty => String::new(),
			Cell::Text(s) => s.clone(),
			Cell::Number(n) => n.to_string(),
		}
	}
}

/// Which of the two table shapes a sheet holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableLayout {
	EdgeList,
	Adjacency,
}

impl TableLayout {
	/// A blank or absent top-left cell marks an adjacency table.
	pub fn detect(rows: &[Vec<Cell>]) -> Self {
		match rows.first().and_then(|row| row.first()) {
			Some(cell) if !cell.is_blank() => TableLayout::EdgeList,
			_ => TableLayout::Adjacency,
		}
	}
}

fn blank(row: &[Cell]) -> bool {
	row.iter().all(Cell::is_blank)
}

fn cell(row: &[Cell], column: usize) -> &Cell {
	row.get(column).unwrap_or(&Cell::Empty)
}

fn capped(count: usize, row: usize, warnings: &mut Vec<IngestWarning>) -> usize {
	if count > MAX_PARALLEL_LINKS {
		warnings.push(IngestWarning::WeightCapped {
			row,
			count,
			cap: MAX_PARALLEL_LINKS,
		});
		MAX_PARALLEL_LINKS
	} else {
		count
	}
}

/// Edge-list rows: source, weight, destination. The weight is a repeat
/// count, a weight of 3 yields three parallel links.
///
/// `first_row` is the 1-based sheet row of `rows[0]`, used in warnings.
pub fn edge_list(
	rows: &[Vec<Cell>],
	first_row: usize,
	place: &mut dyn FnMut() -> Point,
	builder: &mut GraphBuilder,
	warnings: &mut Vec<IngestWarning>,
) {
	for (i, row) in rows.iter().enumerate() {
		let sheet_row = first_row + i;
		if blank(row) {
			continue;
		}
		let (Some(source), Some(target)) = (cell(row, 0).label(), cell(row, 2).label()) else {
			warnings.push(IngestWarning::MissingEndpoint { row: sheet_row });
			continue;
		};
		builder.ensure_node(&source, &mut *place);
		builder.ensure_node(&target, &mut *place);

		let weight = cell(row, 1);
		let count = match weight.number() {
			// One link per integer i with 0 <= i < weight.
			Ok(Some(w)) if w > 0.0 => w.ceil() as usize,
			Ok(Some(_)) => 0,
			Ok(None) | Err(_) => {
				warnings.push(IngestWarning::MalformedWeight {
					row: sheet_row,
					value: weight.display(),
				});
				continue;
			}
		};
		let count = capped(count, sheet_row, warnings);
		builder.push_links(Link::new(source, target), count);
	}
}

/// Adjacency table: row 0 holds destination labels from column 1, column 0
/// holds source labels from row 1, cells hold weights scaled by
/// `options.adjacency_divisor`. Each cell yields `floor(scaled)` links
/// between labels, or in clustered mode `ceil(scaled)` links to a satellite,
/// so every positive cell gets its satellite.
pub fn adjacency(
	rows: &[Vec<Cell>],
	options: &IngestOptions,
	place: &mut dyn FnMut() -> Point,
	builder: &mut GraphBuilder,
	warnings: &mut Vec<IngestWarning>,
) {
	let Some((header, body)) = rows.split_first() else {
		return;
	};
	let destinations: Vec<Option<NodeId>> = header.iter().skip(1).map(Cell::label).collect();
	for (column, label) in destinations.iter().enumerate() {
		if label.is_none() && (1..rows.len()).any(|r| !cell(&rows[r], column + 1).is_blank()) {
			warnings.push(IngestWarning::MissingLabel {
				row: 1,
				column: column + 2,
			});
		}
	}

	for (i, row) in body.iter().enumerate() {
		let sheet_row = i + 2;
		if blank(row) {
			continue;
		}
		let Some(source) = cell(row, 0).label() else {
			warnings.push(IngestWarning::MissingLabel {
				row: sheet_row,
				column: 1,
			});
			continue;
		};

		let center = match options.adjacency_mode {
			AdjacencyMode::Bipartite => {
				builder.ensure_node(&source, &mut *place);
				None
			}
			AdjacencyMode::Clustered => {
				let center = cluster_center(i, options.bounds);
				builder.ensure_node(&source, || center);
				Some(center)
			}
		};

		for (column, destination) in destinations.iter().enumerate() {
			let Some(destination) = destination else {
				continue;
			};
			if center.is_none() {
				builder.ensure_node(destination, &mut *place);
			}

			let value = cell(row, column + 1);
			let scaled = match value.number() {
				Ok(Some(v)) => v / options.adjacency_divisor,
				Ok(None) => continue,
				Err(text) => {
					warnings.push(IngestWarning::MalformedCell {
						row: sheet_row,
						column: column + 2,
						value: text,
					});
					continue;
				}
			};
			if !(scaled > 0.0) {
				continue;
			}
			let count = match center {
				None => scaled.floor(),
				Some(_) => scaled.ceil(),
			};
			let count = capped(count as usize, sheet_row, warnings);
			if count == 0 {
				continue;
			}

			let target = match center {
				None => destination.clone(),
				Some(center) => {
					let satellite = NodeId::from(format!("{source}-{destination}"));
					let mut jitter = || {
						let p = place();
						Point::new(
							center.x + (p.x / options.bounds.x - 0.5) * CLUSTER_OFFSET_X,
							center.y + (p.y / options.bounds.y - 0.5) * CLUSTER_OFFSET_Y,
						)
					};
					builder.ensure_node(&satellite, &mut jitter);
					satellite
				}
			};
			builder.push_links(Link::new(source.clone(), target).with_weight(scaled), count);
		}
	}

	if options.adjacency_mode == AdjacencyMode::Bipartite {
		for destination in destinations.iter().flatten() {
			builder.ensure_node(destination, &mut *place);
		}
	}
	debug!(
		"adjacency table: {} destinations, {} nodes",
		destinations.len(),
		builder.node_count()
	);
}

fn cluster_center(row: usize, bounds: Point) -> Point {
	Point::new(
		(row % CLUSTER_COLUMNS) as f64 * CLUSTER_OFFSET_X + bounds.x / 10.0,
		(row / CLUSTER_COLUMNS) as f64 * CLUSTER_OFFSET_Y + bounds.y / 10.0,
	)
}
