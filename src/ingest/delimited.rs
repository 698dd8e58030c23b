use csv::{ReaderBuilder, Trim};

use super::IngestError;
use super::table::Cell;

/// Read comma-separated rows. The first line is a header and is dropped;
/// rows may have fewer or more fields than the header.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, IngestError> {
	let mut reader = ReaderBuilder::new()
		.has_headers(true)
		.flexible(true)
		.trim(Trim::All)
		.from_reader(bytes);

	let mut rows = Vec::new();
	for record in reader.records() {
		let record = record?;
		rows.push(record.iter().map(Cell::from_text).collect());
	}
	Ok(rows)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn drops_header_and_trims_fields() {
		let rows = read_rows(b"source_node,edge_weight,destination_node\n A , 2 ,B\n").unwrap();
		assert_eq!(
			rows,
			vec![vec![
				Cell::Text("A".into()),
				Cell::Text("2".into()),
				Cell::Text("B".into())
			]]
		);
	}

	#[test]
	fn tolerates_ragged_rows() {
		let rows = read_rows(b"a,b,c\nA,1\nB,1,C,extra\n").unwrap();
		assert_eq!(rows.len(), 2);
		assert_eq!(rows[0].len(), 2);
		assert_eq!(rows[1].len(), 4);
	}

	#[test]
	fn empty_fields_are_empty_cells() {
		let rows = read_rows(b"a,b,c\nA,,B\n").unwrap();
		assert_eq!(rows[0][1], Cell::Empty);
	}
}
