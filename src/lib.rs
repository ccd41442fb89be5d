//! Streaming storage for geospatial tables in the FlatGeobuf layout:
//! a schema header, an opaque packed R-Tree region, and a sequence of
//! size-prefixed feature frames, read and written without ever holding a
//! whole file in memory.
//!
//! ```no_run
//! use flatgeotable::*;
//!
//! # fn example() -> Result<()> {
//! let store = TableStore::directory("data");
//! let table = store.get("countries")?;
//! let mut reader = table.reader()?.rows()?;
//! while let Some(row) = reader.next()? {
//!     println!("{:?}", row.property(0));
//! }
//! # Ok(())
//! # }
//! ```

mod cursor;
mod error;
mod fbs;
mod feature;
mod file_reader;
mod file_writer;
mod geometry;
mod header;
mod packed_r_tree;
mod properties;
mod row;
mod schema;
mod store;

pub use cursor::BufferCursor;
pub use error::{Error, Result};
pub use fallible_streaming_iterator::FallibleStreamingIterator;
pub use file_reader::{RowIter, TableReader};
pub use file_writer::TableWriter;
pub use geometry::{Coord, Geometry};
pub use packed_r_tree::{index_size, DEFAULT_NODE_SIZE};
pub use row::{Row, Value};
pub use schema::{Column, ColumnType, GeometryType, TableSchema};
pub use store::{FgbTable, Table, TableStore, FILE_EXTENSION};

pub const VERSION: u8 = 3;
pub const MAGIC_BYTES: [u8; 8] = [b'f', b'g', b'b', VERSION, b'f', b'g', b'b', 0];

pub(crate) const HEADER_MAX_BUFFER_SIZE: usize = 1048576 * 10;

pub(crate) fn check_magic_bytes(bytes: &[u8]) -> bool {
    bytes.len() >= 8
        && bytes[0..3] == MAGIC_BYTES[0..3]
        && bytes[4..7] == MAGIC_BYTES[4..7]
        && bytes[3] <= VERSION
}
