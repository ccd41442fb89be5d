//! Append-once table writer.

use crate::error::{Error, Result};
use crate::feature::encode_feature;
use crate::header::write_header;
use crate::packed_r_tree;
use crate::row::Row;
use crate::schema::TableSchema;
use log::debug;
use std::io::Write;

/// Streaming table writer.
///
/// The declared feature count is a hard precondition: the header is
/// written before the first row and the writer never seeks back to patch
/// it, so `schema.features_count` must hold the exact number of rows the
/// caller will supply.
pub struct TableWriter<W: Write> {
    out: W,
    schema: TableSchema,
    written: u64,
}

impl<W: Write> TableWriter<W> {
    /// Write the file prefix: magic bytes, schema header and the
    /// zero-filled index region.
    pub fn create(mut out: W, schema: TableSchema) -> Result<TableWriter<W>> {
        write_header(&mut out, &schema)?;
        let index_size = if schema.index_node_size > 0 {
            packed_r_tree::index_size(schema.features_count, schema.index_node_size)?
        } else {
            0
        };
        debug!(
            "reserving {index_size} index bytes ahead of {} features",
            schema.features_count
        );
        let zeros = [0u8; 8192];
        let mut remaining = index_size;
        while remaining > 0 {
            let n = remaining.min(zeros.len() as u64) as usize;
            out.write_all(&zeros[..n])?;
            remaining -= n as u64;
        }
        Ok(TableWriter {
            out,
            schema,
            written: 0,
        })
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Append one feature frame. Rejected rows (type mismatch, count
    /// overrun) leave the output byte stream untouched.
    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        if self.written >= self.schema.features_count {
            return Err(Error::FeatureCountMismatch {
                declared: self.schema.features_count,
                written: self.written + 1,
            });
        }
        let frame = encode_feature(&self.schema, row)?;
        self.out.write_all(&frame)?;
        self.written += 1;
        Ok(())
    }

    pub fn write_rows(&mut self, rows: impl IntoIterator<Item = Row>) -> Result<()> {
        for row in rows {
            self.write_row(&row)?;
        }
        Ok(())
    }

    /// Flush the channel; fails when fewer rows than declared arrived.
    pub fn finish(mut self) -> Result<W> {
        if self.written != self.schema.features_count {
            return Err(Error::FeatureCountMismatch {
                declared: self.schema.features_count,
                written: self.written,
            });
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coord, Geometry};
    use crate::schema::{Column, ColumnType, GeometryType};

    fn schema(count: u64) -> TableSchema {
        TableSchema::new("points", GeometryType::Point)
            .with_column(Column::new("id", ColumnType::Long))
            .with_features_count(count)
    }

    fn row(id: i64) -> Row {
        Row::new(Some(Geometry::Point(Coord::new(id as f64, 0.0)))).with_property(0, id)
    }

    #[test]
    fn writes_declared_count() {
        let mut writer = TableWriter::create(Vec::new(), schema(2)).unwrap();
        writer.write_rows([row(1), row(2)]).unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes[0..3], *b"fgb");
    }

    #[test]
    fn rejects_row_past_declared_count() {
        let mut writer = TableWriter::create(Vec::new(), schema(1)).unwrap();
        writer.write_row(&row(1)).unwrap();
        assert!(matches!(
            writer.write_row(&row(2)).unwrap_err(),
            Error::FeatureCountMismatch {
                declared: 1,
                written: 2
            }
        ));
    }

    #[test]
    fn finish_rejects_missing_rows() {
        let mut writer = TableWriter::create(Vec::new(), schema(3)).unwrap();
        writer.write_row(&row(1)).unwrap();
        assert!(matches!(
            writer.finish().unwrap_err(),
            Error::FeatureCountMismatch {
                declared: 3,
                written: 1
            }
        ));
    }

    #[test]
    fn empty_table_has_no_index_region() {
        let writer = TableWriter::create(Vec::new(), schema(0)).unwrap();
        let bytes = writer.finish().unwrap();
        // magic + length prefix + header only
        let header_size = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
        assert_eq!(bytes.len(), 12 + header_size);
    }
}
