//! Schema header codec: magic signature, u32 length prefix, FlatBuffers
//! Header table.

use crate::cursor::BufferCursor;
use crate::error::{Error, Result};
use crate::fbs::header as fbs;
use crate::schema::{Column, ColumnType, GeometryType, TableSchema};
use crate::{check_magic_bytes, HEADER_MAX_BUFFER_SIZE, MAGIC_BYTES};
use byteorder::{ByteOrder, LittleEndian};
use flatbuffers::FlatBufferBuilder;
use std::io::{Read, Write};

/// Read and verify the file prefix, returning the recovered schema with
/// the cursor positioned at the start of the index region.
pub(crate) fn read_header<R: Read>(cursor: &mut BufferCursor<R>) -> Result<TableSchema> {
    if cursor.ensure(MAGIC_BYTES.len())? < MAGIC_BYTES.len()
        || !check_magic_bytes(cursor.data())
    {
        return Err(Error::MissingMagicBytes);
    }
    cursor.consume(MAGIC_BYTES.len());

    let got = cursor.ensure(4)?;
    if got < 4 {
        return Err(Error::Truncated {
            expected: 4,
            actual: got,
        });
    }
    let header_size = LittleEndian::read_u32(cursor.data()) as usize;
    cursor.consume(4);
    // minimum size check avoids pathological buffers in header decoding
    if !(8..=HEADER_MAX_BUFFER_SIZE).contains(&header_size) {
        return Err(Error::IllegalHeaderSize(header_size));
    }

    let got = cursor.ensure(header_size)?;
    if got < header_size {
        return Err(Error::Truncated {
            expected: header_size,
            actual: got,
        });
    }
    let header = fbs::root_as_header(&cursor.data()[..header_size])?;
    let schema = to_schema(header)?;
    cursor.consume(header_size);
    Ok(schema)
}

fn to_schema(header: fbs::Header) -> Result<TableSchema> {
    let mut columns = Vec::new();
    if let Some(vector) = header.columns() {
        columns.reserve(vector.len());
        for i in 0..vector.len() {
            let column = vector.get(i);
            let r#type = ColumnType::from_code(column.type_())
                .ok_or(Error::UnknownColumnType(column.type_()))?;
            columns.push(Column {
                name: column.name().to_string(),
                r#type,
                nullable: column.nullable(),
                unique: column.unique(),
                primary_key: column.primary_key(),
            });
        }
    }
    let geometry_type = GeometryType::from_code(header.geometry_type())
        .ok_or(Error::UnknownGeometryType(header.geometry_type()))?;
    let envelope = header
        .envelope()
        .filter(|envelope| envelope.len() == 4)
        .map(|envelope| {
            [
                envelope.get(0),
                envelope.get(1),
                envelope.get(2),
                envelope.get(3),
            ]
        });
    Ok(TableSchema {
        name: header.name().unwrap_or_default().to_string(),
        geometry_type,
        columns,
        features_count: header.features_count(),
        index_node_size: header.index_node_size(),
        srid: header.crs().map(|crs| crs.code()).unwrap_or(0),
        envelope,
    })
}

/// Write the magic signature and the size-prefixed header block. Envelope
/// and spatial-reference substructures are written only when supplied.
pub(crate) fn write_header<W: Write>(out: &mut W, schema: &TableSchema) -> Result<()> {
    out.write_all(&MAGIC_BYTES)?;

    let mut fbb = FlatBufferBuilder::new();
    let columns = schema
        .columns
        .iter()
        .map(|column| {
            let name = fbb.create_string(&column.name);
            fbs::Column::create(
                &mut fbb,
                &fbs::ColumnArgs {
                    name: Some(name),
                    type_: column.r#type.code(),
                    nullable: column.nullable,
                    unique: column.unique,
                    primary_key: column.primary_key,
                },
            )
        })
        .collect::<Vec<_>>();
    let columns = Some(fbb.create_vector(&columns));
    let name = (!schema.name.is_empty()).then(|| fbb.create_string(&schema.name));
    let envelope = schema.envelope.map(|envelope| fbb.create_vector(&envelope[..]));
    let crs = (schema.srid != 0)
        .then(|| fbs::Crs::create(&mut fbb, &fbs::CrsArgs { code: schema.srid }));
    let header = fbs::Header::create(
        &mut fbb,
        &fbs::HeaderArgs {
            name,
            envelope,
            geometry_type: schema.geometry_type.code(),
            columns,
            features_count: schema.features_count,
            index_node_size: schema.index_node_size,
            crs,
        },
    );
    fbb.finish_size_prefixed(header, None);
    out.write_all(fbb.finished_data())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> TableSchema {
        TableSchema::new("countries", GeometryType::MultiPolygon)
            .with_column(Column::new("id", ColumnType::ULong).primary_key())
            .with_column(Column::new("name", ColumnType::String))
            .with_features_count(179)
            .with_srid(4326)
    }

    fn roundtrip(schema: &TableSchema) -> TableSchema {
        let mut buf = Vec::new();
        write_header(&mut buf, schema).unwrap();
        let mut cursor = BufferCursor::new(&buf[..]);
        read_header(&mut cursor).unwrap()
    }

    #[test]
    fn header_roundtrip() {
        let schema = sample_schema();
        assert_eq!(roundtrip(&schema), schema);
    }

    #[test]
    fn envelope_is_optional() {
        let mut schema = sample_schema();
        assert_eq!(roundtrip(&schema).envelope, None);
        schema.envelope = Some([-180.0, -90.0, 180.0, 90.0]);
        assert_eq!(roundtrip(&schema).envelope, schema.envelope);
    }

    #[test]
    fn zero_srid_writes_no_crs_entry() {
        let mut schema = sample_schema();
        schema.srid = 0;
        assert_eq!(roundtrip(&schema).srid, 0);
    }

    #[test]
    fn rejects_foreign_magic() {
        let mut buf = Vec::new();
        write_header(&mut buf, &sample_schema()).unwrap();
        buf[0] = b'x';
        let mut cursor = BufferCursor::new(&buf[..]);
        assert!(matches!(
            read_header(&mut cursor).unwrap_err(),
            Error::MissingMagicBytes
        ));
    }

    #[test]
    fn rejects_empty_channel() {
        let mut cursor = BufferCursor::new(&[][..]);
        assert!(matches!(
            read_header(&mut cursor).unwrap_err(),
            Error::MissingMagicBytes
        ));
    }

    #[test]
    fn rejects_oversized_header_length() {
        let mut buf = Vec::new();
        write_header(&mut buf, &sample_schema()).unwrap();
        let huge = (HEADER_MAX_BUFFER_SIZE as u32 + 1).to_le_bytes();
        buf[8..12].copy_from_slice(&huge);
        let mut cursor = BufferCursor::new(&buf[..]);
        assert!(matches!(
            read_header(&mut cursor).unwrap_err(),
            Error::IllegalHeaderSize(_)
        ));
    }
}
