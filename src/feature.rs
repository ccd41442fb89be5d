//! Feature frame codec: one size-prefixed FlatBuffers Feature table per
//! row, holding an optional geometry sub-structure and the property block.

use crate::error::Result;
use crate::fbs::feature as fbs;
use crate::geometry::{read_geometry, write_geometry};
use crate::properties::{decode_properties, encode_properties};
use crate::row::Row;
use crate::schema::TableSchema;
use flatbuffers::FlatBufferBuilder;
use std::collections::BTreeMap;

/// Serialize one row to a length-prefixed frame. Property and geometry
/// validation both run before the frame exists, so a rejected row emits
/// nothing.
pub(crate) fn encode_feature(schema: &TableSchema, row: &Row) -> Result<Vec<u8>> {
    let mut fbb = FlatBufferBuilder::with_capacity(4096);
    let block = encode_properties(&schema.columns, &row.properties)?;
    let geometry = row
        .geometry
        .as_ref()
        .map(|geometry| write_geometry(&mut fbb, geometry, schema.geometry_type))
        .transpose()?;
    let properties = (!block.is_empty()).then(|| fbb.create_vector(&block));
    let feature = fbs::Feature::create(
        &mut fbb,
        &fbs::FeatureArgs {
            geometry,
            properties,
        },
    );
    fbb.finish_size_prefixed(feature, None);
    Ok(fbb.finished_data().to_vec())
}

/// Rebuild a row from a frame body (the bytes after the length prefix).
pub(crate) fn decode_feature(schema: &TableSchema, body: &[u8]) -> Result<Row> {
    let feature = fbs::root_as_feature(body)?;
    let geometry = match feature.geometry() {
        Some(geometry) => read_geometry(geometry, schema.geometry_type)?,
        None => None,
    };
    let properties = match feature.properties() {
        Some(block) => decode_properties(&schema.columns, block.bytes())?,
        None => BTreeMap::new(),
    };
    Ok(Row {
        geometry,
        properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::geometry::{Coord, Geometry};
    use crate::schema::{Column, ColumnType, GeometryType};

    fn schema() -> TableSchema {
        TableSchema::new("places", GeometryType::Point)
            .with_column(Column::new("id", ColumnType::Long))
            .with_column(Column::new("label", ColumnType::String))
    }

    fn frame_body(frame: &[u8]) -> &[u8] {
        let len = u32::from_le_bytes(frame[..4].try_into().unwrap()) as usize;
        assert_eq!(frame.len(), len + 4);
        &frame[4..]
    }

    #[test]
    fn feature_roundtrip() {
        let schema = schema();
        let row = Row::new(Some(Geometry::Point(Coord::new(1.0, 2.0))))
            .with_property(0, 1i64)
            .with_property(1, "a");
        let frame = encode_feature(&schema, &row).unwrap();
        assert_eq!(decode_feature(&schema, frame_body(&frame)).unwrap(), row);
    }

    #[test]
    fn null_geometry_and_empty_properties() {
        let schema = schema();
        let row = Row::new(None);
        let frame = encode_feature(&schema, &row).unwrap();
        let decoded = decode_feature(&schema, frame_body(&frame)).unwrap();
        assert_eq!(decoded.geometry, None);
        assert!(decoded.properties.is_empty());
    }

    #[test]
    fn mismatched_property_rejects_whole_row() {
        let schema = schema();
        let row = Row::new(Some(Geometry::Point(Coord::new(0.0, 0.0))))
            .with_property(0, "not a long");
        assert!(matches!(
            encode_feature(&schema, &row).unwrap_err(),
            Error::TypeMismatch { .. }
        ));
    }

    #[test]
    fn corrupt_body_is_invalid_flatbuffer() {
        let schema = schema();
        assert!(matches!(
            decode_feature(&schema, &[0xff; 3]).unwrap_err(),
            Error::InvalidFlatbuffer(_)
        ));
    }
}
