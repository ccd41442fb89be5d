//! Logical table description: typed columns plus file-level metadata.
//!
//! Column order is the only addressing scheme for properties: the position
//! of a column in [`TableSchema::columns`] is the tag written in front of
//! its values in every feature frame.

use crate::packed_r_tree::DEFAULT_NODE_SIZE;

/// Geometry type codes as stored in the header and in geometry part
/// structures. The full wire table is closed; only the first eight kinds
/// are representable as in-memory values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GeometryType {
    Unknown = 0,
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
    CircularString = 8,
    CompoundCurve = 9,
    CurvePolygon = 10,
    MultiCurve = 11,
    MultiSurface = 12,
    Curve = 13,
    Surface = 14,
    PolyhedralSurface = 15,
    Tin = 16,
    Triangle = 17,
}

impl GeometryType {
    pub fn from_code(code: u8) -> Option<GeometryType> {
        use GeometryType::*;
        Some(match code {
            0 => Unknown,
            1 => Point,
            2 => LineString,
            3 => Polygon,
            4 => MultiPoint,
            5 => MultiLineString,
            6 => MultiPolygon,
            7 => GeometryCollection,
            8 => CircularString,
            9 => CompoundCurve,
            10 => CurvePolygon,
            11 => MultiCurve,
            12 => MultiSurface,
            13 => Curve,
            14 => Surface,
            15 => PolyhedralSurface,
            16 => Tin,
            17 => Triangle,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Column type codes. Shared verbatim between encode and decode; adding a
/// type means updating this table and both codec directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ColumnType {
    Byte = 0,
    UByte = 1,
    Bool = 2,
    Short = 3,
    UShort = 4,
    Int = 5,
    UInt = 6,
    Long = 7,
    ULong = 8,
    Float = 9,
    Double = 10,
    String = 11,
    Json = 12,
    DateTime = 13,
    Binary = 14,
}

impl ColumnType {
    pub fn from_code(code: u8) -> Option<ColumnType> {
        use ColumnType::*;
        Some(match code {
            0 => Byte,
            1 => UByte,
            2 => Bool,
            3 => Short,
            4 => UShort,
            5 => Int,
            6 => UInt,
            7 => Long,
            8 => ULong,
            9 => Float,
            10 => Double,
            11 => String,
            12 => Json,
            13 => DateTime,
            14 => Binary,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A typed, positionally addressed schema entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub r#type: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, r#type: ColumnType) -> Column {
        Column {
            name: name.into(),
            r#type,
            nullable: true,
            unique: false,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Column {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Column {
        self.primary_key = true;
        self.unique = true;
        self
    }
}

/// File-level metadata plus the ordered column vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    /// Logical dataset name; also the store's file stem.
    pub name: String,
    pub geometry_type: GeometryType,
    pub columns: Vec<Column>,
    /// Number of feature frames following the index region. Must be known
    /// before writing begins; the writer never patches it afterwards.
    pub features_count: u64,
    /// Index node fan-out; 0 disables the index region entirely.
    pub index_node_size: u16,
    /// Spatial reference code (EPSG unless stated otherwise); 0 = unset.
    pub srid: i32,
    /// min_x, min_y, max_x, max_y
    pub envelope: Option<[f64; 4]>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, geometry_type: GeometryType) -> TableSchema {
        TableSchema {
            name: name.into(),
            geometry_type,
            columns: Vec::new(),
            features_count: 0,
            index_node_size: DEFAULT_NODE_SIZE,
            srid: 0,
            envelope: None,
        }
    }

    pub fn with_column(mut self, column: Column) -> TableSchema {
        self.columns.push(column);
        self
    }

    pub fn with_features_count(mut self, count: u64) -> TableSchema {
        self.features_count = count;
        self
    }

    pub fn with_srid(mut self, srid: i32) -> TableSchema {
        self.srid = srid;
        self
    }

    pub fn column(&self, position: u16) -> Option<&Column> {
        self.columns.get(position as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tables_are_closed() {
        for code in 0..=17u8 {
            assert_eq!(GeometryType::from_code(code).map(|t| t.code()), Some(code));
        }
        assert_eq!(GeometryType::from_code(18), None);
        for code in 0..=14u8 {
            assert_eq!(ColumnType::from_code(code).map(|t| t.code()), Some(code));
        }
        assert_eq!(ColumnType::from_code(15), None);
    }

    #[test]
    fn schema_builder() {
        let schema = TableSchema::new("countries", GeometryType::MultiPolygon)
            .with_column(Column::new("id", ColumnType::ULong).primary_key())
            .with_column(Column::new("name", ColumnType::String))
            .with_srid(4326);
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.index_node_size, DEFAULT_NODE_SIZE);
        assert!(schema.column(0).unwrap().primary_key);
        assert!(schema.column(2).is_none());
    }
}
