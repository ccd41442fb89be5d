use crate::schema::{ColumnType, GeometryType};
use flatbuffers::InvalidFlatbuffer;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
    /// The first eight bytes are not a FlatGeobuf signature.
    MissingMagicBytes,
    /// Declared header length outside the accepted range.
    IllegalHeaderSize(usize),
    /// Index node fan-out below the minimum of 2.
    IllegalNodeSize(u16),
    /// Computed index region size exceeds the addressable range.
    IndexSizeOverflow(u64),
    InvalidFlatbuffer(InvalidFlatbuffer),
    /// Channel ended before the requested byte count was available.
    Truncated { expected: usize, actual: usize },
    /// Column type code with no entry in the type table.
    UnknownColumnType(u8),
    /// Geometry type code with no entry in the type table.
    UnknownGeometryType(u8),
    /// Column type declared by the schema but not implemented by the codec.
    UnsupportedColumnType(ColumnType),
    /// Geometry kind declared by the header but not representable in memory.
    UnsupportedGeometryType(GeometryType),
    /// A property value does not match its column's declared type.
    TypeMismatch {
        column: String,
        expected: ColumnType,
        actual: &'static str,
    },
    /// A geometry value does not match the file-level geometry kind.
    GeometryTypeMismatch {
        expected: GeometryType,
        actual: GeometryType,
    },
    /// Property tag referencing a column position past the column vector.
    ColumnOutOfRange(u16),
    /// Rows written disagree with the feature count declared up front.
    FeatureCountMismatch { declared: u64, written: u64 },
    /// Store name that does not resolve to a managed table.
    TableNotFound(String),
    Utf8(std::str::Utf8Error),
    IO(std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingMagicBytes => "Missing magic bytes. Is this an fgb file?".fmt(f),
            Error::IllegalHeaderSize(size) => write!(f, "Illegal header size: {size}"),
            Error::IllegalNodeSize(size) => write!(f, "Illegal index node size: {size}"),
            Error::IndexSizeOverflow(size) => write!(f, "Index size out of range: {size}"),
            Error::InvalidFlatbuffer(invalid_flatbuffer) => invalid_flatbuffer.fmt(f),
            Error::Truncated { expected, actual } => {
                write!(
                    f,
                    "Unexpected end of file: expected {expected} bytes, got {actual}"
                )
            }
            Error::UnknownColumnType(code) => write!(f, "Unknown column type code: {code}"),
            Error::UnknownGeometryType(code) => write!(f, "Unknown geometry type code: {code}"),
            Error::UnsupportedColumnType(t) => write!(f, "Unsupported column type: {t:?}"),
            Error::UnsupportedGeometryType(t) => write!(f, "Unsupported geometry type: {t:?}"),
            Error::TypeMismatch {
                column,
                expected,
                actual,
            } => write!(
                f,
                "Column `{column}` declared {expected:?}, got {actual} value"
            ),
            Error::GeometryTypeMismatch { expected, actual } => {
                write!(
                    f,
                    "Geometry type mismatch: header declares {expected:?}, got {actual:?}"
                )
            }
            Error::ColumnOutOfRange(pos) => write!(f, "Property tag {pos} past end of columns"),
            Error::FeatureCountMismatch { declared, written } => {
                write!(f, "Declared {declared} features, wrote {written}")
            }
            Error::TableNotFound(name) => write!(f, "No table named `{name}`"),
            Error::Utf8(utf8) => utf8.fmt(f),
            Error::IO(io) => io.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::IO(value)
    }
}

impl From<InvalidFlatbuffer> for Error {
    fn from(value: InvalidFlatbuffer) -> Self {
        Error::InvalidFlatbuffer(value)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(value: std::str::Utf8Error) -> Self {
        Error::Utf8(value)
    }
}
