//! Planar geometry values and their conversion to and from the flat
//! coordinate/part encoding of the feature frames.
//!
//! Every kind except MultiPolygon and GeometryCollection flattens into one
//! interleaved x/y vector, with cumulative per-ring or per-part end offsets
//! where the split points cannot be inferred. MultiPolygon encodes each
//! polygon as an independent sub-structure under `parts`, and
//! GeometryCollection does the same with each part carrying its own type
//! tag. Coordinates are written in forward traversal order.

use crate::error::{Error, Result};
use crate::fbs::feature as fbs;
use crate::schema::GeometryType;
use flatbuffers::{FlatBufferBuilder, WIPOffset};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub m: Option<f64>,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Coord {
        Coord {
            x,
            y,
            z: None,
            m: None,
        }
    }

    pub fn with_z(mut self, z: f64) -> Coord {
        self.z = Some(z);
        self
    }

    pub fn with_m(mut self, m: f64) -> Coord {
        self.m = Some(m);
        self
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Coord {
        Coord::new(x, y)
    }
}

/// A geometry value. Polygon rings are ordered shell first, holes after;
/// a MultiPolygon is a sequence of such ring lists.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    Polygon(Vec<Vec<Coord>>),
    MultiPoint(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }
}

/// Flat vectors for one part-structure, plus dimension presence detected
/// while flattening.
#[derive(Default)]
struct FlatCoords {
    xy: Vec<f64>,
    z: Vec<f64>,
    m: Vec<f64>,
    has_z: bool,
    has_m: bool,
}

impl FlatCoords {
    fn with_capacity(points: usize) -> FlatCoords {
        FlatCoords {
            xy: Vec::with_capacity(points * 2),
            z: Vec::with_capacity(points),
            m: Vec::with_capacity(points),
            ..Default::default()
        }
    }

    fn push(&mut self, coord: &Coord) {
        self.xy.push(coord.x);
        self.xy.push(coord.y);
        self.z.push(coord.z.unwrap_or(f64::NAN));
        self.m.push(coord.m.unwrap_or(f64::NAN));
        self.has_z |= coord.z.is_some();
        self.has_m |= coord.m.is_some();
    }

    fn extend<'a>(&mut self, coords: impl IntoIterator<Item = &'a Coord>) {
        for coord in coords {
            self.push(coord);
        }
    }
}

fn create_part<'a>(
    fbb: &mut FlatBufferBuilder<'a>,
    flat: &FlatCoords,
    ends: Option<&[u32]>,
    type_: u8,
) -> WIPOffset<fbs::Geometry<'a>> {
    let xy = Some(fbb.create_vector(&flat.xy));
    let z = flat.has_z.then(|| fbb.create_vector(&flat.z));
    let m = flat.has_m.then(|| fbb.create_vector(&flat.m));
    let ends = ends.map(|ends| fbb.create_vector(ends));
    fbs::Geometry::create(
        fbb,
        &fbs::GeometryArgs {
            ends,
            xy,
            z,
            m,
            type_,
            parts: None,
        },
    )
}

fn cumulative_ends<'a>(parts: impl IntoIterator<Item = &'a Vec<Coord>>) -> Vec<u32> {
    let mut end = 0u32;
    parts
        .into_iter()
        .map(|part| {
            end += part.len() as u32;
            end
        })
        .collect()
}

fn write_polygon<'a>(
    fbb: &mut FlatBufferBuilder<'a>,
    rings: &[Vec<Coord>],
    type_: u8,
) -> WIPOffset<fbs::Geometry<'a>> {
    let mut flat = FlatCoords::with_capacity(rings.iter().map(Vec::len).sum());
    for ring in rings {
        flat.extend(ring);
    }
    let ends = cumulative_ends(rings);
    create_part(fbb, &flat, Some(&ends), type_)
}

/// Serialize a geometry value. `declared` is the file-level kind: a
/// concrete kind is enforced against the value, Unknown makes the value's
/// own kind the tag written into the structure.
pub(crate) fn write_geometry<'a>(
    fbb: &mut FlatBufferBuilder<'a>,
    geometry: &Geometry,
    declared: GeometryType,
) -> Result<WIPOffset<fbs::Geometry<'a>>> {
    let actual = geometry.geometry_type();
    if declared != GeometryType::Unknown && declared != actual {
        return Err(Error::GeometryTypeMismatch {
            expected: declared,
            actual,
        });
    }
    // parts keep their own tag; the top level repeats it only when the
    // file-level kind leaves it undeclared
    let top_type = if declared == GeometryType::Unknown {
        actual.code()
    } else {
        0
    };
    let offset = match geometry {
        Geometry::Point(coord) => {
            let mut flat = FlatCoords::with_capacity(1);
            flat.push(coord);
            create_part(fbb, &flat, None, top_type)
        }
        Geometry::LineString(coords) | Geometry::MultiPoint(coords) => {
            let mut flat = FlatCoords::with_capacity(coords.len());
            flat.extend(coords);
            create_part(fbb, &flat, None, top_type)
        }
        Geometry::MultiLineString(lines) => {
            let mut flat = FlatCoords::with_capacity(lines.iter().map(Vec::len).sum());
            for line in lines {
                flat.extend(line);
            }
            let ends = (lines.len() > 1).then(|| cumulative_ends(lines));
            create_part(fbb, &flat, ends.as_deref(), top_type)
        }
        Geometry::Polygon(rings) => write_polygon(fbb, rings, top_type),
        Geometry::MultiPolygon(polygons) => {
            let parts = polygons
                .iter()
                .map(|rings| write_polygon(fbb, rings, GeometryType::Polygon.code()))
                .collect::<Vec<_>>();
            let parts = fbb.create_vector(&parts);
            fbs::Geometry::create(
                fbb,
                &fbs::GeometryArgs {
                    type_: top_type,
                    parts: Some(parts),
                    ..Default::default()
                },
            )
        }
        Geometry::GeometryCollection(members) => {
            let parts = members
                .iter()
                .map(|member| write_geometry(fbb, member, GeometryType::Unknown))
                .collect::<Result<Vec<_>>>()?;
            let parts = fbb.create_vector(&parts);
            fbs::Geometry::create(
                fbb,
                &fbs::GeometryArgs {
                    type_: top_type,
                    parts: Some(parts),
                    ..Default::default()
                },
            )
        }
    };
    Ok(offset)
}

fn read_coords(geometry: &fbs::Geometry) -> Vec<Coord> {
    let Some(xy) = geometry.xy() else {
        return Vec::new();
    };
    let z = geometry.z();
    let m = geometry.m();
    let points = xy.len() / 2;
    (0..points)
        .map(|i| Coord {
            x: xy.get(i * 2),
            y: xy.get(i * 2 + 1),
            z: z.filter(|z| i < z.len()).map(|z| z.get(i)),
            m: m.filter(|m| i < m.len()).map(|m| m.get(i)),
        })
        .collect()
}

/// Split a flat coordinate vector at cumulative point-count boundaries.
fn split_at_ends(coords: Vec<Coord>, geometry: &fbs::Geometry) -> Vec<Vec<Coord>> {
    match geometry.ends() {
        Some(ends) if ends.len() > 1 => {
            let mut parts = Vec::with_capacity(ends.len());
            let mut start = 0usize;
            for i in 0..ends.len() {
                // clamp keeps corrupt, non-monotonic offsets from panicking
                let end = (ends.get(i) as usize).clamp(start, coords.len());
                parts.push(coords[start..end].to_vec());
                start = end;
            }
            parts
        }
        _ => vec![coords],
    }
}

fn read_polygon(geometry: &fbs::Geometry) -> Vec<Vec<Coord>> {
    split_at_ends(read_coords(geometry), geometry)
}

/// Rebuild a geometry value. An Unknown effective kind yields an absent
/// geometry; kinds outside the representable range are an error.
pub(crate) fn read_geometry(
    geometry: fbs::Geometry,
    declared: GeometryType,
) -> Result<Option<Geometry>> {
    let effective = if declared == GeometryType::Unknown {
        GeometryType::from_code(geometry.type_())
            .ok_or(Error::UnknownGeometryType(geometry.type_()))?
    } else {
        declared
    };
    let value = match effective {
        GeometryType::Unknown => return Ok(None),
        GeometryType::Point => {
            let coords = read_coords(&geometry);
            match coords.first() {
                Some(coord) => Geometry::Point(*coord),
                // an empty point carries no coordinates to rebuild
                None => return Ok(None),
            }
        }
        GeometryType::LineString => Geometry::LineString(read_coords(&geometry)),
        GeometryType::MultiPoint => Geometry::MultiPoint(read_coords(&geometry)),
        GeometryType::MultiLineString => {
            Geometry::MultiLineString(split_at_ends(read_coords(&geometry), &geometry))
        }
        GeometryType::Polygon => Geometry::Polygon(read_polygon(&geometry)),
        GeometryType::MultiPolygon => {
            let mut polygons = Vec::new();
            if let Some(parts) = geometry.parts() {
                polygons.reserve(parts.len());
                for i in 0..parts.len() {
                    polygons.push(read_polygon(&parts.get(i)));
                }
            }
            Geometry::MultiPolygon(polygons)
        }
        GeometryType::GeometryCollection => {
            let mut members = Vec::new();
            if let Some(parts) = geometry.parts() {
                members.reserve(parts.len());
                for i in 0..parts.len() {
                    if let Some(member) = read_geometry(parts.get(i), GeometryType::Unknown)? {
                        members.push(member);
                    }
                }
            }
            Geometry::GeometryCollection(members)
        }
        other => return Err(Error::UnsupportedGeometryType(other)),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(geometry: &Geometry, declared: GeometryType) -> Option<Geometry> {
        let mut fbb = FlatBufferBuilder::new();
        let offset = write_geometry(&mut fbb, geometry, declared).unwrap();
        fbb.finish(offset, None);
        let decoded = flatbuffers::root::<fbs::Geometry>(fbb.finished_data()).unwrap();
        read_geometry(decoded, declared).unwrap()
    }

    fn ring(coords: &[(f64, f64)]) -> Vec<Coord> {
        coords.iter().map(|&(x, y)| Coord::new(x, y)).collect()
    }

    #[test]
    fn point_roundtrip() {
        let point = Geometry::Point(Coord::new(1.0, 2.0));
        assert_eq!(roundtrip(&point, GeometryType::Point), Some(point.clone()));
        assert_eq!(roundtrip(&point, GeometryType::Unknown), Some(point));
    }

    #[test]
    fn point_with_z_and_m() {
        let point = Geometry::Point(Coord::new(1.0, 2.0).with_z(3.0).with_m(4.0));
        assert_eq!(roundtrip(&point, GeometryType::Point), Some(point));
    }

    #[test]
    fn linestring_roundtrip() {
        let line = Geometry::LineString(ring(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]));
        assert_eq!(roundtrip(&line, GeometryType::LineString), Some(line));
    }

    #[test]
    fn single_line_multilinestring_needs_no_ends() {
        let mls = Geometry::MultiLineString(vec![ring(&[(0.0, 0.0), (1.0, 1.0)])]);
        assert_eq!(roundtrip(&mls, GeometryType::MultiLineString), Some(mls));
    }

    #[test]
    fn multilinestring_roundtrip() {
        let mls = Geometry::MultiLineString(vec![
            ring(&[(0.0, 0.0), (1.0, 1.0)]),
            ring(&[(2.0, 2.0), (3.0, 3.0), (4.0, 2.0)]),
        ]);
        assert_eq!(roundtrip(&mls, GeometryType::MultiLineString), Some(mls));
    }

    #[test]
    fn polygon_shell_and_holes_keep_order() {
        let shell = ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        let hole1 = ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)]);
        let hole2 = ring(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 5.0)]);
        let polygon = Geometry::Polygon(vec![shell.clone(), hole1.clone(), hole2.clone()]);
        let Some(Geometry::Polygon(rings)) = roundtrip(&polygon, GeometryType::Polygon) else {
            panic!("expected polygon");
        };
        assert_eq!(rings, vec![shell, hole1, hole2]);
    }

    #[test]
    fn multipolygon_nests_parts() {
        let mp = Geometry::MultiPolygon(vec![
            vec![ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])],
            vec![
                ring(&[(10.0, 10.0), (20.0, 10.0), (20.0, 20.0), (10.0, 10.0)]),
                ring(&[(12.0, 12.0), (13.0, 12.0), (13.0, 13.0), (12.0, 12.0)]),
            ],
        ]);
        assert_eq!(roundtrip(&mp, GeometryType::MultiPolygon), Some(mp));
    }

    #[test]
    fn geometry_collection_parts_keep_their_kinds() {
        let gc = Geometry::GeometryCollection(vec![
            Geometry::Point(Coord::new(1.0, 2.0)),
            Geometry::LineString(ring(&[(0.0, 0.0), (1.0, 1.0)])),
        ]);
        assert_eq!(roundtrip(&gc, GeometryType::GeometryCollection), Some(gc));
    }

    #[test]
    fn declared_kind_is_enforced() {
        let mut fbb = FlatBufferBuilder::new();
        let point = Geometry::Point(Coord::new(1.0, 2.0));
        let err = write_geometry(&mut fbb, &point, GeometryType::Polygon).unwrap_err();
        assert!(matches!(err, Error::GeometryTypeMismatch { .. }));
    }
}
