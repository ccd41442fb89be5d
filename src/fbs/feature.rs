//! Feature and Geometry tables.

use crate::fbs::header::Column;
use flatbuffers::{
    FlatBufferBuilder, Follow, ForwardsUOffset, InvalidFlatbuffer, Table, VOffsetT, Vector,
    Verifiable, Verifier, WIPOffset,
};

pub fn root_as_feature(buf: &[u8]) -> Result<Feature, InvalidFlatbuffer> {
    flatbuffers::root::<Feature>(buf)
}

#[derive(Copy, Clone, Debug)]
pub struct Geometry<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for Geometry<'a> {
    type Inner = Geometry<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: Table::new(buf, loc),
        }
    }
}

impl<'a> Geometry<'a> {
    pub const VT_ENDS: VOffsetT = 4;
    pub const VT_XY: VOffsetT = 6;
    pub const VT_Z: VOffsetT = 8;
    pub const VT_M: VOffsetT = 10;
    pub const VT_T: VOffsetT = 12;
    pub const VT_TM: VOffsetT = 14;
    pub const VT_TYPE: VOffsetT = 16;
    pub const VT_PARTS: VOffsetT = 18;

    /// Cumulative point counts delimiting rings or line parts.
    pub fn ends(&self) -> Option<Vector<'a, u32>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, u32>>>(Self::VT_ENDS, None)
        }
    }

    /// Interleaved x/y pairs.
    pub fn xy(&self) -> Option<Vector<'a, f64>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, f64>>>(Self::VT_XY, None)
        }
    }

    pub fn z(&self) -> Option<Vector<'a, f64>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, f64>>>(Self::VT_Z, None)
        }
    }

    pub fn m(&self) -> Option<Vector<'a, f64>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, f64>>>(Self::VT_M, None)
        }
    }

    pub fn type_(&self) -> u8 {
        unsafe { self._tab.get::<u8>(Self::VT_TYPE, Some(0)).unwrap() }
    }

    /// Sub-structures of a multi-part geometry.
    pub fn parts(&self) -> Option<Vector<'a, ForwardsUOffset<Geometry<'a>>>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<Geometry<'a>>>>>(
                    Self::VT_PARTS,
                    None,
                )
        }
    }
}

impl Verifiable for Geometry<'_> {
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'_, u32>>>("ends", Self::VT_ENDS, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, f64>>>("xy", Self::VT_XY, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, f64>>>("z", Self::VT_Z, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, f64>>>("m", Self::VT_M, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, f64>>>("t", Self::VT_T, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, u64>>>("tm", Self::VT_TM, false)?
            .visit_field::<u8>("type", Self::VT_TYPE, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<Geometry>>>>(
                "parts",
                Self::VT_PARTS,
                false,
            )?
            .finish();
        Ok(())
    }
}

#[derive(Default)]
pub struct GeometryArgs<'a> {
    pub ends: Option<WIPOffset<Vector<'a, u32>>>,
    pub xy: Option<WIPOffset<Vector<'a, f64>>>,
    pub z: Option<WIPOffset<Vector<'a, f64>>>,
    pub m: Option<WIPOffset<Vector<'a, f64>>>,
    pub type_: u8,
    pub parts: Option<WIPOffset<Vector<'a, ForwardsUOffset<Geometry<'a>>>>>,
}

impl<'a> Geometry<'a> {
    pub fn create(
        fbb: &mut FlatBufferBuilder<'a>,
        args: &GeometryArgs<'a>,
    ) -> WIPOffset<Geometry<'a>> {
        let start = fbb.start_table();
        if let Some(ends) = args.ends {
            fbb.push_slot_always(Self::VT_ENDS, ends);
        }
        if let Some(xy) = args.xy {
            fbb.push_slot_always(Self::VT_XY, xy);
        }
        if let Some(z) = args.z {
            fbb.push_slot_always(Self::VT_Z, z);
        }
        if let Some(m) = args.m {
            fbb.push_slot_always(Self::VT_M, m);
        }
        if let Some(parts) = args.parts {
            fbb.push_slot_always(Self::VT_PARTS, parts);
        }
        fbb.push_slot::<u8>(Self::VT_TYPE, args.type_, 0);
        let end = fbb.end_table(start);
        WIPOffset::new(end.value())
    }
}

#[derive(Copy, Clone)]
pub struct Feature<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for Feature<'a> {
    type Inner = Feature<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: Table::new(buf, loc),
        }
    }
}

impl<'a> Feature<'a> {
    pub const VT_GEOMETRY: VOffsetT = 4;
    pub const VT_PROPERTIES: VOffsetT = 6;
    pub const VT_COLUMNS: VOffsetT = 8;

    pub fn geometry(&self) -> Option<Geometry<'a>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Geometry>>(Self::VT_GEOMETRY, None)
        }
    }

    /// The raw property block: tag/value pairs in column order.
    pub fn properties(&self) -> Option<Vector<'a, u8>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, u8>>>(Self::VT_PROPERTIES, None)
        }
    }
}

impl Verifiable for Feature<'_> {
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Geometry>>("geometry", Self::VT_GEOMETRY, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, u8>>>(
                "properties",
                Self::VT_PROPERTIES,
                false,
            )?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<Column>>>>(
                "columns",
                Self::VT_COLUMNS,
                false,
            )?
            .finish();
        Ok(())
    }
}

#[derive(Default)]
pub struct FeatureArgs<'a> {
    pub geometry: Option<WIPOffset<Geometry<'a>>>,
    pub properties: Option<WIPOffset<Vector<'a, u8>>>,
}

impl<'a> Feature<'a> {
    pub fn create(
        fbb: &mut FlatBufferBuilder<'a>,
        args: &FeatureArgs<'a>,
    ) -> WIPOffset<Feature<'a>> {
        let start = fbb.start_table();
        if let Some(geometry) = args.geometry {
            fbb.push_slot_always(Self::VT_GEOMETRY, geometry);
        }
        if let Some(properties) = args.properties {
            fbb.push_slot_always(Self::VT_PROPERTIES, properties);
        }
        let end = fbb.end_table(start);
        WIPOffset::new(end.value())
    }
}
