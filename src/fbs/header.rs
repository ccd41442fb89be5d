//! Header, Column and Crs tables.

use flatbuffers::{
    FlatBufferBuilder, Follow, ForwardsUOffset, InvalidFlatbuffer, Table, VOffsetT, Vector,
    Verifiable, Verifier, WIPOffset,
};

pub fn root_as_header(buf: &[u8]) -> Result<Header, InvalidFlatbuffer> {
    flatbuffers::root::<Header>(buf)
}

#[derive(Copy, Clone)]
pub struct Header<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for Header<'a> {
    type Inner = Header<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: Table::new(buf, loc),
        }
    }
}

impl<'a> Header<'a> {
    pub const VT_NAME: VOffsetT = 4;
    pub const VT_ENVELOPE: VOffsetT = 6;
    pub const VT_GEOMETRY_TYPE: VOffsetT = 8;
    pub const VT_HAS_Z: VOffsetT = 10;
    pub const VT_HAS_M: VOffsetT = 12;
    pub const VT_HAS_T: VOffsetT = 14;
    pub const VT_HAS_TM: VOffsetT = 16;
    pub const VT_COLUMNS: VOffsetT = 18;
    pub const VT_FEATURES_COUNT: VOffsetT = 20;
    pub const VT_INDEX_NODE_SIZE: VOffsetT = 22;
    pub const VT_CRS: VOffsetT = 24;
    pub const VT_TITLE: VOffsetT = 26;
    pub const VT_DESCRIPTION: VOffsetT = 28;
    pub const VT_METADATA: VOffsetT = 30;

    pub fn name(&self) -> Option<&'a str> {
        unsafe { self._tab.get::<ForwardsUOffset<&str>>(Self::VT_NAME, None) }
    }

    pub fn envelope(&self) -> Option<Vector<'a, f64>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, f64>>>(Self::VT_ENVELOPE, None)
        }
    }

    pub fn geometry_type(&self) -> u8 {
        unsafe {
            self._tab
                .get::<u8>(Self::VT_GEOMETRY_TYPE, Some(0))
                .unwrap()
        }
    }

    pub fn columns(&self) -> Option<Vector<'a, ForwardsUOffset<Column<'a>>>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<Column<'a>>>>>(
                    Self::VT_COLUMNS,
                    None,
                )
        }
    }

    pub fn features_count(&self) -> u64 {
        unsafe {
            self._tab
                .get::<u64>(Self::VT_FEATURES_COUNT, Some(0))
                .unwrap()
        }
    }

    pub fn index_node_size(&self) -> u16 {
        unsafe {
            self._tab
                .get::<u16>(Self::VT_INDEX_NODE_SIZE, Some(16))
                .unwrap()
        }
    }

    pub fn crs(&self) -> Option<Crs<'a>> {
        unsafe { self._tab.get::<ForwardsUOffset<Crs>>(Self::VT_CRS, None) }
    }
}

impl Verifiable for Header<'_> {
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<&str>>("name", Self::VT_NAME, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, f64>>>("envelope", Self::VT_ENVELOPE, false)?
            .visit_field::<u8>("geometry_type", Self::VT_GEOMETRY_TYPE, false)?
            .visit_field::<bool>("has_z", Self::VT_HAS_Z, false)?
            .visit_field::<bool>("has_m", Self::VT_HAS_M, false)?
            .visit_field::<bool>("has_t", Self::VT_HAS_T, false)?
            .visit_field::<bool>("has_tm", Self::VT_HAS_TM, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<Column>>>>(
                "columns",
                Self::VT_COLUMNS,
                false,
            )?
            .visit_field::<u64>("features_count", Self::VT_FEATURES_COUNT, false)?
            .visit_field::<u16>("index_node_size", Self::VT_INDEX_NODE_SIZE, false)?
            .visit_field::<ForwardsUOffset<Crs>>("crs", Self::VT_CRS, false)?
            .visit_field::<ForwardsUOffset<&str>>("title", Self::VT_TITLE, false)?
            .visit_field::<ForwardsUOffset<&str>>("description", Self::VT_DESCRIPTION, false)?
            .visit_field::<ForwardsUOffset<&str>>("metadata", Self::VT_METADATA, false)?
            .finish();
        Ok(())
    }
}

pub struct HeaderArgs<'a> {
    pub name: Option<WIPOffset<&'a str>>,
    pub envelope: Option<WIPOffset<Vector<'a, f64>>>,
    pub geometry_type: u8,
    pub columns: Option<WIPOffset<Vector<'a, ForwardsUOffset<Column<'a>>>>>,
    pub features_count: u64,
    pub index_node_size: u16,
    pub crs: Option<WIPOffset<Crs<'a>>>,
}

impl Default for HeaderArgs<'_> {
    fn default() -> Self {
        HeaderArgs {
            name: None,
            envelope: None,
            geometry_type: 0,
            columns: None,
            features_count: 0,
            index_node_size: 16,
            crs: None,
        }
    }
}

impl<'a> Header<'a> {
    pub fn create(
        fbb: &mut FlatBufferBuilder<'a>,
        args: &HeaderArgs<'a>,
    ) -> WIPOffset<Header<'a>> {
        let start = fbb.start_table();
        fbb.push_slot::<u64>(Self::VT_FEATURES_COUNT, args.features_count, 0);
        if let Some(name) = args.name {
            fbb.push_slot_always(Self::VT_NAME, name);
        }
        if let Some(envelope) = args.envelope {
            fbb.push_slot_always(Self::VT_ENVELOPE, envelope);
        }
        if let Some(columns) = args.columns {
            fbb.push_slot_always(Self::VT_COLUMNS, columns);
        }
        if let Some(crs) = args.crs {
            fbb.push_slot_always(Self::VT_CRS, crs);
        }
        fbb.push_slot::<u16>(Self::VT_INDEX_NODE_SIZE, args.index_node_size, 16);
        fbb.push_slot::<u8>(Self::VT_GEOMETRY_TYPE, args.geometry_type, 0);
        let end = fbb.end_table(start);
        WIPOffset::new(end.value())
    }
}

#[derive(Copy, Clone)]
pub struct Column<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for Column<'a> {
    type Inner = Column<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: Table::new(buf, loc),
        }
    }
}

impl<'a> Column<'a> {
    pub const VT_NAME: VOffsetT = 4;
    pub const VT_TYPE: VOffsetT = 6;
    pub const VT_TITLE: VOffsetT = 8;
    pub const VT_DESCRIPTION: VOffsetT = 10;
    pub const VT_WIDTH: VOffsetT = 12;
    pub const VT_PRECISION: VOffsetT = 14;
    pub const VT_SCALE: VOffsetT = 16;
    pub const VT_NULLABLE: VOffsetT = 18;
    pub const VT_UNIQUE: VOffsetT = 20;
    pub const VT_PRIMARY_KEY: VOffsetT = 22;
    pub const VT_METADATA: VOffsetT = 24;

    /// Required by the schema.
    pub fn name(&self) -> &'a str {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<&str>>(Self::VT_NAME, None)
                .unwrap()
        }
    }

    pub fn type_(&self) -> u8 {
        unsafe { self._tab.get::<u8>(Self::VT_TYPE, Some(0)).unwrap() }
    }

    pub fn nullable(&self) -> bool {
        unsafe { self._tab.get::<bool>(Self::VT_NULLABLE, Some(true)).unwrap() }
    }

    pub fn unique(&self) -> bool {
        unsafe { self._tab.get::<bool>(Self::VT_UNIQUE, Some(false)).unwrap() }
    }

    pub fn primary_key(&self) -> bool {
        unsafe {
            self._tab
                .get::<bool>(Self::VT_PRIMARY_KEY, Some(false))
                .unwrap()
        }
    }
}

impl Verifiable for Column<'_> {
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<&str>>("name", Self::VT_NAME, true)?
            .visit_field::<u8>("type", Self::VT_TYPE, false)?
            .visit_field::<ForwardsUOffset<&str>>("title", Self::VT_TITLE, false)?
            .visit_field::<ForwardsUOffset<&str>>("description", Self::VT_DESCRIPTION, false)?
            .visit_field::<i32>("width", Self::VT_WIDTH, false)?
            .visit_field::<i32>("precision", Self::VT_PRECISION, false)?
            .visit_field::<i32>("scale", Self::VT_SCALE, false)?
            .visit_field::<bool>("nullable", Self::VT_NULLABLE, false)?
            .visit_field::<bool>("unique", Self::VT_UNIQUE, false)?
            .visit_field::<bool>("primary_key", Self::VT_PRIMARY_KEY, false)?
            .visit_field::<ForwardsUOffset<&str>>("metadata", Self::VT_METADATA, false)?
            .finish();
        Ok(())
    }
}

pub struct ColumnArgs<'a> {
    pub name: Option<WIPOffset<&'a str>>,
    pub type_: u8,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
}

impl Default for ColumnArgs<'_> {
    fn default() -> Self {
        ColumnArgs {
            name: None,
            type_: 0,
            nullable: true,
            unique: false,
            primary_key: false,
        }
    }
}

impl<'a> Column<'a> {
    pub fn create(
        fbb: &mut FlatBufferBuilder<'a>,
        args: &ColumnArgs<'a>,
    ) -> WIPOffset<Column<'a>> {
        let start = fbb.start_table();
        if let Some(name) = args.name {
            fbb.push_slot_always(Self::VT_NAME, name);
        }
        fbb.push_slot::<u8>(Self::VT_TYPE, args.type_, 0);
        fbb.push_slot::<bool>(Self::VT_NULLABLE, args.nullable, true);
        fbb.push_slot::<bool>(Self::VT_UNIQUE, args.unique, false);
        fbb.push_slot::<bool>(Self::VT_PRIMARY_KEY, args.primary_key, false);
        let end = fbb.end_table(start);
        WIPOffset::new(end.value())
    }
}

#[derive(Copy, Clone)]
pub struct Crs<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for Crs<'a> {
    type Inner = Crs<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: Table::new(buf, loc),
        }
    }
}

impl<'a> Crs<'a> {
    pub const VT_ORG: VOffsetT = 4;
    pub const VT_CODE: VOffsetT = 6;
    pub const VT_NAME: VOffsetT = 8;
    pub const VT_DESCRIPTION: VOffsetT = 10;
    pub const VT_WKT: VOffsetT = 12;
    pub const VT_CODE_STRING: VOffsetT = 14;

    pub fn code(&self) -> i32 {
        unsafe { self._tab.get::<i32>(Self::VT_CODE, Some(0)).unwrap() }
    }
}

impl Verifiable for Crs<'_> {
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<&str>>("org", Self::VT_ORG, false)?
            .visit_field::<i32>("code", Self::VT_CODE, false)?
            .visit_field::<ForwardsUOffset<&str>>("name", Self::VT_NAME, false)?
            .visit_field::<ForwardsUOffset<&str>>("description", Self::VT_DESCRIPTION, false)?
            .visit_field::<ForwardsUOffset<&str>>("wkt", Self::VT_WKT, false)?
            .visit_field::<ForwardsUOffset<&str>>("code_string", Self::VT_CODE_STRING, false)?
            .finish();
        Ok(())
    }
}

#[derive(Default)]
pub struct CrsArgs {
    pub code: i32,
}

impl<'a> Crs<'a> {
    pub fn create(fbb: &mut FlatBufferBuilder<'a>, args: &CrsArgs) -> WIPOffset<Crs<'a>> {
        let start = fbb.start_table();
        fbb.push_slot::<i32>(Self::VT_CODE, args.code, 0);
        let end = fbb.end_table(start);
        WIPOffset::new(end.value())
    }
}
