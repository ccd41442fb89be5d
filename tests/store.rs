use flatgeotable::*;
use tempfile::tempdir;

fn cities_schema(count: u64) -> TableSchema {
    TableSchema::new("cities", GeometryType::Point)
        .with_column(Column::new("id", ColumnType::Long).not_null())
        .with_column(Column::new("name", ColumnType::String))
        .with_features_count(count)
        .with_srid(4326)
}

fn city(id: i64, name: &str, x: f64, y: f64) -> Row {
    Row::new(Some(Geometry::Point(Coord::new(x, y))))
        .with_property(0, id)
        .with_property(1, name)
}

fn sample_rows() -> Vec<Row> {
    vec![
        city(1, "Zurich", 8.54, 47.37),
        city(2, "Geneva", 6.14, 46.2),
        city(3, "Basel", 7.59, 47.56),
    ]
}

fn populate(store: &TableStore, dir: &std::path::Path) {
    let path = dir.join("staging.fgb");
    FgbTable::create(&path, cities_schema(3))
        .write(sample_rows().into_iter().map(Ok))
        .unwrap();
    let staged = FgbTable::open(&path).unwrap();
    store.add(&staged).unwrap();
    std::fs::remove_file(path).unwrap();
}

#[test]
fn add_list_get_remove() {
    let staging = tempdir().unwrap();
    let data = tempdir().unwrap();
    let store = TableStore::directory(data.path());
    assert!(store.list().unwrap().is_empty());

    populate(&store, staging.path());
    assert_eq!(store.list().unwrap(), vec!["cities".to_string()]);

    let table = store.get("cities").unwrap();
    assert_eq!(table.schema().columns.len(), 2);
    assert_eq!(table.row_count(), 3);
    let rows = table
        .rows()
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(rows, sample_rows());

    store.remove("cities").unwrap();
    assert!(store.list().unwrap().is_empty());
    assert!(matches!(
        store.get("cities").unwrap_err(),
        Error::TableNotFound(_)
    ));
}

#[test]
fn concurrent_readers_share_no_state() {
    let staging = tempdir().unwrap();
    let data = tempdir().unwrap();
    let store = TableStore::directory(data.path());
    populate(&store, staging.path());

    let table = store.get("cities").unwrap();
    let mut first = table.rows().unwrap();
    let mut second = table.rows().unwrap();
    let expected = sample_rows();
    for row in &expected {
        assert_eq!(&first.next().unwrap().unwrap(), row);
    }
    for row in &expected {
        assert_eq!(&second.next().unwrap().unwrap(), row);
    }
}

#[test]
fn add_replaces_previous_file() {
    let staging = tempdir().unwrap();
    let data = tempdir().unwrap();
    let store = TableStore::directory(data.path());
    populate(&store, staging.path());

    let path = staging.path().join("one.fgb");
    let mut schema = cities_schema(1);
    schema.name = "cities".to_string();
    FgbTable::create(&path, schema)
        .write([Ok(city(9, "Bern", 7.45, 46.95))])
        .unwrap();
    store.add(&FgbTable::open(&path).unwrap()).unwrap();

    let rows = store
        .get("cities")
        .unwrap()
        .rows()
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(rows, vec![city(9, "Bern", 7.45, 46.95)]);
}

#[test]
fn copying_between_stores_preserves_schema_and_rows() {
    let staging = tempdir().unwrap();
    let source_dir = tempdir().unwrap();
    let target_dir = tempdir().unwrap();
    let source = TableStore::directory(source_dir.path());
    let target = TableStore::directory(target_dir.path());
    populate(&source, staging.path());

    let table = source.get("cities").unwrap();
    target.add(&table).unwrap();

    let copy = target.get("cities").unwrap();
    assert_eq!(copy.schema(), table.schema());
    assert_eq!(
        copy.rows().unwrap().collect::<Result<Vec<_>>>().unwrap(),
        table.rows().unwrap().collect::<Result<Vec<_>>>().unwrap()
    );
}

#[test]
fn single_file_store_is_bound_to_one_name() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cities.fgb");
    FgbTable::create(&path, cities_schema(3))
        .write(sample_rows().into_iter().map(Ok))
        .unwrap();

    let store = TableStore::single_file(&path);
    assert_eq!(store.list().unwrap(), vec!["cities".to_string()]);
    assert_eq!(store.get("cities").unwrap().row_count(), 3);
    assert!(matches!(
        store.get("rivers").unwrap_err(),
        Error::TableNotFound(_)
    ));

    store.remove("cities").unwrap();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn removing_a_missing_table_fails() {
    let dir = tempdir().unwrap();
    let store = TableStore::directory(dir.path());
    assert!(matches!(
        store.remove("ghost").unwrap_err(),
        Error::TableNotFound(_)
    ));
}

#[test]
fn list_ignores_foreign_files() {
    let staging = tempdir().unwrap();
    let dir = tempdir().unwrap();
    let store = TableStore::directory(dir.path());
    populate(&store, staging.path());
    std::fs::write(dir.path().join("notes.txt"), b"not a table").unwrap();
    assert_eq!(store.list().unwrap(), vec!["cities".to_string()]);
}
