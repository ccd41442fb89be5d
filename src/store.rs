//! Directory- and single-file-backed table catalogs.

use crate::error::{Error, Result};
use crate::file_reader::{RowIter, TableReader};
use crate::file_writer::TableWriter;
use crate::row::Row;
use crate::schema::TableSchema;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Conventional file extension for tables managed by a store.
pub const FILE_EXTENSION: &str = "fgb";

/// A named row source. File-backed tables, and the parallel format
/// adapters feeding imports, all expose this surface.
pub trait Table {
    type Rows: Iterator<Item = Result<Row>>;

    fn schema(&self) -> &TableSchema;

    /// Cheap long-form size, used as the declared feature count when the
    /// table is materialized.
    fn row_count(&self) -> u64 {
        self.schema().features_count
    }

    /// A fresh pass over the rows.
    fn rows(&self) -> Result<Self::Rows>;
}

/// A table bound to one file path.
#[derive(Debug)]
pub struct FgbTable {
    path: PathBuf,
    schema: TableSchema,
}

impl FgbTable {
    /// Bind to an existing file, reading its schema eagerly.
    pub fn open(path: impl Into<PathBuf>) -> Result<FgbTable> {
        let path = path.into();
        let reader = TableReader::open(BufReader::new(File::open(&path)?))?;
        let schema = reader.schema().clone();
        Ok(FgbTable { path, schema })
    }

    /// Bind a path for writing with the given schema.
    pub fn create(path: impl Into<PathBuf>, schema: TableSchema) -> FgbTable {
        FgbTable {
            path: path.into(),
            schema,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open an independent reader over the file. Every call opens its own
    /// channel, so concurrent iterations share no cursor state.
    pub fn reader(&self) -> Result<TableReader<BufReader<File>>> {
        TableReader::open(BufReader::new(File::open(&self.path)?))
    }

    /// Materialize the file from a row sequence, truncating any previous
    /// content. The bound schema's feature count must match the sequence.
    pub fn write(&self, rows: impl IntoIterator<Item = Result<Row>>) -> Result<()> {
        let out = BufWriter::new(File::create(&self.path)?);
        let mut writer = TableWriter::create(out, self.schema.clone())?;
        for row in rows {
            writer.write_row(&row?)?;
        }
        writer.finish()?;
        Ok(())
    }
}

impl Table for FgbTable {
    type Rows = RowIter<BufReader<File>>;

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn rows(&self) -> Result<Self::Rows> {
        Ok(self.reader()?.rows()?.into_rows())
    }
}

enum StoreLayout {
    Directory(PathBuf),
    SingleFile(PathBuf),
}

/// A catalog of named tables: every `.fgb` file of a directory, or one
/// bound file. Writer/reader access to the same path is not serialized
/// here; callers coordinate that externally.
pub struct TableStore {
    layout: StoreLayout,
}

impl TableStore {
    pub fn directory(path: impl Into<PathBuf>) -> TableStore {
        TableStore {
            layout: StoreLayout::Directory(path.into()),
        }
    }

    pub fn single_file(path: impl Into<PathBuf>) -> TableStore {
        TableStore {
            layout: StoreLayout::SingleFile(path.into()),
        }
    }

    fn file_name(name: &str) -> String {
        let suffix = format!(".{FILE_EXTENSION}");
        if name.ends_with(&suffix) {
            name.to_string()
        } else {
            format!("{name}{suffix}")
        }
    }

    fn table_name(path: &Path) -> Option<String> {
        if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
            return None;
        }
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        match &self.layout {
            StoreLayout::Directory(dir) => Ok(dir.join(Self::file_name(name))),
            StoreLayout::SingleFile(path) => {
                let bound = Self::table_name(path);
                if bound.as_deref() == Some(name.strip_suffix(".fgb").unwrap_or(name)) {
                    Ok(path.clone())
                } else {
                    Err(Error::TableNotFound(name.to_string()))
                }
            }
        }
    }

    /// Names of the tables present.
    pub fn list(&self) -> Result<Vec<String>> {
        match &self.layout {
            StoreLayout::Directory(dir) => {
                let mut names = Vec::new();
                for entry in std::fs::read_dir(dir)? {
                    let path = entry?.path();
                    if path.is_file() {
                        if let Some(name) = Self::table_name(&path) {
                            names.push(name);
                        }
                    }
                }
                names.sort();
                Ok(names)
            }
            StoreLayout::SingleFile(path) => {
                Ok(path.is_file().then(|| Self::table_name(path)).flatten().into_iter().collect())
            }
        }
    }

    /// A handle on a stored table.
    pub fn get(&self, name: &str) -> Result<FgbTable> {
        let path = self.resolve(name)?;
        if !path.is_file() {
            return Err(Error::TableNotFound(name.to_string()));
        }
        FgbTable::open(path)
    }

    /// Materialize a table by draining the given row source, replacing any
    /// file of the same derived name.
    pub fn add<T: Table>(&self, table: &T) -> Result<()> {
        let name = table.schema().name.clone();
        let path = self.resolve(&name)?;
        let mut schema = table.schema().clone();
        schema.features_count = table.row_count();
        info!(
            "writing table `{name}` ({} features) to {}",
            schema.features_count,
            path.display()
        );
        FgbTable::create(path, schema).write(table.rows()?)
    }

    /// Delete a stored table's file.
    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        if !path.is_file() {
            return Err(Error::TableNotFound(name.to_string()));
        }
        debug!("removing {}", path.display());
        std::fs::remove_file(path)?;
        Ok(())
    }
}
