//! Forward-only table reader.

use crate::cursor::BufferCursor;
use crate::error::{Error, Result};
use crate::feature::decode_feature;
use crate::header::read_header;
use crate::packed_r_tree;
use crate::row::Row;
use crate::schema::TableSchema;
use byteorder::{ByteOrder, LittleEndian};
use fallible_streaming_iterator::FallibleStreamingIterator;
use std::io::Read;
use std::marker::PhantomData;

/// Largest index region the reader accepts before skipping it.
const INDEX_MAX_BUFFER_SIZE: u64 = 1 << 31;

// Reader states for ensuring correct read API usage at compile-time
pub(crate) mod reader_state {
    #[derive(Debug)]
    pub struct Open;
    #[derive(Debug)]
    pub struct RowsSelected;
}
use reader_state::*;

/// Streaming table reader over any byte channel.
///
/// Opening parses the schema header; [`TableReader::rows`] skips the index
/// region and moves the reader into its row-yielding state.
#[derive(Debug)]
pub struct TableReader<R, State = Open> {
    cursor: BufferCursor<R>,
    schema: TableSchema,
    /// Declared number of feature frames.
    count: u64,
    /// Frames consumed so far; `count + 1` once exhausted.
    feat_no: u64,
    row: Row,
    state: PhantomData<State>,
}

impl<R: Read> TableReader<R, Open> {
    /// Open a table by reading the header information.
    pub fn open(channel: R) -> Result<TableReader<R, Open>> {
        let mut cursor = BufferCursor::new(channel);
        let schema = read_header(&mut cursor)?;
        let count = schema.features_count;
        Ok(TableReader {
            cursor,
            schema,
            count,
            feat_no: 0,
            row: Row::default(),
            state: PhantomData,
        })
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Skip the index region and expose the feature frames.
    pub fn rows(mut self) -> Result<TableReader<R, RowsSelected>> {
        let index_size = if self.schema.index_node_size > 0 {
            packed_r_tree::index_size(self.count, self.schema.index_node_size)?
        } else {
            0
        };
        if index_size > INDEX_MAX_BUFFER_SIZE {
            return Err(Error::IndexSizeOverflow(index_size));
        }
        let skipped = self.cursor.skip(index_size)?;
        if skipped < index_size {
            return Err(Error::Truncated {
                expected: index_size as usize,
                actual: skipped as usize,
            });
        }
        Ok(TableReader {
            cursor: self.cursor,
            schema: self.schema,
            count: self.count,
            feat_no: 0,
            row: self.row,
            state: PhantomData,
        })
    }
}

impl<R: Read> TableReader<R, RowsSelected> {
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Number of feature frames declared by the header.
    pub fn features_count(&self) -> u64 {
        self.count
    }

    /// Adapter yielding owned rows, for draining into a sink.
    pub fn into_rows(self) -> RowIter<R> {
        RowIter {
            reader: self,
            done: false,
        }
    }
}

/// Each call to `next` can fail, and the yielded row stays valid until the
/// following `next` call. `while let Some(row) = reader.next()?` reads a
/// table to the end; exhaustion of the channel before the declared feature
/// count surfaces as [`Error::Truncated`] on the call that hits it, with
/// previously yielded rows unaffected.
impl<R: Read> FallibleStreamingIterator for TableReader<R, RowsSelected> {
    type Error = Error;
    type Item = Row;

    fn advance(&mut self) -> Result<()> {
        if self.feat_no >= self.count {
            self.feat_no = self.count + 1;
            return Ok(());
        }
        let got = self.cursor.ensure(4)?;
        if got < 4 {
            return Err(Error::Truncated {
                expected: 4,
                actual: got,
            });
        }
        let frame_size = LittleEndian::read_u32(self.cursor.data()) as usize;
        self.cursor.consume(4);
        let got = self.cursor.ensure(frame_size)?;
        if got < frame_size {
            return Err(Error::Truncated {
                expected: frame_size,
                actual: got,
            });
        }
        self.row = decode_feature(&self.schema, &self.cursor.data()[..frame_size])?;
        self.cursor.consume(frame_size);
        self.feat_no += 1;
        Ok(())
    }

    fn get(&self) -> Option<&Row> {
        if self.feat_no == 0 || self.feat_no > self.count {
            None
        } else {
            Some(&self.row)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.feat_no >= self.count {
            (0, Some(0))
        } else {
            let remaining = (self.count - self.feat_no) as usize;
            (remaining, Some(remaining))
        }
    }
}

/// Owned-row iterator; fused after the first error.
pub struct RowIter<R> {
    reader: TableReader<R, RowsSelected>,
    done: bool,
}

impl<R: Read> RowIter<R> {
    pub fn schema(&self) -> &TableSchema {
        self.reader.schema()
    }
}

impl<R: Read> Iterator for RowIter<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Result<Row>> {
        if self.done {
            return None;
        }
        match self.reader.next() {
            Ok(Some(row)) => Some(Ok(row.clone())),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        FallibleStreamingIterator::size_hint(&self.reader)
    }
}
