//! Output sinks
//!
//! The pipeline hands each event's rows to a [`RowSink`] as soon as the event
//! is finished, so a run never needs to hold more than one event in memory.

use std::io::Write;

use super::errors::PipelineError;
use super::output::OutputRow;

/// Consumer of output rows
pub trait RowSink {
    /// Accept the rows of one event
    fn write_rows(&mut self, rows: &[OutputRow]) -> Result<(), PipelineError>;

    /// Called once after the last event
    fn finish(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// Collects every row in memory
impl RowSink for Vec<OutputRow> {
    fn write_rows(&mut self, rows: &[OutputRow]) -> Result<(), PipelineError> {
        self.extend_from_slice(rows);
        Ok(())
    }
}

impl<K: RowSink + ?Sized> RowSink for &mut K {
    fn write_rows(&mut self, rows: &[OutputRow]) -> Result<(), PipelineError> {
        (**self).write_rows(rows)
    }

    fn finish(&mut self) -> Result<(), PipelineError> {
        (**self).finish()
    }
}

/// Writes one JSON object per row, newline separated
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    rows_written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            rows_written: 0,
        }
    }

    /// Rows written so far
    #[inline]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RowSink for JsonLinesSink<W> {
    fn write_rows(&mut self, rows: &[OutputRow]) -> Result<(), PipelineError> {
        for row in rows {
            serde_json::to_writer(&mut self.writer, row)
                .map_err(|e| PipelineError::parse("encoding output row", e))?;
            self.writer
                .write_all(b"\n")
                .map_err(|e| PipelineError::io("writing output row", e))?;
            self.rows_written += 1;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PipelineError> {
        self.writer
            .flush()
            .map_err(|e| PipelineError::io("flushing output", e))
    }
}
