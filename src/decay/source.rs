//! Event data access
//!
//! The pipeline reads events through [`EventSource`]. [`EventBatch`] is the
//! in-memory implementation, loadable from JSON:
//!
//! ```json
//! {"events": [{"particles": [...], "hits": [...]}]}
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::Path;

use super::errors::PipelineError;
use super::types::EventData;

/// Supplier of per-event particle and hit records.
///
/// Sources must be shareable across threads so events can be processed in
/// parallel.
pub trait EventSource: Sync {
    /// Number of events available
    fn event_count(&self) -> usize;

    /// Records of one event
    ///
    /// # Errors
    /// `PipelineError::EventOutOfRange` when `index >= event_count()`.
    fn event(&self, index: usize) -> Result<Cow<'_, EventData>, PipelineError>;
}

impl<S: EventSource + ?Sized> EventSource for &S {
    fn event_count(&self) -> usize {
        (**self).event_count()
    }

    fn event(&self, index: usize) -> Result<Cow<'_, EventData>, PipelineError> {
        (**self).event(index)
    }
}

/// Events held in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventBatch {
    /// Events in batch order
    pub events: Vec<EventData>,
}

impl EventBatch {
    /// Create a batch from events
    pub fn new(events: Vec<EventData>) -> Self {
        Self { events }
    }

    /// Append an event, returning its index
    pub fn push(&mut self, event: EventData) -> usize {
        self.events.push(event);
        self.events.len() - 1
    }

    /// Number of events
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when the batch holds no events
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Parse a batch from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json).map_err(|e| PipelineError::parse("event batch", e))
    }

    /// Parse a batch from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PipelineError> {
        serde_json::from_reader(reader).map_err(|e| PipelineError::parse("event batch", e))
    }

    /// Load a batch from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let file = fs::File::open(path)
            .map_err(|e| PipelineError::io(format!("opening {}", path.display()), e))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl EventSource for EventBatch {
    fn event_count(&self) -> usize {
        self.events.len()
    }

    fn event(&self, index: usize) -> Result<Cow<'_, EventData>, PipelineError> {
        self.events
            .get(index)
            .map(Cow::Borrowed)
            .ok_or(PipelineError::EventOutOfRange {
                index,
                count: self.events.len(),
            })
    }
}

impl From<Vec<EventData>> for EventBatch {
    fn from(events: Vec<EventData>) -> Self {
        Self::new(events)
    }
}
