use std::sync::Arc;

use super::{ApiError, PostsApi, Record, RecordId};
use crate::FieldMap;

/// Records in display order plus the counter used to number new ones.
///
/// Identifiers handed out by [`RecordList::push_created`] come from the local
/// counter only. They are unrelated to whatever the remote resource assigns,
/// so a later reload can show different identifiers for the same rows.
#[derive(Debug, Clone)]
pub struct RecordList {
    records: Vec<Record>,
    next_id: i64,
}

impl Default for RecordList {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

impl RecordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn next_id(&self) -> RecordId {
        RecordId(self.next_id)
    }

    /// Replaces every record with a fetched list. The counter is left alone.
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    pub fn push_created(&mut self, values: FieldMap) -> &Record {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.records.push(Record::new(id, values));
        &self.records[self.records.len() - 1]
    }
}

/// Owns the record list and connects it to the remote resource.
pub struct Board {
    api: Arc<dyn PostsApi>,
    records: RecordList,
}

impl Board {
    pub fn new(api: Arc<dyn PostsApi>) -> Self {
        Self {
            api,
            records: RecordList::new(),
        }
    }

    pub fn api(&self) -> Arc<dyn PostsApi> {
        self.api.clone()
    }

    pub fn records(&self) -> &RecordList {
        &self.records
    }

    /// Fetches the initial list. Failures are logged and leave the list as is.
    pub async fn load(&mut self) {
        let result = self.api.list().await;
        self.apply_loaded(result);
    }

    pub fn apply_loaded(&mut self, result: Result<Vec<Record>, ApiError>) {
        match result {
            Ok(records) => {
                tracing::info!(count = records.len(), "Loaded records");
                self.records.replace(records);
            }
            Err(err) => tracing::error!("Error loading records: {err}"),
        }
    }

    /// Sends `values` to the remote resource and appends them as a new record
    /// once it accepts them. A failed create is logged and appends nothing.
    pub async fn create_from_form(&mut self, values: FieldMap) -> Option<&Record> {
        let result = self.api.create(&values).await;
        self.apply_created(values, result)
    }

    /// Applies the outcome of a create request. Errors stop here: the form that
    /// asked for the create clears regardless.
    pub fn apply_created(
        &mut self,
        values: FieldMap,
        result: Result<(), ApiError>,
    ) -> Option<&Record> {
        if let Err(err) = result {
            tracing::error!("Error creating record: {err}");
            return None;
        }
        let record = self.records.push_created(values);
        tracing::info!(id = %record.id, "Appended record");
        Some(record)
    }
}
