// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! In-memory file storage for offline use and tests

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{FileMetadata, FileStorage, WriteRequest};
use crate::error::{PlannerError, Result};

#[derive(Debug, Clone)]
struct StoredFile {
    meta: FileMetadata,
    bytes: Vec<u8>,
}

/// File storage kept in memory. Searches ignore the query and list every
/// file in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RefCell<BTreeMap<String, StoredFile>>,
    order: RefCell<Vec<String>>,
    next_id: Cell<u32>,
    failing: Cell<bool>,
    writes: RefCell<Vec<WriteRequest>>,
}

impl MemoryStorage {
    /// Empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail until switched back
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Put raw bytes under a file id
    pub fn insert_raw(&self, id: &str, name: &str, bytes: impl Into<Vec<u8>>) {
        let meta = FileMetadata {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: "application/json".into(),
            parents: Vec::new(),
        };
        if !self.files.borrow().contains_key(id) {
            self.order.borrow_mut().push(id.to_string());
        }
        self.files.borrow_mut().insert(
            id.to_string(),
            StoredFile {
                meta,
                bytes: bytes.into(),
            },
        );
    }

    /// Every write request received so far
    #[must_use]
    pub fn writes(&self) -> Vec<WriteRequest> {
        self.writes.borrow().clone()
    }

    /// Number of stored files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    /// Whether nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }

    fn fail_if_needed(&self) -> Result<()> {
        if self.failing.get() {
            return Err(PlannerError::Storage("storage unavailable".into()));
        }
        Ok(())
    }
}

impl FileStorage for MemoryStorage {
    fn search(&self, _query: &str) -> Result<Vec<FileMetadata>> {
        self.fail_if_needed()?;
        let files = self.files.borrow();
        Ok(self
            .order
            .borrow()
            .iter()
            .filter_map(|id| files.get(id).map(|f| f.meta.clone()))
            .collect())
    }

    fn read(&self, file_id: &str) -> Result<Vec<u8>> {
        self.fail_if_needed()?;
        self.files
            .borrow()
            .get(file_id)
            .map(|f| f.bytes.clone())
            .ok_or_else(|| PlannerError::Storage(format!("file not found: {file_id}")))
    }

    fn write(&self, request: &WriteRequest) -> Result<FileMetadata> {
        self.fail_if_needed()?;
        self.writes.borrow_mut().push(request.clone());

        let id = match &request.file_id {
            Some(id) => {
                if !self.files.borrow().contains_key(id) {
                    return Err(PlannerError::Storage(format!("file not found: {id}")));
                }
                id.clone()
            }
            None => {
                let n = self.next_id.get() + 1;
                self.next_id.set(n);
                format!("file-{n}")
            }
        };

        let bytes = serde_json::to_vec_pretty(&request.content)?;
        self.insert_raw(&id, &request.name, bytes);
        let mut files = self.files.borrow_mut();
        let stored = files
            .get_mut(&id)
            .ok_or_else(|| PlannerError::Storage(format!("file not found: {id}")))?;
        stored.meta.parents = request.parent_id.iter().cloned().collect();
        Ok(stored.meta.clone())
    }
}
