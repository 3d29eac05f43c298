use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::models::ReceiptRecord;
use crate::utils::errors::ReceiptError;

/// A receipt kept around so its image URL can be fetched later
#[derive(Debug, Clone)]
pub struct StoredReceipt {
    pub record: ReceiptRecord,
    /// PNG posted back by a browser that rendered the HTML itself
    pub image: Option<Vec<u8>>,
    /// Secret handed only to the caller that created the entry
    upload_token: String,
    created_at: Instant,
}

/// Where a freshly stored receipt lives and the token that may attach its image
#[derive(Debug, Clone)]
pub struct StoredHandle {
    pub filename: String,
    pub upload_token: String,
}

/// In-memory receipts keyed by image filename, bounded by age and count
pub struct ReceiptStore {
    entries: Mutex<HashMap<String, StoredReceipt>>,
    ttl: Duration,
    capacity: usize,
}

impl ReceiptStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredReceipt>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn filename_for(record: &ReceiptRecord, millis: i64) -> String {
        format!("receipt_{}_{}.png", record.transaction_id, millis)
    }

    /// Store a record and return the filename it is served under
    pub fn insert(&self, record: ReceiptRecord) -> StoredHandle {
        self.insert_at(record, Instant::now())
    }

    fn insert_at(&self, record: ReceiptRecord, now: Instant) -> StoredHandle {
        let upload_token = Uuid::new_v4().simple().to_string();
        let mut entries = self.lock();

        let ttl = self.ttl;
        entries.retain(|_, entry| now.duration_since(entry.created_at) < ttl);

        while entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(name, _)| name.clone());
            match oldest {
                Some(name) => {
                    tracing::debug!("Receipt store full, evicting {}", name);
                    entries.remove(&name);
                }
                None => break,
            }
        }

        // Same id within the same millisecond: step forward to a free name
        let mut millis = chrono::Utc::now().timestamp_millis();
        let mut filename = Self::filename_for(&record, millis);
        while entries.contains_key(&filename) {
            millis += 1;
            filename = Self::filename_for(&record, millis);
        }

        entries.insert(
            filename.clone(),
            StoredReceipt {
                record,
                image: None,
                upload_token: upload_token.clone(),
                created_at: now,
            },
        );
        StoredHandle {
            filename,
            upload_token,
        }
    }

    pub fn get(&self, filename: &str) -> Option<StoredReceipt> {
        self.get_at(filename, Instant::now())
    }

    fn get_at(&self, filename: &str, now: Instant) -> Option<StoredReceipt> {
        let entries = self.lock();
        entries
            .get(filename)
            .filter(|entry| now.duration_since(entry.created_at) < self.ttl)
            .cloned()
    }

    /// Attach a client-rendered image to the live entry for `receipt_id` whose
    /// upload token matches. An entry accepts one image only.
    /// Returns the filename it was attached to.
    pub fn attach_image(
        &self,
        receipt_id: &str,
        upload_token: &str,
        png: Vec<u8>,
    ) -> Result<String, ReceiptError> {
        let now = Instant::now();
        let mut entries = self.lock();
        let ttl = self.ttl;

        let candidates: Vec<(&String, &mut StoredReceipt)> = entries
            .iter_mut()
            .filter(|(_, entry)| {
                entry.record.transaction_id == receipt_id
                    && now.duration_since(entry.created_at) < ttl
            })
            .collect();
        if candidates.is_empty() {
            return Err(ReceiptError::NotFound(format!(
                "No stored receipt for {}",
                receipt_id
            )));
        }

        let (filename, entry) = candidates
            .into_iter()
            .find(|(_, entry)| entry.upload_token == upload_token)
            .ok_or_else(|| ReceiptError::UploadRejected(receipt_id.to_string()))?;
        if entry.image.is_some() {
            return Err(ReceiptError::ImageAlreadyAttached(receipt_id.to_string()));
        }

        entry.image = Some(png);
        Ok(filename.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
}
