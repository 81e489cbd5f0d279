//! The main phone number store.

use crate::error::StoreError;
use crate::snapshot::Snapshot;
use crate::types::{ConfirmOutcome, NewPhoneNumber, PhoneRecord, PhoneUpdate};
use crate::validate::normalize_phone_number;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

type Records = HashMap<Uuid, PhoneRecord>;

/// Phone records keyed by id, persisted as a full snapshot after every
/// mutation.
///
/// The write lock is held across the in-memory change and the snapshot
/// write, so snapshots never interleave.
pub struct RecordStore {
    records: RwLock<Records>,
    snapshot: Snapshot,
}

impl RecordStore {
    /// Open a store, loading whatever the snapshot holds.
    pub async fn open(snapshot: Snapshot) -> Result<Self, StoreError> {
        let records: Records = snapshot.load().await?;
        info!("Loaded record store with {} phone numbers", records.len());
        Ok(Self::with_records(records, snapshot))
    }

    /// Build a store around already-loaded records.
    pub fn with_records(records: Records, snapshot: Snapshot) -> Self {
        Self {
            records: RwLock::new(records),
            snapshot,
        }
    }

    /// Empty store that never touches disk.
    pub fn memory() -> Self {
        Self::with_records(HashMap::new(), Snapshot::memory())
    }

    /// Create a record. The number is normalized first and must not already
    /// exist.
    #[instrument(skip(self, candidate), fields(number = %candidate.number))]
    pub async fn create(
        &self,
        candidate: NewPhoneNumber,
        origin: &str,
    ) -> Result<PhoneRecord, StoreError> {
        let number = normalize_phone_number(&candidate.number)?;

        let mut records = self.records.write().await;
        if records.values().any(|r| r.number == number) {
            return Err(StoreError::DuplicateNumber(number));
        }

        let mut record = PhoneRecord::new(number, candidate.has_redeem_value, Some(origin.to_string()));
        record.name = candidate.name;
        record.notes = candidate.notes;

        let mut next = records.clone();
        next.insert(record.id, record.clone());
        self.commit(&mut records, next).await?;

        info!(phone_id = %record.id, "Created phone number record");
        Ok(record)
    }

    /// All records, in no particular order.
    pub async fn list(&self) -> Vec<PhoneRecord> {
        self.records.read().await.values().cloned().collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<PhoneRecord, StoreError> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Find the id of the record holding exactly this number.
    pub async fn search_by_number(&self, number: &str) -> Result<Uuid, StoreError> {
        self.records
            .read()
            .await
            .values()
            .find(|r| r.number == number)
            .map(|r| r.id)
            .ok_or_else(|| StoreError::NotFound(number.to_string()))
    }

    /// Apply a partial update.
    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        id: Uuid,
        update: PhoneUpdate,
        origin: &str,
    ) -> Result<PhoneRecord, StoreError> {
        let mut records = self.records.write().await;
        let mut next = records.clone();
        let record = next
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        record.apply(update, origin);
        let updated = record.clone();

        self.commit(&mut records, next).await?;

        debug!(phone_id = %id, "Updated phone number record");
        Ok(updated)
    }

    /// Remove a record outright.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<PhoneRecord, StoreError> {
        let mut records = self.records.write().await;
        let mut next = records.clone();
        let removed = next
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        self.commit(&mut records, next).await?;

        info!(phone_id = %id, number = %removed.number, "Deleted phone number record");
        Ok(removed)
    }

    /// Overwrite the redeem flag and points on every record.
    ///
    /// Returns how many records were touched.
    #[instrument(skip(self))]
    pub async fn bulk_annotate(
        &self,
        has_redeem_value: bool,
        number_of_points: i64,
    ) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let mut next = records.clone();
        for record in next.values_mut() {
            record.has_redeem_value = has_redeem_value;
            record.number_of_points = number_of_points;
        }

        let count = next.len();
        self.commit(&mut records, next).await?;

        info!(count, "Bulk calculations applied");
        Ok(count)
    }

    /// Insert a record for each confirmed number that is not already stored.
    ///
    /// Duplicates are skipped, not rejected. The snapshot is written once for
    /// the whole batch.
    pub async fn insert_confirmed(
        &self,
        numbers: &[String],
        origin: &str,
    ) -> Result<ConfirmOutcome, StoreError> {
        let mut records = self.records.write().await;
        let mut next = records.clone();
        let mut outcome = ConfirmOutcome::default();

        for number in numbers {
            if next.values().any(|r| &r.number == number) {
                warn!(phone_number = %number, "Duplicate phone number skipped");
                outcome.skipped.push(number.clone());
                continue;
            }

            let record = PhoneRecord::new(number.clone(), false, Some(origin.to_string()));
            next.insert(record.id, record.clone());
            outcome.added.push(record);
        }

        self.commit(&mut records, next).await?;

        info!(
            added = outcome.added.len(),
            skipped = outcome.skipped.len(),
            "Confirmed numbers stored"
        );
        Ok(outcome)
    }

    /// Persist `next`, then make it the live mapping. A failed write leaves
    /// `current` untouched.
    async fn commit(&self, current: &mut Records, next: Records) -> Result<(), StoreError> {
        self.snapshot.save(&next).await?;
        *current = next;
        Ok(())
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
