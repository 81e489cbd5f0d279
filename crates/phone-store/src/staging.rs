//! Per-client holding area for extracted numbers awaiting review.

use crate::error::StoreError;
use crate::records::RecordStore;
use crate::snapshot::Snapshot;
use crate::types::ConfirmOutcome;
use crate::validate::normalize_phone_number;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

type Pending = HashMap<String, Vec<String>>;

/// Staged numbers keyed by client address.
///
/// A client's entry moves `absent -> staged -> (edited | partially deleted)*`
/// and leaves again when confirmed.
pub struct StagingStore {
    pending: RwLock<Pending>,
    snapshot: Snapshot,
}

impl StagingStore {
    pub async fn open(snapshot: Snapshot) -> Result<Self, StoreError> {
        let pending: Pending = snapshot.load().await?;
        info!("Loaded staging store with {} pending clients", pending.len());
        Ok(Self::with_pending(pending, snapshot))
    }

    pub fn with_pending(pending: Pending, snapshot: Snapshot) -> Self {
        Self {
            pending: RwLock::new(pending),
            snapshot,
        }
    }

    pub fn memory() -> Self {
        Self::with_pending(HashMap::new(), Snapshot::memory())
    }

    /// Append numbers to the client's entry, creating it if needed.
    #[instrument(skip(self, numbers), fields(count = numbers.len()))]
    pub async fn stage(&self, client_id: &str, numbers: Vec<String>) -> Result<Vec<String>, StoreError> {
        let mut pending = self.pending.write().await;
        let mut next = pending.clone();
        next.entry(client_id.to_string())
            .or_default()
            .extend(numbers.iter().cloned());

        self.commit(&mut pending, next).await?;

        debug!(client_ip = %client_id, "Staged numbers for review");
        Ok(numbers)
    }

    /// The client's staged numbers.
    pub async fn review(&self, client_id: &str) -> Result<Vec<String>, StoreError> {
        self.pending
            .read()
            .await
            .get(client_id)
            .filter(|numbers| !numbers.is_empty())
            .cloned()
            .ok_or_else(|| StoreError::NoPendingReview(client_id.to_string()))
    }

    /// Replace the client's list. Every entry must validate, otherwise
    /// nothing changes.
    #[instrument(skip(self, numbers))]
    pub async fn edit(&self, client_id: &str, numbers: &[String]) -> Result<Vec<String>, StoreError> {
        let mut pending = self.pending.write().await;
        if !pending.contains_key(client_id) {
            return Err(StoreError::NoPendingReview(client_id.to_string()));
        }

        let validated = numbers
            .iter()
            .map(|n| normalize_phone_number(n))
            .collect::<Result<Vec<_>, _>>()?;

        let mut next = pending.clone();
        next.insert(client_id.to_string(), validated.clone());
        self.commit(&mut pending, next).await?;

        info!(client_ip = %client_id, count = validated.len(), "Staged numbers replaced");
        Ok(validated)
    }

    /// Drop every occurrence of `number` from the client's list.
    #[instrument(skip(self))]
    pub async fn delete_one(&self, client_id: &str, number: &str) -> Result<Vec<String>, StoreError> {
        let mut pending = self.pending.write().await;
        let mut next = pending.clone();
        let entry = next
            .get_mut(client_id)
            .ok_or_else(|| StoreError::NoPendingReview(client_id.to_string()))?;

        entry.retain(|n| n != number);
        let remaining = entry.clone();

        self.commit(&mut pending, next).await?;
        Ok(remaining)
    }

    /// Promote the client's staged numbers into `records`, then forget the
    /// entry.
    ///
    /// Takes the staging lock before the record lock.
    #[instrument(skip(self, records))]
    pub async fn confirm(&self, client_id: &str, records: &RecordStore) -> Result<ConfirmOutcome, StoreError> {
        let mut pending = self.pending.write().await;
        let numbers = match pending.get(client_id) {
            Some(numbers) if !numbers.is_empty() => numbers.clone(),
            _ => return Err(StoreError::NoPendingReview(client_id.to_string())),
        };

        let outcome = records.insert_confirmed(&numbers, client_id).await?;

        // If this write fails the entry stays staged; confirming again skips
        // the numbers already inserted above.
        let mut next = pending.clone();
        next.remove(client_id);
        self.commit(&mut pending, next).await?;

        info!(client_ip = %client_id, "Staged numbers confirmed");
        Ok(outcome)
    }

    /// Persist `next`, then make it the live mapping. A failed write leaves
    /// `current` untouched.
    async fn commit(&self, current: &mut Pending, next: Pending) -> Result<(), StoreError> {
        self.snapshot.save(&next).await?;
        *current = next;
        Ok(())
    }

    /// Number of clients with a staged entry.
    pub async fn pending_clients(&self) -> usize {
        self.pending.read().await.len()
    }
}
