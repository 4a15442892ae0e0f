use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{
    entities::{RecordMap, WorkRecord},
    kv::KeyValueStore,
};

/// Key holding the whole [RecordMap] as a json object.
pub const RECORDS_KEY: &str = "office_hours_logs";
/// Key holding the hourly rate exactly as the user typed it.
pub const RATE_KEY: &str = "office_hours_rate";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence service is unavailable: {0:#}")]
    Unavailable(#[source] anyhow::Error),
    #[error("stored records are corrupted: {0}")]
    Corrupted(#[source] serde_json::Error),
}

/// Owns the persisted representation of records and of the hourly rate. Nothing else writes
/// into the underlying [KeyValueStore].
///
/// Every mutation is a read-modify-write of the whole map. That is only safe with a single
/// writer, which is what the cooperative single-threaded runtime guarantees. Two processes
/// sharing a store can lose updates.
///
/// Failures never cross this boundary as errors. Reads degrade to empty defaults, mutations
/// report `false`, and everything is logged.
pub struct RecordStore<K: KeyValueStore> {
    kv: K,
}

impl<K: KeyValueStore> RecordStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// The only place where stored records are decoded. An absent value is an empty map.
    pub async fn read_records(&self) -> Result<RecordMap, StoreError> {
        let Some(raw) = self
            .kv
            .get(RECORDS_KEY)
            .await
            .map_err(StoreError::Unavailable)?
        else {
            return Ok(RecordMap::new());
        };
        serde_json::from_str(&raw).map_err(StoreError::Corrupted)
    }

    /// Same as [Self::read_records] for mutations. Corrupted data is treated as no data, so the
    /// next write replaces it. An unavailable service aborts the mutation.
    async fn read_for_update(&self) -> Option<RecordMap> {
        match self.read_records().await {
            Ok(records) => Some(records),
            Err(StoreError::Corrupted(e)) => {
                warn!("Overwriting corrupted records {e}");
                Some(RecordMap::new())
            }
            Err(e @ StoreError::Unavailable(_)) => {
                error!("Failed to read records before update {e}");
                None
            }
        }
    }

    async fn write_records(&self, records: &RecordMap) -> anyhow::Result<()> {
        let raw = serde_json::to_string(records)?;
        self.kv.set(RECORDS_KEY, raw).await
    }

    /// Saves a new record or replaces the one already stored under `date_key`.
    pub async fn save_record(&self, date_key: &str, record: WorkRecord) -> bool {
        let Some(mut records) = self.read_for_update().await else {
            return false;
        };
        records.insert(date_key.to_owned(), record);

        match self.write_records(&records).await {
            Ok(()) => {
                info!("Saved record for {date_key}");
                true
            }
            Err(e) => {
                error!("Failed to save record for {date_key}: {e:?}");
                false
            }
        }
    }

    /// All stored records. Anything that goes wrong results in an empty map.
    pub async fn get_all_records(&self) -> RecordMap {
        match self.read_records().await {
            Ok(records) => {
                debug!("Loaded {} records", records.len());
                records
            }
            Err(e) => {
                error!("Failed to fetch records {e}");
                RecordMap::new()
            }
        }
    }

    /// Returns `false` without touching the store if there's nothing under `date_key`.
    pub async fn delete_record(&self, date_key: &str) -> bool {
        let Some(mut records) = self.read_for_update().await else {
            return false;
        };
        if records.remove(date_key).is_none() {
            debug!("No record to delete for {date_key}");
            return false;
        }

        match self.write_records(&records).await {
            Ok(()) => {
                info!("Deleted record for {date_key}");
                true
            }
            Err(e) => {
                error!("Failed to delete record for {date_key}: {e:?}");
                false
            }
        }
    }

    /// Removes every record. The hourly rate is kept.
    pub async fn clear_all_data(&self) {
        match self.kv.remove(RECORDS_KEY).await {
            Ok(()) => info!("Cleared all records"),
            Err(e) => error!("Failed to clear data {e:?}"),
        }
    }

    pub async fn save_hourly_rate(&self, rate: &str) -> bool {
        match self.kv.set(RATE_KEY, rate.to_owned()).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save rate {e:?}");
                false
            }
        }
    }

    /// Empty string means the rate was never set.
    pub async fn get_hourly_rate(&self) -> String {
        match self.kv.get(RATE_KEY).await {
            Ok(rate) => rate.unwrap_or_default(),
            Err(e) => {
                error!("Failed to get rate {e:?}");
                String::new()
            }
        }
    }
}
