//!  Storage is organized through [record_store::RecordStore].
//!  The basic idea is:
//!   - There is a string keyed [kv::KeyValueStore] doing the actual persistence.
//!   - All records live under a single key as one json map from date key to record.
//!   - The hourly rate lives under its own key and has its own lifecycle.

pub mod entities;
pub mod kv;
pub mod record_store;
