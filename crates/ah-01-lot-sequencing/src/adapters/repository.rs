//! # Key-Value Lot Repository
//!
//! Implements `LotRepository` and `AuditLog` over any `KeyValueStore`.
//!
//! ## Key layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `lot/{auction}/{lot}` | lot JSON document with `schemaVersion` |
//! | `lotno/{auction}/{number}` | lot id holding that number |
//! | `rev/{auction}` | auction revision, big-endian u64 |
//! | `audit/{auction}/{millis:020}/{entry}` | audit entry JSON |
//!
//! Path segments escape `%` and `/` so one auction's prefix never matches
//! another's.
//!
//! ## Commit protocol
//!
//! All checks and the batch write happen under one write lock: compare the
//! revision, verify updated lots still belong to the auction, verify the lot
//! number index stays unique, then write index deletions, documents, index
//! insertions and the bumped revision in a single atomic batch.

use crate::domain::errors::RepositoryError;
use crate::domain::migration::{
    migrate_document, schema_version, CURRENT_SCHEMA_VERSION, SCHEMA_VERSION_FIELD,
};
use crate::ports::outbound::{AuditLog, BatchOperation, KeyValueStore, LotRepository, LotWrite};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use shared_types::{AuctionId, AuditEntry, Lot, LotId, LotNumber, Timestamp};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Counts reported by [`KvLotRepository::migrate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Lot documents examined.
    pub scanned: usize,
    /// Documents rewritten at the current schema version.
    pub migrated: usize,
    /// Missing lot number index entries restored.
    pub reindexed: usize,
}

/// Lot repository and audit log backed by a shared key-value store.
pub struct KvLotRepository<S: KeyValueStore> {
    store: Arc<RwLock<S>>,
}

impl<S: KeyValueStore> Clone for KvLotRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> KvLotRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Direct handle on the underlying store.
    pub fn store(&self) -> Arc<RwLock<S>> {
        Arc::clone(&self.store)
    }

    /// Bring every stored lot document to the current schema version.
    ///
    /// Changed documents are written in one batch. Running it again is a no-op.
    /// Fails without writing anything when two lots of an auction share a
    /// lot number.
    pub fn migrate(&self) -> Result<MigrationReport, RepositoryError> {
        let mut store = self.store.write();
        let rows = store.prefix_scan(b"lot/")?;

        let mut report = MigrationReport {
            scanned: rows.len(),
            ..MigrationReport::default()
        };
        let mut operations = Vec::new();
        // Index keys resolved so far in this pass, and the lot holding each.
        let mut claimed: HashMap<Vec<u8>, String> = HashMap::new();

        for (key, bytes) in rows {
            let key_text = String::from_utf8_lossy(&key).into_owned();
            let doc: Value = serde_json::from_slice(&bytes).map_err(|e| corrupt(&key_text, e))?;
            let (migrated, changed) = migrate_document(doc).map_err(|e| corrupt(&key_text, e))?;

            let lot = decode_value(&key_text, migrated.clone())?;
            let index_key = lot_number_key(&lot.auction_id, &lot.lot_number);
            let holder = match claimed.get(&index_key) {
                Some(holder) => Some(holder.clone()),
                None => store
                    .get(&index_key)?
                    .map(|id| String::from_utf8_lossy(&id).into_owned()),
            };
            match holder {
                Some(holder) if holder != lot.id.as_str() => {
                    tracing::error!(
                        auction_id = %lot.auction_id,
                        lot_number = %lot.lot_number,
                        lot_id = %lot.id,
                        holder = %holder,
                        "Migration found two lots sharing a lot number"
                    );
                    return Err(RepositoryError::UniqueViolation {
                        lot_number: lot.lot_number.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    operations.push(BatchOperation::put(
                        index_key.clone(),
                        lot.id.as_str().as_bytes().to_vec(),
                    ));
                    report.reindexed += 1;
                }
            }
            claimed.insert(index_key, lot.id.as_str().to_string());

            if changed {
                let encoded = serde_json::to_vec(&migrated).map_err(|e| corrupt(&key_text, e))?;
                operations.push(BatchOperation::put(key, encoded));
                report.migrated += 1;
            }
        }

        if !operations.is_empty() {
            store.atomic_batch_write(operations)?;
        }

        tracing::info!(
            scanned = report.scanned,
            migrated = report.migrated,
            reindexed = report.reindexed,
            schema_version = CURRENT_SCHEMA_VERSION,
            "Lot document migration finished"
        );
        Ok(report)
    }
}

// =============================================================================
// KEYS
// =============================================================================

fn segment(raw: &str) -> String {
    raw.replace('%', "%25").replace('/', "%2F")
}

fn lot_prefix(auction_id: &AuctionId) -> Vec<u8> {
    format!("lot/{}/", segment(auction_id.as_str())).into_bytes()
}

fn lot_key(auction_id: &AuctionId, lot_id: &LotId) -> Vec<u8> {
    let mut key = lot_prefix(auction_id);
    key.extend_from_slice(segment(lot_id.as_str()).as_bytes());
    key
}

fn lot_number_key(auction_id: &AuctionId, number: &LotNumber) -> Vec<u8> {
    format!("lotno/{}/{}", segment(auction_id.as_str()), number.as_str()).into_bytes()
}

fn revision_key(auction_id: &AuctionId) -> Vec<u8> {
    format!("rev/{}", segment(auction_id.as_str())).into_bytes()
}

fn audit_prefix(auction_id: &AuctionId) -> Vec<u8> {
    format!("audit/{}/", segment(auction_id.as_str())).into_bytes()
}

fn audit_key(auction_id: &AuctionId, recorded_at: &Timestamp, entry_id: &str) -> Vec<u8> {
    let millis = recorded_at.timestamp_millis().max(0);
    let mut key = audit_prefix(auction_id);
    key.extend_from_slice(format!("{millis:020}/{}", segment(entry_id)).as_bytes());
    key
}

// =============================================================================
// CODEC
// =============================================================================

fn corrupt(key: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Corrupt {
        key: key.to_string(),
        message: err.to_string(),
    }
}

fn encode_lot(lot: &Lot) -> Result<Vec<u8>, RepositoryError> {
    let key = String::from_utf8_lossy(&lot_key(&lot.auction_id, &lot.id)).into_owned();
    let mut doc = serde_json::to_value(lot).map_err(|e| corrupt(&key, e))?;
    if let Value::Object(fields) = &mut doc {
        fields.insert(SCHEMA_VERSION_FIELD.into(), Value::from(CURRENT_SCHEMA_VERSION));
    }
    serde_json::to_vec(&doc).map_err(|e| corrupt(&key, e))
}

fn decode_value(key: &str, mut doc: Value) -> Result<Lot, RepositoryError> {
    let found = schema_version(&doc);
    if found != CURRENT_SCHEMA_VERSION {
        return Err(RepositoryError::OutdatedSchema {
            key: key.to_string(),
            found,
            expected: CURRENT_SCHEMA_VERSION,
        });
    }
    if let Value::Object(fields) = &mut doc {
        fields.remove(SCHEMA_VERSION_FIELD);
    }
    serde_json::from_value(doc).map_err(|e| corrupt(key, e))
}

fn decode_lot(key: &[u8], bytes: &[u8]) -> Result<Lot, RepositoryError> {
    let key = String::from_utf8_lossy(key);
    let doc: Value = serde_json::from_slice(bytes).map_err(|e| corrupt(&key, e))?;
    decode_value(&key, doc)
}

fn read_revision<S: KeyValueStore>(store: &S, auction_id: &AuctionId) -> Result<u64, RepositoryError> {
    match store.get(&revision_key(auction_id))? {
        None => Ok(0),
        Some(bytes) => {
            let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                corrupt(
                    &format!("rev/{}", auction_id),
                    format!("expected 8 bytes, found {}", bytes.len()),
                )
            })?;
            Ok(u64::from_be_bytes(raw))
        }
    }
}

fn read_lot<S: KeyValueStore>(store: &S, key: &[u8]) -> Result<Option<Lot>, RepositoryError> {
    store
        .get(key)?
        .map(|bytes| decode_lot(key, &bytes))
        .transpose()
}

// =============================================================================
// PORTS
// =============================================================================

#[async_trait]
impl<S: KeyValueStore + 'static> LotRepository for KvLotRepository<S> {
    async fn revision(&self, auction_id: &AuctionId) -> Result<u64, RepositoryError> {
        read_revision(&*self.store.read(), auction_id)
    }

    async fn find_by_ids(&self, auction_id: &AuctionId, ids: &[LotId]) -> Result<Vec<Lot>, RepositoryError> {
        let store = self.store.read();
        let mut lots = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(lot) = read_lot(&*store, &lot_key(auction_id, id))? {
                lots.push(lot);
            }
        }
        Ok(lots)
    }

    async fn find_by_lot_numbers(
        &self,
        auction_id: &AuctionId,
        numbers: &[LotNumber],
    ) -> Result<Vec<Lot>, RepositoryError> {
        let store = self.store.read();
        let mut lots = Vec::with_capacity(numbers.len());
        for number in numbers {
            let Some(raw_id) = store.get(&lot_number_key(auction_id, number))? else {
                continue;
            };
            let id = String::from_utf8(raw_id)
                .ok()
                .and_then(|s| LotId::parse(&s).ok())
                .ok_or_else(|| corrupt(&format!("lotno/{auction_id}/{number}"), "invalid lot id"))?;
            if let Some(lot) = read_lot(&*store, &lot_key(auction_id, &id))? {
                lots.push(lot);
            }
        }
        Ok(lots)
    }

    async fn list(&self, auction_id: &AuctionId) -> Result<Vec<Lot>, RepositoryError> {
        let store = self.store.read();
        store
            .prefix_scan(&lot_prefix(auction_id))?
            .iter()
            .map(|(key, bytes)| decode_lot(key, bytes))
            .collect()
    }

    async fn commit(
        &self,
        auction_id: &AuctionId,
        expected_revision: u64,
        writes: Vec<LotWrite>,
    ) -> Result<u64, RepositoryError> {
        let mut store = self.store.write();

        let actual = read_revision(&*store, auction_id)?;
        if actual != expected_revision {
            return Err(RepositoryError::RevisionMismatch {
                expected: expected_revision,
                actual,
            });
        }

        let mut released: HashSet<LotNumber> = HashSet::new();
        let mut claimed: Vec<(LotNumber, LotId)> = Vec::new();
        let mut index_deletes = Vec::new();
        let mut puts = Vec::new();

        for write in &writes {
            let lot = write.lot();
            if lot.auction_id != *auction_id {
                return Err(RepositoryError::LotMissing {
                    lot_id: lot.id.to_string(),
                });
            }
            let key = lot_key(auction_id, &lot.id);

            match write {
                LotWrite::Insert(_) => {
                    claimed.push((lot.lot_number.clone(), lot.id.clone()));
                }
                LotWrite::Update(_) => {
                    let previous = read_lot(&*store, &key)?.ok_or_else(|| RepositoryError::LotMissing {
                        lot_id: lot.id.to_string(),
                    })?;
                    if previous.lot_number != lot.lot_number {
                        index_deletes.push(BatchOperation::delete(lot_number_key(
                            auction_id,
                            &previous.lot_number,
                        )));
                        released.insert(previous.lot_number);
                        claimed.push((lot.lot_number.clone(), lot.id.clone()));
                    }
                }
            }
            puts.push(BatchOperation::put(key, encode_lot(lot)?));
        }

        let mut claimed_by: HashMap<&LotNumber, &LotId> = HashMap::new();
        for (number, id) in &claimed {
            if claimed_by.insert(number, id).is_some() {
                return Err(RepositoryError::UniqueViolation {
                    lot_number: number.to_string(),
                });
            }
            if !released.contains(number) && store.exists(&lot_number_key(auction_id, number))? {
                return Err(RepositoryError::UniqueViolation {
                    lot_number: number.to_string(),
                });
            }
            puts.push(BatchOperation::put(
                lot_number_key(auction_id, number),
                id.as_str().as_bytes().to_vec(),
            ));
        }

        let next = actual + 1;
        puts.push(BatchOperation::put(revision_key(auction_id), next.to_be_bytes().to_vec()));

        let mut operations = index_deletes;
        operations.extend(puts);
        store.atomic_batch_write(operations)?;

        tracing::debug!(
            auction_id = %auction_id,
            writes = writes.len(),
            revision = next,
            "Committed lot batch"
        );
        Ok(next)
    }
}

#[async_trait]
impl<S: KeyValueStore + 'static> AuditLog for KvLotRepository<S> {
    async fn record(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        let key = audit_key(&entry.entity_id, &entry.recorded_at, &entry.id);
        let bytes = serde_json::to_vec(&entry)
            .map_err(|e| corrupt(&String::from_utf8_lossy(&key), e))?;
        self.store.write().put(&key, &bytes)?;
        Ok(())
    }

    async fn entries_for(&self, auction_id: &AuctionId) -> Result<Vec<AuditEntry>, RepositoryError> {
        let store = self.store.read();
        store
            .prefix_scan(&audit_prefix(auction_id))?
            .iter()
            .map(|(key, bytes)| {
                serde_json::from_slice(bytes).map_err(|e| corrupt(&String::from_utf8_lossy(key), e))
            })
            .collect()
    }
}
