//! Runtime assembly: data directory lock, storage backend, migration and
//! the admin API service.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Create and lock the data directory (file and rocksdb backends)
//! 3. Open the key-value store
//! 4. Migrate stored lot documents to the current schema
//! 5. Build the sequencing service and the admin API around it

use crate::config::{RuntimeConfig, StorageBackend};
use ah_01_lot_sequencing::{
    FileBackedKVStore, InMemoryKVStore, KeyValueStore, KvLotRepository, LotSequencingApi,
    LotSequencingDependencies, LotSequencingService, SequencingConfig, SystemClock,
};
use ah_02_admin_api::AdminApiService;
use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Lock file name inside the data directory.
pub const LOCK_FILE: &str = "admin.lock";
/// File store name inside the data directory.
pub const FILE_STORE: &str = "lots.kv";
/// RocksDB directory name inside the data directory.
pub const ROCKSDB_DIR: &str = "lots.rocksdb";

/// Exclusive lock on the data directory, held for the process lifetime.
#[derive(Debug)]
pub struct DataDirLock {
    file: File,
    path: PathBuf,
}

impl DataDirLock {
    /// Create `data_dir` if needed and take its lock without blocking.
    pub fn acquire(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let path = data_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        file.try_lock_exclusive().with_context(|| {
            format!(
                "Data directory {} is in use by another process",
                data_dir.display()
            )
        })?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "Failed to release data directory lock");
        }
    }
}

/// The assembled admin runtime.
pub struct AdminRuntime {
    api: AdminApiService,
    _lock: Option<DataDirLock>,
}

impl AdminRuntime {
    /// Open storage and build the service stack.
    pub fn open(config: RuntimeConfig) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let RuntimeConfig {
            api,
            sequencing,
            storage,
        } = config;

        info!(backend = %storage.backend, data_dir = %storage.data_dir.display(), "Opening storage");

        let (lock, sequencing_api) = match storage.backend {
            StorageBackend::Memory => {
                warn!("Memory backend selected; lot changes are lost on exit");
                (None, build_api(InMemoryKVStore::new(), &sequencing)?)
            }
            StorageBackend::File => {
                let lock = DataDirLock::acquire(&storage.data_dir)?;
                log_disk_space(&storage.data_dir);
                let path = storage.data_dir.join(FILE_STORE);
                let store = FileBackedKVStore::open(&path)
                    .with_context(|| format!("Failed to open file store {}", path.display()))?;
                (Some(lock), build_api(store, &sequencing)?)
            }
            StorageBackend::RocksDb => {
                let lock = DataDirLock::acquire(&storage.data_dir)?;
                log_disk_space(&storage.data_dir);
                (Some(lock), open_rocksdb(&storage.data_dir, &sequencing)?)
            }
        };

        let api = AdminApiService::new(api, sequencing_api).context("Failed to build admin API")?;

        Ok(Self { api, _lock: lock })
    }

    /// The admin API service.
    pub fn api(&self) -> &AdminApiService {
        &self.api
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.api.serve(shutdown).await.context("Admin API server failed")
    }
}

#[cfg(feature = "rocksdb")]
fn open_rocksdb(data_dir: &Path, sequencing: &SequencingConfig) -> Result<Arc<dyn LotSequencingApi>> {
    use crate::adapters::storage::RocksDbStore;

    let path = data_dir.join(ROCKSDB_DIR);
    let store = RocksDbStore::open_default(&path)
        .with_context(|| format!("Failed to open RocksDB at {}", path.display()))?;
    build_api(store, sequencing)
}

#[cfg(not(feature = "rocksdb"))]
fn open_rocksdb(_data_dir: &Path, _sequencing: &SequencingConfig) -> Result<Arc<dyn LotSequencingApi>> {
    anyhow::bail!("the rocksdb backend requires building with --features rocksdb")
}

/// Wrap `store` in the repository, migrate it, and build the service.
pub fn build_api<S>(store: S, sequencing: &SequencingConfig) -> Result<Arc<dyn LotSequencingApi>>
where
    S: KeyValueStore + 'static,
{
    let repository = KvLotRepository::new(store);

    let report = repository
        .migrate()
        .context("Failed to migrate stored lot documents")?;
    info!(
        scanned = report.scanned,
        migrated = report.migrated,
        reindexed = report.reindexed,
        "Lot documents at current schema"
    );

    let service = LotSequencingService::new(
        LotSequencingDependencies {
            repository: repository.clone(),
            audit: repository,
            clock: SystemClock,
        },
        sequencing.clone(),
    );
    Ok(Arc::new(service))
}

fn log_disk_space(data_dir: &Path) {
    match fs2::available_space(data_dir) {
        Ok(bytes) => info!(available_mb = bytes / (1024 * 1024), "Data directory free space"),
        Err(e) => warn!(error = %e, "Unable to determine free disk space"),
    }
}
