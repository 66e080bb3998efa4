use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use crate::batch::{BatchOp, WriteBatch};
use crate::error::{StoreError, StoreResult};
use crate::traits::OrderedStore;

/// File holding a bucket's data inside its directory.
pub const DATA_FILE: &str = "data.redb";

const ENTRIES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("entries");

/// A persistent ordered store for one bucket, backed by a redb database at
/// `<dir>/data.redb`.
pub struct BucketStore {
    name: String,
    dir: PathBuf,
    db: Database,
}

impl BucketStore {
    /// Open the store in `dir`, creating the directory and database file if
    /// missing.
    pub fn open(name: &str, dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        let db = Database::create(dir.join(DATA_FILE)).map_err(|source| StoreError::Open {
            name: name.to_string(),
            source,
        })?;

        // Readers expect the table to exist.
        let txn = db.begin_write()?;
        txn.open_table(ENTRIES)?;
        txn.commit()?;

        debug!(bucket = name, dir = %dir.display(), "opened bucket store");
        Ok(Self {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            db,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding this store's files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OrderedStore for BucketStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ENTRIES)?;
        let value = table.get(key)?.map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ENTRIES)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<bool> {
        let txn = self.db.begin_write()?;
        let existed = {
            let mut table = txn.open_table(ENTRIES)?;
            let removed = table.remove(key)?;
            removed.is_some()
        };
        txn.commit()?;
        Ok(existed)
    }

    fn write(&self, batch: WriteBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ENTRIES)?;
            for op in batch.into_ops() {
                match op {
                    BatchOp::Put { key, value } => {
                        table.insert(key.as_slice(), value.as_slice())?;
                    }
                    BatchOp::Delete { key } => {
                        table.remove(key.as_slice())?;
                    }
                }
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn scan(
        &self,
        start: &[u8],
        end: Option<&[u8]>,
        visit: &mut dyn FnMut(&[u8], &[u8]) -> ControlFlow<()>,
    ) -> StoreResult<()> {
        if matches!(end, Some(end) if end < start) {
            return Ok(());
        }
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ENTRIES)?;
        let range = match end {
            Some(end) => table.range::<&[u8]>(start..=end)?,
            None => table.range::<&[u8]>(start..)?,
        };
        for entry in range {
            let (k, v) = entry?;
            if visit(k.value(), v.value()).is_break() {
                break;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for BucketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketStore")
            .field("name", &self.name)
            .field("dir", &self.dir)
            .finish()
    }
}
