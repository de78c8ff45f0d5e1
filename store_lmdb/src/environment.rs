//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Env, EnvOpenOptions};

use crate::audit::LmdbAuditStore;
use crate::claim::LmdbClaimStore;
use crate::LmdbError;

/// Default LMDB map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;
/// Number of named LMDB databases.
pub const MAX_DBS: u32 = 6;

/// Wraps the LMDB environment and hands out the store handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path).map_err(|e| LmdbError::Heed(e.to_string()))?;
        // Safety: the environment directory is owned by this process; heed
        // requires the caller to guarantee no other process maps it with
        // incompatible flags.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };
        Ok(Self { env: Arc::new(env) })
    }

    /// Open with the default map size and database count.
    pub fn open_default(path: &Path) -> Result<Self, LmdbError> {
        Self::open(path, MAX_DBS, DEFAULT_MAP_SIZE)
    }

    /// Create the claim store over this environment.
    pub fn claim_store(&self) -> Result<LmdbClaimStore, LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        let claims_db = self.env.create_database::<Bytes, Bytes>(&mut wtxn, Some("claims"))?;
        wtxn.commit()?;
        Ok(LmdbClaimStore {
            env: Arc::clone(&self.env),
            claims_db,
        })
    }

    /// Create the audit store over this environment.
    pub fn audit_store(&self) -> Result<LmdbAuditStore, LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        let records_db = self
            .env
            .create_database::<Bytes, Bytes>(&mut wtxn, Some("audit_records"))?;
        let times_db = self
            .env
            .create_database::<Bytes, Bytes>(&mut wtxn, Some("audit_times"))?;
        let terminal_idx_db = self
            .env
            .create_database::<Bytes, Bytes>(&mut wtxn, Some("audit_by_terminal"))?;
        let voter_idx_db = self
            .env
            .create_database::<Bytes, Bytes>(&mut wtxn, Some("audit_by_voter"))?;
        let meta_db = self
            .env
            .create_database::<Bytes, Bytes>(&mut wtxn, Some("audit_meta"))?;
        wtxn.commit()?;
        Ok(LmdbAuditStore {
            env: Arc::clone(&self.env),
            records_db,
            times_db,
            terminal_idx_db,
            voter_idx_db,
            meta_db,
        })
    }
}
