// SPDX-License-Identifier: MIT

//! Advisory exclusive file lock guaranteeing a single writer process per store file,
//! held for the process lifetime and released on `Drop`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{Result, StoreError};

pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Acquire the lock for `db_path`, using a sibling `<db_path>.lock` file so the lock
    /// survives the database file itself being recreated. Avoids truncating before the
    /// lock is held, so a losing process never wipes the winner's PID.
    pub fn acquire(db_path: &Path) -> Result<Self> {
        let lock_path = lock_path_for(db_path);
        let file = OpenOptions::new().create(true).write(true).truncate(false).open(&lock_path)?;

        file.try_lock_exclusive().map_err(|_| StoreError::Locked {
            path: lock_path.display().to_string(),
        })?;

        let mut file = file;
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;

        Ok(Self { file, path: lock_path })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = &self.path;
    }
}

fn lock_path_for(db_path: &Path) -> PathBuf {
    let mut s = db_path.as_os_str().to_owned();
    s.push(".lock");
    PathBuf::from(s)
}
