// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The key-value database manager (§4.4), backed by `sled` — the
//! embedded engine standing in for the spec's `berkeleydb`/`bdb`/`db`
//! selector (see DESIGN.md for why).

use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use mdbfs_core::other_io_err;
use parking_lot::Mutex;

fn not_connected() -> io::Error {
	io::Error::new(io::ErrorKind::NotConnected, "no key-value database is open")
}

struct Opened {
	db: sled::Db,
	path: PathBuf,
}

pub struct KvManager {
	opened: Mutex<Option<Opened>>,
}

impl Default for KvManager {
	fn default() -> Self {
		Self::new()
	}
}

impl KvManager {
	pub fn new() -> Self {
		Self { opened: Mutex::new(None) }
	}

	/// Opens the database at `path`. Like the tabular manager, a
	/// previously open handle is closed first, with a warning.
	pub fn open(&self, path: &Path) -> io::Result<()> {
		let mut guard = self.opened.lock();
		if guard.is_some() {
			warn!("key-value database already open, closing before reopening");
			*guard = None;
		}
		if !path.exists() {
			return Err(io::Error::new(io::ErrorKind::NotFound, format!("no such database: {}", path.display())));
		}
		let db = sled::open(path).map_err(other_io_err)?;
		*guard = Some(Opened { db, path: path.to_path_buf() });
		Ok(())
	}

	pub fn close(&self) {
		let mut guard = self.opened.lock();
		if guard.is_none() {
			warn!("closing key-value database that is not open");
		}
		*guard = None;
	}

	fn with_db<T>(&self, f: impl FnOnce(&sled::Db) -> io::Result<T>) -> io::Result<T> {
		let guard = self.opened.lock();
		match &*guard {
			Some(opened) => f(&opened.db),
			None => Err(not_connected()),
		}
	}

	pub fn get_database_name(&self) -> Option<String> {
		let guard = self.opened.lock();
		guard.as_ref().and_then(|opened| opened.path.file_name().map(|n| n.to_string_lossy().into_owned()))
	}

	pub fn get_record_keys(&self) -> Option<Vec<String>> {
		self.with_db(|db| {
			let mut keys = Vec::new();
			for entry in db.iter() {
				let (key, _) = entry.map_err(other_io_err)?;
				keys.push(String::from_utf8_lossy(&key).into_owned());
			}
			Ok(keys)
		})
		.ok()
	}

	pub fn get_record_value(&self, key: &str) -> Option<Vec<u8>> {
		self.with_db(|db| Ok(db.get(key.as_bytes()).map_err(other_io_err)?.map(|v| v.to_vec()))).ok().flatten()
	}

	pub fn set_record_value(&self, key: &str, value: &[u8]) -> io::Result<()> {
		self.with_db(|db| {
			db.insert(key.as_bytes(), value).map_err(other_io_err)?;
			Ok(())
		})
	}

	/// Implemented as get + delete + put; a crash between the delete and
	/// the put leaves the record gone rather than renamed. §4.4/§5 flag
	/// this as an open question the spec declines to resolve; we don't
	/// add rollback here either (see DESIGN.md).
	pub fn rename_record(&self, old: &str, new: &str) -> io::Result<()> {
		self.with_db(|db| {
			let value = db
				.get(old.as_bytes())
				.map_err(other_io_err)?
				.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such record"))?;
			db.remove(old.as_bytes()).map_err(other_io_err)?;
			db.insert(new.as_bytes(), value.as_ref()).map_err(other_io_err)?;
			Ok(())
		})
	}

	pub fn create_record(&self, key: &str) -> io::Result<()> {
		self.with_db(|db| {
			if db.contains_key(key.as_bytes()).map_err(other_io_err)? {
				return Err(io::Error::new(io::ErrorKind::AlreadyExists, "record already exists"));
			}
			db.insert(key.as_bytes(), &[][..]).map_err(other_io_err)?;
			Ok(())
		})
	}

	pub fn remove_record(&self, key: &str) -> io::Result<()> {
		self.with_db(|db| {
			db.remove(key.as_bytes()).map_err(other_io_err)?;
			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn opened_manager() -> (KvManager, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		{
			sled::open(dir.path()).unwrap();
		}
		let manager = KvManager::new();
		manager.open(dir.path()).unwrap();
		manager.set_record_value("k1", b"v1").unwrap();
		manager.set_record_value("k2", b"v2").unwrap();
		(manager, dir)
	}

	#[test]
	fn database_name_is_the_open_path_s_file_name() {
		let (manager, guard) = opened_manager();
		let expected = guard.path().file_name().unwrap().to_string_lossy().into_owned();
		assert_eq!(manager.get_database_name(), Some(expected));
	}

	#[test]
	fn database_name_is_none_without_an_open_handle() {
		let manager = KvManager::new();
		assert_eq!(manager.get_database_name(), None);
	}

	#[test]
	fn lists_and_reads_records() {
		let (manager, _guard) = opened_manager();
		let mut keys = manager.get_record_keys().unwrap();
		keys.sort();
		assert_eq!(keys, vec!["k1".to_string(), "k2".to_string()]);
		assert_eq!(manager.get_record_value("k1").unwrap(), b"v1");
	}

	#[test]
	fn write_then_read_round_trips() {
		let (manager, _guard) = opened_manager();
		manager.set_record_value("k1", b"V1").unwrap();
		assert_eq!(manager.get_record_value("k1").unwrap(), b"V1");
	}

	#[test]
	fn remove_drops_the_key() {
		let (manager, _guard) = opened_manager();
		manager.remove_record("k2").unwrap();
		let mut keys = manager.get_record_keys().unwrap();
		keys.sort();
		assert_eq!(keys, vec!["k1".to_string()]);
	}

	#[test]
	fn rename_moves_the_value() {
		let (manager, _guard) = opened_manager();
		manager.rename_record("k1", "k3").unwrap();
		assert_eq!(manager.get_record_value("k1"), None);
		assert_eq!(manager.get_record_value("k3").unwrap(), b"v1");
	}

	#[test]
	fn create_record_rejects_an_existing_key() {
		let (manager, _guard) = opened_manager();
		assert!(manager.create_record("k1").is_err());
		manager.create_record("k3").unwrap();
		assert_eq!(manager.get_record_value("k3").unwrap(), Vec::<u8>::new());
	}
}
