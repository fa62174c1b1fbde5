// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The key-value backend's filesystem operation layer (§4.5).

use log::warn;
use mdbfs_core::{Attr, DirEntry, FsOps};

use crate::decode::decode;
use crate::manager::KvManager;

pub struct KvFs {
	manager: KvManager,
}

impl KvFs {
	pub fn new(manager: KvManager) -> Self {
		Self { manager }
	}
}

impl FsOps for KvFs {
	fn init(&self) {
		// Nothing to do: see FsOps::init on why inode numbering and direct
		// I/O need no per-backend handling.
	}

	fn destroy(&self) {
		self.manager.close();
	}

	fn getattr(&self, path: &str) -> Result<Attr, i32> {
		let key = decode(path).ok_or(libc::ENOENT)?;
		match key {
			None => Ok(Attr::directory()),
			Some(key) => match self.manager.get_record_value(&key) {
				Some(value) => Ok(Attr::file(value.len() as u64)),
				None => Err(libc::ENOENT),
			},
		}
	}

	/// Only the root is a directory; §4.5 has no pagination to honor since
	/// every key lives directly under `/`.
	fn readdir(&self, path: &str, offset: u64, filler: &mut dyn FnMut(DirEntry)) -> Result<(), i32> {
		if offset > 0 {
			return Ok(());
		}
		match decode(path).ok_or(libc::ENOENT)? {
			Some(_) => Err(libc::ENOENT),
			None => {
				let keys = self.manager.get_record_keys().ok_or(libc::ENOENT)?;
				for key in keys {
					if key.is_empty() {
						continue;
					}
					let child = format!("/{}", key);
					let attr = self.getattr(&child).unwrap_or_else(|_| Attr::file(0));
					filler(DirEntry::new(key, attr));
				}
				Ok(())
			}
		}
	}

	fn read(&self, path: &str, buf: &mut [u8], offset: u64) -> Result<usize, i32> {
		let key = decode(path).ok_or(libc::ENOENT)?.ok_or(libc::EISDIR)?;
		let value = self.manager.get_record_value(&key).ok_or(libc::ENOENT)?;
		let offset = offset as usize;
		if offset >= value.len() {
			return Ok(0);
		}
		let n = std::cmp::min(value.len() - offset, buf.len());
		buf[..n].copy_from_slice(&value[offset..offset + n]);
		Ok(n)
	}

	fn write(&self, path: &str, data: &[u8], offset: u64) -> Result<usize, i32> {
		let key = decode(path).ok_or(libc::ENOENT)?.ok_or(libc::EISDIR)?;
		if offset > 0 {
			return Ok(0);
		}
		match self.manager.set_record_value(&key, data) {
			Ok(()) => Ok(data.len()),
			Err(err) => {
				warn!("set_record_value failed: {}", err);
				Err(libc::EINTR)
			}
		}
	}

	fn mknod(&self, path: &str, _mode: u32) -> Result<(), i32> {
		let key = decode(path).ok_or(libc::EINVAL)?.ok_or(libc::EINVAL)?;
		self.manager.create_record(&key).map_err(|err| {
			warn!("create_record failed: {}", err);
			libc::EINVAL
		})
	}

	fn unlink(&self, path: &str) -> Result<(), i32> {
		let key = decode(path).ok_or(libc::EINVAL)?.ok_or(libc::EINVAL)?;
		self.manager.remove_record(&key).map_err(|err| {
			warn!("remove_record failed: {}", err);
			libc::EINVAL
		})
	}

	fn rename(&self, from: &str, to: &str, _flags: u32) -> Result<(), i32> {
		let old = decode(from).ok_or(libc::EINVAL)?.ok_or(libc::EINVAL)?;
		let new = decode(to).ok_or(libc::EINVAL)?.ok_or(libc::EINVAL)?;
		self.manager.rename_record(&old, &new).map_err(|err| {
			warn!("rename_record failed: {}", err);
			libc::EINVAL
		})
	}

	// §4.5 lists no `mkdir`/`rmdir` entry for this backend — the table has
	// no slot for them, so the trait default (`ENOSYS`, "absent from the
	// table") applies unchanged.
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fixture() -> (KvFs, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		{
			sled::open(dir.path()).unwrap();
		}
		let manager = KvManager::new();
		manager.open(dir.path()).unwrap();
		manager.set_record_value("k1", b"v1").unwrap();
		manager.set_record_value("k2", b"v2").unwrap();
		(KvFs::new(manager), dir)
	}

	#[test]
	fn scenario_s5_lists_reads_writes_and_unlinks() {
		let (fs, _guard) = fixture();

		let mut keys = Vec::new();
		fs.readdir("/", 0, &mut |entry| keys.push(entry.name)).unwrap();
		keys.sort();
		assert_eq!(keys, vec!["k1".to_string(), "k2".to_string()]);

		let mut buf = [0u8; 16];
		let n = fs.read("/k1", &mut buf, 0).unwrap();
		assert_eq!(&buf[..n], b"v1");

		fs.write("/k1", b"V1", 0).unwrap();
		let n = fs.read("/k1", &mut buf, 0).unwrap();
		assert_eq!(&buf[..n], b"V1");

		fs.unlink("/k2").unwrap();
		let mut keys = Vec::new();
		fs.readdir("/", 0, &mut |entry| keys.push(entry.name)).unwrap();
		assert_eq!(keys, vec!["k1".to_string()]);
	}

	#[test]
	fn root_is_a_directory_other_paths_are_not() {
		let (fs, _guard) = fixture();
		assert!(fs.getattr("/").unwrap().is_dir);
		assert_eq!(fs.readdir("/k1", 0, &mut |_| {}), Err(libc::ENOENT));
	}

	#[test]
	fn offset_read_boundary() {
		let (fs, _guard) = fixture();
		let mut buf = [0u8; 16];
		assert_eq!(fs.read("/k1", &mut buf, 2), Ok(0));
	}

	#[test]
	fn mkdir_and_rmdir_are_absent_from_the_table() {
		let (fs, _guard) = fixture();
		assert_eq!(fs.mkdir("/whatever"), Err(libc::ENOSYS));
		assert_eq!(fs.rmdir("/"), Err(libc::ENOSYS));
	}
}
