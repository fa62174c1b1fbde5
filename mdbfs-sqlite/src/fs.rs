// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The tabular backend's filesystem operation layer (§4.5).

use log::warn;
use mdbfs_core::{to_errno, Attr, DirEntry, FsOps};

use crate::decode::{decode, DecodedPath};
use crate::manager::TabularManager;

pub struct TabularFs {
	manager: TabularManager,
}

impl TabularFs {
	pub fn new(manager: TabularManager) -> Self {
		Self { manager }
	}

	fn join(parent: &str, name: &str) -> String {
		if parent == "/" {
			format!("/{}", name)
		} else {
			format!("{}/{}", parent, name)
		}
	}
}

impl FsOps for TabularFs {
	fn init(&self) {
		// Nothing to do: see FsOps::init on why inode numbering and direct
		// I/O need no per-backend handling.
	}

	fn destroy(&self) {
		self.manager.close();
	}

	fn getattr(&self, path: &str) -> Result<Attr, i32> {
		let decoded = decode(path).ok_or(libc::ENOENT)?;
		match decoded {
			DecodedPath::Database => match self.manager.get_table_names() {
				Some(_) => Ok(Attr::directory()),
				None => Err(libc::ENOENT),
			},
			DecodedPath::Table { table } => match self.manager.get_row_names(&table) {
				Some(_) => Ok(Attr::directory()),
				None => Err(libc::ENOENT),
			},
			DecodedPath::Row { table, row } => match self.manager.get_column_names(&table, &row) {
				Some(columns) if !columns.is_empty() => Ok(Attr::directory()),
				_ => Err(libc::ENOENT),
			},
			DecodedPath::Column { table, row, column } => match self.manager.get_cell(&table, &row, &column) {
				Some(bytes) => Ok(Attr::file(bytes.len() as u64)),
				None => Err(libc::ENOENT),
			},
		}
	}

	fn readdir(&self, path: &str, offset: u64, filler: &mut dyn FnMut(DirEntry)) -> Result<(), i32> {
		if offset > 0 {
			return Ok(());
		}
		let decoded = decode(path).ok_or(libc::ENOENT)?;
		let names = match &decoded {
			DecodedPath::Column { .. } => return Err(libc::ENOENT),
			DecodedPath::Database => self.manager.get_table_names().ok_or(libc::ENOENT)?,
			DecodedPath::Table { table } => self.manager.get_row_names(table).ok_or(libc::ENOENT)?,
			DecodedPath::Row { table, row } => {
				let columns = self.manager.get_column_names(table, row).ok_or(libc::ENOENT)?;
				if columns.is_empty() {
					return Err(libc::ENOENT);
				}
				columns
			}
		};
		for name in names {
			let child = Self::join(path, &name);
			let attr = self.getattr(&child).unwrap_or_else(|_| Attr::file(0));
			filler(DirEntry::new(name, attr));
		}
		Ok(())
	}

	fn read(&self, path: &str, buf: &mut [u8], offset: u64) -> Result<usize, i32> {
		let decoded = decode(path).ok_or(libc::ENOENT)?;
		let DecodedPath::Column { table, row, column } = decoded else {
			return Err(libc::EISDIR);
		};
		let cell = self.manager.get_cell(&table, &row, &column).ok_or(libc::ENOENT)?;
		let offset = offset as usize;
		if offset >= cell.len() {
			return Ok(0);
		}
		let n = std::cmp::min(cell.len() - offset, buf.len());
		buf[..n].copy_from_slice(&cell[offset..offset + n]);
		Ok(n)
	}

	fn write(&self, path: &str, data: &[u8], offset: u64) -> Result<usize, i32> {
		let decoded = decode(path).ok_or(libc::ENOENT)?;
		let DecodedPath::Column { table, row, column } = decoded else {
			return Err(libc::EISDIR);
		};
		if offset > 0 {
			return Ok(0);
		}
		match self.manager.set_cell(&table, &row, &column, data) {
			Ok(()) => Ok(data.len()),
			Err(err) => {
				warn!("set_cell failed: {}", err);
				Err(libc::EINTR)
			}
		}
	}

	fn mknod(&self, path: &str, _mode: u32) -> Result<(), i32> {
		let decoded = decode(path).ok_or(libc::ENOENT)?;
		let DecodedPath::Column { table, row, column } = decoded else {
			return Err(libc::EROFS);
		};
		match self.manager.create_column(&table, &column) {
			Ok(()) => Ok(()),
			Err(err) => {
				warn!("create_column failed for row {}: {}", row, err);
				Err(libc::EINTR)
			}
		}
	}

	fn mkdir(&self, _path: &str) -> Result<(), i32> {
		Err(libc::EROFS)
	}

	fn unlink(&self, _path: &str) -> Result<(), i32> {
		Err(libc::EROFS)
	}

	fn rmdir(&self, path: &str) -> Result<(), i32> {
		let decoded = decode(path).ok_or(libc::ENOENT)?;
		match decoded {
			DecodedPath::Column { .. } => Err(libc::EINTR),
			DecodedPath::Database => Err(libc::EACCES),
			DecodedPath::Table { table } => self.manager.remove_table(&table).map_err(|err| {
				warn!("remove_table failed: {}", err);
				libc::EINTR
			}),
			DecodedPath::Row { table, row } => self.manager.remove_row(&table, &row).map_err(|err| {
				warn!("remove_row failed: {}", err);
				libc::EINTR
			}),
		}
	}

	fn rename(&self, from: &str, to: &str, _flags: u32) -> Result<(), i32> {
		let from_decoded = decode(from).ok_or(libc::ENOENT)?;
		let to_decoded = decode(to).ok_or(libc::ENOENT)?;

		let result = match (&from_decoded, &to_decoded) {
			(DecodedPath::Database, DecodedPath::Database) => return Err(libc::EROFS),
			(DecodedPath::Table { table: old }, DecodedPath::Table { table: new }) => {
				self.manager.rename_table(old, new)
			}
			(DecodedPath::Row { table: old_table, row: old_row }, DecodedPath::Row { table: new_table, row: new_row })
				if old_table == new_table =>
			{
				self.manager.rename_row(old_table, old_row, new_row)
			}
			(
				DecodedPath::Column { table: old_table, row: old_row, column: old_column },
				DecodedPath::Column { table: new_table, row: new_row, column: new_column },
			) if old_table == new_table && old_row == new_row => {
				self.manager.rename_column(old_table, old_column, new_column)
			}
			_ => return Err(libc::ENOSPC),
		};

		result.map_err(|err| {
			warn!("rename failed: {}", err);
			to_errno(&err)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rusqlite::Connection;

	fn fixture() -> (TabularFs, tempfile::TempPath) {
		let file = tempfile::NamedTempFile::new().unwrap();
		let path = file.into_temp_path();
		{
			let conn = Connection::open(&path).unwrap();
			conn.execute("CREATE TABLE people (name TEXT, age INTEGER)", []).unwrap();
			conn.execute("INSERT INTO people (name, age) VALUES ('alice', 30)", []).unwrap();
			conn.execute("INSERT INTO people (name, age) VALUES ('bob', 25)", []).unwrap();
		}
		let manager = TabularManager::new();
		manager.open(&path).unwrap();
		(TabularFs::new(manager), path)
	}

	#[test]
	fn scenario_s1_reads_rows_and_cells() {
		let (fs, _guard) = fixture();

		let mut tables = Vec::new();
		fs.readdir("/", 0, &mut |entry| tables.push(entry.name)).unwrap();
		assert_eq!(tables, vec!["people".to_string()]);

		let mut rows = Vec::new();
		fs.readdir("/people", 0, &mut |entry| rows.push(entry.name)).unwrap();
		assert_eq!(rows, vec!["1".to_string(), "2".to_string()]);

		let mut columns = Vec::new();
		fs.readdir("/people/1", 0, &mut |entry| columns.push(entry.name)).unwrap();
		assert_eq!(columns, vec!["name".to_string(), "age".to_string()]);

		let mut buf = [0u8; 16];
		let n = fs.read("/people/1/name", &mut buf, 0).unwrap();
		assert_eq!(&buf[..n], b"alice");
		assert_eq!(fs.getattr("/people/1/name").unwrap().size, 5);

		let written = fs.write("/people/1/name", b"bob", 0).unwrap();
		assert_eq!(written, 3);
		let n = fs.read("/people/1/name", &mut buf, 0).unwrap();
		assert_eq!(&buf[..n], b"bob");
	}

	#[test]
	fn scenario_s2_fourth_component_is_enoent() {
		let (fs, _guard) = fixture();
		assert_eq!(fs.getattr("/people/1/name/extra"), Err(libc::ENOENT));
		let mut buf = [0u8; 4];
		assert_eq!(fs.read("/people/1/name/extra", &mut buf, 0), Err(libc::ENOENT));
	}

	#[test]
	fn scenario_s3_mknod_adds_a_column() {
		let (fs, _guard) = fixture();
		fs.mknod("/people/1/email", 0o644).unwrap();
		let mut columns = Vec::new();
		fs.readdir("/people/1", 0, &mut |entry| columns.push(entry.name)).unwrap();
		assert!(columns.contains(&"email".to_string()));
	}

	#[test]
	fn scenario_s4_rename_tag_invariance() {
		let (fs, _guard) = fixture();
		fs.rename("/people", "/persons", 0).unwrap();
		let mut tables = Vec::new();
		fs.readdir("/", 0, &mut |entry| tables.push(entry.name)).unwrap();
		assert_eq!(tables, vec!["persons".to_string()]);

		assert_eq!(fs.rename("/persons", "/persons/1", 0), Err(libc::ENOSPC));
	}

	#[test]
	fn offset_read_boundary() {
		let (fs, _guard) = fixture();
		let mut buf = [0u8; 16];
		assert_eq!(fs.read("/people/1/name", &mut buf, 5), Ok(0));
		let n = fs.read("/people/1/name", &mut buf, 2).unwrap();
		assert_eq!(&buf[..n], b"ice");
	}

	#[test]
	fn unsupported_ops_return_the_documented_errno() {
		let (fs, _guard) = fixture();
		assert_eq!(fs.unlink("/people/1/name"), Err(libc::EROFS));
		assert_eq!(fs.mkdir("/whatever"), Err(libc::EROFS));
		assert_eq!(fs.rmdir("/"), Err(libc::EACCES));
	}
}
