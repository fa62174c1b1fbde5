// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The tabular database manager (§4.4): an engine-neutral CRUD vocabulary
//! over a single SQLite connection.
//!
//! The connection lives behind a `Mutex<Option<Connection>>`, the same
//! shape `kvdb-rocksdb`/`kvdb-sled` use for their own handle — `None` is
//! `Closed`, `Some` is `Open`, and re-opening a handle that's already open
//! drops the old one first with a warning, exactly as §4.6 specifies.

use std::io;
use std::path::Path;

use log::warn;
use mdbfs_core::other_io_err;
use parking_lot::Mutex;
use rusqlite::Connection;

/// Quotes a SQL identifier, doubling any embedded `"`. Table, row-id and
/// column names all flow into queries this way since SQLite has no way to
/// bind an identifier as a parameter.
fn quote_ident(name: &str) -> String {
	format!("\"{}\"", name.replace('"', "\"\""))
}

fn not_connected() -> io::Error {
	io::Error::new(io::ErrorKind::NotConnected, "no tabular database is open")
}

pub struct TabularManager {
	conn: Mutex<Option<Connection>>,
}

impl Default for TabularManager {
	fn default() -> Self {
		Self::new()
	}
}

impl TabularManager {
	pub fn new() -> Self {
		Self { conn: Mutex::new(None) }
	}

	/// Opens the database at `path`. Closes any previously open handle
	/// first, with a warning (§4.6: re-entering `open` while already open
	/// transitions Open → Closed before proceeding).
	pub fn open(&self, path: &Path) -> io::Result<()> {
		let mut guard = self.conn.lock();
		if guard.is_some() {
			warn!("tabular database already open, closing before reopening");
			*guard = None;
		}
		if !path.exists() {
			return Err(io::Error::new(io::ErrorKind::NotFound, format!("no such database: {}", path.display())));
		}
		let conn = Connection::open(path).map_err(other_io_err)?;
		*guard = Some(conn);
		Ok(())
	}

	/// Closes the handle. A warning, not an error, if none was open.
	pub fn close(&self) {
		let mut guard = self.conn.lock();
		if guard.is_none() {
			warn!("closing tabular database that is not open");
		}
		*guard = None;
	}

	fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> io::Result<T>) -> io::Result<T> {
		let guard = self.conn.lock();
		match &*guard {
			Some(conn) => f(conn),
			None => Err(not_connected()),
		}
	}

	pub fn get_table_names(&self) -> Option<Vec<String>> {
		self.with_conn(|conn| {
			let mut stmt = conn
				.prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'")
				.map_err(other_io_err)?;
			let rows = stmt.query_map([], |row| row.get::<_, String>(0)).map_err(other_io_err)?;
			let mut names = Vec::new();
			for row in rows {
				names.push(row.map_err(other_io_err)?);
			}
			Ok(names)
		})
		.ok()
	}

	pub fn get_row_names(&self, table: &str) -> Option<Vec<String>> {
		if table.is_empty() {
			return None;
		}
		self.with_conn(|conn| {
			let sql = format!("SELECT rowid FROM {}", quote_ident(table));
			let mut stmt = conn.prepare(&sql).map_err(other_io_err)?;
			let rows = stmt.query_map([], |row| row.get::<_, i64>(0)).map_err(other_io_err)?;
			let mut names = Vec::new();
			for row in rows {
				names.push(row.map_err(other_io_err)?.to_string());
			}
			Ok(names)
		})
		.ok()
	}

	/// Lists the columns of `row` in `table`. A row that turns out not to
	/// exist yields an empty list rather than an error — every table has
	/// at least one column, so an empty result unambiguously means the
	/// row was never there.
	pub fn get_column_names(&self, table: &str, row: &str) -> Option<Vec<String>> {
		if table.is_empty() || row.is_empty() {
			return None;
		}
		self.with_conn(|conn| {
			let sql = format!("SELECT * FROM {} WHERE rowid = ?1", quote_ident(table));
			let mut stmt = conn.prepare(&sql).map_err(other_io_err)?;
			let column_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
			let mut rows = stmt.query([row]).map_err(other_io_err)?;
			Ok(match rows.next().map_err(other_io_err)? {
				Some(_) => column_names,
				None => Vec::new(),
			})
		})
		.ok()
	}

	fn column_exists(conn: &Connection, table: &str, column: &str) -> io::Result<bool> {
		let sql = format!("PRAGMA table_info({})", quote_ident(table));
		let mut stmt = conn.prepare(&sql).map_err(other_io_err)?;
		let mut names = stmt.query_map([], |row| row.get::<_, String>(1)).map_err(other_io_err)?;
		Ok(names.any(|name| matches!(name, Ok(name) if name == column)))
	}

	/// Reads the raw bytes of a cell. `None` on a missing argument, an
	/// engine error, a column that doesn't exist, or a row that doesn't
	/// exist — resolved with a schema check up front rather than the
	/// "value equals column name" heuristic the source relied on (see
	/// DESIGN.md).
	pub fn get_cell(&self, table: &str, row: &str, column: &str) -> Option<Vec<u8>> {
		if table.is_empty() || row.is_empty() || column.is_empty() {
			return None;
		}
		self.with_conn(|conn| {
			if !Self::column_exists(conn, table, column)? {
				return Ok(None);
			}
			let sql = format!("SELECT {} FROM {} WHERE rowid = ?1", quote_ident(column), quote_ident(table));
			let mut stmt = conn.prepare(&sql).map_err(other_io_err)?;
			let mut rows = stmt.query([row]).map_err(other_io_err)?;
			match rows.next().map_err(other_io_err)? {
				Some(row) => {
					let value: Vec<u8> = row.get(0).map_err(other_io_err)?;
					Ok(Some(value))
				}
				None => Ok(None),
			}
		})
		.ok()
		.flatten()
	}

	pub fn set_cell(&self, table: &str, row: &str, column: &str, value: &[u8]) -> io::Result<()> {
		if table.is_empty() || row.is_empty() || column.is_empty() {
			return Err(io::Error::new(io::ErrorKind::InvalidInput, "missing table, row or column"));
		}
		self.with_conn(|conn| {
			let sql = format!("UPDATE {} SET {} = ?1 WHERE rowid = ?2", quote_ident(table), quote_ident(column));
			conn.execute(&sql, rusqlite::params![value, row]).map_err(other_io_err)?;
			Ok(())
		})
	}

	pub fn rename_table(&self, old: &str, new: &str) -> io::Result<()> {
		self.with_conn(|conn| {
			let sql = format!("ALTER TABLE {} RENAME TO {}", quote_ident(old), quote_ident(new));
			conn.execute(&sql, []).map_err(other_io_err)?;
			Ok(())
		})
	}

	pub fn rename_row(&self, table: &str, old: &str, new: &str) -> io::Result<()> {
		self.with_conn(|conn| {
			let sql = format!("UPDATE {} SET rowid = ?1 WHERE rowid = ?2", quote_ident(table));
			conn.execute(&sql, rusqlite::params![new, old]).map_err(other_io_err)?;
			Ok(())
		})
	}

	pub fn rename_column(&self, table: &str, old: &str, new: &str) -> io::Result<()> {
		self.with_conn(|conn| {
			let sql =
				format!("ALTER TABLE {} RENAME COLUMN {} TO {}", quote_ident(table), quote_ident(old), quote_ident(new));
			conn.execute(&sql, []).map_err(other_io_err)?;
			Ok(())
		})
	}

	pub fn create_column(&self, table: &str, column: &str) -> io::Result<()> {
		self.with_conn(|conn| {
			let sql = format!("ALTER TABLE {} ADD COLUMN {}", quote_ident(table), quote_ident(column));
			conn.execute(&sql, []).map_err(other_io_err)?;
			Ok(())
		})
	}

	pub fn create_table(&self, _table: &str) -> io::Result<()> {
		Err(io::Error::new(io::ErrorKind::Unsupported, "creating a table by bare name is not implemented"))
	}

	pub fn create_row(&self, _table: &str) -> io::Result<()> {
		Err(io::Error::new(io::ErrorKind::Unsupported, "creating a row by bare name is not implemented"))
	}

	pub fn remove_table(&self, table: &str) -> io::Result<()> {
		self.with_conn(|conn| {
			let sql = format!("DROP TABLE {}", quote_ident(table));
			conn.execute(&sql, []).map_err(other_io_err)?;
			Ok(())
		})
	}

	pub fn remove_row(&self, table: &str, row: &str) -> io::Result<()> {
		self.with_conn(|conn| {
			let sql = format!("DELETE FROM {} WHERE rowid = ?1", quote_ident(table));
			conn.execute(&sql, [row]).map_err(other_io_err)?;
			Ok(())
		})
	}

	pub fn remove_column(&self, _table: &str, _column: &str) -> io::Result<()> {
		Err(io::Error::new(io::ErrorKind::Unsupported, "dropping a column is not implemented"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn opened_manager() -> (TabularManager, tempfile::TempPath) {
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
		(manager, path)
	}

	#[test]
	fn lists_tables_rows_and_columns() {
		let (manager, _guard) = opened_manager();
		assert_eq!(manager.get_table_names().unwrap(), vec!["people".to_string()]);
		assert_eq!(manager.get_row_names("people").unwrap(), vec!["1".to_string(), "2".to_string()]);
		assert_eq!(
			manager.get_column_names("people", "1").unwrap(),
			vec!["name".to_string(), "age".to_string()]
		);
	}

	#[test]
	fn missing_row_has_no_columns() {
		let (manager, _guard) = opened_manager();
		assert_eq!(manager.get_column_names("people", "999").unwrap(), Vec::<String>::new());
	}

	#[test]
	fn reads_and_writes_a_cell() {
		let (manager, _guard) = opened_manager();
		assert_eq!(manager.get_cell("people", "1", "name").unwrap(), b"alice");
		manager.set_cell("people", "1", "name", b"carol").unwrap();
		assert_eq!(manager.get_cell("people", "1", "name").unwrap(), b"carol");
	}

	#[test]
	fn missing_column_is_none_not_an_error() {
		let (manager, _guard) = opened_manager();
		assert_eq!(manager.get_cell("people", "1", "nonexistent"), None);
	}

	#[test]
	fn reopen_closes_the_previous_handle() {
		let (manager, _guard) = opened_manager();
		let file = tempfile::NamedTempFile::new().unwrap();
		let other_path = file.into_temp_path();
		Connection::open(&other_path).unwrap();
		manager.open(&other_path).unwrap();
		assert_eq!(manager.get_table_names(), Some(Vec::new()));
	}

	#[test]
	fn operations_fail_without_an_open_handle() {
		let manager = TabularManager::new();
		assert_eq!(manager.get_table_names(), None);
	}
}
