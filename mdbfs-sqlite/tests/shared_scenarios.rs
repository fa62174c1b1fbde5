// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runs the shared §8 conformance suite against the tabular backend.

use mdbfs_sqlite::{TabularFs, TabularManager};
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
fn listing_completeness() {
	let (fs, _guard) = fixture();
	mdbfs_shared_tests::test_listing_completeness(&fs, "/", &["people"]);
	mdbfs_shared_tests::test_listing_completeness(&fs, "/people", &["1", "2"]);
	mdbfs_shared_tests::test_listing_completeness(&fs, "/people/1", &["name", "age"]);
}

#[test]
fn read_write_idempotence() {
	let (fs, _guard) = fixture();
	mdbfs_shared_tests::test_read_write_idempotence(&fs, "/people/1/name", b"carol");
}

#[test]
fn offset_read_boundary() {
	let (fs, _guard) = fixture();
	mdbfs_shared_tests::test_offset_read_boundary(&fs, "/people/1/name", b"alice");
}

#[test]
fn rename_tag_mismatch_is_enospc() {
	let (fs, _guard) = fixture();
	mdbfs_shared_tests::test_rename_tag_mismatch_is_enospc(&fs, "/people", "/people/1");
}

#[test]
fn unlink_and_mkdir_are_always_refused() {
	let (fs, _guard) = fixture();
	mdbfs_shared_tests::test_unlink_and_mkdir_are_always_refused(&fs, "/people/1/name");
}
