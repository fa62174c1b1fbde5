// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runs the shared §8 conformance suite against the key-value backend.

use mdbfs_kv::{KvFs, KvManager};

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
fn listing_completeness() {
	let (fs, _guard) = fixture();
	mdbfs_shared_tests::test_listing_completeness(&fs, "/", &["k1", "k2"]);
}

#[test]
fn read_write_idempotence() {
	let (fs, _guard) = fixture();
	mdbfs_shared_tests::test_read_write_idempotence(&fs, "/k1", b"V1");
}

#[test]
fn offset_read_boundary() {
	let (fs, _guard) = fixture();
	mdbfs_shared_tests::test_offset_read_boundary(&fs, "/k1", b"v1");
}

#[test]
fn unlink_is_supported_but_mkdir_is_not() {
	let (fs, _guard) = fixture();
	assert!(fs.unlink("/k2").is_ok());
	assert!(fs.mkdir("/whatever").is_err());
}
