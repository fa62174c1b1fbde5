// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Shared §8 conformance assertions, to be executed against an actual
//! [`FsOps`] implementation — the role `kvdb-shared-tests` plays for
//! `KeyValueDB` implementations, just phrased over paths instead of
//! columns and keys.

use mdbfs_core::FsOps;

/// Collects the names `readdir(path)` reports through its filler callback.
pub fn collect_readdir(fs: &dyn FsOps, path: &str) -> Vec<String> {
	let mut names = Vec::new();
	fs.readdir(path, 0, &mut |entry| names.push(entry.name)).expect("readdir should succeed");
	names
}

/// A test for invariant 3: `readdir(path)` enumerates exactly `expected`,
/// with no duplicates and no omissions, in either order.
pub fn test_listing_completeness(fs: &dyn FsOps, path: &str, expected: &[&str]) {
	let mut got = collect_readdir(fs, path);
	got.sort();
	let mut want: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
	want.sort();
	assert_eq!(got, want, "readdir({}) listing mismatch", path);
}

/// A test for invariant 4: after `write(path, data)`, `read(path)` returns
/// `data` verbatim and `getattr(path).size` matches its length.
pub fn test_read_write_idempotence(fs: &dyn FsOps, path: &str, data: &[u8]) {
	let n = fs.write(path, data, 0).expect("write should succeed");
	assert_eq!(n, data.len(), "write({}) should report the full length", path);

	let mut buf = vec![0u8; data.len()];
	let n = fs.read(path, &mut buf, 0).expect("read should succeed");
	assert_eq!(&buf[..n], data, "read({}) should return what was written", path);

	let attr = fs.getattr(path).expect("getattr should succeed");
	assert_eq!(attr.size, data.len() as u64, "getattr({}).size should match the written length", path);
}

/// A test for invariant 5: `read(path, buf, offset)` returns 0 once
/// `offset >= size`, and otherwise exactly `min(buf.len(), size - offset)`
/// bytes starting at `offset`.
pub fn test_offset_read_boundary(fs: &dyn FsOps, path: &str, full: &[u8]) {
	let mut buf = vec![0u8; full.len() + 8];

	let n = fs.read(path, &mut buf, full.len() as u64).expect("read at the end should succeed");
	assert_eq!(n, 0, "read({}) at offset == size should return 0", path);

	let n = fs.read(path, &mut buf, full.len() as u64 + 5).expect("read past the end should succeed");
	assert_eq!(n, 0, "read({}) past the end should return 0", path);

	if full.len() >= 2 {
		let offset = 1;
		let n = fs.read(path, &mut buf, offset as u64).expect("mid-file read should succeed");
		assert_eq!(&buf[..n], &full[offset..], "read({}, offset={}) should return the remaining tail", path, offset);
	}
}

/// A test for invariant 6: `rename(a, b)` succeeds only when `a` and `b`
/// decode to the same tag; a tag mismatch returns `ENOSPC` and changes
/// nothing `readdir` of either path's parent would observe.
pub fn test_rename_tag_mismatch_is_enospc(fs: &dyn FsOps, same_tag_child: &str, mismatched_tag_path: &str) {
	assert_eq!(
		fs.rename(same_tag_child, mismatched_tag_path, 0),
		Err(libc::ENOSPC),
		"rename({}, {}) across tags should be ENOSPC",
		same_tag_child,
		mismatched_tag_path
	);
}

/// A test for invariant 7: `unlink` and `mkdir` are universally refused.
pub fn test_unlink_and_mkdir_are_always_refused(fs: &dyn FsOps, any_path: &str) {
	assert_eq!(fs.unlink(any_path).unwrap_err(), fs.unlink(any_path).unwrap_err(), "unlink errno should be stable");
	assert!(fs.unlink(any_path).is_err(), "unlink({}) must fail", any_path);
	assert!(fs.mkdir(any_path).is_err(), "mkdir({}) must fail", any_path);
}
