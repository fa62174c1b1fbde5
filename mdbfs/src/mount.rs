// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Adapts an [`FsOps`] implementation to `fuse_mt`'s [`FilesystemMT`] trait
//! — the FS host this workspace targets.
//!
//! `FsOps` addresses everything by a single path string; `FilesystemMT`
//! splits mutating calls into a parent directory and a child name. This
//! module owns that impedance mismatch so no backend needs to know about
//! it.

use std::ffi::OsStr;
use std::path::Path;

use fuse_mt::{
	CallbackResult, DirectoryEntry, FileAttr, FileType, FilesystemMT, RequestInfo, ResultEmpty, ResultEntry,
	ResultOpen, ResultReaddir, ResultSlice, ResultWrite, Timespec,
};
use mdbfs_core::{Attr, FsOps};

/// No file holds per-handle state — every `FsOps` call re-derives
/// everything it needs from the path — so every `open`/`opendir` call
/// hands back this placeholder handle.
const NO_FH: u64 = 0;

/// How long the FS host may cache an entry before re-querying it.
/// A short, fixed TTL rather than "forever": the database underneath can
/// change between two filesystem calls and mdbfs has no invalidation
/// channel to tell the host about it.
const ATTR_TTL: Timespec = Timespec { sec: 1, nsec: 0 };

const EPOCH: Timespec = Timespec { sec: 0, nsec: 0 };

/// Bit 0 of a FUSE `open` reply's flags, telling the kernel to route all
/// reads and writes on this handle straight to the filesystem instead of
/// through its page cache. This is how §4.5's "force direct I/O" is
/// actually expressed at the FS-host boundary — `FilesystemMT::init` has
/// no configuration struct to toggle it globally, so every `open` reply
/// sets the bit itself.
const FOPEN_DIRECT_IO: u32 = 1 << 0;

pub struct MdbfsFuse {
	ops: Box<dyn FsOps>,
}

impl MdbfsFuse {
	pub fn new(ops: Box<dyn FsOps>) -> Self {
		Self { ops }
	}
}

fn path_to_str(path: &Path) -> Result<String, i32> {
	path.to_str().map(str::to_owned).ok_or(libc::ENOENT)
}

/// Joins a `FilesystemMT` parent+name pair into the single path string
/// `FsOps` expects.
fn join(parent: &Path, name: &OsStr) -> Result<String, i32> {
	let parent = path_to_str(parent)?;
	let name = name.to_str().ok_or(libc::ENOENT)?;
	if parent == "/" {
		Ok(format!("/{}", name))
	} else {
		Ok(format!("{}/{}", parent, name))
	}
}

fn to_file_attr(attr: Attr) -> FileAttr {
	FileAttr {
		size: attr.size,
		blocks: (attr.size + 511) / 512,
		atime: EPOCH,
		mtime: EPOCH,
		ctime: EPOCH,
		crtime: EPOCH,
		kind: if attr.is_dir { FileType::Directory } else { FileType::RegularFile },
		perm: attr.mode as u16,
		nlink: if attr.is_dir { 2 } else { 1 },
		uid: 0,
		gid: 0,
		rdev: 0,
		flags: 0,
	}
}

impl FilesystemMT for MdbfsFuse {
	/// `fuse_mt` gives this hook no configuration struct to toggle inode
	/// numbering or direct I/O globally (unlike libfuse's high-level
	/// `cfg->use_ino`/`cfg->direct_io`); inode numbering is disabled by
	/// `to_file_attr` never populating an inode, and `open` sets the
	/// direct-I/O reply bit itself. See [`FOPEN_DIRECT_IO`].
	fn init(&self, _req: RequestInfo) -> ResultEmpty {
		self.ops.init();
		Ok(())
	}

	fn destroy(&self) {
		self.ops.destroy();
	}

	fn getattr(&self, _req: RequestInfo, path: &Path, _fh: Option<u64>) -> ResultEntry {
		let path = path_to_str(path)?;
		let attr = self.ops.getattr(&path)?;
		Ok((ATTR_TTL, to_file_attr(attr)))
	}

	fn opendir(&self, _req: RequestInfo, _path: &Path, _flags: u32) -> ResultOpen {
		Ok((NO_FH, 0))
	}

	fn readdir(&self, _req: RequestInfo, path: &Path, _fh: u64) -> ResultReaddir {
		let path = path_to_str(path)?;
		let mut entries = vec![
			DirectoryEntry { name: ".".into(), kind: FileType::Directory },
			DirectoryEntry { name: "..".into(), kind: FileType::Directory },
		];
		self.ops.readdir(&path, 0, &mut |entry| {
			let kind = if entry.attr.is_dir { FileType::Directory } else { FileType::RegularFile };
			entries.push(DirectoryEntry { name: entry.name.into(), kind });
		})?;
		Ok(entries)
	}

	fn open(&self, _req: RequestInfo, _path: &Path, flags: u32) -> ResultOpen {
		Ok((NO_FH, flags | FOPEN_DIRECT_IO))
	}

	fn read(
		&self,
		_req: RequestInfo,
		path: &Path,
		_fh: u64,
		offset: u64,
		size: u32,
		callback: impl FnOnce(ResultSlice<'_>) -> CallbackResult,
	) -> CallbackResult {
		let result = path_to_str(path).and_then(|path| {
			let mut buf = vec![0u8; size as usize];
			let n = self.ops.read(&path, &mut buf, offset)?;
			buf.truncate(n);
			Ok(buf)
		});
		match result {
			Ok(buf) => callback(Ok(&buf)),
			Err(errno) => callback(Err(errno)),
		}
	}

	fn write(&self, _req: RequestInfo, path: &Path, _fh: u64, offset: u64, data: Vec<u8>, _flags: u32) -> ResultWrite {
		let path = path_to_str(path)?;
		let n = self.ops.write(&path, &data, offset)?;
		Ok(n as u32)
	}

	fn mknod(&self, _req: RequestInfo, parent: &Path, name: &OsStr, mode: u32, _rdev: u32) -> ResultEntry {
		let path = join(parent, name)?;
		self.ops.mknod(&path, mode)?;
		let attr = self.ops.getattr(&path)?;
		Ok((ATTR_TTL, to_file_attr(attr)))
	}

	fn mkdir(&self, _req: RequestInfo, parent: &Path, name: &OsStr, _mode: u32) -> ResultEntry {
		let path = join(parent, name)?;
		self.ops.mkdir(&path)?;
		let attr = self.ops.getattr(&path)?;
		Ok((ATTR_TTL, to_file_attr(attr)))
	}

	fn unlink(&self, _req: RequestInfo, parent: &Path, name: &OsStr) -> ResultEmpty {
		let path = join(parent, name)?;
		self.ops.unlink(&path)
	}

	fn rmdir(&self, _req: RequestInfo, parent: &Path, name: &OsStr) -> ResultEmpty {
		let path = join(parent, name)?;
		self.ops.rmdir(&path)
	}

	fn rename(&self, _req: RequestInfo, parent: &Path, name: &OsStr, newparent: &Path, newname: &OsStr) -> ResultEmpty {
		let from = join(parent, name)?;
		let to = join(newparent, newname)?;
		self.ops.rename(&from, &to, 0)
	}
}
