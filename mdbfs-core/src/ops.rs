// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The filesystem operation table every backend populates for the FS host.
//!
//! This is a plain Rust trait rather than a struct of function pointers:
//! each backend closes over its own database manager and implements the
//! subset of calls its database can actually express. A method left at its
//! default returns `ENOSYS`, which stands in for the call being absent from
//! the table — the host would reply `EOPNOTSUPP` to the kernel either way.

/// A single entry reported by [`FsOps::readdir`] through its filler
/// callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
	pub name: String,
	pub attr: Attr,
}

impl DirEntry {
	pub fn new(name: impl Into<String>, attr: Attr) -> Self {
		Self { name: name.into(), attr }
	}
}

/// The subset of `stat(2)` fields mdbfs ever reports: mode bits are fixed
/// per §3, and inode numbers are never assigned (disabled at `init`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attr {
	pub is_dir: bool,
	pub mode: u32,
	pub size: u64,
}

impl Attr {
	pub const DIR_MODE: u32 = 0o755;
	pub const FILE_MODE: u32 = 0o644;

	pub fn directory() -> Self {
		Self { is_dir: true, mode: Self::DIR_MODE, size: 0 }
	}

	pub fn file(size: u64) -> Self {
		Self { is_dir: false, mode: Self::FILE_MODE, size }
	}
}

/// Per-backend implementation of the POSIX calls the FS host delivers.
///
/// Paths arrive exactly as the host received them from the kernel — a
/// backend decodes them with its own path-to-entity parser before touching
/// its database manager. All fallible operations return a negated-errno
/// convention: `Ok` carries the success payload (a byte count for
/// `read`/`write`, nothing otherwise), `Err(errno)` carries a positive
/// `libc` errno value.
pub trait FsOps: Send + Sync {
	/// Called once when the FS host mounts. Neither backend needs to do
	/// anything here: inode numbering is disabled structurally ([`Attr`]
	/// has no inode field for a backend to populate, so the host falls
	/// back to its own path-derived numbering), and direct I/O is forced
	/// per-open by the adapter that wires an [`FsOps`] into the FS host
	/// (see `mdbfs::mount::MdbfsFuse::open`), not by this trait.
	fn init(&self) {}

	/// Called once when the FS host unmounts; closes the database handle.
	fn destroy(&self) {}

	fn getattr(&self, path: &str) -> Result<Attr, i32>;

	/// Lists `path`'s children through `filler`, one call per entry.
	///
	/// `offset` mirrors the raw libfuse callback's pagination cursor: a
	/// nonzero offset returns `Ok(())` with no entries, since no backend
	/// implements pagination. Hosts that don't expose a raw offset (this
	/// workspace's `fuse_mt` adapter included) always call with `0`.
	fn readdir(&self, path: &str, offset: u64, filler: &mut dyn FnMut(DirEntry)) -> Result<(), i32>;

	fn read(&self, path: &str, buf: &mut [u8], offset: u64) -> Result<usize, i32>;

	fn write(&self, path: &str, data: &[u8], offset: u64) -> Result<usize, i32>;

	fn mknod(&self, path: &str, mode: u32) -> Result<(), i32> {
		let _ = (path, mode);
		Err(libc::ENOSYS)
	}

	fn mkdir(&self, path: &str) -> Result<(), i32> {
		let _ = path;
		Err(libc::ENOSYS)
	}

	fn unlink(&self, path: &str) -> Result<(), i32> {
		let _ = path;
		Err(libc::ENOSYS)
	}

	fn rmdir(&self, path: &str) -> Result<(), i32> {
		let _ = path;
		Err(libc::ENOSYS)
	}

	fn rename(&self, from: &str, to: &str, flags: u32) -> Result<(), i32> {
		let _ = (from, to, flags);
		Err(libc::ENOSYS)
	}
}
