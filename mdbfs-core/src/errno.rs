// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Translates manager-level `io::Error`s into the negated-errno values the
//! FS host expects.
//!
//! Managers return plain `io::Result`, the same vocabulary `kvdb`'s
//! backends use for their engine. The operation layer is the one place
//! that needs an errno, so the conversion lives here rather than forcing
//! every manager method to know about POSIX.

use std::io;

/// Wraps a foreign engine error in an `io::Error`, mirroring the
/// `other_io_err` helper used throughout the kvdb backends.
pub fn other_io_err<E>(e: E) -> io::Error
where
	E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
	io::Error::new(io::ErrorKind::Other, e)
}

/// Maps an engine-layer failure to the errno §7 assigns to "Engine fault":
/// `EINTR`, logged at `warn` by the caller, never retried.
pub fn engine_fault_errno() -> i32 {
	libc::EINTR
}

/// Maps an `io::Error` returned by a database manager to a negated-errno
/// outcome for an operation that has no more specific mapping of its own.
/// `NotFound` becomes `ENOENT`; everything else is an engine fault.
pub fn to_errno(err: &io::Error) -> i32 {
	match err.kind() {
		io::ErrorKind::NotFound => libc::ENOENT,
		io::ErrorKind::InvalidInput => libc::EINVAL,
		io::ErrorKind::Unsupported => libc::EROFS,
		_ => engine_fault_errno(),
	}
}
