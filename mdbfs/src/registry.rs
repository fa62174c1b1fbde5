// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Wires the two backend crates' registry entries into one
//! [`mdbfs_core::Registry`] (§4.2). Each backend crate owns its own static
//! entry list; this is the one place that knows both crates exist.

use mdbfs_core::{Registry, RegistryEntry};

/// Builds the process-wide registry. Leaked once at startup: the
/// dispatcher is immutable after program start (§5), so a `'static` slice
/// built by concatenating each backend's entries is simpler than
/// threading a `Vec` through every call site that expects `Registry`.
pub fn build() -> Registry {
	let mut entries = Vec::with_capacity(mdbfs_sqlite::ENTRIES.len() + mdbfs_kv::ENTRIES.len());
	entries.extend_from_slice(mdbfs_sqlite::ENTRIES);
	entries.extend_from_slice(mdbfs_kv::ENTRIES);
	let entries: &'static [RegistryEntry] = Box::leak(entries.into_boxed_slice());
	Registry::new(entries)
}
