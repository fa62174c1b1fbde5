// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The backend registry/dispatcher (§4.2) and the descriptor every backend
//! implements (§3).
//!
//! A capability record, not a tagged enum with a match at every call site —
//! §9 prefers this because it keeps backends closed units the dispatcher
//! never needs to know the internals of.

use std::path::Path;

use crate::ops::FsOps;

/// The uniform surface the dispatcher and the CLI front end need from a
/// backend, independent of how that backend talks to its database.
pub trait Backend: Send + Sync {
	/// Short identifier, e.g. `"sqlite"`. Distinct from the registry key
	/// an alias is looked up under — see [`Registry::help_text`].
	fn name(&self) -> &'static str;

	fn description(&self) -> &'static str;

	/// `None` when the backend has nothing more to say than its
	/// description.
	fn help(&self) -> Option<&'static str> {
		None
	}

	fn version(&self) -> &'static str;

	/// Called once, right after the dispatcher selects this backend,
	/// before [`Backend::open`]. Reserved for backend-specific CLI
	/// arguments; no backend currently needs any.
	fn init(&self, _args: &[String]) -> Result<(), i32> {
		Ok(())
	}

	/// Attaches the database at `db_path` and returns an operations handle
	/// ready to be handed to the FS host. A failure here is what produces
	/// exit code 2 (§6): missing path, or the engine refusing to open it.
	fn open(&self, db_path: &Path) -> Result<Box<dyn FsOps>, i32>;

	/// Called after the FS host's mount loop returns, for any
	/// backend-level teardown distinct from the operations handle's own
	/// `destroy` (which closes the database handle). Default: nothing to
	/// do.
	fn close(&self) {}

	/// Called once at process exit, after [`Backend::close`].
	fn deinit(&self) {}
}

/// One registry slot: a lookup name — possibly an alias — paired with the
/// factory that builds the backend it names.
pub struct RegistryEntry {
	pub name: &'static str,
	pub factory: fn() -> Box<dyn Backend>,
}

/// A statically-ordered, immutable list of registry entries. Multiple
/// entries may share one factory to express aliases (`sqlite`/`sqlite3`).
pub struct Registry {
	entries: &'static [RegistryEntry],
}

impl Registry {
	pub const fn new(entries: &'static [RegistryEntry]) -> Self {
		Self { entries }
	}

	/// Looks up `name` by exact match and builds the backend it resolves
	/// to, or `None` if no entry matches.
	pub fn get(&self, name: &str) -> Option<Box<dyn Backend>> {
		self.entries.iter().find(|entry| entry.name == name).map(|entry| (entry.factory)())
	}

	/// Concatenates one block per *primary* entry — an entry whose
	/// registry key equals the backend's own `name()` — skipping aliases
	/// so they don't contribute duplicate blocks.
	pub fn help_text(&self) -> String {
		let mut out = String::new();
		for entry in self.primary_entries() {
			let backend = (entry.factory)();
			out.push_str(&format!(
				"{} - {}\n\n{}\n\n",
				backend.name(),
				backend.description(),
				backend.help().unwrap_or("(no additional help available)")
			));
		}
		out
	}

	pub fn version_text(&self) -> String {
		let mut out = String::new();
		for entry in self.primary_entries() {
			let backend = (entry.factory)();
			out.push_str(&format!("Backend {} version {}\n", backend.name(), backend.version()));
		}
		out
	}

	fn primary_entries(&self) -> impl Iterator<Item = &'static RegistryEntry> {
		self.entries.iter().filter(|entry| {
			let backend = (entry.factory)();
			backend.name() == entry.name
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Dummy;
	impl Backend for Dummy {
		fn name(&self) -> &'static str {
			"dummy"
		}
		fn description(&self) -> &'static str {
			"a test backend"
		}
		fn version(&self) -> &'static str {
			"0.0.0"
		}
		fn open(&self, _db_path: &Path) -> Result<Box<dyn FsOps>, i32> {
			Err(libc::ENOSYS)
		}
	}

	fn dummy_factory() -> Box<dyn Backend> {
		Box::new(Dummy)
	}

	static ENTRIES: &[RegistryEntry] = &[
		RegistryEntry { name: "dummy", factory: dummy_factory },
		RegistryEntry { name: "dummy-alias", factory: dummy_factory },
	];

	#[test]
	fn get_resolves_both_the_primary_name_and_aliases() {
		let registry = Registry::new(ENTRIES);
		assert!(registry.get("dummy").is_some());
		assert!(registry.get("dummy-alias").is_some());
		assert!(registry.get("nonexistent").is_none());
	}

	#[test]
	fn help_and_version_text_skip_aliases() {
		let registry = Registry::new(ENTRIES);
		assert_eq!(registry.help_text().matches("dummy - a test backend").count(), 1);
		assert_eq!(registry.version_text().matches("Backend dummy version 0.0.0").count(), 1);
	}
}
