// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Installs an `env_logger` that renders the fixed wire format from §6
//! instead of the crate's default one. `MDBFS_DEBUG` (non-empty) raises the
//! minimum level to `Debug`; otherwise it is `Info`, matching "all other
//! levels are always emitted."

use std::io::Write;

use log::LevelFilter;

pub fn init() {
	let level = if std::env::var_os("MDBFS_DEBUG").is_some_and(|v| !v.is_empty()) {
		LevelFilter::Debug
	} else {
		LevelFilter::Info
	};

	env_logger::Builder::new()
		.filter_level(level)
		.format(|buf, record| writeln!(buf, "{}", mdbfs_core::format_line(record.level(), record.args())))
		.target(env_logger::Target::Stderr)
		.init();
}
