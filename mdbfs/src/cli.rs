// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! §6's command-line surface: `--type`, `--db`, `--help`/`-h`,
//! `--version`/`-v`, and a trailing, unvalidated argument vector passed to
//! the FS host untouched.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
	name = "mdbfs",
	about = "Mount the contents of a database as a POSIX filesystem",
	disable_help_flag = true,
	disable_version_flag = true
)]
pub struct Cli {
	/// Backend to mount the database with (e.g. `sqlite`, `berkeleydb`).
	#[arg(long = "type")]
	pub backend_type: Option<String>,

	/// Path to the database artifact to attach.
	#[arg(long = "db")]
	pub db: Option<String>,

	#[arg(short = 'h', long = "help")]
	pub help: bool,

	#[arg(short = 'v', long = "version")]
	pub version: bool,

	/// Everything else — the mountpoint and any `-o` mount options — handed
	/// to the FS host untouched.
	#[arg(trailing_var_arg = true, allow_hyphen_values = true)]
	pub rest: Vec<String>,
}

impl Cli {
	pub fn parse_args() -> Self {
		Cli::parse()
	}
}
