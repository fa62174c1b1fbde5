// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The mdbfs driver (§6): parses the backend selector and database path,
//! attaches the backend, and hands its `FsOps` to the FS host. Everything
//! this binary does beyond that is out of the core's scope — it exists to
//! exercise the core, not to extend it.

mod cli;
mod logging;
mod mount;
mod registry;

use std::ffi::OsStr;
use std::path::Path;
use std::process::ExitCode;

use log::error;

use cli::Cli;
use mount::MdbfsFuse;

const PROGRAM_HELP: &str = concat!(
	"Usage: mdbfs --type=<backend> --db=<path> <mountpoint> [FUSE options]\n\n",
	"  --type=<backend>   database backend to mount with\n",
	"  --db=<path>        path to the database artifact to attach\n",
	"  -h, --help         print this help and backend help, then exit\n",
	"  -v, --version      print program and backend versions, then exit\n\n",
	"Any other arguments, including the mountpoint and `-o` options, are\n",
	"passed through to the FUSE mount loop untouched.\n",
);

const MOUNT_OPTION_HELP: &str = concat!(
	"Mount options (passed through to libfuse):\n",
	"  -o allow_other      allow access by users other than the one who mounted it\n",
	"  -o allow_root        allow access by root\n",
	"  -o default_permissions  enable permission checking by the kernel\n",
	"  -o ro                 mount read-only\n",
);

fn main() -> ExitCode {
	logging::init();
	let cli = Cli::parse_args();
	let registry = registry::build();

	if cli.help {
		print!("{}", PROGRAM_HELP);
		print!("{}", registry.help_text());
		print!("{}", MOUNT_OPTION_HELP);
		return ExitCode::SUCCESS;
	}

	if cli.version {
		println!("mdbfs {}", env!("CARGO_PKG_VERSION"));
		print!("{}", registry.version_text());
		return ExitCode::SUCCESS;
	}

	let Some(backend_name) = cli.backend_type.as_deref() else {
		error!("missing required argument: --type");
		return ExitCode::from(1);
	};
	let Some(backend) = registry.get(backend_name) else {
		error!("no such backend: {}", backend_name);
		return ExitCode::from(1);
	};

	let Some(db_path) = cli.db.as_deref() else {
		error!("missing required argument: --db");
		return ExitCode::from(2);
	};

	let Some((mountpoint, fuse_args)) = cli.rest.split_first() else {
		error!("missing required argument: mountpoint");
		return ExitCode::from(1);
	};
	let fuse_args: Vec<&OsStr> = fuse_args.iter().map(OsStr::new).collect();

	if let Err(errno) = backend.init(&[]) {
		error!("backend init failed (errno {})", errno);
		return ExitCode::from(1);
	}

	let ops = match backend.open(Path::new(db_path)) {
		Ok(ops) => ops,
		Err(errno) => {
			error!("failed to open database {} (errno {})", db_path, errno);
			return ExitCode::from(2);
		}
	};

	let filesystem = fuse_mt::FuseMT::new(MdbfsFuse::new(ops), 1);
	let result = fuse_mt::mount(filesystem, mountpoint, &fuse_args);

	backend.close();
	backend.deinit();

	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("mount loop exited with an error: {}", err);
			ExitCode::from(err.raw_os_error().unwrap_or(1) as u8)
		}
	}
}
