// Copyright 2024 The mdbfs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The diagnostic wire format fixed by §6: `"** mdbfs: <LEVEL>: <message>"`.
//!
//! `log::Level::Error` is the only level whose name doesn't match the
//! spec's taxonomy (`FAIL` rather than `ERROR`) — [`level_tag`] is the only
//! place that needs to know that.

use log::Level;

/// The tag this level prints as in the fixed wire format.
pub fn level_tag(level: Level) -> &'static str {
	match level {
		Level::Error => "FAIL",
		Level::Warn => "WARN",
		Level::Info => "INFO",
		Level::Debug => "DEBUG",
		Level::Trace => "DEBUG",
	}
}

/// Formats one diagnostic line, without a trailing newline.
pub fn format_line(level: Level, message: &std::fmt::Arguments<'_>) -> String {
	format!("** mdbfs: {}: {}", level_tag(level), message)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tags_error_as_fail() {
		assert_eq!(level_tag(Level::Error), "FAIL");
		assert_eq!(level_tag(Level::Warn), "WARN");
		assert_eq!(level_tag(Level::Info), "INFO");
		assert_eq!(level_tag(Level::Debug), "DEBUG");
	}

	#[test]
	fn formats_the_fixed_wire_line() {
		let line = format_line(Level::Warn, &format_args!("db closed"));
		assert_eq!(line, "** mdbfs: WARN: db closed");
	}
}
