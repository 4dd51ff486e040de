//! Simple UEFI backend for the [`log`] crate.

use core::fmt::Write;

use alloc::boxed::Box;
use log::{Level, Metadata, Record};
use uefi::system::with_stdout;

/// A simple logging backend for UEFI.
///
/// Records go straight to the firmware text console, which is where the
/// user is looking while the menu is up.
#[derive(Default)]
pub struct UefiLogger;

impl UefiLogger {
    /// Constructs a new [`UefiLogger`].
    #[must_use = "Has no effect if the result is unused"]
    pub const fn new() -> Self {
        Self
    }

    /// Constructs a new [`UefiLogger`], then immediately leaks it so that it can be used with `set_logger`.
    #[must_use = "Has no effect if the result is unused"]
    pub fn static_new() -> &'static Self {
        Box::leak(Box::new(Self::new()))
    }
}

impl log::Log for UefiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let level = record.level();
            let args = record.args();
            with_stdout(|stdout| {
                let _ = stdout.write_fmt(format_args!("[{level}] {args}\n"));
            });
        }
    }

    fn flush(&self) {}
}
