//! Simple panic handler that reports the panic, stalls, then shuts down.
//!
//! This is enabled when the `panic_handler` feature is enabled, in case the user wanted to roll their
//! own panic handler implementation or for fuzzing/testing.

#![cfg(feature = "panic_handler")]
use core::fmt::Write;

/// The panic handler.
#[panic_handler]
fn panic_handler(info: &core::panic::PanicInfo) -> ! {
    uefi::system::with_stdout(|stdout| {
        let _ = writeln!(stdout, "[PANIC]: {info}");
        let _ = writeln!(stdout, "Shutting down in 10 seconds");
    });
    uefi::boot::stall(10_000_000);
    uefi::runtime::reset(
        uefi::runtime::ResetType::SHUTDOWN,
        uefi::Status::ABORTED,
        None,
    );
}
