// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The `refind-rs` library crate.
//!
//! This holds the firmware-independent parts of the boot menu: the
//! configuration language (tokenizer, global settings, `menuentry`
//! stanzas) and legacy BIOS boot preparation (volume election and the
//! MBR/EMBR activation rewrite).
//!
//! Frontends supply the pieces that need a screen or a particular
//! firmware: icon loading, sub-screen generation, and the final
//! handoff. A text-mode example lives in
//! [refind-rs-minimal](https://github.com/some100/refind-rs/tree/main/refind-rs-minimal).
//!
//! ## MSRV
//!
//! The minimum supported rust version is 1.88.0.

#![cfg_attr(not(any(fuzzing, test, doctest)), no_std)]

/// The primary result type that wraps around [`crate::error::BootError`].
pub type BootResult<T> = Result<T, crate::error::BootError>;

pub mod config;
pub mod error;
pub mod legacy;
pub mod menu;
pub mod system;
pub mod volume;

extern crate alloc;
