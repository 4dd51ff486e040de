// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! System re-exports

pub mod fs;
pub mod helper;
pub mod log_backend;

mod global_allocator;
mod panic_handler;
