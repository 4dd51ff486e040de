// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Provides [`BootError`], which encapsulates other errors

use thiserror::Error;

/// An `Error` resulting from the program.
#[derive(Error, Debug)]
pub enum BootError {
    /// An error with UEFI, or a service from the [`uefi`] crate.
    #[error("UEFI Error")]
    Uefi(#[from] uefi::Error),

    /// A `String` could not be converted into a `CString16`
    #[error("String Conversion Error")]
    StrError(#[from] crate::system::helper::StrError),

    /// An error occurred while performing filesystem operations.
    #[error("Filesystem Error")]
    FsError(#[from] crate::system::fs::FsError),

    /// An error occurred while building a `DevicePath`.
    #[error("DevicePath Error")]
    DevicePathError(#[from] crate::system::helper::DevicePathError),

    /// An error occurred while rewriting a partition table.
    #[error("Mbr Error")]
    MbrError(#[from] crate::legacy::mbr::MbrError),
}
