//! Filesystem helper functions for other modules.
//!
//! These wrap the UEFI [`SimpleFileSystem`] protocol into the handful of
//! operations the config loader actually needs: existence checks and
//! size-capped whole-file reads. Firmware is only required to supply FAT
//! here, which is all a boot volume carries anyway; anything more exotic
//! comes in through external filesystem drivers.

use alloc::{borrow::ToOwned, vec, vec::Vec};
use thiserror::Error;
use uefi::{
    CStr16, CString16, Handle, Status,
    boot::{self, ScopedProtocol},
    proto::media::{
        file::{File, FileAttribute, FileInfo, FileMode, FileSystemVolumeLabel, RegularFile},
        fs::SimpleFileSystem,
    },
};

use crate::BootResult;

/// An error that may result from performing filesystem operations
#[derive(Error, Debug)]
pub enum FsError {
    /// A file could not be opened.
    #[error("Failed to open file")]
    OpenErr(Status),

    /// A file could not be read.
    #[error("Failed to read file")]
    ReadErr(Status),

    /// A file's metadata could not be read.
    #[error("Failed to read file metadata")]
    InfoErr(Status),

    /// Failed to get a volume label on a partition.
    #[error("Could not get volume label of a partition")]
    VolumeLabelErr,
}

/// A rust-ier wrapper around [`SimpleFileSystem`].
pub struct UefiFileSystem(ScopedProtocol<SimpleFileSystem>);

impl UefiFileSystem {
    /// Create a new [`UefiFileSystem`].
    #[must_use = "Has no effect if the result is unused"]
    pub const fn new(fs: ScopedProtocol<SimpleFileSystem>) -> Self {
        Self(fs)
    }

    /// Create a new [`UefiFileSystem`] from a handle that supports [`SimpleFileSystem`].
    ///
    /// # Errors
    ///
    /// May return an `Error` if the handle does not actually support [`SimpleFileSystem`].
    pub fn from_handle(handle: Handle) -> BootResult<Self> {
        let fs = boot::open_protocol_exclusive(handle)?;
        Ok(Self(fs))
    }

    /// Create a new [`UefiFileSystem`] for the filesystem the boot menu was
    /// loaded from, where `refind.conf` lives.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the boot image's filesystem does not support
    /// [`SimpleFileSystem`] for some reason.
    pub fn from_image_fs() -> BootResult<Self> {
        let fs = boot::get_image_file_system(boot::image_handle())?;
        Ok(Self(fs))
    }

    /// Gets the volume label from a [`SimpleFileSystem`]
    ///
    /// # Errors
    ///
    /// May return an `Error` if the volume could not be opened, or the volume does not support [`FileSystemVolumeLabel`]
    pub fn get_volume_label(&mut self) -> Result<CString16, FsError> {
        let mut root = self
            .0
            .open_volume()
            .map_err(|x| FsError::OpenErr(x.status()))?;
        let info = root
            .get_boxed_info::<FileSystemVolumeLabel>()
            .map_err(|_| FsError::VolumeLabelErr)?;
        Ok(info.volume_label().to_owned())
    }

    /// Checks if a file exists on the volume.
    ///
    /// A volume that cannot be opened counts as the file not existing,
    /// since its presence cannot be verified either way.
    pub fn exists(&mut self, path: &CStr16) -> bool {
        let Ok(mut root) = self.0.open_volume() else {
            return false;
        };

        root.open(path, FileMode::Read, FileAttribute::empty())
            .is_ok()
    }

    /// Reads at most `max` bytes of a file into a [`Vec<u8>`].
    ///
    /// A file longer than `max` is silently truncated, not rejected.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the volume couldn't be opened, the path does
    /// not point to a valid file, its metadata is unavailable, or the file
    /// could not be read.
    pub fn read_capped(&mut self, path: &CStr16, max: usize) -> Result<Vec<u8>, FsError> {
        let mut file = self.get_regular_file(path)?;

        let info = file
            .get_boxed_info::<FileInfo>()
            .map_err(|e| FsError::InfoErr(e.status()))?;

        let size = usize::try_from(info.file_size())
            .unwrap_or(usize::MAX)
            .min(max);

        let mut buf = vec![0; size];
        file.read(&mut buf)
            .map_err(|e| FsError::ReadErr(e.status()))?;

        Ok(buf)
    }

    /// Gets a handle to a [`RegularFile`] in the filesystem.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the volume couldn't be opened, or the path does not point to a file.
    fn get_regular_file(&mut self, path: &CStr16) -> Result<RegularFile, FsError> {
        let mut root = self
            .0
            .open_volume()
            .map_err(|e| FsError::OpenErr(e.status()))?;
        root.open(path, FileMode::Read, FileAttribute::empty())
            .map_err(|e| FsError::OpenErr(e.status()))?
            .into_regular_file()
            .ok_or(FsError::OpenErr(Status::INVALID_PARAMETER))
    }
}
