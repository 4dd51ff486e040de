//! Various helper functions for other modules.

use core::mem::MaybeUninit;

use smallvec::SmallVec;
use thiserror::Error;
use uefi::{
    CStr16, CString16,
    boot::{self, ScopedProtocol},
    proto::{
        ProtocolPointer,
        device_path::{DevicePath, PoolDevicePath, build},
    },
};

use crate::BootResult;

/// The max length of a path in UEFI.
const MAX_PATH: usize = 256;

/// An `Error` that may result from converting a [`str`] to another format.
#[derive(Error, Debug)]
pub enum StrError {
    /// A [`str`] could not be converted into a [`CString16`]
    #[error("Could not convert String to CString16")]
    CstrFromStr(#[from] uefi::data_types::FromStrError),

    /// A u16 slice could not be converted into a [`CString16`], due to an
    /// interior nul or an invalid character.
    #[error("Could not convert a u16 slice to a CString16")]
    FromSliceWithNul(#[from] uefi::data_types::FromSliceWithNulError),
}

/// An `Error` that may result from building a [`DevicePath`]
#[derive(Error, Debug)]
pub enum DevicePathError {
    /// A Device Path could not be built. This can happen if the buffer was too small.
    #[error("Could not build DevicePath")]
    Build(#[from] uefi::proto::device_path::build::BuildError),

    /// The Device Path could not be appended to an existing one for some reason.
    #[error("Could not append DevicePath to another DevicePath")]
    DevPathUtil(#[from] uefi::proto::device_path::DevicePathUtilitiesError),
}

/// Opens the first handle supporting protocol `P` exclusively.
///
/// # Errors
///
/// May return an `Error` if no handle supports `P`, or the protocol could
/// not be opened exclusively.
pub fn locate_protocol<P: ProtocolPointer + ?Sized>() -> BootResult<ScopedProtocol<P>> {
    let handle = boot::get_handle_for_protocol::<P>()?;
    Ok(boot::open_protocol_exclusive::<P>(handle)?)
}

/// Gets a [`CString16`] from an [`&str`].
///
/// # Errors
///
/// May return an `Error` if the string could not be converted into a [`CString16`], either due to unsupported
/// characters or an invalid nul character.
pub fn str_to_cstr(str: &str) -> Result<CString16, StrError> {
    Ok(CString16::try_from(str)?)
}

/// Gets a [`CString16`] path given a prefix and a filename.
///
/// # Errors
///
/// May return an `Error` if the finalized string could not be converted into a [`CString16`]. This should be
/// impossible because of the fact that validation is already done through the parameters being [`CStr16`].
pub fn get_path_cstr(prefix: &CStr16, filename: &CStr16) -> Result<CString16, StrError> {
    let mut path_buf: SmallVec<[_; MAX_PATH]> =
        SmallVec::with_capacity(prefix.as_slice().len() + 1 + filename.as_slice().len());

    path_buf.extend_from_slice(prefix.to_u16_slice());
    path_buf.push(u16::from(b'\\'));
    path_buf.extend_from_slice(filename.to_u16_slice_with_nul());

    Ok(CStr16::from_u16_with_nul(&path_buf)?.into())
}

/// Gets the joined [`DevicePath`] given an existing [`DevicePath`] (likely to a partition) and a file's path.
///
/// The provided mutable buffer must be large enough to fit the file node of the final [`DevicePath`].
///
/// # Errors
///
/// May return an `Error` if the device path is finalized before the file's [`DevicePath`] could be pushed.
/// Though, this should be quite unlikely.
pub fn join_to_device_path(
    dev_path: &DevicePath,
    path: &CStr16,
    buf: &mut [u8],
) -> Result<PoolDevicePath, DevicePathError> {
    let buf = slice_to_maybe_uninit(buf);
    let path: &DevicePath = build::DevicePathBuilder::with_buf(buf)
        .push(&build::media::FilePath { path_name: path })?
        .finalize()?;
    Ok(dev_path.append_path(path)?)
}

/// Converts a byte slice into an `&mut [MaybeUninit<u8>]`.
fn slice_to_maybe_uninit(slice: &mut [u8]) -> &mut [MaybeUninit<u8>] {
    // SAFETY: this is essentially equivalent to reconstructing an &mut [MaybeUninit<u8>] from a mutable slice.
    // because slices are always valid as pointers, and the length of the two slices are the same, this is safe.
    unsafe {
        core::slice::from_raw_parts_mut(slice.as_mut_ptr().cast::<MaybeUninit<u8>>(), slice.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{borrow::ToOwned, string::String};
    use uefi::cstr16;

    #[test]
    fn test_str_to_cstr() -> Result<(), StrError> {
        let cstr = str_to_cstr("refind.conf")?;
        let str = String::from(&cstr);
        assert_eq!(str, "refind.conf".to_owned());
        Ok(())
    }

    #[test]
    fn test_get_path_cstr() -> Result<(), StrError> {
        const PREFIX: &CStr16 = cstr16!("\\EFI\\refind");
        const FILE: &CStr16 = cstr16!("refind.conf");
        let path = get_path_cstr(PREFIX, FILE)?;
        let str = String::from(&path);
        assert_eq!(str, "\\EFI\\refind\\refind.conf".to_owned());
        Ok(())
    }
}
