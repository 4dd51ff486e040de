// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! MBR partition activation.
//!
//! BIOS boot code decides what to boot by the active flag, so before a
//! legacy OS gets control exactly one partition has to be marked active.
//! For a primary partition that is a single rewrite of LBA 0. For a
//! logical partition the extended chain gets walked sector by sector, and
//! every chain link on the way to the target is marked active too, which
//! is the convention generic boot sectors expect for "follow me".
//!
//! Every check here runs before the first write of the affected sector, so
//! a disk that does not look like a DOS layout is left exactly as it was.

use bytemuck::{Pod, Zeroable};
use thiserror::Error;
use uefi::Status;

use crate::legacy::bootcode::{SYSLINUX_MBR, SYSLINUX_MBR_SIZE};

/// Bytes per sector. MBR layouts predate anything larger.
pub const SECTOR_SIZE: usize = 512;

/// Length of the boot-code area checked (and possibly replaced) in LBA 0.
pub const MBR_BOOTCODE_SIZE: usize = 440;

/// Byte offset of the partition table within a sector.
const TABLE_OFFSET: usize = 446;

/// Byte offset of the boot signature within a sector.
const SIGNATURE_OFFSET: usize = 510;

/// The boot signature value.
const MBR_SIGNATURE: u16 = 0xAA55;

/// Flag byte of a BIOS-bootable partition.
const FLAG_ACTIVE: u8 = 0x80;

/// Flag byte of an inactive partition.
const FLAG_INACTIVE: u8 = 0x00;

/// Partition types that head an extended partition chain.
const EXTENDED_TYPES: [u8; 3] = [0x05, 0x0F, 0x85];

/// A block-addressed device that reads and writes whole sectors.
///
/// The firmware Block I/O protocol provides this in a real boot; tests use
/// an in-memory disk.
pub trait BlockDevice {
    /// Reads the sector at `lba` into `buf`.
    ///
    /// # Errors
    ///
    /// Returns the device status when the read fails.
    fn read_blocks(&mut self, lba: u64, buf: &mut [u8; SECTOR_SIZE]) -> Result<(), Status>;

    /// Writes `buf` to the sector at `lba`.
    ///
    /// # Errors
    ///
    /// Returns the device status when the write fails.
    fn write_blocks(&mut self, lba: u64, buf: &[u8; SECTOR_SIZE]) -> Result<(), Status>;
}

/// An `Error` that may result from rewriting partition tables.
#[derive(Error, Debug)]
pub enum MbrError {
    /// A sector that should head a partition table had no boot signature.
    #[error("Sector {0} is missing the boot signature")]
    MissingSignature(u64),

    /// A partition entry carried a flag byte other than 0x00 or 0x80.
    #[error("Partition entry {index} in sector {sector} has unexpected flag byte {flags:#04x}")]
    UnexpectedFlags {
        /// The sector holding the suspect table.
        sector: u64,

        /// The entry's index within the table.
        index: usize,

        /// The flag byte found.
        flags: u8,
    },

    /// A sector could not be read.
    #[error("Failed to read sector {0}")]
    ReadErr(u64, Status),

    /// A sector could not be written.
    #[error("Failed to write sector {0}")]
    WriteErr(u64, Status),
}

/// One 16-byte entry of an MBR or EMBR partition table.
///
/// Multi-byte fields are little-endian on disk.
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C, packed)]
struct MbrPartitionEntry {
    /// 0x80 for the active partition, 0x00 otherwise.
    flags: u8,

    /// CHS address of the first sector; ignored here.
    start_chs: [u8; 3],

    /// The partition type byte.
    part_type: u8,

    /// CHS address of the last sector; ignored here.
    end_chs: [u8; 3],

    /// First LBA of the partition, relative to the table's base.
    start_lba: u32,

    /// Partition length in sectors.
    size: u32,
}

/// Whether a partition type byte heads an extended chain.
fn is_extended_type(part_type: u8) -> bool {
    EXTENDED_TYPES.contains(&part_type)
}

/// Fails unless `sector` ends in the boot signature.
fn check_signature(sector: &[u8; SECTOR_SIZE], lba: u64) -> Result<(), MbrError> {
    let signature = u16::from_le_bytes([sector[SIGNATURE_OFFSET], sector[SIGNATURE_OFFSET + 1]]);
    if signature == MBR_SIGNATURE {
        Ok(())
    } else {
        Err(MbrError::MissingSignature(lba))
    }
}

/// The four partition entries of a sector, mutably.
fn table_mut(sector: &mut [u8; SECTOR_SIZE]) -> &mut [MbrPartitionEntry] {
    bytemuck::cast_slice_mut(&mut sector[TABLE_OFFSET..SIGNATURE_OFFSET])
}

/// Marks partition `partition_index` of `disk` active, and every other
/// partition inactive.
///
/// Indices 0 through 3 address the primary table in LBA 0; 4 and up count
/// logical partitions along the extended chain, which is walked and
/// rewritten link by link. A blank boot-code area gets the syslinux
/// template dropped in on the way.
///
/// # Errors
///
/// May return an `Error` if a sector cannot be read or written, a sector
/// is missing its boot signature, or a partition entry carries a flag byte
/// that is neither active nor inactive. The flag and signature checks run
/// before the affected sector is written, so a layout this code does not
/// understand is never modified.
pub fn activate_mbr_partition(
    disk: &mut impl BlockDevice,
    partition_index: usize,
) -> Result<(), MbrError> {
    let mut sector = [0u8; SECTOR_SIZE];
    disk.read_blocks(0, &mut sector)
        .map_err(|status| MbrError::ReadErr(0, status))?;
    check_signature(&sector, 0)?;

    // add boot code if necessary
    if sector[..MBR_BOOTCODE_SIZE].iter().all(|&byte| byte == 0) {
        sector[..SYSLINUX_MBR_SIZE].copy_from_slice(&SYSLINUX_MBR);
    }

    // set the partition active in the primary table
    let mut ext_base = 0u64;
    for (i, entry) in table_mut(&mut sector).iter_mut().enumerate() {
        if entry.flags != FLAG_INACTIVE && entry.flags != FLAG_ACTIVE {
            return Err(MbrError::UnexpectedFlags {
                sector: 0,
                index: i,
                flags: entry.flags,
            });
        }
        if i == partition_index {
            entry.flags = FLAG_ACTIVE;
        } else if partition_index >= 4 && is_extended_type(entry.part_type) {
            entry.flags = FLAG_ACTIVE;
            ext_base = u64::from(u32::from_le(entry.start_lba));
        } else {
            entry.flags = FLAG_INACTIVE;
        }
    }

    disk.write_blocks(0, &sector)
        .map_err(|status| MbrError::WriteErr(0, status))?;

    if partition_index < 4 {
        return Ok(());
    }

    // the target is a logical partition, so walk the EMBR chain
    let mut logical_index = 4;
    let mut current = ext_base;
    while current != 0 {
        disk.read_blocks(current, &mut sector)
            .map_err(|status| MbrError::ReadErr(current, status))?;
        check_signature(&sector, current)?;

        let mut next = 0u64;
        for (i, entry) in table_mut(&mut sector).iter_mut().enumerate() {
            if entry.flags != FLAG_INACTIVE && entry.flags != FLAG_ACTIVE {
                return Err(MbrError::UnexpectedFlags {
                    sector: current,
                    index: i,
                    flags: entry.flags,
                });
            }
            if u32::from_le(entry.start_lba) == 0 || u32::from_le(entry.size) == 0 {
                break;
            }
            if is_extended_type(entry.part_type) {
                // the link to the next EMBR; active iff the target lies deeper
                next = ext_base + u64::from(u32::from_le(entry.start_lba));
                entry.flags = if partition_index >= logical_index {
                    FLAG_ACTIVE
                } else {
                    FLAG_INACTIVE
                };
                break;
            }
            // a logical data partition
            entry.flags = if partition_index == logical_index {
                FLAG_ACTIVE
            } else {
                FLAG_INACTIVE
            };
            logical_index += 1;
        }

        disk.write_blocks(current, &sector)
            .map_err(|status| MbrError::WriteErr(current, status))?;

        if partition_index < logical_index {
            break; // the target is marked, further EMBRs stay untouched
        }
        current = next;
    }

    Ok(())
}
