//! The embedded fallback boot sector.
//!
//! Disks partitioned by some tools carry a valid partition table but a
//! blank boot-code area, which leaves the BIOS nothing to jump into. When
//! the activator finds the whole area zeroed it drops in this copy of the
//! syslinux master boot record, which simply chains to whichever partition
//! is marked active.

/// The length of the embedded template in bytes.
pub const SYSLINUX_MBR_SIZE: usize = 440;

/// The syslinux master boot record boot code.
pub static SYSLINUX_MBR: [u8; SYSLINUX_MBR_SIZE] = [
    0x33, 0xC0, 0xFA, 0x8E, 0xD8, 0x8E, 0xD0, 0xBC, 0x00, 0x7C, 0x89, 0xE6,
    0x06, 0x57, 0x8E, 0xC0, 0xFB, 0xFC, 0xBF, 0x00, 0x06, 0xB9, 0x00, 0x01,
    0xF3, 0xA5, 0xEA, 0x1F, 0x06, 0x00, 0x00, 0x52, 0x52, 0xB4, 0x41, 0xBB,
    0xAA, 0x55, 0x31, 0xC9, 0x30, 0xF6, 0xF9, 0xCD, 0x13, 0x72, 0x13, 0x81,
    0xFB, 0x55, 0xAA, 0x75, 0x0D, 0xD1, 0xE9, 0x73, 0x09, 0x66, 0xC7, 0x06,
    0x8D, 0x06, 0xB4, 0x42, 0xEB, 0x15, 0x5A, 0xB4, 0x08, 0xCD, 0x13, 0x83,
    0xE1, 0x3F, 0x51, 0x0F, 0xB6, 0xC6, 0x40, 0xF7, 0xE1, 0x52, 0x50, 0x66,
    0x31, 0xC0, 0x66, 0x99, 0xE8, 0x66, 0x00, 0xBE, 0x85, 0x07, 0xE8, 0x79,
    0x00, 0xE8, 0x61, 0x00, 0xB4, 0x41, 0xBB, 0xAA, 0x55, 0x31, 0xC9, 0x30,
    0xF6, 0xF9, 0xCD, 0x13, 0x72, 0x16, 0x81, 0xFB, 0x55, 0xAA, 0x75, 0x10,
    0xD1, 0xE9, 0x73, 0x0C, 0x66, 0xC7, 0x06, 0x65, 0x06, 0xB4, 0x42, 0x66,
    0xE8, 0x2C, 0x00, 0xBB, 0x00, 0x7C, 0xE9, 0x66, 0x0F, 0xB7, 0xCE, 0x66,
    0xF7, 0xE1, 0x66, 0xA9, 0x20, 0x00, 0x75, 0x72, 0x66, 0xA9, 0x60, 0x00,
    0x75, 0x06, 0x66, 0x83, 0xE0, 0x3F, 0x66, 0x50, 0xBB, 0x00, 0x7C, 0x66,
    0x58, 0x66, 0x52, 0x06, 0x53, 0x6A, 0x01, 0x6A, 0x10, 0x89, 0x8E, 0x4C,
    0x00, 0xEB, 0x08, 0xCD, 0x13, 0x0D, 0x0A, 0x42, 0x6F, 0x6F, 0x74, 0x20,
    0x65, 0x72, 0x72, 0x6F, 0x72, 0x0D, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,];
