//! Volume descriptors handed to the scanners by the firmware volume scan.
//!
//! Enumerating volumes (walking block I/O handles, probing filesystems and
//! boot sectors) is a frontend concern. The core only consumes the result:
//! one [`Volume`] record per discovered volume, in enumeration order.

use alloc::string::String;
use uefi::Handle;

use crate::menu::Image;

/// The physical kind of disk a volume lives on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiskKind {
    /// A fixed internal disk.
    #[default]
    Internal,

    /// A removable or externally attached disk.
    External,

    /// An optical disc drive.
    Optical,

    /// A network-backed block device.
    Network,

    /// Anything the scanner could not classify.
    Unknown,
}

/// One volume surfaced by the firmware volume scan.
#[derive(Clone, Debug, Default)]
pub struct Volume {
    /// The kind of disk this volume lives on.
    pub disk_kind: DiskKind,

    /// Whether the volume's boot sector contains BIOS boot code.
    pub has_boot_code: bool,

    /// Whether this is an Apple legacy (CSM) boot volume.
    pub is_apple_legacy: bool,

    /// Whether the volume is a partition in an MBR partition table.
    pub is_mbr_partition: bool,

    /// The volume's filesystem label, if it has one.
    pub vol_name: Option<String>,

    /// The name of the operating system detected on the volume.
    pub os_name: Option<String>,

    /// The stock icon name for the detected operating system.
    pub os_icon_name: Option<String>,

    /// The badge drawn over entries from this volume.
    pub badge_image: Option<Image>,

    /// Handle to the volume's root directory filesystem.
    pub root_dir: Option<Handle>,

    /// The device handle files on this volume resolve against.
    pub device_handle: Option<Handle>,

    /// Block I/O handle for the volume itself.
    pub block_io: Option<Handle>,

    /// Block I/O handle for the whole disk the volume lives on.
    pub whole_disk_block_io: Option<Handle>,

    /// Sector offset of the volume within the whole disk.
    pub block_io_offset: u64,

    /// Index of the volume's partition in the disk's MBR table.
    ///
    /// Indices 0 through 3 are primary slots; 4 and up count logical
    /// partitions along the extended chain.
    pub mbr_partition_index: usize,
}

impl Volume {
    /// The name shown for the volume, falling back to the disk kind.
    #[must_use = "Has no effect if the result is unused"]
    pub fn display_name(&self) -> &str {
        match &self.vol_name {
            Some(name) => name,
            None if self.disk_kind == DiskKind::Optical => "CD",
            None => "HD",
        }
    }
}
