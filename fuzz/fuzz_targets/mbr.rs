#![no_main]

use libfuzzer_sys::fuzz_target;
use refind_rs_core::legacy::mbr::{BlockDevice, SECTOR_SIZE, activate_mbr_partition};
use uefi::Status;

/// A disk image over the fuzz input. Reads past the end and reads after an
/// access budget is spent both fail, which bounds crafted EMBR chains.
struct RawDisk {
    data: Vec<u8>,
    accesses_left: usize,
}

impl BlockDevice for RawDisk {
    fn read_blocks(&mut self, lba: u64, buf: &mut [u8; SECTOR_SIZE]) -> Result<(), Status> {
        self.access(lba)
            .map(|offset| buf.copy_from_slice(&self.data[offset..offset + SECTOR_SIZE]))
    }

    fn write_blocks(&mut self, lba: u64, buf: &[u8; SECTOR_SIZE]) -> Result<(), Status> {
        self.access(lba)
            .map(|offset| self.data[offset..offset + SECTOR_SIZE].copy_from_slice(buf))
    }
}

impl RawDisk {
    /// Checks the budget and bounds, returning the byte offset of `lba`.
    fn access(&mut self, lba: u64) -> Result<usize, Status> {
        if self.accesses_left == 0 {
            return Err(Status::TIMEOUT);
        }
        self.accesses_left -= 1;
        usize::try_from(lba)
            .ok()
            .and_then(|lba| lba.checked_mul(SECTOR_SIZE))
            .filter(|offset| offset + SECTOR_SIZE <= self.data.len())
            .ok_or(Status::DEVICE_ERROR)
    }
}

fuzz_target!(|data: &[u8]| {
    let partition_index = usize::from(data.first().copied().unwrap_or(0));
    let mut image = data.get(1..).unwrap_or_default().to_vec();
    image.resize(image.len().next_multiple_of(SECTOR_SIZE), 0);
    let mut disk = RawDisk {
        data: image,
        accesses_left: 64,
    };
    let _ = activate_mbr_partition(&mut disk, partition_index);
});
