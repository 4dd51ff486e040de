// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Legacy (BIOS/CSM) boot support.
//!
//! The scanners look over the enumerated volumes for anything BIOS
//! bootable and turn the survivors into menu entries. Most of the care
//! here goes into not surfacing the same disk twice: a raw whole-disk MBR
//! entry is dropped whenever partition-level entries exist for the same
//! disk.
//!
//! The actual handoff to the firmware's compatibility module is a frontend
//! concern; the core contributes [`prepare_legacy_boot`], which makes the
//! target partition active first, and [`boot_failure_guidance`] for
//! explaining a refused handoff to the user.

use alloc::{format, string::String, vec};

use crate::{
    legacy::mbr::{BlockDevice, MbrError},
    menu::{IconLoader, Image, MainMenu, MenuScreen, SubEntry, SubEntryKind},
    volume::{DiskKind, Volume},
};

pub mod bootcode;
pub mod mbr;

/// An auto-discovered legacy boot option.
#[derive(Clone, Debug)]
pub struct LegacyEntry {
    /// The row label shown on the main menu.
    pub menu_title: String,

    /// Index of the backing volume in the scanned volume list.
    pub volume_index: usize,

    /// Medium keyword handed to the legacy loader.
    pub load_options: &'static str,

    /// Keyboard shortcut derived from the OS name.
    pub shortcut_letter: Option<char>,

    /// Icon resolved for the detected OS.
    pub image: Option<Image>,

    /// The owning volume's badge.
    pub badge_image: Option<Image>,

    /// Whether the entry may be booted.
    pub enabled: bool,
}

/// Builds the menu entry and sub-screen for one elected volume.
fn add_legacy_entry(
    volumes: &[Volume],
    volume_index: usize,
    menu: &mut MainMenu,
    icons: &mut impl IconLoader,
) {
    let volume = &volumes[volume_index];

    let (loader_title, shortcut_letter) = match &volume.os_name {
        Some(name) => (
            name.as_str(),
            name.chars().next().filter(|&c| c == 'W' || c == 'L'),
        ),
        None => ("Legacy OS", None),
    };
    let vol_desc = volume.display_name();

    let load_options = match volume.disk_kind {
        DiskKind::Optical => "CD",
        DiskKind::External => "USB",
        _ => "HD",
    };

    let image = icons.os_icon(volume);
    let entry = LegacyEntry {
        menu_title: format!("Boot {loader_title} from {vol_desc}"),
        volume_index,
        load_options,
        shortcut_letter,
        image: image.clone(),
        badge_image: volume.badge_image.clone(),
        enabled: true,
    };

    let sub_screen = MenuScreen {
        title: format!("Boot Options for {loader_title} on {vol_desc}"),
        title_image: image,
        entries: vec![
            SubEntry {
                title: format!("Boot {loader_title}"),
                load_options: Some(String::from(load_options)),
                kind: SubEntryKind::Boot,
            },
            SubEntry::return_to_main(),
        ],
    };

    menu.add_legacy_entry(entry, sub_screen);
}

/// Decides whether one volume deserves a legacy entry, and adds it.
///
/// Apple legacy volumes always qualify, as does anything with BIOS boot
/// code. Either way, a candidate that stands for the whole disk steps
/// aside when any other bootable volume shares its disk.
fn scan_legacy_volume(
    volumes: &[Volume],
    volume_index: usize,
    menu: &mut MainMenu,
    icons: &mut impl IconLoader,
) {
    let volume = &volumes[volume_index];

    let mut show_volume = false;
    let mut hide_if_others_found = false;
    if volume.is_apple_legacy {
        show_volume = true;
        hide_if_others_found = true;
    } else if volume.has_boot_code {
        show_volume = true;
        if volume.block_io == volume.whole_disk_block_io
            && volume.block_io_offset == 0
            && volume.os_name.is_none()
        {
            // a whole disk (MBR) entry; hide if we have entries for partitions
            hide_if_others_found = true;
        }
    }

    if hide_if_others_found {
        for (other_index, other) in volumes.iter().enumerate() {
            if other_index != volume_index
                && other.has_boot_code
                && other.whole_disk_block_io == volume.whole_disk_block_io
            {
                show_volume = false;
            }
        }
    }

    if show_volume {
        add_legacy_entry(volumes, volume_index, menu, icons);
    }
}

/// Scans attached optical discs for legacy boot code and adds anything
/// found to the menu.
pub fn scan_legacy_optical(volumes: &[Volume], menu: &mut MainMenu, icons: &mut impl IconLoader) {
    scan_legacy_kind(volumes, DiskKind::Optical, menu, icons);
}

/// Scans internal hard disks for legacy boot code and adds anything found
/// to the menu.
pub fn scan_legacy_internal(volumes: &[Volume], menu: &mut MainMenu, icons: &mut impl IconLoader) {
    scan_legacy_kind(volumes, DiskKind::Internal, menu, icons);
}

/// Scans external disks for legacy boot code and adds anything found to
/// the menu.
pub fn scan_legacy_external(volumes: &[Volume], menu: &mut MainMenu, icons: &mut impl IconLoader) {
    scan_legacy_kind(volumes, DiskKind::External, menu, icons);
}

/// Runs the legacy election over every volume of one disk kind.
fn scan_legacy_kind(
    volumes: &[Volume],
    kind: DiskKind,
    menu: &mut MainMenu,
    icons: &mut impl IconLoader,
) {
    for (volume_index, volume) in volumes.iter().enumerate() {
        if volume.disk_kind == kind {
            scan_legacy_volume(volumes, volume_index, menu, icons);
        }
    }
}

/// Makes a volume's disk BIOS-bootable before the handoff.
///
/// Volumes that are MBR partitions get their partition marked active;
/// anything else needs no preparation.
///
/// # Errors
///
/// May return an `Error` if the MBR rewrite fails; see
/// [`mbr::activate_mbr_partition`].
pub fn prepare_legacy_boot(volume: &Volume, disk: &mut impl BlockDevice) -> Result<(), MbrError> {
    if volume.is_mbr_partition {
        mbr::activate_mbr_partition(disk, volume.mbr_partition_index)?;
    }
    Ok(())
}

/// Explains a `NOT_FOUND` legacy handoff to the user.
///
/// `error_in_step` reports where the loader list failed: step 1 means no
/// legacy loader image could be loaded at all, step 3 means the firmware
/// refused to start the one that was.
#[must_use = "Has no effect if the result is unused"]
pub const fn boot_failure_guidance(error_in_step: usize) -> Option<&'static str> {
    match error_in_step {
        1 => Some("Please make sure that you have the latest firmware update installed."),
        3 => Some(
            "The firmware refused to boot from the selected volume. Note that external \
             hard drives are not well-supported by Apple's firmware for legacy OS booting.",
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MainMenuEntry;
    use alloc::{borrow::ToOwned, vec::Vec};
    use uefi::Handle;

    /// An icon loader with no icons to give.
    struct NoIcons;

    impl IconLoader for NoIcons {
        fn load_icon(&mut self, _volume: &Volume, _path: &str, _size: u32) -> Option<Image> {
            None
        }

        fn os_icon(&mut self, _volume: &Volume) -> Option<Image> {
            None
        }
    }

    /// A distinct handle per id, for identity comparisons only.
    fn handle(id: usize) -> Option<Handle> {
        // SAFETY: the handle is only ever compared for identity in these
        // tests, never handed to firmware calls.
        unsafe { Handle::from_ptr((id * 8) as *mut core::ffi::c_void) }
    }

    /// A bootable MBR partition volume on disk `disk_id`.
    fn partition_volume(disk_id: usize, part_id: usize, os_name: Option<&str>) -> Volume {
        Volume {
            disk_kind: DiskKind::Internal,
            has_boot_code: true,
            is_mbr_partition: true,
            os_name: os_name.map(ToOwned::to_owned),
            block_io: handle(disk_id * 100 + part_id),
            whole_disk_block_io: handle(disk_id),
            block_io_offset: 2048,
            mbr_partition_index: part_id,
            ..Volume::default()
        }
    }

    /// The whole-disk volume for disk `disk_id`.
    fn whole_disk_volume(disk_id: usize) -> Volume {
        Volume {
            disk_kind: DiskKind::Internal,
            has_boot_code: true,
            block_io: handle(disk_id),
            whole_disk_block_io: handle(disk_id),
            block_io_offset: 0,
            ..Volume::default()
        }
    }

    #[test]
    fn test_whole_disk_entry_suppressed_by_partition() {
        let volumes = [
            whole_disk_volume(1),
            partition_volume(1, 0, Some("Windows")),
        ];
        let mut menu = MainMenu::new();
        scan_legacy_internal(&volumes, &mut menu, &mut NoIcons);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.entries()[0].title(), "Boot Windows from HD");
    }

    #[test]
    fn test_whole_disk_entry_survives_alone() {
        let volumes = [whole_disk_volume(1)];
        let mut menu = MainMenu::new();
        scan_legacy_internal(&volumes, &mut menu, &mut NoIcons);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.entries()[0].title(), "Boot Legacy OS from HD");
    }

    #[test]
    fn test_partitions_on_different_disks_all_show() {
        let volumes = [
            partition_volume(1, 0, Some("Windows")),
            partition_volume(2, 0, Some("Linux")),
        ];
        let mut menu = MainMenu::new();
        scan_legacy_internal(&volumes, &mut menu, &mut NoIcons);
        assert_eq!(menu.len(), 2);
    }

    #[test]
    fn test_disk_kind_filters() {
        let mut optical = partition_volume(1, 0, None);
        optical.disk_kind = DiskKind::Optical;
        let internal = partition_volume(2, 0, None);
        let volumes = [optical, internal];

        let mut menu = MainMenu::new();
        scan_legacy_optical(&volumes, &mut menu, &mut NoIcons);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.entries()[0].title(), "Boot Legacy OS from CD");

        let mut menu = MainMenu::new();
        scan_legacy_external(&volumes, &mut menu, &mut NoIcons);
        assert!(menu.is_empty());
    }

    #[test]
    fn test_shortcut_letters_for_known_os_names() {
        let volumes = [
            partition_volume(1, 0, Some("Windows")),
            partition_volume(2, 0, Some("Linux")),
            partition_volume(3, 0, Some("FreeBSD")),
        ];
        let mut menu = MainMenu::new();
        scan_legacy_internal(&volumes, &mut menu, &mut NoIcons);
        let shortcuts: Vec<_> = menu
            .entries()
            .iter()
            .map(MainMenuEntry::shortcut_letter)
            .collect();
        assert_eq!(shortcuts, [Some('W'), Some('L'), None]);
    }

    #[test]
    fn test_load_options_keyword_by_disk_kind() {
        let mut cd = partition_volume(1, 0, None);
        cd.disk_kind = DiskKind::Optical;
        let mut usb = partition_volume(2, 0, None);
        usb.disk_kind = DiskKind::External;
        let hd = partition_volume(3, 0, None);
        let volumes = [cd, usb, hd];

        let mut menu = MainMenu::new();
        scan_legacy_optical(&volumes, &mut menu, &mut NoIcons);
        scan_legacy_external(&volumes, &mut menu, &mut NoIcons);
        scan_legacy_internal(&volumes, &mut menu, &mut NoIcons);

        let keywords: Vec<_> = menu
            .entries()
            .iter()
            .map(|entry| match entry {
                MainMenuEntry::Legacy { entry, .. } => entry.load_options,
                MainMenuEntry::Loader { .. } => unreachable!("no loader entries were added"),
            })
            .collect();
        assert_eq!(keywords, ["CD", "USB", "HD"]);
    }

    #[test]
    fn test_sub_screen_has_boot_and_return() {
        let volumes = [partition_volume(1, 0, Some("Windows"))];
        let mut menu = MainMenu::new();
        scan_legacy_internal(&volumes, &mut menu, &mut NoIcons);
        let MainMenuEntry::Legacy { sub_screen, .. } = &menu.entries()[0] else {
            panic!("expected a legacy entry");
        };
        assert_eq!(sub_screen.title, "Boot Options for Windows on HD");
        assert_eq!(sub_screen.entries.len(), 2);
        assert_eq!(sub_screen.entries[0].title, "Boot Windows");
        assert_eq!(sub_screen.entries[0].kind, SubEntryKind::Boot);
        assert_eq!(sub_screen.entries[1].kind, SubEntryKind::Return);
    }

    #[test]
    fn test_apple_legacy_hidden_by_bootable_sibling() {
        // the suppression never re-shows a volume, so an Apple legacy
        // volume with a bootable partition sibling stays hidden
        let mut apple = partition_volume(1, 0, Some("Mac OS X"));
        apple.has_boot_code = false;
        apple.is_apple_legacy = true;
        let volumes = [apple, partition_volume(1, 1, Some("Windows"))];
        let mut menu = MainMenu::new();
        scan_legacy_internal(&volumes, &mut menu, &mut NoIcons);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.entries()[0].title(), "Boot Windows from HD");
    }

    #[test]
    fn test_prepare_legacy_boot_activates_mbr_partitions_only() {
        use crate::legacy::mbr::tests::MemDisk;

        let mut disk = MemDisk::new(8);
        disk.set_signature(0);
        disk.data[0] = 0xEB;
        disk.set_entry(0, 0, 0x00, 0x83, 2048, 1000);

        let volume = partition_volume(1, 0, None);
        prepare_legacy_boot(&volume, &mut disk).expect("activation should succeed");
        assert_eq!(disk.flags(0), [0x80, 0x00, 0x00, 0x00]);

        let mut apple = partition_volume(1, 0, None);
        apple.is_mbr_partition = false;
        disk.writes.clear();
        prepare_legacy_boot(&apple, &mut disk).expect("no preparation needed");
        assert!(disk.writes.is_empty());
    }

    #[test]
    fn test_boot_failure_guidance_steps() {
        assert!(
            boot_failure_guidance(1)
                .is_some_and(|advice| advice.contains("latest firmware update"))
        );
        assert!(boot_failure_guidance(3).is_some_and(|advice| advice.contains("refused to boot")));
        assert_eq!(boot_failure_guidance(0), None);
        assert_eq!(boot_failure_guidance(2), None);
    }
}
