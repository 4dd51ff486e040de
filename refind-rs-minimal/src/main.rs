// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Extremely minimal text frontend for the refind-rs core.
//!
//! This reads `refind.conf` from its own volume, prints the resulting menu
//! on the firmware console, and chain-loads whichever entry the user picks
//! by number or shortcut letter. No graphics, no icons, no editor; it
//! mostly exists to show what a frontend has to supply.

#![no_main]
#![no_std]

extern crate alloc;

use alloc::{boxed::Box, format, string::String, vec};
use log::{error, warn};
use refind_rs_core::{
    config::{GlobalConfig, HideUiFlags, scan_user_configured, stanza::LoaderEntry},
    legacy::{
        LegacyEntry, boot_failure_guidance,
        mbr::{BlockDevice, SECTOR_SIZE},
        prepare_legacy_boot, scan_legacy_external, scan_legacy_internal, scan_legacy_optical,
    },
    menu::{
        IconLoader, Image, LoaderHooks, MainMenu, MainMenuEntry, MenuScreen, SubEntry, SubEntryKind,
    },
    system::{
        fs::UefiFileSystem,
        helper::{join_to_device_path, locate_protocol, str_to_cstr},
        log_backend::UefiLogger,
    },
    volume::Volume,
};
use uefi::{
    CString16, Status,
    boot::{self, ScopedProtocol},
    prelude::*,
    println,
    proto::{
        BootPolicy,
        console::text::{Input, Key, Output},
        device_path::DevicePath,
        loaded_image::LoadedImage,
        media::block::BlockIO,
    },
    runtime,
    system::with_stdout,
};

/// The global logging instance.
static LOGGER: UefiLogger = UefiLogger::new();

/// An icon loader for a frontend with no way to draw icons.
struct NoIcons;

impl IconLoader for NoIcons {
    fn load_icon(&mut self, _volume: &Volume, _path: &str, _size: u32) -> Option<Image> {
        None
    }

    fn os_icon(&mut self, _volume: &Volume) -> Option<Image> {
        None
    }
}

/// Loader hooks with only the filename heuristics, no icon theme.
struct MinimalHooks;

impl LoaderHooks for MinimalHooks {
    fn set_loader_defaults(&mut self, entry: &mut LoaderEntry, path: &str, _volume: &Volume) {
        let name = path.rsplit('\\').next().unwrap_or(path).to_ascii_lowercase();
        if name.contains("vmlinuz") || name.contains("bzimage") || name.contains("linux") {
            entry.os_type = 'L';
        } else if name.contains("bootmgfw") || name.contains("bootmgr") {
            entry.os_type = 'W';
        } else if name == "boot.efi" {
            entry.os_type = 'M';
            entry.use_graphics_mode = true;
        }
    }

    fn generate_sub_screen(&mut self, entry: &LoaderEntry, _volume: &Volume) -> MenuScreen {
        MenuScreen {
            title: format!("Boot Options for {}", entry.title),
            title_image: entry.image.clone(),
            entries: vec![
                SubEntry {
                    title: format!("Boot {}", entry.title),
                    load_options: entry.load_options.clone(),
                    kind: SubEntryKind::Boot,
                },
                SubEntry::return_to_main(),
            ],
        }
    }
}

/// [`BlockDevice`] over the firmware Block I/O protocol.
struct UefiBlockDevice(ScopedProtocol<BlockIO>);

impl BlockDevice for UefiBlockDevice {
    fn read_blocks(&mut self, lba: u64, buf: &mut [u8; SECTOR_SIZE]) -> Result<(), Status> {
        let media_id = self.0.media().media_id();
        self.0
            .read_blocks(media_id, lba, buf)
            .map_err(|e| e.status())
    }

    fn write_blocks(&mut self, lba: u64, buf: &[u8; SECTOR_SIZE]) -> Result<(), Status> {
        let media_id = self.0.media().media_id();
        self.0
            .write_blocks(media_id, lba, buf)
            .map_err(|e| e.status())
    }
}

/// Describes the volume the menu itself was loaded from.
///
/// A full volume scanner is a separate concern; this frontend only knows
/// its own volume, which is where user-configured stanzas resolve.
fn self_volume(fs: &mut UefiFileSystem) -> Result<Volume, Box<dyn core::error::Error>> {
    let loaded_image = boot::open_protocol_exclusive::<LoadedImage>(boot::image_handle())?;
    Ok(Volume {
        device_handle: loaded_image.device(),
        vol_name: fs
            .get_volume_label()
            .ok()
            .map(|label| String::from(&label))
            .filter(|label| !label.is_empty()),
        ..Volume::default()
    })
}

/// Loads the EFI image behind a loader entry and attaches its options.
fn load_loader_entry(entry: &LoaderEntry) -> Result<Handle, Box<dyn core::error::Error>> {
    let device = entry.device.ok_or("loader entry has no device")?;
    let path = str_to_cstr(&entry.loader_path)?;

    let dev_path = boot::open_protocol_exclusive::<DevicePath>(device)?;
    let mut buf = [0; 2048]; // it should be rare for a devicepath to exceed 2048 bytes
    let full_path = join_to_device_path(&dev_path, &path, &mut buf)?;

    let src = boot::LoadImageSource::FromDevicePath {
        device_path: &full_path,
        boot_policy: BootPolicy::BootSelection,
    };
    let image = boot::load_image(boot::image_handle(), src)?;

    if let Some(options) = &entry.load_options {
        let mut loaded = boot::open_protocol_exclusive::<LoadedImage>(image)?;
        let options: &'static CString16 = Box::leak(Box::new(str_to_cstr(options)?));
        let size = u32::try_from(options.num_bytes()).unwrap_or(u32::MAX);
        // SAFETY: the options buffer was just leaked, so it stays valid for
        // as long as the loaded image may read it.
        unsafe {
            loaded.set_load_options(options.as_ptr().cast::<u8>(), size);
        }
    }

    Ok(image)
}

/// Prepares a legacy entry's disk and reports why the handoff stops here.
///
/// The partition activation is real; the CSM handoff itself needs
/// firmware-specific loader paths this frontend does not carry, which is
/// the same situation as failing to load any legacy loader image.
fn start_legacy_entry(volumes: &[Volume], entry: &LegacyEntry) {
    let Some(volume) = volumes.get(entry.volume_index) else {
        warn!("legacy entry points at a vanished volume");
        return;
    };

    if let Some(handle) = volume.whole_disk_block_io {
        match boot::open_protocol_exclusive::<BlockIO>(handle) {
            Ok(block_io) => {
                let mut disk = UefiBlockDevice(block_io);
                if let Err(e) = prepare_legacy_boot(volume, &mut disk) {
                    warn!("{e}");
                }
            }
            Err(e) => warn!("{e}"),
        }
    }

    if let Some(advice) = boot_failure_guidance(1) {
        println!("\n{advice}");
    }
}

/// Prints the assembled menu.
fn print_menu(config: &GlobalConfig, menu: &MainMenu) {
    if !config.hide_ui_flags.contains(HideUiFlags::BANNER) {
        println!("refind-rs {}\n", env!("CARGO_PKG_VERSION"));
    }

    for (i, entry) in menu.entries().iter().enumerate() {
        let shortcut = entry
            .shortcut_letter()
            .map(|letter| format!(" [{letter}]"))
            .unwrap_or_default();
        let marker = match (&config.default_selection, entry) {
            (Some(default), MainMenuEntry::Loader { entry, .. }) if *default == entry.title => "*",
            _ => " ",
        };
        println!("{marker}{i}: {}{shortcut}", entry.title());
    }
    println!("\nPick an entry by number or shortcut letter:");
}

/// Matches one key press against the menu, returning the chosen index.
fn match_key(key: char, menu: &MainMenu) -> Option<usize> {
    if let Some(digit) = key.to_digit(10)
        && (digit as usize) < menu.len()
    {
        return Some(digit as usize);
    }
    menu.entries()
        .iter()
        .position(|entry| entry.shortcut_letter() == Some(key.to_ascii_uppercase()))
}

/// The actual main function of the program, which returns a [`Result`].
///
/// # Errors
///
/// May return an `Error` if the config volume is unreadable, no entries
/// were configured, there is no input protocol, or an error occurred while
/// loading an image.
fn main_func() -> Result<Handle, Box<dyn core::error::Error>> {
    uefi::helpers::init().map_err(refind_rs_core::error::BootError::Uefi)?;
    with_stdout(Output::clear)?;
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(log::LevelFilter::Warn));

    let mut fs = UefiFileSystem::from_image_fs()?;
    let mut config = GlobalConfig::default();
    config.read_config(&mut fs);

    let volumes = vec![self_volume(&mut fs)?];
    let mut menu = MainMenu::new();
    let mut hooks = MinimalHooks;
    let mut icons = NoIcons;

    scan_user_configured(&mut fs, &volumes[0], &mut menu, &mut hooks, &mut icons);
    for letter in config.scan_for {
        match letter {
            'i' => scan_legacy_internal(&volumes, &mut menu, &mut icons),
            'e' => scan_legacy_external(&volumes, &mut menu, &mut icons),
            'o' => scan_legacy_optical(&volumes, &mut menu, &mut icons),
            _ => (),
        }
    }

    if menu.is_empty() {
        return Err("no boot entries configured".into());
    }

    print_menu(&config, &menu);

    let mut input = locate_protocol::<Input>()?;
    let mut events = [input
        .wait_for_key_event()
        .ok_or("Failed to get key event from input")?];
    loop {
        boot::wait_for_event(&mut events)?; // wait for a key press

        let Some(Key::Printable(key)) = input.read_key()? else {
            continue;
        };
        let Some(selected) = match_key(char::from(key), &menu) else {
            continue;
        };

        match &menu.entries()[selected] {
            MainMenuEntry::Loader { entry, .. } => return load_loader_entry(entry),
            MainMenuEntry::Legacy { entry, .. } => {
                start_legacy_entry(&volumes, entry);
                // the menu is still on screen; let the user pick again
            }
        }
    }
}

/// The main function of the program.
#[entry]
fn main() -> Status {
    match main_func() {
        Ok(image) => boot::start_image(image).status(),
        Err(e) => {
            error!("Fatal error occurred: {e}");
            error!("Automatically restarting in 10 seconds");
            boot::stall(10_000_000);
            runtime::reset(runtime::ResetType::COLD, Status::LOAD_ERROR, None)
        }
    }
}
