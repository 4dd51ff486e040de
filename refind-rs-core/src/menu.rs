// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The menu model produced by the config and legacy scanners.
//!
//! The core assembles a [`MainMenu`] of prepared entries during startup and
//! hands it to whichever frontend is rendering the screen. Services that
//! need a renderer or an icon theme ([`IconLoader`], [`LoaderHooks`]) are
//! traits the frontend implements.

use alloc::{string::String, vec, vec::Vec};

use crate::{config::stanza::LoaderEntry, legacy::LegacyEntry, volume::Volume};

/// Decoded icon pixels in BGRA order, row major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,

    /// The pixel buffer, four bytes per pixel.
    pub pixels: Vec<u8>,
}

impl Image {
    /// A transparent placeholder used when an icon fails to load.
    #[must_use = "Has no effect if the result is unused"]
    pub fn dummy(size: u32) -> Self {
        Self {
            width: size,
            height: size,
            pixels: vec![0; (size as usize) * (size as usize) * 4],
        }
    }
}

/// Loads icons on behalf of the scanners.
///
/// A frontend without graphics can return [`None`] from everything.
pub trait IconLoader {
    /// Loads an icon file from a volume's root directory at the requested
    /// square size.
    fn load_icon(&mut self, volume: &Volume, path: &str, size: u32) -> Option<Image>;

    /// Looks up the stock icon for a volume's detected operating system.
    fn os_icon(&mut self, volume: &Volume) -> Option<Image>;
}

/// External services invoked while a loader entry is being built.
pub trait LoaderHooks {
    /// Seeds icon, OS type, and default load options from the loader's
    /// filename.
    fn set_loader_defaults(&mut self, entry: &mut LoaderEntry, path: &str, volume: &Volume);

    /// Builds the boot-options sub-screen for a finished entry.
    fn generate_sub_screen(&mut self, entry: &LoaderEntry, volume: &Volume) -> MenuScreen;
}

/// What a sub-screen row does when chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubEntryKind {
    /// Boot the parent entry with this row's options.
    Boot,

    /// Go back to the main menu.
    Return,
}

/// One row on a sub-screen.
#[derive(Clone, Debug)]
pub struct SubEntry {
    /// The row label.
    pub title: String,

    /// Load options used when this row boots the parent entry.
    pub load_options: Option<String>,

    /// What the row does.
    pub kind: SubEntryKind,
}

impl SubEntry {
    /// The standard last row of every sub-screen.
    #[must_use = "Has no effect if the result is unused"]
    pub fn return_to_main() -> Self {
        Self {
            title: String::from("Return to Main Menu"),
            load_options: None,
            kind: SubEntryKind::Return,
        }
    }
}

/// A sub-menu attached to one main menu entry.
#[derive(Clone, Debug, Default)]
pub struct MenuScreen {
    /// The sub-screen's heading.
    pub title: String,

    /// Icon shown next to the heading.
    pub title_image: Option<Image>,

    /// The selectable rows.
    pub entries: Vec<SubEntry>,
}

/// One prepared entry on the main menu.
#[derive(Clone, Debug)]
pub enum MainMenuEntry {
    /// A user-configured loader stanza with its generated sub-screen.
    Loader {
        /// The loader entry itself.
        entry: LoaderEntry,

        /// The boot-options sub-screen generated for it.
        sub_screen: MenuScreen,
    },

    /// An auto-discovered legacy (BIOS) boot volume.
    Legacy {
        /// The legacy entry itself.
        entry: LegacyEntry,

        /// Its sub-screen with the default boot row.
        sub_screen: MenuScreen,
    },
}

impl MainMenuEntry {
    /// The row label shown for this entry.
    #[must_use = "Has no effect if the result is unused"]
    pub fn title(&self) -> &str {
        match self {
            Self::Loader { entry, .. } => &entry.menu_title,
            Self::Legacy { entry, .. } => &entry.menu_title,
        }
    }

    /// The keyboard shortcut for this entry, if it has one.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn shortcut_letter(&self) -> Option<char> {
        match self {
            Self::Loader { .. } => None,
            Self::Legacy { entry, .. } => entry.shortcut_letter,
        }
    }
}

/// The top-level menu assembled during startup.
///
/// Entries are appended in discovery order and the list is read-only once
/// the menu is on screen.
#[derive(Debug, Default)]
pub struct MainMenu {
    /// The prepared entries, in discovery order.
    entries: Vec<MainMenuEntry>,
}

impl MainMenu {
    /// Creates an empty menu.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a fully prepared loader entry, taking ownership of it.
    pub fn add_prepared_loader_entry(&mut self, entry: LoaderEntry, sub_screen: MenuScreen) {
        self.entries.push(MainMenuEntry::Loader { entry, sub_screen });
    }

    /// Registers a legacy boot entry, taking ownership of it.
    pub fn add_legacy_entry(&mut self, entry: LegacyEntry, sub_screen: MenuScreen) {
        self.entries.push(MainMenuEntry::Legacy { entry, sub_screen });
    }

    /// The prepared entries, in discovery order.
    #[must_use = "Has no effect if the result is unused"]
    pub fn entries(&self) -> &[MainMenuEntry] {
        &self.entries
    }

    /// The number of prepared entries.
    #[must_use = "Has no effect if the result is unused"]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries were discovered at all.
    #[must_use = "Has no effect if the result is unused"]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
