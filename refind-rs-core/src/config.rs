// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The `refind.conf` configuration language.
//!
//! The file is line oriented and permissive: unknown directives are
//! silently skipped and malformed ones at worst log a warning, so an old
//! config keeps working with a newer menu. The file is read twice with the
//! same tokenizer: [`GlobalConfig::read_config`] picks up the global
//! settings, and [`scan_user_configured`] goes back over it for the
//! `menuentry` stanzas.
//!
//! Example configuration:
//!
//! ```text
//! timeout 20
//! hideui funcs, label
//! scanfor internal,optical
//!
//! menuentry Linux {
//!     loader /EFI/Linux/vmlinuz.efi
//!     initrd /EFI/Linux/initramfs.img
//!     options "root=/dev/sda2 ro quiet"
//! }
//! ```

use alloc::string::String;
use bitflags::bitflags;
use log::warn;
use uefi::{CStr16, cstr16};

use crate::{
    config::{file::ConfigFile, stanza::add_stanza_entries},
    menu::{IconLoader, LoaderHooks, MainMenu},
    system::fs::UefiFileSystem,
    volume::Volume,
};

pub mod file;
pub mod stanza;
pub mod tokenizer;

/// The configuration filename searched on the menu's own volume.
pub const CONFIG_FILE_NAME: &CStr16 = cstr16!("refind.conf");

/// The number of scan slots `scanfor` can fill.
pub const NUM_SCAN_OPTIONS: usize = 10;

bitflags! {
    /// Feature groups the `disable` directive switches off.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DisableFlags: u32 {
        /// The EFI shell row.
        const SHELL = 1 << 0;

        /// The tool rows.
        const TOOLS = 1 << 1;

        /// Single-user boot variants in sub-screens.
        const SINGLEUSER = 1 << 2;

        /// The hardware test row.
        const HWTEST = 1 << 3;
    }
}

bitflags! {
    /// Parts of the UI the `hideui` directive suppresses.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct HideUiFlags: u32 {
        /// The banner graphic.
        const BANNER = 1 << 0;

        /// The second row of function icons.
        const FUNCS = 1 << 1;

        /// The text label under the selection.
        const LABEL = 1 << 2;
    }
}

/// The process-wide settings read from `refind.conf`.
///
/// Mutated only while the config is being evaluated; the menu reads it
/// afterwards. Scalar settings are last-writer-wins in file order, the
/// flag sets accumulate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Seconds before the default selection boots on its own.
    pub timeout: u32,

    /// Features switched off by `disable` (and some `hideui` aliases).
    pub disable_flags: DisableFlags,

    /// UI elements suppressed by `hideui`.
    pub hide_ui_flags: HideUiFlags,

    /// One class letter per scan slot, space for an empty slot.
    pub scan_for: [char; NUM_SCAN_OPTIONS],

    /// Replacement banner image path.
    pub banner_file_name: Option<String>,

    /// Replacement small selection image path.
    pub selection_small_file_name: Option<String>,

    /// Replacement big selection image path.
    pub selection_big_file_name: Option<String>,

    /// Title of the entry selected when the menu comes up.
    pub default_selection: Option<String>,

    /// Whether to stay in text mode throughout.
    pub text_only: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            timeout: 20,
            disable_flags: DisableFlags::empty(),
            hide_ui_flags: HideUiFlags::empty(),
            // scan internal, external, and optical disks unless told otherwise
            scan_for: ['i', 'e', 'o', ' ', ' ', ' ', ' ', ' ', ' ', ' '],
            banner_file_name: None,
            selection_small_file_name: None,
            selection_big_file_name: None,
            default_selection: None,
            text_only: false,
        }
    }
}

impl GlobalConfig {
    /// Reads `refind.conf` from `fs`, updating `self` in place.
    ///
    /// A missing or unreadable file logs one line and leaves the current
    /// values untouched.
    pub fn read_config(&mut self, fs: &mut UefiFileSystem) {
        if !fs.exists(CONFIG_FILE_NAME) {
            warn!("Configuration file missing!");
            return;
        }

        match ConfigFile::load(fs, CONFIG_FILE_NAME) {
            Ok(mut file) => self.evaluate(&mut file),
            Err(e) => warn!("{e}"),
        }
    }

    /// Applies every directive in `file` to `self`, in file order.
    pub fn evaluate(&mut self, file: &mut ConfigFile) {
        while let Some(tokens) = file.read_token_line() {
            self.apply_directive(&tokens);
        }
    }

    /// Dispatches one token line on its first token, case-insensitively.
    fn apply_directive(&mut self, tokens: &[String]) {
        match tokens[0].to_ascii_lowercase().as_str() {
            "timeout" => set_unsigned(tokens, &mut self.timeout),
            "disable" => {
                for flag in &tokens[1..] {
                    self.apply_disable_flag(flag);
                }
            }
            "scanfor" => {
                // slot i takes its letter from token i, so the directive
                // name itself lands in slot 0
                for (i, slot) in self.scan_for.iter_mut().enumerate() {
                    *slot = tokens
                        .get(i)
                        .and_then(|token| token.chars().next())
                        .unwrap_or(' ');
                }
            }
            "hideui" => {
                for flag in &tokens[1..] {
                    self.apply_hide_ui_flag(flag);
                }
            }
            "banner" => set_string(tokens, &mut self.banner_file_name),
            "selection_small" => set_string(tokens, &mut self.selection_small_file_name),
            "selection_big" => set_string(tokens, &mut self.selection_big_file_name),
            "default_selection" => set_string(tokens, &mut self.default_selection),
            "textonly" => self.text_only = true,
            // stanza directives; ScanUserConfigured consumes these
            "menuentry" | "loader" | "icon" | "options" | "}" => (),
            _ => (),
        }
    }

    /// Accumulates one `disable` flag name.
    fn apply_disable_flag(&mut self, flag: &str) {
        match flag.to_ascii_lowercase().as_str() {
            "shell" => self.disable_flags |= DisableFlags::SHELL,
            "tools" => self.disable_flags |= DisableFlags::TOOLS,
            "singleuser" => self.disable_flags |= DisableFlags::SINGLEUSER,
            "hwtest" => self.disable_flags |= DisableFlags::HWTEST,
            "all" => self.disable_flags = DisableFlags::all(),
            _ => warn!("unknown disable flag: '{flag}'"),
        }
    }

    /// Accumulates one `hideui` flag name.
    ///
    /// `shell` and `tools` are aliases that land in the disable set, and
    /// `all` drags both of them along with the full hide-UI set.
    fn apply_hide_ui_flag(&mut self, flag: &str) {
        match flag.to_ascii_lowercase().as_str() {
            "banner" => self.hide_ui_flags |= HideUiFlags::BANNER,
            "shell" => self.disable_flags |= DisableFlags::SHELL,
            "tools" => self.disable_flags |= DisableFlags::TOOLS,
            "funcs" => self.hide_ui_flags |= HideUiFlags::FUNCS,
            "label" => self.hide_ui_flags |= HideUiFlags::LABEL,
            "all" => {
                self.hide_ui_flags = HideUiFlags::all();
                self.disable_flags |= DisableFlags::SHELL | DisableFlags::TOOLS;
            }
            _ => warn!("unknown hideui flag: '{flag}'"),
        }
    }
}

/// Handles a directive carrying exactly one unsigned decimal argument.
///
/// Any other argument count, or an argument that does not parse, leaves
/// the value alone.
fn set_unsigned(tokens: &[String], value: &mut u32) {
    if tokens.len() != 2 {
        return;
    }
    if let Ok(parsed) = tokens[1].parse() {
        *value = parsed;
    }
}

/// Handles a directive carrying exactly one string argument.
fn set_string(tokens: &[String], value: &mut Option<String>) {
    if tokens.len() != 2 {
        return;
    }
    *value = Some(tokens[1].clone());
}

/// Extracts every `menuentry` stanza from `file`, registering the enabled
/// ones on `menu`.
pub fn scan_stanzas(
    file: &mut ConfigFile,
    volume: &Volume,
    menu: &mut MainMenu,
    hooks: &mut impl LoaderHooks,
    icons: &mut impl IconLoader,
) {
    while let Some(tokens) = file.read_token_line() {
        if tokens[0].eq_ignore_ascii_case("menuentry")
            && let Some(title) = tokens.get(1)
        {
            let entry = add_stanza_entries(file, volume, title, hooks, icons);
            if entry.enabled {
                let sub_screen = hooks.generate_sub_screen(&entry, volume);
                menu.add_prepared_loader_entry(entry, sub_screen);
            }
        }
    }
}

/// Second pass over `refind.conf`: reads the user-configured `menuentry`
/// stanzas and adds their entries to the menu.
///
/// Entries resolve against `volume`, the volume the menu itself was loaded
/// from. A missing or unreadable file leaves the menu as it was.
pub fn scan_user_configured(
    fs: &mut UefiFileSystem,
    volume: &Volume,
    menu: &mut MainMenu,
    hooks: &mut impl LoaderHooks,
    icons: &mut impl IconLoader,
) {
    if !fs.exists(CONFIG_FILE_NAME) {
        return;
    }

    match ConfigFile::load(fs, CONFIG_FILE_NAME) {
        Ok(mut file) => scan_stanzas(&mut file, volume, menu, hooks, icons),
        Err(e) => warn!("{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::stanza::tests::{NoIcons, RecordingHooks};
    use alloc::borrow::ToOwned;

    /// Evaluates config text into a fresh [`GlobalConfig`].
    fn evaluate(content: &[u8]) -> GlobalConfig {
        let mut config = GlobalConfig::default();
        config.evaluate(&mut ConfigFile::from_bytes(content));
        config
    }

    #[test]
    fn test_full_config() {
        let config = evaluate(
            b"
            timeout 5
            disable singleuser, hwtest
            hideui banner
            banner /images/custom.bmp
            selection_small /images/sel_small.bmp
            selection_big /images/sel_big.bmp
            default_selection Linux
            textonly
        ",
        );
        assert_eq!(config.timeout, 5);
        assert_eq!(
            config.disable_flags,
            DisableFlags::SINGLEUSER | DisableFlags::HWTEST
        );
        assert_eq!(config.hide_ui_flags, HideUiFlags::BANNER);
        assert_eq!(
            config.banner_file_name.as_deref(),
            Some("\\images\\custom.bmp")
        );
        assert_eq!(
            config.selection_small_file_name.as_deref(),
            Some("\\images\\sel_small.bmp")
        );
        assert_eq!(
            config.selection_big_file_name.as_deref(),
            Some("\\images\\sel_big.bmp")
        );
        assert_eq!(config.default_selection.as_deref(), Some("Linux"));
        assert!(config.text_only);
    }

    #[test]
    fn test_timeout_arity() {
        // more than one argument leaves the value alone
        let config = evaluate(b"timeout 20 extra");
        assert_eq!(config.timeout, GlobalConfig::default().timeout);
        let config = evaluate(b"timeout");
        assert_eq!(config.timeout, GlobalConfig::default().timeout);
        let config = evaluate(b"timeout nope");
        assert_eq!(config.timeout, GlobalConfig::default().timeout);
        let config = evaluate(b"timeout 0");
        assert_eq!(config.timeout, 0);
    }

    #[test]
    fn test_hideui_all_drags_disable_flags() {
        let config = evaluate(b"hideui all");
        assert_eq!(config.hide_ui_flags, HideUiFlags::all());
        assert!(
            config
                .disable_flags
                .contains(DisableFlags::SHELL | DisableFlags::TOOLS)
        );
    }

    #[test]
    fn test_hideui_aliases_route_to_disable() {
        let config = evaluate(b"hideui shell tools label");
        assert_eq!(
            config.disable_flags,
            DisableFlags::SHELL | DisableFlags::TOOLS
        );
        assert_eq!(config.hide_ui_flags, HideUiFlags::LABEL);
    }

    #[test]
    fn test_disable_all_and_unknown_flags() {
        let config = evaluate(b"disable all");
        assert_eq!(config.disable_flags, DisableFlags::all());
        // unknown flags only warn
        let config = evaluate(b"disable shell nonsense");
        assert_eq!(config.disable_flags, DisableFlags::SHELL);
    }

    #[test]
    fn test_scanfor_fills_slots_from_token_zero() {
        let config = evaluate(b"scanfor internal,external");
        // the directive name occupies slot 0
        assert_eq!(config.scan_for[0], 's');
        assert_eq!(config.scan_for[1], 'i');
        assert_eq!(config.scan_for[2], 'e');
        assert!(config.scan_for[3..].iter().all(|&c| c == ' '));
    }

    #[test]
    fn test_unknown_directives_are_ignored() {
        let config = evaluate(b"frobnicate 12\nresolution 1024 768\n");
        assert_eq!(config, GlobalConfig::default());
    }

    #[test]
    fn test_stanza_directives_ignored_at_top_level() {
        let config = evaluate(b"menuentry Linux {\nloader /vmlinuz\noptions ro\n}\ntimeout 7\n");
        assert_eq!(config.timeout, 7);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let content: &[u8] = b"
            timeout 15
            disable shell
            hideui banner funcs
            scanfor internal
        ";
        let once = evaluate(content);
        let mut twice = once.clone();
        twice.evaluate(&mut ConfigFile::from_bytes(content));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        assert_eq!(evaluate(b""), GlobalConfig::default());
    }

    #[test]
    fn test_scan_stanzas_registers_enabled_only() {
        let mut menu = MainMenu::new();
        let mut hooks = RecordingHooks::default();
        let mut file = ConfigFile::from_bytes(
            &b"
            timeout 20
            menuentry Linux {
                loader /EFI/Linux/vmlinuz.efi
            }
            menuentry Broken {
                loader /EFI/broken.efi
                disabled
            }
        "[..],
        );
        let volume = Volume {
            vol_name: Some("ESP".to_owned()),
            ..Volume::default()
        };
        scan_stanzas(&mut file, &volume, &mut menu, &mut hooks, &mut NoIcons);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.entries()[0].title(), "Boot Linux from ESP");
    }

    #[test]
    fn test_menuentry_without_title_is_skipped() {
        let mut menu = MainMenu::new();
        let mut hooks = RecordingHooks::default();
        let mut file = ConfigFile::from_bytes(&b"menuentry\ntimeout 5\n"[..]);
        scan_stanzas(
            &mut file,
            &Volume::default(),
            &mut menu,
            &mut hooks,
            &mut NoIcons,
        );
        assert!(menu.is_empty());
    }
}
