//! `menuentry` stanza parsing.
//!
//! A stanza is one `menuentry TITLE { ... }` block. Its body directives
//! fill in a [`LoaderEntry`]; icon loading and filename-heuristic defaults
//! come from the frontend through the [`IconLoader`] and [`LoaderHooks`]
//! traits.

use alloc::{borrow::ToOwned, format, string::String};
use uefi::Handle;

use crate::{
    config::file::ConfigFile,
    menu::{IconLoader, Image, LoaderHooks},
    volume::Volume,
};

/// Loader path substituted when a stanza omits its `loader` line.
///
/// The path does not exist; it only gives the defaults hook a filename to
/// chew on so the entry still renders sensibly.
pub const FALLBACK_LOADER_PATH: &str = "\\EFI\\BOOT\\nemo.efi";

/// The icon edge size used for stanza `icon` directives.
const STANZA_ICON_SIZE: u32 = 128;

/// A boot entry declared by one `menuentry` stanza.
#[derive(Clone, Debug)]
pub struct LoaderEntry {
    /// The stanza's own title.
    pub title: String,

    /// The row label shown on the main menu.
    pub menu_title: String,

    /// Path of the EFI executable on the owning volume.
    pub loader_path: String,

    /// The device handle the loader path resolves against.
    pub device: Option<Handle>,

    /// The owning volume's label.
    pub vol_name: Option<String>,

    /// Command line passed to the loader.
    pub load_options: Option<String>,

    /// One-letter OS class, `' '` when unknown.
    pub os_type: char,

    /// Whether to leave graphics mode up for the loader.
    pub use_graphics_mode: bool,

    /// A `disabled` directive clears this; disabled entries never register.
    pub enabled: bool,

    /// The entry's icon.
    pub image: Option<Image>,

    /// The owning volume's badge.
    pub badge_image: Option<Image>,
}

impl Default for LoaderEntry {
    fn default() -> Self {
        Self {
            title: String::new(),
            menu_title: String::new(),
            loader_path: String::new(),
            device: None,
            vol_name: None,
            load_options: None,
            os_type: ' ',
            use_graphics_mode: false,
            enabled: true,
            image: None,
            badge_image: None,
        }
    }
}

/// Appends `arg` onto a space-separated options string.
fn append_option(options: &mut Option<String>, arg: &str) {
    match options {
        Some(options) => {
            options.push(' ');
            options.push_str(arg);
        }
        None => *options = Some(arg.to_owned()),
    }
}

/// Parses the body of a single `menuentry` stanza into a [`LoaderEntry`].
///
/// Reads token lines from `file` until the closing `}` (or end of file).
/// The entry starts enabled with graphics off and an unknown OS type. A
/// `loader` line records the path, reseeds defaults from the filename, and
/// discards any options accumulated so far, so explicit `options`/`initrd`
/// lines after it take over. A stanza that never names a loader gets
/// defaults seeded from [`FALLBACK_LOADER_PATH`] and stays enabled.
pub(crate) fn add_stanza_entries(
    file: &mut ConfigFile,
    volume: &Volume,
    title: &str,
    hooks: &mut impl LoaderHooks,
    icons: &mut impl IconLoader,
) -> LoaderEntry {
    let mut entry = LoaderEntry {
        title: title.to_owned(),
        menu_title: format!("Boot {} from {}", title, volume.display_name()),
        vol_name: volume.vol_name.clone(),
        badge_image: volume.badge_image.clone(),
        ..LoaderEntry::default()
    };
    let mut defaults_set = false;

    while let Some(tokens) = file.read_token_line() {
        match tokens[0].to_ascii_lowercase().as_str() {
            "}" => break,
            "loader" => {
                // set the boot loader filename
                if let Some(path) = tokens.get(1) {
                    entry.loader_path = path.clone();
                    entry.device = volume.device_handle;
                    hooks.set_loader_defaults(&mut entry, path, volume);
                    entry.load_options = None; // discard default options, if any
                    defaults_set = true;
                }
            }
            "icon" => {
                if let Some(path) = tokens.get(1) {
                    entry.image = icons
                        .load_icon(volume, path, STANZA_ICON_SIZE)
                        .or_else(|| Some(Image::dummy(STANZA_ICON_SIZE)));
                }
            }
            "initrd" => {
                if let Some(path) = tokens.get(1) {
                    append_option(&mut entry.load_options, &format!("initrd={path}"));
                }
            }
            "options" => {
                if let Some(args) = tokens.get(1) {
                    append_option(&mut entry.load_options, args);
                }
            }
            "ostype" => {
                if let Some(kind) = tokens.get(1)
                    && let Some(letter) = kind.chars().next()
                {
                    entry.os_type = letter;
                }
            }
            "graphics" => {
                if let Some(mode) = tokens.get(1) {
                    entry.use_graphics_mode = mode.eq_ignore_ascii_case("on");
                }
            }
            "disabled" => entry.enabled = false,
            _ => (),
        }
    }

    if !defaults_set {
        // user named no loader; seed defaults from a bogus one
        hooks.set_loader_defaults(&mut entry, FALLBACK_LOADER_PATH, volume);
    }

    entry
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::menu::MenuScreen;
    use alloc::vec::Vec;

    /// Hooks that record the paths handed to `set_loader_defaults` and seed
    /// canned defaults the way a frontend's filename heuristics would.
    #[derive(Default)]
    pub(crate) struct RecordingHooks {
        /// Every path `set_loader_defaults` saw, in order.
        pub(crate) defaults_paths: Vec<String>,
    }

    impl LoaderHooks for RecordingHooks {
        fn set_loader_defaults(&mut self, entry: &mut LoaderEntry, path: &str, _volume: &Volume) {
            self.defaults_paths.push(path.to_owned());
            entry.os_type = 'L';
            entry.load_options = Some("ro root=/dev/sda2".to_owned());
        }

        fn generate_sub_screen(&mut self, entry: &LoaderEntry, _volume: &Volume) -> MenuScreen {
            MenuScreen {
                title: format!("Boot Options for {}", entry.title),
                ..MenuScreen::default()
            }
        }
    }

    /// An icon loader with no icons to give.
    pub(crate) struct NoIcons;

    impl IconLoader for NoIcons {
        fn load_icon(&mut self, _volume: &Volume, _path: &str, _size: u32) -> Option<Image> {
            None
        }

        fn os_icon(&mut self, _volume: &Volume) -> Option<Image> {
            None
        }
    }

    /// Parses one stanza body from config text.
    fn parse_stanza(body: &[u8], hooks: &mut RecordingHooks) -> LoaderEntry {
        let mut file = ConfigFile::from_bytes(body);
        add_stanza_entries(&mut file, &Volume::default(), "Linux", hooks, &mut NoIcons)
    }

    #[test]
    fn test_loader_resets_default_options() {
        let mut hooks = RecordingHooks::default();
        let entry = parse_stanza(
            b"loader /EFI/Linux/vmlinuz.efi\noptions \"quiet splash\"\ninitrd /EFI/Linux/initrd.img\n}\n",
            &mut hooks,
        );
        assert_eq!(entry.loader_path, "\\EFI\\Linux\\vmlinuz.efi");
        assert_eq!(hooks.defaults_paths, ["\\EFI\\Linux\\vmlinuz.efi"]);
        // the hook's canned options were discarded; only the explicit ones stay
        assert_eq!(
            entry.load_options.as_deref(),
            Some("quiet splash initrd=\\EFI\\Linux\\initrd.img")
        );
        assert_eq!(entry.os_type, 'L');
        assert!(entry.enabled);
    }

    #[test]
    fn test_missing_loader_uses_fallback() {
        let mut hooks = RecordingHooks::default();
        let entry = parse_stanza(b"options test\n}\n", &mut hooks);
        assert_eq!(hooks.defaults_paths, [FALLBACK_LOADER_PATH]);
        assert!(entry.enabled);
        assert!(entry.loader_path.is_empty());
        // the fallback hook ran last, so its canned options stand
        assert_eq!(entry.load_options.as_deref(), Some("ro root=/dev/sda2"));
    }

    #[test]
    fn test_disabled_and_graphics_and_ostype() {
        let mut hooks = RecordingHooks::default();
        let entry = parse_stanza(
            b"loader /shellx64.efi\ngraphics on\nostype W\ndisabled\n}\n",
            &mut hooks,
        );
        assert!(!entry.enabled);
        assert!(entry.use_graphics_mode);
        assert_eq!(entry.os_type, 'W');
        let entry = parse_stanza(b"loader /shellx64.efi\ngraphics off\n}\n", &mut hooks);
        assert!(!entry.use_graphics_mode);
    }

    #[test]
    fn test_icon_failure_substitutes_dummy() {
        let mut hooks = RecordingHooks::default();
        let entry = parse_stanza(b"icon /icons/os_linux.icns\n}\n", &mut hooks);
        let image = entry.image.expect("a dummy icon should be substituted");
        assert_eq!(image.width, 128);
        assert!(image.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_stanza_ends_at_eof_without_brace() {
        let mut hooks = RecordingHooks::default();
        let entry = parse_stanza(b"loader /EFI/BOOT/grubx64.efi\n", &mut hooks);
        assert_eq!(entry.loader_path, "\\EFI\\BOOT\\grubx64.efi");
    }

    #[test]
    fn test_menu_title_names_volume() {
        let mut hooks = RecordingHooks::default();
        let mut file = ConfigFile::from_bytes(&b"}\n"[..]);
        let volume = Volume {
            vol_name: Some("ESP".to_owned()),
            ..Volume::default()
        };
        let entry = add_stanza_entries(&mut file, &volume, "Arch", &mut hooks, &mut NoIcons);
        assert_eq!(entry.menu_title, "Boot Arch from ESP");
        assert_eq!(entry.vol_name.as_deref(), Some("ESP"));
    }
}
