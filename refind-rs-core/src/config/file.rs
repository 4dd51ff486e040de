// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Config file loading, encoding detection, and line reading.
//!
//! Config files arrive in whatever encoding the user's editor saved:
//! plain Latin-1, UTF-8 (with or without BOM), or UTF-16LE as written by
//! Windows tools. [`ConfigFile`] sniffs the encoding once at load time and
//! then hands out decoded lines, so everything downstream only ever sees
//! [`String`]s.

use alloc::{string::String, vec::Vec};
use uefi::CStr16;

use crate::{BootResult, config::tokenizer::tokenize, system::fs::UefiFileSystem};

/// The largest config file read into memory; longer files are truncated.
pub const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;

/// Text encodings recognized in config files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// One byte per code point, mapped 1:1.
    Latin1,

    /// UTF-8, decoded lossily.
    Utf8,

    /// UTF-16 little endian code units.
    Utf16Le,
}

/// An in-memory config file with a read cursor.
///
/// The encoding is fixed when the buffer is loaded and never changes; the
/// cursor always stays within the buffer.
#[derive(Debug)]
pub struct ConfigFile {
    /// The raw file contents, truncated at [`MAX_CONFIG_FILE_SIZE`].
    buffer: Vec<u8>,

    /// Byte offset of the next unread content.
    cursor: usize,

    /// The encoding detected at load time.
    encoding: Encoding,
}

impl ConfigFile {
    /// Loads a config file from a volume.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the file could not be opened, its metadata
    /// was unavailable, or the read failed. An over-long file is truncated,
    /// which is not an error.
    pub fn load(fs: &mut UefiFileSystem, path: &CStr16) -> BootResult<Self> {
        let buffer = fs.read_capped(path, MAX_CONFIG_FILE_SIZE)?;
        Ok(Self::from_bytes(buffer))
    }

    /// Wraps an already-read buffer, detecting its encoding.
    #[must_use = "Has no effect if the result is unused"]
    pub fn from_bytes(buffer: impl Into<Vec<u8>>) -> Self {
        let buffer = buffer.into();
        let (encoding, bom_len) = detect_encoding(&buffer);
        Self {
            buffer,
            cursor: bom_len,
            encoding,
        }
    }

    /// The encoding fixed at load time.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Reads the next line, or [`None`] at the end of the buffer.
    ///
    /// A line ends at the first CR or LF; the whole CR/LF run after it is
    /// consumed, so CRLF, LFLF, and LFCR all count as one break.
    pub fn read_line(&mut self) -> Option<String> {
        match self.encoding {
            Encoding::Latin1 | Encoding::Utf8 => self.read_line_bytes(),
            Encoding::Utf16Le => self.read_line_utf16(),
        }
    }

    /// Reads lines until one yields tokens, returning [`None`] at end of file.
    pub fn read_token_line(&mut self) -> Option<Vec<String>> {
        loop {
            let line = self.read_line()?;
            let tokens = tokenize(&line);
            if !tokens.is_empty() {
                return Some(tokens);
            }
        }
    }

    /// Reads a line of a byte-oriented encoding (Latin-1 or UTF-8).
    fn read_line_bytes(&mut self) -> Option<String> {
        if self.cursor >= self.buffer.len() {
            return None;
        }

        let rest = &self.buffer[self.cursor..];
        let end = rest
            .iter()
            .position(|&b| b == b'\r' || b == b'\n')
            .unwrap_or(rest.len());
        let line = &rest[..end];
        let breaks = rest[end..]
            .iter()
            .take_while(|&&b| b == b'\r' || b == b'\n')
            .count();

        let decoded = match self.encoding {
            Encoding::Utf8 => String::from_utf8_lossy(line).into_owned(),
            _ => line.iter().map(|&b| char::from(b)).collect(),
        };

        self.cursor += end + breaks;
        Some(decoded)
    }

    /// Reads a line of UTF-16LE code units. A trailing odd byte is ignored.
    fn read_line_utf16(&mut self) -> Option<String> {
        if self.cursor + 1 >= self.buffer.len() {
            return None;
        }

        let mut units = Vec::new();
        let mut pos = self.cursor;
        while let Some(unit) = self.unit_at(pos) {
            if unit == 13 || unit == 10 {
                break;
            }
            units.push(unit);
            pos += 2;
        }
        while let Some(unit) = self.unit_at(pos) {
            if unit != 13 && unit != 10 {
                break;
            }
            pos += 2;
        }
        self.cursor = pos;

        Some(
            core::char::decode_utf16(units)
                .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect(),
        )
    }

    /// The code unit at byte offset `pos`, if a full one is left.
    fn unit_at(&self, pos: usize) -> Option<u16> {
        if pos + 1 >= self.buffer.len() {
            return None;
        }
        Some(u16::from_le_bytes([self.buffer[pos], self.buffer[pos + 1]]))
    }
}

/// Sniffs the encoding of a buffer, returning it and the BOM length to skip.
///
/// Checked in order: the FF FE BOM means UTF-16LE, the EF BB BF BOM means
/// UTF-8, and zero bytes in positions 1 and 3 mean BOM-less UTF-16LE text
/// that starts with ASCII. Anything else, including buffers under four
/// bytes, reads as Latin-1.
fn detect_encoding(buffer: &[u8]) -> (Encoding, usize) {
    if buffer.len() >= 4 {
        if buffer[0] == 0xFF && buffer[1] == 0xFE {
            return (Encoding::Utf16Le, 2);
        }
        if buffer[0] == 0xEF && buffer[1] == 0xBB && buffer[2] == 0xBF {
            return (Encoding::Utf8, 3);
        }
        if buffer[1] == 0 && buffer[3] == 0 {
            return (Encoding::Utf16Le, 0);
        }
    }
    (Encoding::Latin1, 0)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use alloc::borrow::ToOwned;

    /// Encodes a str as UTF-16LE bytes with a BOM.
    fn utf16le(s: &str) -> Vec<u8> {
        let mut bytes = alloc::vec![0xFF, 0xFE];
        for unit in s.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_detect_utf16_bom() {
        let file = ConfigFile::from_bytes(utf16le("timeout 20\n"));
        assert_eq!(file.encoding(), Encoding::Utf16Le);
    }

    #[test]
    fn test_detect_utf16_bom_regardless_of_content() {
        let file = ConfigFile::from_bytes(&[0xFF, 0xFE, 0x41, 0x42][..]);
        assert_eq!(file.encoding(), Encoding::Utf16Le);
    }

    #[test]
    fn test_detect_utf8_bom() {
        let file = ConfigFile::from_bytes(&b"\xEF\xBB\xBFtimeout 20"[..]);
        assert_eq!(file.encoding(), Encoding::Utf8);
    }

    #[test]
    fn test_detect_bomless_utf16() {
        // "ab" in UTF-16LE: zero high bytes at offsets 1 and 3
        let file = ConfigFile::from_bytes(&[0x61, 0x00, 0x62, 0x00][..]);
        assert_eq!(file.encoding(), Encoding::Utf16Le);
    }

    #[test]
    fn test_detect_latin1_fallback() {
        let file = ConfigFile::from_bytes(&b"timeout 20"[..]);
        assert_eq!(file.encoding(), Encoding::Latin1);
        // too short for detection
        let file = ConfigFile::from_bytes(&[0xFF, 0xFE][..]);
        assert_eq!(file.encoding(), Encoding::Latin1);
    }

    #[test]
    fn test_line_breaks_collapse() {
        let mut file = ConfigFile::from_bytes(&b"one\r\ntwo\n\nthree\n\rfour"[..]);
        assert_eq!(file.read_line(), Some("one".to_owned()));
        assert_eq!(file.read_line(), Some("two".to_owned()));
        assert_eq!(file.read_line(), Some("three".to_owned()));
        assert_eq!(file.read_line(), Some("four".to_owned()));
        assert_eq!(file.read_line(), None);
    }

    #[test]
    fn test_latin1_maps_bytes_to_code_points() {
        let mut file = ConfigFile::from_bytes(&b"banner caf\xE9.png"[..]);
        assert_eq!(file.read_line(), Some("banner caf\u{e9}.png".to_owned()));
    }

    #[test]
    fn test_utf8_decodes_multibyte() {
        let mut file = ConfigFile::from_bytes(&b"\xEF\xBB\xBFbanner caf\xC3\xA9.png"[..]);
        assert_eq!(file.read_line(), Some("banner caf\u{e9}.png".to_owned()));
    }

    #[test]
    fn test_utf16_lines() {
        let mut file = ConfigFile::from_bytes(utf16le("timeout 20\r\ntextonly\n"));
        assert_eq!(file.read_line(), Some("timeout 20".to_owned()));
        assert_eq!(file.read_line(), Some("textonly".to_owned()));
        assert_eq!(file.read_line(), None);
    }

    #[test]
    fn test_read_token_line_skips_blanks_and_comments() {
        let mut file = ConfigFile::from_bytes(&b"\n# banner of comments\n\ntimeout 20\n# tail\n"[..]);
        assert_eq!(
            file.read_token_line(),
            Some(alloc::vec!["timeout".to_owned(), "20".to_owned()])
        );
        assert_eq!(file.read_token_line(), None);
    }

    proptest! {
        #[test]
        fn doesnt_panic(bytes in any::<Vec<u8>>()) {
            let mut file = ConfigFile::from_bytes(bytes);
            while file.read_token_line().is_some() {}
        }
    }
}
