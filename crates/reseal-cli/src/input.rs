//! Attestation input: a file path or a literal, hex or base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("input is empty")]
    Empty,
    #[error("input is neither hex nor base64")]
    Encoding,
}

/// Reads attestation bytes from `arg`.
///
/// An existing file is read; binary content is taken as raw bytes and
/// text content is decoded like a literal.
pub fn read_vaa(arg: &str) -> Result<Vec<u8>, InputError> {
    let path = Path::new(arg);
    if !path.is_file() {
        return decode_text(arg);
    }
    let bytes = fs::read(path).map_err(|source| InputError::Read {
        path: arg.to_string(),
        source,
    })?;
    match String::from_utf8(bytes) {
        Ok(text) => decode_text(&text),
        Err(raw) => Ok(raw.into_bytes()),
    }
}

/// Decodes `0x`-hex, bare hex, or standard base64.
pub fn decode_text(text: &str) -> Result<Vec<u8>, InputError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(InputError::Empty);
    }
    if let Some(digits) = text.strip_prefix("0x") {
        return hex::decode(digits).map_err(|_| InputError::Encoding);
    }
    if text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
        if let Ok(bytes) = hex::decode(text) {
            return Ok(bytes);
        }
    }
    STANDARD.decode(text).map_err(|_| InputError::Encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn accepts_prefixed_and_bare_hex() {
        assert_eq!(decode_text("0x0102ff").unwrap(), vec![1, 2, 255]);
        assert_eq!(decode_text("0102FF\n").unwrap(), vec![1, 2, 255]);
    }

    #[test]
    fn falls_back_to_base64() {
        assert_eq!(decode_text("AQID").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn rejects_garbage_and_empty() {
        assert!(matches!(decode_text("not base64!"), Err(InputError::Encoding)));
        assert!(matches!(decode_text("  "), Err(InputError::Empty)));
    }

    #[test]
    fn reads_text_and_binary_files() {
        let mut text = tempfile::NamedTempFile::new().unwrap();
        writeln!(text, "0x0a0b").unwrap();
        assert_eq!(
            read_vaa(text.path().to_str().unwrap()).unwrap(),
            vec![0x0a, 0x0b]
        );

        let mut binary = tempfile::NamedTempFile::new().unwrap();
        binary.write_all(&[0x01, 0xff, 0xfe]).unwrap();
        assert_eq!(
            read_vaa(binary.path().to_str().unwrap()).unwrap(),
            vec![0x01, 0xff, 0xfe]
        );
    }
}
