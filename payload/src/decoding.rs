//! Decode hex-encoded payloads into text.
//!
//! Payloads are hex strings of UTF-8 text. A payload that is not valid hex can't be used at all,
//! but a payload with a few corrupted bytes can: invalid UTF-8 sequences are replaced with
//! `U+FFFD` and the rest of the text is kept.
//!
//! ```
//! use payload::decoding;
//! let decoded = decoding::decode("3c543effff").unwrap();
//! assert_eq!("<T>\u{fffd}\u{fffd}", decoded.text);
//! assert!(decoded.had_replacement);
//! ```

use hex;

/// Text recovered from a hex payload.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedText {
    /// The decoded text.
    pub text: String,

    /// True if any invalid UTF-8 sequences were replaced.
    pub had_replacement: bool,
}

/// A payload that could not be decoded as hex.
#[derive(Debug, Fail, PartialEq)]
#[fail(display = "invalid hex in the bytes starting at position {}: {}", position, cause)]
pub struct Error {
    /// The byte offset of the run of hex digits that failed to decode.
    pub position: usize,

    /// Why the run failed to decode.
    #[cause]
    pub cause: hex::FromHexError,
}

/// Decodes a hex string into text.
///
/// Whitespace between bytes is skipped.
///
/// # Examples
///
/// ```
/// use payload::decoding;
/// let decoded = decoding::decode("3c543e6869").unwrap();
/// assert_eq!("<T>hi", decoded.text);
/// assert!(!decoded.had_replacement);
/// assert!(decoding::decode("3c5").is_err());
/// ```
pub fn decode(s: &str) -> Result<DecodedText, Error> {
    to_bytes(s).map(DecodedText::from)
}

/// Decodes a hex string into bytes.
///
/// Each whitespace-separated run must hold whole bytes.
///
/// # Examples
///
/// ```
/// use payload::decoding;
/// assert_eq!(vec![0x3c, 0xff], decoding::to_bytes("3cFF").unwrap());
/// assert_eq!(vec![0x3c, 0xff], decoding::to_bytes("3c ff").unwrap());
/// assert!(decoding::to_bytes("3 cff").is_err());
/// ```
pub fn to_bytes(s: &str) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::with_capacity(s.len() / 2);
    let mut position = 0;
    for run in s.split(|c: char| c.is_ascii_whitespace()) {
        if !run.is_empty() {
            let decoded = hex::decode(run).map_err(|cause| Error {
                position: position,
                cause: cause,
            })?;
            bytes.extend(decoded);
        }
        position += run.len() + 1;
    }
    Ok(bytes)
}

/// Encodes bytes as a lowercase hex string.
///
/// # Examples
///
/// ```
/// use payload::decoding;
/// assert_eq!("3c543e", decoding::encode(b"<T>"));
/// ```
pub fn encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

impl From<Vec<u8>> for DecodedText {
    fn from(bytes: Vec<u8>) -> DecodedText {
        match String::from_utf8(bytes) {
            Ok(text) => DecodedText {
                text: text,
                had_replacement: false,
            },
            Err(err) => {
                let utf8_error = err.utf8_error();
                let start = utf8_error.valid_up_to();
                let bytes = err.into_bytes();
                let end = utf8_error
                    .error_len()
                    .map(|len| start + len)
                    .unwrap_or_else(|| bytes.len());
                warn!(
                    "invalid utf-8 {:?} at position {}, replacing",
                    &bytes[start..end],
                    start
                );
                DecodedText {
                    text: String::from_utf8_lossy(&bytes).into_owned(),
                    had_replacement: true,
                }
            }
        }
    }
}
