//! Classify decoded payload text by its markers.
//!
//! The marker grammar, where `N` is one or more decimal digits:
//!
//! | Marker            | Meaning                                    |
//! | ----------------- | ------------------------------------------ |
//! | `<START IMG N>`   | begins image transmission `N`              |
//! | `<END IMG...>`    | ends the open image transmission           |
//! | `<IN>content`     | chunk number `N` of the open image         |
//! | `<T>content`      | a standalone text message                  |
//!
//! Image chunks are only recognized while an image is open, and while an image is open anything
//! that isn't a chunk or a start/end marker is unclassified.
//!
//! ```
//! use payload::{fragment, Fragment};
//! assert_eq!(Fragment::ImageStart { index: 7 }, fragment::classify("<START IMG 7>", false).unwrap());
//! assert_eq!(Fragment::Unclassified, fragment::classify("<I1>ab", false).unwrap());
//! ```

use regex::Regex;

/// Prefix of an image start marker.
pub const IMAGE_START: &str = "<START IMG";

/// Prefix of an image end marker.
pub const IMAGE_END: &str = "<END IMG";

/// Prefix of a text message.
pub const TEXT: &str = "<T>";

const IMAGE_START_REGEX: &str = r"^<START IMG ([0-9]+)>";
const IMAGE_DATA_REGEX: &str = r"<I([0-9]+)>";
const EXCERPT_LENGTH: usize = 24;

/// A classified piece of decoded payload text.
#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    /// Begins the image transmission with the given index.
    ImageStart {
        /// The transmission index.
        index: u32,
    },

    /// Ends the open image transmission.
    ImageEnd,

    /// One chunk of the open image transmission.
    ImageData {
        /// The chunk's tag number, which orders it within the image.
        tag: u32,

        /// Everything after the chunk's marker.
        content: String,
    },

    /// A complete text message, marker included.
    Text {
        /// The message.
        content: String,
    },

    /// None of the above.
    Unclassified,
}

/// A marker was recognized but its number could not be parsed.
#[derive(Debug, Fail, PartialEq)]
pub enum Error {
    /// The image start marker has no valid index.
    #[fail(display = "malformed image start marker: {}", _0)]
    ImageStart(String),

    /// The image data marker has no valid tag number.
    #[fail(display = "malformed image data marker: {}", _0)]
    ImageData(String),
}

/// Classifies decoded text.
///
/// `collecting` is true if an image is currently open, which is the only time that image data is
/// recognized.
///
/// # Examples
///
/// ```
/// use payload::{fragment, Fragment};
/// assert_eq!(Fragment::ImageEnd, fragment::classify("<END IMG>", false).unwrap());
/// assert_eq!(
///     Fragment::ImageData { tag: 3, content: "abc".to_string() },
///     fragment::classify("<I3>abc", true).unwrap()
/// );
/// assert!(fragment::classify("<START IMG x>", false).is_err());
/// ```
pub fn classify(text: &str, collecting: bool) -> Result<Fragment, Error> {
    lazy_static! {
        static ref START: Regex = Regex::new(IMAGE_START_REGEX).unwrap();
        static ref DATA: Regex = Regex::new(IMAGE_DATA_REGEX).unwrap();
    }
    if text.starts_with(IMAGE_START) {
        START
            .captures(text)
            .and_then(|captures| captures[1].parse().ok())
            .map(|index| Fragment::ImageStart { index: index })
            .ok_or_else(|| Error::ImageStart(excerpt(text)))
    } else if text.starts_with(IMAGE_END) {
        Ok(Fragment::ImageEnd)
    } else if collecting {
        if let Some(captures) = DATA.captures(text) {
            let tag = captures[1]
                .parse()
                .map_err(|_| Error::ImageData(captures[0].to_string()))?;
            let end = captures.get(0).map(|m| m.end()).unwrap_or(0);
            Ok(Fragment::ImageData {
                tag: tag,
                content: text[end..].to_string(),
            })
        } else {
            Ok(Fragment::Unclassified)
        }
    } else if text.starts_with(TEXT) {
        Ok(Fragment::Text {
            content: text.to_string(),
        })
    } else {
        Ok(Fragment::Unclassified)
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_LENGTH) {
        Some((i, _)) => format!("{}...", &text[..i]),
        None => text.to_string(),
    }
}
