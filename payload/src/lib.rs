//! Reconstruct text messages and images from Spotter telemetry payloads.
//!
//! # Background
//!
//! Sofar Spotter buoys relay data from attached sensors as a stream of telemetry records, each
//! carrying a small hex-encoded payload. A payload is too small to hold an image, so the sender
//! splits each image into many tagged chunks and brackets them with control markers:
//!
//! ```text
//! <START IMG 4>
//! <I1>first chunk
//! <I2>second chunk
//! <END IMG>
//! ```
//!
//! Free-form text messages travel on the same stream, each in one record starting with `<T>`.
//! The records are not guaranteed to arrive in order, so image chunks are put back in tag order
//! when the image is closed.
//!
//! # Usage
//!
//! The simplest way to use this crate is `reassemble`, which returns everything that could be
//! reconstructed and silently drops everything else:
//!
//! ```
//! use payload::{Output, TelemetryRecord};
//!
//! let records = vec![
//!     TelemetryRecord::new("3c543e6869", 40.1, -70.5, "2024-06-03T03:36:44.000Z"), // <T>hi
//! ];
//! let outputs = payload::reassemble(&records);
//! match outputs[0] {
//!     Output::Text(ref text) => assert_eq!("<T>hi", text.content),
//!     _ => panic!("expected a text record"),
//! }
//! ```
//!
//! For finer-grained control, and a `Summary` of what went wrong, use a `Controller`.

#![deny(missing_docs, missing_debug_implementations, unsafe_code)]

#[macro_use]
extern crate failure;
extern crate hex;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate regex;

pub mod assembly;
pub mod controller;
pub mod decoding;
pub mod fragment;
pub mod record;
pub mod text;

pub use assembly::{Image, Order, Reassembler};
pub use controller::{Controller, Error, Output, Sink, State, Summary};
pub use fragment::Fragment;
pub use record::TelemetryRecord;
pub use text::TextRecord;

/// Reassembles images and text records from telemetry records.
///
/// This is the simplest way to do this. Malformed records are skipped, images are ordered by tag,
/// and empty images are dropped. Use `Controller` to get a `Summary` of what was skipped.
///
/// # Examples
///
/// ```
/// use payload::{Output, TelemetryRecord};
///
/// let records: Vec<TelemetryRecord> = ["<START IMG 7>", "<I2>cd", "<I1>ab", "<END IMG>"]
///     .iter()
///     .map(|s| TelemetryRecord::from_text(s))
///     .collect();
/// let outputs = payload::reassemble(&records);
/// assert_eq!(1, outputs.len());
/// match outputs[0] {
///     Output::Image(ref image) => {
///         assert_eq!(7, image.index);
///         assert_eq!(b"abcd".to_vec(), image.data);
///     }
///     _ => panic!("expected an image"),
/// }
/// ```
pub fn reassemble<'a, I>(records: I) -> Vec<Output>
where
    I: IntoIterator<Item = &'a TelemetryRecord>,
{
    let mut outputs = Vec::new();
    Controller::new().run(records, &mut outputs);
    outputs
}
