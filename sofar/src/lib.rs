//! Get Spotter telemetry in, and reassembled messages out.
//!
//! Spotter buoys report through the Sofar sensor-data API. This crate builds API queries, fetches
//! or reads API responses, and writes everything a reassembly pass produces to an output directory:
//!
//! ```text
//! 2024-06-03_2024-06-03/
//!     spotter_data.csv      every record, as received
//!     spotter_message.txt   one line per text message
//!     imgs/3.jpg            one file per image, named by index
//! ```
//!
//! # Examples
//!
//! ```
//! # extern crate payload;
//! # extern crate sofar;
//! # extern crate tempfile;
//! # fn main() {
//! use payload::Controller;
//! use sofar::{FilesystemSink, Response};
//!
//! let response = Response::from_path("fixtures/response.json").unwrap();
//! let directory = tempfile::tempdir().unwrap();
//! sofar::export_csv(directory.path(), &response.data).unwrap();
//! let mut sink = FilesystemSink::create(directory.path(), "jpg").unwrap();
//! let summary = Controller::new().run(&response.records(), &mut sink);
//! assert_eq!(1, summary.images);
//! assert!(directory.path().join("imgs/3.jpg").exists());
//! # }
//! ```

#![deny(missing_docs, missing_debug_implementations, unsafe_code)]

extern crate chrono;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate payload;
extern crate reqwest;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
#[cfg(test)]
extern crate tempfile;
extern crate toml;
extern crate url;

pub mod config;
pub mod export;
pub mod fetch;
pub mod output;
pub mod query;
pub mod response;

pub use config::Config;
pub use export::{export_csv, write_csv};
pub use fetch::fetch;
pub use output::{FilesystemSink, ImageWriter, TextLog};
pub use query::Query;
pub use response::{Entry, Response};
