//! Sensor-data API responses.
//!
//! A response body looks like this, with each entry possibly carrying more fields:
//!
//! ```json
//! {
//!   "data": [
//!     {
//!       "value": "3c543e6869",
//!       "latitude": 40.1,
//!       "longitude": -70.5,
//!       "timestamp": "2024-06-03T03:36:44.000Z"
//!     }
//!   ]
//! }
//! ```

use failure::Error;
use payload::TelemetryRecord;
use serde_json::{self, Value};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// A sensor-data response.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Response {
    /// The response's entries, in the order they were delivered.
    pub data: Vec<Entry>,
}

/// One entry of a sensor-data response.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Entry {
    /// The hex-encoded payload.
    pub value: String,

    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,

    /// ISO-8601 timestamp.
    pub timestamp: String,

    /// Any other fields, kept for the tabular export.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Response {
    /// Reads a response from a JSON file.
    ///
    /// # Examples
    ///
    /// ```
    /// use sofar::Response;
    /// let response = Response::from_path("fixtures/response.json").unwrap();
    /// assert_eq!(7, response.data.len());
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Response, Error> {
        use std::fs::File;
        use std::io::BufReader;

        let file = File::open(path)?;
        Response::from_reader(BufReader::new(file)).map_err(Error::from)
    }

    /// Reads a response from a reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use sofar::Response;
    /// let response = Response::from_reader(r#"{"data": []}"#.as_bytes()).unwrap();
    /// assert!(response.data.is_empty());
    /// ```
    pub fn from_reader<R: Read>(reader: R) -> Result<Response, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Returns this response's entries as telemetry records.
    ///
    /// # Examples
    ///
    /// ```
    /// use sofar::Response;
    /// let response = Response::from_path("fixtures/response.json").unwrap();
    /// let records = response.records();
    /// assert_eq!("2024-06-03T03:36:44.000Z", records[0].timestamp);
    /// ```
    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.data.iter().map(Entry::to_record).collect()
    }
}

impl FromStr for Response {
    type Err = serde_json::Error;
    fn from_str(s: &str) -> Result<Response, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl Entry {
    /// Returns this entry as a telemetry record.
    pub fn to_record(&self) -> TelemetryRecord {
        TelemetryRecord::new(
            self.value.as_str(),
            self.latitude,
            self.longitude,
            self.timestamp.as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture() {
        let response = Response::from_path("fixtures/response.json").unwrap();
        let entry = &response.data[0];
        assert_eq!("3c543e68656c6c6f2066726f6d207468652062756f79", entry.value);
        assert_eq!(40.1, entry.latitude);
        assert_eq!(-70.5, entry.longitude);
        assert_eq!(Some(&Value::from(1)), entry.extra.get("sensorPosition"));
        assert_eq!(Some(&Value::Null), response.data[1].extra.get("data_type_name"));
        assert_eq!(3, entry.extra.len());
    }

    #[test]
    fn integer_coordinates() {
        let response: Response =
            r#"{"data": [{"value": "", "latitude": 40, "longitude": -70, "timestamp": ""}]}"#
                .parse()
                .unwrap();
        assert_eq!(40., response.data[0].latitude);
        assert!(response.data[0].extra.is_empty());
    }

    #[test]
    fn malformed() {
        assert!("{}".parse::<Response>().is_err());
        assert!(r#"{"data": {}}"#.parse::<Response>().is_err());
        assert!(r#"{"data": [{"value": "3c"}]}"#.parse::<Response>().is_err());
        assert!("not json".parse::<Response>().is_err());
        assert!(Response::from_path("fixtures/not-a-file.json").is_err());
    }

    #[test]
    fn extra_top_level_fields_are_ignored() {
        let response: Response = r#"{"data": [], "spotterId": "SPOT"}"#.parse().unwrap();
        assert!(response.data.is_empty());
    }
}
