//! Telemetry records, the input unit of reassembly.

use decoding;

/// One telemetry record as delivered by the data source.
///
/// Records are only borrowed during a reassembly pass; nothing in this crate keeps them.
#[derive(Clone, Debug, PartialEq)]
pub struct TelemetryRecord {
    /// The hex-encoded payload.
    pub payload: String,

    /// The latitude of the buoy when the record was received, in decimal degrees.
    pub latitude: f64,

    /// The longitude of the buoy when the record was received, in decimal degrees.
    pub longitude: f64,

    /// The ISO-8601 timestamp of the record, as provided by the data source.
    pub timestamp: String,
}

impl TelemetryRecord {
    /// Creates a new telemetry record.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::TelemetryRecord;
    /// let record = TelemetryRecord::new("3c543e6869", 40.1, -70.5, "2024-06-03T03:36:44.000Z");
    /// assert_eq!("3c543e6869", record.payload);
    /// ```
    pub fn new<P, T>(payload: P, latitude: f64, longitude: f64, timestamp: T) -> TelemetryRecord
    where
        P: Into<String>,
        T: Into<String>,
    {
        TelemetryRecord {
            payload: payload.into(),
            latitude: latitude,
            longitude: longitude,
            timestamp: timestamp.into(),
        }
    }

    /// Creates a record at the origin, with no timestamp, whose payload is the hex encoding of the
    /// provided text.
    ///
    /// Mostly useful for testing.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::TelemetryRecord;
    /// let record = TelemetryRecord::from_text("<T>hi");
    /// assert_eq!("3c543e6869", record.payload);
    /// ```
    pub fn from_text(text: &str) -> TelemetryRecord {
        TelemetryRecord::new(decoding::encode(text.as_bytes()), 0., 0., "")
    }
}
