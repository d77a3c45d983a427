//! Standalone text messages.

use std::fmt;

/// A text message, with where and when it was received.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRecord {
    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,

    /// The ISO-8601 timestamp of the telemetry record.
    pub timestamp: String,

    /// The message, including its `<T>` marker.
    pub content: String,
}

/// Creates a text record from a classified text message and its record's metadata.
///
/// # Examples
///
/// ```
/// use payload::text;
/// let record = text::extract(40.1, -70.5, "2024-06-03T03:36:44.000Z", "<T>hello");
/// assert_eq!("<T>hello", record.content);
/// ```
pub fn extract(latitude: f64, longitude: f64, timestamp: &str, content: &str) -> TextRecord {
    TextRecord {
        latitude: latitude,
        longitude: longitude,
        timestamp: timestamp.to_string(),
        content: content.to_string(),
    }
}

/// One line per record, with line breaks in the content escaped.
impl fmt::Display for TextRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Latitude: {}, Longitude: {}, Timestamp: {}, Message: {}",
            self.latitude,
            self.longitude,
            self.timestamp,
            self.content.replace('\r', "\\r").replace('\n', "\\n")
        )
    }
}
