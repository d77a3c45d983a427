//! Queries against the Sofar sensor-data API.

use chrono::{DateTime, NaiveDate};
use url::{ParseError, Url};

/// The sensor-data endpoint of the Sofar API.
pub const SENSOR_DATA_URL: &str = "https://api.sofarocean.com/api/sensor-data";

/// One spotter's sensor data over a time range.
///
/// # Examples
///
/// ```
/// use sofar::Query;
/// let query = Query::new("SPOT-31778C", "2024-06-03", "2024-06-04", "token").unwrap();
/// assert_eq!("2024-06-03_2024-06-04", query.directory_name());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    spotter_id: String,
    start_date: String,
    end_date: String,
    token: String,
    start: NaiveDate,
    end: NaiveDate,
}

/// An invalid query.
#[derive(Debug, Fail, PartialEq)]
pub enum Error {
    /// The spotter id is empty.
    #[fail(display = "the spotter id is empty")]
    EmptySpotterId,

    /// The date is neither `YYYY-MM-DD` nor RFC 3339.
    #[fail(display = "invalid date (expected YYYY-MM-DD or RFC 3339): {}", _0)]
    InvalidDate(String),
}

impl Query {
    /// Creates a new query.
    ///
    /// Dates can be `YYYY-MM-DD` or full RFC 3339 timestamps, and are passed to the API as given.
    ///
    /// # Examples
    ///
    /// ```
    /// use sofar::Query;
    /// let query = Query::new(
    ///     "SPOT-31778C",
    ///     "2024-06-03T03:36:44.000Z",
    ///     "2024-06-03T03:38:01.000Z",
    ///     "token",
    /// ).unwrap();
    /// assert!(Query::new("SPOT-31778C", "June 3rd", "2024-06-04", "token").is_err());
    /// ```
    pub fn new<A, B, C, D>(spotter_id: A, start_date: B, end_date: C, token: D) -> Result<Query, Error>
    where
        A: Into<String>,
        B: Into<String>,
        C: Into<String>,
        D: Into<String>,
    {
        let spotter_id = spotter_id.into();
        if spotter_id.trim().is_empty() {
            return Err(Error::EmptySpotterId);
        }
        let start_date = start_date.into();
        let end_date = end_date.into();
        Ok(Query {
            start: parse_date(&start_date)?,
            end: parse_date(&end_date)?,
            spotter_id: spotter_id,
            start_date: start_date,
            end_date: end_date,
            token: token.into(),
        })
    }

    /// Returns the API url for this query.
    ///
    /// # Examples
    ///
    /// ```
    /// use sofar::Query;
    /// let query = Query::new("SPOT-31778C", "2024-06-03", "2024-06-04", "abc").unwrap();
    /// assert_eq!(
    ///     "https://api.sofarocean.com/api/sensor-data?spotterId=SPOT-31778C&startDate=2024-06-03&endDate=2024-06-04&token=abc",
    ///     query.url().unwrap().as_str()
    /// );
    /// ```
    pub fn url(&self) -> Result<Url, ParseError> {
        Url::parse_with_params(
            SENSOR_DATA_URL,
            &[
                ("spotterId", self.spotter_id.as_str()),
                ("startDate", self.start_date.as_str()),
                ("endDate", self.end_date.as_str()),
                ("token", self.token.as_str()),
            ],
        )
    }

    /// Returns the name of the directory that holds this query's outputs.
    ///
    /// The name is made from the start and end dates, e.g. `2024-06-03_2024-06-04`.
    pub fn directory_name(&self) -> String {
        format!(
            "{}_{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }

    /// Returns this query's spotter id.
    pub fn spotter_id(&self) -> &str {
        &self.spotter_id
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|datetime| datetime.naive_local().date()))
        .map_err(|_| Error::InvalidDate(s.to_string()))
}
