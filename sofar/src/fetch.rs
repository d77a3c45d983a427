//! Fetch sensor data from the Sofar API.

use failure;
use query::Query;
use reqwest::blocking::Client;
use response::Response;
use std::io::Read;
use std::time::Duration;

/// How long to wait for the sensor-data API before giving up.
pub const TIMEOUT_SECONDS: u64 = 30;

/// The API answered, but not with sensor data.
#[derive(Debug, Fail, PartialEq)]
pub enum Error {
    /// The API returned a status other than 2xx.
    #[fail(display = "sensor-data request failed with status {}", _0)]
    Status(u16),
}

/// Fetches the sensor data for a query.
///
/// Connection failures, timeouts, non-success statuses, and bodies that aren't a sensor-data
/// response are all errors.
pub fn fetch(query: &Query) -> Result<Response, failure::Error> {
    let url = query.url()?;
    info!("fetching sensor data for {}", query.spotter_id());
    fetch_url(url.as_str())
}

/// Fetches sensor data from a url.
pub fn fetch_url(url: &str) -> Result<Response, failure::Error> {
    let client = Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECONDS))
        .build()?;
    let http_response = client.get(url).send()?;
    let status = http_response.status().as_u16();
    debug!("sensor-data api returned {}", status);
    from_http(status, http_response)
}

/// Reads a sensor-data response from an HTTP status and body.
///
/// # Examples
///
/// ```
/// use sofar::fetch;
/// let response = fetch::from_http(200, r#"{"data": []}"#.as_bytes()).unwrap();
/// assert!(response.data.is_empty());
/// assert!(fetch::from_http(401, r#"{"message": "unauthorized"}"#.as_bytes()).is_err());
/// ```
pub fn from_http<R: Read>(status: u16, body: R) -> Result<Response, failure::Error> {
    if status < 200 || status >= 300 {
        return Err(Error::Status(status).into());
    }
    Response::from_reader(body).map_err(failure::Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn fixture() {
        let response = from_http(200, File::open("fixtures/response.json").unwrap()).unwrap();
        assert_eq!(7, response.data.len());
        assert_eq!(7, response.records().len());
    }

    #[test]
    fn non_success_status() {
        for &status in &[199, 301, 404, 500] {
            let err = from_http(status, File::open("fixtures/response.json").unwrap()).unwrap_err();
            assert_eq!(Some(&Error::Status(status)), err.downcast_ref::<Error>());
        }
    }

    #[test]
    fn malformed_body() {
        let err = from_http(200, "<html></html>".as_bytes()).unwrap_err();
        assert!(err.downcast_ref::<Error>().is_none());
        assert!(from_http(204, "".as_bytes()).is_err());
    }

    #[test]
    fn fetch_from_local_server() {
        let body = fs::read_to_string("fixtures/response.json").unwrap();
        let response = fetch_url(&serve_once("200 OK", body)).unwrap();
        assert_eq!(7, response.data.len());
    }

    #[test]
    fn fetch_unauthorized() {
        let url = serve_once("401 Unauthorized", r#"{"message": "bad token"}"#.to_string());
        let err = fetch_url(&url).unwrap_err();
        assert_eq!(Some(&Error::Status(401)), err.downcast_ref::<Error>());
    }

    #[test]
    fn fetch_connection_refused() {
        // Bind and drop to get a local port that nothing listens on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        assert!(fetch_url(&format!("http://127.0.0.1:{}/api/sensor-data", port)).is_err());
    }

    fn serve_once(status: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0; 4096];
            stream.read(&mut request).unwrap();
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
                 Connection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            ).unwrap();
        });
        format!("http://{}/api/sensor-data", address)
    }
}
