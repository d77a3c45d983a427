//! Configuration for a reassembly run.
//!
//! Configs are usually specified in TOML files:
//!
//! ```toml
//! spotter_id = "SPOT-31778C"
//! start_date = "2024-06-03T03:36:44.000Z"
//! end_date = "2024-06-03T03:38:01.000Z"
//! token = "..."
//!
//! # Optional
//! output_directory = "out"  # defaults to "{start date}_{end date}"
//! order = "tag"             # or "arrival"
//! image_extension = "jpg"
//! ```

use failure::Error;
use output::DEFAULT_IMAGE_EXTENSION;
use payload::assembly::InvalidOrder;
use payload::Order;
use query::{self, Query};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use toml;

/// Configures a reassembly run.
///
/// # Examples
///
/// ```
/// use sofar::Config;
/// let config = Config::from_path("fixtures/config.toml").unwrap();
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    spotter_id: String,
    start_date: String,
    end_date: String,
    token: String,
    output_directory: Option<PathBuf>,
    order: Option<String>,
    image_extension: Option<String>,
}

impl Config {
    /// Reads configuration from a toml file.
    ///
    /// # Examples
    ///
    /// ```
    /// let config = sofar::Config::from_path("fixtures/config.toml").unwrap();
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        use std::fs::File;
        use std::io::Read;

        let mut file = File::open(path)?;
        let mut string = String::new();
        file.read_to_string(&mut string)?;
        string.parse()
    }

    /// Returns the API query described by this configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// let config = sofar::Config::from_path("fixtures/config.toml").unwrap();
    /// let query = config.query().unwrap();
    /// assert_eq!("SPOT-31778C", query.spotter_id());
    /// ```
    pub fn query(&self) -> Result<Query, query::Error> {
        Query::new(
            self.spotter_id.as_str(),
            self.start_date.as_str(),
            self.end_date.as_str(),
            self.token.as_str(),
        )
    }

    /// Returns the image chunk order, which defaults to `Order::Tag`.
    ///
    /// # Examples
    ///
    /// ```
    /// # extern crate payload;
    /// # extern crate sofar;
    /// # fn main() {
    /// use payload::Order;
    /// let config = sofar::Config::from_path("fixtures/config.toml").unwrap();
    /// assert_eq!(Order::Tag, config.order().unwrap());
    /// # }
    /// ```
    pub fn order(&self) -> Result<Order, InvalidOrder> {
        self.order
            .as_ref()
            .map(|s| s.parse())
            .unwrap_or_else(|| Ok(Order::default()))
    }

    /// Returns the output directory.
    ///
    /// Defaults to a directory in the current directory named after the query dates.
    ///
    /// # Examples
    ///
    /// ```
    /// let config = sofar::Config::from_path("fixtures/config.toml").unwrap();
    /// assert_eq!(
    ///     std::path::PathBuf::from("2024-06-03_2024-06-03"),
    ///     config.output_directory().unwrap()
    /// );
    /// ```
    pub fn output_directory(&self) -> Result<PathBuf, query::Error> {
        match self.output_directory {
            Some(ref directory) => Ok(directory.clone()),
            None => self
                .query()
                .map(|query| PathBuf::from(query.directory_name())),
        }
    }

    /// Returns the image file extension.
    pub fn image_extension(&self) -> &str {
        self.image_extension
            .as_ref()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_IMAGE_EXTENSION)
    }

    /// Sets the output directory.
    pub fn set_output_directory<P: AsRef<Path>>(&mut self, directory: P) {
        self.output_directory = Some(directory.as_ref().to_path_buf());
    }

    /// Sets the image chunk order by name.
    pub fn set_order<S: Into<String>>(&mut self, order: S) {
        self.order = Some(order.into());
    }
}

impl FromStr for Config {
    type Err = Error;
    fn from_str(s: &str) -> Result<Config, Error> {
        toml::from_str(s).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
spotter_id = "SPOT-31778C"
start_date = "2024-06-03"
end_date = "2024-06-04"
token = "abc"
"#;

    #[test]
    fn fixtures() {
        let config = Config::from_path("fixtures/config.toml").unwrap();
        assert_eq!("jpg", config.image_extension());
    }

    #[test]
    fn defaults() {
        let config: Config = MINIMAL.parse().unwrap();
        assert_eq!(Order::Tag, config.order().unwrap());
        assert_eq!("jpg", config.image_extension());
        assert_eq!(
            PathBuf::from("2024-06-03_2024-06-04"),
            config.output_directory().unwrap()
        );
    }

    #[test]
    fn overrides() {
        let mut config: Config = MINIMAL.parse().unwrap();
        config.set_output_directory("out");
        config.set_order("arrival");
        assert_eq!(PathBuf::from("out"), config.output_directory().unwrap());
        assert_eq!(Order::Arrival, config.order().unwrap());
        config.set_order("sideways");
        assert!(config.order().is_err());
    }

    #[test]
    fn optional_fields() {
        let config: Config = format!(
            "{}output_directory = \"data\"\norder = \"arrival\"\nimage_extension = \"png\"\n",
            MINIMAL
        ).parse()
            .unwrap();
        assert_eq!(PathBuf::from("data"), config.output_directory().unwrap());
        assert_eq!(Order::Arrival, config.order().unwrap());
        assert_eq!("png", config.image_extension());
    }

    #[test]
    fn missing_field() {
        assert!("spotter_id = \"SPOT\"".parse::<Config>().is_err());
    }
}
