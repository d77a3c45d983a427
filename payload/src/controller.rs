//! Drive one pass of reassembly over a stream of telemetry records.
//!
//! A `Controller` decodes and classifies each record in turn, feeds image chunks to its
//! `Reassembler`, and hands completed images and text records to a `Sink`:
//!
//! ```
//! use payload::{Controller, Output, TelemetryRecord};
//!
//! let records: Vec<TelemetryRecord> = ["<T>one", "<START IMG 1>", "<I1>ab", "zz"]
//!     .iter()
//!     .map(|s| TelemetryRecord::from_text(s))
//!     .collect();
//! let mut outputs: Vec<Output> = Vec::new();
//! let summary = Controller::new().run(&records, &mut outputs);
//! assert_eq!(1, summary.texts);
//! assert_eq!(Some(1), summary.dangling);
//! ```

use assembly::{Image, Order, Reassembler};
use failure::Error as FailureError;
use fragment::{self, Fragment};
use decoding;
use record::TelemetryRecord;
use text::{self, TextRecord};

/// The state of a controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum State {
    /// No image is open.
    Idle,

    /// An image is open and receiving chunks.
    CollectingImage {
        /// The open image's index.
        index: u32,
    },
}

/// Something produced by reassembly.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    /// A completed image.
    Image(Image),

    /// A text record.
    Text(TextRecord),
}

/// Receives the outputs of a reassembly pass.
pub trait Sink {
    /// Stores a completed image.
    fn image(&mut self, image: &Image) -> Result<(), FailureError>;

    /// Stores a text record.
    fn text(&mut self, record: &TextRecord) -> Result<(), FailureError>;
}

/// An error that causes a single record to be skipped.
#[derive(Debug, Fail, PartialEq)]
pub enum Error {
    /// The payload is not valid hex.
    #[fail(display = "malformed payload: {}", _0)]
    MalformedPayload(#[cause] decoding::Error),

    /// A marker's number could not be parsed.
    #[fail(display = "{}", _0)]
    MalformedMarker(#[cause] fragment::Error),
}

/// A record that was skipped during a pass.
#[derive(Debug, PartialEq)]
pub struct Skipped {
    /// The position of the record in the stream, starting at zero.
    pub position: usize,

    /// Why it was skipped.
    pub error: Error,
}

/// What happened during a pass.
#[derive(Debug, Default)]
pub struct Summary {
    /// The number of records processed.
    pub records: usize,

    /// The number of text records handed to the sink.
    pub texts: usize,

    /// The number of images handed to the sink.
    pub images: usize,

    /// The number of images that were closed without any chunks, and not handed to the sink.
    pub empty_images: usize,

    /// The number of records whose payloads contained invalid UTF-8.
    pub replacements: usize,

    /// Records that were skipped.
    pub skipped: Vec<Skipped>,

    /// Errors returned by the sink.
    pub failed_writes: Vec<FailureError>,

    /// The indices of images discarded by a new start marker before they ended.
    pub discarded: Vec<u32>,

    /// The index of the image that was still open at the end of the pass.
    pub dangling: Option<u32>,
}

/// Drives reassembly, one record at a time.
#[derive(Debug, Default)]
pub struct Controller {
    reassembler: Reassembler,
    summary: Summary,
}

impl Controller {
    /// Creates a new, idle controller that orders image chunks by tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::{Controller, State};
    /// let controller = Controller::new();
    /// assert_eq!(State::Idle, controller.state());
    /// ```
    pub fn new() -> Controller {
        Controller::default()
    }

    /// Creates a new controller with the given chunk order.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::{Controller, Order};
    /// let controller = Controller::with_order(Order::Arrival);
    /// ```
    pub fn with_order(order: Order) -> Controller {
        Controller {
            reassembler: Reassembler::with_order(order),
            summary: Summary::default(),
        }
    }

    /// Returns this controller's current state.
    pub fn state(&self) -> State {
        match self.reassembler.index() {
            Some(index) => State::CollectingImage { index: index },
            None => State::Idle,
        }
    }

    /// Processes one record, returning an output if the record completed one.
    ///
    /// An error means the record was skipped and the state is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::{Controller, State, TelemetryRecord};
    /// let mut controller = Controller::new();
    /// let output = controller.add(&TelemetryRecord::from_text("<START IMG 2>")).unwrap();
    /// assert_eq!(None, output);
    /// assert_eq!(State::CollectingImage { index: 2 }, controller.state());
    /// assert!(controller.add(&TelemetryRecord::new("xx", 0., 0., "")).is_err());
    /// ```
    pub fn add(&mut self, record: &TelemetryRecord) -> Result<Option<Output>, Error> {
        self.summary.records += 1;
        let decoded = decoding::decode(&record.payload).map_err(Error::MalformedPayload)?;
        if decoded.had_replacement {
            self.summary.replacements += 1;
        }
        let fragment = fragment::classify(&decoded.text, self.reassembler.is_open())
            .map_err(Error::MalformedMarker)?;
        Ok(self.handle(fragment, record))
    }

    /// Processes every record, handing outputs to the sink, and returns a summary of the pass.
    ///
    /// Skipped records and sink errors are logged and recorded in the summary; neither stops the
    /// pass. Empty images are not handed to the sink.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::{Controller, Output, TelemetryRecord};
    /// let records = vec![TelemetryRecord::from_text("<T>hi")];
    /// let mut outputs: Vec<Output> = Vec::new();
    /// let summary = Controller::new().run(&records, &mut outputs);
    /// assert_eq!(1, summary.records);
    /// assert_eq!(1, outputs.len());
    /// ```
    pub fn run<'a, I, S>(mut self, records: I, sink: &mut S) -> Summary
    where
        I: IntoIterator<Item = &'a TelemetryRecord>,
        S: Sink,
    {
        for (position, record) in records.into_iter().enumerate() {
            match self.add(record) {
                Ok(Some(Output::Image(image))) => {
                    if image.data.is_empty() {
                        warn!("image {} has no data, skipping", image.index);
                        self.summary.empty_images += 1;
                    } else {
                        info!("image {} complete ({} bytes)", image.index, image.data.len());
                        match sink.image(&image) {
                            Ok(()) => self.summary.images += 1,
                            Err(err) => self.failed_write(err),
                        }
                    }
                }
                Ok(Some(Output::Text(text))) => match sink.text(&text) {
                    Ok(()) => self.summary.texts += 1,
                    Err(err) => self.failed_write(err),
                },
                Ok(None) => {}
                Err(err) => {
                    warn!("skipping record {} ({}): {}", position, record.timestamp, err);
                    self.summary.skipped.push(Skipped {
                        position: position,
                        error: err,
                    });
                }
            }
        }
        self.finish()
    }

    /// Ends the pass and returns its summary.
    ///
    /// An image that is still open is reported as dangling and its chunks are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::{Controller, TelemetryRecord};
    /// let mut controller = Controller::new();
    /// controller.add(&TelemetryRecord::from_text("<START IMG 2>")).unwrap();
    /// assert_eq!(Some(2), controller.finish().dangling);
    /// ```
    pub fn finish(self) -> Summary {
        let mut summary = self.summary;
        if let Some(index) = self.reassembler.index() {
            warn!("image {} was never closed, discarding", index);
            summary.dangling = Some(index);
        }
        summary
    }

    fn handle(&mut self, fragment: Fragment, record: &TelemetryRecord) -> Option<Output> {
        match fragment {
            Fragment::ImageStart { index } => {
                debug!("starting image {}", index);
                if let Some(discarded) = self.reassembler.open(index) {
                    self.summary.discarded.push(discarded.index());
                }
                None
            }
            Fragment::ImageData { tag, content } => {
                if !self.reassembler.accept(tag, content) {
                    debug!("dropping chunk {} outside of an image", tag);
                }
                None
            }
            Fragment::ImageEnd => {
                let image = self.reassembler.close();
                if image.is_none() {
                    debug!("ignoring image end marker outside of an image");
                }
                image.map(Output::Image)
            }
            Fragment::Text { content } => Some(Output::Text(text::extract(
                record.latitude,
                record.longitude,
                &record.timestamp,
                &content,
            ))),
            Fragment::Unclassified => {
                debug!("dropping unclassified record at {}", record.timestamp);
                None
            }
        }
    }

    fn failed_write(&mut self, err: FailureError) {
        error!("could not write output: {}", err);
        self.summary.failed_writes.push(err);
    }
}

impl Summary {
    /// Returns true if nothing was skipped, discarded, dangling, or failed to write.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
            && self.failed_writes.is_empty()
            && self.discarded.is_empty()
            && self.dangling.is_none()
    }
}

/// Collects outputs in memory, including empty images.
impl Sink for Vec<Output> {
    fn image(&mut self, image: &Image) -> Result<(), FailureError> {
        self.push(Output::Image(image.clone()));
        Ok(())
    }

    fn text(&mut self, record: &TextRecord) -> Result<(), FailureError> {
        self.push(Output::Text(record.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(texts: &[&str]) -> Vec<TelemetryRecord> {
        texts.iter().map(|s| TelemetryRecord::from_text(s)).collect()
    }

    fn images(outputs: &[Output]) -> Vec<&Image> {
        outputs
            .iter()
            .filter_map(|output| match *output {
                Output::Image(ref image) => Some(image),
                _ => None,
            })
            .collect()
    }

    fn texts(outputs: &[Output]) -> Vec<&str> {
        outputs
            .iter()
            .filter_map(|output| match *output {
                Output::Text(ref record) => Some(record.content.as_str()),
                _ => None,
            })
            .collect()
    }

    #[derive(Debug, Default)]
    struct FailingSink;

    impl Sink for FailingSink {
        fn image(&mut self, _: &Image) -> Result<(), FailureError> {
            Err(format_err!("disk full"))
        }

        fn text(&mut self, _: &TextRecord) -> Result<(), FailureError> {
            Err(format_err!("disk full"))
        }
    }

    #[test]
    fn state_machine() {
        let mut controller = Controller::new();
        let add = |controller: &mut Controller, s: &str| {
            controller.add(&TelemetryRecord::from_text(s)).unwrap()
        };
        assert_eq!(None, add(&mut controller, "<START IMG 7>"));
        assert_eq!(State::CollectingImage { index: 7 }, controller.state());
        assert_eq!(None, add(&mut controller, "<I1>ab"));
        assert_eq!(State::CollectingImage { index: 7 }, controller.state());
        let output = add(&mut controller, "<END IMG>").unwrap();
        assert_eq!(
            Output::Image(Image {
                index: 7,
                data: b"ab".to_vec(),
            }),
            output
        );
        assert_eq!(State::Idle, controller.state());
        assert_eq!(None, add(&mut controller, "<END IMG>"));
        assert_eq!(State::Idle, controller.state());
    }

    #[test]
    fn out_of_order_image() {
        let mut outputs = Vec::new();
        let summary = Controller::new().run(
            &records(&["<START IMG 3>", "<I3>c", "<I1>a", "<I2>b", "<END IMG>"]),
            &mut outputs,
        );
        assert!(summary.is_clean());
        assert_eq!(1, summary.images);
        let images = images(&outputs);
        assert_eq!(3, images[0].index);
        assert_eq!(b"abc".to_vec(), images[0].data);
    }

    #[test]
    fn arrival_order() {
        let mut outputs = Vec::new();
        Controller::with_order(Order::Arrival).run(
            &records(&["<START IMG 3>", "<I2>b", "<I1>a", "<END IMG>"]),
            &mut outputs,
        );
        assert_eq!(b"ba".to_vec(), images(&outputs)[0].data);
    }

    #[test]
    fn only_text() {
        let mut outputs = Vec::new();
        let summary = Controller::new().run(&records(&["<T>a", "<T>b", "<T>c"]), &mut outputs);
        assert_eq!(3, summary.texts);
        assert_eq!(0, summary.images);
        assert_eq!(vec!["<T>a", "<T>b", "<T>c"], texts(&outputs));
    }

    #[test]
    fn text_keeps_record_metadata() {
        let mut outputs = Vec::new();
        let record = TelemetryRecord::new("3c543e6869", 40.1, -70.5, "2024-06-03T03:36:44.000Z");
        Controller::new().run(&[record], &mut outputs);
        assert_eq!(
            Output::Text(TextRecord {
                latitude: 40.1,
                longitude: -70.5,
                timestamp: "2024-06-03T03:36:44.000Z".to_string(),
                content: "<T>hi".to_string(),
            }),
            outputs[0]
        );
    }

    #[test]
    fn text_while_collecting_is_dropped() {
        let mut outputs = Vec::new();
        let summary = Controller::new().run(
            &records(&["<START IMG 1>", "<I1>a", "<T>lost", "<END IMG>", "<T>kept"]),
            &mut outputs,
        );
        assert_eq!(vec!["<T>kept"], texts(&outputs));
        assert_eq!(1, summary.images);
    }

    #[test]
    fn dangling_image() {
        let mut outputs = Vec::new();
        let summary = Controller::new().run(
            &records(&["<START IMG 4>", "<I1>a", "<I2>b"]),
            &mut outputs,
        );
        assert!(outputs.is_empty());
        assert_eq!(0, summary.images);
        assert_eq!(Some(4), summary.dangling);
    }

    #[test]
    fn restart_discards_open_image() {
        let mut outputs = Vec::new();
        let summary = Controller::new().run(
            &records(&["<START IMG 1>", "<I1>a", "<START IMG 2>", "<I1>b", "<END IMG>"]),
            &mut outputs,
        );
        assert_eq!(vec![1], summary.discarded);
        let images = images(&outputs);
        assert_eq!(1, images.len());
        assert_eq!(2, images[0].index);
        assert_eq!(b"b".to_vec(), images[0].data);
    }

    #[test]
    fn invalid_hex_is_skipped() {
        let mut records = records(&["<T>a", "<T>b"]);
        records.insert(1, TelemetryRecord::new("3cz", 0., 0., ""));
        let mut outputs = Vec::new();
        let summary = Controller::new().run(&records, &mut outputs);
        assert_eq!(3, summary.records);
        assert_eq!(vec!["<T>a", "<T>b"], texts(&outputs));
        assert_eq!(1, summary.skipped.len());
        assert_eq!(1, summary.skipped[0].position);
        match summary.skipped[0].error {
            Error::MalformedPayload(_) => {}
            ref err => panic!("unexpected error: {}", err),
        }
    }

    #[test]
    fn malformed_marker_is_skipped_without_changing_state() {
        let mut controller = Controller::new();
        controller
            .add(&TelemetryRecord::from_text("<START IMG 1>"))
            .unwrap();
        controller.add(&TelemetryRecord::from_text("<I1>a")).unwrap();
        match controller.add(&TelemetryRecord::from_text("<START IMG one>")) {
            Err(Error::MalformedMarker(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(State::CollectingImage { index: 1 }, controller.state());
        let output = controller
            .add(&TelemetryRecord::from_text("<END IMG>"))
            .unwrap();
        assert_eq!(
            Some(Output::Image(Image {
                index: 1,
                data: b"a".to_vec(),
            })),
            output
        );
    }

    #[test]
    fn invalid_utf8_is_counted_and_kept() {
        let mut outputs = Vec::new();
        let records = vec![TelemetryRecord::new("3c543e61ff", 0., 0., "")];
        let summary = Controller::new().run(&records, &mut outputs);
        assert_eq!(1, summary.replacements);
        assert_eq!(vec!["<T>a\u{fffd}"], texts(&outputs));
    }

    #[test]
    fn empty_image_is_not_written() {
        let mut outputs = Vec::new();
        let summary = Controller::new().run(
            &records(&["<START IMG 1>", "<END IMG>"]),
            &mut outputs,
        );
        assert!(outputs.is_empty());
        assert_eq!(1, summary.empty_images);
        assert_eq!(0, summary.images);
    }

    #[test]
    fn unclassified_is_ignored() {
        let mut outputs = Vec::new();
        let summary = Controller::new().run(
            &records(&["hello", "<I1>a", "<END IMG>"]),
            &mut outputs,
        );
        assert!(outputs.is_empty());
        assert!(summary.is_clean());
        assert_eq!(3, summary.records);
    }

    #[test]
    fn failed_writes_do_not_stop_the_pass() {
        let summary = Controller::new().run(
            &records(&["<T>a", "<START IMG 1>", "<I1>a", "<END IMG>", "<T>b"]),
            &mut FailingSink,
        );
        assert_eq!(3, summary.failed_writes.len());
        assert_eq!(0, summary.texts);
        assert_eq!(0, summary.images);
        assert_eq!(5, summary.records);
    }
}
