//! Write reassembled images and text records to the filesystem.

use failure::Error;
use payload::{Image, Sink, TextRecord};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The file name of the text log inside an output directory.
pub const TEXT_FILE_NAME: &str = "spotter_message.txt";

/// The name of the image directory inside an output directory.
pub const IMAGE_DIRECTORY_NAME: &str = "imgs";

/// The default image file extension.
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Appends text records to a log, one line per record.
///
/// # Examples
///
/// ```
/// # extern crate payload;
/// # extern crate sofar;
/// # fn main() {
/// use payload::text;
/// use sofar::TextLog;
/// let mut log = TextLog::new(Vec::new());
/// log.write(&text::extract(1., 2., "t", "<T>hi")).unwrap();
/// assert_eq!(
///     "Latitude: 1, Longitude: 2, Timestamp: t, Message: <T>hi\n",
///     String::from_utf8(log.into_inner()).unwrap()
/// );
/// # }
/// ```
#[derive(Debug)]
pub struct TextLog<W: Write> {
    writer: W,
}

/// Writes images into a directory, one file per image named by its index.
#[derive(Clone, Debug)]
pub struct ImageWriter {
    directory: PathBuf,
    extension: String,
}

/// A sink that writes everything into one output directory.
#[derive(Debug)]
pub struct FilesystemSink {
    text_log: TextLog<File>,
    image_writer: ImageWriter,
}

impl TextLog<File> {
    /// Opens a text log file for appending, creating it if it doesn't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<TextLog<File>> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(TextLog::new)
    }
}

impl<W: Write> TextLog<W> {
    /// Creates a new text log around a writer.
    pub fn new(writer: W) -> TextLog<W> {
        TextLog { writer: writer }
    }

    /// Appends one record.
    pub fn write(&mut self, record: &TextRecord) -> io::Result<()> {
        writeln!(self.writer, "{}", record)?;
        self.writer.flush()
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl ImageWriter {
    /// Creates a new image writer.
    ///
    /// The directory is created when the first image is written.
    ///
    /// # Examples
    ///
    /// ```
    /// use sofar::ImageWriter;
    /// let writer = ImageWriter::new("imgs", "jpg");
    /// assert_eq!(std::path::Path::new("imgs/3.jpg"), writer.path(3));
    /// ```
    pub fn new<P: AsRef<Path>, S: Into<String>>(directory: P, extension: S) -> ImageWriter {
        ImageWriter {
            directory: directory.as_ref().to_path_buf(),
            extension: extension.into(),
        }
    }

    /// Returns the path of the image file with the given index.
    pub fn path(&self, index: u32) -> PathBuf {
        let mut path = self.directory.join(index.to_string());
        if !self.extension.is_empty() {
            path.set_extension(&self.extension);
        }
        path
    }

    /// Writes an image, replacing any earlier image with the same index, and returns its path.
    pub fn write(&self, image: &Image) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.directory)?;
        let path = self.path(image.index);
        fs::write(&path, &image.data)?;
        Ok(path)
    }
}

impl FilesystemSink {
    /// Creates a sink that writes into the given output directory, creating it if necessary.
    ///
    /// Text records are appended to `spotter_message.txt` and images are written to `imgs/`.
    ///
    /// # Examples
    ///
    /// ```
    /// # extern crate sofar;
    /// # extern crate tempfile;
    /// # fn main() {
    /// use sofar::FilesystemSink;
    /// let directory = tempfile::tempdir().unwrap();
    /// let sink = FilesystemSink::create(directory.path(), "jpg").unwrap();
    /// assert!(directory.path().join("spotter_message.txt").exists());
    /// # }
    /// ```
    pub fn create<P: AsRef<Path>, S: Into<String>>(
        directory: P,
        image_extension: S,
    ) -> Result<FilesystemSink, Error> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;
        Ok(FilesystemSink {
            text_log: TextLog::open(directory.join(TEXT_FILE_NAME))?,
            image_writer: ImageWriter::new(directory.join(IMAGE_DIRECTORY_NAME), image_extension),
        })
    }
}

impl Sink for FilesystemSink {
    fn image(&mut self, image: &Image) -> Result<(), Error> {
        let path = self.image_writer.write(image)?;
        info!("wrote image {} to {}", image.index, path.display());
        Ok(())
    }

    fn text(&mut self, record: &TextRecord) -> Result<(), Error> {
        self.text_log.write(record).map_err(Error::from)
    }
}
