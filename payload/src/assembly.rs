//! Reassemble images from their chunks.
//!
//! # Examples
//!
//! Use a `Reassembler` to build an image from chunks that may not come in order:
//!
//! ```
//! use payload::Reassembler;
//! let mut reassembler = Reassembler::new();
//! reassembler.open(5);
//! reassembler.accept(2, "cd");
//! reassembler.accept(1, "ab");
//! let image = reassembler.close().unwrap();
//! assert_eq!(5, image.index);
//! assert_eq!(b"abcd".to_vec(), image.data);
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

/// How chunks are ordered when an image is closed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Order {
    /// Ascending tag number. A later chunk with the same tag replaces an earlier one.
    Tag,

    /// Arrival order, every chunk kept, as older decoders did it.
    Arrival,
}

/// A completed image.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    /// The transmission index from the start marker.
    pub index: u32,

    /// The concatenated chunk contents.
    pub data: Vec<u8>,
}

/// An image that is still receiving chunks.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageAssembly {
    index: u32,
    chunks: Vec<(u32, String)>,
}

/// Reassembles one image at a time.
#[derive(Debug, Default)]
pub struct Reassembler {
    assembly: Option<ImageAssembly>,
    order: Order,
}

/// An invalid chunk order name.
#[derive(Debug, Fail, PartialEq)]
#[fail(display = "invalid order (expected tag or arrival): {}", _0)]
pub struct InvalidOrder(pub String);

impl Default for Order {
    fn default() -> Order {
        Order::Tag
    }
}

impl FromStr for Order {
    type Err = InvalidOrder;
    fn from_str(s: &str) -> Result<Order, InvalidOrder> {
        match s.to_lowercase().as_str() {
            "tag" => Ok(Order::Tag),
            "arrival" => Ok(Order::Arrival),
            _ => Err(InvalidOrder(s.to_string())),
        }
    }
}

impl ImageAssembly {
    /// Creates a new, empty assembly.
    pub fn new(index: u32) -> ImageAssembly {
        ImageAssembly {
            index: index,
            chunks: Vec::new(),
        }
    }

    /// Returns this assembly's transmission index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the number of chunks received so far, duplicates included.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if no chunks have been received.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Adds a chunk.
    pub fn push<S: Into<String>>(&mut self, tag: u32, content: S) {
        self.chunks.push((tag, content.into()));
    }

    /// Concatenates the chunks into an image.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::{Order, assembly::ImageAssembly};
    /// let mut assembly = ImageAssembly::new(1);
    /// assembly.push(2, "b");
    /// assembly.push(1, "a");
    /// assert_eq!(b"ab".to_vec(), assembly.clone().into_image(Order::Tag).data);
    /// assert_eq!(b"ba".to_vec(), assembly.into_image(Order::Arrival).data);
    /// ```
    pub fn into_image(self, order: Order) -> Image {
        let data = match order {
            Order::Tag => self
                .chunks
                .into_iter()
                .collect::<BTreeMap<_, _>>()
                .into_iter()
                .fold(Vec::new(), |mut data, (_, content)| {
                    data.extend(content.into_bytes());
                    data
                }),
            Order::Arrival => {
                self.chunks
                    .into_iter()
                    .fold(Vec::new(), |mut data, (_, content)| {
                        data.extend(content.into_bytes());
                        data
                    })
            }
        };
        Image {
            index: self.index,
            data: data,
        }
    }
}

impl Reassembler {
    /// Creates a new reassembler that orders chunks by tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::Reassembler;
    /// let reassembler = Reassembler::new();
    /// assert!(!reassembler.is_open());
    /// ```
    pub fn new() -> Reassembler {
        Reassembler::default()
    }

    /// Creates a new reassembler with the given chunk order.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::{Order, Reassembler};
    /// let reassembler = Reassembler::with_order(Order::Arrival);
    /// ```
    pub fn with_order(order: Order) -> Reassembler {
        Reassembler {
            order: order,
            ..Default::default()
        }
    }

    /// Starts a new image.
    ///
    /// If an image is already open it is discarded and handed back, so its chunks are dropped
    /// along with it unless the caller keeps it.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::Reassembler;
    /// let mut reassembler = Reassembler::new();
    /// assert!(reassembler.open(1).is_none());
    /// reassembler.accept(1, "a");
    /// let discarded = reassembler.open(2).unwrap();
    /// assert_eq!(1, discarded.index());
    /// assert_eq!(1, discarded.len());
    /// assert_eq!(Some(2), reassembler.index());
    /// ```
    pub fn open(&mut self, index: u32) -> Option<ImageAssembly> {
        let discarded = self.assembly.replace(ImageAssembly::new(index));
        if let Some(assembly) = discarded {
            warn!(
                "image {} discarded with {} chunk(s) when image {} started",
                assembly.index,
                assembly.len(),
                index
            );
            Some(assembly)
        } else {
            None
        }
    }

    /// Adds a chunk to the open image.
    ///
    /// Returns false, and drops the chunk, if no image is open.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::Reassembler;
    /// let mut reassembler = Reassembler::new();
    /// assert!(!reassembler.accept(1, "a"));
    /// reassembler.open(1);
    /// assert!(reassembler.accept(1, "a"));
    /// ```
    pub fn accept<S: Into<String>>(&mut self, tag: u32, content: S) -> bool {
        if let Some(assembly) = self.assembly.as_mut() {
            assembly.push(tag, content);
            true
        } else {
            false
        }
    }

    /// Closes the open image and returns it, or returns `None` if no image is open.
    ///
    /// An image with no chunks is returned with empty data.
    ///
    /// # Examples
    ///
    /// ```
    /// use payload::Reassembler;
    /// let mut reassembler = Reassembler::new();
    /// assert_eq!(None, reassembler.close());
    /// reassembler.open(3);
    /// assert!(reassembler.close().unwrap().data.is_empty());
    /// assert!(!reassembler.is_open());
    /// ```
    pub fn close(&mut self) -> Option<Image> {
        let order = self.order;
        self.assembly
            .take()
            .map(|assembly| assembly.into_image(order))
    }

    /// Returns true if an image is open.
    pub fn is_open(&self) -> bool {
        self.assembly.is_some()
    }

    /// Returns the index of the open image, if there is one.
    pub fn index(&self) -> Option<u32> {
        self.assembly.as_ref().map(|assembly| assembly.index)
    }

    /// Returns this reassembler's chunk order.
    pub fn order(&self) -> Order {
        self.order
    }
}
