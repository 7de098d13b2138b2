//! Filesystem storage for complex observation payloads.
//!
//! Clinical observations sometimes carry values that are not scalars: a wound
//! photo, a scanned consent form, an X-ray export. This crate persists such
//! image payloads as plain files on a configured directory and records a
//! pointer of the form `"png image |42.png"` on the observation, from which
//! the payload can be fetched back into memory later. Output filenames derive
//! from the observation id and are allocated create-exclusive, so concurrent
//! saves can never overwrite each other.
//!
//! Saving is fail-fast: the pointer is only updated once the bytes are fully
//! on storage. Fetching is fail-soft: unreadable files are logged and yield a
//! payload without content instead of an error.
//!
//! # Example
//!
//! ```no_run
//! use obs_filestore::config::AppConfig;
//! use obs_filestore::handler::{ComplexObsHandler, ImageHandler, RAW_VIEW};
//! use obs_filestore::obs::{ComplexData, Obs};
//! use obs_filestore::storage::FileStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::new()?;
//! let store = FileStore::from_config(&config.storage)?;
//! let handler = ImageHandler::new(store);
//!
//! let mut obs = Obs::new(42);
//! obs.complex_data = Some(ComplexData::image(
//! 	"photo.png",
//! 	image::DynamicImage::new_rgb8(640, 480),
//! ));
//! handler.save(&mut obs)?;
//! assert!(obs.value_complex.is_some());
//!
//! handler.fetch(&mut obs, RAW_VIEW);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod handler;
pub mod obs;
pub mod storage;

pub use handler::registry::{HandlerRegistry, LOWEST_PRIORITY};
pub use handler::{ComplexObsHandler, ImageHandler, SaveError, RAW_VIEW};
pub use obs::{ComplexContent, ComplexData, ComplexValue, Obs, ObsId};
pub use storage::{FileStore, Removal, StorageError};
