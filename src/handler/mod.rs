//! Handler seam between the host platform and storage adapters.
//!
//! The host keeps one handler per payload kind and routes an observation to
//! the handler whose tag matches the one recorded when the payload was saved.
//! Handlers are synchronous: every operation is a single blocking call
//! against the filesystem and the codec.

pub mod image;
pub mod registry;

pub use self::image::ImageHandler;
pub use self::registry::HandlerRegistry;

use crate::obs::{ComplexContent, Obs, ObsId};
use crate::storage::StorageError;
use ::image::ImageError;
use std::path::PathBuf;
use thiserror::Error;

/// View requesting the payload exactly as stored. Further views (previews,
/// thumbnails) may be introduced by individual handlers.
pub const RAW_VIEW: &str = "RAW_VIEW";

/// A storage adapter for one kind of complex observation payload.
///
/// The two data paths are deliberately asymmetric: [`save`] fails fast and
/// never updates the pointer unless the payload is fully on storage, while
/// [`fetch`] never fails and degrades to a payload without content when the
/// stored file cannot be read.
///
/// [`save`]: ComplexObsHandler::save
/// [`fetch`]: ComplexObsHandler::fetch
pub trait ComplexObsHandler: Send + Sync {
	/// Persists the attached payload and records the pointer on the
	/// observation. On success the in-memory payload is detached; on failure
	/// the observation is left exactly as it was.
	fn save(&self, obs: &mut Obs) -> Result<(), SaveError>;

	/// Attaches the stored payload to the observation. Read or decode
	/// problems are logged and yield a payload without content, so callers
	/// must check for that degraded shape themselves.
	fn fetch(&self, obs: &mut Obs, view: &str);

	/// Removes the stored payload file. Returns `true` once the file is gone,
	/// including when it never existed; an actual delete also detaches the
	/// in-memory payload.
	fn purge(&self, obs: &mut Obs) -> bool;

	/// Fixed tag under which the host registry routes observations to this
	/// handler.
	fn handler_type(&self) -> &'static str;

	/// Policy hook run before a save is accepted for this handler.
	fn validate(&self, handler_config: &str, obs: &Obs) -> bool;

	/// Returns the persisted value without attaching it to the observation.
	fn raw_value(&self, obs: &Obs) -> Option<ComplexContent>;
}

/// Failure modes of [`ComplexObsHandler::save`].
///
/// Every variant leaves the observation untouched: the pointer keeps its
/// previous value and the payload stays attached.
#[derive(Debug, Error)]
pub enum SaveError {
	/// The attached byte stream could not be decoded into an image.
	#[error("complex data for obs {id} is not a readable image: {source}")]
	Conversion {
		id: ObsId,
		#[source]
		source: ImageError,
	},

	/// The observation has no payload, or the payload carries no content.
	#[error("cannot save complex obs {id}: no complex data content attached")]
	MissingData { id: ObsId },

	/// The title's extension names a format the codec cannot encode.
	#[error("cannot save complex obs {id}: no encoder for `.{extension}` files")]
	UnknownFormat { id: ObsId, extension: String },

	/// The storage directory rejected the output file.
	#[error(transparent)]
	Storage(#[from] StorageError),

	/// Encoding into the reserved output file failed.
	#[error("failed to write complex obs {id} to {}: {source}", path.display())]
	Write {
		id: ObsId,
		path: PathBuf,
		#[source]
		source: ImageError,
	},
}
