//! Filesystem handler for image payloads.
//!
//! Images are written to the configured complex-observation directory under
//! `{obs id}.{extension}` (with a numeric disambiguator when that name is
//! taken) and the observation's pointer is set to
//! `"{extension} image |{filename}"`. The output format follows the payload
//! title's extension; the codec decides whether it can actually encode it.

use crate::handler::{ComplexObsHandler, SaveError};
use crate::obs::{ComplexContent, ComplexData, ComplexValue, Obs};
use crate::storage::{extension_from_title, FileStore, Removal};
use image::{DynamicImage, ImageError, ImageFormat};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, Write};
use tracing::{error, instrument, warn};

/// Routing tag recorded for observations stored by this handler.
pub const HANDLER_TYPE: &str = "ImageHandler";

/// Stores image payloads as plain files on the configured directory.
pub struct ImageHandler {
	store: FileStore,
	/// Extensions the codec can encode, cached at construction. Consulted for
	/// logging only; saves are never rejected against this set.
	writable_extensions: HashSet<String>,
}

impl ImageHandler {
	pub fn new(store: FileStore) -> Self {
		let writable_extensions = ImageFormat::all()
			.filter(|format| format.writing_enabled())
			.flat_map(|format| format.extensions_str())
			.map(|extension| (*extension).to_owned())
			.collect();
		Self {
			store,
			writable_extensions,
		}
	}
}

impl ComplexObsHandler for ImageHandler {
	#[instrument(skip_all, fields(obs.id = obs.id))]
	fn save(&self, obs: &mut Obs) -> Result<(), SaveError> {
		let data = obs
			.complex_data
			.as_ref()
			.ok_or(SaveError::MissingData { id: obs.id })?;

		let image: Cow<'_, DynamicImage> = match &data.content {
			Some(ComplexContent::Image(image)) => Cow::Borrowed(image),
			Some(ComplexContent::Bytes(bytes)) => {
				let decoded = image::load_from_memory(bytes).map_err(|source| {
					SaveError::Conversion { id: obs.id, source }
				})?;
				Cow::Owned(decoded)
			}
			None => return Err(SaveError::MissingData { id: obs.id }),
		};

		let extension = extension_from_title(&data.title);
		if !self.writable_extensions.contains(&extension) {
			warn!(extension = %extension, "Payload extension is not in the codec's writable set");
		}
		let Some(format) = ImageFormat::from_extension(&extension) else {
			return Err(SaveError::UnknownFormat { id: obs.id, extension });
		};

		let output = self.store.reserve_output_file(&obs.id.to_string(), &extension)?;
		let mut writer = BufWriter::new(output.file);
		let written = image
			.write_to(&mut writer, format)
			.and_then(|()| writer.flush().map_err(ImageError::from));
		if let Err(source) = written {
			// Remove the reserved file so no empty artifact outlives a failed
			// save; the pointer below is only ever set over complete bytes.
			let _ = fs::remove_file(&output.path);
			return Err(SaveError::Write {
				id: obs.id,
				path: output.path,
				source,
			});
		}

		obs.value_complex = Some(ComplexValue::image(&extension, &output.name));
		obs.complex_data = None;
		Ok(())
	}

	/// Supports every view; all views currently receive the same payload.
	#[instrument(skip_all, fields(obs.id = obs.id))]
	fn fetch(&self, obs: &mut Obs, _view: &str) {
		let Some(pointer) = &obs.value_complex else {
			warn!("Observation has no complex value pointer; nothing to fetch");
			return;
		};
		let filename = pointer.filename().to_owned();
		let path = self.store.data_file(&filename);

		match image::open(&path) {
			Ok(image) => obs.complex_data = Some(ComplexData::image(filename, image)),
			Err(err) => {
				error!(path = %path.display(), "Failed to read complex obs file: {err}");
				obs.complex_data = Some(ComplexData::missing(filename));
			}
		}
	}

	fn purge(&self, obs: &mut Obs) -> bool {
		let Some(pointer) = &obs.value_complex else {
			return true;
		};
		let filename = pointer.filename().to_owned();
		match self.store.remove_data_file(&filename) {
			Removal::Removed => {
				obs.complex_data = None;
				true
			}
			Removal::NotFound => true,
			Removal::Failed => false,
		}
	}

	fn handler_type(&self) -> &'static str {
		HANDLER_TYPE
	}

	/// No policy validation is performed; every configuration is accepted.
	fn validate(&self, _handler_config: &str, _obs: &Obs) -> bool {
		true
	}

	/// Returning the persisted value without attaching it is not implemented;
	/// always `None`, so callers fall back to [`ComplexObsHandler::fetch`].
	fn raw_value(&self, _obs: &Obs) -> Option<ComplexContent> {
		None
	}
}
