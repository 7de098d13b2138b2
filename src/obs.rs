//! Observation records and their in-memory payloads.
//!
//! Only the slice of the host object model that storage handlers touch is
//! modeled here: the numeric record identifier, the persisted pointer field
//! and the transient payload attached to it.

use bytes::Bytes;
use image::DynamicImage;
use std::fmt::{Display, Formatter};

/// Unique identifier of an observation record, assigned by the host platform.
pub type ObsId = u64;

/// A clinical observation whose value is binary data kept outside the record.
#[derive(Debug, Clone)]
pub struct Obs {
	pub id: ObsId,
	/// Pointer to the stored payload, set once the observation is saved.
	pub value_complex: Option<ComplexValue>,
	/// In-memory payload. Present between construction and save, or after a
	/// fetch; never present together with freshly persisted data.
	pub complex_data: Option<ComplexData>,
}

impl Obs {
	pub fn new(id: ObsId) -> Self {
		Self {
			id,
			value_complex: None,
			complex_data: None,
		}
	}
}

/// In-memory payload attached to an observation.
#[derive(Debug, Clone)]
pub struct ComplexData {
	/// Free-text title. Its extension decides the stored format.
	pub title: String,
	/// Binary content. `None` marks the degraded result of a fetch that could
	/// not decode the stored file.
	pub content: Option<ComplexContent>,
}

impl ComplexData {
	/// Payload holding an already decoded image.
	pub fn image(title: impl Into<String>, image: DynamicImage) -> Self {
		Self {
			title: title.into(),
			content: Some(ComplexContent::Image(image)),
		}
	}

	/// Payload holding bytes that have not been decoded yet.
	pub fn bytes(title: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
		Self {
			title: title.into(),
			content: Some(ComplexContent::Bytes(bytes.into())),
		}
	}

	/// Payload without content, as attached when a stored file cannot be read.
	pub fn missing(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			content: None,
		}
	}

	/// The decoded image, if this payload carries one.
	pub fn as_image(&self) -> Option<&DynamicImage> {
		match &self.content {
			Some(ComplexContent::Image(image)) => Some(image),
			_ => None,
		}
	}

	/// Whether this payload carries no content at all.
	pub fn is_missing(&self) -> bool {
		self.content.is_none()
	}
}

/// Binary content of a payload.
#[derive(Debug, Clone)]
pub enum ComplexContent {
	/// A decoded raster image.
	Image(DynamicImage),
	/// An undecoded byte stream, e.g. an upload that was never parsed.
	Bytes(Bytes),
}

/// Pointer recorded on an observation once its payload is on storage.
///
/// The stored form is `"{extension} image |{filename}"`, with a literal
/// `" image |"` between the two parts and no escaping. The extension repeats
/// the filename suffix; both come from the single format decision made at
/// save time. Values read back from the database may predate this crate and
/// carry no separator at all, in which case the whole value is the filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComplexValue(String);

impl ComplexValue {
	/// Pointer for an image payload stored under `filename`.
	pub fn image(extension: &str, filename: &str) -> Self {
		Self(format!("{extension} image |{filename}"))
	}

	/// The exact stored form.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The filename component: everything after the last `|`, or the whole
	/// value for legacy pointers without a separator.
	pub fn filename(&self) -> &str {
		self.0
			.rsplit_once('|')
			.map_or(self.0.as_str(), |(_, name)| name)
	}
}

impl Display for ComplexValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<String> for ComplexValue {
	fn from(raw: String) -> Self {
		Self(raw)
	}
}

impl From<&str> for ComplexValue {
	fn from(raw: &str) -> Self {
		Self(raw.to_owned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pointer_keeps_exact_stored_form() {
		let pointer = ComplexValue::image("png", "42.png");
		assert_eq!(pointer.as_str(), "png image |42.png");
		assert_eq!(pointer.to_string(), "png image |42.png");
		assert_eq!(pointer.filename(), "42.png");
	}

	#[test]
	fn pointer_filename_tolerates_legacy_values() {
		// Values written before the "<extension> image |" convention hold the
		// bare filename.
		let legacy = ComplexValue::from("wound-photo.jpeg");
		assert_eq!(legacy.filename(), "wound-photo.jpeg");

		let nested = ComplexValue::from("some|odd|42_3.png");
		assert_eq!(nested.filename(), "42_3.png");
	}

	#[test]
	fn payload_constructors_cover_all_shapes() {
		let decoded = ComplexData::image("photo.png", DynamicImage::new_rgb8(2, 2));
		assert!(decoded.as_image().is_some());
		assert!(!decoded.is_missing());

		let raw = ComplexData::bytes("photo.png", vec![0_u8, 1, 2]);
		assert!(raw.as_image().is_none());
		assert!(!raw.is_missing());

		let degraded = ComplexData::missing("photo.png");
		assert!(degraded.is_missing());
		assert_eq!(degraded.title, "photo.png");
	}
}
