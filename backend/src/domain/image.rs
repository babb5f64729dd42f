//! Base64 image payloads embedded in JSON request bodies.
//!
//! Clients send images as data URIs, `data:image/png;base64,<payload>`. The
//! domain decodes them up front so malformed uploads fail validation before
//! any storage is touched.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Largest decoded image accepted, in bytes.
pub const IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Validation errors for image payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageValidationError {
    /// The value is not a `data:<mime>;base64,<payload>` URI.
    NotDataUri,
    /// The media type is not an `image/*` type with a simple subtype.
    UnsupportedType,
    /// The payload is not valid base64.
    InvalidBase64,
    /// The payload decoded to zero bytes.
    Empty,
    /// The decoded payload exceeds [`IMAGE_MAX_BYTES`].
    TooLarge {
        /// Maximum accepted size in bytes.
        max: usize,
    },
}

impl ImageValidationError {
    /// Machine-readable validation code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotDataUri => "not_data_uri",
            Self::UnsupportedType => "unsupported_image_type",
            Self::InvalidBase64 => "invalid_base64",
            Self::Empty => "empty_image",
            Self::TooLarge { .. } => "image_too_large",
        }
    }
}

impl fmt::Display for ImageValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDataUri => write!(f, "image must be a base64 data URI"),
            Self::UnsupportedType => write!(f, "image must use an image/* media type"),
            Self::InvalidBase64 => write!(f, "image payload is not valid base64"),
            Self::Empty => write!(f, "image payload must not be empty"),
            Self::TooLarge { max } => write!(f, "image must be at most {max} bytes"),
        }
    }
}

impl std::error::Error for ImageValidationError {}

/// Decoded image ready to be written to media storage.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    extension: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Decode a data URI.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::ImageUpload;
    ///
    /// let image = ImageUpload::from_data_uri("data:image/png;base64,iVBORw0KGgo=")
    ///     .expect("valid data uri");
    /// assert_eq!(image.extension(), "png");
    /// assert_eq!(image.bytes().len(), 8);
    /// ```
    pub fn from_data_uri(raw: &str) -> Result<Self, ImageValidationError> {
        let rest = raw
            .trim()
            .strip_prefix(DATA_PREFIX)
            .ok_or(ImageValidationError::NotDataUri)?;
        let (media_type, payload) = rest
            .split_once(BASE64_MARKER)
            .ok_or(ImageValidationError::NotDataUri)?;
        let extension = extension_for(media_type)?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| ImageValidationError::InvalidBase64)?;
        if bytes.is_empty() {
            return Err(ImageValidationError::Empty);
        }
        if bytes.len() > IMAGE_MAX_BYTES {
            return Err(ImageValidationError::TooLarge {
                max: IMAGE_MAX_BYTES,
            });
        }
        Ok(Self { extension, bytes })
    }

    /// File extension derived from the media subtype.
    pub fn extension(&self) -> &str {
        self.extension.as_str()
    }

    /// Decoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("extension", &self.extension)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn extension_for(media_type: &str) -> Result<String, ImageValidationError> {
    let subtype = media_type
        .trim()
        .to_ascii_lowercase()
        .strip_prefix("image/")
        .map(str::to_owned)
        .ok_or(ImageValidationError::UnsupportedType)?;
    let simple = !subtype.is_empty()
        && subtype.len() <= 10
        && subtype.chars().all(|c| c.is_ascii_alphanumeric());
    if !simple {
        return Err(ImageValidationError::UnsupportedType);
    }
    Ok(match subtype.as_str() {
        "jpeg" => "jpg".to_owned(),
        _ => subtype,
    })
}
