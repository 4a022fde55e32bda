use centai_core::GenerationResult;
use serde_json::Value;
use url::Url;

use crate::error::{GenerationError, Result};

/// Reduce a provider payload to a single image reference
///
/// Known envelopes, checked in this order:
/// - `{"images": [{"url": ...}, ...]}`: the first element's `url`
/// - `{"image": "https://..."}`
/// - `{"image": {"url": ...}}`
///
/// A non-null `images` field decides the outcome on its own; the `image`
/// field is only consulted when `images` is absent.
///
/// # Errors
///
/// Returns [`GenerationError::UnrecognizedResponseShape`] carrying the raw
/// payload when it matches none of the known envelopes, when the image list
/// is empty or its first element has no `url`, or when the extracted locator
/// is not an absolute URL.
pub fn normalize(raw: Value) -> Result<GenerationResult> {
    let url = locator(&raw).map(Url::parse);

    match url {
        Some(Ok(url)) => Ok(GenerationResult::new(url)),
        _ => Err(GenerationError::UnrecognizedResponseShape { payload: raw }),
    }
}

fn locator(raw: &Value) -> Option<&str> {
    let fields = raw.as_object()?;

    if let Some(images) = fields.get("images").filter(|images| !images.is_null()) {
        return images.as_array()?.first()?.get("url")?.as_str();
    }

    match fields.get("image")? {
        Value::String(url) => Some(url),
        image => image.get("url")?.as_str(),
    }
}
