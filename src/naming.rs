//! Storage key and content type derivation from a logo's source URL.

use url::Url;

/// Extension used when the source URL's path has none.
const DEFAULT_EXTENSION: &str = ".png";

/// Content type used for unknown or missing extensions.
const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// Lowercased extension (with leading dot) of the last path segment of `url`.
///
/// Query strings and fragments are ignored. Returns `None` when the last
/// segment has no extension, including names like `logo.` or `.hidden`.
#[must_use]
pub fn url_extension(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        // Not an absolute URL; strip query and fragment by hand.
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    let file_name = path.rsplit('/').next().unwrap_or_default();
    let dot = file_name.rfind('.')?;
    if dot == 0 || dot + 1 == file_name.len() {
        return None;
    }

    Some(file_name[dot..].to_lowercase())
}

/// Storage key for an organization's logo: `{image_slug}{extension}`.
///
/// The key doubles as the local file name; there is no directory prefix.
#[must_use]
pub fn storage_key(image_slug: &str, source_url: &str) -> String {
    let ext = url_extension(source_url).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    format!("{image_slug}{ext}")
}

/// MIME type to store the logo under, from the source URL's extension.
#[must_use]
pub fn content_type(source_url: &str) -> &'static str {
    match url_extension(source_url).as_deref() {
        Some(".png") => "image/png",
        Some(".jpg" | ".jpeg") => "image/jpeg",
        Some(".gif") => "image/gif",
        Some(".svg") => "image/svg+xml",
        Some(".webp") => "image/webp",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
