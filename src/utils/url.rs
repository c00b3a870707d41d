//! URL utilities for building completion endpoints
//!
//! Base URLs come from user configuration, so they may or may not carry a
//! trailing slash. These helpers keep the final endpoint free of double slashes.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use prodev::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.example.com/v1beta/"), "https://api.example.com/v1beta");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct the `generateContent` endpoint for a model
///
/// A leading `models/` on the model name is accepted, since the provider
/// lists models with that prefix.
///
/// # Examples
///
/// ```
/// use prodev::utils::url::generate_content_url;
///
/// assert_eq!(
///     generate_content_url("https://api.example.com/v1beta/", "gemini-1.5-flash"),
///     "https://api.example.com/v1beta/models/gemini-1.5-flash:generateContent"
/// );
/// ```
pub fn generate_content_url(base_url: &str, model: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let model = model.trim_matches('/');
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!("{normalized_base}/models/{model}:generateContent")
}
