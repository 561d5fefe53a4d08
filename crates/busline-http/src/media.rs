//! JSON-family media type matching

/// Media type written by the provider
pub const APPLICATION_JSON: &str = "application/json";

/// Whether a media type is `application/json` or `application/*+json`
///
/// Parameters such as `charset` are ignored and matching is case-insensitive.
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };
    if !kind.trim().eq_ignore_ascii_case("application") {
        return false;
    }
    let subtype = subtype.trim().to_ascii_lowercase();
    subtype == "json" || (subtype.len() > "+json".len() && subtype.ends_with("+json"))
}
