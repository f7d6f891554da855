use std::sync::OnceLock;

use regex::Regex;

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Format seconds as `m:ss`; minutes are not wrapped into hours
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Extract the suggested filename from a `Content-Disposition` header value.
///
/// Prefers the RFC 5987 `filename*=UTF-8''...` form and falls back to a plain
/// `filename="..."` parameter.
pub fn content_disposition_filename(header: &str) -> Option<String> {
    static EXTENDED: OnceLock<Option<Regex>> = OnceLock::new();
    static PLAIN: OnceLock<Option<Regex>> = OnceLock::new();

    let extended = EXTENDED
        .get_or_init(|| Regex::new(r"(?i)filename\*\s*=\s*UTF-8''([^;\s]+)").ok())
        .as_ref()?;
    if let Some(caps) = extended.captures(header) {
        let decoded = percent_decode(&caps[1]);
        if !decoded.trim().is_empty() {
            return Some(decoded);
        }
    }

    let plain = PLAIN
        .get_or_init(|| Regex::new(r#"(?i)filename\s*=\s*"?([^";]+)"?"#).ok())
        .as_ref()?;
    plain
        .captures(header)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

fn percent_decode(value: &str) -> String {
    // form_urlencoded also maps '+' to a space; escape it first so it survives
    let escaped = value.replace('+', "%2B");
    url::form_urlencoded::parse(format!("v={}", escaped).as_bytes())
        .next()
        .map(|(_, decoded)| decoded.into_owned())
        .unwrap_or_else(|| value.to_string())
}
