//! OAuth callback URL handling.
//!
//! After the external login flow, the issuer redirects the browser to
//! `…/auth/callback?token=<jwt>`. The terminal client accepts that URL
//! pasted verbatim and pulls the token out of the query string.

/// Extract the `token` query parameter from an OAuth callback URL.
///
/// Returns `None` when the input has no query string or no non-empty
/// `token` parameter. The value is percent-decoded.
pub fn token_from_callback_url(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split_once('#').map_or(query, |(q, _)| q);

    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if key == "token" && !value.is_empty() {
            return urlencoding::decode(value).ok().map(|v| v.into_owned());
        }
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
