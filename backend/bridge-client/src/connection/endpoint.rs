use crate::error::link::LinkError;
use crate::{INSECURE_SCHEME_PREFIX, SECURE_SCHEME_PREFIX};

use log::info;
use url::Url;

/// Validate a user-supplied bridge URL and apply the secure-origin upgrade.
///
/// When `secure_origin` is set, a `ws://` target is rewritten to `wss://`; a
/// secure context must not open an insecure subordinate channel. The URL is
/// otherwise returned as typed (trimmed), without normalisation.
///
/// # Errors
///
/// Returns [`LinkError::InvalidArgument`] if the URL is empty, unparsable, or
/// does not start with `ws://`/`wss://`. No transport is attempted in that case.
pub fn resolve_url(raw: &str, secure_origin: bool) -> Result<String, LinkError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LinkError::invalid_argument(
            "Please enter the bridge IP or URL first",
        ));
    }

    check_websocket_url(trimmed).map_err(|reason| LinkError::invalid_argument(reason))?;

    if secure_origin && has_prefix(trimmed, INSECURE_SCHEME_PREFIX) {
        if let Some(rest) = trimmed.get(INSECURE_SCHEME_PREFIX.len()..) {
            let upgraded = format!("{SECURE_SCHEME_PREFIX}{rest}");
            info!("Secure origin: upgrading {trimmed} to {upgraded}");
            return Ok(upgraded);
        }
    }

    Ok(trimmed.to_string())
}

/// The one scheme check shared by connect and config validation.
///
/// The literal `ws://` or `wss://` prefix is required (any case). `Url::parse`
/// alone also accepts `ws:host` and `ws:/host`, which would make a prefix
/// rewrite land on the wrong host.
pub(crate) fn check_websocket_url(url: &str) -> Result<(), String> {
    if !has_prefix(url, INSECURE_SCHEME_PREFIX) && !has_prefix(url, SECURE_SCHEME_PREFIX) {
        return Err(format!(
            "Bridge URL must start with ws:// or wss://, got '{url}'"
        ));
    }

    Url::parse(url)
        .map(|_| ())
        .map_err(|e| format!("Invalid bridge URL '{url}': {e}"))
}

fn has_prefix(url: &str, prefix: &str) -> bool {
    url.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
