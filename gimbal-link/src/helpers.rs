use crate::models::errors::LinkError;

const ENDPOINT_SCHEME: &str = "ws";
const ENDPOINT_PATH: &str = "/ws";

/// Builds the gimbal endpoint URL from a caller-supplied host.
///
/// The gimbal firmware serves its socket at `/ws`, so a host like
/// `192.168.4.1` becomes `ws://192.168.4.1/ws`. Hosts that are empty after
/// trimming whitespace are rejected before any connection attempt.
pub fn endpoint_url(host: &str) -> Result<String, LinkError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(LinkError::InvalidHost("Invalid host address".to_string()));
    }
    Ok(format!("{ENDPOINT_SCHEME}://{host}{ENDPOINT_PATH}"))
}
