//! Provisioned-host guard.
//!
//! The launcher must never run on an instance it (or a sibling launch)
//! created: the boot script would be inherited and the fleet would fork
//! itself. The cloud metadata server is the platform identity marker; it
//! answers with a `Metadata-Flavor: Google` header only on provisioned
//! instances.

use std::time::Duration;

use tracing::debug;

/// Metadata server probed for the platform identity marker.
pub const METADATA_URL: &str = "http://metadata.google.internal";

/// Probe timeout; off-platform hosts have no route to the metadata server
/// and should not stall the launch.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Response header that marks a provisioned instance.
const MARKER_HEADER: &str = "Metadata-Flavor";
const MARKER_VALUE: &str = "Google";

/// True when this process is running on a provisioned cloud instance.
///
/// Probe failures (no route, timeout) mean "not provisioned": the guard
/// exists to stop recursive fleet creation, not to gate ordinary runs.
pub async fn is_provisioned_host(base_url: &str) -> bool {
    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(_) => return false,
    };

    match client
        .get(base_url)
        .header(MARKER_HEADER, MARKER_VALUE)
        .send()
        .await
    {
        Ok(response) => response
            .headers()
            .get(MARKER_HEADER)
            .map(|value| value == MARKER_VALUE)
            .unwrap_or(false),
        Err(e) => {
            debug!(error = %e, "metadata probe failed, assuming unprovisioned host");
            false
        }
    }
}
