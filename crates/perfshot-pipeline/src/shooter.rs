//! The shot loop: load generation against the ammunition pool.
//!
//! Responses are never read. The loop exists to put CPU load on the
//! server while the profiler samples it, not to validate anything.

use crate::ammo::{AmmoSelector, Ammunition};
use crate::config::RunConfig;
use perfshot_common::HarnessResult;
use perfshot_process::{self as process, CommandSpec, OutputSink};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Fire the configured number of shots and return how many were issued.
///
/// Each shot picks a URL from the seeded selector, launches the HTTP
/// client against it, sleeps the cooldown, then waits for and terminates
/// the client. A client that fails to launch is logged and still counts
/// as a fired shot; the cooldown applies either way so the pacing lower
/// bound holds.
pub async fn fire_all(config: &RunConfig) -> HarnessResult<u32> {
    let ammo = Ammunition::new(config.ammunition.clone());
    let mut selector = AmmoSelector::new(config.seed, config.random_limit, ammo.len());

    let mut fired = 0;
    for shot in 0..config.shot_count {
        let url = ammo.get(selector.next_index());
        debug!("Shot {}/{}: {}", shot + 1, config.shot_count, url);
        fire_one(&config.http_client, url, config.cooldown).await;
        fired += 1;
    }

    info!("Shooting complete");
    Ok(fired)
}

async fn fire_one(client: &str, url: &str, cooldown: Duration) {
    let spec = CommandSpec::new(client).arg(url);
    match process::spawn(&spec, OutputSink::Discard) {
        Ok(mut hit) => {
            sleep(cooldown).await;
            if let Err(e) = hit.wait().await {
                warn!("Failed to wait for shot at {}: {}", url, e);
            }
            if let Err(e) = hit.terminate() {
                warn!("Failed to terminate shot at {}: {}", url, e);
            }
        }
        Err(e) => {
            warn!("Failed to launch shot at {}: {}", url, e);
            sleep(cooldown).await;
        }
    }
}
