//! Stop command - terminate a process and show the services left running.

use anyhow::Result;
use devport_core::{Config, StopOutcome, SystemServiceManager};
use serde_json::json;

use super::list::print_table;

pub async fn run(config: &Config, pid: u32, json: bool) -> Result<()> {
    let manager = SystemServiceManager::system(config);
    let outcome = manager.stop_service(pid).await?;

    // Give the OS a moment to release the port before listing again
    tokio::time::sleep(manager.timings().port_release_delay).await;
    let services = manager.list_services().await?;

    if json {
        let report = json!({
            "pid": pid,
            "outcome": outcome,
            "services": services,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match outcome {
            StopOutcome::Exited => println!("Stopped process {}", pid),
            StopOutcome::ForceKilled => println!("Force-killed process {} (ignored SIGTERM)", pid),
        }
        println!();
        print_table(&services);
    }
    Ok(())
}
