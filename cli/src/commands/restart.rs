//! Restart command - stop a process, relaunch its command line, show services.

use anyhow::Result;
use devport_core::{Config, SystemServiceManager};

use super::list::print_table;

pub async fn run(config: &Config, pid: u32, json: bool) -> Result<()> {
    let manager = SystemServiceManager::system(config);
    let outcome = manager.restart_service(pid).await?;
    let services = manager.list_services().await?;

    if json {
        let report = serde_json::json!({
            "restart": outcome,
            "services": services,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Restarted process {}: {}", outcome.pid, outcome.command);
        println!();
        print_table(&services);
    }
    Ok(())
}
