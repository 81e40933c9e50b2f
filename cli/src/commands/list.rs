//! List command - show services on development ports.

use anyhow::Result;
use devport_core::{Config, Service, SystemServiceManager};

pub async fn run(
    config: &Config,
    port_filter: Option<u16>,
    name_filter: Option<String>,
    json: bool,
) -> Result<()> {
    let manager = SystemServiceManager::system(config);
    let mut services = manager.list_services().await?;

    // Apply filters
    if let Some(p) = port_filter {
        services.retain(|service| service.port == p);
    }
    if let Some(ref name) = name_filter {
        services.retain(|service| service.matches_name(name));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&services)?);
    } else {
        print_table(&services);
    }
    Ok(())
}

/// Print services as a table.
pub fn print_table(services: &[Service]) {
    if services.is_empty() {
        println!("No services listening on development ports.");
        return;
    }

    println!(
        "{:<6} {:<8} {:<20} ADDRESS",
        "PORT", "PID", "PROCESS"
    );
    println!("{}", "-".repeat(60));

    for service in services {
        println!(
            "{:<6} {:<8} {:<20} {}",
            service.port,
            service.pid,
            truncate(&service.name, 20),
            service.address
        );
    }

    println!("\nTotal: {} services", services.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max - 1).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("node", 20), "node");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ééééé", 5), "ééééé");
        assert_eq!(truncate("éééééé", 5), "éééé…");
    }
}
