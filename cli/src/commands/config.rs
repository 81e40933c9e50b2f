//! Config command - show or initialise the configuration file.

use anyhow::{bail, Result};
use devport_core::{Config, ConfigStore};

pub async fn show(store: &ConfigStore, json: bool) -> Result<()> {
    let config = store.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let ranges: Vec<String> = config.port_ranges.iter().map(|r| r.to_string()).collect();
    println!("Config file:        {}", store.path().display());
    println!("Port ranges:        {}", ranges.join(", "));
    println!("Stop timeout:       {} ms", config.stop_timeout_ms);
    println!("Port release delay: {} ms", config.port_release_delay_ms);
    println!("Relaunch settle:    {} ms", config.relaunch_settle_ms);
    println!("Shell:              {}", config.shell);
    Ok(())
}

pub async fn init(store: &ConfigStore, force: bool) -> Result<()> {
    if store.path().exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            store.path().display()
        );
    }

    store.save(&Config::default()).await?;
    println!("Wrote default configuration to {}", store.path().display());
    Ok(())
}
