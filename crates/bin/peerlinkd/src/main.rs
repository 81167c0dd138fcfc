//! # peerlinkd
//!
//! peerlink daemon.
//!
//! Composition root that wires the rules to a virtual host and runs them.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialise `tracing`
//! - Populate the virtual host registry
//! - Build the rule engine from the configured definitions
//! - Feed operator commands from stdin into the host
//! - Dispatch every published state change to the subscribed rules
//! - Stop on `quit`, on Ctrl-C, or once stdin is closed and nothing is pending
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no rule logic belongs here.

mod command;
mod config;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use peerlink_adapter_virtual::VirtualHost;
use peerlink_app::event_bus::InProcessEventBus;
use peerlink_app::rule_engine::RuleEngine;

use command::Command;
use config::Config;

type SimHost = VirtualHost<InProcessEventBus>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Host
    let bus = InProcessEventBus::new(config.bus.capacity);
    let host: SimHost = VirtualHost::with_log_capacity(bus.clone(), config.logging.history);
    for (name, state) in &config.registry.devices {
        host.add_device(name.clone(), state.clone())?;
    }
    for (name, state) in &config.registry.groups {
        host.add_group(name.clone(), state.clone())?;
    }

    // Rules
    let engine = RuleEngine::from_definitions(&config.rules)?;
    for (rule, name) in config.unknown_references() {
        tracing::warn!(%rule, device = %name, "rule references an unknown device or group");
    }
    tracing::info!(
        rules = engine.rules().len(),
        devices = config.registry.devices.len(),
        groups = config.registry.groups.len(),
        "peerlinkd ready"
    );

    run(&engine, &host, &bus).await
}

async fn run(engine: &RuleEngine, host: &SimHost, bus: &InProcessEventBus) -> anyhow::Result<()> {
    let mut changes = bus.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line.context("reading stdin")? {
                    Some(line) => {
                        if !execute(host, &line)? {
                            break;
                        }
                    }
                    None => stdin_open = false,
                }
            }
            change = changes.recv() => match change {
                Ok(change) => {
                    engine.process_change(host, &change);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "change bus lagged, some changes were not dispatched");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }

        if !stdin_open && changes.is_empty() && host.pending_timers() == 0 {
            break;
        }
    }

    tracing::info!("peerlinkd stopped");
    Ok(())
}

/// Run one operator command. Returns `false` when the loop should stop.
fn execute(host: &SimHost, line: &str) -> anyhow::Result<bool> {
    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(err) => {
            tracing::warn!(%err, "ignoring command");
            return Ok(true);
        }
    };

    match command {
        Command::Switch { device, state } => {
            if let Err(err) = host.switch(device, state) {
                tracing::warn!(%err, "ignoring command");
            }
        }
        Command::Dump => println!("{}", serde_json::to_string_pretty(&host.records())?),
        Command::Logs => println!("{}", serde_json::to_string_pretty(&host.logs())?),
        Command::Quit => return Ok(false),
        Command::Nothing => {}
    }
    Ok(true)
}
