/*
 * This file is part of Pidfan.
 *
 * Copyright (C) 2026 Pidfan contributors
 *
 * Pidfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Pidfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Pidfan. If not, see <https://www.gnu.org/licenses/>.
 */

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;

use pidfan::config::{load_config, validate_config, DaemonConfig};
use pidfan::control::{CycleOutcome, System};
use pidfan::{logger, scan};

fn main() -> anyhow::Result<ExitCode> {
    // Writing pwm and watchdog files under /sys needs root.
    if unsafe { libc::geteuid() } != 0 {
        eprintln!("Error: pidfan requires root privileges to control fans.");
        eprintln!(
            "Please run with: sudo {}",
            std::env::args().next().unwrap_or_else(|| "pidfan".to_string())
        );
        return Ok(ExitCode::FAILURE);
    }

    let args: Vec<String> = std::env::args().collect();

    // Optional logging to /etc/pidfan/logs.json
    if args.iter().any(|a| a == "--logging") {
        logger::init_logging();
        logger::log_event("startup", serde_json::json!({ "args": args }));
    }

    let cfg: DaemonConfig = load_config().unwrap_or_default();
    validate_config(&cfg)
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid config")?;

    let terminated = Arc::new(AtomicBool::new(false));
    let flag = terminated.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("install signal handler")?;

    let discovery = scan::scan(&cfg.root);
    logger::log_event(
        "scan_result",
        serde_json::json!({
            "sensors": discovery.sensors.len(),
            "fans": discovery.fans.len(),
            "watchdog": discovery.watchdog.is_some(),
        }),
    );

    if !discovery.is_complete() {
        eprintln!("Can not detect temperature sensors and fan control");
        // partial inventory so the operator sees what was found
        eprint!("{}", discovery.inventory());
        return Ok(ExitCode::FAILURE);
    }
    let Some(mut system) = System::from_discovery(discovery, cfg.min_speed, cfg.max_speed)
    else {
        return Ok(ExitCode::FAILURE);
    };
    println!("{}", system.inventory());

    let mut counter = 0u32;
    while !terminated.load(Ordering::SeqCst) {
        match system.run_cycle(cfg.period_secs) {
            Ok(CycleOutcome::Normal(state)) => {
                let sensor = &system.sensors()[state.sensor];
                println!(
                    "Fan {} Temp {} {} {}",
                    state.speed,
                    sensor.label(),
                    state.temperature,
                    sensor.target()
                );
            }
            Ok(CycleOutcome::Critical { sensor, value }) => {
                let label = system.sensors()[sensor].label().to_string();
                println!("Critical temperature at {}: {}", label, value);
                logger::log_event(
                    "critical_temp",
                    serde_json::json!({ "sensor": label, "value": value }),
                );
                system
                    .disengage()
                    .context("disengage after critical temperature")?;
            }
            Err(e) => {
                // A failed device read or write (watchdog refresh
                // included) is fatal; the hardware watchdog takes over.
                logger::log_event(
                    "fatal_error",
                    serde_json::json!({ "error": e.to_string() }),
                );
                return Err(e).context("control cycle failed");
            }
        }

        counter += 1;
        if counter >= cfg.report_every {
            println!("{}", system.inventory());
            counter = 0;
        }
        thread::sleep(Duration::from_secs(cfg.period_secs));
    }

    Ok(ExitCode::SUCCESS)
}
