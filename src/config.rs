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

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_root() -> PathBuf {
    PathBuf::from("/sys")
}
fn default_period_secs() -> u64 {
    1
}
fn default_report_every() -> u32 {
    16
}
// The floor is deliberately above zero so the fans never stop entirely.
fn default_min_speed() -> u8 {
    85
}
fn default_max_speed() -> u8 {
    255
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    /// Root of the discovery scan.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Polling period between cycles, seconds.
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
    /// Dump the device inventory every this many cycles.
    #[serde(default = "default_report_every")]
    pub report_every: u32,
    /// Lower actuation bound for the pwm command.
    #[serde(default = "default_min_speed")]
    pub min_speed: u8,
    /// Upper actuation bound for the pwm command.
    #[serde(default = "default_max_speed")]
    pub max_speed: u8,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            period_secs: default_period_secs(),
            report_every: default_report_every(),
            min_speed: default_min_speed(),
            max_speed: default_max_speed(),
        }
    }
}

pub fn config_path() -> PathBuf {
    PathBuf::from("/etc/pidfan/config.json")
}

/// Loads the system config; absent or unreadable file means defaults.
pub fn load_config() -> Option<DaemonConfig> {
    let data = fs::read_to_string(config_path()).ok()?;
    serde_json::from_str(&data).ok()
}

pub fn validate_config(cfg: &DaemonConfig) -> Result<(), String> {
    if cfg.period_secs == 0 {
        return Err("period_secs must be >= 1".into());
    }
    if cfg.report_every == 0 {
        return Err("report_every must be >= 1".into());
    }
    if cfg.min_speed >= cfg.max_speed {
        return Err("min_speed must be below max_speed".into());
    }
    if cfg.root.as_os_str().is_empty() {
        return Err("root must not be empty".into());
    }
    Ok(())
}
