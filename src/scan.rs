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

//! Device discovery: walk a sysfs subtree and classify files into
//! temperature sensors, pwm fan outputs and the optional fan watchdog.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::devices::{read_trimmed, Fan, TempSensor, Watchdog};

const TEMP_PREFIX: &str = "temp";
const TEMP_SUFFIX: &str = "_input";
const FAN_PREFIX: &str = "pwm";
const WATCHDOG_NAME: &str = "fan_watchdog";

const DEFAULT_CRITICAL: i32 = 100;

/// Everything discovered under the scan root. A usable system needs at
/// least one sensor and one fan; the watchdog is optional.
#[derive(Debug, Default)]
pub struct Discovery {
    pub sensors: Vec<TempSensor>,
    pub fans: Vec<Fan>,
    pub watchdog: Option<Watchdog>,
}

impl Discovery {
    pub fn is_complete(&self) -> bool {
        !self.sensors.is_empty() && !self.fans.is_empty()
    }

    /// Human-readable device dump, also used as the diagnostic when
    /// discovery comes up short so the operator sees what was found.
    pub fn inventory(&self) -> String {
        let mut out = String::from("Temperature sensors:\n");
        for s in &self.sensors {
            let current = match s.read_celsius() {
                Ok(v) => v.to_string(),
                Err(_) => "?".to_string(),
            };
            let _ = writeln!(
                out,
                "\t{} current {}, target {}, critical {}",
                s.label(),
                current,
                s.target(),
                s.critical()
            );
        }
        out.push_str("Fans:\n");
        for f in &self.fans {
            let _ = writeln!(out, "\t{}", f.label());
        }
        if self.watchdog.is_some() {
            out.push_str("Fan watchdog is present.\n");
        }
        out
    }
}

/// Parse `<prefix><N><suffix>` filenames. `N` must be the whole middle,
/// so `pwm3x` and `temp2_input_extra` never match.
pub fn extract_index(fname: &str, prefix: &str, suffix: &str) -> Option<usize> {
    if fname.len() > prefix.len() + suffix.len()
        && fname.starts_with(prefix)
        && fname.ends_with(suffix)
    {
        fname[prefix.len()..fname.len() - suffix.len()].parse().ok()
    } else {
        None
    }
}

/// Best-effort integer metadata: missing or unparsable files read as 0.
fn read_metadata(path: &Path) -> i64 {
    read_trimmed(path)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(0)
}

/// Label fallback chain: the per-index `_label` file, then the chip's
/// `name` file in the same directory, then the directory's own name.
fn resolve_label(dir: &Path, label_file: &str) -> String {
    if let Ok(label) = read_trimmed(dir.join(label_file)) {
        if !label.is_empty() {
            return label;
        }
    }
    if let Ok(name) = read_trimmed(dir.join("name")) {
        if !name.is_empty() {
            return name;
        }
    }
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Operating target derivation: 20 below the declared max and 30 below
/// critical, whichever is lower, never negative. Missing thresholds fall
/// back so the target always leaves headroom before thermal shutdown.
fn derive_target(max_raw: i64, critical_raw: i64) -> (i32, i32) {
    let mut critical = (critical_raw / 1000) as i32;
    if critical == 0 {
        critical = DEFAULT_CRITICAL;
    }
    let mut max = (max_raw / 1000) as i32;
    if max == 0 {
        max = critical;
    }
    let target = (max - 20).max(0).min((critical - 30).max(0));
    (target, critical)
}

fn classify_temp(path: &Path) -> Option<TempSensor> {
    let fname = path.file_name()?.to_str()?;
    let idx = extract_index(fname, TEMP_PREFIX, TEMP_SUFFIX)?;
    if idx == 0 {
        return None;
    }
    let dir = path.parent()?;
    let max_raw = read_metadata(&dir.join(format!("{}{}_max", TEMP_PREFIX, idx)));
    let critical_raw = read_metadata(&dir.join(format!("{}{}_crit", TEMP_PREFIX, idx)));
    let (target, critical) = derive_target(max_raw, critical_raw);
    let label = resolve_label(dir, &format!("{}{}_label", TEMP_PREFIX, idx));
    Some(TempSensor::new(path.to_path_buf(), label, target, critical))
}

fn classify_fan(path: &Path) -> Option<Fan> {
    let fname = path.file_name()?.to_str()?;
    let idx = extract_index(fname, FAN_PREFIX, "")?;
    if idx == 0 {
        return None;
    }
    let dir = path.parent()?;
    let enable_path = dir.join(format!("{}{}_enable", FAN_PREFIX, idx));
    let label = resolve_label(dir, &format!("{}{}_label", FAN_PREFIX, idx));
    Some(Fan::new(path.to_path_buf(), label, enable_path))
}

/// Collect every regular file under `root`. Unreadable directories are
/// skipped. Symlinks to regular files count as files; directory symlinks
/// are not followed (sysfs aliases the same devices many times over).
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for ent in entries.flatten() {
        let Ok(ftype) = ent.file_type() else { continue };
        let path = ent.path();
        if ftype.is_dir() {
            collect_files(&path, out);
        } else if ftype.is_file() {
            out.push(path);
        } else if ftype.is_symlink() {
            if fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false) {
                out.push(path);
            }
        }
    }
}

/// Scan `root` and classify everything found. Files are visited in path
/// order so selection tie-breaking and reports are stable across runs.
pub fn scan(root: &Path) -> Discovery {
    let mut files = Vec::new();
    collect_files(root, &mut files);
    files.sort();

    let mut discovery = Discovery::default();
    for path in &files {
        if let Some(sensor) = classify_temp(path) {
            discovery.sensors.push(sensor);
            continue;
        }
        if let Some(fan) = classify_fan(path) {
            discovery.fans.push(fan);
            continue;
        }
        if path.file_name().is_some_and(|n| n == WATCHDOG_NAME) {
            // at most one in practice; the last one found wins
            discovery.watchdog = Some(Watchdog::new(path.clone()));
        }
    }
    discovery
}
