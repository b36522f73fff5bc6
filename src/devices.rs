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

//! Typed handles over hwmon sysfs files.
//!
//! Each handle owns its paths and static metadata; the live value always
//! comes from the filesystem. Metadata is resolved once at discovery by
//! `crate::scan`.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("unparsable value in {path}: {raw:?}")]
    Parse { path: PathBuf, raw: String },
}

pub(crate) fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}

fn read_i64(path: &Path) -> Result<i64, DeviceError> {
    let raw = read_trimmed(path).map_err(|source| DeviceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    raw.parse().map_err(|_| DeviceError::Parse {
        path: path.to_path_buf(),
        raw,
    })
}

fn write_str(path: &Path, value: &str) -> Result<(), DeviceError> {
    fs::write(path, value).map_err(|source| DeviceError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// A temperature input file with its derived control parameters.
/// Invariant: `critical > target >= 0` (enforced by the discovery-time
/// derivation in `crate::scan`).
#[derive(Debug, Clone)]
pub struct TempSensor {
    path: PathBuf,
    label: String,
    target: i32,
    critical: i32,
}

impl TempSensor {
    pub fn new(path: PathBuf, label: String, target: i32, critical: i32) -> Self {
        Self { path, label, target, critical }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    pub fn critical(&self) -> i32 {
        self.critical
    }

    /// Current reading in whole degrees Celsius. The file holds
    /// millidegrees; truncating division.
    pub fn read_celsius(&self) -> Result<i32, DeviceError> {
        Ok((read_i64(&self.path)? / 1000) as i32)
    }
}

/// A pwm output file and its `_enable` switch. No state beyond identity.
#[derive(Debug, Clone)]
pub struct Fan {
    path: PathBuf,
    label: String,
    enable_path: PathBuf,
}

impl Fan {
    pub fn new(path: PathBuf, label: String, enable_path: PathBuf) -> Self {
        Self { path, label, enable_path }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Hand the output back to this controller (manual mode).
    pub fn enable(&self) -> Result<(), DeviceError> {
        write_str(&self.enable_path, "1")
    }

    /// Drop control of the output.
    pub fn disengage(&self) -> Result<(), DeviceError> {
        write_str(&self.enable_path, "0")
    }

    pub fn set(&self, speed: u8) -> Result<(), DeviceError> {
        write_str(&self.path, &speed.to_string())
    }
}

/// The kernel fan-watchdog file. Writing a period keeps the external
/// timer from forcing a failsafe shutdown.
#[derive(Debug, Clone)]
pub struct Watchdog {
    path: PathBuf,
}

impl Watchdog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn refresh(&self, period_secs: u64) -> Result<(), DeviceError> {
        write_str(&self.path, &period_secs.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sensor_at(dir: &Path, millideg: &str) -> TempSensor {
        let p = dir.join("temp1_input");
        fs::write(&p, millideg).unwrap();
        TempSensor::new(p, "cpu".into(), 60, 100)
    }

    #[test]
    fn test_sensor_reads_whole_degrees() {
        let tmp = TempDir::new().unwrap();
        let s = sensor_at(tmp.path(), "49750\n");
        assert_eq!(s.read_celsius().unwrap(), 49);
        assert_eq!(s.label(), "cpu");
        assert_eq!(s.target(), 60);
        assert_eq!(s.critical(), 100);
    }

    #[test]
    fn test_sensor_read_missing_file() {
        let s = TempSensor::new(PathBuf::from("/nonexistent/temp1_input"), "x".into(), 60, 100);
        assert!(matches!(s.read_celsius(), Err(DeviceError::Read { .. })));
    }

    #[test]
    fn test_sensor_read_garbage() {
        let tmp = TempDir::new().unwrap();
        let s = sensor_at(tmp.path(), "not-a-number");
        match s.read_celsius() {
            Err(DeviceError::Parse { raw, .. }) => assert_eq!(raw, "not-a-number"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_fan_enable_set_disengage() {
        let tmp = TempDir::new().unwrap();
        let pwm = tmp.path().join("pwm1");
        let enable = tmp.path().join("pwm1_enable");
        fs::write(&pwm, "0").unwrap();
        fs::write(&enable, "2").unwrap();

        let fan = Fan::new(pwm.clone(), "pwm1".into(), enable.clone());
        fan.enable().unwrap();
        fan.set(200).unwrap();
        assert_eq!(fs::read_to_string(&enable).unwrap(), "1");
        assert_eq!(fs::read_to_string(&pwm).unwrap(), "200");

        fan.disengage().unwrap();
        assert_eq!(fs::read_to_string(&enable).unwrap(), "0");

        // Round trip back to controlled actuation.
        fan.enable().unwrap();
        fan.set(120).unwrap();
        assert_eq!(fs::read_to_string(&enable).unwrap(), "1");
        assert_eq!(fs::read_to_string(&pwm).unwrap(), "120");
    }

    #[test]
    fn test_fan_write_failure_propagates() {
        let fan = Fan::new(
            PathBuf::from("/nonexistent/pwm1"),
            "pwm1".into(),
            PathBuf::from("/nonexistent/pwm1_enable"),
        );
        assert!(matches!(fan.set(100), Err(DeviceError::Write { .. })));
        assert!(matches!(fan.enable(), Err(DeviceError::Write { .. })));
    }

    #[test]
    fn test_watchdog_refresh_writes_period() {
        let tmp = TempDir::new().unwrap();
        let wd_path = tmp.path().join("fan_watchdog");
        fs::write(&wd_path, "0").unwrap();
        let wd = Watchdog::new(wd_path.clone());
        wd.refresh(3).unwrap();
        assert_eq!(fs::read_to_string(&wd_path).unwrap(), "3");
    }
}
