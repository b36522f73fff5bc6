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

//! The per-cycle control algorithm: watchdog refresh, governing-sensor
//! selection, PID step and fan-out to every pwm output.

use serde_json::json;

use crate::devices::{DeviceError, Fan, TempSensor};
use crate::logger;
use crate::pid::PidController;
use crate::scan::Discovery;

/// Degrees of slack below a sensor's declared critical threshold at
/// which the fault path fires.
pub const CRITICAL_MARGIN: i32 = 3;

/// PID target before the first governing sensor is chosen.
const INITIAL_TARGET: f64 = 70.0;

/// Snapshot of one completed cycle. `sensor` indexes into
/// `System::sensors` (owned handles, no aliasing across the aggregate).
#[derive(Debug, Clone, Copy)]
pub struct CycleState {
    pub temperature: i32,
    pub speed: u8,
    pub sensor: usize,
}

/// Outcome of one cycle. A critical breach is a value, not an unwound
/// error: the driver disengages and keeps looping.
#[derive(Debug, Clone, Copy)]
pub enum CycleOutcome {
    Normal(CycleState),
    Critical { sensor: usize, value: i32 },
}

/// Owned aggregate of everything the loop drives. One PID instance
/// governs all fans with a single shared command.
pub struct System {
    pid: PidController,
    devices: Discovery,
    max_speed: u8,
}

impl System {
    /// Builds a system from a discovery result; `None` when the
    /// discovery is missing sensors or fans.
    pub fn from_discovery(discovery: Discovery, min_speed: u8, max_speed: u8) -> Option<Self> {
        if !discovery.is_complete() {
            return None;
        }
        Some(Self {
            pid: PidController::new(INITIAL_TARGET, min_speed as f64, max_speed as f64),
            devices: discovery,
            max_speed,
        })
    }

    pub fn sensors(&self) -> &[TempSensor] {
        &self.devices.sensors
    }

    pub fn fans(&self) -> &[Fan] {
        &self.devices.fans
    }

    pub fn has_watchdog(&self) -> bool {
        self.devices.watchdog.is_some()
    }

    /// Runs one control cycle. IO failures propagate; a stuck or broken
    /// device starves the watchdog on purpose.
    pub fn run_cycle(&mut self, period_secs: u64) -> Result<CycleOutcome, DeviceError> {
        if let Some(wd) = &self.devices.watchdog {
            // one tick of slack so a cycle running exactly on period
            // never races the external timer
            wd.refresh(period_secs + 1)?;
        }

        let mut governing = 0usize;
        let mut governing_value = 0i32;
        let mut best_delta = i32::MIN;
        for (i, sensor) in self.devices.sensors.iter().enumerate() {
            let value = sensor.read_celsius()?;
            if value >= sensor.critical() - CRITICAL_MARGIN {
                return Ok(CycleOutcome::Critical { sensor: i, value });
            }
            // strict improvement only: ties keep the earlier sensor
            let delta = value - sensor.target();
            if best_delta < delta {
                governing = i;
                governing_value = value;
                best_delta = delta;
            }
        }

        let sensor = &self.devices.sensors[governing];
        self.pid.set_target(sensor.target() as f64);
        let speed = self.pid.step(governing_value as f64) as u8;

        for fan in &self.devices.fans {
            fan.enable()?;
            fan.set(speed)?;
        }

        logger::log_event(
            "cycle",
            json!({
                "sensor": sensor.label(),
                "temperature": governing_value,
                "target": sensor.target(),
                "speed": speed,
            }),
        );

        Ok(CycleOutcome::Normal(CycleState {
            temperature: governing_value,
            speed,
            sensor: governing,
        }))
    }

    /// Removes active control: every fan is commanded to maximum and its
    /// enable switch is written "0". Hardware that defaults to full
    /// speed with the switch off gets the max write anyway.
    pub fn disengage(&self) -> Result<(), DeviceError> {
        for fan in &self.devices.fans {
            fan.set(self.max_speed)?;
            fan.disengage()?;
        }
        logger::log_event("disengage", json!({ "fans": self.devices.fans.len() }));
        Ok(())
    }

    /// Human-readable device dump for the periodic report.
    pub fn inventory(&self) -> String {
        self.devices.inventory()
    }
}
