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

//! Pidfan - PID-based fan control daemon for Linux
//!
//! Discovers hwmon temperature sensors and pwm outputs, then drives a
//! single shared fan command from the most thermally stressed sensor
//! each cycle with an incremental PID controller, with a
//! critical-temperature interlock and optional fan-watchdog refresh.

pub mod config;
pub mod control;
pub mod devices;
pub mod logger;
pub mod pid;
pub mod scan;

#[cfg(test)]
pub mod test_utils;
