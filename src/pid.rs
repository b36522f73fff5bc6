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

//! Incremental (velocity-form) PID controller.
//!
//! Each step computes a bounded delta from the proportional, integral and
//! derivative terms and adds it onto the previous actuation, so actuator
//! memory persists across cycles even when the error crosses zero.

const P_GAIN: f64 = 1.0;
const I_GAIN: f64 = 0.02;
/// Derivative gain applied while the measurement is rising.
const D_GAIN_RISING: f64 = 6.0;
/// Derivative gain applied while the measurement is falling or flat.
const D_GAIN_FALLING: f64 = 4.0;
const ACCUMULATOR_MAX: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct PidController {
    target: f64,
    previous: f64,
    accumulator: f64,
    action: f64,
    min_action: f64,
    max_action: f64,
}

impl PidController {
    pub fn new(target: f64, min_action: f64, max_action: f64) -> Self {
        Self {
            target,
            previous: target,
            accumulator: 0.0,
            action: 0.0,
            min_action,
            max_action,
        }
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Last measurement seen by `step`.
    pub fn value(&self) -> f64 {
        self.previous
    }

    /// Last actuation issued by `step`.
    pub fn action(&self) -> f64 {
        self.action
    }

    /// Advance the controller by one measurement and return the new
    /// actuation, clamped to `[min_action, max_action]`. When the
    /// unclamped sum would leave the bounds the actuation is pinned
    /// exactly to the bound, not saturated incrementally.
    pub fn step(&mut self, current: f64) -> f64 {
        let error = current - self.target;

        self.accumulator =
            (self.accumulator + I_GAIN * error).clamp(-ACCUMULATOR_MAX, ACCUMULATOR_MAX);

        // d == 0 takes the falling branch
        let d = current - self.previous;
        let derivative = d * if d > 0.0 { D_GAIN_RISING } else { D_GAIN_FALLING };

        let delta = error * P_GAIN + self.accumulator + derivative;

        if self.action + delta > self.max_action {
            self.action = self.max_action;
        } else if self.action + delta < self.min_action {
            self.action = self.min_action;
        } else {
            self.action += delta;
        }
        self.previous = current;
        self.action
    }
}
