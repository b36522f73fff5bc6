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

//! Optional JSON-lines event log. A no-op unless initialized, so library
//! code can emit events unconditionally.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use serde_json::{json, Value};

const DEFAULT_LOG_PATH: &str = "/etc/pidfan/logs.json";
const FALLBACK_LOG_PATH: &str = "/tmp/pidfan_logs.json";

lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn open_append(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Opens the default system log, falling back to /tmp when /etc is not
/// writable.
pub fn init_logging() {
    let file = open_append(Path::new(DEFAULT_LOG_PATH))
        .or_else(|| open_append(Path::new(FALLBACK_LOG_PATH)));
    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = file;
    }
}

/// Directs the log to an explicit path. Used by tests.
pub fn init_logging_at(path: &Path) {
    let file = open_append(path);
    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = file;
    }
}

pub fn log_event(event: &str, data: Value) {
    let line = json!({
        "ts_ms": now_millis(),
        "event": event,
        "data": data,
    })
    .to_string();

    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(f) = guard.as_mut() {
            let _ = writeln!(f, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_events_are_json_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("logs.json");
        init_logging_at(&path);

        log_event("startup", json!({ "mode": "test" }));
        log_event("cycle", json!({ "speed": 120 }));

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "startup");
        assert_eq!(first["data"]["mode"], "test");
        assert!(first["ts_ms"].is_number());

        // drop the handle so other tests see the logger uninitialized
        if let Ok(mut guard) = LOG_FILE.lock() {
            *guard = None;
        }
    }

    #[test]
    #[serial]
    fn test_uninitialized_logger_is_noop() {
        if let Ok(mut guard) = LOG_FILE.lock() {
            *guard = None;
        }
        // must not panic or create files as a side effect
        log_event("cycle", json!({}));
    }
}
