/*
 * Test utilities for Pidfan
 *
 * Builders for fake hwmon trees backed by tempfile so discovery and the
 * control loop can be exercised without real hardware.
 */

#[cfg(test)]
pub mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Creates a chip directory with its `name` file.
    pub fn make_chip_dir(root: &Path, dir_name: &str, chip_name: &str) -> PathBuf {
        let dir = root.join(dir_name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("name"), format!("{}\n", chip_name)).unwrap();
        dir
    }

    /// Adds a temperature sensor: `temp<idx>_input` (millidegrees) plus
    /// optional `_max`, `_crit` and `_label` siblings.
    pub fn add_temp(
        dir: &Path,
        idx: usize,
        millideg: i64,
        max: Option<i64>,
        crit: Option<i64>,
        label: Option<&str>,
    ) {
        fs::write(dir.join(format!("temp{}_input", idx)), millideg.to_string()).unwrap();
        if let Some(v) = max {
            fs::write(dir.join(format!("temp{}_max", idx)), v.to_string()).unwrap();
        }
        if let Some(v) = crit {
            fs::write(dir.join(format!("temp{}_crit", idx)), v.to_string()).unwrap();
        }
        if let Some(l) = label {
            fs::write(dir.join(format!("temp{}_label", idx)), l).unwrap();
        }
    }

    /// Adds a pwm output with its `_enable` sibling (enable starts at "2",
    /// i.e. automatic mode).
    pub fn add_pwm(dir: &Path, idx: usize, initial: u8) {
        fs::write(dir.join(format!("pwm{}", idx)), initial.to_string()).unwrap();
        fs::write(dir.join(format!("pwm{}_enable", idx)), "2").unwrap();
    }

    /// Rewrites a sensor's live value.
    pub fn set_temp(dir: &Path, idx: usize, millideg: i64) {
        fs::write(dir.join(format!("temp{}_input", idx)), millideg.to_string()).unwrap();
    }
}
