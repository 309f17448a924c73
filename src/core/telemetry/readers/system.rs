//! Board-level source reader: load, CPU temperature, fan, power draw.
//!
//! Each field is read from its own source and degrades to absent on
//! its own failure; one broken source never blanks the others.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use ignore::WalkBuilder;

use crate::core::telemetry::metrics::SystemStatus;

const COOLING_FAN_PATH: &str = "/sys/devices/platform/cooling_fan";

/// Reads every board-level field for one cycle.
pub fn read_system_status() -> SystemStatus {
    SystemStatus {
        watts: read_power_draw(),
        temperature: read_cpu_temperature(),
        fan: read_fan_rpm(Path::new(COOLING_FAN_PATH)),
        load: read_system_load(),
    }
}

fn read_system_load() -> Option<f32> {
    let stat = match fs::read_to_string("/proc/stat") {
        Ok(stat) => stat,
        Err(e) => {
            log::error!("Failed to read /proc/stat: {}", e);
            return None;
        }
    };
    parse_proc_stat(&stat)
}

/// Busy percentage from the aggregate cpu line:
/// `100 - idle * 100 / (user+nice+system+idle+iowait+irq+softirq)`,
/// truncated to two decimals.
fn parse_proc_stat(stat: &str) -> Option<f32> {
    let line = stat.lines().next()?;
    let mut fields = line.split_whitespace();
    if fields.next() != Some("cpu") {
        log::warn!("Unexpected first /proc/stat line: {:?}", line);
        return None;
    }

    let jiffies: Vec<f64> = fields
        .take(7)
        .filter_map(|field| field.parse().ok())
        .collect();
    if jiffies.len() < 7 {
        log::warn!("Short /proc/stat cpu line: {:?}", line);
        return None;
    }

    let total: f64 = jiffies.iter().sum();
    let idle = jiffies[3];
    Some(truncate2(100.0 - idle * 100.0 / total))
}

fn read_cpu_temperature() -> Option<f32> {
    let raw = run_vcgencmd("measure_temp")?;
    parse_measure_temp(&raw)
}

/// `temp=48.9'C` -> 48.9
fn parse_measure_temp(raw: &str) -> Option<f32> {
    let value = raw.split('=').nth(1)?.split('\'').next()?.trim();
    match value.parse::<f32>() {
        Ok(temperature) => Some(temperature),
        Err(e) => {
            log::warn!("Failed to parse CPU temperature {:?}: {}", value, e);
            None
        }
    }
}

fn read_fan_rpm(root: &Path) -> Option<f32> {
    let input = find_fan_input(root)?;
    let raw = fs::read_to_string(&input).ok()?;
    match raw.trim().parse::<f32>() {
        Ok(rpm) => Some(rpm),
        Err(e) => {
            log::warn!("Failed to parse fan speed from {:?}: {}", input, e);
            None
        }
    }
}

/// Locates the `fan1_input` node below the cooling device. The hwmon
/// directory level between the platform path and the file is not
/// stable across kernels, hence the walk.
fn find_fan_input(root: &Path) -> Option<PathBuf> {
    WalkBuilder::new(root)
        .standard_filters(false)
        .build()
        .flatten()
        .find(|entry| entry.file_name() == "fan1_input")
        .map(|entry| entry.into_path())
}

fn read_power_draw() -> Option<f32> {
    let raw = run_vcgencmd("pmic_read_adc")?;
    Some(parse_pmic_adc(&raw))
}

/// Sums current x voltage over the PMIC rails reported in both maps.
///
/// Rows look like `VDD_CORE_A current(1)=3.57A`; the first token minus
/// its `_A`/`_V` suffix is the rail label, so the current and voltage
/// rows of one rail share a key. The total is truncated to two
/// decimals via integer scaling, not rounded.
fn parse_pmic_adc(raw: &str) -> f32 {
    let mut currents: HashMap<&str, f32> = HashMap::new();
    let mut voltages: HashMap<&str, f32> = HashMap::new();

    for line in raw.lines() {
        let Some((left, right)) = line.split_once('=') else {
            continue;
        };
        let Some(token) = left.split_whitespace().next() else {
            continue;
        };
        if token.len() < 2 {
            continue;
        }
        let label = &token[..token.len() - 2];

        if let Some(value) = right.trim().strip_suffix('A') {
            match value.parse::<f32>() {
                Ok(current) => {
                    currents.insert(label, current);
                }
                Err(e) => log::warn!("Failed to parse current value {:?}: {}", value, e),
            }
        } else if let Some(value) = right.trim().strip_suffix('V') {
            match value.parse::<f32>() {
                Ok(voltage) => {
                    voltages.insert(label, voltage);
                }
                Err(e) => log::warn!("Failed to parse voltage value {:?}: {}", value, e),
            }
        }
    }

    let mut watts = 0.0f32;
    for (label, current) in &currents {
        if let Some(voltage) = voltages.get(label) {
            watts += current * voltage;
        }
    }
    truncate2(f64::from(watts))
}

fn run_vcgencmd(command: &str) -> Option<String> {
    let output = match Command::new("vcgencmd").arg(command).output() {
        Ok(output) => output,
        Err(e) => {
            log::error!("Failed to run vcgencmd {}: {}", command, e);
            return None;
        }
    };
    if !output.status.success() {
        log::error!("vcgencmd {} exited with {}", command, output.status);
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn truncate2(value: f64) -> f32 {
    ((value * 100.0) as i64 as f64 / 100.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_parse_proc_stat() {
        // idle = 800 out of 1000 jiffies -> 20% busy
        let stat = "cpu  100 0 50 800 30 10 10 0 0 0\ncpu0 50 0 25 400 15 5 5 0 0 0\n";
        assert_eq!(parse_proc_stat(stat), Some(20.0));
    }

    #[test]
    fn test_parse_proc_stat_truncates() {
        // idle 2 of 3 jiffies -> 33.333..% busy -> 33.33
        let stat = "cpu  1 0 0 2 0 0 0 0 0 0\n";
        assert_eq!(parse_proc_stat(stat), Some(33.33));
    }

    #[test]
    fn test_parse_proc_stat_rejects_short_line() {
        assert_eq!(parse_proc_stat("cpu 1 2 3\n"), None);
        assert_eq!(parse_proc_stat("intr 1 2 3 4 5 6 7\n"), None);
        assert_eq!(parse_proc_stat(""), None);
    }

    #[test]
    fn test_parse_measure_temp() {
        assert_eq!(parse_measure_temp("temp=48.9'C\n"), Some(48.9));
        assert_eq!(parse_measure_temp("temp=bogus'C\n"), None);
        assert_eq!(parse_measure_temp("garbage"), None);
    }

    #[test]
    fn test_parse_pmic_adc_sums_matching_rails() {
        let raw = "A0_A current(0)=1.0A\nA0_V volt(0)=5.0V\n";
        assert_eq!(parse_pmic_adc(raw), 5.0);
    }

    #[test]
    fn test_parse_pmic_adc_truncates_total() {
        // 1.234 * 5.1 = 6.2934 -> 6.29, never 6.3
        let raw = "CORE_A current(1)=1.234A\nCORE_V volt(1)=5.1V\n";
        assert_eq!(parse_pmic_adc(raw), 6.29);
    }

    #[test]
    fn test_parse_pmic_adc_ignores_unmatched_rails() {
        let raw = "A0_A current(0)=2.0A\nB1_V volt(1)=5.0V\n";
        assert_eq!(parse_pmic_adc(raw), 0.0);
    }

    #[test]
    fn test_parse_pmic_adc_skips_malformed_lines() {
        let raw = "\nnonsense\nA0_A current(0)=1.5A\nA0_V volt(0)=2.0V\nX=\n";
        assert_eq!(parse_pmic_adc(raw), 3.0);
    }

    #[test]
    fn test_find_fan_input_walks_nested_dirs() {
        let root = tempfile::tempdir().unwrap();
        let hwmon = root.path().join("hwmon").join("hwmon2");
        std::fs::create_dir_all(&hwmon).unwrap();
        let mut file = File::create(hwmon.join("fan1_input")).unwrap();
        writeln!(file, "1713").unwrap();

        let found = find_fan_input(root.path()).unwrap();
        assert!(found.ends_with("fan1_input"));
        assert_eq!(read_fan_rpm(root.path()), Some(1713.0));
    }

    #[test]
    fn test_find_fan_input_missing_root() {
        assert_eq!(find_fan_input(Path::new("/nonexistent/cooling_fan")), None);
    }
}
