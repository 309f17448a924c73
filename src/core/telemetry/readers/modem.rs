//! Cellular modem and GPS reader, backed by the `mmcli` tool.

use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::core::telemetry::metrics::{LocationFix, ModemStatus};

/// Vendor string matched against the modem list during discovery.
const MODEM_VENDOR: &str = "QUECTEL";

static MODEM_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/Modem/(\d+)").expect("valid modem path pattern"));

/// Modem manager state: the discovered modem index, if any.
///
/// Discovery failure is not fatal; the reader reports absent fields
/// and retries discovery on a later cycle, so a modem hot-plugged
/// after launch is picked up without a restart.
pub struct ModemReader {
    index: Option<String>,
}

impl ModemReader {
    pub fn new() -> Self {
        Self { index: None }
    }

    /// Modem and GPS fields for one cycle. Until a modem is found,
    /// every field is absent.
    pub fn read(&mut self) -> (ModemStatus, LocationFix) {
        let Some(index) = self.ensure_modem() else {
            return (ModemStatus::default(), LocationFix::default());
        };
        (read_status(&index), read_location(&index))
    }

    fn ensure_modem(&mut self) -> Option<String> {
        if self.index.is_none() {
            self.index = discover_modem();
            if let Some(index) = &self.index {
                log::info!("Modem {} detected", index);
                enable_gps(index);
            }
        }
        self.index.clone()
    }
}

impl Default for ModemReader {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_modem() -> Option<String> {
    let output = match Command::new("mmcli").arg("-L").output() {
        Ok(output) => output,
        Err(e) => {
            log::error!("Failed to list modems: {}", e);
            return None;
        }
    };
    if !output.status.success() {
        log::error!("mmcli -L exited with {}", output.status);
        return None;
    }
    parse_modem_list(&String::from_utf8_lossy(&output.stdout))
}

/// `mmcli -L` lists modems as DBus object paths; the line mentioning
/// the vendor carries the index.
fn parse_modem_list(raw: &str) -> Option<String> {
    raw.lines()
        .find(|line| line.contains(MODEM_VENDOR))
        .and_then(|line| MODEM_PATH_RE.captures(line))
        .map(|captures| captures[1].to_string())
}

fn enable_gps(index: &str) {
    let result = Command::new("mmcli")
        .args([
            "-m",
            index,
            "--location-enable-gps-raw",
            "--location-enable-gps-nmea",
        ])
        .output();
    match result {
        Ok(output) if output.status.success() => log::info!("GPS reporting enabled"),
        Ok(output) => log::error!(
            "Failed to enable GPS: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        Err(e) => log::error!("Failed to enable GPS: {}", e),
    }
}

fn read_status(index: &str) -> ModemStatus {
    let Some(document) = query_modem(&["-m", index, "-J"]) else {
        return ModemStatus::default();
    };
    let generic = document.modem.generic;
    ModemStatus {
        tech: generic.access_technologies,
        signal: parse_signal_quality(&generic.signal_quality.value),
    }
}

fn read_location(index: &str) -> LocationFix {
    let Some(document) = query_modem(&["-m", index, "--location-get", "-J"]) else {
        return LocationFix::default();
    };
    let gps = document.modem.location.gps;
    let (sat, hdop) = parse_fix_quality(&gps.nmea);
    LocationFix {
        long: parse_field(&gps.longitude),
        lat: parse_field(&gps.latitude),
        alt: parse_field(&gps.altitude),
        speed: parse_ground_speed(&gps.nmea),
        sat,
        hdop,
    }
}

fn query_modem(args: &[&str]) -> Option<MmcliDocument> {
    let output = match Command::new("mmcli").args(args).output() {
        Ok(output) => output,
        Err(e) => {
            log::error!("Failed to run mmcli: {}", e);
            return None;
        }
    };
    match serde_json::from_slice(&output.stdout) {
        Ok(document) => Some(document),
        Err(e) => {
            log::warn!("Failed to parse mmcli output: {}", e);
            None
        }
    }
}

/// A malformed or empty field yields absent, not an error.
fn parse_field(value: &str) -> Option<f32> {
    if value.is_empty() {
        return None;
    }
    value.parse().ok()
}

fn parse_signal_quality(value: &str) -> Option<i64> {
    if value.is_empty() {
        return None;
    }
    value.parse().ok()
}

/// Ground speed in km/h: 8th comma-delimited field of the `$GPVTG`
/// sentence. No checksum validation.
fn parse_ground_speed(nmea: &[String]) -> Option<f32> {
    nmea.iter()
        .find(|sentence| sentence.starts_with("$GPVTG"))
        .and_then(|sentence| sentence.split(',').nth(7))
        .and_then(parse_field)
}

/// Satellites in use and horizontal dilution: 8th and 9th fields of
/// the `$GPGGA` fix sentence.
fn parse_fix_quality(nmea: &[String]) -> (Option<f32>, Option<f32>) {
    let Some(sentence) = nmea.iter().find(|s| s.starts_with("$GPGGA")) else {
        return (None, None);
    };
    let fields: Vec<&str> = sentence.split(',').collect();
    if fields.len() < 9 {
        return (None, None);
    }
    (parse_field(fields[7]), parse_field(fields[8]))
}

/// mmcli's JSON document, pruned to the fields the daemon consumes.
/// Every level defaults so a partial document parses.
#[derive(Debug, Default, Deserialize)]
struct MmcliDocument {
    #[serde(default)]
    modem: MmcliModem,
}

#[derive(Debug, Default, Deserialize)]
struct MmcliModem {
    #[serde(default)]
    generic: MmcliGeneric,
    #[serde(default)]
    location: MmcliLocation,
}

#[derive(Debug, Default, Deserialize)]
struct MmcliGeneric {
    #[serde(rename = "access-technologies", default)]
    access_technologies: Option<serde_json::Value>,
    #[serde(rename = "signal-quality", default)]
    signal_quality: MmcliSignalQuality,
}

#[derive(Debug, Default, Deserialize)]
struct MmcliSignalQuality {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct MmcliLocation {
    #[serde(default)]
    gps: MmcliGps,
}

#[derive(Debug, Default, Deserialize)]
struct MmcliGps {
    #[serde(default)]
    longitude: String,
    #[serde(default)]
    latitude: String,
    #[serde(default)]
    altitude: String,
    #[serde(default)]
    nmea: Vec<String>,
}
