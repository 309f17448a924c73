//! UPS fuel gauge reader (I2C, address 0x36).

use std::sync::Arc;

use parking_lot::Mutex;
use rppal::i2c::I2c;

use crate::core::telemetry::metrics::UpsStatus;
use crate::error::Result;

const BUS: u8 = 1;
const ADDRESS: u16 = 0x36;
const REG_VCELL: u8 = 0x02;
const REG_SOC: u8 = 0x04;

/// Gauge handle shared with the blocking read inside the cycle.
pub type SharedGauge = Arc<Mutex<UpsGauge>>;

/// MAX17040-class fuel gauge. Mandatory hardware: opening the bus at
/// startup is fatal, individual register reads are not.
pub struct UpsGauge {
    i2c: I2c,
}

impl UpsGauge {
    pub fn open() -> Result<Self> {
        let mut i2c = I2c::with_bus(BUS)?;
        i2c.set_slave_address(ADDRESS)?;
        Ok(Self { i2c })
    }

    /// Voltage and charge for one cycle, each absent on its own read
    /// failure. A failed voltage read skips the capacity register too,
    /// matching the gauge's access order.
    pub fn read(&mut self) -> UpsStatus {
        let voltage = match self.read_register(REG_VCELL) {
            Ok(raw) => Some(decode_voltage(raw)),
            Err(e) => {
                log::error!("Failed to read voltage from UPS: {}", e);
                return UpsStatus::default();
            }
        };

        let capacity = match self.read_register(REG_SOC) {
            Ok(raw) => Some(decode_capacity(raw)),
            Err(e) => {
                log::error!("Failed to read capacity from UPS: {}", e);
                None
            }
        };

        UpsStatus { voltage, capacity }
    }

    fn read_register(&mut self, register: u8) -> Result<[u8; 2]> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(&[register], &mut buf)?;
        Ok(buf)
    }
}

/// Cell voltage in volts, rounded to two decimals.
///
/// The gauge returns its registers MSB-first while the word is
/// interpreted little-endian off the buffer, so the raw value is
/// byte-swapped before scaling (1.25 mV per 1/16 LSB). The swap must
/// happen before the scale.
pub fn decode_voltage(raw: [u8; 2]) -> f32 {
    let swapped = u16::from_le_bytes(raw).swap_bytes();
    round2(f32::from(swapped) * 1.25 / 1000.0 / 16.0)
}

/// State of charge in percent, rounded to two decimals. Same swap as
/// the voltage register, 1/256 % per LSB.
pub fn decode_capacity(raw: [u8; 2]) -> f32 {
    let swapped = u16::from_le_bytes(raw).swap_bytes();
    round2(f32::from(swapped) / 256.0)
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
