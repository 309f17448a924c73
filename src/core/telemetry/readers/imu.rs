//! Inertial sensor reader (MPU6050, I2C address 0x68).
//!
//! Only the die-temperature register is sampled; the motion registers
//! are not used by this daemon.

use rppal::i2c::I2c;

use crate::error::Result;

const BUS: u8 = 1;
const ADDRESS: u16 = 0x68;
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_TEMP_OUT_H: u8 = 0x41;

/// MPU6050 handle. Mandatory hardware: the open and the wake write
/// are fatal at startup, reads thereafter are not.
pub struct InertialSensor {
    i2c: I2c,
}

impl InertialSensor {
    pub fn open() -> Result<Self> {
        let mut i2c = I2c::with_bus(BUS)?;
        i2c.set_slave_address(ADDRESS)?;
        // Clear the sleep bit; the sensor powers up asleep.
        i2c.write(&[REG_PWR_MGMT_1, 0x00])?;
        Ok(Self { i2c })
    }

    /// Die temperature in °C.
    pub fn read_temperature(&mut self) -> Result<f32> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(&[REG_TEMP_OUT_H], &mut buf)?;
        Ok(convert_temperature(buf))
    }
}

/// Register 0x41 holds a big-endian signed word; datasheet conversion
/// is `raw / 340.0 + 36.53`.
pub fn convert_temperature(raw: [u8; 2]) -> f32 {
    f32::from(i16::from_be_bytes(raw)) / 340.0 + 36.53
}
