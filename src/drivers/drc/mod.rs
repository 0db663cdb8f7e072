pub mod bytes;
pub mod driver;
pub mod hid_report;
#[cfg(test)]
pub mod hid_report_test;

/// Vendor ID of the console-internal DRH the gamepad is reached through
pub const VID: u16 = 0x057e;
/// Product ID
pub const PID: u16 = 0x0341;

/// Device name used for the logical input devices
pub const DEVICE_NAME: &str = "Nintendo Wii U gamepad (DRC)";

/// Which decode table and capability set apply to an attached gamepad.
/// Resolved once at attach time and fixed for the device's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverVariant {
    /// Buttons, sticks, volume and the touch panel
    Gamepad,
    /// [DriverVariant::Gamepad] plus the inertial and magnetic sensors
    GamepadMotion,
}

impl DriverVariant {
    pub fn name(&self) -> &'static str {
        match self {
            DriverVariant::Gamepad => "drc",
            DriverVariant::GamepadMotion => "drc-motion",
        }
    }

    /// Whether this variant decodes and exposes the motion block
    pub fn has_motion(&self) -> bool {
        matches!(self, DriverVariant::GamepadMotion)
    }
}
