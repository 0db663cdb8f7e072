use crate::drivers::drc::{self, DriverVariant};

/// Matches one supported device identity to the variant that drives it
#[derive(Debug, Clone, Copy)]
pub struct DeviceMatch {
    pub vendor_id: u16,
    pub product_id: u16,
    pub variant: DriverVariant,
}

/// Table of supported devices. Built once at startup and handed to whoever
/// performs device matching; identity resolution happens exactly once per
/// physical device, at attach.
#[derive(Debug, Default)]
pub struct DriverRegistry {
    entries: Vec<DeviceMatch>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The built-in device table. The gamepad attaches as the plain variant
    /// unless motion sensing was requested.
    pub fn with_defaults(motion: bool) -> Self {
        let variant = match motion {
            true => DriverVariant::GamepadMotion,
            false => DriverVariant::Gamepad,
        };
        let mut registry = Self::new();
        registry.register(DeviceMatch {
            vendor_id: drc::VID,
            product_id: drc::PID,
            variant,
        });

        registry
    }

    pub fn register(&mut self, entry: DeviceMatch) {
        self.entries.push(entry);
    }

    /// Resolve a device identity to its driver variant. First match wins.
    pub fn resolve(&self, vendor_id: u16, product_id: u16) -> Option<DriverVariant> {
        self.entries
            .iter()
            .find(|entry| entry.vendor_id == vendor_id && entry.product_id == product_id)
            .map(|entry| entry.variant)
    }
}
