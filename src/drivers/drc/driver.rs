use std::{error::Error, ffi::CString};

use hidapi::HidDevice;
use thiserror::Error;

use super::{
    hid_report::{decode, DecodeError, Frame, REPORT_LEN},
    DriverVariant, PID, VID,
};

/// Timeout in milliseconds for reading an HID packet
const HID_TIMEOUT: i32 = 5000;

/// Possible errors when polling the device
#[derive(Error, Debug)]
pub enum PollError {
    /// The report was rejected by the decoder; the frame is dropped and the
    /// next read is independent.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Hid(#[from] hidapi::HidError),
    #[error("no input report within {HID_TIMEOUT}ms")]
    Timeout,
}

/// DRC implementation of the HIDRaw interface. The variant is resolved once
/// at attach and selects which parts of the report are decoded.
pub struct Driver {
    device: HidDevice,
    variant: DriverVariant,
}

impl Driver {
    pub fn new(
        path: String,
        variant: DriverVariant,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let path = CString::new(path.clone())?;
        let api = hidapi::HidApi::new()?;
        let device = api.open_path(&path)?;
        let info = device.get_device_info()?;
        if info.vendor_id() != VID || info.product_id() != PID {
            return Err(format!("Device '{path:?}' is not a Wii U gamepad (DRC)").into());
        }
        log::debug!("Opened DRC at {path:?} as variant {}", variant.name());

        Ok(Self { device, variant })
    }

    /// Read the next input report from the device and decode it
    pub fn poll(&mut self) -> Result<Frame, PollError> {
        let mut buf = [0; REPORT_LEN];
        let bytes_read = self.device.read_timeout(&mut buf[..], HID_TIMEOUT)?;
        if bytes_read == 0 {
            // The DRC streams reports continuously while paired; silence
            // means the link is gone.
            return Err(PollError::Timeout);
        }

        let frame = decode(&buf[..bytes_read], self.variant)?;
        Ok(frame)
    }
}
