use std::error::Error;

use crate::drivers::drc::{
    driver::{Driver, PollError},
    hid_report::Frame,
    DriverVariant, DEVICE_NAME,
};

use super::target::{joypad::JoypadDevice, motion::MotionDevice, touchscreen::TouchscreenDevice};

/// One attached gamepad and the logical input devices it owns. Attach is
/// all-or-nothing: if any virtual device fails to build, the ones already
/// built are released before the error propagates, and nothing stays
/// registered. Dropping the device releases everything it owns.
pub struct DrcDevice {
    driver: Driver,
    joypad: JoypadDevice,
    touchscreen: TouchscreenDevice,
    motion: Option<MotionDevice>,
}

impl DrcDevice {
    /// Open the hidraw device at the given path and register the logical
    /// devices for the resolved variant.
    pub fn attach(
        path: String,
        variant: DriverVariant,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let driver = Driver::new(path, variant)?;
        let joypad = JoypadDevice::new()?;
        let touchscreen = TouchscreenDevice::new()?;
        let motion = match variant.has_motion() {
            true => Some(MotionDevice::new()?),
            false => None,
        };
        log::debug!("Attached {DEVICE_NAME} with variant {}", variant.name());

        Ok(Self {
            driver,
            joypad,
            touchscreen,
            motion,
        })
    }

    /// Poll the gamepad until the link drops or an unrecoverable error
    /// occurs. Reports the decoder rejects are logged and dropped; the next
    /// report is independent.
    pub fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        loop {
            match self.driver.poll() {
                Ok(frame) => self.handle_report(&frame)?,
                Err(PollError::Decode(err)) => {
                    log::warn!("Dropping report: {err}");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Push one decoded frame to every logical device. Each device gets
    /// exactly one sync per incoming report, even when nothing changed, so
    /// consumers never observe a partial update.
    fn handle_report(&mut self, frame: &Frame) -> Result<(), Box<dyn Error + Send + Sync>> {
        log::trace!("Handling frame: {frame:?}");
        self.joypad.write_frame(frame)?;
        self.touchscreen.write_frame(&frame.touch)?;
        if let (Some(motion), Some(sample)) = (self.motion.as_mut(), frame.motion.as_ref()) {
            motion.write_frame(sample)?;
        }

        Ok(())
    }
}
