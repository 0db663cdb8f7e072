use std::error::Error;

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisCode, AttributeSet, BusType, EventType, InputEvent, InputId, KeyCode,
    PropType, UinputAbsSetup,
};

use crate::drivers::drc::{hid_report::TouchSample, DEVICE_NAME, PID, VID};

// Resolution in pixels
const RES_X: i32 = 854;
const RES_Y: i32 = 480;
// Display/touch size in mm
const WIDTH: i32 = 138;
const HEIGHT: i32 = 79;
const MAX_TOUCH_RES: i32 = 1 << 12;
const TOUCH_BORDER_X: i32 = 100;
const TOUCH_BORDER_Y: i32 = 200;
const TOUCH_FUZZ: i32 = 20;

/// The touch panel, exposed as a direct single-contact touchscreen. Only one
/// centroid ever comes out of a report, so no multitouch axes are declared.
pub struct TouchscreenDevice {
    device: VirtualDevice,
}

impl TouchscreenDevice {
    pub fn new() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let device = TouchscreenDevice::create_virtual_device()?;
        Ok(Self { device })
    }

    /// Create the virtual device to emulate
    fn create_virtual_device() -> Result<VirtualDevice, Box<dyn Error + Send + Sync>> {
        let mut keys = AttributeSet::<KeyCode>::new();
        keys.insert(KeyCode::BTN_TOUCH);
        keys.insert(KeyCode::BTN_TOOL_FINGER);

        let mut properties = AttributeSet::<PropType>::new();
        properties.insert(PropType::DIRECT);

        // Trim the border where the panel misreads, and advertise the
        // physical pixel density so consumers can map units to millimeters
        let x_setup = AbsInfo::new(
            0,
            TOUCH_BORDER_X,
            MAX_TOUCH_RES - TOUCH_BORDER_X,
            TOUCH_FUZZ,
            0,
            RES_X / WIDTH,
        );
        let y_setup = AbsInfo::new(
            0,
            TOUCH_BORDER_Y,
            MAX_TOUCH_RES - TOUCH_BORDER_Y,
            TOUCH_FUZZ,
            0,
            RES_Y / HEIGHT,
        );
        let abs_x = UinputAbsSetup::new(AbsoluteAxisCode::ABS_X, x_setup);
        let abs_y = UinputAbsSetup::new(AbsoluteAxisCode::ABS_Y, y_setup);

        let name = format!("{DEVICE_NAME} touchscreen");
        let id = InputId::new(BusType::BUS_USB, VID, PID, 0x0100);

        let device = VirtualDeviceBuilder::new()?
            .name(name.as_str())
            .input_id(id)
            .with_properties(&properties)?
            .with_keys(&keys)?
            .with_absolute_axis(&abs_x)?
            .with_absolute_axis(&abs_y)?
            .build()?;

        Ok(device)
    }

    /// Report the touch state and complete it with a single end-of-frame
    /// marker, whether or not anything is touching.
    pub fn write_frame(&mut self, touch: &TouchSample) -> Result<(), Box<dyn Error + Send + Sync>> {
        let events = frame_events(touch);
        self.device.emit(events.as_slice())?;
        Ok(())
    }
}

/// Translate the given touch sample into evdev events. The y axis flips
/// into screen orientation here; x passes through unmodified. Coordinates
/// are only reported while touching.
pub fn frame_events(touch: &TouchSample) -> Vec<InputEvent> {
    let mut events = Vec::new();
    let touching = touch.touching as i32;
    events.push(InputEvent::new(
        EventType::KEY.0,
        KeyCode::BTN_TOUCH.0,
        touching,
    ));
    events.push(InputEvent::new(
        EventType::KEY.0,
        KeyCode::BTN_TOOL_FINGER.0,
        touching,
    ));

    if touch.touching {
        events.push(InputEvent::new(
            EventType::ABSOLUTE.0,
            AbsoluteAxisCode::ABS_X.0,
            touch.x as i32,
        ));
        events.push(InputEvent::new(
            EventType::ABSOLUTE.0,
            AbsoluteAxisCode::ABS_Y.0,
            MAX_TOUCH_RES - touch.y as i32,
        ));
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_flips_y() {
        let touch = TouchSample {
            x: 1000,
            y: 600,
            touching: true,
        };
        let events = frame_events(&touch);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].value(), 1);
        assert_eq!(events[1].value(), 1);
        assert_eq!(events[2].code(), AbsoluteAxisCode::ABS_X.0);
        assert_eq!(events[2].value(), 1000);
        assert_eq!(events[3].code(), AbsoluteAxisCode::ABS_Y.0);
        assert_eq!(events[3].value(), 4096 - 600);
    }

    #[test]
    fn test_not_touching_releases_without_coordinates() {
        let touch = TouchSample {
            x: 1000,
            y: 600,
            touching: false,
        };
        let events = frame_events(&touch);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].code(), KeyCode::BTN_TOUCH.0);
        assert_eq!(events[0].value(), 0);
        assert_eq!(events[1].code(), KeyCode::BTN_TOOL_FINGER.0);
        assert_eq!(events[1].value(), 0);
    }
}
