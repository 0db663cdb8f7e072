use std::error::Error;

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisCode, AttributeSet, BusType, EventType, InputEvent, InputId, KeyCode,
    UinputAbsSetup,
};

use crate::drivers::drc::{
    hid_report::{Frame, STICK_MAX, STICK_MIN, VOLUME_MAX, VOLUME_MIN},
    DEVICE_NAME, PID, VID,
};

/// The buttons and sticks of the gamepad, exposed as one virtual joypad.
/// The capability set is declared once at construction and never changes.
pub struct JoypadDevice {
    device: VirtualDevice,
}

impl JoypadDevice {
    pub fn new() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let device = JoypadDevice::create_virtual_device()?;
        Ok(Self { device })
    }

    /// Create the virtual device to emulate
    fn create_virtual_device() -> Result<VirtualDevice, Box<dyn Error + Send + Sync>> {
        // Setup Key inputs
        let mut keys = AttributeSet::<KeyCode>::new();
        keys.insert(KeyCode::BTN_DPAD_RIGHT);
        keys.insert(KeyCode::BTN_DPAD_DOWN);
        keys.insert(KeyCode::BTN_DPAD_LEFT);
        keys.insert(KeyCode::BTN_DPAD_UP);
        keys.insert(KeyCode::BTN_EAST);
        keys.insert(KeyCode::BTN_SOUTH);
        keys.insert(KeyCode::BTN_NORTH);
        keys.insert(KeyCode::BTN_WEST);
        keys.insert(KeyCode::BTN_TL);
        keys.insert(KeyCode::BTN_TL2);
        keys.insert(KeyCode::BTN_TR);
        keys.insert(KeyCode::BTN_TR2);
        keys.insert(KeyCode::BTN_THUMBL);
        keys.insert(KeyCode::BTN_THUMBR);
        keys.insert(KeyCode::BTN_SELECT);
        keys.insert(KeyCode::BTN_START);
        keys.insert(KeyCode::BTN_MODE);

        // Setup ABS inputs
        let stick_setup = AbsInfo::new(0, STICK_MIN as i32, STICK_MAX as i32, 0, 0, 0);
        let abs_x = UinputAbsSetup::new(AbsoluteAxisCode::ABS_X, stick_setup);
        let abs_y = UinputAbsSetup::new(AbsoluteAxisCode::ABS_Y, stick_setup);
        let abs_rx = UinputAbsSetup::new(AbsoluteAxisCode::ABS_RX, stick_setup);
        let abs_ry = UinputAbsSetup::new(AbsoluteAxisCode::ABS_RY, stick_setup);
        let volume_setup = AbsInfo::new(0, VOLUME_MIN, VOLUME_MAX, 0, 0, 0);
        let abs_volume = UinputAbsSetup::new(AbsoluteAxisCode::ABS_VOLUME, volume_setup);

        let name = format!("{DEVICE_NAME} buttons and sticks");
        let id = InputId::new(BusType::BUS_USB, VID, PID, 0x0100);

        let device = VirtualDeviceBuilder::new()?
            .name(name.as_str())
            .input_id(id)
            .with_keys(&keys)?
            .with_absolute_axis(&abs_x)?
            .with_absolute_axis(&abs_y)?
            .with_absolute_axis(&abs_rx)?
            .with_absolute_axis(&abs_ry)?
            .with_absolute_axis(&abs_volume)?
            .build()?;

        Ok(device)
    }

    /// Report the joypad state from the given frame and complete it with a
    /// single end-of-frame marker.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), Box<dyn Error + Send + Sync>> {
        let events = frame_events(frame);
        self.device.emit(events.as_slice())?;
        Ok(())
    }
}

/// Translate the given frame into evdev events. Every button and axis is
/// reported every frame; evdev discards the unchanged ones.
pub fn frame_events(frame: &Frame) -> Vec<InputEvent> {
    let buttons = &frame.buttons;
    let keys = [
        (KeyCode::BTN_DPAD_RIGHT, buttons.right),
        (KeyCode::BTN_DPAD_DOWN, buttons.down),
        (KeyCode::BTN_DPAD_LEFT, buttons.left),
        (KeyCode::BTN_DPAD_UP, buttons.up),
        (KeyCode::BTN_EAST, buttons.a),
        (KeyCode::BTN_SOUTH, buttons.b),
        (KeyCode::BTN_NORTH, buttons.x),
        (KeyCode::BTN_WEST, buttons.y),
        (KeyCode::BTN_TL, buttons.l),
        (KeyCode::BTN_TL2, buttons.zl),
        (KeyCode::BTN_TR, buttons.r),
        (KeyCode::BTN_TR2, buttons.zr),
        (KeyCode::BTN_THUMBL, buttons.l3),
        (KeyCode::BTN_THUMBR, buttons.r3),
        (KeyCode::BTN_SELECT, buttons.minus),
        (KeyCode::BTN_START, buttons.plus),
        (KeyCode::BTN_MODE, buttons.home),
    ];

    let mut events: Vec<InputEvent> = keys
        .iter()
        .map(|(code, pressed)| InputEvent::new(EventType::KEY.0, code.0, *pressed as i32))
        .collect();

    let axes = [
        AbsoluteAxisCode::ABS_X,
        AbsoluteAxisCode::ABS_Y,
        AbsoluteAxisCode::ABS_RX,
        AbsoluteAxisCode::ABS_RY,
    ];
    for (axis, value) in axes.iter().zip(frame.sticks.iter()) {
        events.push(InputEvent::new(
            EventType::ABSOLUTE.0,
            axis.0,
            *value as i32,
        ));
    }
    events.push(InputEvent::new(
        EventType::ABSOLUTE.0,
        AbsoluteAxisCode::ABS_VOLUME.0,
        frame.volume as i32,
    ));

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::drc::hid_report::ButtonState;

    fn frame() -> Frame {
        Frame {
            buttons: ButtonState {
                a: true,
                ..ButtonState::default()
            },
            sticks: [2048; 4],
            volume: 128,
            touch: Default::default(),
            motion: None,
        }
    }

    #[test]
    fn test_one_event_per_button_and_axis() {
        let events = frame_events(&frame());
        assert_eq!(events.len(), 17 + 4 + 1);
    }

    #[test]
    fn test_frame_translation() {
        let events = frame_events(&frame());

        let pressed: Vec<u16> = events
            .iter()
            .filter(|e| e.value() == 1)
            .map(|e| e.code())
            .collect();
        assert_eq!(pressed, vec![KeyCode::BTN_EAST.0]);

        for axis in [
            AbsoluteAxisCode::ABS_X,
            AbsoluteAxisCode::ABS_Y,
            AbsoluteAxisCode::ABS_RX,
            AbsoluteAxisCode::ABS_RY,
        ] {
            let value = events
                .iter()
                .find(|e| e.code() == axis.0 && e.value() != 1)
                .map(|e| e.value());
            assert_eq!(value, Some(2048));
        }

        let volume = events
            .iter()
            .find(|e| e.code() == AbsoluteAxisCode::ABS_VOLUME.0)
            .unwrap();
        assert_eq!(volume.value(), 128);
    }
}
