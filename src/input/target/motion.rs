use std::error::Error;

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisCode, AttributeSet, BusType, EventType, InputEvent, InputId, PropType,
    UinputAbsSetup,
};

use crate::drivers::drc::{
    hid_report::{MotionSample, GYRO_MAX, GYRO_MIN},
    DEVICE_NAME, PID, VID,
};

// Accelerometer and magnetometer values are raw signed 16-bit samples
const SENSOR_MIN: i32 = i16::MIN as i32;
const SENSOR_MAX: i32 = i16::MAX as i32;

/// The inertial and magnetic sensors, exposed as one accelerometer-class
/// virtual device. Only built for the motion variant. The magnetometer has
/// no canonical evdev axes, so it rides on the spare throttle/rudder/wheel
/// axes.
pub struct MotionDevice {
    device: VirtualDevice,
}

impl MotionDevice {
    pub fn new() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let device = MotionDevice::create_virtual_device()?;
        Ok(Self { device })
    }

    /// Create the virtual device to emulate
    fn create_virtual_device() -> Result<VirtualDevice, Box<dyn Error + Send + Sync>> {
        let mut properties = AttributeSet::<PropType>::new();
        properties.insert(PropType::ACCELEROMETER);

        let sensor_setup = AbsInfo::new(0, SENSOR_MIN, SENSOR_MAX, 0, 0, 0);
        let gyro_setup = AbsInfo::new(0, GYRO_MIN, GYRO_MAX, 0, 0, 0);

        let abs_x = UinputAbsSetup::new(AbsoluteAxisCode::ABS_X, sensor_setup);
        let abs_y = UinputAbsSetup::new(AbsoluteAxisCode::ABS_Y, sensor_setup);
        let abs_z = UinputAbsSetup::new(AbsoluteAxisCode::ABS_Z, sensor_setup);
        let abs_rx = UinputAbsSetup::new(AbsoluteAxisCode::ABS_RX, gyro_setup);
        let abs_ry = UinputAbsSetup::new(AbsoluteAxisCode::ABS_RY, gyro_setup);
        let abs_rz = UinputAbsSetup::new(AbsoluteAxisCode::ABS_RZ, gyro_setup);
        let abs_mag_x = UinputAbsSetup::new(AbsoluteAxisCode::ABS_THROTTLE, sensor_setup);
        let abs_mag_y = UinputAbsSetup::new(AbsoluteAxisCode::ABS_RUDDER, sensor_setup);
        let abs_mag_z = UinputAbsSetup::new(AbsoluteAxisCode::ABS_WHEEL, sensor_setup);

        let name = format!("{DEVICE_NAME} motion sensors");
        let id = InputId::new(BusType::BUS_USB, VID, PID, 0x0100);

        let device = VirtualDeviceBuilder::new()?
            .name(name.as_str())
            .input_id(id)
            .with_properties(&properties)?
            .with_absolute_axis(&abs_x)?
            .with_absolute_axis(&abs_y)?
            .with_absolute_axis(&abs_z)?
            .with_absolute_axis(&abs_rx)?
            .with_absolute_axis(&abs_ry)?
            .with_absolute_axis(&abs_rz)?
            .with_absolute_axis(&abs_mag_x)?
            .with_absolute_axis(&abs_mag_y)?
            .with_absolute_axis(&abs_mag_z)?
            .build()?;

        Ok(device)
    }

    /// Report the sensor state and complete it with a single end-of-frame
    /// marker. Motion is synced every report regardless of activity.
    pub fn write_frame(
        &mut self,
        motion: &MotionSample,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let events = frame_events(motion);
        self.device.emit(events.as_slice())?;
        Ok(())
    }
}

/// Translate the given motion sample into evdev events, pass-through
pub fn frame_events(motion: &MotionSample) -> Vec<InputEvent> {
    let accel_axes = [
        AbsoluteAxisCode::ABS_X,
        AbsoluteAxisCode::ABS_Y,
        AbsoluteAxisCode::ABS_Z,
    ];
    let gyro_axes = [
        AbsoluteAxisCode::ABS_RX,
        AbsoluteAxisCode::ABS_RY,
        AbsoluteAxisCode::ABS_RZ,
    ];
    let mag_axes = [
        AbsoluteAxisCode::ABS_THROTTLE,
        AbsoluteAxisCode::ABS_RUDDER,
        AbsoluteAxisCode::ABS_WHEEL,
    ];

    let mut events = Vec::new();
    for (axis, value) in accel_axes.iter().zip(motion.accel.iter()) {
        events.push(InputEvent::new(
            EventType::ABSOLUTE.0,
            axis.0,
            *value as i32,
        ));
    }
    for (axis, value) in gyro_axes.iter().zip(motion.gyro.iter()) {
        events.push(InputEvent::new(EventType::ABSOLUTE.0, axis.0, *value));
    }
    for (axis, value) in mag_axes.iter().zip(motion.mag.iter()) {
        events.push(InputEvent::new(
            EventType::ABSOLUTE.0,
            axis.0,
            *value as i32,
        ));
    }

    events
}
