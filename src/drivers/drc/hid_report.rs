//! Sources:
//! - https://libdrc.org/docs/re/sc-input.html
//! - https://bitbucket.org/memahaxx/libdrc/src/master/src/input-receiver.cpp
//!
//! The DRC forms this report itself; the DRH only retransmits it over USB.
//! The layout was reversed by the libdrc project and has to be reproduced
//! bit for bit.
use thiserror::Error;

use super::{bytes, DriverVariant};

/// Size in bytes of one input report
pub const REPORT_LEN: usize = 128;

// Input report axis ranges
pub const STICK_MIN: i16 = 900;
pub const STICK_MAX: i16 = 3200;
pub const VOLUME_MIN: i32 = 0;
pub const VOLUME_MAX: i32 = 255;
pub const GYRO_MIN: i32 = -8_388_608;
pub const GYRO_MAX: i32 = 8_388_607;

/// Wire layout of the input report. Byte offsets into the 128-byte buffer,
/// consumed by [decode]. The basic and extended variants share this table;
/// the extended variant additionally reads the motion block.
mod layout {
    /// Button source bytes in mask assembly order, most significant first:
    /// `(b[4]<<24) | (b[80]<<16) | (b[2]<<8) | b[3]`
    pub const BUTTONS: [usize; 4] = [4, 80, 2, 3];
    /// Four signed 16-bit LE stick axes, 2 bytes each
    pub const STICKS: usize = 6;
    /// Unsigned 8-bit volume slider
    pub const VOLUME: usize = 14;
    /// Three signed 16-bit LE accelerometer axes
    pub const ACCEL: [usize; 3] = [15, 17, 19];
    /// Three signed 24-bit packed gyroscope axes, 3 bytes each
    pub const GYRO: [usize; 3] = [21, 24, 27];
    /// Three signed 16-bit LE magnetometer axes
    pub const MAG: [usize; 3] = [30, 32, 34];
    /// Touch subsamples: x and y as 12-bit LE pairs, [TOUCH_POINTS] of them
    /// at [TOUCH_STRIDE]-byte intervals
    pub const TOUCH: usize = 36;
    pub const TOUCH_STRIDE: usize = 4;
    pub const TOUCH_POINTS: usize = 10;
    /// One 3-bit pressure group in the high nibble of each of these bytes,
    /// assembled low group first
    pub const PRESSURE: [usize; 4] = [37, 39, 41, 43];
}

// Button bits within the assembled 32-bit mask. Bits 0 (sync pairing),
// 21 (TV control) and 25 (power) also exist on the wire but are not exposed
// as buttons.
pub const BUTTON_HOME: u32 = 1 << 1;
pub const BUTTON_MINUS: u32 = 1 << 2;
pub const BUTTON_PLUS: u32 = 1 << 3;
pub const BUTTON_R: u32 = 1 << 4;
pub const BUTTON_L: u32 = 1 << 5;
pub const BUTTON_ZR: u32 = 1 << 6;
pub const BUTTON_ZL: u32 = 1 << 7;
pub const BUTTON_DOWN: u32 = 1 << 8;
pub const BUTTON_UP: u32 = 1 << 9;
pub const BUTTON_RIGHT: u32 = 1 << 10;
pub const BUTTON_LEFT: u32 = 1 << 11;
pub const BUTTON_Y: u32 = 1 << 12;
pub const BUTTON_X: u32 = 1 << 13;
pub const BUTTON_B: u32 = 1 << 14;
pub const BUTTON_A: u32 = 1 << 15;
pub const BUTTON_R3: u32 = 1 << 22;
pub const BUTTON_L3: u32 = 1 << 23;

/// Number of analog stick axes
pub const NUM_STICK_AXES: usize = 4;

/// Possible errors when decoding an input report
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid input report length: {len} (expected {REPORT_LEN})")]
    InvalidFrameLength { len: usize },
}

/// State of the 17 gamepad buttons
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub l: bool,
    pub zl: bool,
    pub r: bool,
    pub zr: bool,
    pub l3: bool,
    pub r3: bool,
    pub minus: bool,
    pub plus: bool,
    pub home: bool,
}

impl ButtonState {
    /// Decode the 17 button states from the assembled 32-bit mask
    pub fn from_mask(mask: u32) -> Self {
        Self {
            a: mask & BUTTON_A != 0,
            b: mask & BUTTON_B != 0,
            x: mask & BUTTON_X != 0,
            y: mask & BUTTON_Y != 0,
            up: mask & BUTTON_UP != 0,
            down: mask & BUTTON_DOWN != 0,
            left: mask & BUTTON_LEFT != 0,
            right: mask & BUTTON_RIGHT != 0,
            l: mask & BUTTON_L != 0,
            zl: mask & BUTTON_ZL != 0,
            r: mask & BUTTON_R != 0,
            zr: mask & BUTTON_ZR != 0,
            l3: mask & BUTTON_L3 != 0,
            r3: mask & BUTTON_R3 != 0,
            minus: mask & BUTTON_MINUS != 0,
            plus: mask & BUTTON_PLUS != 0,
            home: mask & BUTTON_HOME != 0,
        }
    }
}

/// Averaged touch point in the panel's native 12-bit coordinate space.
/// The y coordinate keeps the panel orientation here; the flip into screen
/// coordinates happens at emission.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TouchSample {
    pub x: u16,
    pub y: u16,
    pub touching: bool,
}

/// Inertial and magnetic sensor sample. All values pass through unscaled
/// and unclamped.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MotionSample {
    pub accel: [i16; 3],
    pub gyro: [i32; 3],
    pub mag: [i16; 3],
}

/// One decoded input report
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame {
    pub buttons: ButtonState,
    /// Stick axes in the order left-x, left-y, right-x, right-y, clamped
    /// to [STICK_MIN]..=[STICK_MAX]
    pub sticks: [i16; NUM_STICK_AXES],
    pub volume: u8,
    pub touch: TouchSample,
    /// `Some` only for [DriverVariant::GamepadMotion]
    pub motion: Option<MotionSample>,
}

/// Decode one 128-byte input report. Rejects the whole report if the length
/// is wrong; no other validation is performed. Sensor and volume values pass
/// through even if implausible, only the stick axes are clamped.
pub fn decode(buf: &[u8], variant: DriverVariant) -> Result<Frame, DecodeError> {
    if buf.len() != REPORT_LEN {
        return Err(DecodeError::InvalidFrameLength { len: buf.len() });
    }

    let mut mask: u32 = 0;
    for byte in layout::BUTTONS {
        mask = (mask << 8) | bytes::read_u8(buf, byte) as u32;
    }
    let buttons = ButtonState::from_mask(mask);

    let mut sticks = [0i16; NUM_STICK_AXES];
    for (i, stick) in sticks.iter_mut().enumerate() {
        let raw = bytes::read_i16_le(buf, layout::STICKS + 2 * i);
        *stick = raw.clamp(STICK_MIN, STICK_MAX);
    }

    let volume = bytes::read_u8(buf, layout::VOLUME);

    // Average the touch subsamples for improved accuracy. The ten values
    // always land extremely close to each other, even with two or more
    // fingers down, so a single centroid is all this report can give us.
    let mut x: u32 = 0;
    let mut y: u32 = 0;
    for i in 0..layout::TOUCH_POINTS {
        let base = layout::TOUCH + layout::TOUCH_STRIDE * i;
        x += bytes::read_u12_le(buf, base) as u32;
        y += bytes::read_u12_le(buf, base + 2) as u32;
    }
    x /= layout::TOUCH_POINTS as u32;
    y /= layout::TOUCH_POINTS as u32;

    // The pressure encoding isn't properly understood, so the magnitude is
    // never exposed; a nonzero mask only means "touching".
    let mut pressure: u32 = 0;
    for (k, byte) in layout::PRESSURE.iter().enumerate() {
        pressure |= (((bytes::read_u8(buf, *byte) >> 4) & 7) as u32) << (3 * k);
    }

    let touch = TouchSample {
        x: x as u16,
        y: y as u16,
        touching: pressure != 0,
    };

    let motion = match variant {
        DriverVariant::Gamepad => None,
        DriverVariant::GamepadMotion => {
            let mut sample = MotionSample::default();
            for axis in 0..3 {
                sample.accel[axis] = bytes::read_i16_le(buf, layout::ACCEL[axis]);
                sample.gyro[axis] = bytes::read_i24_shifted(buf, layout::GYRO[axis]);
                sample.mag[axis] = bytes::read_i16_le(buf, layout::MAG[axis]);
            }
            Some(sample)
        }
    };

    Ok(Frame {
        buttons,
        sticks,
        volume,
        touch,
        motion,
    })
}
