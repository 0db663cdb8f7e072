use crate::drivers::drc::hid_report::{
    decode, ButtonState, DecodeError, Frame, MotionSample, BUTTON_A, BUTTON_B, BUTTON_DOWN,
    BUTTON_HOME, BUTTON_L, BUTTON_L3, BUTTON_LEFT, BUTTON_MINUS, BUTTON_PLUS, BUTTON_R, BUTTON_R3,
    BUTTON_RIGHT, BUTTON_UP, BUTTON_X, BUTTON_Y, BUTTON_ZL, BUTTON_ZR, REPORT_LEN,
};
use crate::drivers::drc::DriverVariant;

fn report() -> [u8; REPORT_LEN] {
    [0; REPORT_LEN]
}

/// Scatter a 32-bit button mask back into its non-contiguous source bytes
fn set_buttons(buf: &mut [u8; REPORT_LEN], mask: u32) {
    buf[4] |= (mask >> 24) as u8;
    buf[80] |= (mask >> 16) as u8;
    buf[2] |= (mask >> 8) as u8;
    buf[3] |= mask as u8;
}

fn set_stick(buf: &mut [u8; REPORT_LEN], axis: usize, value: i16) {
    let bytes = value.to_le_bytes();
    buf[6 + 2 * axis] = bytes[0];
    buf[7 + 2 * axis] = bytes[1];
}

/// Write the same 12-bit x/y value into all ten touch subsamples. Values
/// must stay below 0x1000 so the pressure nibbles remain untouched.
fn set_touch(buf: &mut [u8; REPORT_LEN], x: u16, y: u16) {
    for i in 0..10 {
        let base = 36 + 4 * i;
        buf[base] = x as u8;
        buf[base + 1] = (x >> 8) as u8 & 0xF;
        buf[base + 2] = y as u8;
        buf[base + 3] = (y >> 8) as u8 & 0xF;
    }
}

fn pressed(buttons: &ButtonState) -> Vec<bool> {
    vec![
        buttons.a,
        buttons.b,
        buttons.x,
        buttons.y,
        buttons.up,
        buttons.down,
        buttons.left,
        buttons.right,
        buttons.l,
        buttons.zl,
        buttons.r,
        buttons.zr,
        buttons.l3,
        buttons.r3,
        buttons.minus,
        buttons.plus,
        buttons.home,
    ]
}

#[test]
fn test_rejects_bad_lengths() {
    for len in [0usize, 1, 127, 129, 256] {
        let buf = vec![0u8; len];
        for variant in [DriverVariant::Gamepad, DriverVariant::GamepadMotion] {
            let err = decode(&buf, variant).unwrap_err();
            assert_eq!(err, DecodeError::InvalidFrameLength { len });
        }
    }
}

#[test]
fn test_decode_is_pure() {
    let mut buf = report();
    set_buttons(&mut buf, BUTTON_A | BUTTON_ZL);
    set_stick(&mut buf, 2, 1777);
    set_touch(&mut buf, 123, 456);
    buf[14] = 99;

    let first = decode(&buf, DriverVariant::GamepadMotion).unwrap();
    for _ in 0..3 {
        assert_eq!(decode(&buf, DriverVariant::GamepadMotion).unwrap(), first);
    }
}

#[test]
fn test_each_button_decodes_alone() {
    let cases: [(u32, usize); 17] = [
        (BUTTON_A, 0),
        (BUTTON_B, 1),
        (BUTTON_X, 2),
        (BUTTON_Y, 3),
        (BUTTON_UP, 4),
        (BUTTON_DOWN, 5),
        (BUTTON_LEFT, 6),
        (BUTTON_RIGHT, 7),
        (BUTTON_L, 8),
        (BUTTON_ZL, 9),
        (BUTTON_R, 10),
        (BUTTON_ZR, 11),
        (BUTTON_L3, 12),
        (BUTTON_R3, 13),
        (BUTTON_MINUS, 14),
        (BUTTON_PLUS, 15),
        (BUTTON_HOME, 16),
    ];

    for (mask, index) in cases {
        let mut buf = report();
        set_buttons(&mut buf, mask);
        let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
        let states = pressed(&frame.buttons);
        for (i, state) in states.iter().enumerate() {
            assert_eq!(
                *state,
                i == index,
                "button bit {mask:#010x} decoded wrong state at {i}"
            );
        }
    }
}

#[test]
fn test_button_combinations() {
    let mut buf = report();
    set_buttons(&mut buf, BUTTON_A | BUTTON_B);
    let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
    assert!(frame.buttons.a);
    assert!(frame.buttons.b);
    assert_eq!(pressed(&frame.buttons).iter().filter(|p| **p).count(), 2);
}

#[test]
fn test_stick_clamping_per_axis() {
    for axis in 0..4 {
        // Below range clamps up
        let mut buf = report();
        set_stick(&mut buf, axis, 899);
        let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
        assert_eq!(frame.sticks[axis], 900);

        let mut buf = report();
        set_stick(&mut buf, axis, -32768);
        let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
        assert_eq!(frame.sticks[axis], 900);

        // Above range clamps down
        let mut buf = report();
        set_stick(&mut buf, axis, 3201);
        let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
        assert_eq!(frame.sticks[axis], 3200);

        let mut buf = report();
        set_stick(&mut buf, axis, 32767);
        let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
        assert_eq!(frame.sticks[axis], 3200);

        // In-range passes through
        let mut buf = report();
        set_stick(&mut buf, axis, 2048);
        let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
        assert_eq!(frame.sticks[axis], 2048);

        // Other axes still clamp their zeroed bytes up
        for other in (0..4).filter(|other| *other != axis) {
            assert_eq!(frame.sticks[other], 900);
        }
    }
}

#[test]
fn test_volume_passes_through() {
    let mut buf = report();
    buf[14] = 0;
    assert_eq!(decode(&buf, DriverVariant::Gamepad).unwrap().volume, 0);
    buf[14] = 128;
    assert_eq!(decode(&buf, DriverVariant::Gamepad).unwrap().volume, 128);
    buf[14] = 255;
    assert_eq!(decode(&buf, DriverVariant::Gamepad).unwrap().volume, 255);
}

#[test]
fn test_touch_centroid_identical_subsamples() {
    let mut buf = report();
    set_touch(&mut buf, 1000, 600);
    let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
    assert_eq!(frame.touch.x, 1000);
    assert_eq!(frame.touch.y, 600);
}

#[test]
fn test_touch_centroid_truncating_division() {
    // Nine samples of zero plus one of 15: the sum of 15 divides to 1
    let mut buf = report();
    buf[36] = 15;
    buf[38] = 19;
    let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
    assert_eq!(frame.touch.x, 1);
    assert_eq!(frame.touch.y, 1);

    // Repeated runs agree
    for _ in 0..3 {
        assert_eq!(decode(&buf, DriverVariant::Gamepad).unwrap().touch, frame.touch);
    }
}

#[test]
fn test_touch_presence_per_pressure_group() {
    let buf = report();
    let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
    assert!(!frame.touch.touching);

    for byte in [37usize, 39, 41, 43] {
        let mut buf = report();
        buf[byte] = 0x10;
        let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
        assert!(frame.touch.touching, "pressure nibble at {byte} not seen");
    }

    // The low nibble of a pressure source byte belongs to a touch
    // coordinate, not to the pressure mask
    let mut buf = report();
    buf[37] = 0x0F;
    let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
    assert!(!frame.touch.touching);
}

#[test]
fn test_motion_only_on_extended_variant() {
    let buf = report();
    assert!(decode(&buf, DriverVariant::Gamepad).unwrap().motion.is_none());
    assert!(decode(&buf, DriverVariant::GamepadMotion)
        .unwrap()
        .motion
        .is_some());
}

#[test]
fn test_motion_decode() {
    let mut buf = report();
    // accel x = 0x1234, y = -100, z = 257
    buf[15] = 0x34;
    buf[16] = 0x12;
    buf[17] = 0x9C;
    buf[18] = 0xFF;
    buf[19] = 0x01;
    buf[20] = 0x01;
    // gyro x = max positive, y = max negative, z = -1
    buf[21] = 0xFF;
    buf[22] = 0xFF;
    buf[23] = 0x7F;
    buf[24] = 0x00;
    buf[25] = 0x00;
    buf[26] = 0x80;
    buf[27] = 0xFF;
    buf[28] = 0xFF;
    buf[29] = 0xFF;
    // mag x = 1, y = -2, z = 0x7FFF
    buf[30] = 0x01;
    buf[31] = 0x00;
    buf[32] = 0xFE;
    buf[33] = 0xFF;
    buf[34] = 0xFF;
    buf[35] = 0x7F;

    let frame = decode(&buf, DriverVariant::GamepadMotion).unwrap();
    let motion = frame.motion.unwrap();
    assert_eq!(
        motion,
        MotionSample {
            accel: [0x1234, -100, 257],
            gyro: [8_388_607, -8_388_608, -1],
            mag: [1, -2, 0x7FFF],
        }
    );
}

#[test]
fn test_end_to_end_frame() {
    let mut buf = report();
    set_buttons(&mut buf, BUTTON_A);
    for axis in 0..4 {
        set_stick(&mut buf, axis, 2048);
    }
    buf[14] = 128;

    let expected_buttons = ButtonState {
        a: true,
        ..ButtonState::default()
    };

    let frame = decode(&buf, DriverVariant::Gamepad).unwrap();
    assert_eq!(
        frame,
        Frame {
            buttons: expected_buttons,
            sticks: [2048; 4],
            volume: 128,
            touch: Default::default(),
            motion: None,
        }
    );

    let frame = decode(&buf, DriverVariant::GamepadMotion).unwrap();
    assert_eq!(frame.motion, Some(MotionSample::default()));
}
