use crate::mapping::keycode::KeyCode;
use crate::output::{KeySink, SinkError};
use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key};
use std::sync::Mutex;
use tracing::{debug, info};

const DEVICE_NAME: &str = "kanapad virtual keyboard";

/// Types into the system through a uinput virtual keyboard
pub struct UinputSink {
    device: Mutex<VirtualDevice>,
}

impl UinputSink {
    pub fn create() -> Result<Self, SinkError> {
        let mut keys: AttributeSet<Key> = AttributeSet::new();
        for key in KeyCode::ALL {
            keys.insert(evdev_key(key));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(|e| SinkError::InitializationError(format!("uinput unavailable: {}", e)))?
            .name(DEVICE_NAME)
            .with_keys(&keys)
            .map_err(|e| SinkError::InitializationError(format!("Failed to set keys: {}", e)))?
            .build()
            .map_err(|e| SinkError::InitializationError(format!("Failed to build device: {}", e)))?;

        info!("Created virtual keyboard '{}'", DEVICE_NAME);
        Ok(Self {
            device: Mutex::new(device),
        })
    }

    fn emit(&self, key: KeyCode, value: i32) -> Result<(), SinkError> {
        let event = InputEvent::new(EventType::KEY, evdev_key(key).code(), value);
        let mut device = self
            .device
            .lock()
            .map_err(|e| SinkError::EmitError(format!("Device lock poisoned: {}", e)))?;
        device
            .emit(&[event])
            .map_err(|e| SinkError::EmitError(format!("{:?}: {}", key, e)))?;
        debug!("Emitted {:?} = {}", key, value);
        Ok(())
    }
}

impl KeySink for UinputSink {
    fn key_down(&self, key: KeyCode) -> Result<(), SinkError> {
        self.emit(key, 1)
    }

    fn key_up(&self, key: KeyCode) -> Result<(), SinkError> {
        self.emit(key, 0)
    }

    fn name(&self) -> &str {
        "uinput"
    }
}

fn evdev_key(key: KeyCode) -> Key {
    match key {
        KeyCode::A => Key::KEY_A,
        KeyCode::B => Key::KEY_B,
        KeyCode::C => Key::KEY_C,
        KeyCode::D => Key::KEY_D,
        KeyCode::E => Key::KEY_E,
        KeyCode::F => Key::KEY_F,
        KeyCode::G => Key::KEY_G,
        KeyCode::H => Key::KEY_H,
        KeyCode::I => Key::KEY_I,
        KeyCode::J => Key::KEY_J,
        KeyCode::K => Key::KEY_K,
        KeyCode::L => Key::KEY_L,
        KeyCode::M => Key::KEY_M,
        KeyCode::N => Key::KEY_N,
        KeyCode::O => Key::KEY_O,
        KeyCode::P => Key::KEY_P,
        KeyCode::Q => Key::KEY_Q,
        KeyCode::R => Key::KEY_R,
        KeyCode::S => Key::KEY_S,
        KeyCode::T => Key::KEY_T,
        KeyCode::U => Key::KEY_U,
        KeyCode::V => Key::KEY_V,
        KeyCode::W => Key::KEY_W,
        KeyCode::X => Key::KEY_X,
        KeyCode::Y => Key::KEY_Y,
        KeyCode::Z => Key::KEY_Z,
        KeyCode::Digit0 => Key::KEY_0,
        KeyCode::Digit1 => Key::KEY_1,
        KeyCode::Digit2 => Key::KEY_2,
        KeyCode::Digit3 => Key::KEY_3,
        KeyCode::Digit4 => Key::KEY_4,
        KeyCode::Digit5 => Key::KEY_5,
        KeyCode::Digit6 => Key::KEY_6,
        KeyCode::Digit7 => Key::KEY_7,
        KeyCode::Digit8 => Key::KEY_8,
        KeyCode::Digit9 => Key::KEY_9,
        KeyCode::Space => Key::KEY_SPACE,
        KeyCode::Enter => Key::KEY_ENTER,
        KeyCode::Backspace => Key::KEY_BACKSPACE,
        KeyCode::ArrowUp => Key::KEY_UP,
        KeyCode::ArrowDown => Key::KEY_DOWN,
        KeyCode::ArrowLeft => Key::KEY_LEFT,
        KeyCode::ArrowRight => Key::KEY_RIGHT,
        KeyCode::Shift => Key::KEY_LEFTSHIFT,
        KeyCode::Minus => Key::KEY_MINUS,
        KeyCode::Comma => Key::KEY_COMMA,
        KeyCode::Period => Key::KEY_DOT,
        KeyCode::Slash => Key::KEY_SLASH,
        KeyCode::F7 => Key::KEY_F7,
        KeyCode::ZenkakuHankaku => Key::KEY_ZENKAKUHANKAKU,
    }
}
