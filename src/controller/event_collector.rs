//! gilrs backed device service
//!
//! Translates gilrs events into [`DeviceEvent`]s in the numbering of a classic
//! joystick API: buttons and axes get fixed ordinals, stick values are scaled
//! to the signed 16-bit range with y pointing down, and the D-pad (reported by
//! gilrs either as buttons or as the `DPadX`/`DPadY` axes) becomes hat 0.
//!
//! gilrs queues events from every pad whether or not a capture is running.
//! [`EventSource`] is the narrow view of that queue the service needs, so the
//! conversion and the backlog handling can run against a scripted queue.

use super::device::{DeviceError, DeviceEvent, DeviceLease, DeviceService, HatState};
use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Pause before buffered motion is discarded when a capture starts
pub const SETTLE_PAUSE: Duration = Duration::from_millis(10);

/// Input of one pad as read from the backend queue
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    ButtonPressed(Button),
    ButtonReleased(Button),
    AxisChanged(Axis, f32),
    Connected,
    Disconnected,
    Other,
}

impl From<EventType> for RawInput {
    fn from(event: EventType) -> Self {
        match event {
            EventType::ButtonPressed(button, _) => RawInput::ButtonPressed(button),
            EventType::ButtonReleased(button, _) => RawInput::ButtonReleased(button),
            EventType::AxisChanged(axis, value, _) => RawInput::AxisChanged(axis, value),
            EventType::Connected => RawInput::Connected,
            EventType::Disconnected => RawInput::Disconnected,
            _ => RawInput::Other,
        }
    }
}

/// Queue of pad events, keyed by instance id
pub trait EventSource {
    fn next_input(&mut self) -> Option<(u32, RawInput)>;

    /// Instance id and name of the `index`-th connected pad
    fn gamepad(&self, index: usize) -> Option<(u32, String)>;
}

impl EventSource for Gilrs {
    fn next_input(&mut self) -> Option<(u32, RawInput)> {
        self.next_event()
            .map(|Event { id, event, .. }| (instance_of(id), RawInput::from(event)))
    }

    fn gamepad(&self, index: usize) -> Option<(u32, String)> {
        self.gamepads()
            .nth(index)
            .map(|(id, gamepad)| (instance_of(id), gamepad.name().to_string()))
    }
}

/// Last reported D-pad position of one pad
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Dpad {
    x: i8,
    y: i8,
}

impl Dpad {
    fn state(self) -> HatState {
        HatState::from_axes(self.x, self.y)
    }
}

pub struct GilrsDevices<S = Gilrs> {
    source: S,
    leased: Option<u32>,
    // events read during settle that were not motion
    pending: VecDeque<DeviceEvent>,
    dpads: HashMap<u32, Dpad>,
}

impl GilrsDevices {
    pub fn init() -> Result<Self, DeviceError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(DeviceError::InitializationError(e.to_string()));
            }
        };

        Ok(Self::with_source(gilrs))
    }
}

impl<S: EventSource> GilrsDevices<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            leased: None,
            pending: VecDeque::new(),
            dpads: HashMap::new(),
        }
    }

    fn drain(&mut self) -> Vec<DeviceEvent> {
        let mut events = Vec::new();
        while let Some((device, input)) = self.source.next_input() {
            if let Some(converted) = self.convert(device, input) {
                events.push(converted);
            }
        }
        events
    }

    /// Reads everything queued so far and drops it. D-pad positions are still
    /// tracked, so a hat held across the start of a capture stays known.
    fn discard_backlog(&mut self) -> usize {
        self.drain().len()
    }

    fn convert(&mut self, device: u32, input: RawInput) -> Option<DeviceEvent> {
        match input {
            RawInput::ButtonPressed(button) => {
                if self.update_dpad_button(device, button, true) {
                    return Some(self.hat_event(device));
                }
                match button_index(button) {
                    Some(button) => Some(DeviceEvent::ButtonDown { device, button }),
                    None => {
                        debug!("Ignoring unmapped button: {:?}", button);
                        None
                    }
                }
            }
            RawInput::ButtonReleased(button) => self
                .update_dpad_button(device, button, false)
                .then(|| self.hat_event(device)),
            RawInput::AxisChanged(Axis::DPadX, value) => {
                self.dpads.entry(device).or_default().x = dpad_step(value);
                Some(self.hat_event(device))
            }
            RawInput::AxisChanged(Axis::DPadY, value) => {
                // gilrs reports up as positive
                self.dpads.entry(device).or_default().y = -dpad_step(value);
                Some(self.hat_event(device))
            }
            RawInput::AxisChanged(axis, value) => {
                let Some(index) = axis_index(axis) else {
                    debug!("Ignoring unsupported axis: {:?}", axis);
                    return None;
                };
                let value = match axis {
                    Axis::LeftStickY | Axis::RightStickY => scale_axis(-value),
                    _ => scale_axis(value),
                };
                Some(DeviceEvent::AxisMotion {
                    device,
                    axis: index,
                    value,
                })
            }
            RawInput::Connected => {
                info!("Controller {} connected", device);
                None
            }
            RawInput::Disconnected => {
                warn!("Controller {} disconnected", device);
                self.dpads.remove(&device);
                None
            }
            RawInput::Other => None,
        }
    }

    fn update_dpad_button(&mut self, device: u32, button: Button, pressed: bool) -> bool {
        let amount = i8::from(pressed);
        let dpad = match button {
            Button::DPadUp | Button::DPadDown | Button::DPadLeft | Button::DPadRight => {
                self.dpads.entry(device).or_default()
            }
            _ => return false,
        };
        match button {
            Button::DPadUp => dpad.y = -amount,
            Button::DPadDown => dpad.y = amount,
            Button::DPadLeft => dpad.x = -amount,
            _ => dpad.x = amount,
        }
        true
    }

    fn hat_event(&self, device: u32) -> DeviceEvent {
        let state = self
            .dpads
            .get(&device)
            .copied()
            .unwrap_or_default()
            .state();
        DeviceEvent::HatMotion {
            device,
            hat: 0,
            state,
        }
    }
}

impl<S: EventSource> DeviceService for GilrsDevices<S> {
    fn acquire(&mut self, index: usize) -> Result<DeviceLease, DeviceError> {
        // draining first also lets gilrs register pads that connected while idle
        let discarded = self.discard_backlog();
        if discarded > 0 {
            debug!("Discarded {} events queued before the capture", discarded);
        }

        let Some((instance, name)) = self.source.gamepad(index) else {
            warn!("No gamepad connected at index {}", index);
            return Err(DeviceError::NoDevice(index));
        };
        info!("Opened gamepad {} ({}) for capture", name, instance);

        self.leased = Some(instance);
        self.pending.clear();
        Ok(DeviceLease::new(instance))
    }

    fn release(&mut self, lease: DeviceLease) {
        debug!("Releasing {:?}", lease);
        self.leased = None;
        self.pending.clear();
    }

    fn settle(&mut self, lease: &DeviceLease) {
        std::thread::sleep(SETTLE_PAUSE);
        let events = self.drain();
        let before = events.len();
        self.pending
            .extend(events.into_iter().filter(|e| !e.is_axis_motion()));
        debug!(
            "Settled {:?}: discarded {} motion events",
            lease,
            before - self.pending.len()
        );
    }

    fn poll(&mut self, lease: &DeviceLease) -> Vec<DeviceEvent> {
        if self.leased != Some(lease.instance()) {
            warn!("Polling with a lease that is not current: {:?}", lease);
        }
        let mut events: Vec<DeviceEvent> = self.pending.drain(..).collect();
        events.extend(self.drain());
        events
    }
}

fn instance_of(id: GamepadId) -> u32 {
    usize::from(id) as u32
}

// D-pad axes only ever rest at -1, 0 or 1
fn dpad_step(value: f32) -> i8 {
    if value > 0.5 {
        1
    } else if value < -0.5 {
        -1
    } else {
        0
    }
}

fn scale_axis(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16
}

// Button ordinals in the order of the SDL game controller layout
fn button_index(button: Button) -> Option<u8> {
    match button {
        Button::South => Some(0),
        Button::East => Some(1),
        Button::West => Some(2),
        Button::North => Some(3),
        Button::Select => Some(4),
        Button::Mode => Some(5),
        Button::Start => Some(6),
        Button::LeftThumb => Some(7),
        Button::RightThumb => Some(8),
        Button::LeftTrigger => Some(9),
        Button::RightTrigger => Some(10),
        Button::LeftTrigger2 => Some(11),
        Button::RightTrigger2 => Some(12),
        Button::C => Some(13),
        Button::Z => Some(14),
        _ => None,
    }
}

fn axis_index(axis: Axis) -> Option<u8> {
    match axis {
        Axis::LeftStickX => Some(0),
        Axis::LeftStickY => Some(1),
        Axis::LeftZ => Some(2),
        Axis::RightStickX => Some(3),
        Axis::RightStickY => Some(4),
        Axis::RightZ => Some(5),
        _ => None,
    }
}
