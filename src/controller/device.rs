//! Device events and the lease-based device service
//!
//! The capture state machine never touches a device backend directly. It asks
//! a [`DeviceService`] for a [`DeviceLease`], polls through it while capturing
//! and hands it back on every exit path. A lease is neither `Clone` nor
//! `Copy`, so at most one owner can hold it.

use std::fmt;

/// Axis magnitude (signed 16-bit range) that must be exceeded to count as input
pub const AXIS_THRESHOLD: i16 = 16384;

/// Position of a hat switch, including the states a capture ignores
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HatState {
    Centered,
    Up,
    Down,
    Left,
    Right,
    LeftUp,
    LeftDown,
    RightUp,
    RightDown,
}

impl HatState {
    /// Combines the two D-pad axes (-1, 0, 1; y positive is down) into a hat state
    pub fn from_axes(x: i8, y: i8) -> Self {
        match (x.signum(), y.signum()) {
            (0, 0) => HatState::Centered,
            (0, -1) => HatState::Up,
            (0, 1) => HatState::Down,
            (-1, 0) => HatState::Left,
            (1, 0) => HatState::Right,
            (-1, -1) => HatState::LeftUp,
            (-1, 1) => HatState::LeftDown,
            (1, -1) => HatState::RightUp,
            _ => HatState::RightDown,
        }
    }
}

/// Raw event reported by a device backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceEvent {
    ButtonDown { device: u32, button: u8 },
    AxisMotion { device: u32, axis: u8, value: i16 },
    HatMotion { device: u32, hat: u8, state: HatState },
}

impl DeviceEvent {
    pub fn device(&self) -> u32 {
        match self {
            DeviceEvent::ButtonDown { device, .. }
            | DeviceEvent::AxisMotion { device, .. }
            | DeviceEvent::HatMotion { device, .. } => *device,
        }
    }

    pub fn is_axis_motion(&self) -> bool {
        matches!(self, DeviceEvent::AxisMotion { .. })
    }
}

/// Exclusive permission to read one opened device
///
/// Created only by a [`DeviceService`] and returned to it through
/// [`DeviceService::release`].
pub struct DeviceLease {
    instance: u32,
}

impl DeviceLease {
    pub fn new(instance: u32) -> Self {
        Self { instance }
    }

    /// Instance id events of the leased device carry
    pub fn instance(&self) -> u32 {
        self.instance
    }
}

impl fmt::Debug for DeviceLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceLease(#{})", self.instance)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Failed to initialize device subsystem: {0}")]
    InitializationError(String),

    #[error("No device at index {0}")]
    NoDevice(usize),
}

/// Acquire/release service over the process-wide device subsystem
pub trait DeviceService {
    /// Opens the device at `index` (0 based, in connection order)
    fn acquire(&mut self, index: usize) -> Result<DeviceLease, DeviceError>;

    fn release(&mut self, lease: DeviceLease);

    /// Waits briefly and throws away buffered axis motion
    fn settle(&mut self, lease: &DeviceLease);

    /// Drains every pending event
    fn poll(&mut self, lease: &DeviceLease) -> Vec<DeviceEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hat_from_axes() {
        assert_eq!(HatState::from_axes(0, 0), HatState::Centered);
        assert_eq!(HatState::from_axes(0, -1), HatState::Up);
        assert_eq!(HatState::from_axes(1, 0), HatState::Right);
        assert_eq!(HatState::from_axes(1, 1), HatState::RightDown);
        assert_eq!(HatState::from_axes(-1, -1), HatState::LeftUp);
    }

    #[test]
    fn event_device_id() {
        let event = DeviceEvent::HatMotion {
            device: 3,
            hat: 0,
            state: HatState::Up,
        };
        assert_eq!(event.device(), 3);
        assert!(!event.is_axis_motion());
    }
}
