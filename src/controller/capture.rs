//! Capture state machine
//!
//! Listens for exactly one qualifying physical event and turns it into a
//! [`KeySpec`].
//!
//! # State Machine
//!
//! ```text
//!            start (acquire lease, arm poll, settle)
//!   Idle ───────────────────────────────────────────► Capturing
//!    ▲                                                    │
//!    └────────────────────────────────────────────────────┘
//!      first recognized event / preemption
//!      (release lease, disarm poll, signal Ended)
//! ```
//!
//! The session itself is a statum typestate. [`Capturer`] wraps it for the
//! host event loop, which only knows at runtime which state it is in.

use super::device::{DeviceEvent, DeviceLease, DeviceService, HatState, AXIS_THRESHOLD};
use super::poll_timer::PollTimer;
use crate::mapping::binding::ControlId;
use crate::mapping::keyspec::{Direction, KeySpec, Sign};
use statum::{machine, state};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Controller slot and control a capture writes into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CaptureTarget {
    pub controller: usize,
    pub control: ControlId,
}

/// Lifecycle notifications for the host, which owns the pressed-state visuals
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureSignal {
    Started(CaptureTarget),
    Ended(CaptureTarget),
}

/// Result of a completed capture
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Captured {
    pub target: CaptureTarget,
    pub key: KeySpec,
}

#[state]
#[derive(Debug, Clone)]
pub enum CaptureState {
    Idle,
    Capturing(CaptureTarget),
}

#[machine]
pub struct CaptureSession<S: CaptureState> {
    // owned exclusively while capturing, None when no device could be opened
    lease: Option<DeviceLease>,
}

impl CaptureSession<Idle> {
    pub fn create() -> Self {
        Self::new(None)
    }

    pub fn begin(mut self, target: CaptureTarget, lease: Option<DeviceLease>) -> CaptureSession<Capturing> {
        debug!("Capture session for {:?} with {:?}", target, lease);
        self.lease = lease;
        self.transition_with(target)
    }
}

impl CaptureSession<Capturing> {
    pub fn target(&self) -> Option<CaptureTarget> {
        self.get_state_data().copied()
    }

    pub fn lease(&self) -> Option<&DeviceLease> {
        self.lease.as_ref()
    }

    /// Hands the lease back to the caller and returns to Idle
    pub fn end(mut self) -> (CaptureSession<Idle>, Option<DeviceLease>) {
        let lease = self.lease.take();
        (self.transition(), lease)
    }
}

enum Phase {
    Idle(CaptureSession<Idle>),
    Capturing(CaptureSession<Capturing>),
}

/// Maps one device event to a key, if it qualifies.
///
/// Events from devices other than `instance` are ignored, as are axis values
/// inside the dead zone and centered or diagonal hat positions.
pub fn classify(event: &DeviceEvent, instance: u32) -> Option<KeySpec> {
    if event.device() != instance {
        return None;
    }

    match *event {
        DeviceEvent::ButtonDown { button, .. } => Some(KeySpec::button(i32::from(button))),
        DeviceEvent::AxisMotion { axis, value, .. } => {
            let sign = if value > AXIS_THRESHOLD {
                Sign::Plus
            } else if value < -AXIS_THRESHOLD {
                Sign::Minus
            } else {
                return None;
            };
            Some(KeySpec::axis(i32::from(axis), sign))
        }
        DeviceEvent::HatMotion { hat, state, .. } => {
            let direction = match state {
                HatState::Up => Direction::Up,
                HatState::Down => Direction::Down,
                HatState::Left => Direction::Left,
                HatState::Right => Direction::Right,
                _ => return None,
            };
            Some(KeySpec::hat(i32::from(hat), direction))
        }
    }
}

/// Runtime driver of the capture session
///
/// Owns the device service. At most one capture is active; starting another
/// one tears the current one down first.
pub struct Capturer {
    phase: Phase,
    timer: PollTimer,
    devices: Option<Box<dyn DeviceService>>,
    device_index: usize,
    signals: Vec<CaptureSignal>,
}

impl Capturer {
    /// `devices` is `None` when the device subsystem could not be initialized,
    /// which disables capturing.
    pub fn new(devices: Option<Box<dyn DeviceService>>) -> Self {
        Self {
            phase: Phase::Idle(CaptureSession::create()),
            timer: PollTimer::default(),
            devices,
            device_index: 0,
            signals: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.devices.is_some()
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.phase, Phase::Capturing(_))
    }

    pub fn active_target(&self) -> Option<CaptureTarget> {
        match &self.phase {
            Phase::Capturing(session) => session.target(),
            Phase::Idle(_) => None,
        }
    }

    /// Starts listening for `target`. Returns false when capturing is disabled.
    pub fn start(&mut self, target: CaptureTarget, now: Instant) -> bool {
        if self.devices.is_none() {
            warn!("Ignoring capture request, device subsystem unavailable");
            return false;
        }
        if self.is_capturing() {
            info!("Preempting active capture for {:?}", target);
            self.finish();
        }
        let Some(devices) = self.devices.as_mut() else {
            return false;
        };

        let lease = match devices.acquire(self.device_index) {
            Ok(lease) => Some(lease),
            Err(e) => {
                warn!("Capturing keyboard only: {}", e);
                None
            }
        };

        let Phase::Idle(idle) =
            std::mem::replace(&mut self.phase, Phase::Idle(CaptureSession::create()))
        else {
            error!("Capture still active after teardown");
            return false;
        };
        let session = idle.begin(target, lease);
        self.timer.arm(now);

        // residual motion from the activating click must not count
        if let Some(lease) = session.lease() {
            devices.settle(lease);
        }

        self.phase = Phase::Capturing(session);
        self.signals.push(CaptureSignal::Started(target));
        info!("Capturing input for {:?}", target);
        true
    }

    /// Runs the poll tick if it is due at `now`
    pub fn tick(&mut self, now: Instant) -> Option<Captured> {
        if self.timer.fire(now) {
            self.poll()
        } else {
            None
        }
    }

    /// One poll tick: drains pending device events and completes the capture
    /// on the first one that qualifies.
    pub fn poll(&mut self) -> Option<Captured> {
        let Phase::Capturing(session) = &self.phase else {
            warn!("Poll tick while not capturing, should never happen");
            return None;
        };
        let target = session.target()?;

        let (Some(lease), Some(devices)) = (session.lease(), self.devices.as_mut()) else {
            return None;
        };
        let instance = lease.instance();
        let events = devices.poll(lease);
        if !events.is_empty() {
            debug!("Poll drained {} events", events.len());
        }

        let key = events.iter().find_map(|event| classify(event, instance))?;
        info!("Captured {} for {:?}", key, target);
        self.finish();
        Some(Captured { target, key })
    }

    /// Keyboard path, independent of the poll
    pub fn key_press(&mut self, code: i32) -> Option<Captured> {
        let target = self.active_target()?;
        let key = KeySpec::key(code);
        info!("Captured {} for {:?}", key, target);
        self.finish();
        Some(Captured { target, key })
    }

    /// Aborts an active capture without producing a key
    pub fn cancel(&mut self) {
        if self.finish().is_some() {
            debug!("Capture cancelled");
        }
    }

    pub fn next_poll_in(&self, now: Instant) -> Option<Duration> {
        self.timer.remaining(now)
    }

    pub fn take_signals(&mut self) -> Vec<CaptureSignal> {
        std::mem::take(&mut self.signals)
    }

    // Exit actions of every Capturing -> Idle transition
    fn finish(&mut self) -> Option<CaptureTarget> {
        let session = match std::mem::replace(&mut self.phase, Phase::Idle(CaptureSession::create())) {
            Phase::Capturing(session) => session,
            idle @ Phase::Idle(_) => {
                self.phase = idle;
                return None;
            }
        };

        let target = session.target();
        let (idle, lease) = session.end();
        if let Some(lease) = lease {
            match self.devices.as_mut() {
                Some(devices) => devices.release(lease),
                None => warn!("No device service to release {:?}", lease),
            }
        }
        self.timer.disarm();
        self.phase = Phase::Idle(idle);

        if let Some(target) = target {
            self.signals.push(CaptureSignal::Ended(target));
        }
        target
    }
}

impl Drop for Capturer {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::fake::FakeDevices;

    fn target(control: usize) -> CaptureTarget {
        CaptureTarget {
            controller: 0,
            control: ControlId(control),
        }
    }

    fn axis(device: u32, value: i16) -> DeviceEvent {
        DeviceEvent::AxisMotion {
            device,
            axis: 1,
            value,
        }
    }

    #[test]
    fn dead_zone_boundary_is_exact() {
        for value in [-16384, -100, 0, 16384] {
            assert_eq!(classify(&axis(0, value), 0), None, "{value}");
        }
        assert_eq!(classify(&axis(0, 16385), 0), Some(KeySpec::axis(1, Sign::Plus)));
        assert_eq!(classify(&axis(0, -16385), 0), Some(KeySpec::axis(1, Sign::Minus)));
    }

    #[test]
    fn hat_diagonals_and_center_are_ignored() {
        let hat = |state| DeviceEvent::HatMotion {
            device: 0,
            hat: 2,
            state,
        };
        assert_eq!(classify(&hat(HatState::Centered), 0), None);
        assert_eq!(classify(&hat(HatState::LeftUp), 0), None);
        assert_eq!(classify(&hat(HatState::RightDown), 0), None);
        assert_eq!(
            classify(&hat(HatState::Left), 0),
            Some(KeySpec::hat(2, Direction::Left))
        );
    }

    #[test]
    fn foreign_device_is_ignored() {
        let press = DeviceEvent::ButtonDown {
            device: 9,
            button: 4,
        };
        assert_eq!(classify(&press, 0), None);
        assert_eq!(classify(&press, 9), Some(KeySpec::button(4)));
    }

    #[test]
    fn first_qualifying_event_wins() {
        let devices = FakeDevices::default();
        let mut capturer = Capturer::new(Some(devices.boxed()));
        let now = Instant::now();
        assert!(capturer.start(target(4), now));

        devices.push(axis(0, 200));
        devices.push(DeviceEvent::ButtonDown {
            device: 0,
            button: 2,
        });
        devices.push(axis(0, 30000));

        assert_eq!(capturer.tick(now), None, "poll not due yet");
        let captured = capturer.tick(now + Duration::from_millis(50)).unwrap();
        assert_eq!(captured.key, KeySpec::button(2));
        assert_eq!(captured.target, target(4));
        assert!(!capturer.is_capturing());
        assert_eq!(devices.outstanding(), 0);
        assert_eq!(capturer.next_poll_in(now), None);
    }

    #[test]
    fn dead_zone_motion_keeps_capturing() {
        let devices = FakeDevices::default();
        let mut capturer = Capturer::new(Some(devices.boxed()));
        capturer.start(target(0), Instant::now());

        devices.push(axis(0, 16384));
        assert_eq!(capturer.poll(), None);
        assert!(capturer.is_capturing());
        assert_eq!(devices.outstanding(), 1);
    }

    #[test]
    fn settle_discards_buffered_motion() {
        let devices = FakeDevices::default();
        devices.push(axis(0, 32000));
        let mut capturer = Capturer::new(Some(devices.boxed()));
        capturer.start(target(0), Instant::now());

        assert_eq!(devices.state.borrow().settles, 1);
        assert_eq!(capturer.poll(), None);
        assert!(capturer.is_capturing());
    }

    #[test]
    fn preemption_releases_before_acquiring() {
        let devices = FakeDevices::default();
        let mut capturer = Capturer::new(Some(devices.boxed()));
        let now = Instant::now();
        capturer.start(target(1), now);
        capturer.start(target(2), now);

        assert_eq!(devices.log(), vec!["acquire 0", "release 0", "acquire 1"]);
        assert_eq!(devices.state.borrow().max_outstanding, 1);
        assert_eq!(capturer.active_target(), Some(target(2)));
        assert_eq!(
            capturer.take_signals(),
            vec![
                CaptureSignal::Started(target(1)),
                CaptureSignal::Ended(target(1)),
                CaptureSignal::Started(target(2)),
            ]
        );
    }

    #[test]
    fn key_press_completes_between_ticks() {
        let devices = FakeDevices::default();
        let mut capturer = Capturer::new(Some(devices.boxed()));
        capturer.start(target(3), Instant::now());

        let captured = capturer.key_press(97).unwrap();
        assert_eq!(captured.key, KeySpec::key(97));
        assert_eq!(devices.outstanding(), 0);
        assert_eq!(capturer.key_press(98), None);
    }

    #[test]
    fn idle_poll_does_nothing() {
        let devices = FakeDevices::default();
        devices.push(DeviceEvent::ButtonDown {
            device: 0,
            button: 1,
        });
        let mut capturer = Capturer::new(Some(devices.boxed()));
        assert_eq!(capturer.poll(), None);
        assert!(devices.log().is_empty());
    }

    #[test]
    fn disabled_without_device_service() {
        let mut capturer = Capturer::new(None);
        assert!(!capturer.is_enabled());
        assert!(!capturer.start(target(0), Instant::now()));
        assert!(!capturer.is_capturing());
    }

    #[test]
    fn missing_device_still_accepts_keyboard() {
        let devices = FakeDevices::default();
        devices.state.borrow_mut().fail_acquire = true;
        let mut capturer = Capturer::new(Some(devices.boxed()));
        assert!(capturer.start(target(5), Instant::now()));
        assert_eq!(capturer.poll(), None);

        let captured = capturer.key_press(13).unwrap();
        assert_eq!(captured.key, KeySpec::key(13));
        assert_eq!(devices.outstanding(), 0);
    }

    #[test]
    fn drop_releases_the_lease() {
        let devices = FakeDevices::default();
        {
            let mut capturer = Capturer::new(Some(devices.boxed()));
            capturer.start(target(0), Instant::now());
            assert_eq!(devices.outstanding(), 1);
        }
        assert_eq!(devices.outstanding(), 0);
    }
}
