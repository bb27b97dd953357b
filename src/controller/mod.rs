//! # Controller Module
//!
//! Captures a single physical input (button, stick direction, D-pad
//! direction or keyboard key) and turns it into a [`KeySpec`].
//!
//! ## Why This Module Exists
//!
//! Binding a control means waiting for the user to touch the pad once. The
//! module owns everything between the click on a control and the captured
//! key: opening the pad, ignoring input that was already queued, filtering
//! noise and handing the pad back afterwards.
//!
//! ## Module Organization
//!
//! 1. [`device`] - Device events, leases and the [`device::DeviceService`] seam
//! 2. [`event_collector`] - gilrs backed device service
//! 3. [`poll_timer`] - 50ms deadline checked by the host loop
//! 4. [`capture`] - Capture state machine turning one event into a key
//!
//! ## Architecture
//!
//! ```text
//! Gamepad ──► GilrsDevices ──► Capturer ──► Captured key
//!             (DeviceEvent)   (50ms poll)
//! ```
//!
//! ## Design Rationale
//!
//! ### Single Threaded Polling
//! Everything runs on the UI thread. The poll is a deadline the host loop
//! checks every frame, so no channel or runtime sits between the pad and the
//! dialog, and a capture can never outlive the window.
//!
//! ### Leases
//! A capture owns a [`device::DeviceLease`] for exactly as long as it runs.
//! The lease is not `Clone`, and [`capture::Capturer`] returns it on finish,
//! cancel, preemption and drop. Starting a new capture first releases the old
//! lease.
//!
//! ### Stale Input
//! Events queued before a capture starts are discarded when the pad is
//! acquired, and stick motion that arrives during the settle pause is dropped
//! too. Only input made after the click can complete a capture.
//!
//! [`KeySpec`]: crate::mapping::keyspec::KeySpec

pub mod capture;
pub mod device;
pub mod event_collector;
pub mod poll_timer;

#[cfg(test)]
pub(crate) mod fake;
