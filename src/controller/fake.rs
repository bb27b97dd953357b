//! Scriptable device service for tests

use super::device::{DeviceError, DeviceEvent, DeviceLease, DeviceService};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct FakeDeviceState {
    pub outstanding: i32,
    pub max_outstanding: i32,
    pub log: Vec<String>,
    pub queued: VecDeque<DeviceEvent>,
    pub settles: usize,
    pub fail_acquire: bool,
    next_instance: u32,
}

#[derive(Clone, Default)]
pub struct FakeDevices {
    pub state: Rc<RefCell<FakeDeviceState>>,
}

impl FakeDevices {
    pub fn push(&self, event: DeviceEvent) {
        self.state.borrow_mut().queued.push_back(event);
    }

    pub fn outstanding(&self) -> i32 {
        self.state.borrow().outstanding
    }

    pub fn log(&self) -> Vec<String> {
        self.state.borrow().log.clone()
    }

    pub fn boxed(&self) -> Box<dyn DeviceService> {
        Box::new(self.clone())
    }
}

impl DeviceService for FakeDevices {
    fn acquire(&mut self, index: usize) -> Result<DeviceLease, DeviceError> {
        let mut state = self.state.borrow_mut();
        if state.fail_acquire {
            return Err(DeviceError::NoDevice(index));
        }
        let instance = state.next_instance;
        state.next_instance += 1;
        state.outstanding += 1;
        state.max_outstanding = state.max_outstanding.max(state.outstanding);
        state.log.push(format!("acquire {instance}"));
        Ok(DeviceLease::new(instance))
    }

    fn release(&mut self, lease: DeviceLease) {
        let mut state = self.state.borrow_mut();
        state.outstanding -= 1;
        state.log.push(format!("release {}", lease.instance()));
    }

    fn settle(&mut self, _lease: &DeviceLease) {
        let mut state = self.state.borrow_mut();
        state.settles += 1;
        state.queued.retain(|e| !e.is_axis_motion());
    }

    fn poll(&mut self, _lease: &DeviceLease) -> Vec<DeviceEvent> {
        self.state.borrow_mut().queued.drain(..).collect()
    }
}
