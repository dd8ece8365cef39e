//! Device registry
//!
//! Maps surface identifiers to live [`CanvasDevice`]s. Devices are created
//! lazily on first use through the injected [`SurfaceHost`] and torn down
//! explicitly.

use std::collections::BTreeMap;
use std::rc::Rc;

use super::animation::Pacer;
use super::device::{CanvasDevice, DeviceHandle};
use super::turtle::Turtle;
use crate::TurtleConfig;
use crate::errors::{Result, TurtleError};
use crate::log;
use crate::surface::SurfaceHost;

pub struct DeviceRegistry {
    host: Box<dyn SurfaceHost>,
    pacer: Rc<dyn Pacer>,
    config: TurtleConfig,
    devices: BTreeMap<String, DeviceHandle>,
}

impl DeviceRegistry {
    pub fn new(host: Box<dyn SurfaceHost>, pacer: Rc<dyn Pacer>, config: TurtleConfig) -> Self {
        Self {
            host,
            pacer,
            config,
            devices: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// The device for `id`, opening its surface on first use.
    pub fn device(&mut self, id: &str) -> Result<DeviceHandle> {
        if let Some(device) = self.devices.get(id) {
            return Ok(device.clone());
        }
        let Some(main) = self.host.open(id) else {
            log::warn!(id, "host has no surface with this id");
            return Err(TurtleError::SurfaceUnavailable { id: id.to_string() });
        };
        let overlay = self.host.open_overlay(id);
        let device = CanvasDevice::new(
            id,
            main,
            overlay,
            self.pacer.clone(),
            self.config.animate,
        )
        .into_handle();
        self.devices.insert(id.to_string(), device.clone());
        Ok(device)
    }

    /// The device for `id` if it is already live.
    pub fn get(&self, id: &str) -> Option<DeviceHandle> {
        self.devices.get(id).cloned()
    }

    /// Create a turtle drawing on surface `id`.
    pub fn spawn_turtle(&mut self, id: &str) -> Result<Turtle> {
        let device = self.device(id)?;
        Turtle::new(device, &self.config)
    }

    /// Close-on-click: tear the device down unless a turtle is still attached
    /// or a motion is running. Returns whether it was torn down.
    pub fn exit_on_click(&mut self, id: &str) -> Result<bool> {
        let device = self
            .devices
            .get(id)
            .ok_or_else(|| TurtleError::SurfaceUnavailable { id: id.to_string() })?;
        {
            let dev = device.borrow();
            if dev.is_animating() || dev.motions_in_flight() > 0 {
                log::debug!(id, turtles = dev.turtles().len(), "exit refused while animating");
                return Ok(false);
            }
        }
        self.teardown(id, self.config.fade_on_exit);
        Ok(true)
    }

    /// Tear the device down unconditionally. Turtles still holding it get
    /// `SurfaceUnavailable` from then on.
    pub fn destroy(&mut self, id: &str) -> bool {
        self.teardown(id, false)
    }

    fn teardown(&mut self, id: &str, hide: bool) -> bool {
        match self.devices.remove(id) {
            Some(device) => {
                device.borrow_mut().close(hide);
                true
            }
            None => false,
        }
    }

    /// Identifiers of the live devices, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }
}
