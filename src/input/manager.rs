use std::{collections::HashMap, error::Error, time::Duration};

use hidapi::HidApi;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::drivers::drc::{self, DriverVariant};
use crate::input::device::DrcDevice;
use crate::input::registry::DriverRegistry;

type DeviceTask = JoinHandle<Result<(), Box<dyn Error + Send + Sync>>>;

/// Watches for supported devices and manages their lifecycle. Each attached
/// device runs on its own blocking task with exclusive ownership of its
/// hidraw handle and virtual devices; nothing is shared across devices.
pub struct Manager {
    registry: DriverRegistry,
    config: Config,
    devices: HashMap<String, DeviceTask>,
}

impl Manager {
    pub fn new(registry: DriverRegistry, config: Config) -> Self {
        Self {
            registry,
            config,
            devices: HashMap::new(),
        }
    }

    /// Run the manager until the process is stopped
    pub async fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        // A configured device path skips discovery entirely
        if let Some(path) = self.config.device.clone() {
            log::info!("Using configured device {path}");
            let variant = self.registry.resolve(drc::VID, drc::PID);
            let Some(variant) = variant else {
                return Err("No driver registered for the configured device".into());
            };
            let task = spawn_device(path, variant);
            return task.await?;
        }

        let mut api = HidApi::new()?;
        let scan_interval = Duration::from_millis(self.config.scan_interval_ms);
        loop {
            self.reap_finished().await;
            if let Err(err) = self.scan(&mut api) {
                log::error!("Failed to scan for devices: {err}");
            }
            tokio::time::sleep(scan_interval).await;
        }
    }

    /// Enumerate the HID devices once and attach any new supported ones
    fn scan(&mut self, api: &mut HidApi) -> Result<(), Box<dyn Error + Send + Sync>> {
        api.refresh_devices()?;
        for info in api.device_list() {
            let Some(variant) = self
                .registry
                .resolve(info.vendor_id(), info.product_id())
            else {
                continue;
            };
            let path = info.path().to_string_lossy().to_string();
            if self.devices.contains_key(&path) {
                continue;
            }

            log::info!(
                "Found supported device {:04x}:{:04x} at {path}",
                info.vendor_id(),
                info.product_id()
            );
            self.devices.insert(path.clone(), spawn_device(path, variant));
        }

        Ok(())
    }

    /// Collect devices whose task has exited so their path can re-attach on
    /// a later scan
    async fn reap_finished(&mut self) {
        let finished: Vec<String> = self
            .devices
            .iter()
            .filter(|(_, task)| task.is_finished())
            .map(|(path, _)| path.clone())
            .collect();

        for path in finished {
            let Some(task) = self.devices.remove(&path) else {
                continue;
            };
            match task.await {
                Ok(Ok(())) => log::info!("Device at {path} detached"),
                Ok(Err(err)) => log::warn!("Device at {path} stopped: {err}"),
                Err(err) => log::error!("Device task for {path} panicked: {err}"),
            }
        }
    }
}

/// Spawn a blocking task that owns the device for its whole lifetime
fn spawn_device(path: String, variant: DriverVariant) -> DeviceTask {
    tokio::task::spawn_blocking(move || -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut device = DrcDevice::attach(path, variant)?;
        device.run()
    })
}
