//! Device selection and wgpu setup
//!
//! Picking a device is configuration, not interaction: callers describe the
//! adapter they want with [`DeviceSelection`] and get a device/queue pair back.

use crate::error::DeviceError;

/// Which adapter to run the simulation on
#[derive(Debug, Clone)]
pub struct DeviceSelection {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
    /// Index into [`list_adapters`]; overrides `power_preference` when set
    pub adapter_index: Option<usize>,
    /// Request a software adapter
    pub force_fallback_adapter: bool,
}

impl Default for DeviceSelection {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            adapter_index: None,
            force_fallback_adapter: false,
        }
    }
}

/// Short description of an adapter for listings and logs
#[derive(Debug, Clone)]
pub struct AdapterSummary {
    pub index: usize,
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
}

/// Selected device handle
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

fn instance(backends: wgpu::Backends) -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends,
        ..Default::default()
    })
}

/// Adapters visible through the given backends, in selection-index order
pub fn list_adapters(backends: wgpu::Backends) -> Vec<AdapterSummary> {
    instance(backends)
        .enumerate_adapters(backends)
        .into_iter()
        .enumerate()
        .map(|(index, adapter)| {
            let info = adapter.get_info();
            AdapterSummary {
                index,
                name: info.name,
                backend: info.backend,
                device_type: info.device_type,
            }
        })
        .collect()
}

impl GpuContext {
    pub async fn new(selection: &DeviceSelection) -> Result<Self, DeviceError> {
        let instance = instance(selection.backends);

        let adapter = match selection.adapter_index {
            Some(index) => instance
                .enumerate_adapters(selection.backends)
                .into_iter()
                .nth(index)
                .ok_or_else(|| {
                    DeviceError::AdapterUnavailable(format!("no adapter at index {}", index))
                })?,
            None => instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: selection.power_preference,
                    compatible_surface: None,
                    force_fallback_adapter: selection.force_fallback_adapter,
                })
                .await
                .map_err(|err| DeviceError::AdapterUnavailable(err.to_string()))?,
        };

        let info = adapter.get_info();
        log::info!("✓ Using GPU: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("N-body Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self { device, queue })
    }

    /// Blocking constructor for non-async callers
    pub fn new_blocking(selection: &DeviceSelection) -> Result<Self, DeviceError> {
        pollster::block_on(Self::new(selection))
    }
}
