//! GPU-resident particle state and the fused gravity/integration dispatch
//!
//! Positions live in two storage buffers that swap roles every step: the
//! kernel reads `positions[current]` and writes `positions[current ^ 1]`, so no
//! lane can see another lane's updated position mid-step. Velocities are
//! updated in place (each lane owns its slot) and masses never change.

use crate::backend::{ComputeBackend, Snapshot};
use crate::error::{DeviceError, Result};
use glam::Vec3;
use nbody_physics::{unpad, ConfigurationError, ParticleSystem, PhysicsParams, WORKGROUP_SIZE};
use wgpu::util::DeviceExt;

/// Bytes per body in the position/velocity buffers (`vec4<f32>`)
const VEC4_SIZE: u64 = std::mem::size_of::<[f32; 4]>() as u64;

/// Device buffers for one uploaded system
struct DeviceBuffers {
    positions: [wgpu::Buffer; 2],
    velocity_buffer: wgpu::Buffer,
    _mass_buffer: wgpu::Buffer,
    _params_buffer: wgpu::Buffer,
    /// `bind_groups[k]` reads `positions[k]` and writes the other buffer
    bind_groups: [wgpu::BindGroup; 2],
    staging_buffer: wgpu::Buffer,
    current: usize,
    body_count: u32,
    workgroup_count: u32,
}

/// Owns the device copies of position, velocity and mass.
pub struct DeviceBridge {
    device: wgpu::Device,
    queue: wgpu::Queue,
    params: PhysicsParams,

    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,

    /// `None` before upload and for an empty system
    buffers: Option<DeviceBuffers>,
    uploaded: bool,

    // Host side of the last readback, reused every step
    host_positions: Vec<Vec3>,

    steps: u64,
    dispatches: u64,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl DeviceBridge {
    /// Compile the kernel on an already selected device.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, params: PhysicsParams) -> Result<Self> {
        params.validate()?;
        log::info!("Initializing DeviceBridge...");

        let (built, error) = capture_errors(&device, || {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Gravity Compute Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/gravity.wgsl").into()),
            });

            let bind_group_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Gravity Bind Group Layout"),
                    entries: &[
                        storage_entry(0, true),  // positions_in
                        storage_entry(1, false), // positions_out
                        storage_entry(2, false), // velocities
                        storage_entry(3, true),  // masses
                        wgpu::BindGroupLayoutEntry {
                            binding: 4,
                            visibility: wgpu::ShaderStages::COMPUTE,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                    ],
                });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Gravity Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

            let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Gravity Pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                cache: None,
            });

            (pipeline, bind_group_layout)
        });
        if let Some(err) = error {
            return Err(DeviceError::Allocation(format!("gravity pipeline: {}", err)).into());
        }
        let (pipeline, bind_group_layout) = built;

        log::info!("Pipeline created");

        Ok(Self {
            device,
            queue,
            params,
            pipeline,
            bind_group_layout,
            buffers: None,
            uploaded: false,
            host_positions: Vec::new(),
            steps: 0,
            dispatches: 0,
        })
    }

    /// Compute dispatches issued so far (an empty system never dispatches)
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    /// Largest system a single dispatch can cover on this device
    pub fn max_bodies(&self) -> u64 {
        let limits = self.device.limits();
        let by_workgroups =
            limits.max_compute_workgroups_per_dimension as u64 * WORKGROUP_SIZE as u64;
        let by_binding = limits.max_storage_buffer_binding_size as u64 / VEC4_SIZE;
        by_workgroups.min(by_binding)
    }

    fn create_buffers(&self, system: &ParticleSystem) -> DeviceBuffers {
        let body_count = system.len() as u32;
        let byte_len = body_count as u64 * VEC4_SIZE;
        let padded_positions = system.padded_positions();

        let position_buffer = |label: &str| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(&padded_positions),
                    usage: wgpu::BufferUsages::STORAGE
                        | wgpu::BufferUsages::COPY_DST
                        | wgpu::BufferUsages::COPY_SRC,
                })
        };
        let positions = [position_buffer("Position Buffer A"), position_buffer("Position Buffer B")];

        let velocity_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Velocity Buffer"),
                contents: bytemuck::cast_slice(&system.padded_velocities()),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
            });

        let mass_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mass Buffer"),
                contents: bytemuck::cast_slice(system.masses()),
                usage: wgpu::BufferUsages::STORAGE,
            });

        let params = self.params.with_body_count(body_count);
        let params_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Physics Params Buffer"),
                contents: bytemuck::cast_slice(&[params]),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        // Shared by position and velocity readback, both are n * vec4<f32>
        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Staging Buffer"),
            size: byte_len,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = |read: usize, label: &str| {
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: positions[read].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: positions[read ^ 1].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: velocity_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: mass_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: params_buffer.as_entire_binding(),
                    },
                ],
            })
        };
        let bind_groups = [
            bind_group(0, "Gravity Bind Group A->B"),
            bind_group(1, "Gravity Bind Group B->A"),
        ];

        DeviceBuffers {
            positions,
            velocity_buffer,
            _mass_buffer: mass_buffer,
            _params_buffer: params_buffer,
            bind_groups,
            staging_buffer,
            current: 0,
            body_count,
            workgroup_count: body_count.div_ceil(WORKGROUP_SIZE),
        }
    }

    /// Copy `source` into the staging buffer and return its contents as vec4s.
    fn read_back(&self, source: &wgpu::Buffer, staging: &wgpu::Buffer) -> Result<Vec<[f32; 4]>> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_buffer_to_buffer(source, 0, staging, 0, staging.size());
        let submission = self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: Some(submission),
                timeout: None,
            })
            .map_err(|err| DeviceError::Readback(err.to_string()))?;

        rx.recv()
            .map_err(|_| DeviceError::Readback("map callback was dropped".into()))?
            .map_err(|err| DeviceError::Readback(err.to_string()))?;

        let data = slice.get_mapped_range();
        let vectors: Vec<[f32; 4]> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();

        Ok(vectors)
    }
}

/// Run `f` inside out-of-memory and validation error scopes.
fn capture_errors<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());
    (value, out_of_memory.or(validation))
}

impl ComputeBackend for DeviceBridge {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn body_count(&self) -> usize {
        self.buffers
            .as_ref()
            .map_or(0, |buffers| buffers.body_count as usize)
    }

    fn steps_completed(&self) -> u64 {
        self.steps
    }

    fn upload(&mut self, system: &ParticleSystem) -> Result<()> {
        if self.uploaded {
            return Err(ConfigurationError::AlreadyUploaded.into());
        }

        if system.is_empty() {
            log::info!("Empty system uploaded, steps will not dispatch");
            self.uploaded = true;
            return Ok(());
        }

        let max = self.max_bodies();
        if system.len() as u64 > max {
            return Err(DeviceError::TooManyBodies {
                bodies: system.len(),
                max,
            }
            .into());
        }

        let (buffers, error) = capture_errors(&self.device, || self.create_buffers(system));
        if let Some(err) = error {
            return Err(DeviceError::Allocation(err.to_string()).into());
        }

        log::info!(
            "✓ Uploaded {} bodies ({} workgroups of {})",
            buffers.body_count,
            buffers.workgroup_count,
            WORKGROUP_SIZE
        );

        self.host_positions = Vec::with_capacity(system.len());
        self.buffers = Some(buffers);
        self.uploaded = true;
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        if !self.uploaded {
            return Err(DeviceError::NotUploaded.into());
        }
        let Some(buffers) = self.buffers.as_mut() else {
            self.steps += 1;
            return Ok(());
        };

        let device = &self.device;
        let queue = &self.queue;
        let pipeline = &self.pipeline;

        let (poll, error) = capture_errors(device, || {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Simulation Encoder"),
            });

            {
                let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Gravity Compute Pass"),
                    timestamp_writes: None,
                });
                compute_pass.set_pipeline(pipeline);
                compute_pass.set_bind_group(0, &buffers.bind_groups[buffers.current], &[]);
                compute_pass.dispatch_workgroups(buffers.workgroup_count, 1, 1);
            }

            let submission = queue.submit(std::iter::once(encoder.finish()));
            device.poll(wgpu::PollType::Wait {
                submission_index: Some(submission),
                timeout: None,
            })
        });
        self.dispatches += 1;

        if let Some(err) = error {
            return Err(DeviceError::Dispatch(err.to_string()).into());
        }
        poll.map_err(|err| DeviceError::Dispatch(err.to_string()))?;

        buffers.current ^= 1;
        self.steps += 1;
        Ok(())
    }

    fn read_positions(&mut self) -> Result<Snapshot<'_>> {
        if !self.uploaded {
            return Err(DeviceError::NotUploaded.into());
        }

        if let Some(buffers) = self.buffers.as_ref() {
            let vectors = self.read_back(&buffers.positions[buffers.current], &buffers.staging_buffer)?;
            self.host_positions.clear();
            self.host_positions.extend(unpad(&vectors));
        }

        Ok(Snapshot::new(self.steps, &self.host_positions))
    }

    fn read_velocities(&mut self) -> Result<Vec<Vec3>> {
        if !self.uploaded {
            return Err(DeviceError::NotUploaded.into());
        }

        match self.buffers.as_ref() {
            Some(buffers) => {
                let vectors = self.read_back(&buffers.velocity_buffer, &buffers.staging_buffer)?;
                Ok(unpad(&vectors).collect())
            }
            None => Ok(Vec::new()),
        }
    }
}
