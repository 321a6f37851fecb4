//! Hardware resource acquisition for the render-only backend
//!
//! Order: open the kernel device, discover render nodes, duplicate the first
//! one, then build the [`RenderOnly`] context around both handles. Every
//! handle is owned by a local until it is moved into the context, so any
//! early return closes what was acquired so far, newest first.

use crate::renderonly::RenderOnly;
use std::collections::TryReserveError;
use std::path::PathBuf;
use swscreen_env::{DeviceError, DeviceFd, DevicePlatform, RawFd};
use swscreen_services::HardwareSettings;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("kernel device unavailable and no fallback index configured: {0}")]
    KernelDevice(#[source] DeviceError),

    #[error("render device discovery failed: {0}")]
    Discovery(#[source] DeviceError),

    #[error("fallback device index {0} is not a valid device number")]
    FallbackIndex(u32),

    #[error("no render-capable device found for {kernel_device}")]
    NoRenderDevice { kernel_device: PathBuf },

    #[error("could not duplicate render device {path}: {source}")]
    Duplicate {
        path: PathBuf,
        #[source]
        source: DeviceError,
    },

    #[error("could not allocate scanout table: {0}")]
    Allocation(#[from] TryReserveError),
}

/// Device selector passed to the driver entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceIndex {
    /// The opened kernel device; still owned by the render-only context
    Kernel(RawFd),
    /// Configured stand-in used when the kernel device could not be opened
    Fallback(RawFd),
}

impl DeviceIndex {
    pub fn as_raw(self) -> RawFd {
        match self {
            DeviceIndex::Kernel(fd) | DeviceIndex::Fallback(fd) => fd,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, DeviceIndex::Fallback(_))
    }
}

/// A fully built render-only context and the device index to create with
#[derive(Debug)]
pub struct Acquired<F: DeviceFd> {
    pub render_only: RenderOnly<F>,
    pub device: DeviceIndex,
}

/// Acquire the device handles for the render-only hardware backend.
pub fn acquire<P: DevicePlatform>(
    platform: &P,
    settings: &HardwareSettings,
) -> Result<Acquired<P::Fd>, AcquireError> {
    let kernel_path = &settings.kernel_device_path;

    let (kernel, device) = match platform.open_kernel_device(kernel_path) {
        Ok(fd) => {
            let device = DeviceIndex::Kernel(fd.raw_fd());
            (Some(fd), device)
        }
        Err(err) => match settings.fallback_device_index {
            Some(index) => {
                tracing::error!(%err, fallback = index, "failed to open kernel device");
                let raw = RawFd::try_from(index).map_err(|_| AcquireError::FallbackIndex(index))?;
                (None, DeviceIndex::Fallback(raw))
            }
            None => return Err(AcquireError::KernelDevice(err)),
        },
    };

    let devices = platform
        .render_capable_devices(kernel.as_ref())
        .map_err(AcquireError::Discovery)?;
    let Some(first) = devices.first() else {
        return Err(AcquireError::NoRenderDevice {
            kernel_device: kernel_path.clone(),
        });
    };
    let gpu = first
        .fd
        .try_clone_fd()
        .map_err(|source| AcquireError::Duplicate {
            path: first.path.clone(),
            source,
        })?;
    tracing::debug!(
        path = %first.path.display(),
        gpu_fd = gpu.raw_fd(),
        candidates = devices.len(),
        "selected render device"
    );
    // The discovered descriptors stay with the discovery result.
    drop(devices);

    let render_only = RenderOnly::new(kernel, Some(gpu), settings.scanout_bucket_hint)?;
    Ok(Acquired {
        render_only,
        device,
    })
}
