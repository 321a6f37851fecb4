//! Render-only device context
//!
//! Bundles the kernel (display) device, the duplicated GPU render handle and
//! the table of scanout buffers shared between them. The table lives behind
//! its lock; there is no way to reach it otherwise.

use std::collections::{HashMap, TryReserveError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use swscreen_env::{DeviceError, DeviceFd, RawFd, ScanoutBuffer};
use thiserror::Error;

/// Scanout state tracked per buffer key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOnlyScanout {
    /// Buffer handle on the kernel device
    pub handle: u32,
    pub stride: u32,
}

/// Dimensions of a resource that needs a scanout buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceInfo {
    pub width: u32,
    pub height: u32,
    pub bpp: u32,
}

#[derive(Debug, Error)]
pub enum RenderOnlyError {
    #[error("no kernel device is available for scanout allocation")]
    NoKernelDevice,

    #[error("no scanout buffer registered for key {0}")]
    UnknownScanout(u32),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// A table entry: the scanout state, plus the dumb buffer backing it when
/// this context allocated one
#[derive(Debug)]
struct Slot<B> {
    scanout: RenderOnlyScanout,
    buffer: Option<B>,
}

impl<B> Default for Slot<B> {
    fn default() -> Self {
        Self {
            scanout: RenderOnlyScanout::default(),
            buffer: None,
        }
    }
}

type ScanoutTable<B> = HashMap<u32, Slot<B>>;

/// Exclusive owner of a render-only device pair
#[derive(Debug)]
pub struct RenderOnly<F: DeviceFd> {
    kms_fd: Option<F>,
    gpu_fd: Option<F>,
    bo_map: Mutex<ScanoutTable<F::Buffer>>,
}

impl<F: DeviceFd> RenderOnly<F> {
    /// Take ownership of both handles and set up an empty scanout table
    /// sized for `bucket_hint` entries. On failure both handles are closed
    /// before returning.
    pub fn new(
        kms_fd: Option<F>,
        gpu_fd: Option<F>,
        bucket_hint: usize,
    ) -> Result<Self, TryReserveError> {
        let ro = Self {
            kms_fd,
            gpu_fd,
            bo_map: Mutex::new(HashMap::new()),
        };
        ro.table().try_reserve(bucket_hint)?;
        Ok(ro)
    }

    fn table(&self) -> MutexGuard<'_, ScanoutTable<F::Buffer>> {
        self.bo_map.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn kms_fd(&self) -> Option<RawFd> {
        self.kms_fd.as_ref().map(|fd| fd.raw_fd())
    }

    pub fn gpu_fd(&self) -> Option<RawFd> {
        self.gpu_fd.as_ref().map(|fd| fd.raw_fd())
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.table().capacity()
    }

    /// Scanout entry for `key`, created zeroed on first use.
    pub fn scanout(&self, key: u32) -> RenderOnlyScanout {
        self.table().entry(key).or_default().scanout
    }

    /// Record `scanout` for `key`. A buffer already allocated for `key` stays
    /// attached to the entry.
    pub fn set_scanout(&self, key: u32, scanout: RenderOnlyScanout) {
        self.table().entry(key).or_default().scanout = scanout;
    }

    pub fn lookup(&self, key: u32) -> Option<RenderOnlyScanout> {
        self.table().get(&key).map(|slot| slot.scanout)
    }

    /// Allocate a KMS dumb buffer for `resource` and register it, keyed by
    /// the new buffer handle.
    pub fn create_for_resource(
        &self,
        resource: &ResourceInfo,
    ) -> Result<RenderOnlyScanout, RenderOnlyError> {
        let kms = self.kms_fd.as_ref().ok_or(RenderOnlyError::NoKernelDevice)?;
        let buffer = kms.create_dumb_buffer(resource.width, resource.height, resource.bpp)?;
        let scanout = RenderOnlyScanout {
            handle: buffer.handle(),
            stride: buffer.pitch(),
        };
        self.table().insert(
            scanout.handle,
            Slot {
                scanout,
                buffer: Some(buffer),
            },
        );
        tracing::debug!(
            handle = scanout.handle,
            stride = scanout.stride,
            width = resource.width,
            height = resource.height,
            "created scanout buffer"
        );
        Ok(scanout)
    }

    /// Release the dumb buffer behind `key` and forget the entry. If the
    /// buffer cannot be released the entry stays registered.
    pub fn destroy_scanout(&self, key: u32) -> Result<(), RenderOnlyError> {
        let mut table = self.table();
        let slot = table.get(&key).ok_or(RenderOnlyError::UnknownScanout(key))?;
        if let Some(buffer) = &slot.buffer {
            let kms = self.kms_fd.as_ref().ok_or(RenderOnlyError::NoKernelDevice)?;
            kms.destroy_dumb_buffer(buffer)?;
        }
        table.remove(&key);
        Ok(())
    }
}

impl<F: DeviceFd> Drop for RenderOnly<F> {
    fn drop(&mut self) {
        // GPU handle, then the table, then the kernel handle.
        if let Some(gpu) = self.gpu_fd.take() {
            tracing::debug!(fd = gpu.raw_fd(), "closing render-only gpu handle");
            drop(gpu);
        }
        let table = self.bo_map.get_mut().unwrap_or_else(PoisonError::into_inner);
        table.clear();
        table.shrink_to_fit();
        if let Some(kms) = self.kms_fd.take() {
            tracing::debug!(fd = kms.raw_fd(), "closing render-only kernel handle");
            drop(kms);
        }
    }
}
