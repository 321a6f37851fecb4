//! Owned device handles
//!
//! Every descriptor handed out by this crate is owned: dropping it closes the
//! descriptor exactly once. Callers that need several handles hold them in
//! locals and let early returns drop whatever was acquired so far.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raw descriptor number, as passed to driver entry points
pub type RawFd = i32;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to open device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to scan render nodes in {dir}: {source}")]
    Discovery {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to duplicate descriptor {fd}: {source}")]
    Duplicate {
        fd: RawFd,
        #[source]
        source: io::Error,
    },

    #[error("{request} failed on descriptor {fd}: {source}")]
    Ioctl {
        request: &'static str,
        fd: RawFd,
        #[source]
        source: io::Error,
    },
}

impl DeviceError {
    /// The underlying OS error.
    pub fn io_error(&self) -> &io::Error {
        match self {
            DeviceError::Open { source, .. }
            | DeviceError::Discovery { source, .. }
            | DeviceError::Duplicate { source, .. }
            | DeviceError::Ioctl { source, .. } => source,
        }
    }
}

/// A KMS dumb buffer as the render-only layer sees it
pub trait ScanoutBuffer: fmt::Debug + Clone + Send {
    /// GEM handle on the device that allocated the buffer
    fn handle(&self) -> u32;

    fn pitch(&self) -> u32;
}

/// An owned device descriptor.
///
/// Implementations must close the descriptor when dropped and never
/// otherwise.
pub trait DeviceFd: fmt::Debug + Send + Sized {
    type Buffer: ScanoutBuffer;

    /// Duplicate into an independently owned handle. The source keeps its
    /// own ownership.
    fn try_clone_fd(&self) -> Result<Self, DeviceError>;

    fn raw_fd(&self) -> RawFd;

    fn create_dumb_buffer(&self, width: u32, height: u32, bpp: u32)
        -> Result<Self::Buffer, DeviceError>;

    /// Release `buffer`. On error the buffer is still allocated.
    fn destroy_dumb_buffer(&self, buffer: &Self::Buffer) -> Result<(), DeviceError>;
}

/// An opened device node
#[cfg(unix)]
#[derive(Debug)]
pub struct DeviceNode(std::os::fd::OwnedFd);

#[cfg(unix)]
impl std::os::fd::AsFd for DeviceNode {
    fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
        self.0.as_fd()
    }
}

#[cfg(unix)]
impl drm::Device for DeviceNode {}

#[cfg(unix)]
impl drm::control::Device for DeviceNode {}

/// Open a kernel device node read/write, non-blocking and close-on-exec.
#[cfg(unix)]
pub fn open_device_node(path: &Path) -> Result<DeviceNode, DeviceError> {
    open_with_flags(path, libc::O_NONBLOCK | libc::O_CLOEXEC)
}

/// Open a render node read/write and close-on-exec.
#[cfg(unix)]
pub fn open_render_node(path: &Path) -> Result<DeviceNode, DeviceError> {
    open_with_flags(path, libc::O_CLOEXEC)
}

#[cfg(unix)]
fn open_with_flags(path: &Path, flags: i32) -> Result<DeviceNode, DeviceError> {
    use std::os::unix::fs::OpenOptionsExt;

    std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(flags)
        .open(path)
        .map(|file| DeviceNode(file.into()))
        .map_err(|source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(unix)]
impl ScanoutBuffer for drm::control::dumbbuffer::DumbBuffer {
    fn handle(&self) -> u32 {
        u32::from(drm::buffer::Buffer::handle(self))
    }

    fn pitch(&self) -> u32 {
        drm::buffer::Buffer::pitch(self)
    }
}

/// Pixel format recorded for a dumb buffer of `bpp` bits per pixel. The
/// kernel only looks at `bpp`.
#[cfg(unix)]
fn dumb_format(bpp: u32) -> drm::buffer::DrmFourcc {
    use drm::buffer::DrmFourcc;

    match bpp {
        8 => DrmFourcc::C8,
        16 => DrmFourcc::Rgb565,
        24 => DrmFourcc::Rgb888,
        _ => DrmFourcc::Xrgb8888,
    }
}

#[cfg(unix)]
impl DeviceFd for DeviceNode {
    type Buffer = drm::control::dumbbuffer::DumbBuffer;

    fn try_clone_fd(&self) -> Result<Self, DeviceError> {
        self.0
            .try_clone()
            .map(DeviceNode)
            .map_err(|source| DeviceError::Duplicate {
                fd: self.raw_fd(),
                source,
            })
    }

    fn raw_fd(&self) -> RawFd {
        use std::os::fd::AsRawFd;
        self.0.as_raw_fd()
    }

    fn create_dumb_buffer(
        &self,
        width: u32,
        height: u32,
        bpp: u32,
    ) -> Result<Self::Buffer, DeviceError> {
        drm::control::Device::create_dumb_buffer(self, (width, height), dumb_format(bpp), bpp)
            .map_err(|source| DeviceError::Ioctl {
                request: "DRM_IOCTL_MODE_CREATE_DUMB",
                fd: self.raw_fd(),
                source,
            })
    }

    fn destroy_dumb_buffer(&self, buffer: &Self::Buffer) -> Result<(), DeviceError> {
        drm::control::Device::destroy_dumb_buffer(self, buffer.clone()).map_err(|source| {
            DeviceError::Ioctl {
                request: "DRM_IOCTL_MODE_DESTROY_DUMB",
                fd: self.raw_fd(),
                source,
            }
        })
    }
}
