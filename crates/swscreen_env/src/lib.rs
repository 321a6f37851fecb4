//! swscreen Platform Layer
//!
//! Owned device handles and the kernel interfaces around them:
//! - Opening device nodes with the flags the drivers expect
//! - Discovering render nodes compatible with a kernel device
//! - KMS dumb-buffer allocation for scanout, through the `drm` crate

pub mod device;
pub mod discovery;

#[cfg(unix)]
pub use device::{open_device_node, open_render_node, DeviceNode};
pub use device::{DeviceError, DeviceFd, RawFd, ScanoutBuffer};
#[cfg(unix)]
pub use discovery::LinuxDevices;
pub use discovery::{Compatibility, DevicePlatform, RenderDevice, RenderDevices, RenderNode};
