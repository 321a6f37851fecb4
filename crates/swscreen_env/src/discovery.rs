//! Render-node discovery
//!
//! A render-only setup pairs a display (kernel) device with a separate GPU
//! that can only render. Discovery finds the GPU side among the DRM render
//! nodes. When the kernel device is itself a DRM node, only its own render
//! node qualifies. Otherwise a node qualifies when its kernel driver is one
//! of the compatible drivers.

use crate::device::{DeviceError, DeviceFd};
use std::path::{Path, PathBuf};

/// One opened render-capable device
#[derive(Debug)]
pub struct RenderDevice<F> {
    pub path: PathBuf,
    pub fd: F,
}

/// The result of a discovery pass. May be empty; callers must check before
/// picking a device.
#[derive(Debug)]
pub struct RenderDevices<F> {
    devices: Vec<RenderDevice<F>>,
}

impl<F> RenderDevices<F> {
    pub fn new(devices: Vec<RenderDevice<F>>) -> Self {
        Self { devices }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// The preferred device, or `None` when nothing was found.
    pub fn first(&self) -> Option<&RenderDevice<F>> {
        self.devices.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderDevice<F>> {
        self.devices.iter()
    }
}

/// Access to the kernel devices of the running system
pub trait DevicePlatform {
    type Fd: DeviceFd;

    /// Open the display/kernel device node.
    fn open_kernel_device(&self, path: &Path) -> Result<Self::Fd, DeviceError>;

    /// Open every render-capable device usable alongside `kernel`.
    fn render_capable_devices(
        &self,
        kernel: Option<&Self::Fd>,
    ) -> Result<RenderDevices<Self::Fd>, DeviceError>;
}

/// A render node found while scanning, before it is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderNode {
    pub path: PathBuf,
    /// `(major, minor)`
    pub dev: (u32, u32),
    /// Kernel driver bound to the node, when sysfs names one
    pub driver: Option<String>,
}

/// Which render nodes may be paired with the kernel device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility<'a> {
    /// The kernel device is a DRM node with this render node
    SameDevice((u32, u32)),
    /// Nodes bound to one of these drivers. Empty accepts every node.
    Drivers(&'a [String]),
}

impl Compatibility<'_> {
    pub fn accepts(&self, node: &RenderNode) -> bool {
        match self {
            Compatibility::SameDevice(dev) => node.dev == *dev,
            Compatibility::Drivers(drivers) => {
                drivers.is_empty()
                    || node
                        .driver
                        .as_ref()
                        .is_some_and(|driver| drivers.contains(driver))
            }
        }
    }
}

/// Real devices under `/dev` and `/sys`
#[cfg(unix)]
#[derive(Debug, Clone)]
pub struct LinuxDevices {
    /// Directory holding the DRM device nodes
    pub render_node_dir: PathBuf,
    /// `/sys/class/drm`, used to resolve each node's kernel driver
    pub sysfs_drm_dir: PathBuf,
    /// Render drivers usable with a kernel device that is not a DRM node
    pub compatible_drivers: Vec<String>,
}

#[cfg(unix)]
impl Default for LinuxDevices {
    fn default() -> Self {
        Self {
            render_node_dir: PathBuf::from("/dev/dri"),
            sysfs_drm_dir: PathBuf::from("/sys/class/drm"),
            compatible_drivers: vec!["msm".into(), "kgsl".into()],
        }
    }
}

#[cfg(unix)]
impl LinuxDevices {
    /// Kernel driver bound to a DRM node, from its sysfs `device/driver` link.
    pub fn driver_of(&self, node: &str) -> Option<String> {
        let link = std::fs::read_link(self.sysfs_drm_dir.join(node).join("device/driver")).ok()?;
        link.file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Render nodes under `render_node_dir`, in minor-number order.
    pub fn render_nodes(&self) -> Result<Vec<RenderNode>, DeviceError> {
        use drm::node::{DrmNode, NodeType};

        let entries = match std::fs::read_dir(&self.render_node_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(DeviceError::Discovery {
                    dir: self.render_node_dir.clone(),
                    source,
                })
            }
        };

        let mut nodes: Vec<RenderNode> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                let node = DrmNode::from_path(&path).ok()?;
                if node.ty() != NodeType::Render {
                    return None;
                }
                let driver = self.driver_of(&entry.file_name().to_string_lossy());
                Some(RenderNode {
                    path,
                    dev: (node.major(), node.minor()),
                    driver,
                })
            })
            .collect();
        nodes.sort_by_key(|node| node.dev.1);
        Ok(nodes)
    }

    /// How render nodes are matched against `kernel`.
    pub fn compatibility(&self, kernel: Option<&crate::device::DeviceNode>) -> Compatibility<'_> {
        use drm::node::{DrmNode, NodeType};

        let own_render_node = kernel
            .and_then(|fd| DrmNode::from_file(fd).ok())
            .and_then(|node| node.node_with_type(NodeType::Render))
            .and_then(Result::ok);
        match own_render_node {
            Some(node) => Compatibility::SameDevice((node.major(), node.minor())),
            None => Compatibility::Drivers(&self.compatible_drivers),
        }
    }
}

#[cfg(unix)]
impl DevicePlatform for LinuxDevices {
    type Fd = crate::device::DeviceNode;

    fn open_kernel_device(&self, path: &Path) -> Result<Self::Fd, DeviceError> {
        crate::device::open_device_node(path)
    }

    fn render_capable_devices(
        &self,
        kernel: Option<&Self::Fd>,
    ) -> Result<RenderDevices<Self::Fd>, DeviceError> {
        let compatibility = self.compatibility(kernel);
        let mut devices = Vec::new();
        for node in self.render_nodes()? {
            if !compatibility.accepts(&node) {
                tracing::debug!(
                    path = %node.path.display(),
                    driver = node.driver.as_deref(),
                    "render node not compatible with kernel device"
                );
                continue;
            }
            match crate::device::open_render_node(&node.path) {
                Ok(fd) => devices.push(RenderDevice {
                    path: node.path,
                    fd,
                }),
                Err(err) => tracing::debug!(%err, "skipping render node"),
            }
        }
        tracing::debug!(
            found = devices.len(),
            kernel_fd = kernel.map(|fd| fd.raw_fd()),
            ?compatibility,
            "render node discovery finished"
        );
        Ok(RenderDevices::new(devices))
    }
}
