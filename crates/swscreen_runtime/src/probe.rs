//! Stand-in winsys and rasterizers for the probe

use swscreen_core::{Screen, ScreenConfig, ScreenHandle, SwWinsys, WinsysHandle};
use swscreen_env::DeviceFd;
use swscreen_render::{DeviceIndex, FreedrenoParams, Rasterizers, RenderOnly};

#[derive(Debug)]
pub struct ProbeWinsys;

impl SwWinsys for ProbeWinsys {
    fn name(&self) -> &str {
        "probe"
    }
}

/// A software screen that records which entry point built it
#[derive(Debug)]
pub struct ProbeScreen {
    name: &'static str,
    config: Option<ScreenConfig>,
}

impl Screen for ProbeScreen {
    fn name(&self) -> &str {
        self.name
    }

    fn vendor(&self) -> &str {
        match &self.config {
            Some(cfg) if !cfg.is_empty() => "probe (configured)",
            _ => "probe",
        }
    }
}

/// A hardware screen that keeps its render-only context alive
#[derive(Debug)]
pub struct ProbeHardwareScreen<F: DeviceFd> {
    device: DeviceIndex,
    render_only: RenderOnly<F>,
}

impl<F: DeviceFd> Screen for ProbeHardwareScreen<F> {
    fn name(&self) -> &str {
        "freedreno"
    }

    fn vendor(&self) -> &str {
        if self.device.is_fallback() {
            "probe (fallback device)"
        } else if self.render_only.kms_fd().is_some() {
            "probe (kernel device)"
        } else {
            "probe"
        }
    }
}

#[derive(Debug)]
pub struct ProbeRasterizers;

fn software(name: &'static str, config: Option<&ScreenConfig>) -> Option<ScreenHandle> {
    tracing::debug!(backend = name, "probe entry point");
    Some(Box::new(ProbeScreen {
        name,
        config: config.cloned(),
    }))
}

impl Rasterizers for ProbeRasterizers {
    fn llvmpipe(&self, _winsys: &WinsysHandle) -> Option<ScreenHandle> {
        software("llvmpipe", None)
    }

    fn softpipe(&self, _winsys: &WinsysHandle) -> Option<ScreenHandle> {
        software("softpipe", None)
    }

    fn virgl(&self, _winsys: &WinsysHandle, config: Option<&ScreenConfig>) -> Option<ScreenHandle> {
        software("virpipe", config)
    }

    fn zink(&self, _winsys: &WinsysHandle, config: Option<&ScreenConfig>) -> Option<ScreenHandle> {
        software("zink", config)
    }

    fn d3d12(&self, _winsys: &WinsysHandle, config: Option<&ScreenConfig>) -> Option<ScreenHandle> {
        software("d3d12", config)
    }

    fn freedreno<F: DeviceFd + 'static>(&self, params: FreedrenoParams<F>) -> Option<ScreenHandle> {
        tracing::info!(
            device = params.device.as_raw(),
            gpu_fd = params.render_only.gpu_fd(),
            winsys = params.winsys.name(),
            "probe freedreno entry point"
        );
        Some(Box::new(ProbeHardwareScreen {
            device: params.device,
            render_only: params.render_only,
        }))
    }
}
