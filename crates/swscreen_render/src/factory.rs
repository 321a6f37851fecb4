//! Screen factory
//!
//! Maps a backend to its creation entry point. The entry points themselves
//! belong to the rasterizer implementations linked by the outer framework and
//! reach this crate through [`Rasterizers`].

use crate::acquire::DeviceIndex;
use crate::debug::debug_screen_wrap;
use crate::renderonly::RenderOnly;
use crate::resolver::{candidates, resolve};
use std::sync::{Mutex, MutexGuard, PoisonError};
use swscreen_core::{Backend, ScreenConfig, ScreenHandle, WinsysHandle};
use swscreen_env::{DeviceFd, DevicePlatform};
use swscreen_metrics::Counter;
use swscreen_services::{DriverOptions, HardwareSettings};

/// Everything the freedreno entry point needs, passed explicitly
#[derive(Debug)]
pub struct FreedrenoParams<F: DeviceFd> {
    pub device: DeviceIndex,
    pub config: ScreenConfig,
    /// Ownership moves to the created screen
    pub render_only: RenderOnly<F>,
    pub winsys: WinsysHandle,
}

/// Creation entry points of the linked rasterizers.
///
/// Every method defaults to `None`, meaning "not linked".
pub trait Rasterizers {
    fn llvmpipe(&self, _winsys: &WinsysHandle) -> Option<ScreenHandle> {
        None
    }

    fn softpipe(&self, _winsys: &WinsysHandle) -> Option<ScreenHandle> {
        None
    }

    /// Virgl screen over the vtest transport wrapping `winsys`.
    fn virgl(
        &self,
        _winsys: &WinsysHandle,
        _config: Option<&ScreenConfig>,
    ) -> Option<ScreenHandle> {
        None
    }

    fn zink(
        &self,
        _winsys: &WinsysHandle,
        _config: Option<&ScreenConfig>,
    ) -> Option<ScreenHandle> {
        None
    }

    fn d3d12(
        &self,
        _winsys: &WinsysHandle,
        _config: Option<&ScreenConfig>,
    ) -> Option<ScreenHandle> {
        None
    }

    /// A screen that does not keep `params.render_only` must let it drop.
    fn freedreno<F: DeviceFd + 'static>(
        &self,
        _params: FreedrenoParams<F>,
    ) -> Option<ScreenHandle> {
        None
    }
}

pub struct ScreenFactory<R, P> {
    rasterizers: R,
    platform: P,
    hardware: HardwareSettings,
    options: DriverOptions,
    counter: Mutex<Counter>,
}

#[cfg(unix)]
impl<R: Rasterizers> ScreenFactory<R, swscreen_env::LinuxDevices> {
    /// Factory over the real device tree described by `settings`.
    pub fn new(
        rasterizers: R,
        settings: &swscreen_services::Settings,
        options: DriverOptions,
    ) -> Self {
        let hw = &settings.hardware;
        let platform = swscreen_env::LinuxDevices {
            render_node_dir: hw.render_node_dir.clone(),
            sysfs_drm_dir: hw.sysfs_drm_dir.clone(),
            compatible_drivers: hw.compatible_render_drivers.clone(),
        };
        Self::with_platform(rasterizers, platform, hw.clone(), options)
    }
}

impl<R, P> ScreenFactory<R, P>
where
    R: Rasterizers,
    P: DevicePlatform,
    P::Fd: 'static,
{
    pub fn with_platform(
        rasterizers: R,
        platform: P,
        hardware: HardwareSettings,
        options: DriverOptions,
    ) -> Self {
        Self {
            rasterizers,
            platform,
            hardware,
            options,
            counter: Mutex::new(Counter::new()),
        }
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    pub fn rasterizers(&self) -> &R {
        &self.rasterizers
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Per-backend attempt and creation tallies. Always empty without the
    /// `metrics` feature.
    pub fn metrics(&self) -> MutexGuard<'_, Counter> {
        self.counter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `backend`'s entry point. No debug wrapping.
    pub fn create(&self, backend: Backend, winsys: &WinsysHandle) -> Option<ScreenHandle> {
        match backend {
            #[cfg(feature = "llvmpipe")]
            Backend::Llvmpipe => self.rasterizers.llvmpipe(winsys),
            #[cfg(feature = "virgl")]
            Backend::Virpipe => self.rasterizers.virgl(winsys, None),
            #[cfg(feature = "softpipe")]
            Backend::Softpipe => self.rasterizers.softpipe(winsys),
            #[cfg(feature = "zink")]
            Backend::Zink => self.rasterizers.zink(winsys, None),
            #[cfg(feature = "d3d12")]
            Backend::D3d12 => self.rasterizers.d3d12(winsys, None),
            #[cfg(feature = "freedreno")]
            Backend::Freedreno => self.create_freedreno(winsys),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    #[cfg(feature = "freedreno")]
    fn create_freedreno(&self, winsys: &WinsysHandle) -> Option<ScreenHandle> {
        use crate::acquire::{acquire, Acquired};

        let Acquired {
            render_only,
            device,
        } = match acquire(&self.platform, &self.hardware) {
            Ok(acquired) => acquired,
            Err(err) => {
                tracing::warn!(%err, "freedreno: device acquisition failed");
                return None;
            }
        };
        tracing::debug!(
            device = device.as_raw(),
            fallback = device.is_fallback(),
            "freedreno: creating screen"
        );
        self.rasterizers.freedreno(FreedrenoParams {
            device,
            config: ScreenConfig::default(),
            render_only,
            winsys: winsys.clone(),
        })
    }

    /// Create the screen for `name` and pass it through the debug wrapper.
    /// Unknown and compiled-out names yield `None` without logging.
    pub fn create_named(&self, name: &str, winsys: &WinsysHandle) -> Option<ScreenHandle> {
        let backend = Backend::from_name(name)?;
        swscreen_metrics::metrics! {
            self.metrics().record(backend.name(), swscreen_metrics::Stage::Attempt);
        }
        let screen = self.create(backend, winsys)?;
        swscreen_metrics::metrics! {
            self.metrics().record(backend.name(), swscreen_metrics::Stage::Created);
        }
        tracing::info!(%backend, winsys = winsys.name(), "screen created");
        Some(debug_screen_wrap(screen, &self.options.debug))
    }

    /// Try the candidate backends in priority order. With `sw_vk` only the
    /// Vulkan-capable software rasterizers are considered.
    pub fn sw_screen_create_vk(
        &self,
        winsys: &WinsysHandle,
        sw_vk: bool,
    ) -> Option<ScreenHandle> {
        let names = candidates(&self.options, sw_vk);
        resolve(&names, |name| self.create_named(name, winsys))
    }

    pub fn sw_screen_create(&self, winsys: &WinsysHandle) -> Option<ScreenHandle> {
        self.sw_screen_create_vk(winsys, false)
    }

    /// Zink with the caller's configuration, bypassing selection.
    pub fn sw_screen_create_zink(
        &self,
        winsys: &WinsysHandle,
        config: &ScreenConfig,
    ) -> Option<ScreenHandle> {
        #[cfg(feature = "zink")]
        {
            self.rasterizers.zink(winsys, Some(config))
        }
        #[cfg(not(feature = "zink"))]
        {
            let _ = (winsys, config);
            None
        }
    }
}
