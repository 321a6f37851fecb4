//! Fakes shared by the unit tests

use crate::factory::{FreedrenoParams, Rasterizers};
use crate::renderonly::RenderOnly;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use swscreen_core::{Screen, ScreenConfig, ScreenHandle, SwWinsys, WinsysHandle};
use swscreen_env::{
    DeviceError, DeviceFd, DevicePlatform, RawFd, RenderDevice, RenderDevices, ScanoutBuffer,
};

#[derive(Debug, Default)]
struct LedgerState {
    next: RawFd,
    opened: Vec<RawFd>,
    closed: Vec<RawFd>,
    buffers: u32,
    destroyed: Vec<u32>,
    fail_destroy: bool,
}

/// Records every fake descriptor opened and closed
#[derive(Debug, Clone, Default)]
pub struct Ledger(Arc<Mutex<LedgerState>>);

impl Ledger {
    pub fn new() -> Self {
        let ledger = Self::default();
        ledger.0.lock().unwrap().next = 100;
        ledger
    }

    pub fn open(&self) -> FakeFd {
        let mut state = self.0.lock().unwrap();
        let fd = state.next;
        state.next += 1;
        state.opened.push(fd);
        FakeFd {
            fd,
            ledger: self.clone(),
        }
    }

    pub fn opened(&self) -> usize {
        self.0.lock().unwrap().opened.len()
    }

    pub fn closed(&self) -> Vec<RawFd> {
        self.0.lock().unwrap().closed.clone()
    }

    pub fn destroyed_buffers(&self) -> Vec<u32> {
        self.0.lock().unwrap().destroyed.clone()
    }

    /// Make every later buffer release fail, or succeed again.
    pub fn fail_destroy(&self, fail: bool) {
        self.0.lock().unwrap().fail_destroy = fail;
    }

    /// Every opened descriptor has been closed, and none twice.
    pub fn all_closed_once(&self) -> bool {
        let state = self.0.lock().unwrap();
        let mut opened = state.opened.clone();
        let mut closed = state.closed.clone();
        opened.sort_unstable();
        closed.sort_unstable();
        opened == closed
    }

    pub fn is_open(&self, fd: RawFd) -> bool {
        let state = self.0.lock().unwrap();
        state.opened.contains(&fd) && !state.closed.contains(&fd)
    }
}

#[derive(Debug)]
pub struct FakeFd {
    fd: RawFd,
    ledger: Ledger,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeBuffer {
    handle: u32,
    pitch: u32,
}

impl ScanoutBuffer for FakeBuffer {
    fn handle(&self) -> u32 {
        self.handle
    }

    fn pitch(&self) -> u32 {
        self.pitch
    }
}

impl DeviceFd for FakeFd {
    type Buffer = FakeBuffer;

    fn try_clone_fd(&self) -> Result<Self, DeviceError> {
        Ok(self.ledger.open())
    }

    fn raw_fd(&self) -> RawFd {
        self.fd
    }

    fn create_dumb_buffer(
        &self,
        width: u32,
        _height: u32,
        bpp: u32,
    ) -> Result<FakeBuffer, DeviceError> {
        let mut state = self.ledger.0.lock().unwrap();
        state.buffers += 1;
        Ok(FakeBuffer {
            handle: state.buffers,
            pitch: width * bpp.div_ceil(8),
        })
    }

    fn destroy_dumb_buffer(&self, buffer: &FakeBuffer) -> Result<(), DeviceError> {
        let mut state = self.ledger.0.lock().unwrap();
        if state.fail_destroy {
            return Err(DeviceError::Ioctl {
                request: "DRM_IOCTL_MODE_DESTROY_DUMB",
                fd: self.fd,
                source: std::io::Error::from_raw_os_error(16),
            });
        }
        state.destroyed.push(buffer.handle);
        Ok(())
    }
}

impl Drop for FakeFd {
    fn drop(&mut self) {
        self.ledger.0.lock().unwrap().closed.push(self.fd);
    }
}

/// Device platform backed by a ledger
#[derive(Debug)]
pub struct FakePlatform {
    pub ledger: Ledger,
    pub kernel_opens: bool,
    pub render_devices: usize,
    pub discovery_fails: bool,
    pub kernel_paths: RefCell<Vec<PathBuf>>,
}

impl FakePlatform {
    pub fn new(kernel_opens: bool, render_devices: usize) -> Self {
        Self {
            ledger: Ledger::new(),
            kernel_opens,
            render_devices,
            discovery_fails: false,
            kernel_paths: RefCell::new(Vec::new()),
        }
    }
}

impl DevicePlatform for FakePlatform {
    type Fd = FakeFd;

    fn open_kernel_device(&self, path: &Path) -> Result<FakeFd, DeviceError> {
        self.kernel_paths.borrow_mut().push(path.to_path_buf());
        if self.kernel_opens {
            Ok(self.ledger.open())
        } else {
            Err(DeviceError::Open {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    fn render_capable_devices(
        &self,
        _kernel: Option<&FakeFd>,
    ) -> Result<RenderDevices<FakeFd>, DeviceError> {
        if self.discovery_fails {
            return Err(DeviceError::Discovery {
                dir: PathBuf::from("/dev/dri"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        let devices = (0..self.render_devices)
            .map(|i| RenderDevice {
                path: PathBuf::from(format!("/dev/dri/renderD{}", 128 + i)),
                fd: self.ledger.open(),
            })
            .collect();
        Ok(RenderDevices::new(devices))
    }
}

#[derive(Debug)]
pub struct TestWinsys;

impl SwWinsys for TestWinsys {
    fn name(&self) -> &str {
        "test"
    }
}

pub fn winsys() -> WinsysHandle {
    Arc::new(TestWinsys)
}

#[derive(Debug)]
pub struct TestScreen(pub String);

impl Screen for TestScreen {
    fn name(&self) -> &str {
        &self.0
    }
}

/// A hardware screen that owns its render-only context
#[derive(Debug)]
pub struct HardwareScreen<F: DeviceFd>(pub RenderOnly<F>);

impl<F: DeviceFd> Screen for HardwareScreen<F> {
    fn name(&self) -> &str {
        "freedreno"
    }
}

/// What the freedreno entry point was handed
#[derive(Debug, Clone, PartialEq)]
pub struct FreedrenoCall {
    pub device: i32,
    pub kms_fd: Option<RawFd>,
    pub gpu_fd: Option<RawFd>,
    pub table_empty: bool,
    pub config_empty: bool,
    pub winsys: String,
}

/// Rasterizers that succeed only for the listed backends and log every call
#[derive(Debug, Default)]
pub struct StubRasterizers {
    pub working: Vec<&'static str>,
    pub calls: RefCell<Vec<String>>,
    pub freedreno_calls: RefCell<Vec<FreedrenoCall>>,
    pub configs: RefCell<Vec<Option<ScreenConfig>>>,
    /// A working freedreno returns a [`HardwareScreen`] instead of dropping
    /// the context
    pub keeps_render_only: bool,
}

impl StubRasterizers {
    pub fn working(names: &[&'static str]) -> Self {
        Self {
            working: names.to_vec(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn make(&self, name: &str) -> Option<ScreenHandle> {
        self.calls.borrow_mut().push(name.to_string());
        self.working
            .contains(&name)
            .then(|| Box::new(TestScreen(name.to_string())) as ScreenHandle)
    }
}

impl Rasterizers for StubRasterizers {
    fn llvmpipe(&self, _winsys: &WinsysHandle) -> Option<ScreenHandle> {
        self.make("llvmpipe")
    }

    fn softpipe(&self, _winsys: &WinsysHandle) -> Option<ScreenHandle> {
        self.make("softpipe")
    }

    fn virgl(&self, _winsys: &WinsysHandle, config: Option<&ScreenConfig>) -> Option<ScreenHandle> {
        self.configs.borrow_mut().push(config.cloned());
        self.make("virpipe")
    }

    fn zink(&self, _winsys: &WinsysHandle, config: Option<&ScreenConfig>) -> Option<ScreenHandle> {
        self.configs.borrow_mut().push(config.cloned());
        self.make("zink")
    }

    fn d3d12(&self, _winsys: &WinsysHandle, config: Option<&ScreenConfig>) -> Option<ScreenHandle> {
        self.configs.borrow_mut().push(config.cloned());
        self.make("d3d12")
    }

    fn freedreno<F: DeviceFd + 'static>(&self, params: FreedrenoParams<F>) -> Option<ScreenHandle> {
        self.freedreno_calls.borrow_mut().push(FreedrenoCall {
            device: params.device.as_raw(),
            kms_fd: params.render_only.kms_fd(),
            gpu_fd: params.render_only.gpu_fd(),
            table_empty: params.render_only.is_empty(),
            config_empty: params.config.is_empty(),
            winsys: params.winsys.name().to_string(),
        });
        if self.keeps_render_only {
            return self
                .make("freedreno")
                .map(|_| Box::new(HardwareScreen(params.render_only)) as ScreenHandle);
        }
        self.make("freedreno")
    }
}
