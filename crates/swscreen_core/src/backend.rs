//! Backend identifiers
//!
//! The set of rasterization backends is closed and fixed when the crate is
//! built: each variant only exists when its cargo feature is enabled, so a
//! name for a compiled-out backend simply never resolves.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A rasterization backend compiled into this build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// LLVM-based software rasterizer
    #[cfg(feature = "llvmpipe")]
    Llvmpipe,
    /// Virgl over the vtest transport
    #[cfg(feature = "virgl")]
    Virpipe,
    /// Reference software rasterizer
    #[cfg(feature = "softpipe")]
    Softpipe,
    /// GL on top of Vulkan
    #[cfg(feature = "zink")]
    Zink,
    /// GL on top of Direct3D 12
    #[cfg(feature = "d3d12")]
    D3d12,
    /// Adreno hardware driver through a render-only device
    #[cfg(feature = "freedreno")]
    Freedreno,
}

/// Every compiled-in backend, in declaration order
const AVAILABLE: &[Backend] = &[
    #[cfg(feature = "llvmpipe")]
    Backend::Llvmpipe,
    #[cfg(feature = "virgl")]
    Backend::Virpipe,
    #[cfg(feature = "softpipe")]
    Backend::Softpipe,
    #[cfg(feature = "zink")]
    Backend::Zink,
    #[cfg(feature = "d3d12")]
    Backend::D3d12,
    #[cfg(feature = "freedreno")]
    Backend::Freedreno,
];

/// Returned when a name does not match any compiled-in backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("backend '{name}' is not available in this build")]
pub struct UnknownBackend {
    pub name: String,
}

impl Backend {
    /// Backends available in this build.
    pub fn available() -> &'static [Backend] {
        AVAILABLE
    }

    /// Exact, case-sensitive lookup. The empty string never matches.
    pub fn from_name(name: &str) -> Option<Backend> {
        AVAILABLE.iter().copied().find(|b| b.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "llvmpipe")]
            Backend::Llvmpipe => "llvmpipe",
            #[cfg(feature = "virgl")]
            Backend::Virpipe => "virpipe",
            #[cfg(feature = "softpipe")]
            Backend::Softpipe => "softpipe",
            #[cfg(feature = "zink")]
            Backend::Zink => "zink",
            #[cfg(feature = "d3d12")]
            Backend::D3d12 => "d3d12",
            #[cfg(feature = "freedreno")]
            Backend::Freedreno => "freedreno",
        }
    }

    /// Pure CPU rasterizers that need no device.
    pub fn is_software(self) -> bool {
        match self {
            #[cfg(feature = "llvmpipe")]
            Backend::Llvmpipe => true,
            #[cfg(feature = "softpipe")]
            Backend::Softpipe => true,
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::from_name(s).ok_or_else(|| UnknownBackend {
            name: s.to_string(),
        })
    }
}
