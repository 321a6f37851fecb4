//! Backend resolution
//!
//! Candidates are tried strictly in order and the first screen wins. Slot 0
//! always holds the user's explicit request (possibly empty); when that
//! request fails nothing else is tried.

use swscreen_core::ScreenHandle;
use swscreen_services::DriverOptions;

fn slot(keep: bool, name: &str) -> String {
    if keep {
        name.to_string()
    } else {
        String::new()
    }
}

/// Ordered candidate names for this build.
///
/// Empty entries mark backends that are compiled in but excluded by the
/// current flags; they never match a backend.
pub fn candidates(options: &DriverOptions, sw_vk: bool) -> Vec<String> {
    let mut names = Vec::with_capacity(5);
    names.push(slot(!sw_vk, &options.driver_override));
    #[cfg(feature = "d3d12")]
    names.push(slot(!(sw_vk || options.only_software), "d3d12"));
    #[cfg(feature = "freedreno")]
    names.push(slot(!(sw_vk || options.only_software), "freedreno"));
    #[cfg(feature = "llvmpipe")]
    names.push("llvmpipe".to_string());
    #[cfg(feature = "softpipe")]
    names.push(slot(!sw_vk, "softpipe"));
    names
}

/// Return the first screen `create` produces for `candidates`.
///
/// `create` is never invoked again after a success. A non-empty first
/// candidate is an explicit request: if it fails, resolution stops.
pub fn resolve<S, F>(candidates: &[S], mut create: F) -> Option<ScreenHandle>
where
    S: AsRef<str>,
    F: FnMut(&str) -> Option<ScreenHandle>,
{
    for (i, name) in candidates.iter().enumerate() {
        let name = name.as_ref();
        if let Some(screen) = create(name) {
            return Some(screen);
        }
        if i == 0 && !name.is_empty() {
            tracing::debug!(driver = name, "requested driver unavailable, not falling back");
            return None;
        }
    }
    tracing::debug!("no candidate produced a screen");
    None
}
