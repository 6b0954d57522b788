//! Platform gating string for the current process.

use once_cell::sync::Lazy;

static PLATFORM: Lazy<Option<&'static str>> = Lazy::new(|| match std::env::consts::OS {
    "macos" => Some("mac"),
    "windows" => Some("win"),
    _ => None,
});

/// The gating string used by `<?platform …?>` directives: `mac` on macOS,
/// `win` on Windows, and no gating anywhere else.
pub fn current_platform() -> Option<&'static str> {
    *PLATFORM
}
