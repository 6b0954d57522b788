//! Repository plumbing: configuration, root discovery, and the seams the
//! core consumes from its embedder (filesystem probe, clock, document
//! overlay provider).

mod config;
mod fs;
mod platform;

pub use config::{
    find_repo_root, load_repo_config, RepoConfig, REPO_MARKER, SKIN_ELEMENTS_FILE,
    VISUAL_STYLES_FILE,
};
pub use fs::{Clock, DocumentProvider, FileSystem, NoOverlay, OsFileSystem, SystemClock};
pub use platform::current_platform;
