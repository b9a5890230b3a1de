//! Compile-time build metadata surfaced by the `version` command.

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_status: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

pub fn current() -> BuildInfo {
    BuildInfo {
        version: CLI_VERSION,
        git_hash: env!("TALLY_BUILD_HASH"),
        git_status: env!("TALLY_BUILD_STATUS"),
        timestamp: env!("TALLY_BUILD_TIMESTAMP"),
        target: env!("TALLY_BUILD_TARGET"),
        profile: env!("TALLY_BUILD_PROFILE"),
        rustc: env!("TALLY_BUILD_RUSTC"),
    }
}
