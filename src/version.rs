//! Version information for the catalog browser
//!
//! Values come from Cargo.toml at build time.

/// The version of the catalog browser
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The package name, also used in the default user agent
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// The description of the application
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// The repository URL
pub const APP_REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");

/// Get the full version string
pub fn full_version() -> String {
    format!("{} v{}", APP_NAME, VERSION)
}

/// Get build information string
pub fn build_info() -> String {
    format!(
        "{}\n{}\n{}\nBuilt with Rust {}",
        full_version(),
        APP_DESCRIPTION,
        APP_REPOSITORY,
        rustc_version()
    )
}

fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
