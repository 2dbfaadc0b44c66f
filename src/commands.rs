use std::env;

use env_logger::Builder;

pub mod generate;
pub mod render;

/// Install the logger. `-v`/`-vv` raise the level; without a flag `RUST_LOG`
/// is honored, falling back to warnings only.
pub fn init_logger(verbose: u8) {
    let rust_log_env = env::var("RUST_LOG");
    let rust_log = match (verbose, rust_log_env.as_deref()) {
        (0, Ok(filters)) => filters,
        (0, Err(_)) => "warn",
        (1, _) => "info",
        _ => "debug",
    };

    let mut builder = Builder::new();
    builder.parse_filters(rust_log).format_timestamp(None);
    let _ = builder.try_init();
}
