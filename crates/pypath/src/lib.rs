pub mod app;
pub mod domain;
pub mod infra;

/// Install logging for the process.
pub fn init(verbose: bool) {
    infra::logging::init(verbose);
}
