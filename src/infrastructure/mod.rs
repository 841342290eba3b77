pub mod logging;
pub mod simulated;
