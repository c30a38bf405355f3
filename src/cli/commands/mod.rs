//! CLI command implementations.

mod assemble;
mod config;
mod doctor;
mod durations;
mod env_check;
mod generate;
mod narrate;
mod run;
mod voices;

pub use assemble::run_assemble;
pub use config::run_config;
pub use doctor::run_doctor;
pub use durations::run_durations;
pub use env_check::run_env_check;
pub use generate::run_generate;
pub use narrate::run_narrate;
pub use run::run_pipeline;
pub use voices::run_voices;
