mod application;
pub mod data;
mod outcome_printer;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use outcome_printer::OutcomePrinter;
pub use runtime_config::RuntimeConfig;
