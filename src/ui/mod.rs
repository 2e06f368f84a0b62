//! Text-menu front end.

pub mod menu;
pub mod shell;

pub use menu::{Command, Menu};
pub use shell::{company_line, Shell};
