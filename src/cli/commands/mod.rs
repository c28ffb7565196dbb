//! Command implementations.

mod check;
mod extract;

pub use check::{cmd_check, cmd_languages};
pub use extract::{cmd_extract, ExtractArgs};
