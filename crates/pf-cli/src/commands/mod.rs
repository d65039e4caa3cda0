//! CLI command implementations

pub(crate) mod check;
pub(crate) mod common;
pub(crate) mod reset_marks;
pub(crate) mod run;
pub(crate) mod verify;
