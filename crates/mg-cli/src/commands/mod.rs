//! CLI command implementations

pub(crate) mod add;
pub(crate) mod common;
pub(crate) mod down;
pub(crate) mod export;
pub(crate) mod ping;
pub(crate) mod up;
