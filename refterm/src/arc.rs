use alloc::sync::Arc as Rc;

#[path = "kernel/mod.rs"]
mod kernel;
pub use kernel::*;
