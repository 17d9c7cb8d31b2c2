use alloc::rc::Rc;

#[path = "kernel/mod.rs"]
mod kernel;
pub use kernel::*;
