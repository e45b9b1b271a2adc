pub mod commands;
pub mod navigation;
pub mod util;
