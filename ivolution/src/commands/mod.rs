pub mod check;
pub mod download;
mod progress;
pub mod update;
pub mod versions;
