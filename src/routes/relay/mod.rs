mod handler;
mod model;

pub use handler::{forward, quota_status};
