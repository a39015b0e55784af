pub mod client;
pub mod throttle;

pub use client::{VkClient, DEFAULT_API_BASE, DEFAULT_API_VERSION};
pub use throttle::RequestThrottle;
