pub mod drop_zone;
pub mod intake;
pub mod services;
pub mod timeline;
pub mod traits;
