pub mod consistency;
pub mod dispatch;
pub mod file_share;
pub mod gateway;
pub mod secret_resolver;
