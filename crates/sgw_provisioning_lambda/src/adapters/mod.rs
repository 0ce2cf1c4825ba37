pub mod aws;
pub mod secret_store;
pub mod storage_gateway;
