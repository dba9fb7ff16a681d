pub mod gateway;
pub mod hooks;
