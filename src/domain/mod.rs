pub mod codec;
pub mod models;
pub mod session;
pub mod settings;
pub mod transport;
