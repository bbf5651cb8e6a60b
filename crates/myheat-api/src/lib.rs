// myheat-api: Async Rust client for the MyHeat cloud RPC API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::Credentials;
pub use client::{DEFAULT_ENDPOINT, MhClient};
pub use error::{Error, ErrorKind};
pub use models::{
    DeviceInfo, DeviceList, DeviceSummary, Eng, Env, EnvType, Heater, RpcResponse,
    SEVERITY_NORMAL,
};
pub use transport::{TlsMode, TransportConfig};
