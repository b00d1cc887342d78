use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "WANDERLUST_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "WANDERLUST_STORAGE_BACKEND";
pub const MONGODB_URI_ENV: &str = "WANDERLUST_MONGODB_URI";
pub const MONGODB_DATABASE_ENV: &str = "WANDERLUST_MONGODB_DATABASE";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_MONGODB_URI: &str = "mongodb://127.0.0.1:27017";
pub const DEFAULT_MONGODB_DATABASE: &str = "wanderLust";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mongodb")]
    Mongodb,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mongodb => write!(f, "mongodb"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "wanderlust", about = "Server-rendered property listings")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Mongodb
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MONGODB_URI_ENV, default_value = DEFAULT_MONGODB_URI)]
    pub mongodb_uri: String,

    #[arg(long, env = MONGODB_DATABASE_ENV, default_value = DEFAULT_MONGODB_DATABASE)]
    pub database: String,
}
