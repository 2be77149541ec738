use crate::sender::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("{0} is too many InfluxDB clients, expected at most one")]
    TooManyClients(usize),

    #[error("Failed to create InfluxDB client: {0}")]
    Client(#[from] ClientError),

    #[error("InfluxDB is not ready")]
    NotReady,

    #[error("InfluxDB readiness check failed: {0}")]
    ReadinessCheck(#[source] ClientError),

    #[error("Failed to resolve host name: {0}")]
    Hostname(#[source] std::io::Error),
}
