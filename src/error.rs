#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sensor provider initialization failed: {0}")]
    ProviderInit(String),

    #[error("Sensor read failed: {0}")]
    SensorRead(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Feature not available: {0}")]
    NotAvailable(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl Error {
    pub(crate) fn provider_init<S: Into<String>>(msg: S) -> Self {
        Error::ProviderInit(msg.into())
    }

    pub(crate) fn sensor_read<S: Into<String>>(msg: S) -> Self {
        Error::SensorRead(msg.into())
    }

    pub(crate) fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Error::InvalidConfig(msg.into())
    }

    pub(crate) fn not_available<S: Into<String>>(msg: S) -> Self {
        Error::NotAvailable(msg.into())
    }

    pub(crate) fn runtime<S: Into<String>>(msg: S) -> Self {
        Error::Runtime(msg.into())
    }

    /// True for errors a sampler should ride out until its next tick
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::SensorRead(_) | Error::NotAvailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
