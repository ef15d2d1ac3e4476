use thiserror::Error;

#[derive(Debug, Error)]
pub enum HirewireError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown time zone: {0}")]
    Timezone(String),
}

pub type Result<T> = std::result::Result<T, HirewireError>;
