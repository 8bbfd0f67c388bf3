use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("target frequency must be a finite value greater than zero, got {0} Hz")]
    InvalidFrequency(f64),

    #[error("pattern has {dots} flashing dot(s) but the mode configures {flags} flash flag(s)")]
    DotCountMismatch { dots: usize, flags: usize },

    // SDL init and draw failures arrive as strings
    #[error("surface error: {0}")]
    Surface(String),

    #[error("mqtt error: {0}")]
    Mqtt(String),

    #[error("invalid value '{value}' for {flag}")]
    InvalidArgument { flag: String, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_argument(flag: &str, value: &str) -> Self {
        Self::InvalidArgument {
            flag: flag.to_string(),
            value: value.to_string(),
        }
    }
}
