#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unsupported capability: {capability} for context {context}")]
    Unsupported {
        capability: &'static str,
        context: String,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ApiError {
    pub fn unsupported(capability: &'static str, context: impl Into<String>) -> Self {
        ApiError::Unsupported {
            capability,
            context: context.into(),
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
