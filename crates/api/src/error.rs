#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid build label '{label}': {reason}")]
    InvalidLabel { label: String, reason: &'static str },
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;
