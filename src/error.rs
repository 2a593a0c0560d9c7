use thiserror::Error;

/// Errors raised while turning page markup into a backdrop.
///
/// Drawing itself never fails; these only cover configuration input.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid backdrop config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("unknown backdrop variant `{0}`")]
    UnknownVariant(String),

    #[error("unknown theme `{0}` (expected `light` or `dark`)")]
    UnknownTheme(String),
}

pub type Result<T> = std::result::Result<T, Error>;
