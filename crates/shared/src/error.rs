use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown connection status: {0:?}")]
pub struct UnknownConnectionStatus(pub String);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("shortcut name must not be empty")]
    EmptyName,
    #[error("shortcut name is {actual} characters, at most {max} allowed")]
    NameTooLong { max: usize, actual: usize },
    #[error("height {0:?} is not a number")]
    InvalidHeight(String),
    #[error("height {height_mm} is outside {min}..={max}")]
    HeightOutOfRange { height_mm: i32, min: i32, max: i32 },
}
