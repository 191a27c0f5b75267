use thiserror::Error;

#[derive(Debug, Error)]
#[error("Custom error occurred")]
pub struct CustomError;
