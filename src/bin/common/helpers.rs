use std::fmt::Display;

use flies::error::FLiESError;

#[derive(Debug)]
pub struct RunError {
    msg: String,
}

impl From<String> for RunError {
    fn from(msg: String) -> Self {
        RunError { msg }
    }
}

impl From<RunError> for String {
    fn from(value: RunError) -> String {
        value.msg
    }
}

impl From<&str> for RunError {
    fn from(msg: &str) -> Self {
        RunError { msg: msg.into() }
    }
}

impl From<FLiESError> for RunError {
    fn from(err: FLiESError) -> Self {
        RunError {
            msg: err.to_string(),
        }
    }
}

impl Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for RunError {}
