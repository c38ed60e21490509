use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Task deadline passed while waiting in the queue")]
    Timeout,

    #[error("Task cancelled before it ran")]
    Cancelled,

    #[error("Request queue is closed")]
    QueueClosed,
}

pub type Result<T> = std::result::Result<T, DispatchError>;
