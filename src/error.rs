//! Error type shared by the fallible parts of the compositor.
//!
//! Most rendering failures are recovered locally (a slot or sticker is simply
//! skipped). The variants here cover the operations that report back to the
//! caller: parsing colours and sessions, decoding assets, and encoding output.

pub type PhotoboothResult<T> = Result<T, PhotoboothError>;

#[derive(thiserror::Error, Debug)]
pub enum PhotoboothError {
    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("invalid canvas: {0}")]
    InvalidCanvas(String),

    #[error("asset error: {0}")]
    Asset(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("render task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PhotoboothError {
    pub fn invalid_color(msg: impl Into<String>) -> Self {
        Self::InvalidColor(msg.into())
    }

    pub fn invalid_canvas(msg: impl Into<String>) -> Self {
        Self::InvalidCanvas(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn task(msg: impl Into<String>) -> Self {
        Self::Task(msg.into())
    }
}
