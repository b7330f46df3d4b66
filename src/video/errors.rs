use crate::utils::handle::HandleLike;

/// Errors raised by the video frontend before anything reaches the backend.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "{} does not name a live resource.", _0)]
    HandleInvalid(String),
    #[fail(display = "Shader is invalid: {}.", _0)]
    ShaderInvalid(String),
    #[fail(display = "Texture is invalid: {}.", _0)]
    TextureInvalid(String),
    #[fail(display = "Undefined attribute '{}'.", _0)]
    AttributeUndefined(String),
    #[fail(display = "{} was created immutable.", _0)]
    Immutable(String),
    #[fail(display = "{} bytes exceed a buffer of {} bytes.", _0, _1)]
    OutOfBounds(usize, usize),
}

impl Error {
    pub fn invalid<H: HandleLike>(handle: H) -> Self {
        Error::HandleInvalid(handle.to_string())
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;
