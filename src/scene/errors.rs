use crate::video::assets::shader::UniformVariableType;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(
        display = "Uniform {} has type {:?}, which can not be set with {:?}.",
        name, expected, found
    )]
    UniformTypeMismatch {
        name: String,
        expected: UniformVariableType,
        found: UniformVariableType,
    },
    #[fail(display = "Render pass {} has not been initialized.", _0)]
    PassUninitialized(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;
