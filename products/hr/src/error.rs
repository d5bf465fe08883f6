use platform_api::ApiError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("employee {0} not found")]
    NotFound(i64),
}

#[derive(Debug, Error)]
pub enum HrError {
    #[error("employee already exists with given email: {email}")]
    AlreadyExists { email: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type HrResult<T> = Result<T, HrError>;

impl From<HrError> for ApiError {
    fn from(err: HrError) -> Self {
        match err {
            HrError::AlreadyExists { .. } => ApiError::Conflict(err.to_string()),
            HrError::Repository(RepositoryError::NotFound(_)) => ApiError::NotFound,
            HrError::Repository(source) => ApiError::internal(source.into()),
        }
    }
}
