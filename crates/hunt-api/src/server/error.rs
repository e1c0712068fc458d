#[derive(Debug)]
pub enum ServerError {
    Io(std::io::Error),
    Persistence(PersistenceError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "server io error: {err}"),
            Self::Persistence(err) => write!(f, "server storage error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<PersistenceError> for ServerError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn invalid_query(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::new(ErrorCode::InvalidQuery, message, details),
        }
    }

    fn invalid_amount(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::new(ErrorCode::InvalidAmount, message, details),
        }
    }

    fn from_hunt(err: HuntError) -> Self {
        let status = match &err {
            HuntError::InvalidState(_) | HuntError::MarketClosed(_) => StatusCode::CONFLICT,
            HuntError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            HuntError::NotFound { .. } => StatusCode::NOT_FOUND,
            HuntError::ExternalSyncFailure(_) => StatusCode::BAD_GATEWAY,
            HuntError::InvalidCatalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let details = match &err {
            HuntError::NotFound { kind, id } => Some(format!("{kind}={id}")),
            HuntError::ExternalSyncFailure(sync) => Some(format!("collaborator={}", sync.collaborator)),
            _ => None,
        };
        Self {
            status,
            error: ApiError::new(err.error_code(), err.to_string(), details),
        }
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
