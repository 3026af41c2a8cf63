#[derive(Debug)]
pub enum ServerError {
    Io(std::io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "server io error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn sim_not_found(requested_sim_id: &str, active_sim_id: Option<&str>) -> Self {
        let details = active_sim_id
            .map(|active| format!("requested_sim_id={requested_sim_id} active_sim_id={active}"));
        Self {
            status: StatusCode::NOT_FOUND,
            error: ApiError::new(
                ErrorCode::SimNotFound,
                "sim_id does not match an active sim",
                details,
            ),
        }
    }

    fn npc_not_found(name: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: ApiError::new(
                ErrorCode::NpcNotFound,
                "no NPC by that name in the roster",
                Some(format!("npc={name}")),
            ),
        }
    }

    fn invalid_query(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::new(ErrorCode::InvalidQuery, message, details),
        }
    }

    fn internal(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new(ErrorCode::InternalError, message, details),
        }
    }

    fn from_checkpoint(err: CheckpointError) -> Self {
        match err {
            CheckpointError::NotFound(name) => Self {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new(
                    ErrorCode::CheckpointNotFound,
                    "no checkpoint by that name",
                    Some(format!("name={name}")),
                ),
            },
            CheckpointError::NotAttached => {
                Self::invalid_query("checkpoint store is not attached", None)
            }
            CheckpointError::InvalidName(name) => {
                Self::invalid_query("invalid checkpoint name", Some(format!("name={name:?}")))
            }
            other => Self::internal("checkpoint operation failed", Some(other.to_string())),
        }
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
