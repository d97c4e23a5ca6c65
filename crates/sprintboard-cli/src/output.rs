use serde::Serialize;
use sprintboard_core::SprintboardError;
use uuid::Uuid;

#[derive(Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Structured error payload
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Uuid>,
}

impl From<&anyhow::Error> for ErrorBody {
    fn from(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<SprintboardError>() {
            Some(err) => match err.rejection() {
                Some(rejection) => Self {
                    code: rejection.code.to_string(),
                    message: rejection.message.clone(),
                    entity_id: rejection.entity_id,
                },
                None => Self {
                    code: err.code().to_string(),
                    message: err.to_string(),
                    entity_id: None,
                },
            },
            None => Self {
                code: "invalid_input".to_string(),
                message: error.to_string(),
                entity_id: None,
            },
        }
    }
}

pub fn output_success<T: Serialize>(data: T) {
    let response = CliResponse {
        success: true,
        api_version: env!("CARGO_PKG_VERSION"),
        data: Some(data),
        error: None,
    };
    match serde_json::to_string(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to serialize response: {}", e),
    }
}

/// Prints an error response to stderr and exits with status 1.
pub fn output_error(error: &anyhow::Error) -> ! {
    let response: CliResponse<()> = CliResponse {
        success: false,
        api_version: env!("CARGO_PKG_VERSION"),
        data: None,
        error: Some(ErrorBody::from(error)),
    };
    match serde_json::to_string(&response) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{}", error),
    }
    std::process::exit(1);
}
