use thiserror::Error;

/// Failures of the weather data client.
///
/// The domain layer does not tell these apart: any of them means "data
/// unavailable". They stay distinct so logs say what went wrong.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(
        "OpenWeather API key not found.\n\
         Hint: set OPENWEATHER_API_KEY or run `world-weather configure`."
    )]
    MissingApiKey,

    #[error("Failed to send {what} request to OpenWeather")]
    Transport {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("OpenWeather {what} request failed with status {status}: {body}")]
    Status { what: &'static str, status: reqwest::StatusCode, body: String },

    #[error("Failed to parse OpenWeather {what} response")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("OpenWeather response is missing `{0}`")]
    MissingField(&'static str),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
