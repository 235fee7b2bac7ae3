use thiserror::Error;

use super::models::DownloadRequest;

const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Error)]
pub enum RequestValidationError {
    #[error("resourceUrl must not be empty")]
    EmptyUrl,
    #[error("resourceUrl must be an http/https url")]
    UnsupportedScheme,
    #[error("resourceUrl exceeds {MAX_URL_LENGTH} characters")]
    UrlTooLong,
}

pub fn validate_request(request: &DownloadRequest) -> Result<(), RequestValidationError> {
    let url = request.resource_url.as_str();

    if url.is_empty() {
        return Err(RequestValidationError::EmptyUrl);
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(RequestValidationError::UnsupportedScheme);
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(RequestValidationError::UrlTooLong);
    }

    Ok(())
}
