use crate::config::ServerConfig;
use crate::http::request::Request;
use crate::http::status::Status;
use crate::http::{HttpVersion, Method};

#[derive(Debug, PartialEq)]
pub enum ValidatorError {
    HttpVersionNotSupported,
    PayloadTooLarge,
    MalformedHeaderField,
    MissingContentLength,
    BodyNotAllowed,
    MandatoryBody,
}

impl ValidatorError {
    pub fn into_status(self) -> Status {
        match self {
            ValidatorError::HttpVersionNotSupported => Status::HttpVersionNotSupported,
            ValidatorError::PayloadTooLarge => Status::PayloadTooLarge,
            ValidatorError::MalformedHeaderField => Status::BadRequest,
            ValidatorError::MandatoryBody => Status::BadRequest,
            ValidatorError::BodyNotAllowed => Status::BadRequest,
            ValidatorError::MissingContentLength => Status::LengthRequired,
        }
    }
}

/// Checks a parsed request head against the server configuration before
/// its body is read.
pub struct Validator;

impl Validator {
    fn validate_http_version(v: (u8, u8), max: HttpVersion) -> Result<(), ValidatorError> {
        match HttpVersion::from_pair(v) {
            Some(version) if version <= max => Ok(()),
            _ => Err(ValidatorError::HttpVersionNotSupported),
        }
    }

    fn validate_method(content_length: Option<usize>, method: Method) -> Result<(), ValidatorError> {
        match method {
            Method::Get | Method::Head => match content_length {
                Some(n) if n > 0 => Err(ValidatorError::BodyNotAllowed),
                _ => Ok(()),
            },

            Method::Post | Method::Put => match content_length {
                None => Err(ValidatorError::MissingContentLength),
                Some(0) => Err(ValidatorError::MandatoryBody),
                Some(_) => Ok(()),
            },
            _ => Ok(()),
        }
    }

    pub fn validate_request(req: &Request, config: &ServerConfig) -> Result<(), ValidatorError> {
        Self::validate_http_version(req.http_version, config.http_version)?;

        let content_length = req
            .headers
            .get("Content-Length")
            .map(|v| v.parse::<usize>())
            .transpose()
            .map_err(|_| ValidatorError::MalformedHeaderField)?;

        Self::validate_method(content_length, req.method)?;

        if matches!(content_length, Some(n) if n > config.max_body_size) {
            return Err(ValidatorError::PayloadTooLarge);
        }

        Ok(())
    }
}
