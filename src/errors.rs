// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Smart home error with the error codes of the remote API and conversions from common 3rd-party
//! errors.

use derive_more::{Constructor, Display};
use log::error;
use strum::{AsRefStr, Display as StrumDisplay, EnumString};

/// Error codes understood by the remote smart home API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, StrumDisplay, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    DeviceUnreachable,
    DeviceNotFound,
    InvalidAction,
    InvalidValue,
    NotSupportedInCurrentMode,
    InternalError,
}

#[derive(Debug, Clone, Constructor, Display, PartialEq)]
#[display("{code}: {message}")]
pub struct SmartHomeError {
    pub code: ErrorCode,
    pub message: String,
}

impl std::error::Error for SmartHomeError {}

impl From<serde_json::Error> for SmartHomeError {
    fn from(e: serde_json::Error) -> Self {
        error!("{:?}", e);
        SmartHomeError::new(ErrorCode::InternalError, e.to_string())
    }
}

impl From<config::ConfigError> for SmartHomeError {
    fn from(e: config::ConfigError) -> Self {
        SmartHomeError::new(
            ErrorCode::InternalError,
            format!("Invalid configuration: {e}"),
        )
    }
}
