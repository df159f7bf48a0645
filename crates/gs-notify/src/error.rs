// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for push-notification routing

use thiserror::Error;

/// Result type alias for notification routing operations
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Errors raised while routing a push notification
///
/// None of these abort a notification: the matcher treats them as "this
/// source does not match" and keeps going.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid repository URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Source error: {0}")]
    Source(#[from] gs_source::Error),
}
