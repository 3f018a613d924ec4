//! AppSync error conversion

use aws_sdk_appsync::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use sweepkit_core::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppSyncError {
    #[error("no AWS credentials available for {region}")]
    MissingCredentials { region: String },
}

/// Convert an SDK failure into an [`ApiError`] so skip rules can see its code.
///
/// Transport failures carry no service code; they are reported as
/// `RequestError` the same way an unreachable regional endpoint is.
pub(crate) fn sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> anyhow::Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let api = match &err {
        SdkError::DispatchFailure(_) => ApiError::coded(
            "RequestError",
            format!("send request failed: {}", DisplayErrorContext(&err)),
        ),
        _ => {
            let message = err
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
            ApiError::new(err.code(), message)
        }
    };
    anyhow::Error::new(api).context(format!("{operation} failed"))
}
