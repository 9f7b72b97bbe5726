//! The JSON reply for requests that match no route.

use crate::api_result::{ApiError, ApiResult};

/// The reply for any route that does not exist.
pub async fn get_404_not_found() -> ApiResult<()> {
    ApiResult::Error(ApiError::NotFound)
}
