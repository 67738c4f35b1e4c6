use reqwest::{Response, StatusCode};
use serde_json::Value;

use crate::core::ExtractError;

/// Map the response status and decode the body as JSON.
///
/// 401 becomes [`ExtractError::Unauthorized`] so the session can be dropped;
/// any other non-2xx status becomes [`ExtractError::Status`].
pub(crate) async fn read_json(resp: Response, endpoint: &str) -> Result<Value, ExtractError> {
    let url = resp.url().to_string();
    let status = resp.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(ExtractError::Unauthorized { url });
    }
    if !status.is_success() {
        return Err(ExtractError::Status {
            status: status.as_u16(),
            url,
        });
    }

    let text = resp.text().await?;
    serde_json::from_str(&text)
        .map_err(|e| ExtractError::Data(format!("{endpoint}: json parse error: {e}")))
}
