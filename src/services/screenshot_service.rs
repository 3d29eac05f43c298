use crate::api::screenshot::ScreenshotClient;
use crate::models::ReceiptRecord;
use crate::services::render_service::{ReceiptRenderer, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::utils::errors::ReceiptError;

/// Render the receipt's HTML through the external screenshot API
pub async fn capture_receipt<R: ReceiptRenderer>(
    client: &ScreenshotClient,
    renderer: &R,
    record: &ReceiptRecord,
) -> Result<Vec<u8>, ReceiptError> {
    let html = renderer.render_html(record);
    let png = client.capture(&html, CANVAS_WIDTH, CANVAS_HEIGHT).await?;
    tracing::info!(
        "Screenshot API rendered receipt {} ({} bytes)",
        record.transaction_id,
        png.len()
    );
    Ok(png)
}
