use std::fmt::Write;

use crate::models::ReceiptRecord;
use crate::services::render_service::{
    FOOTER_DISCLAIMER, RECEIPT_TITLE, WATERMARKS, WATERMARK_LABEL, WORDMARK,
};

/// Escape text for safe interpolation into HTML element content and attributes
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = r#"
    body {
        font-family: 'Inter', 'DejaVu Sans', sans-serif;
        background-color: #f0f2f5;
        margin: 0;
        padding: 10px;
        color: #000000;
        line-height: 1.3;
        display: flex;
        justify-content: center;
        align-items: center;
        min-height: 100vh;
        width: 400px;
    }
    .receipt { width: 340px; background: #ffffff; padding: 15px; position: relative; overflow: hidden; }
    .watermark { position: absolute; transform: rotate(-35deg); font-weight: 900; z-index: 0; pointer-events: none; letter-spacing: 2px; }
    .header { display: flex; justify-content: space-between; align-items: center; background: #2F5BEA; color: #ffffff; margin: -15px -15px 0 -15px; padding: 14px 15px; position: relative; z-index: 1; }
    .wordmark { font-size: 20px; font-weight: 800; }
    .receipt-title { font-size: 14px; font-weight: 500; }
    .amount-section { text-align: center; padding: 22px 0 14px 0; border-bottom: 1px solid #E5E5E5; position: relative; z-index: 1; }
    .amount { font-size: 28px; font-weight: 800; }
    .status { font-size: 14px; font-weight: 600; margin-top: 6px; }
    .date { font-size: 12px; color: #666666; margin-top: 4px; }
    .section { display: flex; justify-content: space-between; align-items: flex-start; padding: 10px 0; position: relative; z-index: 1; }
    .section-title { font-size: 13px; color: #666666; }
    .section-content { text-align: right; font-size: 13px; }
    .bold-text { font-weight: 700; }
    .footer { position: relative; margin-top: 12px; padding-top: 12px; font-size: 11px; color: #666666; z-index: 1; }
    .footer::before { content: ""; position: absolute; top: 0; left: 0; right: 0; border-top: 2px dashed #C8C8C8; }
"#;

/// JSON string literal that is safe inside a `<script>` block
fn script_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
}

/// Render the receipt as a standalone HTML document.
///
/// With an `upload_token`, the page converts itself to PNG in the browser
/// and posts the result back to `/api/receipt-generated`.
pub fn receipt_document(record: &ReceiptRecord, upload_token: Option<&str>) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    let _ = writeln!(html, "<title>{} - {}</title>", WORDMARK, RECEIPT_TITLE);
    let _ = writeln!(html, "<style>{}</style>\n</head>\n<body>", STYLE);
    html.push_str("<div class=\"receipt\" id=\"receipt\">\n");

    for mark in WATERMARKS.iter() {
        let _ = writeln!(
            html,
            "<div class=\"watermark\" style=\"top: {}%; left: {}%; font-size: {}px; color: rgba(0, 0, 0, {:.2});\">{}</div>",
            mark.top_pct, mark.left_pct, mark.size_px, mark.alpha, WATERMARK_LABEL
        );
    }

    let (r, g, b) = record.status.color();
    let _ = write!(
        html,
        r#"<div class="header">
    <div class="wordmark">{wordmark}</div>
    <div class="receipt-title">{title}</div>
</div>
<div class="amount-section">
    <div class="amount">&#8358;{amount}</div>
    <div class="status" style="color: rgb({r}, {g}, {b});">{status}</div>
    <div class="date">{date}</div>
</div>
<div class="section">
    <div class="section-title">Recipient Details</div>
    <div class="section-content">
        <div class="bold-text">{recipient_name}</div>
        <div>{recipient_bank} | {recipient_account}</div>
    </div>
</div>
<div class="section">
    <div class="section-title">Sender Details</div>
    <div class="section-content">
        <div class="bold-text">{sender_name}</div>
        <div>{wordmark} | {sender_account}</div>
    </div>
</div>
<div class="section">
    <div class="section-title">Transaction No.</div>
    <div class="section-content">{transaction_id}</div>
</div>
<div class="footer">{footer}</div>
</div>
"#,
        wordmark = WORDMARK,
        title = RECEIPT_TITLE,
        amount = escape_html(&record.amount_formatted),
        status = record.status_label(),
        date = escape_html(&record.transaction_date),
        recipient_name = escape_html(&record.recipient_name),
        recipient_bank = escape_html(&record.recipient_bank),
        recipient_account = escape_html(&record.recipient_account),
        sender_name = escape_html(&record.sender_name),
        sender_account = escape_html(&record.sender_account_masked),
        transaction_id = escape_html(&record.transaction_id),
        footer = FOOTER_DISCLAIMER,
    );

    if let Some(upload_token) = upload_token {
        let receipt_id = script_string(&record.transaction_id);
        let upload_token = script_string(upload_token);
        let _ = write!(
            html,
            r#"<script src="https://html2canvas.hertzen.com/dist/html2canvas.min.js"></script>
<script>
window.onload = function () {{
    html2canvas(document.getElementById('receipt'), {{ scale: 2, backgroundColor: '#f0f2f5', useCORS: true, logging: false }})
        .then(function (canvas) {{
            fetch('/api/receipt-generated', {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify({{ receiptId: {receipt_id}, uploadToken: {upload_token}, imageData: canvas.toDataURL('image/png') }})
            }});
        }});
}};
</script>
"#,
            receipt_id = receipt_id,
            upload_token = upload_token
        );
    }

    html.push_str("</body>\n</html>\n");
    html
}
