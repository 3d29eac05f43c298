pub mod format_service;
pub mod html_service;
pub mod keepalive_service;
pub mod receipt_service;
pub mod render_service;
pub mod screenshot_service;
pub mod store_service;
