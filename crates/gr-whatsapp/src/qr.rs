//! Terminal rendering of the pairing QR code

use qrcode::render::unicode;
use qrcode::QrCode;

use crate::error::{Result, WhatsAppError};

/// Render a QR payload as compact unicode blocks for a dark terminal
pub fn render_qr(payload: &str) -> Result<String> {
    let code =
        QrCode::new(payload.as_bytes()).map_err(|e| WhatsAppError::QrRender(e.to_string()))?;

    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}
