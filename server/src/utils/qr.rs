//! 二维码渲染
//!
//! 把桌台落地页 URL 渲染为 PNG data URL，供管理端打印桌贴。

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use qrcode::QrCode;
use std::io::Cursor;

use crate::utils::AppError;

/// 默认边长 (像素)，与打印桌贴尺寸匹配
const QR_SIZE: u32 = 300;

/// 桌台落地页 URL (嵌入二维码的目标地址)
pub fn table_url(frontend_url: &str, slug: &str) -> String {
    format!("{}/m/{}", frontend_url.trim_end_matches('/'), slug)
}

/// Render a URL as a PNG QR code, returned as a `data:image/png;base64,...` URL.
pub fn render_data_url(url: &str) -> Result<String, AppError> {
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| AppError::internal(format!("QR encoding failed: {e}")))?;

    let img = code
        .render::<image::Luma<u8>>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    PngEncoder::new(Cursor::new(&mut png))
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            ExtendedColorType::L8,
        )
        .map_err(|e| AppError::internal(format!("PNG encoding failed: {e}")))?;

    Ok(format!("data:image/png;base64,{}", BASE64.encode(&png)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_no_double_slash() {
        assert_eq!(
            table_url("http://localhost:3000/", "table-t1"),
            "http://localhost:3000/m/table-t1"
        );
        assert_eq!(
            table_url("http://localhost:3000", "table-t1"),
            "http://localhost:3000/m/table-t1"
        );
    }

    #[test]
    fn test_render_produces_png_data_url() {
        let url = render_data_url("http://localhost:3000/m/table-t1").unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        // PNG magic bytes survive the base64 round trip
        let b64 = url.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = BASE64.decode(b64).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
