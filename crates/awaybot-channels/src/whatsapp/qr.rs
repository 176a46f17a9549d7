//! Terminal QR rendering for device pairing.

use awaybot_core::error::AwayError;
use tracing::warn;

/// Render a QR code for terminal display using Unicode half-block characters.
///
/// Packs two rows of modules into one line of text using `▀`, `▄`, `█`, and
/// space, producing a QR code roughly half the height of a naive renderer.
pub fn generate_qr_terminal(qr_data: &str) -> Result<String, AwayError> {
    use qrcode::{Color, EcLevel, QrCode};

    let code = QrCode::with_error_correction_level(qr_data.as_bytes(), EcLevel::L)
        .map_err(|e| AwayError::Channel(format!("QR generation failed: {e}")))?;

    let width = code.width();
    let colors: Vec<Color> = code.into_colors();
    let is_dark = |row: usize, col: usize| -> bool {
        if row < width && col < width {
            colors[row * width + col] == Color::Dark
        } else {
            false
        }
    };

    let mut out = String::new();
    // Process two rows at a time.
    let mut row = 0;
    while row < width {
        for col in 0..width {
            let top = is_dark(row, col);
            let bottom = if row + 1 < width {
                is_dark(row + 1, col)
            } else {
                false
            };
            out.push(match (top, bottom) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
        row += 2;
    }

    Ok(out)
}

/// Print the pairing QR code with scan instructions.
///
/// This is deliberate terminal UI, not logging, hence `println!`.
pub(super) fn print_pairing_qr(qr_data: &str) {
    match generate_qr_terminal(qr_data) {
        Ok(rendered) => {
            println!("\n📱 Scan this QR code with WhatsApp:\n");
            println!("{rendered}");
            println!("💡 How to scan:");
            println!("   1. Open WhatsApp on your phone");
            println!("   2. Go to Settings > Linked Devices");
            println!("   3. Tap 'Link a Device'");
            println!("   4. Scan the QR code above\n");
        }
        Err(e) => warn!("failed to render pairing QR code: {e}"),
    }
}
