//! Shared helpers: identifier generation, timestamps, filename sanitizing,
//! paragraph splitting, and cover-image MIME sniffing.

/// Get a time-based seed value for pseudo-random number generation.
pub(crate) fn time_seed_nanos() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(12345)
}

/// Current time as seconds since the Unix epoch.
pub(crate) fn time_now_secs() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

/// Current time as an ISO-8601 UTC timestamp with millisecond precision,
/// e.g. `2026-08-31T12:00:00.000Z`. Used for OPF `dcterms:modified` and
/// `dc:date` fields.
pub(crate) fn iso_timestamp() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn next_random(state: &mut u64) -> u8 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    (*state >> 33) as u8
}

/// Generate a UUID v4 string (random).
///
/// 36 characters in the canonical `8-4-4-4-12` layout with the version
/// nibble fixed to 4 and the variant nibble in `{8, 9, a, b}`. Backed by a
/// time-seeded LCG: identifiers only need to be unique within one generated
/// document, so a non-cryptographic source is fine.
pub fn uuid_v4() -> String {
    let mut state = time_seed_nanos();
    let mut bytes = [0u8; 16];
    for byte in &mut bytes {
        *byte = next_random(&mut state);
    }

    // Set version (4) and variant (2)
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0],
        bytes[1],
        bytes[2],
        bytes[3],
        bytes[4],
        bytes[5],
        bytes[6],
        bytes[7],
        bytes[8],
        bytes[9],
        bytes[10],
        bytes[11],
        bytes[12],
        bytes[13],
        bytes[14],
        bytes[15]
    )
}

/// A random `u32` for the MOBI header unique-id field.
pub(crate) fn random_u32() -> u32 {
    let mut state = time_seed_nanos();
    let b = [
        next_random(&mut state),
        next_random(&mut state),
        next_random(&mut state),
        next_random(&mut state),
    ];
    u32::from_be_bytes(b)
}

/// Sanitize a book title into a download filename stem.
///
/// Every character outside ASCII letters and digits becomes `_`, letters are
/// lowercased. Idempotent; output always matches `^[a-z0-9_]*$`.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Split chapter content into trimmed, non-empty paragraphs.
///
/// A paragraph break is a newline followed by optional whitespace and at
/// least one more newline (`\n\s*\n`). Single newlines stay inside their
/// paragraph; the markup encoders emit them verbatim.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\n' {
            // Scan the whitespace run for a second newline.
            let mut j = i + 1;
            let mut blank = false;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                if bytes[j] == b'\n' {
                    blank = true;
                }
                j += 1;
            }
            if blank {
                let para = text[start..i].trim();
                if !para.is_empty() {
                    out.push(para);
                }
                start = j;
                i = j;
                continue;
            }
        }
        i += 1;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

/// Detect an image MIME type from magic bytes.
///
/// Covers the formats browsers hand back for cover images: JPEG, PNG, GIF,
/// and WebP. Returns `None` for anything else.
pub fn detect_image_mime(data: &[u8]) -> Option<&'static str> {
    if data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Some("image/jpeg");
    }
    if data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47 {
        return Some("image/png");
    }
    if data.len() >= 3 && data[0] == 0x47 && data[1] == 0x49 && data[2] == 0x46 {
        return Some("image/gif");
    }
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    None
}
