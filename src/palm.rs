//! Palm database and MOBI header serialization.
//!
//! MOBI and AZW files open with a 78-byte Palm database header followed by a
//! MOBI header record. Both are fixed-offset big-endian layouts; the builders
//! here fill in the fields a minimal single-record book needs and leave the
//! rest zeroed. The headers are structurally plausible rather than
//! spec-exhaustive: no EXTH record, no compression, no DRM.

/// Seconds between the Unix epoch (1970) and the Palm epoch (1904).
const PALM_EPOCH_OFFSET: u32 = 2_082_844_800;

/// The two Palm-based container flavors.
///
/// They share the `BOOK` database type but differ in creator code, header
/// length, and which optional fields get written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobiVariant {
    Mobi,
    Azw,
}

impl MobiVariant {
    /// Four-byte creator code at offset 64 of the Palm header.
    pub fn creator(&self) -> &'static [u8; 4] {
        match self {
            MobiVariant::Mobi => b"MOBI",
            MobiVariant::Azw => b"TPEZ",
        }
    }

    /// Fixed MOBI header length, excluding the trailing title bytes. The AZW
    /// layout is 16 bytes longer to hold its (zeroed) DRM fields.
    pub fn header_len(&self) -> u32 {
        match self {
            MobiVariant::Mobi => 232,
            MobiVariant::Azw => 248,
        }
    }
}

fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

/// Build the 78-byte Palm database header.
///
/// `unix_timestamp` is seconds since the Unix epoch; it lands in the creation
/// and modification fields converted to the Palm epoch. The title is truncated
/// to 31 characters and written as each char's low byte, null-padded. Record
/// count is fixed at 2 (header record + content record).
pub fn palm_database_header(title: &str, variant: MobiVariant, unix_timestamp: u32) -> [u8; 78] {
    let mut header = [0u8; 78];

    for (i, c) in title.chars().take(31).enumerate() {
        header[i] = (c as u32 & 0xff) as u8;
    }

    put_u16(&mut header, 32, 0); // attributes
    put_u16(&mut header, 34, 1); // version

    let palm_time = unix_timestamp.wrapping_add(PALM_EPOCH_OFFSET);
    put_u32(&mut header, 36, palm_time); // creation date
    put_u32(&mut header, 40, palm_time); // modification date
    // 44..60: last backup, modification number, app info, sort info — all zero

    header[60..64].copy_from_slice(b"BOOK");
    header[64..68].copy_from_slice(variant.creator());

    // 68..76: unique ID seed, next record list — zero
    put_u16(&mut header, 76, 2); // record count

    header
}

/// Build the MOBI header record, fixed fields plus the trailing UTF-8 title.
///
/// `uid` seeds the unique-id field at offset 16. The title offset field always
/// equals the fixed header length, and the title length field is the UTF-8
/// byte count of the full (untruncated) title.
pub fn mobi_header(variant: MobiVariant, title: &str, uid: u32) -> Vec<u8> {
    let fixed_len = variant.header_len() as usize;
    let title_bytes = title.as_bytes();
    let mut header = vec![0u8; fixed_len + title_bytes.len()];

    header[0..4].copy_from_slice(b"MOBI");
    put_u32(&mut header, 4, variant.header_len());
    put_u32(&mut header, 8, 2); // type: Mobipocket Book
    put_u32(&mut header, 12, 65001); // text encoding: UTF-8
    put_u32(&mut header, 16, uid);
    put_u32(&mut header, 20, 6); // file version

    match variant {
        MobiVariant::Mobi => {
            put_u32(&mut header, 68, 1); // first non-book record
            // 72, 76, 80: image / Huffman records — zero
            put_u32(&mut header, 96, 6); // min version
        }
        MobiVariant::Azw => {
            // 64, 68: DRM offset and count stay zero
        }
    }

    put_u32(&mut header, 84, variant.header_len()); // title offset
    put_u32(&mut header, 88, title_bytes.len() as u32);
    put_u32(&mut header, 92, 9); // language: English

    header[fixed_len..].copy_from_slice(title_bytes);
    header
}
