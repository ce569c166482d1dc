//! Font descriptor flags to semantic format tags.
//!
//! Bit positions follow the PDF `/FontDescriptor /Flags` entry (PDF 32000-1,
//! table 123), numbered from bit 1.

use bitflags::bitflags;

use crate::model::{FormatSet, TextFormat};

bitflags! {
    /// Named font descriptor flag bits. Unnamed bits are ignored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FontFlags: u32 {
        const FIXED_PITCH = 1 << 0;
        const SERIF = 1 << 1;
        const SYMBOLIC = 1 << 2;
        const SCRIPT = 1 << 3;
        const NONSYMBOLIC = 1 << 5;
        const ITALIC = 1 << 6;
        const ALL_CAP = 1 << 16;
        const SMALL_CAP = 1 << 17;
        const FORCE_BOLD = 1 << 18;
        const USE_EXTERN_ATTR = 1 << 19;
    }
}

impl FontFlags {
    /// Flags that mark ordinary body text.
    pub const PLAIN_INDICATORS: FontFlags = FontFlags::FIXED_PITCH
        .union(FontFlags::SERIF)
        .union(FontFlags::SCRIPT)
        .union(FontFlags::NONSYMBOLIC)
        .union(FontFlags::ALL_CAP)
        .union(FontFlags::SMALL_CAP)
        .union(FontFlags::USE_EXTERN_ATTR);

    /// Keep only the named bits of a raw descriptor value.
    pub fn from_raw(flags: u32) -> Self {
        FontFlags::from_bits_truncate(flags)
    }
}

/// Map raw font flags to format tags.
///
/// An empty named-bit set counts as plain. `{Symbolic}` alone maps to
/// an empty set.
pub fn font_flags_to_format(flags: u32) -> FormatSet {
    let set = FontFlags::from_raw(flags);
    let mut formats = FormatSet::new();

    let math_only = FontFlags::SYMBOLIC | FontFlags::ITALIC;
    if set == math_only || set == math_only | FontFlags::USE_EXTERN_ATTR {
        formats.insert(TextFormat::Math);
    } else if set == FontFlags::USE_EXTERN_ATTR || set.is_empty() {
        formats.insert(TextFormat::Plain);
    } else {
        if set.contains(FontFlags::ITALIC) {
            formats.insert(TextFormat::Italic);
        }
        if set.contains(FontFlags::FORCE_BOLD) {
            formats.insert(TextFormat::Bold);
        }
        if set.intersects(FontFlags::PLAIN_INDICATORS) {
            formats.insert(TextFormat::Plain);
        }
    }
    formats
}

/// Format tags implied by the font name ("bold", "ital"), case-insensitive.
pub fn font_name_to_format(font_name: &str) -> FormatSet {
    let name = font_name.to_lowercase();
    let mut formats = FormatSet::new();
    if name.contains("bold") {
        formats.insert(TextFormat::Bold);
    }
    if name.contains("ital") {
        formats.insert(TextFormat::Italic);
    }
    formats
}

/// Format tags for a span's font.
pub fn classify(flags: u32, font_name: &str) -> FormatSet {
    let mut formats = font_flags_to_format(flags);
    formats.extend(font_name_to_format(font_name));
    formats
}
