//! Script and romanization scheme tables.
//!
//! Every supported source script is one of the Unicode Brahmic blocks laid out
//! after ISCII, so a character's offset inside its block identifies the same
//! letter across scripts. Lookups are therefore done once, on Devanagari
//! offsets, and each target scheme is a flat table indexed by those letters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// Source scripts
// =============================================================================

/// Native script of the input names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceScript {
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Oriya,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
}

impl SourceScript {
    pub const ALL: [SourceScript; 9] = [
        SourceScript::Devanagari,
        SourceScript::Bengali,
        SourceScript::Gurmukhi,
        SourceScript::Gujarati,
        SourceScript::Oriya,
        SourceScript::Tamil,
        SourceScript::Telugu,
        SourceScript::Kannada,
        SourceScript::Malayalam,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SourceScript::Devanagari => "devanagari",
            SourceScript::Bengali => "bengali",
            SourceScript::Gurmukhi => "gurmukhi",
            SourceScript::Gujarati => "gujarati",
            SourceScript::Oriya => "oriya",
            SourceScript::Tamil => "tamil",
            SourceScript::Telugu => "telugu",
            SourceScript::Kannada => "kannada",
            SourceScript::Malayalam => "malayalam",
        }
    }

    /// Language the script is most commonly used for, used in LLM prompts.
    pub fn default_language(self) -> &'static str {
        match self {
            SourceScript::Devanagari => "Hindi",
            SourceScript::Bengali => "Bengali",
            SourceScript::Gurmukhi => "Punjabi",
            SourceScript::Gujarati => "Gujarati",
            SourceScript::Oriya => "Odia",
            SourceScript::Tamil => "Tamil",
            SourceScript::Telugu => "Telugu",
            SourceScript::Kannada => "Kannada",
            SourceScript::Malayalam => "Malayalam",
        }
    }

    fn block_start(self) -> u32 {
        match self {
            SourceScript::Devanagari => 0x0900,
            SourceScript::Bengali => 0x0980,
            SourceScript::Gurmukhi => 0x0A00,
            SourceScript::Gujarati => 0x0A80,
            SourceScript::Oriya => 0x0B00,
            SourceScript::Tamil => 0x0B80,
            SourceScript::Telugu => 0x0C00,
            SourceScript::Kannada => 0x0C80,
            SourceScript::Malayalam => 0x0D00,
        }
    }

    /// Classify a character of this script.
    ///
    /// Returns `None` for characters outside the script block; those are
    /// passed through by the transliterator.
    pub fn classify(self, c: char) -> Option<Glyph> {
        let cp = c as u32;
        // dandas live in the Devanagari block for every Brahmic script
        if cp == 0x0964 {
            return Some(Glyph::Danda);
        }
        if cp == 0x0965 {
            return Some(Glyph::DoubleDanda);
        }

        let start = self.block_start();
        if cp < start || cp >= start + 0x80 {
            return None;
        }
        let offset = cp - start;

        let special = match (self, offset) {
            (SourceScript::Gurmukhi, 0x70) => Some(Glyph::Anusvara),
            (SourceScript::Gurmukhi, 0x71) => Some(Glyph::Gemination),
            (SourceScript::Bengali, 0x4E) => Some(Glyph::DeadConsonant(ConsonantId::Plain(15))),
            (SourceScript::Malayalam, 0x7A) => Some(Glyph::DeadConsonant(ConsonantId::Plain(14))),
            (SourceScript::Malayalam, 0x7B) => Some(Glyph::DeadConsonant(ConsonantId::Plain(19))),
            (SourceScript::Malayalam, 0x7C) => Some(Glyph::DeadConsonant(ConsonantId::Plain(27))),
            (SourceScript::Malayalam, 0x7D) => Some(Glyph::DeadConsonant(ConsonantId::Plain(29))),
            (SourceScript::Malayalam, 0x7E) => Some(Glyph::DeadConsonant(ConsonantId::Plain(30))),
            (SourceScript::Malayalam, 0x7F) => Some(Glyph::DeadConsonant(ConsonantId::Plain(0))),
            _ => None,
        };

        Some(special.unwrap_or_else(|| classify_offset(offset)))
    }
}

impl fmt::Display for SourceScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceScript {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let script = match normalized.as_str() {
            "devanagari" | "deva" | "hindi" => SourceScript::Devanagari,
            "bengali" | "bangla" | "beng" => SourceScript::Bengali,
            "gurmukhi" | "guru" | "punjabi" => SourceScript::Gurmukhi,
            "gujarati" | "gujr" => SourceScript::Gujarati,
            "oriya" | "odia" | "orya" => SourceScript::Oriya,
            "tamil" | "taml" => SourceScript::Tamil,
            "telugu" | "telu" => SourceScript::Telugu,
            "kannada" | "knda" => SourceScript::Kannada,
            "malayalam" | "mlym" => SourceScript::Malayalam,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: "source script",
                    value: s.to_string(),
                    expected: "devanagari, bengali, gurmukhi, gujarati, oriya, tamil, telugu, kannada, malayalam",
                })
            }
        };
        Ok(script)
    }
}

// =============================================================================
// Glyph classification (Devanagari offsets)
// =============================================================================

/// Consonant letter, either a plain letter (offset 0x15..=0x39) or one of the
/// precomposed nukta letters (offset 0x58..=0x5F).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsonantId {
    Plain(usize),
    Nukta(usize),
}

impl ConsonantId {
    /// Apply a combining nukta.
    pub fn with_nukta(self) -> ConsonantId {
        match self {
            ConsonantId::Plain(0) => ConsonantId::Nukta(0),
            ConsonantId::Plain(1) => ConsonantId::Nukta(1),
            ConsonantId::Plain(2) => ConsonantId::Nukta(2),
            ConsonantId::Plain(7) => ConsonantId::Nukta(3),
            ConsonantId::Plain(12) => ConsonantId::Nukta(4),
            ConsonantId::Plain(13) => ConsonantId::Nukta(5),
            ConsonantId::Plain(22) => ConsonantId::Nukta(6),
            ConsonantId::Plain(26) => ConsonantId::Nukta(7),
            // न → ऩ, र → ऱ, ळ → ऴ
            ConsonantId::Plain(19) => ConsonantId::Plain(20),
            ConsonantId::Plain(27) => ConsonantId::Plain(28),
            ConsonantId::Plain(30) => ConsonantId::Plain(31),
            other => other,
        }
    }

    /// प फ ब भ म
    pub fn is_labial(self) -> bool {
        matches!(self, ConsonantId::Plain(21..=25))
    }
}

/// Role of a character inside a Brahmic syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Independent vowel (index into the vowel table).
    Vowel(usize),
    /// Dependent vowel sign (index into the vowel table, never 0).
    Matra(usize),
    Consonant(ConsonantId),
    /// Consonant that never carries a vowel (chillu, khanda ta).
    DeadConsonant(ConsonantId),
    Nukta,
    Virama,
    Anusvara,
    Candrabindu,
    Visarga,
    Avagraha,
    Om,
    Danda,
    DoubleDanda,
    Digit(usize),
    /// Doubles the following consonant (Gurmukhi addak).
    Gemination,
    /// Assigned in the block but not romanized.
    Unknown,
}

/// Offsets of independent vowels, in vowel-table order.
const VOWEL_OFFSETS: [u32; 18] = [
    0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x60, 0x0C, 0x61, 0x0D, 0x0E, 0x0F, 0x10, 0x11,
    0x12, 0x13, 0x14,
];

/// Offsets of vowel signs, in vowel-table order (the inherent `a` has none).
const MATRA_OFFSETS: [u32; 18] = [
    0, 0x3E, 0x3F, 0x40, 0x41, 0x42, 0x43, 0x44, 0x62, 0x63, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4A,
    0x4B, 0x4C,
];

fn classify_offset(offset: u32) -> Glyph {
    if let Some(i) = VOWEL_OFFSETS.iter().position(|&o| o == offset) {
        return Glyph::Vowel(i);
    }
    if let Some(i) = MATRA_OFFSETS.iter().skip(1).position(|&o| o == offset) {
        return Glyph::Matra(i + 1);
    }

    match offset {
        0x01 => Glyph::Candrabindu,
        0x02 => Glyph::Anusvara,
        0x03 => Glyph::Visarga,
        0x15..=0x39 => Glyph::Consonant(ConsonantId::Plain((offset - 0x15) as usize)),
        0x3C => Glyph::Nukta,
        0x3D => Glyph::Avagraha,
        0x4D => Glyph::Virama,
        0x50 => Glyph::Om,
        0x58..=0x5F => Glyph::Consonant(ConsonantId::Nukta((offset - 0x58) as usize)),
        0x66..=0x6F => Glyph::Digit((offset - 0x66) as usize),
        _ => Glyph::Unknown,
    }
}

/// ZWNJ / ZWJ appear inside words to control conjunct rendering.
pub fn is_joiner(c: char) -> bool {
    matches!(c, '\u{200C}' | '\u{200D}')
}

// =============================================================================
// Target schemes
// =============================================================================

/// Romanization scheme of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetScheme {
    /// Plain ASCII spelling as used for names in English text.
    #[default]
    Phonetic,
    Iast,
    Itrans,
    HarvardKyoto,
}

impl TargetScheme {
    pub const ALL: [TargetScheme; 4] = [
        TargetScheme::Phonetic,
        TargetScheme::Iast,
        TargetScheme::Itrans,
        TargetScheme::HarvardKyoto,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TargetScheme::Phonetic => "phonetic",
            TargetScheme::Iast => "iast",
            TargetScheme::Itrans => "itrans",
            TargetScheme::HarvardKyoto => "harvard-kyoto",
        }
    }

    pub(crate) fn table(self) -> &'static SchemeTable {
        match self {
            TargetScheme::Phonetic => &PHONETIC,
            TargetScheme::Iast => &IAST,
            TargetScheme::Itrans => &ITRANS,
            TargetScheme::HarvardKyoto => &HARVARD_KYOTO,
        }
    }
}

impl fmt::Display for TargetScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        let scheme = match normalized.as_str() {
            "phonetic" | "readable" | "english" => TargetScheme::Phonetic,
            "iast" => TargetScheme::Iast,
            "itrans" => TargetScheme::Itrans,
            "harvard-kyoto" | "harvardkyoto" | "hk" => TargetScheme::HarvardKyoto,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: "target scheme",
                    value: s.to_string(),
                    expected: "phonetic, iast, itrans, harvard-kyoto",
                })
            }
        };
        Ok(scheme)
    }
}

/// Output strings of one scheme.
pub(crate) struct SchemeTable {
    pub vowels: [&'static str; 18],
    pub consonants: [&'static str; 37],
    pub nukta_consonants: [&'static str; 8],
    pub anusvara: &'static str,
    /// Anusvara before प फ ब भ म.
    pub anusvara_labial: &'static str,
    pub candrabindu: &'static str,
    pub visarga: &'static str,
    pub avagraha: &'static str,
    pub om: &'static str,
    pub danda: &'static str,
    pub double_danda: &'static str,
    /// Apply Hindi schwa deletion to inherent vowels.
    pub deletes_schwa: bool,
}

impl SchemeTable {
    pub fn consonant(&self, id: ConsonantId) -> &'static str {
        match id {
            ConsonantId::Plain(i) => self.consonants[i],
            ConsonantId::Nukta(i) => self.nukta_consonants[i],
        }
    }
}

pub(crate) const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

static PHONETIC: SchemeTable = SchemeTable {
    vowels: [
        "a", "a", "i", "i", "u", "u", "ri", "ri", "li", "li", "e", "e", "e", "ai", "o", "o", "o",
        "au",
    ],
    consonants: [
        "k", "kh", "g", "gh", "n", "ch", "chh", "j", "jh", "n", "t", "th", "d", "dh", "n", "t",
        "th", "d", "dh", "n", "n", "p", "ph", "b", "bh", "m", "y", "r", "r", "l", "l", "zh", "v",
        "sh", "sh", "s", "h",
    ],
    nukta_consonants: ["q", "kh", "g", "z", "r", "rh", "f", "y"],
    anusvara: "n",
    anusvara_labial: "m",
    candrabindu: "n",
    visarga: "h",
    avagraha: "",
    om: "om",
    danda: ".",
    double_danda: ".",
    deletes_schwa: true,
};

static IAST: SchemeTable = SchemeTable {
    vowels: [
        "a", "ā", "i", "ī", "u", "ū", "ṛ", "ṝ", "ḷ", "ḹ", "ê", "e", "e", "ai", "ô", "o", "o",
        "au",
    ],
    consonants: [
        "k", "kh", "g", "gh", "ṅ", "c", "ch", "j", "jh", "ñ", "ṭ", "ṭh", "ḍ", "ḍh", "ṇ", "t",
        "th", "d", "dh", "n", "ṉ", "p", "ph", "b", "bh", "m", "y", "r", "ṟ", "l", "ḷ", "ḻ", "v",
        "ś", "ṣ", "s", "h",
    ],
    nukta_consonants: ["q", "k͟h", "ġ", "z", "ṛ", "ṛh", "f", "ẏ"],
    anusvara: "ṃ",
    anusvara_labial: "ṃ",
    candrabindu: "m̐",
    visarga: "ḥ",
    avagraha: "'",
    om: "oṃ",
    danda: ".",
    double_danda: "..",
    deletes_schwa: false,
};

static ITRANS: SchemeTable = SchemeTable {
    vowels: [
        "a", "A", "i", "I", "u", "U", "RRi", "RRI", "LLi", "LLI", "e.c", "^e", "e", "ai", "A.c",
        "^o", "o", "au",
    ],
    consonants: [
        "k", "kh", "g", "gh", "~N", "ch", "Ch", "j", "jh", "~n", "T", "Th", "D", "Dh", "N", "t",
        "th", "d", "dh", "n", "^n", "p", "ph", "b", "bh", "m", "y", "r", "R", "l", "L", "zh", "v",
        "sh", "Sh", "s", "h",
    ],
    nukta_consonants: ["q", "K", "G", "z", ".D", ".Dh", "f", "Y"],
    anusvara: "M",
    anusvara_labial: "M",
    candrabindu: ".N",
    visarga: "H",
    avagraha: ".a",
    om: "OM",
    danda: "|",
    double_danda: "||",
    deletes_schwa: false,
};

static HARVARD_KYOTO: SchemeTable = SchemeTable {
    vowels: [
        "a", "A", "i", "I", "u", "U", "R", "RR", "lR", "lRR", "e", "e", "e", "ai", "o", "o", "o",
        "au",
    ],
    consonants: [
        "k", "kh", "g", "gh", "G", "c", "ch", "j", "jh", "J", "T", "Th", "D", "Dh", "N", "t",
        "th", "d", "dh", "n", "n", "p", "ph", "b", "bh", "m", "y", "r", "r", "l", "L", "zh", "v",
        "z", "S", "s", "h",
    ],
    nukta_consonants: ["q", "kh", "g", "z", "R", "Rh", "f", "y"],
    anusvara: "M",
    anusvara_labial: "M",
    candrabindu: "~",
    visarga: "H",
    avagraha: "'",
    om: "OM",
    danda: "|",
    double_danda: "||",
    deletes_schwa: false,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_devanagari() {
        let deva = SourceScript::Devanagari;
        assert_eq!(deva.classify('अ'), Some(Glyph::Vowel(0)));
        assert_eq!(deva.classify('ा'), Some(Glyph::Matra(1)));
        assert_eq!(deva.classify('क'), Some(Glyph::Consonant(ConsonantId::Plain(0))));
        assert_eq!(deva.classify('ह'), Some(Glyph::Consonant(ConsonantId::Plain(36))));
        assert_eq!(deva.classify('\u{095E}'), Some(Glyph::Consonant(ConsonantId::Nukta(6))));
        assert_eq!(deva.classify('्'), Some(Glyph::Virama));
        assert_eq!(deva.classify('७'), Some(Glyph::Digit(7)));
        assert_eq!(deva.classify('A'), None);
    }

    #[test]
    fn test_other_blocks_share_layout() {
        // Bengali ক, Tamil க, Malayalam ക all map to क
        for (script, c) in [
            (SourceScript::Bengali, 'ক'),
            (SourceScript::Tamil, 'க'),
            (SourceScript::Malayalam, 'ക'),
        ] {
            assert_eq!(script.classify(c), Some(Glyph::Consonant(ConsonantId::Plain(0))));
        }
        // a Devanagari letter is foreign to the Bengali block
        assert_eq!(SourceScript::Bengali.classify('क'), None);
        assert_eq!(SourceScript::Bengali.classify('।'), Some(Glyph::Danda));
    }

    #[test]
    fn test_tables_are_aligned() {
        for scheme in TargetScheme::ALL {
            let table = scheme.table();
            assert_eq!(table.consonant(ConsonantId::Plain(0)), "k");
            assert_eq!(table.consonant(ConsonantId::Plain(36)), "h");
            assert_eq!(table.consonant(ConsonantId::Nukta(0)), "q");
        }
    }

    #[test]
    fn test_nukta_composition() {
        assert_eq!(ConsonantId::Plain(1).with_nukta(), ConsonantId::Nukta(1));
        assert_eq!(ConsonantId::Plain(19).with_nukta(), ConsonantId::Plain(20));
        assert_eq!(ConsonantId::Plain(35).with_nukta(), ConsonantId::Plain(35));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Hindi".parse::<SourceScript>().unwrap(), SourceScript::Devanagari);
        assert_eq!("HK".parse::<TargetScheme>().unwrap(), TargetScheme::HarvardKyoto);
        assert_eq!("harvard_kyoto".parse::<TargetScheme>().unwrap(), TargetScheme::HarvardKyoto);
        assert!("klingon".parse::<SourceScript>().is_err());
    }
}
