//! Deterministic rule-based transliteration.
//!
//! Text is split into words at every character that does not belong to the
//! source script. Each word is parsed into syllable units (consonant plus
//! vowel sign, independent vowel, or mark), optionally run through schwa
//! deletion, then rendered with the target scheme's table.

use async_trait::async_trait;

use super::scripts::{is_joiner, ConsonantId, Glyph, SchemeTable, SourceScript, TargetScheme, DIGITS};
use super::Transliterator;
use crate::error::TransliterationResult;

/// Rule-based strategy: elementwise [`transliterate_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleBasedTransliterator {
    source: SourceScript,
    target: TargetScheme,
}

impl RuleBasedTransliterator {
    pub fn new(source: SourceScript, target: TargetScheme) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> SourceScript {
        self.source
    }

    pub fn target(&self) -> TargetScheme {
        self.target
    }

    pub fn transliterate_one(&self, text: &str) -> String {
        transliterate_one(text, self.source, self.target)
    }
}

impl Default for RuleBasedTransliterator {
    fn default() -> Self {
        Self::new(SourceScript::Devanagari, TargetScheme::Phonetic)
    }
}

#[async_trait]
impl Transliterator for RuleBasedTransliterator {
    fn name(&self) -> &'static str {
        "rule-based"
    }

    async fn transliterate_batch(&self, names: &[String]) -> TransliterationResult<Vec<String>> {
        Ok(names.iter().map(|name| self.transliterate_one(name)).collect())
    }
}

/// Transliterate one string and title-case the result.
///
/// Characters outside `source` pass through unchanged.
pub fn transliterate_one(text: &str, source: SourceScript, target: TargetScheme) -> String {
    if text.is_empty() {
        return String::new();
    }

    let table = target.table();
    let mut out = String::with_capacity(text.len() * 2);
    let mut word = WordBuilder::default();

    for c in text.chars() {
        if is_joiner(c) {
            continue;
        }
        match source.classify(c) {
            Some(glyph) => word.push(glyph, c),
            None => {
                word.flush(table, &mut out);
                out.push(c);
            }
        }
    }
    word.flush(table, &mut out);

    title_case(&out)
}

/// Upper-case the first character of every word.
///
/// Words are split on whitespace and name separators (`-`, `/`, `(`, `,`).
/// Other punctuation does not split, since ITRANS and Harvard-Kyoto use it
/// inside words next to case-significant letters.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if is_word_separator(c) {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }

    out
}

fn is_word_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '\u{2010}' | '\u{2011}' | '/' | '(' | ',')
}

// =============================================================================
// Syllable units
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VowelSign {
    Inherent,
    /// Inherent vowel removed by schwa deletion.
    Silent,
    Matra(usize),
    Virama,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Consonant { id: ConsonantId, vowel: VowelSign },
    Vowel(usize),
    Anusvara,
    Mark(Glyph),
    /// Unassigned code point inside the script block.
    Raw(char),
}

impl Unit {
    /// Whether this unit ends in a pronounced vowel.
    fn has_vowel(&self) -> bool {
        match self {
            Unit::Consonant { vowel, .. } => matches!(vowel, VowelSign::Inherent | VowelSign::Matra(_)),
            Unit::Vowel(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
struct WordBuilder {
    units: Vec<Unit>,
    geminate_next: bool,
}

impl WordBuilder {
    fn push(&mut self, glyph: Glyph, raw: char) {
        match glyph {
            Glyph::Consonant(id) => {
                if std::mem::take(&mut self.geminate_next) {
                    self.units.push(Unit::Consonant { id, vowel: VowelSign::Virama });
                }
                self.units.push(Unit::Consonant { id, vowel: VowelSign::Inherent });
            }
            Glyph::DeadConsonant(id) => {
                self.units.push(Unit::Consonant { id, vowel: VowelSign::Virama });
            }
            Glyph::Matra(index) => match self.open_consonant() {
                Some(vowel) => *vowel = VowelSign::Matra(index),
                None => self.units.push(Unit::Vowel(index)),
            },
            Glyph::Virama => {
                if let Some(vowel) = self.open_consonant() {
                    *vowel = VowelSign::Virama;
                }
            }
            Glyph::Nukta => {
                if let Some(Unit::Consonant { id, .. }) = self.units.last_mut() {
                    *id = id.with_nukta();
                }
            }
            Glyph::Vowel(index) => self.units.push(Unit::Vowel(index)),
            Glyph::Anusvara => self.units.push(Unit::Anusvara),
            Glyph::Gemination => self.geminate_next = true,
            Glyph::Unknown => self.units.push(Unit::Raw(raw)),
            other => self.units.push(Unit::Mark(other)),
        }
    }

    /// Vowel slot of the last unit if it is a consonant still carrying its
    /// inherent vowel.
    fn open_consonant(&mut self) -> Option<&mut VowelSign> {
        match self.units.last_mut() {
            Some(Unit::Consonant { vowel, .. }) if *vowel == VowelSign::Inherent => Some(vowel),
            _ => None,
        }
    }

    fn flush(&mut self, table: &SchemeTable, out: &mut String) {
        if table.deletes_schwa {
            delete_schwa(&mut self.units);
        }
        render(&self.units, table, out);
        self.units.clear();
        self.geminate_next = false;
    }
}

/// Hindi schwa deletion, scanning right to left.
///
/// The word-final inherent vowel is dropped unless it closes a conjunct or is
/// the only vowel of the word. A medial inherent vowel is dropped in a
/// `V C _ C V` context (never in the first syllable).
fn delete_schwa(units: &mut [Unit]) {
    let len = units.len();
    for i in (0..len).rev() {
        if !matches!(units[i], Unit::Consonant { vowel: VowelSign::Inherent, .. }) {
            continue;
        }

        let delete = if i + 1 == len {
            let after_conjunct = i > 0
                && matches!(units[i - 1], Unit::Consonant { vowel: VowelSign::Virama, .. });
            let has_earlier_vowel = units[..i].iter().any(Unit::has_vowel);
            has_earlier_vowel && !after_conjunct
        } else {
            i > 0
                && units[i - 1].has_vowel()
                && matches!(units[i + 1], Unit::Consonant { .. })
                && units[i + 1].has_vowel()
        };

        if delete {
            if let Unit::Consonant { vowel, .. } = &mut units[i] {
                *vowel = VowelSign::Silent;
            }
        }
    }
}

fn render(units: &[Unit], table: &SchemeTable, out: &mut String) {
    for (i, unit) in units.iter().enumerate() {
        match *unit {
            Unit::Consonant { id, vowel } => {
                out.push_str(table.consonant(id));
                match vowel {
                    VowelSign::Inherent => out.push_str(table.vowels[0]),
                    VowelSign::Matra(index) => out.push_str(table.vowels[index]),
                    VowelSign::Silent | VowelSign::Virama => {}
                }
            }
            Unit::Vowel(index) => out.push_str(table.vowels[index]),
            Unit::Anusvara => {
                let before_labial = matches!(
                    units.get(i + 1),
                    Some(Unit::Consonant { id, .. }) if id.is_labial()
                );
                out.push_str(if before_labial {
                    table.anusvara_labial
                } else {
                    table.anusvara
                });
            }
            Unit::Mark(glyph) => out.push_str(mark_text(glyph, table)),
            Unit::Raw(c) => out.push(c),
        }
    }
}

fn mark_text(glyph: Glyph, table: &SchemeTable) -> &'static str {
    match glyph {
        Glyph::Candrabindu => table.candrabindu,
        Glyph::Visarga => table.visarga,
        Glyph::Avagraha => table.avagraha,
        Glyph::Om => table.om,
        Glyph::Danda => table.danda,
        Glyph::DoubleDanda => table.double_danda,
        Glyph::Digit(d) => DIGITS[d],
        _ => "",
    }
}
