//! Japanese tokenization with furigana readings.
//!
//! Segmentation runs lindera over a compiled IPADIC directory. What happens
//! after segmentation (reading alignment, part-of-speech names and katakana
//! compound merging) is plain string work that needs no dictionary.

use lindera::dictionary::load_fs_dictionary;
use lindera::mode::Mode;
use lindera::segmenter::Segmenter;
use std::borrow::Cow;
use std::path::Path;

use super::stories::{Token, TokenPart};

// ==================== Tables ====================

/// Loanwords IPADIC splits in two, with the word they form together
const KATAKANA_COMPOUNDS: &[(&str, &str, &str)] = &[
    ("スマート", "フォン", "スマートフォン"),
    ("アイス", "クリーム", "アイスクリーム"),
    ("クレジット", "カード", "クレジットカード"),
    ("ショッピング", "センター", "ショッピングセンター"),
    ("コンピュータ", "ー", "コンピューター"),
    ("エア", "コン", "エアコン"),
    ("リモート", "コントロール", "リモートコントロール"),
    ("ソフト", "ウェア", "ソフトウェア"),
    ("ハード", "ウェア", "ハードウェア"),
];

/// IPADIC top-level part of speech to the names stories use
const PART_OF_SPEECH: &[(&str, &str)] = &[
    ("名詞", "noun"),
    ("動詞", "verb"),
    ("形容詞", "adjective"),
    ("形状詞", "adjective"),
    ("副詞", "adverb"),
    ("助詞", "particle"),
    ("助動詞", "auxiliary"),
    ("接続詞", "conjunction"),
    ("感動詞", "interjection"),
    ("連体詞", "adnominal"),
    ("代名詞", "pronoun"),
    ("接頭辞", "prefix"),
    ("接尾辞", "suffix"),
    ("記号", "punctuation"),
    ("補助記号", "punctuation"),
    ("空白", "whitespace"),
];

/// IPADIC feature columns
const FEATURE_POS: usize = 0;
const FEATURE_BASE_FORM: usize = 6;
const FEATURE_READING: usize = 7;

// ==================== Errors ====================

#[derive(Debug)]
pub enum TokenizerError {
    /// Dictionary directory could not be loaded (path, reason)
    Load(String, String),
    Segment(String),
}

impl std::fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenizerError::Load(path, err) => {
                write!(f, "Failed to load tokenizer dictionary {}: {}", path, err)
            }
            TokenizerError::Segment(err) => write!(f, "Tokenization failed: {}", err),
        }
    }
}

impl std::error::Error for TokenizerError {}

// ==================== Tokenizer ====================

/// Segmenter over a compiled IPADIC dictionary
pub struct JapaneseTokenizer {
    segmenter: Segmenter,
}

impl JapaneseTokenizer {
    /// Load a compiled IPADIC directory
    pub fn load(dir: &Path) -> Result<Self, TokenizerError> {
        let dictionary = load_fs_dictionary(dir)
            .map_err(|e| TokenizerError::Load(dir.display().to_string(), e.to_string()))?;

        tracing::info!("Loaded tokenizer dictionary from {}", dir.display());
        Ok(Self {
            segmenter: Segmenter::new(Mode::Normal, dictionary, None),
        })
    }

    /// Split text into story tokens with readings, base forms and parts of speech
    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError> {
        let mut segments = self
            .segmenter
            .segment(Cow::Borrowed(text))
            .map_err(|e| TokenizerError::Segment(e.to_string()))?;

        let tokens = segments
            .iter_mut()
            .map(|segment| {
                let surface = segment.surface.to_string();
                build_token(&surface, &segment.details())
            })
            .collect();

        Ok(merge_katakana_compounds(tokens))
    }
}

/// Build a token from a surface form and its IPADIC feature columns.
///
/// `*` marks an empty column. Unknown words carry a single `UNK` column.
pub fn build_token(surface: &str, features: &[&str]) -> Token {
    let column = |idx: usize| features.get(idx).copied().filter(|f| *f != "*");

    let reading = column(FEATURE_READING).map(katakana_to_hiragana);
    let base_form = column(FEATURE_BASE_FORM).unwrap_or(surface);
    let parts = token_parts(surface, reading.as_deref());

    Token {
        surface: surface.to_string(),
        parts: if parts.is_empty() { None } else { Some(parts) },
        base_form: Some(base_form.to_string()),
        part_of_speech: Some(part_of_speech(features.get(FEATURE_POS).copied().unwrap_or(""))),
    }
}

/// Simplified part-of-speech name
pub fn part_of_speech(ipadic_pos: &str) -> String {
    if ipadic_pos.is_empty() {
        return "unknown".to_string();
    }
    PART_OF_SPEECH
        .iter()
        .find(|(ja, _)| *ja == ipadic_pos)
        .map(|(_, en)| en.to_string())
        .unwrap_or_else(|| ipadic_pos.to_lowercase())
}

/// Merge adjacent tokens that form a known katakana compound
pub fn merge_katakana_compounds(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        let compound = iter.peek().and_then(|next| {
            KATAKANA_COMPOUNDS
                .iter()
                .find(|(first, second, _)| *first == token.surface && *second == next.surface)
                .map(|(_, _, word)| *word)
        });

        match compound {
            Some(word) => {
                iter.next();
                merged.push(Token {
                    surface: word.to_string(),
                    parts: Some(vec![plain(word)]),
                    base_form: Some(word.to_string()),
                    part_of_speech: token.part_of_speech,
                });
            }
            None => merged.push(token),
        }
    }

    merged
}

// ==================== Readings ====================

/// CJK unified ideographs
pub fn is_kanji(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

fn to_hiragana(c: char) -> char {
    if ('\u{30A1}'..='\u{30F6}').contains(&c) {
        char::from_u32(c as u32 - 0x60).unwrap_or(c)
    } else {
        c
    }
}

pub fn katakana_to_hiragana(text: &str) -> String {
    text.chars().map(to_hiragana).collect()
}

fn plain(text: &str) -> TokenPart {
    TokenPart {
        text: text.to_string(),
        reading: None,
    }
}

fn ruby(text: &[char], reading: &[char]) -> TokenPart {
    TokenPart {
        text: text.iter().collect(),
        reading: if reading.is_empty() {
            None
        } else {
            Some(reading.iter().collect())
        },
    }
}

/// Furigana parts for a surface form. Only kanji runs carry a reading.
pub fn token_parts(surface: &str, reading: Option<&str>) -> Vec<TokenPart> {
    if surface.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = surface.chars().collect();

    let reading = match reading {
        Some(r) if chars.iter().any(|c| is_kanji(*c)) => r,
        _ => return vec![plain(surface)],
    };
    let reading: Vec<char> = reading.chars().collect();

    // All-kanji compounds like 友達 keep one reading for the whole word
    if chars.iter().all(|c| is_kanji(*c)) {
        return vec![ruby(&chars, &reading)];
    }

    align_reading(&chars, &reading)
}

/// Position of `needle` in `haystack` at or after `from`
fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| pos + from)
}

fn slice(chars: &[char], start: usize, end: usize) -> &[char] {
    if start >= end {
        return &[];
    }
    chars.get(start..end.min(chars.len())).unwrap_or(&[])
}

/// Split a reading across the kanji runs of a mixed surface.
///
/// Leading and trailing kana are taken off both ends; kana between kanji
/// runs anchor where one run's reading stops and the next begins.
/// 食べる/たべる gives 食(た) べる.
fn align_reading(surface: &[char], reading: &[char]) -> Vec<TokenPart> {
    let prefix_len = surface.iter().take_while(|c| !is_kanji(**c)).count();
    let suffix_len = surface.iter().rev().take_while(|c| !is_kanji(**c)).count();
    let body_end = surface.len() - suffix_len;
    let reading_end = reading.len().saturating_sub(suffix_len);

    let mut parts = Vec::new();
    if prefix_len > 0 {
        parts.push(ruby(&surface[..prefix_len], &[]));
    }

    let mut idx = prefix_len;
    let mut read_pos = prefix_len;
    while idx < body_end {
        if !is_kanji(surface[idx]) {
            idx += 1;
            continue;
        }

        let kanji_start = idx;
        while idx < body_end && is_kanji(surface[idx]) {
            idx += 1;
        }
        let kanji = &surface[kanji_start..idx];

        if idx == body_end {
            parts.push(ruby(kanji, slice(reading, read_pos, reading_end)));
            break;
        }

        let kana_start = idx;
        while idx < body_end && !is_kanji(surface[idx]) {
            idx += 1;
        }
        let kana = &surface[kana_start..idx];
        let kana_hira: Vec<char> = kana.iter().map(|c| to_hiragana(*c)).collect();

        match find_from(reading, &kana_hira, read_pos) {
            Some(pos) if pos > read_pos => {
                parts.push(ruby(kanji, slice(reading, read_pos, pos)));
                read_pos = pos + kana_hira.len();
            }
            _ => {
                parts.push(ruby(kanji, slice(reading, read_pos, reading_end)));
                read_pos = reading_end;
            }
        }
        parts.push(ruby(kana, &[]));
    }

    if suffix_len > 0 {
        parts.push(ruby(&surface[body_end..], &[]));
    }
    parts
}
