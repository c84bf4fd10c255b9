// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Static table mapping canonical character codes to their characters:
// the CJK Unified Ideographs block (U+4E00..U+9FFF), common CJK punctuation,
// and ASCII letters and digits. Built once, on first use.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use inkgrade_core::types::CharacterCode;

const CJK_PUNCTUATION: [char; 8] = ['，', '。', '、', '；', '：', '？', '！', '…'];

static CHAR_TABLE: LazyLock<BTreeMap<String, char>> = LazyLock::new(|| {
    let mut table = BTreeMap::new();
    for cp in 0x4E00u32..=0x9FFF {
        if let Some(c) = char::from_u32(cp) {
            table.insert(format!("{cp:04X}"), c);
        }
    }
    for c in ('A'..='Z')
        .chain('a'..='z')
        .chain('0'..='9')
        .chain(CJK_PUNCTUATION)
    {
        table.insert(format!("{:04X}", c as u32), c);
    }
    table
});

/// Look up the character for a code, or `None` when the code falls outside
/// the supported repertoire.
pub fn lookup(code: &CharacterCode) -> Option<char> {
    CHAR_TABLE.get(code.as_str()).copied()
}

/// All supported codes in ascending order.
pub fn codes() -> impl Iterator<Item = CharacterCode> {
    CHAR_TABLE
        .keys()
        .map(|k| CharacterCode::parse(k).expect("table keys are canonical codes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_cjk_and_ascii() {
        assert_eq!(lookup(&CharacterCode::parse("6C38").unwrap()), Some('永'));
        assert_eq!(lookup(&CharacterCode::parse("4E00").unwrap()), Some('一'));
        assert_eq!(lookup(&CharacterCode::parse("0041").unwrap()), Some('A'));
        assert_eq!(lookup(&CharacterCode::parse("0039").unwrap()), Some('9'));
    }

    #[test]
    fn looks_up_cjk_punctuation() {
        assert_eq!(lookup(&CharacterCode::parse("FF0C").unwrap()), Some('，'));
        assert_eq!(lookup(&CharacterCode::parse("3002").unwrap()), Some('。'));
        assert_eq!(lookup(&CharacterCode::parse("2026").unwrap()), Some('…'));
    }

    #[test]
    fn unsupported_code_is_none() {
        assert_eq!(lookup(&CharacterCode::parse("0000").unwrap()), None);
        // ASCII punctuation is outside the repertoire.
        assert_eq!(lookup(&CharacterCode::from_char('!')), None);
    }

    #[test]
    fn table_covers_full_repertoire() {
        // 20992 CJK ideographs + 62 ASCII alphanumerics + 8 punctuation marks.
        assert_eq!(codes().count(), 21062);
    }
}
