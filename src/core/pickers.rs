//! Static character pickers: emoji, kaomoji and symbols.
//!
//! Pure presentation data served to the popup's picker tabs. Search matches
//! the characters themselves, which is mostly useful for kaomoji and symbol
//! sequences.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::shared::types::PickerCategory;

/// Upper bound for the persisted emoji-recents list.
pub const MAX_EMOJI_RECENTS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../bindings/")]
pub enum PickerMode {
    Emoji,
    Kaomoji,
    Symbols,
}

const EMOJI_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Smileys",
        &[
            "😀", "😁", "😂", "🤣", "😃", "😄", "😅", "😉", "😊", "😋", "😎", "😍", "😘", "🥰",
            "🤗", "🤔", "😐", "🙄", "😏", "😮", "😴", "😌", "😛", "😜", "😒", "🙃", "🤯", "🥳",
            "🤓", "😢", "😭", "😤", "😡", "🤡", "💀", "👻", "🤖",
        ],
    ),
    (
        "People",
        &[
            "👋", "✋", "👌", "✌️", "🤞", "🤘", "👈", "👉", "👆", "👇", "👍", "👎", "✊", "👊",
            "👏", "🙌", "🤝", "🙏", "💪", "👀", "👄", "🧑", "👨", "👩", "👶", "🧑‍💻", "🧑‍🔧",
            "🧑‍🍳", "🧑‍🚀",
        ],
    ),
    (
        "Nature",
        &[
            "🐶", "🐱", "🐭", "🐰", "🦊", "🐻", "🐼", "🐨", "🦁", "🐮", "🐷", "🐸", "🐵", "🐧",
            "🦉", "🦋", "🐢", "🐍", "🐙", "🐬", "🐳", "🌵", "🌲", "🌱", "🍀", "🌻", "🌸", "🌹",
            "🍄",
        ],
    ),
    (
        "Food",
        &[
            "🍉", "🍊", "🍋", "🍌", "🍎", "🍑", "🍒", "🍓", "🥝", "🍅", "🥑", "🥕", "🌽", "🍞",
            "🧀", "🍔", "🍟", "🍕", "🌮", "🍜", "🍣", "🍦", "🍩", "🎂", "🍫", "☕", "🍵", "🍺",
            "🍷",
        ],
    ),
    (
        "Objects",
        &[
            "⌚", "📱", "💻", "⌨️", "🖥️", "🖨️", "📷", "🎥", "📺", "⏰", "🔋", "💡", "🔧", "🔨",
            "⚙️", "🧲", "🔭", "🔬", "📁", "📅", "📊", "📌", "📎", "✂️", "📝", "🔑", "💼",
        ],
    ),
    (
        "Symbols",
        &[
            "❤️", "🧡", "💛", "💚", "💙", "💜", "🖤", "💔", "💕", "💯", "✔️", "❌", "⭕", "❗",
            "❓", "⚠️", "🔴", "🟢", "🔵", "⭐", "✨", "🔥", "💧", "⚡",
        ],
    ),
    (
        "Travel",
        &[
            "🚗", "🚕", "🚌", "🚓", "🚑", "🚲", "🏍️", "🚄", "✈️", "🚁", "🚢", "⚓", "🗺️", "🗽",
            "🏰", "🎡", "⛲", "🏖️", "🌋", "🏔️", "🏠", "🏢", "🏥", "⛪",
        ],
    ),
];

const KAOMOJI_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Happy",
        &[
            "(◕‿◕)", "(｡◕‿◕｡)", "(◠‿◠)", "(✿◠‿◠)", "٩(◕‿◕｡)۶", "(ᵔᴥᵔ)", "(◕ω◕)",
            "✧◝(⁰▿⁰)◜✧", "(★‿★)", "(｡♥‿♥｡)", "(◍•ᴗ•◍)",
        ],
    ),
    (
        "Sad",
        &[
            "(╥﹏╥)", "(T_T)", "(;_;)", "(ಥ_ಥ)", "(´;ω;`)", "(｡•́︿•̀｡)", "(◞‸◟)",
            "(╯︵╰,)",
        ],
    ),
    (
        "Angry",
        &[
            "(╬ಠ益ಠ)", "(ノಠ益ಠ)ノ彡┻━┻", "(ง •̀_•́)ง", "(╯°□°)╯︵ ┻━┻", "ಠ_ಠ", "(¬_¬)",
            "(눈_눈)", "ヽ(`Д´)ノ",
        ],
    ),
    (
        "Surprised",
        &["(°o°)", "(⊙_⊙)", "Σ(°△°|||)", "(◎_◎;)", "(O.O)", "∑(O_O;)", "(・□・;)"],
    ),
    (
        "Love",
        &[
            "(♡˙︶˙♡)", "(´∀`)♡", "♡(◕ω◕)", "(◕‿◕)♡", "♡^▽^♡", "(●´ω`●)♡",
            "( ˘ ³˘)♥",
        ],
    ),
    (
        "Animals",
        &[
            "(=^･ω･^=)", "ฅ^•ﻌ•^ฅ", "ʕ•ᴥ•ʔ", "(ᵔᴥᵔ)", "U・ᴥ・U", "(・(ｪ)・)",
        ],
    ),
    (
        "Misc",
        &[
            "¯\\_(ツ)_/¯", "┬─┬ノ( º _ ºノ)", "( ͡° ͜ʖ ͡°)", "(☞ﾟヮﾟ)☞", "(⌐■_■)",
            "(～￣▽￣)～", "(ノ◕ヮ◕)ノ*:・ﾟ✧",
        ],
    ),
];

const SYMBOL_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Arrows",
        &[
            "←", "↑", "→", "↓", "↔", "↕", "⇐", "⇒", "⇔", "↩", "↪", "↺", "↻", "➔", "➜", "➡",
        ],
    ),
    (
        "Math",
        &[
            "±", "×", "÷", "≠", "≈", "≤", "≥", "∞", "∑", "∏", "√", "∫", "∈", "∪", "∩", "∅", "π",
            "Δ", "λ", "μ",
        ],
    ),
    (
        "Currency",
        &["$", "€", "£", "¥", "₹", "₽", "₩", "฿", "₿", "¢", "₴", "₪"],
    ),
    (
        "Punctuation",
        &[
            "…", "–", "—", "«", "»", "‹", "›", "„", "†", "•", "·", "‰", "§", "¶", "©", "®", "™",
            "°", "№", "½", "¼", "¾",
        ],
    ),
    (
        "Shapes",
        &[
            "■", "□", "▲", "△", "▶", "▼", "◆", "◇", "○", "●", "◐", "★", "☆", "✦", "✩", "✪",
        ],
    ),
    (
        "Technical",
        &["⌘", "⌥", "⇧", "⌃", "⎋", "⏎", "⌫", "⇥", "⏏", "⌨", "⌚", "⌛", "⏰"],
    ),
    (
        "Music",
        &["♩", "♪", "♫", "♬", "♭", "♮", "♯", "🎵", "🎶", "🎼"],
    ),
    (
        "Misc",
        &[
            "☀", "☁", "☂", "☃", "★", "☎", "☑", "☒", "☕", "☘", "☝", "☠", "☢", "☮", "☯", "♻",
            "♠", "♡", "♢", "♣",
        ],
    ),
];

fn table(mode: PickerMode) -> &'static [(&'static str, &'static [&'static str])] {
    match mode {
        PickerMode::Emoji => EMOJI_CATEGORIES,
        PickerMode::Kaomoji => KAOMOJI_CATEGORIES,
        PickerMode::Symbols => SYMBOL_CATEGORIES,
    }
}

/// All categories of one picker mode.
pub fn categories(mode: PickerMode) -> Vec<PickerCategory> {
    table(mode)
        .iter()
        .map(|(id, items)| PickerCategory {
            id: id.to_string(),
            label: id.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}

/// Search a picker mode across all categories; empty categories are omitted.
pub fn search(mode: PickerMode, query: &str) -> Vec<PickerCategory> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return categories(mode);
    }
    table(mode)
        .iter()
        .filter_map(|(id, items)| {
            let matching: Vec<String> = items
                .iter()
                .filter(|item| item.to_lowercase().contains(&query))
                .map(|s| s.to_string())
                .collect();
            if matching.is_empty() {
                None
            } else {
                Some(PickerCategory {
                    id: id.to_string(),
                    label: id.to_string(),
                    items: matching,
                })
            }
        })
        .collect()
}

/// Move `item` to the front of the recents list, deduplicated and capped.
pub fn record_recent(recents: &mut Vec<String>, item: &str) {
    if item.is_empty() {
        return;
    }
    recents.retain(|existing| existing != item);
    recents.insert(0, item.to_string());
    recents.truncate(MAX_EMOJI_RECENTS);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_has_categories() {
        for mode in [PickerMode::Emoji, PickerMode::Kaomoji, PickerMode::Symbols] {
            let cats = categories(mode);
            assert!(!cats.is_empty());
            assert!(cats.iter().all(|c| !c.items.is_empty()));
        }
    }

    #[test]
    fn search_matches_symbol_sequences() {
        let results = search(PickerMode::Kaomoji, "ツ");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "Misc");
        assert_eq!(results[0].items, vec!["¯\\_(ツ)_/¯"]);

        assert!(search(PickerMode::Symbols, "no such thing").is_empty());
    }

    #[test]
    fn empty_query_returns_everything() {
        assert_eq!(
            search(PickerMode::Emoji, "  ").len(),
            categories(PickerMode::Emoji).len()
        );
    }

    #[test]
    fn recents_dedupe_and_cap() {
        let mut recents = Vec::new();
        for i in 0..40 {
            record_recent(&mut recents, &format!("e{}", i));
        }
        assert_eq!(recents.len(), MAX_EMOJI_RECENTS);
        assert_eq!(recents[0], "e39");

        record_recent(&mut recents, "e39");
        assert_eq!(recents.len(), MAX_EMOJI_RECENTS);
        assert_eq!(recents[0], "e39");

        record_recent(&mut recents, "e38");
        assert_eq!(recents[0], "e38");
        assert_eq!(recents[1], "e39");
    }
}
