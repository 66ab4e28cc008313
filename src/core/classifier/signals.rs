// Signal extractors - each one turns raw message text into one piece of
// spam evidence. Pure functions, no shared state, independently testable.

use lazy_static::lazy_static;
use regex::Regex;

/// Emoji count above which the emoji-density signal turns critical.
pub const EMOJI_CRITICAL_THRESHOLD: usize = 12;

/// Minimum run of checkmarks treated as a flood.
const CHECKMARK_FLOOD: &str = "✅✅✅✅";

lazy_static! {
    /// High-confidence patterns: a single hit is enough evidence on its own.
    /// Mostly currency-lure phrasing common in Russian-language chat spam.
    static ref CRITICAL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\d[\d\s.,]*\s*(?:руб|рублей|₽|\$|usd|долл)[а-яa-z]*\s*(?:в|за)\s*(?:час|день|сутки|неделю)").unwrap(),
        Regex::new(r"(?i)(?:пассивн|лёгк|легк)[а-я]*\s+(?:доход|заработок)").unwrap(),
        Regex::new(r"(?i)зараб[оа]т[а-я]*\s+(?:от|до)\s*\d").unwrap(),
        Regex::new(r"(?i)пиши(?:те)?\s+(?:в\s+)?(?:лс|личк|личные)").unwrap(),
        Regex::new(r"(?i)(?:крипт|бинанс|трейдинг)[а-я]*\s*(?:сигнал|доход|обучени)").unwrap(),
        Regex::new(r"(?i)удал[её]нн(?:ая|ый|о)\s+(?:работ|заработок|доход)").unwrap(),
    ];

    /// The broad known-spam pattern: recruitment/lure phrasing that keeps
    /// showing up verbatim across spam waves.
    static ref SPAM_PATTERN: Regex = Regex::new(concat!(
        r"(?i)(?:ищу|ищем|нужны|требуются|набираю)\s+(?:людей|партн[её]р|сотрудник)[а-я]*",
        r"|(?i)(?:первые|свои)\s+деньги\s+(?:уже\s+)?(?:сегодня|завтра|через)",
        r"|(?i)бесплатн[а-я]*\s+обучени[а-я]*\s*[,.!]?\s*(?:доход|заработок|профит)",
        r"|(?i)(?:доход|профит)\s+от\s*\d+",
        r"|(?i)кому\s+интересно\s*[-—+,]?\s*(?:пиши|ставь|жми)",
    ))
    .unwrap();

    /// Word tokens: runs of Cyrillic/Latin letters (spam obfuscation mixes
    /// the two scripts inside a single word).
    static ref WORD_TOKEN: Regex = Regex::new(r"[A-Za-zА-Яа-яЁё]+").unwrap();
}

/// Fixed gambling/betting vocabulary, matched as case-sensitive substrings.
const BETTING_TOKENS: &[&str] = &[
    "казино",
    "Казино",
    "ставк",
    "Ставк",
    "букмекер",
    "фриспин",
    "промокод",
    "бонус за регистрацию",
    "1xBet",
    "1хБет",
    "беспроигрышн",
];

/// First substring matching any of the critical spam patterns.
pub fn critical_pattern(text: &str) -> Option<String> {
    CRITICAL_PATTERNS
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().to_string())
}

/// First substring matching the broad known-spam pattern.
pub fn spam_pattern(text: &str) -> Option<String> {
    SPAM_PATTERN.find(text).map(|m| m.as_str().to_string())
}

/// Tokens that mix Cyrillic and Latin letters inside one word boundary.
pub fn mixed_script_words(text: &str) -> Vec<String> {
    WORD_TOKEN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|word| {
            let has_cyrillic = word.chars().any(is_cyrillic);
            let has_latin = word.chars().any(|c| c.is_ascii_alphabetic());
            has_cyrillic && has_latin
        })
        .map(str::to_string)
        .collect()
}

/// Occurrences of the fixed betting vocabulary in the text.
pub fn betting_tokens(text: &str) -> Vec<String> {
    BETTING_TOKENS
        .iter()
        .filter(|token| text.contains(*token))
        .map(|token| token.to_string())
        .collect()
}

/// Number of emoji scalar values in the text.
pub fn emoji_count(text: &str) -> usize {
    text.chars().filter(|&c| is_emoji(c)).count()
}

/// Four or more consecutive checkmarks, raw or after folding the blue
/// diamond glyph spammers substitute for the checkmark.
pub fn has_checkmark_flood(text: &str) -> bool {
    if text.contains(CHECKMARK_FLOOD) {
        return true;
    }
    text.replace('\u{1F537}', "✅").contains(CHECKMARK_FLOOD)
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04FF}')
}

/// Membership in the Unicode emoji blocks. Covers the pictographs,
/// transport, supplemental and misc-symbol ranges, the regional
/// indicators flag emoji are built from, and the dingbat checkmarks spam
/// leans on.
fn is_emoji(c: char) -> bool {
    matches!(c,
        '\u{1F004}'
        | '\u{1F0CF}'
        | '\u{1F1E6}'..='\u{1F1FF}'
        | '\u{1F300}'..='\u{1F5FF}'
        | '\u{1F600}'..='\u{1F64F}'
        | '\u{1F680}'..='\u{1F6FF}'
        | '\u{1F900}'..='\u{1F9FF}'
        | '\u{1FA70}'..='\u{1FAFF}'
        | '\u{2600}'..='\u{26FF}'
        | '\u{2700}'..='\u{27BF}'
        | '\u{2B00}'..='\u{2BFF}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_pattern_matches_currency_lure() {
        let matched = critical_pattern("Предлагаю 5000 рублей в день, без вложений");
        assert!(matched.is_some());
        assert!(matched.unwrap().contains("рублей в день"));
    }

    #[test]
    fn critical_pattern_ignores_plain_text() {
        assert_eq!(critical_pattern("Кто идёт завтра на встречу?"), None);
    }

    #[test]
    fn spam_pattern_matches_recruitment_lure() {
        assert!(spam_pattern("Ищу людей для удалённой занятости").is_some());
        assert!(spam_pattern("кому интересно - пиши").is_some());
        assert!(spam_pattern("обычное сообщение про работу").is_none());
    }

    #[test]
    fn mixed_words_detects_script_mixing() {
        let words = mixed_script_words("Привет! Зaрaботок ждёт, нормальное word тут");
        // "Зaрaботок" has Latin 'a' characters embedded in a Cyrillic word
        assert_eq!(words, vec!["Зaрaботок".to_string()]);
    }

    #[test]
    fn mixed_words_is_idempotent() {
        let text = "Дeньги быстро, crypto-профит";
        let first = mixed_script_words(text);
        let second = mixed_script_words(text);
        assert_eq!(first, second);
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn mixed_words_empty_for_clean_text() {
        assert!(mixed_script_words("hello world и привет мир").is_empty());
    }

    #[test]
    fn betting_tokens_are_case_sensitive() {
        let matches = betting_tokens("Лучшее казино и Ставки на спорт");
        assert!(matches.contains(&"казино".to_string()));
        assert!(matches.contains(&"Ставк".to_string()));
        assert!(!matches.contains(&"Казино".to_string()));
    }

    #[test]
    fn emoji_count_counts_scalar_values() {
        assert_eq!(emoji_count("привет 🎰🎰🎰"), 3);
        assert_eq!(emoji_count("no emoji here"), 0);
        assert_eq!(emoji_count("✅✅"), 2);
    }

    #[test]
    fn flag_emoji_are_counted() {
        // Flags are pairs of regional indicator scalars
        assert_eq!(emoji_count("🇷🇺"), 2);
        let flood = "🇷🇺".repeat(13);
        assert!(emoji_count(&flood) > EMOJI_CRITICAL_THRESHOLD);
    }

    #[test]
    fn checkmark_flood_raw() {
        assert!(has_checkmark_flood("✅✅✅✅ жми"));
        assert!(!has_checkmark_flood("✅✅✅ почти"));
    }

    #[test]
    fn checkmark_flood_with_folded_glyph() {
        // Two checkmarks obfuscated with blue diamonds still count as a run
        assert!(has_checkmark_flood("✅🔷✅🔷 жми"));
    }
}
