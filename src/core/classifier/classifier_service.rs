// Spam classifier - combines the independent signal extractors into a
// single verdict via a fixed decision policy.
//
// NO Telegram dependencies here - just pure domain logic. The classifier is
// stateless apart from its config, so concurrent use is trivially safe.

use super::classifier_models::{ClassifierConfig, EvidenceReport, MessageProfile, Verdict};
use super::signals;

/// Messages at or above this many characters are never auto-flagged.
/// Real spam is short; long-form posts are overwhelmingly legitimate.
const MAX_SPAM_LEN: usize = 500;

/// Multi-signal spam classifier.
pub struct SpamClassifier {
    config: ClassifierConfig,
}

impl SpamClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one message.
    ///
    /// Messages without text or caption short-circuit to "not spam" with no
    /// evidence - classification only runs when there is something to read.
    /// The length gate uses the raw character count, before any
    /// normalization.
    pub fn classify(&self, profile: &MessageProfile) -> Verdict {
        let Some(text) = profile.text.as_deref() else {
            return Verdict::clean();
        };
        if text.is_empty() {
            return Verdict::clean();
        }

        let emoji_count = signals::emoji_count(text);
        let evidence = EvidenceReport {
            spam_pattern: signals::spam_pattern(text),
            critical_match: signals::critical_pattern(text),
            mixed_words: signals::mixed_script_words(text),
            betting_tokens: self
                .config
                .enable_betting_signal
                .then(|| signals::betting_tokens(text)),
            emoji_count,
            emoji_critical: emoji_count > signals::EMOJI_CRITICAL_THRESHOLD,
            checkmark_flood: signals::has_checkmark_flood(text),
        };

        // Length gate dominates every other signal.
        if text.chars().count() >= MAX_SPAM_LEN {
            return Verdict {
                is_spam: false,
                evidence,
            };
        }

        // Stricter variant: only act on premium, non-reply authors.
        if self.config.require_premium_and_non_reply
            && !(profile.from_premium && !profile.is_reply)
        {
            return Verdict {
                is_spam: false,
                evidence,
            };
        }

        let betting_hit = evidence
            .betting_tokens
            .as_ref()
            .map(|tokens| tokens.len() > 1)
            .unwrap_or(false);

        let is_spam = evidence.checkmark_flood
            || evidence.critical_match.is_some()
            || evidence.mixed_words.len() > 1
            || betting_hit
            || evidence.spam_pattern.is_some()
            || evidence.emoji_critical;

        Verdict { is_spam, evidence }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_profile(text: &str) -> MessageProfile {
        MessageProfile {
            text: Some(text.to_string()),
            is_reply: false,
            from_premium: false,
        }
    }

    fn classifier() -> SpamClassifier {
        SpamClassifier::new(ClassifierConfig::default())
    }

    #[test]
    fn empty_message_short_circuits_to_clean() {
        let verdict = classifier().classify(&MessageProfile::default());
        assert!(!verdict.is_spam);
        assert!(verdict.evidence.mixed_words.is_empty());
        assert_eq!(verdict.evidence.emoji_count, 0);
    }

    #[test]
    fn checkmark_flood_is_spam() {
        let verdict = classifier().classify(&text_profile("✅✅✅✅ call now"));
        assert!(verdict.is_spam);
        assert!(verdict.evidence.checkmark_flood);
    }

    #[test]
    fn normalized_checkmark_flood_is_spam() {
        let verdict = classifier().classify(&text_profile("🔷✅🔷✅ жми сюда"));
        assert!(verdict.is_spam);
        assert!(verdict.evidence.checkmark_flood);
    }

    #[test]
    fn length_gate_dominates_all_signals() {
        let long = format!("✅✅✅✅ казино Ставки {}", "х".repeat(500));
        let verdict = classifier().classify(&text_profile(&long));
        assert!(!verdict.is_spam);
        // Evidence is still recorded even though the gate held
        assert!(verdict.evidence.checkmark_flood);
    }

    #[test]
    fn single_mixed_word_is_not_enough() {
        let verdict = classifier().classify(&text_profile("одно слoвo тут"));
        assert_eq!(verdict.evidence.mixed_words.len(), 1);
        assert!(!verdict.is_spam);
    }

    #[test]
    fn two_mixed_words_are_spam() {
        let verdict = classifier().classify(&text_profile("Зaрaботок и дoход ждут"));
        assert!(verdict.evidence.mixed_words.len() > 1);
        assert!(verdict.is_spam);
    }

    #[test]
    fn emoji_over_threshold_is_spam() {
        let verdict = classifier().classify(&text_profile(&"🎰".repeat(13)));
        assert!(verdict.is_spam);
        assert!(verdict.evidence.emoji_critical);
        assert_eq!(verdict.evidence.emoji_count, 13);
    }

    #[test]
    fn betting_signal_respects_config() {
        let text = "казино букмекер фриспин";

        let enabled = SpamClassifier::new(ClassifierConfig {
            enable_betting_signal: true,
            require_premium_and_non_reply: false,
        });
        let verdict = enabled.classify(&text_profile(text));
        assert!(verdict.is_spam);
        assert!(verdict.evidence.betting_tokens.as_ref().unwrap().len() > 1);

        let disabled = SpamClassifier::new(ClassifierConfig {
            enable_betting_signal: false,
            require_premium_and_non_reply: false,
        });
        let verdict = disabled.classify(&text_profile(text));
        assert!(!verdict.is_spam);
        assert!(verdict.evidence.betting_tokens.is_none());
    }

    #[test]
    fn premium_gate_blocks_ordinary_authors() {
        let strict = SpamClassifier::new(ClassifierConfig {
            enable_betting_signal: true,
            require_premium_and_non_reply: true,
        });

        let mut profile = text_profile("✅✅✅✅ call now");
        let verdict = strict.classify(&profile);
        assert!(!verdict.is_spam, "non-premium author must pass");

        profile.from_premium = true;
        let verdict = strict.classify(&profile);
        assert!(verdict.is_spam, "premium non-reply author is actionable");

        profile.is_reply = true;
        let verdict = strict.classify(&profile);
        assert!(!verdict.is_spam, "replies must pass even from premium");
    }

    #[test]
    fn evidence_retains_matched_substrings() {
        let verdict = classifier().classify(&text_profile("Пассивный доход от 3000 руб в день"));
        assert!(verdict.is_spam);
        let critical = verdict.evidence.critical_match.unwrap();
        assert!(critical.to_lowercase().contains("доход"));
    }
}
