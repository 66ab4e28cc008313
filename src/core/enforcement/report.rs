// Moderator notification rendering.
//
// The payload always carries: who (name + profile link), where (chat title +
// deep link), the offending content, and the full evidence trail - each
// signal's flag/count together with the literal matched text, so operators
// can audit exactly why the verdict fired.

use super::enforcement_models::FlaggedMessage;
use crate::core::classifier::EvidenceReport;

/// Minimal HTML escaping for the Telegram HTML parse mode.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Deep link into a supergroup: the `-100` prefix is an internal marker and
/// is stripped from the public URL.
pub fn chat_link(chat_id: i64) -> String {
    let id = chat_id.to_string();
    let id = id.strip_prefix("-100").unwrap_or(&id).to_string();
    format!("https://t.me/c/{}", id)
}

pub fn author_link(msg: &FlaggedMessage) -> String {
    match &msg.author_username {
        Some(username) => format!("https://t.me/{}", username),
        None => format!("tg://user?id={}", msg.author_id),
    }
}

fn evidence_block(evidence: &EvidenceReport) -> String {
    let mut block = String::new();
    block.push_str(&format!(
        "<b>Основное регулярное выражение:</b> {}",
        match &evidence.spam_pattern {
            Some(matched) => format!("да | {}", escape(matched)),
            None => "нет".to_string(),
        }
    ));
    block.push_str(&format!(
        "\n<b>Критические токены:</b> {}",
        match &evidence.critical_match {
            Some(matched) => format!("да | {}", escape(matched)),
            None => "нет".to_string(),
        }
    ));
    block.push_str(&format!(
        "\n<b>Смешанные слова:</b> {}; [ {} ]",
        evidence.mixed_words.len(),
        escape(&evidence.mixed_words.join(", "))
    ));
    if let Some(tokens) = &evidence.betting_tokens {
        block.push_str(&format!(
            "\n<b>Токены ставок:</b> {}; [ {} ]",
            tokens.len(),
            escape(&tokens.join(", "))
        ));
    }
    block.push_str(&format!(
        "\n<b>Более 12 эмодзи:</b> {} ({})",
        if evidence.emoji_critical { "да" } else { "нет" },
        evidence.emoji_count
    ));
    block.push_str(&format!(
        "\n<b>Поток галочек:</b> {}",
        if evidence.checkmark_flood { "да" } else { "нет" }
    ));
    block
}

fn header(msg: &FlaggedMessage, chat_title: &str) -> String {
    format!(
        "👤 <a href='{}'><b>{}</b></a> из чата <a href='{}'>{}</a>",
        author_link(msg),
        msg.author_display_name,
        chat_link(msg.chat_id),
        escape(chat_title)
    )
}

/// Report for a completed delete+ban.
pub fn success_report(
    msg: &FlaggedMessage,
    chat_title: &str,
    evidence: &EvidenceReport,
) -> String {
    format!(
        "🎯 <b>Автоматический бан:</b>\n\n{}\n\n{}\n\n{}",
        header(msg, chat_title),
        escape(&msg.content),
        evidence_block(evidence)
    )
}

/// Report sent instead of the success report when a platform call failed
/// mid-enforcement.
pub fn failure_report(
    msg: &FlaggedMessage,
    chat_title: &str,
    evidence: &EvidenceReport,
    cause: &str,
) -> String {
    format!(
        "Возникла ошибка при автоматическом бане: {}\n\n{}\n\n{}\n\n{}",
        escape(cause),
        header(msg, chat_title),
        escape(&msg.content),
        evidence_block(evidence)
    )
}
