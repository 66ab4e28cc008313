// Telegram presentation helpers - ballot keyboards, callback data and
// display names.

use crate::core::voting::{Tally, VoteChoice, QUORUM};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, User};
use teloxide::utils::html;

const CONFIRM_PREFIX: &str = "ban_confirm_";
const CANCEL_PREFIX: &str = "ban_cancel_";

/// "First Last" (or just "First"), HTML-escaped.
pub fn display_name(user: &User) -> String {
    match &user.last_name {
        Some(last) => html::escape(&format!("{} {}", user.first_name, last)),
        None => html::escape(&user.first_name),
    }
}

/// Confirm/cancel keyboard showing the current tally.
pub fn ballot_keyboard(
    target_user_id: u64,
    target_message_id: i32,
    tally: Tally,
) -> InlineKeyboardMarkup {
    let suffix = format!("{}_{}", target_user_id, target_message_id);
    InlineKeyboardMarkup::new([[
        InlineKeyboardButton::callback(
            format!("Подтвердить ({}/{})", tally.confirms, QUORUM),
            format!("{}{}", CONFIRM_PREFIX, suffix),
        ),
        InlineKeyboardButton::callback(
            format!("Отменить ({}/{})", tally.cancels, QUORUM),
            format!("{}{}", CANCEL_PREFIX, suffix),
        ),
    ]])
}

/// Parse ballot callback data back into (choice, target user, target
/// message).
pub fn parse_ballot_data(data: &str) -> Option<(VoteChoice, u64, i32)> {
    let (choice, rest) = if let Some(rest) = data.strip_prefix(CONFIRM_PREFIX) {
        (VoteChoice::Confirm, rest)
    } else if let Some(rest) = data.strip_prefix(CANCEL_PREFIX) {
        (VoteChoice::Cancel, rest)
    } else {
        return None;
    };

    let (user, message) = rest.split_once('_')?;
    Some((choice, user.parse().ok()?, message.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ballot_data_round_trips() {
        let kb = ballot_keyboard(
            42,
            900,
            Tally {
                confirms: 1,
                cancels: 0,
            },
        );
        let row = &kb.inline_keyboard[0];
        assert!(row[0].text.contains("Подтвердить (1/3)"));
        assert!(row[1].text.contains("Отменить (0/3)"));

        assert_eq!(
            parse_ballot_data("ban_confirm_42_900"),
            Some((VoteChoice::Confirm, 42, 900))
        );
        assert_eq!(
            parse_ballot_data("ban_cancel_42_900"),
            Some((VoteChoice::Cancel, 42, 900))
        );
    }

    #[test]
    fn foreign_callback_data_is_rejected() {
        assert_eq!(parse_ballot_data("something_else"), None);
        assert_eq!(parse_ballot_data("ban_confirm_notanumber_900"), None);
    }
}
