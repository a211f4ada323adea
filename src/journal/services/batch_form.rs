//! Decoding of the keyed message fields posted by the conversation forms.
//!
//! The form sends `messages=<k1>,<k2>,...` and, per key, `content_<k>` and
//! `who_wrote_<k>`. Keys only pair the fields up; the list order is the batch
//! order.

use std::collections::HashMap;

use crate::journal::core::errors::{JournalError, JournalResult};
use crate::journal::core::models::MessageDraft;

/// `who_wrote_<k>` value marking the user as the author.
pub const AUTHOR_ME: &str = "me";

/// Turn the posted fields into drafts, in the order of `message_keys`.
///
/// # Errors
/// `InvalidMessage` when a listed key has no `content_<k>` field.
pub fn decode_message_batch<S>(
    message_keys: &str,
    fields: &HashMap<String, String, S>,
) -> JournalResult<Vec<MessageDraft>>
where
    S: std::hash::BuildHasher,
{
    message_keys
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| {
            let content = fields.get(&format!("content_{key}")).ok_or_else(|| {
                JournalError::InvalidMessage(format!("no content posted for message {key}"))
            })?;
            let written_by_me = fields
                .get(&format!("who_wrote_{key}"))
                .is_some_and(|who| who == AUTHOR_ME);
            Ok(MessageDraft {
                content: content.clone(),
                written_by_me,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::core::errors::ErrorKind;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn keys_decide_the_order() {
        let fields = form(&[
            ("content_7", "second"),
            ("who_wrote_7", "other"),
            ("content_2", "first"),
            ("who_wrote_2", "me"),
        ]);
        let drafts = decode_message_batch("2, 7", &fields).unwrap();
        assert_eq!(
            drafts,
            vec![
                MessageDraft {
                    content: "first".to_string(),
                    written_by_me: true
                },
                MessageDraft {
                    content: "second".to_string(),
                    written_by_me: false
                },
            ]
        );
    }

    #[test]
    fn missing_author_means_the_contact_wrote_it() {
        let fields = form(&[("content_1", "hello")]);
        let drafts = decode_message_batch("1", &fields).unwrap();
        assert!(!drafts[0].written_by_me);
    }

    #[test]
    fn empty_keys_are_skipped() {
        let fields = form(&[("content_1", "hello")]);
        assert_eq!(decode_message_batch(",1,", &fields).unwrap().len(), 1);
        assert!(decode_message_batch("", &fields).unwrap().is_empty());
    }

    #[test]
    fn missing_content_is_rejected() {
        let fields = form(&[("who_wrote_3", "me")]);
        let err = decode_message_batch("3", &fields).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMessage);
    }
}
