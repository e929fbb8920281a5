//! Direct messages between portal users.

use crate::actor::ActorContext;
use crate::error::CoreError;
use crate::notification::{self, NotificationDraft};
use crate::types::DbId;

pub const MAX_MESSAGE_LENGTH: usize = 4_000;

pub fn validate_content(content: &str) -> Result<(), CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Message content is required".into()));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Message must be at most {MAX_MESSAGE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Plan a message from `sender` to `receiver_id`. The receiver is told
/// there is something in their inbox.
///
/// The caller still checks that the receiver is an active account.
pub fn plan_message(
    sender: &ActorContext,
    receiver_id: DbId,
    content: &str,
) -> Result<NotificationDraft, CoreError> {
    if receiver_id == sender.user_id {
        return Err(CoreError::Validation("You cannot message yourself".into()));
    }
    validate_content(content)?;
    Ok(notification::message_received(receiver_id))
}
