//! Compose forms.
//!
//! Forms turn raw request input into a [`CleanedCompose`]: a validated draft
//! plus a typed [`RecipientSpec`]. Every failing field is reported at once.

use crate::services::recipient::RecipientSpec;
use campus_common::{AppResult, FieldErrors};
use campus_db::{entities::user, repositories::UserRepository};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use validator::Validate;

/// Predicate deciding whether a user may be addressed individually.
pub type RecipientFilter = Arc<dyn Fn(&user::Model) -> bool + Send + Sync>;

/// Subject and body of a message about to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct MessageDraft {
    #[validate(length(min = 1, max = 120))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body: String,
}

/// Output of a successful form clean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedCompose {
    pub recipients: RecipientSpec,
    pub draft: MessageDraft,
}

/// Individual compose form. `recipient` is a comma-separated username list.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ComposeForm {
    #[validate(length(min = 1))]
    pub recipient: String,
    #[validate(length(min = 1, max = 120))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body: String,
}

impl ComposeForm {
    /// Split the recipient field into unique usernames, first occurrence wins.
    #[must_use]
    pub fn usernames(&self) -> Vec<String> {
        let mut keys = HashSet::new();
        self.recipient
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty() && keys.insert(name.to_lowercase()))
            .map(str::to_string)
            .collect()
    }

    /// Validate the form and resolve usernames to active users.
    pub async fn clean(
        self,
        user_repo: &UserRepository,
        filter: Option<&RecipientFilter>,
    ) -> AppResult<CleanedCompose> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        let names = self.usernames();
        let mut recipient_ids = Vec::with_capacity(names.len());

        if names.is_empty() {
            if errors.get("recipient").is_none() {
                errors.add("recipient", "This field is required.");
            }
        } else {
            let found: HashMap<String, user::Model> = user_repo
                .find_by_usernames(&names)
                .await?
                .into_iter()
                .filter(|u| u.is_active)
                .map(|u| (u.username_lower.clone(), u))
                .collect();

            let mut unknown = Vec::new();
            let mut rejected = Vec::new();
            for name in &names {
                match found.get(&name.to_lowercase()) {
                    None => unknown.push(name.as_str()),
                    Some(u) if filter.is_some_and(|allow| !allow(u)) => {
                        rejected.push(u.username.as_str());
                    }
                    Some(u) => recipient_ids.push(u.id.clone()),
                }
            }

            if !unknown.is_empty() {
                errors.add(
                    "recipient",
                    format!(
                        "The following usernames are incorrect: {}",
                        unknown.join(", ")
                    ),
                );
            }
            if !rejected.is_empty() {
                errors.add(
                    "recipient",
                    format!(
                        "The following recipients are not allowed: {}",
                        rejected.join(", ")
                    ),
                );
            }
        }

        errors.into_result()?;

        Ok(CleanedCompose {
            recipients: RecipientSpec::Individual(recipient_ids),
            draft: MessageDraft {
                subject: self.subject,
                body: self.body,
            },
        })
    }
}

/// Group compose form. `recipient` is a `group-<type>-<id>` token.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ComposeGroupForm {
    #[validate(length(min = 1, max = 120))]
    pub recipient: String,
    #[validate(length(min = 1, max = 120))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body: String,
}

impl ComposeGroupForm {
    /// Validate field lengths, then parse the group token.
    pub fn clean(self) -> AppResult<CleanedCompose> {
        self.validate()?;

        Ok(CleanedCompose {
            recipients: RecipientSpec::from_group_token(&self.recipient)?,
            draft: MessageDraft {
                subject: self.subject,
                body: self.body,
            },
        })
    }
}
