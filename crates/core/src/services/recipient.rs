//! Recipient specification and resolution.
//!
//! A compose request addresses either a list of users picked by the
//! individual form, or a group token of the form `group-<type>-<id>`.

use campus_common::{AppError, AppResult};
use campus_db::repositories::OfferingRepository;
use std::fmt;
use std::str::FromStr;

const GROUP_PREFIX: &str = "group";

/// Kinds of recipient group a token can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Every student enrolled in a course offering.
    Offering,
    /// Every user. Recognised in tokens but not resolvable.
    World,
}

impl GroupKind {
    /// Token segment for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offering => "offering",
            Self::World => "world",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offering" => Ok(Self::Offering),
            "world" => Ok(Self::World),
            other => Err(AppError::UnsupportedGroupType(other.to_string())),
        }
    }
}

/// Who a compose call addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientSpec {
    /// Already resolved user IDs, in the order they should receive messages.
    Individual(Vec<String>),
    /// A named group, expanded at compose time.
    Group {
        /// Resolution strategy.
        kind: GroupKind,
        /// Lookup key for the strategy.
        id: String,
    },
}

impl RecipientSpec {
    /// Parse a `group-<type>-<id>` token.
    ///
    /// The token must have exactly three non-empty segments and the `group`
    /// prefix, otherwise `InvalidRecipient` is returned. An unknown type
    /// yields `UnsupportedGroupType`.
    pub fn from_group_token(token: &str) -> AppResult<Self> {
        let parts: Vec<&str> = token.split('-').collect();

        let [prefix, kind, id] = parts.as_slice() else {
            return Err(AppError::InvalidRecipient(token.to_string()));
        };
        if *prefix != GROUP_PREFIX || kind.is_empty() || id.is_empty() {
            return Err(AppError::InvalidRecipient(token.to_string()));
        }

        Ok(Self::Group {
            kind: kind.parse()?,
            id: (*id).to_string(),
        })
    }
}

impl FromStr for RecipientSpec {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_group_token(s)
    }
}

/// Expands a [`RecipientSpec`] into concrete recipient user IDs.
#[derive(Clone)]
pub struct RecipientResolver {
    offering_repo: OfferingRepository,
}

impl RecipientResolver {
    /// Create a new resolver.
    #[must_use]
    pub const fn new(offering_repo: OfferingRepository) -> Self {
        Self { offering_repo }
    }

    /// Resolve to user IDs, in the order messages should be written.
    ///
    /// Offering groups return one ID per enrollment row, so the result is
    /// only as distinct as the roster.
    pub async fn resolve(&self, spec: &RecipientSpec) -> AppResult<Vec<String>> {
        match spec {
            RecipientSpec::Individual(ids) => Ok(ids.clone()),
            RecipientSpec::Group {
                kind: GroupKind::Offering,
                id,
            } => {
                let offering = self.offering_repo.get_by_section(id).await?;
                let students = self.offering_repo.find_student_ids(&offering.id).await?;
                tracing::debug!(
                    offering = %offering.course_sec_id,
                    count = students.len(),
                    "Resolved offering recipients"
                );
                Ok(students)
            }
            RecipientSpec::Group {
                kind: GroupKind::World,
                ..
            } => Err(AppError::UnsupportedGroupType(
                GroupKind::World.as_str().to_string(),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use campus_db::entities::{offering, offering_student};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_resolver(db: MockDatabase) -> RecipientResolver {
        RecipientResolver::new(OfferingRepository::new(Arc::new(db.into_connection())))
    }

    fn create_test_offering(id: &str, section: &str) -> offering::Model {
        offering::Model {
            id: id.to_string(),
            course_sec_id: section.to_string(),
            title: "Operating Systems".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_enrollment(id: &str, offering_id: &str, user_id: &str) -> offering_student::Model {
        offering_student::Model {
            id: id.to_string(),
            offering_id: offering_id.to_string(),
            user_id: user_id.to_string(),
            enrolled_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_parse_offering_token() {
        let spec = RecipientSpec::from_group_token("group-offering-12345").unwrap();
        assert_eq!(
            spec,
            RecipientSpec::Group {
                kind: GroupKind::Offering,
                id: "12345".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_world_token() {
        let spec: RecipientSpec = "group-world-all".parse().unwrap();
        assert!(matches!(
            spec,
            RecipientSpec::Group {
                kind: GroupKind::World,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_malformed_tokens() {
        for token in [
            "",
            "group",
            "group-offering",
            "group-offering-1-2",
            "team-offering-1",
            "group--1",
            "group-offering-",
        ] {
            let result = RecipientSpec::from_group_token(token);
            assert!(
                matches!(result, Err(AppError::InvalidRecipient(_))),
                "token {token:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        let result = RecipientSpec::from_group_token("group-department-7");
        match result {
            Err(AppError::UnsupportedGroupType(kind)) => assert_eq!(kind, "department"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_individual_keeps_order() {
        let resolver = create_test_resolver(MockDatabase::new(DatabaseBackend::Postgres));
        let spec = RecipientSpec::Individual(vec!["u3".to_string(), "u2".to_string()]);

        let ids = resolver.resolve(&spec).await.unwrap();

        assert_eq!(ids, vec!["u3", "u2"]);
    }

    #[tokio::test]
    async fn test_resolve_offering() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_offering("off1", "12345")]])
            .append_query_results([[
                create_enrollment("e1", "off1", "u2"),
                create_enrollment("e2", "off1", "u3"),
            ]]);
        let resolver = create_test_resolver(db);

        let ids = resolver
            .resolve(&RecipientSpec::from_group_token("group-offering-12345").unwrap())
            .await
            .unwrap();

        assert_eq!(ids, vec!["u2", "u3"]);
    }

    #[tokio::test]
    async fn test_resolve_unknown_offering() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<offering::Model>::new()]);
        let resolver = create_test_resolver(db);

        let result = resolver
            .resolve(&RecipientSpec::from_group_token("group-offering-999").unwrap())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_resolve_world_is_unsupported() {
        let resolver = create_test_resolver(MockDatabase::new(DatabaseBackend::Postgres));
        let spec = RecipientSpec::Group {
            kind: GroupKind::World,
            id: "all".to_string(),
        };

        let result = resolver.resolve(&spec).await;

        assert!(matches!(result, Err(AppError::UnsupportedGroupType(k)) if k == "world"));
    }
}
