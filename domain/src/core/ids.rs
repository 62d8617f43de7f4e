//! Typed row identifiers
//!
//! Every table keys its rows with an SQLite `INTEGER PRIMARY KEY`. Wrapping the
//! raw `i64` in a newtype per entity keeps a reviewer id from being passed where
//! a proposal id is expected.

use serde::{Deserialize, Serialize};

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

row_id!(
    /// Identifier of an [`Organization`](crate::registry::Organization)
    OrganizationId
);
row_id!(
    /// Identifier of a [`Researcher`](crate::registry::Researcher)
    ResearcherId
);
row_id!(
    /// Identifier of a [`Competition`](crate::registry::Competition)
    CompetitionId
);
row_id!(
    /// Identifier of a proposal, see [`NewProposal`](crate::registry::NewProposal)
    ProposalId
);
row_id!(
    /// Identifier of a reviewer. Shares its value with the underlying researcher.
    ReviewerId
);
row_id!(
    /// Identifier of a [`ReviewAssignment`](crate::registry::ReviewAssignment)
    AssignmentId
);
row_id!(ConflictId);
row_id!(MeetingId);

impl ReviewerId {
    /// The researcher this reviewer role belongs to.
    pub fn researcher(self) -> ResearcherId {
        ResearcherId(self.0)
    }
}

impl From<ReviewerId> for ResearcherId {
    fn from(id: ReviewerId) -> Self {
        id.researcher()
    }
}
