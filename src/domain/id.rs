//! Domain ID Types with NewType Pattern
//!
//! Type-safe wrappers for the integer identifiers the relational store hands
//! out, so a site id can never be passed where a resource id is expected.

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::{Decode, Encode, Sqlite, Type};
use std::fmt;
use std::str::FromStr;

/// Macro to generate NewType ID wrappers with all required traits
macro_rules! domain_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database identifier
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the inner integer value
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        // SQLx trait implementations for database compatibility
        impl Type<Sqlite> for $name {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <i64 as Type<Sqlite>>::type_info()
            }
        }

        impl<'q> Encode<'q, Sqlite> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> Result<IsNull, BoxDynError> {
                <i64 as Encode<'q, Sqlite>>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> Decode<'r, Sqlite> for $name {
            fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
                Ok(Self(<i64 as Decode<'r, Sqlite>>::decode(value)?))
            }
        }
    };
}

domain_id!(
    /// Identifier of a routable resource
    ResourceId
);

domain_id!(
    /// Identifier of a backend target
    TargetId
);

domain_id!(
    /// Identifier of a site hosting targets
    SiteId
);

domain_id!(
    /// Identifier of an exit node (one data-plane instance)
    ExitNodeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_display() {
        assert_eq!(ResourceId::new(42).to_string(), "42");
    }

    #[test]
    fn exit_node_id_from_str() {
        let id: ExitNodeId = " 7 ".parse().expect("parse exit node id");
        assert_eq!(id.get(), 7);
        assert!("seven".parse::<ExitNodeId>().is_err());
    }

    #[test]
    fn target_ids_order_numerically() {
        let mut ids = vec![TargetId::new(10), TargetId::new(2), TargetId::new(7)];
        ids.sort();
        assert_eq!(ids, vec![TargetId::new(2), TargetId::new(7), TargetId::new(10)]);
    }

    #[test]
    fn site_id_serializes_transparently() {
        let json = serde_json::to_string(&SiteId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
