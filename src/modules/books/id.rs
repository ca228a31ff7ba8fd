use std::{fmt, str::FromStr};

use mongodb::bson::oid::ObjectId;
use serde::{Serialize, Serializer};

use super::error::BookError;

/// Storage-native book identifier (a MongoDB ObjectId).
///
/// Renders as 24 lower-case hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(ObjectId);

impl BookId {
    /// Allocate a fresh identifier.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Parse an identifier, failing with [`BookError::InvalidId`] when the
    /// string is not an ObjectId.
    pub fn parse(raw: &str) -> Result<Self, BookError> {
        ObjectId::parse_str(raw)
            .map(Self)
            .map_err(|_| BookError::InvalidId(raw.to_string()))
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for BookId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for BookId {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for BookId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
