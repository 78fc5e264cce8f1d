//! The `User` resource and its identifier.

use std::fmt;
use std::str::FromStr;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Store-assigned user identifier.
///
/// A 12-byte ObjectId on the wire as a 24-character lowercase hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(ObjectId);

impl UserId {
    /// A fresh identifier, unique within this process and across hosts with
    /// overwhelming probability.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for UserId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

/// The identifier was not 24 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed user id `{0}`")]
pub struct MalformedId(pub String);

impl FromStr for UserId {
    type Err = MalformedId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| MalformedId(s.to_owned()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The settable part of a user. Absent JSON fields take their zero value and
/// any `id` in the body is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFields {
    pub name: String,
    pub gender: String,
    pub age: i64,
}

/// A stored user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub gender: String,
    pub age: i64,
}

impl User {
    pub fn new(id: UserId, fields: UserFields) -> Self {
        let UserFields { name, gender, age } = fields;
        Self { id, name, gender, age }
    }

    pub fn fields(&self) -> UserFields {
        UserFields {
            name: self.name.clone(),
            gender: self.gender.clone(),
            age: self.age,
        }
    }
}
