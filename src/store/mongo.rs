//! MongoDB adapter.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{DocumentStore, StoreError, USERS_COLLECTION, within};
use crate::model::{User, UserFields, UserId};

/// Connection and pool settings for [`MongoStore::connect`].
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub uri: String,
    pub app_name: String,
    /// Database holding the `users` collection.
    pub users_database: String,
    /// Database the aggregation counts run against.
    pub demo_database: String,
    pub min_pool_size: u32,
    pub max_pool_size: u32,
    /// Idle connections older than this are closed by the driver.
    pub max_idle_time: Duration,
    /// Bounds the initial connect, server selection and startup ping.
    pub connect_timeout: Duration,
}

/// On-disk shape of a user. `_id` is the native ObjectId.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    gender: String,
    #[serde(default)]
    age: i64,
}

impl From<UserDocument> for User {
    fn from(d: UserDocument) -> Self {
        User {
            id: d.id.into(),
            name: d.name,
            gender: d.gender,
            age: d.age,
        }
    }
}

impl From<&User> for UserDocument {
    fn from(u: &User) -> Self {
        UserDocument {
            id: u.id.as_object_id(),
            name: u.name.clone(),
            gender: u.gender.clone(),
            age: u.age,
        }
    }
}

/// A [`DocumentStore`] backed by one pooled [`Client`].
///
/// The client is internally synchronised and cheap to clone, so a single
/// instance serves every request.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    users: Collection<UserDocument>,
    demo: Database,
}

impl MongoStore {
    /// Builds the pooled client and pings the deployment.
    ///
    /// Fails if the URI is invalid or no server answers within
    /// `connect_timeout`; callers treat that as fatal.
    pub async fn connect(settings: &PoolSettings) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(settings.uri.as_str()).await?;
        options.app_name = Some(settings.app_name.clone());
        options.min_pool_size = Some(settings.min_pool_size);
        options.max_pool_size = Some(settings.max_pool_size);
        options.max_idle_time = Some(settings.max_idle_time);
        options.connect_timeout = Some(settings.connect_timeout);
        options.server_selection_timeout = Some(settings.connect_timeout);

        let client = Client::with_options(options)?;
        let store = Self {
            users: client
                .database(&settings.users_database)
                .collection(USERS_COLLECTION),
            demo: client.database(&settings.demo_database),
            client,
        };

        within(settings.connect_timeout, store.ping()).await?;

        info!(
            min_pool = settings.min_pool_size,
            max_pool = settings.max_pool_size,
            max_idle_secs = settings.max_idle_time.as_secs(),
            "connected to mongodb"
        );
        Ok(store)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let docs: Vec<UserDocument> = self.users.find(doc! {}).await?.try_collect().await?;
        Ok(docs.into_iter().map(User::from).collect())
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let found = self
            .users
            .find_one(doc! { "_id": id.as_object_id() })
            .await?;
        Ok(found.map(User::from))
    }

    async fn insert_user(&self, fields: UserFields) -> Result<User, StoreError> {
        let user = User::new(UserId::generate(), fields);
        self.users.insert_one(UserDocument::from(&user)).await?;
        debug!(id = %user.id, "inserted user");
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<bool, StoreError> {
        let update = doc! {
            "$set": {
                "name": user.name.as_str(),
                "gender": user.gender.as_str(),
                "age": user.age,
            }
        };
        let result = self
            .users
            .update_one(doc! { "_id": user.id.as_object_id() }, update)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_user(&self, id: &UserId) -> Result<bool, StoreError> {
        let result = self
            .users
            .delete_one(doc! { "_id": id.as_object_id() })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let n = self
            .demo
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_keeps_native_object_id() {
        let user = User::new(
            UserId::generate(),
            UserFields { name: "Kim".into(), gender: "x".into(), age: 41 },
        );
        let bson = mongodb::bson::to_document(&UserDocument::from(&user)).unwrap();
        assert_eq!(bson.get_object_id("_id").unwrap(), user.id.as_object_id());
        assert_eq!(bson.get_i64("age").unwrap(), 41);
    }

    #[test]
    fn document_tolerates_missing_fields() {
        let oid = ObjectId::new();
        let user: User = mongodb::bson::from_document::<UserDocument>(doc! { "_id": oid })
            .unwrap()
            .into();
        assert_eq!(user.id.as_object_id(), oid);
        assert_eq!(user.fields(), UserFields::default());
    }
}
