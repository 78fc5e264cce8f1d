//! CRUD handlers for `/user` and `/users`.
//!
//! Each handler makes exactly one store call under the request deadline.
//! A malformed id and a missing user both answer `404`. A store failure,
//! including an elapsed deadline, answers `404` on single-user reads and
//! deletes and `500` everywhere else.

use std::sync::Arc;

use tracing::{error, warn};

use super::AppState;
use crate::model::{User, UserFields, UserId};
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;
use crate::store::{StoreError, within};

/// Parses the `{id}` path parameter.
fn path_id(req: &Request) -> Option<UserId> {
    req.param("id")?.parse().ok()
}

fn store_failure(op: &str, e: &StoreError) -> Response {
    error!("{op} failed: {e}");
    Response::status(Status::InternalServerError)
}

/// Lookups by id report an unreachable user the same way as an absent one.
fn lookup_failure(op: &str, e: &StoreError) -> Response {
    error!("{op} failed: {e}");
    Response::status(Status::NotFound)
}

// GET /users
pub async fn list_users(state: Arc<AppState>, _req: Request) -> Response {
    match within(state.request_timeout, state.store.list_users()).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => store_failure("list users", &e),
    }
}

// GET /user/{id}
pub async fn get_user(state: Arc<AppState>, req: Request) -> Response {
    let Some(id) = path_id(&req) else {
        return Response::status(Status::NotFound);
    };

    match within(state.request_timeout, state.store.find_user(&id)).await {
        Ok(Some(user)) => Json(user).into_response(),
        Ok(None) => Response::status(Status::NotFound),
        Err(e) => lookup_failure("find user", &e),
    }
}

// POST /user
//
// An undecodable body is not rejected: the user is created with zero-valued
// fields.
pub async fn create_user(state: Arc<AppState>, req: Request) -> Response {
    let fields = req.json::<UserFields>().unwrap_or_else(|e| {
        warn!("create user: ignoring undecodable body: {e}");
        UserFields::default()
    });

    match within(state.request_timeout, state.store.insert_user(fields)).await {
        Ok(user) => Response::builder()
            .status(Status::Created)
            .header("location", &format!("/user/{}", user.id))
            .serialize(&user),
        Err(e) => store_failure("insert user", &e),
    }
}

// PUT /user/{id}
//
// Replaces every settable field; fields absent from the body are reset to
// their zero value. The id always comes from the path.
pub async fn update_user(state: Arc<AppState>, req: Request) -> Response {
    let Some(id) = path_id(&req) else {
        return Response::status(Status::NotFound);
    };

    let fields = match req.json::<UserFields>() {
        Ok(fields) => fields,
        Err(e) => {
            warn!(%id, "update user: bad body: {e}");
            return Response::status(Status::BadRequest);
        }
    };

    let user = User::new(id, fields);
    match within(state.request_timeout, state.store.update_user(&user)).await {
        Ok(true) => Json(user).into_response(),
        Ok(false) => Response::status(Status::NotFound),
        Err(e) => store_failure("update user", &e),
    }
}

// DELETE /user/{id}
pub async fn delete_user(state: Arc<AppState>, req: Request) -> Response {
    let Some(id) = path_id(&req) else {
        return Response::status(Status::NotFound);
    };

    match within(state.request_timeout, state.store.delete_user(&id)).await {
        Ok(true) => Response::text(format!("Deleted user {id}\n")),
        Ok(false) => Response::status(Status::NotFound),
        Err(e) => lookup_failure("delete user", &e),
    }
}
