use std::sync::Arc;

use tracing::info;

use crate::auth::CredentialGateway;
use crate::database::models::{UserRecord, USER_COLLECTION};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::Filter;
use crate::state::AppState;

pub struct AuthService {
    users: Repository<UserRecord>,
    gateway: Arc<CredentialGateway>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: Repository::new(USER_COLLECTION, state.db.clone()),
            gateway: state.gateway.clone(),
            bcrypt_cost: state.config.security.bcrypt_cost,
        }
    }

    /// Check the password of a known user, or register an unknown one.
    /// Either way, returns a fresh token for `user`.
    pub async fn login(&self, user: &str, password: &str) -> Result<String, ApiError> {
        let by_user = Filter::all().eq("user", user);

        match self.users.find_one(&by_user).await {
            Some(record) => {
                info!("User found, checking password...");
                if !verify_password(password, &record.password).await? {
                    return Err(ApiError::bad_request("Incorrect password"));
                }
            }
            None => {
                info!("User not found... creating");
                let hash = hash_password(password, self.bcrypt_cost).await?;
                self.users
                    .insert_one(&UserRecord::new(user, hash))
                    .await
                    .ok_or_else(|| ApiError::internal_server_error("Failed to create user"))?;
            }
        }

        Ok(self.gateway.issue_token(user)?)
    }
}

// bcrypt runs on the blocking pool
async fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    let password = password.to_owned();
    Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
}

async fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
}
