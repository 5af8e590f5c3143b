//! bcrypt runs on the blocking pool so it never stalls the async workers.

use super::AuthError;

#[cfg(not(test))]
const COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const COST: u32 = 4;

pub async fn hash_password(password: String) -> Result<String, AuthError> {
    Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, COST)).await??)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
}
