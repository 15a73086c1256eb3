use time::OffsetDateTime;

use crate::{
    auth::repo_types::{NewUser, User, UsersDocument},
    error::{AppError, Result},
    storage::Collection,
};

pub type Users = Collection<UsersDocument>;

impl User {
    /// Find a user by email, ignoring case.
    pub async fn find_by_email(users: &Users, email: &str) -> Option<User> {
        users
            .read()
            .await
            .users
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub async fn find_by_id(users: &Users, id: u64) -> Option<User> {
        users.read().await.users.into_iter().find(|u| u.id == id)
    }

    /// Insert a user. The email check and the append run under one lock, so
    /// two concurrent signups for the same address cannot both succeed.
    pub async fn create(users: &Users, new: NewUser) -> Result<User> {
        users
            .mutate(move |doc| {
                if doc
                    .users
                    .iter()
                    .any(|u| u.email.eq_ignore_ascii_case(&new.email))
                {
                    return Err(AppError::Conflict(
                        "User with this email already exists".into(),
                    ));
                }

                let user = User {
                    id: doc.users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
                    first_name: new.first_name,
                    last_name: new.last_name,
                    email: new.email,
                    date_of_birth: new.date_of_birth,
                    password_hash: new.password_hash,
                    created_at: OffsetDateTime::now_utc(),
                };
                doc.users.push(user.clone());
                Ok(user)
            })
            .await
    }
}
