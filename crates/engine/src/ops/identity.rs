use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AuthEvent, AuthSession, EngineError, ResultEngine, User, auth_tokens,
    identity::{hash_password, new_salt, new_token, validate_password},
    users,
    util::normalize_email,
};

use super::{Engine, with_tx};

impl Engine {
    /// Registers a new user and signs them in.
    pub async fn sign_up(&self, email: &str, password: &str) -> ResultEngine<AuthSession> {
        let email = normalize_email(email)?;
        validate_password(password)?;

        let auth = with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(email));
            }

            let salt = new_salt();
            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                email: ActiveValue::Set(email.clone()),
                password_hash: ActiveValue::Set(hash_password(&salt, password)),
                password_salt: ActiveValue::Set(salt),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            let user = User::try_from(model)?;
            let token = self.issue_token(&db_tx, &user).await?;
            Ok::<_, EngineError>(AuthSession { token, user })
        })?;

        tracing::info!("user {} signed up", auth.user.email);
        self.publish(AuthEvent::SignedIn(auth.user.clone()));
        Ok(auth)
    }

    /// Checks the credentials and issues a new bearer token.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn sign_in(&self, email: &str, password: &str) -> ResultEngine<AuthSession> {
        let invalid = || EngineError::Unauthorized("invalid email or password".to_string());
        let email = normalize_email(email).map_err(|_| invalid())?;

        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(invalid)?;
        if hash_password(&model.password_salt, password) != model.password_hash {
            return Err(invalid());
        }

        let user = User::try_from(model)?;
        let token = self.issue_token(&self.database, &user).await?;
        tracing::info!("user {} signed in", user.email);
        self.publish(AuthEvent::SignedIn(user.clone()));
        Ok(AuthSession { token, user })
    }

    /// Revokes a bearer token. Unknown tokens are ignored.
    pub async fn sign_out(&self, token: &str) -> ResultEngine<()> {
        let Some(user) = self.current_user(token).await? else {
            return Ok(());
        };
        auth_tokens::Entity::delete_by_id(token.to_string())
            .exec(&self.database)
            .await?;
        tracing::info!("user {} signed out", user.email);
        self.publish(AuthEvent::SignedOut(user));
        Ok(())
    }

    /// The user a bearer token belongs to, if the token is still valid.
    pub async fn current_user(&self, token: &str) -> ResultEngine<Option<User>> {
        let found = auth_tokens::Entity::find_by_id(token.to_string())
            .find_also_related(users::Entity)
            .one(&self.database)
            .await?;
        match found {
            Some((_, Some(user))) => Ok(Some(User::try_from(user)?)),
            _ => Ok(None),
        }
    }

    /// Looks a user up by email, for administrative tooling.
    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.database)
            .await?
            .ok_or(EngineError::KeyNotFound(email))?;
        User::try_from(model)
    }

    async fn issue_token<C: ConnectionTrait>(&self, db: &C, user: &User) -> ResultEngine<String> {
        let token = new_token();
        auth_tokens::ActiveModel {
            token: ActiveValue::Set(token.clone()),
            user_id: ActiveValue::Set(user.id.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?;
        Ok(token)
    }
}
