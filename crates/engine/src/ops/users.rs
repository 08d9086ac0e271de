use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Role, User, budgets, categories, expenses, incomes,
    password::{hash_password, verify_password},
    users,
    util::{normalize_email, normalize_name, normalize_optional_text, validate_password},
};

use super::{Engine, UserPatch, with_tx};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 30;

impl Engine {
    /// Create a new account.
    ///
    /// The email is stored lower-cased and must be unique.
    pub async fn register_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        image: Option<&str>,
        role: Role,
    ) -> ResultEngine<User> {
        let first_name = normalize_name(first_name, "first name", NAME_MIN, NAME_MAX)?;
        let last_name = normalize_name(last_name, "last name", NAME_MIN, NAME_MAX)?;
        let email = normalize_email(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;
        let now = Utc::now();

        let user = with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(email));
            }

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                first_name: ActiveValue::Set(first_name),
                last_name: ActiveValue::Set(last_name),
                email: ActiveValue::Set(email.clone()),
                image: ActiveValue::Set(normalize_optional_text(image)),
                password: ActiveValue::Set(password_hash),
                role: ActiveValue::Set(role.as_str().to_string()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            User::try_from(&model)
        })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check an email/password pair and return the matching user.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = email.trim().to_lowercase();
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

        if !verify_password(password, &model.password)? {
            return Err(EngineError::InvalidCredentials);
        }
        User::try_from(&model)
    }

    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            User::try_from(&model)
        })
    }

    /// All registered users, oldest first.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.database)
            .await?
            .iter()
            .map(User::try_from)
            .collect()
    }

    pub async fn update_user(&self, user_id: &str, patch: UserPatch) -> ResultEngine<User> {
        let first_name = patch
            .first_name
            .as_deref()
            .map(|name| normalize_name(name, "first name", NAME_MIN, NAME_MAX))
            .transpose()?;
        let last_name = patch
            .last_name
            .as_deref()
            .map(|name| normalize_name(name, "last name", NAME_MIN, NAME_MAX))
            .transpose()?;
        let password_hash = match patch.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            let mut active: users::ActiveModel = model.into();
            if let Some(first_name) = first_name {
                active.first_name = ActiveValue::Set(first_name);
            }
            if let Some(last_name) = last_name {
                active.last_name = ActiveValue::Set(last_name);
            }
            if let Some(image) = patch.image.as_deref() {
                active.image = ActiveValue::Set(normalize_optional_text(Some(image)));
            }
            if let Some(password_hash) = password_hash {
                active.password = ActiveValue::Set(password_hash);
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            User::try_from(&model)
        })
    }

    /// Delete a user together with every record they own.
    pub async fn delete_user(&self, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            expenses::Entity::delete_many()
                .filter(expenses::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            incomes::Entity::delete_many()
                .filter(incomes::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_many()
                .filter(budgets::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_many()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
