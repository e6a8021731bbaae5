use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::{StoreError, UserStore};
use crate::models::{NewUser, User};

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    password: String,
    age: i32,
    gender: String,
    nickname: String,
    creator: String,
    modifier: String,
    create_time: DateTime<Utc>,
    modify_time: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let gender = row
            .gender
            .parse()
            .map_err(|e| StoreError::InvalidRow(format!("user {}: {}", row.name, e)))?;

        Ok(User {
            id: row.id,
            name: row.name,
            password: row.password,
            age: row.age,
            gender,
            nickname: row.nickname,
            creator: row.creator,
            modifier: row.modifier,
            created_at: row.create_time,
            updated_at: row.modify_time,
        })
    }
}

/// 基于 Postgres 的用户存储库
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, password, age, gender, nickname,
                   creator, modifier, create_time, modify_time
            FROM users
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("find_by_name failed for {}: {:?}", name, e);
            e
        })?;

        row.map(User::try_from).transpose()
    }

    async fn create(&self, user: &NewUser) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, password, age, gender, nickname, creator, modifier)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, name, password, age, gender, nickname,
                      creator, modifier, create_time, modify_time
            "#,
        )
        .bind(&user.name)
        .bind(&user.password)
        .bind(user.age)
        .bind(user.gender.as_str())
        .bind(&user.nickname)
        .bind(user.creator())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                tracing::info!("Created user: {}", row.name);
                User::try_from(row)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Duplicate(user.name.clone()))
            }
            Err(e) => {
                tracing::error!("Failed to create user {}: {:?}", user.name, e);
                Err(e.into())
            }
        }
    }

    async fn update_nickname(
        &self,
        name: &str,
        nickname: &str,
        modifier: &str,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET nickname = $1, modifier = $2, modify_time = NOW()
            WHERE name = $3
            "#,
        )
        .bind(nickname)
        .bind(modifier)
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
