use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{UserInput, UserView};
use crate::models::user::{NewUserRow, UserChangeset, UserRow};
use crate::schema::users;

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_view(row: UserRow) -> UserView {
    UserView {
        id: row.id,
        username: row.username,
        password: row.password,
        email: row.email,
        created_at: row.created_at,
    }
}

impl UserRepository for DieselUserRepository {
    fn create(&self, input: UserInput) -> Result<UserView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                username: input.username,
                password: input.password,
                email: input.email,
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)?;

        Ok(to_view(row))
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<UserView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = users::table
            .filter(users::id.eq(id))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(to_view))
    }

    fn find_all(&self) -> Result<Vec<UserView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = users::table
            .select(UserRow::as_select())
            .order(users::created_at.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(to_view).collect())
    }

    fn update(&self, user: UserView) -> Result<UserView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::update(users::table.find(user.id))
            .set(&UserChangeset {
                username: user.username,
                password: user.password,
                email: user.email,
                updated_at: Utc::now(),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)?;

        Ok(to_view(row))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(users::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
