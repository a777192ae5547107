use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Employee,
    Hr,
    Superadmin,
}

impl Role {
    pub fn is_hr_or_admin(self) -> bool {
        matches!(self, Role::Hr | Role::Superadmin)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Superadmin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub department: Option<String>,
    pub position: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub department: Option<&'a str>,
    pub position: Option<&'a str>,
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, department, position, is_active, created_at, updated_at";

pub async fn insert(db: &PgPool, new: NewUser<'_>) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (name, email, password_hash, role, department, position)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(new.name)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.role)
    .bind(new.department)
    .bind(new.position)
    .fetch_one(db)
    .await?;
    Ok(user)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"SELECT {USER_COLUMNS} FROM users WHERE id = $1"#
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"SELECT {USER_COLUMNS} FROM users WHERE email = $1"#
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(&format!(
        r#"SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"#
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn search_by_name(db: &PgPool, keyword: &str) -> anyhow::Result<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE name ILIKE '%' || $1 || '%'
        ORDER BY name
        "#
    ))
    .bind(keyword)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_employees_by_department(
    db: &PgPool,
    department: &str,
) -> anyhow::Result<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE role = 'EMPLOYEE' AND is_active AND department = $1
        ORDER BY name
        "#
    ))
    .bind(department)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_employees_without_department(db: &PgPool) -> anyhow::Result<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE role = 'EMPLOYEE' AND is_active AND department IS NULL
        ORDER BY name
        "#
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_active_employees(db: &PgPool) -> anyhow::Result<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE role = 'EMPLOYEE' AND is_active
        ORDER BY name
        "#
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Receivers of bad-mood alerts.
pub async fn list_active_hr(db: &PgPool) -> anyhow::Result<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(&format!(
        r#"SELECT {USER_COLUMNS} FROM users WHERE role = 'HR' AND is_active"#
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn distinct_departments(db: &PgPool) -> anyhow::Result<Vec<String>> {
    let rows = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT department
        FROM users
        WHERE department IS NOT NULL
        ORDER BY department
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn update_profile(
    db: &PgPool,
    id: Uuid,
    name: &str,
    email: &str,
    position: Option<&str>,
) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET name = $2, email = $3, position = $4, updated_at = now()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(position)
    .fetch_one(db)
    .await?;
    Ok(user)
}

pub async fn set_active(db: &PgPool, id: Uuid, active: bool) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET is_active = $2, updated_at = now()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(active)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn assign_department(
    db: &PgPool,
    id: Uuid,
    department: &str,
) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET department = $2, updated_at = now()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(department)
    .fetch_optional(db)
    .await?;
    Ok(user)
}
