use sqlx::SqliteConnection;

use crate::{db_types::Customer, traits::CustomerError};

pub async fn fetch_customer(id: i64, conn: &mut SqliteConnection) -> Result<Option<Customer>, CustomerError> {
    let customer = sqlx::query_as("SELECT * FROM customers WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(customer)
}

pub async fn insert_customer(
    email: Option<&str>,
    name: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Customer, CustomerError> {
    let customer = sqlx::query_as("INSERT INTO customers (email, name) VALUES ($1, $2) RETURNING *")
        .bind(email)
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(customer)
}
