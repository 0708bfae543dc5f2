use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Payment, PaymentStatus, PaymentView};

const PAYMENT_VIEW_SELECT: &str = "SELECT p.*, r.room_number, h.name AS renthouse_name,
        u.username AS renter_username
     FROM payments p
     JOIN rooms r ON r.id = p.room_id
     JOIN floors f ON f.id = r.floor_id
     JOIN renthouses h ON h.id = f.renthouse_id
     JOIN users u ON u.id = p.user_id";

pub struct NewPayment<'a> {
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub payment_month: NaiveDate,
    pub room_fee: Option<Decimal>,
    pub electricity_fee: Option<Decimal>,
    pub water_fee: Option<Decimal>,
    pub other_charges: Option<Decimal>,
    pub other_charges_description: Option<&'a str>,
    pub total_amount: Decimal,
    pub qr_code_data: Option<&'a str>,
}

pub async fn insert(pool: &PgPool, new_payment: NewPayment<'_>) -> AppResult<Payment> {
    let payment = sqlx::query_as::<_, Payment>(
        "INSERT INTO payments
            (room_id, user_id, payment_month, room_fee, electricity_fee, water_fee,
             other_charges, other_charges_description, total_amount, qr_code_data)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING *",
    )
    .bind(new_payment.room_id)
    .bind(new_payment.user_id)
    .bind(new_payment.payment_month)
    .bind(new_payment.room_fee)
    .bind(new_payment.electricity_fee)
    .bind(new_payment.water_fee)
    .bind(new_payment.other_charges)
    .bind(new_payment.other_charges_description)
    .bind(new_payment.total_amount)
    .bind(new_payment.qr_code_data)
    .fetch_one(pool)
    .await?;
    Ok(payment)
}

/// Marks a payment PAID and stamps `paid_at`. Calling this on an already-paid
/// payment refreshes the stamp; that matches the historical behavior and is
/// kept deliberately.
pub async fn mark_paid(pool: &PgPool, payment_id: Uuid) -> AppResult<Payment> {
    let payment = sqlx::query_as::<_, Payment>(
        "UPDATE payments
         SET status = 'PAID', paid_at = NOW(), updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(payment_id)
    .fetch_one(pool)
    .await?;
    Ok(payment)
}

/// History for one room, newest billing month first. Creation time breaks
/// ties within a month.
pub async fn list_for_room(pool: &PgPool, room_id: Uuid) -> AppResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments
         WHERE room_id = $1
         ORDER BY payment_month DESC, created_at DESC",
    )
    .bind(room_id)
    .fetch_all(pool)
    .await?;
    Ok(payments)
}

pub async fn list_for_owner(pool: &PgPool, owner_id: Uuid) -> AppResult<Vec<PaymentView>> {
    let sql = format!("{PAYMENT_VIEW_SELECT} WHERE h.owner_id = $1 ORDER BY p.created_at DESC");
    let payments = sqlx::query_as::<_, PaymentView>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;
    Ok(payments)
}

pub async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<PaymentStatus>,
) -> AppResult<Vec<Payment>> {
    let payments = match status {
        Some(status) => {
            sqlx::query_as::<_, Payment>(
                "SELECT * FROM payments
                 WHERE user_id = $1 AND status = $2
                 ORDER BY payment_month DESC, created_at DESC",
            )
            .bind(user_id)
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Payment>(
                "SELECT * FROM payments
                 WHERE user_id = $1
                 ORDER BY payment_month DESC, created_at DESC",
            )
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(payments)
}

/// Unsettled payments for a tenant, oldest month first so the next one due
/// comes on top.
pub async fn pending_for_user(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments
         WHERE user_id = $1 AND status IN ('PENDING', 'OVERDUE')
         ORDER BY payment_month ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(payments)
}

pub async fn monthly_income(
    pool: &PgPool,
    owner_id: Uuid,
    year: i32,
    month: u32,
) -> AppResult<Decimal> {
    let total = sqlx::query_scalar::<_, Decimal>(
        "SELECT COALESCE(SUM(p.total_amount), 0)
         FROM payments p
         JOIN rooms r ON r.id = p.room_id
         JOIN floors f ON f.id = r.floor_id
         JOIN renthouses h ON h.id = f.renthouse_id
         WHERE h.owner_id = $1
           AND p.status = 'PAID'
           AND EXTRACT(YEAR FROM p.payment_month) = $2
           AND EXTRACT(MONTH FROM p.payment_month) = $3",
    )
    .bind(owner_id)
    .bind(year)
    .bind(month as i32)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

pub async fn yearly_income(pool: &PgPool, owner_id: Uuid, year: i32) -> AppResult<Decimal> {
    let total = sqlx::query_scalar::<_, Decimal>(
        "SELECT COALESCE(SUM(p.total_amount), 0)
         FROM payments p
         JOIN rooms r ON r.id = p.room_id
         JOIN floors f ON f.id = r.floor_id
         JOIN renthouses h ON h.id = f.renthouse_id
         WHERE h.owner_id = $1
           AND p.status = 'PAID'
           AND EXTRACT(YEAR FROM p.payment_month) = $2",
    )
    .bind(owner_id)
    .bind(year)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

/// PAID income per calendar month of one year. Months without payments are
/// absent; callers zero-fill.
pub async fn monthly_income_series(
    pool: &PgPool,
    owner_id: Uuid,
    year: i32,
) -> AppResult<Vec<(i32, Decimal)>> {
    let rows = sqlx::query_as::<_, (i32, Decimal)>(
        "SELECT EXTRACT(MONTH FROM p.payment_month)::int AS month,
                COALESCE(SUM(p.total_amount), 0) AS income
         FROM payments p
         JOIN rooms r ON r.id = p.room_id
         JOIN floors f ON f.id = r.floor_id
         JOIN renthouses h ON h.id = f.renthouse_id
         WHERE h.owner_id = $1
           AND p.status = 'PAID'
           AND EXTRACT(YEAR FROM p.payment_month) = $2
         GROUP BY month
         ORDER BY month",
    )
    .bind(owner_id)
    .bind(year)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn pending_count_for_owner(pool: &PgPool, owner_id: Uuid) -> AppResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM payments p
         JOIN rooms r ON r.id = p.room_id
         JOIN floors f ON f.id = r.floor_id
         JOIN renthouses h ON h.id = f.renthouse_id
         WHERE h.owner_id = $1 AND p.status <> 'PAID'",
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}
