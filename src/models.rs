use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Owner,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "room_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RoomStatus {
    Available,
    Booked,
    Occupied,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "payment_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Renthouse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub base_rent: Option<Decimal>,
    pub water_fee: Option<Decimal>,
    pub electricity_fee: Option<Decimal>,
    pub image_url: Option<String>,
    pub qr_code_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Renthouse row plus the haversine distance computed in SQL.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRenthouse {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub renthouse: Renthouse,
    pub distance_km: f64,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub id: Uuid,
    pub renthouse_id: Uuid,
    pub floor_number: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub floor_id: Uuid,
    pub room_number: String,
    pub description: Option<String>,
    pub monthly_rent: Decimal,
    pub deposit: Option<Decimal>,
    pub status: RoomStatus,
    pub renter_id: Option<Uuid>,
    pub booked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Room joined with its floor, renthouse and (optional) renter. This is the
/// shape most listing endpoints return, so callers see where a room sits
/// without extra lookups.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub room: Room,
    pub floor_number: i32,
    pub renthouse_id: Uuid,
    pub renthouse_name: String,
    pub renter_username: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub payment_month: NaiveDate,
    pub room_fee: Option<Decimal>,
    pub electricity_fee: Option<Decimal>,
    pub water_fee: Option<Decimal>,
    pub other_charges: Option<Decimal>,
    pub other_charges_description: Option<String>,
    pub total_amount: Decimal,
    pub status: PaymentStatus,
    pub qr_code_data: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub payment: Payment,
    pub room_number: String,
    pub renthouse_name: String,
    pub renter_username: String,
}

/// Per-room tenancy snapshot for the owner dashboard, derived from the
/// room's payment history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSnapshot {
    pub tenant_id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub room_id: Uuid,
    pub room_number: String,
    pub renthouse_name: String,
    pub monthly_rent: Decimal,
    pub move_in_date: NaiveDate,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub payment_status: String,
    pub total_paid: Decimal,
    pub outstanding_amount: Decimal,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeReport {
    pub period: NaiveDate,
    pub total_income: Decimal,
    pub period_type: String,
}
