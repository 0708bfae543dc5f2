use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::UserRole;

pub fn validate_input<T: Validate>(input: &T) -> AppResult<()> {
    input.validate().map_err(|errors| {
        AppError::UnprocessableEntity(
            serde_json::to_value(&errors).unwrap_or_else(|_| json!("invalid input")),
        )
    })
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRenthouseInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub base_rent: Option<Decimal>,
    pub water_fee: Option<Decimal>,
    pub electricity_fee: Option<Decimal>,
    pub image_url: Option<String>,
    pub qr_code_image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRenthouseInput {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub address: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub base_rent: Option<Decimal>,
    pub water_fee: Option<Decimal>,
    pub electricity_fee: Option<Decimal>,
    pub image_url: Option<String>,
    pub qr_code_image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFloorInput {
    pub floor_number: Option<i32>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomInput {
    pub room_number: Option<String>,
    pub description: Option<String>,
    pub monthly_rent: Decimal,
    pub deposit: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomInput {
    pub room_number: Option<String>,
    pub description: Option<String>,
    pub monthly_rent: Option<Decimal>,
    pub deposit: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentInput {
    pub room_id: Uuid,
    pub payment_month: NaiveDate,
    pub room_fee: Option<Decimal>,
    pub electricity_fee: Option<Decimal>,
    pub water_fee: Option<Decimal>,
    pub other_charges: Option<Decimal>,
    pub other_charges_description: Option<String>,
    pub qr_code_data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdPath {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RoomIdPath {
    pub room_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyIncomeQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize)]
pub struct YearlyIncomeQuery {
    pub year: i32,
}

#[derive(Debug, Deserialize)]
pub struct RoomSearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseSearchQuery {
    pub q: Option<String>,
    pub min_rent: Option<Decimal>,
    pub max_rent: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    pub status: Option<crate::models::PaymentStatus>,
}

#[cfg(test)]
mod tests {
    use super::{validate_input, RegisterInput};

    #[test]
    fn rejects_short_username_and_bad_email() {
        let input = RegisterInput {
            username: "ab".to_string(),
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
            full_name: None,
            phone: None,
            role: None,
        };
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn accepts_valid_registration() {
        let input = RegisterInput {
            username: "somchai".to_string(),
            email: "somchai@example.com".to_string(),
            password: "secret1".to_string(),
            full_name: Some("Somchai J.".to_string()),
            phone: None,
            role: None,
        };
        assert!(validate_input(&input).is_ok());
    }
}
