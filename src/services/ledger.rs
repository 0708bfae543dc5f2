//! Payment creation, settlement and income aggregation.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{IncomeReport, Payment};
use crate::ownership;
use crate::repository::payments::{self, NewPayment};
use crate::schemas::CreatePaymentInput;

/// Total of the four charge components, absent charges counting as zero.
/// This is the only place the stored total comes from; any caller-supplied
/// total is ignored.
pub fn charge_total(
    room_fee: Option<Decimal>,
    electricity_fee: Option<Decimal>,
    water_fee: Option<Decimal>,
    other_charges: Option<Decimal>,
) -> Decimal {
    room_fee.unwrap_or_default()
        + electricity_fee.unwrap_or_default()
        + water_fee.unwrap_or_default()
        + other_charges.unwrap_or_default()
}

/// Billing months are keyed to the first day of the month.
pub fn normalize_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn ensure_non_negative(label: &str, charge: Option<Decimal>) -> AppResult<()> {
    if let Some(value) = charge {
        if value < Decimal::ZERO {
            let mut detail = serde_json::Map::new();
            detail.insert(
                label.to_string(),
                serde_json::Value::String("must not be negative".to_string()),
            );
            return Err(AppError::UnprocessableEntity(serde_json::Value::Object(
                detail,
            )));
        }
    }
    Ok(())
}

pub async fn create_payment(
    pool: &PgPool,
    owner_id: Uuid,
    input: &CreatePaymentInput,
) -> AppResult<Payment> {
    let room = ownership::assert_room_owner(pool, input.room_id, owner_id).await?;
    let renter_id = room.renter_id.ok_or_else(|| {
        AppError::Conflict("room has no renter to bill".to_string())
    })?;

    ensure_non_negative("roomFee", input.room_fee)?;
    ensure_non_negative("electricityFee", input.electricity_fee)?;
    ensure_non_negative("waterFee", input.water_fee)?;
    ensure_non_negative("otherCharges", input.other_charges)?;

    let total_amount = charge_total(
        input.room_fee,
        input.electricity_fee,
        input.water_fee,
        input.other_charges,
    );

    // user_id freezes the renter at billing time; a later renter change does
    // not rewrite history.
    payments::insert(
        pool,
        NewPayment {
            room_id: room.id,
            user_id: renter_id,
            payment_month: normalize_month(input.payment_month),
            room_fee: input.room_fee,
            electricity_fee: input.electricity_fee,
            water_fee: input.water_fee,
            other_charges: input.other_charges,
            other_charges_description: input.other_charges_description.as_deref(),
            total_amount,
            qr_code_data: input.qr_code_data.as_deref(),
        },
    )
    .await
}

pub async fn settle_payment(pool: &PgPool, owner_id: Uuid, payment_id: Uuid) -> AppResult<Payment> {
    ownership::assert_payment_owner(pool, payment_id, owner_id).await?;
    payments::mark_paid(pool, payment_id).await
}

pub async fn monthly_income_report(
    pool: &PgPool,
    owner_id: Uuid,
    year: i32,
    month: u32,
) -> AppResult<IncomeReport> {
    let period = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::BadRequest("invalid year or month".to_string()))?;
    let total_income = payments::monthly_income(pool, owner_id, year, month).await?;
    Ok(IncomeReport {
        period,
        total_income,
        period_type: "MONTHLY".to_string(),
    })
}

pub async fn yearly_income_report(
    pool: &PgPool,
    owner_id: Uuid,
    year: i32,
) -> AppResult<IncomeReport> {
    let period = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| AppError::BadRequest("invalid year".to_string()))?;
    let total_income = payments::yearly_income(pool, owner_id, year).await?;
    Ok(IncomeReport {
        period,
        total_income,
        period_type: "YEARLY".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{charge_total, ensure_non_negative, normalize_month};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn totals_present_charges() {
        let total = charge_total(
            Some(Decimal::from(3000)),
            Some(Decimal::from(450)),
            Some(Decimal::from(120)),
            Some(Decimal::from(80)),
        );
        assert_eq!(total, Decimal::from(3650));
    }

    #[test]
    fn absent_charges_count_as_zero() {
        assert_eq!(
            charge_total(Some(Decimal::from(3000)), None, None, None),
            Decimal::from(3000)
        );
        assert_eq!(charge_total(None, None, None, None), Decimal::ZERO);
    }

    #[test]
    fn normalizes_to_first_of_month() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 17).expect("valid date");
        assert_eq!(
            normalize_month(date),
            NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date")
        );
        let first = NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date");
        assert_eq!(normalize_month(first), first);
    }

    #[test]
    fn rejects_negative_charge() {
        assert!(ensure_non_negative("roomFee", Some(Decimal::from(-1))).is_err());
        assert!(ensure_non_negative("roomFee", Some(Decimal::ZERO)).is_ok());
        assert!(ensure_non_negative("roomFee", None).is_ok());
    }
}
