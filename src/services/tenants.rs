//! Tenancy snapshots for the owner dashboard.
//!
//! Everything here is derived read-side from the room and its payment
//! history; nothing is written back.

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Payment, PaymentStatus, RoomStatus, RoomView, TenantSnapshot};
use crate::repository::{payments, rooms, users};

/// How long a PENDING payment may sit before the tenant shows as OVERDUE.
const OVERDUE_AFTER_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct TenancyDerivation {
    pub last_payment_date: Option<DateTime<Utc>>,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub payment_status: String,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
}

/// Derives a tenant's ledger position from the room's payment history.
///
/// `history` must be ordered newest billing month first (creation time as
/// tiebreak), the order `payments::list_for_room` returns. The "last payment"
/// is the most recent record by billing month, whatever its status; total
/// paid sums every PAID record ever, so outstanding can go negative when a
/// tenant has paid ahead.
pub fn derive_tenancy(
    monthly_rent: Decimal,
    history: &[Payment],
    now: DateTime<Utc>,
) -> TenancyDerivation {
    let Some(latest) = history.first() else {
        return TenancyDerivation {
            last_payment_date: None,
            next_payment_date: None,
            payment_status: "UNPAID".to_string(),
            total_paid: Decimal::ZERO,
            outstanding: monthly_rent,
        };
    };

    let total_paid: Decimal = history
        .iter()
        .filter(|payment| payment.status == PaymentStatus::Paid)
        .map(|payment| payment.total_amount)
        .sum();

    let payment_status = if latest.status == PaymentStatus::Paid {
        "PAID"
    } else if now.signed_duration_since(latest.created_at) > chrono::Duration::days(OVERDUE_AFTER_DAYS)
    {
        "OVERDUE"
    } else {
        "PENDING"
    };

    let last_payment_date = Some(latest.created_at);
    let next_payment_date = latest.created_at.checked_add_months(Months::new(1));

    TenancyDerivation {
        last_payment_date,
        next_payment_date,
        payment_status: payment_status.to_string(),
        total_paid,
        outstanding: monthly_rent - total_paid,
    }
}

/// Placeholder snapshot for a room that has a booking trace but no renter
/// link anymore. Unreachable while renters are cleared together with
/// `booked_at`, but the dashboard keeps the row rather than dropping the
/// room silently if data ever ends up in that shape.
pub fn former_tenant_snapshot(room: &RoomView, now: DateTime<Utc>) -> TenantSnapshot {
    TenantSnapshot {
        tenant_id: room.room.id,
        username: format!("former_tenant_{}", room.room.id),
        full_name: Some("Former Tenant".to_string()),
        email: "N/A".to_string(),
        phone: Some("N/A".to_string()),
        room_id: room.room.id,
        room_number: room.room.room_number.clone(),
        renthouse_name: room.renthouse_name.clone(),
        monthly_rent: room.room.monthly_rent,
        move_in_date: room
            .room
            .booked_at
            .map(|at| at.date_naive())
            .unwrap_or_else(|| now.date_naive()),
        last_payment_date: None,
        next_payment_date: None,
        payment_status: "UNPAID".to_string(),
        total_paid: Decimal::ZERO,
        outstanding_amount: room.room.monthly_rent,
        is_active: false,
    }
}

/// One snapshot per rented room in the owner's portfolio. Runs one payment
/// lookup per room; fine at per-owner portfolio sizes, revisit if owners
/// grow past a few hundred rooms.
pub async fn tenants_for_owner(pool: &PgPool, owner_id: Uuid) -> AppResult<Vec<TenantSnapshot>> {
    let now = Utc::now();
    let portfolio = rooms::list_for_owner(pool, owner_id).await?;

    let mut snapshots = Vec::new();
    for room in &portfolio {
        let renter_id = match (room.room.renter_id, room.room.booked_at) {
            (Some(renter_id), _) => renter_id,
            (None, Some(_)) => {
                snapshots.push(former_tenant_snapshot(room, now));
                continue;
            }
            (None, None) => continue,
        };

        let Some(renter) = users::find_by_id(pool, renter_id).await? else {
            continue;
        };
        let history = payments::list_for_room(pool, room.room.id).await?;
        let derived = derive_tenancy(room.room.monthly_rent, &history, now);

        snapshots.push(TenantSnapshot {
            tenant_id: renter.id,
            username: renter.username,
            full_name: renter.full_name,
            email: renter.email,
            phone: renter.phone,
            room_id: room.room.id,
            room_number: room.room.room_number.clone(),
            renthouse_name: room.renthouse_name.clone(),
            monthly_rent: room.room.monthly_rent,
            move_in_date: room
                .room
                .booked_at
                .map(|at| at.date_naive())
                .unwrap_or_else(|| now.date_naive()),
            last_payment_date: derived.last_payment_date,
            next_payment_date: derived.next_payment_date,
            payment_status: derived.payment_status,
            total_paid: derived.total_paid,
            outstanding_amount: derived.outstanding,
            is_active: room.room.status == RoomStatus::Occupied,
        });
    }
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::{derive_tenancy, former_tenant_snapshot};
    use crate::models::{Payment, PaymentStatus, Room, RoomStatus, RoomView};
    use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn payment(
        month: NaiveDate,
        total: Decimal,
        status: PaymentStatus,
        created_at: DateTime<Utc>,
    ) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            payment_month: month,
            room_fee: Some(total),
            electricity_fee: None,
            water_fee: None,
            other_charges: None,
            other_charges_description: None,
            total_amount: total,
            status,
            qr_code_data: None,
            paid_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn month(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).expect("valid date")
    }

    #[test]
    fn empty_history_is_unpaid_for_full_rent() {
        let derived = derive_tenancy(Decimal::from(800), &[], Utc::now());
        assert_eq!(derived.payment_status, "UNPAID");
        assert_eq!(derived.total_paid, Decimal::ZERO);
        assert_eq!(derived.outstanding, Decimal::from(800));
        assert!(derived.last_payment_date.is_none());
        assert!(derived.next_payment_date.is_none());
    }

    #[test]
    fn latest_paid_settles_the_tenant() {
        let now = Utc::now();
        let history = vec![payment(
            month(2026, 8),
            Decimal::from(750),
            PaymentStatus::Paid,
            now - Duration::days(3),
        )];
        let derived = derive_tenancy(Decimal::from(800), &history, now);
        assert_eq!(derived.payment_status, "PAID");
        assert_eq!(derived.total_paid, Decimal::from(750));
        assert_eq!(derived.outstanding, Decimal::from(50));
    }

    #[test]
    fn overpayment_goes_negative() {
        let now = Utc::now();
        let history = vec![payment(
            month(2026, 8),
            Decimal::from(850),
            PaymentStatus::Paid,
            now - Duration::days(3),
        )];
        let derived = derive_tenancy(Decimal::from(800), &history, now);
        assert_eq!(derived.payment_status, "PAID");
        assert_eq!(derived.outstanding, Decimal::from(-50));
    }

    #[test]
    fn stale_pending_becomes_overdue() {
        let now = Utc::now();
        let history = vec![payment(
            month(2026, 7),
            Decimal::from(800),
            PaymentStatus::Pending,
            now - Duration::days(40),
        )];
        let derived = derive_tenancy(Decimal::from(800), &history, now);
        assert_eq!(derived.payment_status, "OVERDUE");
    }

    #[test]
    fn fresh_pending_stays_pending() {
        let now = Utc::now();
        let history = vec![payment(
            month(2026, 8),
            Decimal::from(800),
            PaymentStatus::Pending,
            now - Duration::days(5),
        )];
        let derived = derive_tenancy(Decimal::from(800), &history, now);
        assert_eq!(derived.payment_status, "PENDING");
        assert_eq!(derived.total_paid, Decimal::ZERO);
    }

    #[test]
    fn total_paid_spans_all_history_but_status_follows_latest() {
        let now = Utc::now();
        let history = vec![
            payment(
                month(2026, 8),
                Decimal::from(800),
                PaymentStatus::Pending,
                now - Duration::days(2),
            ),
            payment(
                month(2026, 7),
                Decimal::from(800),
                PaymentStatus::Paid,
                now - Duration::days(32),
            ),
            payment(
                month(2026, 6),
                Decimal::from(800),
                PaymentStatus::Paid,
                now - Duration::days(62),
            ),
        ];
        let derived = derive_tenancy(Decimal::from(800), &history, now);
        assert_eq!(derived.payment_status, "PENDING");
        assert_eq!(derived.total_paid, Decimal::from(1600));
        assert_eq!(derived.outstanding, Decimal::from(-800));
    }

    #[test]
    fn next_payment_is_one_calendar_month_after_last() {
        let now = Utc::now();
        let created = now - Duration::days(10);
        let history = vec![payment(
            month(2026, 8),
            Decimal::from(800),
            PaymentStatus::Paid,
            created,
        )];
        let derived = derive_tenancy(Decimal::from(800), &history, now);
        assert_eq!(derived.last_payment_date, Some(created));
        assert_eq!(
            derived.next_payment_date,
            created.checked_add_months(Months::new(1))
        );
    }

    #[test]
    fn former_tenant_placeholder_carries_room_identity() {
        let now = Utc::now();
        let room_id = Uuid::new_v4();
        let view = RoomView {
            room: Room {
                id: room_id,
                floor_id: Uuid::new_v4(),
                room_number: "203".to_string(),
                description: None,
                monthly_rent: Decimal::from(800),
                deposit: None,
                status: RoomStatus::Available,
                renter_id: None,
                booked_at: Some(now - Duration::days(90)),
                created_at: now - Duration::days(120),
                updated_at: now,
            },
            floor_number: 2,
            renthouse_id: Uuid::new_v4(),
            renthouse_name: "Baan Suan".to_string(),
            renter_username: None,
        };
        let snapshot = former_tenant_snapshot(&view, now);
        assert_eq!(snapshot.tenant_id, room_id);
        assert_eq!(snapshot.username, format!("former_tenant_{room_id}"));
        assert_eq!(snapshot.payment_status, "UNPAID");
        assert_eq!(snapshot.outstanding_amount, Decimal::from(800));
        assert_eq!(snapshot.total_paid, Decimal::ZERO);
        assert!(!snapshot.is_active);
        assert_eq!(
            snapshot.move_in_date,
            (now - Duration::days(90)).date_naive()
        );
    }
}
