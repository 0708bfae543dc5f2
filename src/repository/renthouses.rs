use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{NearbyRenthouse, Renthouse};
use crate::schemas::{CreateRenthouseInput, UpdateRenthouseInput};

pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> AppResult<Vec<Renthouse>> {
    let rows = sqlx::query_as::<_, Renthouse>(
        "SELECT * FROM renthouses WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<Renthouse>> {
    let row = sqlx::query_as::<_, Renthouse>("SELECT * FROM renthouses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn insert(
    pool: &PgPool,
    owner_id: Uuid,
    input: &CreateRenthouseInput,
) -> AppResult<Renthouse> {
    let row = sqlx::query_as::<_, Renthouse>(
        "INSERT INTO renthouses
            (owner_id, name, address, description, latitude, longitude,
             base_rent, water_fee, electricity_fee, image_url, qr_code_image)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING *",
    )
    .bind(owner_id)
    .bind(&input.name)
    .bind(&input.address)
    .bind(&input.description)
    .bind(input.latitude)
    .bind(input.longitude)
    .bind(input.base_rent)
    .bind(input.water_fee)
    .bind(input.electricity_fee)
    .bind(&input.image_url)
    .bind(&input.qr_code_image)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateRenthouseInput) -> AppResult<Renthouse> {
    let row = sqlx::query_as::<_, Renthouse>(
        "UPDATE renthouses SET
            name = COALESCE($2, name),
            address = COALESCE($3, address),
            description = COALESCE($4, description),
            latitude = COALESCE($5, latitude),
            longitude = COALESCE($6, longitude),
            base_rent = COALESCE($7, base_rent),
            water_fee = COALESCE($8, water_fee),
            electricity_fee = COALESCE($9, electricity_fee),
            image_url = COALESCE($10, image_url),
            qr_code_image = COALESCE($11, qr_code_image),
            updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&input.name)
    .bind(&input.address)
    .bind(&input.description)
    .bind(input.latitude)
    .bind(input.longitude)
    .bind(input.base_rent)
    .bind(input.water_fee)
    .bind(input.electricity_fee)
    .bind(&input.image_url)
    .bind(&input.qr_code_image)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn count_for_owner(pool: &PgPool, owner_id: Uuid) -> AppResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM renthouses WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> AppResult<()> {
    sqlx::query("DELETE FROM renthouses WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn featured(pool: &PgPool, limit: i64) -> AppResult<Vec<Renthouse>> {
    let rows = sqlx::query_as::<_, Renthouse>(
        "SELECT * FROM renthouses ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Haversine distance in a subquery so the radius filter and ordering can
/// reference the computed column.
pub async fn nearby(
    pool: &PgPool,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
) -> AppResult<Vec<NearbyRenthouse>> {
    let rows = sqlx::query_as::<_, NearbyRenthouse>(
        "SELECT * FROM (
            SELECT h.*,
                   6371.0 * acos(least(1.0,
                       cos(radians($1)) * cos(radians(h.latitude))
                     * cos(radians(h.longitude) - radians($2))
                     + sin(radians($1)) * sin(radians(h.latitude))
                   )) AS distance_km
            FROM renthouses h
            WHERE h.latitude IS NOT NULL AND h.longitude IS NOT NULL
         ) located
         WHERE located.distance_km <= $3
         ORDER BY located.distance_km",
    )
    .bind(latitude)
    .bind(longitude)
    .bind(radius_km)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

fn build_search_query<'a>(
    keyword: Option<&'a str>,
    min_rent: Option<Decimal>,
    max_rent: Option<Decimal>,
) -> QueryBuilder<'a, Postgres> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM renthouses WHERE 1 = 1");
    if let Some(keyword) = keyword {
        builder.push(" AND (name ILIKE ");
        builder.push_bind(format!("%{keyword}%"));
        builder.push(" OR address ILIKE ");
        builder.push_bind(format!("%{keyword}%"));
        builder.push(")");
    }
    if let Some(min_rent) = min_rent {
        builder.push(" AND base_rent >= ");
        builder.push_bind(min_rent);
    }
    if let Some(max_rent) = max_rent {
        builder.push(" AND base_rent <= ");
        builder.push_bind(max_rent);
    }
    builder.push(" ORDER BY created_at DESC");
    builder
}

pub async fn search(
    pool: &PgPool,
    keyword: Option<&str>,
    min_rent: Option<Decimal>,
    max_rent: Option<Decimal>,
) -> AppResult<Vec<Renthouse>> {
    let mut builder = build_search_query(keyword, min_rent, max_rent);
    let rows = builder
        .build_query_as::<Renthouse>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::build_search_query;
    use rust_decimal::Decimal;

    #[test]
    fn search_without_filters_is_unconstrained() {
        let mut builder = build_search_query(None, None, None);
        let sql = builder.sql();
        assert!(!sql.contains("ILIKE"));
        assert!(!sql.contains("base_rent"));
        assert!(sql.contains("ORDER BY created_at DESC"));
    }

    #[test]
    fn search_with_all_filters_binds_each_clause() {
        let mut builder = build_search_query(
            Some("sukhumvit"),
            Some(Decimal::from(3000)),
            Some(Decimal::from(9000)),
        );
        let sql = builder.sql();
        assert!(sql.contains("name ILIKE $1"));
        assert!(sql.contains("address ILIKE $2"));
        assert!(sql.contains("base_rent >= $3"));
        assert!(sql.contains("base_rent <= $4"));
    }
}
