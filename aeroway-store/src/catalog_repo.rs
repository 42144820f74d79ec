//! Postgres repositories for the reference data: airports, the fleet
//! (airplane types and airplanes), crew, and routes.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use aeroway_core::filters::{AirplaneFilter, CrewFilter, NameFilter, RouteFilter};
use aeroway_core::models::{
    Airplane, AirplaneType, AirplaneWithType, Airport, Crew, NewAirplane, NewAirplaneType,
    NewAirport, NewCrew, NewRoute, Route, RouteDetail,
};
use aeroway_core::repository::{
    AirportRepository, CrewRepository, FleetRepository, RepoError, RepoResult, RouteRepository,
};

use crate::map_sqlx_err;

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AirportRow {
    id: i64,
    name: String,
    closest_big_city: String,
    image: Option<String>,
}

impl From<AirportRow> for Airport {
    fn from(row: AirportRow) -> Self {
        Airport {
            id: row.id,
            name: row.name,
            closest_big_city: row.closest_big_city,
            image: row.image,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AirplaneTypeRow {
    id: i64,
    name: String,
}

impl From<AirplaneTypeRow> for AirplaneType {
    fn from(row: AirplaneTypeRow) -> Self {
        AirplaneType {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AirplaneRow {
    id: i64,
    name: String,
    rows: i32,
    seats_in_rows: i32,
    airplane_type_id: i64,
    image: Option<String>,
}

impl From<AirplaneRow> for Airplane {
    fn from(row: AirplaneRow) -> Self {
        Airplane {
            id: row.id,
            name: row.name,
            rows: row.rows,
            seats_in_rows: row.seats_in_rows,
            airplane_type_id: row.airplane_type_id,
            image: row.image,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AirplaneWithTypeRow {
    id: i64,
    name: String,
    rows: i32,
    seats_in_rows: i32,
    airplane_type_id: i64,
    image: Option<String>,
    type_name: String,
}

impl From<AirplaneWithTypeRow> for AirplaneWithType {
    fn from(row: AirplaneWithTypeRow) -> Self {
        AirplaneWithType {
            airplane: Airplane {
                id: row.id,
                name: row.name,
                rows: row.rows,
                seats_in_rows: row.seats_in_rows,
                airplane_type_id: row.airplane_type_id,
                image: row.image,
            },
            airplane_type: AirplaneType {
                id: row.airplane_type_id,
                name: row.type_name,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct CrewRow {
    id: i64,
    first_name: String,
    last_name: String,
}

impl From<CrewRow> for Crew {
    fn from(row: CrewRow) -> Self {
        Crew {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RouteRow {
    id: i64,
    source_id: i64,
    destination_id: i64,
    distance: i32,
}

impl From<RouteRow> for Route {
    fn from(row: RouteRow) -> Self {
        Route {
            id: row.id,
            source_id: row.source_id,
            destination_id: row.destination_id,
            distance: row.distance,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RouteDetailRow {
    id: i64,
    source_id: i64,
    destination_id: i64,
    distance: i32,
    source_name: String,
    source_city: String,
    source_image: Option<String>,
    dest_name: String,
    dest_city: String,
    dest_image: Option<String>,
}

impl From<RouteDetailRow> for RouteDetail {
    fn from(row: RouteDetailRow) -> Self {
        RouteDetail {
            route: Route {
                id: row.id,
                source_id: row.source_id,
                destination_id: row.destination_id,
                distance: row.distance,
            },
            source: Airport {
                id: row.source_id,
                name: row.source_name,
                closest_big_city: row.source_city,
                image: row.source_image,
            },
            destination: Airport {
                id: row.destination_id,
                name: row.dest_name,
                closest_big_city: row.dest_city,
                image: row.dest_image,
            },
        }
    }
}

const ROUTE_DETAIL_SELECT: &str = "SELECT r.id, r.source_id, r.destination_id, r.distance, \
     s.name AS source_name, s.closest_big_city AS source_city, s.image AS source_image, \
     d.name AS dest_name, d.closest_big_city AS dest_city, d.image AS dest_image \
     FROM routes r \
     JOIN airports s ON s.id = r.source_id \
     JOIN airports d ON d.id = r.destination_id";

pub(crate) async fn load_route_detail(pool: &PgPool, id: i64) -> RepoResult<RouteDetail> {
    let row = sqlx::query_as::<_, RouteDetailRow>(&format!("{} WHERE r.id = $1", ROUTE_DETAIL_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("route", id))?;
    Ok(row.into())
}

pub(crate) async fn load_airplane_with_type(pool: &PgPool, id: i64) -> RepoResult<AirplaneWithType> {
    let row = sqlx::query_as::<_, AirplaneWithTypeRow>(
        "SELECT a.id, a.name, a.\"rows\", a.seats_in_rows, a.airplane_type_id, a.image, \
         t.name AS type_name \
         FROM airplanes a JOIN airplane_types t ON t.id = a.airplane_type_id \
         WHERE a.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(map_sqlx_err)?
    .ok_or_else(|| RepoError::not_found("airplane", id))?;
    Ok(row.into())
}

// ============================================================================
// Airports
// ============================================================================

pub struct PgAirportRepository {
    pool: PgPool,
}

impl PgAirportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AirportRepository for PgAirportRepository {
    async fn create(&self, airport: NewAirport) -> RepoResult<Airport> {
        let row = sqlx::query_as::<_, AirportRow>(
            "INSERT INTO airports (name, closest_big_city) VALUES ($1, $2) \
             RETURNING id, name, closest_big_city, image",
        )
        .bind(&airport.name)
        .bind(&airport.closest_big_city)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(row.into())
    }

    async fn get(&self, id: i64) -> RepoResult<Airport> {
        let row = sqlx::query_as::<_, AirportRow>(
            "SELECT id, name, closest_big_city, image FROM airports WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("airport", id))?;
        Ok(row.into())
    }

    async fn list(&self, filter: &NameFilter) -> RepoResult<Vec<Airport>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT DISTINCT id, name, closest_big_city, image FROM airports WHERE 1=1",
        );
        if let Some(name) = &filter.name {
            qb.push(" AND name ILIKE ");
            qb.push_bind(format!("%{}%", name));
        }
        qb.push(" ORDER BY id");

        let rows: Vec<AirportRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, airport: NewAirport) -> RepoResult<Airport> {
        let row = sqlx::query_as::<_, AirportRow>(
            "UPDATE airports SET name = $1, closest_big_city = $2 WHERE id = $3 \
             RETURNING id, name, closest_big_city, image",
        )
        .bind(&airport.name)
        .bind(&airport.closest_big_city)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("airport", id))?;
        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM airports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("airport", id));
        }
        Ok(())
    }

    async fn set_image(&self, id: i64, path: &str) -> RepoResult<Airport> {
        let row = sqlx::query_as::<_, AirportRow>(
            "UPDATE airports SET image = $1 WHERE id = $2 \
             RETURNING id, name, closest_big_city, image",
        )
        .bind(path)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("airport", id))?;
        Ok(row.into())
    }
}

// ============================================================================
// Fleet: airplane types + airplanes
// ============================================================================

pub struct PgFleetRepository {
    pool: PgPool,
}

impl PgFleetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FleetRepository for PgFleetRepository {
    async fn create_airplane_type(
        &self,
        airplane_type: NewAirplaneType,
    ) -> RepoResult<AirplaneType> {
        let row = sqlx::query_as::<_, AirplaneTypeRow>(
            "INSERT INTO airplane_types (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&airplane_type.name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(row.into())
    }

    async fn get_airplane_type(&self, id: i64) -> RepoResult<AirplaneType> {
        let row = sqlx::query_as::<_, AirplaneTypeRow>(
            "SELECT id, name FROM airplane_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("airplane type", id))?;
        Ok(row.into())
    }

    async fn list_airplane_types(&self, filter: &NameFilter) -> RepoResult<Vec<AirplaneType>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT DISTINCT id, name FROM airplane_types WHERE 1=1",
        );
        if let Some(name) = &filter.name {
            qb.push(" AND name ILIKE ");
            qb.push_bind(format!("%{}%", name));
        }
        qb.push(" ORDER BY id");

        let rows: Vec<AirplaneTypeRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_airplane_type(
        &self,
        id: i64,
        airplane_type: NewAirplaneType,
    ) -> RepoResult<AirplaneType> {
        let row = sqlx::query_as::<_, AirplaneTypeRow>(
            "UPDATE airplane_types SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&airplane_type.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("airplane type", id))?;
        Ok(row.into())
    }

    async fn delete_airplane_type(&self, id: i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM airplane_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("airplane type", id));
        }
        Ok(())
    }

    async fn create_airplane(&self, airplane: NewAirplane) -> RepoResult<Airplane> {
        // Surface a missing type as not-found rather than an FK violation.
        self.get_airplane_type(airplane.airplane_type).await?;

        let row = sqlx::query_as::<_, AirplaneRow>(
            "INSERT INTO airplanes (name, \"rows\", seats_in_rows, airplane_type_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, \"rows\", seats_in_rows, airplane_type_id, image",
        )
        .bind(&airplane.name)
        .bind(airplane.rows)
        .bind(airplane.seats_in_rows)
        .bind(airplane.airplane_type)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(row.into())
    }

    async fn get_airplane(&self, id: i64) -> RepoResult<AirplaneWithType> {
        load_airplane_with_type(&self.pool, id).await
    }

    async fn list_airplanes(&self, filter: &AirplaneFilter) -> RepoResult<Vec<AirplaneWithType>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT DISTINCT a.id, a.name, a.\"rows\", a.seats_in_rows, a.airplane_type_id, \
             a.image, t.name AS type_name \
             FROM airplanes a JOIN airplane_types t ON t.id = a.airplane_type_id WHERE 1=1",
        );
        if let Some(name) = &filter.name {
            qb.push(" AND a.name ILIKE ");
            qb.push_bind(format!("%{}%", name));
        }
        if let Some(type_ids) = &filter.airplane_type {
            qb.push(" AND a.airplane_type_id IN (");
            let mut separated = qb.separated(", ");
            for type_id in type_ids {
                separated.push_bind(*type_id);
            }
            qb.push(")");
        }
        qb.push(" ORDER BY a.id");

        let rows: Vec<AirplaneWithTypeRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_airplane(&self, id: i64, airplane: NewAirplane) -> RepoResult<Airplane> {
        self.get_airplane_type(airplane.airplane_type).await?;

        let row = sqlx::query_as::<_, AirplaneRow>(
            "UPDATE airplanes SET name = $1, \"rows\" = $2, seats_in_rows = $3, \
             airplane_type_id = $4 WHERE id = $5 \
             RETURNING id, name, \"rows\", seats_in_rows, airplane_type_id, image",
        )
        .bind(&airplane.name)
        .bind(airplane.rows)
        .bind(airplane.seats_in_rows)
        .bind(airplane.airplane_type)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("airplane", id))?;
        Ok(row.into())
    }

    async fn delete_airplane(&self, id: i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM airplanes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("airplane", id));
        }
        Ok(())
    }

    async fn set_airplane_image(&self, id: i64, path: &str) -> RepoResult<Airplane> {
        let row = sqlx::query_as::<_, AirplaneRow>(
            "UPDATE airplanes SET image = $1 WHERE id = $2 \
             RETURNING id, name, \"rows\", seats_in_rows, airplane_type_id, image",
        )
        .bind(path)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("airplane", id))?;
        Ok(row.into())
    }
}

// ============================================================================
// Crew
// ============================================================================

pub struct PgCrewRepository {
    pool: PgPool,
}

impl PgCrewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrewRepository for PgCrewRepository {
    async fn create(&self, crew: NewCrew) -> RepoResult<Crew> {
        let row = sqlx::query_as::<_, CrewRow>(
            "INSERT INTO crew (first_name, last_name) VALUES ($1, $2) \
             RETURNING id, first_name, last_name",
        )
        .bind(&crew.first_name)
        .bind(&crew.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(row.into())
    }

    async fn get(&self, id: i64) -> RepoResult<Crew> {
        let row = sqlx::query_as::<_, CrewRow>(
            "SELECT id, first_name, last_name FROM crew WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("crew", id))?;
        Ok(row.into())
    }

    async fn list(&self, filter: &CrewFilter) -> RepoResult<Vec<Crew>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT DISTINCT id, first_name, last_name FROM crew WHERE 1=1",
        );
        if let Some(first_name) = &filter.first_name {
            qb.push(" AND first_name ILIKE ");
            qb.push_bind(format!("%{}%", first_name));
        }
        if let Some(last_name) = &filter.last_name {
            qb.push(" AND last_name ILIKE ");
            qb.push_bind(format!("%{}%", last_name));
        }
        qb.push(" ORDER BY id");

        let rows: Vec<CrewRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, crew: NewCrew) -> RepoResult<Crew> {
        let row = sqlx::query_as::<_, CrewRow>(
            "UPDATE crew SET first_name = $1, last_name = $2 WHERE id = $3 \
             RETURNING id, first_name, last_name",
        )
        .bind(&crew.first_name)
        .bind(&crew.last_name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("crew", id))?;
        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM crew WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("crew", id));
        }
        Ok(())
    }
}

// ============================================================================
// Routes
// ============================================================================

pub struct PgRouteRepository {
    pool: PgPool,
}

impl PgRouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn require_airport(&self, id: i64) -> RepoResult<()> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM airports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        if exists.is_none() {
            return Err(RepoError::not_found("airport", id));
        }
        Ok(())
    }
}

#[async_trait]
impl RouteRepository for PgRouteRepository {
    async fn create(&self, route: NewRoute) -> RepoResult<Route> {
        self.require_airport(route.source).await?;
        self.require_airport(route.destination).await?;

        let row = sqlx::query_as::<_, RouteRow>(
            "INSERT INTO routes (source_id, destination_id, distance) VALUES ($1, $2, $3) \
             RETURNING id, source_id, destination_id, distance",
        )
        .bind(route.source)
        .bind(route.destination)
        .bind(route.distance)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(row.into())
    }

    async fn get(&self, id: i64) -> RepoResult<RouteDetail> {
        load_route_detail(&self.pool, id).await
    }

    async fn list(&self, filter: &RouteFilter) -> RepoResult<Vec<RouteDetail>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("{} WHERE 1=1", ROUTE_DETAIL_SELECT));
        if let Some(destination) = &filter.destination {
            qb.push(" AND d.name ILIKE ");
            qb.push_bind(format!("%{}%", destination));
        }
        qb.push(" ORDER BY r.id");

        let rows: Vec<RouteDetailRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, route: NewRoute) -> RepoResult<Route> {
        self.require_airport(route.source).await?;
        self.require_airport(route.destination).await?;

        let row = sqlx::query_as::<_, RouteRow>(
            "UPDATE routes SET source_id = $1, destination_id = $2, distance = $3 WHERE id = $4 \
             RETURNING id, source_id, destination_id, distance",
        )
        .bind(route.source)
        .bind(route.destination)
        .bind(route.distance)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("route", id))?;
        Ok(row.into())
    }
}
