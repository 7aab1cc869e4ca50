use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{EventQuery, EventStore, StoreError, UserStore};
use crate::models::{Event, User};

/// Column list shared across event queries.
const EVENT_COLUMNS: &str = "id, organizer_id, name, description, website, city, country, \
     number_of_tickets, start_date, end_date, deadline, application_process, \
     application_link, data_protection_confirmation, approved, created_at, updated_at";

const USER_COLUMNS: &str = "id, name, email, admin, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        tracing::info!("Successfully connected to database");

        sqlx::migrate!().run(&pool).await?;
        tracing::info!("Migrations run successfully");

        Ok(Self::new(pool))
    }
}

/// `WHERE .. ORDER BY ..` for a listing query. `$1` is bound by [`bind_query`].
fn query_clause(query: &EventQuery) -> &'static str {
    match query {
        EventQuery::Upcoming { .. } => {
            "WHERE approved AND end_date >= $1 ORDER BY start_date ASC, name ASC"
        }
        EventQuery::Past { .. } => {
            "WHERE approved AND end_date < $1 ORDER BY end_date DESC, name ASC"
        }
        EventQuery::Pending => "WHERE NOT approved ORDER BY created_at ASC",
        EventQuery::OrganizedBy(_) => "WHERE organizer_id = $1 ORDER BY created_at DESC",
    }
}

fn bind_query<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    query: &EventQuery,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    match *query {
        EventQuery::Upcoming { today } | EventQuery::Past { today } => q.bind(today),
        EventQuery::Pending => q,
        EventQuery::OrganizedBy(organizer_id) => q.bind(organizer_id),
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn save(&self, event: &Event) -> Result<Event, StoreError> {
        let sql = format!(
            "INSERT INTO events (id, organizer_id, name, description, website, city, country,
                 number_of_tickets, start_date, end_date, deadline, application_process,
                 application_link, data_protection_confirmation, approved, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             ON CONFLICT (id) DO UPDATE SET
                 name = EXCLUDED.name,
                 description = EXCLUDED.description,
                 website = EXCLUDED.website,
                 city = EXCLUDED.city,
                 country = EXCLUDED.country,
                 number_of_tickets = EXCLUDED.number_of_tickets,
                 start_date = EXCLUDED.start_date,
                 end_date = EXCLUDED.end_date,
                 deadline = EXCLUDED.deadline,
                 application_process = EXCLUDED.application_process,
                 application_link = EXCLUDED.application_link,
                 data_protection_confirmation = EXCLUDED.data_protection_confirmation,
                 approved = EXCLUDED.approved,
                 updated_at = EXCLUDED.updated_at
             RETURNING {EVENT_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, Event>(&sql)
            .bind(event.id)
            .bind(event.organizer_id)
            .bind(&event.name)
            .bind(&event.description)
            .bind(&event.website)
            .bind(&event.city)
            .bind(&event.country)
            .bind(event.number_of_tickets)
            .bind(event.start_date)
            .bind(event.end_date)
            .bind(event.deadline)
            .bind(event.application_process)
            .bind(&event.application_link)
            .bind(event.data_protection_confirmation)
            .bind(event.approved)
            .bind(event.created_at)
            .bind(event.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn find(&self, id: Uuid) -> Result<Event, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound { entity: "Event", id })
    }

    async fn query(&self, query: &EventQuery) -> Result<Vec<Event>, StoreError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events {}",
            query_clause(query)
        );
        let events = bind_query(sqlx::query_as::<_, Event>(&sql), query)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn exists(&self, query: &EventQuery) -> Result<bool, StoreError> {
        let clause = query_clause(query);
        let filter = clause.split(" ORDER BY").next().unwrap_or(clause);
        let sql = format!("SELECT EXISTS (SELECT 1 FROM events {filter})");
        let (exists,) = bind_query(sqlx::query_as::<_, (bool,)>(&sql), query)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, admin, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                 name = EXCLUDED.name,
                 email = EXCLUDED.email,
                 admin = EXCLUDED.admin,
                 updated_at = EXCLUDED.updated_at
             RETURNING {USER_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.admin)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }
}
