//! Catalog Data Gateway
//!
//! Six query shapes against the `coffee_details` table:
//!
//! | call                   | shape                                  |
//! |------------------------|----------------------------------------|
//! | `fetch_all`            | full scan, id ascending                |
//! | `fetch_by_id`          | equality on id                         |
//! | `fetch_by_tag`         | tags array contains the tag            |
//! | `fetch_top_rated`      | rating descending, limited             |
//! | `fetch_most_purchased` | purchases descending, limited          |
//! | `search_by_name`       | case-insensitive substring on name     |

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use super::GatewayError;
use crate::domain::aggregates::Coffee;

/// Limit used by the home screen carousels.
pub const DEFAULT_LIMIT: usize = 5;

pub trait CatalogGateway: Send + Sync {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Coffee>, GatewayError>> + Send;
    fn fetch_by_id(&self, id: i64) -> impl Future<Output = Result<Coffee, GatewayError>> + Send;
    fn fetch_by_tag(&self, tag: &str) -> impl Future<Output = Result<Vec<Coffee>, GatewayError>> + Send;
    fn fetch_top_rated(&self, limit: usize) -> impl Future<Output = Result<Vec<Coffee>, GatewayError>> + Send;
    fn fetch_most_purchased(&self, limit: usize) -> impl Future<Output = Result<Vec<Coffee>, GatewayError>> + Send;
    fn search_by_name(&self, term: &str) -> impl Future<Output = Result<Vec<Coffee>, GatewayError>> + Send;
}

// =============================================================================
// PostgreSQL
// =============================================================================

const SELECT_COFFEE: &str = "SELECT id::int8 AS id, name, COALESCE(description, '') AS description, \
    COALESCE(tags, '{}'::text[]) AS tags, price::numeric AS price, COALESCE(rating, 0)::float8 AS rating, \
    COALESCE(purchases, 0)::int8 AS purchases, COALESCE(image_url, '') AS image_url FROM coffee_details";

#[derive(Debug, sqlx::FromRow)]
struct CoffeeRow {
    id: i64,
    name: String,
    description: String,
    tags: Vec<String>,
    price: Decimal,
    rating: f64,
    purchases: i64,
    image_url: String,
}

impl From<CoffeeRow> for Coffee {
    fn from(r: CoffeeRow) -> Self {
        Coffee {
            id: r.id, name: r.name, description: r.description, tags: r.tags,
            price: r.price, rating: r.rating, purchases: r.purchases, image_url: r.image_url,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgCatalog { pool: PgPool }

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    pub async fn connect(url: &str) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        Ok(Self::new(pool))
    }
}

fn into_coffees(rows: Vec<CoffeeRow>) -> Vec<Coffee> { rows.into_iter().map(Coffee::from).collect() }

/// Escapes LIKE wildcards so the term is matched literally.
fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

fn limit_param(limit: usize) -> i64 { i64::try_from(limit).unwrap_or(i64::MAX) }

impl CatalogGateway for PgCatalog {
    async fn fetch_all(&self) -> Result<Vec<Coffee>, GatewayError> {
        let sql = format!("{SELECT_COFFEE} ORDER BY id ASC");
        let rows = sqlx::query_as::<_, CoffeeRow>(&sql).fetch_all(&self.pool).await?;
        Ok(into_coffees(rows))
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Coffee, GatewayError> {
        let sql = format!("{SELECT_COFFEE} WHERE id = $1");
        sqlx::query_as::<_, CoffeeRow>(&sql).bind(id).fetch_optional(&self.pool).await?
            .map(Coffee::from).ok_or(GatewayError::NotFound(id))
    }

    async fn fetch_by_tag(&self, tag: &str) -> Result<Vec<Coffee>, GatewayError> {
        let sql = format!("{SELECT_COFFEE} WHERE tags @> ARRAY[$1]::text[] ORDER BY id ASC");
        let rows = sqlx::query_as::<_, CoffeeRow>(&sql).bind(tag).fetch_all(&self.pool).await?;
        Ok(into_coffees(rows))
    }

    async fn fetch_top_rated(&self, limit: usize) -> Result<Vec<Coffee>, GatewayError> {
        let sql = format!("{SELECT_COFFEE} ORDER BY rating DESC LIMIT $1");
        let rows = sqlx::query_as::<_, CoffeeRow>(&sql).bind(limit_param(limit)).fetch_all(&self.pool).await?;
        Ok(into_coffees(rows))
    }

    async fn fetch_most_purchased(&self, limit: usize) -> Result<Vec<Coffee>, GatewayError> {
        let sql = format!("{SELECT_COFFEE} ORDER BY purchases DESC LIMIT $1");
        let rows = sqlx::query_as::<_, CoffeeRow>(&sql).bind(limit_param(limit)).fetch_all(&self.pool).await?;
        Ok(into_coffees(rows))
    }

    async fn search_by_name(&self, term: &str) -> Result<Vec<Coffee>, GatewayError> {
        debug!(term, "searching catalog");
        let sql = format!("{SELECT_COFFEE} WHERE name ILIKE $1 ORDER BY id ASC");
        let rows = sqlx::query_as::<_, CoffeeRow>(&sql).bind(like_pattern(term)).fetch_all(&self.pool).await?;
        Ok(into_coffees(rows))
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Catalog held in memory, loaded from JSON or the built-in menu.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog { coffees: Vec<Coffee> }

impl InMemoryCatalog {
    pub fn new(mut coffees: Vec<Coffee>) -> Self {
        coffees.sort_by_key(|c| c.id);
        Self { coffees }
    }

    pub fn from_json(json: &str) -> Result<Self, GatewayError> { Ok(Self::new(serde_json::from_str(json)?)) }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_json(&raw)
    }

    pub fn len(&self) -> usize { self.coffees.len() }
    pub fn is_empty(&self) -> bool { self.coffees.is_empty() }

    /// The house menu, used when no catalog source is configured.
    pub fn seed() -> Self {
        let coffee = |id: i64, name: &str, description: &str, tags: &[&str], price: i64, rating: f64, purchases: i64| Coffee {
            id, name: name.into(), description: description.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            price: Decimal::new(price, 0), rating, purchases,
            image_url: format!("https://images.example.com/coffee/{id}.png"),
        };
        Self::new(vec![
            coffee(1, "Caffe Mocha", "Espresso, chocolate and steamed milk", &["Hot", "Milk", "Chocolate"], 4500, 4.8, 230),
            coffee(2, "Flat White", "Ristretto with velvety microfoam", &["Hot", "Milk"], 3800, 4.6, 180),
            coffee(3, "Cappuccino", "Equal parts espresso, milk and foam", &["Hot", "Milk"], 3500, 4.7, 310),
            coffee(4, "Americano", "Espresso lengthened with hot water", &["Hot"], 2500, 4.3, 150),
            coffee(5, "Espresso", "A single concentrated shot", &["Hot", "Strong"], 2000, 4.5, 95),
            coffee(6, "Caramel Macchiato", "Vanilla, milk, espresso and caramel drizzle", &["Hot", "Milk", "Sweet"], 5000, 4.9, 275),
            coffee(7, "Iced Latte", "Espresso over ice with cold milk", &["Iced", "Milk"], 4000, 4.4, 205),
            coffee(8, "Cold Brew", "Steeped for eighteen hours", &["Iced", "Strong"], 4200, 4.6, 120),
        ])
    }

    fn ranked_by(&self, limit: usize, key: impl Fn(&Coffee) -> f64) -> Vec<Coffee> {
        let mut ranked = self.coffees.clone();
        ranked.sort_by(|a, b| key(b).total_cmp(&key(a)));
        ranked.truncate(limit);
        ranked
    }
}

impl CatalogGateway for InMemoryCatalog {
    async fn fetch_all(&self) -> Result<Vec<Coffee>, GatewayError> { Ok(self.coffees.clone()) }

    async fn fetch_by_id(&self, id: i64) -> Result<Coffee, GatewayError> {
        self.coffees.iter().find(|c| c.id == id).cloned().ok_or(GatewayError::NotFound(id))
    }

    async fn fetch_by_tag(&self, tag: &str) -> Result<Vec<Coffee>, GatewayError> {
        Ok(self.coffees.iter().filter(|c| c.has_tag(tag)).cloned().collect())
    }

    async fn fetch_top_rated(&self, limit: usize) -> Result<Vec<Coffee>, GatewayError> {
        Ok(self.ranked_by(limit, |c| c.rating))
    }

    async fn fetch_most_purchased(&self, limit: usize) -> Result<Vec<Coffee>, GatewayError> {
        Ok(self.ranked_by(limit, |c| c.purchases as f64))
    }

    async fn search_by_name(&self, term: &str) -> Result<Vec<Coffee>, GatewayError> {
        Ok(self.coffees.iter().filter(|c| c.name_matches(term)).cloned().collect())
    }
}

// =============================================================================
// Composition
// =============================================================================

/// Catalog chosen at startup from configuration.
#[derive(Clone, Debug)]
pub enum AnyCatalog {
    Postgres(PgCatalog),
    Memory(InMemoryCatalog),
}

impl CatalogGateway for AnyCatalog {
    async fn fetch_all(&self) -> Result<Vec<Coffee>, GatewayError> {
        match self { Self::Postgres(c) => c.fetch_all().await, Self::Memory(c) => c.fetch_all().await }
    }
    async fn fetch_by_id(&self, id: i64) -> Result<Coffee, GatewayError> {
        match self { Self::Postgres(c) => c.fetch_by_id(id).await, Self::Memory(c) => c.fetch_by_id(id).await }
    }
    async fn fetch_by_tag(&self, tag: &str) -> Result<Vec<Coffee>, GatewayError> {
        match self { Self::Postgres(c) => c.fetch_by_tag(tag).await, Self::Memory(c) => c.fetch_by_tag(tag).await }
    }
    async fn fetch_top_rated(&self, limit: usize) -> Result<Vec<Coffee>, GatewayError> {
        match self { Self::Postgres(c) => c.fetch_top_rated(limit).await, Self::Memory(c) => c.fetch_top_rated(limit).await }
    }
    async fn fetch_most_purchased(&self, limit: usize) -> Result<Vec<Coffee>, GatewayError> {
        match self { Self::Postgres(c) => c.fetch_most_purchased(limit).await, Self::Memory(c) => c.fetch_most_purchased(limit).await }
    }
    async fn search_by_name(&self, term: &str) -> Result<Vec<Coffee>, GatewayError> {
        match self { Self::Postgres(c) => c.search_by_name(term).await, Self::Memory(c) => c.search_by_name(term).await }
    }
}

/// Bounds every call of the wrapped catalog. `None` waits forever.
#[derive(Clone, Debug)]
pub struct TimeoutCatalog<C> { inner: C, limit: Option<Duration> }

impl<C: CatalogGateway> TimeoutCatalog<C> {
    pub fn new(inner: C, limit: Option<Duration>) -> Self { Self { inner, limit } }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T, GatewayError>>) -> Result<T, GatewayError> {
        match self.limit {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| GatewayError::Timeout(limit))?,
            None => call.await,
        }
    }
}

impl<C: CatalogGateway> CatalogGateway for TimeoutCatalog<C> {
    async fn fetch_all(&self) -> Result<Vec<Coffee>, GatewayError> { self.bounded(self.inner.fetch_all()).await }
    async fn fetch_by_id(&self, id: i64) -> Result<Coffee, GatewayError> { self.bounded(self.inner.fetch_by_id(id)).await }
    async fn fetch_by_tag(&self, tag: &str) -> Result<Vec<Coffee>, GatewayError> { self.bounded(self.inner.fetch_by_tag(tag)).await }
    async fn fetch_top_rated(&self, limit: usize) -> Result<Vec<Coffee>, GatewayError> { self.bounded(self.inner.fetch_top_rated(limit)).await }
    async fn fetch_most_purchased(&self, limit: usize) -> Result<Vec<Coffee>, GatewayError> { self.bounded(self.inner.fetch_most_purchased(limit)).await }
    async fn search_by_name(&self, term: &str) -> Result<Vec<Coffee>, GatewayError> { self.bounded(self.inner.search_by_name(term)).await }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(coffees: &[Coffee]) -> Vec<i64> { coffees.iter().map(|c| c.id).collect() }

    #[tokio::test]
    async fn test_fetch_all_ordered_by_id() {
        let json = r#"[{"id":3,"name":"C","price":1},{"id":1,"name":"A","price":1},{"id":2,"name":"B","price":1}]"#;
        let catalog = InMemoryCatalog::from_json(json).unwrap();
        assert_eq!(ids(&catalog.fetch_all().await.unwrap()), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_by_id() {
        let catalog = InMemoryCatalog::seed();
        assert_eq!(catalog.fetch_by_id(3).await.unwrap().name, "Cappuccino");
        assert!(matches!(catalog.fetch_by_id(99).await, Err(GatewayError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_rankings() {
        let catalog = InMemoryCatalog::seed();
        assert_eq!(ids(&catalog.fetch_top_rated(DEFAULT_LIMIT).await.unwrap()), vec![6, 1, 3, 2, 8]);
        assert_eq!(ids(&catalog.fetch_most_purchased(2).await.unwrap()), vec![3, 6]);
    }

    #[tokio::test]
    async fn test_tag_and_search() {
        let catalog = InMemoryCatalog::seed();
        assert_eq!(ids(&catalog.fetch_by_tag("Iced").await.unwrap()), vec![7, 8]);
        assert!(catalog.fetch_by_tag("iced").await.unwrap().is_empty());
        assert_eq!(ids(&catalog.search_by_name("LATTE").await.unwrap()), vec![7]);
        assert_eq!(ids(&catalog.search_by_name("ca").await.unwrap()), vec![1, 3, 4, 6]);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(InMemoryCatalog::from_json("{"), Err(GatewayError::Decode(_))));
    }

    struct Stalled;

    impl CatalogGateway for Stalled {
        async fn fetch_all(&self) -> Result<Vec<Coffee>, GatewayError> { std::future::pending().await }
        async fn fetch_by_id(&self, _: i64) -> Result<Coffee, GatewayError> { std::future::pending().await }
        async fn fetch_by_tag(&self, _: &str) -> Result<Vec<Coffee>, GatewayError> { std::future::pending().await }
        async fn fetch_top_rated(&self, _: usize) -> Result<Vec<Coffee>, GatewayError> { std::future::pending().await }
        async fn fetch_most_purchased(&self, _: usize) -> Result<Vec<Coffee>, GatewayError> { std::future::pending().await }
        async fn search_by_name(&self, _: &str) -> Result<Vec<Coffee>, GatewayError> { std::future::pending().await }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_catalog() {
        let catalog = TimeoutCatalog::new(Stalled, Some(Duration::from_secs(2)));
        assert!(matches!(catalog.fetch_all().await, Err(GatewayError::Timeout(_))));
        let open = TimeoutCatalog::new(InMemoryCatalog::seed(), None);
        assert_eq!(open.fetch_all().await.unwrap().len(), 8);
    }
}
