//! Canned search results for front-end development.
//!
//! `/mock` answers from these fixtures without touching GitHub. Queries are
//! bucketed by keyword, case-insensitively.

use dockdock_search::{EnrichedResult, SearchOutcome};

/// Page size reported by every fixture response.
const FIXTURE_LIMIT: u32 = 10;

/// Which fixture set a query maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureBucket {
    /// No keyword matched.
    Default,
    /// The query mentions `python`.
    Python,
    /// The query mentions both `fastapi` and `react`.
    React,
}

impl FixtureBucket {
    /// `true` for buckets selected by a keyword rather than by fallthrough.
    pub fn is_named(self) -> bool {
        !matches!(self, Self::Default)
    }
}

/// Pick the bucket for `query`.
pub fn bucket_for(query: &str) -> FixtureBucket {
    let q = query.to_lowercase();
    if q.contains("fastapi") && q.contains("react") {
        FixtureBucket::React
    } else if q.contains("python") {
        FixtureBucket::Python
    } else {
        FixtureBucket::Default
    }
}

const NODE_POSTGRES: &str = "
version: '3.8'
services:
  web:
    build: .
    ports:
      - \"3000:3000\"
    depends_on:
      - db
  db:
    image: postgres:13
    environment:
      POSTGRES_DB: myapp
      POSTGRES_USER: user
      POSTGRES_PASSWORD: password
";

const SINGLE_API: &str = "
version: '3.8'
services:
  api:
    build: .
    ports:
      - \"8000:8000\"
    volumes:
      - .:/app
";

const NGINX_STATIC: &str = "
version: '3.8'
services:
  frontend:
    image: nginx:alpine
    ports:
      - \"80:80\"
    volumes:
      - ./build:/usr/share/nginx/html
";

const APP_REDIS: &str = "
version: '3.8'
services:
  app:
    build: .
    ports:
      - \"8000:8000\"
    depends_on:
      - redis
  redis:
    image: \"redis:alpine\"
";

const WORDPRESS_MYSQL: &str = "
version: '3.8'
services:
  wordpress:
    image: wordpress:latest
    ports:
      - \"8080:80\"
    depends_on:
      - db
  db:
    image: mysql:5.7
    environment:
      MYSQL_DATABASE: wordpress
      MYSQL_USER: user
      MYSQL_PASSWORD: password
      MYSQL_ROOT_PASSWORD: rootpassword
";

fn fixture(compose: &str, repo: &str, description: &str) -> EnrichedResult {
    EnrichedResult {
        artifact_content: compose.to_owned(),
        source_identifier: repo.to_owned(),
        description: description.to_owned(),
    }
}

/// The fixtures for `bucket`, in display order.
pub fn fixtures(bucket: FixtureBucket) -> Vec<EnrichedResult> {
    match bucket {
        FixtureBucket::Default => vec![
            fixture(
                NODE_POSTGRES,
                "Accord33/synctimer",
                "A Node.js app wired to a PostgreSQL database.",
            ),
            fixture(
                SINGLE_API,
                "toma1128/ai2",
                "A minimal setup for a single backend API such as FastAPI or Flask.",
            ),
            fixture(
                NGINX_STATIC,
                "toma1128/ai3",
                "Serves a static React or Vue build through Nginx.",
            ),
            fixture(
                APP_REDIS,
                "toma1128/ai4",
                "A Django or Rails app using Redis as a cache.",
            ),
            fixture(
                WORDPRESS_MYSQL,
                "toma1128/ai5",
                "The standard WordPress and MySQL pairing.",
            ),
        ],
        FixtureBucket::Python => vec![fixture(
            SINGLE_API,
            "toma1128/ai4",
            "A minimal Python API service with the source tree mounted.",
        )],
        FixtureBucket::React => vec![fixture(
            NGINX_STATIC,
            "toma1128/ai3",
            "Serves a static React or Vue build through Nginx.",
        )],
    }
}

/// Build the `/mock` response for `query`.
///
/// A missing or empty query returns the default bucket with `query: ""`.
pub fn mock_outcome(query: Option<&str>) -> SearchOutcome {
    let query = query.unwrap_or_default();
    let results = fixtures(bucket_for(query));
    SearchOutcome {
        total_match_count: results.len() as u64,
        results,
        page: 1,
        limit: FIXTURE_LIMIT,
        query: query.to_owned(),
    }
}
