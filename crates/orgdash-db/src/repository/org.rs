//! SurrealDB implementation of [`OrgRepository`].

use chrono::{DateTime, Utc};
use orgdash_core::error::{OrgError, OrgResult};
use orgdash_core::models::org::{ConfigValue, CreateOrg, Org, OrgConfig, UpdateOrg};
use orgdash_core::repository::OrgRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct OrgRow {
    name: String,
    language: Option<String>,
    subdomain: Option<String>,
    domain: Option<String>,
    timezone: String,
    api_token: Option<String>,
    config: serde_json::Value,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrgRow {
    fn into_org(self, id: Uuid) -> Result<Org, DbError> {
        let config: OrgConfig = serde_json::from_value(self.config)
            .map_err(|e| DbError::Query(format!("invalid org config: {e}")))?;
        Ok(Org {
            id,
            name: self.name,
            language: self.language,
            subdomain: self.subdomain,
            domain: self.domain,
            timezone: self.timezone,
            api_token: self.api_token,
            config,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrgRowWithId {
    record_id: String,
    name: String,
    language: Option<String>,
    subdomain: Option<String>,
    domain: Option<String>,
    timezone: String,
    api_token: Option<String>,
    config: serde_json::Value,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrgRowWithId {
    fn try_into_org(self) -> Result<Org, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        let config: OrgConfig = serde_json::from_value(self.config)
            .map_err(|e| DbError::Query(format!("invalid org config: {e}")))?;
        Ok(Org {
            id,
            name: self.name,
            language: self.language,
            subdomain: self.subdomain,
            domain: self.domain,
            timezone: self.timezone,
            api_token: self.api_token,
            config,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Org repository.
#[derive(Clone)]
pub struct SurrealOrgRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrgRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Count orgs (other than `exclude`, when given) whose `field`
    /// equals `value`. Used for the subdomain/domain uniqueness checks.
    async fn count_conflicts(
        &self,
        field: &'static str,
        value: String,
        exclude: Option<Uuid>,
    ) -> Result<u64, DbError> {
        let query = match exclude {
            Some(_) => format!(
                "SELECT count() AS total FROM org \
                 WHERE {field} = $value \
                 AND id != type::record('org', $exclude) GROUP ALL"
            ),
            None => format!("SELECT count() AS total FROM org WHERE {field} = $value GROUP ALL"),
        };

        let mut builder = self.db.query(query).bind(("value", value));
        if let Some(id) = exclude {
            builder = builder.bind(("exclude", id.to_string()));
        }

        let mut result = builder.await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    /// Uniqueness pre-checks for subdomain and domain; surfaced as
    /// user-facing validation errors rather than index violations.
    async fn check_uniqueness(
        &self,
        subdomain: Option<&str>,
        domain: Option<&str>,
        exclude: Option<Uuid>,
    ) -> OrgResult<()> {
        if let Some(subdomain) = subdomain {
            let conflicts = self
                .count_conflicts("subdomain", subdomain.to_string(), exclude)
                .await
                .map_err(OrgError::from)?;
            if conflicts > 0 {
                return Err(OrgError::Validation {
                    message: "This subdomain is not available".into(),
                });
            }
        }
        if let Some(domain) = domain {
            let conflicts = self
                .count_conflicts("domain", domain.to_string(), exclude)
                .await
                .map_err(OrgError::from)?;
            if conflicts > 0 {
                return Err(OrgError::Validation {
                    message: "This domain is not available".into(),
                });
            }
        }
        Ok(())
    }
}

impl<C: Connection> OrgRepository for SurrealOrgRepository<C> {
    async fn create(&self, input: CreateOrg) -> OrgResult<Org> {
        self.check_uniqueness(input.subdomain.as_deref(), input.domain.as_deref(), None)
            .await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let config = serde_json::to_value(input.config.unwrap_or_default())
            .map_err(|e| OrgError::Internal(e.to_string()))?;

        let result = self
            .db
            .query(
                "CREATE type::record('org', $id) SET \
                 name = $name, language = $language, \
                 subdomain = $subdomain, domain = $domain, \
                 timezone = $timezone, api_token = $api_token, \
                 config = $config, is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("language", input.language))
            .bind(("subdomain", input.subdomain))
            .bind(("domain", input.domain))
            .bind(("timezone", input.timezone.unwrap_or_else(|| "UTC".into())))
            .bind(("api_token", input.api_token))
            .bind(("config", config))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrgRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "org".into(),
            id: id_str,
        })?;

        Ok(row.into_org(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> OrgResult<Org> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('org', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrgRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "org".into(),
            id: id_str,
        })?;

        Ok(row.into_org(id)?)
    }

    async fn get_by_subdomain(&self, subdomain: &str) -> OrgResult<Org> {
        let subdomain_owned = subdomain.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM org \
                 WHERE subdomain = $subdomain",
            )
            .bind(("subdomain", subdomain_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrgRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "org".into(),
            id: format!("subdomain={subdomain}"),
        })?;

        Ok(row.try_into_org()?)
    }

    async fn get_by_domain(&self, domain: &str) -> OrgResult<Org> {
        let domain_owned = domain.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM org \
                 WHERE domain = $domain",
            )
            .bind(("domain", domain_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrgRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "org".into(),
            id: format!("domain={domain}"),
        })?;

        Ok(row.try_into_org()?)
    }

    async fn update(&self, id: Uuid, input: UpdateOrg) -> OrgResult<Org> {
        self.check_uniqueness(input.subdomain.as_deref(), input.domain.as_deref(), Some(id))
            .await?;

        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.language.is_some() {
            sets.push("language = $language");
        }
        if input.subdomain.is_some() {
            sets.push("subdomain = $subdomain");
        }
        if input.domain.is_some() {
            sets.push("domain = $domain");
        }
        if input.timezone.is_some() {
            sets.push("timezone = $timezone");
        }
        if input.api_token.is_some() {
            sets.push("api_token = $api_token");
        }
        if input.config.is_some() {
            sets.push("config = $config");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('org', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(language) = input.language {
            builder = builder.bind(("language", language));
        }
        if let Some(subdomain) = input.subdomain {
            builder = builder.bind(("subdomain", subdomain));
        }
        if let Some(domain) = input.domain {
            builder = builder.bind(("domain", domain));
        }
        if let Some(timezone) = input.timezone {
            builder = builder.bind(("timezone", timezone));
        }
        if let Some(api_token) = input.api_token {
            builder = builder.bind(("api_token", api_token));
        }
        if let Some(config) = input.config {
            let config =
                serde_json::to_value(config).map_err(|e| OrgError::Internal(e.to_string()))?;
            builder = builder.bind(("config", config));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrgRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "org".into(),
            id: id_str,
        })?;

        Ok(row.into_org(id)?)
    }

    async fn deactivate(&self, id: Uuid) -> OrgResult<()> {
        self.db
            .query(
                "UPDATE type::record('org', $id) SET \
                 is_active = false, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_active(&self) -> OrgResult<Vec<Org>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM org \
                 WHERE is_active = true \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrgRowWithId> = result.take(0).map_err(DbError::from)?;

        let orgs = rows
            .into_iter()
            .map(|row| row.try_into_org())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(orgs)
    }

    async fn list_for_user(&self, user_id: Uuid) -> OrgResult<Vec<Org>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM org \
                 WHERE is_active = true \
                 AND id IN (\
                     SELECT VALUE type::record('org', org_id) FROM user_role \
                     WHERE user_id = $user_id\
                 ) \
                 ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrgRowWithId> = result.take(0).map_err(DbError::from)?;

        let orgs = rows
            .into_iter()
            .map(|row| row.try_into_org())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(orgs)
    }

    async fn set_config(&self, id: Uuid, name: &str, value: ConfigValue) -> OrgResult<Org> {
        // Read-modify-write; last writer wins, same as the cache.
        let org = self.get_by_id(id).await?;
        let mut config = org.config;
        config.set(name, value);

        self.update(
            id,
            UpdateOrg {
                config: Some(config),
                ..Default::default()
            },
        )
        .await
    }
}
