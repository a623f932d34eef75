//! `PostgreSQL` implementation of [`FarmStore`].
//!
//! Units of work are `sqlx` transactions at the default `READ COMMITTED`
//! level. Every read-check-write path locks the rows it checks with
//! `FOR UPDATE`, and the steal log relies on its primary key, so two
//! concurrent identical requests cannot both pass a precondition.

use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use homestead_types::{ActionType, PlayerLogEntry, User};

use crate::catalog::Catalog;
use crate::codec::{action_type_to_db, prop_type_to_db, target_model_to_db, to_i32};
use crate::error::DbError;
use crate::pg_unit_of_work::PgUnitOfWork;
use crate::rows::{ActionCountRow, UserRow, convert_all};
use crate::store::{ActionCount, FarmStore, UserRanking};

/// Rows per audit-log insert statement.
const LOG_BATCH_SIZE: usize = 100;

/// [`FarmStore`] backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgFarmStore {
    pool: PgPool,
}

impl PgFarmStore {
    /// Wrap a connected pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Upsert every crop and prop of `catalog`.
    ///
    /// Safe to run on every startup: existing rows are overwritten with the
    /// catalog's values.
    pub async fn seed_catalog(&self, catalog: &Catalog) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        for plant in &catalog.plants {
            sqlx::query(
                r"INSERT INTO plants (id, name, image, required_level, category, growth, economics, rewards)
                  VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                  ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name, image = EXCLUDED.image,
                    required_level = EXCLUDED.required_level, category = EXCLUDED.category,
                    growth = EXCLUDED.growth, economics = EXCLUDED.economics, rewards = EXCLUDED.rewards",
            )
            .bind(plant.id.into_inner())
            .bind(&plant.name)
            .bind(&plant.image)
            .bind(to_i32(plant.required_level))
            .bind(&plant.category)
            .bind(Json(&plant.growth))
            .bind(Json(&plant.economics))
            .bind(Json(&plant.rewards))
            .execute(&mut *tx)
            .await?;
        }

        for prop in &catalog.props {
            sqlx::query(
                r"INSERT INTO props (id, name, description, prop_type, buy_price, sell_price, effect, image)
                  VALUES ($1, $2, $3, $4::prop_type, $5, $6, $7, $8)
                  ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name, description = EXCLUDED.description,
                    prop_type = EXCLUDED.prop_type, buy_price = EXCLUDED.buy_price,
                    sell_price = EXCLUDED.sell_price, effect = EXCLUDED.effect, image = EXCLUDED.image",
            )
            .bind(prop.id.into_inner())
            .bind(&prop.name)
            .bind(&prop.description)
            .bind(prop_type_to_db(prop.prop_type))
            .bind(prop.buy_price)
            .bind(prop.sell_price)
            .bind(&prop.effect)
            .bind(&prop.image)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(
            plants = catalog.plants.len(),
            props = catalog.props.len(),
            "Seeded catalog"
        );
        Ok(())
    }
}

impl FarmStore for PgFarmStore {
    type Tx = PgUnitOfWork;

    async fn begin(&self) -> Result<PgUnitOfWork, DbError> {
        Ok(PgUnitOfWork::new(self.pool.begin().await?))
    }

    async fn append_player_logs(&self, entries: &[PlayerLogEntry]) -> Result<(), DbError> {
        for chunk in entries.chunks(LOG_BATCH_SIZE) {
            let len = chunk.len();
            let mut ids: Vec<Uuid> = Vec::with_capacity(len);
            let mut user_ids = Vec::with_capacity(len);
            let mut actions = Vec::with_capacity(len);
            let mut targets = Vec::with_capacity(len);
            let mut target_ids: Vec<Option<i64>> = Vec::with_capacity(len);
            let mut old_data: Vec<Option<serde_json::Value>> = Vec::with_capacity(len);
            let mut new_data: Vec<Option<serde_json::Value>> = Vec::with_capacity(len);
            let mut params = Vec::with_capacity(len);
            let mut timestamps = Vec::with_capacity(len);

            for entry in chunk {
                ids.push(entry.id);
                user_ids.push(entry.user_id.into_inner());
                actions.push(action_type_to_db(entry.action_type).to_owned());
                targets.push(target_model_to_db(entry.target_model).to_owned());
                target_ids.push(entry.target_id);
                old_data.push(entry.old_data.clone());
                new_data.push(entry.new_data.clone());
                params.push(entry.param.clone());
                timestamps.push(entry.created_at);
            }

            sqlx::query(
                r"INSERT INTO player_logs (id, user_id, action_type, target_model, target_id, old_data, new_data, param, created_at)
                  SELECT * FROM UNNEST($1::UUID[], $2::BIGINT[], $3::action_type[], $4::target_model[], $5::BIGINT[], $6::JSONB[], $7::JSONB[], $8::TEXT[], $9::TIMESTAMPTZ[])",
            )
            .bind(&ids)
            .bind(&user_ids)
            .bind(&actions)
            .bind(&targets)
            .bind(&target_ids)
            .bind(&old_data)
            .bind(&new_data)
            .bind(&params)
            .bind(&timestamps)
            .execute(&self.pool)
            .await?;
        }

        tracing::debug!(count = entries.len(), "Inserted player logs (batch UNNEST)");
        Ok(())
    }

    async fn ranked_users(
        &self,
        ranking: UserRanking,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<User>, DbError> {
        let sql = match ranking {
            UserRanking::Gold => {
                r"SELECT id, nick_name, exp, gold, premium_currency FROM users
                  ORDER BY gold DESC, id ASC LIMIT $1 OFFSET $2"
            }
            UserRanking::Exp => {
                r"SELECT id, nick_name, exp, gold, premium_currency FROM users
                  ORDER BY exp DESC, id ASC LIMIT $1 OFFSET $2"
            }
        };
        let rows = sqlx::query_as::<_, UserRow>(sql)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn action_counts(
        &self,
        actions: &[ActionType],
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ActionCount>, DbError> {
        let labels: Vec<String> = actions
            .iter()
            .map(|action| action_type_to_db(*action).to_owned())
            .collect();
        let rows = sqlx::query_as::<_, ActionCountRow>(
            r"SELECT user_id, COUNT(*) AS count
              FROM player_logs
              WHERE target_model = 'landplot' AND action_type = ANY($1::action_type[])
              GROUP BY user_id
              ORDER BY count DESC, user_id ASC
              LIMIT $2 OFFSET $3",
        )
        .bind(&labels)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }
}
