//! Shop: listings, buying, and selling.
//!
//! Prices are integer gold amounts held as [`Decimal`]. A trade moves gold,
//! moves stock, and appends a shop log row in one unit of work.
//!
//! | Item  | Buy price             | Sell price                  |
//! |-------|-----------------------|-----------------------------|
//! | Seed  | crop seed cost        | half the seed cost, floored |
//! | Fruit | not sold              | crop `sellPricePerUnit`     |
//! | Prop  | prop `buyPrice`       | prop `sellPrice`            |

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use homestead_core::Clock;
use homestead_core::rules::{seed_resale_price, total_price};
use homestead_db::{FarmStore, UnitOfWork};
use homestead_types::{
    ItemType, PlantId, PlayerStateView, PropId, ShopListingItem, ShopListings, ShopLogEntry,
    ShopTransactionKind, UserId,
};

use crate::error::GameError;
use crate::lookup;
use crate::view;

/// One priced line of a trade, resolved before anything is written.
struct Quote {
    name: String,
    unit_price: Decimal,
    total: Decimal,
}

/// Buying from and selling to the shop.
#[derive(Debug)]
pub struct EconomyEngine<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for EconomyEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: FarmStore> EconomyEngine<S> {
    /// Create an engine over `store`, reading time from `clock`.
    pub const fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Everything the shop sells: every crop's seed, ordered by required
    /// level, and every prop that has a buy price.
    pub async fn shop_listings(&self) -> Result<ShopListings, GameError> {
        let mut tx = self.store.begin().await?;
        let plants = tx.plants().await?;
        let props = tx.props().await?;
        drop(tx);

        let seeds = plants
            .into_iter()
            .map(|plant| ShopListingItem {
                item_id: plant.id.into_inner(),
                description: format!(
                    "A {} crop seed.",
                    plant.category.as_deref().unwrap_or("common")
                ),
                name: plant.name,
                item_type: ItemType::Seed,
                buy_price: plant.economics.cost.gold,
                required_level: plant.required_level,
                image: plant.image,
            })
            .collect();
        let props = props
            .into_iter()
            .filter_map(|prop| {
                Some(ShopListingItem {
                    item_id: prop.id.into_inner(),
                    buy_price: prop.buy_price?,
                    name: prop.name,
                    item_type: ItemType::Prop,
                    required_level: 0,
                    description: prop.description,
                    image: prop.image,
                })
            })
            .collect();
        Ok(ShopListings { seeds, props })
    }

    /// Buy `quantity` seeds or props.
    ///
    /// Seeds require the crop's level. Fruit cannot be bought.
    pub async fn buy(
        &self,
        user_id: UserId,
        item_type: ItemType,
        item_id: i64,
        quantity: u32,
    ) -> Result<PlayerStateView, GameError> {
        require_positive(quantity)?;
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let mut user = lookup::require_user(&mut tx, user_id).await?;

        let quote = match item_type {
            ItemType::Seed => {
                let plant = lookup::require_plant(&mut tx, PlantId::new(item_id)).await?;
                lookup::ensure_level(&user, &plant)?;
                price_quote(plant.name, plant.economics.cost.gold, quantity)?
            }
            ItemType::Prop => {
                let prop_id = PropId::new(item_id);
                let prop = tx
                    .prop(prop_id)
                    .await?
                    .ok_or(GameError::PropNotFound { prop_id })?;
                let price = prop.buy_price.ok_or(GameError::ItemNotPurchasable { item_id })?;
                price_quote(prop.name, price, quantity)?
            }
            ItemType::Fruit => return Err(GameError::ItemNotPurchasable { item_id }),
        };
        if user.gold < quote.total {
            return Err(GameError::InsufficientGold {
                needed: quote.total,
                available: user.gold,
            });
        }

        user.gold = user.gold.checked_sub(quote.total).ok_or(GameError::Overflow {
            context: "gold balance",
        })?;
        tx.update_user(&user).await?;
        match item_type {
            ItemType::Prop => tx.credit_prop(user_id, PropId::new(item_id), quantity).await?,
            ItemType::Seed | ItemType::Fruit => {
                tx.credit_crop(user_id, PlantId::new(item_id), item_type, quantity)
                    .await?;
            }
        }
        let entry = shop_entry(
            (user_id, item_type, item_id, quantity),
            &quote,
            ShopTransactionKind::Buy,
            now,
        );
        tx.insert_shop_log(&entry).await?;
        let inventory = view::inventory_view(&mut tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(%user_id, ?item_type, item_id, quantity, total = %quote.total, name = %quote.name, "Bought");
        Ok(PlayerStateView {
            user: view::user_view(&user),
            inventory,
        })
    }

    /// Sell `quantity` units from the player's inventory.
    pub async fn sell(
        &self,
        user_id: UserId,
        item_type: ItemType,
        item_id: i64,
        quantity: u32,
    ) -> Result<PlayerStateView, GameError> {
        require_positive(quantity)?;
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let mut user = lookup::require_user(&mut tx, user_id).await?;

        let quote = match item_type {
            ItemType::Prop => {
                let prop_id = PropId::new(item_id);
                let held = tx
                    .prop_stocks(user_id)
                    .await?
                    .into_iter()
                    .find(|s| s.prop_id == prop_id)
                    .map_or(0, |s| s.quantity);
                if held < quantity || !tx.debit_prop(user_id, prop_id, quantity).await? {
                    return Err(GameError::InsufficientStock { item_id, held });
                }
                let prop = tx
                    .prop(prop_id)
                    .await?
                    .ok_or(GameError::PropNotFound { prop_id })?;
                price_quote(prop.name, prop.sell_price, quantity)?
            }
            ItemType::Seed | ItemType::Fruit => {
                let plant_id = PlantId::new(item_id);
                let held = tx.crop_stock(user_id, plant_id, item_type).await?;
                if held < quantity || !tx.debit_crop(user_id, plant_id, item_type, quantity).await? {
                    return Err(GameError::InsufficientStock { item_id, held });
                }
                let plant = lookup::require_plant(&mut tx, plant_id).await?;
                let unit_price = if item_type == ItemType::Fruit {
                    plant.economics.revenue.sell_price_per_unit
                } else {
                    seed_resale_price(plant.economics.cost.gold)
                };
                price_quote(plant.name, unit_price, quantity)?
            }
        };

        user.gold = user.gold.checked_add(quote.total).ok_or(GameError::Overflow {
            context: "gold balance",
        })?;
        tx.update_user(&user).await?;
        let entry = shop_entry(
            (user_id, item_type, item_id, quantity),
            &quote,
            ShopTransactionKind::Sell,
            now,
        );
        tx.insert_shop_log(&entry).await?;
        let inventory = view::inventory_view(&mut tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(%user_id, ?item_type, item_id, quantity, total = %quote.total, name = %quote.name, "Sold");
        Ok(PlayerStateView {
            user: view::user_view(&user),
            inventory,
        })
    }
}

fn require_positive(quantity: u32) -> Result<(), GameError> {
    if quantity == 0 {
        return Err(GameError::InvalidInput {
            reason: "quantity must be positive".to_owned(),
        });
    }
    Ok(())
}

fn price_quote(name: String, unit_price: Decimal, quantity: u32) -> Result<Quote, GameError> {
    let total = total_price(unit_price, quantity).ok_or(GameError::Overflow {
        context: "trade total",
    })?;
    Ok(Quote {
        name,
        unit_price,
        total,
    })
}

fn shop_entry(
    (user_id, item_type, item_id, quantity): (UserId, ItemType, i64, u32),
    quote: &Quote,
    transaction: ShopTransactionKind,
    at: DateTime<Utc>,
) -> ShopLogEntry {
    ShopLogEntry {
        id: Uuid::now_v7(),
        user_id,
        item_type,
        item_id,
        quantity,
        price_per_unit: quote.unit_price,
        total_price: quote.total,
        transaction,
        created_at: at,
    }
}
