//! The starter catalog of crops and shop props.
//!
//! Both backends are seeded from [`Catalog::starter`]: the in-memory store
//! loads it on construction and [`crate::PgFarmStore::seed_catalog`] upserts
//! it into `PostgreSQL`, so the two never drift apart.

use rust_decimal::Decimal;
use serde_json::json;

use homestead_types::{
    CropEconomics, CropRevenue, CropRewards, GrowthCurve, GrowthStage, GrowthStageName, Plant,
    PlantId, Prop, PropId, PropType, SeedCost,
};

/// Immutable crop and prop definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    /// Crop definitions.
    pub plants: Vec<Plant>,
    /// Shop props.
    pub props: Vec<Prop>,
}

impl Catalog {
    /// The catalog every new deployment starts with.
    pub fn starter() -> Self {
        Self {
            plants: vec![
                Plant {
                    id: PlantId::new(1),
                    name: "Radish".to_owned(),
                    image: None,
                    required_level: 1,
                    category: Some("root".to_owned()),
                    growth: GrowthCurve {
                        total_seconds: 3600,
                        stages: vec![GrowthStage {
                            name: GrowthStageName::InitialMaturity,
                            end_seconds: 3600,
                        }],
                    },
                    economics: economics(10, 3, 10),
                    rewards: CropRewards { exp: 12 },
                },
                crop(2, "Carrot", 2, "root", 7200, (20, 5, 12), 25),
                crop(3, "Corn", 4, "grain", 14_400, (40, 9, 15), 48),
                crop(4, "Tomato", 6, "vegetable", 28_800, (80, 12, 20), 90),
                crop(5, "Pumpkin", 9, "vegetable", 43_200, (150, 25, 18), 160),
                crop(6, "Strawberry", 12, "fruit", 57_600, (260, 18, 30), 260),
            ],
            props: vec![
                Prop {
                    id: PropId::new(1),
                    name: "Basic Fertilizer".to_owned(),
                    description: "Cuts 15 minutes off a crop's growth time.".to_owned(),
                    prop_type: PropType::Fertilizer,
                    buy_price: Some(Decimal::from(50)),
                    sell_price: Decimal::from(10),
                    effect: json!({ "type": "timeReduction", "value": 900, "unit": "seconds" }),
                    image: None,
                },
                Prop {
                    id: PropId::new(2),
                    name: "Rapid Fertilizer".to_owned(),
                    description: "Cuts an hour off a crop's growth time.".to_owned(),
                    prop_type: PropType::Fertilizer,
                    buy_price: Some(Decimal::from(200)),
                    sell_price: Decimal::from(50),
                    effect: json!({ "type": "timeReduction", "value": 3600, "unit": "seconds" }),
                    image: None,
                },
                Prop {
                    id: PropId::new(3),
                    name: "Scarecrow".to_owned(),
                    description: "A classic scarecrow to decorate the farm.".to_owned(),
                    prop_type: PropType::Decoration,
                    buy_price: Some(Decimal::from(500)),
                    sell_price: Decimal::from(100),
                    effect: json!({ "type": "placement", "area": "farm" }),
                    image: None,
                },
                Prop {
                    id: PropId::new(4),
                    name: "Windmill".to_owned(),
                    description: "A Dutch windmill for a farm with style.".to_owned(),
                    prop_type: PropType::Decoration,
                    buy_price: Some(Decimal::from(2000)),
                    sell_price: Decimal::from(400),
                    effect: json!({ "type": "placement", "area": "farm" }),
                    image: None,
                },
                Prop {
                    id: PropId::new(5),
                    name: "Double Exp Card (1h)".to_owned(),
                    description: "Doubles experience from every action for one hour.".to_owned(),
                    prop_type: PropType::Consumable,
                    buy_price: Some(Decimal::from(1000)),
                    sell_price: Decimal::from(250),
                    effect: json!({
                        "type": "statusBuff",
                        "buff": "doubleExp",
                        "duration": 3600,
                        "unit": "seconds"
                    }),
                    image: None,
                },
                Prop {
                    id: PropId::new(6),
                    name: "Land Upgrade Scroll".to_owned(),
                    description: "Upgrades an ordinary plot to better land.".to_owned(),
                    prop_type: PropType::Special,
                    buy_price: Some(Decimal::from(5000)),
                    sell_price: Decimal::from(1000),
                    effect: json!({ "type": "unlock", "target": "landPlot" }),
                    image: None,
                },
            ],
        }
    }
}

/// A crop with the standard four-stage curve.
fn crop(
    id: i64,
    name: &str,
    required_level: u32,
    category: &str,
    total_seconds: u32,
    (cost, sell, yield_units): (i64, i64, u32),
    exp: u32,
) -> Plant {
    Plant {
        id: PlantId::new(id),
        name: name.to_owned(),
        image: None,
        required_level,
        category: Some(category.to_owned()),
        growth: four_stage_curve(total_seconds),
        economics: economics(cost, sell, yield_units),
        rewards: CropRewards { exp },
    }
}

fn economics(cost: i64, sell: i64, yield_units: u32) -> CropEconomics {
    CropEconomics {
        cost: SeedCost {
            gold: Decimal::from(cost),
            premium: 0,
        },
        revenue: CropRevenue {
            sell_price_per_unit: Decimal::from(sell),
            yield_units,
        },
    }
}

/// Germination ends at 10%, leaflet at 30%, large leaf at 80%.
fn four_stage_curve(total_seconds: u32) -> GrowthCurve {
    let at = |percent: u32| {
        u64::from(total_seconds)
            .saturating_mul(u64::from(percent))
            .checked_div(100)
            .and_then(|secs| u32::try_from(secs).ok())
            .unwrap_or(total_seconds)
    };
    GrowthCurve {
        total_seconds,
        stages: vec![
            GrowthStage {
                name: GrowthStageName::Germination,
                end_seconds: at(10),
            },
            GrowthStage {
                name: GrowthStageName::Leaflet,
                end_seconds: at(30),
            },
            GrowthStage {
                name: GrowthStageName::Largeleaf,
                end_seconds: at(80),
            },
            GrowthStage {
                name: GrowthStageName::InitialMaturity,
                end_seconds: total_seconds,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_seed_is_a_level_one_crop() {
        let catalog = Catalog::starter();
        let radish = catalog.plants.iter().find(|p| p.id == PlantId::new(1));
        assert_eq!(radish.map(|p| p.required_level), Some(1));
        assert_eq!(radish.map(|p| p.growth.total_seconds), Some(3600));
    }

    #[test]
    fn stages_ascend_and_end_at_total() {
        for plant in Catalog::starter().plants {
            let ends: Vec<u32> = plant.growth.stages.iter().map(|s| s.end_seconds).collect();
            assert!(ends.windows(2).all(|w| w.first() < w.get(1)), "{}", plant.name);
            assert_eq!(ends.last().copied(), Some(plant.growth.total_seconds));
        }
    }

    #[test]
    fn every_prop_is_purchasable_and_sells_for_less() {
        for prop in Catalog::starter().props {
            let buy = prop.buy_price.unwrap_or_default();
            assert!(buy > prop.sell_price, "{}", prop.name);
        }
    }
}
