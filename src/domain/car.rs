use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

pub const MIN_MODEL_YEAR: i64 = 2015;
pub const MAX_MODEL_YEAR: i64 = 2050;
pub const DEFAULT_MODEL_YEAR: i64 = 2025;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CarType {
    #[default]
    Sedan,
    Suv,
    Wagon,
}

impl CarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarType::Sedan => "SEDAN",
            CarType::Suv => "SUV",
            CarType::Wagon => "WAGON",
        }
    }
}

impl FromStr for CarType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SEDAN" => Ok(CarType::Sedan),
            "SUV" => Ok(CarType::Suv),
            "WAGON" => Ok(CarType::Wagon),
            other => bail!("Unknown car type {}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarMake {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarModel {
    pub id: i64,
    /// Id of the owning [`CarMake`].
    pub car_make: i64,
    pub name: String,
    #[serde(default, rename = "type")]
    pub car_type: CarType,
    #[serde(default = "default_model_year")]
    pub year: i64,
}

fn default_model_year() -> i64 {
    DEFAULT_MODEL_YEAR
}

/// One entry of the catalog the review form offers: a model name next to its make's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarListing {
    #[serde(rename = "CarModel")]
    pub car_model: String,
    #[serde(rename = "CarMake")]
    pub car_make: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarCatalog {
    #[serde(rename = "CarModels")]
    pub car_models: Vec<CarListing>,
}

// every model points at a known make and carries a year in range
pub fn check_car_catalog(makes: &[CarMake], models: &[CarModel]) -> Result<()> {
    let make_ids: HashSet<i64> = makes.iter().map(|make| make.id).collect();

    for model in models {
        if !make_ids.contains(&model.car_make) {
            bail!(
                "Car model {} ({}) refers to unknown make {}",
                model.id,
                model.name,
                model.car_make
            );
        }
        if !(MIN_MODEL_YEAR..=MAX_MODEL_YEAR).contains(&model.year) {
            bail!(
                "Car model {} ({}) has year {} outside {}-{}",
                model.id,
                model.name,
                model.year,
                MIN_MODEL_YEAR,
                MAX_MODEL_YEAR
            );
        }
    }

    Ok(())
}
