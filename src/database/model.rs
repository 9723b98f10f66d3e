use crate::domain::{CarModel, CarType, Dealership, Review};
use anyhow::{Context, Result};
use derive_more::derive::Display;
use serde_json::{Map, Value};

// row shapes for the sqlite backend. the domain types stay storage agnostic,
// these carry whatever sqlite can't hold natively (the extra field map, as JSON text)

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Display)]
#[display("dealership {}", id)]
pub struct DbDealership {
    pub id: i64,
    pub city: String,
    pub state: String,
    pub st: Option<String>,
    pub address: Option<String>,
    pub zip: Option<String>,
    pub short_name: Option<String>,
    pub full_name: Option<String>,
    pub extra: Option<String>,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Display)]
#[display("review {} (dealership {})", id, dealership)]
pub struct DbReview {
    pub id: i64,
    pub name: String,
    pub dealership: i64,
    pub review: String,
    pub purchase: bool,
    pub purchase_date: String,
    pub car_make: String,
    pub car_model: String,
    pub car_year: i64,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Display)]
#[display("car model {} (make {})", id, car_make)]
pub struct DbCarModel {
    pub id: i64,
    pub car_make: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    pub car_type: String,
    pub year: i64,
}

impl From<&Dealership> for DbDealership {
    fn from(dealership: &Dealership) -> Self {
        // an empty map is stored as NULL rather than "{}"
        let extra = if dealership.extra.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&dealership.extra).unwrap_or_default())
        };

        Self {
            id: dealership.id,
            city: dealership.city.clone(),
            state: dealership.state.clone(),
            st: dealership.st.clone(),
            address: dealership.address.clone(),
            zip: dealership.zip.clone(),
            short_name: dealership.short_name.clone(),
            full_name: dealership.full_name.clone(),
            extra,
        }
    }
}

impl TryFrom<DbDealership> for Dealership {
    type Error = anyhow::Error;

    fn try_from(row: DbDealership) -> Result<Self> {
        let extra = match row.extra.as_deref() {
            Some(json) => serde_json::from_str::<Map<String, Value>>(json)
                .with_context(|| format!("Malformed extra fields on dealership {}", row.id))?,
            None => Map::new(),
        };

        Ok(Self {
            id: row.id,
            city: row.city,
            state: row.state,
            st: row.st,
            address: row.address,
            zip: row.zip,
            short_name: row.short_name,
            full_name: row.full_name,
            extra,
        })
    }
}

impl From<&Review> for DbReview {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            name: review.name.clone(),
            dealership: review.dealership,
            review: review.review.clone(),
            purchase: review.purchase,
            purchase_date: review.purchase_date.clone(),
            car_make: review.car_make.clone(),
            car_model: review.car_model.clone(),
            car_year: review.car_year,
        }
    }
}

impl From<DbReview> for Review {
    fn from(row: DbReview) -> Self {
        Self {
            id: row.id,
            name: row.name,
            dealership: row.dealership,
            review: row.review,
            purchase: row.purchase,
            purchase_date: row.purchase_date,
            car_make: row.car_make,
            car_model: row.car_model,
            car_year: row.car_year,
        }
    }
}

impl From<&CarModel> for DbCarModel {
    fn from(model: &CarModel) -> Self {
        Self {
            id: model.id,
            car_make: model.car_make,
            name: model.name.clone(),
            car_type: model.car_type.as_str().to_string(),
            year: model.year,
        }
    }
}

impl TryFrom<DbCarModel> for CarModel {
    type Error = anyhow::Error;

    fn try_from(row: DbCarModel) -> Result<Self> {
        let car_type: CarType = row
            .car_type
            .parse()
            .with_context(|| format!("Malformed type on car model {}", row.id))?;

        Ok(Self {
            id: row.id,
            car_make: row.car_make,
            name: row.name,
            car_type,
            year: row.year,
        })
    }
}
