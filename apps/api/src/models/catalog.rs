use serde::Serialize;
use sqlx::FromRow;

/// One row of the `/cars` listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, FromRow)]
pub struct CarListing {
    #[serde(rename = "CarModel")]
    #[sqlx(rename = "car_model")]
    pub model: String,
    #[serde(rename = "CarMake")]
    #[sqlx(rename = "car_make")]
    pub make: String,
}

/// A make and the models seeded under it.
#[derive(Debug, Clone, Copy)]
pub struct SeedMake {
    pub name: &'static str,
    pub description: &'static str,
    pub models: &'static [SeedModel],
}

#[derive(Debug, Clone, Copy)]
pub struct SeedModel {
    pub name: &'static str,
    pub body_type: CarType,
    pub year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarType {
    Sedan,
    Suv,
    Wagon,
}

impl CarType {
    pub fn as_str(self) -> &'static str {
        match self {
            CarType::Sedan => "SEDAN",
            CarType::Suv => "SUV",
            CarType::Wagon => "WAGON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_uses_frontend_field_names() {
        let listing = CarListing {
            model: "Qashqai".to_string(),
            make: "NISSAN".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&listing).unwrap(),
            serde_json::json!({"CarModel": "Qashqai", "CarMake": "NISSAN"})
        );
    }
}
