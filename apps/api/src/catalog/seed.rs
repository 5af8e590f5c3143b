//! Reference makes and models loaded into an empty catalog.

use crate::models::catalog::{CarType, SeedMake, SeedModel};

const fn model(name: &'static str, body_type: CarType, year: i32) -> SeedModel {
    SeedModel {
        name,
        body_type,
        year,
    }
}

pub const SEED_MAKES: &[SeedMake] = &[
    SeedMake {
        name: "NISSAN",
        description: "Great cars. Japanese technology",
        models: &[
            model("Pathfinder", CarType::Suv, 2023),
            model("Qashqai", CarType::Suv, 2023),
            model("XTRAIL", CarType::Suv, 2023),
        ],
    },
    SeedMake {
        name: "Mercedes",
        description: "Great cars. German technology",
        models: &[
            model("A-Class", CarType::Suv, 2023),
            model("C-Class", CarType::Suv, 2023),
            model("E-Class", CarType::Sedan, 2023),
        ],
    },
    SeedMake {
        name: "Audi",
        description: "Great cars. German technology",
        models: &[
            model("A4", CarType::Suv, 2023),
            model("A5", CarType::Suv, 2023),
            model("A6", CarType::Sedan, 2023),
        ],
    },
    SeedMake {
        name: "Kia",
        description: "Great cars. Korean technology",
        models: &[
            model("Sorrento", CarType::Suv, 2023),
            model("Carnival", CarType::Suv, 2023),
            model("Cerato", CarType::Sedan, 2023),
        ],
    },
    SeedMake {
        name: "Toyota",
        description: "Great cars. Japanese technology",
        models: &[
            model("Corolla", CarType::Sedan, 2023),
            model("Camry", CarType::Sedan, 2023),
            model("Kluger", CarType::Wagon, 2023),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_has_no_duplicates() {
        let makes: HashSet<_> = SEED_MAKES.iter().map(|m| m.name).collect();
        assert_eq!(makes.len(), SEED_MAKES.len());

        for make in SEED_MAKES {
            let models: HashSet<_> = make.models.iter().map(|m| m.name).collect();
            assert_eq!(models.len(), make.models.len(), "duplicate model under {}", make.name);
            assert!(!make.models.is_empty());
        }
    }
}
