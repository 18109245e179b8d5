use serde::{Deserialize, Serialize};

const TOP_TIER_MIN_STORES: usize = 50;
const TOP_TIER_MIN_QUANTITY: u64 = 200_000;
const MID_TIER_STORES: std::ops::RangeInclusive<usize> = 25..=50;
const MID_TIER_MIN_QUANTITY: u64 = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerTier {
    #[serde(rename = "CHG Own Sales Customer")]
    OwnSales,
    #[serde(rename = "Distributor Customer")]
    Distributor,
    #[serde(rename = "Small Customer")]
    Small,
}

impl CustomerTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OwnSales => "CHG Own Sales Customer",
            Self::Distributor => "Distributor Customer",
            Self::Small => "Small Customer",
        }
    }

    pub const fn scale(self) -> &'static str {
        match self {
            Self::OwnSales => "Large Scale",
            Self::Distributor => "Medium Scale",
            Self::Small => "Small Scale",
        }
    }
}

/// Which threshold rules fired, kept so the tier can be audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCriteria {
    pub stores_greater_than_50: bool,
    pub quantity_greater_than_200k: bool,
    pub stores_between_25_and_50: bool,
    pub quantity_between_50k_and_200k: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerClassification {
    pub customer_type: CustomerTier,
    pub total_quantity_sold: u64,
    pub number_of_stores: usize,
    pub criteria: ClassificationCriteria,
}

/// Tiers a customer from aggregate sales volume and store count. Top tier
/// wins over mid tier when both rules match.
pub fn classify(total_quantity_sold: u64, number_of_stores: usize) -> CustomerClassification {
    let criteria = ClassificationCriteria {
        stores_greater_than_50: number_of_stores > TOP_TIER_MIN_STORES,
        quantity_greater_than_200k: total_quantity_sold > TOP_TIER_MIN_QUANTITY,
        stores_between_25_and_50: MID_TIER_STORES.contains(&number_of_stores),
        quantity_between_50k_and_200k: total_quantity_sold > MID_TIER_MIN_QUANTITY
            && total_quantity_sold <= TOP_TIER_MIN_QUANTITY,
    };

    let customer_type = if criteria.stores_greater_than_50 || criteria.quantity_greater_than_200k {
        CustomerTier::OwnSales
    } else if criteria.stores_between_25_and_50 || criteria.quantity_between_50k_and_200k {
        CustomerTier::Distributor
    } else {
        CustomerTier::Small
    };

    CustomerClassification {
        customer_type,
        total_quantity_sold,
        number_of_stores,
        criteria,
    }
}
