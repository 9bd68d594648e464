use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "buyer")]
    Buyer,
    #[sea_orm(string_value = "farmer")]
    Farmer,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Farmer => "farmer",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "buyer" => Some(Role::Buyer),
            "farmer" => Some(Role::Farmer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[sea_orm(string_value = "vegetables")]
    Vegetables,
    #[sea_orm(string_value = "fruits")]
    Fruits,
    #[sea_orm(string_value = "grains")]
    Grains,
    #[sea_orm(string_value = "dairy")]
    Dairy,
    #[sea_orm(string_value = "poultry")]
    Poultry,
    #[sea_orm(string_value = "seeds")]
    Seeds,
    #[sea_orm(string_value = "fertilizers")]
    Fertilizers,
    #[sea_orm(string_value = "tools")]
    Tools,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Vegetables,
        Category::Fruits,
        Category::Grains,
        Category::Dairy,
        Category::Poultry,
        Category::Seeds,
        Category::Fertilizers,
        Category::Tools,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vegetables => "vegetables",
            Category::Fruits => "fruits",
            Category::Grains => "grains",
            Category::Dairy => "dairy",
            Category::Poultry => "poultry",
            Category::Seeds => "seeds",
            Category::Fertilizers => "fertilizers",
            Category::Tools => "tools",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Vegetables => "Vegetables",
            Category::Fruits => "Fruits",
            Category::Grains => "Grains",
            Category::Dairy => "Dairy",
            Category::Poultry => "Poultry",
            Category::Seeds => "Seeds",
            Category::Fertilizers => "Fertilizers",
            Category::Tools => "Tools",
        }
    }

    /// Categories whose name contains `needle`, case-insensitively.
    pub fn matching(needle: &str) -> Vec<Category> {
        let needle = needle.to_lowercase();
        Category::ALL
            .into_iter()
            .filter(|c| c.as_str().contains(&needle))
            .collect()
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[sea_orm(string_value = "kg")]
    Kg,
    #[sea_orm(string_value = "g")]
    G,
    #[sea_orm(string_value = "litre")]
    Litre,
    #[sea_orm(string_value = "ml")]
    Ml,
    #[sea_orm(string_value = "piece")]
    Piece,
    #[sea_orm(string_value = "dozen")]
    Dozen,
    #[sea_orm(string_value = "packet")]
    Packet,
}

/// Where a product sits in its lifecycle. Only `Available` products are
/// visible in public catalog queries; `Deactivated` is the soft-delete state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "unavailable")]
    Unavailable,
    #[sea_orm(string_value = "deactivated")]
    Deactivated,
}

impl ListingStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, ListingStatus::Available)
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, ListingStatus::Deactivated)
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Processing => Some(1),
            OrderStatus::Shipped => Some(2),
            OrderStatus::Delivered => Some(3),
            OrderStatus::Cancelled => None,
        }
    }

    /// Forward-only: the fulfilment chain may be skipped ahead but never
    /// rewound, and cancellation is only possible before shipping.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() || *self == next {
            return false;
        }
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to > from,
            (_, None) => matches!(self, OrderStatus::Pending | OrderStatus::Processing),
            (None, _) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_moves_forward_and_may_skip() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn order_status_never_rewinds() {
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Processing));
    }

    #[test]
    fn cancellation_only_before_shipping() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Processing));
    }

    #[test]
    fn listing_status_flags() {
        assert!(ListingStatus::Available.is_available());
        assert!(ListingStatus::Unavailable.is_active());
        assert!(!ListingStatus::Unavailable.is_available());
        assert!(!ListingStatus::Deactivated.is_active());
    }

    #[test]
    fn category_matching_is_case_insensitive() {
        assert_eq!(Category::matching("FRUIT"), vec![Category::Fruits]);
        assert_eq!(Category::matching("s").len(), 6);
        assert!(Category::matching("meat").is_empty());
    }
}
