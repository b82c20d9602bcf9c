use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Product entity for the catalog
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub stock: i32,
    /// Comma-joined ordered tag list; exposed as a string array over the wire
    pub tags: String,
    pub featured: bool,
    /// Ordered array of stored image references
    #[sea_orm(column_type = "Json")]
    pub images: Json,
    pub is_active: bool,
    pub created_by: Uuid,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Tags split back into their ordered list form.
    pub fn tag_list(&self) -> Vec<String> {
        split_tags(&self.tags)
    }

    /// Stored image references, tolerating a malformed column by returning
    /// an empty set.
    pub fn image_refs(&self) -> Vec<ProductImage> {
        serde_json::from_value(self.images.clone()).unwrap_or_default()
    }
}

/// Split a comma-joined tag field into trimmed, non-empty entries.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Join a tag list into the comma-joined persisted form.
pub fn join_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Fixed product category set
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Category {
    #[sea_orm(string_value = "Electronics")]
    #[serde(rename = "Electronics")]
    Electronics,
    #[sea_orm(string_value = "Clothing")]
    #[serde(rename = "Clothing")]
    Clothing,
    #[sea_orm(string_value = "Books")]
    #[serde(rename = "Books")]
    Books,
    #[sea_orm(string_value = "Home & Garden")]
    #[serde(rename = "Home & Garden")]
    HomeGarden,
    #[sea_orm(string_value = "Sports")]
    #[serde(rename = "Sports")]
    Sports,
    #[sea_orm(string_value = "Beauty")]
    #[serde(rename = "Beauty")]
    Beauty,
    #[sea_orm(string_value = "Automotive")]
    #[serde(rename = "Automotive")]
    Automotive,
    #[sea_orm(string_value = "Others")]
    #[serde(rename = "Others")]
    Others,
}

impl Category {
    /// Parse the wire form of a category, e.g. from a query parameter.
    pub fn parse(value: &str) -> Option<Self> {
        use sea_orm::ActiveEnum;
        Self::try_from_value(&value.to_string()).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Clothing => "Clothing",
            Self::Books => "Books",
            Self::HomeGarden => "Home & Garden",
            Self::Sports => "Sports",
            Self::Beauty => "Beauty",
            Self::Automotive => "Automotive",
            Self::Others => "Others",
        }
    }
}

/// A stored product image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    /// Durable URL served by the media CDN
    pub url: String,
    /// Storage identifier used for later deletion
    pub public_id: String,
    /// Alternative text, defaults to the product name
    pub alt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_the_comma_joined_form() {
        let joined = join_tags(&[
            "wireless".to_string(),
            " audio ".to_string(),
            String::new(),
        ]);
        assert_eq!(joined, "wireless,audio");
        assert_eq!(split_tags(&joined), vec!["wireless", "audio"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn category_parses_its_wire_form() {
        assert_eq!(Category::parse("Electronics"), Some(Category::Electronics));
        assert_eq!(Category::parse("Home & Garden"), Some(Category::HomeGarden));
        assert_eq!(Category::parse("Groceries"), None);
        assert_eq!(Category::HomeGarden.as_str(), "Home & Garden");
    }

    #[test]
    fn malformed_images_column_yields_no_refs() {
        let model = Model {
            id: Uuid::new_v4(),
            name: "Widget".into(),
            description: "A widget".into(),
            price: rust_decimal_macros::dec!(9.99),
            category: Category::Electronics,
            stock: 3,
            tags: String::new(),
            featured: false,
            images: serde_json::json!({"not": "an array"}),
            is_active: true,
            created_by: Uuid::new_v4(),
            updated_by: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(model.image_refs().is_empty());
    }
}
