//! Menu item entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dish on the menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Price as a decimal string
    pub price: String,
    pub calories: i32,
    /// Protein in grams
    pub protein: i32,
    /// Image URL
    pub image: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Menu item creation data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMenuItem {
    pub name: String,
    pub description: String,
    pub price: String,
    pub calories: i32,
    pub protein: i32,
    pub image: String,
    pub category: String,
}

/// Partial menu item update; `None` leaves the field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateMenuItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub calories: Option<i32>,
    pub protein: Option<i32>,
    pub image: Option<String>,
    pub category: Option<String>,
}

impl UpdateMenuItem {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl MenuItem {
    /// Build a new menu item with a fresh id
    pub fn create(input: CreateMenuItem) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            calories: input.calories,
            protein: input.protein,
            image: input.image,
            category: input.category,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update
    pub fn apply(&mut self, changes: UpdateMenuItem) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(calories) = changes.calories {
            self.calories = calories;
        }
        if let Some(protein) = changes.protein {
            self.protein = protein;
        }
        if let Some(image) = changes.image {
            self.image = image;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        self.updated_at = Utc::now();
    }
}
