//! Menu item database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::MenuItem;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: String,
    pub calories: i32,
    pub protein: i32,
    pub image: String,
    pub category: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MenuItem {
    fn from(model: Model) -> Self {
        MenuItem {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            calories: model.calories,
            protein: model.protein,
            image: model.image,
            category: model.category,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&MenuItem> for ActiveModel {
    fn from(item: &MenuItem) -> Self {
        ActiveModel {
            id: Set(item.id),
            name: Set(item.name.clone()),
            description: Set(item.description.clone()),
            price: Set(item.price.clone()),
            calories: Set(item.calories),
            protein: Set(item.protein),
            image: Set(item.image.clone()),
            category: Set(item.category.clone()),
            created_at: Set(item.created_at),
            updated_at: Set(item.updated_at),
        }
    }
}
