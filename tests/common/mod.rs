#![allow(dead_code)]

use sea_orm::{ActiveValue::Set, Database, DatabaseConnection, DbErr, EntityTrait, Schema};
use sea_orm_migration::prelude::*;
use selectcrate::Record;
use serde_json::Value;

pub mod catalog;

use catalog::{category, product, product_tag, tag};

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;
    seed_catalog(&db).await?;

    Ok(db)
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateCatalogTables)]
    }
}

pub struct CreateCatalogTables;

#[async_trait::async_trait]
impl MigrationName for CreateCatalogTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_catalog_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateCatalogTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(schema.create_table_from_entity(category::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(tag::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(product::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(product_tag::Entity))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in ["product_tags", "products", "tags", "categories"] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).to_owned())
                .await?;
        }
        Ok(())
    }
}

/// Products by name: Chair(3), Desk(2), Keyboard(5), Lamp(6), Laptop(1), Monitor(4).
///
/// | id | name     | status   | sku  | category  | tags |
/// |----|----------|----------|------|-----------|------|
/// | 1  | Laptop   | active   | LP-1 | Computers | sale |
/// | 2  | Desk     | active   |      | Furniture | sale |
/// | 3  | Chair    | inactive | CH-1 | Furniture |      |
/// | 4  | Monitor  | active   | MN-1 | Computers | new  |
/// | 5  | Keyboard | active   |      | Computers |      |
/// | 6  | Lamp     | inactive |      | Furniture | sale |
async fn seed_catalog(db: &DatabaseConnection) -> Result<(), DbErr> {
    category::Entity::insert_many([
        category::ActiveModel {
            id: Set(1),
            name: Set("Computers".to_string()),
        },
        category::ActiveModel {
            id: Set(2),
            name: Set("Furniture".to_string()),
        },
    ])
    .exec_without_returning(db)
    .await?;

    tag::Entity::insert_many([
        tag::ActiveModel {
            id: Set(1),
            name: Set("sale".to_string()),
        },
        tag::ActiveModel {
            id: Set(2),
            name: Set("new".to_string()),
        },
    ])
    .exec_without_returning(db)
    .await?;

    let products = [
        (1, "Laptop", "active", Some("LP-1"), 1),
        (2, "Desk", "active", None, 2),
        (3, "Chair", "inactive", Some("CH-1"), 2),
        (4, "Monitor", "active", Some("MN-1"), 1),
        (5, "Keyboard", "active", None, 1),
        (6, "Lamp", "inactive", None, 2),
    ];
    product::Entity::insert_many(products.into_iter().map(
        |(id, name, status, sku, category_id)| product::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            status: Set(status.to_string()),
            sku: Set(sku.map(str::to_string)),
            category_id: Set(category_id),
        },
    ))
    .exec_without_returning(db)
    .await?;

    product_tag::Entity::insert_many([(1, 1), (2, 1), (4, 2), (6, 1)].into_iter().map(
        |(product_id, tag_id)| product_tag::ActiveModel {
            product_id: Set(product_id),
            tag_id: Set(tag_id),
        },
    ))
    .exec_without_returning(db)
    .await?;

    Ok(())
}

pub fn names(records: &[Record]) -> Vec<&str> {
    records
        .iter()
        .map(|record| record.get("name").and_then(Value::as_str).unwrap())
        .collect()
}

pub fn ids(records: &[Record]) -> Vec<i64> {
    records
        .iter()
        .map(|record| record.get("id").and_then(Value::as_i64).unwrap())
        .collect()
}
