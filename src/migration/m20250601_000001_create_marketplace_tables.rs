use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

use crate::entity::{
    AuditLogs, CartItems, Carts, OrderItems, Orders, Products, Users, cart_items, order_items,
    orders, products,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Parents first so foreign keys resolve.
        create_entity(manager, &schema, Users).await?;
        create_entity(manager, &schema, Products).await?;
        create_entity(manager, &schema, Carts).await?;
        create_entity(manager, &schema, CartItems).await?;
        create_entity(manager, &schema, Orders).await?;
        create_entity(manager, &schema, OrderItems).await?;
        create_entity(manager, &schema, AuditLogs).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_farmer_id")
                    .table(Products)
                    .col(products::Column::FarmerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_user_id")
                    .table(Orders)
                    .col(orders::Column::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_order_items_order_id")
                    .table(OrderItems)
                    .col(order_items::Column::OrderId)
                    .to_owned(),
            )
            .await?;
        // At most one line per product in a cart.
        manager
            .create_index(
                Index::create()
                    .name("uq_cart_items_cart_product")
                    .table(CartItems)
                    .col(cart_items::Column::CartId)
                    .col(cart_items::Column::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderItems).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CartItems).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Carts).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

async fn create_entity<E>(manager: &SchemaManager<'_>, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    manager
        .create_table(schema.create_table_from_entity(entity))
        .await
}
