//! Create `offering` and `offering_student` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Offering::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Offering::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Offering::CourseSecId).string_len(64).not_null())
                    .col(ColumnDef::new(Offering::Title).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Offering::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_offering_course_sec_id")
                    .table(Offering::Table)
                    .col(Offering::CourseSecId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OfferingStudent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OfferingStudent::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OfferingStudent::OfferingId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(OfferingStudent::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(OfferingStudent::EnrolledAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offering_student_offering")
                            .from(OfferingStudent::Table, OfferingStudent::OfferingId)
                            .to(Offering::Table, Offering::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offering_student_user")
                            .from(OfferingStudent::Table, OfferingStudent::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One enrollment per student and offering
        manager
            .create_index(
                Index::create()
                    .name("idx_offering_student_unique")
                    .table(OfferingStudent::Table)
                    .col(OfferingStudent::OfferingId)
                    .col(OfferingStudent::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_offering_student_user_id")
                    .table(OfferingStudent::Table)
                    .col(OfferingStudent::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OfferingStudent::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Offering::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Offering {
    Table,
    Id,
    CourseSecId,
    Title,
    CreatedAt,
}

#[derive(Iden)]
enum OfferingStudent {
    Table,
    Id,
    OfferingId,
    UserId,
    EnrolledAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
