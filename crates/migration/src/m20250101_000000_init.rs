//! Initial schema migration.
//!
//! Creates the ledger tables:
//!
//! - `users`: accounts and their earned-but-not-withdrawn balance
//! - `courses`: priced courses owned by an instructor
//! - `course_contents`: lessons, removed with their course
//! - `cart_items` / `favorite_courses`: per-student saved courses
//! - `enrollments`: one per (student, course)
//! - `payments`: immutable purchase records, one per (student, course)
//! - `withdrawals`: immutable payout history

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    FullName,
    Role,
    BalanceMinor,
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
    Title,
    PriceMinor,
    InstructorId,
    CreatedAt,
}

#[derive(Iden)]
enum CourseContents {
    Table,
    Id,
    CourseId,
    Title,
    Position,
}

#[derive(Iden)]
enum CartItems {
    Table,
    StudentId,
    CourseId,
    AddedAt,
}

#[derive(Iden)]
enum FavoriteCourses {
    Table,
    StudentId,
    CourseId,
    AddedAt,
}

#[derive(Iden)]
enum Enrollments {
    Table,
    Id,
    StudentId,
    CourseId,
    EnrolledAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    StudentId,
    CourseId,
    InstructorId,
    AmountPaidMinor,
    InstructorShareMinor,
    PlatformShareMinor,
    PlatformAccountId,
    PaidAt,
}

#[derive(Iden)]
enum Withdrawals {
    Table,
    Id,
    InstructorId,
    AmountMinor,
    Destination,
    WithdrawnAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::FullName).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(
                        ColumnDef::new(Users::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Courses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(ColumnDef::new(Courses::PriceMinor).big_integer().not_null())
                    .col(ColumnDef::new(Courses::InstructorId).string().not_null())
                    .col(ColumnDef::new(Courses::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-courses-instructor_id")
                            .from(Courses::Table, Courses::InstructorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-courses-instructor_id")
                    .table(Courses::Table)
                    .col(Courses::InstructorId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Course contents
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CourseContents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseContents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CourseContents::CourseId).string().not_null())
                    .col(ColumnDef::new(CourseContents::Title).string().not_null())
                    .col(ColumnDef::new(CourseContents::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-course_contents-course_id")
                            .from(CourseContents::Table, CourseContents::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-course_contents-course_id")
                    .table(CourseContents::Table)
                    .col(CourseContents::CourseId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Cart items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CartItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CartItems::StudentId).string().not_null())
                    .col(ColumnDef::new(CartItems::CourseId).string().not_null())
                    .col(ColumnDef::new(CartItems::AddedAt).timestamp().not_null())
                    .primary_key(
                        Index::create()
                            .col(CartItems::StudentId)
                            .col(CartItems::CourseId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cart_items-student_id")
                            .from(CartItems::Table, CartItems::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cart_items-course_id")
                            .from(CartItems::Table, CartItems::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Favorite courses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(FavoriteCourses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FavoriteCourses::StudentId).string().not_null())
                    .col(ColumnDef::new(FavoriteCourses::CourseId).string().not_null())
                    .col(ColumnDef::new(FavoriteCourses::AddedAt).timestamp().not_null())
                    .primary_key(
                        Index::create()
                            .col(FavoriteCourses::StudentId)
                            .col(FavoriteCourses::CourseId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-favorite_courses-student_id")
                            .from(FavoriteCourses::Table, FavoriteCourses::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-favorite_courses-course_id")
                            .from(FavoriteCourses::Table, FavoriteCourses::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Enrollments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enrollments::StudentId).string().not_null())
                    .col(ColumnDef::new(Enrollments::CourseId).string().not_null())
                    .col(ColumnDef::new(Enrollments::EnrolledAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-student_id")
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-course_id")
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-enrollments-student_id-course_id-unique")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .col(Enrollments::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Payments::StudentId).string().not_null())
                    .col(ColumnDef::new(Payments::CourseId).string().not_null())
                    .col(ColumnDef::new(Payments::InstructorId).string().not_null())
                    .col(
                        ColumnDef::new(Payments::AmountPaidMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payments::InstructorShareMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payments::PlatformShareMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::PlatformAccountId).string())
                    .col(ColumnDef::new(Payments::PaidAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-course_id")
                            .from(Payments::Table, Payments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-student_id")
                            .from(Payments::Table, Payments::StudentId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-student_id-course_id-unique")
                    .table(Payments::Table)
                    .col(Payments::StudentId)
                    .col(Payments::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-course_id")
                    .table(Payments::Table)
                    .col(Payments::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-instructor_id")
                    .table(Payments::Table)
                    .col(Payments::InstructorId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Withdrawals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Withdrawals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Withdrawals::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Withdrawals::InstructorId).string().not_null())
                    .col(ColumnDef::new(Withdrawals::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Withdrawals::Destination).string().not_null())
                    .col(ColumnDef::new(Withdrawals::WithdrawnAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-withdrawals-instructor_id")
                            .from(Withdrawals::Table, Withdrawals::InstructorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-withdrawals-instructor_id-withdrawn_at")
                    .table(Withdrawals::Table)
                    .col(Withdrawals::InstructorId)
                    .col(Withdrawals::WithdrawnAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Withdrawals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FavoriteCourses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CartItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseContents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
