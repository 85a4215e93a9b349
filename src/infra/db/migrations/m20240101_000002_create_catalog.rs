//! Migration: collections, courses, sections, lessons and quiz questions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Collections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Collections::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Collections::Title).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(ColumnDef::new(Courses::Description).text().not_null())
                    .col(ColumnDef::new(Courses::Price).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Courses::Currency).string_len(10).not_null())
                    .col(ColumnDef::new(Courses::Level).string_len(12).not_null())
                    .col(ColumnDef::new(Courses::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Courses::CollectionId).integer().not_null())
                    .col(ColumnDef::new(Courses::InstructorId).uuid().not_null())
                    .col(ColumnDef::new(Courses::Preview).string().not_null().unique_key())
                    .col(ColumnDef::new(Courses::RatingCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Courses::AverageRating).double().not_null().default(0.0))
                    .col(ColumnDef::new(Courses::NumberOfStudents).integer().not_null().default(0))
                    .col(ColumnDef::new(Courses::TotalDuration).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Courses::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).timestamp_with_time_zone().not_null())
                    // Collections cannot be removed while courses reference them
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_collection")
                            .from(Courses::Table, Courses::CollectionId)
                            .to(Collections::Table, Collections::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_instructor")
                            .from(Courses::Table, Courses::InstructorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sections::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sections::CourseId).integer().not_null())
                    .col(ColumnDef::new(Sections::Title).string().not_null())
                    .col(ColumnDef::new(Sections::Position).integer().not_null())
                    .col(ColumnDef::new(Sections::Locked).boolean().not_null().default(false))
                    .col(ColumnDef::new(Sections::IsDefault).boolean().not_null().default(false))
                    .col(ColumnDef::new(Sections::NumberOfLessons).integer().not_null().default(0))
                    .col(ColumnDef::new(Sections::TotalDuration).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Sections::LessonsIssued).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sections_course")
                            .from(Sections::Table, Sections::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sections_course_position")
                    .table(Sections::Table)
                    .col(Sections::CourseId)
                    .col(Sections::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Lessons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Lessons::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Lessons::SectionId).integer().not_null())
                    .col(ColumnDef::new(Lessons::Title).string().not_null())
                    .col(ColumnDef::new(Lessons::File).string().null().unique_key())
                    .col(ColumnDef::new(Lessons::LessonOrder).integer().not_null())
                    .col(ColumnDef::new(Lessons::Duration).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Lessons::IsActive).boolean().not_null().default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lessons_section")
                            .from(Lessons::Table, Lessons::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Questions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Questions::SectionId).integer().not_null())
                    .col(ColumnDef::new(Questions::Text).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_questions_section")
                            .from(Questions::Table, Questions::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AnswerOptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnswerOptions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AnswerOptions::QuestionId).integer().not_null())
                    .col(ColumnDef::new(AnswerOptions::Text).string().not_null())
                    .col(ColumnDef::new(AnswerOptions::IsCorrect).boolean().not_null().default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answer_options_question")
                            .from(AnswerOptions::Table, AnswerOptions::QuestionId)
                            .to(Questions::Table, Questions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnswerOptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Questions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lessons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Collections::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Collections {
    Table,
    Id,
    Title,
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
    Title,
    Description,
    Price,
    Currency,
    Level,
    IsActive,
    CollectionId,
    InstructorId,
    Preview,
    RatingCount,
    AverageRating,
    NumberOfStudents,
    TotalDuration,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Sections {
    Table,
    Id,
    CourseId,
    Title,
    Position,
    Locked,
    IsDefault,
    NumberOfLessons,
    TotalDuration,
    LessonsIssued,
}

#[derive(Iden)]
enum Lessons {
    Table,
    Id,
    SectionId,
    Title,
    File,
    LessonOrder,
    Duration,
    IsActive,
}

#[derive(Iden)]
enum Questions {
    Table,
    Id,
    SectionId,
    Text,
}

#[derive(Iden)]
enum AnswerOptions {
    Table,
    Id,
    QuestionId,
    Text,
    IsCorrect,
}
