//! Migration: course progress, quiz state and ratings.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CourseProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseProgress::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CourseProgress::StudentId).uuid().not_null())
                    .col(ColumnDef::new(CourseProgress::CourseId).integer().not_null())
                    .col(ColumnDef::new(CourseProgress::Progress).decimal_len(5, 2).not_null())
                    .col(
                        ColumnDef::new(CourseProgress::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CourseProgress::LastAccessed)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_progress_course")
                            .from(CourseProgress::Table, CourseProgress::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_course_progress_student_course")
                    .table(CourseProgress::Table)
                    .col(CourseProgress::StudentId)
                    .col(CourseProgress::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CompletedLessons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompletedLessons::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CompletedLessons::ProgressId).integer().not_null())
                    .col(ColumnDef::new(CompletedLessons::LessonId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_completed_lessons_progress")
                            .from(CompletedLessons::Table, CompletedLessons::ProgressId)
                            .to(CourseProgress::Table, CourseProgress::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_completed_lessons_lesson")
                            .from(CompletedLessons::Table, CompletedLessons::LessonId)
                            .to(Lessons::Table, Lessons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_completed_lessons_progress_lesson")
                    .table(CompletedLessons::Table)
                    .col(CompletedLessons::ProgressId)
                    .col(CompletedLessons::LessonId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StudentScores::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentScores::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StudentScores::StudentId).uuid().not_null())
                    .col(ColumnDef::new(StudentScores::SectionId).integer().not_null())
                    .col(ColumnDef::new(StudentScores::Score).decimal_len(5, 2).not_null())
                    .col(
                        ColumnDef::new(StudentScores::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(StudentScores::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_scores_section")
                            .from(StudentScores::Table, StudentScores::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_student_scores_student_section")
                    .table(StudentScores::Table)
                    .col(StudentScores::StudentId)
                    .col(StudentScores::SectionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StudentAnswers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentAnswers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StudentAnswers::StudentId).uuid().not_null())
                    .col(ColumnDef::new(StudentAnswers::QuestionId).integer().not_null())
                    .col(ColumnDef::new(StudentAnswers::SelectedOptionId).integer().null())
                    .col(
                        ColumnDef::new(StudentAnswers::AnsweredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_answers_question")
                            .from(StudentAnswers::Table, StudentAnswers::QuestionId)
                            .to(Questions::Table, Questions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_answers_option")
                            .from(StudentAnswers::Table, StudentAnswers::SelectedOptionId)
                            .to(AnswerOptions::Table, AnswerOptions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_student_answers_student_question")
                    .table(StudentAnswers::Table)
                    .col(StudentAnswers::StudentId)
                    .col(StudentAnswers::QuestionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SectionAttempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SectionAttempts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SectionAttempts::StudentId).uuid().not_null())
                    .col(ColumnDef::new(SectionAttempts::SectionId).integer().not_null())
                    .col(
                        ColumnDef::new(SectionAttempts::AttemptCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_section_attempts_section")
                            .from(SectionAttempts::Table, SectionAttempts::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_section_attempts_student_section")
                    .table(SectionAttempts::Table)
                    .col(SectionAttempts::StudentId)
                    .col(SectionAttempts::SectionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ratings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ratings::UserId).uuid().not_null())
                    .col(ColumnDef::new(Ratings::CourseId).integer().not_null())
                    .col(ColumnDef::new(Ratings::Score).decimal_len(3, 2).not_null())
                    .col(ColumnDef::new(Ratings::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Ratings::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ratings_course")
                            .from(Ratings::Table, Ratings::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One rating per user per course
        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_user_course")
                    .table(Ratings::Table)
                    .col(Ratings::UserId)
                    .col(Ratings::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ratings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SectionAttempts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentAnswers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentScores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CompletedLessons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseProgress::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
}

#[derive(Iden)]
enum Sections {
    Table,
    Id,
}

#[derive(Iden)]
enum Lessons {
    Table,
    Id,
}

#[derive(Iden)]
enum Questions {
    Table,
    Id,
}

#[derive(Iden)]
enum AnswerOptions {
    Table,
    Id,
}

#[derive(Iden)]
enum CourseProgress {
    Table,
    Id,
    StudentId,
    CourseId,
    Progress,
    Completed,
    LastAccessed,
}

#[derive(Iden)]
enum CompletedLessons {
    Table,
    Id,
    ProgressId,
    LessonId,
}

#[derive(Iden)]
enum StudentScores {
    Table,
    Id,
    StudentId,
    SectionId,
    Score,
    Completed,
    UpdatedAt,
}

#[derive(Iden)]
enum StudentAnswers {
    Table,
    Id,
    StudentId,
    QuestionId,
    SelectedOptionId,
    AnsweredAt,
}

#[derive(Iden)]
enum SectionAttempts {
    Table,
    Id,
    StudentId,
    SectionId,
    AttemptCount,
}

#[derive(Iden)]
enum Ratings {
    Table,
    Id,
    UserId,
    CourseId,
    Score,
    CreatedAt,
    UpdatedAt,
}
