//! Local account provisioning.

mod common;

use uuid::Uuid;

use common::engine;
use course_engine::domain::{Actor, UserRole};
use course_engine::errors::AppError;
use course_engine::infra::{Persistence, UnitOfWork};
use course_engine::services::ServiceContainer;

#[tokio::test]
async fn test_provisioning_is_idempotent() {
    let engine = engine().await;
    let actor = Actor::new(Uuid::new_v4(), "sam@example.com", "Sam", UserRole::Student);
    let accounts = engine.services.accounts();

    let first = accounts.provision(&actor).await.unwrap();
    let second = accounts.provision(&actor).await.unwrap();
    assert_eq!(first.id, second.id);

    // Token values changed upstream are mirrored
    let renamed = Actor { name: "Samuel".into(), ..actor.clone() };
    let third = accounts.provision(&renamed).await.unwrap();
    assert_eq!(third.name, "Samuel");
}

#[tokio::test]
async fn test_existing_customer_row_is_reused() {
    let engine = engine().await;
    let student = engine.actor("sam", UserRole::Student).await;
    let uow = Persistence::new(engine.connection.clone());
    let user_id = student.id;

    // Provisioning already created the row; a late second insert must not fail
    let (existing, again) = course_engine::with_transaction!(uow, |ctx| {
        let existing = ctx
            .accounts()
            .find_customer_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Customer not found"))?;
        let again = ctx.accounts().create_customer(user_id).await?;
        Ok((existing, again))
    })
    .unwrap();
    assert_eq!(existing.id, again.id);

    let customers = course_engine::with_transaction!(uow, |ctx| {
        ctx.accounts().find_customer_by_user(user_id).await
    })
    .unwrap();
    assert_eq!(customers.map(|c| c.id), Some(existing.id));
}

#[tokio::test]
async fn test_admin_gets_no_customer() {
    let engine = engine().await;
    let admin = engine.actor("ada", UserRole::Admin).await;
    let uow = Persistence::new(engine.connection.clone());
    let admin_id = admin.id;

    let customer = course_engine::with_transaction!(uow, |ctx| {
        ctx.accounts().find_customer_by_user(admin_id).await
    })
    .unwrap();
    assert!(customer.is_none());
}
