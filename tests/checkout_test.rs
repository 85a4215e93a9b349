//! Cart, checkout, settlement and earnings against a real schema.

mod common;

use rust_decimal_macros::dec;
use tokio_test::assert_ok;

use common::{engine, engine_with_policy};
use course_engine::domain::{PaymentPolicy, PaymentStatus, UserRole};
use course_engine::errors::AppError;
use course_engine::infra::{Persistence, PurchaseLine, UnitOfWork};
use course_engine::services::ServiceContainer;
use course_engine::types::PaginationParams;

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_is_created_on_first_read_and_reused() {
    let engine = engine().await;
    let student = engine.actor("sam", UserRole::Student).await;

    let first = assert_ok!(engine.services.carts().get_cart(&student).await);
    let second = assert_ok!(engine.services.carts().get_cart(&student).await);

    assert_eq!(first.id, second.id);
    assert!(first.items.is_empty());
    assert_eq!(first.total_price, dec!(0));
}

#[tokio::test]
async fn test_add_item_error_cases() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let other = engine.actor("olga", UserRole::Student).await;
    let course = engine.course(&instructor, "Rust Basics", dec!(10.00)).await;

    let carts = engine.services.carts();
    let cart = carts.get_cart(&student).await.unwrap();
    let other_cart = carts.get_cart(&other).await.unwrap();

    let missing = carts.add_item(&student, cart.id, None).await;
    assert!(matches!(missing, Err(AppError::Validation(ref m)) if m == "course_id is required"));

    let foreign = carts.add_item(&student, other_cart.id, Some(course.id)).await;
    assert!(matches!(foreign, Err(AppError::NotFound(ref m)) if m == "Cart not found"));

    let unknown = carts.add_item(&student, cart.id, Some(course.id + 100)).await;
    assert!(matches!(unknown, Err(AppError::NotFound(ref m)) if m == "Invalid course_id"));

    let added = carts.add_item(&student, cart.id, Some(course.id)).await.unwrap();
    assert_eq!(added.items.len(), 1);
    assert_eq!(added.total_price, dec!(10.00));

    let duplicate = carts.add_item(&student, cart.id, Some(course.id)).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(ref m)) if m == "Item already in the cart"));
}

#[tokio::test]
async fn test_remove_item() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let course = engine.course(&instructor, "Rust Basics", dec!(10.00)).await;

    let carts = engine.services.carts();
    let cart = carts.get_cart(&student).await.unwrap();
    let cart = carts.add_item(&student, cart.id, Some(course.id)).await.unwrap();
    let item_id = cart.items[0].id;

    let emptied = carts.remove_item(&student, cart.id, item_id).await.unwrap();
    assert!(emptied.items.is_empty());

    let again = carts.remove_item(&student, cart.id, item_id).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_admin_has_no_cart() {
    let engine = engine().await;
    let admin = engine.actor("ada", UserRole::Admin).await;

    let cart = engine.services.carts().get_cart(&admin).await;
    assert!(matches!(cart, Err(AppError::Forbidden(_))));

    let checkout = engine.services.checkout().checkout(&admin).await;
    assert!(matches!(checkout, Err(AppError::Forbidden(_))));
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_two_courses() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let a = engine.course(&instructor, "Course A", dec!(10.00)).await;
    let b = engine.course(&instructor, "Course B", dec!(20.00)).await;

    let carts = engine.services.carts();
    let cart = carts.get_cart(&student).await.unwrap();
    carts.add_item(&student, cart.id, Some(a.id)).await.unwrap();
    let cart = carts.add_item(&student, cart.id, Some(b.id)).await.unwrap();
    assert_eq!(cart.total_price, dec!(30.00));

    let order = engine.services.checkout().checkout(&student).await.unwrap();

    assert_eq!(order.order.payment_status, PaymentStatus::Complete);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total_price, dec!(30.00));
    let mut prices: Vec<_> = order.items.iter().map(|i| i.price).collect();
    prices.sort();
    assert_eq!(prices, vec![dec!(10.00), dec!(20.00)]);
    assert!(order.items.iter().all(|i| i.instructor_id == instructor.id));

    // The old cart is gone; the next read starts an empty one
    let fresh = carts.get_cart(&student).await.unwrap();
    assert_ne!(fresh.id, cart.id);
    assert!(fresh.items.is_empty());

    // Enrollment effects
    for course in [&a, &b] {
        let progress = engine.services.progress().get_progress(&student, course.id).await.unwrap();
        assert_eq!(progress.progress, dec!(0));
        assert!(!progress.completed);

        let stored = engine.services.catalog().get_course(course.id).await.unwrap();
        assert_eq!(stored.number_of_students, 1);
    }

    // One alert per course for the instructor, one confirmation per course for the buyer
    let instructor_titles = engine.notifier.titles_for(instructor.id);
    assert_eq!(instructor_titles, vec!["New Course Purchase", "New Course Purchase"]);
    let student_titles = engine.notifier.titles_for(student.id);
    assert_eq!(student_titles, vec!["Purchase Confirmation", "Purchase Confirmation"]);
}

#[tokio::test]
async fn test_checkout_empty_cart() {
    let engine = engine().await;
    let student = engine.actor("sam", UserRole::Student).await;

    let no_cart = engine.services.checkout().checkout(&student).await;
    assert!(matches!(no_cart, Err(AppError::Validation(ref m)) if m == "Cart is empty"));

    engine.services.carts().get_cart(&student).await.unwrap();
    let empty = engine.services.checkout().checkout(&student).await;
    assert!(matches!(empty, Err(AppError::Validation(ref m)) if m == "Cart is empty"));
}

#[tokio::test]
async fn test_duplicate_purchase_is_rejected_without_side_effects() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let a = engine.course(&instructor, "Course A", dec!(10.00)).await;
    let c = engine.course(&instructor, "Course C", dec!(30.00)).await;

    engine.buy(&student, &[a.id]).await;
    let notified = engine.notifier.sent().len();

    // A is already owned, C is new: the whole checkout fails
    let carts = engine.services.carts();
    let cart = carts.get_cart(&student).await.unwrap();
    carts.add_item(&student, cart.id, Some(a.id)).await.unwrap();
    carts.add_item(&student, cart.id, Some(c.id)).await.unwrap();

    let result = engine.services.checkout().checkout(&student).await;
    match result {
        Err(AppError::Conflict(message)) => assert!(message.contains(&a.id.to_string())),
        other => panic!("expected conflict, got {:?}", other.map(|o| o.order.id)),
    }

    // Cart untouched, no order or enrollment for C, nothing sent
    let cart_after = carts.get_cart(&student).await.unwrap();
    assert_eq!(cart_after.id, cart.id);
    assert_eq!(cart_after.items.len(), 2);

    let (orders, total) = engine
        .services
        .checkout()
        .list_orders(&student, PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(orders[0].items.len(), 1);
    assert_eq!(orders[0].items[0].course_id, a.id);

    let progress_c = engine.services.progress().get_progress(&student, c.id).await;
    assert!(matches!(progress_c, Err(AppError::Forbidden(_))));
    assert_eq!(engine.services.catalog().get_course(c.id).await.unwrap().number_of_students, 0);
    assert_eq!(engine.notifier.sent().len(), notified);
}

#[tokio::test]
async fn test_instructor_can_buy_another_instructors_course() {
    let engine = engine().await;
    let author = engine.actor("ines", UserRole::Instructor).await;
    let buyer = engine.actor("ivan", UserRole::Instructor).await;
    let course = engine.course(&author, "Course A", dec!(12.50)).await;

    engine.buy(&buyer, &[course.id]).await;

    let progress = engine.services.progress().get_progress(&buyer, course.id).await;
    assert!(progress.is_ok());
}

#[tokio::test]
async fn test_purchase_index_rejects_duplicate_order_item() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let course = engine.course(&instructor, "Raced", dec!(10.00)).await;
    engine.buy(&student, &[course.id]).await;

    // Skip the service-level check, as a racing checkout would
    let uow = Persistence::new(engine.connection.clone());
    let student_id = student.id;
    let line = PurchaseLine {
        course_id: course.id,
        instructor_id: instructor.id,
        price: course.price,
    };
    let result = course_engine::with_transaction!(uow, |ctx| {
        let customer = ctx
            .accounts()
            .find_customer_by_user(student_id)
            .await?
            .ok_or_else(|| AppError::not_found("Customer not found"))?;
        let order = ctx.orders().create(customer.id, PaymentStatus::Complete).await?;
        ctx.orders().add_item(&order, &line).await
    });
    assert!(matches!(
        result,
        Err(AppError::Conflict(ref m)) if m.contains(&course.id.to_string())
    ));

    // The rolled-back order left nothing behind
    let (orders, total) = engine
        .services
        .checkout()
        .list_orders(&student, PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(orders[0].items.len(), 1);
    assert_eq!(engine.services.catalog().get_course(course.id).await.unwrap().number_of_students, 1);
}

#[tokio::test]
async fn test_list_orders_for_caller_only() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let other = engine.actor("olga", UserRole::Student).await;
    let a = engine.course(&instructor, "Course A", dec!(10.00)).await;
    let b = engine.course(&instructor, "Course B", dec!(20.00)).await;

    engine.buy(&student, &[a.id]).await;
    engine.buy(&student, &[b.id]).await;
    engine.buy(&other, &[a.id]).await;

    let (orders, total) = engine
        .services
        .checkout()
        .list_orders(&student, PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(orders.len(), 2);

    let admin = engine.actor("ada", UserRole::Admin).await;
    let (none, total) = engine
        .services
        .checkout()
        .list_orders(&admin, PaginationParams::default())
        .await
        .unwrap();
    assert!(none.is_empty());
    assert_eq!(total, 0);
}

// =============================================================================
// Settlement
// =============================================================================

#[tokio::test]
async fn test_pending_order_grants_nothing_until_settled() {
    let engine = engine_with_policy(PaymentPolicy::AwaitSettlement).await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let admin = engine.actor("ada", UserRole::Admin).await;
    let course = engine.course(&instructor, "Course A", dec!(40.00)).await;

    engine.buy(&student, &[course.id]).await;
    let (orders, _) = engine
        .services
        .checkout()
        .list_orders(&student, PaginationParams::default())
        .await
        .unwrap();
    let order = &orders[0];
    assert_eq!(order.order.payment_status, PaymentStatus::Pending);

    let denied = engine.services.progress().get_progress(&student, course.id).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
    assert!(engine.notifier.sent().is_empty());

    // Only admins settle, and only to a final status
    let by_student = engine
        .services
        .checkout()
        .settle_order(&student, order.order.id, PaymentStatus::Complete)
        .await;
    assert!(matches!(by_student, Err(AppError::Forbidden(_))));
    let to_pending = engine
        .services
        .checkout()
        .settle_order(&admin, order.order.id, PaymentStatus::Pending)
        .await;
    assert!(matches!(to_pending, Err(AppError::Validation(_))));

    let settled = engine
        .services
        .checkout()
        .settle_order(&admin, order.order.id, PaymentStatus::Complete)
        .await
        .unwrap();
    assert_eq!(settled.order.payment_status, PaymentStatus::Complete);

    let progress = engine.services.progress().get_progress(&student, course.id).await;
    assert!(progress.is_ok());
    assert_eq!(engine.services.catalog().get_course(course.id).await.unwrap().number_of_students, 1);
    assert_eq!(engine.notifier.titles_for(instructor.id), vec!["New Course Purchase"]);

    let again = engine
        .services
        .checkout()
        .settle_order(&admin, order.order.id, PaymentStatus::Failed)
        .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let unknown = engine
        .services
        .checkout()
        .settle_order(&admin, order.order.id + 100, PaymentStatus::Complete)
        .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_failed_order_grants_nothing() {
    let engine = engine_with_policy(PaymentPolicy::AwaitSettlement).await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let admin = engine.actor("ada", UserRole::Admin).await;
    let course = engine.course(&instructor, "Course A", dec!(40.00)).await;

    engine.buy(&student, &[course.id]).await;
    let (orders, _) = engine
        .services
        .checkout()
        .list_orders(&student, PaginationParams::default())
        .await
        .unwrap();

    let failed = engine
        .services
        .checkout()
        .settle_order(&admin, orders[0].order.id, PaymentStatus::Failed)
        .await
        .unwrap();
    assert_eq!(failed.order.payment_status, PaymentStatus::Failed);

    let denied = engine.services.progress().get_progress(&student, course.id).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
    assert!(engine.notifier.sent().is_empty());
}

// =============================================================================
// Earnings
// =============================================================================

#[tokio::test]
async fn test_earnings_are_net_of_deduction() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let first = engine.actor("sam", UserRole::Student).await;
    let second = engine.actor("olga", UserRole::Student).await;
    let a = engine.course(&instructor, "Course A", dec!(10.00)).await;
    let b = engine.course(&instructor, "Course B", dec!(20.00)).await;

    engine.buy(&first, &[a.id, b.id]).await;
    let report = engine.services.earnings().get_earnings(&instructor, instructor.id).await.unwrap();
    assert_eq!(report.earnings_after_deduction, dec!(15.00));
    assert_eq!(report.total_students_enrolled, 1);
    assert!(report.last_payout.is_none());

    engine.buy(&second, &[a.id]).await;
    let report = engine.services.earnings().get_earnings(&instructor, instructor.id).await.unwrap();
    assert_eq!(report.earnings_after_deduction, dec!(20.00));
    assert_eq!(report.total_students_enrolled, 2);
}

#[tokio::test]
async fn test_earnings_visibility() {
    let engine = engine().await;
    let instructor = engine.actor("ines", UserRole::Instructor).await;
    let rival = engine.actor("ivan", UserRole::Instructor).await;
    let student = engine.actor("sam", UserRole::Student).await;
    let admin = engine.actor("ada", UserRole::Admin).await;

    let by_rival = engine.services.earnings().get_earnings(&rival, instructor.id).await;
    assert!(matches!(by_rival, Err(AppError::Forbidden(_))));

    let by_student = engine.services.earnings().get_earnings(&student, instructor.id).await;
    assert!(matches!(by_student, Err(AppError::Forbidden(_))));

    let by_admin = engine.services.earnings().get_earnings(&admin, instructor.id).await.unwrap();
    assert_eq!(by_admin.earnings_after_deduction, dec!(0));
    assert_eq!(by_admin.total_students_enrolled, 0);

    let not_instructor = engine.services.earnings().get_earnings(&admin, student.id).await;
    assert!(matches!(not_instructor, Err(AppError::NotFound(_))));
}
