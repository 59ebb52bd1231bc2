mod common;

use chrono::Utc;
use sea_orm::{ConnectionTrait, Statement};

use engine::{CheckoutCmd, Engine, EngineError, MoneyCents, Role};
use uuid::Uuid;

use common::{ALICE, BOB, CAROL, PLATFORM, count, course, engine_with_db, migrated_db};

#[tokio::test]
async fn checkout_whole_cart_splits_and_credits() {
    let (engine, db) = engine_with_db().await;
    let a = course(&engine, "Rust from zero", 100_00).await;
    let b = course(&engine, "Async in depth", 50_00).await;
    engine.add_to_cart(BOB, a.id).await.unwrap();
    engine.add_to_cart(BOB, b.id).await.unwrap();

    let receipt = engine.checkout(CheckoutCmd::all(BOB)).await.unwrap();

    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(receipt.enrolled_course_ids, expected);
    assert!(receipt.already_owned_course_ids.is_empty());
    assert_eq!(receipt.total_charged, MoneyCents::new(150_00));
    assert_eq!(receipt.unsettled_platform_share, MoneyCents::ZERO);

    let for_a = receipt.payments.iter().find(|p| p.course_id == a.id).unwrap();
    assert_eq!(for_a.amount_paid, MoneyCents::new(100_00));
    assert_eq!(for_a.instructor_share, MoneyCents::new(80_00));
    assert_eq!(for_a.platform_share, MoneyCents::new(20_00));
    let for_b = receipt.payments.iter().find(|p| p.course_id == b.id).unwrap();
    assert_eq!(for_b.instructor_share, MoneyCents::new(40_00));
    assert_eq!(for_b.platform_share, MoneyCents::new(10_00));
    for payment in &receipt.payments {
        assert_eq!(
            payment.instructor_share + payment.platform_share,
            payment.amount_paid
        );
        assert_eq!(payment.platform_account_id.as_deref(), Some(PLATFORM));
    }

    assert_eq!(engine.balance(ALICE).await.unwrap(), MoneyCents::new(120_00));
    assert_eq!(engine.balance(PLATFORM).await.unwrap(), MoneyCents::new(30_00));
    assert!(engine.cart(BOB).await.unwrap().is_empty());
    assert_eq!(count(&db, "enrollments").await, 2);
    assert_eq!(count(&db, "payments").await, 2);
}

#[tokio::test]
async fn checkout_selected_leaves_other_cart_rows() {
    let (engine, _db) = engine_with_db().await;
    let a = course(&engine, "A", 10_00).await;
    let b = course(&engine, "B", 20_00).await;
    engine.add_to_cart(BOB, a.id).await.unwrap();
    engine.add_to_cart(BOB, b.id).await.unwrap();

    let receipt = engine
        .checkout(CheckoutCmd::selected(BOB, vec![b.id, Uuid::new_v4()]))
        .await
        .unwrap();

    assert_eq!(receipt.enrolled_course_ids, vec![b.id]);
    let cart = engine.cart(BOB).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].course_id, a.id);
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let (engine, db) = engine_with_db().await;

    let err = engine.checkout(CheckoutCmd::all(BOB)).await.unwrap_err();
    assert_eq!(err, EngineError::EmptyCart("cart is empty".to_string()));

    let err = engine
        .checkout(CheckoutCmd::selected(BOB, vec![]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "empty_cart");

    let a = course(&engine, "A", 10_00).await;
    let err = engine
        .checkout(CheckoutCmd::selected(BOB, vec![a.id]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::EmptyCart("selected courses not in cart".to_string())
    );
    assert_eq!(count(&db, "payments").await, 0);
}

#[tokio::test]
async fn repeated_checkout_charges_once() {
    let (engine, db) = engine_with_db().await;
    let a = course(&engine, "A", 100_00).await;
    engine.add_to_cart(BOB, a.id).await.unwrap();

    engine.checkout(CheckoutCmd::all(BOB)).await.unwrap();
    let err = engine.checkout(CheckoutCmd::all(BOB)).await.unwrap_err();
    assert_eq!(err.kind(), "empty_cart");

    assert_eq!(count(&db, "payments").await, 1);
    assert_eq!(count(&db, "enrollments").await, 1);
    assert_eq!(engine.balance(ALICE).await.unwrap(), MoneyCents::new(80_00));
}

#[tokio::test]
async fn owned_course_cannot_go_back_into_cart() {
    let (engine, _db) = engine_with_db().await;
    let a = course(&engine, "A", 10_00).await;
    engine.add_to_cart(BOB, a.id).await.unwrap();
    engine.checkout(CheckoutCmd::all(BOB)).await.unwrap();

    let err = engine.add_to_cart(BOB, a.id).await.unwrap_err();
    assert_eq!(err.kind(), "already_owned");
}

#[tokio::test]
async fn already_owned_rows_are_dropped_without_charge() {
    let (engine, db) = engine_with_db().await;
    let a = course(&engine, "A", 10_00).await;
    let b = course(&engine, "B", 20_00).await;
    engine.add_to_cart(BOB, a.id).await.unwrap();
    engine.checkout(CheckoutCmd::all(BOB)).await.unwrap();

    // A stale cart row for an owned course, left by another client.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO cart_items (student_id, course_id, added_at) VALUES (?, ?, ?)",
        vec![BOB.into(), a.id.to_string().into(), Utc::now().into()],
    ))
    .await
    .unwrap();
    engine.add_to_cart(BOB, b.id).await.unwrap();

    let receipt = engine.checkout(CheckoutCmd::all(BOB)).await.unwrap();
    assert_eq!(receipt.enrolled_course_ids, vec![b.id]);
    assert_eq!(receipt.already_owned_course_ids, vec![a.id]);
    assert_eq!(receipt.total_charged, MoneyCents::new(20_00));
    assert!(engine.cart(BOB).await.unwrap().is_empty());
    assert_eq!(count(&db, "payments").await, 2);
}

#[tokio::test]
async fn only_owned_rows_in_scope_is_already_owned() {
    let (engine, db) = engine_with_db().await;
    let a = course(&engine, "A", 10_00).await;
    engine.add_to_cart(BOB, a.id).await.unwrap();
    engine.checkout(CheckoutCmd::all(BOB)).await.unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO cart_items (student_id, course_id, added_at) VALUES (?, ?, ?)",
        vec![BOB.into(), a.id.to_string().into(), Utc::now().into()],
    ))
    .await
    .unwrap();

    let err = engine.checkout(CheckoutCmd::all(BOB)).await.unwrap_err();
    assert_eq!(err.kind(), "already_owned");
    // Nothing was committed, the stale row is still there.
    assert_eq!(engine.cart(BOB).await.unwrap().len(), 1);
    assert_eq!(count(&db, "payments").await, 1);
}

#[tokio::test]
async fn resolver_partitions_requested_courses() {
    let (engine, _db) = engine_with_db().await;
    let a = course(&engine, "A", 10_00).await;
    let b = course(&engine, "B", 20_00).await;
    engine.add_to_cart(BOB, a.id).await.unwrap();
    engine.checkout(CheckoutCmd::all(BOB)).await.unwrap();

    let resolution = engine
        .resolve(BOB, &[a.id, b.id, b.id, Uuid::new_v4()])
        .await
        .unwrap();
    assert_eq!(resolution.already_enrolled.into_iter().collect::<Vec<_>>(), vec![a.id]);
    assert_eq!(resolution.to_enroll.into_iter().collect::<Vec<_>>(), vec![b.id]);

    // Another student owns nothing yet.
    let resolution = engine.resolve(CAROL, &[a.id]).await.unwrap();
    assert!(resolution.already_enrolled.is_empty());
    assert_eq!(engine.enrolled_course_ids(BOB).await.unwrap(), vec![a.id]);
}

#[tokio::test]
async fn payment_unique_index_surfaces_as_retryable_conflict() {
    let (engine, db) = engine_with_db().await;
    let a = course(&engine, "A", 10_00).await;
    engine.add_to_cart(BOB, a.id).await.unwrap();
    engine.checkout(CheckoutCmd::all(BOB)).await.unwrap();

    // A writer that enrolled and paid between our resolve and our insert
    // leaves the same footprint: a payment the resolver cannot see.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "DELETE FROM enrollments WHERE student_id = ? AND course_id = ?",
        vec![BOB.into(), a.id.to_string().into()],
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO cart_items (student_id, course_id, added_at) VALUES (?, ?, ?)",
        vec![BOB.into(), a.id.to_string().into(), Utc::now().into()],
    ))
    .await
    .unwrap();

    let err = engine.checkout(CheckoutCmd::all(BOB)).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
    assert!(err.is_retryable());
    assert_eq!(err.kind(), "conflict");

    // Rolled back: no enrollment, no second credit, cart row kept.
    assert_eq!(count(&db, "enrollments").await, 0);
    assert_eq!(count(&db, "payments").await, 1);
    assert_eq!(engine.balance(ALICE).await.unwrap(), MoneyCents::new(8_00));
    assert_eq!(engine.cart(BOB).await.unwrap().len(), 1);
}

// The in-memory pool has one connection, so the two checkouts run back to
// back and the second one finds the cart already cleared.
#[tokio::test]
async fn interleaved_checkouts_enroll_once() {
    let (engine, db) = engine_with_db().await;
    let a = course(&engine, "A", 100_00).await;
    engine.add_to_cart(BOB, a.id).await.unwrap();

    let (first, second) = tokio::join!(
        engine.checkout(CheckoutCmd::all(BOB)),
        engine.checkout(CheckoutCmd::all(BOB))
    );
    let successes = [first.is_ok(), second.is_ok()]
        .into_iter()
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(count(&db, "payments").await, 1);
    assert_eq!(engine.balance(ALICE).await.unwrap(), MoneyCents::new(80_00));
}

#[tokio::test]
async fn missing_platform_account_leaves_share_unsettled() {
    let db = migrated_db().await;
    let engine = Engine::builder()
        .database(db.clone())
        .platform_account("nobody")
        .build()
        .await
        .unwrap();
    engine
        .create_user(ALICE, "Alice", Role::Instructor)
        .await
        .unwrap();
    engine.create_user(BOB, "Bob", Role::Student).await.unwrap();
    let a = course(&engine, "A", 100_00).await;
    engine.add_to_cart(BOB, a.id).await.unwrap();

    let receipt = engine.checkout(CheckoutCmd::all(BOB)).await.unwrap();

    assert_eq!(receipt.unsettled_platform_share, MoneyCents::new(20_00));
    assert_eq!(receipt.payments[0].platform_account_id, None);
    assert_eq!(engine.balance(ALICE).await.unwrap(), MoneyCents::new(80_00));
    assert_eq!(
        engine.unsettled_platform_total().await.unwrap(),
        MoneyCents::new(20_00)
    );
    assert_eq!(count(&db, "payments").await, 1);
}

#[tokio::test]
async fn balances_match_the_ledger_after_checkout() {
    let (engine, _db) = engine_with_db().await;
    let a = course(&engine, "A", 19_99).await;
    engine.add_to_cart(BOB, a.id).await.unwrap();
    engine.add_to_cart(CAROL, a.id).await.unwrap();
    engine.checkout(CheckoutCmd::all(BOB)).await.unwrap();
    engine.checkout(CheckoutCmd::all(CAROL)).await.unwrap();

    for user in [ALICE, PLATFORM] {
        let audit = engine.audit_balance(user).await.unwrap();
        assert!(audit.is_consistent(), "{user} drifted: {audit:?}");
    }
    // 19.99 * 0.8 = 15.992 -> 15.99
    assert_eq!(engine.balance(ALICE).await.unwrap(), MoneyCents::new(31_98));
    assert_eq!(engine.balance(PLATFORM).await.unwrap(), MoneyCents::new(8_00));
}
