//! End-to-end integration tests for the broadcast coordinator.
//!
//! Drives the full flow against a real database with a recording mail
//! transport: precondition rejection, mutual exclusion, audience fan-out,
//! ledger append, and swallowed per-recipient send failures.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use sqlx::PgPool;

use herald_core::types::DbId;
use herald_db::repositories::DispatchRepo;
use herald_engine::lock::{self, BROADCAST_LOCK_NAME};
use herald_engine::{
    BroadcastConfig, BroadcastCoordinator, BroadcastError, BroadcastOutcome, MailError, Mailer,
    OutgoingEmail,
};

// ---------------------------------------------------------------------------
// Test mailers
// ---------------------------------------------------------------------------

/// Records every send instead of talking to a transport.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Fails every send, for exercising the best-effort fan-out contract.
struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::Build("transport rejected the message".into()))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn test_config() -> BroadcastConfig {
    BroadcastConfig {
        site_url: "https://example.org".into(),
        site_name: "Example Blog".into(),
        lock_timeout: Duration::from_millis(300),
    }
}

fn coordinator(pool: &PgPool, mailer: Arc<dyn Mailer>) -> BroadcastCoordinator {
    BroadcastCoordinator::new(pool.clone(), mailer, test_config())
}

async fn insert_item(pool: &PgPool, title: &str, status: &str, categories: &[DbId]) -> DbId {
    let item_id: DbId = sqlx::query_scalar(
        "INSERT INTO items (title, permalink, author, status) \
         VALUES ($1, 'https://example.org/launch', 'ann', $2) \
         RETURNING id",
    )
    .bind(title)
    .bind(status)
    .fetch_one(pool)
    .await
    .expect("insert item");

    for category_id in categories {
        sqlx::query("INSERT INTO item_categories (item_id, category_id) VALUES ($1, $2)")
            .bind(item_id)
            .bind(category_id)
            .execute(pool)
            .await
            .expect("insert item category");
    }

    item_id
}

async fn insert_subscriber(
    pool: &PgPool,
    email: &str,
    first_name: &str,
    confirmed: bool,
    categories: &[DbId],
) -> DbId {
    let id: DbId = sqlx::query_scalar(
        "INSERT INTO subscribers (email_addr, first_name, confirmed, authcode) \
         VALUES ($1, $2, $3, 'authcode') \
         RETURNING id",
    )
    .bind(email)
    .bind(first_name)
    .bind(confirmed)
    .fetch_one(pool)
    .await
    .expect("insert subscriber");

    for category_id in categories {
        sqlx::query("INSERT INTO subscriber_categories (subscriber_id, category_id) VALUES ($1, $2)")
            .bind(id)
            .bind(category_id)
            .execute(pool)
            .await
            .expect("insert subscriber category");
    }

    id
}

async fn insert_operator(pool: &PgPool, login: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO operators (login) VALUES ($1) RETURNING id")
        .bind(login)
        .fetch_one(pool)
        .await
        .expect("insert operator")
}

async fn dispatch_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, Option<i64>>("SELECT COUNT(*) FROM dispatch_log")
        .fetch_one(pool)
        .await
        .unwrap()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn published_item_reaches_matching_and_sentinel_subscribers(pool: PgPool) {
    let item = insert_item(&pool, "Launch", "published", &[3]).await;
    let operator = insert_operator(&pool, "admin").await;

    let a = insert_subscriber(&pool, "a@example.com", "Ann", true, &[3]).await;
    let _b = insert_subscriber(&pool, "b@example.com", "Bob", true, &[7]).await;
    let c = insert_subscriber(&pool, "c@example.com", "[Unknown]", true, &[0]).await;
    let _d = insert_subscriber(&pool, "d@example.com", "Dee", false, &[3]).await;

    let mailer = Arc::new(RecordingMailer::default());
    let outcome = coordinator(&pool, mailer.clone())
        .broadcast(item, operator)
        .await
        .unwrap();

    assert_matches!(outcome, BroadcastOutcome::Sent { recipients: 2, .. });

    // Audience is {A, C} in subscriber-id order.
    let sent = mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, "a@example.com");
    assert_eq!(sent[1].to, "c@example.com");
    assert!(a < c);

    // Item-level rendering: seeded subject template is "@@blogname: @@posttitle".
    assert_eq!(sent[0].subject, "Example Blog: Launch");

    // Recipient-level rendering: named subscriber vs generic salutation.
    assert!(sent[0].html_body.contains("Hi Ann,"));
    assert!(sent[1].html_body.contains("Hi there,"));
    assert!(sent[1].html_body.contains(
        "https://example.org/subscriptions/unsubscribe/?email_addr=c@example.com&authcode=authcode"
    ));

    // Exactly one ledger row, and last-sent is now populated.
    assert_eq!(dispatch_count(&pool).await, 1);
    assert!(DispatchRepo::last_sent(&pool, item).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unpublished_item_is_rejected_without_side_effects(pool: PgPool) {
    let item = insert_item(&pool, "Draft", "draft", &[3]).await;
    let operator = insert_operator(&pool, "admin").await;
    insert_subscriber(&pool, "a@example.com", "Ann", true, &[3]).await;

    let mailer = Arc::new(RecordingMailer::default());
    let outcome = coordinator(&pool, mailer.clone())
        .broadcast(item, operator)
        .await
        .unwrap();

    assert_matches!(outcome, BroadcastOutcome::NotPublished);
    assert!(mailer.sent().is_empty());
    assert_eq!(dispatch_count(&pool).await, 0);

    // The precondition check must not have touched the lock.
    let guard = lock::acquire(&pool, BROADCAST_LOCK_NAME, Duration::from_millis(300))
        .await
        .unwrap();
    assert!(guard.is_some(), "lock must still be free");
    guard.unwrap().release().await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_item_is_an_error(pool: PgPool) {
    let operator = insert_operator(&pool, "admin").await;

    let mailer = Arc::new(RecordingMailer::default());
    let err = coordinator(&pool, mailer)
        .broadcast(9999, operator)
        .await
        .unwrap_err();

    assert_matches!(err, BroadcastError::ItemNotFound(9999));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_broadcast_returns_already_in_progress(pool: PgPool) {
    let item = insert_item(&pool, "Launch", "published", &[3]).await;
    let operator = insert_operator(&pool, "admin").await;
    insert_subscriber(&pool, "a@example.com", "Ann", true, &[3]).await;

    // Another broadcast (possibly in a different process) holds the lock.
    let holder = lock::acquire(&pool, BROADCAST_LOCK_NAME, Duration::from_millis(300))
        .await
        .unwrap()
        .expect("lock should be free");

    let mailer = Arc::new(RecordingMailer::default());
    let outcome = coordinator(&pool, mailer.clone())
        .broadcast(item, operator)
        .await
        .unwrap();

    assert_matches!(outcome, BroadcastOutcome::AlreadyInProgress);
    assert!(mailer.sent().is_empty());
    assert_eq!(dispatch_count(&pool).await, 0);

    holder.release().await.unwrap();

    // Once the first broadcast finishes, the same request goes through.
    let outcome = coordinator(&pool, mailer)
        .broadcast(item, operator)
        .await
        .unwrap();
    assert_matches!(outcome, BroadcastOutcome::Sent { .. });
    assert_eq!(dispatch_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resend_appends_a_second_ledger_row(pool: PgPool) {
    let item = insert_item(&pool, "Launch", "published", &[3]).await;
    let operator = insert_operator(&pool, "admin").await;
    insert_subscriber(&pool, "a@example.com", "Ann", true, &[3]).await;

    let mailer = Arc::new(RecordingMailer::default());
    let coordinator = coordinator(&pool, mailer.clone());

    let first = coordinator.broadcast(item, operator).await.unwrap();
    let second = coordinator.broadcast(item, operator).await.unwrap();

    let first_sent_at = match first {
        BroadcastOutcome::Sent { sent_at, .. } => sent_at,
        other => panic!("expected Sent outcome, got {other:?}"),
    };
    let second_sent_at = match second {
        BroadcastOutcome::Sent { sent_at, .. } => sent_at,
        other => panic!("expected Sent outcome, got {other:?}"),
    };

    assert_eq!(dispatch_count(&pool).await, 2);
    assert_eq!(mailer.sent().len(), 2);
    assert!(second_sent_at >= first_sent_at);
    assert_eq!(
        DispatchRepo::last_sent(&pool, item).await.unwrap(),
        Some(second_sent_at)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recipient_send_failures_are_swallowed_and_still_recorded(pool: PgPool) {
    let item = insert_item(&pool, "Launch", "published", &[3]).await;
    let operator = insert_operator(&pool, "admin").await;
    insert_subscriber(&pool, "a@example.com", "Ann", true, &[3]).await;
    insert_subscriber(&pool, "b@example.com", "Bob", true, &[3]).await;

    let outcome = coordinator(&pool, Arc::new(FailingMailer))
        .broadcast(item, operator)
        .await
        .unwrap();

    // Every send failed, yet the broadcast completes and is recorded: the
    // ledger row means "the lock holder attempted to notify the audience".
    assert_matches!(outcome, BroadcastOutcome::Sent { recipients: 2, .. });
    assert_eq!(dispatch_count(&pool).await, 1);

    // The lock was released on the way out.
    let guard = lock::acquire(&pool, BROADCAST_LOCK_NAME, Duration::from_millis(300))
        .await
        .unwrap();
    assert!(guard.is_some());
    guard.unwrap().release().await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_audience_still_writes_the_ledger_row(pool: PgPool) {
    let item = insert_item(&pool, "Launch", "published", &[3]).await;
    let operator = insert_operator(&pool, "admin").await;

    let mailer = Arc::new(RecordingMailer::default());
    let outcome = coordinator(&pool, mailer.clone())
        .broadcast(item, operator)
        .await
        .unwrap();

    assert_matches!(outcome, BroadcastOutcome::Sent { recipients: 0, .. });
    assert!(mailer.sent().is_empty());
    assert_eq!(dispatch_count(&pool).await, 1);
}
