use sea_orm::{Database, DatabaseConnection};

use engine::{
    Distribution, DistributionNew, Engine, EngineError, MoneyCents, Payment, SpenderLedger,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn payment(description: &str, cents: i64, paid: bool) -> Payment {
    Payment::new(description, MoneyCents::new(cents), paid).unwrap()
}

fn sample_distribution() -> Distribution {
    let mut alice = SpenderLedger::new();
    alice.insert("Zoe".to_string(), vec![payment("taxi", 400, true)]);
    alice.insert(
        "Bob".to_string(),
        vec![payment("lunch", 1000, false), payment("cinema", 850, false)],
    );
    let mut distribution = Distribution::new();
    distribution.insert("Alice".to_string(), alice);
    distribution
}

fn distribution_new(description: &str) -> DistributionNew {
    DistributionNew {
        amount: MoneyCents::new(2250),
        friends: "Alice".to_string(),
        spender: "Bob".to_string(),
        description: description.to_string(),
        distribution: sample_distribution(),
    }
}

#[tokio::test]
async fn register_then_authenticate() {
    let (engine, _db) = engine_with_db().await;

    let registered = engine.register_user("alice", "password").await.unwrap();
    let logged_in = engine.authenticate("alice", "password").await.unwrap();

    assert_eq!(registered.id, logged_in.id);
    assert_eq!(logged_in.username, "alice");
    assert_eq!(engine.user(registered.id).await.unwrap().username, "alice");
}

#[tokio::test]
async fn register_rejects_duplicate_username() {
    let (engine, _db) = engine_with_db().await;
    engine.register_user("alice", "password").await.unwrap();

    let err = engine.register_user(" alice ", "other").await.unwrap_err();

    assert_eq!(err, EngineError::ExistingKey("alice".to_string()));
}

#[tokio::test]
async fn register_rejects_empty_fields() {
    let (engine, _db) = engine_with_db().await;

    assert!(matches!(
        engine.register_user("", "password").await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.register_user("alice", "").await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn authenticate_distinguishes_unknown_user_and_wrong_password() {
    let (engine, _db) = engine_with_db().await;
    engine.register_user("alice", "password").await.unwrap();

    assert_eq!(
        engine.authenticate("bob", "password").await.unwrap_err(),
        EngineError::KeyNotFound("User".to_string())
    );
    assert_eq!(
        engine.authenticate("alice", "wrong").await.unwrap_err(),
        EngineError::InvalidCredentials("Invalid password".to_string())
    );
}

#[tokio::test]
async fn distributions_round_trip_per_user() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.register_user("alice", "password").await.unwrap();
    let bob = engine.register_user("bob", "password").await.unwrap();

    let saved = engine
        .save_distribution(alice.id, distribution_new("Dinner"))
        .await
        .unwrap();
    engine
        .save_distribution(alice.id, distribution_new("Groceries"))
        .await
        .unwrap();
    engine
        .save_distribution(bob.id, distribution_new("Trip"))
        .await
        .unwrap();

    let records = engine.distributions_for_user(alice.id).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().any(|r| r.id == saved.id && r.user_id == alice.id));

    let mut descriptions: Vec<_> = records.iter().map(|r| r.description.as_str()).collect();
    descriptions.sort_unstable();
    assert_eq!(descriptions, vec!["Dinner", "Groceries"]);

    let ledger = &records[0].distribution["Alice"];
    assert_eq!(ledger.keys().collect::<Vec<_>>(), vec!["Zoe", "Bob"]);
    assert_eq!(ledger["Bob"][1].amount(), MoneyCents::new(850));
}

#[tokio::test]
async fn save_distribution_requires_existing_user() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .save_distribution(Uuid::new_v4(), distribution_new("Dinner"))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("User".to_string()));
}

#[tokio::test]
async fn save_distribution_rejects_negative_amount() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine.register_user("alice", "password").await.unwrap();
    let mut new = distribution_new("Dinner");
    new.amount = MoneyCents::new(-1);

    assert!(matches!(
        engine.save_distribution(alice.id, new).await,
        Err(EngineError::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn unknown_user_has_no_distributions() {
    let (engine, _db) = engine_with_db().await;

    let records = engine.distributions_for_user(Uuid::new_v4()).await.unwrap();

    assert!(records.is_empty());
}
