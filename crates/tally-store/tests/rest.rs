//! `RestStore` tests against a mocked table API.

use serde_json::json;
use wiremock::matchers::{body_json, header, headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tally_core::{AccountId, Money, NewAccount, NewTransaction, TransactionKind};
use tally_store::{AccountStore, RestStore, StoreError, TransactionLog};

const API_KEY: &str = "test-key";

fn account_row(id: AccountId, name: &str, balance: f64) -> serde_json::Value {
    json!({
        "id": id.to_string(),
        "name": name,
        "balance": balance,
        "user_id": "00000000-0000-0000-0000-000000000000"
    })
}

async fn store(server: &MockServer) -> RestStore {
    RestStore::new(server.uri(), API_KEY).unwrap()
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn find_account_by_name_sends_eq_filter_and_auth_headers() {
    let server = MockServer::start().await;
    let id = AccountId::generate();

    Mock::given(method("GET"))
        .and(path("/rest/v1/characters"))
        .and(query_param("name", "eq.Bb Marley"))
        .and(header("apikey", API_KEY))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([account_row(
            id,
            "Bb Marley",
            4.0
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let found = store(&server)
        .await
        .find_account_by_name("Bb Marley")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.id, id);
    assert_eq!(found.balance, Money::from_cents(400));
}

#[tokio::test]
async fn find_account_by_name_returns_none_on_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/characters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let found = store(&server).await.find_account_by_name("nobody").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn list_accounts_orders_by_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/characters"))
        .and(query_param("order", "name.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            account_row(AccountId::generate(), "alice", 100.0),
            account_row(AccountId::generate(), "bob", 0.5),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let accounts = store(&server)
        .await
        .list_accounts_ordered_by_name()
        .await
        .unwrap();

    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[1].balance, Money::from_cents(50));
}

#[tokio::test]
async fn insert_account_returns_stored_row() {
    let server = MockServer::start().await;
    let id = AccountId::generate();

    Mock::given(method("POST"))
        .and(path("/rest/v1/characters"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!([{
            "name": "alice",
            "balance": "100.00",
            "user_id": "00000000-0000-0000-0000-000000000000"
        }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([account_row(
            id, "alice", 100.0
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let stored = store(&server)
        .await
        .insert_account(&NewAccount::new("alice", Money::from_cents(10_000)))
        .await
        .unwrap();

    assert_eq!(stored.id, id);
    assert_eq!(stored.name, "alice");
}

#[tokio::test]
async fn insert_account_maps_unique_violation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/characters"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"characters_name_key\"",
            "details": "Key (name)=(alice) already exists.",
            "hint": null
        })))
        .mount(&server)
        .await;

    let err = store(&server)
        .await
        .insert_account(&NewAccount::new("alice", Money::ZERO))
        .await
        .unwrap_err();

    assert!(err.is_unique_violation(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn other_api_errors_keep_status_and_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/characters"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "22P02",
            "message": "invalid input syntax for type numeric"
        })))
        .mount(&server)
        .await;

    let err = store(&server)
        .await
        .insert_account(&NewAccount::new("alice", Money::ZERO))
        .await
        .unwrap_err();

    match err {
        StoreError::Api { status, code, .. } => {
            assert_eq!(status, 400);
            assert_eq!(code.as_deref(), Some("22P02"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn upsert_accounts_merges_duplicates() {
    let server = MockServer::start().await;
    let id = AccountId::generate();

    Mock::given(method("POST"))
        .and(path("/rest/v1/characters"))
        .and(headers("prefer", vec!["resolution=merge-duplicates", "return=minimal"]))
        .and(body_json(json!([{
            "id": id.to_string(),
            "name": "alice",
            "balance": "46.00",
            "user_id": "00000000-0000-0000-0000-000000000000"
        }])))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let account = tally_core::Account {
        id,
        name: "alice".into(),
        balance: Money::from_cents(4600),
        owner_id: tally_core::SENTINEL_OWNER_ID,
    };
    store(&server).await.upsert_accounts(&[account]).await.unwrap();
}

#[tokio::test]
async fn update_balance_of_missing_account_is_not_found() {
    let server = MockServer::start().await;
    let id = AccountId::generate();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/characters"))
        .and(query_param("id", format!("eq.{id}")))
        .and(body_json(json!({ "balance": "0.00" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let err = store(&server)
        .await
        .update_account_balance(&id, Money::ZERO)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn insert_transactions_sends_all_rows_in_one_call() {
    let server = MockServer::start().await;
    let a = AccountId::generate();
    let b = AccountId::generate();
    let collector = AccountId::generate();

    Mock::given(method("POST"))
        .and(path("/rest/v1/transactions"))
        .and(body_json(json!([
            {
                "from_character_id": a.to_string(),
                "to_character_id": b.to_string(),
                "amount": "50.00",
                "kind": "transfer"
            },
            {
                "from_character_id": a.to_string(),
                "to_character_id": collector.to_string(),
                "amount": "4.00",
                "kind": "fee"
            }
        ])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {
                "id": tally_core::TransactionId::generate().to_string(),
                "from_character_id": a.to_string(),
                "to_character_id": b.to_string(),
                "amount": 50,
                "kind": "transfer",
                "created_at": "2024-05-01T12:00:00.123456+00:00"
            },
            {
                "id": tally_core::TransactionId::generate().to_string(),
                "from_character_id": a.to_string(),
                "to_character_id": collector.to_string(),
                "amount": 4,
                "kind": "fee",
                "created_at": "2024-05-01T12:00:00.123456+00:00"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let stored = store(&server)
        .await
        .insert_transactions(&[
            NewTransaction::transfer(a, b, Money::from_cents(5000)),
            NewTransaction::fee(a, collector, Money::from_cents(400)),
        ])
        .await
        .unwrap();

    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].kind, TransactionKind::Fee);
    assert_eq!(stored[1].amount, Money::from_cents(400));
}

#[tokio::test]
async fn delete_transactions_by_account_uses_or_filter() {
    let server = MockServer::start().await;
    let id = AccountId::generate();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/transactions"))
        .and(query_param(
            "or",
            format!("(from_character_id.eq.{id},to_character_id.eq.{id})"),
        ))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store(&server)
        .await
        .delete_transactions_by_account(&id)
        .await
        .unwrap();
}

#[tokio::test]
async fn list_transactions_orders_newest_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/transactions"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = store(&server)
        .await
        .list_transactions_ordered_by_time_desc()
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn unreachable_store_is_an_http_error() {
    let store = RestStore::new("http://127.0.0.1:1", API_KEY).unwrap();

    let err = store.list_accounts_ordered_by_name().await.unwrap_err();
    assert!(matches!(err, StoreError::Http(_)));
}
