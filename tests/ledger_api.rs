mod common;

use common::{amounts, TestServer};
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;

const BASE: &str = "/api/v1/alcancia";

#[tokio::test]
async fn empty_ledger() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get(&format!("{BASE}/movements")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["count"], 0);

    let (status, body) = srv.get(&format!("{BASE}/balance")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"balance": 0, "movements": 0}));
}

#[tokio::test]
async fn deposit_settles() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.put(&format!("{BASE}/movement/deposit/100")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"result": "settled", "previous_balance": 0, "balance": 100}));
}

#[tokio::test]
async fn overdraft_is_rejected_and_log_is_unchanged() {
    let srv = TestServer::spawn().await;
    srv.put(&format!("{BASE}/movement/deposit/100")).await;

    let (status, body) = srv.put(&format!("{BASE}/movement/withdraw/150")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"result": "rejected", "previous_balance": 100, "balance": 100}));

    let (_, list) = srv.get(&format!("{BASE}/movements")).await;
    assert_eq!(amounts(&list), vec![100]);
}

#[tokio::test]
async fn withdrawing_the_whole_balance_is_allowed() {
    let srv = TestServer::spawn().await;
    srv.put(&format!("{BASE}/movement/deposit/100")).await;

    let (status, _) = srv.put(&format!("{BASE}/movement/withdraw/101")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv.put(&format!("{BASE}/movement/withdraw/100")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"result": "settled", "previous_balance": 100, "balance": 0}));

    let (status, body) = srv.put(&format!("{BASE}/movement/withdraw/1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"result": "rejected", "previous_balance": 0, "balance": 0}));
}

#[tokio::test]
async fn withdraw_from_empty_ledger_is_rejected() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.put(&format!("{BASE}/movement/withdraw/1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["result"], "rejected");
    assert_eq!(body["previous_balance"], 0);
    assert_eq!(body["balance"], 0);
}

#[tokio::test]
async fn movements_are_listed_in_creation_order() {
    let srv = TestServer::spawn().await;
    srv.put(&format!("{BASE}/movement/deposit/50")).await;
    srv.put(&format!("{BASE}/movement/deposit/50")).await;

    let (status, list) = srv.get(&format!("{BASE}/movements")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amounts(&list), vec![50, 50]);
    assert_eq!(list["meta"]["count"], 2);
    let ids: Vec<i64> = list["data"].as_array().unwrap().iter().map(|m| m["id"].as_i64().unwrap()).collect();
    assert!(ids[0] < ids[1]);
    assert!(list["data"][0]["created_at"].is_string());
    assert!(list["data"][0].get("entity_id").is_none());

    let (_, balance) = srv.get(&format!("{BASE}/balance")).await;
    assert_eq!(balance["data"], json!({"balance": 100, "movements": 2}));
}

#[tokio::test]
async fn debits_are_stored_negative() {
    let srv = TestServer::spawn().await;
    srv.put(&format!("{BASE}/movement/deposit/2500")).await;
    srv.put(&format!("{BASE}/movement/withdraw/1000")).await;

    let (_, list) = srv.get(&format!("{BASE}/movements")).await;
    assert_eq!(amounts(&list), vec![2500, -1000]);
    let (_, balance) = srv.get(&format!("{BASE}/balance")).await;
    assert_eq!(balance["data"]["balance"], 1500);
}

#[tokio::test]
async fn invalid_quantities_are_unprocessable() {
    let srv = TestServer::spawn().await;

    for q in ["0", "-1"] {
        let (status, body) = srv.put(&format!("{BASE}/movement/deposit/{q}")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "quantity {q}");
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["message"], "Input should be greater than 0");
    }
    for q in ["1.50", "fal%C3%B1dkfs"] {
        let (status, body) = srv.put(&format!("{BASE}/movement/deposit/{q}")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "quantity {q}");
        assert_eq!(
            body["error"]["message"],
            "Input should be a valid integer, unable to parse string as an integer"
        );
    }

    let (_, list) = srv.get(&format!("{BASE}/movements")).await;
    assert_eq!(list["meta"]["count"], 0);
}

#[tokio::test]
async fn unknown_kind_is_unprocessable() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.put(&format!("{BASE}/movement/entrada/5")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["message"], "Input should be 'deposit' or 'withdraw'");
}

#[tokio::test]
async fn unknown_ledger_is_not_found() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get("/api/v1/nope/movements").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = srv.put("/api/v1/nope/movement/deposit/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scoped_ledger_needs_an_entity() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.put("/api/v1/registro_ciudades/movement/entrada/5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, _) = srv.get(&format!("{BASE}/entities")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ledgers_are_listed() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get("/api/v1/ledgers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 3);
    let alcancia = &body["data"][0];
    assert_eq!(alcancia["path_segment"], "alcancia");
    assert_eq!(alcancia["credit"], "deposit");
    assert_eq!(alcancia["debit"], "withdraw");
    assert_eq!(alcancia["scoped"], false);
    assert_eq!(body["data"][2]["scoped"], true);
}

#[tokio::test]
async fn common_routes() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = srv.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
    assert_eq!(body["ledgers"], 3);

    let (status, body) = srv.get("/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "ledger-sdk");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_withdrawals_cannot_overdraw() {
    let srv = Arc::new(TestServer::spawn().await);
    srv.put(&format!("{BASE}/movement/deposit/100")).await;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let srv = Arc::clone(&srv);
        tasks.push(tokio::spawn(async move {
            srv.put(&format!("{BASE}/movement/withdraw/60")).await.0
        }));
    }
    let mut settled = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            StatusCode::CREATED => settled += 1,
            StatusCode::FORBIDDEN => rejected += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(settled, 1);
    assert_eq!(rejected, 9);

    let (_, balance) = srv.get(&format!("{BASE}/balance")).await;
    assert_eq!(balance["data"], json!({"balance": 40, "movements": 2}));
}

#[tokio::test]
async fn credit_that_would_overflow_is_refused_and_ledger_stays_usable() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.put(&format!("{BASE}/movement/deposit/{}", i64::MAX)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["balance"], i64::MAX);

    let (status, body) = srv.put(&format!("{BASE}/movement/deposit/1")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");

    let (_, list) = srv.get(&format!("{BASE}/movements")).await;
    assert_eq!(list["meta"]["count"], 1);

    let (status, body) = srv.put(&format!("{BASE}/movement/withdraw/1")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["balance"], i64::MAX - 1);

    let (status, balance) = srv.get(&format!("{BASE}/balance")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance["data"]["balance"], i64::MAX - 1);
}
