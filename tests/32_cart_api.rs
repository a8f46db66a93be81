mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create_items(
    server: &common::TestServer,
    client: &reqwest::Client,
    token: &str,
    items: Value,
) -> Result<Vec<String>> {
    let res = client
        .post(server.url("/catalog"))
        .bearer_auth(token)
        .json(&json!({ "items": items }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    Ok(serde_json::from_value(body["items"].clone())?)
}

#[tokio::test]
async fn cart_lifecycle() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(server, &client, &common::unique_email()).await?;

    let ids = create_items(
        server,
        &client,
        &token,
        json!([
            { "item_name": common::unique_name("guitar"), "description": "six strings", "price": 300 },
            { "item_name": common::unique_name("drum"), "price": 80 },
        ]),
    )
    .await?;

    // No cart yet
    let res = client.get(server.url("/cart")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "Cart not found" }));

    let res = client
        .post(server.url("/cart/items"))
        .bearer_auth(&token)
        .json(&json!({ "cart_items": ids }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "message": "cart successfully created" }));

    let res = client
        .post(server.url("/cart/items"))
        .bearer_auth(&token)
        .json(&json!({ "cart_items": ids }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "User already has a cart" }));

    let res = client.get(server.url("/cart")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await?,
        json!({
            "cart_items": [
                { "item_id": ids[0], "description": "six strings", "price": 300 },
                { "item_id": ids[1], "description": "", "price": 80 },
            ]
        })
    );

    let res = client
        .delete(server.url(&format!("/cart/items/{}", ids[0])))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "message": "cart item successfully removed" }));

    let res = client
        .delete(server.url(&format!("/cart/items/{}", ids[0])))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "Cart item was not found" }));

    let res = client
        .patch(server.url("/cart/items"))
        .bearer_auth(&token)
        .json(&json!({ "cart_items": [ids[0].clone()] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "message": "cart items was successfully updated" })
    );

    let res = client.delete(server.url("/cart")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "message": "cart was successfully deleted" }));

    let res = client.delete(server.url("/cart")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "User cart does not exist" }));

    Ok(())
}

#[tokio::test]
async fn updating_a_missing_cart_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(server, &client, &common::unique_email()).await?;

    let res = client
        .patch(server.url("/cart/items"))
        .bearer_auth(&token)
        .json(&json!({ "cart_items": [] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "User cart does not exist" }));

    Ok(())
}

#[tokio::test]
async fn carts_are_per_user() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let alice = common::login(server, &client, &common::unique_email()).await?;
    let bob = common::login(server, &client, &common::unique_email()).await?;

    let res = client
        .post(server.url("/cart/items"))
        .bearer_auth(&alice)
        .json(&json!({ "cart_items": [] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url("/cart")).bearer_auth(&bob).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(server.url("/cart")).bearer_auth(&alice).send().await?;
    assert_eq!(res.json::<Value>().await?, json!({ "cart_items": [] }));

    Ok(())
}

#[tokio::test]
async fn carts_only_hold_catalog_items() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::login(server, &client, &common::unique_email()).await?;

    let ids = create_items(
        server,
        &client,
        &token,
        json!([{ "item_name": common::unique_name("banjo"), "price": 120 }]),
    )
    .await?;

    let res = client
        .post(server.url("/cart/items"))
        .bearer_auth(&token)
        .json(&json!({ "cart_items": ["x1", "x2"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "error": "Unknown cart items: [\"x1\", \"x2\"]" })
    );

    let res = client.get(server.url("/cart")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(server.url("/cart/items"))
        .bearer_auth(&token)
        .json(&json!({ "cart_items": ids }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .patch(server.url("/cart/items"))
        .bearer_auth(&token)
        .json(&json!({ "cart_items": [ids[0].clone(), "x1"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Every stored entry is visible and removable
    let res = client.get(server.url("/cart")).bearer_auth(&token).send().await?;
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "cart_items": [{ "item_id": ids[0], "description": "", "price": 120 }] })
    );

    let res = client
        .delete(server.url("/cart/items/x1"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}
