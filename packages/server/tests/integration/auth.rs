use crate::common::{TestApp, routes};
use serde_json::json;

fn register_body(username: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": "pass1234",
        "full_name": "Alice Wonder",
    })
}

mod registration {
    use super::*;

    #[tokio::test]
    async fn registers_a_new_account() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::REGISTER, &register_body("alice"))
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["username"], "alice");
        assert!(res.body["id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn rejects_duplicate_username() {
        let app = TestApp::spawn().await;

        let first = app
            .post_without_token(routes::REGISTER, &register_body("alice"))
            .await;
        assert_eq!(first.status, 201);

        let second = app
            .post_without_token(routes::REGISTER, &register_body("alice"))
            .await;
        assert_eq!(second.status, 409);
    }

    #[tokio::test]
    async fn username_is_case_insensitive() {
        let app = TestApp::spawn().await;

        let first = app
            .post_without_token(routes::REGISTER, &register_body("alice"))
            .await;
        assert_eq!(first.status, 201);

        let mut body = register_body("Alice");
        body["email"] = json!("other@example.com");
        let second = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(second.status, 409);
    }

    #[tokio::test]
    async fn rejects_short_password() {
        let app = TestApp::spawn().await;

        let mut body = register_body("alice");
        body["password"] = json!("short");
        let res = app.post_without_token(routes::REGISTER, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_invalid_username() {
        let app = TestApp::spawn().await;

        let mut body = register_body("alice");
        body["username"] = json!("not a username!");
        let res = app.post_without_token(routes::REGISTER, &body).await;

        assert_eq!(res.status, 400);
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn logs_in_with_username() {
        let app = TestApp::spawn().await;
        app.post_without_token(routes::REGISTER, &register_body("alice"))
            .await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({ "identifier": "alice", "password": "pass1234" }),
            )
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["token"].as_str().is_some());
        assert_eq!(res.body["user"]["username"], "alice");
    }

    #[tokio::test]
    async fn logs_in_with_email() {
        let app = TestApp::spawn().await;
        app.post_without_token(routes::REGISTER, &register_body("alice"))
            .await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({ "identifier": "alice@example.com", "password": "pass1234" }),
            )
            .await;

        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let app = TestApp::spawn().await;
        app.post_without_token(routes::REGISTER, &register_body("alice"))
            .await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({ "identifier": "alice", "password": "wrong-password" }),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn rejects_unknown_identifier() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({ "identifier": "nobody", "password": "pass1234" }),
            )
            .await;

        assert_eq!(res.status, 401);
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn returns_the_profile() {
        let app = TestApp::spawn().await;
        let (id, token) = app.create_user("alice").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], id);
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["subscription_plan"], "free");
        assert_eq!(res.body["roles"], json!(["student"]));
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn rejects_a_garbage_token() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}
