use crate::common::{TestApp, routes};
use serde_json::json;

/// organizer + a team led by "lee" in a fresh hackathon, plus "bob" as a
/// free agent. Returns (team_id, hackathon_id, lee's token, bob's id,
/// bob's token).
async fn team_with_free_agent(app: &TestApp) -> (i32, i32, String, i32, String) {
    let (_, organizer) = app.create_user("olivia").await;
    let (_, lee) = app.create_user("lee").await;
    let (bob_id, bob) = app.create_user("bob").await;

    let hackathon_id = app
        .create_published_hackathon(&organizer, "Hack", json!({}))
        .await;
    let team_id = app.register_team(&lee, hackathon_id, "Rustaceans", &[]).await;
    (team_id, hackathon_id, lee, bob_id, bob)
}

mod invitations {
    use super::*;

    #[tokio::test]
    async fn leader_invites_a_user() {
        let app = TestApp::spawn().await;
        let (team_id, _, lee, bob_id, bob) = team_with_free_agent(&app).await;

        let res = app
            .post_with_token(
                &routes::team_join_requests(team_id),
                &json!({ "user_id": bob_id, "message": "Join us!" }),
                &lee,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["status"], "pending");
        assert_eq!(res.body["user_id"], bob_id);
        assert_eq!(res.body["message"], "Join us!");

        let mine = app.get_with_token(routes::MY_JOIN_REQUESTS, &bob).await;
        assert_eq!(mine.status, 200);
        let data = mine.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["team_id"], team_id);
    }

    #[tokio::test]
    async fn only_the_leader_may_invite() {
        let app = TestApp::spawn().await;
        let (team_id, _, _, bob_id, bob) = team_with_free_agent(&app).await;

        let res = app
            .post_with_token(
                &routes::team_join_requests(team_id),
                &json!({ "user_id": bob_id }),
                &bob,
            )
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn rejects_a_duplicate_pending_invitation() {
        let app = TestApp::spawn().await;
        let (team_id, _, lee, bob_id, _) = team_with_free_agent(&app).await;

        let first = app
            .post_with_token(
                &routes::team_join_requests(team_id),
                &json!({ "user_id": bob_id }),
                &lee,
            )
            .await;
        assert_eq!(first.status, 201);

        let second = app
            .post_with_token(
                &routes::team_join_requests(team_id),
                &json!({ "user_id": bob_id }),
                &lee,
            )
            .await;
        assert_eq!(second.status, 409);
    }

    #[tokio::test]
    async fn cannot_invite_someone_already_on_a_team() {
        let app = TestApp::spawn().await;
        let (team_id, hackathon_id, lee, _, _) = team_with_free_agent(&app).await;
        let (mia_id, mia) = app.create_user("mia").await;
        app.register_team(&mia, hackathon_id, "Other", &[]).await;

        let res = app
            .post_with_token(
                &routes::team_join_requests(team_id),
                &json!({ "user_id": mia_id }),
                &lee,
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn full_teams_cannot_invite() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, lee) = app.create_user("lee").await;
        let (bob_id, _) = app.create_user("bob").await;
        let (kim_id, _) = app.create_user("kim").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Duo Hack", json!({ "max_members": 2 }))
            .await;
        let team_id = app
            .register_team(&lee, hackathon_id, "Full House", &[bob_id])
            .await;

        let res = app
            .post_with_token(
                &routes::team_join_requests(team_id),
                &json!({ "user_id": kim_id }),
                &lee,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn leader_lists_the_teams_invitations() {
        let app = TestApp::spawn().await;
        let (team_id, _, lee, bob_id, bob) = team_with_free_agent(&app).await;

        app.post_with_token(
            &routes::team_join_requests(team_id),
            &json!({ "user_id": bob_id }),
            &lee,
        )
        .await;

        let list = app
            .get_with_token(&routes::team_join_requests(team_id), &lee)
            .await;
        assert_eq!(list.status, 200);
        assert_eq!(list.body["data"].as_array().unwrap().len(), 1);

        // Invitees see their own inbox, not the team's.
        let forbidden = app
            .get_with_token(&routes::team_join_requests(team_id), &bob)
            .await;
        assert_eq!(forbidden.status, 403);
    }
}

mod responses {
    use super::*;

    async fn invite(app: &TestApp, team_id: i32, lee: &str, user_id: i32) -> i32 {
        let res = app
            .post_with_token(
                &routes::team_join_requests(team_id),
                &json!({ "user_id": user_id }),
                lee,
            )
            .await;
        assert_eq!(res.status, 201, "invite failed: {}", res.text);
        res.id()
    }

    #[tokio::test]
    async fn invitee_accepts_and_joins() {
        let app = TestApp::spawn().await;
        let (team_id, _, lee, bob_id, bob) = team_with_free_agent(&app).await;
        let request_id = invite(&app, team_id, &lee, bob_id).await;

        let res = app
            .post_with_token(&routes::join_request_accept(request_id), &json!({}), &bob)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "accepted");

        let team = app.get_with_token(&routes::team(team_id), &bob).await;
        let members = team.body["members"].as_array().unwrap();
        assert!(
            members
                .iter()
                .any(|m| m["user_id"] == bob_id && m["status"] == "active")
        );
    }

    #[tokio::test]
    async fn only_the_invitee_may_respond() {
        let app = TestApp::spawn().await;
        let (team_id, _, lee, bob_id, _) = team_with_free_agent(&app).await;
        let (_, mia) = app.create_user("mia").await;
        let request_id = invite(&app, team_id, &lee, bob_id).await;

        let res = app
            .post_with_token(&routes::join_request_accept(request_id), &json!({}), &mia)
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn accepting_fails_when_the_team_filled_up() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, lee) = app.create_user("lee").await;
        let (bob_id, bob) = app.create_user("bob").await;
        let (kim_id, kim) = app.create_user("kim").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Duo Hack", json!({ "max_members": 2 }))
            .await;
        let team_id = app.register_team(&lee, hackathon_id, "Duo", &[]).await;

        let bob_request = invite(&app, team_id, &lee, bob_id).await;
        let kim_request = invite(&app, team_id, &lee, kim_id).await;

        let first = app
            .post_with_token(&routes::join_request_accept(bob_request), &json!({}), &bob)
            .await;
        assert_eq!(first.status, 200);

        let second = app
            .post_with_token(&routes::join_request_accept(kim_request), &json!({}), &kim)
            .await;
        assert_eq!(second.status, 400);
    }

    #[tokio::test]
    async fn concurrent_accepts_cannot_overfill_the_team() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, lee) = app.create_user("lee").await;
        let (bob_id, bob) = app.create_user("bob").await;
        let (kim_id, kim) = app.create_user("kim").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Duo Hack", json!({ "max_members": 2 }))
            .await;
        let team_id = app.register_team(&lee, hackathon_id, "Duo", &[]).await;

        let bob_request = invite(&app, team_id, &lee, bob_id).await;
        let kim_request = invite(&app, team_id, &lee, kim_id).await;

        // Both invitees race for the single free slot; the team row lock
        // makes one of them see the team full.
        let bob_route = routes::join_request_accept(bob_request);
        let kim_route = routes::join_request_accept(kim_request);
        let body = json!({});
        let (first, second) = tokio::join!(
            app.post_with_token(&bob_route, &body, &bob),
            app.post_with_token(&kim_route, &body, &kim),
        );
        let statuses = [first.status, second.status];
        assert!(statuses.contains(&200), "no accept succeeded: {statuses:?}");
        assert!(statuses.contains(&400), "both accepts succeeded: {statuses:?}");

        let team = app.get_with_token(&routes::team(team_id), &lee).await;
        let active = team.body["members"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|m| m["status"] == "active")
            .count();
        assert_eq!(active, 2);
    }

    #[tokio::test]
    async fn accepting_rejects_other_pending_invitations() {
        let app = TestApp::spawn().await;
        let (team_id, hackathon_id, lee, bob_id, bob) = team_with_free_agent(&app).await;
        let (_, mia) = app.create_user("mia").await;
        let other_team = app.register_team(&mia, hackathon_id, "Other", &[]).await;

        let accepted = invite(&app, team_id, &lee, bob_id).await;
        invite(&app, other_team, &mia, bob_id).await;

        let res = app
            .post_with_token(&routes::join_request_accept(accepted), &json!({}), &bob)
            .await;
        assert_eq!(res.status, 200);

        let other_list = app
            .get_with_token(&routes::team_join_requests(other_team), &mia)
            .await;
        assert_eq!(other_list.body["data"][0]["status"], "rejected");
    }

    #[tokio::test]
    async fn invitee_rejects() {
        let app = TestApp::spawn().await;
        let (team_id, _, lee, bob_id, bob) = team_with_free_agent(&app).await;
        let request_id = invite(&app, team_id, &lee, bob_id).await;

        let res = app
            .post_with_token(&routes::join_request_reject(request_id), &json!({}), &bob)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "rejected");

        // No pending invitation remains to respond to.
        let again = app
            .post_with_token(&routes::join_request_accept(request_id), &json!({}), &bob)
            .await;
        assert_eq!(again.status, 404);
    }

    #[tokio::test]
    async fn sender_cancels_a_pending_invitation() {
        let app = TestApp::spawn().await;
        let (team_id, _, lee, bob_id, bob) = team_with_free_agent(&app).await;
        let request_id = invite(&app, team_id, &lee, bob_id).await;

        let res = app
            .delete_with_token(&routes::join_request(request_id), &lee)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "cancelled");

        let mine = app.get_with_token(routes::MY_JOIN_REQUESTS, &bob).await;
        assert!(mine.body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invitee_cannot_cancel() {
        let app = TestApp::spawn().await;
        let (team_id, _, lee, bob_id, bob) = team_with_free_agent(&app).await;
        let request_id = invite(&app, team_id, &lee, bob_id).await;

        let res = app
            .delete_with_token(&routes::join_request(request_id), &bob)
            .await;

        assert_eq!(res.status, 403);
    }
}
