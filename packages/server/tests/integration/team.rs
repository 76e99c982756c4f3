use crate::common::{TestApp, hackathon_body, routes};
use serde_json::json;

mod registration {
    use super::*;

    #[tokio::test]
    async fn registers_a_team_with_members() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;
        let (bob_id, _) = app.create_user("bob").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;

        let res = app
            .post_with_token(
                routes::TEAM_REGISTER,
                &json!({
                    "hackathon_id": hackathon_id,
                    "team_name": "Rustaceans",
                    "member_ids": [bob_id],
                    "tech_stack": ["rust", "axum"],
                }),
                &leader,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["team_name"], "Rustaceans");
        assert_eq!(res.body["registration_status"], "pending");
        assert_eq!(res.body["payment_status"], "completed");
        assert_eq!(res.body["members"].as_array().unwrap().len(), 2);

        let hackathon = app
            .get_with_token(&routes::hackathon(hackathon_id), &organizer)
            .await;
        assert_eq!(hackathon.body["current_registrations"], 1);
    }

    #[tokio::test]
    async fn auto_accept_approves_at_registration() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({ "auto_accept_teams": true }))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Solo", &[]).await;

        let team = app.get_with_token(&routes::team(team_id), &leader).await;
        assert_eq!(team.body["registration_status"], "approved");
    }

    #[tokio::test]
    async fn rejects_registration_on_a_draft() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let created = app
            .post_with_token(routes::HACKATHONS, &hackathon_body("Draft Hack"), &organizer)
            .await;

        let res = app
            .post_with_token(
                routes::TEAM_REGISTER,
                &json!({ "hackathon_id": created.id(), "team_name": "Early Birds" }),
                &leader,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn rejects_registration_before_the_window_opens() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(
                &organizer,
                "Future Hack",
                json!({ "registration_start": "2098-01-01T00:00:00Z" }),
            )
            .await;

        let res = app
            .post_with_token(
                routes::TEAM_REGISTER,
                &json!({ "hackathon_id": hackathon_id, "team_name": "Too Soon" }),
                &leader,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn enforces_team_size_bounds() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Pairs Only", json!({ "min_members": 2 }))
            .await;

        let res = app
            .post_with_token(
                routes::TEAM_REGISTER,
                &json!({ "hackathon_id": hackathon_id, "team_name": "Loner" }),
                &leader,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_duplicate_team_name() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, lee) = app.create_user("lee").await;
        let (_, mia) = app.create_user("mia").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        app.register_team(&lee, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .post_with_token(
                routes::TEAM_REGISTER,
                &json!({ "hackathon_id": hackathon_id, "team_name": "Rustaceans" }),
                &mia,
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn one_active_team_per_user_per_hackathon() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        app.register_team(&leader, hackathon_id, "First", &[]).await;

        let res = app
            .post_with_token(
                routes::TEAM_REGISTER,
                &json!({ "hackathon_id": hackathon_id, "team_name": "Second" }),
                &leader,
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn capacity_slot_is_not_released_by_rejection() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, lee) = app.create_user("lee").await;
        let (_, mia) = app.create_user("mia").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Tiny Hack", json!({ "max_teams": 1 }))
            .await;
        let team_id = app.register_team(&lee, hackathon_id, "First", &[]).await;

        let rejected = app
            .put_with_token(&routes::team_reject(team_id), &json!({}), &organizer)
            .await;
        assert_eq!(rejected.status, 200);
        assert_eq!(rejected.body["registration_status"], "rejected");

        // The counter only ever goes up, so the hackathon stays full.
        let hackathon = app
            .get_with_token(&routes::hackathon(hackathon_id), &organizer)
            .await;
        assert_eq!(hackathon.body["current_registrations"], 1);

        let res = app
            .post_with_token(
                routes::TEAM_REGISTER,
                &json!({ "hackathon_id": hackathon_id, "team_name": "Second" }),
                &mia,
            )
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn coordinators_cannot_register_in_their_own_hackathon() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, coord) = app.create_user("cory").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let invite = app
            .post_with_token(
                &routes::invite_coordinator(hackathon_id),
                &json!({ "user": "cory" }),
                &organizer,
            )
            .await;
        assert_eq!(invite.status, 201, "invite failed: {}", invite.text);
        let accepted = app
            .post_with_token(
                &routes::coordinator_response(hackathon_id, "accept"),
                &json!({}),
                &coord,
            )
            .await;
        assert_eq!(accepted.status, 200);

        let res = app
            .post_with_token(
                routes::TEAM_REGISTER,
                &json!({ "hackathon_id": hackathon_id, "team_name": "Staffers" }),
                &coord,
            )
            .await;
        assert_eq!(res.status, 409);
    }
}

mod review {
    use super::*;

    #[tokio::test]
    async fn organizer_approves_a_pending_team() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .put_with_token(&routes::team_approve(team_id), &json!({}), &organizer)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["registration_status"], "approved");
    }

    #[tokio::test]
    async fn approving_twice_is_an_invalid_state() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        app.put_with_token(&routes::team_approve(team_id), &json!({}), &organizer)
            .await;
        let res = app
            .put_with_token(&routes::team_approve(team_id), &json!({}), &organizer)
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn members_cannot_approve() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .put_with_token(&routes::team_approve(team_id), &json!({}), &leader)
            .await;

        assert_eq!(res.status, 403);
    }
}

mod updates {
    use super::*;

    #[tokio::test]
    async fn leader_updates_project_details() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .patch_with_token(
                &routes::team(team_id),
                &json!({ "project_title": "Crab Tracker", "tech_stack": ["rust"] }),
                &leader,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["project_title"], "Crab Tracker");
        assert_eq!(res.body["tech_stack"], json!(["rust"]));
    }

    #[tokio::test]
    async fn rename_is_blocked_when_disabled() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(
                &organizer,
                "Hack",
                json!({ "allow_team_name_change": false }),
            )
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .patch_with_token(&routes::team(team_id), &json!({ "team_name": "Crabs" }), &leader)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn non_leader_cannot_update() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;
        let (_, stranger) = app.create_user("sam").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .patch_with_token(&routes::team(team_id), &json!({ "project_title": "x" }), &stranger)
            .await;

        assert_eq!(res.status, 403);
    }
}

mod check_in {
    use super::*;

    #[tokio::test]
    async fn organizer_checks_a_team_in() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .post_with_token(&routes::team_checkin(team_id), &json!({}), &organizer)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["checked_in"], true);

        let again = app
            .post_with_token(&routes::team_checkin(team_id), &json!({}), &organizer)
            .await;
        assert_eq!(again.status, 400);
    }

    #[tokio::test]
    async fn last_member_check_in_flags_the_team() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (lee_id, leader) = app.create_user("lee").await;
        let (bob_id, _) = app.create_user("bob").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app
            .register_team(&leader, hackathon_id, "Rustaceans", &[bob_id])
            .await;

        let first = app
            .post_with_token(&routes::member_checkin(team_id, lee_id), &json!({}), &organizer)
            .await;
        assert_eq!(first.status, 200);
        assert_eq!(first.body["all_members_checked_in"], false);

        let second = app
            .post_with_token(&routes::member_checkin(team_id, bob_id), &json!({}), &organizer)
            .await;
        assert_eq!(second.status, 200);
        assert_eq!(second.body["all_members_checked_in"], true);
    }

    #[tokio::test]
    async fn members_cannot_check_themselves_in() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .post_with_token(&routes::team_checkin(team_id), &json!({}), &leader)
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn organizer_assigns_table_and_team_numbers() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .put_with_token(
                &routes::team_assign(team_id),
                &json!({ "table_number": "T-12", "team_number": "42" }),
                &organizer,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["table_number"], "T-12");
        assert_eq!(res.body["team_number"], "42");
    }
}

mod submissions {
    use super::*;

    #[tokio::test]
    async fn member_submits_once_per_round() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({ "auto_accept_teams": true }))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let body = json!({
            "round_id": "round-1",
            "project_url": "https://example.com/project",
            "github_repo": "https://github.com/example/project",
        });
        let first = app
            .post_with_token(&routes::team_submit(team_id), &body, &leader)
            .await;
        assert_eq!(first.status, 201);
        assert_eq!(first.body["round_id"], "round-1");

        let second = app
            .post_with_token(&routes::team_submit(team_id), &body, &leader)
            .await;
        assert_eq!(second.status, 409);
    }

    #[tokio::test]
    async fn pending_teams_cannot_submit() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .post_with_token(
                &routes::team_submit(team_id),
                &json!({ "round_id": "round-1" }),
                &leader,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn outsiders_cannot_submit() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;
        let (_, stranger) = app.create_user("sam").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({ "auto_accept_teams": true }))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .post_with_token(
                &routes::team_submit(team_id),
                &json!({ "round_id": "round-1" }),
                &stranger,
            )
            .await;

        assert_eq!(res.status, 403);
    }
}

mod scoring {
    use super::*;

    #[tokio::test]
    async fn judge_scores_and_overall_percentage_updates() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;
        let (_, judy) = app.create_user("judy").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({ "auto_accept_teams": true }))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;
        app.accept_judge_invitation(&organizer, &judy, hackathon_id, "judy")
            .await;

        let res = app
            .post_with_token(
                &routes::team_score(team_id),
                &json!({
                    "round_id": "round-1",
                    "criteria": [
                        { "criteria_name": "Design", "score": 8.0, "max_score": 10.0 },
                        { "criteria_name": "Impact", "score": 15.0, "max_score": 20.0 },
                    ],
                    "remarks": "Solid work",
                }),
                &judy,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["total_score"], 23.0);
        assert_eq!(res.body["max_possible_score"], 30.0);
        assert_eq!(res.body["is_finalized"], true);

        // 100 * 23 / 30, a percentage across all rounds.
        let team = app.get_with_token(&routes::team(team_id), &leader).await;
        let overall = team.body["overall_score"].as_f64().unwrap();
        assert!((overall - 100.0 * 23.0 / 30.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn one_score_per_judge_per_round() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;
        let (_, judy) = app.create_user("judy").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({ "auto_accept_teams": true }))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;
        app.accept_judge_invitation(&organizer, &judy, hackathon_id, "judy")
            .await;

        let body = json!({
            "round_id": "round-1",
            "criteria": [{ "criteria_name": "Design", "score": 5.0, "max_score": 10.0 }],
        });
        let first = app.post_with_token(&routes::team_score(team_id), &body, &judy).await;
        assert_eq!(first.status, 201);

        let second = app.post_with_token(&routes::team_score(team_id), &body, &judy).await;
        assert_eq!(second.status, 409);
    }

    #[tokio::test]
    async fn non_judges_cannot_score() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;
        let (_, sam) = app.create_user("sam").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({ "auto_accept_teams": true }))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .post_with_token(
                &routes::team_score(team_id),
                &json!({
                    "round_id": "round-1",
                    "criteria": [{ "criteria_name": "Design", "score": 5.0, "max_score": 10.0 }],
                }),
                &sam,
            )
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn rejects_scores_above_the_maximum() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({ "auto_accept_teams": true }))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        // Organizers may score directly.
        let res = app
            .post_with_token(
                &routes::team_score(team_id),
                &json!({
                    "round_id": "round-1",
                    "criteria": [{ "criteria_name": "Design", "score": 11.0, "max_score": 10.0 }],
                }),
                &organizer,
            )
            .await;

        assert_eq!(res.status, 400);
    }
}

mod elimination {
    use super::*;

    #[tokio::test]
    async fn organizer_eliminates_a_team() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, leader) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({ "auto_accept_teams": true }))
            .await;
        let team_id = app.register_team(&leader, hackathon_id, "Rustaceans", &[]).await;

        let res = app
            .post_with_token(
                &routes::team_eliminate(team_id),
                &json!({ "round_id": "round-1", "reason": "Did not submit" }),
                &organizer,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["is_eliminated"], true);
        assert_eq!(res.body["eliminated_in_round"], "round-1");

        let again = app
            .post_with_token(&routes::team_eliminate(team_id), &json!({}), &organizer)
            .await;
        assert_eq!(again.status, 400);
    }
}

mod leaderboard {
    use super::*;

    async fn score(
        app: &TestApp,
        judge: &str,
        team_id: i32,
        round: &str,
        score: f64,
        max: f64,
    ) {
        let res = app
            .post_with_token(
                &routes::team_score(team_id),
                &json!({
                    "round_id": round,
                    "criteria": [{ "criteria_name": "Overall", "score": score, "max_score": max }],
                }),
                judge,
            )
            .await;
        assert_eq!(res.status, 201, "score failed: {}", res.text);
    }

    #[tokio::test]
    async fn ranks_approved_teams_by_overall_score() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, lee) = app.create_user("lee").await;
        let (_, mia) = app.create_user("mia").await;
        let (_, noa) = app.create_user("noa").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({ "auto_accept_teams": true }))
            .await;
        let first = app.register_team(&lee, hackathon_id, "First", &[]).await;
        let second = app.register_team(&mia, hackathon_id, "Second", &[]).await;
        let third = app.register_team(&noa, hackathon_id, "Third", &[]).await;

        score(&app, &organizer, first, "round-1", 10.0, 10.0).await;
        score(&app, &organizer, second, "round-1", 5.0, 10.0).await;
        score(&app, &organizer, third, "round-1", 5.0, 10.0).await;

        let res = app.get_without_token(&routes::leaderboard(hackathon_id)).await;

        assert_eq!(res.status, 200);
        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["team_name"], "First");
        assert_eq!(entries[0]["rank"], 1);
        // Tied teams keep distinct consecutive ranks, in registration order.
        assert_eq!(entries[1]["team_name"], "Second");
        assert_eq!(entries[1]["rank"], 2);
        assert_eq!(entries[2]["team_name"], "Third");
        assert_eq!(entries[2]["rank"], 3);
    }

    #[tokio::test]
    async fn round_filter_ranks_by_mean_judge_total() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, lee) = app.create_user("lee").await;
        let (_, mia) = app.create_user("mia").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({ "auto_accept_teams": true }))
            .await;
        let alpha = app.register_team(&lee, hackathon_id, "Alpha", &[]).await;
        let beta = app.register_team(&mia, hackathon_id, "Beta", &[]).await;

        // Alpha leads overall, Beta wins round-2.
        score(&app, &organizer, alpha, "round-1", 10.0, 10.0).await;
        score(&app, &organizer, alpha, "round-2", 2.0, 10.0).await;
        score(&app, &organizer, beta, "round-1", 4.0, 10.0).await;
        score(&app, &organizer, beta, "round-2", 9.0, 10.0).await;

        let overall = app.get_without_token(&routes::leaderboard(hackathon_id)).await;
        assert_eq!(overall.body["entries"][0]["team_name"], "Alpha");

        let round = app
            .get_without_token(&format!("{}?round_id=round-2", routes::leaderboard(hackathon_id)))
            .await;
        let entries = round.body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["team_name"], "Beta");
        assert_eq!(entries[0]["round_score"], 9.0);
        assert_eq!(entries[1]["team_name"], "Alpha");
        assert_eq!(entries[1]["round_score"], 2.0);
    }

    #[tokio::test]
    async fn excludes_eliminated_and_pending_teams() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, lee) = app.create_user("lee").await;
        let (_, mia) = app.create_user("mia").await;
        let (_, noa) = app.create_user("noa").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({ "auto_accept_teams": true }))
            .await;
        let surviving = app.register_team(&lee, hackathon_id, "Survivors", &[]).await;
        let eliminated = app.register_team(&mia, hackathon_id, "Eliminated", &[]).await;
        app.post_with_token(&routes::team_eliminate(eliminated), &json!({}), &organizer)
            .await;

        // Pending teams only exist under manual approval, so use a second
        // hackathon for that case.
        let manual_id = app
            .create_published_hackathon(&organizer, "Manual Hack", json!({}))
            .await;
        app.register_team(&noa, manual_id, "Pending", &[]).await;

        let res = app.get_without_token(&routes::leaderboard(hackathon_id)).await;
        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["team_id"], surviving);

        let manual = app.get_without_token(&routes::leaderboard(manual_id)).await;
        assert!(manual.body["entries"].as_array().unwrap().is_empty());
    }
}

mod membership {
    use super::*;

    #[tokio::test]
    async fn member_leaves_and_can_join_elsewhere() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, lee) = app.create_user("lee").await;
        let (bob_id, bob) = app.create_user("bob").await;
        let (_, mia) = app.create_user("mia").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&lee, hackathon_id, "First", &[bob_id]).await;

        let res = app
            .post_with_token(&routes::team_leave(team_id), &json!({}), &bob)
            .await;
        assert_eq!(res.status, 204);

        // Bob's slot is free again, so another team can recruit him.
        let second = app
            .post_with_token(
                routes::TEAM_REGISTER,
                &json!({
                    "hackathon_id": hackathon_id,
                    "team_name": "Second",
                    "member_ids": [bob_id],
                }),
                &mia,
            )
            .await;
        assert_eq!(second.status, 201);
    }

    #[tokio::test]
    async fn the_leader_cannot_leave() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, lee) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&lee, hackathon_id, "First", &[]).await;

        let res = app
            .post_with_token(&routes::team_leave(team_id), &json!({}), &lee)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn leader_removes_a_member_but_not_themselves() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (lee_id, lee) = app.create_user("lee").await;
        let (bob_id, _) = app.create_user("bob").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&lee, hackathon_id, "First", &[bob_id]).await;

        let removed = app
            .delete_with_token(&routes::team_member(team_id, bob_id), &lee)
            .await;
        assert_eq!(removed.status, 204);

        let team = app.get_with_token(&routes::team(team_id), &lee).await;
        let members = team.body["members"].as_array().unwrap();
        let bob = members.iter().find(|m| m["user_id"] == bob_id).unwrap();
        assert_eq!(bob["status"], "removed");

        let self_removal = app
            .delete_with_token(&routes::team_member(team_id, lee_id), &lee)
            .await;
        assert_eq!(self_removal.status, 400);
    }

    #[tokio::test]
    async fn my_teams_lists_active_memberships() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, lee) = app.create_user("lee").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;
        let team_id = app.register_team(&lee, hackathon_id, "First", &[]).await;

        let res = app.get_with_token(routes::MY_TEAMS, &lee).await;
        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["id"], team_id);

        let by_hackathon = app
            .get_with_token(&routes::my_team_for_hackathon(hackathon_id), &lee)
            .await;
        assert_eq!(by_hackathon.status, 200);
        assert_eq!(by_hackathon.body["id"], team_id);
    }
}

mod staff_listing {
    use super::*;

    #[tokio::test]
    async fn organizer_lists_teams_ordered_by_score() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, lee) = app.create_user("lee").await;
        let (_, mia) = app.create_user("mia").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({ "auto_accept_teams": true }))
            .await;
        app.register_team(&lee, hackathon_id, "Low", &[]).await;
        let high = app.register_team(&mia, hackathon_id, "High", &[]).await;

        let res = app
            .post_with_token(
                &routes::team_score(high),
                &json!({
                    "round_id": "round-1",
                    "criteria": [{ "criteria_name": "Overall", "score": 9.0, "max_score": 10.0 }],
                }),
                &organizer,
            )
            .await;
        assert_eq!(res.status, 201);

        let list = app
            .get_with_token(&routes::hackathon_teams(hackathon_id), &organizer)
            .await;
        assert_eq!(list.status, 200);
        let data = list.body["data"].as_array().unwrap();
        assert_eq!(data[0]["team_name"], "High");
        assert_eq!(list.body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn plain_users_cannot_list_a_hackathons_teams() {
        let app = TestApp::spawn().await;
        let (_, organizer) = app.create_user("olivia").await;
        let (_, sam) = app.create_user("sam").await;

        let hackathon_id = app
            .create_published_hackathon(&organizer, "Hack", json!({}))
            .await;

        let res = app
            .get_with_token(&routes::hackathon_teams(hackathon_id), &sam)
            .await;

        assert_eq!(res.status, 403);
    }
}
