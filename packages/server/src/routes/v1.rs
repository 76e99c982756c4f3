use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/hackathons", hackathon_routes())
        .nest("/teams", team_routes())
        .nest("/payments", payment_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn hackathon_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::hackathon::list_hackathons,
            handlers::hackathon::create_hackathon
        ))
        .routes(routes!(handlers::hackathon::my_organized))
        .routes(routes!(handlers::hackathon::my_coordinations))
        .routes(routes!(
            handlers::hackathon::get_hackathon,
            handlers::hackathon::update_hackathon,
            handlers::hackathon::delete_hackathon
        ))
        .routes(routes!(handlers::hackathon::invite_coordinator))
        .routes(routes!(handlers::hackathon::accept_coordinator))
        .routes(routes!(handlers::hackathon::decline_coordinator))
        .routes(routes!(handlers::hackathon::update_coordinator_permissions))
        .routes(routes!(handlers::hackathon::invite_judge))
        .routes(routes!(handlers::hackathon::accept_judge))
        .routes(routes!(handlers::hackathon::decline_judge))
}

fn team_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::team::register_team))
        .routes(routes!(handlers::team::my_teams))
        .routes(routes!(handlers::team::my_team_for_hackathon))
        .routes(routes!(handlers::join_request::my_join_requests))
        .routes(routes!(handlers::team::list_teams_by_hackathon))
        .routes(routes!(handlers::team::leaderboard))
        .routes(routes!(
            handlers::team::get_team,
            handlers::team::update_team
        ))
        .routes(routes!(handlers::team::check_in_team))
        .routes(routes!(handlers::team::check_in_member))
        .routes(routes!(handlers::team::assign_team))
        .routes(routes!(handlers::team::approve_team))
        .routes(routes!(handlers::team::reject_team))
        .routes(routes!(handlers::team::submit_project))
        .routes(routes!(handlers::team::score_team))
        .routes(routes!(handlers::team::eliminate_team))
        .routes(routes!(handlers::team::leave_team))
        .routes(routes!(handlers::team::remove_member))
        .routes(routes!(
            handlers::join_request::create_join_request,
            handlers::join_request::list_team_join_requests
        ))
        .routes(routes!(handlers::join_request::accept_join_request))
        .routes(routes!(handlers::join_request::reject_join_request))
        .routes(routes!(handlers::join_request::cancel_join_request))
}

fn payment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::payment::create_order))
        .routes(routes!(handlers::payment::verify_payment))
        .routes(routes!(
            handlers::payment::list_plans,
            handlers::payment::create_plan
        ))
        .routes(routes!(handlers::payment::subscribe))
        .routes(routes!(handlers::payment::cancel_subscription))
        .routes(routes!(handlers::payment::webhook))
}
