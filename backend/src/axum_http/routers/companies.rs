use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use crates::{
    domain::repositories::{applications::ApplicationRepository, companies::CompanyRepository},
    infra::db::repositories::{applications::ApplicationPostgres, companies::CompanyPostgres},
};

use crate::{
    auth::AuthUser,
    axum_http::{error_responses::map_error, http_serve::AppContext},
    usecases::{company_research::CompanyResearchUseCase, gateways::CompanyResearchGateway},
};

pub fn routes(ctx: &AppContext) -> Router {
    let company_repository = CompanyPostgres::new(Arc::clone(&ctx.db_pool));
    let application_repository = ApplicationPostgres::new(Arc::clone(&ctx.db_pool));
    let company_usecase = CompanyResearchUseCase::new(
        Arc::new(company_repository),
        Arc::new(application_repository),
        Arc::clone(&ctx.research),
        ctx.research_timeout,
    );

    Router::new()
        .route("/:slug", get(get_company))
        .with_state(Arc::new(company_usecase))
}

pub async fn get_company<C, A, R>(
    State(company_usecase): State<Arc<CompanyResearchUseCase<C, A, R>>>,
    _auth: AuthUser,
    Path(slug): Path<String>,
) -> Response
where
    C: CompanyRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
    R: CompanyResearchGateway + 'static,
{
    match company_usecase.get_company(slug.trim()).await {
        Ok(company) => (StatusCode::OK, Json(company)).into_response(),
        Err(err) => map_error("get_company", err),
    }
}
