/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod authorization;
pub mod endpoints;
pub mod error;
pub mod upload;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::{Router, middleware};
use endpoints::*;
use jobbergate_core::types::ServerState;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and the runtime config next to the file itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

fn cors_layer(state: &ServerState) -> Result<CorsLayer> {
    let allow_origin = match &state.cli.cors_origin {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin).context("Invalid CORS origin")?,
        ),
        None => AllowOrigin::any(),
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]))
}

pub fn create_router(state: Arc<ServerState>) -> Result<Router> {
    let body_limit = usize::try_from(state.cli.max_upload_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let api = Router::new()
        .route(
            "/applications",
            get(applications::get).post(applications::post),
        )
        .route(
            "/applications/{id}",
            get(applications::get_application)
                .put(applications::put_application)
                .delete(applications::delete_application),
        )
        .route(
            "/applications/{id}/upload",
            get(applications::get_application_upload)
                .post(applications::post_application_upload)
                .put(applications::post_application_upload)
                .delete(applications::delete_application_upload),
        )
        .route(
            "/job-script-templates",
            get(job_templates::get).post(job_templates::post),
        )
        .route(
            "/job-script-templates/{id}",
            get(job_templates::get_template)
                .put(job_templates::put_template)
                .delete(job_templates::delete_template),
        )
        .route(
            "/job-script-templates/{id}/upload/template/{file}",
            get(job_templates::get_template_file)
                .put(job_templates::put_template_file)
                .post(job_templates::put_template_file)
                .delete(job_templates::delete_template_file),
        )
        .route(
            "/job-script-templates/{id}/upload/workflow",
            get(job_templates::get_workflow_file)
                .put(job_templates::put_workflow_file)
                .post(job_templates::put_workflow_file)
                .delete(job_templates::delete_workflow_file),
        )
        .route("/job-scripts", get(job_scripts::get).post(job_scripts::post))
        .route(
            "/job-scripts/render-from-template/{id}",
            post(job_scripts::post_render_from_template),
        )
        .route(
            "/job-scripts/{id}",
            get(job_scripts::get_job_script)
                .put(job_scripts::put_job_script)
                .delete(job_scripts::delete_job_script),
        )
        .route(
            "/job-scripts/{id}/upload/{file}",
            get(job_scripts::get_job_script_file)
                .put(job_scripts::put_job_script_file)
                .post(job_scripts::put_job_script_file)
                .delete(job_scripts::delete_job_script_file),
        )
        .route(
            "/job-submissions",
            get(job_submissions::get).post(job_submissions::post),
        )
        .route(
            "/job-submissions/agent/pending",
            get(job_submissions::get_pending),
        )
        .route(
            "/job-submissions/agent/active",
            get(job_submissions::get_active),
        )
        .route(
            "/job-submissions/agent/{id}",
            put(job_submissions::put_agent_submission),
        )
        .route(
            "/job-submissions/{id}",
            get(job_submissions::get_submission)
                .put(job_submissions::put_submission)
                .delete(job_submissions::delete_submission),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            authorization::authorize,
        ))
        .route("/health", get(get_health));

    let cors = cors_layer(&state)?;

    Ok(Router::new()
        .nest("/jobbergate", api)
        .fallback(handle_404)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

pub async fn serve_web(state: Arc<ServerState>) -> Result<()> {
    let server_url = format!("{}:{}", state.cli.ip, state.cli.port);
    let app = create_router(Arc::clone(&state))?;

    let listener = tokio::net::TcpListener::bind(&server_url)
        .await
        .with_context(|| format!("Failed to bind {}", server_url))?;

    tracing::info!("Listening on {}", server_url);

    axum::serve(listener, app).await.context("Web server failed")
}
