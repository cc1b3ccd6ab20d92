use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use session_guard_axum::{GuardContext, XsrfSession, establish_session, remember_login};

pub(crate) async fn index() -> &'static str {
    "GET  /auth/xsrf-token    anonymous XSRF token\n\
     POST /login/{user}       log in (no credential check in this demo)\n\
     POST /api/whoami         needs the X-XSRF-Token header\n\
     POST /auth/logout        revoke everything presented\n"
}

/// Logs anyone in; a real application checks credentials first
pub(crate) async fn login(
    State(ctx): State<GuardContext>,
    Path(user): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut response_headers = match establish_session(&ctx, &user, &headers).await {
        Ok((_, response_headers)) => response_headers,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    if ctx.long_term().is_some() {
        match remember_login(&ctx, &user).await {
            Ok(long_term_headers) => {
                for (name, value) in long_term_headers.iter() {
                    response_headers.append(name.clone(), value.clone());
                }
            }
            Err(e) => tracing::warn!("Could not start a long-term login: {}", e),
        }
    }

    (StatusCode::OK, response_headers, format!("Logged in as {user}\n")).into_response()
}

pub(crate) async fn whoami(session: XsrfSession) -> String {
    match session.user_id() {
        Some(user) => format!("{user}\n"),
        None => "anonymous\n".to_string(),
    }
}
