use actix_web::{get, post, web, HttpResponse, Result as WebResult};
use tracing::error;

use crate::api::models::{ErrorResponse, HistoryQuery, HistoryResponse, SendMessageRequest};
use crate::chat::{ChatError, Orchestrator};

#[post("/send")]
pub async fn send_message(
    orchestrator: web::Data<Orchestrator>,
    req: web::Json<SendMessageRequest>,
) -> WebResult<HttpResponse> {
    let req = req.into_inner();

    match orchestrator
        .handle_user_message(req.session_id, &req.message)
        .await
    {
        Ok(reply) => Ok(HttpResponse::Ok().json(reply)),
        Err(ChatError::Validation(msg)) => {
            Ok(HttpResponse::BadRequest().json(ErrorResponse { error: msg }))
        }
        Err(ChatError::Storage(e)) => {
            error!("Storage failure while handling message: {}", e);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: "storage unavailable".into(),
            }))
        }
    }
}

#[get("/history")]
pub async fn get_history(
    orchestrator: web::Data<Orchestrator>,
    query: web::Query<HistoryQuery>,
) -> WebResult<HttpResponse> {
    match orchestrator.history(query.session_id) {
        Ok(messages) => Ok(HttpResponse::Ok().json(HistoryResponse { messages })),
        Err(e) => {
            error!("Storage failure while fetching history: {}", e);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: "storage unavailable".into(),
            }))
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chat")
            .service(send_message)
            .service(get_history),
    );
}
