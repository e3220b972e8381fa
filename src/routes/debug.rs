//! Dev-only introspection endpoint: the resolved configuration as JSON.
//! Registered only when `APP_ENV=dev` (see [`super::registry`]).

use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::config::model::FinalConfig;

pub async fn debug_config(config: web::Data<Arc<FinalConfig>>) -> HttpResponse {
    HttpResponse::Ok().json(config.get_ref().as_ref())
}
