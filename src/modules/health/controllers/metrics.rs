use crate::middleware::MetricsCollector;
use actix_web::{web, HttpResponse};

/// GET /metrics - snapshot of the in-process request counters
#[tracing::instrument(skip(collector))]
pub async fn get_metrics(collector: web::Data<MetricsCollector>) -> HttpResponse {
    let metrics = collector.get_metrics();
    HttpResponse::Ok().json(metrics)
}
