use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use contactgate_core::health::{healthz, readyz};
use contactgate_core::middleware::request_id_layer;

use crate::handlers::{
    activation::{activate_email, check_servers},
    batch::send_batch,
    bounces::{get_bounces, get_stats, list_streams, reactivate_bounce},
    queue::{enqueue_test_email, process_queue},
    send::{send_email, send_template},
    settings::{get_settings, update_settings},
    superadmin::{get_shared_config, update_shared_config},
    suppressions::{add_suppressions, remove_suppressions},
    webhook::receive_webhook,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Sending
        .route("/email/send", post(send_email))
        .route("/email/send-template", post(send_template))
        .route("/email/batch", post(send_batch))
        .route("/email/test", post(enqueue_test_email))
        // Settings
        .route("/email/settings", get(get_settings))
        .route("/email/settings", post(update_settings))
        // Activation
        .route("/email/activate", post(activate_email))
        .route("/email/servers/check", get(check_servers))
        // Queue trigger (internal proxy only)
        .route("/email/queue/process", post(process_queue))
        // Bounces / stats / streams
        .route("/email/bounces", get(get_bounces))
        .route("/email/bounces/{id}/activate", put(reactivate_bounce))
        .route("/email/stats", get(get_stats))
        .route("/email/streams", get(list_streams))
        // Suppressions
        .route("/email/suppressions", post(add_suppressions))
        .route("/email/suppressions", delete(remove_suppressions))
        // Provider callbacks
        .route("/email/webhook", post(receive_webhook))
        // Superadmin
        .route("/superadmin/shared-config", get(get_shared_config))
        .route("/superadmin/shared-config", put(update_shared_config))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
