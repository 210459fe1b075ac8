use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use order_recon_engine::{
    events::{EventHandlers, EventHooks},
    traits::OrderStore,
    OrderFlowApi,
    SqliteOrderStore,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        CreateOrderRoute,
        DeleteOrderRoute,
        OrderAuditRoute,
        OrderByIdRoute,
        OrderStatsRoute,
        OrdersRoute,
        PaymentConfirmedRoute,
        RestoreOrderRoute,
        UpdateStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteOrderStore::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Wires the event hooks that fire after the coordinator writes or transitions an order.
/// Order-confirmation email delivery would subscribe here; for now the hooks record the
/// events for operational follow-up.
fn build_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_created(|ev| {
        Box::pin(async move {
            info!("📬️ Order {} created for {}", ev.order.order_number, ev.order.customer.email);
        })
    });
    hooks.on_status_changed(|ev| {
        Box::pin(async move {
            info!("📬️ Order {} moved from {} to {}", ev.order.order_number, ev.old_status, ev.order.status);
        })
    });
    EventHandlers::new(128, hooks)
}

pub fn create_server_instance<B>(config: ServerConfig, db: B) -> Result<Server, ServerError>
where B: OrderStore + Send + Sync + 'static {
    let handlers = build_event_handlers();
    let producers = handlers.producers();
    tokio::spawn(handlers.start_handlers());
    // One coordinator shared by all workers: the undo buffer lives inside it, and a delete
    // handled by one worker must be restorable through any other.
    let orders_api = web::Data::new(OrderFlowApi::new(db, producers).with_order_prefix(config.order_prefix));
    let srv = HttpServer::new(move || {
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sor::access_log"))
            .app_data(orders_api.clone());
        // Literal paths before the {id} matcher, or "stats" would be parsed as an order id.
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<B>::new())
            .service(OrdersRoute::<B>::new())
            .service(OrderStatsRoute::<B>::new())
            .service(OrderAuditRoute::<B>::new())
            .service(OrderByIdRoute::<B>::new())
            .service(UpdateStatusRoute::<B>::new())
            .service(DeleteOrderRoute::<B>::new())
            .service(RestoreOrderRoute::<B>::new());
        let webhook_scope = web::scope("/webhook").service(PaymentConfirmedRoute::<B>::new());
        app.service(api_scope).service(webhook_scope).service(health)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
