use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use order_recon_engine::{
    db_types::{CustomerInfo, NewOrder, OrderItem},
    events::EventProducers,
    MemoryOrderStore,
    OrderFlowApi,
};
use sor_common::Money;

use crate::routes::{
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
};

pub fn test_api() -> web::Data<OrderFlowApi<MemoryOrderStore>> {
    let _ = env_logger::try_init();
    web::Data::new(OrderFlowApi::new(MemoryOrderStore::new(), EventProducers::default()))
}

pub fn sample_order(order_number: &str) -> NewOrder {
    let customer = CustomerInfo::new("Jane", "Doe", "jane@example.com");
    let items = vec![OrderItem::new("sku-1", "Teapot", 1, Money::from(42.5))];
    NewOrder::new(order_number.into(), customer, items).with_shipping(Money::from(4.99)).with_request_id("req-1")
}

/// Spins up the full route table around the shared coordinator and executes one request.
/// `api` is `web::Data`, so state carries across calls within a test.
pub async fn send(api: &web::Data<OrderFlowApi<MemoryOrderStore>>, req: TestRequest) -> (StatusCode, String) {
    let app = App::new()
        .app_data(api.clone())
        .service(
            web::scope("/api")
                .service(CreateOrderRoute::<MemoryOrderStore>::new())
                .service(OrdersRoute::<MemoryOrderStore>::new())
                .service(OrderStatsRoute::<MemoryOrderStore>::new())
                .service(OrderAuditRoute::<MemoryOrderStore>::new())
                .service(OrderByIdRoute::<MemoryOrderStore>::new())
                .service(UpdateStatusRoute::<MemoryOrderStore>::new())
                .service(DeleteOrderRoute::<MemoryOrderStore>::new())
                .service(RestoreOrderRoute::<MemoryOrderStore>::new()),
        )
        .service(web::scope("/webhook").service(PaymentConfirmedRoute::<MemoryOrderStore>::new()))
        .service(health);
    let service = test::init_service(app).await;
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}
