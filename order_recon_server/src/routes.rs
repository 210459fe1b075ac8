//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers hold no state of their own: every route borrows the shared [`OrderFlowApi`] and
//! delegates to it, so the HTTP layer stays a thin translation between requests and
//! coordinator calls.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use order_recon_engine::{
    db_types::{NewOrder, PaymentSucceededEvent},
    traits::OrderStore,
    OrderFlowApi,
};

use crate::{
    data_objects::{JsonResponse, UpdateStatusParams},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderStore);
/// Route handler for the browser checkout path.
///
/// The candidate is submitted to the creation coordinator, which either writes it or returns
/// the existing record it duplicates. The distinction is surfaced in the status code: `201`
/// for a fresh record, `200` when the coordinator matched an existing one, with the
/// persisted order as the body either way.
pub async fn create_order<B: OrderStore>(
    body: web::Json<NewOrder>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let candidate = body.into_inner();
    debug!("💻️ POST order {}", candidate.order_number);
    let (order, created) = api.create_or_reuse(candidate).await?;
    let response = if created { HttpResponse::Created().json(order) } else { HttpResponse::Ok().json(order) };
    Ok(response)
}

route!(orders => Get "/orders" impl OrderStore);
pub async fn orders<B: OrderStore>(api: web::Data<OrderFlowApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET orders");
    let orders = api.fetch_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl OrderStore);
pub async fn order_by_id<B: OrderStore>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET order {id}");
    let order = api.fetch_order(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(order_stats => Get "/orders/stats" impl OrderStore);
pub async fn order_stats<B: OrderStore>(api: web::Data<OrderFlowApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET order statistics");
    let stats = api.statistics().await?;
    Ok(HttpResponse::Ok().json(stats))
}

route!(order_audit => Get "/orders/audit" impl OrderStore);
pub async fn order_audit<B: OrderStore>(api: web::Data<OrderFlowApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET reconciliation audit");
    let findings = api.audit().await?;
    Ok(HttpResponse::Ok().json(findings))
}

route!(update_status => Patch "/orders/{id}/status" impl OrderStore);
pub async fn update_status<B: OrderStore>(
    path: web::Path<i64>,
    body: web::Json<UpdateStatusParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let new_status = body.into_inner().status;
    debug!("💻️ PATCH order {id} status to {new_status}");
    let order = api.modify_status(id, new_status).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(delete_order => Delete "/orders/{id}" impl OrderStore);
/// Deletes an order. The content is retained in the undo buffer for a short grace period, so
/// an admin slip can be reversed via the restore endpoint.
pub async fn delete_order<B: OrderStore>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("🗑️ DELETE order {id}");
    let order = api.delete_order(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(restore_order => Post "/orders/{id}/restore" impl OrderStore);
pub async fn restore_order<B: OrderStore>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("🗑️ POST restore order {id}");
    let (order, _created) = api.restore_order(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(payment_confirmed => Post "/payment_confirmed" impl OrderStore);
/// The payment processor's "payment succeeded" webhook.
///
/// Responses must always be in the 200 range, otherwise the processor will retry; every
/// failure is acknowledged and reported only in the response envelope and the logs.
pub async fn payment_confirmed<B: OrderStore>(
    body: web::Json<PaymentSucceededEvent>,
    api: web::Data<OrderFlowApi<B>>,
) -> HttpResponse {
    let event = body.into_inner();
    info!("💸️ Payment confirmation received for {} ({})", event.payment_id, event.amount);
    let result = match api.handle_payment_succeeded(event).await {
        Some(order) => JsonResponse::success(format!("Payment resolved to order {}", order.order_number)),
        None => JsonResponse::failure("Payment notification could not be resolved to an order."),
    };
    HttpResponse::Ok().json(result)
}
