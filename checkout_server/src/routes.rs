//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here awaits the database or the payment gateway, so
//! all of them are async.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use checkout_engine::{
    checkout_objects::CheckoutRequest,
    traits::{CheckoutDatabase, InventoryManagement, PaymentGateway},
    CatalogApi,
    CheckoutApi,
    ReconciliationApi,
    ReconciliationError,
    TransactionFlowApi,
};
use log::*;

use crate::{
    data_objects::{JsonResponse, ProductResponse, TransactionResponse},
    errors::ServerError,
};

/// The header the gateway puts the webhook event checksum in.
pub const EVENT_CHECKSUM_HEADER: &str = "x-event-checksum";

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

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(products => Get "/products" impl InventoryManagement);
pub async fn products<B: InventoryManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET products");
    let products = api.products().await?.into_iter().map(ProductResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl InventoryManagement);
pub async fn product_by_id<B: InventoryManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    trace!("💻️ GET product #{id}");
    let product = api
        .product(id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Product {id} does not exist")))?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl CheckoutDatabase, PaymentGateway);
/// Reserves stock and starts the payment. The buyer's browser then follows the transaction through
/// `/transactions/{id}` until the payment settles.
pub async fn checkout<B: CheckoutDatabase, G: PaymentGateway>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST checkout for {}x product #{}", request.quantity, request.product_id);
    let result = api.reserve_and_initiate(request).await.map_err(|e| {
        debug!("💻️ Checkout refused. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Created().json(result))
}

route!(transaction_by_id => Get "/transactions/{id}" impl CheckoutDatabase);
pub async fn transaction_by_id<B: CheckoutDatabase>(
    path: web::Path<i64>,
    api: web::Data<TransactionFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    trace!("💻️ GET transaction #{id}");
    let txn = api
        .fetch_transaction(id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Transaction {id} does not exist")))?;
    Ok(HttpResponse::Ok().json(TransactionResponse::from(txn)))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(gateway_webhook => Post "/webhooks/gateway" impl CheckoutDatabase, PaymentGateway);
/// Receives payment status events from the gateway.
///
/// The body is taken as raw text so that it can be stored verbatim before it is interpreted. The response is always
/// `200 OK`: the gateway re-delivers anything else, and re-delivery cannot fix a bad signature, an unknown reference
/// or a processing failure. The `success` flag and message tell a human what happened.
pub async fn gateway_webhook<B: CheckoutDatabase, G: PaymentGateway>(
    req: HttpRequest,
    body: String,
    api: web::Data<ReconciliationApi<B, G>>,
) -> HttpResponse {
    trace!("🪝️ Received webhook request: {}", req.uri());
    let signature = req.headers().get(EVENT_CHECKSUM_HEADER).and_then(|v| v.to_str().ok());
    let result = match api.handle_webhook(&body, signature).await {
        Ok(outcome) => {
            let message = outcome.describe();
            info!("🪝️ {message}");
            JsonResponse::success(message)
        },
        Err(ReconciliationError::Unauthorized) => {
            warn!("🪝️ Rejected a webhook delivery with a missing or invalid signature");
            JsonResponse::failure(ReconciliationError::Unauthorized)
        },
        Err(e) => {
            error!("🪝️ Could not process webhook delivery. {e}");
            JsonResponse::failure(e)
        },
    };
    HttpResponse::Ok().json(result)
}
