//! Route handlers
//!
//! Handlers stay thin: they pull the verified claims and the payload out of the request, hand them to [`OrderApi`],
//! and wrap the result in a response body. Every check on who may do what lives in the order engine.
//!
//! The order routes are generic over the store and the mirror, so the endpoint tests can run them against mocks.
use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use log::*;
use order_engine::{claims::authenticate, OrderApi, OrderMirror, OrderStore};

use crate::{
    auth::BearerClaims,
    config::AuthConfig,
    data_objects::{ExternalApiResponse, NewOrderRequest, OrderCreatedResponse, OrderHistoryResponse, SpaConfig},
    errors::ServerError,
};

// actix-web handler attributes do not accept generic functions, so generic routes are registered through `route!`
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

// ----------------------------------------------  SPA config  --------------------------------------------------
/// The public identity provider settings the single-page app needs before it can log anyone in.
#[get("/auth_config.json")]
pub async fn auth_config(config: web::Data<AuthConfig>) -> impl Responder {
    trace!("💻️ Received auth config request");
    HttpResponse::Ok().json(SpaConfig::from(config.get_ref()))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderStore, OrderMirror);
/// Route handler for placing an order
///
/// The body is `{ "order": { "items": [{ "name": "Margherita", "quantity": 2 }] } }`. The caller's token must grant
/// `create:orders` and show a verified email address. The body is only inspected once the token has passed these
/// checks, so an unauthorized caller learns nothing about what a valid order looks like.
pub async fn create_order<S, M>(
    claims: BearerClaims,
    body: web::Bytes,
    api: web::Data<OrderApi<S, M>>,
) -> Result<HttpResponse, ServerError>
where
    S: OrderStore,
    M: OrderMirror,
{
    trace!("💻️ Received new order request");
    let request = NewOrderRequest::from_body(&body);
    let order = api.create_order(claims.claims(), &request.order).await?;
    debug!("💻️ Order {} accepted", order.id);
    Ok(HttpResponse::Ok().json(OrderCreatedResponse { success: true, order }))
}

route!(my_orders => Get "/orders" impl OrderStore, OrderMirror);
/// Route handler for the caller's order history
///
/// Orders are returned newest first. `order_number` counts up from the caller's oldest order.
pub async fn my_orders<S, M>(claims: BearerClaims, api: web::Data<OrderApi<S, M>>) -> Result<HttpResponse, ServerError>
where
    S: OrderStore,
    M: OrderMirror,
{
    trace!("💻️ Received order history request");
    let orders = api.list_orders(claims.claims()).await?;
    debug!("💻️ Returning {} orders", orders.len());
    Ok(HttpResponse::Ok().json(OrderHistoryResponse { success: true, orders }))
}

//----------------------------------------------   External  ----------------------------------------------------
/// Confirms that the caller holds a valid, unexpired access token. No particular permission is needed.
#[get("/external")]
pub async fn external(claims: BearerClaims) -> Result<HttpResponse, ServerError> {
    let subject = authenticate(claims.claims(), Utc::now())?;
    debug!("💻️ External API call from {subject}");
    Ok(HttpResponse::Ok().json(ExternalApiResponse { msg: "Your access token was successfully validated!".into() }))
}
