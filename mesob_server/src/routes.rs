//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```

use actix_web::{get, web, HttpResponse, Responder};
use chapa_tools::PaymentGateway;
use log::*;
use mesob_common::parse_boolean_flag;
use mesob_engine::{
    db_types::{
        CartItemRequest,
        Delivery,
        MenuItemUpdate,
        NewDelivery,
        NewDeliveryPerson,
        NewMenuItem,
        NewRestaurant,
        NewStaff,
        Order,
        PaymentMethod,
        PaymentStatusType,
        Role,
    },
    delivery_objects::DeliveryQueryFilter,
    traits::{
        AuthManagement,
        CustomerManagement,
        DeliveryManagement,
        MenuManagement,
        OrderManagement,
        RestaurantManagement,
        StaffManagement,
    },
    AuthApi,
    CustomerApi,
    DeliveryApi,
    MenuApi,
    OrderFlowApi,
    RestaurantApi,
    StaffApi,
};
use serde_json::json;

use crate::{
    auth::{hash_password, verify_password, JwtClaims, TokenIssuer},
    data_objects::{
        AvailabilityUpdate,
        DeliverySearchQuery,
        DeliveryStatusUpdateRequest,
        JsonResponse,
        LoginRequest,
        LoginResponse,
        MenuQuery,
        NewDeliveryPersonRequest,
        NewOrderRequest,
        NewStaffRequest,
        OrderSearchQuery,
        RegisterCustomerRequest,
        StatusUpdateRequest,
    },
    errors::{AuthError, ServerError},
    payments::{start_gateway_payment, verify_and_settle, SettlementOutcome},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds> ],)+ > [<$name:camel Route>]< $( [< T $bounds> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds>],)+>
        where
            $([<T $bounds>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+ requires [$($roles:expr),+])  => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds> ],)+ > [<$name:camel Route>]< $( [< T $bounds> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds>],)+>
        where
            $([<T $bounds>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds >], )+>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
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

//----------------------------------------------   Auth  ----------------------------------------------------
route!(login => Post "/auth/login" impl AuthManagement);
/// Route handler for the login endpoint
///
/// Clients post their email, password and the kind of account they want to log in as ([`Role`]). On success the
/// server issues a JWT carrying the account id and role, which must be supplied as a Bearer token on every `/api`
/// request. The token is valid for 24 hours and does NOT refresh.
pub async fn login<A: AuthManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<AuthApi<A>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let LoginRequest { email, password, role } = body.into_inner();
    trace!("💻️ Login request for a {role} account");
    // An unknown email and a wrong password get the same response, so callers cannot probe for accounts.
    let credentials = api
        .credentials(role, &email)
        .await?
        .ok_or(ServerError::AuthenticationError(AuthError::InvalidCredentials))?;
    if !verify_password(&credentials.password_hash, &password)? {
        debug!("💻️ Password mismatch for a {role} login");
        return Err(ServerError::AuthenticationError(AuthError::InvalidCredentials));
    }
    let token = signer.issue_token(credentials.id, role, None)?;
    info!("🗝️ Issued an access token for {} ({role})", credentials.name);
    let response = LoginResponse { token, id: credentials.id, name: credentials.name, role };
    Ok(HttpResponse::Ok().json(response))
}

route!(check_token => Get "/check_token" requires [Role::Customer, Role::RestaurantOwner, Role::DeliveryPerson]);
pub async fn check_token(claims: JwtClaims) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET check_token for account {}", claims.sub);
    Ok(HttpResponse::Ok().body("Token is valid."))
}

//----------------------------------------------   Customers  ----------------------------------------------------
route!(register_customer => Post "/customers/register" impl CustomerManagement);
/// Open registration endpoint for customers. The password is hashed before it goes anywhere near the database.
pub async fn register_customer<B: CustomerManagement>(
    body: web::Json<RegisterCustomerRequest>,
    api: web::Data<CustomerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST register customer on {} campus", request.campus);
    let password_hash = hash_password(&request.password)?;
    let customer = api.register(request.into_new_customer(password_hash)).await?;
    info!("🧑️ Registered customer {} ({})", customer.name, customer.email);
    Ok(HttpResponse::Created().json(customer))
}

route!(customers => Get "/customers" impl CustomerManagement requires [Role::RestaurantOwner]);
pub async fn customers<B: CustomerManagement>(api: web::Data<CustomerApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET customers");
    let customers = api.customers().await?;
    Ok(HttpResponse::Ok().json(customers))
}

route!(customer_by_id => Get "/customers/{id}" impl CustomerManagement requires [Role::RestaurantOwner]);
pub async fn customer_by_id<B: CustomerManagement>(
    path: web::Path<i64>,
    api: web::Data<CustomerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET customer {id}");
    let customer =
        api.customer_by_id(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("No customer with id {id}")))?;
    Ok(HttpResponse::Ok().json(customer))
}

//----------------------------------------------   Carts  ----------------------------------------------------
route!(my_cart => Get "/my/cart" impl CustomerManagement requires [Role::Customer]);
pub async fn my_cart<B: CustomerManagement>(
    claims: JwtClaims,
    api: web::Data<CustomerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET cart for customer {}", claims.sub);
    let cart = api.cart(claims.sub).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(replace_my_cart => Put "/my/cart" impl CustomerManagement requires [Role::Customer]);
/// Replaces the saved cart wholesale. Clients send the full cart on every change rather than deltas.
pub async fn replace_my_cart<B: CustomerManagement>(
    claims: JwtClaims,
    body: web::Json<Vec<CartItemRequest>>,
    api: web::Data<CustomerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let items = body.into_inner();
    debug!("💻️ PUT cart with {} lines for customer {}", items.len(), claims.sub);
    let cart = api.replace_cart(claims.sub, items).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(clear_my_cart => Delete "/my/cart" impl CustomerManagement requires [Role::Customer]);
pub async fn clear_my_cart<B: CustomerManagement>(
    claims: JwtClaims,
    api: web::Data<CustomerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ DELETE cart for customer {}", claims.sub);
    api.clear_cart(claims.sub).await?;
    Ok(HttpResponse::Ok().finish())
}

//----------------------------------------------   History  ----------------------------------------------------
route!(my_history => Get "/my/history" impl CustomerManagement requires [Role::Customer]);
pub async fn my_history<B: CustomerManagement>(
    claims: JwtClaims,
    api: web::Data<CustomerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET history for customer {}", claims.sub);
    let history = api.history(claims.sub).await?;
    Ok(HttpResponse::Ok().json(history))
}

route!(rebuild_history => Post "/customers/{id}/history/rebuild" impl CustomerManagement requires [Role::Admin]);
/// Drops and regenerates a customer's order history from their orders. A support tool for when the
/// history table has drifted from reality.
pub async fn rebuild_history<B: CustomerManagement>(
    path: web::Path<i64>,
    api: web::Data<CustomerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    info!("💻️ POST rebuild history for customer {id}");
    let history = api.rebuild_history(id).await?;
    Ok(HttpResponse::Ok().json(history))
}

//----------------------------------------------   Menu  ----------------------------------------------------
route!(menu => Get "/menu" impl MenuManagement);
/// The public menu. Pass `?available=true` to only get items that can be ordered right now.
pub async fn menu<B: MenuManagement>(
    query: web::Query<MenuQuery>,
    api: web::Data<MenuApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let only_available = parse_boolean_flag(query.into_inner().available, false);
    trace!("💻️ GET menu (only_available: {only_available})");
    let items = api.items(only_available).await?;
    Ok(HttpResponse::Ok().json(items))
}

route!(menu_item => Get "/menu/{id}" impl MenuManagement);
pub async fn menu_item<B: MenuManagement>(
    path: web::Path<i64>,
    api: web::Data<MenuApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    trace!("💻️ GET menu item {id}");
    let item =
        api.item_by_id(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("No menu item with id {id}")))?;
    Ok(HttpResponse::Ok().json(item))
}

route!(add_menu_item => Post "/menu" impl MenuManagement requires [Role::RestaurantOwner]);
pub async fn add_menu_item<B: MenuManagement>(
    body: web::Json<NewMenuItem>,
    api: web::Data<MenuApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let item = body.into_inner();
    info!("💻️ POST new menu item '{}'", item.name);
    let item = api.add_item(item).await?;
    Ok(HttpResponse::Created().json(item))
}

route!(update_menu_item => Put "/menu/{id}" impl MenuManagement requires [Role::RestaurantOwner]);
/// Partial update of a menu item. Only fields present in the body are changed.
pub async fn update_menu_item<B: MenuManagement>(
    path: web::Path<i64>,
    body: web::Json<MenuItemUpdate>,
    api: web::Data<MenuApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let update = body.into_inner();
    info!("💻️ PUT menu item {id}");
    let item = api.update_item(id, update).await?;
    Ok(HttpResponse::Ok().json(item))
}

route!(set_menu_availability => Patch "/menu/{id}/availability" impl MenuManagement requires [Role::RestaurantOwner]);
/// The sold-out switch. Separated from the full update so the kitchen can flip it quickly during service.
pub async fn set_menu_availability<B: MenuManagement>(
    path: web::Path<i64>,
    body: web::Json<AvailabilityUpdate>,
    api: web::Data<MenuApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let AvailabilityUpdate { available } = body.into_inner();
    info!("💻️ PATCH menu item {id} availability to {available}");
    let item = api.set_availability(id, available).await?;
    Ok(HttpResponse::Ok().json(item))
}

route!(remove_menu_item => Delete "/menu/{id}" impl MenuManagement requires [Role::RestaurantOwner]);
pub async fn remove_menu_item<B: MenuManagement>(
    path: web::Path<i64>,
    api: web::Data<MenuApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    info!("💻️ DELETE menu item {id}");
    api.remove_item(id).await?;
    Ok(HttpResponse::Ok().finish())
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(place_order => Post "/orders" impl OrderManagement, CustomerManagement, PaymentGateway requires [Role::Customer]);
/// Route handler for placing an order.
///
/// The customer id is taken from the access token, never from the body, so customers can only order for
/// themselves. Prices are snapshotted from the menu when the order is created. Cash orders settle their payment
/// immediately. Chapa orders get a checkout started in the same request; if the gateway refuses, the order is
/// still created (201), its payment is marked failed, and the response carries a message instead of a checkout
/// url. `POST /api/payments/initialize/{order_id}` retries the checkout later.
pub async fn place_order<B, C, G>(
    claims: JwtClaims,
    body: web::Json<NewOrderRequest>,
    orders: web::Data<OrderFlowApi<B>>,
    customers: web::Data<CustomerApi<C>>,
    gateway: web::Data<G>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    C: CustomerManagement,
    G: PaymentGateway,
{
    let request = body.into_inner();
    debug!("💻️ POST new order for customer {}", claims.sub);
    let (order, items) = orders.place_order(request.into_new_order(claims.sub)).await?;
    let body = match order.payment_method {
        PaymentMethod::Cash => json!({ "order": order, "items": items }),
        PaymentMethod::SantimPay => json!({
            "order": order,
            "items": items,
            "message": "SantimPay checkouts are not available yet. The order can be settled in cash.",
        }),
        PaymentMethod::Chapa => {
            match start_gateway_payment(orders.as_ref(), customers.as_ref(), gateway.as_ref(), order.id, claims.sub)
                .await
            {
                Ok((order, payment)) => json!({ "order": order, "items": items, "payment": payment }),
                Err(e) => {
                    warn!("💻️ Order {} was created but its checkout was not. {e}", order.id);
                    let order = orders.order_by_id(order.id).await?.unwrap_or(order);
                    json!({
                        "order": order,
                        "items": items,
                        "message": format!("The order was created, but the payment could not be started. {e}"),
                    })
                },
            }
        },
    };
    Ok(HttpResponse::Created().json(body))
}

route!(my_orders => Get "/my/orders" impl OrderManagement requires [Role::Customer]);
/// Authenticated customers fetch their own orders, newest first. Staff use the `/orders` search endpoint instead.
pub async fn my_orders<B: OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for customer {}", claims.sub);
    let orders = api.orders_for_customer(claims.sub).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(orders_search => Get "/orders" impl OrderManagement requires [Role::RestaurantOwner]);
pub async fn orders_search<B: OrderManagement>(
    query: web::Query<OrderSearchQuery>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = query.into_inner().into_filter();
    debug!("💻️ GET orders search");
    let orders = api.search_orders(filter).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl OrderManagement);
/// Fetch a single order.
///
/// There's no particular ACL on this route. Customers may only see their own orders; staff and delivery people
/// can look up any order, since they need the drop-off details to do their jobs.
pub async fn order_by_id<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET order {id}");
    let order = fetch_owned_order(&claims, id, api.as_ref()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(order_items => Get "/orders/{id}/items" impl OrderManagement);
pub async fn order_items<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET items for order {id}");
    let order = fetch_owned_order(&claims, id, api.as_ref()).await?;
    let items = api.order_items(order.id).await?;
    Ok(HttpResponse::Ok().json(items))
}

async fn fetch_owned_order<B: OrderManagement>(
    claims: &JwtClaims,
    id: i64,
    api: &OrderFlowApi<B>,
) -> Result<Order, ServerError> {
    let order =
        api.order_by_id(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("No order with id {id}")))?;
    if claims.role == Role::Customer && order.customer_id != claims.sub {
        return Err(ServerError::InsufficientPermissions("This order belongs to another customer.".to_string()));
    }
    Ok(order)
}

route!(update_order_status => Patch "/orders/{id}/status" impl OrderManagement requires [Role::RestaurantOwner]);
/// The kitchen moves orders through their lifecycle with this endpoint. Any status can be set, including moving
/// an order backwards when it was advanced by mistake.
pub async fn update_order_status<B: OrderManagement>(
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let StatusUpdateRequest { status } = body.into_inner();
    info!("💻️ PATCH order {id} status to {status}");
    let order = api.update_order_status(id, status).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(initialize_payment => Post "/payments/initialize/{order_id}" impl OrderManagement, CustomerManagement, PaymentGateway requires [Role::Customer]);
/// Starts a gateway checkout for a pending order.
///
/// The response carries the checkout URL the customer must be sent to. Only the order's owner can initialize its
/// payment, the order must still be pending, and the order's payment method must be a gateway method.
pub async fn initialize_payment<B, C, G>(
    claims: JwtClaims,
    path: web::Path<i64>,
    orders: web::Data<OrderFlowApi<B>>,
    customers: web::Data<CustomerApi<C>>,
    gateway: web::Data<G>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    C: CustomerManagement,
    G: PaymentGateway,
{
    let order_id = path.into_inner();
    debug!("💻️ POST initialize payment for order {order_id} by customer {}", claims.sub);
    let (_, payment) =
        start_gateway_payment(orders.as_ref(), customers.as_ref(), gateway.as_ref(), order_id, claims.sub).await?;
    Ok(HttpResponse::Ok().json(payment))
}

route!(verify_payment => Get "/payments/verify/{tx_ref}" impl OrderManagement, PaymentGateway);
/// The gateway callback. Chapa calls this after a checkout completes; the sweeper covers the case where the
/// callback never arrives.
///
/// The reference is never trusted on its own. The order only settles after this server has asked the gateway to
/// verify the transaction. Unknown references are reported as failures in the body but still answered with a 200,
/// since gateways retry callbacks that don't return success.
pub async fn verify_payment<B, G>(
    path: web::Path<String>,
    orders: web::Data<OrderFlowApi<B>>,
    gateway: web::Data<G>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    G: PaymentGateway,
{
    let tx_ref = path.into_inner();
    info!("💻️ Payment verification callback for [{tx_ref}]");
    let outcome = verify_and_settle(orders.as_ref(), gateway.as_ref(), &tx_ref, PaymentStatusType::Verified).await?;
    let response = match outcome {
        SettlementOutcome::Settled(order) => JsonResponse::success(format!("Payment for order {} settled", order.id)),
        SettlementOutcome::StillPending => JsonResponse::success("The payment has not completed yet"),
        SettlementOutcome::Failed(order) => JsonResponse::failure(format!("Payment for order {} failed", order.id)),
        SettlementOutcome::Unknown => JsonResponse::failure("Unknown payment reference"),
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Deliveries  ----------------------------------------------------
route!(assign_delivery => Post "/deliveries" impl DeliveryManagement requires [Role::RestaurantOwner]);
/// Hands an order to a delivery person. The engine enforces that the order is paid, in progress, unassigned, and
/// on the same campus as the delivery person.
pub async fn assign_delivery<B: DeliveryManagement>(
    body: web::Json<NewDelivery>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    info!("💻️ POST assign order {} to delivery person {}", request.order_id, request.delivery_person_id);
    let delivery = api.assign_order(request).await?;
    Ok(HttpResponse::Created().json(delivery))
}

route!(search_deliveries => Get "/deliveries" impl DeliveryManagement requires [Role::RestaurantOwner]);
pub async fn search_deliveries<B: DeliveryManagement>(
    query: web::Query<DeliverySearchQuery>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = query.into_inner().into_filter()?;
    debug!("💻️ GET deliveries search");
    let deliveries = api.search_deliveries(filter).await?;
    Ok(HttpResponse::Ok().json(deliveries))
}

route!(delivery_by_id => Get "/deliveries/{id}" impl DeliveryManagement);
/// Fetch a single delivery. Customers see deliveries of their own orders, delivery people see their own jobs,
/// staff see everything.
pub async fn delivery_by_id<B: DeliveryManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET delivery {id}");
    let delivery = fetch_owned_delivery(&claims, id, api.as_ref()).await?;
    Ok(HttpResponse::Ok().json(delivery))
}

route!(my_deliveries => Get "/my/deliveries" impl DeliveryManagement requires [Role::DeliveryPerson]);
pub async fn my_deliveries<B: DeliveryManagement>(
    claims: JwtClaims,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_deliveries for person {}", claims.sub);
    let filter = DeliveryQueryFilter::default().for_person(claims.sub);
    let deliveries = api.search_deliveries(filter).await?;
    Ok(HttpResponse::Ok().json(deliveries))
}

route!(update_delivery_status => Patch "/deliveries/{id}/status" impl DeliveryManagement requires [Role::DeliveryPerson]);
/// Delivery people report progress here. The delivered timestamp is stamped by the engine the first time a
/// delivery reaches the delivered state and never changes afterwards.
pub async fn update_delivery_status<B: DeliveryManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<DeliveryStatusUpdateRequest>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let DeliveryStatusUpdateRequest { status } = body.into_inner();
    let _ = fetch_owned_delivery(&claims, id, api.as_ref()).await?;
    info!("💻️ PATCH delivery {id} status to {status}");
    let delivery = api.update_delivery_status(id, status).await?;
    Ok(HttpResponse::Ok().json(delivery))
}

route!(confirm_delivery => Post "/deliveries/{id}/confirm" impl DeliveryManagement requires [Role::Customer]);
/// The customer's hand-over confirmation. Idempotent, and only valid once the delivery person has marked the
/// delivery as delivered.
pub async fn confirm_delivery<B: DeliveryManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let _ = fetch_owned_delivery(&claims, id, api.as_ref()).await?;
    info!("💻️ POST confirm receipt of delivery {id} by customer {}", claims.sub);
    let delivery = api.confirm_receipt(id).await?;
    Ok(HttpResponse::Ok().json(delivery))
}

async fn fetch_owned_delivery<B: DeliveryManagement>(
    claims: &JwtClaims,
    id: i64,
    api: &DeliveryApi<B>,
) -> Result<Delivery, ServerError> {
    let delivery =
        api.delivery_by_id(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("No delivery with id {id}")))?;
    let allowed = match claims.role {
        Role::Customer => delivery.customer_id == claims.sub,
        Role::DeliveryPerson => delivery.delivery_person_id == claims.sub,
        Role::Admin | Role::RestaurantOwner => true,
    };
    if !allowed {
        return Err(ServerError::InsufficientPermissions("This delivery does not involve your account.".to_string()));
    }
    Ok(delivery)
}

//----------------------------------------------   Delivery people  ----------------------------------------------------
route!(add_delivery_person => Post "/delivery-persons" impl DeliveryManagement requires [Role::Admin]);
pub async fn add_delivery_person<B: DeliveryManagement>(
    body: web::Json<NewDeliveryPersonRequest>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST new delivery person for {} campus", request.campus);
    let password_hash = hash_password(&request.password)?;
    let person = NewDeliveryPerson {
        name: request.name,
        email: request.email,
        phone: request.phone,
        password_hash,
        campus: request.campus,
    };
    let person = api.add_person(person).await?;
    info!("🛵️ Added delivery person {} ({})", person.name, person.email);
    Ok(HttpResponse::Created().json(person))
}

route!(delivery_persons => Get "/delivery-persons" impl DeliveryManagement requires [Role::RestaurantOwner]);
pub async fn delivery_persons<B: DeliveryManagement>(
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET delivery persons");
    let persons = api.persons().await?;
    Ok(HttpResponse::Ok().json(persons))
}

route!(delivery_person_by_id => Get "/delivery-persons/{id}" impl DeliveryManagement requires [Role::RestaurantOwner]);
pub async fn delivery_person_by_id<B: DeliveryManagement>(
    path: web::Path<i64>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET delivery person {id}");
    let person = api
        .person_by_id(id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No delivery person with id {id}")))?;
    Ok(HttpResponse::Ok().json(person))
}

route!(remove_delivery_person => Delete "/delivery-persons/{id}" impl DeliveryManagement requires [Role::Admin]);
/// Removes a delivery person from the roster. Their completed deliveries stay on record.
pub async fn remove_delivery_person<B: DeliveryManagement>(
    path: web::Path<i64>,
    api: web::Data<DeliveryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    info!("💻️ DELETE delivery person {id}");
    api.remove_person(id).await?;
    Ok(HttpResponse::Ok().finish())
}

//----------------------------------------------   Restaurant  ----------------------------------------------------
route!(restaurant_profile => Get "/restaurant" impl RestaurantManagement);
/// The public restaurant profile. 404s until the owner has set it up.
pub async fn restaurant_profile<B: RestaurantManagement>(
    api: web::Data<RestaurantApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET restaurant profile");
    let profile = api
        .profile()
        .await?
        .ok_or_else(|| ServerError::NoRecordFound("The restaurant profile has not been set up yet".to_string()))?;
    Ok(HttpResponse::Ok().json(profile))
}

route!(create_restaurant_profile => Post "/restaurant" impl RestaurantManagement requires [Role::RestaurantOwner]);
pub async fn create_restaurant_profile<B: RestaurantManagement>(
    body: web::Json<NewRestaurant>,
    api: web::Data<RestaurantApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let profile = body.into_inner();
    info!("💻️ POST restaurant profile '{}'", profile.name);
    let profile = api.create_profile(profile).await?;
    Ok(HttpResponse::Created().json(profile))
}

route!(update_restaurant_profile => Put "/restaurant" impl RestaurantManagement requires [Role::RestaurantOwner]);
pub async fn update_restaurant_profile<B: RestaurantManagement>(
    body: web::Json<NewRestaurant>,
    api: web::Data<RestaurantApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let profile = body.into_inner();
    info!("💻️ PUT restaurant profile '{}'", profile.name);
    let profile = api.upsert_profile(profile).await?;
    Ok(HttpResponse::Ok().json(profile))
}

//----------------------------------------------   Staff  ----------------------------------------------------
route!(add_staff => Post "/staff" impl StaffManagement requires [Role::Admin]);
/// Admins create staff accounts here. Customer and delivery accounts have their own registration paths, so only
/// the two staff roles are accepted.
pub async fn add_staff<B: StaffManagement>(
    body: web::Json<NewStaffRequest>,
    api: web::Data<StaffApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    if !matches!(request.role, Role::Admin | Role::RestaurantOwner) {
        return Err(ServerError::InvalidRequestBody(format!(
            "Staff accounts can hold the admin or restaurantOwner role, not {}",
            request.role
        )));
    }
    let password_hash = hash_password(&request.password)?;
    let staff = NewStaff { name: request.name, email: request.email, password_hash, role: request.role };
    let staff = api.add_staff(staff).await?;
    info!("🗝️ Added staff member {} with role {}", staff.name, staff.role);
    Ok(HttpResponse::Created().json(staff))
}

route!(staff_members => Get "/staff" impl StaffManagement requires [Role::Admin]);
pub async fn staff_members<B: StaffManagement>(api: web::Data<StaffApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET staff members");
    let staff = api.staff_members().await?;
    Ok(HttpResponse::Ok().json(staff))
}
