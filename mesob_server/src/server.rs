use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use chapa_tools::ChapaApi;
use log::*;
use mesob_engine::{
    db_types::{NewStaff, Role},
    events::{EventHandlers, EventHooks, EventProducers},
    AuthApi,
    CustomerApi,
    DeliveryApi,
    MenuApi,
    OrderFlowApi,
    RestaurantApi,
    SqliteDatabase,
    StaffApi,
    MIGRATOR,
};

use crate::{
    auth::{hash_password, TokenIssuer},
    config::ServerConfig,
    errors::ServerError,
    middleware::JwtMiddlewareFactory,
    payment_sweeper::start_payment_sweeper,
    routes::{
        health,
        AddDeliveryPersonRoute,
        AddMenuItemRoute,
        AddStaffRoute,
        AssignDeliveryRoute,
        CheckTokenRoute,
        ClearMyCartRoute,
        ConfirmDeliveryRoute,
        CreateRestaurantProfileRoute,
        CustomerByIdRoute,
        CustomersRoute,
        DeliveryByIdRoute,
        DeliveryPersonByIdRoute,
        DeliveryPersonsRoute,
        InitializePaymentRoute,
        LoginRoute,
        MenuItemRoute,
        MenuRoute,
        MyCartRoute,
        MyDeliveriesRoute,
        MyHistoryRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        OrderItemsRoute,
        OrdersSearchRoute,
        PlaceOrderRoute,
        RebuildHistoryRoute,
        RegisterCustomerRoute,
        RemoveDeliveryPersonRoute,
        RemoveMenuItemRoute,
        ReplaceMyCartRoute,
        RestaurantProfileRoute,
        SearchDeliveriesRoute,
        SetMenuAvailabilityRoute,
        StaffMembersRoute,
        UpdateDeliveryStatusRoute,
        UpdateMenuItemRoute,
        UpdateOrderStatusRoute,
        UpdateRestaurantProfileRoute,
        VerifyPaymentRoute,
    },
};

pub const EVENT_BUFFER_SIZE: usize = 100;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    MIGRATOR.run(db.pool()).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    create_bootstrap_admin(&config, &db).await?;
    let handlers = create_event_handlers();
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let gateway = ChapaApi::new(config.gateway.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let _sweeper = start_payment_sweeper(db.clone(), gateway.clone(), producers.clone(), config.payment_sweep_interval);
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Creates the admin account from `MESOB_ADMIN_EMAIL` / `MESOB_ADMIN_PASSWORD` if no staff member holds the admin
/// role yet. A fresh database is unusable without this, since only admins can create other staff accounts.
async fn create_bootstrap_admin(config: &ServerConfig, db: &SqliteDatabase) -> Result<(), ServerError> {
    let Some(admin) = &config.bootstrap_admin else {
        debug!("🗝️ No bootstrap admin configured. Skipping admin account check.");
        return Ok(());
    };
    let password_hash = hash_password(admin.password.reveal())?;
    let api = AuthApi::new(db.clone());
    let staff = NewStaff {
        name: "Bootstrap admin".to_string(),
        email: admin.email.clone(),
        password_hash,
        role: Role::Admin,
    };
    let created = api.ensure_bootstrap_admin(staff).await?;
    if created {
        info!("🗝️ Created the bootstrap admin account for {}", admin.email);
    } else {
        debug!("🗝️ An admin account already exists. The bootstrap admin configuration was ignored.");
    }
    Ok(())
}

/// Wires up the engine event hooks.
///
/// Nothing downstream consumes these yet, so settlement and hand-over events are logged and dropped. Notification
/// integrations (SMS, email) subscribe here when they land.
fn create_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_paid(|ev| {
        let order = ev.order;
        Box::pin(async move {
            info!("📬️ Order {} settled. {} is on its way to the kitchen.", order.id, order.total_price);
        })
    });
    hooks.on_delivery_confirmed(|ev| {
        let delivery = ev.delivery;
        Box::pin(async move {
            info!("📬️ Customer {} confirmed receipt of delivery {}.", delivery.customer_id, delivery.id);
        })
    });
    EventHandlers::new(EVENT_BUFFER_SIZE, hooks)
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: ChapaApi,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let deliveries_api = DeliveryApi::new(db.clone(), producers.clone());
        let menu_api = MenuApi::new(db.clone());
        let customers_api = CustomerApi::new(db.clone());
        let staff_api = StaffApi::new(db.clone());
        let restaurant_api = RestaurantApi::new(db.clone());
        let auth_api = AuthApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mesob::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(deliveries_api))
            .app_data(web::Data::new(menu_api))
            .app_data(web::Data::new(customers_api))
            .app_data(web::Data::new(staff_api))
            .app_data(web::Data::new(restaurant_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(jwt_signer))
            .app_data(web::Data::new(gateway.clone()));
        // Routes that require authentication
        let auth_scope = web::scope("/api")
            .wrap(JwtMiddlewareFactory::new(&config.auth))
            .service(CheckTokenRoute::new())
            .service(CustomersRoute::<SqliteDatabase>::new())
            .service(CustomerByIdRoute::<SqliteDatabase>::new())
            .service(MyCartRoute::<SqliteDatabase>::new())
            .service(ReplaceMyCartRoute::<SqliteDatabase>::new())
            .service(ClearMyCartRoute::<SqliteDatabase>::new())
            .service(MyHistoryRoute::<SqliteDatabase>::new())
            .service(RebuildHistoryRoute::<SqliteDatabase>::new())
            .service(AddMenuItemRoute::<SqliteDatabase>::new())
            .service(UpdateMenuItemRoute::<SqliteDatabase>::new())
            .service(SetMenuAvailabilityRoute::<SqliteDatabase>::new())
            .service(RemoveMenuItemRoute::<SqliteDatabase>::new())
            .service(PlaceOrderRoute::<SqliteDatabase, SqliteDatabase, ChapaApi>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrdersSearchRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(OrderItemsRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(InitializePaymentRoute::<SqliteDatabase, SqliteDatabase, ChapaApi>::new())
            .service(AssignDeliveryRoute::<SqliteDatabase>::new())
            .service(SearchDeliveriesRoute::<SqliteDatabase>::new())
            .service(DeliveryByIdRoute::<SqliteDatabase>::new())
            .service(MyDeliveriesRoute::<SqliteDatabase>::new())
            .service(UpdateDeliveryStatusRoute::<SqliteDatabase>::new())
            .service(ConfirmDeliveryRoute::<SqliteDatabase>::new())
            .service(AddDeliveryPersonRoute::<SqliteDatabase>::new())
            .service(DeliveryPersonsRoute::<SqliteDatabase>::new())
            .service(DeliveryPersonByIdRoute::<SqliteDatabase>::new())
            .service(RemoveDeliveryPersonRoute::<SqliteDatabase>::new())
            .service(CreateRestaurantProfileRoute::<SqliteDatabase>::new())
            .service(UpdateRestaurantProfileRoute::<SqliteDatabase>::new())
            .service(AddStaffRoute::<SqliteDatabase>::new())
            .service(StaffMembersRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(RegisterCustomerRoute::<SqliteDatabase>::new())
            .service(MenuRoute::<SqliteDatabase>::new())
            .service(MenuItemRoute::<SqliteDatabase>::new())
            .service(RestaurantProfileRoute::<SqliteDatabase>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase, ChapaApi>::new())
            .service(auth_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
