//! Shared scaffolding for the engine integration tests. Each test gets a throwaway, fully
//! migrated SQLite database under the system temp directory.
#![allow(dead_code)]

use mesob_common::Birr;
use mesob_engine::{
    db_types::{
        Campus,
        Customer,
        DeliveryPerson,
        MenuItem,
        NewCustomer,
        NewDeliveryPerson,
        NewMenuItem,
        NewOrder,
        OrderItemRequest,
        PaymentMethod,
    },
    test_utils::{prepare_test_env, random_db_path},
    traits::{CustomerManagement, DeliveryManagement, MenuManagement},
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

pub async fn tear_down(db: SqliteDatabase) {
    let url = db.url().to_string();
    drop(db);
    Sqlite::drop_database(&url).await.ok();
}

/// Seeds a small menu: three orderable dishes and one that is toggled off.
pub async fn seed_menu(db: &SqliteDatabase) -> Vec<MenuItem> {
    let dishes = [
        ("Doro Wat", 24550, true),
        ("Shiro", 9000, true),
        ("Tibs", 18000, true),
        ("Special Kitfo", 22000, false),
    ];
    let mut items = Vec::with_capacity(dishes.len());
    for (name, santim, available) in dishes {
        let item = NewMenuItem {
            name: name.to_string(),
            description: String::new(),
            price: Birr::from(santim),
            available,
            category: vec!["mains".to_string()],
            image_url: String::new(),
        };
        items.push(db.insert_menu_item(item).await.expect("Error seeding menu"));
    }
    items
}

pub async fn seed_customer(db: &SqliteDatabase, name: &str, campus: Campus) -> Customer {
    let customer = NewCustomer {
        name: name.to_string(),
        email: format!("{}@bdu.edu.et", name.to_lowercase().replace(' ', ".")),
        phone: "+251911234567".to_string(),
        password_hash: "not-a-real-hash".to_string(),
        campus,
    };
    db.insert_customer(customer).await.expect("Error seeding customer")
}

pub async fn seed_person(db: &SqliteDatabase, name: &str, campus: Campus) -> DeliveryPerson {
    let person = NewDeliveryPerson {
        name: name.to_string(),
        email: format!("{}@mesob.et", name.to_lowercase().replace(' ', ".")),
        phone: "+251922334455".to_string(),
        password_hash: "not-a-real-hash".to_string(),
        campus,
    };
    db.insert_delivery_person(person).await.expect("Error seeding delivery person")
}

pub fn order_request(customer_id: i64, campus: Campus, method: PaymentMethod, items: &[(i64, i64)]) -> NewOrder {
    NewOrder {
        customer_id,
        items: items.iter().map(|&(menu_item_id, quantity)| OrderItemRequest { menu_item_id, quantity }).collect(),
        campus,
        building: "Block 4".to_string(),
        room_number: "212".to_string(),
        payment_method: method,
    }
}
