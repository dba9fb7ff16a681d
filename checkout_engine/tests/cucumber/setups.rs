use checkout_engine::{db_types::NewProduct, traits::InventoryManagement};
use cucumber::given;

use crate::cucumber::{
    checkout_world::{cop, CheckoutSystem},
    CheckoutWorld,
};

#[given("a fresh install")]
async fn fresh_database(world: &mut CheckoutWorld) {
    let system = CheckoutSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a product {string} priced at {int} COP with {int} units in stock")]
async fn add_product(world: &mut CheckoutWorld, name: String, price: i64, stock: i64) {
    let product = NewProduct::new(name.clone(), cop(price), stock);
    let product = world.system().flow.db().insert_product(product).await.expect("Error adding product");
    world.products.insert(name, product.id);
}
