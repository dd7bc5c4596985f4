use shopfront_client::{CartSession, StoreClient};
use shopfront_core::{AppConfig, CartItem};

use crate::CartCommands;

pub(crate) async fn run_cart(
    client: StoreClient,
    config: &AppConfig,
    command: CartCommands,
) -> anyhow::Result<()> {
    let mut session = CartSession::new(client).with_page_size(config.cart_page_size);

    match command {
        CartCommands::List => {
            session.refresh().await?;
        }
        CartCommands::Add { product_id } => {
            session.add(product_id).await?;
            println!("added product {product_id}");
        }
        CartCommands::Update {
            cart_item_id,
            quantity,
        } => {
            session.update_quantity(cart_item_id, quantity).await?;
            println!("cart item {cart_item_id} quantity set to {quantity}");
        }
        CartCommands::Remove { cart_item_id } => {
            session.remove(cart_item_id).await?;
            println!("removed cart item {cart_item_id}");
        }
    }

    for item in session.items() {
        println!("{}", format_cart_item(item));
    }
    println!(
        "{} items, quantity {}, total {}",
        session.len(),
        session.total_quantity(),
        session.total_price()
    );
    Ok(())
}

fn format_cart_item(item: &CartItem) -> String {
    format!(
        "{:>6}  x{:<3} {:>10}  {}",
        item.id,
        item.quantity,
        item.line_total(),
        item.product.name
    )
}
