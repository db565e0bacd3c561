//! Plain-text renderings of the storefront screens.

use std::fmt::Write;

use crate::domain::aggregates::{CheckoutSummary, Coffee, OrderDraft, PaymentMethod, PlacedOrder};
use crate::domain::value_objects::Size;
use crate::gateway::LocationData;
use crate::store::Storefront;

fn plural(n: usize, one: &str, many: &str) -> String { format!("{n} {}", if n == 1 { one } else { many }) }

pub fn coffee_list(title: &str, coffees: &[Coffee], store: &Storefront) -> String {
    let mut out = format!("{title}\n");
    if coffees.is_empty() {
        out.push_str("  (nothing here)\n");
        return out;
    }
    for c in coffees {
        let heart = if store.is_favorite(c.id) { "♥" } else { " " };
        let _ = writeln!(out, "{heart} #{:<3} {:<20} {:<16} ★ {:.1}  {}", c.id, c.name, c.tag_label(), c.rating, c.base_price());
    }
    out
}

pub fn coffee_detail(c: &Coffee, store: &Storefront) -> String {
    let mut out = format!("{} (#{})\n{}\n", c.name, c.id, c.tag_label());
    let _ = writeln!(out, "★ {:.1}  ·  {} purchases", c.rating, c.purchases);
    if !c.description.is_empty() { let _ = writeln!(out, "{}", c.description); }
    for size in Size::ALL {
        let _ = writeln!(out, "  {size}: {}", c.price_for(size, 1));
    }
    if store.is_favorite(c.id) { out.push_str("In your favorites\n"); }
    if store.is_in_cart(c.id) { out.push_str("In your cart\n"); }
    out
}

pub fn favorites(store: &Storefront) -> String {
    let title = format!("Favorites ({})", store.favorites_count());
    coffee_list(&title, store.favorites().favorites(), store)
}

pub fn cart(store: &Storefront) -> String {
    let items = store.cart_items();
    let mut out = format!("Cart: {}\n", plural(items.len(), "Item", "Items"));
    if items.is_empty() {
        out.push_str("  Your cart is empty. Try 'home' to browse.\n");
        return out;
    }
    for item in items {
        let _ = writeln!(
            out, "  #{:<3} {:<20} {:<16} Size {} × {:<3} {}",
            item.coffee.id, item.coffee.name, item.coffee.tag_label(), item.size, item.quantity, item.line_total(),
        );
    }
    out.push_str(&summary(&store.checkout_summary()));
    out
}

pub fn summary(s: &CheckoutSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Subtotal       {}", s.subtotal);
    let _ = writeln!(out, "  Delivery fee   {}", s.delivery_fee);
    if !s.discount.amount().is_zero() {
        let _ = writeln!(out, "  Discount      -{}", s.discount);
    }
    let _ = writeln!(out, "  Total          {}", s.total);
    out
}

pub fn checkout(store: &Storefront) -> String {
    let mut out = cart(store);
    let checkout = store.checkout();
    match checkout.promo() {
        Some(code) => { let _ = writeln!(out, "Promo code \"{code}\" applied"); }
        None => out.push_str("No promo code applied\n"),
    }
    out.push_str("Payment method:\n");
    for method in PaymentMethod::ALL {
        let mark = if method == checkout.payment() { "●" } else { "○" };
        let _ = writeln!(out, "  {mark} {method:<18} {}", method.detail());
    }
    out
}

pub fn placed(order: &PlacedOrder) -> String {
    format!(
        "Your order has been placed successfully. Thank you for your purchase!\nOrder ID: {}\nPaid by {}: {}\n",
        order.reference, order.payment, order.summary.total,
    )
}

pub fn order(draft: &OrderDraft, address: &str) -> String {
    let c = draft.coffee();
    let mut out = format!("Order: {}\n", draft.transport());
    let _ = writeln!(out, "{}: {address}", draft.transport().address_label());
    let _ = writeln!(out, "  {} ({}) Size {} × {}", c.name, c.tag_label(), draft.size(), draft.quantity());
    let _ = writeln!(out, "  Total {}", draft.total());
    out
}

pub fn location(result: &Result<LocationData, String>) -> String {
    match result {
        Ok(l) => format!("{} ({:.4}, {:.4})\n", l.formatted_address, l.latitude, l.longitude),
        Err(reason) => format!("Location unavailable: {reason}\n"),
    }
}

pub fn profile(store: &Storefront, address: &str) -> String {
    let mut out = String::from("Profile\n");
    let _ = writeln!(out, "  Location     {address}");
    let _ = writeln!(out, "  Favorites    {}", store.favorites_count());
    let _ = writeln!(out, "  In cart      {}", plural(store.cart_count() as usize, "cup", "cups"));
    out
}
