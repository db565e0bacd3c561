//! Terminal front end.
//!
//! Each command plays the part of a screen or a tap. Fetch failures are logged
//! and rendered as an empty state; nothing here ends the session except `quit`.

pub mod command;
pub mod views;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

pub use command::{Command, CommandError, HELP};

use crate::domain::aggregates::order::{resolve_coffee_id, OrderDraft};
use crate::domain::aggregates::Coffee;
use crate::gateway::catalog::DEFAULT_LIMIT;
use crate::gateway::{CatalogGateway, DeviceLocation, GatewayError, LocationGateway};
use crate::search::SearchSession;
use crate::store::Storefront;

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Show(String),
    Quit,
}

pub struct App<C, D> {
    store: Storefront,
    catalog: Arc<C>,
    location: LocationGateway<D>,
    search: SearchSession<C>,
}

impl<C: CatalogGateway + 'static, D: DeviceLocation> App<C, D> {
    pub fn new(store: Storefront, catalog: Arc<C>, location: LocationGateway<D>, debounce: Duration) -> Self {
        let search = SearchSession::new(Arc::clone(&catalog), debounce);
        Self { store, catalog, location, search }
    }

    pub fn store(&self) -> &Storefront { &self.store }

    /// Parses and runs one line. Errors become messages.
    pub async fn execute(&mut self, line: &str) -> Outcome {
        let result = match line.parse::<Command>() {
            Ok(command) => self.handle(command).await,
            Err(e) => Err(e.into()),
        };
        result.unwrap_or_else(|e| Outcome::Show(format!("{e}\n")))
    }

    pub async fn handle(&mut self, command: Command) -> crate::Result<Outcome> {
        let view = match command {
            Command::Home => {
                let coffees = loaded(self.catalog.fetch_all().await, "coffees");
                views::coffee_list("All coffees", &coffees, &self.store)
            }
            Command::TopRated => {
                let coffees = loaded(self.catalog.fetch_top_rated(DEFAULT_LIMIT).await, "top rated coffees");
                views::coffee_list("Top rated", &coffees, &self.store)
            }
            Command::Popular => {
                let coffees = loaded(self.catalog.fetch_most_purchased(DEFAULT_LIMIT).await, "popular coffees");
                views::coffee_list("Most purchased", &coffees, &self.store)
            }
            Command::Tag(tag) => {
                let coffees = loaded(self.catalog.fetch_by_tag(&tag).await, "coffees by tag");
                views::coffee_list(&format!("Tagged {tag}"), &coffees, &self.store)
            }
            Command::Show(id) => views::coffee_detail(&self.coffee(id).await?, &self.store),
            Command::Search(query) => {
                self.search.set_query(query);
                let state = self.search.settled().await;
                if state.is_active() {
                    views::coffee_list(&format!("Results for \"{}\"", state.query.trim()), &state.results, &self.store)
                } else {
                    "Search cleared\n".to_string()
                }
            }
            Command::ToggleFavorite(id) => {
                let coffee = self.coffee(id).await?;
                let name = coffee.name.clone();
                if self.store.toggle_favorite(coffee) {
                    format!("Added {name} to favorites\n")
                } else {
                    format!("Removed {name} from favorites\n")
                }
            }
            Command::Favorites => views::favorites(&self.store),
            Command::Add { id, size, quantity } => {
                let coffee = self.coffee(id).await?;
                let name = coffee.name.clone();
                self.store.add_to_cart(coffee, size, quantity);
                format!("Added {quantity} × {name} ({size}) to cart, {} in cart\n", self.store.cart_count())
            }
            Command::Increment(id) => { self.store.increment_quantity(id); views::cart(&self.store) }
            Command::Decrement(id) => { self.store.decrement_quantity(id); views::cart(&self.store) }
            Command::SetQuantity { id, quantity } => { self.store.update_quantity(id, quantity); views::cart(&self.store) }
            Command::Remove(id) => { self.store.remove_from_cart(id); views::cart(&self.store) }
            Command::Cart => views::cart(&self.store),
            Command::Promo(code) => {
                self.store.apply_promo(&code)?;
                "Promo code applied successfully!\n".to_string()
            }
            Command::Pay(method) => {
                self.store.select_payment(method);
                views::checkout(&self.store)
            }
            Command::Checkout => {
                let order = self.store.place_order()?;
                info!(reference = %order.reference, total = %order.summary.total, "order placed");
                views::placed(&order)
            }
            Command::Order { id, size, transport, quantity } => {
                let id = resolve_coffee_id(id.as_deref()).ok_or_else(|| CommandError::InvalidArgument {
                    what: "coffee id", value: id.clone().unwrap_or_default(),
                })?;
                let mut draft = OrderDraft::new(self.coffee(id).await?, size);
                draft.set_transport(transport);
                for _ in 1..quantity.value() { draft.increment(); }
                views::order(&draft, &self.address().await)
            }
            Command::Location => {
                let result = self.location.current_location().await.map_err(|e| e.to_string());
                views::location(&result)
            }
            Command::Profile => views::profile(&self.store, &self.address().await),
            Command::Help => format!("{HELP}\n"),
            Command::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Show(view))
    }

    async fn coffee(&self, id: i64) -> Result<Coffee, GatewayError> {
        self.catalog.fetch_by_id(id).await.inspect_err(|e| warn!(error = %e, id, "Error fetching coffee"))
    }

    async fn address(&self) -> String {
        match self.location.current_location().await {
            Ok(location) => location.formatted_address,
            Err(e) => {
                warn!(error = %e, "Error fetching location");
                "Unable to get location".to_string()
            }
        }
    }
}

fn loaded(result: Result<Vec<Coffee>, GatewayError>, what: &str) -> Vec<Coffee> {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Error fetching {what}");
        Vec::new()
    })
}
