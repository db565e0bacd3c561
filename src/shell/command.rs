//! Text commands standing in for screen navigation and taps.

use std::str::FromStr;

use thiserror::Error;

use crate::domain::aggregates::{PaymentMethod, Transport};
use crate::domain::value_objects::{Quantity, Size};

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Home,
    TopRated,
    Popular,
    Tag(String),
    Show(i64),
    Search(String),
    ToggleFavorite(i64),
    Favorites,
    Add { id: i64, size: Size, quantity: Quantity },
    Increment(i64),
    Decrement(i64),
    SetQuantity { id: i64, quantity: i64 },
    Remove(i64),
    Cart,
    Promo(String),
    Pay(PaymentMethod),
    Checkout,
    Order { id: Option<String>, size: Size, transport: Transport, quantity: Quantity },
    Location,
    Profile,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help'")]
    Unknown(String),
    #[error("'{command}' needs {what}")]
    MissingArgument { command: &'static str, what: &'static str },
    #[error("Invalid {what}: {value}")]
    InvalidArgument { what: &'static str, value: String },
}

pub const HELP: &str = "\
home                          all coffees
top | popular                 top rated / most purchased
tag <tag>                     coffees with a tag
show <id>                     coffee details
search <text>                 search by name (empty clears)
fav <id> | favs               toggle / list favorites
add <id> [S|M|L] [qty]        add to cart
inc <id> | dec <id>           change quantity by one
qty <id> <n>                  set quantity, 0 removes
rm <id>                       remove from cart
cart                          show cart
promo <code>                  apply promo code
pay <wallet|card|cash>        choose payment method
checkout                      place the order
order [id] [size] [deliver|pickup] [qty]  order one coffee now
where                         current delivery address
profile                       profile summary
quit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();

        let command = match word.to_ascii_lowercase().as_str() {
            "home" | "" => Command::Home,
            "top" => Command::TopRated,
            "popular" => Command::Popular,
            "tag" => Command::Tag(required(args.next(), "tag", "a tag")?.to_string()),
            "show" => Command::Show(id(args.next(), "show")?),
            "search" => Command::Search(rest.to_string()),
            "fav" => Command::ToggleFavorite(id(args.next(), "fav")?),
            "favs" => Command::Favorites,
            "add" => {
                let id = id(args.next(), "add")?;
                let size = args.next().map(parse_size).transpose()?.unwrap_or_default();
                let quantity = args.next().map(parse_quantity).transpose()?.unwrap_or_default();
                Command::Add { id, size, quantity }
            }
            "inc" => Command::Increment(id(args.next(), "inc")?),
            "dec" => Command::Decrement(id(args.next(), "dec")?),
            "qty" => {
                let id = id(args.next(), "qty")?;
                let raw = required(args.next(), "qty", "a quantity")?;
                let quantity = raw.parse().map_err(|_| invalid("quantity", raw))?;
                Command::SetQuantity { id, quantity }
            }
            "rm" => Command::Remove(id(args.next(), "rm")?),
            "cart" => Command::Cart,
            "promo" => Command::Promo(rest.to_string()),
            "pay" => {
                let raw = required(args.next(), "pay", "a payment method")?;
                Command::Pay(raw.parse().map_err(|_| invalid("payment method", raw))?)
            }
            "checkout" => Command::Checkout,
            "order" => parse_order(args)?,
            "where" => Command::Location,
            "profile" => Command::Profile,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// Every argument is optional and recognized by shape.
fn parse_order<'a>(args: impl Iterator<Item = &'a str>) -> Result<Command, CommandError> {
    let mut id = None;
    let mut size = Size::default();
    let mut transport = Transport::default();
    let mut quantity = Quantity::ONE;
    for arg in args {
        if let Ok(s) = arg.parse::<Size>() {
            size = s;
        } else if let Ok(t) = arg.parse::<Transport>() {
            transport = t;
        } else if id.is_none() {
            id = Some(arg.to_string());
        } else {
            quantity = parse_quantity(arg)?;
        }
    }
    Ok(Command::Order { id, size, transport, quantity })
}

fn required<'a>(arg: Option<&'a str>, command: &'static str, what: &'static str) -> Result<&'a str, CommandError> {
    arg.ok_or(CommandError::MissingArgument { command, what })
}

fn id(arg: Option<&str>, command: &'static str) -> Result<i64, CommandError> {
    let raw = required(arg, command, "a coffee id")?;
    raw.parse().map_err(|_| invalid("coffee id", raw))
}

fn parse_size(raw: &str) -> Result<Size, CommandError> { raw.parse().map_err(|_| invalid("size", raw)) }

fn parse_quantity(raw: &str) -> Result<Quantity, CommandError> {
    raw.parse().ok().and_then(Quantity::new).ok_or_else(|| invalid("quantity", raw))
}

fn invalid(what: &'static str, value: &str) -> CommandError {
    CommandError::InvalidArgument { what, value: value.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        assert_eq!("add 3".parse::<Command>().unwrap(), Command::Add { id: 3, size: Size::Medium, quantity: Quantity::ONE });
        assert_eq!(
            "ADD 3 l 2".parse::<Command>().unwrap(),
            Command::Add { id: 3, size: Size::Large, quantity: Quantity::new(2).unwrap() },
        );
        assert!(matches!("add 3 XL".parse::<Command>(), Err(CommandError::InvalidArgument { what: "size", .. })));
        assert!(matches!("add 3 S 0".parse::<Command>(), Err(CommandError::InvalidArgument { what: "quantity", .. })));
        assert!(matches!("add".parse::<Command>(), Err(CommandError::MissingArgument { .. })));
    }

    #[test]
    fn test_parse_search_keeps_spaces() {
        assert_eq!("search flat white".parse::<Command>().unwrap(), Command::Search("flat white".into()));
        assert_eq!("search".parse::<Command>().unwrap(), Command::Search(String::new()));
    }

    #[test]
    fn test_parse_quantity_allows_zero_and_negative() {
        assert_eq!("qty 2 0".parse::<Command>().unwrap(), Command::SetQuantity { id: 2, quantity: 0 });
        assert_eq!("qty 2 -1".parse::<Command>().unwrap(), Command::SetQuantity { id: 2, quantity: -1 });
    }

    #[test]
    fn test_parse_order() {
        assert_eq!(
            "order".parse::<Command>().unwrap(),
            Command::Order { id: None, size: Size::Medium, transport: Transport::Deliver, quantity: Quantity::ONE },
        );
        assert_eq!(
            "order 4 S pickup 3".parse::<Command>().unwrap(),
            Command::Order { id: Some("4".into()), size: Size::Small, transport: Transport::PickUp, quantity: Quantity::new(3).unwrap() },
        );
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!("pay cash".parse::<Command>().unwrap(), Command::Pay(PaymentMethod::CashOnDelivery));
        assert_eq!("".parse::<Command>().unwrap(), Command::Home);
        assert_eq!("promo coffee10".parse::<Command>().unwrap(), Command::Promo("coffee10".into()));
        assert_eq!("brew".parse::<Command>(), Err(CommandError::Unknown("brew".into())));
    }
}
