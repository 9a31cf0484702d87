//! Reply routing
//!
//! Maps free text to a bot [`Reply`] using a fixed, priority-ordered list of
//! rules. The first rule whose predicate matches builds the reply; there is
//! no scoring. Routing is pure: no I/O, no shared mutable state, and the same
//! input always yields the same output.

use std::sync::Arc;
use crate::catalog::{Catalog, ProductRecord};
use crate::state::Reply;

/// Exact token that lists the whole catalog.
pub const LIST_COMMAND: &str = "/listar";

const GREETING_KEYWORDS: &[&str] = &["hola", "buenas"];
const PRICE_KEYWORDS: &[&str] = &["precio", "costo"];
const THANKS_KEYWORDS: &[&str] = &["gracias"];

pub const GREETING_REPLY: &str =
    "¡Hola! Estoy aquí para ayudarte. Puedes escribir \"/listar\" para ver nuestros productos.";
pub const PRICE_REPLY: &str =
    "Por favor, indica el nombre o ID del producto para darte su precio.";
pub const THANKS_REPLY: &str = "¡Con gusto! Si tienes más dudas, estoy disponible.";
pub const GENERIC_REPLY: &str = "Lo siento, aún estoy en entrenamiento. Puedes escribir \"/listar\" o preguntar por un producto específico.";

/// Which rule produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    List,
    Product,
    Greeting,
    PriceInquiry,
    Thanks,
    Generic,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::List => "list",
            RouteKind::Product => "product",
            RouteKind::Greeting => "greeting",
            RouteKind::PriceInquiry => "price-inquiry",
            RouteKind::Thanks => "thanks",
            RouteKind::Generic => "generic",
        }
    }
}

/// What a rule found. Carries everything needed to build the reply, so a
/// match is never looked up twice.
enum Route<'a> {
    List,
    Product(&'a ProductRecord),
    Canned(RouteKind, &'static str),
}

impl Route<'_> {
    fn kind(&self) -> RouteKind {
        match self {
            Route::List => RouteKind::List,
            Route::Product(_) => RouteKind::Product,
            Route::Canned(kind, _) => *kind,
        }
    }
}

/// A rule inspects the normalized (trimmed, lowercased) text and yields a
/// route when it applies.
type Rule = for<'a> fn(&str, &'a Catalog) -> Option<Route<'a>>;

/// Evaluated top to bottom; the first match wins.
const RULES: &[Rule] = &[list_rule, product_rule, greeting_rule, price_rule, thanks_rule];

/// Applies when nothing in [`RULES`] does.
const FALLBACK: Route<'static> = Route::Canned(RouteKind::Generic, GENERIC_REPLY);

fn list_rule<'a>(text: &str, _: &'a Catalog) -> Option<Route<'a>> {
    (text == LIST_COMMAND).then_some(Route::List)
}

fn product_rule<'a>(text: &str, catalog: &'a Catalog) -> Option<Route<'a>> {
    find_product(text, catalog).map(Route::Product)
}

fn greeting_rule<'a>(text: &str, _: &'a Catalog) -> Option<Route<'a>> {
    contains_any(text, GREETING_KEYWORDS).then_some(Route::Canned(RouteKind::Greeting, GREETING_REPLY))
}

fn price_rule<'a>(text: &str, _: &'a Catalog) -> Option<Route<'a>> {
    contains_any(text, PRICE_KEYWORDS).then_some(Route::Canned(RouteKind::PriceInquiry, PRICE_REPLY))
}

fn thanks_rule<'a>(text: &str, _: &'a Catalog) -> Option<Route<'a>> {
    contains_any(text, THANKS_KEYWORDS).then_some(Route::Canned(RouteKind::Thanks, THANKS_REPLY))
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn select_route<'a>(normalized: &str, catalog: &'a Catalog) -> Route<'a> {
    RULES
        .iter()
        .find_map(|rule| rule(normalized, catalog))
        .unwrap_or(FALLBACK)
}

/// First product, in catalog order, whose name or id appears in `normalized`.
///
/// Position in the text does not matter: if the message mentions products
/// `003` and `001`, `001` wins because it comes first in the catalog.
pub fn find_product<'a>(normalized: &str, catalog: &'a Catalog) -> Option<&'a ProductRecord> {
    catalog.iter().find(|p| {
        normalized.contains(&p.name.to_lowercase()) || normalized.contains(&p.id.to_lowercase())
    })
}

/// Name the rule that would handle `text`, without building the reply.
pub fn classify(text: &str, catalog: &Catalog) -> RouteKind {
    select_route(&normalize(text), catalog).kind()
}

/// Build the bot reply for one user message.
///
/// Total over all inputs: unrecognized text falls through to the generic reply.
pub fn route(text: &str, catalog: &Catalog) -> Reply {
    let selected = select_route(&normalize(text), catalog);
    tracing::debug!(route = selected.kind().as_str(), "routed message");
    match selected {
        Route::List => list_reply(catalog),
        Route::Product(product) => product_reply(product, catalog),
        Route::Canned(_, text) => Reply::single(text),
    }
}

fn list_reply(catalog: &Catalog) -> Reply {
    let mut response = String::from("**Productos disponibles:**\n");
    for product in catalog.iter() {
        response.push_str(&format!(
            "\n• **{}** (ID: {}) - {}",
            product.name,
            product.id,
            product.display_price()
        ));
    }
    response.push_str("\n\n*Escribe el nombre o ID de un producto para ver más detalles.*");
    Reply::single(response)
}

fn product_reply(product: &ProductRecord, catalog: &Catalog) -> Reply {
    let detail = format!(
        "**{}**\n\
         **ID:** {}\n\
         **Categoría:** {}\n\
         **Descripción:** {}\n\
         **Precio:** {}\n\
         **Stock:** {} unidades\n\
         **Oferta:** {}",
        product.name,
        product.id,
        product.category,
        product.description,
        product.display_price(),
        product.stock_count,
        product.offer,
    );

    let others: Vec<String> = catalog
        .iter()
        .filter(|other| other.id != product.id)
        .map(|other| format!("`{}` ({})", other.id, other.name))
        .collect();

    Reply::with_suggestion(
        detail,
        format!(
            "¿Deseas ver otro producto? Puedes consultar alguno de estos: {}",
            others.join(", ")
        ),
    )
}

/// Routes messages against a shared, read-only catalog.
///
/// Cheap to clone; every clone reads the same catalog, so independent chat
/// sessions can share one inventory.
#[derive(Debug, Clone)]
pub struct Router {
    catalog: Arc<Catalog>,
}

impl Router {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn builtin() -> Self {
        Self::new(Arc::new(Catalog::builtin()))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn route(&self, text: &str) -> Reply {
        route(text, &self.catalog)
    }

    pub fn classify(&self, text: &str) -> RouteKind {
        classify(text, &self.catalog)
    }
}
