use super::rules::{FieldRule, SchemaDescriptor};
use super::{Direction, SchemaId};

const EMAIL_PATTERN: &str = r"\S+@[a-zA-Z0-9]+.[a-zA-Z0-9]+";

fn message() -> SchemaDescriptor {
    SchemaDescriptor::new().field("message", FieldRule::string().required())
}

fn cart_item_ids() -> SchemaDescriptor {
    SchemaDescriptor::new().field("cart_items", FieldRule::list(FieldRule::string()).required())
}

fn price() -> FieldRule {
    FieldRule::integer().required().min(1)
}

/// Every schema the service registers, keyed by direction and route name
pub fn builtin() -> Vec<(SchemaId, SchemaDescriptor)> {
    use Direction::{Request, Response};

    vec![
        (
            SchemaId::new(Request, "authentication.authenticate"),
            SchemaDescriptor::new()
                .field(
                    "user",
                    FieldRule::string().required().max_length(100).regex(EMAIL_PATTERN),
                )
                .field(
                    "password",
                    FieldRule::string().required().non_empty().max_length(100),
                ),
        ),
        (
            SchemaId::new(Response, "authentication.authenticate"),
            SchemaDescriptor::new().field("token", FieldRule::string().required().regex(r"\S+")),
        ),
        (
            SchemaId::new(Response, "authentication.get_user"),
            SchemaDescriptor::new().field("user", FieldRule::string().required()),
        ),
        (
            SchemaId::new(Response, "cart.get_cart"),
            SchemaDescriptor::new().field(
                "cart_items",
                FieldRule::list(FieldRule::object(
                    SchemaDescriptor::new()
                        .field("item_id", FieldRule::string().required())
                        .field("description", FieldRule::string().required())
                        .field("price", price()),
                ))
                .required(),
            ),
        ),
        (SchemaId::new(Request, "cart.create_cart"), cart_item_ids()),
        (SchemaId::new(Response, "cart.create_cart"), message()),
        (SchemaId::new(Response, "cart.delete_cart_item"), message()),
        (SchemaId::new(Response, "cart.delete_cart"), message()),
        (SchemaId::new(Request, "cart.add_cart_items"), cart_item_ids()),
        (SchemaId::new(Response, "cart.add_cart_items"), message()),
        (
            SchemaId::new(Response, "catalog.get_catalog"),
            SchemaDescriptor::new().field(
                "items",
                FieldRule::list(FieldRule::object(
                    SchemaDescriptor::new()
                        .field("item_id", FieldRule::string().required())
                        .field("item_name", FieldRule::string().required())
                        .field("description", FieldRule::string())
                        .field("price", price()),
                ))
                .required(),
            ),
        ),
        (
            SchemaId::new(Request, "catalog.create_catalog"),
            SchemaDescriptor::new().field(
                "items",
                FieldRule::list(FieldRule::object(
                    SchemaDescriptor::new()
                        .field("item_name", FieldRule::string().required())
                        .field("description", FieldRule::string())
                        .field("price", price()),
                ))
                .required(),
            ),
        ),
        (
            SchemaId::new(Response, "catalog.create_catalog"),
            SchemaDescriptor::new().field("items", FieldRule::list(FieldRule::string()).required()),
        ),
        (
            SchemaId::new(Response, "health"),
            SchemaDescriptor::new()
                .field("status", FieldRule::string().required())
                .field("timestamp", FieldRule::string().required())
                .field("database", FieldRule::string().required())
                .field("error", FieldRule::string()),
        ),
    ]
}
