//! Listing ("product") → spreadsheet row.
//!
//! Each source record maps to exactly one [`FlatRecord`]. Missing nested data
//! never fails: it either yields no column (the normalizer fills the blank) or
//! an empty/null cell, depending on the rule.

use crate::domain::model::FlatRecord;
use crate::domain::services::date_format::format_date_value;
use crate::domain::services::json_access::JsonAccess;
use serde_json::{Map, Value};

pub const TEXT_CRITERIA_PREFIX: &str = "[CT]";
pub const NUMBER_CRITERIA_PREFIX: &str = "[CN]";
pub const FULLTEXT_CRITERIA_PREFIX: &str = "[FT]";

pub const LIST_SEPARATOR: &str = "; ";
pub const UNKNOWN_ROOM_TYPE: &str = "Unknown";
pub const UNKNOWN_SURFACE: &str = "NA";

/// Top-level fields copied as-is.
const VERBATIM_FIELDS: [&str; 5] = ["id", "customers_id", "price", "model", "status_web"];
const DATE_FIELDS: [&str; 2] = ["created_at", "last_modified"];

/// (source key, column prefix) for the two staff roles attached to a listing.
const PERSON_ROLES: [(&str, &str); 2] = [("suivi_par", "Suivi_par_"), ("cree_par", "Cree_par_")];

const CRITERIA_LISTS: [(&str, &str); 3] = [
    ("criteres_text", TEXT_CRITERIA_PREFIX),
    ("criteres_number", NUMBER_CRITERIA_PREFIX),
    ("criteres_fulltext", FULLTEXT_CRITERIA_PREFIX),
];

const COMPROMIS_DATE_FIELDS: [&str; 5] = [
    "date_compromis",
    "date_acte",
    "date_offre",
    "date_annulation",
    "date_fin_sru",
];

const CUSTOMER_DATE_FIELDS: [(&str, &str); 3] = [
    ("creation_date", "Customer_creation_date"),
    ("next_contact", "Customer_next_contact"),
    ("last_action", "Customer_last_action"),
];

/// (source key, column) for the INSEE location block.
const INSEE_FIELDS: [(&str, &str); 4] = [
    ("code_insee", "INSEE_code_insee"),
    ("commune", "INSEE_commune"),
    ("arrondissement", "INSEE_arrondissement"),
    ("secteur", "INSEE_secteur"),
];

const STATISTIC_FIELDS: [(&str, &str); 3] = [
    ("nb_vues", "Statistic_nb_vues"),
    ("nb_contacts", "Statistic_nb_contacts"),
    ("nb_visites", "Statistic_nb_visites"),
];

pub fn criterion_column(prefix: &str, name: &str) -> String {
    format!("{} {}", prefix, name)
}

pub fn flatten(record: &Value) -> FlatRecord {
    let mut row = FlatRecord::new();

    for key in VERBATIM_FIELDS {
        row.insert(key, copied(record.field(key)));
    }
    for key in DATE_FIELDS {
        row.insert(key, format_date_value(record.field(key)));
    }

    for (source_key, prefix) in PERSON_ROLES {
        if let Some(person) = record.field(source_key).present_object() {
            row.insert(format!("{}nom", prefix), full_name(person));
            row.insert(format!("{}email", prefix), copied(person.field("email")));
            row.insert(format!("{}tel", prefix), copied(person.field("phone")));
            row.insert(format!("{}mobile", prefix), copied(person.field("mobile_phone")));
        }
    }

    flatten_criteria(record, &mut row);

    row.insert(
        "Photos",
        join_present(
            record
                .field("products_photos")
                .items()
                .iter()
                .filter_map(|photo| photo.field("chemin").text()),
        ),
    );

    let rooms: Vec<String> = record
        .field("rooms")
        .items()
        .iter()
        .map(|room| {
            let kind = room
                .field("type_piece")
                .text()
                .unwrap_or_else(|| UNKNOWN_ROOM_TYPE.to_string());
            let surface = room
                .field("surface_piece")
                .text()
                .unwrap_or_else(|| UNKNOWN_SURFACE.to_string());
            format!("{} ({} m²)", kind, surface)
        })
        .collect();
    row.insert("Rooms", rooms.join(LIST_SEPARATOR));

    if let Some(agreement) = record.field("compromis").first_item() {
        for key in COMPROMIS_DATE_FIELDS {
            row.insert(format!("Compromis_{}", key), format_date_value(agreement.field(key)));
        }
        row.insert("Compromis_status", copied(agreement.path(&["status", "text"])));
    }

    if let Some(description) = record.field("descriptions").first_item() {
        row.insert("Description_title", copied(description.field("title")));
        row.insert("Description_text", copied(description.field("description")));
    }

    if let Some(customer) = record.field("customer").present_object() {
        row.insert("Customer_nom", full_name(customer));
        row.insert("Customer_email", copied(customer.field("email")));
        row.insert("Customer_tel", copied(customer.field("phone")));
        for (key, column) in CUSTOMER_DATE_FIELDS {
            row.insert(column, format_date_value(customer.field(key)));
        }
    }

    if let Some(category) = record.field("category").present_object() {
        row.insert("Category_name", copied(category.field("name")));
    }

    row.insert(
        "Themes",
        join_present(
            record
                .field("themes")
                .items()
                .iter()
                .filter_map(|theme| theme.field("theme_name").text()),
        ),
    );

    // A non-object INSEE block still yields the four columns, as nulls.
    let insee = record.field("insee").and_then(Value::as_object);
    for (key, column) in INSEE_FIELDS {
        row.insert(column, copied(insee.and_then(|block| block.get(key))));
    }

    if let Some(statistic) = record.field("statistic").present_object() {
        for (key, column) in STATISTIC_FIELDS {
            row.insert(column, copied(statistic.field(key)));
        }
    }

    row
}

/// Flattens a fetched batch in order. Entries that are not JSON objects are skipped.
pub fn flatten_all(products: &[Value]) -> Vec<FlatRecord> {
    products
        .iter()
        .enumerate()
        .filter_map(|(index, product)| {
            if product.is_object() {
                Some(flatten(product))
            } else {
                tracing::warn!("Skipping product #{}: expected an object, got {}", index, product);
                None
            }
        })
        .collect()
}

fn flatten_criteria(record: &Value, row: &mut FlatRecord) {
    for (source_key, prefix) in CRITERIA_LISTS {
        for entry in record.field(source_key).items() {
            let Some(name) = entry.field("critere_name").text().filter(|n| !n.is_empty()) else {
                continue;
            };
            let column = criterion_column(prefix, &name);
            // Duplicate names inside one list keep the last value.
            if let Some(previous) = row.insert(column.clone(), copied(entry.field("critere_value"))) {
                tracing::debug!(
                    "Criterion '{}' repeated on product {}; dropping earlier value {}",
                    column,
                    record.field("id").text().unwrap_or_default(),
                    previous
                );
            }
        }
    }
}

/// "firstname lastname", missing parts as empty strings.
fn full_name(person: &Map<String, Value>) -> String {
    let first = person.field("firstname").text().unwrap_or_default();
    let last = person.field("lastname").text().unwrap_or_default();
    format!("{} {}", first, last)
}

fn join_present(values: impl Iterator<Item = String>) -> String {
    values
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

fn copied(value: Option<&Value>) -> Value {
    value.cloned().unwrap_or(Value::Null)
}
