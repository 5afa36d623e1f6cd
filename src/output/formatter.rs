use colored::*;
use serde_json::{Map, Value};

use crate::constants::{INDENT, TAGS_PER_LINE};
use crate::http::ScrapedObject;
use crate::types::ObjectType;

/// How a known field is printed
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    /// Quoted scalar, or `None`
    Text,
    /// Multi-line text wrapped in braces
    Block,
    /// `(name, url)` of a nested object
    Named,
    /// Names of a list of objects, several per line
    NameList,
    /// `(name, url)` of each object in a list, one per line
    NamedList,
    /// Only whether an image is present
    Image,
}

struct Field {
    key: &'static str,
    label: &'static str,
    kind: FieldKind,
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind) -> Field {
    Field { key, label, kind }
}

const SCENE_LAYOUT: &[Field] = &[
    field("title", "Title", FieldKind::Text),
    field("date", "Date", FieldKind::Text),
    field("image", "Image", FieldKind::Image),
    field("url", "URL", FieldKind::Text),
    field("details", "Details", FieldKind::Block),
    field("studio", "Studio", FieldKind::Named),
    field("tags", "Tags", FieldKind::NameList),
    field("performers", "Performers", FieldKind::NamedList),
    field("movies", "Movies", FieldKind::NamedList),
];

const MOVIE_LAYOUT: &[Field] = &[
    field("name", "Name", FieldKind::Text),
    field("aliases", "Aliases", FieldKind::Text),
    field("duration", "Duration", FieldKind::Text),
    field("date", "Date", FieldKind::Text),
    field("rating", "Rating", FieldKind::Text),
    field("director", "Director", FieldKind::Text),
    field("url", "URL", FieldKind::Text),
    field("synopsis", "Synopsis", FieldKind::Block),
    field("studio", "Studio", FieldKind::Named),
    field("front_image", "Front Image", FieldKind::Image),
    field("back_image", "Back Image", FieldKind::Image),
];

const GALLERY_LAYOUT: &[Field] = &[
    field("title", "Title", FieldKind::Text),
    field("date", "Date", FieldKind::Text),
    field("url", "URL", FieldKind::Text),
    field("details", "Details", FieldKind::Block),
    field("studio", "Studio", FieldKind::Named),
    field("tags", "Tags", FieldKind::NameList),
    field("performers", "Performers", FieldKind::NamedList),
];

fn layout(object_type: ObjectType) -> &'static [Field] {
    match object_type {
        ObjectType::Scene => SCENE_LAYOUT,
        ObjectType::Movie => MOVIE_LAYOUT,
        ObjectType::Gallery => GALLERY_LAYOUT,
    }
}

/// An image carried by a scraped object, still in its transport encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageField {
    pub label: &'static str,
    pub data: String,
}

/// Text rendering of a scraped object plus the images it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedObject {
    pub text: String,
    pub images: Vec<ImageField>,
}

/// Format a scraped object for the terminal
pub fn format_scraped_object(
    object_type: ObjectType,
    object: &ScrapedObject,
    colored: bool,
) -> RenderedObject {
    let mut remaining = object.clone();
    let separator = format!("\n{}", INDENT);
    let mut text = String::new();
    let mut images = Vec::new();

    for field in layout(object_type) {
        let value = remaining.remove(field.key);
        let value = value.as_ref().filter(|v| !v.is_null());
        let label = if colored {
            field.label.cyan().to_string()
        } else {
            field.label.to_string()
        };

        let line = match field.kind {
            FieldKind::Text => format!("{}: {}", label, repr(value)),
            FieldKind::Block => format!("{}: {}", label, block(value)),
            FieldKind::Named => format!("{}: {}", label, named(value)),
            FieldKind::Image => {
                let data = value.and_then(Value::as_str).filter(|s| !s.is_empty());
                if let Some(data) = data {
                    images.push(ImageField {
                        label: field.label,
                        data: data.to_string(),
                    });
                }
                format!("{}: {}", label, if data.is_some() { "Yes" } else { "No" })
            }
            FieldKind::NameList => {
                let items = value.and_then(Value::as_array);
                let body = items.map(|items| {
                    let names: Vec<String> = items.iter().map(|i| repr(i.get("name"))).collect();
                    names
                        .chunks(TAGS_PER_LINE)
                        .map(|chunk| chunk.join(", "))
                        .collect::<Vec<_>>()
                        .join(separator.as_str())
                });
                list_line(&label, items.map_or(0, Vec::len), body)
            }
            FieldKind::NamedList => {
                let items = value.and_then(Value::as_array);
                let body = items.map(|items| {
                    items
                        .iter()
                        .map(|i| named(Some(i)))
                        .collect::<Vec<_>>()
                        .join(separator.as_str())
                });
                list_line(&label, items.map_or(0, Vec::len), body)
            }
        };
        text.push_str(&line);
        text.push('\n');
    }

    if !remaining.is_empty() {
        let heading = if colored {
            "EXTRA DATA:".yellow().to_string()
        } else {
            "EXTRA DATA:".to_string()
        };
        text.push_str(&format!("\n{}\n{}\n", heading, extra_data(&remaining)));
    }

    RenderedObject { text, images }
}

/// Quote strings, print other values as JSON, missing values as `None`
fn repr(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::String(s)) => format!("{:?}", s),
        Some(other) => other.to_string(),
    }
}

fn block(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str) {
        Some(text) => {
            let body = text
                .lines()
                .map(|line| format!("{}{}", INDENT, line))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{{\n{}\n}}", body)
        }
        None => repr(value),
    }
}

fn named(value: Option<&Value>) -> String {
    match value {
        Some(Value::Object(obj)) => format!("({}, {})", repr(obj.get("name")), repr(obj.get("url"))),
        other => repr(other),
    }
}

fn list_line(label: &str, count: usize, body: Option<String>) -> String {
    format!(
        "{} ({}):\n{}{}",
        label,
        count,
        INDENT,
        body.unwrap_or_else(|| "None".to_string())
    )
}

fn extra_data(remaining: &Map<String, Value>) -> String {
    // `Map` is ordered by key, so the output is sorted
    serde_json::to_string_pretty(remaining).unwrap_or_default()
}
