//! Turns loosely shaped admin input into a canonical form schema.
//!
//! Normalization never fails on question content: missing or wrong-typed
//! fields fall back to defaults. The only rejection is a request body that is
//! not an object or carries no usable slug.

use std::collections::HashSet;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::core::models::form::{FormSchema, Upsert};
use crate::core::models::question::{Question, QuestionType};
use crate::error::Error;

pub const DEFAULT_LABEL_PREFIX: &str = "Soru";

static NULL: Value = Value::Null;

static NAME_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_]+").unwrap());
static SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}$").unwrap());

#[derive(Debug, Clone)]
pub struct Normalizer {
    label_prefix: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_PREFIX)
    }
}

impl Normalizer {
    pub fn new(label_prefix: impl Into<String>) -> Self {
        Self {
            label_prefix: label_prefix.into().trim().to_owned(),
        }
    }

    /// Normalizes a single question. `index` is 0-based.
    pub fn question(&self, index: usize, raw: &Value) -> Question {
        let empty = Map::new();
        let fields = raw.as_object().unwrap_or(&empty);
        let field = |key: &str| fields.get(key).unwrap_or(&NULL);

        let type_ = question_type(field("type"));
        let name = match slugify(&text_of(field("name"))) {
            n if n.is_empty() => format!("q{}", index + 1),
            n => n,
        };
        let label = match text_of(first_present(fields, &["label", "title"])) {
            l if l.is_empty() => format!("{} {}", self.label_prefix, index + 1).trim().to_owned(),
            l => l,
        };
        let options = if type_.has_options() {
            Some(options(first_present(fields, &["options", "choices"])))
        } else {
            None
        };
        Question {
            type_,
            name,
            label,
            required: truthy(field("required")),
            options,
        }
    }

    /// Normalizes a question list. Names that collide after slugification get
    /// `_2`, `_3`, ... suffixes in order of appearance.
    pub fn questions(&self, raw: &[Value]) -> Vec<Question> {
        let mut taken = HashSet::new();
        raw.iter()
            .enumerate()
            .map(|(i, q)| {
                let mut question = self.question(i, q);
                question.name = claim_name(question.name, &mut taken);
                question
            })
            .collect()
    }

    /// Normalizes a whole form definition. Accepts both the admin request
    /// shape (`{title, active, schema: {questions}}`) and the stored shape
    /// (`{title, active, questions}`).
    pub fn schema(&self, raw: &Value) -> FormSchema {
        let lookup = |key: &str| {
            raw.get(key)
                .filter(|v| !v.is_null())
                .or_else(|| raw.get("schema").and_then(|s| s.get(key)))
                .unwrap_or(&NULL)
        };
        let questions = match raw.get("schema").and_then(question_list).or_else(|| question_list(raw)) {
            Some(items) => self.questions(items),
            None => Vec::new(),
        };
        FormSchema {
            title: text_of(lookup("title")),
            description: text_of(lookup("description")),
            active: matches!(lookup("active"), Value::Bool(true)),
            questions,
        }
    }

    /// Normalizes an admin save request into an upsert keyed by slug.
    pub fn form(&self, body: &Value) -> Result<Upsert, Error> {
        if !body.is_object() {
            return Err(Error::InvalidInput("request body must be a JSON object".into()));
        }
        let slug = match body.get("slug") {
            Some(Value::String(s)) => s.trim().to_lowercase(),
            _ => return Err(Error::InvalidInput("slug is required".into())),
        };
        if !SLUG.is_match(&slug) {
            return Err(Error::InvalidInput(format!("invalid slug: {:?}", slug)));
        }
        Ok(Upsert {
            slug,
            schema: self.schema(body),
        })
    }
}

/// Normalizes a question list with the default label prefix.
pub fn normalize(raw: &[Value]) -> Vec<Question> {
    Normalizer::default().questions(raw)
}

fn question_list(container: &Value) -> Option<&Vec<Value>> {
    ["questions", "fields"].iter().find_map(|k| container.get(*k).and_then(Value::as_array))
}

fn first_present<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> &'a Value {
    keys.iter().find_map(|k| fields.get(*k).filter(|v| !v.is_null())).unwrap_or(&NULL)
}

fn question_type(raw: &Value) -> QuestionType {
    let name = match raw {
        Value::String(s) => s.trim().to_lowercase(),
        _ => return QuestionType::Text,
    };
    match name.as_str() {
        "email" | "e-mail" | "mail" | "eposta" | "e-posta" => QuestionType::Email,
        "textarea" | "paragraph" | "multiline" | "long" | "uzun" => QuestionType::Textarea,
        "radio" | "radyo" | "single" => QuestionType::Radio,
        "checkbox" | "checkboxes" | "multi" | "multiple" | "onay" => QuestionType::Checkbox,
        "select" | "dropdown" | "liste" | "secim" | "seçim" => QuestionType::Select,
        _ => QuestionType::Text,
    }
}

/// Scalars become trimmed text; null, arrays and objects become empty.
fn text_of(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn options(raw: &Value) -> Vec<String> {
    let candidates: Vec<String> = match raw {
        Value::Array(items) => items.iter().map(option_text).collect(),
        Value::Null | Value::Object(_) => Vec::new(),
        scalar => text_of(scalar).split(',').map(|s| s.trim().to_owned()).collect(),
    };
    candidates.into_iter().filter(|s| !s.is_empty()).unique().collect()
}

fn option_text(item: &Value) -> String {
    match item {
        Value::Object(fields) => ["label", "value", "text"]
            .iter()
            .map(|k| text_of(fields.get(*k).unwrap_or(&NULL)))
            .find(|s| !s.is_empty())
            .unwrap_or_default(),
        other => text_of(other),
    }
}

fn claim_name(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", name, n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Lowercases, folds accented letters to ASCII and collapses every run of
/// characters outside `[a-z0-9_]` into one underscore.
pub fn slugify(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for c in raw.chars() {
        if ('\u{0300}'..='\u{036f}').contains(&c) {
            continue;
        }
        match fold(c) {
            Some(ascii) => folded.push_str(ascii),
            None => folded.extend(c.to_lowercase()),
        }
    }
    NAME_SEPARATOR.replace_all(&folded, "_").trim_matches('_').to_owned()
}

fn fold(c: char) -> Option<&'static str> {
    let ascii = match c {
        'ç' | 'Ç' => "c",
        'ğ' | 'Ğ' => "g",
        'ı' | 'İ' => "i",
        'ö' | 'Ö' => "o",
        'ş' | 'Ş' => "s",
        'ü' | 'Ü' => "u",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "a",
        'æ' | 'Æ' => "ae",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ñ' | 'Ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ø' => "o",
        'ù' | 'ú' | 'û' | 'Ù' | 'Ú' | 'Û' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        'ß' => "ss",
        _ => return None,
    };
    Some(ascii)
}
