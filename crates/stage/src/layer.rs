//! Text layers: parsed, uncomposed scene description.
//!
//! A [`Layer`] mirrors one `#usda` document: its metadata and a tree of
//! [`PrimSpec`]s holding local opinions only. Composition across referenced
//! layers happens in [`crate::stage`].

use pest::iterators::Pair;
use pest::Parser;

use crate::error::{Result, StageError};

#[derive(pest_derive::Parser)]
#[grammar = "layer.pest"]
struct LayerParser;

/// A metadata or attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `@path@` or `@path@</Target>`.
    AssetPath {
        path: String,
        target: Option<String>,
    },
    /// `</Some/Prim>`.
    Path(String),
    String(String),
    Number(f64),
    /// Bare identifier such as `None` or `true`.
    Token(String),
    Tuple(Vec<Value>),
    List(Vec<Value>),
    Dictionary(Vec<(String, Value)>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Token(s) => Some(s),
            _ => None,
        }
    }
}

/// How a list-valued metadata entry combines with weaker opinions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ListOp {
    #[default]
    Explicit,
    Prepend,
    Append,
    Add,
    Delete,
    Reorder,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetadataEntry {
    pub op: ListOp,
    pub key: String,
    pub value: Value,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Specifier {
    Def,
    Over,
    Class,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertySpec {
    pub name: String,
    pub type_name: String,
    pub custom: bool,
    pub uniform: bool,
    pub default: Option<Value>,
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrimSpec {
    pub specifier: Specifier,
    pub type_name: Option<String>,
    pub name: String,
    pub metadata: Vec<MetadataEntry>,
    pub properties: Vec<PropertySpec>,
    pub children: Vec<PrimSpec>,
}

/// One external reference authored on a prim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LayerReference {
    pub asset_path: String,
    pub target: Option<String>,
}

impl PrimSpec {
    /// References authored on this prim, strongest first. Deleted entries
    /// are skipped.
    pub fn references(&self) -> Vec<LayerReference> {
        let mut refs = Vec::new();
        for entry in &self.metadata {
            if entry.key != "references" || entry.op == ListOp::Delete {
                continue;
            }
            match &entry.value {
                Value::List(items) => refs.extend(items.iter().filter_map(to_reference)),
                single => refs.extend(to_reference(single)),
            }
        }
        refs
    }

    pub fn child(&self, name: &str) -> Option<&PrimSpec> {
        self.children.iter().find(|c| c.name == name)
    }
}

fn to_reference(value: &Value) -> Option<LayerReference> {
    match value {
        Value::AssetPath { path, target } => Some(LayerReference {
            asset_path: path.clone(),
            target: target.clone(),
        }),
        _ => None,
    }
}

/// A parsed text layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub version: String,
    pub doc: Option<String>,
    pub metadata: Vec<MetadataEntry>,
    pub prims: Vec<PrimSpec>,
}

impl Layer {
    /// Parse layer text. `identifier` only labels errors.
    pub fn parse(identifier: &str, text: &str) -> Result<Self> {
        let mut pairs = LayerParser::parse(Rule::layer, text)
            .map_err(|e| StageError::parse(identifier, e.with_path(identifier).to_string()))?;
        let layer = pairs
            .next()
            .ok_or_else(|| StageError::parse(identifier, "empty document"))?;
        build_layer(identifier, layer)
    }

    /// The `defaultPrim` metadata value.
    pub fn default_prim(&self) -> Option<&str> {
        self.metadata
            .iter()
            .find(|e| e.key == "defaultPrim")
            .and_then(|e| e.value.as_str())
    }

    /// Root prim named by `defaultPrim`, else the first root prim.
    pub fn default_or_first_prim(&self) -> Option<&PrimSpec> {
        match self.default_prim() {
            Some(name) => self.prims.iter().find(|p| p.name == name),
            None => self.prims.first(),
        }
    }

    /// Prim spec at an absolute path such as `/ParkingLot/Floor`.
    pub fn prim_at_path(&self, path: &str) -> Option<&PrimSpec> {
        let mut names = path.split('/').filter(|s| !s.is_empty());
        let first = names.next()?;
        let mut prim = self.prims.iter().find(|p| p.name == first)?;
        for name in names {
            prim = prim.child(name)?;
        }
        Some(prim)
    }
}

// ── Tree building ────────────────────────────────────────────────────────────

fn build_layer(identifier: &str, pair: Pair<Rule>) -> Result<Layer> {
    let mut layer = Layer {
        version: String::new(),
        doc: None,
        metadata: Vec::new(),
        prims: Vec::new(),
    };

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::header => {
                layer.version = inner
                    .into_inner()
                    .next()
                    .map(|v| v.as_str().to_string())
                    .unwrap_or_default();
            }
            Rule::metadata => {
                let (doc, entries) = build_metadata(identifier, inner)?;
                layer.doc = doc;
                layer.metadata = entries;
            }
            Rule::prim => layer.prims.push(build_prim(identifier, inner)?),
            _ => {}
        }
    }
    Ok(layer)
}

fn build_metadata(
    identifier: &str,
    pair: Pair<Rule>,
) -> Result<(Option<String>, Vec<MetadataEntry>)> {
    let mut doc = None;
    let mut entries = Vec::new();

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::doc_string => {
                if let Some(s) = item.into_inner().next() {
                    doc = Some(build_string(s));
                }
            }
            Rule::metadata_entry => entries.push(build_metadata_entry(identifier, item)?),
            _ => {}
        }
    }
    Ok((doc, entries))
}

fn build_metadata_entry(identifier: &str, pair: Pair<Rule>) -> Result<MetadataEntry> {
    let mut op = ListOp::Explicit;
    let mut key = None;
    let mut value = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::list_op => op = build_list_op(inner.as_str()),
            Rule::identifier if key.is_none() => key = Some(inner.as_str().to_string()),
            _ => value = Some(build_value(identifier, inner)?),
        }
    }

    match (key, value) {
        (Some(key), Some(value)) => Ok(MetadataEntry { op, key, value }),
        _ => Err(StageError::parse(identifier, "incomplete metadata entry")),
    }
}

fn build_list_op(text: &str) -> ListOp {
    match text {
        "prepend" => ListOp::Prepend,
        "append" => ListOp::Append,
        "add" => ListOp::Add,
        "delete" => ListOp::Delete,
        "reorder" => ListOp::Reorder,
        _ => ListOp::Explicit,
    }
}

fn build_prim(identifier: &str, pair: Pair<Rule>) -> Result<PrimSpec> {
    let mut prim = PrimSpec {
        specifier: Specifier::Def,
        type_name: None,
        name: String::new(),
        metadata: Vec::new(),
        properties: Vec::new(),
        children: Vec::new(),
    };

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::specifier => {
                prim.specifier = match inner.as_str() {
                    "over" => Specifier::Over,
                    "class" => Specifier::Class,
                    _ => Specifier::Def,
                }
            }
            Rule::type_name => prim.type_name = Some(inner.as_str().to_string()),
            Rule::string => prim.name = build_string(inner),
            Rule::metadata => prim.metadata = build_metadata(identifier, inner)?.1,
            Rule::prim => prim.children.push(build_prim(identifier, inner)?),
            Rule::property => prim.properties.push(build_property(identifier, inner)?),
            _ => {}
        }
    }

    if prim.name.is_empty() {
        return Err(StageError::parse(identifier, "prim without a name"));
    }
    Ok(prim)
}

fn build_property(identifier: &str, pair: Pair<Rule>) -> Result<PropertySpec> {
    let mut property = PropertySpec {
        name: String::new(),
        type_name: String::new(),
        custom: false,
        uniform: false,
        default: None,
        metadata: Vec::new(),
    };

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::custom => property.custom = true,
            Rule::variability => property.uniform = true,
            Rule::prop_type => property.type_name = inner.as_str().to_string(),
            Rule::prop_name => property.name = inner.as_str().to_string(),
            Rule::metadata => property.metadata = build_metadata(identifier, inner)?.1,
            _ => property.default = Some(build_value(identifier, inner)?),
        }
    }
    Ok(property)
}

fn build_value(identifier: &str, pair: Pair<Rule>) -> Result<Value> {
    let value = match pair.as_rule() {
        Rule::reference => {
            let mut path = String::new();
            let mut target = None;
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::asset_path => path = inner.as_str().to_string(),
                    Rule::path_ref => target = Some(build_path(inner)),
                    _ => {}
                }
            }
            Value::AssetPath { path, target }
        }
        Rule::path_ref => Value::Path(build_path(pair)),
        Rule::string => Value::String(build_string(pair)),
        Rule::number => {
            let text = pair.as_str();
            let number = text
                .parse::<f64>()
                .map_err(|e| StageError::parse(identifier, format!("bad number '{}': {}", text, e)))?;
            Value::Number(number)
        }
        Rule::identifier => Value::Token(pair.as_str().to_string()),
        Rule::tuple => Value::Tuple(build_values(identifier, pair)?),
        Rule::list => Value::List(build_values(identifier, pair)?),
        Rule::dictionary => {
            let mut entries = Vec::new();
            for entry in pair.into_inner() {
                if let Some(inner) = entry.into_inner().next() {
                    entries.push(build_dict_entry(identifier, inner)?);
                }
            }
            Value::Dictionary(entries)
        }
        other => {
            return Err(StageError::parse(
                identifier,
                format!("unexpected {:?} in value position", other),
            ))
        }
    };
    Ok(value)
}

fn build_values(identifier: &str, pair: Pair<Rule>) -> Result<Vec<Value>> {
    pair.into_inner()
        .map(|inner| build_value(identifier, inner))
        .collect()
}

fn build_dict_entry(identifier: &str, pair: Pair<Rule>) -> Result<(String, Value)> {
    let mut inner = pair.into_inner();
    if let Some(first) = inner.peek() {
        if first.as_rule() == Rule::prop_type {
            inner.next();
        }
    }

    let key = inner
        .next()
        .map(|k| match k.as_rule() {
            Rule::string => build_string(k),
            _ => k.as_str().to_string(),
        })
        .ok_or_else(|| StageError::parse(identifier, "dictionary entry without a key"))?;
    let value = inner
        .next()
        .ok_or_else(|| StageError::parse(identifier, "dictionary entry without a value"))?;
    Ok((key, build_value(identifier, value)?))
}

fn build_path(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

fn build_string(pair: Pair<Rule>) -> String {
    let raw = pair
        .into_inner()
        .next()
        .map(|p| (p.as_rule(), p.as_str()))
        .unwrap_or((Rule::string_inner, ""));

    match raw {
        (Rule::triple_inner, text) => text.to_string(),
        (_, text) => unescape(text),
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARKING_LOT: &str = r#"#usda 1.0
(
    "Parking lot with two floors"
    defaultPrim = "ParkingLot"
    metersPerUnit = 0.01
)

def Xform "ParkingLot"
{
    def Xform "ParkingLot_Floor_1"
    {
        def "Car1" (
            prepend references = @./car.usda@
        )
        {
        }

        def "Car2" (
            references = [@./car.usda@</Car>]
        )
        {
            # local override
            uniform token purpose = "render"
        }
    }
}
"#;

    #[test]
    fn test_parse_layer_metadata() {
        let layer = Layer::parse("parking_lot.usda", PARKING_LOT).unwrap();
        assert_eq!(layer.version, "1.0");
        assert_eq!(layer.doc.as_deref(), Some("Parking lot with two floors"));
        assert_eq!(layer.default_prim(), Some("ParkingLot"));
        assert_eq!(layer.metadata[1].value, Value::Number(0.01));
    }

    #[test]
    fn test_parse_prim_tree_and_references() {
        let layer = Layer::parse("parking_lot.usda", PARKING_LOT).unwrap();
        let floor = layer.prim_at_path("/ParkingLot/ParkingLot_Floor_1").unwrap();
        assert_eq!(floor.type_name.as_deref(), Some("Xform"));
        assert_eq!(floor.children.len(), 2);

        let car1 = floor.child("Car1").unwrap();
        assert_eq!(car1.type_name, None);
        assert_eq!(
            car1.references(),
            vec![LayerReference {
                asset_path: "./car.usda".to_string(),
                target: None,
            }]
        );
        assert_eq!(car1.metadata[0].op, ListOp::Prepend);

        let car2 = floor.child("Car2").unwrap();
        assert_eq!(car2.references()[0].target.as_deref(), Some("/Car"));
        assert_eq!(car2.properties.len(), 1);
        assert!(car2.properties[0].uniform);
        assert_eq!(car2.properties[0].name, "purpose");
    }

    #[test]
    fn test_parse_property_values() {
        let text = r#"#usda 1.0
def Mesh "Car"
{
    color3f color = (1, 0.5, -2e1)
    custom string[] tags = ["fast", "red"]
    rel material:binding = </Looks/Red>
    double radius.timeSamples = {
        0: 1.5,
        10: 2,
    }
    dictionary info = { string owner = "lot" }
    float size
}
"#;
        let layer = Layer::parse("car.usda", text).unwrap();
        let car = &layer.prims[0];
        let names: Vec<&str> = car.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["color", "tags", "material:binding", "radius.timeSamples", "info", "size"]
        );

        assert_eq!(
            car.properties[0].default,
            Some(Value::Tuple(vec![
                Value::Number(1.0),
                Value::Number(0.5),
                Value::Number(-20.0)
            ]))
        );
        assert!(car.properties[1].custom);
        assert_eq!(car.properties[1].type_name, "string[]");
        assert_eq!(
            car.properties[2].default,
            Some(Value::Path("/Looks/Red".to_string()))
        );
        assert_eq!(
            car.properties[3].default,
            Some(Value::Dictionary(vec![
                ("0".to_string(), Value::Number(1.5)),
                ("10".to_string(), Value::Number(2.0)),
            ]))
        );
        assert_eq!(
            car.properties[4].default,
            Some(Value::Dictionary(vec![(
                "owner".to_string(),
                Value::String("lot".to_string())
            )]))
        );
        assert_eq!(car.properties[5].default, None);
    }

    #[test]
    fn test_escaped_and_triple_quoted_strings() {
        let text = "#usda 1.0\n(\n    \"\"\"multi\nline\"\"\"\n    comment = \"say \\\"hi\\\"\"\n)\n";
        let layer = Layer::parse("doc.usda", text).unwrap();
        assert_eq!(layer.doc.as_deref(), Some("multi\nline"));
        assert_eq!(layer.metadata[0].value.as_str(), Some("say \"hi\""));
        assert!(layer.prims.is_empty());
    }

    #[test]
    fn test_missing_header_is_parse_error() {
        let result = Layer::parse("bad.usda", "def \"X\" {}\n");
        assert!(matches!(result, Err(StageError::Parse { identifier, .. }) if identifier == "bad.usda"));
    }

    #[test]
    fn test_deleted_references_are_skipped() {
        let text = "#usda 1.0\ndef \"A\" (\n    delete references = @./b.usda@\n)\n{\n}\n";
        let layer = Layer::parse("a.usda", text).unwrap();
        assert!(layer.prims[0].references().is_empty());
    }
}
