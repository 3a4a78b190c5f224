// Copyright @yucwang 2026

use crate::core::error::{RenderEngineError, Result};
use crate::math::constants::Float;

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Infers the value type the same way it is printed: quoted text is a
    /// string, then bool, integer and float are tried in that order.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
            return PropertyValue::String(unescape(&text[1..text.len() - 1]));
        }
        match text {
            "true" => return PropertyValue::Bool(true),
            "false" => return PropertyValue::Bool(false),
            _ => {}
        }
        if let Ok(v) = text.parse::<i64>() {
            return PropertyValue::Int(v);
        }
        if let Ok(v) = text.parse::<f64>() {
            return PropertyValue::Float(v);
        }
        PropertyValue::String(text.to_string())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Int(v) => write!(f, "{}", v),
            // Debug keeps the decimal point so the value reads back as a float
            PropertyValue::Float(v) => write!(f, "{:?}", v),
            PropertyValue::String(v) => write!(f, "\"{}\"", escape(v)),
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int(v as i64)
    }
}

impl From<u32> for PropertyValue {
    fn from(v: u32) -> Self {
        PropertyValue::Int(v as i64)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<usize> for PropertyValue {
    fn from(v: usize) -> Self {
        PropertyValue::Int(v as i64)
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Float(v as f64)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    value: PropertyValue,
}

impl Property {
    pub fn new<V: Into<PropertyValue>>(name: &str, value: V) -> Self {
        Self { name: name.to_string(), value: value.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    fn invalid(&self, reason: &str) -> RenderEngineError {
        RenderEngineError::InvalidProperty { name: self.name.clone(), reason: reason.to_string() }
    }

    pub fn as_int(&self) -> Result<i64> {
        match &self.value {
            PropertyValue::Int(v) => Ok(*v),
            PropertyValue::String(s) => s.trim().parse::<i64>().map_err(|_| self.invalid("expected an integer")),
            _ => Err(self.invalid("expected an integer")),
        }
    }

    pub fn as_uint(&self) -> Result<u32> {
        let v = self.as_int()?;
        if v < 0 || v > u32::MAX as i64 {
            return Err(self.invalid("expected an unsigned 32 bit integer"));
        }
        Ok(v as u32)
    }

    pub fn as_float(&self) -> Result<Float> {
        match &self.value {
            PropertyValue::Float(v) => Ok(*v as Float),
            PropertyValue::Int(v) => Ok(*v as Float),
            PropertyValue::String(s) => s.trim().parse::<Float>().map_err(|_| self.invalid("expected a number")),
            _ => Err(self.invalid("expected a number")),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match &self.value {
            PropertyValue::Bool(v) => Ok(*v),
            PropertyValue::Int(v) => Ok(*v != 0),
            _ => Err(self.invalid("expected a boolean")),
        }
    }

    pub fn as_string(&self) -> String {
        match &self.value {
            PropertyValue::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// Ordered string-keyed property bag. Setting an existing name replaces the
/// value but keeps the original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    names: Vec<String>,
    values: HashMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, prop: Property) {
        if !self.values.contains_key(&prop.name) {
            self.names.push(prop.name.clone());
        }
        self.values.insert(prop.name, prop.value);
    }

    pub fn with(mut self, prop: Property) -> Self {
        self.set(prop);
        self
    }

    /// Copies every property of `other` into `self`, `other` wins on conflicts.
    pub fn merge(mut self, other: &Properties) -> Self {
        for prop in other.iter() {
            self.set(prop);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Property> {
        self.values.get(name).map(|value| Property { name: name.to_string(), value: value.clone() })
    }

    /// Looks `name` up here first and in `defaults` second.
    pub fn get_or_default(&self, defaults: &Properties, name: &str) -> Result<Property> {
        self.get(name)
            .or_else(|| defaults.get(name))
            .ok_or_else(|| RenderEngineError::MissingProperty(name.to_string()))
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Property> {
        let value = self.values.remove(name)?;
        self.names.retain(|n| n != name);
        Some(Property { name: name.to_string(), value })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Property> + '_ {
        self.names.iter().filter_map(move |name| self.get(name))
    }

    pub fn with_prefix(&self, prefix: &str) -> Properties {
        let mut props = Properties::new();
        for prop in self.iter().filter(|p| p.name.starts_with(prefix)) {
            props.set(prop);
        }
        props
    }

    pub fn parse(text: &str) -> Result<Properties> {
        let mut props = Properties::new();
        for (line_idx, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let name = parts.next().unwrap_or("").trim();
            let value = match parts.next() {
                Some(v) => v,
                None => {
                    return Err(RenderEngineError::InvalidProperty {
                        name: name.to_string(),
                        reason: format!("line {} has no '='", line_idx + 1),
                    })
                }
            };
            if name.is_empty() {
                return Err(RenderEngineError::InvalidProperty {
                    name: String::new(),
                    reason: format!("line {} has an empty name", line_idx + 1),
                });
            }
            props.set(Property { name: name.to_string(), value: PropertyValue::parse(value) });
        }
        Ok(props)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Properties> {
        let path = path.as_ref();
        log::info!("Reading render configuration from: {}.", path.display());
        let text = fs::read_to_string(path)?;
        Properties::parse(&text)
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for prop in self.iter() {
            writeln!(f, "{}", prop)?;
        }
        Ok(())
    }
}
