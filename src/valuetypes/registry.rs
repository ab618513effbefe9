//! Name → value type resolution for a model
//!
//! Built-in names are fixed; user-defined atomic types come from the model's
//! `valuetypes` section and may reference each other in any order.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use super::{AtomicValueType, ValueType};
use crate::diagnostics::Diagnostics;
use crate::model::{Model, Span, TypeRef, ValuetypeDefinition};

const RULE_ID: &str = "valuetype-definitions";

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    atomic: BTreeMap<String, ValueType>,
}

impl TypeRegistry {
    /// Registry with only the built-in types
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Resolve every atomic type declared in the model.
    ///
    /// Unknown supertypes and supertype cycles are reported and the affected
    /// types are left out, so later lookups see them as unknown names.
    pub fn from_model(model: &Model, diagnostics: &mut Diagnostics) -> Self {
        let mut registry = Self::default();
        let definitions: BTreeMap<&str, &ValuetypeDefinition> = model
            .valuetypes
            .iter()
            .map(|def| (def.name.as_str(), def))
            .collect();

        for def in &model.valuetypes {
            if builtin_type(&def.name).is_some() {
                diagnostics.error(
                    def.span,
                    format!("Value type '{}' shadows a built-in type", def.name),
                    RULE_ID,
                );
                continue;
            }
            let mut visiting = HashSet::new();
            registry.resolve_definition(def, &definitions, &mut visiting, diagnostics);
        }

        debug!(count = registry.atomic.len(), "resolved atomic value types");
        registry
    }

    fn resolve_definition(
        &mut self,
        def: &ValuetypeDefinition,
        definitions: &BTreeMap<&str, &ValuetypeDefinition>,
        visiting: &mut HashSet<String>,
        diagnostics: &mut Diagnostics,
    ) -> Option<ValueType> {
        if let Some(resolved) = self.atomic.get(&def.name) {
            return Some(resolved.clone());
        }
        if !visiting.insert(def.name.clone()) {
            diagnostics.error(
                def.span,
                format!("Value type '{}' has a cyclic supertype chain", def.name),
                RULE_ID,
            );
            return None;
        }

        let supertype = match self.resolve_with(&def.supertype, definitions, visiting, diagnostics)
        {
            Some(supertype) => supertype,
            None => {
                if !self.is_known_name(&def.supertype, definitions) {
                    diagnostics.error(
                        def.span,
                        format!(
                            "Unknown supertype '{}' for value type '{}'",
                            def.supertype, def.name
                        ),
                        RULE_ID,
                    );
                }
                visiting.remove(&def.name);
                return None;
            }
        };
        visiting.remove(&def.name);

        let resolved = ValueType::Atomic(Arc::new(AtomicValueType {
            name: def.name.clone(),
            supertype: Some(supertype),
            constraints: def.constraints.clone(),
        }));
        self.atomic.insert(def.name.clone(), resolved.clone());
        Some(resolved)
    }

    fn resolve_with(
        &mut self,
        type_ref: &TypeRef,
        definitions: &BTreeMap<&str, &ValuetypeDefinition>,
        visiting: &mut HashSet<String>,
        diagnostics: &mut Diagnostics,
    ) -> Option<ValueType> {
        let name = type_ref.as_str().trim();
        if let Some(element) = collection_element(name) {
            return self
                .resolve_with(&TypeRef::new(element), definitions, visiting, diagnostics)
                .map(ValueType::collection);
        }
        if let Some(builtin) = builtin_type(name) {
            return Some(builtin);
        }
        let def = definitions.get(name)?;
        self.resolve_definition(def, definitions, visiting, diagnostics)
    }

    fn is_known_name(
        &self,
        type_ref: &TypeRef,
        definitions: &BTreeMap<&str, &ValuetypeDefinition>,
    ) -> bool {
        let mut name = type_ref.as_str().trim();
        while let Some(element) = collection_element(name) {
            name = element;
        }
        builtin_type(name).is_some() || definitions.contains_key(name)
    }

    /// Resolve a type reference against built-ins and registered atomic types
    pub fn resolve(&self, type_ref: &TypeRef) -> Option<ValueType> {
        self.resolve_name(type_ref.as_str())
    }

    pub fn resolve_name(&self, name: &str) -> Option<ValueType> {
        let name = name.trim();
        if let Some(element) = collection_element(name) {
            return self.resolve_name(element).map(ValueType::collection);
        }
        builtin_type(name).or_else(|| self.atomic.get(name).cloned())
    }

    /// Resolve or report an unknown type at `span`
    pub fn resolve_or_report(
        &self,
        type_ref: &TypeRef,
        span: Span,
        diagnostics: &mut Diagnostics,
        rule_id: &'static str,
    ) -> Option<ValueType> {
        let resolved = self.resolve(type_ref);
        if resolved.is_none() {
            diagnostics.error(span, format!("Unknown value type '{}'", type_ref), rule_id);
        }
        resolved
    }

    pub fn atomic_types(&self) -> impl Iterator<Item = &ValueType> {
        self.atomic.values()
    }
}

fn builtin_type(name: &str) -> Option<ValueType> {
    let valuetype = match name {
        "boolean" => ValueType::Boolean,
        "decimal" => ValueType::Decimal,
        "integer" => ValueType::Integer,
        "text" => ValueType::Text,
        "Regex" => ValueType::Regex,
        "CellRange" => ValueType::CellRange,
        "Constraint" => ValueType::Constraint,
        "Transform" => ValueType::Transform,
        "ValuetypeAssignment" => ValueType::ValuetypeAssignment,
        _ => return None,
    };
    Some(valuetype)
}

fn collection_element(name: &str) -> Option<&str> {
    name.strip_prefix("Collection<")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(str::trim)
}
