use priceguard_core::{AttrValue, Promotion, ProviderId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Fixed promotion field that may take part in change detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreField {
    Participation,
    StartTime,
    EndTime,
    Title,
    Kind,
    ParticipatingCount,
    PotentialCount,
}

impl CoreField {
    /// Name reported in `ChangeRecord::changed_fields`
    pub fn name(&self) -> &'static str {
        match self {
            CoreField::Participation => "is_participating",
            CoreField::StartTime => "start_time",
            CoreField::EndTime => "end_time",
            CoreField::Title => "title",
            CoreField::Kind => "kind",
            CoreField::ParticipatingCount => "participating_product_count",
            CoreField::PotentialCount => "potential_product_count",
        }
    }

    pub(crate) fn differs(&self, previous: &Promotion, current: &Promotion) -> bool {
        match self {
            CoreField::Participation => previous.is_participating != current.is_participating,
            CoreField::StartTime => previous.start_time != current.start_time,
            CoreField::EndTime => previous.end_time != current.end_time,
            CoreField::Title => previous.title != current.title,
            CoreField::Kind => previous.kind != current.kind,
            CoreField::ParticipatingCount => {
                previous.participating_product_count != current.participating_product_count
            }
            CoreField::PotentialCount => {
                previous.potential_product_count != current.potential_product_count
            }
        }
    }
}

/// Which entries of the attribute map are compared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttributeSelection {
    /// Every attribute
    All,
    /// Attributes holding a number on either side (prices, discounts, amounts)
    #[default]
    Numeric,
    /// Only the named attributes
    Only(BTreeSet<String>),
    /// No attributes
    None,
}

impl AttributeSelection {
    pub(crate) fn selects(
        &self,
        key: &str,
        previous: Option<&AttrValue>,
        current: Option<&AttrValue>,
    ) -> bool {
        match self {
            AttributeSelection::All => true,
            AttributeSelection::Numeric => {
                previous.is_some_and(AttrValue::is_numeric)
                    || current.is_some_and(AttrValue::is_numeric)
            }
            AttributeSelection::Only(keys) => keys.contains(key),
            AttributeSelection::None => false,
        }
    }
}

/// Field set compared for one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparedFields {
    #[serde(default = "default_core_fields")]
    pub core: BTreeSet<CoreField>,
    #[serde(default)]
    pub attributes: AttributeSelection,
}

fn default_core_fields() -> BTreeSet<CoreField> {
    BTreeSet::from([
        CoreField::Participation,
        CoreField::EndTime,
        CoreField::ParticipatingCount,
        CoreField::PotentialCount,
    ])
}

impl Default for ComparedFields {
    fn default() -> Self {
        Self {
            core: default_core_fields(),
            attributes: AttributeSelection::default(),
        }
    }
}

impl ComparedFields {
    pub fn with_core(mut self, field: CoreField) -> Self {
        self.core.insert(field);
        self
    }

    pub fn with_attributes(mut self, attributes: AttributeSelection) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Change-detection configuration
///
/// Providers without an override use `default_fields`.
#[derive(Debug, Clone, Default)]
pub struct DiffConfig {
    default_fields: ComparedFields,
    overrides: HashMap<ProviderId, ComparedFields>,
}

impl DiffConfig {
    pub fn new(default_fields: ComparedFields) -> Self {
        Self {
            default_fields,
            overrides: HashMap::new(),
        }
    }

    /// Use `fields` for `provider` instead of the default set
    pub fn with_provider(mut self, provider: ProviderId, fields: ComparedFields) -> Self {
        self.overrides.insert(provider, fields);
        self
    }

    pub fn fields_for(&self, provider: ProviderId) -> &ComparedFields {
        self.overrides.get(&provider).unwrap_or(&self.default_fields)
    }
}
